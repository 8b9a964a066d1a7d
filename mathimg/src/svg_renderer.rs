use std::io;
use std::path::Path;

use svg::node::element::{Group, Rectangle, Text};
use svg::node::Node;
use svg::Document;

use texmath_render::{Color, MathBox, MathBoxContent, SizedGlyph, Surface};

/// Margin around the formula in pixels.
const MARGIN: f32 = 10.0;

pub struct Flags {
    pub show_logical_bounds: bool,
}

/// Collects painted glyphs and rules as SVG nodes. Coordinates arrive in em and are scaled to
/// pixels.
struct SvgSurface {
    scale: f32,
    fill: String,
    group: Group,
}

fn css_color(color: Option<Color>) -> String {
    color.unwrap_or(Color::BLACK).to_string()
}

/// The character showing `code` in the TrueType versions of the TeX fonts, which move the
/// control range up to U+00A1.
fn display_char(code: u16) -> char {
    let code = u32::from(code);
    let mapped = match code {
        0..=9 => 0xA1 + code,
        10..=32 => 0xAD + (code - 10),
        127 => 0xC4,
        _ => code,
    };
    std::char::from_u32(mapped).unwrap_or('?')
}

impl Surface for SvgSurface {
    fn draw_glyph(&mut self, glyph: &SizedGlyph, x: f32, y: f32) {
        let content = display_char(glyph.code());
        let text = Text::new()
            .set("x", x * self.scale)
            .set("y", y * self.scale)
            .set("font-family", &*glyph.font_name)
            .set("font-size", glyph.metrics.size * self.scale)
            .set("fill", self.fill.as_str())
            .add(svg::node::Text::new(content.to_string()));
        self.group.append(text);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let rect = Rectangle::new()
            .set("x", x * self.scale)
            .set("y", y * self.scale)
            .set("width", width * self.scale)
            .set("height", height * self.scale)
            .set("fill", self.fill.as_str());
        self.group.append(rect);
    }

    fn set_color(&mut self, color: Option<Color>) {
        self.fill = css_color(color);
    }
}

/// Outlines the logical box of every glyph, walking the tree the way `MathBox::paint` does.
fn draw_logical_bounds(group: &mut Group, math_box: &MathBox, x: f32, y: f32, scale: f32) {
    match math_box.content {
        MathBoxContent::Glyph(_) => {
            let rect = Rectangle::new()
                .set("x", x * scale)
                .set("y", (y - math_box.height) * scale)
                .set("width", math_box.width * scale)
                .set("height", math_box.total_height() * scale);
            group.append(rect);
        }
        MathBoxContent::HBox(ref children) => {
            let mut cursor = x;
            for child in children {
                draw_logical_bounds(group, child, cursor, y + child.shift, scale);
                cursor += child.width;
            }
        }
        MathBoxContent::VBox(ref children) => {
            let mut top = y - math_box.height;
            for child in children {
                top += child.height;
                draw_logical_bounds(group, child, x + child.shift, top, scale);
                top += child.depth;
            }
        }
        MathBoxContent::Empty | MathBoxContent::Rule => {}
    }
}

pub fn render<P: AsRef<Path>>(math_box: &MathBox, size: f32, flags: Flags, out_path: P) -> io::Result<()> {
    let width = math_box.width * size + 2.0 * MARGIN;
    let height = math_box.total_height() * size + 2.0 * MARGIN;
    let origin = (MARGIN / size, MARGIN / size + math_box.height);

    let mut surface = SvgSurface {
        scale: size,
        fill: css_color(None),
        group: Group::new().set("stroke", "none"),
    };
    math_box.paint(&mut surface, origin.0, origin.1);

    let mut document = Document::new()
        .set("viewBox", format!("0 0 {} {}", width, height))
        .set("width", width)
        .set("height", height)
        .add(surface.group);

    if flags.show_logical_bounds {
        let mut bounds = Group::new()
            .set("stroke", "#FF0000")
            .set("stroke-width", 0.5)
            .set("fill", "none");
        draw_logical_bounds(&mut bounds, math_box, origin.0, origin.1, size);
        document = document.add(bounds);
    }

    svg::save(out_path, &document)
}
