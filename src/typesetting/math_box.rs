//! Boxes are the output of typesetting: nested rows and stacks of glyphs and rules, each with a
//! width, a height above the baseline and a depth below it. All dimensions are in em of the
//! text size.

use super::font::SizedGlyph;
use super::glue::GlueAmount;
use crate::types::Color;

/// Receives the drawing operations of [`MathBox::paint`].
///
/// Coordinates are in em of the text size with y growing downwards; `y` of `draw_glyph` is the
/// baseline of the glyph.
pub trait Surface {
    fn draw_glyph(&mut self, glyph: &SizedGlyph, x: f32, y: f32);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
    /// `None` restores the default color of the surface.
    fn set_color(&mut self, color: Option<Color>);
}

#[derive(Debug, Clone, PartialEq)]
pub enum MathBoxContent {
    /// Nothing is drawn. Used for glue, kerns, struts and phantoms.
    Empty,
    Glyph(SizedGlyph),
    /// A filled rectangle covering the whole box.
    Rule,
    /// Children side by side. A child's `shift` moves it down.
    HBox(Vec<MathBox>),
    /// Children from top to bottom. A child's `shift` moves it right. The baseline is the
    /// baseline of the last child.
    VBox(Vec<MathBox>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MathBox {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    /// Offset applied by the parent: downwards in a horizontal box, rightwards in a vertical one.
    pub shift: f32,
    pub content: MathBoxContent,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
}

impl Default for MathBox {
    fn default() -> MathBox {
        MathBox::empty(0.0, 0.0, 0.0)
    }
}

impl MathBox {
    fn with_content(width: f32, height: f32, depth: f32, content: MathBoxContent) -> MathBox {
        MathBox {
            width,
            height,
            depth,
            shift: 0.0,
            content,
            foreground: None,
            background: None,
        }
    }

    pub fn empty(width: f32, height: f32, depth: f32) -> MathBox {
        MathBox::with_content(width, height, depth, MathBoxContent::Empty)
    }

    /// Horizontal space.
    pub fn kern(width: f32) -> MathBox {
        MathBox::empty(width, 0.0, 0.0)
    }

    /// Vertical space inside a vertical box.
    pub fn vertical_kern(height: f32) -> MathBox {
        MathBox::empty(0.0, height, 0.0)
    }

    pub fn glue(amount: GlueAmount) -> MathBox {
        MathBox::kern(amount.space)
    }

    pub fn glyph(glyph: SizedGlyph) -> MathBox {
        let metrics = glyph.metrics;
        MathBox::with_content(
            metrics.width,
            metrics.height,
            metrics.depth,
            MathBoxContent::Glyph(glyph),
        )
    }

    /// A horizontal rule sitting on the baseline.
    pub fn rule(width: f32, thickness: f32) -> MathBox {
        MathBox::with_content(width, thickness, 0.0, MathBoxContent::Rule)
    }

    pub fn hbox(children: Vec<MathBox>) -> MathBox {
        let width = children.iter().map(|c| c.width).sum();
        let height = children
            .iter()
            .map(|c| c.height - c.shift)
            .fold(0.0, f32::max);
        let depth = children
            .iter()
            .map(|c| c.depth + c.shift)
            .fold(0.0, f32::max);
        MathBox::with_content(width, height, depth, MathBoxContent::HBox(children))
    }

    pub fn vbox(children: Vec<MathBox>) -> MathBox {
        let width = children
            .iter()
            .map(|c| c.width + c.shift)
            .fold(0.0, f32::max);
        let total: f32 = children.iter().map(|c| c.total_height()).sum();
        let depth = children.last().map_or(0.0, |c| c.depth);
        MathBox::with_content(width, total - depth, depth, MathBoxContent::VBox(children))
    }

    /// Stacks `children` vertically with the baseline of the result at the baseline of
    /// `children[baseline]`.
    pub fn stack(children: Vec<MathBox>, baseline: usize) -> MathBox {
        let depth = children
            .iter()
            .skip(baseline)
            .enumerate()
            .map(|(i, c)| if i == 0 { c.depth } else { c.total_height() })
            .sum::<f32>();
        let stacked = MathBox::vbox(children);
        let lowered_by = depth - stacked.depth;
        stacked.lowered(lowered_by)
    }

    pub fn with_shift(mut self, shift: f32) -> MathBox {
        self.shift = shift;
        self
    }

    /// Moves the box down by `amount` (up if negative), adjusting height and depth.
    pub fn lowered(self, amount: f32) -> MathBox {
        if amount == 0.0 {
            self
        } else {
            MathBox::hbox(vec![self.with_shift(amount)])
        }
    }

    /// Centres the box horizontally in a box of the given width.
    pub fn centered(self, width: f32) -> MathBox {
        if self.width >= width {
            return self;
        }
        let left = (width - self.width) / 2.0;
        let right = width - self.width - left;
        MathBox::hbox(vec![MathBox::kern(left), self, MathBox::kern(right)])
    }

    /// Moves the box vertically so that it is centred on the math axis.
    pub fn centered_on_axis(self, axis: f32) -> MathBox {
        let amount = (self.height - self.depth) / 2.0 - axis;
        self.lowered(amount)
    }

    pub fn total_height(&self) -> f32 {
        self.height + self.depth
    }

    pub fn children(&self) -> &[MathBox] {
        match self.content {
            MathBoxContent::HBox(ref children) | MathBoxContent::VBox(ref children) => children,
            _ => &[],
        }
    }

    /// Paints the box with its baseline starting at (`x`, `y`).
    pub fn paint(&self, surface: &mut dyn Surface, x: f32, y: f32) {
        self.paint_with_color(surface, x, y, None);
    }

    fn paint_with_color(&self, surface: &mut dyn Surface, x: f32, y: f32, inherited: Option<Color>) {
        let color = self.foreground.or(inherited);
        if let Some(background) = self.background {
            surface.set_color(Some(background));
            surface.fill_rect(x, y - self.height, self.width, self.total_height());
            surface.set_color(color);
        } else if color != inherited {
            surface.set_color(color);
        }

        match self.content {
            MathBoxContent::Empty => {}
            MathBoxContent::Glyph(ref glyph) => surface.draw_glyph(glyph, x, y),
            MathBoxContent::Rule => {
                surface.fill_rect(x, y - self.height, self.width, self.total_height())
            }
            MathBoxContent::HBox(ref children) => {
                let mut cursor = x;
                for child in children {
                    child.paint_with_color(surface, cursor, y + child.shift, color);
                    cursor += child.width;
                }
            }
            MathBoxContent::VBox(ref children) => {
                let mut top = y - self.height;
                for child in children {
                    top += child.height;
                    child.paint_with_color(surface, x + child.shift, top, color);
                    top += child.depth;
                }
            }
        }

        if color != inherited || self.background.is_some() {
            surface.set_color(inherited);
        }
    }
}
