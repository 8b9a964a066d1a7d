//! Metrics of the individual logical fonts.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::error::ResourceError;
use crate::resources::Element;

/// Dense index of a logical font.
pub type FontId = u8;

/// Number of character codes a font can describe.
pub const FONT_SIZE: usize = 256;

/// Identifies one glyph inside one logical font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphRef {
    pub code: u16,
    pub font_id: FontId,
}

impl GlyphRef {
    pub fn new(code: u16, font_id: FontId) -> Self {
        GlyphRef { code, font_id }
    }
}

/// Unscaled dimensions of one character, in em of the design size.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CharMetrics {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub italic: f32,
}

/// Dimensions of a glyph at a particular style. `size` is the scale factor already applied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metrics {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub italic: f32,
    pub size: f32,
}

impl Metrics {
    pub fn scaled(metrics: &CharMetrics, size: f32) -> Metrics {
        Metrics {
            width: metrics.width * size,
            height: metrics.height * size,
            depth: metrics.depth * size,
            italic: metrics.italic * size,
            size,
        }
    }
}

/// A glyph together with the font that renders it and its scaled metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct SizedGlyph {
    pub glyph: GlyphRef,
    /// Name of the font file that renders this glyph, e.g. `cmr10`.
    pub font_name: Arc<str>,
    pub metrics: Metrics,
}

impl SizedGlyph {
    pub fn font_id(&self) -> FontId {
        self.glyph.font_id
    }

    pub fn code(&self) -> u16 {
        self.glyph.code
    }

    pub fn total_height(&self) -> f32 {
        self.metrics.height + self.metrics.depth
    }
}

/// Character codes of the pieces of an extensible glyph, all inside the same font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionCodes {
    pub top: Option<u16>,
    pub mid: Option<u16>,
    pub rep: u16,
    pub bot: Option<u16>,
}

/// The resolved pieces of an extensible glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    pub top: Option<SizedGlyph>,
    pub mid: Option<SizedGlyph>,
    pub rep: SizedGlyph,
    pub bot: Option<SizedGlyph>,
}

/// Everything known about one logical font.
#[derive(Debug, Clone)]
pub struct FontInfo {
    pub id: FontId,
    pub name: Arc<str>,
    metrics: Vec<Option<CharMetrics>>,
    kerning: HashMap<(u16, u16), f32>,
    ligatures: HashMap<(u16, u16), u16>,
    next_larger: HashMap<u16, GlyphRef>,
    extensions: HashMap<u16, ExtensionCodes>,
    pub skew_char: Option<u16>,
    pub x_height: f32,
    pub space: f32,
    pub quad: f32,
}

impl FontInfo {
    pub fn new(id: FontId, name: &str) -> FontInfo {
        FontInfo {
            id,
            name: Arc::from(name),
            metrics: vec![None; FONT_SIZE],
            kerning: HashMap::new(),
            ligatures: HashMap::new(),
            next_larger: HashMap::new(),
            extensions: HashMap::new(),
            skew_char: None,
            x_height: 0.0,
            space: 0.0,
            quad: 0.0,
        }
    }

    /// Builds a font from a `<Font>` description document.
    pub fn from_element(resource: &str, font: &Element) -> Result<FontInfo, ResourceError> {
        let id: u32 = font.parse_required_attr(resource, "id")?;
        let id = checked_font_id(resource, id)?;
        let name = font.required_attr(resource, "name")?;

        let mut info = FontInfo::new(id, name);
        info.space = font.parse_required_attr(resource, "space")?;
        info.x_height = font.parse_required_attr(resource, "xHeight")?;
        info.quad = font.parse_required_attr(resource, "quad")?;
        info.skew_char = font.parse_attr(resource, "skewChar")?;

        for element in font.children_named("Char") {
            let code = checked_code(resource, element.parse_required_attr(resource, "code")?)?;
            let metrics = CharMetrics {
                width: element.parse_attr(resource, "width")?.unwrap_or(0.0),
                height: element.parse_attr(resource, "height")?.unwrap_or(0.0),
                depth: element.parse_attr(resource, "depth")?.unwrap_or(0.0),
                italic: element.parse_attr(resource, "italic")?.unwrap_or(0.0),
            };
            info.metrics[code as usize] = Some(metrics);

            for child in &element.children {
                match child.name.as_str() {
                    "Kern" => {
                        let right = checked_code(resource, child.parse_required_attr(resource, "code")?)?;
                        let value = child.parse_required_attr(resource, "val")?;
                        info.kerning.insert((code, right), value);
                    }
                    "Lig" => {
                        let right = checked_code(resource, child.parse_required_attr(resource, "code")?)?;
                        let lig = checked_code(resource, child.parse_required_attr(resource, "ligCode")?)?;
                        info.ligatures.insert((code, right), lig);
                    }
                    "NextLarger" => {
                        let font_id = child.parse_required_attr(resource, "fontId")?;
                        let larger = checked_code(resource, child.parse_required_attr(resource, "code")?)?;
                        info.next_larger
                            .insert(code, GlyphRef::new(larger, checked_font_id(resource, font_id)?));
                    }
                    "Extension" => {
                        let part = |name: &str| -> Result<Option<u16>, ResourceError> {
                            match child.attr(name) {
                                None | Some("none") => Ok(None),
                                Some(_) => {
                                    let code: u32 = child.parse_required_attr(resource, name)?;
                                    checked_code(resource, code).map(Some)
                                }
                            }
                        };
                        let rep: u32 = child.parse_required_attr(resource, "rep")?;
                        info.extensions.insert(
                            code,
                            ExtensionCodes {
                                top: part("top")?,
                                mid: part("mid")?,
                                rep: checked_code(resource, rep)?,
                                bot: part("bot")?,
                            },
                        );
                    }
                    other => {
                        return Err(ResourceError::UnknownName {
                            resource: resource.to_string(),
                            kind: "character element",
                            name: other.to_string(),
                        })
                    }
                }
            }
        }

        debug!(
            "loaded font {} (id {}) with {} characters",
            info.name,
            info.id,
            info.metrics.iter().filter(|m| m.is_some()).count()
        );
        Ok(info)
    }

    pub fn has_char(&self, code: u16) -> bool {
        self.char_metrics(code).is_some()
    }

    pub fn char_metrics(&self, code: u16) -> Option<&CharMetrics> {
        self.metrics.get(code as usize).and_then(|m| m.as_ref())
    }

    /// Unscaled kern between two characters of this font.
    pub fn kern(&self, left: u16, right: u16) -> f32 {
        self.kerning.get(&(left, right)).cloned().unwrap_or(0.0)
    }

    pub fn ligature(&self, left: u16, right: u16) -> Option<u16> {
        self.ligatures.get(&(left, right)).cloned()
    }

    pub fn next_larger(&self, code: u16) -> Option<GlyphRef> {
        self.next_larger.get(&code).cloned()
    }

    pub fn extension(&self, code: u16) -> Option<&ExtensionCodes> {
        self.extensions.get(&code)
    }

    /// Every glyph referenced by a next larger link of this font.
    pub(crate) fn next_larger_targets(&self) -> impl Iterator<Item = &GlyphRef> {
        self.next_larger.values()
    }
}

fn checked_code(resource: &str, code: u32) -> Result<u16, ResourceError> {
    if (code as usize) < FONT_SIZE {
        Ok(code as u16)
    } else {
        Err(ResourceError::InvalidNumber {
            resource: resource.to_string(),
            attribute: "code".to_string(),
            value: code.to_string(),
        })
    }
}

pub(crate) fn checked_font_id(resource: &str, id: u32) -> Result<FontId, ResourceError> {
    if id <= u32::from(FontId::max_value()) {
        Ok(id as FontId)
    } else {
        Err(ResourceError::UnknownFontId {
            resource: resource.to_string(),
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::xml_reader::parse_document;

    const FONT: &str = r#"
        <Font name="test10" id="4" space="0.3" xHeight="0.43" quad="1" skewChar="127">
          <Char code="102" width="0.3" height="0.7" italic="0.08">
            <Lig code="105" ligCode="12"/>
            <Kern code="41" val="0.07"/>
          </Char>
          <Char code="105" width="0.27" height="0.66"/>
          <Char code="12" width="0.55" height="0.7"/>
          <Char code="40" width="0.38" height="0.75" depth="0.25">
            <NextLarger fontId="3" code="0"/>
          </Char>
          <Char code="62" depth="0.6">
            <Extension rep="62" top="none" bot="64"/>
          </Char>
        </Font>"#;

    #[test]
    fn parses_character_records() {
        let doc = parse_document("test10.xml", FONT).unwrap();
        let font = FontInfo::from_element("test10.xml", &doc).unwrap();
        assert_eq!(font.id, 4);
        assert_eq!(&*font.name, "test10");
        assert_eq!(font.skew_char, Some(127));
        assert_eq!(font.char_metrics(102).unwrap().italic, 0.08);
        assert_eq!(font.char_metrics(105).unwrap().depth, 0.0);
        assert!(!font.has_char(103));
        assert_eq!(font.ligature(102, 105), Some(12));
        assert_eq!(font.ligature(105, 102), None);
        assert_eq!(font.kern(102, 41), 0.07);
        assert_eq!(font.kern(41, 102), 0.0);
        assert_eq!(font.next_larger(40), Some(GlyphRef::new(0, 3)));
        let ext = font.extension(62).unwrap();
        assert_eq!((ext.top, ext.mid, ext.rep, ext.bot), (None, None, 62, Some(64)));
    }

    #[test]
    fn rejects_out_of_range_codes() {
        let doc = parse_document("bad.xml", r#"<Font name="b" id="0" space="0" xHeight="0" quad="1"><Char code="300"/></Font>"#)
            .unwrap();
        assert!(FontInfo::from_element("bad.xml", &doc).is_err());
    }

    #[test]
    fn scaled_metrics() {
        let m = Metrics::scaled(
            &CharMetrics {
                width: 1.0,
                height: 0.5,
                depth: 0.25,
                italic: 0.1,
            },
            0.5,
        );
        assert_eq!((m.width, m.height, m.depth, m.size), (0.5, 0.25, 0.125, 0.5));
    }
}
