use std::cell::Cell;

use super::font::FontId;
use super::font_registry::FontRegistry;
use super::glue::GlueEngine;
use crate::types::{Color, TeXStyle, Unit};

/// The state atoms are lowered in: style, text size and the shared font and glue tables.
///
/// Style transforms return new environments. Colors are only set while building the box tree.
#[derive(Debug, Clone)]
pub struct StyleEnvironment<'a> {
    style: TeXStyle,
    fonts: &'a FontRegistry,
    glue: &'a GlueEngine,
    /// Text size in pixels per em.
    size: f32,
    foreground: Option<Color>,
    background: Option<Color>,
    last_font_id: Cell<Option<FontId>>,
}

impl<'a> StyleEnvironment<'a> {
    pub fn new(style: TeXStyle, fonts: &'a FontRegistry, glue: &'a GlueEngine, size: f32) -> Self {
        StyleEnvironment {
            style,
            fonts,
            glue,
            size,
            foreground: None,
            background: None,
            last_font_id: Cell::new(None),
        }
    }

    /// Creates an environment from a raw style code; invalid codes select display style.
    pub fn from_code(code: i32, fonts: &'a FontRegistry, glue: &'a GlueEngine, size: f32) -> Self {
        StyleEnvironment::new(TeXStyle::from_code(code), fonts, glue, size)
    }

    pub fn style(&self) -> TeXStyle {
        self.style
    }

    pub fn fonts(&self) -> &'a FontRegistry {
        self.fonts
    }

    pub fn glue(&self) -> &'a GlueEngine {
        self.glue
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn size_factor(&self) -> f32 {
        self.fonts.size_factor(self.style)
    }

    pub fn with_style(&self, style: TeXStyle) -> StyleEnvironment<'a> {
        StyleEnvironment {
            style,
            last_font_id: Cell::new(None),
            ..self.clone()
        }
    }

    pub fn cramp(&self) -> StyleEnvironment<'a> {
        self.with_style(self.style.cramped())
    }

    pub fn numerator(&self) -> StyleEnvironment<'a> {
        self.with_style(self.style.numerator())
    }

    pub fn denominator(&self) -> StyleEnvironment<'a> {
        self.with_style(self.style.denominator())
    }

    pub fn superscript(&self) -> StyleEnvironment<'a> {
        self.with_style(self.style.superscript())
    }

    pub fn subscript(&self) -> StyleEnvironment<'a> {
        self.with_style(self.style.subscript())
    }

    pub fn root(&self) -> StyleEnvironment<'a> {
        self.with_style(self.style.root())
    }

    pub fn foreground(&self) -> Option<Color> {
        self.foreground
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn set_foreground(&mut self, color: Option<Color>) {
        self.foreground = color;
    }

    pub fn set_background(&mut self, color: Option<Color>) {
        self.background = color;
    }

    /// The font of the most recently lowered character, if any.
    pub fn last_font_id(&self) -> Option<FontId> {
        self.last_font_id.get()
    }

    pub fn set_last_font_id(&self, font_id: FontId) {
        self.last_font_id.set(Some(font_id));
    }

    /// x-height of the last used font, or of the space font if no character was lowered yet.
    pub fn x_height(&self) -> f32 {
        let font_id = self
            .last_font_id()
            .unwrap_or(self.fonts.settings().space_font);
        self.fonts.x_height(font_id, self.style)
    }

    /// Length of one `unit` in em of the text size.
    pub fn unit_factor(&self, unit: Unit) -> f32 {
        match unit {
            Unit::Em => self.fonts.quad(self.fonts.settings().space_font, self.style),
            Unit::Ex => self.x_height(),
            Unit::Pixel | Unit::Point => 1.0 / self.size,
            Unit::Pica => 12.0 / self.size,
            Unit::Mu => self.fonts.mu(self.style),
        }
    }
}

#[cfg(all(test, feature = "embedded_resources"))]
mod tests {
    use super::*;
    use crate::resources::EmbeddedProvider;

    #[test]
    fn transforms_return_new_environments() {
        let fonts = FontRegistry::load(&EmbeddedProvider).unwrap();
        let glue = GlueEngine::load(&EmbeddedProvider).unwrap();
        let mut env = StyleEnvironment::new(TeXStyle::Display, &fonts, &glue, 20.0);
        env.set_foreground(Some(Color::rgb(255, 0, 0)));
        env.set_last_font_id(1);

        let sup = env.superscript();
        assert_eq!(sup.style(), TeXStyle::Script);
        assert_eq!(sup.foreground(), Some(Color::rgb(255, 0, 0)));
        assert_eq!(sup.last_font_id(), None);
        assert_eq!(env.style(), TeXStyle::Display);
        assert_eq!(env.last_font_id(), Some(1));
        assert_eq!(env.root().style(), TeXStyle::ScriptScript);
        assert_eq!(env.denominator().style(), TeXStyle::TextCramped);
    }

    #[test]
    fn invalid_code_selects_display() {
        let fonts = FontRegistry::load(&EmbeddedProvider).unwrap();
        let glue = GlueEngine::load(&EmbeddedProvider).unwrap();
        let env = StyleEnvironment::from_code(42, &fonts, &glue, 10.0);
        assert_eq!(env.style(), TeXStyle::Display);
        assert_eq!(env.unit_factor(Unit::Pixel), 0.1);
        assert_eq!(env.unit_factor(Unit::Pica), 1.2);
    }
}
