//! The set of logical fonts together with the layout constants and the tables that map
//! characters and symbol names to glyphs.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use super::font::{checked_font_id, Extension, FontId, FontInfo, GlyphRef, Metrics, SizedGlyph};
use crate::error::{LookupError, ResourceError};
use crate::resources::{self, Element, ResourceProvider};
use crate::types::{CharRange, TeXStyle};

/// The TeX layout parameters (font dimensions of the math fonts), in em of the text size.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum MathConstant {
    Num1 = 0,
    Num2,
    Num3,
    Denom1,
    Denom2,
    Sup1,
    Sup2,
    Sup3,
    Sub1,
    Sub2,
    SupDrop,
    SubDrop,
    AxisHeight,
    DefaultRuleThickness,
    BigOpSpacing1,
    BigOpSpacing2,
    BigOpSpacing3,
    BigOpSpacing4,
    BigOpSpacing5,
    DelimiterFactor,
    DelimiterShortfall,
    ScriptSpace,
    NullDelimiterSpace,
}

impl MathConstant {
    pub const COUNT: usize = 23;

    pub const ALL: [MathConstant; MathConstant::COUNT] = [
        MathConstant::Num1,
        MathConstant::Num2,
        MathConstant::Num3,
        MathConstant::Denom1,
        MathConstant::Denom2,
        MathConstant::Sup1,
        MathConstant::Sup2,
        MathConstant::Sup3,
        MathConstant::Sub1,
        MathConstant::Sub2,
        MathConstant::SupDrop,
        MathConstant::SubDrop,
        MathConstant::AxisHeight,
        MathConstant::DefaultRuleThickness,
        MathConstant::BigOpSpacing1,
        MathConstant::BigOpSpacing2,
        MathConstant::BigOpSpacing3,
        MathConstant::BigOpSpacing4,
        MathConstant::BigOpSpacing5,
        MathConstant::DelimiterFactor,
        MathConstant::DelimiterShortfall,
        MathConstant::ScriptSpace,
        MathConstant::NullDelimiterSpace,
    ];

    /// The attribute name in the `<Parameters>` element.
    pub fn name(self) -> &'static str {
        use self::MathConstant::*;
        match self {
            Num1 => "num1",
            Num2 => "num2",
            Num3 => "num3",
            Denom1 => "denom1",
            Denom2 => "denom2",
            Sup1 => "sup1",
            Sup2 => "sup2",
            Sup3 => "sup3",
            Sub1 => "sub1",
            Sub2 => "sub2",
            SupDrop => "supdrop",
            SubDrop => "subdrop",
            AxisHeight => "axisheight",
            DefaultRuleThickness => "defaultrulethickness",
            BigOpSpacing1 => "bigopspacing1",
            BigOpSpacing2 => "bigopspacing2",
            BigOpSpacing3 => "bigopspacing3",
            BigOpSpacing4 => "bigopspacing4",
            BigOpSpacing5 => "bigopspacing5",
            DelimiterFactor => "delimiterfactor",
            DelimiterShortfall => "delimitershortfall",
            ScriptSpace => "scriptspace",
            NullDelimiterSpace => "nulldelimiterspace",
        }
    }

    /// Dimensionless constants are not scaled with the style.
    fn is_ratio(self) -> bool {
        self == MathConstant::DelimiterFactor
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneralSettings {
    pub mu_font: FontId,
    pub space_font: FontId,
    pub script_factor: f32,
    pub script_script_factor: f32,
}

/// The first glyph of each character range, for one text style.
type TextStyleMapping = [Option<GlyphRef>; 3];

#[derive(Debug, Clone)]
pub struct FontRegistry {
    fonts: Vec<FontInfo>,
    constants: [f32; MathConstant::COUNT],
    settings: GeneralSettings,
    text_styles: HashMap<String, TextStyleMapping>,
    default_text_styles: [String; 3],
    symbols: HashMap<String, GlyphRef>,
}

impl FontRegistry {
    /// Loads `default_font.xml` and every font description file it includes.
    pub fn load(provider: &dyn ResourceProvider) -> Result<FontRegistry, ResourceError> {
        let resource = resources::DEFAULT_FONT;
        let doc = provider.parse(resource)?;

        let parameters = doc.required_child(resource, "Parameters")?;
        let mut constants = [0.0; MathConstant::COUNT];
        for &constant in MathConstant::ALL.iter() {
            constants[constant as usize] = parameters.parse_required_attr(resource, constant.name())?;
        }

        let general = doc.required_child(resource, "GeneralSettings")?;
        let settings = GeneralSettings {
            mu_font: checked_font_id(resource, general.parse_required_attr(resource, "mufontid")?)?,
            space_font: checked_font_id(resource, general.parse_required_attr(resource, "spacefontid")?)?,
            script_factor: general.parse_required_attr(resource, "scriptfactor")?,
            script_script_factor: general.parse_required_attr(resource, "scriptscriptfactor")?,
        };

        let text_styles = load_text_styles(resource, doc.required_child(resource, "TextStyleMappings")?)?;
        let default_text_styles = load_default_text_styles(
            resource,
            doc.required_child(resource, "DefaultTextStyleMapping")?,
            &text_styles,
        )?;

        let mut symbols = HashMap::new();
        for mapping in doc.required_child(resource, "SymbolMappings")?.children_named("SymbolMapping") {
            let name = mapping.required_attr(resource, "name")?;
            let code: u16 = mapping.parse_required_attr(resource, "ch")?;
            let font_id = checked_font_id(resource, mapping.parse_required_attr(resource, "fontId")?)?;
            symbols.insert(name.to_string(), GlyphRef::new(code, font_id));
        }
        if !symbols.contains_key("sqrt") {
            return Err(ResourceError::MissingElement {
                resource: resource.to_string(),
                element: "SymbolMapping name=\"sqrt\"".to_string(),
            });
        }

        let mut fonts: Vec<FontInfo> = Vec::new();
        for metrics in doc.required_child(resource, "FontDescriptions")?.children_named("Metrics") {
            let include = metrics.required_attr(resource, "include")?;
            let font = FontInfo::from_element(include, &provider.parse(include)?)?;
            if fonts.iter().any(|f| f.id == font.id) {
                return Err(ResourceError::InvalidNumber {
                    resource: include.to_string(),
                    attribute: "id".to_string(),
                    value: font.id.to_string(),
                });
            }
            fonts.push(font);
        }
        fonts.sort_by_key(|f| f.id);
        if let Some((index, font)) = fonts.iter().enumerate().find(|(i, f)| *i != f.id as usize) {
            // ids have to be dense so that they can index the font vector
            return Err(ResourceError::UnknownFontId {
                resource: resource.to_string(),
                id: (index.min(font.id as usize)) as u32,
            });
        }

        let registry = FontRegistry {
            fonts,
            constants,
            settings,
            text_styles,
            default_text_styles,
            symbols,
        };
        registry.validate(resource)?;
        debug!(
            "loaded {} fonts, {} text styles and {} symbol mappings",
            registry.fonts.len(),
            registry.text_styles.len(),
            registry.symbols.len()
        );
        Ok(registry)
    }

    /// Checks that every referenced glyph lives in a loaded font. Symbols and next larger
    /// variants must also have metrics.
    fn validate(&self, resource: &str) -> Result<(), ResourceError> {
        let check_font = |glyph: &GlyphRef| -> Result<&FontInfo, ResourceError> {
            self.font(glyph.font_id).ok_or_else(|| ResourceError::UnknownFontId {
                resource: resource.to_string(),
                id: u32::from(glyph.font_id),
            })
        };
        let check = |glyph: &GlyphRef| check_font(glyph).map(|_| ());
        let check_char = |glyph: &GlyphRef| -> Result<(), ResourceError> {
            if check_font(glyph)?.has_char(glyph.code) {
                Ok(())
            } else {
                Err(ResourceError::UnknownCharacter {
                    resource: resource.to_string(),
                    font: u32::from(glyph.font_id),
                    code: glyph.code,
                })
            }
        };
        check(&GlyphRef::new(0, self.settings.mu_font))?;
        check(&GlyphRef::new(0, self.settings.space_font))?;
        for glyph in self.symbols.values() {
            check_char(glyph)?;
        }
        for mapping in self.text_styles.values() {
            for glyph in mapping.iter().flatten() {
                check(glyph)?;
            }
        }
        for font in &self.fonts {
            for glyph in font.next_larger_targets() {
                check_char(glyph)?;
            }
        }
        Ok(())
    }

    pub fn settings(&self) -> &GeneralSettings {
        &self.settings
    }

    pub fn font(&self, id: FontId) -> Option<&FontInfo> {
        self.fonts.get(id as usize)
    }

    pub fn fonts(&self) -> &[FontInfo] {
        &self.fonts
    }

    /// Scale of glyphs in `style` relative to the text size.
    pub fn size_factor(&self, style: TeXStyle) -> f32 {
        match style.code() {
            c if c < 4 => 1.0,
            c if c < 6 => self.settings.script_factor,
            _ => self.settings.script_script_factor,
        }
    }

    pub fn math_constant(&self, constant: MathConstant, style: TeXStyle) -> f32 {
        let value = self.constants[constant as usize];
        if constant.is_ratio() {
            value
        } else {
            value * self.size_factor(style)
        }
    }

    pub fn axis_height(&self, style: TeXStyle) -> f32 {
        self.math_constant(MathConstant::AxisHeight, style)
    }

    pub fn default_rule_thickness(&self, style: TeXStyle) -> f32 {
        self.math_constant(MathConstant::DefaultRuleThickness, style)
    }

    pub fn quad(&self, font_id: FontId, style: TeXStyle) -> f32 {
        self.font(font_id).map_or(0.0, |f| f.quad) * self.size_factor(style)
    }

    pub fn x_height(&self, font_id: FontId, style: TeXStyle) -> f32 {
        self.font(font_id).map_or(0.0, |f| f.x_height) * self.size_factor(style)
    }

    /// Interword space of the space font.
    pub fn space(&self, style: TeXStyle) -> f32 {
        self.font(self.settings.space_font).map_or(0.0, |f| f.space) * self.size_factor(style)
    }

    /// One math unit: 1/18 of the quad of the mu font.
    pub fn mu(&self, style: TeXStyle) -> f32 {
        self.quad(self.settings.mu_font, style) / 18.0
    }

    /// Sizes a glyph for `style`. Glyphs without metrics come out with zero size.
    pub fn resolve_char(&self, glyph: GlyphRef, style: TeXStyle) -> SizedGlyph {
        let size = self.size_factor(style);
        let (font_name, metrics) = match self.font(glyph.font_id) {
            Some(font) => (
                font.name.clone(),
                font.char_metrics(glyph.code)
                    .map(|m| Metrics::scaled(m, size))
                    .unwrap_or(Metrics {
                        size,
                        ..Default::default()
                    }),
            ),
            None => (
                Arc::from(""),
                Metrics {
                    size,
                    ..Default::default()
                },
            ),
        };
        SizedGlyph {
            glyph,
            font_name,
            metrics,
        }
    }

    pub fn symbol_glyph(&self, name: &str) -> Option<GlyphRef> {
        self.symbols.get(name).cloned()
    }

    pub fn resolve_symbol(&self, name: &str, style: TeXStyle) -> Result<SizedGlyph, LookupError> {
        self.symbol_glyph(name)
            .map(|glyph| self.resolve_char(glyph, style))
            .ok_or_else(|| LookupError::SymbolMappingNotFound(name.to_string()))
    }

    pub fn has_text_style(&self, name: &str) -> bool {
        self.text_styles.contains_key(name)
    }

    /// Resolves an alphanumeric character in the given text style. Ranges the style does not
    /// define use the default text style of that range.
    pub fn resolve_text_char(
        &self,
        c: char,
        text_style: &str,
        style: TeXStyle,
    ) -> Result<SizedGlyph, LookupError> {
        let range = CharRange::classify(c).ok_or(LookupError::CharacterNotAlphanumeric(c))?;
        let mapping = self
            .text_styles
            .get(text_style)
            .ok_or_else(|| LookupError::TextStyleMappingNotFound(text_style.to_string()))?;
        match mapping[range as usize] {
            Some(base) => Ok(self.resolve_in_range(base, c, range, style)),
            None => self.resolve_default_char(c, style),
        }
    }

    /// Resolves an alphanumeric character with the default text style of its range.
    pub fn resolve_default_char(&self, c: char, style: TeXStyle) -> Result<SizedGlyph, LookupError> {
        let range = CharRange::classify(c).ok_or(LookupError::CharacterNotAlphanumeric(c))?;
        let text_style = &self.default_text_styles[range as usize];
        self.text_styles
            .get(text_style)
            .and_then(|mapping| mapping[range as usize])
            .map(|base| self.resolve_in_range(base, c, range, style))
            .ok_or_else(|| LookupError::TextStyleMappingNotFound(text_style.clone()))
    }

    fn resolve_in_range(&self, base: GlyphRef, c: char, range: CharRange, style: TeXStyle) -> SizedGlyph {
        let offset = c as u16 - range.start() as u16;
        self.resolve_char(GlyphRef::new(base.code + offset, base.font_id), style)
    }

    /// Kern between two glyphs. Zero unless both come from the same font.
    pub fn kern(&self, left: &SizedGlyph, right: &SizedGlyph, style: TeXStyle) -> f32 {
        if left.font_id() != right.font_id() {
            return 0.0;
        }
        self.font(left.font_id())
            .map_or(0.0, |font| font.kern(left.code(), right.code()) * self.size_factor(style))
    }

    pub fn ligature(&self, left: GlyphRef, right: GlyphRef) -> Option<GlyphRef> {
        if left.font_id != right.font_id {
            return None;
        }
        self.font(left.font_id)
            .and_then(|font| font.ligature(left.code, right.code))
            .map(|code| GlyphRef::new(code, left.font_id))
    }

    pub fn next_larger(&self, glyph: &SizedGlyph, style: TeXStyle) -> Option<SizedGlyph> {
        self.font(glyph.font_id())
            .and_then(|font| font.next_larger(glyph.code()))
            .map(|larger| self.resolve_char(larger, style))
    }

    pub fn is_extensible(&self, glyph: GlyphRef) -> bool {
        self.font(glyph.font_id)
            .map_or(false, |font| font.extension(glyph.code).is_some())
    }

    pub fn extension(&self, glyph: &SizedGlyph, style: TeXStyle) -> Option<Extension> {
        let font_id = glyph.font_id();
        let codes = self.font(font_id)?.extension(glyph.code())?;
        let part = |code: u16| self.resolve_char(GlyphRef::new(code, font_id), style);
        Some(Extension {
            top: codes.top.map(part),
            mid: codes.mid.map(part),
            rep: part(codes.rep),
            bot: codes.bot.map(part),
        })
    }

    /// Horizontal offset for accents over `glyph`: its kern with the font's skew character.
    pub fn skew(&self, glyph: &SizedGlyph, style: TeXStyle) -> f32 {
        match self.font(glyph.font_id()) {
            Some(font) => font
                .skew_char
                .map_or(0.0, |skew| font.kern(glyph.code(), skew) * self.size_factor(style)),
            None => 0.0,
        }
    }
}

fn load_text_styles(
    resource: &str,
    element: &Element,
) -> Result<HashMap<String, TextStyleMapping>, ResourceError> {
    let mut text_styles = HashMap::new();
    for style in element.children_named("TextStyleMapping") {
        let name = style.required_attr(resource, "name")?;
        let mut mapping: TextStyleMapping = [None; 3];
        for range in style.children_named("MapRange") {
            let code = range.required_attr(resource, "code")?;
            let char_range = CharRange::from_name(code).ok_or_else(|| ResourceError::UnknownName {
                resource: resource.to_string(),
                kind: "character range",
                name: code.to_string(),
            })?;
            let font_id = checked_font_id(resource, range.parse_required_attr(resource, "fontId")?)?;
            let start: u16 = range.parse_required_attr(resource, "start")?;
            mapping[char_range as usize] = Some(GlyphRef::new(start, font_id));
        }
        text_styles.insert(name.to_string(), mapping);
    }
    Ok(text_styles)
}

fn load_default_text_styles(
    resource: &str,
    element: &Element,
    text_styles: &HashMap<String, TextStyleMapping>,
) -> Result<[String; 3], ResourceError> {
    let mut defaults: [Option<String>; 3] = [None, None, None];
    for map in element.children_named("MapStyle") {
        let code = map.required_attr(resource, "code")?;
        let range = CharRange::from_name(code).ok_or_else(|| ResourceError::UnknownName {
            resource: resource.to_string(),
            kind: "character range",
            name: code.to_string(),
        })?;
        let text_style = map.required_attr(resource, "textStyle")?;
        let defines_range = text_styles
            .get(text_style)
            .map_or(false, |mapping| mapping[range as usize].is_some());
        if !defines_range {
            return Err(ResourceError::MissingDefaultMapping {
                resource: resource.to_string(),
                range: format!("{} (text style \"{}\" does not map it)", code, text_style),
            });
        }
        defaults[range as usize] = Some(text_style.to_string());
    }

    let mut result: [String; 3] = Default::default();
    for &range in CharRange::ALL.iter() {
        result[range as usize] = defaults[range as usize]
            .take()
            .ok_or_else(|| ResourceError::MissingDefaultMapping {
                resource: resource.to_string(),
                range: range.name().to_string(),
            })?;
    }
    Ok(result)
}

#[cfg(all(test, feature = "embedded_resources"))]
mod tests {
    use super::*;
    use crate::resources::EmbeddedProvider;

    fn registry() -> FontRegistry {
        FontRegistry::load(&EmbeddedProvider).unwrap()
    }

    #[test]
    fn size_factor_is_a_step_function_of_style() {
        let fonts = registry();
        assert_eq!(fonts.size_factor(TeXStyle::Display), 1.0);
        assert_eq!(fonts.size_factor(TeXStyle::TextCramped), 1.0);
        assert_eq!(fonts.size_factor(TeXStyle::Script), 0.7);
        assert_eq!(fonts.size_factor(TeXStyle::ScriptScriptCramped), 0.5);
    }

    #[test]
    fn text_styles_map_ranges_to_fonts() {
        let fonts = registry();
        let digit = fonts.resolve_text_char('7', "mathrm", TeXStyle::Text).unwrap();
        assert_eq!(digit.glyph, GlyphRef::new(55, 0));

        let italic = fonts.resolve_default_char('x', TeXStyle::Text).unwrap();
        assert_eq!(italic.glyph, GlyphRef::new(120, 1));
        assert_eq!(&*italic.font_name, "cmmi10");

        // mathcal only maps capitals, digits fall back to the default mapping
        let fallback = fonts.resolve_text_char('3', "mathcal", TeXStyle::Text).unwrap();
        assert_eq!(fallback.glyph, GlyphRef::new(51, 0));

        assert_eq!(
            fonts.resolve_text_char('a', "mathfrak", TeXStyle::Text),
            Err(LookupError::TextStyleMappingNotFound("mathfrak".to_string()))
        );
        assert_eq!(
            fonts.resolve_default_char('+', TeXStyle::Text),
            Err(LookupError::CharacterNotAlphanumeric('+'))
        );
    }

    #[test]
    fn metrics_scale_with_style() {
        let fonts = registry();
        let text = fonts.resolve_symbol("sum", TeXStyle::Text).unwrap();
        let script = fonts.resolve_symbol("sum", TeXStyle::Script).unwrap();
        assert!((script.metrics.width - 0.7 * text.metrics.width).abs() < 1e-6);
        assert_eq!(script.metrics.size, 0.7);
        assert!(fonts.resolve_symbol("nosuchsymbol", TeXStyle::Text).is_err());
    }

    #[test]
    fn kerning_requires_the_same_font() {
        let fonts = registry();
        let a = fonts.resolve_text_char('A', "mathrm", TeXStyle::Text).unwrap();
        let v = fonts.resolve_text_char('V', "mathrm", TeXStyle::Text).unwrap();
        assert!(fonts.kern(&a, &v, TeXStyle::Text) < 0.0);
        let v_italic = fonts.resolve_default_char('V', TeXStyle::Text).unwrap();
        assert_eq!(fonts.kern(&a, &v_italic, TeXStyle::Text), 0.0);
    }

    #[test]
    fn ligatures_and_larger_variants() {
        let fonts = registry();
        let f = GlyphRef::new('f' as u16, 0);
        let i = GlyphRef::new('i' as u16, 0);
        assert_eq!(fonts.ligature(f, i), Some(GlyphRef::new(12, 0)));
        assert_eq!(fonts.ligature(i, f), None);

        let paren = fonts.resolve_symbol("lbrack", TeXStyle::Text).unwrap();
        let larger = fonts.next_larger(&paren, TeXStyle::Text).unwrap();
        assert_eq!(larger.font_id(), 3);
        assert!(larger.total_height() > paren.total_height());
        assert!(fonts.extension(&paren, TeXStyle::Text).is_none());
        assert!(!fonts.is_extensible(paren.glyph));
        assert!(fonts.is_extensible(GlyphRef::new(48, 3)));
    }

    /// Serves the embedded resources with one replacement applied to the default font.
    struct Patched(&'static str, &'static str);

    impl ResourceProvider for Patched {
        fn read(&self, name: &str) -> Result<std::borrow::Cow<'_, str>, ResourceError> {
            let text = EmbeddedProvider.read(name)?.into_owned();
            if name == resources::DEFAULT_FONT {
                Ok(text.replace(self.0, self.1).into())
            } else {
                Ok(text.into())
            }
        }
    }

    #[test]
    fn symbols_must_have_metrics() {
        let provider = Patched(r#"name="infty" ch="49""#, r#"name="infty" ch="200""#);
        match FontRegistry::load(&provider) {
            Err(ResourceError::UnknownCharacter { font, code, .. }) => {
                assert_eq!((font, code), (2, 200))
            }
            Err(other) => panic!("unexpected error {}", other),
            Ok(_) => panic!("registry loaded"),
        }
    }

    #[test]
    fn constants_scale_except_ratios() {
        let fonts = registry();
        assert_eq!(fonts.axis_height(TeXStyle::Display), 0.25);
        assert_eq!(fonts.math_constant(MathConstant::DelimiterFactor, TeXStyle::Script), 901.0);
        assert!((fonts.mu(TeXStyle::Text) - fonts.quad(2, TeXStyle::Text) / 18.0).abs() < 1e-6);
    }
}
