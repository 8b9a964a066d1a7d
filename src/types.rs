use std::fmt;

use crate::error::InvalidArgument;

/// The eight TeX styles. Odd codes are the cramped variants of the even style below them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeXStyle {
    Display = 0,
    DisplayCramped = 1,
    Text = 2,
    TextCramped = 3,
    Script = 4,
    ScriptCramped = 5,
    ScriptScript = 6,
    ScriptScriptCramped = 7,
}

impl Default for TeXStyle {
    fn default() -> TeXStyle {
        TeXStyle::Display
    }
}

impl TeXStyle {
    pub const ALL: [TeXStyle; 8] = [
        TeXStyle::Display,
        TeXStyle::DisplayCramped,
        TeXStyle::Text,
        TeXStyle::TextCramped,
        TeXStyle::Script,
        TeXStyle::ScriptCramped,
        TeXStyle::ScriptScript,
        TeXStyle::ScriptScriptCramped,
    ];

    /// Converts a style code. Codes outside `0..8` fall back to `Display`.
    pub fn from_code(code: i32) -> TeXStyle {
        match code {
            1 => TeXStyle::DisplayCramped,
            2 => TeXStyle::Text,
            3 => TeXStyle::TextCramped,
            4 => TeXStyle::Script,
            5 => TeXStyle::ScriptCramped,
            6 => TeXStyle::ScriptScript,
            7 => TeXStyle::ScriptScriptCramped,
            _ => TeXStyle::Display,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    /// Index into the four style columns of the glue table.
    pub fn class(self) -> usize {
        (self as usize) / 2
    }

    pub fn is_cramped(self) -> bool {
        self.code() % 2 == 1
    }

    /// True for `Display` and its cramped variant.
    pub fn is_display(self) -> bool {
        self.class() == 0
    }

    pub fn cramped(self) -> TeXStyle {
        TeXStyle::from_code(self.code() | 1)
    }

    /// The style of a fraction numerator.
    pub fn numerator(self) -> TeXStyle {
        use self::TeXStyle::*;
        match self {
            Display => Text,
            DisplayCramped => TextCramped,
            Text => Script,
            TextCramped => ScriptCramped,
            Script | ScriptScript => ScriptScript,
            ScriptCramped | ScriptScriptCramped => ScriptScriptCramped,
        }
    }

    /// The style of a fraction denominator.
    pub fn denominator(self) -> TeXStyle {
        self.numerator().cramped()
    }

    pub fn superscript(self) -> TeXStyle {
        use self::TeXStyle::*;
        match self {
            Display | Text => Script,
            DisplayCramped | TextCramped => ScriptCramped,
            Script | ScriptScript => ScriptScript,
            ScriptCramped | ScriptScriptCramped => ScriptScriptCramped,
        }
    }

    pub fn subscript(self) -> TeXStyle {
        self.superscript().cramped()
    }

    /// The style of the index of a radical, independent of the current style.
    pub fn root(self) -> TeXStyle {
        TeXStyle::ScriptScript
    }
}

impl fmt::Display for TeXStyle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self.class() {
            0 => "display",
            1 => "text",
            2 => "script",
            _ => "scriptscript",
        };
        if self.is_cramped() {
            write!(f, "{}'", name)
        } else {
            write!(f, "{}", name)
        }
    }
}

/// The class of an atom as far as inter-atom spacing is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomType {
    Ordinary = 0,
    BigOperator = 1,
    BinaryOperator = 2,
    Relation = 3,
    Opening = 4,
    Closing = 5,
    Punctuation = 6,
    Inner = 7,
    Accent = 10,
}

impl Default for AtomType {
    fn default() -> AtomType {
        AtomType::Ordinary
    }
}

impl AtomType {
    /// The eight classes that take part in glue lookup.
    pub const GLUE_CLASSES: [AtomType; 8] = [
        AtomType::Ordinary,
        AtomType::BigOperator,
        AtomType::BinaryOperator,
        AtomType::Relation,
        AtomType::Opening,
        AtomType::Closing,
        AtomType::Punctuation,
        AtomType::Inner,
    ];

    pub fn from_code(code: i32) -> Result<AtomType, InvalidArgument> {
        match code {
            0 => Ok(AtomType::Ordinary),
            1 => Ok(AtomType::BigOperator),
            2 => Ok(AtomType::BinaryOperator),
            3 => Ok(AtomType::Relation),
            4 => Ok(AtomType::Opening),
            5 => Ok(AtomType::Closing),
            6 => Ok(AtomType::Punctuation),
            7 => Ok(AtomType::Inner),
            10 => Ok(AtomType::Accent),
            _ => Err(InvalidArgument::new("atom type", code)),
        }
    }

    /// Parses the short names used in the resource files (`ord`, `op`, `bin`, ...).
    pub fn from_name(name: &str) -> Option<AtomType> {
        let atom_type = match name {
            "ord" => AtomType::Ordinary,
            "op" => AtomType::BigOperator,
            "bin" => AtomType::BinaryOperator,
            "rel" => AtomType::Relation,
            "open" => AtomType::Opening,
            "close" => AtomType::Closing,
            "punct" => AtomType::Punctuation,
            "inner" => AtomType::Inner,
            "acc" => AtomType::Accent,
            _ => return None,
        };
        Some(atom_type)
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    /// Row and column of this type in the glue table. Types above `Inner` count as ordinary.
    pub fn glue_class(self) -> usize {
        match self {
            AtomType::Accent => 0,
            other => other as usize,
        }
    }
}

/// Units for explicit lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Em = 0,
    Ex = 1,
    Pixel = 2,
    Point = 3,
    Pica = 4,
    Mu = 5,
}

impl Unit {
    pub fn from_code(code: i32) -> Result<Unit, InvalidArgument> {
        match code {
            0 => Ok(Unit::Em),
            1 => Ok(Unit::Ex),
            2 => Ok(Unit::Pixel),
            3 => Ok(Unit::Point),
            4 => Ok(Unit::Pica),
            5 => Ok(Unit::Mu),
            _ => Err(InvalidArgument::new("unit", code)),
        }
    }
}

/// The three ranges of alphanumeric characters that text styles map to fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharRange {
    Numbers = 0,
    Capitals = 1,
    Small = 2,
}

impl CharRange {
    pub const ALL: [CharRange; 3] = [CharRange::Numbers, CharRange::Capitals, CharRange::Small];

    pub fn classify(c: char) -> Option<CharRange> {
        match c {
            '0'..='9' => Some(CharRange::Numbers),
            'A'..='Z' => Some(CharRange::Capitals),
            'a'..='z' => Some(CharRange::Small),
            _ => None,
        }
    }

    /// The first character of the range.
    pub fn start(self) -> char {
        match self {
            CharRange::Numbers => '0',
            CharRange::Capitals => 'A',
            CharRange::Small => 'a',
        }
    }

    pub fn from_name(name: &str) -> Option<CharRange> {
        match name {
            "numbers" => Some(CharRange::Numbers),
            "capitals" => Some(CharRange::Capitals),
            "small" => Some(CharRange::Small),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CharRange::Numbers => "numbers",
            CharRange::Capitals => "capitals",
            CharRange::Small => "small",
        }
    }
}

/// An sRGB color with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 255 }
    }

    /// Parses `#rgb`, `#rrggbb`, `#rrggbbaa` or one of a few color names.
    pub fn parse(value: &str) -> Result<Color, InvalidArgument> {
        let invalid = || InvalidArgument::new("color", value);
        let named = match value.to_ascii_lowercase().as_str() {
            "black" => Some(Color::BLACK),
            "white" => Some(Color::WHITE),
            "red" => Some(Color::rgb(255, 0, 0)),
            "green" => Some(Color::rgb(0, 255, 0)),
            "blue" => Some(Color::rgb(0, 0, 255)),
            "cyan" => Some(Color::rgb(0, 255, 255)),
            "magenta" => Some(Color::rgb(255, 0, 255)),
            "yellow" => Some(Color::rgb(255, 255, 0)),
            "gray" | "grey" => Some(Color::rgb(128, 128, 128)),
            _ => None,
        };
        if let Some(color) = named {
            return Ok(color);
        }

        let hex = value.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize, len: usize| -> Result<u8, InvalidArgument> {
            let digits = &hex[i * len..(i + 1) * len];
            let value = u8::from_str_radix(digits, 16).map_err(|_| invalid())?;
            Ok(if len == 1 { value * 17 } else { value })
        };
        match hex.len() {
            3 => Ok(Color::rgb(channel(0, 1)?, channel(1, 1)?, channel(2, 1)?)),
            6 => Ok(Color::rgb(channel(0, 2)?, channel(1, 2)?, channel(2, 2)?)),
            8 => Ok(Color {
                r: channel(0, 2)?,
                g: channel(1, 2)?,
                b: channel(2, 2)?,
                a: channel(3, 2)?,
            }),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size_class(style: TeXStyle) -> i32 {
        match style.code() {
            c if c < 4 => 0,
            c if c < 6 => 1,
            _ => 2,
        }
    }

    #[test]
    fn cramping_is_idempotent_and_keeps_size() {
        for &style in TeXStyle::ALL.iter() {
            assert_eq!(style.cramped().cramped(), style.cramped());
            assert_eq!(size_class(style.cramped()), size_class(style));
            assert!(style.cramped().is_cramped());
        }
    }

    #[test]
    fn named_transitions() {
        assert_eq!(TeXStyle::Display.numerator(), TeXStyle::Text);
        assert_eq!(TeXStyle::Display.denominator(), TeXStyle::TextCramped);
        assert_eq!(TeXStyle::Text.superscript(), TeXStyle::Script);
        assert_eq!(TeXStyle::Text.subscript(), TeXStyle::ScriptCramped);
        for &style in TeXStyle::ALL.iter() {
            assert_eq!(style.root(), TeXStyle::ScriptScript);
        }
    }

    #[test]
    fn transitions_match_integer_formulas() {
        for s in 0..8 {
            let style = TeXStyle::from_code(s);
            assert_eq!(style.numerator().code(), s + 2 - 2 * (s / 6));
            assert_eq!(style.denominator().code(), 2 * (s / 2) + 3 - 2 * (s / 6));
            assert_eq!(style.superscript().code(), 2 * (s / 4) + 4 + s % 2);
            assert_eq!(style.subscript().code(), 2 * (s / 4) + 5);
        }
    }

    #[test]
    fn invalid_style_code_falls_back_to_display() {
        assert_eq!(TeXStyle::from_code(-1), TeXStyle::Display);
        assert_eq!(TeXStyle::from_code(8), TeXStyle::Display);
    }

    #[test]
    fn accent_is_ordinary_for_glue() {
        assert_eq!(AtomType::Accent.glue_class(), AtomType::Ordinary.glue_class());
        assert_eq!(AtomType::Inner.glue_class(), 7);
        assert!(AtomType::from_code(8).is_err());
        assert!(Unit::from_code(6).is_err());
    }

    #[test]
    fn color_parsing() {
        assert_eq!(Color::parse("#f00").unwrap(), Color::rgb(255, 0, 0));
        assert_eq!(Color::parse("#102030").unwrap(), Color::rgb(16, 32, 48));
        assert_eq!(Color::parse("Blue").unwrap(), Color::rgb(0, 0, 255));
        assert!(Color::parse("#12").is_err());
        assert!(Color::parse("chartreuse").is_err());
        assert_eq!(Color::rgb(1, 2, 255).to_string(), "#0102ff");
    }
}
