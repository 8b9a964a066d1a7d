//! The atom tree: the parsed structure of a formula before it is sized.

use bitflags::bitflags;

use crate::error::InvalidArgument;
use crate::types::{AtomType, Color, Unit};

bitflags! {
    /// Dimensions a phantom keeps from its content.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PhantomDims: u8 {
        const WIDTH = 0b001;
        const HEIGHT = 0b010;
        const DEPTH = 0b100;
    }
}

/// Named math spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpaceKind {
    Thin,
    Medium,
    Thick,
    NegativeThin,
    /// The interword space of the text font.
    Interword,
}

impl SpaceKind {
    /// Converts the codes of the predefined formula resource: 1 thin, 2 medium, 3 thick and
    /// -1 negative thin.
    pub fn from_code(code: i32) -> Result<SpaceKind, InvalidArgument> {
        match code {
            1 => Ok(SpaceKind::Thin),
            2 => Ok(SpaceKind::Medium),
            3 => Ok(SpaceKind::Thick),
            -1 => Ok(SpaceKind::NegativeThin),
            _ => Err(InvalidArgument::new("space kind", code)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinePosition {
    Over,
    Under,
}

/// Something placed above or below a base with a fixed gap.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub atom: Box<Atom>,
    pub unit: Unit,
    pub space: f32,
    /// Typeset in script style instead of the base's style.
    pub script_size: bool,
}

/// One node of a formula. Cloning an atom copies the whole subtree.
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    /// An alphanumeric character, optionally in a named text style such as `mathrm`.
    Char { c: char, text_style: Option<String> },
    Symbol {
        name: String,
        atom_type: AtomType,
        delimiter: bool,
    },
    Row(Vec<Atom>),
    Scripts {
        base: Box<Atom>,
        sub: Option<Box<Atom>>,
        sup: Option<Box<Atom>>,
    },
    /// `limits` of `None` places limits above and below in display style only.
    BigOperator {
        base: Box<Atom>,
        under: Option<Box<Atom>>,
        over: Option<Box<Atom>>,
        limits: Option<bool>,
    },
    Fraction {
        numerator: Box<Atom>,
        denominator: Box<Atom>,
        rule: bool,
    },
    NthRoot {
        base: Box<Atom>,
        index: Option<Box<Atom>>,
    },
    Accented { base: Box<Atom>, accent: String },
    /// Delimiters are symbol names; `None` leaves a null delimiter.
    Fenced {
        base: Box<Atom>,
        left: Option<String>,
        right: Option<String>,
    },
    UnderOver {
        base: Box<Atom>,
        over: Option<Attachment>,
        under: Option<Attachment>,
    },
    Line { base: Box<Atom>, position: LinePosition },
    Typed {
        base: Box<Atom>,
        left: AtomType,
        right: AtomType,
    },
    Space(SpaceKind),
    /// An invisible box of fixed size.
    Strut {
        unit: Unit,
        width: f32,
        height: f32,
        depth: f32,
    },
    Phantom { base: Box<Atom>, keep: PhantomDims },
    Color {
        base: Box<Atom>,
        foreground: Option<Color>,
        background: Option<Color>,
    },
    VCentered(Box<Atom>),
}

impl Default for Atom {
    fn default() -> Atom {
        Atom::empty()
    }
}

impl Atom {
    pub fn empty() -> Atom {
        Atom::Row(Vec::new())
    }

    pub fn char(c: char, text_style: Option<&str>) -> Atom {
        Atom::Char {
            c,
            text_style: text_style.map(str::to_string),
        }
    }

    pub fn is_empty(&self) -> bool {
        match *self {
            Atom::Row(ref atoms) => atoms.iter().all(Atom::is_empty),
            _ => false,
        }
    }

    /// Spaces do not take part in inter-atom glue.
    pub fn is_space(&self) -> bool {
        match *self {
            Atom::Space(_) | Atom::Strut { .. } => true,
            _ => false,
        }
    }

    /// The type the atom presents to its left neighbour.
    pub fn left_type(&self) -> AtomType {
        match *self {
            Atom::Symbol { atom_type, .. } => atom_type,
            Atom::Row(ref atoms) => atoms
                .iter()
                .find(|a| !a.is_space())
                .map_or(AtomType::Ordinary, Atom::left_type),
            Atom::Scripts { ref base, .. }
            | Atom::UnderOver { ref base, .. }
            | Atom::Phantom { ref base, .. }
            | Atom::Color { ref base, .. } => base.left_type(),
            Atom::BigOperator { .. } => AtomType::BigOperator,
            Atom::Fraction { .. } | Atom::Fenced { .. } => AtomType::Inner,
            Atom::Typed { left, .. } => left,
            Atom::Char { .. }
            | Atom::NthRoot { .. }
            | Atom::Accented { .. }
            | Atom::Line { .. }
            | Atom::Space(_)
            | Atom::Strut { .. }
            | Atom::VCentered(_) => AtomType::Ordinary,
        }
    }

    /// The type the atom presents to its right neighbour.
    pub fn right_type(&self) -> AtomType {
        match *self {
            Atom::Row(ref atoms) => atoms
                .iter()
                .rev()
                .find(|a| !a.is_space())
                .map_or(AtomType::Ordinary, Atom::right_type),
            Atom::Scripts { ref base, .. }
            | Atom::UnderOver { ref base, .. }
            | Atom::Phantom { ref base, .. }
            | Atom::Color { ref base, .. } => base.right_type(),
            Atom::Typed { right, .. } => right,
            _ => self.left_type(),
        }
    }

    /// Attaches scripts to the atom. Atoms ending in a big operator take them as limits, which
    /// keeps the limits setting of an operator that has none yet.
    pub fn with_scripts(self, sub: Option<Atom>, sup: Option<Atom>) -> Atom {
        if sub.is_none() && sup.is_none() {
            return self;
        }
        let (sub, sup) = (sub.map(Box::new), sup.map(Box::new));
        if self.right_type() != AtomType::BigOperator {
            return Atom::Scripts {
                base: Box::new(self),
                sub,
                sup,
            };
        }
        match self {
            Atom::BigOperator {
                base,
                under: None,
                over: None,
                limits,
            } => Atom::BigOperator {
                base,
                under: sub,
                over: sup,
                limits,
            },
            base => Atom::BigOperator {
                base: Box::new(base),
                under: sub,
                over: sup,
                limits: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(name: &str, atom_type: AtomType) -> Atom {
        Atom::Symbol {
            name: name.to_string(),
            atom_type,
            delimiter: false,
        }
    }

    #[test]
    fn row_types_come_from_its_ends() {
        let row = Atom::Row(vec![
            Atom::Space(SpaceKind::Thin),
            symbol("lbrack", AtomType::Opening),
            Atom::char('x', None),
            symbol("rbrack", AtomType::Closing),
            Atom::Space(SpaceKind::Thin),
        ]);
        assert_eq!(row.left_type(), AtomType::Opening);
        assert_eq!(row.right_type(), AtomType::Closing);
        assert_eq!(Atom::empty().left_type(), AtomType::Ordinary);
    }

    #[test]
    fn wrappers_are_transparent() {
        let typed = Atom::Typed {
            base: Box::new(Atom::char('x', None)),
            left: AtomType::Relation,
            right: AtomType::Punctuation,
        };
        let scripts = Atom::Scripts {
            base: Box::new(typed),
            sub: Some(Box::new(Atom::char('1', None))),
            sup: None,
        };
        assert_eq!(scripts.left_type(), AtomType::Relation);
        assert_eq!(scripts.right_type(), AtomType::Punctuation);
    }

    #[test]
    fn clones_are_independent() {
        let original = Atom::Row(vec![Atom::char('a', None)]);
        let mut copy = original.clone();
        if let Atom::Row(ref mut atoms) = copy {
            atoms.push(Atom::char('b', Some("mathrm")));
        }
        assert_eq!(original, Atom::Row(vec![Atom::char('a', None)]));
        assert_ne!(original, copy);
    }

    #[test]
    fn scripts_on_big_operators_become_limits() {
        let sum = symbol("sum", AtomType::BigOperator);
        let limited = Atom::BigOperator {
            base: Box::new(sum.clone()),
            under: None,
            over: None,
            limits: Some(false),
        };
        assert_eq!(
            limited.with_scripts(Some(Atom::char('i', None)), None),
            Atom::BigOperator {
                base: Box::new(sum.clone()),
                under: Some(Box::new(Atom::char('i', None))),
                over: None,
                limits: Some(false),
            }
        );
        match Atom::char('x', None).with_scripts(None, Some(Atom::char('2', None))) {
            Atom::Scripts { sub: None, sup: Some(_), .. } => {}
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(sum.clone().with_scripts(None, None), sum);
    }

    #[test]
    fn space_codes() {
        assert_eq!(SpaceKind::from_code(-1).unwrap(), SpaceKind::NegativeThin);
        assert!(SpaceKind::from_code(0).is_err());
    }
}
