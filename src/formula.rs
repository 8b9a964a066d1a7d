//! A mutable formula builder on top of the atom tree.

use crate::atom::{Atom, Attachment, LinePosition, PhantomDims, SpaceKind};
use crate::context::TypesetContext;
use crate::error::{InvalidArgument, Result};
use crate::parser;
use crate::typesetting::math_box::MathBox;
use crate::typesetting::MathBoxLayout;
use crate::types::{AtomType, Color, TeXStyle, Unit};

/// A formula under construction.
///
/// Atoms added one after another form a row. Formulas added to other formulas are copied,
/// so the two stay independent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeXFormula {
    root: Option<Atom>,
    /// Whether `root` is a row built by `add`, which further atoms extend.
    open_row: bool,
}

impl TeXFormula {
    pub fn new() -> TeXFormula {
        TeXFormula::default()
    }

    pub fn from_atom(atom: Atom) -> TeXFormula {
        TeXFormula {
            root: Some(atom),
            open_row: false,
        }
    }

    pub fn parse(ctx: &TypesetContext, markup: &str) -> Result<TeXFormula> {
        let mut formula = TeXFormula::new();
        for atom in parser::parse(ctx, markup)? {
            formula.add(atom);
        }
        Ok(formula)
    }

    /// Parses `markup` with every character in the named text style, e.g. `mathrm`.
    pub fn parse_with_style(ctx: &TypesetContext, markup: &str, text_style: &str) -> Result<TeXFormula> {
        let mut formula = TeXFormula::new();
        for atom in parser::parse_with_text_style(ctx, markup, text_style)? {
            formula.add(atom);
        }
        Ok(formula)
    }

    pub fn root(&self) -> Option<&Atom> {
        self.root.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.root.as_ref().map_or(true, Atom::is_empty)
    }

    /// A copy of the formula as a single atom.
    pub fn to_atom(&self) -> Atom {
        self.root.clone().unwrap_or_default()
    }

    pub fn into_atom(self) -> Atom {
        self.root.unwrap_or_default()
    }

    /// Takes the root for wrapping; the formula is left empty.
    fn take_root(&mut self) -> Atom {
        self.open_row = false;
        self.root.take().unwrap_or_default()
    }

    fn set_root(&mut self, atom: Atom) -> &mut Self {
        self.root = Some(atom);
        self.open_row = false;
        self
    }

    pub fn add(&mut self, atom: Atom) -> &mut Self {
        match self.root.take() {
            None => {
                self.root = Some(atom);
                self.open_row = false;
            }
            Some(Atom::Row(mut atoms)) if self.open_row => {
                atoms.push(atom);
                self.root = Some(Atom::Row(atoms));
            }
            Some(root) => {
                self.root = Some(Atom::Row(vec![root, atom]));
                self.open_row = true;
            }
        }
        self
    }

    /// Appends a copy of `formula` as one atom.
    pub fn add_formula(&mut self, formula: &TeXFormula) -> &mut Self {
        match formula.root {
            Some(ref root) => self.add(root.clone()),
            None => self,
        }
    }

    /// Parses `markup` and appends it as one group.
    pub fn add_markup(&mut self, ctx: &TypesetContext, markup: &str) -> Result<&mut Self> {
        let atoms = parser::parse(ctx, markup)?;
        Ok(self.add(parser::into_atom(atoms)))
    }

    pub fn add_space(&mut self, kind: SpaceKind) -> &mut Self {
        self.add(Atom::Space(kind))
    }

    pub fn add_strut(&mut self, unit: Unit, width: f32, height: f32, depth: f32) -> &mut Self {
        self.add(Atom::Strut {
            unit,
            width,
            height,
            depth,
        })
    }

    pub fn set_type(&mut self, atom_type: AtomType) -> &mut Self {
        self.set_types(atom_type, atom_type)
    }

    /// Overrides the types the formula presents to its neighbours.
    pub fn set_types(&mut self, left: AtomType, right: AtomType) -> &mut Self {
        let base = Box::new(self.take_root());
        self.set_root(Atom::Typed { base, left, right })
    }

    /// Fixes whether scripts attached to the formula go above and below it.
    pub fn set_limits(&mut self, limits: bool) -> &mut Self {
        let atom = match self.take_root() {
            Atom::BigOperator {
                base, under, over, ..
            } => Atom::BigOperator {
                base,
                under,
                over,
                limits: Some(limits),
            },
            base => Atom::BigOperator {
                base: Box::new(base),
                under: None,
                over: None,
                limits: Some(limits),
            },
        };
        self.set_root(atom)
    }

    /// Makes the formula the numerator of a fraction over a copy of `denominator`.
    pub fn fraction(&mut self, denominator: &TeXFormula, rule: bool) -> &mut Self {
        let numerator = Box::new(self.take_root());
        self.set_root(Atom::Fraction {
            numerator,
            denominator: Box::new(denominator.to_atom()),
            rule,
        })
    }

    pub fn sqrt(&mut self) -> &mut Self {
        let base = Box::new(self.take_root());
        self.set_root(Atom::NthRoot { base, index: None })
    }

    pub fn nth_root(&mut self, index: &TeXFormula) -> &mut Self {
        let base = Box::new(self.take_root());
        self.set_root(Atom::NthRoot {
            base,
            index: Some(Box::new(index.to_atom())),
        })
    }

    /// Attaches copies of the scripts to the formula.
    pub fn scripts(&mut self, sub: Option<&TeXFormula>, sup: Option<&TeXFormula>) -> &mut Self {
        let base = self.take_root();
        self.set_root(base.with_scripts(sub.map(TeXFormula::to_atom), sup.map(TeXFormula::to_atom)))
    }

    /// Surrounds the formula with the delimiters mapped to `left` and `right`.
    pub fn embrace(&mut self, ctx: &TypesetContext, left: char, right: char) -> Result<&mut Self> {
        let left = ctx.char_delimiter(left)?.to_string();
        let right = ctx.char_delimiter(right)?.to_string();
        self.fence(ctx, Some(&left), Some(&right))
    }

    /// Surrounds the formula with named delimiter symbols. `None` leaves a null delimiter.
    pub fn fence(
        &mut self,
        ctx: &TypesetContext,
        left: Option<&str>,
        right: Option<&str>,
    ) -> Result<&mut Self> {
        for name in left.iter().chain(right.iter()) {
            match ctx.symbol(name)? {
                Atom::Symbol {
                    delimiter: true, ..
                } => {}
                _ => return Err(InvalidArgument::new("delimiter", name).into()),
            }
        }
        let base = Box::new(self.take_root());
        Ok(self.set_root(Atom::Fenced {
            base,
            left: left.map(str::to_string),
            right: right.map(str::to_string),
        }))
    }

    pub fn set_color(&mut self, color: Color) -> &mut Self {
        self.recolor(Some(color), None)
    }

    pub fn set_background(&mut self, color: Color) -> &mut Self {
        self.recolor(None, Some(color))
    }

    fn recolor(&mut self, fg: Option<Color>, bg: Option<Color>) -> &mut Self {
        let atom = match self.take_root() {
            Atom::Color {
                base,
                foreground,
                background,
            } => Atom::Color {
                base,
                foreground: fg.or(foreground),
                background: bg.or(background),
            },
            base => Atom::Color {
                base: Box::new(base),
                foreground: fg,
                background: bg,
            },
        };
        self.set_root(atom)
    }

    /// Makes the formula invisible, keeping the selected dimensions.
    pub fn phantom(&mut self, keep: PhantomDims) -> &mut Self {
        let base = Box::new(self.take_root());
        self.set_root(Atom::Phantom { base, keep })
    }

    /// Centres the formula on the math axis.
    pub fn vcenter(&mut self) -> &mut Self {
        let base = Box::new(self.take_root());
        self.set_root(Atom::VCentered(base))
    }

    pub fn overline(&mut self) -> &mut Self {
        self.line(LinePosition::Over)
    }

    pub fn underline(&mut self) -> &mut Self {
        self.line(LinePosition::Under)
    }

    fn line(&mut self, position: LinePosition) -> &mut Self {
        let base = Box::new(self.take_root());
        self.set_root(Atom::Line { base, position })
    }

    /// Places the accent symbol `name` over the formula.
    pub fn accent(&mut self, ctx: &TypesetContext, name: &str) -> Result<&mut Self> {
        match ctx.symbol(name)? {
            Atom::Symbol {
                atom_type: AtomType::Accent,
                ..
            } => {}
            _ => return Err(InvalidArgument::new("accent", name).into()),
        }
        let base = Box::new(self.take_root());
        Ok(self.set_root(Atom::Accented {
            base,
            accent: name.to_string(),
        }))
    }

    /// Puts a copy of `formula` above this one, `space` units apart.
    pub fn put_over(&mut self, formula: &TeXFormula, unit: Unit, space: f32, script_size: bool) -> &mut Self {
        let attachment = Attachment {
            atom: Box::new(formula.to_atom()),
            unit,
            space,
            script_size,
        };
        self.attach(Some(attachment), None)
    }

    pub fn put_under(&mut self, formula: &TeXFormula, unit: Unit, space: f32, script_size: bool) -> &mut Self {
        let attachment = Attachment {
            atom: Box::new(formula.to_atom()),
            unit,
            space,
            script_size,
        };
        self.attach(None, Some(attachment))
    }

    fn attach(&mut self, new_over: Option<Attachment>, new_under: Option<Attachment>) -> &mut Self {
        let atom = match self.take_root() {
            Atom::UnderOver { base, over, under } => Atom::UnderOver {
                base,
                over: new_over.or(over),
                under: new_under.or(under),
            },
            base => Atom::UnderOver {
                base: Box::new(base),
                over: new_over,
                under: new_under,
            },
        };
        self.set_root(atom)
    }

    /// Lays the formula out at `size` pixels per em.
    pub fn create_box(&self, ctx: &TypesetContext, style: TeXStyle, size: f32) -> Result<MathBox> {
        let env = ctx.environment(style, size);
        let math_box = match self.root {
            Some(ref root) => root.layout(&env)?,
            None => MathBox::default(),
        };
        Ok(math_box)
    }
}

impl From<Atom> for TeXFormula {
    fn from(atom: Atom) -> TeXFormula {
        TeXFormula::from_atom(atom)
    }
}
