//! Typesetting of TeX-like math markup.
//!
//! A [`TypesetContext`] holds the font metrics, glue rules, symbol tables and predefined formulas.
//! It is loaded once and shared by reference. Markup is parsed into a [`TeXFormula`], whose atom
//! tree is lowered into a tree of [`MathBox`]es that can be painted onto any [`Surface`].
//!
//! ```
//! use texmath_render::{TeXFormula, TeXStyle, TypesetContext};
//!
//! let ctx = TypesetContext::load().unwrap();
//! let formula = TeXFormula::parse(&ctx, r"\frac{a+b}{c}").unwrap();
//! let math_box = formula.create_box(&ctx, TeXStyle::Display, 20.0).unwrap();
//! assert!(math_box.width > 0.0);
//! ```

#![allow(unknown_lints)]

mod atom;
mod context;
mod error;
mod formula;
pub mod parser;
mod predefined;
pub mod resources;
mod symbols;
mod types;
pub mod typesetting;

pub use crate::atom::{Atom, Attachment, LinePosition, PhantomDims, SpaceKind};
pub use crate::context::TypesetContext;
pub use crate::error::{Error, InvalidArgument, LookupError, ResourceError, Result};
pub use crate::formula::TeXFormula;
pub use crate::parser::{ErrorType, ParsingError};
pub use crate::types::*;
pub use crate::typesetting::math_box::{MathBox, MathBoxContent, Surface};
pub use crate::typesetting::font::{Extension, GlyphRef, Metrics, SizedGlyph};
