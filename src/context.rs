
use std::collections::HashMap;

use log::debug;

use crate::atom::Atom;
use crate::error::{LookupError, Result};
use crate::formula::TeXFormula;
use crate::predefined;
use crate::resources::ResourceProvider;
use crate::symbols::{CharMaps, SymbolTable};
use crate::typesetting::{FontRegistry, GlueEngine, StyleEnvironment};
use crate::types::TeXStyle;

/// Everything needed to parse and typeset formulas: font metrics, glue rules, symbol tables and
/// the predefined formulas.
///
/// A context is immutable once loaded. Share it by reference between threads; each parse or
/// layout keeps its own state.
#[derive(Debug, Clone)]
pub struct TypesetContext {
    fonts: FontRegistry,
    glue: GlueEngine,
    symbols: SymbolTable,
    char_maps: CharMaps,
    pub(crate) formulas: HashMap<String, TeXFormula>,
}

impl TypesetContext {
    /// Loads the resources compiled into the library.
    #[cfg(feature = "embedded_resources")]
    pub fn load() -> Result<TypesetContext> {
        TypesetContext::load_from(&crate::resources::EmbeddedProvider)
    }

    pub fn load_from(provider: &dyn ResourceProvider) -> Result<TypesetContext> {
        let fonts = FontRegistry::load(provider)?;
        let glue = GlueEngine::load(provider)?;
        let symbols = SymbolTable::load(provider, &fonts)?;
        let char_maps = CharMaps::load(provider, &symbols)?;
        let mut ctx = TypesetContext {
            fonts,
            glue,
            symbols,
            char_maps,
            formulas: HashMap::new(),
        };
        predefined::load(provider, &mut ctx)?;
        debug!("typeset context ready with {} predefined formulas", ctx.formulas.len());
        Ok(ctx)
    }

    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    pub fn glue(&self) -> &GlueEngine {
        &self.glue
    }

    pub(crate) fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub(crate) fn char_maps(&self) -> &CharMaps {
        &self.char_maps
    }

    /// A fresh environment for laying out a formula at `size` pixels per em.
    pub fn environment(&self, style: TeXStyle, size: f32) -> StyleEnvironment {
        StyleEnvironment::new(style, &self.fonts, &self.glue, size)
    }

    pub fn parse(&self, markup: &str) -> Result<TeXFormula> {
        TeXFormula::parse(self, markup)
    }

    /// The atom of a named symbol such as `alpha` or `sum`.
    pub fn symbol(&self, name: &str) -> std::result::Result<Atom, LookupError> {
        self.symbols.atom(name)
    }

    /// A copy of a predefined formula.
    pub fn formula(&self, name: &str) -> std::result::Result<TeXFormula, LookupError> {
        self.formulas
            .get(name)
            .cloned()
            .ok_or_else(|| LookupError::FormulaNotFound(name.to_string()))
    }

    /// The atom a predefined formula contributes when used in markup.
    pub(crate) fn predefined_atom(&self, name: &str) -> Option<Atom> {
        self.formulas.get(name).map(TeXFormula::to_atom)
    }

    /// The symbol an ordinary character in markup stands for, if any.
    pub fn char_symbol(&self, c: char) -> Option<&str> {
        self.char_maps.symbol(c)
    }

    pub fn char_delimiter(&self, c: char) -> std::result::Result<&str, LookupError> {
        self.char_maps.delimiter(c)
    }
}
