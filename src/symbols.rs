//! Symbol types and the character to symbol tables used by the parser.

use std::collections::HashMap;

use log::debug;

use crate::atom::Atom;
use crate::error::{LookupError, ResourceError};
use crate::resources::{self, Element, ResourceProvider};
use crate::typesetting::FontRegistry;
use crate::types::AtomType;

/// Number of character codes covered by the character maps.
const CHAR_MAP_SIZE: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolInfo {
    pub atom_type: AtomType,
    pub delimiter: bool,
}

/// Atom types and delimiter flags of every named symbol.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, SymbolInfo>,
}

impl SymbolTable {
    /// Loads the symbol types. Every symbol must have a glyph in `fonts`.
    pub fn load(provider: &dyn ResourceProvider, fonts: &FontRegistry) -> Result<SymbolTable, ResourceError> {
        let resource = resources::SYMBOLS;
        let doc = provider.parse(resource)?;

        let mut symbols = HashMap::new();
        for symbol in doc.children_named("Symbol") {
            let name = symbol.required_attr(resource, "name")?;
            let type_name = symbol.required_attr(resource, "type")?;
            let atom_type = AtomType::from_name(type_name).ok_or_else(|| ResourceError::UnknownName {
                resource: resource.to_string(),
                kind: "atom type",
                name: type_name.to_string(),
            })?;
            if fonts.symbol_glyph(name).is_none() {
                return Err(ResourceError::UnknownName {
                    resource: resource.to_string(),
                    kind: "symbol mapping",
                    name: name.to_string(),
                });
            }
            let delimiter = symbol.parse_attr(resource, "del")?.unwrap_or(false);
            symbols.insert(name.to_string(), SymbolInfo { atom_type, delimiter });
        }

        debug!("loaded {} symbols", symbols.len());
        Ok(SymbolTable { symbols })
    }

    pub fn get(&self, name: &str) -> Option<SymbolInfo> {
        self.symbols.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Creates the atom for a named symbol.
    pub fn atom(&self, name: &str) -> Result<Atom, LookupError> {
        self.get(name)
            .map(|info| Atom::Symbol {
                name: name.to_string(),
                atom_type: info.atom_type,
                delimiter: info.delimiter,
            })
            .ok_or_else(|| LookupError::SymbolMappingNotFound(name.to_string()))
    }
}

/// Maps single characters to symbol names, in text and as delimiters.
#[derive(Debug, Clone)]
pub struct CharMaps {
    symbols: Vec<Option<String>>,
    delimiters: Vec<Option<String>>,
}

impl CharMaps {
    pub fn load(provider: &dyn ResourceProvider, symbols: &SymbolTable) -> Result<CharMaps, ResourceError> {
        let resource = resources::CHAR_MAP;
        let doc = provider.parse(resource)?;
        let maps = CharMaps {
            symbols: load_map(
                resource,
                doc.required_child(resource, "CharacterToSymbolMappings")?,
                symbols,
            )?,
            delimiters: load_map(
                resource,
                doc.required_child(resource, "CharacterToDelimiterMappings")?,
                symbols,
            )?,
        };
        debug!(
            "loaded {} character and {} delimiter mappings",
            maps.symbols.iter().flatten().count(),
            maps.delimiters.iter().flatten().count()
        );
        Ok(maps)
    }

    /// The symbol an ordinary character in markup stands for.
    pub fn symbol(&self, c: char) -> Option<&str> {
        lookup(&self.symbols, c)
    }

    /// The delimiter symbol used when `c` fences a formula.
    pub fn delimiter(&self, c: char) -> Result<&str, LookupError> {
        lookup(&self.delimiters, c).ok_or(LookupError::DelimiterMappingNotFound(c))
    }
}

fn lookup(map: &[Option<String>], c: char) -> Option<&str> {
    map.get(c as usize).and_then(|name| name.as_ref().map(String::as_str))
}

fn load_map(
    resource: &str,
    element: &Element,
    symbols: &SymbolTable,
) -> Result<Vec<Option<String>>, ResourceError> {
    let mut map = vec![None; CHAR_MAP_SIZE];
    for entry in element.children_named("Map") {
        let chars = entry.required_attr(resource, "char")?;
        let c = single_char(chars).ok_or_else(|| ResourceError::InvalidNumber {
            resource: resource.to_string(),
            attribute: "char".to_string(),
            value: chars.to_string(),
        })?;
        let name = entry.required_attr(resource, "symbol")?;
        if !symbols.contains(name) {
            return Err(ResourceError::UnknownName {
                resource: resource.to_string(),
                kind: "symbol",
                name: name.to_string(),
            });
        }
        map[c as usize] = Some(name.to_string());
    }
    Ok(map)
}

/// The character of a one character string within the map's range.
fn single_char(value: &str) -> Option<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if (c as usize) < CHAR_MAP_SIZE => Some(c),
        _ => None,
    }
}

#[cfg(all(test, feature = "embedded_resources"))]
mod tests {
    use super::*;
    use crate::resources::EmbeddedProvider;

    fn tables() -> (SymbolTable, CharMaps) {
        let fonts = FontRegistry::load(&EmbeddedProvider).unwrap();
        let symbols = SymbolTable::load(&EmbeddedProvider, &fonts).unwrap();
        let maps = CharMaps::load(&EmbeddedProvider, &symbols).unwrap();
        (symbols, maps)
    }

    #[test]
    fn symbols_carry_types_and_delimiter_flags() {
        let (symbols, _) = tables();
        assert_eq!(
            symbols.get("sum"),
            Some(SymbolInfo {
                atom_type: AtomType::BigOperator,
                delimiter: false
            })
        );
        assert!(symbols.get("lbrace").unwrap().delimiter);
        assert_eq!(symbols.get("hat").unwrap().atom_type, AtomType::Accent);
        assert_eq!(
            symbols.atom("nosuchsymbol"),
            Err(LookupError::SymbolMappingNotFound("nosuchsymbol".to_string()))
        );
    }

    #[test]
    fn characters_map_to_symbols_and_delimiters() {
        let (_, maps) = tables();
        assert_eq!(maps.symbol('+'), Some("plus"));
        assert_eq!(maps.symbol('<'), Some("lt"));
        assert_eq!(maps.symbol('a'), None);
        assert_eq!(maps.symbol('é'), None);
        assert_eq!(maps.delimiter('{'), Ok("lbrace"));
        assert_eq!(maps.delimiter('#'), Err(LookupError::DelimiterMappingNotFound('#')));
    }

    #[test]
    fn map_entries_must_be_single_characters() {
        assert_eq!(single_char("x"), Some('x'));
        assert_eq!(single_char("xy"), None);
        assert_eq!(single_char(""), None);
        assert_eq!(single_char("\u{2200}"), None);
    }
}
