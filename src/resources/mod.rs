//! Access to the XML documents that describe fonts, glue, symbols and predefined formulas.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ResourceError;

pub mod xml_reader;

pub use self::xml_reader::Element;

pub const DEFAULT_FONT: &str = "default_font.xml";
pub const SYMBOLS: &str = "symbols.xml";
pub const GLUE: &str = "glue.xml";
pub const CHAR_MAP: &str = "char_map.xml";
pub const FORMULAS: &str = "formulas.xml";

/// A source of resource documents, addressed by relative path (`fonts/cmr10.xml`).
pub trait ResourceProvider {
    fn read(&self, name: &str) -> Result<Cow<'_, str>, ResourceError>;

    fn parse(&self, name: &str) -> Result<Element, ResourceError> {
        let text = self.read(name)?;
        xml_reader::parse_document(name, &text)
    }
}

/// Reads resources from a directory laid out like the crate's `resources/` folder.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
}

impl DirectoryProvider {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        DirectoryProvider {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl ResourceProvider for DirectoryProvider {
    fn read(&self, name: &str) -> Result<Cow<'_, str>, ResourceError> {
        let path = self.root.join(name);
        fs::read_to_string(&path)
            .map(Cow::Owned)
            .map_err(|source| ResourceError::Io {
                resource: path.display().to_string(),
                source,
            })
    }
}

/// Serves the copies of the resources compiled into the library.
#[cfg(feature = "embedded_resources")]
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedProvider;

#[cfg(feature = "embedded_resources")]
macro_rules! embedded {
    ( $name:expr, $( $file:literal ),* ) => {
        match $name {
            $( $file => Some(include_str!(concat!("../../resources/", $file))), )*
            _ => None,
        }
    };
}

#[cfg(feature = "embedded_resources")]
impl ResourceProvider for EmbeddedProvider {
    fn read(&self, name: &str) -> Result<Cow<'_, str>, ResourceError> {
        let text = embedded!(
            name,
            "default_font.xml",
            "symbols.xml",
            "glue.xml",
            "char_map.xml",
            "formulas.xml",
            "fonts/cmr10.xml",
            "fonts/cmmi10.xml",
            "fonts/cmsy10.xml",
            "fonts/cmex10.xml"
        );
        text.map(Cow::Borrowed).ok_or_else(|| ResourceError::NotFound {
            resource: name.to_string(),
        })
    }
}

#[cfg(all(test, feature = "embedded_resources"))]
mod tests {
    use super::*;

    #[test]
    fn embedded_documents_parse() {
        for name in &[DEFAULT_FONT, SYMBOLS, GLUE, CHAR_MAP, FORMULAS, "fonts/cmex10.xml"] {
            let doc = EmbeddedProvider.parse(name).unwrap();
            assert!(!doc.children.is_empty(), "{} is empty", name);
        }
        assert!(EmbeddedProvider.read("fonts/missing.xml").is_err());
    }

    #[test]
    fn directory_provider_reads_the_same_files() {
        let dir = DirectoryProvider::new(concat!(env!("CARGO_MANIFEST_DIR"), "/resources"));
        assert_eq!(dir.read(GLUE).unwrap(), EmbeddedProvider.read(GLUE).unwrap());
        match dir.read("nope.xml") {
            Err(ResourceError::Io { .. }) => {}
            other => panic!("unexpected {:?}", other.map(|s| s.len())),
        }
    }
}
