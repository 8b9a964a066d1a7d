use thiserror::Error;

use crate::parser::ParsingError;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading the resource tables. They are fatal for context creation.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("{resource}: malformed XML: {source}")]
    Xml {
        resource: String,
        #[source]
        source: quick_xml::Error,
    },
    #[error("{resource}: cannot be read: {source}")]
    Io {
        resource: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{resource}: resource is not available")]
    NotFound { resource: String },
    #[error("{resource}: element <{element}> lacks attribute \"{attribute}\"")]
    MissingAttribute {
        resource: String,
        element: String,
        attribute: String,
    },
    #[error("{resource}: required element <{element}> is missing")]
    MissingElement { resource: String, element: String },
    #[error("{resource}: attribute \"{attribute}\" has invalid value \"{value}\"")]
    InvalidNumber {
        resource: String,
        attribute: String,
        value: String,
    },
    #[error("{resource}: font id {id} is not defined")]
    UnknownFontId { resource: String, id: u32 },
    #[error("{resource}: font {font} has no character {code}")]
    UnknownCharacter { resource: String, font: u32, code: u16 },
    #[error("{resource}: unknown {kind} \"{name}\"")]
    UnknownName {
        resource: String,
        kind: &'static str,
        name: String,
    },
    #[error("{resource}: no default text style mapping for {range}")]
    MissingDefaultMapping { resource: String, range: String },
    #[error("predefined formula \"{formula}\": {reason}")]
    InvalidRecipe { formula: String, reason: String },
    #[error("predefined formula \"{formula}\" failed to build: {source}")]
    RecipeFailed {
        formula: String,
        #[source]
        source: Box<Error>,
    },
}

/// A name could not be resolved against the loaded tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no symbol named \"{0}\"")]
    SymbolMappingNotFound(String),
    #[error("no text style named \"{0}\"")]
    TextStyleMappingNotFound(String),
    #[error("no predefined formula named \"{0}\"")]
    FormulaNotFound(String),
    #[error("no delimiter mapped to {0:?}")]
    DelimiterMappingNotFound(char),
    #[error("{0:?} is not an alphanumeric character")]
    CharacterNotAlphanumeric(char),
}

/// An out of range code was passed while composing a formula.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {what}: {value}")]
pub struct InvalidArgument {
    pub what: &'static str,
    pub value: String,
}

impl InvalidArgument {
    pub fn new<V: ToString>(what: &'static str, value: V) -> Self {
        InvalidArgument {
            what,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Parsing(#[from] ParsingError),
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
}
