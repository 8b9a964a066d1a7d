
use std::fmt;

use crate::error::LookupError;

pub type Result<T> = std::result::Result<T, ParsingError>;

/// Malformed markup. `position` is the character index the problem was found at.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsingError {
    pub position: Option<usize>,
    pub error_type: ErrorType,
}

impl ParsingError {
    pub fn at(position: usize, error_type: ErrorType) -> ParsingError {
        ParsingError {
            position: Some(position),
            error_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorType {
    /// A group opened with the given character is never closed.
    UnbalancedGroup(char),
    /// A command expected a `{...}` group.
    MissingGroup(String),
    StrayCloseGroup,
    /// A backslash at the end of the input.
    DanglingEscape,
    LonelyScript(char),
    DoubleScript(char),
    MissingScript(char),
    UnknownCommand(String),
    UnknownCharacter(char),
    /// A command operand that must not be empty.
    EmptyOperand(String),
    Lookup(LookupError),
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.error_type {
            ErrorType::UnbalancedGroup(open) => write!(f, "Unbalanced group: \"{}\" is never closed", open),
            ErrorType::MissingGroup(ref command) => write!(f, "\\{} expects a group", command),
            ErrorType::StrayCloseGroup => write!(f, "Unexpected \"}}\" without an open group"),
            ErrorType::DanglingEscape => write!(f, "Dangling escape character at end of input"),
            ErrorType::LonelyScript(c) => write!(f, "Script \"{}\" has nothing to attach to", c),
            ErrorType::DoubleScript(c) => write!(f, "Double script \"{}\"", c),
            ErrorType::MissingScript(c) => write!(f, "Missing argument for script \"{}\"", c),
            ErrorType::UnknownCommand(ref name) => write!(f, "Unknown command \"\\{}\"", name),
            ErrorType::UnknownCharacter(c) => write!(f, "Unknown character \"{}\"", c),
            ErrorType::EmptyOperand(ref command) => write!(f, "Empty operand for \\{}", command),
            ErrorType::Lookup(ref error) => write!(f, "{}", error),
        }?;
        if let Some(position) = self.position {
            write!(f, " (at {})", position)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParsingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.error_type {
            ErrorType::Lookup(ref error) => Some(error),
            _ => None,
        }
    }
}

impl From<LookupError> for ParsingError {
    fn from(error: LookupError) -> ParsingError {
        ParsingError {
            position: None,
            error_type: ErrorType::Lookup(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_fragment() {
        let error = ParsingError::at(3, ErrorType::UnknownCommand("notacommand".to_string()));
        assert_eq!(error.to_string(), "Unknown command \"\\notacommand\" (at 3)");

        let error: ParsingError = LookupError::SymbolMappingNotFound("foo".to_string()).into();
        assert_eq!(error.to_string(), "no symbol named \"foo\"");
        assert!(std::error::Error::source(&error).is_some());
    }
}
