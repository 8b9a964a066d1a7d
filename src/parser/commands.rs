//! Commands that take arguments instead of standing for a symbol.

/// Accent commands. Each places the symbol of the same name over its argument.
const ACCENTS: [&str; 10] = [
    "hat", "bar", "tilde", "vec", "dot", "ddot", "acute", "grave", "check", "breve",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `\frac{num}{den}`
    Frac,
    /// `\sqrt[index]{radicand}`, the index being optional.
    Sqrt,
    Overline,
    Underline,
    Phantom,
    Accent(&'static str),
}

impl Command {
    pub fn from_name(name: &str) -> Option<Command> {
        let command = match name {
            "frac" => Command::Frac,
            "sqrt" => Command::Sqrt,
            "overline" => Command::Overline,
            "underline" => Command::Underline,
            "phantom" => Command::Phantom,
            _ => return ACCENTS.iter().find(|&&a| a == name).map(|&a| Command::Accent(a)),
        };
        Some(command)
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::Frac => "frac",
            Command::Sqrt => "sqrt",
            Command::Overline => "overline",
            Command::Underline => "underline",
            Command::Phantom => "phantom",
            Command::Accent(name) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for name in &["frac", "sqrt", "overline", "underline", "phantom", "vec", "breve"] {
            assert_eq!(Command::from_name(name).map(Command::name), Some(*name));
        }
        assert_eq!(Command::from_name("hat"), Some(Command::Accent("hat")));
        assert_eq!(Command::from_name("alpha"), None);
        assert_eq!(Command::from_name("doteq"), None);
    }
}
