//! Recursive descent parser turning markup into an atom tree.
//!
//! The parser owns its cursor. Tables are read from a shared [`TypesetContext`], so any
//! number of parsers may run concurrently.

mod commands;
mod error;

use log::trace;

use self::commands::Command;
pub use self::error::{ErrorType, ParsingError, Result};
use crate::atom::{Atom, LinePosition, PhantomDims, SpaceKind};
use crate::context::TypesetContext;
use crate::types::CharRange;

/// Parses `markup` into the list of atoms at its top level.
pub fn parse(ctx: &TypesetContext, markup: &str) -> Result<Vec<Atom>> {
    TeXParser::new(ctx, markup, None).parse_atoms()
}

/// Parses `markup` with all characters in the given text style.
pub fn parse_with_text_style(ctx: &TypesetContext, markup: &str, text_style: &str) -> Result<Vec<Atom>> {
    if !ctx.fonts().has_text_style(text_style) {
        return Err(crate::error::LookupError::TextStyleMappingNotFound(text_style.to_string()).into());
    }
    TeXParser::new(ctx, markup, Some(text_style.to_string())).parse_atoms()
}

/// Collapses a parsed list into one atom: nothing, the single atom or a row.
pub fn into_atom(mut atoms: Vec<Atom>) -> Atom {
    if atoms.len() == 1 {
        atoms.remove(0)
    } else {
        Atom::Row(atoms)
    }
}

fn is_terminator(c: char) -> bool {
    c.is_whitespace() || c == '\\' || c == '_' || c == '^'
}

pub struct TeXParser<'a> {
    ctx: &'a TypesetContext,
    chars: Vec<char>,
    pos: usize,
    /// Position of `chars[0]` in the outermost markup.
    offset: usize,
    text_style: Option<String>,
}

impl<'a> TeXParser<'a> {
    pub fn new(ctx: &'a TypesetContext, markup: &str, text_style: Option<String>) -> TeXParser<'a> {
        TeXParser {
            ctx,
            chars: markup.chars().collect(),
            pos: 0,
            offset: 0,
            text_style,
        }
    }

    fn error(&self, error_type: ErrorType) -> ParsingError {
        ParsingError::at(self.offset + self.pos, error_type)
    }

    fn error_at(&self, pos: usize, error_type: ErrorType) -> ParsingError {
        ParsingError::at(self.offset + pos, error_type)
    }

    fn lookup<T>(&self, result: std::result::Result<T, crate::error::LookupError>) -> Result<T> {
        result.map_err(|e| self.error(ErrorType::Lookup(e)))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).cloned()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, char::is_whitespace) {
            self.pos += 1;
        }
    }

    pub fn parse_atoms(&mut self) -> Result<Vec<Atom>> {
        let mut atoms = Vec::new();
        while let Some(c) = self.peek() {
            let atom = match c {
                c if c.is_whitespace() => {
                    self.pos += 1;
                    continue;
                }
                '\\' => self.parse_escape()?,
                '{' => {
                    let (start, end) = self.get_group('{', '}')?;
                    into_atom(self.sub_parser(start, end, self.text_style.clone()).parse_atoms()?)
                }
                '}' => return Err(self.error(ErrorType::StrayCloseGroup)),
                '^' | '_' | '\'' => return Err(self.error(ErrorType::LonelyScript(c))),
                c => {
                    self.pos += 1;
                    self.convert_char(c)?
                }
            };
            atoms.push(self.attach_scripts(atom)?);
        }
        Ok(atoms)
    }

    /// A parser for `chars[start..end]` that reports positions in this parser's coordinates.
    fn sub_parser(&self, start: usize, end: usize, text_style: Option<String>) -> TeXParser<'a> {
        TeXParser {
            ctx: self.ctx,
            chars: self.chars[start..end].to_vec(),
            pos: 0,
            offset: self.offset + start,
            text_style,
        }
    }

    /// Reads a balanced group starting at the cursor and returns the range of its contents.
    fn get_group(&mut self, open: char, close: char) -> Result<(usize, usize)> {
        let start = self.pos;
        if self.peek() != Some(open) {
            return Err(self.error(ErrorType::UnbalancedGroup(open)));
        }
        let mut depth = 0;
        for (i, &c) in self.chars[start..].iter().enumerate() {
            if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    let end = start + i;
                    self.pos = end + 1;
                    return Ok((start + 1, end));
                }
            }
        }
        Err(self.error_at(start, ErrorType::UnbalancedGroup(open)))
    }

    fn convert_char(&self, c: char) -> Result<Atom> {
        if CharRange::classify(c).is_some() {
            return Ok(Atom::char(c, self.text_style.as_ref().map(String::as_str)));
        }
        match self.ctx.char_maps().symbol(c) {
            Some(name) => self.lookup(self.ctx.symbols().atom(name)),
            None => Err(self.error_at(self.pos.saturating_sub(1), ErrorType::UnknownCharacter(c))),
        }
    }

    fn symbol_atom(&self, name: &str) -> Option<Atom> {
        self.ctx.symbols().atom(name).ok()
    }

    /// Resolves the escape sequence at the cursor.
    ///
    /// A control word ends at the first non-letter. Commands and text styles take precedence
    /// over symbols and predefined formulas, except that a name directly followed by a
    /// terminator resolves as a symbol first when it is not a command.
    fn parse_escape(&mut self) -> Result<Atom> {
        let escape = self.pos;
        let name_start = escape + 1;
        let first = match self.chars.get(name_start) {
            Some(&c) => c,
            None => return Err(self.error(ErrorType::DanglingEscape)),
        };
        if is_terminator(first) {
            return Err(self.error(ErrorType::UnknownCommand(first.to_string())));
        }
        if !first.is_ascii_alphabetic() {
            // a control symbol such as `\,` is exactly one character long
            let name = first.to_string();
            self.pos = name_start + 1;
            return match self.resolve_name(&name) {
                Some(atom) => Ok(atom),
                None => Err(self.error_at(escape, ErrorType::UnknownCommand(name))),
            };
        }

        // a control word is the run of letters after the backslash
        let end = self.chars[name_start..]
            .iter()
            .position(|c| !c.is_ascii_alphabetic())
            .map_or(self.chars.len(), |len| name_start + len);
        let name: String = self.chars[name_start..end].iter().collect();
        if self.chars.get(end).cloned().map_or(true, is_terminator) {
            if let Some(atom) = self.commit_name(&name, end)? {
                return Ok(atom);
            }
        } else {
            if let Some(atom) = self.commit_structural(&name, end)? {
                return Ok(atom);
            }
            if let Some(atom) = self.resolve_name(&name) {
                trace!("escape resolved to \"{}\"", name);
                self.pos = end;
                return Ok(atom);
            }
        }
        Err(self.error_at(escape, ErrorType::UnknownCommand(name)))
    }

    /// Looks a complete name up as a symbol, then as a predefined formula.
    fn resolve_name(&self, name: &str) -> Option<Atom> {
        self.symbol_atom(name)
            .or_else(|| self.ctx.predefined_atom(name))
    }

    /// Resolves a name ending at a terminator. Commands take precedence over symbols sharing
    /// their name, so `\sqrt x` and `\hat a` build radicals and accents.
    fn commit_name(&mut self, name: &str, end: usize) -> Result<Option<Atom>> {
        if Command::from_name(name).is_none() {
            if let Some(atom) = self.resolve_name(name) {
                trace!("escape \"{}\" resolved at terminator", name);
                self.pos = end;
                return Ok(Some(atom));
            }
        }
        self.commit_structural(name, end)
    }

    /// Handles `nbsp`, text styles and commands with arguments.
    fn commit_structural(&mut self, name: &str, end: usize) -> Result<Option<Atom>> {
        if name == "nbsp" {
            self.pos = end;
            return Ok(Some(Atom::Space(SpaceKind::Interword)));
        }
        if self.ctx.fonts().has_text_style(name) {
            self.pos = end;
            return self.parse_text_style(name).map(Some);
        }
        if let Some(command) = Command::from_name(name) {
            self.pos = end;
            return self.parse_command(command).map(Some);
        }
        Ok(None)
    }

    fn parse_text_style(&mut self, text_style: &str) -> Result<Atom> {
        self.skip_whitespace();
        if self.peek() != Some('{') {
            return Err(self.error(ErrorType::MissingGroup(text_style.to_string())));
        }
        let (start, end) = self.get_group('{', '}')?;
        let atoms = self
            .sub_parser(start, end, Some(text_style.to_string()))
            .parse_atoms()?;
        Ok(into_atom(atoms))
    }

    /// Reads one argument: a group, an escape sequence or a single character.
    fn parse_argument(&mut self, command: &str) -> Result<Atom> {
        self.skip_whitespace();
        match self.peek() {
            None | Some('^') | Some('_') | Some('\'') => {
                Err(self.error(ErrorType::MissingGroup(command.to_string())))
            }
            Some('{') => {
                let (start, end) = self.get_group('{', '}')?;
                let atoms = self
                    .sub_parser(start, end, self.text_style.clone())
                    .parse_atoms()?;
                Ok(into_atom(atoms))
            }
            Some('}') => Err(self.error(ErrorType::StrayCloseGroup)),
            Some('\\') => self.parse_escape(),
            Some(c) => {
                self.pos += 1;
                self.convert_char(c)
            }
        }
    }

    fn parse_operand(&mut self, command: &str) -> Result<Box<Atom>> {
        let start = self.pos;
        let atom = self.parse_argument(command)?;
        if atom.is_empty() {
            return Err(self.error_at(start, ErrorType::EmptyOperand(command.to_string())));
        }
        Ok(Box::new(atom))
    }

    fn parse_command(&mut self, command: Command) -> Result<Atom> {
        let name = command.name();
        let atom = match command {
            Command::Frac => Atom::Fraction {
                numerator: self.parse_operand(name)?,
                denominator: self.parse_operand(name)?,
                rule: true,
            },
            Command::Sqrt => {
                self.skip_whitespace();
                let index = if self.peek() == Some('[') {
                    let (start, end) = self.get_group('[', ']')?;
                    let atoms = self
                        .sub_parser(start, end, self.text_style.clone())
                        .parse_atoms()?;
                    Some(Box::new(into_atom(atoms)))
                } else {
                    None
                };
                Atom::NthRoot {
                    base: Box::new(self.parse_argument(name)?),
                    index,
                }
            }
            Command::Overline | Command::Underline => Atom::Line {
                base: Box::new(self.parse_argument(name)?),
                position: if command == Command::Overline {
                    LinePosition::Over
                } else {
                    LinePosition::Under
                },
            },
            Command::Phantom => Atom::Phantom {
                base: Box::new(self.parse_argument(name)?),
                keep: PhantomDims::all(),
            },
            Command::Accent(accent) => {
                // the accent glyph must exist before the argument is worth parsing
                self.lookup(self.ctx.symbols().atom(accent))?;
                Atom::Accented {
                    base: Box::new(self.parse_argument(name)?),
                    accent: accent.to_string(),
                }
            }
        };
        Ok(atom)
    }

    /// Reads the primes, superscript and subscript following `base`, in any order.
    fn attach_scripts(&mut self, base: Atom) -> Result<Atom> {
        let mut sub: Option<Atom> = None;
        let mut sup: Option<Atom> = None;
        loop {
            let resume = self.pos;
            self.skip_whitespace();
            let marker = match self.peek() {
                Some(c) if c == '^' || c == '_' || c == '\'' => c,
                _ => {
                    self.pos = resume;
                    break;
                }
            };
            if (marker == '_' && sub.is_some()) || (marker != '_' && sup.is_some()) {
                return Err(self.error(ErrorType::DoubleScript(marker)));
            }
            if marker == '\'' {
                let mut primes = Vec::new();
                while self.peek() == Some('\'') {
                    self.pos += 1;
                    primes.push(self.lookup(self.ctx.symbols().atom("prime"))?);
                }
                if self.peek() == Some('^') {
                    self.pos += 1;
                    primes.push(self.parse_script('^')?);
                }
                sup = Some(into_atom(primes));
            } else {
                self.pos += 1;
                let script = self.parse_script(marker)?;
                if marker == '_' {
                    sub = Some(script);
                } else {
                    sup = Some(script);
                }
            }
        }

        Ok(base.with_scripts(sub, sup))
    }

    fn parse_script(&mut self, marker: char) -> Result<Atom> {
        self.skip_whitespace();
        match self.peek() {
            None | Some('^') | Some('_') | Some('\'') => Err(self.error(ErrorType::MissingScript(marker))),
            _ => self.parse_argument(&marker.to_string()),
        }
    }
}
