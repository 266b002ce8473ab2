//! Command parsing
//!
//! A command token has the shape `[LINE]VERB[COUNT]`:
//!
//! - a leading run of digits addresses a line (absent or zero means the
//!   current line)
//! - a trailing run of digits is the repeat count (absent or zero means 1)
//! - exactly one character between the two runs selects the verb
//!
//! `5a3` therefore appends to lines 5, 6 and 7.

use core::fmt;
use thiserror::Error;

/// Command parsing error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid command: no command letter in {0:?}")]
    MissingVerb(String),

    #[error("Invalid command: {0:?}")]
    InvalidCommand(String),
}

/// Command verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// `f`: switch the backing file and reload the buffer from it
    File,
    /// `v`: print every line
    View,
    /// `r`: print the addressed line
    Read,
    /// `l`: print the current line number
    Line,
    /// `s`: set the current line
    SetLine,
    /// `i`: insert text at the start of a line
    Insert,
    /// `a`: append text to the end of a line
    Append,
    /// `c`: replace a line
    Change,
    /// `w`: write the buffer to the backing file
    Write,
    /// `q`: leave the command loop
    Exit,
}

impl Verb {
    pub const ALL: [Verb; 10] = [
        Verb::File,
        Verb::View,
        Verb::Read,
        Verb::Line,
        Verb::SetLine,
        Verb::Insert,
        Verb::Append,
        Verb::Change,
        Verb::Write,
        Verb::Exit,
    ];

    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            'f' => Some(Verb::File),
            'v' => Some(Verb::View),
            'r' => Some(Verb::Read),
            'l' => Some(Verb::Line),
            's' => Some(Verb::SetLine),
            'i' => Some(Verb::Insert),
            'a' => Some(Verb::Append),
            'c' => Some(Verb::Change),
            'w' => Some(Verb::Write),
            'q' => Some(Verb::Exit),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Verb::File => 'f',
            Verb::View => 'v',
            Verb::Read => 'r',
            Verb::Line => 'l',
            Verb::SetLine => 's',
            Verb::Insert => 'i',
            Verb::Append => 'a',
            Verb::Change => 'c',
            Verb::Write => 'w',
            Verb::Exit => 'q',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Verb::File => "file",
            Verb::View => "view",
            Verb::Read => "read",
            Verb::Line => "line",
            Verb::SetLine => "setline",
            Verb::Insert => "insert",
            Verb::Append => "append",
            Verb::Change => "change",
            Verb::Write => "write",
            Verb::Exit => "exit",
        }
    }

    /// Whether the repeat count applies to this verb
    pub fn is_repeatable(&self) -> bool {
        matches!(
            self,
            Verb::Read | Verb::Insert | Verb::Append | Verb::Change
        )
    }

    /// Number of raw text lines the verb consumes before it can run
    pub fn text_lines(&self, count: usize) -> usize {
        match self {
            Verb::Insert | Verb::Append | Verb::Change => count,
            Verb::File => 1,
            _ => 0,
        }
    }
}

/// Parsed command
///
/// Lines are referenced by address only, so a pending command stays valid
/// while the buffer grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// 1-based target line
    pub line: usize,
    pub verb: Verb,
    /// Repeat count, at least 1 and always 1 for verbs that do not repeat
    pub count: usize,
    /// Text payload collected for `i`, `a`, `c` (one entry per repetition)
    /// and `f` (the file name)
    pub text: Vec<String>,
}

impl Command {
    pub fn new(line: usize, verb: Verb) -> Self {
        Self {
            line,
            verb,
            count: 1,
            text: Vec::new(),
        }
    }

    /// Set the repeat count; ignored by verbs that do not repeat
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = if self.verb.is_repeatable() {
            count.max(1)
        } else {
            1
        };
        self
    }

    pub fn with_text(mut self, text: Vec<String>) -> Self {
        self.text = text;
        self
    }

    /// Raw text lines still missing before the command can run
    pub fn missing_text(&self) -> usize {
        self.verb
            .text_lines(self.count)
            .saturating_sub(self.text.len())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.line, self.verb.as_char(), self.count)
    }
}

/// Command parser
pub struct CommandParser;

impl CommandParser {
    /// Parse one command token against the buffer's current line
    pub fn parse(token: &str, current_line: usize) -> Result<Command, ParseError> {
        let token = token.trim();

        let rest = token.trim_start_matches(|c: char| c.is_ascii_digit());
        let prefix = &token[..token.len() - rest.len()];

        let middle = rest.trim_end_matches(|c: char| c.is_ascii_digit());
        let suffix = &rest[middle.len()..];

        let line = parse_affix(prefix).unwrap_or(current_line);
        let count = parse_affix(suffix).unwrap_or(1);

        let mut chars = middle.chars();
        let verb = match (chars.next(), chars.next()) {
            (None, _) => return Err(ParseError::MissingVerb(token.to_string())),
            (Some(ch), None) => Verb::from_char(ch)
                .ok_or_else(|| ParseError::InvalidCommand(token.to_string()))?,
            _ => return Err(ParseError::InvalidCommand(token.to_string())),
        };

        Ok(Command::new(line, verb).with_count(count))
    }
}

/// Value of a digit affix; `None` when the affix is absent or zero
fn parse_affix(digits: &str) -> Option<usize> {
    if digits.is_empty() {
        return None;
    }
    // A run of ASCII digits only fails to parse on overflow.
    let value = digits.parse::<usize>().unwrap_or(usize::MAX);
    (value != 0).then_some(value)
}
