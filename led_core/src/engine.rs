//! Command engine
//!
//! Owns the [`Buffer`] and the backing-file [`LineStore`], and applies one
//! parsed [`Command`] at a time. Every call returns a discriminated
//! [`Outcome`]; only [`EngineError::OutOfMemory`] is fatal to the caller.

use core::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::buffer::{Buffer, GrowError};
use crate::command::{Command, Verb};
use crate::config::Config;
use crate::store::{LineStore, StoreError};

/// Engine error
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Resource(#[from] StoreError),

    #[error("no file name (use f to choose one)")]
    NoFile,

    #[error("out of memory: {0}")]
    OutOfMemory(#[from] GrowError),
}

impl EngineError {
    /// Whether the command loop must stop
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::OutOfMemory(_))
    }
}

/// Result of executing one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Text to display
    Rendered(String),
    /// The buffer was edited
    Mutated,
    /// An address ran past the last line; `partial` holds what was rendered
    /// before that point
    EndOfBuffer { partial: String },
    /// The address is not a valid line number
    InvalidLine,
    /// Leave the command loop
    Exit,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Rendered(text) => f.write_str(text),
            Outcome::Mutated => Ok(()),
            Outcome::EndOfBuffer { partial } => writeln!(f, "{}EOF", partial),
            Outcome::InvalidLine => f.write_str("Invalid line number\n"),
            Outcome::Exit => f.write_str("Exiting program\n"),
        }
    }
}

/// How a backing file was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenStatus {
    /// The file existed and was loaded
    Existing,
    /// The file does not exist yet; the buffer starts empty
    New,
}

impl OpenStatus {
    pub fn message(&self, path: &Path) -> String {
        match self {
            OpenStatus::Existing => format!("Editing file: {}\n", path.display()),
            OpenStatus::New => format!("Creating file: {}\n", path.display()),
        }
    }
}

/// Line editor engine
pub struct Engine<S: LineStore> {
    buffer: Buffer,
    store: S,
    path: Option<PathBuf>,
}

impl<S: LineStore> Engine<S> {
    /// Create an engine with an empty buffer and no backing file
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            buffer: Buffer::with_config(config),
            store,
            path: None,
        }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current backing file
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Bind a backing file and load the buffer from it
    ///
    /// On error the buffer and the previous binding are left untouched.
    pub fn open(&mut self, path: impl Into<PathBuf>) -> Result<OpenStatus, StoreError> {
        let path = path.into();
        let status = match self.store.load(&path)? {
            Some(lines) => {
                self.buffer.load(lines);
                OpenStatus::Existing
            }
            None => {
                self.buffer.load(Vec::new());
                OpenStatus::New
            }
        };
        tracing::info!(
            path = %path.display(),
            ?status,
            lines = self.buffer.last_line(),
            capacity = self.buffer.capacity(),
            "backing file bound"
        );
        self.path = Some(path);
        Ok(status)
    }

    /// Execute one command
    pub fn execute(&mut self, cmd: &Command) -> Result<Outcome, EngineError> {
        tracing::debug!(command = %cmd, verb = cmd.verb.name(), "execute");

        match cmd.verb {
            Verb::File => self.switch_file(cmd),
            Verb::View => Ok(Outcome::Rendered(self.buffer.to_string())),
            Verb::Read => Ok(self.read(cmd)),
            Verb::Line => Ok(Outcome::Rendered(format!(
                "Line: {}\n",
                self.buffer.current_line()
            ))),
            Verb::SetLine => Ok(self.set_line(cmd.line)),
            Verb::Insert | Verb::Append | Verb::Change => self.edit(cmd),
            Verb::Write => self.write(),
            Verb::Exit => Ok(Outcome::Exit),
        }
    }

    fn switch_file(&mut self, cmd: &Command) -> Result<Outcome, EngineError> {
        let name = cmd
            .text
            .first()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .ok_or(EngineError::NoFile)?;
        let path = PathBuf::from(name);

        match self.open(path.clone()) {
            Ok(status) => Ok(Outcome::Rendered(status.message(&path))),
            // The unreadable file stays unbound so `w` cannot overwrite it.
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "falling back to a new buffer");
                self.buffer.load(Vec::new());
                self.path = None;
                Ok(Outcome::Rendered(format!(
                    "{}\nCreating new buffer (use f to name it)\n",
                    err
                )))
            }
        }
    }

    fn read(&mut self, cmd: &Command) -> Outcome {
        let mut rendered = String::new();
        let mut line = cmd.line;

        for _ in 0..cmd.count {
            let Some(text) = self.buffer.line(line) else {
                tracing::debug!(line, "read past last line");
                return Outcome::EndOfBuffer { partial: rendered };
            };
            rendered.push_str(&format!("{}: {}\n", line, text));
            self.buffer.advance_past(line);
            line = line.saturating_add(1);
        }

        Outcome::Rendered(rendered)
    }

    fn set_line(&mut self, line: usize) -> Outcome {
        if line < 1 {
            Outcome::InvalidLine
        } else if self.buffer.seek(line) {
            Outcome::Rendered(format!("Set Line: {}\n", line))
        } else {
            Outcome::EndOfBuffer {
                partial: String::new(),
            }
        }
    }

    /// Insert, append or change `count` lines starting at the address
    ///
    /// Repetition `n` uses text entry `n`; missing entries are empty.
    fn edit(&mut self, cmd: &Command) -> Result<Outcome, EngineError> {
        if cmd.line < 1 {
            return Ok(Outcome::InvalidLine);
        }

        for repetition in 0..cmd.count {
            let line = cmd.line.saturating_add(repetition);
            let text = cmd.text.get(repetition).map_or("", String::as_str);

            match cmd.verb {
                Verb::Insert => self.buffer.insert_text(line, text)?,
                Verb::Append => self.buffer.append_text(line, text)?,
                _ => self.buffer.change_text(line, text)?,
            }
            self.buffer.advance_past(line);
        }

        Ok(Outcome::Mutated)
    }

    fn write(&mut self) -> Result<Outcome, EngineError> {
        let path = self.path.as_deref().ok_or(EngineError::NoFile)?;
        self.store.save(path, self.buffer.lines())?;
        Ok(Outcome::Rendered("Writing file\n".to_string()))
    }
}
