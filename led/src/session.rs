//! # Command Loop
//!
//! Reads command tokens, parses them against the current line and hands
//! them to the engine, one `parse` + `execute` per iteration.
//!
//! ## States
//!
//! - `Command`: awaiting a command token
//! - `Text`: collecting the raw text lines a pending `i`, `a`, `c` or `f`
//!   command needs
//! - `Exit`: terminal, reached by `q` or end of input

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use led_core::{
    Command, CommandParser, Config, Engine, EngineError, LineStore, Outcome, SessionMode,
    StoreError, Verb,
};
use thiserror::Error;

use crate::input::TokenReader;

/// Session error types
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cannot open input stream {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Resource(#[from] StoreError),

    #[error("{0}")]
    Fatal(EngineError),
}

/// Interactive editing session
pub struct Session<S: LineStore> {
    engine: Engine<S>,
    mode: SessionMode,
    /// Command waiting for its text lines
    pending: Option<Command>,
}

impl<S: LineStore> Session<S> {
    /// Wrap an engine, ready for the first command
    pub fn new(engine: Engine<S>) -> Self {
        Self {
            engine,
            mode: SessionMode::Command,
            pending: None,
        }
    }

    /// Build the engine from `config` and bind the configured backing file
    ///
    /// A backing file that exists but cannot be read is fatal here.
    pub fn start<W: Write>(store: S, config: &Config, out: &mut W) -> Result<Self, SessionError> {
        let mut engine = Engine::new(store, config);
        if let Some(path) = &config.file {
            let status = engine.open(path.clone())?;
            out.write_all(status.message(path).as_bytes())?;
        }
        Ok(Self::new(engine))
    }

    pub fn engine(&self) -> &Engine<S> {
        &self.engine
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Run until `q` or end of input
    pub fn run<R, W, E>(
        &mut self,
        input: &mut TokenReader<R>,
        out: &mut W,
        err: &mut E,
    ) -> Result<(), SessionError>
    where
        R: BufRead,
        W: Write,
        E: Write,
    {
        while !self.mode.is_terminal() {
            self.step(input, out, err)?;
        }
        out.flush()?;
        Ok(())
    }

    /// Consume one token or one text line
    pub fn step<R, W, E>(
        &mut self,
        input: &mut TokenReader<R>,
        out: &mut W,
        err: &mut E,
    ) -> Result<(), SessionError>
    where
        R: BufRead,
        W: Write,
        E: Write,
    {
        match self.mode {
            SessionMode::Command => self.read_command(input, out, err),
            SessionMode::Text => self.read_text(input, out, err),
            SessionMode::Exit => Ok(()),
        }
    }

    fn read_command<R, W, E>(
        &mut self,
        input: &mut TokenReader<R>,
        out: &mut W,
        err: &mut E,
    ) -> Result<(), SessionError>
    where
        R: BufRead,
        W: Write,
        E: Write,
    {
        let Some(token) = input.next_token()? else {
            tracing::debug!("end of input");
            self.mode = SessionMode::Exit;
            return Ok(());
        };

        let cmd = match CommandParser::parse(&token, self.engine.buffer().current_line()) {
            Ok(cmd) => cmd,
            Err(parse_error) => {
                tracing::debug!(%token, error = %parse_error, "rejected command");
                writeln!(err, "{}", parse_error)?;
                return Ok(());
            }
        };

        if cmd.missing_text() == 0 {
            return self.dispatch(cmd, out, err);
        }

        if cmd.verb == Verb::File && !input.has_pending_text() {
            write!(out, "Enter filename: ")?;
            out.flush()?;
        }
        self.pending = Some(cmd);
        self.mode = SessionMode::Text;
        Ok(())
    }

    fn read_text<R, W, E>(
        &mut self,
        input: &mut TokenReader<R>,
        out: &mut W,
        err: &mut E,
    ) -> Result<(), SessionError>
    where
        R: BufRead,
        W: Write,
        E: Write,
    {
        let Some(mut cmd) = self.pending.take() else {
            self.mode = SessionMode::Command;
            return Ok(());
        };

        let Some(text) = input.next_text_line()? else {
            tracing::debug!(command = %cmd, "end of input while awaiting text");
            self.mode = SessionMode::Exit;
            return Ok(());
        };

        cmd.text.push(text);
        if cmd.missing_text() > 0 {
            self.pending = Some(cmd);
            return Ok(());
        }

        self.mode = SessionMode::Command;
        self.dispatch(cmd, out, err)
    }

    fn dispatch<W, E>(&mut self, cmd: Command, out: &mut W, err: &mut E) -> Result<(), SessionError>
    where
        W: Write,
        E: Write,
    {
        match self.engine.execute(&cmd) {
            Ok(outcome) => {
                write!(out, "{}", outcome)?;
                if outcome == Outcome::Exit {
                    self.mode = SessionMode::Exit;
                }
                Ok(())
            }
            Err(engine_error) if engine_error.is_fatal() => {
                tracing::error!(command = %cmd, error = %engine_error, "fatal engine error");
                Err(SessionError::Fatal(engine_error))
            }
            Err(engine_error) => {
                tracing::warn!(command = %cmd, error = %engine_error, "command failed");
                writeln!(err, "{}", engine_error)?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use led_core::MemoryStore;
    use std::io::Cursor;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    struct Transcript {
        session: Session<MemoryStore>,
        out: String,
        err: String,
    }

    fn run_script(store: MemoryStore, file: Option<&str>, script: &str) -> Transcript {
        let config = Config {
            file: file.map(PathBuf::from),
            ..Config::default()
        };
        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut session = Session::start(store, &config, &mut out).unwrap();
        let mut input = TokenReader::new(Cursor::new(script.as_bytes()));
        session.run(&mut input, &mut out, &mut err).unwrap();

        Transcript {
            session,
            out: String::from_utf8(out).unwrap(),
            err: String::from_utf8(err).unwrap(),
        }
    }

    #[test]
    fn test_view_and_quit() {
        let store = MemoryStore::new().with_file("a.txt", lines(&["one", "two"]));
        let t = run_script(store, Some("a.txt"), "v\nq\nv\n");
        assert_eq!(
            t.out,
            "Editing file: a.txt\n1: one\n2: two\nExiting program\n"
        );
        assert_eq!(t.session.mode(), SessionMode::Exit);
    }

    #[test]
    fn test_end_of_input_exits() {
        let t = run_script(MemoryStore::new(), None, "l\n");
        assert_eq!(t.out, "Line: 0\n");
        assert_eq!(t.session.mode(), SessionMode::Exit);
    }

    #[test]
    fn test_parse_error_goes_to_error_stream() {
        let t = run_script(MemoryStore::new(), None, "12 xyz l");
        assert_eq!(t.err.lines().count(), 2);
        assert!(t.err.lines().all(|line| line.starts_with("Invalid command")));
        assert_eq!(t.out, "Line: 0\n");
    }

    #[test]
    fn test_text_state_collects_one_line_per_repetition() {
        let store = MemoryStore::new().with_file("a.txt", lines(&["a", "b"]));
        let t = run_script(store, Some("a.txt"), "1a2\n!\n?\nv\n");
        assert_eq!(t.out, "Editing file: a.txt\n1: a!\n2: b?\n");
    }

    #[test]
    fn test_end_of_input_in_text_state_discards_command() {
        let store = MemoryStore::new().with_file("a.txt", lines(&["a"]));
        let t = run_script(store, Some("a.txt"), "1c\n");
        assert_eq!(t.session.engine().buffer().save(), lines(&["a"]));
        assert_eq!(t.session.mode(), SessionMode::Exit);
    }

    #[test]
    fn test_file_prompt_only_without_inline_name() {
        let store = MemoryStore::new().with_file("b.txt", lines(&["x"]));
        let t = run_script(store.clone(), None, "f b.txt\n");
        assert_eq!(t.out, "Editing file: b.txt\n");

        let t = run_script(store, None, "f\nb.txt\n");
        assert_eq!(t.out, "Enter filename: Editing file: b.txt\n");
    }

    #[test]
    fn test_write_without_file_reports_and_continues() {
        let t = run_script(MemoryStore::new(), None, "w l");
        assert!(t.err.contains("no file name"));
        assert_eq!(t.out, "Line: 0\n");
    }

    #[test]
    fn test_invalid_utf8_input_keeps_session_running() {
        let store = MemoryStore::new().with_file("a.txt", lines(&["old"]));
        let config = Config {
            file: Some(PathBuf::from("a.txt")),
            ..Config::default()
        };
        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut session = Session::start(store, &config, &mut out).unwrap();
        let mut input = TokenReader::new(Cursor::new(&b"1c\ncaf\xe9\nv\nq\n"[..]));

        session.run(&mut input, &mut out, &mut err).unwrap();

        assert_eq!(session.mode(), SessionMode::Exit);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Editing file: a.txt\n1: caf\u{FFFD}\nExiting program\n"
        );
    }

    #[test]
    fn test_fatal_growth_stops_session() {
        let config = Config::default();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut session = Session::start(MemoryStore::new(), &config, &mut out).unwrap();
        let mut input = TokenReader::new(Cursor::new(
            "99999999999999999999999c\nx\nv\n".as_bytes(),
        ));

        let result = session.run(&mut input, &mut out, &mut err);
        assert!(matches!(result, Err(SessionError::Fatal(_))));
    }
}
