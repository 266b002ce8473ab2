//! # led Host
//!
//! Command-line host for the `led` line editor.
//!
//! ## Philosophy
//!
//! - **Host owns I/O**: the engine renders strings, the host writes them
//! - **stdout is for output**: diagnostics and errors go to stderr
//! - **One command per iteration**: read a token, parse, execute, print
//!
//! ## Responsibilities
//!
//! The host:
//! - Resolves the [`Config`] from flags and an optional config file
//! - Opens the command input stream and the backing file
//! - Runs the command loop until `q` or end of input
//!
//! ## Non-Responsibilities
//!
//! The host does NOT:
//! - Render a screen or handle key bindings
//! - Keep undo history or more than one buffer

pub mod cli;
pub mod input;
pub mod session;

use std::fs::File;
use std::io::{self, BufReader};

use led_core::{Config, FileStore};

pub use cli::{CliArgs, CliError};
pub use input::TokenReader;
pub use session::{Session, SessionError};

/// Run a full session against the real filesystem, stdin and stdout
pub fn run(config: &Config) -> Result<(), SessionError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut err = io::stderr();

    match &config.input {
        Some(path) => {
            let file = File::open(path).map_err(|source| SessionError::Input {
                path: path.clone(),
                source,
            })?;
            let mut input = TokenReader::new(BufReader::new(file));
            let mut session = Session::start(FileStore::new(), config, &mut out)?;
            session.run(&mut input, &mut out, &mut err)
        }
        None => {
            let stdin = io::stdin();
            let mut input = TokenReader::new(stdin.lock());
            let mut session = Session::start(FileStore::new(), config, &mut out)?;
            session.run(&mut input, &mut out, &mut err)
        }
    }
}
