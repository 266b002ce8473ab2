//! # Line Editor Core
//!
//! Command grammar and line-buffer engine for `led`, a line editor driven by
//! terse `[LINE]VERB[COUNT]` commands.
//!
//! ## Philosophy
//!
//! - **Explicit state**: one [`Buffer`] and one [`Config`], passed in; no globals
//! - **Addresses, not references**: commands name lines by number, so the
//!   buffer can grow under a pending command
//! - **Outcomes, not panics**: every command yields an [`Outcome`]; only an
//!   allocation failure is fatal
//! - **No ambient I/O**: files are reached through a [`LineStore`]
//!
//! ## Design
//!
//! The core provides:
//! - CommandParser: token -> [`Command`] (address, verb, count)
//! - Engine: applies a command to the buffer and renders the result
//! - Buffer: growable line store with a current-line pointer and a 2D cursor
//! - SessionMode: states of the interactive command loop

pub mod buffer;
pub mod command;
pub mod config;
pub mod engine;
pub mod mode;
pub mod store;

pub use buffer::{Buffer, Cursor, GrowError, Position};
pub use command::{Command, CommandParser, ParseError, Verb};
pub use config::{Config, ConfigError};
pub use engine::{Engine, EngineError, OpenStatus, Outcome};
pub use mode::SessionMode;
pub use store::{FileStore, LineEnding, LineStore, MemoryStore, StoreError};
