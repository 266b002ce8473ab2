//! Editor configuration
//!
//! Built once at startup and passed by reference into the command loop.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BUFFER_LENGTH: usize = 100;
pub const DEFAULT_LINE_WIDTH: usize = 80;

/// Configuration error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid buffer length: must be at least 1")]
    InvalidBufferLength,

    #[error("invalid line width: must be at least 1")]
    InvalidLineWidth,
}

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Initial number of line slots reserved by the buffer
    pub buffer_length: usize,
    /// Initial character capacity reserved for each written line
    pub line_width: usize,
    /// Backing file opened at startup
    pub file: Option<PathBuf>,
    /// Command input file (stdin when absent)
    pub input: Option<PathBuf>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_length == 0 {
            return Err(ConfigError::InvalidBufferLength);
        }
        if self.line_width == 0 {
            return Err(ConfigError::InvalidLineWidth);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buffer_length: DEFAULT_BUFFER_LENGTH,
            line_width: DEFAULT_LINE_WIDTH,
            file: None,
            input: None,
        }
    }
}
