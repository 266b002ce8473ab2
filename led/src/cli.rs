//! # Command Line Arguments
//!
//! Flags override values from an optional JSON config file, which in turn
//! override [`Config::default`].

use std::fs;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use clap::Parser;
use led_core::{Config, ConfigError};
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;

/// Startup configuration error types
#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

// More info: <https://docs.rs/clap/latest/clap/_derive/_tutorial/chapter_2/index.html>
#[derive(Debug, Parser)]
#[command(bin_name = "led")]
#[command(about = "Line EDitor: edit a file with [LINE]COMMAND[COUNT] commands")]
#[command(version)]
#[command(next_line_help = true)]
#[command(
    after_help = "Commands: f file, v view, r read, l line, s setline, i insert, a append, c change, w write, q exit"
)]
pub struct CliArgs {
    /// File to edit; created on the first write if it does not exist
    pub file: Option<PathBuf>,

    /// Initial number of line slots reserved by the buffer
    #[arg(long = "buffer-length", alias = "bl", value_name = "N")]
    pub buffer_length: Option<NonZeroUsize>,

    /// Initial character capacity reserved for each line
    #[arg(long = "line-width", alias = "lw", value_name = "N")]
    pub line_width: Option<NonZeroUsize>,

    /// Read commands from this file instead of stdin
    #[arg(long = "input-stream", alias = "is", value_name = "PATH")]
    pub input_stream: Option<PathBuf>,

    /// JSON config file with defaults for the options above
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level for diagnostics written to stderr
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    pub log_level: LevelFilter,
}

impl CliArgs {
    /// Resolve the effective configuration
    pub fn to_config(&self) -> Result<Config, CliError> {
        let mut config = match &self.config {
            Some(path) => load_config_file(path)?,
            None => Config::default(),
        };

        if let Some(buffer_length) = self.buffer_length {
            config.buffer_length = buffer_length.get();
        }
        if let Some(line_width) = self.line_width {
            config.line_width = line_width.get();
        }
        if let Some(file) = &self.file {
            config.file = Some(file.clone());
        }
        if let Some(input) = &self.input_stream {
            config.input = Some(input.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

fn load_config_file(path: &Path) -> Result<Config, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("led").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.log_level, LevelFilter::WARN);
        assert_eq!(args.to_config().unwrap(), Config::default());
    }

    #[test]
    fn test_short_aliases() {
        let args = parse(&["--bl", "10", "--lw", "40", "--is", "cmds.txt", "notes.txt"]);
        let config = args.to_config().unwrap();
        assert_eq!(config.buffer_length, 10);
        assert_eq!(config.line_width, 40);
        assert_eq!(config.input, Some(PathBuf::from("cmds.txt")));
        assert_eq!(config.file, Some(PathBuf::from("notes.txt")));
    }

    #[test]
    fn test_zero_length_rejected() {
        let result = CliArgs::try_parse_from(["led", "--buffer-length", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("led.json");
        fs::write(&path, r#"{ "buffer_length": 7, "line_width": 12 }"#).unwrap();

        let path_arg = path.to_string_lossy().into_owned();
        let args = parse(&["--config", &path_arg, "--lw", "30"]);
        let config = args.to_config().unwrap();
        assert_eq!(config.buffer_length, 7);
        assert_eq!(config.line_width, 30);
    }

    #[test]
    fn test_invalid_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("led.json");
        fs::write(&path, r#"{ "line_width": 0 }"#).unwrap();

        let path_arg = path.to_string_lossy().into_owned();
        let err = parse(&["--config", &path_arg]).to_config().unwrap_err();
        assert!(matches!(err, CliError::Invalid(ConfigError::InvalidLineWidth)));

        fs::write(&path, "not json").unwrap();
        let err = parse(&["--config", &path_arg]).to_config().unwrap_err();
        assert!(matches!(err, CliError::ConfigParse { .. }));
    }
}
