//! Backing-file storage
//!
//! The engine never touches the filesystem directly; it goes through a
//! [`LineStore`]. A missing file is not an error: `load` reports it as
//! `None` and the caller starts an empty buffer.
//!
//! Files are read as raw bytes. Bytes that are not valid UTF-8 are shown
//! as U+FFFD, and writing the buffer back stores that replacement. Line
//! endings are detected from the first line and kept on save, so a CRLF
//! file stays CRLF.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Storage error
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Line-oriented file access
pub trait LineStore {
    /// Read every line of `path`, without line terminators
    ///
    /// Returns `Ok(None)` when the file does not exist.
    fn load(&mut self, path: &Path) -> Result<Option<Vec<String>>, StoreError>;

    /// Truncate `path` and write one newline-terminated record per line
    fn save(&mut self, path: &Path, lines: &[String]) -> Result<(), StoreError>;
}

/// Line terminator of a stored file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// Terminator used by the first line of `bytes`
    pub fn detect(bytes: &[u8]) -> Self {
        match bytes.iter().position(|&b| b == b'\n') {
            Some(end) if bytes[..end].ends_with(b"\r") => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Filesystem-backed store
///
/// Remembers the line ending of every file it loaded.
#[derive(Debug, Clone, Default)]
pub struct FileStore {
    endings: HashMap<PathBuf, LineEnding>,
}

impl FileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Line ending `save` will use for `path`
    pub fn line_ending(&self, path: &Path) -> LineEnding {
        self.endings.get(path).copied().unwrap_or_default()
    }
}

/// Split raw file content into lines without terminators
///
/// Returns the lines and how many of them needed lossy decoding.
fn decode_lines(bytes: &[u8]) -> (Vec<String>, usize) {
    let mut lossy = 0;
    let mut lines: Vec<String> = bytes
        .split(|&b| b == b'\n')
        .map(|line| {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            match String::from_utf8_lossy(line) {
                Cow::Borrowed(text) => text.to_string(),
                Cow::Owned(text) => {
                    lossy += 1;
                    text
                }
            }
        })
        .collect();

    // `split` yields an empty piece after a final terminator, and one for
    // empty content.
    if bytes.is_empty() || bytes.ends_with(b"\n") {
        lines.pop();
    }
    (lines, lossy)
}

impl LineStore for FileStore {
    fn load(&mut self, path: &Path) -> Result<Option<Vec<String>>, StoreError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let ending = LineEnding::detect(&bytes);
        let (lines, lossy) = decode_lines(&bytes);
        if lossy > 0 {
            tracing::warn!(path = %path.display(), lines = lossy, "invalid UTF-8 replaced");
        }
        tracing::info!(path = %path.display(), lines = lines.len(), ?ending, "file loaded");

        self.endings.insert(path.to_path_buf(), ending);
        Ok(Some(lines))
    }

    fn save(&mut self, path: &Path, lines: &[String]) -> Result<(), StoreError> {
        let write_error = |source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        };

        let ending = self.line_ending(path);
        let mut writer = BufWriter::new(File::create(path).map_err(write_error)?);
        for line in lines {
            write!(writer, "{}{}", line, ending.as_str()).map_err(write_error)?;
        }
        writer.flush().map_err(write_error)?;

        tracing::info!(path = %path.display(), lines = lines.len(), "file written");
        Ok(())
    }
}

/// In-memory store, keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: HashMap<PathBuf, Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, lines: Vec<String>) -> Self {
        self.files.insert(path.into(), lines);
        self
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<&[String]> {
        self.files.get(path.as_ref()).map(Vec::as_slice)
    }
}

impl LineStore for MemoryStore {
    fn load(&mut self, path: &Path) -> Result<Option<Vec<String>>, StoreError> {
        Ok(self.files.get(path).cloned())
    }

    fn save(&mut self, path: &Path, lines: &[String]) -> Result<(), StoreError> {
        self.files.insert(path.to_path_buf(), lines.to_vec());
        Ok(())
    }
}
