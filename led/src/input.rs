//! # Command Input Stream
//!
//! Splits the input into two kinds of reads:
//!
//! - **Tokens**: whitespace-delimited command tokens, possibly several on
//!   one line
//! - **Text lines**: raw text for commands that need it. If the current
//!   line still holds non-blank text after a token, that remainder is the
//!   text line; otherwise the next whole input line is.
//!
//! ## Example
//!
//! ```text
//! 1a hello        # token "1a", text "hello"
//! 2c              # token "2c"
//!   indented      # text "  indented" (whole lines keep leading spaces)
//! v q             # tokens "v" and "q"
//! ```
//!
//! Input bytes that are not valid UTF-8 are replaced with U+FFFD rather
//! than ending the session.

use std::io::{self, BufRead};

/// Token and text-line reader over a buffered input
pub struct TokenReader<R: BufRead> {
    reader: R,
    /// Unconsumed rest of the current input line
    pending: String,
}

impl<R: BufRead> TokenReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: String::new(),
        }
    }

    /// Next command token, or `None` at end of input
    pub fn next_token(&mut self) -> io::Result<Option<String>> {
        loop {
            let start = self.pending.len() - self.pending.trim_start().len();
            if start < self.pending.len() {
                let rest = &self.pending[start..];
                let end = start + rest.find(char::is_whitespace).unwrap_or(rest.len());
                let token = self.pending[start..end].to_string();
                self.pending.replace_range(..end, "");
                return Ok(Some(token));
            }

            if !self.fill()? {
                return Ok(None);
            }
        }
    }

    /// Whether the current line still holds text after the last token
    pub fn has_pending_text(&self) -> bool {
        !self.pending.trim().is_empty()
    }

    /// Next raw text line, or `None` at end of input
    pub fn next_text_line(&mut self) -> io::Result<Option<String>> {
        if self.has_pending_text() {
            let text = self.pending.trim_start().to_string();
            self.pending.clear();
            return Ok(Some(text));
        }

        if !self.fill()? {
            return Ok(None);
        }
        Ok(Some(std::mem::take(&mut self.pending)))
    }

    /// Replace `pending` with the next input line, without its terminator
    fn fill(&mut self) -> io::Result<bool> {
        let mut raw = Vec::new();
        if self.reader.read_until(b'\n', &mut raw)? == 0 {
            self.pending.clear();
            return Ok(false);
        }
        if raw.ends_with(b"\n") {
            raw.pop();
            if raw.ends_with(b"\r") {
                raw.pop();
            }
        }
        self.pending = String::from_utf8_lossy(&raw).into_owned();
        Ok(true)
    }
}
