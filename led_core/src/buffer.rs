//! Line buffer, addressing and cursor types
//!
//! Lines are addressed 1-based by commands and 0-based by [`Cursor`]
//! positions. The buffer grows on demand: writing past the last line fills
//! the gap with empty lines.

use core::fmt;
use thiserror::Error;

use crate::config::Config;

/// Growing the line store failed to allocate
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("cannot grow buffer to {requested} lines")]
pub struct GrowError {
    pub requested: usize,
}

/// Screen position (0-based row and column)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Two-dimensional cursor used by interactive front ends
///
/// Independent of [`Buffer::current_line`]: the row is a 0-based line index
/// and the column a character offset within that line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    position: Position,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(row: usize, col: usize) -> Self {
        Self {
            position: Position::new(row, col),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, pos: Position) {
        self.position = pos;
    }

    /// Move by a relative offset
    ///
    /// An axis whose move would go below zero is left unchanged.
    pub fn move_by(&mut self, dx: isize, dy: isize) {
        if let Some(col) = self.position.col.checked_add_signed(dx) {
            self.position.col = col;
        }
        if let Some(row) = self.position.row.checked_add_signed(dy) {
            self.position.row = row;
        }
    }
}

/// Line buffer with a current-line pointer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    lines: Vec<String>,
    current_line: usize,
    line_width: usize,
}

impl Buffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Create an empty buffer with the configured reservations
    pub fn with_config(config: &Config) -> Self {
        Self {
            lines: Vec::with_capacity(config.buffer_length),
            current_line: 0,
            line_width: config.line_width,
        }
    }

    /// Lines to hand to the persistence layer
    pub fn save(&self) -> Vec<String> {
        self.lines.clone()
    }

    /// Replace the whole content with stored lines
    ///
    /// The current line resets to the top. The configured line-slot
    /// reservation is kept.
    pub fn load(&mut self, lines: Vec<String>) {
        self.lines.clear();
        self.lines.extend(lines);
        self.current_line = usize::from(!self.lines.is_empty());
    }

    /// Highest populated 1-based address (0 when empty)
    pub fn last_line(&self) -> usize {
        self.lines.len()
    }

    /// Line slots available before the buffer has to reallocate
    pub fn capacity(&self) -> usize {
        self.lines.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn current_line(&self) -> usize {
        self.current_line
    }

    /// Move the current line to `line` if it is populated
    pub fn seek(&mut self, line: usize) -> bool {
        if (1..=self.last_line()).contains(&line) {
            self.current_line = line;
            true
        } else {
            false
        }
    }

    /// Point the current line just past `line`, clamped to the last line
    pub fn advance_past(&mut self, line: usize) {
        self.current_line = line.saturating_add(1).min(self.last_line());
    }

    /// Line at a 1-based address
    pub fn line(&self, line: usize) -> Option<&str> {
        line.checked_sub(1)
            .and_then(|index| self.lines.get(index))
            .map(String::as_str)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Extend the buffer with empty lines until `line` is populated
    pub fn grow_to(&mut self, line: usize) -> Result<(), GrowError> {
        if line > self.lines.len() {
            self.lines
                .try_reserve(line - self.lines.len())
                .map_err(|_| GrowError { requested: line })?;
            self.lines.resize_with(line, String::new);
            tracing::debug!(lines = line, "buffer grown");
        }
        if self.current_line == 0 && !self.lines.is_empty() {
            self.current_line = 1;
        }
        Ok(())
    }

    /// Insert text at the start of a line
    pub fn insert_text(&mut self, line: usize, text: &str) -> Result<(), GrowError> {
        self.line_mut(line)?.insert_str(0, text);
        Ok(())
    }

    /// Append text to the end of a line
    pub fn append_text(&mut self, line: usize, text: &str) -> Result<(), GrowError> {
        self.line_mut(line)?.push_str(text);
        Ok(())
    }

    /// Replace the content of a line
    pub fn change_text(&mut self, line: usize, text: &str) -> Result<(), GrowError> {
        let target = self.line_mut(line)?;
        target.clear();
        target.push_str(text);
        Ok(())
    }

    /// Write a character at the cursor and move the cursor right
    ///
    /// Inside the line the character overwrites; past the end the line is
    /// padded with spaces up to the cursor column first.
    pub fn put_char(&mut self, cursor: &mut Cursor, ch: char) -> Result<(), GrowError> {
        let pos = cursor.position();
        let target = self.line_mut(pos.row.saturating_add(1))?;

        if let Some((start, old)) = target.char_indices().nth(pos.col) {
            let mut utf8 = [0u8; 4];
            target.replace_range(start..start + old.len_utf8(), ch.encode_utf8(&mut utf8));
        } else {
            let pad = pos.col - target.chars().count();
            target.extend(core::iter::repeat(' ').take(pad));
            target.push(ch);
        }

        cursor.set_position(Position::new(pos.row, pos.col + 1));
        Ok(())
    }

    /// Move the cursor to the start of the next row, creating it if needed
    pub fn new_line(&mut self, cursor: &mut Cursor) -> Result<(), GrowError> {
        let row = cursor.position().row.saturating_add(1);
        self.grow_to(row.saturating_add(1))?;
        cursor.set_position(Position::new(row, 0));
        Ok(())
    }

    /// Mutable line at a 1-based address, growing the buffer to reach it
    ///
    /// Address 0 is treated as line 1.
    fn line_mut(&mut self, line: usize) -> Result<&mut String, GrowError> {
        let line = line.max(1);
        self.grow_to(line)?;
        let width = self.line_width;
        let target = &mut self.lines[line - 1];
        if target.capacity() == 0 {
            target.reserve(width);
        }
        Ok(target)
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, line) in self.lines.iter().enumerate() {
            writeln!(f, "{}: {}", index + 1, line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn loaded(items: &[&str]) -> Buffer {
        let mut buffer = Buffer::new();
        buffer.load(lines(items));
        buffer
    }

    #[test]
    fn test_new_buffer_is_empty() {
        let buffer = Buffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.last_line(), 0);
        assert_eq!(buffer.current_line(), 0);
        assert_eq!(buffer.line(1), None);
    }

    #[test]
    fn test_load_save_round_trip() {
        let original = lines(&["first", "", "  third  "]);
        let mut buffer = Buffer::new();
        buffer.load(original.clone());
        assert_eq!(buffer.current_line(), 1);
        assert_eq!(buffer.last_line(), 3);
        assert_eq!(buffer.save(), original);
    }

    #[test]
    fn test_load_keeps_configured_capacity() {
        let config = Config {
            buffer_length: 500,
            ..Config::default()
        };
        let mut buffer = Buffer::with_config(&config);
        buffer.load(lines(&["a", "b", "c"]));
        assert_eq!(buffer.last_line(), 3);
        assert!(buffer.capacity() >= 500);

        buffer.load(Vec::new());
        assert!(buffer.capacity() >= 500);
    }

    #[test]
    fn test_load_replaces_content() {
        let mut buffer = loaded(&["old", "lines", "here"]);
        buffer.seek(3);
        buffer.load(lines(&["new"]));
        assert_eq!(buffer.save(), lines(&["new"]));
        assert_eq!(buffer.current_line(), 1);
    }

    #[test]
    fn test_cursor_starts_at_origin() {
        assert_eq!(Cursor::new().position(), Position::default());
        assert_eq!(Cursor::default().position(), Position::new(0, 0));
    }

    #[test]
    fn test_load_empty() {
        let buffer = loaded(&[]);
        assert_eq!(buffer.current_line(), 0);
        assert!(buffer.save().is_empty());
    }

    #[test]
    fn test_line_addressing() {
        let buffer = loaded(&["a", "b"]);
        assert_eq!(buffer.line(0), None);
        assert_eq!(buffer.line(1), Some("a"));
        assert_eq!(buffer.line(2), Some("b"));
        assert_eq!(buffer.line(3), None);
    }

    #[test]
    fn test_seek() {
        let mut buffer = loaded(&["a", "b"]);
        assert!(buffer.seek(2));
        assert_eq!(buffer.current_line(), 2);
        assert!(!buffer.seek(0));
        assert!(!buffer.seek(3));
        assert_eq!(buffer.current_line(), 2);
    }

    #[test]
    fn test_advance_past_clamps() {
        let mut buffer = loaded(&["a", "b", "c"]);
        buffer.advance_past(1);
        assert_eq!(buffer.current_line(), 2);
        buffer.advance_past(3);
        assert_eq!(buffer.current_line(), 3);
    }

    #[test]
    fn test_grow_fills_gap_with_empty_lines() {
        let mut buffer = loaded(&["a"]);
        buffer.change_text(4, "d").unwrap();
        assert_eq!(buffer.last_line(), 4);
        assert_eq!(buffer.save(), lines(&["a", "", "", "d"]));
    }

    #[test]
    fn test_grow_sets_current_line_on_empty_buffer() {
        let mut buffer = Buffer::new();
        buffer.append_text(2, "x").unwrap();
        assert_eq!(buffer.current_line(), 1);
        assert_eq!(buffer.save(), lines(&["", "x"]));
    }

    #[test]
    fn test_grow_failure_reports_request() {
        let mut buffer = Buffer::new();
        assert_eq!(
            buffer.grow_to(usize::MAX),
            Err(GrowError {
                requested: usize::MAX
            })
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_insert_append_change() {
        let mut buffer = loaded(&["middle"]);
        buffer.insert_text(1, "start ").unwrap();
        buffer.append_text(1, " end").unwrap();
        assert_eq!(buffer.line(1), Some("start middle end"));

        buffer.change_text(1, "new").unwrap();
        assert_eq!(buffer.line(1), Some("new"));
    }

    #[test]
    fn test_put_char_pads_past_end() {
        let mut buffer = Buffer::new();
        let mut cursor = Cursor::at(0, 10);
        buffer.put_char(&mut cursor, 'x').unwrap();

        let line = buffer.line(1).unwrap();
        assert_eq!(line.len(), 11);
        assert_eq!(line, "          x");
        assert_eq!(cursor.position(), Position::new(0, 11));
    }

    #[test]
    fn test_put_char_overwrites_inside_line() {
        let mut buffer = loaded(&["héllo"]);
        let mut cursor = Cursor::at(0, 1);
        buffer.put_char(&mut cursor, 'a').unwrap();
        assert_eq!(buffer.line(1), Some("hallo"));

        let mut cursor = Cursor::at(0, 5);
        buffer.put_char(&mut cursor, '!').unwrap();
        assert_eq!(buffer.line(1), Some("hallo!"));
    }

    #[test]
    fn test_new_line_creates_row() {
        let mut buffer = loaded(&["abc"]);
        let mut cursor = Cursor::at(0, 3);
        buffer.new_line(&mut cursor).unwrap();
        assert_eq!(cursor.position(), Position::new(1, 0));
        assert_eq!(buffer.last_line(), 2);

        buffer.put_char(&mut cursor, 'd').unwrap();
        assert_eq!(buffer.save(), lines(&["abc", "d"]));
    }

    #[test]
    fn test_cursor_move_by_ignores_negative_overflow() {
        let mut cursor = Cursor::at(1, 2);
        cursor.move_by(-3, -1);
        assert_eq!(cursor.position(), Position::new(0, 2));

        cursor.move_by(4, 2);
        assert_eq!(cursor.position(), Position::new(2, 6));
    }

    #[test]
    fn test_display_numbers_lines() {
        let buffer = loaded(&["a", "b"]);
        assert_eq!(buffer.to_string(), "1: a\n2: b\n");
    }
}
