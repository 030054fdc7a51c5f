//! Rope-backed line storage.
//!
//! [`LineIndex`] owns the document text and answers line/offset conversions in O(log N).
//! Lines are separated by `\n` only; the caller normalizes other line endings first.

use crate::position::Position;
use ropey::Rope;

/// Logical line index - implemented using Rope data structure
pub struct LineIndex {
    rope: Rope,
}

impl LineIndex {
    /// Create an empty index (one empty line).
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Build line index from text
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Get total line count (never zero).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get total character count
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Get total byte count
    pub fn byte_count(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Character length of `line`, excluding its newline. Out-of-range lines have length 0.
    pub fn line_len(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return 0;
        }
        let slice = self.rope.line(line);
        let len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    /// Get text of the specified line (excluding newline)
    pub fn line_text(&self, line: usize) -> Option<String> {
        if line >= self.rope.len_lines() {
            return None;
        }

        let mut text = self.rope.line(line).to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        Some(text)
    }

    /// Clamp `pos` to an existing line and column.
    pub fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.line_count().saturating_sub(1));
        Position::new(line, pos.column.min(self.line_len(line)))
    }

    /// Position after the last character.
    pub fn end_position(&self) -> Position {
        let line = self.line_count().saturating_sub(1);
        Position::new(line, self.line_len(line))
    }

    /// Get character offset for a (clamped) position.
    pub fn position_to_char(&self, pos: Position) -> usize {
        let pos = self.clamp(pos);
        self.rope.line_to_char(pos.line) + pos.column
    }

    /// Get the position of a (clamped) character offset.
    pub fn char_to_position(&self, char_offset: usize) -> Position {
        let char_offset = char_offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(char_offset);
        Position::new(line, char_offset - self.rope.line_to_char(line))
    }

    /// Get the position of a (clamped) UTF-8 byte offset into the full text.
    ///
    /// The offset must fall on a character boundary, as regex match offsets always do.
    pub fn byte_to_position(&self, byte_offset: usize) -> Position {
        let byte_offset = byte_offset.min(self.rope.len_bytes());
        self.char_to_position(self.rope.byte_to_char(byte_offset))
    }

    /// Insert text at a character offset.
    pub fn insert(&mut self, char_offset: usize, text: &str) {
        let char_offset = char_offset.min(self.rope.len_chars());
        self.rope.insert(char_offset, text);
    }

    /// Remove the characters in `[start, end)` and return them.
    pub fn remove(&mut self, start: usize, end: usize) -> String {
        let end = end.min(self.rope.len_chars());
        let start = start.min(end);
        if start == end {
            return String::new();
        }
        let removed = self.rope.slice(start..end).to_string();
        self.rope.remove(start..end);
        removed
    }

    /// Text in `[start, end)` character offsets.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.rope.len_chars());
        let start = start.min(end);
        self.rope.slice(start..end).to_string()
    }

    /// Get complete text
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Iterate over all lines (without newlines).
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.rope.lines().map(|line| {
            let mut text = line.to_string();
            if text.ends_with('\n') {
                text.pop();
            }
            text
        })
    }
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new()
    }
}
