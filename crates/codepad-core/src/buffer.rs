//! The mutable, line-oriented text buffer.
//!
//! [`TextBuffer`] is the single owner of the document text. All mutations go through
//! [`TextBuffer::insert`] and [`TextBuffer::delete`] (or replay through undo/redo), each of which
//! bumps the [`version`](TextBuffer::version) and fires one payload-free change notification per
//! top-level mutation.
//!
//! Positions passed in are clamped, never rejected: interactive callers routinely hold stale
//! coordinates.

use crate::history::{EditAction, History};
use crate::line_index::LineIndex;
use crate::position::{Position, Range};
use crate::text::normalize_line_endings;

/// Default undo stack limit.
pub const DEFAULT_UNDO_LIMIT: usize = 1000;

/// Change callback type. Called once per top-level mutation, without payload.
pub type ChangeCallback = Box<dyn FnMut() + Send>;

/// A line-oriented text buffer with reversible edit history.
pub struct TextBuffer {
    index: LineIndex,
    history: History,
    version: u64,
    callbacks: Vec<ChangeCallback>,
    /// A mutation happened inside an open composite and has not been announced yet.
    pending_notify: bool,
}

impl TextBuffer {
    /// Create an empty buffer (one empty line).
    pub fn new() -> Self {
        Self::with_undo_limit("", DEFAULT_UNDO_LIMIT)
    }

    /// Create a buffer holding `text` (line endings normalized to `\n`).
    pub fn from_text(text: &str) -> Self {
        Self::with_undo_limit(text, DEFAULT_UNDO_LIMIT)
    }

    /// Create a buffer with a custom undo stack limit.
    pub fn with_undo_limit(text: &str, undo_limit: usize) -> Self {
        Self {
            index: LineIndex::from_text(&normalize_line_endings(text)),
            history: History::new(undo_limit),
            version: 0,
            callbacks: Vec::new(),
            pending_notify: false,
        }
    }

    /// Change the undo stack limit, dropping the oldest steps if needed.
    pub fn set_undo_limit(&mut self, undo_limit: usize) {
        self.history.set_max_undo(undo_limit);
    }

    /// Current document version. Incremented by every primitive mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of lines (at least 1).
    pub fn line_count(&self) -> usize {
        self.index.line_count()
    }

    /// Text of `line` without its newline; empty for out-of-range lines.
    pub fn line(&self, line: usize) -> String {
        self.index.line_text(line).unwrap_or_default()
    }

    /// Character length of `line`; 0 for out-of-range lines.
    pub fn line_len(&self, line: usize) -> usize {
        self.index.line_len(line)
    }

    /// Total character count, newlines included.
    pub fn char_count(&self) -> usize {
        self.index.char_count()
    }

    /// Newline-joined document text.
    pub fn text(&self) -> String {
        self.index.text()
    }

    /// Text covered by `range` (clamped).
    pub fn text_in(&self, range: Range) -> String {
        let a = self.index.position_to_char(range.start);
        let b = self.index.position_to_char(range.end);
        self.index.slice(a, b)
    }

    /// Character at `pos`, or `None` at/after line end.
    pub fn char_at(&self, pos: Position) -> Option<char> {
        if pos.line >= self.line_count() || pos.column >= self.line_len(pos.line) {
            return None;
        }
        let offset = self.index.position_to_char(pos);
        self.index.slice(offset, offset + 1).chars().next()
    }

    /// The underlying rope index.
    pub fn line_index(&self) -> &LineIndex {
        &self.index
    }

    /// Clamp `pos` into the document.
    pub fn clamp(&self, pos: Position) -> Position {
        self.index.clamp(pos)
    }

    /// Position after the last character.
    pub fn end_position(&self) -> Position {
        self.index.end_position()
    }

    /// Document character offset of `pos` (clamped).
    pub fn offset_of(&self, pos: Position) -> usize {
        self.index.position_to_char(pos)
    }

    /// Position of a document character offset (clamped).
    pub fn position_at(&self, offset: usize) -> Position {
        self.index.char_to_position(offset)
    }

    /// Insert `text` at `pos` and return the position right after the inserted text.
    ///
    /// `pos` is clamped first. Inserting an empty string changes nothing and records nothing.
    pub fn insert(&mut self, pos: Position, text: &str) -> Position {
        let at = self.clamp(pos);
        if text.is_empty() {
            return at;
        }
        let text = normalize_line_endings(text).into_owned();
        let offset = self.index.position_to_char(at);
        self.index.insert(offset, &text);
        let end = self.index.char_to_position(offset + text.chars().count());

        self.history.record(EditAction::Insert {
            at,
            end,
            text,
            caret_before: at,
            caret_after: end,
        });
        self.mutated();
        end
    }

    /// Delete the text between two positions and return it.
    ///
    /// The range is normalized and clamped; an empty range is a no-op returning `""`.
    pub fn delete(&mut self, start: Position, end: Position) -> String {
        let range = Range::new(self.clamp(start), self.clamp(end));
        if range.is_empty() {
            return String::new();
        }
        let a = self.index.position_to_char(range.start);
        let b = self.index.position_to_char(range.end);
        let removed = self.index.remove(a, b);

        self.history.record(EditAction::Delete {
            start: range.start,
            end: range.end,
            text: removed.clone(),
            caret_before: range.end,
            caret_after: range.start,
        });
        self.mutated();
        removed
    }

    /// Replace `range` with `text`; returns the end of the inserted text.
    ///
    /// Recorded as one undo step.
    pub fn replace(&mut self, range: Range, text: &str) -> Position {
        self.begin_composite(range.end);
        self.delete(range.start, range.end);
        let end = self.insert(range.start, text);
        self.end_composite(end);
        end
    }

    /// Start grouping subsequent edits into one undo step.
    ///
    /// Nested calls fold into the outermost composite.
    pub fn begin_composite(&mut self, caret_before: Position) {
        self.history.begin_composite(caret_before);
    }

    /// Finish the composite opened by [`begin_composite`](Self::begin_composite).
    ///
    /// A composite with no edits records nothing. Unbalanced calls are ignored.
    pub fn end_composite(&mut self, caret_after: Position) {
        if self.history.end_composite(caret_after) && self.pending_notify {
            self.pending_notify = false;
            self.notify();
        }
    }

    /// Returns `true` while a composite is open.
    pub fn in_composite(&self) -> bool {
        self.history.in_composite()
    }

    /// Undo the last step and return its caret-before, or `None` if there is nothing to undo.
    pub fn undo(&mut self) -> Option<Position> {
        self.close_open_composite();
        let action = self.history.pop_undo()?;
        action.revert(&mut self.index);
        let caret = action.caret_before();
        self.history.push_redo(action);
        self.version = self.version.wrapping_add(1);
        self.notify();
        Some(caret)
    }

    /// Redo the last undone step and return its caret-after, or `None` if there is nothing to redo.
    pub fn redo(&mut self) -> Option<Position> {
        self.close_open_composite();
        let action = self.history.pop_redo()?;
        action.apply(&mut self.index);
        let caret = action.caret_after();
        self.history.push_undo_after_redo(action);
        self.version = self.version.wrapping_add(1);
        self.notify();
        Some(caret)
    }

    /// Returns `true` if there is a step to undo.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Returns `true` if there is a step to redo.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Number of undo steps.
    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    /// Number of redo steps.
    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// Replace the whole document and clear the history.
    pub fn set_text(&mut self, text: &str) {
        self.index = LineIndex::from_text(&normalize_line_endings(text));
        self.history.clear();
        self.pending_notify = false;
        self.version = self.version.wrapping_add(1);
        self.notify();
    }

    /// Subscribe to change notifications.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    fn close_open_composite(&mut self) {
        if self.history.in_composite() {
            self.history.close_open_composite();
            if self.pending_notify {
                self.pending_notify = false;
                self.notify();
            }
        }
    }

    fn mutated(&mut self) {
        self.version = self.version.wrapping_add(1);
        if self.history.in_composite() {
            self.pending_notify = true;
        } else {
            self.notify();
        }
    }

    fn notify(&mut self) {
        for callback in &mut self.callbacks {
            callback();
        }
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBuffer")
            .field("line_count", &self.line_count())
            .field("version", &self.version)
            .field("undo_depth", &self.undo_depth())
            .field("redo_depth", &self.redo_depth())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_single_line_insert() {
        let mut buf = TextBuffer::from_text("held");
        let end = buf.insert(Position::new(0, 3), "lo wor");
        assert_eq!(buf.text(), "hello world");
        assert_eq!(end, Position::new(0, 9));
    }

    #[test]
    fn test_multi_line_insert_splits_line() {
        let mut buf = TextBuffer::from_text("head|tail");
        let end = buf.insert(Position::new(0, 5), "one\ntwo\nthree ");
        assert_eq!(buf.line_count(), 3);
        assert_eq!(buf.line(0), "head|one");
        assert_eq!(buf.line(1), "two");
        assert_eq!(buf.line(2), "three tail");
        assert_eq!(end, Position::new(2, 6));
    }

    #[test]
    fn test_insert_clamps_position() {
        let mut buf = TextBuffer::from_text("ab\ncd");
        let end = buf.insert(Position::new(10, 10), "!");
        assert_eq!(buf.text(), "ab\ncd!");
        assert_eq!(end, Position::new(1, 3));
    }

    #[test]
    fn test_insert_normalizes_crlf() {
        let mut buf = TextBuffer::new();
        buf.insert(Position::ZERO, "a\r\nb\rc");
        assert_eq!(buf.text(), "a\nb\nc");
    }

    #[test]
    fn test_delete_across_lines() {
        let mut buf = TextBuffer::from_text("first\nsecond\nthird");
        let removed = buf.delete(Position::new(2, 2), Position::new(0, 3));
        assert_eq!(removed, "st\nsecond\nth");
        assert_eq!(buf.text(), "firird");
        assert_eq!(buf.line_count(), 1);
    }

    #[test]
    fn test_empty_delete_is_noop() {
        let mut buf = TextBuffer::from_text("abc");
        assert_eq!(buf.delete(Position::new(0, 1), Position::new(0, 1)), "");
        assert!(!buf.can_undo());
        assert_eq!(buf.version(), 0);
    }

    #[test]
    fn test_out_of_range_queries() {
        let buf = TextBuffer::from_text("abc");
        assert_eq!(buf.line(7), "");
        assert_eq!(buf.line_len(7), 0);
        assert_eq!(buf.char_at(Position::new(0, 3)), None);
        assert_eq!(buf.char_at(Position::new(0, 1)), Some('b'));
    }

    #[test]
    fn test_one_notification_per_composite() {
        let mut buf = TextBuffer::new();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        buf.subscribe(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        buf.begin_composite(Position::ZERO);
        buf.insert(Position::ZERO, "a");
        buf.insert(Position::new(0, 1), "b");
        buf.end_composite(Position::new(0, 2));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        buf.insert(Position::ZERO, "c");
        assert_eq!(count.load(Ordering::SeqCst), 2);

        buf.undo();
        buf.redo();
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_set_text_clears_history() {
        let mut buf = TextBuffer::new();
        buf.insert(Position::ZERO, "x");
        buf.set_text("new\r\ntext");
        assert_eq!(buf.text(), "new\ntext");
        assert!(!buf.can_undo());
        assert_eq!(buf.undo(), None);
    }

    #[test]
    fn test_undo_closes_open_composite() {
        let mut buf = TextBuffer::new();
        buf.begin_composite(Position::ZERO);
        buf.insert(Position::ZERO, "ab");
        buf.insert(Position::new(0, 2), "cd");
        assert_eq!(buf.undo(), Some(Position::ZERO));
        assert_eq!(buf.text(), "");
        assert!(!buf.in_composite());
    }

    #[test]
    fn test_replace_is_one_step() {
        let mut buf = TextBuffer::from_text("hello world");
        let end = buf.replace(
            Range::new(Position::new(0, 6), Position::new(0, 11)),
            "there",
        );
        assert_eq!(buf.text(), "hello there");
        assert_eq!(end, Position::new(0, 11));
        assert_eq!(buf.undo_depth(), 1);
        buf.undo();
        assert_eq!(buf.text(), "hello world");
    }
}
