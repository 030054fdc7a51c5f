//! Reversible edit history.
//!
//! Every buffer mutation is recorded as an [`EditAction`]. Actions replay forward (redo) and
//! backward (undo) against the [`LineIndex`] without being recorded again. A composite groups
//! several primitive actions into one undo step.

use crate::line_index::LineIndex;
use crate::position::Position;

/// A single reversible edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    /// Text inserted at `at`; `end` is the position right after it.
    Insert {
        /// Insertion point.
        at: Position,
        /// Position immediately after the inserted text.
        end: Position,
        /// Inserted text (LF line breaks).
        text: String,
        /// Caret before the edit.
        caret_before: Position,
        /// Caret after the edit.
        caret_after: Position,
    },
    /// Text removed from `[start, end)`.
    Delete {
        /// Range start.
        start: Position,
        /// Range end (exclusive), as it was before the deletion.
        end: Position,
        /// Removed text.
        text: String,
        /// Caret before the edit.
        caret_before: Position,
        /// Caret after the edit.
        caret_after: Position,
    },
    /// An ordered group of actions undone and redone as one unit.
    Composite {
        /// Sub-actions in application order.
        actions: Vec<EditAction>,
        /// Caret before the first sub-action.
        caret_before: Position,
        /// Caret after the last sub-action.
        caret_after: Position,
    },
}

impl EditAction {
    /// Caret to restore on undo.
    pub fn caret_before(&self) -> Position {
        match self {
            EditAction::Insert { caret_before, .. }
            | EditAction::Delete { caret_before, .. }
            | EditAction::Composite { caret_before, .. } => *caret_before,
        }
    }

    /// Caret to restore on redo.
    pub fn caret_after(&self) -> Position {
        match self {
            EditAction::Insert { caret_after, .. }
            | EditAction::Delete { caret_after, .. }
            | EditAction::Composite { caret_after, .. } => *caret_after,
        }
    }

    /// Re-apply the action (redo).
    pub(crate) fn apply(&self, index: &mut LineIndex) {
        match self {
            EditAction::Insert { at, text, .. } => {
                let offset = index.position_to_char(*at);
                index.insert(offset, text);
            }
            EditAction::Delete { start, end, .. } => {
                let a = index.position_to_char(*start);
                let b = index.position_to_char(*end);
                index.remove(a, b);
            }
            EditAction::Composite { actions, .. } => {
                for action in actions {
                    action.apply(index);
                }
            }
        }
    }

    /// Reverse the action (undo).
    pub(crate) fn revert(&self, index: &mut LineIndex) {
        match self {
            EditAction::Insert { at, end, .. } => {
                let a = index.position_to_char(*at);
                let b = index.position_to_char(*end);
                index.remove(a, b);
            }
            EditAction::Delete { start, text, .. } => {
                let offset = index.position_to_char(*start);
                index.insert(offset, text);
            }
            EditAction::Composite { actions, .. } => {
                for action in actions.iter().rev() {
                    action.revert(index);
                }
            }
        }
    }
}

#[derive(Debug)]
struct OpenComposite {
    caret_before: Position,
    actions: Vec<EditAction>,
    depth: usize,
}

/// Undo/redo stacks with optional composite grouping.
#[derive(Debug)]
pub(crate) struct History {
    undo_stack: Vec<EditAction>,
    redo_stack: Vec<EditAction>,
    max_undo: usize,
    open: Option<OpenComposite>,
}

impl History {
    pub(crate) fn new(max_undo: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo: max_undo.max(1),
            open: None,
        }
    }

    pub(crate) fn set_max_undo(&mut self, max_undo: usize) {
        self.max_undo = max_undo.max(1);
        self.trim();
    }

    pub(crate) fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub(crate) fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub(crate) fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub(crate) fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub(crate) fn in_composite(&self) -> bool {
        self.open.is_some()
    }

    /// Record a freshly applied primitive action.
    pub(crate) fn record(&mut self, action: EditAction) {
        self.redo_stack.clear();
        match &mut self.open {
            Some(open) => open.actions.push(action),
            None => self.push_undo(action),
        }
    }

    /// Open a composite, or nest into the one already open.
    pub(crate) fn begin_composite(&mut self, caret_before: Position) {
        match &mut self.open {
            Some(open) => open.depth += 1,
            None => {
                self.open = Some(OpenComposite {
                    caret_before,
                    actions: Vec::new(),
                    depth: 1,
                })
            }
        }
    }

    /// Close one composite level. Returns `true` when the outermost level closed.
    pub(crate) fn end_composite(&mut self, caret_after: Position) -> bool {
        let Some(open) = &mut self.open else {
            return false;
        };
        open.depth -= 1;
        if open.depth > 0 {
            return false;
        }
        if let Some(open) = self.open.take()
            && !open.actions.is_empty()
        {
            self.push_undo(EditAction::Composite {
                actions: open.actions,
                caret_before: open.caret_before,
                caret_after,
            });
        }
        true
    }

    /// Close every open composite level, using the last recorded caret.
    pub(crate) fn close_open_composite(&mut self) {
        if let Some(open) = &mut self.open {
            let caret = open
                .actions
                .last()
                .map(EditAction::caret_after)
                .unwrap_or(open.caret_before);
            open.depth = 1;
            self.end_composite(caret);
        }
    }

    pub(crate) fn pop_undo(&mut self) -> Option<EditAction> {
        self.undo_stack.pop()
    }

    pub(crate) fn pop_redo(&mut self) -> Option<EditAction> {
        self.redo_stack.pop()
    }

    pub(crate) fn push_redo(&mut self, action: EditAction) {
        self.redo_stack.push(action);
    }

    /// Push back onto the undo stack after a redo (keeps the redo stack).
    pub(crate) fn push_undo_after_redo(&mut self, action: EditAction) {
        self.undo_stack.push(action);
        self.trim();
    }

    pub(crate) fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.open = None;
    }

    fn push_undo(&mut self, action: EditAction) {
        self.undo_stack.push(action);
        self.trim();
    }

    fn trim(&mut self) {
        if self.undo_stack.len() > self.max_undo {
            let excess = self.undo_stack.len() - self.max_undo;
            self.undo_stack.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(at: Position, text: &str, end: Position) -> EditAction {
        EditAction::Insert {
            at,
            end,
            text: text.to_string(),
            caret_before: at,
            caret_after: end,
        }
    }

    #[test]
    fn test_insert_apply_revert() {
        let mut index = LineIndex::from_text("ac");
        let action = insert(Position::new(0, 1), "b\nx", Position::new(1, 1));
        action.apply(&mut index);
        assert_eq!(index.text(), "ab\nxc");
        action.revert(&mut index);
        assert_eq!(index.text(), "ac");
    }

    #[test]
    fn test_composite_reverts_in_reverse_order() {
        let mut index = LineIndex::from_text("");
        let composite = EditAction::Composite {
            actions: vec![
                insert(Position::new(0, 0), "()", Position::new(0, 2)),
                insert(Position::new(0, 1), "x", Position::new(0, 2)),
            ],
            caret_before: Position::new(0, 0),
            caret_after: Position::new(0, 2),
        };
        composite.apply(&mut index);
        assert_eq!(index.text(), "(x)");
        composite.revert(&mut index);
        assert_eq!(index.text(), "");
    }

    #[test]
    fn test_empty_composite_records_nothing() {
        let mut history = History::new(10);
        history.begin_composite(Position::ZERO);
        assert!(history.end_composite(Position::ZERO));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_nested_composites_fold_into_outer() {
        let mut history = History::new(10);
        history.begin_composite(Position::ZERO);
        history.record(insert(Position::ZERO, "a", Position::new(0, 1)));
        history.begin_composite(Position::new(0, 1));
        history.record(insert(Position::new(0, 1), "b", Position::new(0, 2)));
        assert!(!history.end_composite(Position::new(0, 2)));
        assert!(history.in_composite());
        assert!(history.end_composite(Position::new(0, 2)));
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn test_undo_limit_drops_oldest() {
        let mut history = History::new(2);
        for i in 0..3 {
            history.record(insert(Position::new(0, i), "x", Position::new(0, i + 1)));
        }
        assert_eq!(history.undo_depth(), 2);
        let oldest_kept = history.undo_stack.first().map(EditAction::caret_before);
        assert_eq!(oldest_kept, Some(Position::new(0, 1)));
    }
}
