#![warn(missing_docs)]
//! Codepad Core - in-process source code editing engine
//!
//! # Overview
//!
//! `codepad-core` maintains a mutable line-oriented text buffer with reversible edit history and
//! derives everything an editing component displays from it: syntax highlighting runs, fold
//! regions and the visible-line projection, pattern diagnostics and completion suggestions.
//! Rendering, input capture and caret state belong to the host.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Editor facade & editing intents            │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Highlighter │ Folding │ Diagnostics │ Compl.│  ← Derived caches (lazy)
//! ├─────────────────────────────────────────────┤
//! │  Lexical scanner (comments / strings)       │  ← Shared classification
//! ├─────────────────────────────────────────────┤
//! │  TextBuffer + edit history                  │  ← Mutation & undo
//! ├─────────────────────────────────────────────┤
//! │  Line Index (Rope-based)                    │  ← Line Access
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use codepad_core::{Editor, EditorConfig, Position};
//!
//! let mut editor = Editor::new(EditorConfig::default()).unwrap();
//!
//! let caret = editor.insert_text(Position::ZERO, "fn main() ");
//! let caret = editor.type_char(caret, '{');
//! assert_eq!(editor.text(), "fn main() {}");
//! assert_eq!(caret, Position::new(0, 11));
//!
//! // Auto-closed pairs are one undo step.
//! editor.undo();
//! assert_eq!(editor.text(), "fn main() ");
//! ```
//!
//! # Module Description
//!
//! - [`buffer`] - text buffer with undo/redo and change notifications
//! - [`line_index`] - Rope based line index
//! - [`highlight`] - regex rulesets and per-line color runs
//! - [`scan`] - comment and string aware lexical scanner
//! - [`folding`] - fold regions and the visible-line projection
//! - [`diagnostics`] - diagnostics model and the debounced runner
//! - [`completion`] - completion providers
//! - [`search`] - find and replace
//! - [`editor`] - the facade tying it all together

pub mod buffer;
pub mod completion;
pub mod config;
pub mod diagnostics;
pub mod editor;
pub mod folding;
pub mod highlight;
mod history;
pub mod intents;
pub mod line_index;
pub mod position;
pub mod scan;
pub mod search;
pub mod text;

pub use buffer::{ChangeCallback, DEFAULT_UNDO_LIMIT, TextBuffer};
pub use completion::{
    CompletionItem, CompletionKind, CompletionProvider, LexiconCompletionProvider,
    completion_prefix,
};
pub use config::{ConfigError, DEFAULT_TAB_WIDTH, EditorConfig};
pub use diagnostics::{
    AnalysisContext, AnalyzerError, DEFAULT_DEBOUNCE, Diagnostic, DiagnosticIndex,
    DiagnosticProvider, DiagnosticsJob, DiagnosticsOutcome, DiagnosticsScheduler, Severity,
    SymbolInfo, SymbolKind,
};
pub use editor::Editor;
pub use folding::{
    BraceFolding, FoldRegion, FoldingManager, FoldingProvider, FoldingStrategy, IndentFolding,
};
pub use highlight::{
    Color, ColorRun, FontStyle, Highlighter, Ruleset, RulesetError, SyntaxRule, TextStyle, Theme,
};
pub use history::EditAction;
pub use line_index::LineIndex;
pub use position::{Position, Range};
pub use scan::{CharClass, LexicalScan, ScanSyntax, ScannedLine, StringKind, StringLiteral};
pub use search::{Replacement, SearchError, SearchOptions};

pub use codepad_lang::Language;
