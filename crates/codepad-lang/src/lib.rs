#![warn(missing_docs)]
//! `codepad-lang` - data-driven language tables for `codepad-core`.
//!
//! This crate intentionally stays lightweight and does **not** depend on any parsing or
//! highlighting system. It provides the small, immutable per-language facts the editor engine
//! needs: comment tokens, completion lexicons and the word-character predicate.

mod lexicon;

pub use lexicon::{CompletionKind, LexiconGroup};

/// Languages with built-in support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    /// C#.
    CSharp,
    /// Python.
    Python,
    /// JavaScript.
    JavaScript,
    /// Plain text (no comments, no lexicon).
    PlainText,
}

impl Language {
    /// All built-in languages.
    pub const ALL: [Language; 4] = [
        Language::CSharp,
        Language::Python,
        Language::JavaScript,
        Language::PlainText,
    ];

    /// Human-readable name (e.g. `"C#"`).
    pub fn display_name(self) -> &'static str {
        match self {
            Language::CSharp => "C#",
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::PlainText => "Plain Text",
        }
    }

    /// Stable lowercase identifier (e.g. `"csharp"`).
    pub fn id(self) -> &'static str {
        match self {
            Language::CSharp => "csharp",
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::PlainText => "plain",
        }
    }

    /// Resolve a language from a name, id or common alias (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "c#" | "cs" | "csharp" => Some(Language::CSharp),
            "py" | "python" => Some(Language::Python),
            "js" | "javascript" | "ecmascript" => Some(Language::JavaScript),
            "plain" | "text" | "plain text" | "plaintext" | "txt" => Some(Language::PlainText),
            _ => None,
        }
    }

    /// Comment tokens for this language.
    pub fn comment_config(self) -> CommentConfig {
        match self {
            Language::CSharp | Language::JavaScript => CommentConfig::line_and_block("//", "/*", "*/"),
            Language::Python => CommentConfig::line("#"),
            Language::PlainText => CommentConfig::default(),
        }
    }

    /// Static completion lexicon, grouped by kind.
    pub fn lexicon(self) -> &'static [LexiconGroup] {
        match self {
            Language::CSharp => lexicon::CSHARP,
            Language::Python => lexicon::PYTHON,
            Language::JavaScript => lexicon::JAVASCRIPT,
            Language::PlainText => &[],
        }
    }

    /// Leading keywords that open an indentation block even without a trailing `:`.
    pub fn block_keywords(self) -> &'static [&'static str] {
        match self {
            Language::Python => PYTHON_BLOCK_KEYWORDS,
            _ => &[],
        }
    }
}

/// Line prefixes that open an indentation-delimited block in Python.
pub const PYTHON_BLOCK_KEYWORDS: &[&str] = &[
    "def ", "class ", "if ", "elif ", "else:", "for ", "while ", "try:", "except", "finally:",
    "with ", "async ",
];

/// Comment tokens/config for a given language.
///
/// The editor engine uses this for comment toggling and for the lexical scanner.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentConfig {
    /// Line comment token (e.g. `//`, `#`).
    pub line: Option<String>,
    /// Block comment start token (e.g. `/*`).
    pub block_start: Option<String>,
    /// Block comment end token (e.g. `*/`).
    pub block_end: Option<String>,
}

impl CommentConfig {
    /// Create a config that supports only line comments.
    pub fn line(token: impl Into<String>) -> Self {
        Self {
            line: Some(token.into()),
            block_start: None,
            block_end: None,
        }
    }

    /// Create a config that supports both line and block comments.
    pub fn line_and_block(
        line: impl Into<String>,
        block_start: impl Into<String>,
        block_end: impl Into<String>,
    ) -> Self {
        Self {
            line: Some(line.into()),
            block_start: Some(block_start.into()),
            block_end: Some(block_end.into()),
        }
    }

    /// Returns `true` if a line comment token is configured.
    pub fn has_line(&self) -> bool {
        self.line.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Returns `true` if both block comment tokens are configured.
    pub fn has_block(&self) -> bool {
        self.block_start.as_deref().is_some_and(|s| !s.is_empty())
            && self.block_end.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Word characters are letters, digits and `_`.
pub fn is_word_char(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

/// Case-insensitive `starts_with` using Unicode simple lowercase folding.
pub fn starts_with_ignore_case(word: &str, prefix: &str) -> bool {
    let mut word = word.chars().flat_map(char::to_lowercase);
    prefix
        .chars()
        .flat_map(char::to_lowercase)
        .all(|p| word.next() == Some(p))
}
