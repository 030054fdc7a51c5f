//! Completion suggestions for the word being typed.
//!
//! The word being typed (the *prefix*) is the longest run of word characters ending exactly at
//! the caret. [`LexiconCompletionProvider`] suggests entries of a static per-language lexicon
//! plus words already present in the document.

use crate::buffer::TextBuffer;
use crate::position::Position;
use codepad_lang::{Language, LexiconGroup, is_word_char, starts_with_ignore_case};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

pub use codepad_lang::CompletionKind;

/// Document words eligible as suggestions: three or more word characters, not starting with a digit.
static DOCUMENT_WORD: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z_]\w{2,}\b"));

fn document_word_pattern() -> Option<&'static Regex> {
    match LazyLock::force(&DOCUMENT_WORD) {
        Ok(regex) => Some(regex),
        Err(err) => {
            log::error!("document word pattern failed to compile; skipping document words: {err}");
            None
        }
    }
}

/// A single suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompletionItem {
    /// Text inserted in place of the prefix.
    pub text: String,
    /// Item kind.
    pub kind: CompletionKind,
    /// Short description (e.g. `"keyword"`, `"document word"`).
    pub description: String,
}

impl CompletionItem {
    /// Create an item.
    pub fn new(text: impl Into<String>, kind: CompletionKind, description: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
            description: description.into(),
        }
    }
}

/// A source of completion suggestions.
pub trait CompletionProvider: Send + Sync {
    /// Suggestions for `prefix` typed at `caret` in `text`. `prefix` is never empty.
    fn completions(&self, text: &str, caret: Position, prefix: &str) -> Vec<CompletionItem>;
}

/// Static lexicon plus document words.
#[derive(Debug, Clone, Copy)]
pub struct LexiconCompletionProvider {
    groups: &'static [LexiconGroup],
}

impl LexiconCompletionProvider {
    /// A provider over `groups`.
    pub fn new(groups: &'static [LexiconGroup]) -> Self {
        Self { groups }
    }

    /// The lexicon of a built-in language.
    pub fn for_language(language: Language) -> Self {
        Self::new(language.lexicon())
    }
}

impl CompletionProvider for LexiconCompletionProvider {
    fn completions(&self, text: &str, _caret: Position, prefix: &str) -> Vec<CompletionItem> {
        if prefix.is_empty() {
            return Vec::new();
        }

        let mut items = Vec::new();
        let mut seen = HashSet::new();
        for group in self.groups {
            for word in group.words {
                if starts_with_ignore_case(word, prefix) && seen.insert(*word) {
                    items.push(CompletionItem::new(*word, group.kind, group.description));
                }
            }
        }

        if let Some(words) = document_word_pattern() {
            for m in words.find_iter(text) {
                let word = m.as_str();
                if word != prefix && starts_with_ignore_case(word, prefix) && seen.insert(word) {
                    items.push(CompletionItem::new(word, CompletionKind::Variable, "document word"));
                }
            }
        }

        items
    }
}

/// The word being typed at `caret`: the word characters immediately before it.
pub fn completion_prefix(buffer: &TextBuffer, caret: Position) -> String {
    let caret = buffer.clamp(caret);
    let line: Vec<char> = buffer.line(caret.line).chars().collect();
    let end = caret.column.min(line.len());
    let start = line[..end]
        .iter()
        .rposition(|&ch| !is_word_char(ch))
        .map_or(0, |i| i + 1);
    line[start..end].iter().collect()
}

/// Ask `provider` for suggestions, applying the popup rules: an empty prefix, or a single
/// suggestion equal to the prefix, yields nothing.
pub fn complete(
    provider: &dyn CompletionProvider,
    text: &str,
    caret: Position,
    prefix: &str,
) -> Vec<CompletionItem> {
    if prefix.is_empty() {
        return Vec::new();
    }
    let items = provider.completions(text, caret, prefix);
    if let [only] = items.as_slice()
        && only.text == prefix
    {
        return Vec::new();
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[CompletionItem]) -> Vec<&str> {
        items.iter().map(|i| i.text.as_str()).collect()
    }

    #[test]
    fn test_prefix_extraction() {
        let buffer = TextBuffer::from_text("let foo_b = 1;");
        assert_eq!(completion_prefix(&buffer, Position::new(0, 9)), "foo_b");
        assert_eq!(completion_prefix(&buffer, Position::new(0, 4)), "");
        assert_eq!(completion_prefix(&buffer, Position::new(0, 2)), "le");
    }

    #[test]
    fn test_lexicon_matches_case_insensitively() {
        let provider = LexiconCompletionProvider::for_language(Language::Python);
        let items = provider.completions("", Position::ZERO, "NON");
        assert!(texts(&items).contains(&"None"));
        assert!(texts(&items).contains(&"nonlocal"));
    }

    #[test]
    fn test_document_word_pattern_compiles() {
        assert!(LazyLock::force(&DOCUMENT_WORD).is_ok());
        let words = document_word_pattern().unwrap();
        let found: Vec<&str> = words.find_iter("x ab abc 9abc _ok1").map(|m| m.as_str()).collect();
        assert_eq!(found, vec!["abc", "_ok1"]);
    }

    #[test]
    fn test_document_words_deduplicated() {
        let provider = LexiconCompletionProvider::new(&[]);
        let text = "counter = count + counter\ncou";
        let items = provider.completions(text, Position::new(1, 3), "cou");
        assert_eq!(texts(&items), vec!["counter", "count"]);
        assert!(items.iter().all(|i| i.kind == CompletionKind::Variable));
    }

    #[test]
    fn test_single_exact_match_is_suppressed() {
        let provider = LexiconCompletionProvider::for_language(Language::Python);
        assert!(complete(&provider, "", Position::ZERO, "yield").is_empty());
        assert!(complete(&provider, "", Position::ZERO, "").is_empty());
        assert!(!complete(&provider, "", Position::ZERO, "yi").is_empty());
    }
}
