//! Find and replace over a [`TextBuffer`].
//!
//! Queries are plain text (escaped into a regex) or regex patterns, optionally case-insensitive
//! and whole-word. Matches are reported as [`Range`]s in (line, column) coordinates; empty matches
//! are never reported.

use crate::buffer::TextBuffer;
use crate::position::{Position, Range};
use codepad_lang::is_word_char;
use regex::{Regex, RegexBuilder};

/// Options that control how search is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// If `true`, performs a case-sensitive search.
    pub case_sensitive: bool,
    /// If `true`, matches only whole words (alphanumeric and `_`).
    pub whole_word: bool,
    /// If `true`, treats the query as a regex pattern.
    pub regex: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            whole_word: false,
            regex: false,
        }
    }
}

impl SearchOptions {
    /// Literal, case-sensitive matching.
    pub fn plain() -> Self {
        Self::default()
    }

    /// Regex, case-sensitive matching.
    pub fn regex() -> Self {
        Self {
            regex: true,
            ..Self::default()
        }
    }

    /// Match regardless of case.
    pub fn ignore_case(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    /// Only match whole words.
    pub fn whole_word(mut self) -> Self {
        self.whole_word = true;
        self
    }
}

/// Search errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The provided regex pattern failed to compile.
    #[error("invalid regex: {0}")]
    InvalidRegex(#[from] regex::Error),
}

/// A compiled query.
#[derive(Debug, Clone)]
pub struct Query {
    regex: Regex,
    options: SearchOptions,
}

impl Query {
    /// Compile `query` under `options`.
    pub fn new(query: &str, options: SearchOptions) -> Result<Self, SearchError> {
        let pattern = if options.regex {
            query.to_string()
        } else {
            regex::escape(query)
        };
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(!options.case_sensitive)
            .multi_line(true)
            .build()?;
        Ok(Self { regex, options })
    }

    /// Byte ranges of every non-empty match in `text`.
    fn byte_matches<'t>(&'t self, text: &'t str) -> impl Iterator<Item = regex::Captures<'t>> + 't {
        self.regex.captures_iter(text).filter(move |caps| {
            let Some(m) = caps.get(0) else {
                return false;
            };
            !m.is_empty() && (!self.options.whole_word || is_whole_word(text, m.start(), m.end()))
        })
    }
}

fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

/// Find all occurrences of `query` in the buffer, in document order.
///
/// An empty query finds nothing.
pub fn find_all(
    buffer: &TextBuffer,
    query: &str,
    options: SearchOptions,
) -> Result<Vec<Range>, SearchError> {
    if query.is_empty() {
        return Ok(Vec::new());
    }
    let query = Query::new(query, options)?;
    let text = buffer.text();
    let index = buffer.line_index();
    Ok(query
        .byte_matches(&text)
        .filter_map(|caps| caps.get(0))
        .map(|m| {
            Range::new(
                index.byte_to_position(m.start()),
                index.byte_to_position(m.end()),
            )
        })
        .collect())
}

/// Find the first match starting at or after `from`, wrapping around to the top.
pub fn find_next(
    buffer: &TextBuffer,
    query: &str,
    options: SearchOptions,
    from: Position,
) -> Result<Option<Range>, SearchError> {
    let matches = find_all(buffer, query, options)?;
    let from = buffer.clamp(from);
    Ok(matches
        .iter()
        .find(|range| range.start >= from)
        .or_else(|| matches.first())
        .copied())
}

/// Find the last match ending at or before `from`, wrapping around to the bottom.
pub fn find_prev(
    buffer: &TextBuffer,
    query: &str,
    options: SearchOptions,
    from: Position,
) -> Result<Option<Range>, SearchError> {
    let matches = find_all(buffer, query, options)?;
    let from = buffer.clamp(from);
    Ok(matches
        .iter()
        .rev()
        .find(|range| range.end <= from)
        .or_else(|| matches.last())
        .copied())
}

/// One planned replacement: the matched range and its replacement text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Matched range in the current text.
    pub range: Range,
    /// Text to put in its place (regex group references already expanded).
    pub text: String,
}

/// Compute every replacement for `query`, in document order.
///
/// In regex mode `$1`/`${name}` in `replacement` expand to capture groups; in plain mode the
/// replacement is literal.
pub fn plan_replacements(
    buffer: &TextBuffer,
    query: &str,
    replacement: &str,
    options: SearchOptions,
) -> Result<Vec<Replacement>, SearchError> {
    if query.is_empty() {
        return Ok(Vec::new());
    }
    let compiled = Query::new(query, options)?;
    let text = buffer.text();
    let index = buffer.line_index();

    let mut plan = Vec::new();
    for caps in compiled.byte_matches(&text) {
        let Some(m) = caps.get(0) else {
            continue;
        };
        let mut expanded = String::new();
        if options.regex {
            caps.expand(replacement, &mut expanded);
        } else {
            expanded.push_str(replacement);
        }
        plan.push(Replacement {
            range: Range::new(
                index.byte_to_position(m.start()),
                index.byte_to_position(m.end()),
            ),
            text: expanded,
        });
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_all_multiline_positions() {
        let buffer = TextBuffer::from_text("foo bar\nbaz foo");
        let matches = find_all(&buffer, "foo", SearchOptions::default()).unwrap();
        assert_eq!(
            matches,
            vec![
                Range::new(Position::new(0, 0), Position::new(0, 3)),
                Range::new(Position::new(1, 4), Position::new(1, 7)),
            ]
        );
    }

    #[test]
    fn test_whole_word_and_case() {
        let buffer = TextBuffer::from_text("Foo food foo_bar foo");
        let options = SearchOptions::default().whole_word().ignore_case();
        let matches = find_all(&buffer, "foo", options).unwrap();
        let columns: Vec<_> = matches.iter().map(|r| r.start.column).collect();
        assert_eq!(columns, vec![0, 17]);
    }

    #[test]
    fn test_invalid_regex() {
        let buffer = TextBuffer::from_text("x");
        assert!(matches!(
            find_all(&buffer, "(", SearchOptions::regex()),
            Err(SearchError::InvalidRegex(_))
        ));
        assert!(find_all(&buffer, "(", SearchOptions::plain()).unwrap().is_empty());
    }

    #[test]
    fn test_find_next_wraps() {
        let buffer = TextBuffer::from_text("ab ab");
        let next = find_next(&buffer, "ab", SearchOptions::default(), Position::new(0, 1)).unwrap();
        assert_eq!(next.map(|r| r.start.column), Some(3));
        let wrapped = find_next(&buffer, "ab", SearchOptions::default(), Position::new(0, 4)).unwrap();
        assert_eq!(wrapped.map(|r| r.start.column), Some(0));
        let prev = find_prev(&buffer, "ab", SearchOptions::default(), Position::new(0, 4)).unwrap();
        assert_eq!(prev.map(|r| r.start.column), Some(0));
    }

    #[test]
    fn test_regex_replacement_expands_groups() {
        let buffer = TextBuffer::from_text("a=1, b=2");
        let plan = plan_replacements(&buffer, r"(\w)=(\d)", "$2=$1", SearchOptions::regex()).unwrap();
        let texts: Vec<_> = plan.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["1=a", "2=b"]);
    }

    #[test]
    fn test_non_ascii_columns() {
        let buffer = TextBuffer::from_text("héllo wörld");
        let matches = find_all(&buffer, "wörld", SearchOptions::default()).unwrap();
        assert_eq!(matches[0].start, Position::new(0, 6));
        assert_eq!(matches[0].end, Position::new(0, 11));
    }
}
