//! Regex-based syntax highlighting.
//!
//! A [`Ruleset`] is an ordered list of [`SyntaxRule`]s. Every rule runs over the **whole
//! document** (so block comments, triple-quoted strings and template literals match across
//! lines), and the resulting spans are sliced per line into contiguous [`ColorRun`]s:
//!
//! 1. every character starts in the ruleset's default style;
//! 2. spans are applied in rule order, and a character keeps the style of the first rule that
//!    claimed it;
//! 3. exclusion spans (matches of a rule's exclusion pattern inside its own matches) revert the
//!    characters that rule claimed back to the default style;
//! 4. adjacent characters with equal styles are coalesced.
//!
//! [`Highlighter`] caches the spans against the buffer version and the runs per line, so a
//! burst of edits costs one rebuild on the next query.

use crate::buffer::TextBuffer;
use bitflags::bitflags;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha (255 is opaque).
    pub a: u8,
}

impl Color {
    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// A color with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

bitflags! {
    /// Font style flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FontStyle: u8 {
        /// Bold weight.
        const BOLD = 0b0001;
        /// Italic.
        const ITALIC = 0b0010;
        /// Underlined.
        const UNDERLINE = 0b0100;
    }
}

/// Foreground color plus font style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextStyle {
    /// Foreground color.
    pub color: Color,
    /// Font style flags.
    pub font: FontStyle,
}

impl TextStyle {
    /// A regular-weight style.
    pub const fn new(color: Color) -> Self {
        Self {
            color,
            font: FontStyle::empty(),
        }
    }

    /// A style with explicit font flags.
    pub const fn with_font(color: Color, font: FontStyle) -> Self {
        Self { color, font }
    }
}

/// Non-text colors carried by a ruleset for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Theme {
    /// Editor background.
    pub background: Color,
    /// Gutter (line number) foreground.
    pub line_number_foreground: Color,
    /// Gutter (line number) background.
    pub line_number_background: Color,
    /// Current line highlight.
    pub current_line: Color,
    /// Selection fill.
    pub selection: Color,
    /// Caret.
    pub caret: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::rgb(30, 30, 30),
            line_number_foreground: Color::rgb(110, 118, 129),
            line_number_background: Color::rgb(30, 30, 30),
            current_line: Color::rgb(40, 40, 40),
            selection: Color::rgba(60, 120, 200, 100),
            caret: Color::rgb(220, 220, 220),
        }
    }
}

/// Default foreground color for unstyled text.
pub const DEFAULT_FOREGROUND: Color = Color::rgb(212, 212, 212);

/// Ruleset construction errors.
#[derive(Debug, thiserror::Error)]
pub enum RulesetError {
    #[error("invalid pattern for rule `{rule}`: {source}")]
    /// A rule's pattern (or exclusion pattern) failed to compile.
    InvalidPattern {
        /// Rule name.
        rule: String,
        /// The offending pattern.
        pattern: String,
        /// Compile error.
        #[source]
        source: regex::Error,
    },
    #[error("unknown ruleset `{0}`")]
    /// No built-in ruleset has this name.
    UnknownRuleset(String),
}

fn compile(rule: &str, pattern: &str) -> Result<Regex, RulesetError> {
    RegexBuilder::new(pattern)
        .multi_line(true)
        .build()
        .map_err(|source| RulesetError::InvalidPattern {
            rule: rule.to_string(),
            pattern: pattern.to_string(),
            source,
        })
}

/// A single highlighting rule.
#[derive(Debug, Clone)]
pub struct SyntaxRule {
    name: String,
    regex: Regex,
    style: TextStyle,
    exclude: Option<Regex>,
}

impl SyntaxRule {
    /// Compile a rule. `^` and `$` match at line boundaries.
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        style: TextStyle,
    ) -> Result<Self, RulesetError> {
        let name = name.into();
        let regex = compile(&name, pattern)?;
        Ok(Self {
            name,
            regex,
            style,
            exclude: None,
        })
    }

    /// Revert the parts of each match that match `pattern` back to the default style.
    ///
    /// Example: pattern `"[^"]*"` with exclusion `\{[^}]*\}` leaves interpolation holes unstyled.
    pub fn with_exclusion(mut self, pattern: &str) -> Result<Self, RulesetError> {
        self.exclude = Some(compile(&self.name, pattern)?);
        Ok(self)
    }

    /// Rule name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source of the match pattern.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Style applied to matches.
    pub fn style(&self) -> TextStyle {
        self.style
    }

    /// Source of the exclusion pattern, if any.
    pub fn exclusion_pattern(&self) -> Option<&str> {
        self.exclude.as_ref().map(Regex::as_str)
    }
}

/// An ordered rule list with its default style and theme.
#[derive(Debug, Clone)]
pub struct Ruleset {
    name: String,
    rules: Vec<SyntaxRule>,
    default_style: TextStyle,
    theme: Theme,
    line_comment: Option<String>,
}

impl Ruleset {
    /// An empty ruleset with the default style and theme.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            default_style: TextStyle::new(DEFAULT_FOREGROUND),
            theme: Theme::default(),
            line_comment: None,
        }
    }

    /// The plain-text ruleset (no rules).
    pub fn plain_text() -> Self {
        Self::new("Plain Text")
    }

    /// Append a rule (lowest priority so far).
    pub fn push(&mut self, rule: SyntaxRule) {
        self.rules.push(rule);
    }

    /// Builder-style [`push`](Self::push).
    pub fn with_rule(mut self, rule: SyntaxRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Compile and append a rule.
    pub fn add_rule(
        &mut self,
        name: &str,
        pattern: &str,
        style: TextStyle,
    ) -> Result<&mut Self, RulesetError> {
        self.rules.push(SyntaxRule::new(name, pattern, style)?);
        Ok(self)
    }

    /// Set the style of unclaimed characters.
    pub fn with_default_style(mut self, style: TextStyle) -> Self {
        self.default_style = style;
        self
    }

    /// Set the theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Set the line comment token.
    pub fn with_line_comment(mut self, token: impl Into<String>) -> Self {
        self.line_comment = Some(token.into());
        self
    }

    /// Language name (e.g. `"C#"`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rules in priority order.
    pub fn rules(&self) -> &[SyntaxRule] {
        &self.rules
    }

    /// Style of unclaimed characters.
    pub fn default_style(&self) -> TextStyle {
        self.default_style
    }

    /// The theme.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Token used by comment toggling, if the language has line comments.
    pub fn line_comment(&self) -> Option<&str> {
        self.line_comment.as_deref()
    }
}

impl Default for Ruleset {
    fn default() -> Self {
        Self::plain_text()
    }
}

/// A run of characters sharing one style, in character columns of its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRun {
    /// First column of the run.
    pub start: usize,
    /// Number of characters.
    pub length: usize,
    /// Style of the run.
    pub style: TextStyle,
}

impl ColorRun {
    /// Column after the last character.
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// A span restricted to one line; `end == None` means "to the end of the line".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineSpan {
    start: usize,
    end: Option<usize>,
    rule: usize,
}

#[derive(Debug, Default, Clone)]
struct LineSpans {
    claims: Vec<LineSpan>,
    exclusions: Vec<LineSpan>,
}

/// Match every rule against the whole document and bucket the spans by line.
fn collect_spans(ruleset: &Ruleset, buffer: &TextBuffer) -> Vec<LineSpans> {
    let text = buffer.text();
    let index = buffer.line_index();
    let mut lines = vec![LineSpans::default(); buffer.line_count()];

    let add = |lines: &mut Vec<LineSpans>, start: usize, end: usize, rule: usize, exclusion: bool| {
        if start >= end {
            return;
        }
        let from = index.byte_to_position(start);
        let to = index.byte_to_position(end);
        for line in from.line..=to.line.min(lines.len().saturating_sub(1)) {
            let span = LineSpan {
                start: if line == from.line { from.column } else { 0 },
                end: if line == to.line { Some(to.column) } else { None },
                rule,
            };
            if span.end.is_some_and(|end| end <= span.start) {
                continue;
            }
            let bucket = &mut lines[line];
            if exclusion {
                bucket.exclusions.push(span);
            } else {
                bucket.claims.push(span);
            }
        }
    };

    for (rule_idx, rule) in ruleset.rules.iter().enumerate() {
        for m in rule.regex.find_iter(&text) {
            if m.is_empty() {
                continue;
            }
            add(&mut lines, m.start(), m.end(), rule_idx, false);

            if let Some(exclude) = &rule.exclude {
                for inner in exclude.find_iter(m.as_str()) {
                    add(
                        &mut lines,
                        m.start() + inner.start(),
                        m.start() + inner.end(),
                        rule_idx,
                        true,
                    );
                }
            }
        }
    }

    lines
}

/// Resolve one line's spans into coalesced runs.
fn resolve_runs(ruleset: &Ruleset, spans: &LineSpans, line_len: usize) -> Vec<ColorRun> {
    if line_len == 0 {
        return Vec::new();
    }

    let mut owner: Vec<Option<usize>> = vec![None; line_len];
    for span in &spans.claims {
        let end = span.end.unwrap_or(line_len).min(line_len);
        for slot in owner.iter_mut().take(end).skip(span.start) {
            if slot.is_none() {
                *slot = Some(span.rule);
            }
        }
    }
    for span in &spans.exclusions {
        let end = span.end.unwrap_or(line_len).min(line_len);
        for slot in owner.iter_mut().take(end).skip(span.start) {
            *slot = None;
        }
    }

    let style_of = |slot: Option<usize>| match slot {
        Some(rule) => ruleset.rules[rule].style,
        None => ruleset.default_style,
    };

    let mut runs: Vec<ColorRun> = Vec::new();
    for (column, slot) in owner.into_iter().enumerate() {
        let style = style_of(slot);
        match runs.last_mut() {
            Some(run) if run.style == style => run.length += 1,
            _ => runs.push(ColorRun {
                start: column,
                length: 1,
                style,
            }),
        }
    }
    runs
}

/// Lazily rebuilt highlighting cache for one buffer.
#[derive(Debug)]
pub struct Highlighter {
    ruleset: Arc<Ruleset>,
    spans: Vec<LineSpans>,
    runs: Vec<Option<Vec<ColorRun>>>,
    built_for: Option<u64>,
}

impl Highlighter {
    /// Create an empty cache for `ruleset`.
    pub fn new(ruleset: Arc<Ruleset>) -> Self {
        Self {
            ruleset,
            spans: Vec::new(),
            runs: Vec::new(),
            built_for: None,
        }
    }

    /// The active ruleset.
    pub fn ruleset(&self) -> &Arc<Ruleset> {
        &self.ruleset
    }

    /// Swap the ruleset; the next query rebuilds.
    pub fn set_ruleset(&mut self, ruleset: Arc<Ruleset>) {
        self.ruleset = ruleset;
        self.invalidate();
    }

    /// Drop cached spans and runs.
    pub fn invalidate(&mut self) {
        self.built_for = None;
    }

    /// Returns `true` if the cache does not match `buffer`'s version.
    pub fn is_dirty(&self, buffer: &TextBuffer) -> bool {
        self.built_for != Some(buffer.version())
    }

    fn ensure_built(&mut self, buffer: &TextBuffer) {
        if !self.is_dirty(buffer) {
            return;
        }
        self.spans = collect_spans(&self.ruleset, buffer);
        self.runs = vec![None; self.spans.len()];
        self.built_for = Some(buffer.version());
        log::debug!(
            "highlight rebuild: ruleset={} lines={} spans={}",
            self.ruleset.name(),
            self.spans.len(),
            self.spans.iter().map(|l| l.claims.len()).sum::<usize>()
        );
    }

    /// Color runs for `line`; empty for empty or out-of-range lines.
    pub fn runs_for_line(&mut self, buffer: &TextBuffer, line: usize) -> &[ColorRun] {
        self.ensure_built(buffer);
        let Some(slot) = self.runs.get_mut(line) else {
            return &[];
        };
        if slot.is_none() {
            let line_len = buffer.line_len(line);
            *slot = Some(resolve_runs(&self.ruleset, &self.spans[line], line_len));
        }
        slot.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    const STRING: TextStyle = TextStyle::new(Color::rgb(206, 145, 120));
    const COMMENT: TextStyle = TextStyle::with_font(Color::rgb(106, 153, 85), FontStyle::ITALIC);
    const KEYWORD: TextStyle = TextStyle::with_font(Color::rgb(86, 156, 214), FontStyle::BOLD);

    fn ruleset() -> Ruleset {
        let mut rs = Ruleset::new("test");
        rs.add_rule("Comment", r"//.*$|/\*[\s\S]*?\*/", COMMENT).unwrap();
        rs.add_rule("String", r#""(?:[^"\\]|\\.)*""#, STRING).unwrap();
        rs.add_rule("Keyword", r"\b(?:if|return)\b", KEYWORD).unwrap();
        rs
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = SyntaxRule::new("Broken", "(unclosed", STRING).unwrap_err();
        assert!(matches!(err, RulesetError::InvalidPattern { ref rule, .. } if rule == "Broken"));
        let err = SyntaxRule::new("Ok", "a", STRING)
            .unwrap()
            .with_exclusion("[")
            .unwrap_err();
        assert!(err.to_string().contains("Ok"));
    }

    #[test]
    fn test_runs_are_gap_free() {
        let buffer = TextBuffer::from_text("if x return \"s\" // c");
        let mut hl = Highlighter::new(Arc::new(ruleset()));
        let runs = hl.runs_for_line(&buffer, 0).to_vec();
        let mut col = 0;
        for run in &runs {
            assert_eq!(run.start, col);
            assert!(run.length > 0);
            col = run.end();
        }
        assert_eq!(col, buffer.line_len(0));
        assert_eq!(runs[0].style, KEYWORD);
        assert_eq!(runs.last().map(|r| r.style), Some(COMMENT));
    }

    #[test]
    fn test_first_claim_wins() {
        let buffer = TextBuffer::from_text("// if \"x\"");
        let mut hl = Highlighter::new(Arc::new(ruleset()));
        let runs = hl.runs_for_line(&buffer, 0);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].style, COMMENT);
    }

    #[test]
    fn test_empty_line_has_no_runs() {
        let buffer = TextBuffer::from_text("a\n\nb");
        let mut hl = Highlighter::new(Arc::new(ruleset()));
        assert!(hl.runs_for_line(&buffer, 1).is_empty());
        assert!(hl.runs_for_line(&buffer, 42).is_empty());
    }

    #[test]
    fn test_zero_length_matches_are_ignored() {
        let mut rs = Ruleset::new("zero");
        rs.add_rule("Empty", r"x*", KEYWORD).unwrap();
        let buffer = TextBuffer::from_text("abc");
        let mut hl = Highlighter::new(Arc::new(rs));
        let runs = hl.runs_for_line(&buffer, 0);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].style, TextStyle::new(DEFAULT_FOREGROUND));
    }

    #[test]
    fn test_cache_follows_buffer_version() {
        let mut buffer = TextBuffer::from_text("x");
        let mut hl = Highlighter::new(Arc::new(ruleset()));
        assert_eq!(hl.runs_for_line(&buffer, 0)[0].style, TextStyle::new(DEFAULT_FOREGROUND));
        assert!(!hl.is_dirty(&buffer));

        buffer.insert(Position::ZERO, "if ");
        assert!(hl.is_dirty(&buffer));
        assert_eq!(hl.runs_for_line(&buffer, 0)[0].style, KEYWORD);
    }

    #[test]
    fn test_exclusion_reverts_earlier_claims() {
        let mut rs = Ruleset::new("excl");
        rs.add_rule("Comment", r"//.*$", COMMENT).unwrap();
        rs.push(
            SyntaxRule::new("String", r#""[^"]*""#, STRING)
                .unwrap()
                .with_exclusion(r"\{[^}]*\}")
                .unwrap(),
        );
        let default = rs.default_style();
        let buffer = TextBuffer::from_text("// \"a{b}c\"");
        let mut hl = Highlighter::new(Arc::new(rs));
        let runs = hl.runs_for_line(&buffer, 0).to_vec();
        let spans: Vec<(usize, usize, TextStyle)> =
            runs.iter().map(|r| (r.start, r.length, r.style)).collect();
        assert_eq!(
            spans,
            vec![(0, 5, COMMENT), (5, 3, default), (8, 2, COMMENT)]
        );
    }
}
