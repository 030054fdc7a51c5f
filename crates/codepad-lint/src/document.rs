//! The scanned document every check reads, and the report every check writes to.

use std::sync::LazyLock;

use codepad_core::text::{column_of_byte, indent_len};
use codepad_core::{
    AnalysisContext, AnalyzerError, Diagnostic, LexicalScan, ScanSyntax, ScannedLine, Severity,
};
use codepad_lang::Language;
use regex::Match;

use crate::RuleFilter;

/// Value of [`Diagnostic::source`] for everything this crate reports.
pub(crate) const SOURCE: &str = "codepad-lint";

/// Patterns compiled once per process.
pub(crate) type Compiled<T> = LazyLock<Result<T, regex::Error>>;

/// Borrow a compiled pattern set, surfacing a compile failure as an analyzer error.
pub(crate) fn compiled<T>(patterns: &'static Compiled<T>) -> Result<&'static T, AnalyzerError> {
    LazyLock::force(patterns)
        .as_ref()
        .map_err(|err| AnalyzerError::Pattern(err.clone()))
}

pub(crate) struct Document<'a> {
    scan: LexicalScan,
    context: Option<&'a AnalysisContext>,
}

impl<'a> Document<'a> {
    pub(crate) fn new(text: &str, language: Language, context: Option<&'a AnalysisContext>) -> Self {
        Self {
            scan: LexicalScan::new(text, &ScanSyntax::for_language(language)),
            context,
        }
    }

    pub(crate) fn scan(&self) -> &LexicalScan {
        &self.scan
    }

    pub(crate) fn line_count(&self) -> usize {
        self.scan.line_count()
    }

    pub(crate) fn scanned(&self, line: usize) -> Option<&ScannedLine> {
        self.scan.line(line)
    }

    /// Original text of `line`.
    pub(crate) fn text(&self, line: usize) -> &str {
        self.scan.line(line).map_or("", ScannedLine::text)
    }

    /// Masked text of `line`: comments and string bodies are spaces.
    pub(crate) fn code(&self, line: usize) -> &str {
        self.scan.line(line).map_or("", ScannedLine::code)
    }

    pub(crate) fn indent(&self, line: usize) -> usize {
        indent_len(self.text(line))
    }

    /// Column right after the last non-whitespace character of `line`.
    pub(crate) fn text_end(&self, line: usize) -> usize {
        self.text(line).trim_end().chars().count()
    }

    /// Column right after the last code character of `line`.
    pub(crate) fn code_end(&self, line: usize) -> usize {
        self.code(line).trim_end().chars().count()
    }

    /// Returns `true` if the masked text of `line` is not blank.
    ///
    /// A line that closes a multi-line literal counts when code follows the closing delimiter.
    pub(crate) fn is_code(&self, line: usize) -> bool {
        self.scan
            .line(line)
            .is_some_and(|scanned| !scanned.is_code_blank())
    }

    /// Returns `true` if `line` begins inside a multi-line literal, so its indentation is text.
    pub(crate) fn starts_in_string(&self, line: usize) -> bool {
        self.scan.line(line).is_some_and(ScannedLine::starts_in_string)
    }

    /// Lines holding code, in document order.
    pub(crate) fn code_lines(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.line_count()).filter(|&line| self.is_code(line))
    }

    /// The first code line after `line`.
    pub(crate) fn next_code_line(&self, line: usize) -> Option<usize> {
        (line + 1..self.line_count()).find(|&next| self.is_code(next))
    }

    /// The first line after `line` that is not blank (comments count as content).
    pub(crate) fn next_nonblank_line(&self, line: usize) -> Option<usize> {
        (line + 1..self.line_count()).find(|&next| !self.text(next).trim().is_empty())
    }

    /// Returns `true` if the analysis context declares `name` in another file.
    pub(crate) fn defines(&self, name: &str) -> bool {
        self.context.is_some_and(|context| context.defines(name))
    }
}

/// Collects diagnostics, dropping the ones the rule filter turns off.
pub(crate) struct Report<'f> {
    language: &'static str,
    rules: &'f RuleFilter,
    items: Vec<Diagnostic>,
}

impl<'f> Report<'f> {
    pub(crate) fn new(language: &'static str, rules: &'f RuleFilter) -> Self {
        Self {
            language,
            rules,
            items: Vec::new(),
        }
    }

    /// Returns `true` if diagnostics with `code` are kept.
    pub(crate) fn wants(&self, code: &str) -> bool {
        self.rules.allows(code)
    }

    pub(crate) fn add(
        &mut self,
        code: &'static str,
        line: usize,
        column: usize,
        length: usize,
        severity: Severity,
        message: impl Into<String>,
    ) {
        if !self.rules.allows(code) {
            return;
        }
        self.items.push(
            Diagnostic::new(line, column, length.max(1), severity, message)
                .with_code(code)
                .with_source(SOURCE),
        );
    }

    /// Report a regex match found in `haystack`, which must be `line`'s text or masked code.
    pub(crate) fn add_match(
        &mut self,
        code: &'static str,
        line: usize,
        haystack: &str,
        found: Match<'_>,
        severity: Severity,
        message: impl Into<String>,
    ) {
        let column = column_of_byte(haystack, found.start());
        let length = found.as_str().chars().count();
        self.add(code, line, column, length, severity, message);
    }

    pub(crate) fn finish(self) -> Vec<Diagnostic> {
        log::debug!(
            "{} analysis produced {} diagnostics",
            self.language,
            self.items.len()
        );
        self.items
    }
}
