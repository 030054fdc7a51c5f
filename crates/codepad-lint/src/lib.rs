//! `codepad-lint` - pattern-based diagnostic analyzers for `codepad-core`.
//!
//! Every analyzer implements [`DiagnosticProvider`] and is a pure function of the document text
//! plus an optional [`AnalysisContext`]. Checks run on the masked code produced by the core's
//! lexical scanner, so nothing inside a comment or a string literal is reported as code.
//!
//! Each diagnostic carries a rule code from [`codes`]; a [`RuleFilter`] switches rules on or off.
//!
//! ```
//! use codepad_core::{DiagnosticProvider, Language};
//!
//! let analyzer = codepad_lint::analyzer_for(Language::JavaScript).unwrap();
//! let diagnostics = analyzer.analyze("var x = 1;\n", None).unwrap();
//! assert!(diagnostics.iter().any(|d| d.code.as_deref() == Some(codepad_lint::codes::VAR_USAGE)));
//! ```

mod common;
mod csharp;
mod document;
mod javascript;
mod python;

use std::collections::BTreeSet;
use std::sync::Arc;

use codepad_core::DiagnosticProvider;
use codepad_lang::Language;

pub use csharp::CSharpAnalyzer;
pub use javascript::JavaScriptAnalyzer;
pub use python::PythonAnalyzer;

/// Rule codes attached to every diagnostic as [`codepad_core::Diagnostic::code`].
pub mod codes {
    // Shared by all languages.
    pub const BRACKET_BALANCE: &str = "bracket-balance";
    pub const UNTERMINATED_STRING: &str = "unterminated-string";
    pub const TYPO: &str = "typo";
    pub const DUPLICATE_DECLARATION: &str = "duplicate-declaration";
    pub const UNREACHABLE_CODE: &str = "unreachable-code";
    pub const EMPTY_BLOCK: &str = "empty-block";
    pub const ASSIGNMENT_IN_CONDITION: &str = "assignment-in-condition";
    pub const MISSING_SEMICOLON: &str = "missing-semicolon";
    pub const DUPLICATE_KEY: &str = "duplicate-key";

    // C#
    pub const EMPTY_CATCH: &str = "empty-catch";
    pub const UNUSED_VARIABLE: &str = "unused-variable";
    pub const EMPTY_CONSOLE_WRITE: &str = "empty-console-write";
    pub const THIS_QUALIFIER: &str = "this-qualifier";
    pub const KEYWORD_TYPE_NAME: &str = "keyword-type-name";

    // Python
    pub const INDENTATION: &str = "indentation";
    pub const MIXED_INDENTATION: &str = "mixed-indentation";
    pub const MISSING_COLON: &str = "missing-colon";
    pub const MUTABLE_DEFAULT: &str = "mutable-default";
    pub const BARE_EXCEPT: &str = "bare-except";
    pub const NONE_COMPARISON: &str = "none-comparison";
    pub const BOOL_COMPARISON: &str = "bool-comparison";
    pub const TYPE_COMPARISON: &str = "type-comparison";

    // JavaScript
    pub const VAR_USAGE: &str = "var-usage";
    pub const STRICT_EQUALITY: &str = "strict-equality";
    pub const CONSOLE_LOG: &str = "console-log";
    pub const UNDEFINED_COMPARISON: &str = "undefined-comparison";
    pub const UNDEFINED_INIT: &str = "undefined-init";
    pub const PREFER_ARROW: &str = "prefer-arrow";
}

/// Selects which rule codes an analyzer reports.
///
/// The default filter allows everything. [`RuleFilter::only`] restricts reporting to a set of
/// codes; [`RuleFilter::disable`] removes single codes from whatever is allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleFilter {
    only: Option<BTreeSet<String>>,
    disabled: BTreeSet<String>,
}

impl RuleFilter {
    /// Allow every rule.
    pub fn all() -> Self {
        Self::default()
    }

    /// Allow only the listed rule codes.
    pub fn only<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            only: Some(codes.into_iter().map(Into::into).collect()),
            disabled: BTreeSet::new(),
        }
    }

    /// Turn one rule off.
    pub fn disable(mut self, code: impl Into<String>) -> Self {
        self.disabled.insert(code.into());
        self
    }

    /// Returns `true` if diagnostics with `code` are reported.
    pub fn allows(&self, code: &str) -> bool {
        if self.disabled.contains(code) {
            return false;
        }
        self.only.as_ref().is_none_or(|only| only.contains(code))
    }
}

/// The built-in analyzer for `language`, or `None` for plain text.
pub fn analyzer_for(language: Language) -> Option<Arc<dyn DiagnosticProvider>> {
    analyzer_with_rules(language, RuleFilter::all())
}

/// Like [`analyzer_for`], reporting only what `rules` allows.
pub fn analyzer_with_rules(
    language: Language,
    rules: RuleFilter,
) -> Option<Arc<dyn DiagnosticProvider>> {
    match language {
        Language::CSharp => Some(Arc::new(CSharpAnalyzer::with_rules(rules))),
        Language::Python => Some(Arc::new(PythonAnalyzer::with_rules(rules))),
        Language::JavaScript => Some(Arc::new(JavaScriptAnalyzer::with_rules(rules))),
        Language::PlainText => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_filter() {
        let all = RuleFilter::all();
        assert!(all.allows(codes::TYPO));

        let only = RuleFilter::only([codes::TYPO, codes::VAR_USAGE]).disable(codes::VAR_USAGE);
        assert!(only.allows(codes::TYPO));
        assert!(!only.allows(codes::VAR_USAGE));
        assert!(!only.allows(codes::BRACKET_BALANCE));
    }

    #[test]
    fn test_plain_text_has_no_analyzer() {
        assert!(analyzer_for(Language::PlainText).is_none());
        assert!(analyzer_for(Language::Python).is_some());
    }
}
