//! Editor configuration.

use crate::completion::{CompletionProvider, LexiconCompletionProvider};
use crate::diagnostics::{AnalysisContext, DEFAULT_DEBOUNCE, DiagnosticProvider};
use crate::folding::{FoldingProvider, FoldingStrategy};
use crate::highlight::Ruleset;
use codepad_lang::Language;
use std::sync::Arc;
use std::time::Duration;

/// Default tab width (also the indent unit).
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Tab width must be positive.
    #[error("tab width must be at least 1 (got {0})")]
    InvalidTabWidth(usize),
    /// Undo limit must be positive.
    #[error("undo limit must be at least 1 (got {0})")]
    InvalidUndoLimit(usize),
}

/// Everything an [`Editor`](crate::Editor) needs besides the text.
#[derive(Clone)]
pub struct EditorConfig {
    /// Columns per tab stop and per indent level.
    pub tab_width: usize,
    /// Maximum number of undo steps kept.
    pub undo_limit: usize,
    /// Idle time before diagnostics re-run.
    pub debounce: Duration,
    /// Language, used for lexical syntax (bracket matching, comment tokens).
    pub language: Language,
    /// Highlighting ruleset.
    pub ruleset: Arc<Ruleset>,
    /// Diagnostics analyzer.
    pub diagnostic_provider: Option<Arc<dyn DiagnosticProvider>>,
    /// Cross-file symbols handed to the analyzer.
    pub analysis_context: Option<Arc<AnalysisContext>>,
    /// Fold region source.
    pub folding_provider: Option<Arc<dyn FoldingProvider>>,
    /// Completion source.
    pub completion_provider: Option<Arc<dyn CompletionProvider>>,
}

impl EditorConfig {
    /// Defaults (see [`Default`]).
    pub fn new() -> Self {
        Self::default()
    }

    /// Language-derived defaults: lexicon completion and the language's natural folding strategy.
    pub fn for_language(language: Language) -> Self {
        let mut config = Self::new().with_language(language);
        if language != Language::PlainText {
            config.completion_provider = Some(Arc::new(LexiconCompletionProvider::for_language(language)));
        }
        if let Some(strategy) = FoldingStrategy::for_language(language) {
            config.folding_provider = Some(strategy.provider(language));
        }
        config
    }

    /// Set the tab width in columns.
    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }

    /// Set the undo depth limit.
    pub fn with_undo_limit(mut self, undo_limit: usize) -> Self {
        self.undo_limit = undo_limit;
        self
    }

    /// Set the diagnostics debounce interval.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the language.
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Set the highlighting ruleset.
    pub fn with_ruleset(mut self, ruleset: impl Into<Arc<Ruleset>>) -> Self {
        self.ruleset = ruleset.into();
        self
    }

    /// Set the diagnostic provider.
    pub fn with_diagnostic_provider(mut self, provider: Arc<dyn DiagnosticProvider>) -> Self {
        self.diagnostic_provider = Some(provider);
        self
    }

    /// Set the cross-file analysis context.
    pub fn with_analysis_context(mut self, context: AnalysisContext) -> Self {
        self.analysis_context = Some(Arc::new(context));
        self
    }

    /// Set the fold region source.
    pub fn with_folding_provider(mut self, provider: Arc<dyn FoldingProvider>) -> Self {
        self.folding_provider = Some(provider);
        self
    }

    /// Use a built-in folding strategy with this config's language.
    pub fn with_folding_strategy(mut self, strategy: FoldingStrategy) -> Self {
        self.folding_provider = Some(strategy.provider(self.language));
        self
    }

    /// Set the completion source.
    pub fn with_completion_provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.completion_provider = Some(provider);
        self
    }

    /// Check numeric settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tab_width == 0 {
            return Err(ConfigError::InvalidTabWidth(self.tab_width));
        }
        if self.undo_limit == 0 {
            return Err(ConfigError::InvalidUndoLimit(self.undo_limit));
        }
        Ok(())
    }

    /// One indent unit (`tab_width` spaces).
    pub fn indent_unit(&self) -> String {
        " ".repeat(self.tab_width)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            undo_limit: crate::buffer::DEFAULT_UNDO_LIMIT,
            debounce: DEFAULT_DEBOUNCE,
            language: Language::PlainText,
            ruleset: Arc::new(Ruleset::plain_text()),
            diagnostic_provider: None,
            analysis_context: None,
            folding_provider: None,
            completion_provider: None,
        }
    }
}

impl std::fmt::Debug for EditorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorConfig")
            .field("tab_width", &self.tab_width)
            .field("undo_limit", &self.undo_limit)
            .field("debounce", &self.debounce)
            .field("language", &self.language)
            .field("ruleset", &self.ruleset.name())
            .field("diagnostic_provider", &self.diagnostic_provider.is_some())
            .field("analysis_context", &self.analysis_context.as_ref().map(|c| c.len()))
            .field("folding_provider", &self.folding_provider.is_some())
            .field("completion_provider", &self.completion_provider.is_some())
            .finish()
    }
}
