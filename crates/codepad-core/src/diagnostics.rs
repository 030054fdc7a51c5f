//! Diagnostics data model and the debounced runner.
//!
//! Analyzers implement [`DiagnosticProvider`]; they are pure functions of the document text (and
//! an optional cross-file [`AnalysisContext`]). The editor stores their output in a
//! [`DiagnosticIndex`] for per-line lookups.
//!
//! Re-analysis is debounced by [`DiagnosticsScheduler`]. The host passes the current instant in,
//! so the core owns no timers or threads. Every requested run carries a generation number; a
//! result whose generation is older than the newest request is discarded.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default debounce interval between the last change and the next analysis run.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Diagnostic severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Error diagnostics.
    Error,
    /// Warning diagnostics.
    Warning,
    /// Informational diagnostics.
    Info,
    /// Hint diagnostics.
    Hint,
}

/// A single positioned finding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    /// Line of the first character.
    pub line: usize,
    /// Column of the first character.
    pub column: usize,
    /// Number of characters covered (at least 1 for display purposes).
    pub length: usize,
    /// Human-readable message.
    pub message: String,
    /// Severity.
    pub severity: Severity,
    /// Optional diagnostic code.
    pub code: Option<String>,
    /// Optional diagnostic source (e.g. `"codepad-lint"`).
    pub source: Option<String>,
}

impl Diagnostic {
    /// Create a diagnostic without code or source.
    pub fn new(
        line: usize,
        column: usize,
        length: usize,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            line,
            column,
            length,
            message: message.into(),
            severity,
            code: None,
            source: None,
        }
    }

    /// Attach a rule code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach the name of the reporting analyzer.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Column after the last covered character.
    pub fn end_column(&self) -> usize {
        self.column + self.length
    }
}

/// Sort by (line, column, message) and drop exact duplicates.
pub fn sort_diagnostics(diagnostics: &mut Vec<Diagnostic>) {
    diagnostics.sort_by(|a, b| {
        (a.line, a.column, &a.message, a.severity, a.length)
            .cmp(&(b.line, b.column, &b.message, b.severity, b.length))
    });
    diagnostics.dedup();
}

/// Kind of a symbol in an [`AnalysisContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// A class or type.
    Class,
    /// A function or method.
    Function,
    /// A variable or field.
    Variable,
    /// A module or namespace.
    Module,
    /// A constant.
    Constant,
}

/// Where and what a symbol is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    /// Symbol kind.
    pub kind: SymbolKind,
    /// Defining file, as the host names it.
    pub file: String,
}

/// Cross-file symbol table handed to analyzers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisContext {
    symbols: HashMap<String, SymbolInfo>,
}

impl AnalysisContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or overwrite) a symbol.
    pub fn define(&mut self, name: impl Into<String>, kind: SymbolKind, file: impl Into<String>) {
        self.symbols.insert(
            name.into(),
            SymbolInfo {
                kind,
                file: file.into(),
            },
        );
    }

    /// Look up `name`.
    pub fn symbol(&self, name: &str) -> Option<&SymbolInfo> {
        self.symbols.get(name)
    }

    /// Returns `true` if `name` is defined.
    pub fn defines(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns `true` if no symbols are defined.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Analyzer failure.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("analyzer pattern failed to compile: {0}")]
    /// A check's pattern did not compile.
    Pattern(#[from] regex::Error),
    #[error("analysis failed: {0}")]
    /// Any other analyzer failure.
    Failed(String),
}

/// A source of diagnostics for one language.
pub trait DiagnosticProvider: Send + Sync {
    /// Analyze the whole document.
    fn analyze(
        &self,
        text: &str,
        context: Option<&AnalysisContext>,
    ) -> Result<Vec<Diagnostic>, AnalyzerError>;
}

/// Run `provider`, turning errors and panics into an empty result.
pub fn run_provider(
    provider: &dyn DiagnosticProvider,
    text: &str,
    context: Option<&AnalysisContext>,
) -> Vec<Diagnostic> {
    match catch_unwind(AssertUnwindSafe(|| provider.analyze(text, context))) {
        Ok(Ok(mut diagnostics)) => {
            sort_diagnostics(&mut diagnostics);
            diagnostics
        }
        Ok(Err(err)) => {
            log::warn!("diagnostic provider failed: {err}");
            Vec::new()
        }
        Err(_) => {
            log::warn!("diagnostic provider panicked; discarding this run");
            Vec::new()
        }
    }
}

/// Diagnostics sorted by position, with per-line lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticIndex {
    items: Vec<Diagnostic>,
}

impl DiagnosticIndex {
    /// Index `items`, sorting them by position.
    pub fn new(mut items: Vec<Diagnostic>) -> Self {
        sort_diagnostics(&mut items);
        Self { items }
    }

    /// All diagnostics, sorted by position.
    pub fn all(&self) -> &[Diagnostic] {
        &self.items
    }

    /// Diagnostics on `line`, ordered by column.
    pub fn for_line(&self, line: usize) -> &[Diagnostic] {
        let from = self.items.partition_point(|d| d.line < line);
        let to = self.items.partition_point(|d| d.line <= line);
        &self.items[from..to]
    }

    /// Number of diagnostics with `severity`.
    pub fn count(&self, severity: Severity) -> usize {
        self.items.iter().filter(|d| d.severity == severity).count()
    }

    /// Number of diagnostics.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no diagnostics.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Debounce and supersede bookkeeping for analysis runs.
#[derive(Debug, Clone)]
pub struct DiagnosticsScheduler {
    interval: Duration,
    deadline: Option<Instant>,
    /// Generation of the newest requested run.
    requested: u64,
    /// Generation of the last accepted result.
    applied: u64,
}

impl DiagnosticsScheduler {
    /// A scheduler with no pending run.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
            requested: 0,
            applied: 0,
        }
    }

    /// The debounce interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Change the debounce interval; a pending deadline is kept.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Restart the debounce window at `now`.
    pub fn note_change(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
        log::trace!("diagnostics debounce restarted (generation {})", self.requested);
    }

    /// Returns `true` while a debounced run is waiting.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// If the debounce window elapsed, request a run and return its generation.
    pub fn poll(&mut self, now: Instant) -> Option<u64> {
        match self.deadline {
            Some(deadline) if now >= deadline => Some(self.request_now()),
            _ => None,
        }
    }

    /// Request a run immediately, cancelling the pending debounce.
    pub fn request_now(&mut self) -> u64 {
        self.deadline = None;
        self.requested += 1;
        log::trace!("diagnostics run requested (generation {})", self.requested);
        self.requested
    }

    /// Generation of the newest requested run.
    pub fn latest_generation(&self) -> u64 {
        self.requested
    }

    /// Accept the result of run `generation` unless a newer run was requested since.
    pub fn accept(&mut self, generation: u64) -> bool {
        if generation != self.requested || generation <= self.applied {
            log::trace!(
                "diagnostics result superseded (generation {generation}, latest {})",
                self.requested
            );
            return false;
        }
        self.applied = generation;
        true
    }
}

impl Default for DiagnosticsScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

/// An owned analysis run that can be moved to another thread.
pub struct DiagnosticsJob {
    generation: u64,
    text: String,
    provider: Arc<dyn DiagnosticProvider>,
    context: Option<Arc<AnalysisContext>>,
}

impl DiagnosticsJob {
    /// A job for `generation` over a snapshot of `text`.
    pub fn new(
        generation: u64,
        text: String,
        provider: Arc<dyn DiagnosticProvider>,
        context: Option<Arc<AnalysisContext>>,
    ) -> Self {
        Self {
            generation,
            text,
            provider,
            context,
        }
    }

    /// Generation this job was issued for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The document snapshot this job analyzes.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Run the analysis.
    pub fn run(self) -> DiagnosticsOutcome {
        let diagnostics = run_provider(self.provider.as_ref(), &self.text, self.context.as_deref());
        log::debug!(
            "diagnostics run finished: generation={} count={}",
            self.generation,
            diagnostics.len()
        );
        DiagnosticsOutcome {
            generation: self.generation,
            diagnostics,
        }
    }
}

impl std::fmt::Debug for DiagnosticsJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticsJob")
            .field("generation", &self.generation)
            .field("text_len", &self.text.len())
            .finish_non_exhaustive()
    }
}

/// Result of a [`DiagnosticsJob`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticsOutcome {
    /// Generation of the run that produced this.
    pub generation: u64,
    /// Sorted diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl DiagnosticProvider for Failing {
        fn analyze(
            &self,
            _text: &str,
            _context: Option<&AnalysisContext>,
        ) -> Result<Vec<Diagnostic>, AnalyzerError> {
            Err(AnalyzerError::Failed("boom".to_string()))
        }
    }

    struct Panicking;

    impl DiagnosticProvider for Panicking {
        fn analyze(
            &self,
            _text: &str,
            _context: Option<&AnalysisContext>,
        ) -> Result<Vec<Diagnostic>, AnalyzerError> {
            panic!("analyzer bug");
        }
    }

    #[test]
    fn test_provider_failures_yield_empty() {
        assert!(run_provider(&Failing, "x", None).is_empty());
        assert!(run_provider(&Panicking, "x", None).is_empty());
    }

    #[test]
    fn test_index_for_line() {
        let index = DiagnosticIndex::new(vec![
            Diagnostic::new(2, 4, 1, Severity::Hint, "b"),
            Diagnostic::new(0, 0, 1, Severity::Error, "a"),
            Diagnostic::new(2, 1, 1, Severity::Warning, "c"),
        ]);
        assert!(index.for_line(1).is_empty());
        let columns: Vec<_> = index.for_line(2).iter().map(|d| d.column).collect();
        assert_eq!(columns, vec![1, 4]);
        assert_eq!(index.count(Severity::Error), 1);
    }

    #[test]
    fn test_debounce_restarts_on_change() {
        let t0 = Instant::now();
        let mut scheduler = DiagnosticsScheduler::new(Duration::from_millis(500));
        scheduler.note_change(t0);
        scheduler.note_change(t0 + Duration::from_millis(400));
        assert_eq!(scheduler.poll(t0 + Duration::from_millis(800)), None);
        assert_eq!(scheduler.poll(t0 + Duration::from_millis(900)), Some(1));
        assert_eq!(scheduler.poll(t0 + Duration::from_millis(2000)), None);
    }

    #[test]
    fn test_newer_request_supersedes_older_result() {
        let mut scheduler = DiagnosticsScheduler::default();
        let first = scheduler.request_now();
        let second = scheduler.request_now();
        assert!(!scheduler.accept(first));
        assert!(scheduler.accept(second));
        assert!(!scheduler.accept(second));
    }
}
