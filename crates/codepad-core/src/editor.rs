//! The editor facade.
//!
//! [`Editor`] owns one [`TextBuffer`] plus every derived cache (highlight runs, fold regions,
//! diagnostics) and the configuration. Caches are keyed on the buffer version and rebuilt lazily
//! on the next query, so a burst of edits costs one rebuild.
//!
//! The editor never stores a caret: every intent takes the caller's caret and returns the new
//! one (see [`crate::intents`]).

use crate::buffer::TextBuffer;
use crate::completion::{self, CompletionItem, CompletionProvider};
use crate::config::{ConfigError, EditorConfig};
use crate::diagnostics::{
    AnalysisContext, Diagnostic, DiagnosticIndex, DiagnosticProvider, DiagnosticsJob,
    DiagnosticsOutcome, DiagnosticsScheduler,
};
use crate::folding::{FoldRegion, FoldingManager, FoldingProvider};
use crate::highlight::{ColorRun, Highlighter, Ruleset};
use crate::position::{Position, Range};
use crate::scan::ScanSyntax;
use codepad_lang::Language;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A text buffer with highlighting, folding, diagnostics and completion.
pub struct Editor {
    pub(crate) buffer: TextBuffer,
    pub(crate) config: EditorConfig,
    pub(crate) scan_syntax: ScanSyntax,
    highlighter: Highlighter,
    folding: FoldingManager,
    folds_built_for: Option<u64>,
    diagnostics: DiagnosticIndex,
    scheduler: DiagnosticsScheduler,
    /// Buffer version the debounce window last restarted for.
    diagnostics_seen_version: Option<u64>,
}

impl Editor {
    /// Create an empty editor.
    pub fn new(config: EditorConfig) -> Result<Self, ConfigError> {
        Self::with_text("", config)
    }

    /// Create an editor holding `text`.
    pub fn with_text(text: &str, config: EditorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(text, config))
    }

    fn build(text: &str, config: EditorConfig) -> Self {
        Self {
            buffer: TextBuffer::with_undo_limit(text, config.undo_limit),
            scan_syntax: ScanSyntax::for_language(config.language),
            highlighter: Highlighter::new(config.ruleset.clone()),
            folding: FoldingManager::new(),
            folds_built_for: None,
            diagnostics: DiagnosticIndex::default(),
            scheduler: DiagnosticsScheduler::new(config.debounce),
            diagnostics_seen_version: None,
            config,
        }
    }

    /// The underlying buffer.
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// The current configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Text of `line` without its terminator.
    pub fn line(&self, line: usize) -> String {
        self.buffer.line(line)
    }

    /// Length of `line` in characters.
    pub fn line_len(&self, line: usize) -> usize {
        self.buffer.line_len(line)
    }

    /// Number of lines (at least one).
    pub fn line_count(&self) -> usize {
        self.buffer.line_count()
    }

    /// The full text.
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Buffer version, bumped on every mutation.
    pub fn version(&self) -> u64 {
        self.buffer.version()
    }

    /// Insert `text` at `pos`; returns the position after it.
    pub fn insert_text(&mut self, pos: Position, text: &str) -> Position {
        self.buffer.insert(pos, text)
    }

    /// Delete `[start, end)`; returns the removed text.
    pub fn delete_range(&mut self, start: Position, end: Position) -> String {
        self.buffer.delete(start, end)
    }

    /// Replace `range` with `text` as one undo step.
    pub fn replace_range(&mut self, range: Range, text: &str) -> Position {
        self.buffer.replace(range, text)
    }

    /// Start grouping edits into one undo step.
    pub fn begin_composite(&mut self, caret_before: Position) {
        self.buffer.begin_composite(caret_before);
    }

    /// Close the current undo group.
    pub fn end_composite(&mut self, caret_after: Position) {
        self.buffer.end_composite(caret_after);
    }

    /// Undo one step; returns the caret to restore.
    pub fn undo(&mut self) -> Option<Position> {
        self.buffer.undo()
    }

    /// Redo one step; returns the caret to restore.
    pub fn redo(&mut self) -> Option<Position> {
        self.buffer.redo()
    }

    /// Returns `true` if there is something to undo.
    pub fn can_undo(&self) -> bool {
        self.buffer.can_undo()
    }

    /// Returns `true` if there is something to redo.
    pub fn can_redo(&self) -> bool {
        self.buffer.can_redo()
    }

    /// Replace the whole document, clearing history and every derived cache.
    pub fn set_full_text(&mut self, text: &str) {
        self.buffer.set_text(text);
        self.folding.clear();
        self.folds_built_for = None;
        self.diagnostics = DiagnosticIndex::default();
    }

    /// Subscribe to change notifications (one per top-level mutation).
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.buffer.subscribe(callback);
    }

    /// Change the tab width; zero is rejected.
    pub fn set_tab_width(&mut self, tab_width: usize) -> Result<(), ConfigError> {
        if tab_width == 0 {
            return Err(ConfigError::InvalidTabWidth(tab_width));
        }
        self.config.tab_width = tab_width;
        Ok(())
    }

    /// Change the undo depth limit; zero is rejected.
    pub fn set_undo_limit(&mut self, undo_limit: usize) -> Result<(), ConfigError> {
        if undo_limit == 0 {
            return Err(ConfigError::InvalidUndoLimit(undo_limit));
        }
        self.config.undo_limit = undo_limit;
        self.buffer.set_undo_limit(undo_limit);
        Ok(())
    }

    /// Change the diagnostics debounce interval.
    pub fn set_debounce(&mut self, debounce: Duration) {
        self.config.debounce = debounce;
        self.scheduler.set_interval(debounce);
    }

    /// Change the language used for lexical syntax (bracket matching, comment tokens).
    pub fn set_language(&mut self, language: Language) {
        self.config.language = language;
        self.scan_syntax = ScanSyntax::for_language(language);
    }

    /// Swap the ruleset; highlighting is rebuilt on the next query.
    pub fn set_ruleset(&mut self, ruleset: impl Into<Arc<Ruleset>>) {
        let ruleset = ruleset.into();
        self.config.ruleset = ruleset.clone();
        self.highlighter.set_ruleset(ruleset);
    }

    /// The active ruleset.
    pub fn ruleset(&self) -> &Arc<Ruleset> {
        &self.config.ruleset
    }

    /// Swap the analyzer; current diagnostics are dropped and a run is scheduled.
    pub fn set_diagnostic_provider(&mut self, provider: Option<Arc<dyn DiagnosticProvider>>) {
        self.config.diagnostic_provider = provider;
        self.diagnostics = DiagnosticIndex::default();
        self.diagnostics_seen_version = None;
    }

    /// Swap the analysis context and schedule a run.
    pub fn set_analysis_context(&mut self, context: Option<AnalysisContext>) {
        self.config.analysis_context = context.map(Arc::new);
        self.diagnostics_seen_version = None;
    }

    /// Swap the fold region source; folds are rebuilt on the next query.
    pub fn set_folding_provider(&mut self, provider: Option<Arc<dyn FoldingProvider>>) {
        self.config.folding_provider = provider;
        self.folds_built_for = None;
    }

    /// Swap the completion source.
    pub fn set_completion_provider(&mut self, provider: Option<Arc<dyn CompletionProvider>>) {
        self.config.completion_provider = provider;
    }

    /// Style runs of `line`; empty for empty or out-of-range lines.
    pub fn color_runs_for_line(&mut self, line: usize) -> &[ColorRun] {
        self.highlighter.runs_for_line(&self.buffer, line)
    }

    fn ensure_folds(&mut self) {
        if self.folds_built_for == Some(self.buffer.version()) {
            return;
        }
        let regions = match &self.config.folding_provider {
            Some(provider) => provider.fold_regions(&self.buffer.text()),
            None => Vec::new(),
        };
        self.folding.replace_regions(regions, self.buffer.line_count());
        self.folds_built_for = Some(self.buffer.version());
    }

    /// The folding manager, rebuilt for the current text.
    pub fn folding(&mut self) -> &FoldingManager {
        self.ensure_folds();
        &self.folding
    }

    /// Current fold regions, sorted by start line.
    pub fn fold_regions_snapshot(&mut self) -> Vec<FoldRegion> {
        self.ensure_folds();
        self.folding.regions().to_vec()
    }

    /// Returns `true` if `line` is not hidden by a collapsed region.
    pub fn is_line_visible(&mut self, line: usize) -> bool {
        self.ensure_folds();
        self.folding.is_line_visible(line)
    }

    /// Logical indices of the visible lines, ascending.
    pub fn visible_line_projection(&mut self) -> Vec<usize> {
        self.ensure_folds();
        self.folding.visible_lines().to_vec()
    }

    /// Visible index of `line`, or of the region start hiding it.
    pub fn logical_to_visible(&mut self, line: usize) -> usize {
        self.ensure_folds();
        self.folding.logical_to_visible(line)
    }

    /// Logical line shown at visible index `visible`.
    pub fn visible_to_logical(&mut self, visible: usize) -> usize {
        self.ensure_folds();
        self.folding.visible_to_logical(visible)
    }

    /// Toggle the innermost region starting at `start_line`.
    pub fn toggle_fold(&mut self, start_line: usize) -> bool {
        self.ensure_folds();
        self.folding.toggle(start_line)
    }

    /// Collapse the region starting at `start_line`.
    pub fn collapse_fold(&mut self, start_line: usize) -> bool {
        self.ensure_folds();
        self.folding.collapse(start_line)
    }

    /// Expand the region starting at `start_line`.
    pub fn expand_fold(&mut self, start_line: usize) -> bool {
        self.ensure_folds();
        self.folding.expand(start_line)
    }

    /// Collapse every region.
    pub fn collapse_all_folds(&mut self) {
        self.ensure_folds();
        self.folding.collapse_all();
    }

    /// Expand every region.
    pub fn expand_all_folds(&mut self) {
        self.ensure_folds();
        self.folding.expand_all();
    }

    /// Latest accepted diagnostics, sorted by position.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.all()
    }

    /// Latest accepted diagnostics on `line`.
    pub fn diagnostics_for_line(&self, line: usize) -> &[Diagnostic] {
        self.diagnostics.for_line(line)
    }

    /// Restart the debounce window if the text changed since the last call.
    fn observe_changes(&mut self, now: Instant) {
        let version = self.buffer.version();
        if self.diagnostics_seen_version != Some(version) {
            self.diagnostics_seen_version = Some(version);
            self.scheduler.note_change(now);
        }
    }

    fn job(&self, generation: u64) -> Option<DiagnosticsJob> {
        let provider = self.config.diagnostic_provider.clone()?;
        Some(DiagnosticsJob::new(
            generation,
            self.buffer.text(),
            provider,
            self.config.analysis_context.clone(),
        ))
    }

    /// Drive the debounce. Runs the analyzer in-line once the text has been idle for the
    /// debounce interval; returns `true` if the diagnostics were replaced.
    pub fn poll_diagnostics(&mut self, now: Instant) -> bool {
        self.observe_changes(now);
        let Some(generation) = self.scheduler.poll(now) else {
            return false;
        };
        self.run_generation(generation)
    }

    /// Run the analyzer immediately, bypassing the debounce.
    pub fn run_diagnostics_now(&mut self) -> bool {
        self.diagnostics_seen_version = Some(self.buffer.version());
        let generation = self.scheduler.request_now();
        self.run_generation(generation)
    }

    fn run_generation(&mut self, generation: u64) -> bool {
        let outcome = match self.job(generation) {
            Some(job) => job.run(),
            None => DiagnosticsOutcome {
                generation,
                diagnostics: Vec::new(),
            },
        };
        self.complete_diagnostics(outcome)
    }

    /// Like [`poll_diagnostics`](Self::poll_diagnostics), but hand the run to the caller
    /// (e.g. to execute on a worker thread) instead of running it in-line.
    pub fn take_diagnostics_job(&mut self, now: Instant) -> Option<DiagnosticsJob> {
        self.observe_changes(now);
        let generation = self.scheduler.poll(now)?;
        match self.job(generation) {
            Some(job) => Some(job),
            None => {
                self.complete_diagnostics(DiagnosticsOutcome {
                    generation,
                    diagnostics: Vec::new(),
                });
                None
            }
        }
    }

    /// Install the result of a run unless a newer run was requested meanwhile.
    pub fn complete_diagnostics(&mut self, outcome: DiagnosticsOutcome) -> bool {
        if !self.scheduler.accept(outcome.generation) {
            return false;
        }
        log::debug!(
            "diagnostics updated: generation={} count={}",
            outcome.generation,
            outcome.diagnostics.len()
        );
        self.diagnostics = DiagnosticIndex::new(outcome.diagnostics);
        true
    }

    /// Returns `true` while a debounced run is waiting.
    pub fn diagnostics_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// The word being typed at `caret`.
    pub fn completion_prefix(&self, caret: Position) -> String {
        completion::completion_prefix(&self.buffer, caret)
    }

    /// Suggestions for an explicit `prefix`.
    pub fn completions_for(&self, prefix: &str, caret: Position) -> Vec<CompletionItem> {
        let Some(provider) = &self.config.completion_provider else {
            return Vec::new();
        };
        completion::complete(provider.as_ref(), &self.buffer.text(), caret, prefix)
    }

    /// Suggestions for the word being typed at `caret`.
    pub fn completions_at(&self, caret: Position) -> Vec<CompletionItem> {
        let prefix = self.completion_prefix(caret);
        self.completions_for(&prefix, caret)
    }

    /// Replace the word being typed at `caret` with `item` as one undo step.
    pub fn accept_completion(&mut self, caret: Position, item: &CompletionItem) -> Position {
        let caret = self.buffer.clamp(caret);
        let prefix_len = self.completion_prefix(caret).chars().count();
        let start = Position::new(caret.line, caret.column - prefix_len);
        self.buffer.begin_composite(caret);
        self.buffer.delete(start, caret);
        let end = self.buffer.insert(start, &item.text);
        self.buffer.end_composite(end);
        end
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::build("", EditorConfig::default())
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("buffer", &self.buffer)
            .field("config", &self.config)
            .field("diagnostics", &self.diagnostics.len())
            .finish_non_exhaustive()
    }
}
