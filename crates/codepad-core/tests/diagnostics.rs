use codepad_core::{
    AnalysisContext, AnalyzerError, Diagnostic, DiagnosticProvider, DiagnosticsJob, Editor,
    EditorConfig, Position, Severity, SymbolKind,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

const DEBOUNCE: Duration = Duration::from_millis(500);

/// Flags every line containing `TODO`, and counts its invocations.
#[derive(Default)]
struct TodoProvider {
    runs: AtomicUsize,
}

impl DiagnosticProvider for TodoProvider {
    fn analyze(
        &self,
        text: &str,
        context: Option<&AnalysisContext>,
    ) -> Result<Vec<Diagnostic>, AnalyzerError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let mut out = Vec::new();
        for (line, content) in text.split('\n').enumerate() {
            if let Some(col) = content.find("TODO") {
                let severity = if context.is_some_and(|c| c.defines("TODO")) {
                    Severity::Hint
                } else {
                    Severity::Info
                };
                out.push(Diagnostic::new(line, col, 4, severity, "unresolved TODO"));
            }
        }
        Ok(out)
    }
}

fn editor(text: &str) -> (Editor, Arc<TodoProvider>) {
    let provider = Arc::new(TodoProvider::default());
    let config = EditorConfig::default()
        .with_debounce(DEBOUNCE)
        .with_diagnostic_provider(provider.clone());
    (Editor::with_text(text, config).unwrap(), provider)
}

#[test]
fn test_debounce_restarts_on_each_change() {
    let (mut editor, provider) = editor("");
    let t0 = Instant::now();

    editor.insert_text(Position::ZERO, "TO");
    assert!(!editor.poll_diagnostics(t0));
    assert!(editor.diagnostics_pending());

    let t1 = t0 + Duration::from_millis(400);
    editor.insert_text(Position::new(0, 2), "DO");
    assert!(!editor.poll_diagnostics(t1));

    // 500ms after the first edit, but only 200ms after the second.
    assert!(!editor.poll_diagnostics(t0 + Duration::from_millis(600)));
    assert_eq!(provider.runs.load(Ordering::SeqCst), 0);

    assert!(editor.poll_diagnostics(t1 + DEBOUNCE));
    assert_eq!(provider.runs.load(Ordering::SeqCst), 1);
    assert_eq!(editor.diagnostics().len(), 1);
    assert_eq!(editor.diagnostics_for_line(0)[0].message, "unresolved TODO");
    assert!(!editor.diagnostics_pending());

    // Nothing changed since, so nothing reruns.
    assert!(!editor.poll_diagnostics(t1 + DEBOUNCE * 4));
    assert_eq!(provider.runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_superseded_result_is_discarded() {
    let (mut editor, _) = editor("TODO first");
    let t0 = Instant::now();

    editor.poll_diagnostics(t0);
    let stale = editor.take_diagnostics_job(t0 + DEBOUNCE).unwrap();

    editor.insert_text(Position::ZERO, "x\n");
    // The edit restarts the window at the next poll.
    assert!(editor.take_diagnostics_job(t0 + DEBOUNCE * 3).is_none());
    let fresh = editor.take_diagnostics_job(t0 + DEBOUNCE * 4).unwrap();
    assert!(fresh.generation() > stale.generation());

    let fresh_outcome = fresh.run();
    let stale_outcome = stale.run();
    assert!(!editor.complete_diagnostics(stale_outcome));
    assert!(editor.diagnostics().is_empty());

    assert!(editor.complete_diagnostics(fresh_outcome));
    assert_eq!(editor.diagnostics()[0].line, 1);
}

#[test]
fn test_job_runs_on_worker_thread() {
    let (mut editor, provider) = editor("a\nTODO b\nc TODO");
    let job = debounced_job(&mut editor);

    let outcome = thread::spawn(move || job.run()).join().unwrap();
    assert!(editor.complete_diagnostics(outcome));

    let lines: Vec<(usize, usize)> = editor
        .diagnostics()
        .iter()
        .map(|d| (d.line, d.column))
        .collect();
    assert_eq!(lines, vec![(1, 0), (2, 2)]);
    assert_eq!(provider.runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_analysis_context_reaches_provider() {
    let mut context = AnalysisContext::new();
    context.define("TODO", SymbolKind::Constant, "notes.cs");
    let (mut editor, _) = editor("TODO");
    editor.set_analysis_context(Some(context));

    assert!(editor.run_diagnostics_now());
    assert_eq!(editor.diagnostics()[0].severity, Severity::Hint);
}

#[test]
fn test_failing_provider_clears_diagnostics() {
    struct Broken;
    impl DiagnosticProvider for Broken {
        fn analyze(
            &self,
            _text: &str,
            _context: Option<&AnalysisContext>,
        ) -> Result<Vec<Diagnostic>, AnalyzerError> {
            Err(AnalyzerError::Failed("boom".into()))
        }
    }

    let (mut editor, _) = editor("TODO");
    assert!(editor.run_diagnostics_now());
    assert_eq!(editor.diagnostics().len(), 1);

    editor.set_diagnostic_provider(Some(Arc::new(Broken)));
    assert!(editor.run_diagnostics_now());
    assert!(editor.diagnostics().is_empty());
}

#[test]
fn test_no_provider_yields_no_diagnostics() {
    let mut editor = Editor::with_text("TODO", EditorConfig::default()).unwrap();
    let now = Instant::now();
    editor.poll_diagnostics(now);
    assert!(editor.take_diagnostics_job(now + DEBOUNCE * 2).is_none());
    assert!(editor.diagnostics().is_empty());
}

fn debounced_job(editor: &mut Editor) -> DiagnosticsJob {
    let now = Instant::now();
    assert!(editor.take_diagnostics_job(now).is_none());
    editor.take_diagnostics_job(now + DEBOUNCE).unwrap()
}
