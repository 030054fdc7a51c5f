use codepad_core::{
    CompletionItem, CompletionKind, CompletionProvider, Editor, EditorConfig, Language, Position,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn python(text: &str) -> Editor {
    Editor::with_text(text, EditorConfig::for_language(Language::Python)).unwrap()
}

fn texts(items: &[CompletionItem]) -> Vec<&str> {
    items.iter().map(|i| i.text.as_str()).collect()
}

#[test]
fn test_lexicon_then_document_words() {
    let editor = python("printer_count = 1\npr");
    let caret = Position::new(1, 2);
    assert_eq!(editor.completion_prefix(caret), "pr");

    let items = editor.completions_at(caret);
    assert_eq!(texts(&items), vec!["print", "property", "printer_count"]);
    assert_eq!(items[0].kind, CompletionKind::Function);
    assert_eq!(items[2].description, "document word");
}

#[test]
fn test_prefix_match_ignores_case() {
    let editor = python("tr");
    let items = editor.completions_at(Position::new(0, 2));
    assert_eq!(texts(&items), vec!["True", "try"]);
}

#[test]
fn test_single_exact_match_is_suppressed() {
    let editor = python("while");
    assert!(editor.completions_at(Position::new(0, 5)).is_empty());
}

#[test]
fn test_no_prefix_no_suggestions() {
    let editor = python("x = ");
    assert_eq!(editor.completion_prefix(Position::new(0, 4)), "");
    assert!(editor.completions_at(Position::new(0, 4)).is_empty());
}

#[test]
fn test_accept_replaces_prefix_in_one_step() {
    let mut editor = python("value = 1\nx = pr");
    let caret = Position::new(1, 6);
    let item = editor.completions_at(caret)[0].clone();
    assert_eq!(item.text, "print");

    let caret = editor.accept_completion(caret, &item);
    assert_eq!(editor.line(1), "x = print");
    assert_eq!(caret, Position::new(1, 9));

    assert_eq!(editor.undo(), Some(Position::new(1, 6)));
    assert_eq!(editor.line(1), "x = pr");
}

#[test]
fn test_custom_provider() {
    struct Snippets;
    impl CompletionProvider for Snippets {
        fn completions(&self, _text: &str, caret: Position, prefix: &str) -> Vec<CompletionItem> {
            vec![CompletionItem::new(
                format!("{prefix}@{}", caret.column),
                CompletionKind::Snippet,
                "snippet",
            )]
        }
    }

    let config = EditorConfig::default().with_completion_provider(Arc::new(Snippets));
    let editor = Editor::with_text("ab", config).unwrap();
    let items = editor.completions_at(Position::new(0, 2));
    assert_eq!(texts(&items), vec!["ab@2"]);
}

#[test]
fn test_plain_text_has_no_provider() {
    let editor = Editor::with_text("hello he", EditorConfig::for_language(Language::PlainText))
        .unwrap();
    assert!(editor.completions_at(Position::new(0, 8)).is_empty());
}
