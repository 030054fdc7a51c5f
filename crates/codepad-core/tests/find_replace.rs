use codepad_core::{Editor, EditorConfig, Position, Range, SearchError, SearchOptions};
use pretty_assertions::assert_eq;

fn editor(text: &str) -> Editor {
    Editor::with_text(text, EditorConfig::default()).unwrap()
}

fn range(l0: usize, c0: usize, l1: usize, c1: usize) -> Range {
    Range::new(Position::new(l0, c0), Position::new(l1, c1))
}

#[test]
fn test_find_all_plain_and_case() {
    let editor = editor("Foo foo\nfood FOO");
    let plain = editor.find_all("foo", SearchOptions::plain()).unwrap();
    assert_eq!(plain, vec![range(0, 4, 0, 7), range(1, 0, 1, 3)]);

    let any_case = editor.find_all("foo", SearchOptions::plain().ignore_case()).unwrap();
    assert_eq!(any_case.len(), 4);

    let words = editor
        .find_all("foo", SearchOptions::plain().ignore_case().whole_word())
        .unwrap();
    assert_eq!(words, vec![range(0, 0, 0, 3), range(0, 4, 0, 7), range(1, 5, 1, 8)]);
}

#[test]
fn test_plain_query_is_literal() {
    let editor = editor("a.b axb (x)");
    assert_eq!(editor.find_all("a.b", SearchOptions::plain()).unwrap().len(), 1);
    assert_eq!(editor.find_all("a.b", SearchOptions::regex()).unwrap().len(), 2);
    assert_eq!(editor.find_all("(x)", SearchOptions::plain()).unwrap().len(), 1);
}

#[test]
fn test_find_next_and_prev_wrap() {
    let editor = editor("x1\nx2\nx3");
    let opts = SearchOptions::plain();
    assert_eq!(
        editor.find_next("x", opts, Position::new(1, 1)).unwrap(),
        Some(range(2, 0, 2, 1))
    );
    assert_eq!(
        editor.find_next("x", opts, Position::new(2, 1)).unwrap(),
        Some(range(0, 0, 0, 1))
    );
    assert_eq!(
        editor.find_prev("x", opts, Position::new(1, 0)).unwrap(),
        Some(range(0, 0, 0, 1))
    );
    assert_eq!(
        editor.find_prev("x", opts, Position::ZERO).unwrap(),
        Some(range(2, 0, 2, 1))
    );
    assert_eq!(editor.find_next("zz", opts, Position::ZERO).unwrap(), None);
}

#[test]
fn test_replace_all_is_one_undo_step() {
    let mut editor = editor("let a = a + 1;\nreturn a;");
    let (count, caret) = editor
        .replace_all("a", "value", SearchOptions::plain().whole_word(), Position::new(1, 9))
        .unwrap();
    assert_eq!(count, 3);
    assert_eq!(editor.text(), "let value = value + 1;\nreturn value;");
    assert_eq!(caret, Position::new(1, 9));

    assert_eq!(editor.undo(), Some(Position::new(1, 9)));
    assert_eq!(editor.text(), "let a = a + 1;\nreturn a;");
    assert!(!editor.can_undo());
}

#[test]
fn test_regex_replacement_expands_groups() {
    let mut editor = editor("f(1, 2)\nf(3, 4)");
    let (count, _) = editor
        .replace_all(r"f\((\d), (\d)\)", "g($2, $1)", SearchOptions::regex(), Position::ZERO)
        .unwrap();
    assert_eq!(count, 2);
    assert_eq!(editor.text(), "g(2, 1)\ng(4, 3)");
}

#[test]
fn test_replacement_spanning_lines() {
    let mut editor = editor("a\nb\nc");
    editor
        .replace_all(r"\n", " ", SearchOptions::regex(), Position::ZERO)
        .unwrap();
    assert_eq!(editor.text(), "a b c");
    assert_eq!(editor.line_count(), 1);
}

#[test]
fn test_no_match_leaves_buffer_untouched() {
    let mut editor = editor("abc");
    let version = editor.version();
    let (count, _) = editor
        .replace_all("zzz", "y", SearchOptions::plain(), Position::ZERO)
        .unwrap();
    assert_eq!(count, 0);
    assert_eq!(editor.version(), version);
    assert!(!editor.can_undo());
}

#[test]
fn test_invalid_regex_is_an_error() {
    let editor = editor("abc");
    let err = editor.find_all("(", SearchOptions::regex()).unwrap_err();
    assert!(matches!(err, SearchError::InvalidRegex(_)));
}
