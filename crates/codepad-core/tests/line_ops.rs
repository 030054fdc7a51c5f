use codepad_core::{Editor, EditorConfig, Language, Position, Range};
use pretty_assertions::assert_eq;

fn editor(text: &str) -> Editor {
    Editor::with_text(text, EditorConfig::for_language(Language::CSharp)).unwrap()
}

fn at(line: usize, column: usize) -> Position {
    Position::new(line, column)
}

#[test]
fn test_quote_before_unmatched_quote_steps_over() {
    let mut editor = editor("x = \"");
    let version = editor.version();
    let caret = editor.type_char(at(0, 4), '"');
    assert_eq!(caret, at(0, 5));
    assert_eq!(editor.text(), "x = \"");
    assert_eq!(editor.version(), version);
}

#[test]
fn test_quote_closes_string_by_stepping_over() {
    let mut editor = editor("x = ");
    let mut caret = editor.type_char(at(0, 4), '"');
    assert_eq!(editor.text(), "x = \"\"");
    assert_eq!(caret, at(0, 5));

    for ch in "abc".chars() {
        caret = editor.type_char(caret, ch);
    }
    caret = editor.type_char(caret, '"');
    assert_eq!(editor.text(), "x = \"abc\"");
    assert_eq!(caret, at(0, 9));
}

#[test]
fn test_triple_quote_pair() {
    let mut editor = Editor::with_text("\"\"", EditorConfig::for_language(Language::Python)).unwrap();
    let caret = editor.type_char(at(0, 2), '"');
    assert_eq!(editor.text(), "\"\"\"\"\"\"");
    assert_eq!(caret, at(0, 3));
    assert_eq!(editor.type_char(caret, '"'), at(0, 6));
}

#[test]
fn test_brackets_pair_and_step_over() {
    let mut editor = editor("f");
    let caret = editor.type_char(at(0, 1), '(');
    assert_eq!(editor.text(), "f()");
    let caret = editor.type_char(caret, '[');
    assert_eq!(editor.text(), "f([])");
    let caret = editor.type_char(caret, ']');
    let caret = editor.type_char(caret, ')');
    assert_eq!(editor.text(), "f([])");
    assert_eq!(caret, at(0, 5));

    // Each pair is one undo step.
    editor.undo();
    assert_eq!(editor.text(), "f()");
}

#[test]
fn test_duplicate_line() {
    let mut editor = editor("a\nbc");
    let caret = editor.duplicate_line(at(1, 1));
    assert_eq!(editor.text(), "a\nbc\nbc");
    assert_eq!(caret, at(2, 1));
    assert_eq!(editor.undo(), Some(at(1, 1)));
    assert_eq!(editor.text(), "a\nbc");
}

#[test]
fn test_delete_line() {
    let mut editor = editor("a\nbb\nc");
    assert_eq!(editor.delete_line(at(1, 2)), at(1, 1));
    assert_eq!(editor.text(), "a\nc");

    assert_eq!(editor.delete_line(at(1, 1)), at(0, 0));
    assert_eq!(editor.text(), "a");

    assert_eq!(editor.delete_line(at(0, 1)), Position::ZERO);
    assert_eq!(editor.text(), "");
    assert_eq!(editor.line_count(), 1);

    editor.undo();
    editor.undo();
    editor.undo();
    assert_eq!(editor.text(), "a\nbb\nc");
}

#[test]
fn test_transform_case() {
    let mut editor = editor("hello world");
    let caret = editor.transform_case(Range::new(at(0, 0), at(0, 5)), true, at(0, 5));
    assert_eq!(editor.text(), "HELLO world");
    assert_eq!(caret, at(0, 5));

    let version = editor.version();
    editor.transform_case(Range::new(at(0, 0), at(0, 5)), true, at(0, 5));
    assert_eq!(editor.version(), version);

    editor.transform_case(Range::new(at(0, 0), at(0, 11)), false, at(0, 0));
    assert_eq!(editor.text(), "hello world");
}

#[test]
fn test_matching_bracket_ignores_literals() {
    let editor = editor("if (a[0] == \")\") {}");
    assert_eq!(editor.matching_bracket(at(0, 3)), Some((at(0, 3), Some(at(0, 15)))));
    assert_eq!(editor.matching_bracket(at(0, 15)), Some((at(0, 15), Some(at(0, 3)))));
    // Bracket just before the caret.
    assert_eq!(editor.matching_bracket(at(0, 8)), Some((at(0, 7), Some(at(0, 5)))));
    // Inside the string literal.
    assert_eq!(editor.matching_bracket(at(0, 13)), None);
}

#[test]
fn test_matching_bracket_across_lines_and_unmatched() {
    let editor = editor("{\n  // }\n  x;\n}\n(()");
    assert_eq!(editor.matching_bracket(at(0, 0)), Some((at(0, 0), Some(at(3, 0)))));
    assert_eq!(editor.matching_bracket(at(4, 0)), Some((at(4, 0), None)));
    assert_eq!(editor.matching_bracket(at(2, 2)), None);
}

#[test]
fn test_word_at() {
    let editor = editor("foo_bar  baz");
    let word = Range::new(at(0, 0), at(0, 7));
    assert_eq!(editor.word_at(at(0, 3)), Some(word));
    assert_eq!(editor.word_at(at(0, 7)), Some(word));
    assert_eq!(editor.word_at(at(0, 8)), None);
}
