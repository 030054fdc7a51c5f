use codepad_core::{
    Color, Editor, EditorConfig, FontStyle, Position, Ruleset, SyntaxRule, TextStyle,
};
use pretty_assertions::assert_eq;

const COMMENT: TextStyle = TextStyle::with_font(Color::rgb(106, 153, 85), FontStyle::ITALIC);
const STRING: TextStyle = TextStyle::new(Color::rgb(206, 145, 120));
const KEYWORD: TextStyle = TextStyle::with_font(Color::rgb(86, 156, 214), FontStyle::BOLD);

fn editor_with(ruleset: Ruleset, text: &str) -> Editor {
    Editor::with_text(text, EditorConfig::default().with_ruleset(ruleset)).unwrap()
}

fn styles_by_column(editor: &mut Editor, line: usize) -> Vec<TextStyle> {
    let runs = editor.color_runs_for_line(line).to_vec();
    runs.iter()
        .flat_map(|run| std::iter::repeat_n(run.style, run.length))
        .collect()
}

#[test]
fn test_block_comment_spans_lines() {
    let mut rs = Ruleset::new("c");
    rs.add_rule("Comment", r"/\*[\s\S]*?\*/", COMMENT).unwrap();
    rs.add_rule("Keyword", r"\b(?:int|return)\b", KEYWORD).unwrap();
    let mut editor = editor_with(rs, "int a; /* start\nreturn inside\nend */ return");

    let line0 = editor.color_runs_for_line(0).to_vec();
    assert_eq!(line0.last().map(|r| (r.start, r.style)), Some((7, COMMENT)));

    let line1 = editor.color_runs_for_line(1).to_vec();
    assert_eq!(line1.len(), 1);
    assert_eq!(line1[0].style, COMMENT);
    assert_eq!(line1[0].length, "return inside".len());

    let line2 = editor.color_runs_for_line(2).to_vec();
    assert_eq!(line2[0].style, COMMENT);
    assert_eq!(line2[0].length, 6);
    assert_eq!(line2.last().map(|r| r.style), Some(KEYWORD));
}

#[test]
fn test_exclusion_carves_interpolation_hole() {
    let mut rs = Ruleset::new("interp");
    rs.push(
        SyntaxRule::new("String", r#""[^"]*""#, STRING)
            .unwrap()
            .with_exclusion(r"\{[^}]*\}")
            .unwrap(),
    );
    let default = rs.default_style();
    let mut editor = editor_with(rs, "\"a{b}c\"");

    let styles = styles_by_column(&mut editor, 0);
    assert_eq!(
        styles,
        vec![STRING, STRING, default, default, default, STRING, STRING]
    );
}

#[test]
fn test_exclusion_unclaims_characters_owned_by_earlier_rules() {
    let mut rs = Ruleset::new("interp");
    rs.add_rule("Comment", r"//.*$", COMMENT).unwrap();
    rs.push(
        SyntaxRule::new("String", r#""[^"]*""#, STRING)
            .unwrap()
            .with_exclusion(r"\{[^}]*\}")
            .unwrap(),
    );
    let default = rs.default_style();
    let mut editor = editor_with(rs, "// \"a{b}c\"");

    let styles = styles_by_column(&mut editor, 0);
    assert_eq!(&styles[..5], &[COMMENT; 5]);
    assert_eq!(&styles[5..8], &[default; 3]);
    assert_eq!(&styles[8..], &[COMMENT; 2]);
}

#[test]
fn test_runs_track_edits() {
    let mut rs = Ruleset::new("kw");
    rs.add_rule("Keyword", r"\bif\b", KEYWORD).unwrap();
    let mut editor = editor_with(rs, "x");
    assert_eq!(editor.color_runs_for_line(0).len(), 1);

    editor.insert_text(Position::ZERO, "if ");
    let runs = editor.color_runs_for_line(0).to_vec();
    assert_eq!(runs[0].style, KEYWORD);
    assert_eq!(runs[0].length, 2);

    editor.undo();
    assert_ne!(editor.color_runs_for_line(0)[0].style, KEYWORD);
}

#[test]
fn test_line_anchors_match_per_line() {
    let mut rs = Ruleset::new("pre");
    rs.add_rule("Preprocessor", r"^\s*#\w+", KEYWORD).unwrap();
    let mut editor = editor_with(rs, "#if A\nx\n  #endif");
    assert_eq!(editor.color_runs_for_line(0)[0].length, 3);
    assert_ne!(editor.color_runs_for_line(1)[0].style, KEYWORD);
    assert_eq!(editor.color_runs_for_line(2)[0].style, KEYWORD);
}

#[test]
fn test_plain_text_is_one_default_run() {
    let mut editor = Editor::with_text("hello world", EditorConfig::default()).unwrap();
    let runs = editor.color_runs_for_line(0).to_vec();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].length, 11);
}
