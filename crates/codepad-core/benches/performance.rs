use codepad_core::{
    BraceFolding, Color, Editor, EditorConfig, FoldingProvider, Language, LexicalScan, Position,
    Ruleset, ScanSyntax, TextStyle,
};
use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

fn large_text(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 64);
    for i in 0..line_count {
        if i % 10 == 0 {
            out.push_str(&format!("void f{i:06}() {{ // block {i}\n"));
        } else if i % 10 == 9 {
            out.push_str("}\n");
        } else {
            out.push_str(&format!(
                "    var s{i} = \"the quick brown fox\"; /* jumps */ int n = {i};\n"
            ));
        }
    }
    // Remove the final '\n' to avoid creating an extra trailing empty line.
    out.pop();
    out
}

fn ruleset() -> Ruleset {
    let mut rs = Ruleset::new("bench");
    let rules = [
        ("Comment", r"//.*$|/\*[\s\S]*?\*/", Color::rgb(106, 153, 85)),
        ("String", r#""(?:[^"\\]|\\.)*""#, Color::rgb(206, 145, 120)),
        ("Keyword", r"\b(?:void|var|int|return)\b", Color::rgb(86, 156, 214)),
        ("Number", r"\b\d+\b", Color::rgb(181, 206, 168)),
    ];
    for (name, pattern, color) in rules {
        rs.add_rule(name, pattern, TextStyle::new(color)).unwrap();
    }
    rs
}

fn editor(text: &str) -> Editor {
    let config = EditorConfig::for_language(Language::CSharp).with_ruleset(ruleset());
    Editor::with_text(text, config).unwrap()
}

fn bench_large_file_open(c: &mut Criterion) {
    let text = large_text(50_000);
    c.bench_function("large_file_open/50k_lines", |b| {
        b.iter(|| {
            let editor = editor(black_box(&text));
            black_box(editor.line_count());
        })
    });
}

fn bench_typing_in_middle(c: &mut Criterion) {
    let text = large_text(50_000);
    c.bench_function("typing_middle/100_chars", |b| {
        b.iter_batched(
            || editor(&text),
            |mut editor| {
                let mut caret = Position::new(25_001, 4);
                for _ in 0..100 {
                    caret = editor.type_char(caret, 'x');
                }
                black_box(editor.version());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_highlight_after_edit(c: &mut Criterion) {
    let text = large_text(20_000);
    let mut editor = editor(&text);
    editor.color_runs_for_line(0);

    c.bench_function("highlight_rebuild/20k_lines", |b| {
        b.iter(|| {
            editor.insert_text(Position::new(10_001, 0), " ");
            black_box(editor.color_runs_for_line(10_001).len());
            editor.undo();
        })
    });
}

fn bench_fold_rebuild(c: &mut Criterion) {
    let text = large_text(50_000);
    let mut editor = editor(&text);
    editor.collapse_all_folds();

    c.bench_function("fold_rebuild/50k_lines", |b| {
        b.iter(|| {
            editor.insert_text(Position::new(25_001, 0), " ");
            black_box(editor.visible_line_projection().len());
            editor.undo();
        })
    });
}

fn bench_brace_regions(c: &mut Criterion) {
    let text = large_text(50_000);
    let provider = BraceFolding::new(ScanSyntax::c_like());
    c.bench_function("brace_regions/50k_lines", |b| {
        b.iter(|| black_box(provider.fold_regions(black_box(&text)).len()))
    });
}

fn bench_lexical_scan(c: &mut Criterion) {
    let text = large_text(50_000);
    let syntax = ScanSyntax::c_like();
    c.bench_function("lexical_scan/50k_lines", |b| {
        b.iter(|| {
            let scan = LexicalScan::new(black_box(&text), &syntax);
            black_box(scan.code_chars().count());
        })
    });
}

criterion_group!(
    benches,
    bench_large_file_open,
    bench_typing_in_middle,
    bench_highlight_after_edit,
    bench_fold_rebuild,
    bench_brace_regions,
    bench_lexical_scan
);
criterion_main!(benches);
