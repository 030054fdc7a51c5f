//! JavaScript analyzer.

use std::collections::HashMap;
use std::sync::LazyLock;

use codepad_core::text::column_of_byte;
use codepad_core::{
    AnalysisContext, AnalyzerError, Diagnostic, DiagnosticProvider, Position, Severity,
};
use codepad_lang::Language;
use regex::Regex;

use crate::common::{self, BlockStyle, Declarations, TypoTable};
use crate::document::{Compiled, Document, Report, compiled};
use crate::{RuleFilter, codes};

const TYPOS: &[(&str, &str)] = &[
    ("consle", "console"),
    ("conosle", "console"),
    ("docuemnt", "document"),
    ("documnet", "document"),
    ("funtcion", "function"),
    ("fucntion", "function"),
    ("retrun", "return"),
    ("reutrn", "return"),
    ("lenght", "length"),
    ("legnth", "length"),
    ("flase", "false"),
    ("ture", "true"),
    ("nlul", "null"),
    ("parseINt", "parseInt"),
    ("praseInt", "parseInt"),
    ("setTimout", "setTimeout"),
    ("setTimoet", "setTimeout"),
    ("setInteval", "setInterval"),
    ("addEvenListener", "addEventListener"),
    ("addEventListner", "addEventListener"),
    ("querySelectro", "querySelector"),
];

struct Patterns {
    typos: TypoTable,
    terminator: Regex,
    block_opener: Regex,
    statement: Regex,
    condition: Regex,
    var_declaration: Regex,
    console_log: Regex,
    undefined_comparison: Regex,
    undefined_init: Regex,
    anonymous_function: Regex,
    object_key: Regex,
    function: Regex,
    binding: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            typos: TypoTable::new(TYPOS)?,
            terminator: Regex::new(r"^(?:return|throw|break|continue)\b")?,
            block_opener: Regex::new(
                r"^\s*(?:\}\s*)?(else\s+if|if|else|for|while|switch|do|try|catch|finally)\b",
            )?,
            statement: Regex::new(
                r#"^(?:(?:export\s+)?(?:return|throw|const|let|var)\s+\S|import\s.*\bfrom\s+["'])"#,
            )?,
            condition: Regex::new(r"\b(?:if|while)\s*\(.*[^=!<>]=[^=>].*\)")?,
            var_declaration: Regex::new(r"^\s*(?:export\s+)?(var)\s+\w")?,
            console_log: Regex::new(r"\bconsole\.log\b")?,
            undefined_comparison: Regex::new(r"(?:===?|!==?)\s*undefined\b")?,
            undefined_init: Regex::new(r"\b(?:let|var)\s+\w+\s*(=\s*undefined)\b")?,
            anonymous_function: Regex::new(r"\bfunction\s*\(")?,
            object_key: Regex::new(r"(?:^|[{,])\s*([A-Za-z_$][\w$]*)\s*:")?,
            function: Regex::new(r"^\s*(?:export\s+)?(?:async\s+)?function\s*\*?\s*(\w+)\s*\(")?,
            binding: Regex::new(r"^\s*(?:export\s+)?(?:let|const)\s+(\w+)\s*[=;]")?,
        })
    }
}

static PATTERNS: Compiled<Patterns> = LazyLock::new(Patterns::compile);

/// Pattern checks for JavaScript sources.
#[derive(Debug, Clone, Default)]
pub struct JavaScriptAnalyzer {
    rules: RuleFilter,
}

impl JavaScriptAnalyzer {
    /// An analyzer with every rule enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report only what `rules` allows.
    pub fn with_rules(rules: RuleFilter) -> Self {
        Self { rules }
    }
}

impl DiagnosticProvider for JavaScriptAnalyzer {
    fn analyze(
        &self,
        text: &str,
        context: Option<&AnalysisContext>,
    ) -> Result<Vec<Diagnostic>, AnalyzerError> {
        let patterns = compiled(&PATTERNS)?;
        let doc = Document::new(text, Language::JavaScript, context);
        let mut out = Report::new("JavaScript", &self.rules);

        common::bracket_balance(&doc, &mut out);
        common::unterminated_strings(&doc, &mut out);
        common::typos(&doc, &patterns.typos, &mut out);
        common::missing_semicolons(&doc, &patterns.statement, None, Severity::Info, &mut out);
        common::assignments_in_conditions(
            &doc,
            &patterns.condition,
            "Possible accidental assignment in condition; did you mean '===' or '=='?",
            &mut out,
        );
        for (line, column, keyword) in common::empty_brace_blocks(&doc, &patterns.block_opener) {
            out.add(
                codes::EMPTY_BLOCK,
                line,
                column,
                keyword.chars().count(),
                Severity::Warning,
                format!("Empty '{keyword}' block"),
            );
        }
        common::unreachable_code(&doc, &patterns.terminator, BlockStyle::Braces, &mut out);
        strict_equality(&doc, &mut out);
        style_hints(&doc, patterns, &mut out);
        duplicate_keys(&doc, patterns, &mut out);
        duplicate_declarations(&doc, patterns, &mut out);

        Ok(out.finish())
    }
}

/// `==` and `!=` outside of `===`, `!==`, `<=`, `>=`.
fn strict_equality(doc: &Document<'_>, out: &mut Report<'_>) {
    for line in doc.code_lines() {
        let chars: Vec<char> = doc.code(line).chars().collect();
        for (column, window) in chars.windows(2).enumerate() {
            if window[1] != '=' {
                continue;
            }
            let before = column.checked_sub(1).and_then(|i| chars.get(i)).copied();
            let after = chars.get(column + 2).copied();
            if after == Some('=') {
                continue;
            }
            let message = match (window[0], before) {
                ('=', Some('=' | '!' | '<' | '>')) => continue,
                ('=', _) => "Use '===' instead of '==' for strict equality comparison",
                ('!', _) => "Use '!==' instead of '!=' for strict inequality comparison",
                _ => continue,
            };
            out.add(codes::STRICT_EQUALITY, line, column, 2, Severity::Warning, message);
        }
    }
}

fn style_hints(doc: &Document<'_>, patterns: &Patterns, out: &mut Report<'_>) {
    for line in doc.code_lines() {
        let code = doc.code(line);
        if let Some(keyword) = patterns
            .var_declaration
            .captures(code)
            .and_then(|caps| caps.get(1))
        {
            out.add_match(
                codes::VAR_USAGE,
                line,
                code,
                keyword,
                Severity::Warning,
                "Use 'let' or 'const' instead of 'var'",
            );
        }
        for found in patterns.console_log.find_iter(code) {
            out.add_match(
                codes::CONSOLE_LOG,
                line,
                code,
                found,
                Severity::Info,
                "console.log() statement found; consider removing it before production",
            );
        }
        for found in patterns.undefined_comparison.find_iter(code) {
            out.add_match(
                codes::UNDEFINED_COMPARISON,
                line,
                code,
                found,
                Severity::Info,
                "Consider 'typeof x === \"undefined\"' for a safer undefined check",
            );
        }
        if let Some(init) = patterns
            .undefined_init
            .captures(code)
            .and_then(|caps| caps.get(1))
        {
            out.add_match(
                codes::UNDEFINED_INIT,
                line,
                code,
                init,
                Severity::Hint,
                "Unnecessary initialization to undefined; variables are undefined by default",
            );
        }
        if let Some(found) = patterns.anonymous_function.find(code) {
            let column = column_of_byte(code, found.start());
            out.add(
                codes::PREFER_ARROW,
                line,
                column,
                "function".len(),
                Severity::Hint,
                "Consider using an arrow function",
            );
        }
    }
}

/// Object keys repeated inside the same pair of braces.
fn duplicate_keys(doc: &Document<'_>, patterns: &Patterns, out: &mut Report<'_>) {
    if !out.wants(codes::DUPLICATE_KEY) {
        return;
    }
    let mut open: Vec<Position> = Vec::new();
    let mut keys: HashMap<(Position, &str), usize> = HashMap::new();

    for line in 0..doc.line_count() {
        let code = doc.code(line);
        let mut found = Vec::new();
        if doc.is_code(line) {
            for caps in patterns.object_key.captures_iter(code) {
                if let Some(key) = caps.get(1) {
                    found.push((column_of_byte(code, key.start()), key));
                }
            }
        }
        let mut pending = found.into_iter().peekable();
        for (column, ch) in code.chars().enumerate() {
            while let Some((_, key)) = pending.next_if(|(at, _)| *at <= column) {
                report_key(out, &mut keys, open.last().copied(), line, code, key);
            }
            match ch {
                '{' => open.push(Position::new(line, column)),
                '}' => {
                    open.pop();
                }
                _ => {}
            }
        }
        for (_, key) in pending {
            report_key(out, &mut keys, open.last().copied(), line, code, key);
        }
    }
}

fn report_key<'t>(
    out: &mut Report<'_>,
    keys: &mut HashMap<(Position, &'t str), usize>,
    scope: Option<Position>,
    line: usize,
    code: &'t str,
    key: regex::Match<'t>,
) {
    let Some(scope) = scope else {
        return;
    };
    if keys.insert((scope, key.as_str()), line).is_some() {
        out.add_match(
            codes::DUPLICATE_KEY,
            line,
            code,
            key,
            Severity::Warning,
            format!("Duplicate key '{}' in object literal", key.as_str()),
        );
    }
}

/// Functions and `let`/`const` bindings declared twice in the same brace block.
fn duplicate_declarations(doc: &Document<'_>, patterns: &Patterns, out: &mut Report<'_>) {
    if !out.wants(codes::DUPLICATE_DECLARATION) {
        return;
    }
    let scopes = common::brace_scopes(doc);
    let mut functions = Declarations::new();
    let mut bindings = Declarations::new();

    for line in doc.code_lines() {
        let code = doc.code(line);
        let scope = scopes.get(line).copied().flatten();
        let (name, first, kind) =
            if let Some(name) = patterns.function.captures(code).and_then(|caps| caps.get(1)) {
                let first = functions.first_line((scope, name.as_str()), line);
                (name, first, "Function")
            } else if let Some(name) = patterns.binding.captures(code).and_then(|caps| caps.get(1)) {
                let first = bindings.first_line((scope, name.as_str()), line);
                (name, first, "Variable")
            } else {
                continue;
            };
        if let Some(first) = first {
            out.add_match(
                codes::DUPLICATE_DECLARATION,
                line,
                code,
                name,
                Severity::Warning,
                format!(
                    "{kind} '{}' is already declared on line {}",
                    name.as_str(),
                    first + 1
                ),
            );
        }
    }
}
