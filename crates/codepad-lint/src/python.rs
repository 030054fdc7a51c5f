//! Python analyzer.

use std::collections::HashSet;
use std::sync::LazyLock;

use codepad_core::text::{column_of_byte, leading_whitespace};
use codepad_core::{
    AnalysisContext, AnalyzerError, CharClass, Diagnostic, DiagnosticProvider, Severity,
};
use codepad_lang::Language;
use regex::Regex;

use crate::common::{self, BlockStyle, Declarations, TypoTable};
use crate::document::{Compiled, Document, Report, compiled};
use crate::{RuleFilter, codes};

const TYPOS: &[(&str, &str)] = &[
    ("pirnt", "print"),
    ("pritn", "print"),
    ("ptint", "print"),
    ("impotr", "import"),
    ("imoprt", "import"),
    ("retrun", "return"),
    ("reutrn", "return"),
    ("flase", "False"),
    ("true", "True"),
    ("false", "False"),
    ("noen", "None"),
    ("lenght", "length"),
    ("legnth", "length"),
    ("appned", "append"),
    ("extned", "extend"),
    ("insret", "insert"),
    ("defualt", "default"),
    ("slef", "self"),
];

struct Patterns {
    typos: TypoTable,
    terminator: Regex,
    colon_statement: Regex,
    block_opener: Regex,
    mutable_default: Regex,
    bare_except: Regex,
    none_comparison: Regex,
    bool_comparison: Regex,
    type_comparison: Regex,
    dict_key: Regex,
    function: Regex,
    class: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            typos: TypoTable::new(TYPOS)?,
            terminator: Regex::new(r"^(?:return|raise)\b|^(?:break|continue)$")?,
            colon_statement: Regex::new(
                r"^(async\s+def|async\s+for|async\s+with|def|class|if|elif|else|for|while|try|except|finally|with)\b",
            )?,
            block_opener: Regex::new(r"^\s*(if|elif|else|for|while|with|try|except|finally)\b")?,
            mutable_default: Regex::new(
                r"\bdef\s+\w+\s*\(.*?\b(\w+)\s*=\s*(\[\s*\]|\{\s*\})",
            )?,
            bare_except: Regex::new(r"^\s*(except)\s*:")?,
            none_comparison: Regex::new(r"(==|!=)\s*None\b")?,
            bool_comparison: Regex::new(r"==\s*(True|False)\b")?,
            type_comparison: Regex::new(r"\btype\s*\(\s*\w+\s*\)\s*==")?,
            dict_key: Regex::new(r#"(["'])(\w+)["']\s*:"#)?,
            function: Regex::new(r"^\s*(?:async\s+)?def\s+(\w+)")?,
            class: Regex::new(r"^\s*class\s+(\w+)")?,
        })
    }
}

static PATTERNS: Compiled<Patterns> = LazyLock::new(Patterns::compile);

/// Pattern checks for Python sources.
#[derive(Debug, Clone, Default)]
pub struct PythonAnalyzer {
    rules: RuleFilter,
}

impl PythonAnalyzer {
    /// An analyzer with every rule enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report only what `rules` allows.
    pub fn with_rules(rules: RuleFilter) -> Self {
        Self { rules }
    }
}

impl DiagnosticProvider for PythonAnalyzer {
    fn analyze(
        &self,
        text: &str,
        context: Option<&AnalysisContext>,
    ) -> Result<Vec<Diagnostic>, AnalyzerError> {
        let patterns = compiled(&PATTERNS)?;
        let doc = Document::new(text, Language::Python, context);
        let depths = common::bracket_depths(&doc);
        let mut out = Report::new("Python", &self.rules);

        common::bracket_balance(&doc, &mut out);
        common::unterminated_strings(&doc, &mut out);
        common::typos(&doc, &patterns.typos, &mut out);
        indentation(&doc, &depths, &mut out);
        missing_colons(&doc, patterns, &depths, &mut out);
        empty_blocks(&doc, patterns, &mut out);
        common::unreachable_code(&doc, &patterns.terminator, BlockStyle::Indentation, &mut out);
        comparisons(&doc, patterns, &mut out);
        duplicate_keys(&doc, patterns, &mut out);
        duplicate_definitions(&doc, patterns, &mut out);

        Ok(out.finish())
    }
}

/// Returns `true` if `line` continues a bracketed expression or a backslash-joined line.
fn is_continuation(doc: &Document<'_>, depths: &[usize], line: usize) -> bool {
    if depths.get(line).is_some_and(|&depth| depth > 0) {
        return true;
    }
    line.checked_sub(1)
        .is_some_and(|prev| doc.code(prev).trim_end().ends_with('\\'))
}

/// Mixed tabs and spaces, and indents that are not a multiple of the first one seen.
fn indentation(doc: &Document<'_>, depths: &[usize], out: &mut Report<'_>) {
    let mut unit: Option<usize> = None;
    for line in doc.code_lines() {
        if is_continuation(doc, depths, line) || doc.starts_in_string(line) {
            continue;
        }
        let lead = leading_whitespace(doc.text(line));
        if lead.contains(' ') && lead.contains('\t') {
            out.add(
                codes::MIXED_INDENTATION,
                line,
                0,
                lead.len(),
                Severity::Error,
                "Inconsistent use of tabs and spaces in indentation",
            );
            continue;
        }
        if lead.is_empty() || lead.contains('\t') {
            continue;
        }
        let width = lead.len();
        let unit = *unit.get_or_insert(width);
        if width % unit != 0 {
            out.add(
                codes::INDENTATION,
                line,
                0,
                width,
                Severity::Warning,
                format!("Inconsistent indentation: expected a multiple of {unit} spaces"),
            );
        }
    }
}

/// Whether `code` has a `:` outside brackets, and its final bracket depth.
fn top_level_colon(code: &str) -> (bool, isize) {
    let mut depth = 0isize;
    let mut colon = false;
    for ch in code.chars() {
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ':' if depth == 0 => colon = true,
            _ => {}
        }
    }
    (colon, depth)
}

fn missing_colons(doc: &Document<'_>, patterns: &Patterns, depths: &[usize], out: &mut Report<'_>) {
    for line in doc.code_lines() {
        if is_continuation(doc, depths, line) {
            continue;
        }
        let statement = doc.code(line).trim();
        let Some(keyword) = patterns
            .colon_statement
            .captures(statement)
            .and_then(|caps| caps.get(1))
        else {
            continue;
        };
        let (has_colon, depth) = top_level_colon(statement);
        if has_colon || depth > 0 || statement.ends_with('\\') {
            continue;
        }
        let keyword = keyword.as_str().split_whitespace().collect::<Vec<_>>().join(" ");
        out.add(
            codes::MISSING_COLON,
            line,
            doc.code_end(line),
            1,
            Severity::Error,
            format!("Expected ':' after '{keyword}' statement"),
        );
    }
}

/// Compound statements whose body is missing.
fn empty_blocks(doc: &Document<'_>, patterns: &Patterns, out: &mut Report<'_>) {
    for line in doc.code_lines() {
        let code = doc.code(line);
        if !code.trim_end().ends_with(':') {
            continue;
        }
        let Some(keyword) = patterns.block_opener.captures(code).and_then(|caps| caps.get(1))
        else {
            continue;
        };
        let empty = doc
            .next_code_line(line)
            .is_none_or(|next| doc.indent(next) <= doc.indent(line));
        if empty {
            out.add_match(
                codes::EMPTY_BLOCK,
                line,
                code,
                keyword,
                Severity::Warning,
                format!("Empty '{}' block", keyword.as_str()),
            );
        }
    }
}

fn comparisons(doc: &Document<'_>, patterns: &Patterns, out: &mut Report<'_>) {
    for line in doc.code_lines() {
        let code = doc.code(line);
        if let Some(found) = patterns.mutable_default.captures(code) {
            if let (Some(name), Some(default)) = (found.get(1), found.get(2)) {
                let column = column_of_byte(code, name.start());
                let length = column_of_byte(code, default.end()) - column;
                out.add(
                    codes::MUTABLE_DEFAULT,
                    line,
                    column,
                    length,
                    Severity::Warning,
                    format!(
                        "Mutable default argument '{}'; use None and assign inside the function",
                        default.as_str()
                    ),
                );
            }
        }
        if let Some(keyword) = patterns.bare_except.captures(code).and_then(|caps| caps.get(1)) {
            out.add_match(
                codes::BARE_EXCEPT,
                line,
                code,
                keyword,
                Severity::Warning,
                "Bare 'except:' catches everything; catch a specific exception",
            );
        }
        for caps in patterns.none_comparison.captures_iter(code) {
            let (Some(found), Some(op)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let message = if op.as_str() == "==" {
                "Use 'is None' instead of '== None'"
            } else {
                "Use 'is not None' instead of '!= None'"
            };
            out.add_match(codes::NONE_COMPARISON, line, code, found, Severity::Info, message);
        }
        for caps in patterns.bool_comparison.captures_iter(code) {
            let (Some(found), Some(value)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let message = if value.as_str() == "True" {
                "Comparison to True; use the expression directly"
            } else {
                "Comparison to False; use 'not' instead"
            };
            out.add_match(codes::BOOL_COMPARISON, line, code, found, Severity::Hint, message);
        }
        if let Some(found) = patterns.type_comparison.find(code) {
            out.add_match(
                codes::TYPE_COMPARISON,
                line,
                code,
                found,
                Severity::Hint,
                "Use 'isinstance()' instead of comparing type()",
            );
        }
    }
}

/// String keys repeated within one line of dictionary literal.
fn duplicate_keys(doc: &Document<'_>, patterns: &Patterns, out: &mut Report<'_>) {
    if !out.wants(codes::DUPLICATE_KEY) {
        return;
    }
    for line in doc.code_lines() {
        let Some(scanned) = doc.scanned(line) else {
            continue;
        };
        let text = scanned.without_comments();
        let mut seen = HashSet::new();
        for caps in patterns.dict_key.captures_iter(&text) {
            let (Some(found), Some(quote), Some(key)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            if scanned.class_at(column_of_byte(&text, quote.start())) != Some(CharClass::Quote) {
                continue;
            }
            if !seen.insert(key.as_str()) {
                out.add_match(
                    codes::DUPLICATE_KEY,
                    line,
                    &text,
                    found,
                    Severity::Warning,
                    format!("Duplicate key '{}' in dictionary literal", key.as_str()),
                );
            }
        }
    }
}

/// Functions and classes defined twice in the same scope. Decorated redefinitions
/// (property setters, overloads) are allowed.
fn duplicate_definitions(doc: &Document<'_>, patterns: &Patterns, out: &mut Report<'_>) {
    if !out.wants(codes::DUPLICATE_DECLARATION) {
        return;
    }
    let mut enclosing: Vec<(usize, usize)> = Vec::new();
    let mut seen = Declarations::new();
    let mut decorated = false;

    for line in doc.code_lines().filter(|&line| !doc.starts_in_string(line)) {
        let code = doc.code(line);
        let indent = doc.indent(line);
        while enclosing.last().is_some_and(|&(depth, _)| depth >= indent) {
            enclosing.pop();
        }
        if code.trim_start().starts_with('@') {
            decorated = true;
            continue;
        }

        let definition = match (patterns.function.captures(code), patterns.class.captures(code)) {
            (Some(caps), _) => caps.get(1).map(|name| ("Function", name)),
            (None, Some(caps)) => caps.get(1).map(|name| ("Class", name)),
            (None, None) => None,
        };
        if let Some((kind, name)) = definition {
            let scope = enclosing.last().map(|&(_, at)| at);
            let first = seen.first_line((scope, name.as_str()), line);
            if let (Some(first), false) = (first, decorated) {
                out.add_match(
                    codes::DUPLICATE_DECLARATION,
                    line,
                    code,
                    name,
                    Severity::Warning,
                    format!(
                        "{kind} '{}' is already defined on line {}",
                        name.as_str(),
                        first + 1
                    ),
                );
            }
            enclosing.push((indent, line));
        }
        decorated = false;
    }
}
