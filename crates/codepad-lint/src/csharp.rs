//! C# analyzer.

use std::collections::HashMap;
use std::sync::LazyLock;

use codepad_core::{AnalysisContext, AnalyzerError, Diagnostic, DiagnosticProvider, Severity};
use codepad_lang::Language;
use regex::Regex;

use crate::common::{self, BlockStyle, Declarations, TypoTable};
use crate::document::{Compiled, Document, Report, compiled};
use crate::{RuleFilter, codes};

const TYPOS: &[(&str, &str)] = &[
    ("Consle", "Console"),
    ("Consoel", "Console"),
    ("WritLine", "WriteLine"),
    ("WriteLien", "WriteLine"),
    ("ReadLien", "ReadLine"),
    ("Stirng", "String"),
    ("Strign", "String"),
    ("Lsit", "List"),
    ("Dictinoary", "Dictionary"),
    ("Dicitonary", "Dictionary"),
    ("Lenght", "Length"),
    ("Legnth", "Length"),
    ("Coutn", "Count"),
    ("ToStirng", "ToString"),
    ("Tostirng", "ToString"),
    ("namepsace", "namespace"),
    ("retrun", "return"),
    ("reutrn", "return"),
    ("pubilc", "public"),
    ("pulbic", "public"),
    ("privte", "private"),
    ("stirng", "string"),
];

const KEYWORD_TYPES: &[(&str, &str)] = &[("String", "string"), ("Int32", "int"), ("Boolean", "bool")];

struct Patterns {
    typos: TypoTable,
    terminator: Regex,
    block_opener: Regex,
    catch_opener: Regex,
    statement: Regex,
    condition: Regex,
    method: Regex,
    local: Regex,
    assignment: Regex,
    identifier: Regex,
    empty_write: Regex,
    this_qualifier: Regex,
    keyword_type: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            typos: TypoTable::new(TYPOS)?,
            terminator: Regex::new(r"^(?:return|throw|break|continue)\b")?,
            block_opener: Regex::new(
                r"^\s*(?:\}\s*)?(else\s+if|if|else|for|foreach|while|switch|do|try|finally)\b",
            )?,
            catch_opener: Regex::new(r"^\s*(?:\}\s*)?(catch)\b")?,
            statement: Regex::new(
                r"^(?:return|throw|var|int|string|bool|double|float|char|long|byte|short|decimal|object|dynamic)\s+\S",
            )?,
            condition: Regex::new(r"\bif\s*\(.*[^=!<>]=[^=>].*\)")?,
            method: Regex::new(
                r"^\s*(?:(?:public|private|protected|internal|static|virtual|override|async|sealed|abstract|new)\s+)*(?:void|int|string|bool|double|float|Task(?:<[\w<>, ]+>)?)\s+(\w+)\s*\(",
            )?,
            local: Regex::new(
                r"^\s*(?:var|int|string|bool|double|float|char|long|decimal|object)\s+(\w+)\s*[=;]",
            )?,
            assignment: Regex::new(r"\b(?:var|int|string|bool|double|float)\s+(\w+)\s*=[^=]")?,
            identifier: Regex::new(r"\b[A-Za-z_]\w*\b")?,
            empty_write: Regex::new(r"\bConsole\.(Write(?:Line)?)\(\s*\)")?,
            this_qualifier: Regex::new(r"\bthis\.")?,
            keyword_type: Regex::new(r"\b(String|Int32|Boolean)\b")?,
        })
    }
}

static PATTERNS: Compiled<Patterns> = LazyLock::new(Patterns::compile);

/// Pattern checks for C# sources.
#[derive(Debug, Clone, Default)]
pub struct CSharpAnalyzer {
    rules: RuleFilter,
}

impl CSharpAnalyzer {
    /// An analyzer with every rule enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report only what `rules` allows.
    pub fn with_rules(rules: RuleFilter) -> Self {
        Self { rules }
    }
}

impl DiagnosticProvider for CSharpAnalyzer {
    fn analyze(
        &self,
        text: &str,
        context: Option<&AnalysisContext>,
    ) -> Result<Vec<Diagnostic>, AnalyzerError> {
        let patterns = compiled(&PATTERNS)?;
        let doc = Document::new(text, Language::CSharp, context);
        let mut out = Report::new("C#", &self.rules);

        common::bracket_balance(&doc, &mut out);
        common::unterminated_strings(&doc, &mut out);
        common::typos(&doc, &patterns.typos, &mut out);
        using_directives(&doc, &mut out);
        common::missing_semicolons(
            &doc,
            &patterns.statement,
            Some(&patterns.method),
            Severity::Warning,
            &mut out,
        );
        common::assignments_in_conditions(
            &doc,
            &patterns.condition,
            "Possible accidental assignment in condition; did you mean '=='?",
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
        for (line, column, _) in common::empty_brace_blocks(&doc, &patterns.catch_opener) {
            out.add(
                codes::EMPTY_CATCH,
                line,
                column,
                5,
                Severity::Warning,
                "Empty catch block; consider logging the exception",
            );
        }
        common::unreachable_code(&doc, &patterns.terminator, BlockStyle::Braces, &mut out);
        unused_locals(&doc, patterns, &mut out);
        style_hints(&doc, patterns, &mut out);
        duplicate_declarations(&doc, patterns, &mut out);

        Ok(out.finish())
    }
}

fn using_directives(doc: &Document<'_>, out: &mut Report<'_>) {
    for line in doc.code_lines() {
        let statement = doc.code(line).trim();
        if statement.starts_with("using ")
            && !statement.contains('(')
            && !statement.ends_with([';', '{'])
        {
            out.add(
                codes::MISSING_SEMICOLON,
                line,
                doc.code_end(line),
                1,
                Severity::Error,
                "Expected ';' at end of using directive",
            );
        }
    }
}

/// Locals assigned once and never read afterwards.
fn unused_locals(doc: &Document<'_>, patterns: &Patterns, out: &mut Report<'_>) {
    if !out.wants(codes::UNUSED_VARIABLE) {
        return;
    }
    let mut uses: HashMap<&str, Vec<(usize, usize)>> = HashMap::new();
    for line in doc.code_lines() {
        for word in patterns.identifier.find_iter(doc.code(line)) {
            uses.entry(word.as_str())
                .or_default()
                .push((line, word.start()));
        }
    }

    for line in doc.code_lines() {
        let code = doc.code(line);
        for caps in patterns.assignment.captures_iter(code) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let after = (line, whole.end());
            let used = uses
                .get(name.as_str())
                .is_some_and(|sites| sites.iter().any(|&site| site >= after));
            if !used {
                out.add_match(
                    codes::UNUSED_VARIABLE,
                    line,
                    code,
                    name,
                    Severity::Warning,
                    format!(
                        "Variable '{}' is assigned but its value is never used",
                        name.as_str()
                    ),
                );
            }
        }
    }
}

fn style_hints(doc: &Document<'_>, patterns: &Patterns, out: &mut Report<'_>) {
    for line in doc.code_lines() {
        let code = doc.code(line);
        for caps in patterns.empty_write.captures_iter(code) {
            let (Some(found), Some(method)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.add_match(
                codes::EMPTY_CONSOLE_WRITE,
                line,
                code,
                found,
                Severity::Info,
                format!("Console.{}() called with no arguments", method.as_str()),
            );
        }
        for found in patterns.this_qualifier.find_iter(code) {
            out.add_match(
                codes::THIS_QUALIFIER,
                line,
                code,
                found,
                Severity::Hint,
                "'this.' qualifier may be unnecessary",
            );
        }
        if code.trim_start().starts_with("using ") {
            continue;
        }
        for found in patterns.keyword_type.find_iter(code) {
            let keyword = KEYWORD_TYPES
                .iter()
                .find(|(name, _)| *name == found.as_str())
                .map_or("", |&(_, keyword)| keyword);
            out.add_match(
                codes::KEYWORD_TYPE_NAME,
                line,
                code,
                found,
                Severity::Hint,
                format!("Use keyword '{keyword}' instead of '{}'", found.as_str()),
            );
        }
    }
}

/// Methods and locals declared twice in the same brace block.
fn duplicate_declarations(doc: &Document<'_>, patterns: &Patterns, out: &mut Report<'_>) {
    if !out.wants(codes::DUPLICATE_DECLARATION) {
        return;
    }
    let scopes = common::brace_scopes(doc);
    let mut methods = Declarations::new();
    let mut locals = Declarations::new();

    for line in doc.code_lines() {
        let code = doc.code(line);
        let scope = scopes.get(line).copied().flatten();
        if let Some(name) = patterns.method.captures(code).and_then(|caps| caps.get(1)) {
            if let Some(first) = methods.first_line((scope, name.as_str()), line) {
                out.add_match(
                    codes::DUPLICATE_DECLARATION,
                    line,
                    code,
                    name,
                    Severity::Info,
                    format!(
                        "Method '{}' is already declared on line {} (if this is not an overload, it is a duplicate)",
                        name.as_str(),
                        first + 1
                    ),
                );
            }
        } else if let Some(name) = patterns.local.captures(code).and_then(|caps| caps.get(1)) {
            if let Some(first) = locals.first_line((scope, name.as_str()), line) {
                out.add_match(
                    codes::DUPLICATE_DECLARATION,
                    line,
                    code,
                    name,
                    Severity::Warning,
                    format!(
                        "Variable '{}' is already declared on line {}",
                        name.as_str(),
                        first + 1
                    ),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Vec<Diagnostic> {
        CSharpAnalyzer::new().analyze(text, None).unwrap()
    }

    fn with_code<'a>(diagnostics: &'a [Diagnostic], code: &str) -> Vec<&'a Diagnostic> {
        diagnostics
            .iter()
            .filter(|d| d.code.as_deref() == Some(code))
            .collect()
    }

    #[test]
    fn test_patterns_compile() {
        assert!(compiled(&PATTERNS).is_ok());
    }

    #[test]
    fn test_using_without_semicolon() {
        let diagnostics = run("using System\nusing System.IO;\n");
        let found = with_code(&diagnostics, codes::MISSING_SEMICOLON);
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].line, found[0].column), (0, 12));
        assert_eq!(found[0].severity, Severity::Error);
    }

    #[test]
    fn test_unused_local() {
        let diagnostics = run("void F() {\n    int a = 1;\n    int b = 2;\n    Use(b);\n}\n");
        let found = with_code(&diagnostics, codes::UNUSED_VARIABLE);
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].line, found[0].column), (1, 8));
    }

    #[test]
    fn test_keyword_type_hint() {
        let diagnostics = run("String s = Name;\nuse(s);\n");
        let found = with_code(&diagnostics, codes::KEYWORD_TYPE_NAME);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "Use keyword 'string' instead of 'String'");
    }

    #[test]
    fn test_duplicate_locals_are_scoped_by_block() {
        let text = "void A() {\n    int x = 1;\n    int x = 2;\n}\nvoid B() {\n    int x = 3;\n}\n";
        let diagnostics = run(text);
        let found = with_code(&diagnostics, codes::DUPLICATE_DECLARATION);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 2);
        assert_eq!(found[0].message, "Variable 'x' is already declared on line 2");
    }

    #[test]
    fn test_empty_catch() {
        let diagnostics = run("try {\n    Run();\n} catch (Exception) {\n}\n");
        let found = with_code(&diagnostics, codes::EMPTY_CATCH);
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].line, found[0].column), (2, 2));
        assert!(with_code(&diagnostics, codes::EMPTY_BLOCK).is_empty());
    }

    #[test]
    fn test_commented_catch_is_not_empty() {
        let diagnostics = run("try {\n    Run();\n} catch (Exception) {\n    // ignored\n}\n");
        assert!(with_code(&diagnostics, codes::EMPTY_CATCH).is_empty());
    }
}
