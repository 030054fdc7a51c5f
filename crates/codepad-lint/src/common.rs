//! Checks shared by every language.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;

use codepad_core::text::column_of_byte;
use codepad_core::{Position, Severity};
use regex::Regex;

use crate::codes;
use crate::document::{Document, Report};

fn closer_of(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// Unmatched, mismatched and unclosed brackets. Only code characters are considered.
pub(crate) fn bracket_balance(doc: &Document<'_>, out: &mut Report<'_>) {
    if !out.wants(codes::BRACKET_BALANCE) {
        return;
    }
    let mut open: Vec<(char, Position)> = Vec::new();
    for (pos, ch) in doc.scan().code_chars() {
        match ch {
            '(' | '[' | '{' => open.push((ch, pos)),
            ')' | ']' | '}' => match open.pop() {
                None => out.add(
                    codes::BRACKET_BALANCE,
                    pos.line,
                    pos.column,
                    1,
                    Severity::Error,
                    format!("Unmatched closing '{ch}'"),
                ),
                Some((opener, at)) if closer_of(opener) != ch => out.add(
                    codes::BRACKET_BALANCE,
                    pos.line,
                    pos.column,
                    1,
                    Severity::Error,
                    format!(
                        "Mismatched bracket: expected closing for '{opener}' from line {}",
                        at.line + 1
                    ),
                ),
                Some(_) => {}
            },
            _ => {}
        }
    }
    for (opener, at) in open {
        out.add(
            codes::BRACKET_BALANCE,
            at.line,
            at.column,
            1,
            Severity::Error,
            format!("Unclosed '{opener}'"),
        );
    }
}

/// String literals still open at the end of their line (or of the document, for multi-line kinds).
///
/// The diagnostic starts at the opening delimiter and runs to the end of that line.
pub(crate) fn unterminated_strings(doc: &Document<'_>, out: &mut Report<'_>) {
    for literal in doc.scan().unterminated() {
        let line = literal.start.line;
        let length = doc.text_end(line).saturating_sub(literal.start.column);
        out.add(
            codes::UNTERMINATED_STRING,
            line,
            literal.start.column,
            length,
            Severity::Error,
            "Unterminated string literal",
        );
    }
}

/// Common misspellings of keywords and library names, with their corrections.
pub(crate) struct TypoTable {
    pattern: Regex,
    fixes: HashMap<&'static str, &'static str>,
}

impl TypoTable {
    pub(crate) fn new(entries: &[(&'static str, &'static str)]) -> Result<Self, regex::Error> {
        let alternation = entries
            .iter()
            .map(|(typo, _)| regex::escape(typo))
            .collect::<Vec<_>>()
            .join("|");
        Ok(Self {
            pattern: Regex::new(&format!(r"\b(?:{alternation})\b"))?,
            fixes: entries.iter().copied().collect(),
        })
    }
}

/// Misspelled words in code. A word is not reported when the analysis context defines it or
/// when the line assigns to it.
pub(crate) fn typos(doc: &Document<'_>, table: &TypoTable, out: &mut Report<'_>) {
    if !out.wants(codes::TYPO) {
        return;
    }
    for line in doc.code_lines() {
        let code = doc.code(line);
        for found in table.pattern.find_iter(code) {
            let word = found.as_str();
            if doc.defines(word) || is_assignment_target(&code[found.end()..]) {
                continue;
            }
            if let Some(fix) = table.fixes.get(word) {
                out.add_match(
                    codes::TYPO,
                    line,
                    code,
                    found,
                    Severity::Error,
                    format!("Did you mean '{fix}'?"),
                );
            }
        }
    }
}

fn is_assignment_target(rest: &str) -> bool {
    let rest = rest.trim_start();
    rest.starts_with('=') && !rest.starts_with("==")
}

/// How a language delimits blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockStyle {
    Braces,
    Indentation,
}

/// Code following a `return`/`break`/`continue`/`throw`/`raise` in the same block.
///
/// `terminator` is matched against the trimmed statement. The next code line is reported when it
/// is indented at least as deep and does not close the block (or start a new `case`).
pub(crate) fn unreachable_code(
    doc: &Document<'_>,
    terminator: &Regex,
    style: BlockStyle,
    out: &mut Report<'_>,
) {
    if !out.wants(codes::UNREACHABLE_CODE) {
        return;
    }
    for line in doc.code_lines() {
        let statement = doc.code(line).trim();
        if !terminator.is_match(statement) || !statement_is_complete(statement, style) {
            continue;
        }
        let Some(next) = doc.next_code_line(line) else {
            continue;
        };
        if doc.starts_in_string(next) {
            continue;
        }
        if doc.indent(next) < doc.indent(line) || closes_block(doc.code(next).trim(), style) {
            continue;
        }
        let column = doc.indent(next);
        out.add(
            codes::UNREACHABLE_CODE,
            next,
            column,
            doc.text_end(next).saturating_sub(column),
            Severity::Warning,
            "Unreachable code detected",
        );
    }
}

fn statement_is_complete(statement: &str, style: BlockStyle) -> bool {
    match style {
        BlockStyle::Braces => statement.ends_with(';'),
        BlockStyle::Indentation => !statement.ends_with(['\\', ',', '(', '[', '{']),
    }
}

fn closes_block(statement: &str, style: BlockStyle) -> bool {
    match style {
        BlockStyle::Braces => {
            statement.starts_with(['}', '{'])
                || statement.starts_with("case ")
                || statement.starts_with("default")
        }
        BlockStyle::Indentation => false,
    }
}

/// Brace blocks with nothing inside, as `(line, column, keyword)` of the opening keyword.
///
/// `opener` runs on masked code; its first group is the keyword. A block holding only a
/// comment is not empty.
pub(crate) fn empty_brace_blocks(doc: &Document<'_>, opener: &Regex) -> Vec<(usize, usize, String)> {
    let mut found = Vec::new();
    for line in doc.code_lines() {
        let code = doc.code(line);
        let Some(keyword) = opener.captures(code).and_then(|caps| caps.get(1)) else {
            continue;
        };
        let compact: String = doc
            .text(line)
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .collect();
        let empty = compact.ends_with("{}")
            || block_closes_immediately(doc, line, code.trim_end().ends_with('{'));
        if empty {
            found.push((
                line,
                column_of_byte(code, keyword.start()),
                keyword.as_str().to_string(),
            ));
        }
    }
    found
}

fn block_closes_immediately(doc: &Document<'_>, line: usize, mut opened: bool) -> bool {
    let mut at = line;
    while let Some(next) = doc.next_nonblank_line(at) {
        let statement = doc.code(next).trim();
        if !opened && statement == "{" {
            opened = true;
            at = next;
            continue;
        }
        return opened && statement.starts_with('}');
    }
    false
}

/// Statements of the `statement` shape that do not end in `;`.
pub(crate) fn missing_semicolons(
    doc: &Document<'_>,
    statement: &Regex,
    skip: Option<&Regex>,
    severity: Severity,
    out: &mut Report<'_>,
) {
    if !out.wants(codes::MISSING_SEMICOLON) {
        return;
    }
    for line in doc.code_lines() {
        let code = doc.code(line);
        let trimmed = code.trim();
        if !statement.is_match(trimmed)
            || skip.is_some_and(|skip| skip.is_match(code))
            || trimmed.ends_with([';', '{', '}', ','])
            || continues_on_next_line(doc, line)
        {
            continue;
        }
        out.add(
            codes::MISSING_SEMICOLON,
            line,
            doc.code_end(line),
            1,
            severity,
            "Possible missing semicolon",
        );
    }
}

/// Returns `true` if the statement on `line` visibly continues on the following line.
pub(crate) fn continues_on_next_line(doc: &Document<'_>, line: usize) -> bool {
    let code = doc.code(line).trim_end();
    if code.ends_with(['(', '[', '{', ',', '+', '-', '*', '/', '%', '&', '|', '=', '?', ':', '.'])
        || code.ends_with("=>")
        || open_bracket_depth(code) > 0
    {
        return true;
    }
    doc.next_code_line(line).is_some_and(|next| {
        doc.code(next).trim_start().starts_with([
            '.', '?', ':', '+', '-', '*', '/', '%', '&', '|', '=', '{',
        ])
    })
}

/// Opening minus closing brackets of every kind.
pub(crate) fn open_bracket_depth(code: &str) -> isize {
    code.chars().fold(0, |depth, ch| match ch {
        '(' | '[' | '{' => depth + 1,
        ')' | ']' | '}' => depth - 1,
        _ => depth,
    })
}

/// Conditions matched by `condition`, a pattern that only accepts a lone `=` inside the parentheses.
pub(crate) fn assignments_in_conditions(
    doc: &Document<'_>,
    condition: &Regex,
    message: &str,
    out: &mut Report<'_>,
) {
    for line in doc.code_lines() {
        let code = doc.code(line);
        if let Some(found) = condition.find(code) {
            out.add_match(
                codes::ASSIGNMENT_IN_CONDITION,
                line,
                code,
                found,
                Severity::Warning,
                message,
            );
        }
    }
}

/// For every line, the line of the innermost `{` still open where it starts.
pub(crate) fn brace_scopes(doc: &Document<'_>) -> Vec<Option<usize>> {
    let mut scopes = vec![None; doc.line_count()];
    let mut open: Vec<usize> = Vec::new();
    let mut current = 0;
    for (pos, ch) in doc.scan().code_chars() {
        while current < pos.line {
            current += 1;
            if let Some(slot) = scopes.get_mut(current) {
                *slot = open.last().copied();
            }
        }
        match ch {
            '{' => open.push(pos.line),
            '}' => {
                open.pop();
            }
            _ => {}
        }
    }
    for slot in scopes.iter_mut().skip(current + 1) {
        *slot = open.last().copied();
    }
    scopes
}

/// Bracket nesting depth (all kinds) at the start of every line.
pub(crate) fn bracket_depths(doc: &Document<'_>) -> Vec<usize> {
    let mut depths = vec![0; doc.line_count()];
    let mut depth = 0usize;
    let mut current = 0;
    for (pos, ch) in doc.scan().code_chars() {
        while current < pos.line {
            current += 1;
            if let Some(slot) = depths.get_mut(current) {
                *slot = depth;
            }
        }
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    for slot in depths.iter_mut().skip(current + 1) {
        *slot = depth;
    }
    depths
}

/// First declaration line per key.
pub(crate) struct Declarations<K> {
    seen: HashMap<K, usize>,
}

impl<K: Hash + Eq> Declarations<K> {
    pub(crate) fn new() -> Self {
        Self {
            seen: HashMap::new(),
        }
    }

    /// Record a declaration on `line`; returns the line of an earlier one with the same key.
    pub(crate) fn first_line(&mut self, key: K, line: usize) -> Option<usize> {
        match self.seen.entry(key) {
            Entry::Occupied(first) => Some(*first.get()),
            Entry::Vacant(slot) => {
                slot.insert(line);
                None
            }
        }
    }
}
