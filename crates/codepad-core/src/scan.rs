//! Comment- and string-aware lexical scanning.
//!
//! One linear pass classifies every character of the document as code, comment, string
//! delimiter or string body. Diagnostics, brace folding and bracket matching all work on this
//! classification, so nothing inside a comment or a literal is ever mistaken for code.

use crate::position::Position;
use crate::text::split_lines;
use codepad_lang::Language;

/// Lexical category of a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    /// Ordinary code.
    Code,
    /// Inside a line or block comment (including the comment tokens).
    Comment,
    /// A string delimiter (`"`, `'''`, `` ` ``, the `@` of `@"`).
    Quote,
    /// Inside a string literal.
    StringBody,
}

impl CharClass {
    /// Returns `true` for delimiters and string bodies.
    pub fn is_string(self) -> bool {
        matches!(self, CharClass::Quote | CharClass::StringBody)
    }
}

/// String literal flavours recognized by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringKind {
    /// Single-line literal delimited by one quote character.
    Plain,
    /// Triple-quoted literal (`"""` / `'''`), may span lines.
    Triple,
    /// Backtick template literal, may span lines.
    Template,
    /// `@"..."` verbatim literal (`""` escapes a quote), may span lines.
    Verbatim,
}

impl StringKind {
    /// Returns `true` if the literal may continue on the next line.
    pub fn is_multiline(self) -> bool {
        !matches!(self, StringKind::Plain)
    }
}

/// Lexical syntax the scanner understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSyntax {
    /// Line comment token.
    pub line_comment: Option<String>,
    /// Block comment start/end tokens.
    pub block_comment: Option<(String, String)>,
    /// Characters that open and close single-line string literals.
    pub quotes: Vec<char>,
    /// Tripled quote characters open a multi-line literal.
    pub triple_quotes: bool,
    /// Backticks open a multi-line template literal.
    pub template_backtick: bool,
    /// `@"` opens a verbatim literal.
    pub verbatim_at: bool,
    /// Backslash escapes the next character inside literals.
    pub escapes: bool,
}

impl ScanSyntax {
    /// C-family syntax: `//`, `/* */`, `"` and `'`, plus backtick templates.
    pub fn c_like() -> Self {
        Self {
            line_comment: Some("//".to_string()),
            block_comment: Some(("/*".to_string(), "*/".to_string())),
            quotes: vec!['"', '\''],
            triple_quotes: false,
            template_backtick: true,
            verbatim_at: false,
            escapes: true,
        }
    }

    /// Syntax for one of the built-in languages.
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::CSharp => Self {
                template_backtick: false,
                verbatim_at: true,
                ..Self::c_like()
            },
            Language::JavaScript => Self::c_like(),
            Language::Python => Self {
                line_comment: Some("#".to_string()),
                block_comment: None,
                quotes: vec!['"', '\''],
                triple_quotes: true,
                template_backtick: false,
                verbatim_at: false,
                escapes: true,
            },
            Language::PlainText => Self {
                line_comment: None,
                block_comment: None,
                quotes: Vec::new(),
                triple_quotes: false,
                template_backtick: false,
                verbatim_at: false,
                escapes: false,
            },
        }
    }
}

impl Default for ScanSyntax {
    fn default() -> Self {
        Self::c_like()
    }
}

/// A string literal found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    /// Position of the opening delimiter.
    pub start: Position,
    /// Position right after the closing delimiter (or the end of the line/document when unterminated).
    pub end: Position,
    /// Literal flavour.
    pub kind: StringKind,
    /// The opening quote character.
    pub quote: char,
    /// Literal contents without delimiters (escape sequences kept verbatim).
    pub value: String,
    /// `false` if the literal was still open at the end of its line (plain) or of the document.
    pub terminated: bool,
}

/// One scanned line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedLine {
    text: String,
    classes: Vec<CharClass>,
    code: String,
}

impl ScannedLine {
    /// Original line text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Per-character classes (one entry per `char`).
    pub fn classes(&self) -> &[CharClass] {
        &self.classes
    }

    /// The line with comments and string bodies replaced by spaces.
    ///
    /// The masked line has exactly the same characters count as the original, so columns line up.
    /// String delimiters are kept so that literals remain recognizable as such.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The line with only comments blanked out (string contents kept).
    pub fn without_comments(&self) -> String {
        self.text
            .chars()
            .zip(&self.classes)
            .map(|(ch, class)| if *class == CharClass::Comment { ' ' } else { ch })
            .collect()
    }

    /// Class of the character at `column`, if any.
    pub fn class_at(&self, column: usize) -> Option<CharClass> {
        self.classes.get(column).copied()
    }

    /// Returns `true` if the line holds no code (blank, comment-only, or inside a literal).
    pub fn is_code_blank(&self) -> bool {
        self.code.trim().is_empty()
    }

    /// Returns `true` if the line has text but none of it is code or a string.
    pub fn is_comment_only(&self) -> bool {
        !self.text.trim().is_empty()
            && self
                .text
                .chars()
                .zip(&self.classes)
                .all(|(ch, class)| ch.is_whitespace() || *class == CharClass::Comment)
    }

    /// Returns `true` if the line starts inside a multi-line string literal.
    pub fn starts_in_string(&self) -> bool {
        self.classes.first() == Some(&CharClass::StringBody)
    }
}

/// Result of scanning a whole document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LexicalScan {
    lines: Vec<ScannedLine>,
    literals: Vec<StringLiteral>,
}

impl LexicalScan {
    /// Scan `text` with the given syntax.
    pub fn new(text: &str, syntax: &ScanSyntax) -> Self {
        Scanner::new(syntax).run(text)
    }

    /// Scanned lines, in document order.
    pub fn lines(&self) -> &[ScannedLine] {
        &self.lines
    }

    /// Scanned line `i`.
    pub fn line(&self, i: usize) -> Option<&ScannedLine> {
        self.lines.get(i)
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// All string literals, in document order.
    pub fn literals(&self) -> &[StringLiteral] {
        &self.literals
    }

    /// Literals that were still open when their line (or the document) ended.
    pub fn unterminated(&self) -> impl Iterator<Item = &StringLiteral> {
        self.literals.iter().filter(|lit| !lit.terminated)
    }

    /// Literals that start on `line`.
    pub fn literals_on_line(&self, line: usize) -> &[StringLiteral] {
        let from = self.literals.partition_point(|lit| lit.start.line < line);
        let to = self.literals.partition_point(|lit| lit.start.line <= line);
        &self.literals[from..to]
    }

    /// Iterate over every code character with its position.
    pub fn code_chars(&self) -> impl Iterator<Item = (Position, char)> + '_ {
        self.lines.iter().enumerate().flat_map(|(line, scanned)| {
            scanned
                .text
                .chars()
                .zip(scanned.classes.iter())
                .enumerate()
                .filter(|(_, (_, class))| **class == CharClass::Code)
                .map(move |(column, (ch, _))| (Position::new(line, column), ch))
        })
    }

    /// Class of the character at `pos`.
    pub fn class_at(&self, pos: Position) -> Option<CharClass> {
        self.lines.get(pos.line)?.class_at(pos.column)
    }
}

struct OpenString {
    kind: StringKind,
    quote: char,
    start: Position,
    value: String,
}

enum Mode {
    Code,
    BlockComment,
    Str(OpenString),
}

struct Scanner<'a> {
    syntax: &'a ScanSyntax,
    line_comment: Vec<char>,
    block_start: Vec<char>,
    block_end: Vec<char>,
}

fn close_literal(mode: &mut Mode, scan: &mut LexicalScan, end: Position, terminated: bool) {
    if let Mode::Str(open) = std::mem::replace(mode, Mode::Code) {
        scan.literals.push(StringLiteral {
            start: open.start,
            end,
            kind: open.kind,
            quote: open.quote,
            value: open.value,
            terminated,
        });
    }
}

fn token_at(chars: &[char], i: usize, token: &[char]) -> bool {
    !token.is_empty() && chars.len() >= i + token.len() && chars[i..i + token.len()] == *token
}

impl<'a> Scanner<'a> {
    fn new(syntax: &'a ScanSyntax) -> Self {
        let (block_start, block_end) = match &syntax.block_comment {
            Some((start, end)) => (start.chars().collect(), end.chars().collect()),
            None => (Vec::new(), Vec::new()),
        };
        Self {
            syntax,
            line_comment: syntax
                .line_comment
                .as_deref()
                .map(|t| t.chars().collect())
                .unwrap_or_default(),
            block_start,
            block_end,
        }
    }

    fn run(&self, text: &str) -> LexicalScan {
        let mut scan = LexicalScan::default();
        let mut mode = Mode::Code;

        for (line_no, line) in split_lines(text).into_iter().enumerate() {
            let chars: Vec<char> = line.chars().collect();
            let mut classes = vec![CharClass::Code; chars.len()];
            let mut i = 0;

            while i < chars.len() {
                let c = chars[i];
                let mut closed = false;
                match &mut mode {
                    Mode::BlockComment => {
                        if token_at(&chars, i, &self.block_end) {
                            classes[i..i + self.block_end.len()].fill(CharClass::Comment);
                            i += self.block_end.len();
                            mode = Mode::Code;
                        } else {
                            classes[i] = CharClass::Comment;
                            i += 1;
                        }
                    }
                    Mode::Str(open) => {
                        let quote = open.quote;
                        let closing_len = match open.kind {
                            StringKind::Triple => 3,
                            _ => 1,
                        };
                        let escaping = self.syntax.escapes && open.kind != StringKind::Verbatim;
                        if escaping && c == '\\' {
                            let take = (chars.len() - i).min(2);
                            classes[i..i + take].fill(CharClass::StringBody);
                            open.value.extend(&chars[i..i + take]);
                            i += take;
                        } else if open.kind == StringKind::Verbatim
                            && c == '"'
                            && chars.get(i + 1) == Some(&'"')
                        {
                            classes[i..i + 2].fill(CharClass::StringBody);
                            open.value.push('"');
                            i += 2;
                        } else if c == quote && token_at(&chars, i, &[quote; 3][..closing_len]) {
                            classes[i..i + closing_len].fill(CharClass::Quote);
                            i += closing_len;
                            closed = true;
                        } else {
                            classes[i] = CharClass::StringBody;
                            open.value.push(c);
                            i += 1;
                        }
                    }
                    Mode::Code => {
                        if token_at(&chars, i, &self.line_comment) {
                            classes[i..].fill(CharClass::Comment);
                            i = chars.len();
                        } else if token_at(&chars, i, &self.block_start) {
                            classes[i..i + self.block_start.len()].fill(CharClass::Comment);
                            i += self.block_start.len();
                            mode = Mode::BlockComment;
                        } else if let Some((kind, quote, len)) = self.string_opener(&chars, i) {
                            classes[i..i + len].fill(CharClass::Quote);
                            mode = Mode::Str(OpenString {
                                kind,
                                quote,
                                start: Position::new(line_no, i),
                                value: String::new(),
                            });
                            i += len;
                        } else {
                            i += 1;
                        }
                    }
                }
                if closed {
                    close_literal(&mut mode, &mut scan, Position::new(line_no, i), true);
                }
            }

            // Plain literals never continue past their line.
            let plain_open = matches!(&mode, Mode::Str(open) if !open.kind.is_multiline());
            if plain_open {
                close_literal(&mut mode, &mut scan, Position::new(line_no, chars.len()), false);
            } else if let Mode::Str(open) = &mut mode {
                open.value.push('\n');
            }

            let code = line
                .chars()
                .zip(&classes)
                .map(|(ch, class)| match class {
                    CharClass::Code | CharClass::Quote => ch,
                    CharClass::Comment | CharClass::StringBody => ' ',
                })
                .collect();
            scan.lines.push(ScannedLine {
                text: line.to_string(),
                classes,
                code,
            });
        }

        if let Mode::Str(open) = &mut mode {
            open.value.pop();
            let last = scan.lines.len().saturating_sub(1);
            let end_col = scan.lines.last().map(|l| l.classes.len()).unwrap_or(0);
            close_literal(&mut mode, &mut scan, Position::new(last, end_col), false);
        }

        scan.literals.sort_by_key(|lit| lit.start);
        scan
    }

    /// Returns `(kind, quote, delimiter_len)` if a literal opens at `i`.
    fn string_opener(&self, chars: &[char], i: usize) -> Option<(StringKind, char, usize)> {
        let c = chars[i];
        if self.syntax.verbatim_at && c == '@' && chars.get(i + 1) == Some(&'"') {
            return Some((StringKind::Verbatim, '"', 2));
        }
        if self.syntax.template_backtick && c == '`' {
            return Some((StringKind::Template, '`', 1));
        }
        if !self.syntax.quotes.contains(&c) {
            return None;
        }
        if self.syntax.triple_quotes && token_at(chars, i, &[c, c, c]) {
            return Some((StringKind::Triple, c, 3));
        }
        Some((StringKind::Plain, c, 1))
    }
}
