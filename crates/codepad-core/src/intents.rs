//! Editing intents.
//!
//! Each intent takes the caller's caret, performs its edit (multi-step edits are one composite,
//! so one undo reverts them) and returns the new caret. Carets are clamped on entry.

use crate::editor::Editor;
use crate::position::{Position, Range};
use crate::scan::{CharClass, LexicalScan};
use crate::search::{self, SearchError, SearchOptions};
use crate::text::{grapheme_len_after, grapheme_len_before, leading_whitespace, visual_column};
use codepad_lang::is_word_char;

/// Closing partner of an opening bracket.
fn closing_bracket(ch: char) -> Option<char> {
    match ch {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        _ => None,
    }
}

/// Opening partner of a closing bracket.
fn opening_bracket(ch: char) -> Option<char> {
    match ch {
        ')' => Some('('),
        ']' => Some('['),
        '}' => Some('{'),
        _ => None,
    }
}

fn is_bracket(ch: char) -> bool {
    closing_bracket(ch).is_some() || opening_bracket(ch).is_some()
}

fn is_quote(ch: char) -> bool {
    ch == '"' || ch == '\''
}

/// Leading characters of `line` removed by one outdent step: up to `tab_width` spaces, or spaces
/// followed by a single tab.
fn outdent_width(line: &[char], tab_width: usize) -> usize {
    let mut count = 0;
    for &ch in line.iter().take(tab_width) {
        match ch {
            ' ' => count += 1,
            '\t' => return count + 1,
            _ => break,
        }
    }
    count
}

impl Editor {
    fn line_chars(&self, line: usize) -> Vec<char> {
        self.buffer.line(line).chars().collect()
    }

    /// Type one character.
    ///
    /// - A closing bracket typed in front of the same bracket steps over it.
    /// - A quote typed in front of the same quote steps over it when it closes a string: the
    ///   previous character is that quote, or the quotes before the caret (or on the whole line)
    ///   are unbalanced. In front of a closing triple quote it steps over all three.
    /// - `(`, `[`, `{` and quotes insert their pair with the caret in between; two quotes
    ///   followed by a third open a triple-quote pair.
    pub fn type_char(&mut self, caret: Position, ch: char) -> Position {
        let caret = self.buffer.clamp(caret);
        let line = self.line_chars(caret.line);
        let col = caret.column;
        let next = line.get(col).copied();
        let prev = col.checked_sub(1).and_then(|i| line.get(i)).copied();

        if opening_bracket(ch).is_some() && next == Some(ch) {
            return Position::new(caret.line, col + 1);
        }

        if is_quote(ch) && next == Some(ch) {
            let triple_close = col >= 2
                && line[col - 2] == ch
                && line[col - 1] == ch
                && line.get(col + 1) == Some(&ch)
                && line.get(col + 2) == Some(&ch);
            if triple_close {
                return Position::new(caret.line, col + 3);
            }

            let before = line[..col].iter().filter(|&&c| c == ch).count();
            let total = line.iter().filter(|&&c| c == ch).count();
            if prev == Some(ch) || before % 2 == 1 || total % 2 == 1 {
                return Position::new(caret.line, col + 1);
            }
        }

        let closing: Option<String> = if let Some(close) = closing_bracket(ch) {
            Some(close.to_string())
        } else if is_quote(ch) {
            let doubled = col >= 2 && line[col - 2] == ch && line[col - 1] == ch;
            Some(if doubled {
                ch.to_string().repeat(3)
            } else {
                ch.to_string()
            })
        } else {
            None
        };

        match closing {
            Some(closing) => {
                self.buffer.begin_composite(caret);
                let mut typed = String::with_capacity(1 + closing.len());
                typed.push(ch);
                typed.push_str(&closing);
                let end = self.buffer.insert(caret, &typed);
                let inside = Position::new(end.line, end.column - closing.chars().count());
                self.buffer.end_composite(inside);
                inside
            }
            None => {
                let mut typed = [0u8; 4];
                self.buffer.insert(caret, ch.encode_utf8(&mut typed))
            }
        }
    }

    /// Break the line at `caret`, carrying the indentation over; one more indent unit follows
    /// `{`, `(`, `[` or `:`.
    pub fn newline(&mut self, caret: Position) -> Position {
        let caret = self.buffer.clamp(caret);
        let text = self.buffer.line(caret.line);
        let mut indent = leading_whitespace(&text).to_string();

        let line: Vec<char> = text.chars().collect();
        if caret.column > 0 && !line.is_empty() {
            let last = line[(caret.column - 1).min(line.len() - 1)];
            if matches!(last, '{' | '(' | '[' | ':') {
                indent.push_str(&self.config.indent_unit());
            }
        }

        self.buffer.insert(caret, &format!("\n{indent}"))
    }

    /// Delete backwards: join with the previous line at column 0, remove one indent unit after a
    /// run of spaces that is a whole number of units, or remove one grapheme cluster.
    pub fn backspace(&mut self, caret: Position) -> Position {
        let caret = self.buffer.clamp(caret);
        if caret == Position::ZERO {
            return caret;
        }

        let start = if caret.column == 0 {
            Position::new(caret.line - 1, self.buffer.line_len(caret.line - 1))
        } else {
            let text = self.buffer.line(caret.line);
            let line: Vec<char> = text.chars().collect();
            let spaces = line[..caret.column]
                .iter()
                .rev()
                .take_while(|&&c| c == ' ')
                .count();
            let tab = self.config.tab_width;
            let width = if spaces > 0 && spaces % tab == 0 {
                tab
            } else {
                grapheme_len_before(&text, caret.column).max(1)
            };
            Position::new(caret.line, caret.column - width.min(caret.column))
        };

        self.buffer.delete(start, caret);
        start
    }

    /// Delete forwards: one grapheme cluster, or join the next line at the line end.
    pub fn delete_forward(&mut self, caret: Position) -> Position {
        let caret = self.buffer.clamp(caret);
        let len = self.buffer.line_len(caret.line);
        let end = if caret.column >= len {
            if caret.line + 1 >= self.buffer.line_count() {
                return caret;
            }
            Position::new(caret.line + 1, 0)
        } else {
            let text = self.buffer.line(caret.line);
            Position::new(
                caret.line,
                caret.column + grapheme_len_after(&text, caret.column).max(1),
            )
        };
        self.buffer.delete(caret, end);
        caret
    }

    /// Insert spaces up to the next tab stop.
    pub fn insert_tab(&mut self, caret: Position) -> Position {
        let caret = self.buffer.clamp(caret);
        let tab = self.config.tab_width;
        let spaces = " ".repeat(tab - caret.column % tab);
        self.buffer.insert(caret, &spaces)
    }

    /// Indent lines `first..=last` by one unit.
    pub fn indent_lines(&mut self, first: usize, last: usize, caret: Position) -> Position {
        let caret = self.buffer.clamp(caret);
        let (first, last) = self.line_span(first, last);
        let unit = self.config.indent_unit();

        self.buffer.begin_composite(caret);
        for line in first..=last {
            self.buffer.insert(Position::new(line, 0), &unit);
        }
        let moved = if (first..=last).contains(&caret.line) {
            Position::new(caret.line, caret.column + unit.len())
        } else {
            caret
        };
        self.buffer.end_composite(moved);
        moved
    }

    /// Remove one indent unit (or a leading tab) from lines `first..=last`.
    pub fn outdent_lines(&mut self, first: usize, last: usize, caret: Position) -> Position {
        let caret = self.buffer.clamp(caret);
        let (first, last) = self.line_span(first, last);
        let tab = self.config.tab_width;

        let mut moved = caret;
        self.buffer.begin_composite(caret);
        for line in first..=last {
            let width = outdent_width(&self.line_chars(line), tab);
            if width == 0 {
                continue;
            }
            self.buffer
                .delete(Position::new(line, 0), Position::new(line, width));
            if line == caret.line {
                moved = Position::new(line, caret.column.saturating_sub(width));
            }
        }
        self.buffer.end_composite(moved);
        moved
    }

    /// Comment or uncomment lines `first..=last` with the line comment token.
    ///
    /// Lines are uncommented when every non-blank line already starts with the token; otherwise
    /// the token (plus a space) is inserted after each non-empty line's indentation.
    pub fn toggle_line_comment(&mut self, first: usize, last: usize, caret: Position) -> Position {
        let caret = self.buffer.clamp(caret);
        let token = match self.config.ruleset.line_comment() {
            Some(token) => token.to_string(),
            None => match self.config.language.comment_config().line {
                Some(token) => token,
                None => return caret,
            },
        };
        if token.is_empty() {
            return caret;
        }
        let (first, last) = self.line_span(first, last);

        let all_commented = (first..=last).all(|line| {
            let text = self.buffer.line(line);
            let trimmed = text.trim_start();
            trimmed.is_empty() || trimmed.starts_with(token.as_str())
        });
        let token_len = token.chars().count();

        let mut moved = caret;
        self.buffer.begin_composite(caret);
        for line in first..=last {
            let text = self.buffer.line(line);
            let indent = leading_whitespace(&text).chars().count();
            if all_commented {
                if !text.trim_start().starts_with(token.as_str()) {
                    continue;
                }
                let mut width = token_len;
                if text.chars().nth(indent + token_len) == Some(' ') {
                    width += 1;
                }
                self.buffer
                    .delete(Position::new(line, indent), Position::new(line, indent + width));
                if line == caret.line && caret.column > indent {
                    moved = Position::new(line, caret.column.saturating_sub(width).max(indent));
                }
            } else {
                if text.is_empty() {
                    continue;
                }
                self.buffer
                    .insert(Position::new(line, indent), &format!("{token} "));
                if line == caret.line && caret.column >= indent {
                    moved = Position::new(line, caret.column + token_len + 1);
                }
            }
        }
        self.buffer.end_composite(moved);
        moved
    }

    /// Insert a copy of the caret line below it; the caret moves onto the copy.
    pub fn duplicate_line(&mut self, caret: Position) -> Position {
        let caret = self.buffer.clamp(caret);
        let text = self.buffer.line(caret.line);
        let end_of_line = Position::new(caret.line, self.buffer.line_len(caret.line));

        self.buffer.begin_composite(caret);
        self.buffer.insert(end_of_line, &format!("\n{text}"));
        let moved = Position::new(caret.line + 1, caret.column);
        self.buffer.end_composite(moved);
        moved
    }

    /// Remove the caret line.
    pub fn delete_line(&mut self, caret: Position) -> Position {
        let caret = self.buffer.clamp(caret);
        let count = self.buffer.line_count();

        self.buffer.begin_composite(caret);
        let moved = if count == 1 {
            self.buffer
                .delete(Position::ZERO, Position::new(0, self.buffer.line_len(0)));
            Position::ZERO
        } else if caret.line == count - 1 {
            let start = Position::new(caret.line - 1, self.buffer.line_len(caret.line - 1));
            let end = Position::new(caret.line, self.buffer.line_len(caret.line));
            self.buffer.delete(start, end);
            Position::new(caret.line - 1, 0)
        } else {
            self.buffer
                .delete(Position::new(caret.line, 0), Position::new(caret.line + 1, 0));
            self.buffer.clamp(caret)
        };
        self.buffer.end_composite(moved);
        moved
    }

    /// Upper- or lower-case the text in `range`.
    pub fn transform_case(&mut self, range: Range, upper: bool, caret: Position) -> Position {
        let caret = self.buffer.clamp(caret);
        if range.is_empty() {
            return caret;
        }
        let text = self.buffer.text_in(range);
        let transformed = if upper {
            text.to_uppercase()
        } else {
            text.to_lowercase()
        };
        if transformed == text {
            return caret;
        }

        self.buffer.begin_composite(caret);
        self.buffer.delete(range.start, range.end);
        self.buffer.insert(range.start, &transformed);
        let moved = self.buffer.clamp(caret);
        self.buffer.end_composite(moved);
        moved
    }

    /// Every match of `query`.
    pub fn find_all(&self, query: &str, options: SearchOptions) -> Result<Vec<Range>, SearchError> {
        search::find_all(&self.buffer, query, options)
    }

    /// The next match at or after `from`, wrapping around.
    pub fn find_next(
        &self,
        query: &str,
        options: SearchOptions,
        from: Position,
    ) -> Result<Option<Range>, SearchError> {
        search::find_next(&self.buffer, query, options, from)
    }

    /// The previous match before `from`, wrapping around.
    pub fn find_prev(
        &self,
        query: &str,
        options: SearchOptions,
        from: Position,
    ) -> Result<Option<Range>, SearchError> {
        search::find_prev(&self.buffer, query, options, from)
    }

    /// Replace every match of `query` as one undo step.
    ///
    /// Returns the number of replacements and the (clamped) caret.
    pub fn replace_all(
        &mut self,
        query: &str,
        replacement: &str,
        options: SearchOptions,
        caret: Position,
    ) -> Result<(usize, Position), SearchError> {
        let caret = self.buffer.clamp(caret);
        let plan = search::plan_replacements(&self.buffer, query, replacement, options)?;
        if plan.is_empty() {
            return Ok((0, caret));
        }

        self.buffer.begin_composite(caret);
        for item in plan.iter().rev() {
            self.buffer.delete(item.range.start, item.range.end);
            self.buffer.insert(item.range.start, &item.text);
        }
        let moved = self.buffer.clamp(caret);
        self.buffer.end_composite(moved);
        Ok((plan.len(), moved))
    }

    /// The bracket at (or just before) `caret` and its partner.
    ///
    /// Brackets inside comments and string literals are ignored. Returns `None` when there is no
    /// bracket at the caret; the partner is `None` when the bracket is unmatched.
    pub fn matching_bracket(&self, caret: Position) -> Option<(Position, Option<Position>)> {
        let caret = self.buffer.clamp(caret);
        let scan = LexicalScan::new(&self.buffer.text(), &self.scan_syntax);
        let line = self.line_chars(caret.line);

        let is_code_bracket = |column: usize| {
            line.get(column).is_some_and(|&c| is_bracket(c))
                && scan.class_at(Position::new(caret.line, column)) == Some(CharClass::Code)
        };
        let column = if is_code_bracket(caret.column) {
            caret.column
        } else if caret.column > 0 && is_code_bracket(caret.column - 1) {
            caret.column - 1
        } else {
            return None;
        };
        let anchor = Position::new(caret.line, column);
        let bracket = line[column];

        let brackets: Vec<(Position, char)> = scan.code_chars().filter(|(_, c)| is_bracket(*c)).collect();
        let idx = brackets.iter().position(|(pos, _)| *pos == anchor)?;

        let partner = if let Some(close) = closing_bracket(bracket) {
            let mut depth = 0usize;
            brackets[idx..].iter().find_map(|&(pos, c)| {
                if c == bracket {
                    depth += 1;
                } else if c == close {
                    depth -= 1;
                    if depth == 0 {
                        return Some(pos);
                    }
                }
                None
            })
        } else {
            let open = opening_bracket(bracket)?;
            let mut depth = 0usize;
            brackets[..=idx].iter().rev().find_map(|&(pos, c)| {
                if c == bracket {
                    depth += 1;
                } else if c == open {
                    depth -= 1;
                    if depth == 0 {
                        return Some(pos);
                    }
                }
                None
            })
        };

        Some((anchor, partner))
    }

    /// The word (letters, digits, `_`) touching `pos`.
    pub fn word_at(&self, pos: Position) -> Option<Range> {
        let pos = self.buffer.clamp(pos);
        let line = self.line_chars(pos.line);
        let mut start = pos.column;
        while start > 0 && is_word_char(line[start - 1]) {
            start -= 1;
        }
        let mut end = pos.column;
        while end < line.len() && is_word_char(line[end]) {
            end += 1;
        }
        (start < end).then(|| Range::new(Position::new(pos.line, start), Position::new(pos.line, end)))
    }

    /// Display cell of `pos`, expanding tabs and counting wide characters as two cells.
    pub fn visual_column(&self, pos: Position) -> usize {
        let pos = self.buffer.clamp(pos);
        visual_column(&self.buffer.line(pos.line), pos.column, self.config.tab_width)
    }

    /// Clamp and order a line span.
    fn line_span(&self, first: usize, last: usize) -> (usize, usize) {
        let max = self.buffer.line_count().saturating_sub(1);
        let (a, b) = (first.min(max), last.min(max));
        (a.min(b), a.max(b))
    }
}
