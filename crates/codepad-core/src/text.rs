//! Small text helpers shared by the buffer, the analyzers and the editing intents.

use std::borrow::Cow;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

/// Normalize CRLF and lone CR line endings to LF.
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Split LF-normalized text into lines (N newlines => N+1 lines).
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// The leading run of spaces and tabs.
pub fn leading_whitespace(line: &str) -> &str {
    let end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..end]
}

/// Number of leading whitespace characters (spaces and tabs each count as one).
pub fn indent_len(line: &str) -> usize {
    leading_whitespace(line).len()
}

/// Returns `true` if the line has no non-whitespace characters.
pub fn is_blank(line: &str) -> bool {
    line.chars().all(char::is_whitespace)
}

/// Visual width of a character (UAX #11); control characters count as one cell.
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1)
}

/// Calculate the visual cell offset from the start of the line to the given character column.
///
/// `'\t'` advances to the next multiple of `tab_width`.
pub fn visual_column(line: &str, column: usize, tab_width: usize) -> usize {
    let tab_width = tab_width.max(1);
    let mut x = 0usize;
    for ch in line.chars().take(column) {
        x += if ch == '\t' {
            tab_width - x % tab_width
        } else {
            char_width(ch)
        };
    }
    x
}

/// Byte offset of a character column (clamped to the line end).
pub fn byte_of_column(line: &str, column: usize) -> usize {
    line.char_indices()
        .nth(column)
        .map(|(byte, _)| byte)
        .unwrap_or(line.len())
}

/// Character column of a byte offset on a char boundary.
pub fn column_of_byte(line: &str, byte: usize) -> usize {
    line[..byte.min(line.len())].chars().count()
}

/// Character length of the grapheme cluster ending at `column`.
pub fn grapheme_len_before(line: &str, column: usize) -> usize {
    let byte = byte_of_column(line, column);
    line[..byte]
        .graphemes(true)
        .next_back()
        .map(|g| g.chars().count())
        .unwrap_or(0)
}

/// Character length of the grapheme cluster starting at `column`.
pub fn grapheme_len_after(line: &str, column: usize) -> usize {
    let byte = byte_of_column(line, column);
    line[byte..]
        .graphemes(true)
        .next()
        .map(|g| g.chars().count())
        .unwrap_or(0)
}
