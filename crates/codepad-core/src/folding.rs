//! Code folding: fold region discovery and the visible-line projection.
//!
//! A [`FoldingProvider`] turns document text into [`FoldRegion`]s. Two strategies ship with the
//! core: [`BraceFolding`] (driven by the lexical scanner, so braces in comments and strings are
//! ignored) and [`IndentFolding`] (indentation blocks, Python style).
//!
//! [`FoldingManager`] owns the regions and their collapse state, and maintains the projection of
//! logical lines onto visible lines. A collapsed region hides the lines strictly between its
//! start and end lines: the start line stands for the whole region and the closing line stays
//! visible.

use crate::scan::{LexicalScan, ScanSyntax};
use crate::text::{indent_len, is_blank, split_lines};
use codepad_lang::Language;
use std::collections::HashSet;
use std::sync::Arc;

/// Fold region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldRegion {
    /// Start line number
    pub start_line: usize,
    /// End line number (inclusive)
    pub end_line: usize,
    /// Whether folded
    pub is_collapsed: bool,
    /// Placeholder text shown when folded (e.g., "[...]")
    pub placeholder: String,
}

impl FoldRegion {
    /// Create an expanded folding region for an inclusive line range.
    pub fn new(start_line: usize, end_line: usize) -> Self {
        Self {
            start_line,
            end_line,
            is_collapsed: false,
            placeholder: String::from("[...]"),
        }
    }

    /// Create a folding region with a custom placeholder string.
    pub fn with_placeholder(start_line: usize, end_line: usize, placeholder: String) -> Self {
        Self {
            placeholder,
            ..Self::new(start_line, end_line)
        }
    }

    /// Check if line number is within fold region
    pub fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line <= self.end_line
    }

    /// Returns `true` if collapsing this region hides `line`.
    pub fn hides_line(&self, line: usize) -> bool {
        line > self.start_line && line < self.end_line
    }
}

/// Computes fold regions from document text.
pub trait FoldingProvider: Send + Sync {
    /// Regions for `text`, in any order.
    fn fold_regions(&self, text: &str) -> Vec<FoldRegion>;
}

/// Brace-delimited folding (`{` ... `}`), ignoring comments and literals.
#[derive(Debug, Clone, Default)]
pub struct BraceFolding {
    syntax: ScanSyntax,
}

impl BraceFolding {
    /// Brace folding with `syntax`'s comments and literals.
    pub fn new(syntax: ScanSyntax) -> Self {
        Self { syntax }
    }
}

impl FoldingProvider for BraceFolding {
    fn fold_regions(&self, text: &str) -> Vec<FoldRegion> {
        let scan = LexicalScan::new(text, &self.syntax);
        let mut stack = Vec::new();
        let mut regions = Vec::new();

        for (pos, ch) in scan.code_chars() {
            match ch {
                '{' => stack.push(pos.line),
                '}' => {
                    if let Some(start) = stack.pop()
                        && pos.line > start
                    {
                        regions.push(FoldRegion::new(start, pos.line));
                    }
                }
                _ => {}
            }
        }

        regions.sort_by_key(|r| (r.start_line, r.end_line));
        regions
    }
}

/// Indentation-delimited folding.
///
/// A line opens a block when it ends with `:` or starts with one of the block keywords. The block
/// extends over the following non-blank lines indented deeper than the opener.
#[derive(Debug, Clone)]
pub struct IndentFolding {
    block_keywords: Vec<String>,
}

impl IndentFolding {
    /// Indentation folding with these block keywords.
    pub fn new<I, S>(block_keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            block_keywords: block_keywords.into_iter().map(Into::into).collect(),
        }
    }

    fn is_block_start(&self, trimmed: &str) -> bool {
        trimmed.ends_with(':') || self.block_keywords.iter().any(|kw| trimmed.starts_with(kw.as_str()))
    }
}

impl Default for IndentFolding {
    fn default() -> Self {
        Self::new(codepad_lang::PYTHON_BLOCK_KEYWORDS.iter().copied())
    }
}

impl FoldingProvider for IndentFolding {
    fn fold_regions(&self, text: &str) -> Vec<FoldRegion> {
        let mut regions = Vec::new();
        // Open blocks as (start line, opener indent), innermost last.
        let mut open: Vec<(usize, usize)> = Vec::new();
        let mut last_content = 0;

        let mut close = |start: usize, end: usize| {
            if end > start {
                regions.push(FoldRegion::new(start, end));
            }
        };

        for (i, line) in split_lines(text).iter().enumerate() {
            if is_blank(line) {
                continue;
            }
            let indent = indent_len(line);
            while let Some(&(start, base)) = open.last() {
                if indent > base {
                    break;
                }
                open.pop();
                close(start, last_content);
            }
            if self.is_block_start(line.trim()) {
                open.push((i, indent));
            }
            last_content = i;
        }
        while let Some((start, _)) = open.pop() {
            close(start, last_content);
        }

        regions.sort_by_key(|r| (r.start_line, r.end_line));
        regions
    }
}

/// Built-in folding strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoldingStrategy {
    /// [`BraceFolding`].
    Brace,
    /// [`IndentFolding`].
    Indentation,
}

impl FoldingStrategy {
    /// The natural strategy for `language`, if any.
    pub fn for_language(language: Language) -> Option<Self> {
        match language {
            Language::CSharp | Language::JavaScript => Some(FoldingStrategy::Brace),
            Language::Python => Some(FoldingStrategy::Indentation),
            Language::PlainText => None,
        }
    }

    /// Build the provider, using `language`'s lexical syntax and block keywords.
    pub fn provider(self, language: Language) -> Arc<dyn FoldingProvider> {
        match self {
            FoldingStrategy::Brace => Arc::new(BraceFolding::new(ScanSyntax::for_language(language))),
            FoldingStrategy::Indentation => {
                let keywords = language.block_keywords();
                if keywords.is_empty() {
                    Arc::new(IndentFolding::default())
                } else {
                    Arc::new(IndentFolding::new(keywords.iter().copied()))
                }
            }
        }
    }
}

/// Folding manager
#[derive(Debug, Clone, Default)]
pub struct FoldingManager {
    regions: Vec<FoldRegion>,
    line_count: usize,
    /// Logical indices of visible lines, ascending.
    visible: Vec<usize>,
}

impl FoldingManager {
    /// Create an empty folding manager.
    pub fn new() -> Self {
        Self::default()
    }

    fn normalize_regions(regions: &mut Vec<FoldRegion>) {
        regions.sort_by_key(|r| (r.start_line, r.end_line));
        regions.dedup_by(|a, b| a.start_line == b.start_line && a.end_line == b.end_line);
        regions.retain(|r| r.end_line > r.start_line);
    }

    /// `(start_line, rank)` of every collapsed region, where rank orders regions sharing a start
    /// line from innermost to outermost.
    fn collapsed_keys(regions: &[FoldRegion]) -> HashSet<(usize, usize)> {
        let mut keys = HashSet::new();
        let mut rank = 0;
        for (i, region) in regions.iter().enumerate() {
            if i > 0 && regions[i - 1].start_line == region.start_line {
                rank += 1;
            } else {
                rank = 0;
            }
            if region.is_collapsed {
                keys.insert((region.start_line, rank));
            }
        }
        keys
    }

    /// Replace the regions with freshly computed ones for a document of `line_count` lines.
    ///
    /// Collapse state carries over to new regions starting on the same line.
    pub fn replace_regions(&mut self, mut regions: Vec<FoldRegion>, line_count: usize) {
        let max_line = line_count.saturating_sub(1);
        for r in regions.iter_mut() {
            r.start_line = r.start_line.min(max_line);
            r.end_line = r.end_line.min(max_line);
        }
        Self::normalize_regions(&mut regions);

        let collapsed = Self::collapsed_keys(&self.regions);
        let mut rank = 0;
        for i in 0..regions.len() {
            if i > 0 && regions[i - 1].start_line == regions[i].start_line {
                rank += 1;
            } else {
                rank = 0;
            }
            if collapsed.contains(&(regions[i].start_line, rank)) {
                regions[i].is_collapsed = true;
            }
        }

        self.regions = regions;
        self.line_count = line_count;
        self.rebuild_visible();
        log::debug!(
            "fold regions rebuilt: regions={} visible={}/{}",
            self.regions.len(),
            self.visible.len(),
            self.line_count
        );
    }

    fn rebuild_visible(&mut self) {
        self.visible.clear();
        self.visible.reserve(self.line_count);

        // Regions are sorted by start line, so one sweep over the hidden intervals suffices.
        let mut hidden = self
            .regions
            .iter()
            .filter(|r| r.is_collapsed && r.end_line > r.start_line + 1)
            .map(|r| (r.start_line + 1, r.end_line))
            .peekable();
        let mut hidden_until = 0;
        for line in 0..self.line_count {
            while let Some(&(from, to)) = hidden.peek() {
                if from > line {
                    break;
                }
                hidden_until = hidden_until.max(to);
                hidden.next();
            }
            if line >= hidden_until {
                self.visible.push(line);
            }
        }
    }

    /// Index of the innermost region starting at `start_line`.
    fn innermost_at(&self, start_line: usize) -> Option<usize> {
        let idx = self.regions.partition_point(|r| r.start_line < start_line);
        self.regions
            .get(idx)
            .filter(|r| r.start_line == start_line)
            .map(|_| idx)
    }

    /// Toggle the innermost region starting at `start_line`.
    pub fn toggle(&mut self, start_line: usize) -> bool {
        let Some(idx) = self.innermost_at(start_line) else {
            return false;
        };
        let region = &mut self.regions[idx];
        region.is_collapsed = !region.is_collapsed;
        self.rebuild_visible();
        true
    }

    /// Collapse the innermost region starting at `start_line`.
    pub fn collapse(&mut self, start_line: usize) -> bool {
        self.set_collapsed(start_line, true)
    }

    /// Expand the innermost region starting at `start_line`.
    pub fn expand(&mut self, start_line: usize) -> bool {
        self.set_collapsed(start_line, false)
    }

    fn set_collapsed(&mut self, start_line: usize, collapsed: bool) -> bool {
        let Some(idx) = self.innermost_at(start_line) else {
            return false;
        };
        if self.regions[idx].is_collapsed != collapsed {
            self.regions[idx].is_collapsed = collapsed;
            self.rebuild_visible();
        }
        true
    }

    /// Expand all folds
    pub fn expand_all(&mut self) {
        for region in &mut self.regions {
            region.is_collapsed = false;
        }
        self.rebuild_visible();
    }

    /// Collapse all regions
    pub fn collapse_all(&mut self) {
        for region in &mut self.regions {
            region.is_collapsed = true;
        }
        self.rebuild_visible();
    }

    /// Get all fold regions, sorted by start line.
    pub fn regions(&self) -> &[FoldRegion] {
        &self.regions
    }

    /// The innermost region containing `line`.
    pub fn region_for_line(&self, line: usize) -> Option<&FoldRegion> {
        self.regions
            .iter()
            .filter(|r| r.contains_line(line))
            .min_by_key(|r| r.end_line - r.start_line)
    }

    /// Logical indices of visible lines, ascending.
    pub fn visible_lines(&self) -> &[usize] {
        &self.visible
    }

    /// Number of visible lines.
    pub fn visible_line_count(&self) -> usize {
        self.visible.len()
    }

    /// Returns `false` for lines hidden by a collapsed region or past the end of the document.
    pub fn is_line_visible(&self, line: usize) -> bool {
        self.visible.binary_search(&line).is_ok()
    }

    /// Visible index of a logical line; hidden lines map to the line standing for their fold.
    pub fn logical_to_visible(&self, line: usize) -> usize {
        self.visible
            .partition_point(|&visible| visible <= line)
            .saturating_sub(1)
    }

    /// Logical line at a visible index (clamped to the last visible line).
    pub fn visible_to_logical(&self, visible: usize) -> usize {
        match self.visible.get(visible) {
            Some(&line) => line,
            None => self.visible.last().copied().unwrap_or(0),
        }
    }

    /// Drop every region (all lines become visible).
    pub fn clear(&mut self) {
        self.regions.clear();
        self.rebuild_visible();
    }
}

/// Convenience for tests and hosts that fold without a buffer.
pub fn fold_text(provider: &dyn FoldingProvider, text: &str) -> FoldingManager {
    let mut manager = FoldingManager::new();
    manager.replace_regions(provider.fold_regions(text), split_lines(text).len());
    manager
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_lines() -> FoldingManager {
        let mut manager = FoldingManager::new();
        manager.replace_regions(vec![FoldRegion::new(1, 4)], 5);
        manager
    }

    #[test]
    fn test_collapsed_region_hides_interior() {
        let mut manager = five_lines();
        assert!(manager.collapse(1));
        assert_eq!(manager.visible_lines(), &[0, 1, 4]);
        assert!(!manager.is_line_visible(2));
        assert!(manager.is_line_visible(4));
        assert_eq!(manager.logical_to_visible(3), 1);
        assert_eq!(manager.logical_to_visible(4), 2);
        assert_eq!(manager.visible_to_logical(2), 4);
        assert_eq!(manager.visible_to_logical(99), 4);
    }

    #[test]
    fn test_toggle_picks_innermost() {
        let mut manager = FoldingManager::new();
        manager.replace_regions(vec![FoldRegion::new(0, 9), FoldRegion::new(0, 3)], 10);
        assert!(manager.toggle(0));
        let collapsed: Vec<_> = manager
            .regions()
            .iter()
            .filter(|r| r.is_collapsed)
            .map(|r| (r.start_line, r.end_line))
            .collect();
        assert_eq!(collapsed, vec![(0, 3)]);
        assert!(!manager.toggle(5));
    }

    #[test]
    fn test_collapse_state_survives_rebuild() {
        let mut manager = five_lines();
        manager.collapse(1);
        manager.replace_regions(vec![FoldRegion::new(1, 5), FoldRegion::new(6, 8)], 9);
        assert!(manager.regions()[0].is_collapsed);
        assert!(!manager.regions()[1].is_collapsed);
    }

    #[test]
    fn test_nested_collapsed_regions() {
        let mut manager = FoldingManager::new();
        manager.replace_regions(vec![FoldRegion::new(0, 8), FoldRegion::new(2, 5)], 10);
        manager.collapse_all();
        assert_eq!(manager.visible_lines(), &[0, 8, 9]);
        manager.expand(0);
        assert_eq!(manager.visible_lines(), &[0, 1, 2, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_invalid_regions_dropped() {
        let mut manager = FoldingManager::new();
        manager.replace_regions(vec![FoldRegion::new(3, 3), FoldRegion::new(2, 1)], 5);
        assert!(manager.regions().is_empty());
        assert_eq!(manager.visible_line_count(), 5);
    }

    #[test]
    fn test_brace_folding_ignores_comments_and_strings() {
        let text = "fn {\n  // {\n  let s = \"{\";\n}\n{ }";
        let regions = BraceFolding::default().fold_regions(text);
        assert_eq!(regions, vec![FoldRegion::new(0, 3)]);
    }

    #[test]
    fn test_indent_folding() {
        let text = "def f():\n    a = 1\n\n    return a\nx = 2\nif x:\n    pass";
        let regions = IndentFolding::default().fold_regions(text);
        assert_eq!(regions, vec![FoldRegion::new(0, 3), FoldRegion::new(5, 6)]);
    }

    #[test]
    fn test_indent_folding_closes_several_blocks_at_once() {
        let text = "class A:\n    def f(self):\n        if x:\n            y()\n\n    def g(self):\n        pass\n\nz = 1\n";
        let regions = IndentFolding::default().fold_regions(text);
        assert_eq!(
            regions,
            vec![
                FoldRegion::new(0, 6),
                FoldRegion::new(1, 3),
                FoldRegion::new(2, 3),
                FoldRegion::new(5, 6),
            ]
        );
    }

    #[test]
    fn test_indent_folding_deep_nesting() {
        let depth = 2_000;
        let text: String = (0..depth)
            .map(|level| format!("{}if x:\n", " ".repeat(level * 4)))
            .chain(std::iter::once(format!("{}pass\n", " ".repeat(depth * 4))))
            .collect();
        let regions = IndentFolding::default().fold_regions(&text);
        assert_eq!(regions.len(), depth);
        assert!(regions.iter().all(|r| r.end_line == depth));
        assert_eq!(regions[0], FoldRegion::new(0, depth));
    }
}
