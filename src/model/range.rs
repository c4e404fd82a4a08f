//! Single-line ranges in UTF-16 code units.
//!
//! Every entity of the instance model sits on one line, so a range is a line
//! plus a start and end column. Columns count UTF-16 code units to match LSP
//! positions.

use tower_lsp::lsp_types::{Position, Range};

/// Capability shared by every position-bearing entity.
pub trait Ranged {
    /// 0-based line.
    fn line(&self) -> u32;
    fn start_column(&self) -> u32;
    fn end_column(&self) -> u32;

    /// Inclusive on both ends: a cursor right after the last character still
    /// belongs to the entity.
    fn contains(&self, position: Position) -> bool {
        position.line == self.line()
            && self.start_column() <= position.character
            && position.character <= self.end_column()
    }

    fn to_range(&self) -> Range {
        Range::new(
            Position::new(self.line(), self.start_column()),
            Position::new(self.line(), self.end_column()),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineRange {
    line: u32,
    start: u32,
    end: u32,
}

impl LineRange {
    /// Build a range, swapping the columns if given out of order.
    pub fn new(line: u32, start: u32, end: u32) -> Self {
        let (start, end) = if start <= end {
            (start, end)
        } else {
            (end, start)
        };
        Self { line, start, end }
    }

    /// Range covering `text` when it starts at `start` on `line`.
    pub fn spanning(line: u32, start: u32, text: &str) -> Self {
        Self::new(line, start, start + utf16_len(text))
    }
}

impl Ranged for LineRange {
    fn line(&self) -> u32 {
        self.line
    }

    fn start_column(&self) -> u32 {
        self.start
    }

    fn end_column(&self) -> u32 {
        self.end
    }
}

/// Length of `text` in UTF-16 code units.
pub fn utf16_len(text: &str) -> u32 {
    text.chars().map(|c| c.len_utf16() as u32).sum()
}

/// The longest prefix of `text` spanning at most `units` UTF-16 code units.
///
/// A count landing inside a surrogate pair stops before that character.
pub fn utf16_prefix(text: &str, units: u32) -> &str {
    let mut seen = 0u32;
    for (i, c) in text.char_indices() {
        let next = seen + c.len_utf16() as u32;
        if next > units {
            return &text[..i];
        }
        seen = next;
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_inclusive() {
        let range = LineRange::new(2, 4, 9);
        assert!(range.contains(Position::new(2, 4)));
        assert!(range.contains(Position::new(2, 9)));
        assert!(!range.contains(Position::new(2, 10)));
        assert!(!range.contains(Position::new(2, 3)));
        assert!(!range.contains(Position::new(1, 5)));
    }

    #[test]
    fn columns_are_ordered() {
        let range = LineRange::new(0, 7, 3);
        assert_eq!(range.start_column(), 3);
        assert_eq!(range.end_column(), 7);
    }

    #[test]
    fn spanning_counts_utf16_units() {
        let range = LineRange::spanning(0, 2, "a😀b");
        assert_eq!(range.end_column(), 6);
    }

    #[test]
    fn prefix_by_units() {
        assert_eq!(utf16_prefix("delay", 3), "del");
        assert_eq!(utf16_prefix("delay", 0), "");
        assert_eq!(utf16_prefix("delay", 42), "delay");
        // Half of the surrogate pair is not enough for the emoji.
        assert_eq!(utf16_prefix("a😀b", 2), "a");
        assert_eq!(utf16_prefix("a😀b", 3), "a😀");
    }
}
