//! Text utilities for position conversion.
//!
//! Provides byte offset <-> LSP position conversion with proper UTF-16 handling.

use tower_lsp::lsp_types::Position;

/// Pre-computed line index for efficient position lookups.
///
/// LSP positions use line/column where column is in UTF-16 code units.
/// This struct pre-computes line start offsets for O(log n) lookup.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset where each line starts.
    line_starts: Vec<usize>,
    /// Byte offset where each line's content ends (before `\r\n` or `\n`).
    line_ends: Vec<usize>,
    source_len: usize,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        let mut line_ends = Vec::new();

        for (i, c) in source.char_indices() {
            if c == '\n' {
                let end = if source[..i].ends_with('\r') { i - 1 } else { i };
                line_ends.push(end);
                line_starts.push(i + 1);
            }
        }
        line_ends.push(source.len());

        Self {
            line_starts,
            line_ends,
            source_len: source.len(),
        }
    }

    /// Convert a byte offset to an LSP position.
    pub fn offset_to_position(&self, source: &str, offset: usize) -> Position {
        let offset = offset.min(self.source_len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };

        let line_start = self.line_starts[line];
        let end = offset.min(self.line_ends[line]);
        let col: u32 = source[line_start..end]
            .chars()
            .map(|c| c.len_utf16() as u32)
            .sum();

        Position::new(line as u32, col)
    }

    /// Convert an LSP position to a byte offset.
    ///
    /// Columns past the end of the line land on the line end. Returns None
    /// if the line does not exist.
    pub fn position_to_offset(&self, source: &str, position: Position) -> Option<usize> {
        let line = position.line as usize;
        let line_start = *self.line_starts.get(line)?;
        let line_end = self.line_ends[line];

        let mut utf16_col = 0u32;
        for (i, c) in source[line_start..line_end].char_indices() {
            if utf16_col >= position.character {
                return Some(line_start + i);
            }
            utf16_col += c.len_utf16() as u32;
        }

        Some(line_end)
    }

    /// Snap a client position onto the text: clamps the column to the line
    /// end and moves a column splitting a surrogate pair past that character.
    pub fn normalize(&self, source: &str, position: Position) -> Option<Position> {
        let offset = self.position_to_offset(source, position)?;
        Some(self.offset_to_position(source, offset))
    }
}
