//! Soft-wrap layout for the input box.
//!
//! Text is split into visual rows by display width (hard breaks on `\n`,
//! character-level breaks at the box edge). Rows are byte ranges into the
//! buffer, so the cursor maps onto them exactly.

use unicode_width::UnicodeWidthChar;

/// Border (2) + padding (2) consumed horizontally by the bordered block
pub(super) const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders consumed vertically
pub(super) const VERTICAL_OVERHEAD: u16 = 2;
/// Offset from area edge to the first content column (border + padding)
pub(super) const CONTENT_OFFSET_X: u16 = 2;
/// Offset from area edge to the first content row (border)
pub(super) const CONTENT_OFFSET_Y: u16 = 1;

/// One rendered row: `buffer[start..end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Row {
    pub start: usize,
    pub end: usize,
}

/// Calculate the inner content width after subtracting border/padding overhead.
pub(super) fn inner_width(area_width: u16) -> u16 {
    area_width.saturating_sub(HORIZONTAL_OVERHEAD)
}

fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Display width of a string slice.
pub(super) fn display_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

/// Splits `text` into visual rows no wider than `width` columns.
/// Always returns at least one row.
pub(super) fn rows(text: &str, width: u16) -> Vec<Row> {
    let width = usize::from(width.max(1));
    let mut rows = Vec::new();
    let mut line_start = 0;

    for line in text.split('\n') {
        let mut row_start = line_start;
        let mut row_width = 0;
        for (offset, c) in line.char_indices() {
            let w = char_width(c);
            if row_width + w > width && row_width > 0 {
                rows.push(Row {
                    start: row_start,
                    end: line_start + offset,
                });
                row_start = line_start + offset;
                row_width = 0;
            }
            row_width += w;
        }
        rows.push(Row {
            start: row_start,
            end: line_start + line.len(),
        });
        line_start += line.len() + 1;
    }

    rows
}

/// Row index and column of byte offset `pos`.
///
/// At a soft break the cursor belongs to the following row.
pub(super) fn locate(text: &str, rows: &[Row], pos: usize) -> (usize, usize) {
    let idx = rows.iter().rposition(|r| r.start <= pos).unwrap_or(0);
    let row = rows[idx];
    let end = pos.min(row.end);
    (idx, display_width(&text[row.start..end]))
}

/// Byte offset in `row` closest to `column` without passing it.
pub(super) fn offset_at_column(text: &str, row: Row, column: usize) -> usize {
    let mut used = 0;
    for (offset, c) in text[row.start..row.end].char_indices() {
        let w = char_width(c);
        if used + w > column {
            return row.start + offset;
        }
        used += w;
    }
    row.end
}
