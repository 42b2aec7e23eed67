//! Text buffer and cursor for the InputBox.
//!
//! The cursor is a byte offset that always sits on a char boundary.

use super::layout::{locate, offset_at_column, rows};

/// Find the byte offset of the previous character boundary before `pos` in `text`.
fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Find the byte offset of the next character boundary after `pos` in `text`.
fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

#[derive(Debug, Default, Clone)]
pub(super) struct EditBuffer {
    pub text: String,
    /// Cursor position as byte offset in text (0..=text.len())
    pub pos: usize,
}

impl EditBuffer {
    /// Replaces the contents and parks the cursor at the end.
    pub fn set(&mut self, text: &str) {
        self.text = text.to_string();
        self.pos = self.text.len();
    }

    pub fn take(&mut self) -> String {
        self.pos = 0;
        std::mem::take(&mut self.text)
    }

    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.pos, s);
        self.pos += s.len();
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.pos, c);
        self.pos += c.len_utf8();
    }

    pub fn backspace(&mut self) -> bool {
        if self.pos == 0 {
            return false;
        }
        let prev = prev_char_boundary(&self.text, self.pos);
        self.text.drain(prev..self.pos);
        self.pos = prev;
        true
    }

    pub fn delete(&mut self) -> bool {
        if self.pos >= self.text.len() {
            return false;
        }
        let next = next_char_boundary(&self.text, self.pos);
        self.text.drain(self.pos..next);
        true
    }

    pub fn left(&mut self) -> bool {
        if self.pos == 0 {
            return false;
        }
        self.pos = prev_char_boundary(&self.text, self.pos);
        true
    }

    pub fn right(&mut self) -> bool {
        if self.pos >= self.text.len() {
            return false;
        }
        self.pos = next_char_boundary(&self.text, self.pos);
        true
    }

    /// Start of the current logical line.
    pub fn home(&mut self) -> bool {
        let line_start = self.text[..self.pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let moved = self.pos != line_start;
        self.pos = line_start;
        moved
    }

    /// End of the current logical line.
    pub fn end(&mut self) -> bool {
        let line_end = self.text[self.pos..]
            .find('\n')
            .map(|i| self.pos + i)
            .unwrap_or(self.text.len());
        let moved = self.pos != line_end;
        self.pos = line_end;
        moved
    }

    /// Moves one visual row up (`-1`) or down (`1`), keeping the column where possible.
    /// Returns `false` at the first or last row.
    pub fn move_vertically(&mut self, direction: i8, width: u16) -> bool {
        let rows = rows(&self.text, width);
        let (row, column) = locate(&self.text, &rows, self.pos);
        let target = if direction < 0 {
            match row.checked_sub(1) {
                Some(t) => t,
                None => return false,
            }
        } else if row + 1 < rows.len() {
            row + 1
        } else {
            return false;
        };
        self.pos = offset_at_column(&self.text, rows[target], column);
        true
    }
}
