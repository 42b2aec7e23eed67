//! # InputBox Component
//!
//! A bordered, soft-wrapping text field. Used for the chat prompt, the new
//! reminder field, and the snippet title and code fields.
//!
//! ## State Management
//!
//! The text buffer and cursor are internal state. `focused` and `disabled`
//! are props set by the parent every frame. A disabled box ignores all input
//! and hides its cursor.

mod buffer;
mod layout;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use buffer::EditBuffer;
use layout::{
    CONTENT_OFFSET_X, CONTENT_OFFSET_Y, VERTICAL_OVERHEAD, inner_width, locate, rows,
};

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Enter pressed (single-line mode). The parent decides whether to `take()`.
    Submit,
    /// Text or cursor changed
    ContentChanged,
}

pub struct InputBox {
    buffer: EditBuffer,
    pub title: String,
    pub placeholder: String,
    /// Prop: draws the focus border and the cursor
    pub focused: bool,
    /// Prop: ignores input, dims the box
    pub disabled: bool,
    /// Enter inserts a newline instead of submitting
    multiline: bool,
    max_visible_lines: u16,
    /// Row offset for internal scrolling (0 when content fits)
    scroll_offset: u16,
    /// Cached content width from last render (used for cursor movement)
    last_content_width: u16,
}

impl InputBox {
    const DEFAULT_WIDTH: u16 = 80;

    /// A single-line field; Enter emits [`InputEvent::Submit`].
    pub fn new(title: &str, max_visible_lines: u16) -> Self {
        Self {
            buffer: EditBuffer::default(),
            title: title.to_string(),
            placeholder: String::new(),
            focused: true,
            disabled: false,
            multiline: false,
            max_visible_lines: max_visible_lines.max(1),
            scroll_offset: 0,
            last_content_width: Self::DEFAULT_WIDTH,
        }
    }

    /// A code-style field; Enter inserts a newline.
    pub fn multiline(title: &str, max_visible_lines: u16) -> Self {
        Self {
            multiline: true,
            ..Self::new(title, max_visible_lines)
        }
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    pub fn text(&self) -> &str {
        &self.buffer.text
    }

    pub fn is_blank(&self) -> bool {
        self.buffer.text.trim().is_empty()
    }

    pub fn set_text(&mut self, text: &str) {
        self.buffer.set(text);
        self.scroll_offset = 0;
    }

    /// Clears the field and returns what it held.
    pub fn take(&mut self) -> String {
        self.scroll_offset = 0;
        self.buffer.take()
    }

    /// Required height for the current content, clamped to the visible-line limit.
    pub fn calculate_height(&self, area_width: u16) -> u16 {
        let rows = rows(&self.buffer.text, inner_width(area_width)).len() as u16;
        rows.clamp(1, self.max_visible_lines) + VERTICAL_OVERHEAD
    }

    /// Keep the cursor row inside the viewport.
    fn update_scroll_offset(&mut self, width: u16, visible: u16) {
        let rows = rows(&self.buffer.text, width);
        let (cursor_row, _) = locate(&self.buffer.text, &rows, self.buffer.pos);
        let cursor_row = cursor_row as u16;
        let visible = visible.max(1);

        if rows.len() as u16 <= visible {
            self.scroll_offset = 0;
        } else if cursor_row < self.scroll_offset {
            self.scroll_offset = cursor_row;
        } else if cursor_row >= self.scroll_offset + visible {
            self.scroll_offset = cursor_row + 1 - visible;
        }
    }

    fn border_style(&self) -> Style {
        if self.disabled {
            Style::default().fg(Color::DarkGray)
        } else if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM)
        }
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = inner_width(area.width);
        let visible = area.height.saturating_sub(VERTICAL_OVERHEAD);
        self.last_content_width = width;
        self.update_scroll_offset(width, visible);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(self.border_style())
            .title(self.title.as_str())
            .padding(Padding::horizontal(1));

        let paragraph = if self.buffer.text.is_empty() {
            Paragraph::new(self.placeholder.as_str()).style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            let lines: Vec<Line> = rows(&self.buffer.text, width)
                .into_iter()
                .skip(self.scroll_offset as usize)
                .take(visible as usize)
                .map(|r| Line::raw(&self.buffer.text[r.start..r.end]))
                .collect();
            let fg = if self.disabled { Color::DarkGray } else { Color::White };
            Paragraph::new(lines).style(Style::default().fg(fg))
        };

        frame.render_widget(paragraph.block(block), area);

        if self.focused && !self.disabled {
            let rows = rows(&self.buffer.text, width);
            let (row, col) = locate(&self.buffer.text, &rows, self.buffer.pos);
            let visible_row = (row as u16).saturating_sub(self.scroll_offset);
            let x = (area.x + CONTENT_OFFSET_X + col as u16)
                .min(area.right().saturating_sub(1));
            let y = area.y + CONTENT_OFFSET_Y + visible_row;
            frame.set_cursor_position((x, y));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.disabled {
            return None;
        }
        let changed = match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert_char(*c);
                true
            }
            TuiEvent::Paste(text) => {
                self.buffer.insert_str(text);
                true
            }
            TuiEvent::Submit if self.multiline => {
                self.buffer.insert_char('\n');
                true
            }
            TuiEvent::Submit => return Some(InputEvent::Submit),
            TuiEvent::Backspace => self.buffer.backspace(),
            TuiEvent::Delete => self.buffer.delete(),
            TuiEvent::CursorLeft => self.buffer.left(),
            TuiEvent::CursorRight => self.buffer.right(),
            TuiEvent::CursorHome => self.buffer.home(),
            TuiEvent::CursorEnd => self.buffer.end(),
            TuiEvent::CursorUp => self.buffer.move_vertically(-1, self.last_content_width),
            TuiEvent::CursorDown => self.buffer.move_vertically(1, self.last_content_width),
            _ => false,
        };
        changed.then_some(InputEvent::ContentChanged)
    }
}
