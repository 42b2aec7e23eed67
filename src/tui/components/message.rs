use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::chat::{self, Source};
use crate::tui::highlight;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

/// A transient component that renders one transcript entry.
///
/// User turns are green, assistant turns blue. The reply currently
/// receiving fragments is drawn with a bold border.
#[derive(Clone, Copy)]
pub struct Message<'a> {
    pub message: &'a chat::Message,
    /// True for the reply that is still streaming
    pub is_active: bool,
}

impl<'a> Message<'a> {
    pub fn new(message: &'a chat::Message, is_active: bool) -> Self {
        Self { message, is_active }
    }

    fn paragraph(message: &chat::Message) -> Paragraph<'static> {
        Paragraph::new(highlight::render(&message.text, source_color(message.sender)))
            .wrap(Wrap { trim: false })
    }

    /// Rendered height at the given outer width, borders included.
    ///
    /// Measured with the same `Paragraph` that `render` draws, so fenced code
    /// borders and soft wraps are counted exactly.
    pub fn calculate_height(message: &chat::Message, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return 1;
        }
        if message.text.trim().is_empty() {
            return VERTICAL_OVERHEAD;
        }
        let lines = Self::paragraph(message).line_count(content_width);
        let max_lines = (u16::MAX - VERTICAL_OVERHEAD) as usize;
        lines.clamp(1, max_lines) as u16 + VERTICAL_OVERHEAD
    }
}

fn source_color(source: Source) -> Color {
    match source {
        Source::User => Color::Green,
        Source::Assistant => Color::Blue,
    }
}

fn role(source: Source) -> &'static str {
    match source {
        Source::User => "you",
        Source::Assistant => "assistant",
    }
}

impl<'a> Widget for Message<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let base = Style::default().fg(source_color(self.message.sender));
        let border_style = if self.is_active {
            base.add_modifier(Modifier::BOLD)
        } else {
            base.add_modifier(Modifier::DIM)
        };

        let block = Block::bordered()
            .title(role(self.message.sender))
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner_area = block.inner(area);
        block.render(area, buf);
        Self::paragraph(self.message).render(inner_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn make_message(sender: Source, text: &str) -> chat::Message {
        chat::Message {
            id: "m1".to_string(),
            text: text.to_string(),
            sender,
        }
    }

    #[test]
    fn calculate_height_empty_content_returns_border_height() {
        let message = make_message(Source::User, "  \n ");
        assert_eq!(Message::calculate_height(&message, 80), VERTICAL_OVERHEAD);
    }

    #[test]
    fn calculate_height_zero_width_returns_minimum() {
        let message = make_message(Source::User, "Hello world");
        assert_eq!(Message::calculate_height(&message, HORIZONTAL_OVERHEAD), 1);
    }

    #[test]
    fn calculate_height_single_line_fits() {
        let message = make_message(Source::User, "Hello");
        assert_eq!(Message::calculate_height(&message, 80), 1 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn calculate_height_counts_explicit_lines() {
        let message = make_message(Source::Assistant, "one\ntwo\nthree");
        assert_eq!(Message::calculate_height(&message, 80), 3 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn calculate_height_counts_code_block_frame() {
        // "Look:" + top border + 1 body line + bottom border
        let message = make_message(Source::Assistant, "Look:\n```rust\nfn main() {}\n```");
        assert_eq!(Message::calculate_height(&message, 80), 4 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn calculate_height_wraps_long_lines() {
        let message = make_message(Source::User, "Hello world");
        // content width 5: "Hello" | "world"
        assert_eq!(Message::calculate_height(&message, 9), 2 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn source_colors() {
        assert_eq!(source_color(Source::User), Color::Green);
        assert_eq!(source_color(Source::Assistant), Color::Blue);
    }

    #[test]
    fn render_shows_role_and_text() {
        let mut terminal = Terminal::new(TestBackend::new(30, 3)).unwrap();
        let message = make_message(Source::Assistant, "hi there");
        terminal
            .draw(|f| f.render_widget(Message::new(&message, false), f.area()))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("assistant"));
        assert!(text.contains("hi there"));
    }
}
