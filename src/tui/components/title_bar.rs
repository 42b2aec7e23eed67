//! # TitleBar Component
//!
//! Single-line bar at the top of the screen.
//!
//! ```text
//! devdeck  gemini · gemini-2.5-flash | Thinking...
//! ```
//!
//! Purely presentational: every field is a prop copied from `App` each frame.

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

pub struct TitleBar<'a> {
    pub provider_name: &'a str,
    pub model_name: &'a str,
    pub status_message: &'a str,
}

impl<'a> TitleBar<'a> {
    pub fn new(provider_name: &'a str, model_name: &'a str, status_message: &'a str) -> Self {
        Self {
            provider_name,
            model_name,
            status_message,
        }
    }
}

impl<'a> Component for TitleBar<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(
                "devdeck",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!("{} · {}", self.provider_name, self.model_name),
                Style::default().fg(Color::Gray),
            ),
        ];
        if !self.status_message.is_empty() {
            let status_style = if self.status_message.starts_with("Error") {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Yellow)
            };
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(self.status_message, status_style));
        }

        frame.render_widget(Line::from(spans), area);
    }
}
