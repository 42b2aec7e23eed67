//! # Sidebar Component
//!
//! Fixed-width navigation column listing the three screens. The mounted
//! screen is highlighted; F1/F2/F3 switch between them.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::core::view::View;
use crate::tui::component::Component;

pub const SIDEBAR_WIDTH: u16 = 18;

pub struct Sidebar {
    pub active: View,
}

impl Sidebar {
    pub fn new(active: View) -> Self {
        Self { active }
    }

    fn nav_line(view: View, index: usize, active: bool) -> Line<'static> {
        let key = format!(" F{} ", index + 1);
        if active {
            let style = Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD);
            Line::from(vec![
                Span::styled(key, style),
                Span::styled(format!("{:<10}", view.label()), style),
            ])
        } else {
            Line::from(vec![
                Span::styled(key, Style::default().fg(Color::DarkGray)),
                Span::styled(view.label(), Style::default().fg(Color::Gray)),
            ])
        }
    }
}

impl Component for Sidebar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![Line::default()];
        for (i, view) in View::ALL.into_iter().enumerate() {
            lines.push(Self::nav_line(view, i, view == self.active));
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            " Ctrl+C quit",
            Style::default().fg(Color::DarkGray),
        )));

        let block = Block::default()
            .borders(Borders::RIGHT)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray));

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}
