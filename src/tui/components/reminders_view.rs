//! # RemindersView Component
//!
//! ```text
//!  Reminders
//!  Keep track of your important tasks.
//! ╭New reminder───────────────────────╮ [ Add ]
//! │ Add a new reminder...             │
//! ╰───────────────────────────────────╯
//!  • water plants          Mar 02 09:14
//!  • call the bank         Mar 01 17:40
//! ```
//!
//! Focus is either on the input (Enter adds) or on the list (Up/Down move,
//! Delete or Ctrl+D removes). Tab switches focus; typing in the list jumps
//! back to the input.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};

use crate::core::reminders::ReminderList;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::input_box::{InputBox, InputEvent};
use crate::tui::event::TuiEvent;

pub const HEADER: &str = "Reminders";
pub const SUBHEADER: &str = "Keep track of your important tasks.";
pub const INPUT_PLACEHOLDER: &str = "Add a new reminder...";
pub const EMPTY_TEXT: &str = "No reminders yet. Add one above to get started!";

const ADD_HINT: &str = " [ Add ] ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderFocus {
    Input,
    List,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReminderEvent {
    Add(String),
    /// Delete the reminder at this display index.
    DeleteAt(usize),
}

pub struct RemindersViewState {
    pub input: InputBox,
    pub focus: ReminderFocus,
    pub list_state: ListState,
    /// Number of rows at the last render, used to clamp the selection
    len: usize,
}

impl Default for RemindersViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl RemindersViewState {
    pub fn new() -> Self {
        Self {
            input: InputBox::new("New reminder", 1).with_placeholder(INPUT_PLACEHOLDER),
            focus: ReminderFocus::Input,
            list_state: ListState::default(),
            len: 0,
        }
    }

    /// Keeps the selection inside a list of `len` rows.
    pub fn sync(&mut self, len: usize) {
        self.len = len;
        self.list_state.select(match (self.list_state.selected(), len) {
            (_, 0) => None,
            (Some(i), n) => Some(i.min(n - 1)),
            (None, _) if self.focus == ReminderFocus::List => Some(0),
            (None, _) => None,
        });
    }

    fn focus(&mut self, focus: ReminderFocus) {
        self.focus = focus;
        self.input.focused = focus == ReminderFocus::Input;
        if focus == ReminderFocus::List && self.list_state.selected().is_none() && self.len > 0 {
            self.list_state.select(Some(0));
        }
    }

    fn handle_list_event(&mut self, event: &TuiEvent) -> Option<ReminderEvent> {
        match event {
            TuiEvent::CursorUp => {
                if let Some(i) = self.list_state.selected() {
                    self.list_state.select(Some(i.saturating_sub(1)));
                }
                None
            }
            TuiEvent::CursorDown => {
                if let Some(i) = self.list_state.selected()
                    && i + 1 < self.len
                {
                    self.list_state.select(Some(i + 1));
                }
                None
            }
            TuiEvent::Delete | TuiEvent::DeleteItem => {
                self.list_state.selected().map(ReminderEvent::DeleteAt)
            }
            TuiEvent::Escape => {
                self.focus(ReminderFocus::Input);
                None
            }
            TuiEvent::InputChar(_) | TuiEvent::Paste(_) => {
                self.focus(ReminderFocus::Input);
                self.handle_input_event(event)
            }
            _ => None,
        }
    }

    fn handle_input_event(&mut self, event: &TuiEvent) -> Option<ReminderEvent> {
        match self.input.handle_event(event)? {
            InputEvent::Submit if !self.input.is_blank() => {
                Some(ReminderEvent::Add(self.input.take()))
            }
            InputEvent::Submit | InputEvent::ContentChanged => None,
        }
    }
}

impl EventHandler for RemindersViewState {
    type Event = ReminderEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if matches!(event, TuiEvent::FocusNext | TuiEvent::FocusPrev) {
            let next = match self.focus {
                ReminderFocus::Input => ReminderFocus::List,
                ReminderFocus::List => ReminderFocus::Input,
            };
            self.focus(next);
            return None;
        }
        match self.focus {
            ReminderFocus::Input => self.handle_input_event(event),
            ReminderFocus::List => self.handle_list_event(event),
        }
    }
}

const BULLET_WIDTH: u16 = 3;
const STAMP_WIDTH: u16 = 14;

/// One list row per reminder, soft-wrapped with the timestamp on the first line.
fn reminder_item(text: &str, stamp: &str, width: u16) -> ListItem<'static> {
    let options = textwrap::Options::new(width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace);
    let wrapped = textwrap::wrap(text, options);

    let lines: Vec<Line> = wrapped
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            if i == 0 {
                Line::from(vec![
                    Span::styled(" • ", Style::default().fg(Color::Cyan)),
                    Span::raw(format!("{:<w$}", chunk, w = width as usize)),
                    Span::styled(format!("  {stamp}"), Style::default().fg(Color::DarkGray)),
                ])
            } else {
                Line::from(vec![Span::raw("   "), Span::raw(chunk.to_string())])
            }
        })
        .collect();
    ListItem::new(lines)
}

pub struct RemindersView<'a> {
    pub state: &'a mut RemindersViewState,
    pub reminders: &'a ReminderList,
}

impl<'a> RemindersView<'a> {
    pub fn new(state: &'a mut RemindersViewState, reminders: &'a ReminderList) -> Self {
        Self { state, reminders }
    }
}

impl<'a> Component for RemindersView<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.sync(self.reminders.len());
        self.state.input.focused = self.state.focus == ReminderFocus::Input;

        let input_height = self.state.input.calculate_height(area.width);
        let [header_area, input_row, list_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(input_height),
            Constraint::Min(0),
        ])
        .areas(area);

        let header = Paragraph::new(vec![
            Line::from(Span::styled(
                HEADER,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(SUBHEADER, Style::default().fg(Color::Gray))),
        ]);
        frame.render_widget(header, header_area);

        let [input_area, add_area] = Layout::horizontal([
            Constraint::Min(0),
            Constraint::Length(ADD_HINT.len() as u16),
        ])
        .areas(input_row);
        self.state.input.render(frame, input_area);

        // The add control is only live when there is something to add
        let add_style = if self.state.input.is_blank() {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
        } else {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        };
        let add_line_area = Rect { y: add_area.y + 1, height: 1, ..add_area };
        frame.render_widget(Span::styled(ADD_HINT, add_style), add_line_area);

        if self.reminders.is_empty() {
            let empty = Paragraph::new(Line::from(Span::styled(
                EMPTY_TEXT,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )))
            .centered();
            frame.render_widget(empty, list_area.inner(ratatui::layout::Margin::new(0, 1)));
            return;
        }

        let text_width = list_area.width.saturating_sub(BULLET_WIDTH + STAMP_WIDTH).max(1);
        let items: Vec<ListItem> = self
            .reminders
            .reminders
            .iter()
            .map(|r| reminder_item(&r.text, &r.created_at.format("%b %d %H:%M").to_string(), text_width))
            .collect();

        let highlight = if self.state.focus == ReminderFocus::List {
            Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let list = List::new(items).highlight_style(highlight);
        frame.render_stateful_widget(list, list_area, &mut self.state.list_state);
    }
}
