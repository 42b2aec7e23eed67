//! # SnippetsView Component
//!
//! List on the left, editor on the right.
//!
//! ```text
//! ╭Snippets (2)──────────╮╭Title─────────────────────────────╮
//! │▶ fetch helper    js  ││ fetch helper                     │
//! │  venv setup      sh  │╰──────────────────────────────────╯
//! │                      │ Language: JavaScript   Ctrl+L
//! │                      │╭Code──────────────────────────────╮
//! │                      ││ const res = await fetch(url);    │
//! ╰──────────────────────╯╰──────────────────────────────────╯
//!  Ctrl+N new  Ctrl+S save  Ctrl+D delete  Tab focus
//! ```
//!
//! The editor fields mirror `SnippetBook::draft`. Whenever the book loads a
//! new draft (select, new, or a change of creating flag) the fields are
//! reloaded; in between they are edited freely and handed back on save.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, List, ListItem, ListState, Paragraph};

use crate::core::snippets::{Language, SnippetBook, SnippetDraft};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::input_box::{InputBox, InputEvent};
use crate::tui::event::TuiEvent;

pub const EMPTY_EDITOR_TEXT: &str = "Select a snippet to view or create a new one.";

const LIST_WIDTH: u16 = 30;
const CODE_MAX_LINES: u16 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetFocus {
    List,
    Title,
    Code,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SnippetEvent {
    New,
    /// Select the snippet at this display index.
    SelectAt(usize),
    Save(SnippetDraft),
    Delete,
}

/// Identifies which draft the editor fields were loaded from.
#[derive(Debug, Clone, PartialEq)]
struct LoadedFrom {
    selected_id: Option<String>,
    creating: bool,
    revision: u64,
}

pub struct SnippetsViewState {
    pub title: InputBox,
    pub code: InputBox,
    pub language: Language,
    pub focus: SnippetFocus,
    loaded: Option<LoadedFrom>,
    editor_open: bool,
    creating: bool,
    selected_index: Option<usize>,
    len: usize,
}

impl Default for SnippetsViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl SnippetsViewState {
    pub fn new() -> Self {
        let mut state = Self {
            title: InputBox::new("Title", 1),
            code: InputBox::multiline("Code", CODE_MAX_LINES),
            language: Language::default(),
            focus: SnippetFocus::List,
            loaded: None,
            editor_open: false,
            creating: false,
            selected_index: None,
            len: 0,
        };
        state.set_focus(SnippetFocus::List);
        state
    }

    /// Pulls list metadata from the book and reloads the editor fields when
    /// the book switched to a different draft.
    pub fn sync(&mut self, book: &SnippetBook) {
        self.editor_open = book.editor_open();
        self.creating = book.creating;
        self.selected_index = book.selected_index();
        self.len = book.snippets.len();

        let current = LoadedFrom {
            selected_id: book.selected_id.clone(),
            creating: book.creating,
            revision: book.draft_revision,
        };
        if self.loaded.as_ref() == Some(&current) {
            return;
        }
        self.title.set_text(&book.draft.title);
        self.code.set_text(&book.draft.code);
        self.language = book.draft.language;
        self.loaded = Some(current);

        if !self.editor_open {
            self.set_focus(SnippetFocus::List);
        }
    }

    /// The editor fields as a draft.
    pub fn draft(&self) -> SnippetDraft {
        SnippetDraft {
            title: self.title.text().to_string(),
            language: self.language,
            code: self.code.text().to_string(),
        }
    }

    fn set_focus(&mut self, focus: SnippetFocus) {
        self.focus = focus;
        self.title.focused = focus == SnippetFocus::Title;
        self.code.focused = focus == SnippetFocus::Code;
    }

    fn cycle_focus(&mut self, forward: bool) {
        if !self.editor_open {
            self.set_focus(SnippetFocus::List);
            return;
        }
        let next = match (self.focus, forward) {
            (SnippetFocus::List, true) | (SnippetFocus::Code, false) => SnippetFocus::Title,
            (SnippetFocus::Title, true) | (SnippetFocus::List, false) => SnippetFocus::Code,
            (SnippetFocus::Code, true) | (SnippetFocus::Title, false) => SnippetFocus::List,
        };
        self.set_focus(next);
    }

    fn handle_list_event(&mut self, event: &TuiEvent) -> Option<SnippetEvent> {
        match event {
            TuiEvent::CursorUp if self.len > 0 => {
                let idx = self.selected_index.map_or(0, |i| i.saturating_sub(1));
                Some(SnippetEvent::SelectAt(idx))
            }
            TuiEvent::CursorDown if self.len > 0 => {
                let idx = self.selected_index.map_or(0, |i| (i + 1).min(self.len - 1));
                Some(SnippetEvent::SelectAt(idx))
            }
            TuiEvent::Submit if self.editor_open => {
                self.set_focus(SnippetFocus::Title);
                None
            }
            TuiEvent::Delete => Some(SnippetEvent::Delete),
            _ => None,
        }
    }
}

impl EventHandler for SnippetsViewState {
    type Event = SnippetEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::NewItem => {
                self.set_focus(SnippetFocus::Title);
                return Some(SnippetEvent::New);
            }
            TuiEvent::Save if self.editor_open => return Some(SnippetEvent::Save(self.draft())),
            TuiEvent::DeleteItem => return Some(SnippetEvent::Delete),
            TuiEvent::CycleLanguage if self.editor_open => {
                self.language = self.language.next();
                return None;
            }
            TuiEvent::FocusNext => {
                self.cycle_focus(true);
                return None;
            }
            TuiEvent::FocusPrev => {
                self.cycle_focus(false);
                return None;
            }
            TuiEvent::Escape => {
                self.set_focus(SnippetFocus::List);
                return None;
            }
            _ => {}
        }

        match self.focus {
            SnippetFocus::List => self.handle_list_event(event),
            SnippetFocus::Title => {
                if let Some(InputEvent::Submit) = self.title.handle_event(event) {
                    self.set_focus(SnippetFocus::Code);
                }
                None
            }
            SnippetFocus::Code => {
                self.code.handle_event(event);
                None
            }
        }
    }
}

pub struct SnippetsView<'a> {
    pub state: &'a mut SnippetsViewState,
    pub book: &'a SnippetBook,
}

impl<'a> SnippetsView<'a> {
    pub fn new(state: &'a mut SnippetsViewState, book: &'a SnippetBook) -> Self {
        Self { state, book }
    }

    fn render_list(&mut self, frame: &mut Frame, area: Rect) {
        let focused = self.state.focus == SnippetFocus::List;
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(format!("Snippets ({})", self.book.snippets.len()))
            .border_style(if focused {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            });

        let name_width = area.width.saturating_sub(2 + 2 + 12) as usize;
        let items: Vec<ListItem> = self
            .book
            .snippets
            .iter()
            .map(|s| {
                let title: String = s.title.chars().take(name_width).collect();
                ListItem::new(Line::from(vec![
                    Span::raw(format!("{title:<name_width$}")),
                    Span::styled(
                        format!(" {:>10}", s.language.label()),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_symbol("▶ ")
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );
        let mut list_state = ListState::default().with_selected(self.book.selected_index());
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_editor(&mut self, frame: &mut Frame, area: Rect) {
        let [title_area, language_area, code_area, hints_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(area);

        self.state.title.render(frame, title_area);

        let language_line = Line::from(vec![
            Span::styled(" Language: ", Style::default().fg(Color::Gray)),
            Span::styled(
                self.state.language.label(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("   Ctrl+L", Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(language_line, language_area);

        self.state.code.render(frame, code_area);
        frame.render_widget(self.hints(), hints_area);
    }

    fn hints(&self) -> Line<'static> {
        let key = Style::default().fg(Color::Cyan);
        let text = Style::default().fg(Color::DarkGray);
        // Deleting the entry being drafted is not possible
        let (delete_key, delete) = if self.state.creating {
            let dim = Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM);
            (dim, dim)
        } else {
            (key, text)
        };
        Line::from(vec![
            Span::styled(" Ctrl+N", key),
            Span::styled(" new  ", text),
            Span::styled("Ctrl+S", key),
            Span::styled(" save  ", text),
            Span::styled("Ctrl+D", delete_key),
            Span::styled(" delete  ", delete),
            Span::styled("Tab", key),
            Span::styled(" focus", text),
        ])
    }
}

impl<'a> Component for SnippetsView<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.sync(self.book);

        let [list_area, editor_area] =
            Layout::horizontal([Constraint::Length(LIST_WIDTH), Constraint::Min(0)]).areas(area);
        self.render_list(frame, list_area);

        if self.state.editor_open {
            self.render_editor(frame, editor_area);
        } else {
            let [_, middle, _] = Layout::vertical([
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Fill(1),
            ])
            .areas(editor_area);
            let empty = Paragraph::new(Span::styled(
                EMPTY_EDITOR_TEXT,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ))
            .centered();
            frame.render_widget(empty, middle);
            let hint = Paragraph::new(Line::from(vec![
                Span::styled(" Ctrl+N", Style::default().fg(Color::Cyan)),
                Span::styled(" new snippet", Style::default().fg(Color::DarkGray)),
            ]));
            frame.render_widget(
                hint,
                Rect {
                    y: editor_area.bottom().saturating_sub(1),
                    height: 1,
                    ..editor_area
                },
            );
        }
    }
}
