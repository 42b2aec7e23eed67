//! # ChatView Component
//!
//! Scrollable transcript with the prompt box underneath.
//!
//! ```text
//! ┌ ScrollView ─────────────────────────┐
//! │ ╭assistant──────────────────────╮   │
//! │ │ Hello! I am your developer... │   │
//! │ ╰───────────────────────────────╯   │
//! │ ╭you────────────────────────────╮   │
//! │ │ @ explain lifetimes           │   │
//! │ ╰───────────────────────────────╯   │
//! │  ⠋ Thinking...                      │  ← loading row while pending
//! └─────────────────────────────────────┘
//! ╭Message──────────────────────────────╮
//! │ Type your message, or use '@' ...   │
//! ╰─────────────────────────────────────╯
//! ```
//!
//! The view sticks to the bottom as messages grow. Scrolling up detaches it;
//! scrolling back down to the end re-attaches it.
//!
//! Message heights are cached between frames and only messages near the
//! viewport are drawn. Scrollback is capped at `SCROLLBACK_ROWS`.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::chat::{self, Transcript};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::input_box::{InputBox, InputEvent};
use crate::tui::components::message::Message;
use crate::tui::event::TuiEvent;

pub const INPUT_PLACEHOLDER: &str = "Type your message, or use '@' to talk to the AI...";
pub const LOADING_TEXT: &str = "Thinking...";

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const LOADING_ROW_HEIGHT: u16 = 1;
const MAX_INPUT_LINES: u16 = 6;
/// Rows of transcript kept scrollable; older messages drop out of view.
pub const SCROLLBACK_ROWS: u16 = 4096;

/// Events the chat screen hands back to the run loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// Raw input text to dispatch as `Action::Submit`.
    Submit(String),
}

/// Persistent presentation state for the chat screen.
pub struct ChatViewState {
    pub scroll_state: ScrollViewState,
    /// Auto-scroll to the newest content on every frame
    pub stick_to_bottom: bool,
    pub input: InputBox,
    pub layout: LayoutCache,
    viewport_height: u16,
    content_height: u16,
}

impl Default for ChatViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatViewState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            stick_to_bottom: true,
            input: InputBox::new("Message", MAX_INPUT_LINES).with_placeholder(INPUT_PLACEHOLDER),
            layout: LayoutCache::default(),
            viewport_height: 0,
            content_height: 0,
        }
    }

    /// Re-engage auto-scroll once the user has scrolled back to the end.
    fn repin_if_at_bottom(&mut self) {
        let max_y = self.content_height.saturating_sub(self.viewport_height);
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }
}

impl EventHandler for ChatViewState {
    type Event = ChatEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
                None
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
                None
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
                None
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
                None
            }
            _ => match self.input.handle_event(event)? {
                InputEvent::Submit if !self.input.is_blank() => {
                    // A new turn always brings the newest message into view
                    self.stick_to_bottom = true;
                    Some(ChatEvent::Submit(self.input.take()))
                }
                InputEvent::Submit | InputEvent::ContentChanged => None,
            },
        }
    }
}

/// Transient renderer built each frame from the transcript.
pub struct ChatView<'a> {
    pub state: &'a mut ChatViewState,
    pub transcript: &'a Transcript,
    pub spinner_frame: usize,
}

impl<'a> ChatView<'a> {
    pub fn new(state: &'a mut ChatViewState, transcript: &'a Transcript, spinner_frame: usize) -> Self {
        Self {
            state,
            transcript,
            spinner_frame,
        }
    }

    fn render_messages(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // scrollbar column
        let messages = &self.transcript.messages;
        let loading = self.transcript.pending;
        let loading_rows = if loading { LOADING_ROW_HEIGHT } else { 0 };

        let layout = &mut self.state.layout;
        layout.update(messages, content_width);

        let first = layout.first_fitting(SCROLLBACK_ROWS - loading_rows);
        let base = layout.top_of(first);
        let canvas_height =
            (layout.total() - base + u32::from(loading_rows)).min(u32::from(u16::MAX)) as u16;

        self.state.viewport_height = area.height;
        self.state.content_height = canvas_height;

        // Resolve the offset now so only the rows on screen are drawn
        let max_y = canvas_height.saturating_sub(area.height);
        let current = self.state.scroll_state.offset();
        let scroll_offset = if self.state.stick_to_bottom {
            max_y
        } else {
            current.y.min(max_y)
        };
        self.state.scroll_state.set_offset(Position {
            x: current.x,
            y: scroll_offset,
        });
        let visible = self
            .state
            .layout
            .visible_range(first, base, scroll_offset, area.height);

        let mut scroll_view = ScrollView::new(Size::new(content_width, canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let active_id = self.transcript.active_response().map(|m| m.id.as_str());
        for i in visible {
            let layout = &self.state.layout;
            let y = (layout.top_of(i) - base) as u16;
            let rect = Rect::new(0, y, content_width, layout.heights[i]);
            let message = &messages[i];
            let is_active = active_id == Some(message.id.as_str());
            scroll_view.render_widget(Message::new(message, is_active), rect);
        }

        if loading {
            let glyph = SPINNER[self.spinner_frame % SPINNER.len()];
            let row = Line::from(vec![
                Span::styled(format!(" {glyph} "), Style::default().fg(Color::Blue)),
                Span::styled(
                    LOADING_TEXT,
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                ),
            ]);
            scroll_view.render_widget(
                Paragraph::new(row),
                Rect::new(0, canvas_height - LOADING_ROW_HEIGHT, content_width, LOADING_ROW_HEIGHT),
            );
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// Cached message heights for the transcript.
///
/// Offsets are kept as `u32` so a long session never overflows. The view
/// only draws the newest messages that fit in `SCROLLBACK_ROWS`.
#[derive(Default)]
pub struct LayoutCache {
    pub heights: Vec<u16>,
    /// Bottom edge of each message, measured from the top of the transcript
    pub prefix_heights: Vec<u32>,
    content_width: u16,
}

impl LayoutCache {
    /// Re-measures what may have changed since the last frame.
    ///
    /// Messages are only ever appended, and only the newest reply grows, so
    /// everything before the previously last message is reused at the same width.
    pub fn update(&mut self, messages: &[chat::Message], content_width: u16) {
        let reusable = if self.content_width == content_width {
            self.heights.len().min(messages.len()).saturating_sub(1)
        } else {
            0
        };
        self.heights.truncate(reusable);
        self.prefix_heights.truncate(reusable);
        self.content_width = content_width;

        let mut acc = self.total();
        for message in &messages[reusable..] {
            let height = Message::calculate_height(message, content_width);
            acc += u32::from(height);
            self.heights.push(height);
            self.prefix_heights.push(acc);
        }
    }

    pub fn total(&self) -> u32 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    /// Top edge of message `i`.
    pub fn top_of(&self, i: usize) -> u32 {
        if i == 0 { 0 } else { self.prefix_heights[i - 1] }
    }

    /// Index of the oldest message such that it and everything after it fit
    /// in `budget` rows. Always keeps at least the newest message.
    pub fn first_fitting(&self, budget: u16) -> usize {
        let total = self.total();
        if total <= u32::from(budget) {
            return 0;
        }
        let cut = self
            .prefix_heights
            .partition_point(|&end| total - end > u32::from(budget));
        (cut + 1).min(self.heights.len().saturating_sub(1))
    }

    /// Messages intersecting the viewport plus half a screen either side.
    /// `base` is the transcript offset of canvas row 0.
    pub fn visible_range(
        &self,
        first: usize,
        base: u32,
        scroll_offset: u16,
        viewport_height: u16,
    ) -> std::ops::Range<usize> {
        let buffer = u32::from(viewport_height / 2);
        let top = base + u32::from(scroll_offset);
        let buffered_start = top.saturating_sub(buffer);
        let buffered_end = top + u32::from(viewport_height) + buffer;

        let shown = &self.prefix_heights[first..];
        let start = first + shown.partition_point(|&end| end <= buffered_start);
        let end = (first + shown.partition_point(|&end| end < buffered_end) + 1)
            .min(self.prefix_heights.len());
        start..end.max(start)
    }
}

impl<'a> Component for ChatView<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        // One request at a time: the prompt box is locked while a reply streams
        self.state.input.disabled = !self.transcript.accepts_input();

        let input_height = self.state.input.calculate_height(area.width);
        let [messages_area, input_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(input_height)]).areas(area);

        self.render_messages(frame, messages_area);
        self.state.input.render(frame, input_area);
    }
}
