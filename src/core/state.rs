//! # Application State
//!
//! Core business state for devdeck. Domain logic only, no TUI types.
//! Presentation state (cursors, scroll offsets, focus) lives in the `tui` module.
//!
//! ```text
//! App
//! ├── session: Arc<dyn ChatSession>  // open model conversation
//! ├── provider_name: String          // shown in the title bar
//! ├── model_name: String
//! ├── status_message: String         // status bar text
//! ├── view: View                     // mounted screen
//! ├── chat: Transcript               // messages + pending gate
//! ├── snippets: SnippetBook          // persisted under "snippets"
//! └── reminders: ReminderList        // persisted under "reminders"
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::sync::Arc;

use crate::core::chat::Transcript;
use crate::core::reminders::{Reminder, ReminderList};
use crate::core::snippets::{Snippet, SnippetBook};
use crate::core::view::View;
use crate::inference::ChatSession;

pub const WELCOME_STATUS: &str = "Welcome to devdeck!";

pub struct App {
    pub session: Arc<dyn ChatSession>,
    pub provider_name: String,
    pub model_name: String,
    pub status_message: String,
    pub view: View,
    pub chat: Transcript,
    pub snippets: SnippetBook,
    pub reminders: ReminderList,
}

impl App {
    pub fn new(
        session: Arc<dyn ChatSession>,
        provider_name: String,
        model_name: String,
        snippets: Vec<Snippet>,
        reminders: Vec<Reminder>,
    ) -> Self {
        Self {
            session,
            provider_name,
            model_name,
            status_message: WELCOME_STATUS.to_string(),
            view: View::default(),
            chat: Transcript::new(),
            snippets: SnippetBook::new(snippets),
            reminders: ReminderList::new(reminders),
        }
    }

    /// True while a reply is streaming.
    pub fn is_loading(&self) -> bool {
        self.chat.pending
    }
}
