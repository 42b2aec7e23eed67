//! # Chat Transcript
//!
//! The ordered message list behind the chat screen, plus the busy/idle state
//! that allows exactly one streamed reply at a time.
//!
//! ```text
//!   submit("@ explain")        apply_fragment("Foo")   apply_fragment(" bar")   complete()
//!   ┌──────────────────┐       ┌──────────────────┐    ┌──────────────────┐     ┌──────────────┐
//!   │ + user "@ expl.."│  ──►  │ + assistant "Foo"│ ─► │ assistant        │ ──► │ pending=false│
//!   │ pending = true   │       │ active = id      │    │   "Foo bar"      │     │ active=None  │
//!   └──────────────────┘       └──────────────────┘    └──────────────────┘     └──────────────┘
//! ```
//!
//! Text that does not start with [`TRIGGER_PREFIX`] is recorded as a user turn
//! and stops there. It is never forwarded to the model, not even as context
//! for a later `@` turn.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Marks a submission that should be sent to the model.
pub const TRIGGER_PREFIX: char = '@';

/// Seeded into every new transcript. Local only.
pub const GREETING: &str =
    "Hello! I am your developer assistant. Mention me with `@` to start a conversation.";

/// Appended when a streamed reply fails.
pub const ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub enum Source {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Source,
}

impl Message {
    fn new(text: String, sender: Source) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text,
            sender,
        }
    }
}

/// Conversation state owned by the chat screen.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub messages: Vec<Message>,
    /// True while a stream request is in flight.
    pub pending: bool,
    /// Set once the in-flight reply has received its first fragment.
    pub active_response_id: Option<String>,
    /// Everything received for the in-flight reply so far.
    accumulated: String,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    /// Creates a transcript holding only the greeting.
    pub fn new() -> Self {
        Self {
            messages: vec![Message::new(GREETING.to_string(), Source::Assistant)],
            pending: false,
            active_response_id: None,
            accumulated: String::new(),
        }
    }

    /// Whether a new submission would be accepted.
    pub fn accepts_input(&self) -> bool {
        !self.pending
    }

    /// Records a user turn. Returns the prompt to send when the text was
    /// addressed to the model, in which case the transcript is now pending.
    ///
    /// Blank text and submissions while pending change nothing.
    pub fn submit(&mut self, raw: &str) -> Option<String> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        if self.pending {
            warn!("Submit ignored: a reply is still streaming");
            return None;
        }

        self.messages.push(Message::new(text.to_string(), Source::User));

        let prompt = text.strip_prefix(TRIGGER_PREFIX)?.trim().to_string();
        self.pending = true;
        self.active_response_id = None;
        self.accumulated.clear();
        debug!("Transcript pending on prompt ({} bytes)", prompt.len());
        Some(prompt)
    }

    /// Applies the next streamed fragment. The reply message always shows the
    /// full text received so far.
    pub fn apply_fragment(&mut self, fragment: &str) {
        if !self.pending {
            warn!("Dropping fragment received while idle ({} bytes)", fragment.len());
            return;
        }
        self.accumulated.push_str(fragment);

        if let Some(id) = self.active_response_id.as_deref()
            && let Some(message) = self.messages.iter_mut().find(|m| m.id == id)
        {
            message.text.clone_from(&self.accumulated);
            return;
        }

        // First fragment of this reply
        let message = Message::new(self.accumulated.clone(), Source::Assistant);
        self.active_response_id = Some(message.id.clone());
        self.messages.push(message);
    }

    /// The stream finished normally.
    pub fn complete(&mut self) {
        if !self.pending {
            return;
        }
        self.reset_stream();
    }

    /// The stream failed. Any partial reply is kept; one error reply follows it.
    pub fn fail(&mut self) {
        if !self.pending {
            warn!("Ignoring failure reported while idle");
            return;
        }
        self.messages
            .push(Message::new(ERROR_REPLY.to_string(), Source::Assistant));
        self.reset_stream();
    }

    fn reset_stream(&mut self) {
        self.pending = false;
        self.active_response_id = None;
        self.accumulated.clear();
    }

    /// The reply currently receiving fragments, if any.
    pub fn active_response(&self) -> Option<&Message> {
        let id = self.active_response_id.as_deref()?;
        self.messages.iter().find(|m| m.id == id)
    }
}
