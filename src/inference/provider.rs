use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

/// Errors that can occur while streaming a reply.
#[derive(Debug)]
pub enum ProviderError {
    /// Provider misconfigured (missing API key, bad URL).
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused, broken body).
    Network(String),
    /// The service answered with an error, either as an HTTP status or inside the stream.
    Api { status: u16, message: String },
    /// Failed to parse the provider's response.
    Parse(String),
    /// The stream ended before the service signalled completion.
    Incomplete,
    /// The mpsc channel was closed (TUI dropped the receiver).
    ChannelClosed,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Config(msg) => write!(f, "config error: {msg}"),
            ProviderError::Network(msg) => write!(f, "network error: {msg}"),
            ProviderError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ProviderError::Parse(msg) => write!(f, "parse error: {msg}"),
            ProviderError::Incomplete => write!(f, "stream ended before completion"),
            ProviderError::ChannelClosed => write!(f, "channel closed"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// What travels from a streaming session to the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    /// The next fragment of reply text.
    Content(String),
    /// The reply finished normally.
    Completed,
    /// The reply failed. Sent by the caller when `send_prompt` returns an error.
    Failed(String),
}

/// Who spoke a remembered turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Completed prompt/reply pairs of one session. Failed turns are never recorded.
#[derive(Debug, Default)]
pub struct History {
    turns: Mutex<Vec<Turn>>,
}

impl History {
    /// Prior turns followed by `prompt`, ready to send.
    pub fn with_prompt(&self, prompt: &str) -> Vec<Turn> {
        let mut turns = self
            .turns
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        turns.push(Turn::user(prompt));
        turns
    }

    pub fn record(&self, prompt: &str, reply: String) {
        let mut turns = self
            .turns
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        turns.push(Turn::user(prompt));
        turns.push(Turn::model(reply));
    }

    pub fn len(&self) -> usize {
        self.turns
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Opens conversations with a remote model.
pub trait ChatProvider: Send + Sync {
    /// Returns the name of the provider.
    fn name(&self) -> &str;

    /// Starts a conversation governed by `system_instruction`.
    fn open_session(&self, system_instruction: &str) -> Arc<dyn ChatSession>;
}

/// One open conversation.
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Sends `prompt` and streams the reply into `sender`, in order, ending with
    /// [`StreamChunk::Completed`] on success. On error nothing terminal is sent;
    /// the caller reports the failure.
    async fn send_prompt(
        &self,
        prompt: &str,
        sender: Sender<StreamChunk>,
    ) -> Result<(), ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_appends_prompt_without_recording_it() {
        let history = History::default();
        let turns = history.with_prompt("hi");
        assert_eq!(turns, vec![Turn::user("hi")]);
        assert!(history.is_empty());
    }

    #[test]
    fn test_history_records_pairs_in_order() {
        let history = History::default();
        history.record("one", "first".to_string());
        history.record("two", "second".to_string());
        assert_eq!(
            history.with_prompt("three"),
            vec![
                Turn::user("one"),
                Turn::model("first"),
                Turn::user("two"),
                Turn::model("second"),
                Turn::user("three"),
            ]
        );
    }

    #[test]
    fn test_error_display() {
        let err = ProviderError::Api {
            status: 429,
            message: "slow down".to_string(),
        };
        assert_eq!(err.to_string(), "API error (HTTP 429): slow down");
        assert_eq!(
            ProviderError::Incomplete.to_string(),
            "stream ended before completion"
        );
    }
}
