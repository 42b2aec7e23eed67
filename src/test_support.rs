//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use crate::core::state::App;
use crate::inference::{ChatSession, ProviderError, StreamChunk};

/// Replays a fixed list of fragments, then completes or fails.
#[derive(Default)]
pub struct ScriptedSession {
    pub fragments: Vec<String>,
    /// When set, the session returns this error after the fragments.
    pub fail_with: Option<String>,
    /// Every prompt received, in order.
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedSession {
    pub fn replying(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn failing_after(fragments: &[&str], error: &str) -> Self {
        Self {
            fail_with: Some(error.to_string()),
            ..Self::replying(fragments)
        }
    }
}

#[async_trait]
impl ChatSession for ScriptedSession {
    async fn send_prompt(
        &self,
        prompt: &str,
        sender: Sender<StreamChunk>,
    ) -> Result<(), ProviderError> {
        self.prompts
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(prompt.to_string());
        for fragment in &self.fragments {
            sender
                .send(StreamChunk::Content(fragment.clone()))
                .await
                .map_err(|_| ProviderError::ChannelClosed)?;
        }
        if let Some(message) = &self.fail_with {
            return Err(ProviderError::Network(message.clone()));
        }
        sender
            .send(StreamChunk::Completed)
            .await
            .map_err(|_| ProviderError::ChannelClosed)
    }
}

/// Creates a test App backed by a session that replies with nothing.
pub fn test_app() -> App {
    test_app_with(Arc::new(ScriptedSession::default()))
}

pub fn test_app_with(session: Arc<dyn ChatSession>) -> App {
    App::new(
        session,
        "scripted".to_string(),
        "test-model".to_string(),
        Vec::new(),
        Vec::new(),
    )
}
