//! OpenRouter provider implementation using the Responses API.
//!
//! This module uses OpenAI Responses API terminology:
//! - "input" (array of messages, the system instruction first)
//! - "role" (system / user / assistant)
//! - SSE events: response.output_text.delta, response.completed, response.failed
//!
//! The Responses API is stateless, so each prompt carries the whole session
//! history.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;

use crate::inference::sse::{SseLine, SseReader, parse_line};
use crate::inference::{
    ChatProvider, ChatSession, History, ProviderError, Role as TurnRole, StreamChunk, Turn,
};

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

// ============================================================================
// OpenRouter Responses API Types
// ============================================================================

/// Role in an input message (OpenAI terminology)
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
enum Role {
    System,
    User,
    Assistant,
}

#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename = "message")]
struct InputMessage {
    role: Role,
    content: String,
}

/// The request body for the Responses API
#[derive(Serialize, Debug)]
struct ResponsesRequest {
    model: String,
    input: Vec<InputMessage>,
    stream: bool,
}

/// Generic SSE event wrapper to extract the type field.
/// OpenRouter embeds the event type inside the JSON as well as in `event:` lines.
#[derive(Deserialize, Debug)]
struct SseEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    delta: String,
    /// Set on top-level `error` events.
    #[serde(default)]
    message: Option<String>,
    /// Set on `response.failed`.
    #[serde(default)]
    response: Option<ResponseBody>,
}

#[derive(Deserialize, Debug)]
struct ResponseBody {
    #[serde(default)]
    error: Option<ResponseError>,
}

#[derive(Deserialize, Debug)]
struct ResponseError {
    #[serde(default)]
    message: String,
}

impl SseEvent {
    fn failure_message(&self) -> String {
        self.message
            .clone()
            .or_else(|| {
                self.response
                    .as_ref()
                    .and_then(|r| r.error.as_ref())
                    .map(|e| e.message.clone())
            })
            .unwrap_or_else(|| self.event_type.clone())
    }
}

// ============================================================================
// Translation Layer
// ============================================================================

/// System instruction first, then the session turns.
fn turns_to_input(system_instruction: &str, turns: &[Turn]) -> Vec<InputMessage> {
    std::iter::once(InputMessage {
        role: Role::System,
        content: system_instruction.to_string(),
    })
    .chain(turns.iter().map(|turn| InputMessage {
        role: match turn.role {
            TurnRole::User => Role::User,
            TurnRole::Model => Role::Assistant,
        },
        content: turn.text.clone(),
    }))
    .collect()
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// OpenRouter API provider using Responses API
pub struct OpenRouterProvider {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OpenRouterProvider {
    /// Creates a new OpenRouter provider.
    ///
    /// # Arguments
    /// * `api_key` - OpenRouter API key
    /// * `model` - Model slug, e.g. `google/gemini-2.5-flash`
    /// * `base_url` - Optional custom base URL (defaults to OpenRouter's API)
    pub fn new(api_key: String, model: String, base_url: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model,
            client: reqwest::Client::new(),
        }
    }
}

impl ChatProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    fn open_session(&self, system_instruction: &str) -> Arc<dyn ChatSession> {
        info!("Opening OpenRouter session (model={})", self.model);
        Arc::new(OpenRouterSession {
            api_key: self.api_key.clone(),
            url: format!("{}/responses", self.base_url.trim_end_matches('/')),
            model: self.model.clone(),
            client: self.client.clone(),
            system_instruction: system_instruction.to_string(),
            history: History::default(),
        })
    }
}

pub struct OpenRouterSession {
    api_key: String,
    url: String,
    model: String,
    client: reqwest::Client,
    system_instruction: String,
    history: History,
}

impl OpenRouterSession {
    /// Sends a request to the Responses endpoint and returns the response.
    async fn send_request(
        &self,
        request: &ResponsesRequest,
    ) -> Result<reqwest::Response, ProviderError> {
        let json_body = serde_json::to_string(request)
            .map_err(|e| ProviderError::Parse(format!("Request serialization failed: {e}")))?;
        debug!("Raw OpenRouter request: {}", json_body);

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .body(json_body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        debug!("OpenRouter response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("OpenRouter API error: {} - {}", status, err_body);
            return Err(ProviderError::Api {
                status,
                message: err_body,
            });
        }

        Ok(response)
    }

    /// Streams one reply and returns its full text.
    async fn stream_reply(
        &self,
        turns: &[Turn],
        sender: &Sender<StreamChunk>,
    ) -> Result<String, ProviderError> {
        let request = ResponsesRequest {
            model: self.model.clone(),
            input: turns_to_input(&self.system_instruction, turns),
            stream: true,
        };
        info!(
            "OpenRouter Responses API request: model={}, input_count={}",
            request.model,
            request.input.len()
        );

        let response = self.send_request(&request).await?;
        let status = response.status().as_u16();
        let mut reader = SseReader::new(Box::pin(response.bytes_stream()));

        let mut reply = String::new();
        let mut chunk_count = 0usize;
        let mut current_event_type: Option<String> = None;

        while let Some(line) = reader.next_line().await? {
            let data = match parse_line(&line) {
                SseLine::Event(event_type) => {
                    current_event_type = Some(event_type.to_string());
                    continue;
                }
                SseLine::Blank => {
                    current_event_type = None;
                    continue;
                }
                SseLine::Other => continue,
                SseLine::Data(data) => data,
            };
            if data == "[DONE]" {
                debug!("Received [DONE] marker");
                continue;
            }

            let Ok(event) = serde_json::from_str::<SseEvent>(data) else {
                debug!("Could not parse event from data: {}", data);
                continue;
            };
            let event_type = current_event_type
                .take()
                .unwrap_or_else(|| event.event_type.clone());

            match event_type.as_str() {
                "response.output_text.delta" => {
                    if event.delta.is_empty() {
                        continue;
                    }
                    chunk_count += 1;
                    reply.push_str(&event.delta);
                    if sender.send(StreamChunk::Content(event.delta)).await.is_err() {
                        warn!("Content chunk send failed: receiver dropped");
                        return Err(ProviderError::ChannelClosed);
                    }
                }
                "response.completed" => {
                    info!(
                        "Stream complete: {} chunks, {} content bytes",
                        chunk_count,
                        reply.len()
                    );
                    return Ok(reply);
                }
                "response.failed" | "error" => {
                    let message = event.failure_message();
                    warn!("OpenRouter stream error: {}", message);
                    return Err(ProviderError::Api { status, message });
                }
                other => {
                    // response.created, response.in_progress, etc.
                    debug!("Ignoring event type '{}': {} bytes", other, data.len());
                }
            }
        }

        warn!(
            "Stream ended without response.completed after {} chunks",
            chunk_count
        );
        Err(ProviderError::Incomplete)
    }
}

#[async_trait]
impl ChatSession for OpenRouterSession {
    async fn send_prompt(
        &self,
        prompt: &str,
        sender: Sender<StreamChunk>,
    ) -> Result<(), ProviderError> {
        let turns = self.history.with_prompt(prompt);
        let reply = self.stream_reply(&turns, &sender).await?;
        self.history.record(prompt, reply);
        sender
            .send(StreamChunk::Completed)
            .await
            .map_err(|_| ProviderError::ChannelClosed)
    }
}
