//! Gemini provider using the `streamGenerateContent` endpoint in SSE mode.
//!
//! This module uses Gemini API terminology:
//! - "contents" (the conversation, each entry has a "role" and "parts")
//! - "model" (the assistant role)
//! - "systemInstruction" (sent alongside, never inside, the contents)
//!
//! Every `data:` line is a complete `GenerateContentResponse`. A candidate
//! carrying `finishReason` marks the end of the reply.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;

use crate::inference::sse::{SseLine, SseReader, parse_line};
use crate::inference::{
    ChatProvider, ChatSession, History, ProviderError, Role, StreamChunk, Turn,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ============================================================================
// Gemini API Types
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct StreamResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

/// Wrapper for error bodies returned with a non-2xx status.
#[derive(Deserialize, Debug)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

// ============================================================================
// Translation Layer
// ============================================================================

fn turns_to_contents(turns: &[Turn]) -> Vec<Content> {
    turns
        .iter()
        .map(|turn| {
            let role = match turn.role {
                Role::User => "user",
                Role::Model => "model",
            };
            Content::text(Some(role), &turn.text)
        })
        .collect()
}

fn build_request(system_instruction: &str, turns: &[Turn]) -> GenerateContentRequest {
    GenerateContentRequest {
        system_instruction: Content::text(None, system_instruction),
        contents: turns_to_contents(turns),
    }
}

fn stream_url(base_url: &str, model: &str) -> String {
    format!(
        "{}/models/{}:streamGenerateContent?alt=sse",
        base_url.trim_end_matches('/'),
        model
    )
}

/// Pulls a readable message out of an error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Google Gemini API provider
pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider.
    ///
    /// # Arguments
    /// * `api_key` - Gemini API key
    /// * `model` - Model name, e.g. `gemini-2.5-flash`
    /// * `base_url` - Optional custom base URL (defaults to the public v1beta API)
    pub fn new(api_key: String, model: String, base_url: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model,
            client: reqwest::Client::new(),
        }
    }
}

impl ChatProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn open_session(&self, system_instruction: &str) -> Arc<dyn ChatSession> {
        info!("Opening Gemini session (model={})", self.model);
        Arc::new(GeminiSession {
            api_key: self.api_key.clone(),
            url: stream_url(&self.base_url, &self.model),
            client: self.client.clone(),
            system_instruction: system_instruction.to_string(),
            history: History::default(),
        })
    }
}

pub struct GeminiSession {
    api_key: String,
    url: String,
    client: reqwest::Client,
    system_instruction: String,
    history: History,
}

impl GeminiSession {
    async fn send_request(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<reqwest::Response, ProviderError> {
        let json_body = serde_json::to_string(request)
            .map_err(|e| ProviderError::Parse(format!("Request serialization failed: {e}")))?;
        debug!("Raw Gemini request: {}", json_body);

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .body(json_body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        debug!("Gemini response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Gemini API error: {} - {}", status, err_body);
            return Err(ProviderError::Api {
                status,
                message: error_message(&err_body),
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
        let request = build_request(&self.system_instruction, turns);
        info!("Gemini request: contents={}", request.contents.len());

        let response = self.send_request(&request).await?;
        let status = response.status().as_u16();
        let mut reader = SseReader::new(Box::pin(response.bytes_stream()));

        let mut reply = String::new();
        let mut chunk_count = 0usize;

        while let Some(line) = reader.next_line().await? {
            let SseLine::Data(data) = parse_line(&line) else {
                continue;
            };
            let event: StreamResponse = serde_json::from_str(data)
                .map_err(|e| ProviderError::Parse(format!("{e}: {data}")))?;

            if let Some(error) = event.error {
                warn!("Gemini stream error: {} - {}", error.code, error.message);
                return Err(ProviderError::Api {
                    status: if error.code == 0 { status } else { error.code },
                    message: error.message,
                });
            }
            if let Some(reason) = event.prompt_feedback.and_then(|f| f.block_reason) {
                warn!("Gemini blocked the prompt: {}", reason);
                return Err(ProviderError::Api {
                    status,
                    message: format!("prompt blocked: {reason}"),
                });
            }

            let mut finished = false;
            for candidate in event.candidates {
                let texts = candidate
                    .content
                    .into_iter()
                    .flat_map(|c| c.parts)
                    .filter_map(|p| p.text)
                    .filter(|t| !t.is_empty());
                for text in texts {
                    chunk_count += 1;
                    reply.push_str(&text);
                    if sender.send(StreamChunk::Content(text)).await.is_err() {
                        warn!("Content chunk send failed: receiver dropped");
                        return Err(ProviderError::ChannelClosed);
                    }
                }
                if let Some(reason) = candidate.finish_reason {
                    if reason != "STOP" {
                        warn!("Gemini finished with reason {}", reason);
                    }
                    finished = true;
                }
            }

            if finished {
                info!(
                    "Stream complete: {} chunks, {} content bytes",
                    chunk_count,
                    reply.len()
                );
                return Ok(reply);
            }
        }

        warn!(
            "Stream ended without finishReason after {} chunks",
            chunk_count
        );
        Err(ProviderError::Incomplete)
    }
}

#[async_trait]
impl ChatSession for GeminiSession {
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
