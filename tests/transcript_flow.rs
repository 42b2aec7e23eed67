//! End-to-end chat flow: reducer, request spawning, chunk forwarding.

use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

use async_trait::async_trait;
use devdeck::core::action::{Action, Effect, update};
use devdeck::core::chat::{ERROR_REPLY, GREETING, Source};
use devdeck::core::state::App;
use devdeck::inference::{ChatSession, ProviderError, StreamChunk};
use devdeck::store::MemoryStore;
use devdeck::tui::{TuiState, dispatch, spawn_request};
use tokio::sync::mpsc::Sender;

// ============================================================================
// Helper Functions
// ============================================================================

enum Ending {
    Complete,
    Fail(&'static str),
    /// Return Ok without ever sending `Completed`.
    Silent,
}

struct Scripted {
    fragments: Vec<&'static str>,
    ending: Ending,
    prompts: Mutex<Vec<String>>,
}

impl Scripted {
    fn new(fragments: &[&'static str], ending: Ending) -> Arc<Self> {
        Arc::new(Self {
            fragments: fragments.to_vec(),
            ending,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatSession for Scripted {
    async fn send_prompt(
        &self,
        prompt: &str,
        sender: Sender<StreamChunk>,
    ) -> Result<(), ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        for fragment in &self.fragments {
            sender
                .send(StreamChunk::Content(fragment.to_string()))
                .await
                .map_err(|_| ProviderError::ChannelClosed)?;
            tokio::task::yield_now().await;
        }
        match self.ending {
            Ending::Complete => sender
                .send(StreamChunk::Completed)
                .await
                .map_err(|_| ProviderError::ChannelClosed),
            Ending::Fail(message) => Err(ProviderError::Api {
                status: 500,
                message: message.to_string(),
            }),
            Ending::Silent => Ok(()),
        }
    }
}

fn app_with(session: Arc<dyn ChatSession>) -> App {
    App::new(
        session,
        "scripted".to_string(),
        "test-model".to_string(),
        Vec::new(),
        Vec::new(),
    )
}

/// Runs one prompt through `spawn_request` and returns every action it produced.
async fn stream_actions(session: Arc<dyn ChatSession>, prompt: &str) -> Vec<Action> {
    let (tx, rx) = mpsc::channel();
    spawn_request(session, prompt.to_string(), tx)
        .await
        .expect("forwarder task panicked");
    rx.try_iter().collect()
}

fn is_terminal(action: &Action) -> bool {
    matches!(action, Action::ResponseDone | Action::ResponseFailed(_))
}

// ============================================================================
// Forwarding
// ============================================================================

#[tokio::test]
async fn test_fragments_forwarded_in_order_then_done() {
    let session = Scripted::new(&["a", "b", "c"], Ending::Complete);
    let actions = stream_actions(session.clone(), "hi").await;

    assert_eq!(
        actions,
        vec![
            Action::ResponseChunk("a".to_string()),
            Action::ResponseChunk("b".to_string()),
            Action::ResponseChunk("c".to_string()),
            Action::ResponseDone,
        ]
    );
    assert_eq!(session.prompts(), vec!["hi"]);
}

#[tokio::test]
async fn test_provider_error_becomes_single_failure() {
    let session = Scripted::new(&["partial"], Ending::Fail("overloaded"));
    let actions = stream_actions(session, "hi").await;

    assert_eq!(actions.iter().filter(|a| is_terminal(a)).count(), 1);
    assert_eq!(actions[0], Action::ResponseChunk("partial".to_string()));
    match actions.last() {
        Some(Action::ResponseFailed(message)) => assert!(message.contains("overloaded")),
        other => panic!("expected ResponseFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_completion_is_reported_as_failure() {
    let session = Scripted::new(&["x"], Ending::Silent);
    let actions = stream_actions(session, "hi").await;

    assert_eq!(actions.iter().filter(|a| is_terminal(a)).count(), 1);
    assert!(matches!(actions.last(), Some(Action::ResponseFailed(_))));
}

// ============================================================================
// Reducer + Stream
// ============================================================================

#[tokio::test]
async fn test_streamed_reply_grows_one_message() {
    let session = Scripted::new(&["Hel", "lo"], Ending::Complete);
    let mut app = app_with(session.clone());

    let effect = update(&mut app, Action::Submit("  @  say hello ".to_string()));
    let Effect::SpawnRequest(prompt) = effect else {
        panic!("expected SpawnRequest, got {effect:?}");
    };
    assert_eq!(prompt, "say hello");

    for action in stream_actions(session.clone(), &prompt).await {
        update(&mut app, action);
    }

    let texts: Vec<&str> = app.chat.messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec![GREETING, "@  say hello", "Hello"]);
    assert_eq!(app.chat.messages[2].sender, Source::Assistant);
    assert!(!app.is_loading());
    assert_eq!(session.prompts(), vec!["say hello"]);
}

#[tokio::test]
async fn test_failed_reply_keeps_partial_and_appends_error() {
    let session = Scripted::new(&["half an ans"], Ending::Fail("boom"));
    let mut app = app_with(session.clone());

    let Effect::SpawnRequest(prompt) = update(&mut app, Action::Submit("@ q".to_string())) else {
        panic!("expected SpawnRequest");
    };
    for action in stream_actions(session, &prompt).await {
        update(&mut app, action);
    }

    let texts: Vec<&str> = app.chat.messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec![GREETING, "@ q", "half an ans", ERROR_REPLY]);
    assert!(!app.is_loading());
    assert!(app.status_message.starts_with("Error:"));
}

#[tokio::test]
async fn test_plain_text_never_reaches_the_session() {
    let session = Scripted::new(&["unused"], Ending::Complete);
    let mut app = app_with(session.clone());

    assert_eq!(update(&mut app, Action::Submit("just notes".to_string())), Effect::None);
    assert!(session.prompts().is_empty());
    assert_eq!(app.chat.messages.len(), 2);
}

#[tokio::test]
async fn test_dispatch_loop_runs_request_to_completion() {
    let session = Scripted::new(&["one ", "two"], Ending::Complete);
    let mut app = app_with(session.clone());
    let mut tui = TuiState::new();
    let store = MemoryStore::default();
    let (tx, rx) = mpsc::channel();

    assert!(!dispatch(&mut app, &mut tui, &store, &tx, Action::Submit("@ count".to_string())));
    assert!(app.is_loading());

    // A second trigger while streaming is dropped
    dispatch(&mut app, &mut tui, &store, &tx, Action::Submit("@ again".to_string()));

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while app.is_loading() {
        assert!(tokio::time::Instant::now() < deadline, "stream never finished");
        while let Ok(action) = rx.try_recv() {
            dispatch(&mut app, &mut tui, &store, &tx, action);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert_eq!(app.chat.messages.last().unwrap().text, "one two");
    assert_eq!(app.status_message, "Ready");
    assert_eq!(session.prompts(), vec!["count"]);
}
