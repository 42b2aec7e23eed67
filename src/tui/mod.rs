//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! - **Loading** (a reply is streaming): draws every ~80ms so the spinner moves.
//! - **Idle**: sleeps up to 500ms, only redraws on events or terminal resize.
//!
//! ## Streaming
//!
//! Each request runs as two tokio tasks. The stream task drives
//! `ChatSession::send_prompt`; the forwarder turns `StreamChunk`s into
//! `Action`s on the std channel the event loop drains. The forwarder emits
//! exactly one terminal action (`ResponseDone` or `ResponseFailed`) per
//! request, even when the stream task dies without saying why.

mod component;
mod components;
mod event;
pub mod highlight;
mod ui;

use log::{debug, info, warn};
use std::io::{self, stdout};
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use tokio::task::JoinHandle;

use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::reminders::{self, Reminder};
use crate::core::snippets::{self, Snippet};
use crate::core::state::App;
use crate::core::view::View;
use crate::inference::{ChatProvider, ChatSession, GeminiProvider, OpenRouterProvider, StreamChunk};
use crate::store::{JsonDirStore, KeyValueStore, load_list, save_list};
use crate::tui::component::EventHandler;
use crate::tui::components::{
    ChatEvent, ChatViewState, ReminderEvent, RemindersViewState, SnippetEvent, SnippetsViewState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub chat: ChatViewState,
    pub snippets: SnippetsViewState,
    pub reminders: RemindersViewState,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            chat: ChatViewState::new(),
            snippets: SnippetsViewState::new(),
            reminders: RemindersViewState::new(),
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        // Kitty keyboard protocol is harmlessly ignored by terminals that lack it
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

fn missing_key(provider: &str, env_var: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{provider} API key is not set (config file or {env_var} env var)"),
    )
}

/// Build a provider from a resolved config's provider name and credentials.
pub fn build_provider(config: &ResolvedConfig) -> io::Result<Arc<dyn ChatProvider>> {
    match config.provider.as_str() {
        "openrouter" => {
            let api_key = config
                .openrouter_api_key
                .clone()
                .ok_or_else(|| missing_key("OpenRouter", "OPENROUTER_API_KEY"))?;
            Ok(Arc::new(OpenRouterProvider::new(
                api_key,
                config.model_name.clone(),
                Some(config.openrouter_base_url.clone()),
            )))
        }
        "gemini" => {
            let api_key = config
                .gemini_api_key
                .clone()
                .ok_or_else(|| missing_key("Gemini", "GEMINI_API_KEY"))?;
            Ok(Arc::new(GeminiProvider::new(
                api_key,
                config.model_name.clone(),
                Some(config.gemini_base_url.clone()),
            )))
        }
        other => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unknown provider: {other} (expected \"gemini\" or \"openrouter\")"),
        )),
    }
}

pub fn run(config: ResolvedConfig) -> io::Result<()> {
    let provider = build_provider(&config)?;
    let session = provider.open_session(&config.system_instruction);

    let store = JsonDirStore::new(&config.data_dir);
    let saved_snippets: Vec<Snippet> = load_list(&store, snippets::STORE_KEY);
    let saved_reminders: Vec<Reminder> = load_list(&store, reminders::STORE_KEY);
    info!(
        "Loaded {} snippets and {} reminders from {}",
        saved_snippets.len(),
        saved_reminders.len(),
        store.dir().display()
    );

    let mut app = App::new(
        session,
        provider.name().to_string(),
        config.model_name.clone(),
        saved_snippets,
        saved_reminders,
    );
    app.view = config.start_view;
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    let start_time = Instant::now();
    let mut needs_redraw = true;

    'event_loop: loop {
        let animating = app.is_loading();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain all pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if let Some(action) = route_event(&app, &mut tui, &event)
                && dispatch(&mut app, &mut tui, &store, &tx, action)
            {
                break 'event_loop;
            }
        }

        // Handle background task actions (streaming responses)
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if dispatch(&mut app, &mut tui, &store, &tx, action) {
                break 'event_loop;
            }
        }
    }

    ratatui::restore();
    Ok(())
}

/// Turns a terminal event into an action for the mounted screen.
pub fn route_event(app: &App, tui: &mut TuiState, event: &TuiEvent) -> Option<Action> {
    match event {
        TuiEvent::ForceQuit => return Some(Action::Quit),
        TuiEvent::Resize => return None,
        TuiEvent::Navigate(view) => return Some(Action::Navigate(*view)),
        _ => {}
    }

    match app.view {
        View::Chat => match tui.chat.handle_event(event)? {
            ChatEvent::Submit(text) => Some(Action::Submit(text)),
        },
        View::Code => match tui.snippets.handle_event(event)? {
            SnippetEvent::New => Some(Action::NewSnippet),
            SnippetEvent::SelectAt(idx) => app
                .snippets
                .snippets
                .get(idx)
                .map(|s| Action::SelectSnippet(s.id.clone())),
            SnippetEvent::Save(draft) => Some(Action::SaveSnippet(draft)),
            SnippetEvent::Delete => Some(Action::DeleteSnippet),
        },
        View::Reminders => match tui.reminders.handle_event(event)? {
            ReminderEvent::Add(text) => Some(Action::AddReminder(text)),
            ReminderEvent::DeleteAt(idx) => app
                .reminders
                .reminders
                .get(idx)
                .map(|r| Action::DeleteReminder(r.id.clone())),
        },
    }
}

/// Applies an action and performs the effect it asks for.
/// Returns true when the app should quit.
pub fn dispatch(
    app: &mut App,
    tui: &mut TuiState,
    store: &dyn KeyValueStore,
    tx: &mpsc::Sender<Action>,
    action: Action,
) -> bool {
    let effect = update(app, action);
    tui.snippets.sync(&app.snippets);

    match effect {
        Effect::None => {}
        Effect::SpawnRequest(prompt) => {
            spawn_request(app.session.clone(), prompt, tx.clone());
        }
        Effect::PersistSnippets => {
            if let Err(e) = save_list(store, snippets::STORE_KEY, &app.snippets.snippets) {
                warn!("Failed to persist snippets: {}", e);
                app.status_message = format!("Failed to save snippets: {e}");
            }
        }
        Effect::PersistReminders => {
            if let Err(e) = save_list(store, reminders::STORE_KEY, &app.reminders.reminders) {
                warn!("Failed to persist reminders: {}", e);
                app.status_message = format!("Failed to save reminders: {e}");
            }
        }
        Effect::Quit => return true,
    }
    false
}

/// Streams one reply into the action channel.
///
/// Returns the forwarder's handle; it finishes right after sending the
/// terminal action.
pub fn spawn_request(
    session: Arc<dyn ChatSession>,
    prompt: String,
    tx: mpsc::Sender<Action>,
) -> JoinHandle<()> {
    info!("Spawning chat request");

    let (chunk_tx, mut chunk_rx) = tokio::sync::mpsc::channel::<StreamChunk>(100);

    tokio::spawn(async move {
        if let Err(e) = session.send_prompt(&prompt, chunk_tx.clone()).await {
            info!("Stream error: {}", e);
            if chunk_tx.send(StreamChunk::Failed(e.to_string())).await.is_err() {
                warn!("Failed to report stream error: forwarder gone");
            }
        }
    });

    tokio::spawn(async move {
        let mut forwarded = 0usize;
        let mut total_len = 0usize;
        let request_start = Instant::now();

        while let Some(chunk) = chunk_rx.recv().await {
            let action = match chunk {
                StreamChunk::Content(text) => {
                    forwarded += 1;
                    total_len += text.len();
                    if tx.send(Action::ResponseChunk(text)).is_err() {
                        warn!("Failed to forward ResponseChunk: receiver dropped");
                        return;
                    }
                    continue;
                }
                StreamChunk::Completed => Action::ResponseDone,
                StreamChunk::Failed(error) => Action::ResponseFailed(error),
            };
            info!(
                "Stream finished after {}ms: {} fragments, {} bytes",
                request_start.elapsed().as_millis(),
                forwarded,
                total_len
            );
            if tx.send(action).is_err() {
                warn!("Failed to send terminal action: receiver dropped");
            }
            return;
        }

        // The stream task ended without a terminal chunk
        warn!("Stream channel closed without completion after {} fragments", forwarded);
        if tx
            .send(Action::ResponseFailed("stream ended before completion".to_string()))
            .is_err()
        {
            warn!("Failed to send ResponseFailed: receiver dropped");
        }
    })
}
