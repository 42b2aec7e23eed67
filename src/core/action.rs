//! # Actions
//!
//! Everything that can happen in devdeck becomes an `Action`.
//! User presses Enter in the chat box? That's `Action::Submit(text)`.
//! A fragment arrives from the model? That's `Action::ResponseChunk(text)`.
//!
//! `update()` applies an action to the state and returns an [`Effect`]
//! describing the I/O the adapter should perform. No side effects here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use log::{debug, info, warn};

use crate::core::snippets::SnippetDraft;
use crate::core::state::App;
use crate::core::view::View;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Raw text from the chat input.
    Submit(String),
    /// Next streamed fragment of the in-flight reply.
    ResponseChunk(String),
    /// The stream finished normally.
    ResponseDone,
    /// The stream failed; carries the error for the status bar.
    ResponseFailed(String),
    Navigate(View),
    NewSnippet,
    SelectSnippet(String),
    SaveSnippet(SnippetDraft),
    DeleteSnippet,
    AddReminder(String),
    DeleteReminder(String),
    Quit,
}

/// I/O requested by a state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Send this prompt through the chat session.
    SpawnRequest(String),
    PersistSnippets,
    PersistReminders,
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Submit(text) => match app.chat.submit(&text) {
            Some(prompt) => {
                info!("Triggered prompt ({} bytes)", prompt.len());
                app.status_message = "Thinking...".to_string();
                Effect::SpawnRequest(prompt)
            }
            None => Effect::None,
        },
        Action::ResponseChunk(fragment) => {
            app.chat.apply_fragment(&fragment);
            Effect::None
        }
        Action::ResponseDone => {
            if app.chat.pending {
                app.status_message = "Ready".to_string();
            }
            app.chat.complete();
            Effect::None
        }
        Action::ResponseFailed(error) => {
            if app.chat.pending {
                warn!("Reply failed: {}", error);
                app.status_message = format!("Error: {}", error);
            }
            app.chat.fail();
            Effect::None
        }
        Action::Navigate(view) => {
            debug!("Navigate {} -> {}", app.view, view);
            app.view = view;
            Effect::None
        }
        Action::NewSnippet => {
            app.snippets.start_new();
            Effect::None
        }
        Action::SelectSnippet(id) => {
            if !app.snippets.select(&id) {
                warn!("Select ignored: no snippet with id {}", id);
            }
            Effect::None
        }
        Action::SaveSnippet(draft) => {
            if app.snippets.save(draft) {
                app.status_message = "Snippet saved".to_string();
                Effect::PersistSnippets
            } else {
                Effect::None
            }
        }
        Action::DeleteSnippet => {
            if app.snippets.delete_selected() {
                app.status_message = "Snippet deleted".to_string();
                Effect::PersistSnippets
            } else {
                Effect::None
            }
        }
        Action::AddReminder(text) => {
            if app.reminders.add(&text) {
                Effect::PersistReminders
            } else {
                Effect::None
            }
        }
        Action::DeleteReminder(id) => {
            if app.reminders.delete(&id) {
                Effect::PersistReminders
            } else {
                Effect::None
            }
        }
        Action::Quit => Effect::Quit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chat::ERROR_REPLY;
    use crate::core::snippets::Language;
    use crate::test_support::test_app;

    #[test]
    fn test_submit_trigger_spawns_request() {
        let mut app = test_app();
        let effect = update(&mut app, Action::Submit("@ hello".to_string()));
        assert_eq!(effect, Effect::SpawnRequest("hello".to_string()));
        assert!(app.is_loading());
        assert_eq!(app.status_message, "Thinking...");
    }

    #[test]
    fn test_submit_plain_text_has_no_effect() {
        let mut app = test_app();
        let effect = update(&mut app, Action::Submit("note to self".to_string()));
        assert_eq!(effect, Effect::None);
        assert!(!app.is_loading());
        assert_eq!(app.chat.messages.len(), 2);
    }

    #[test]
    fn test_submit_while_loading_is_ignored() {
        let mut app = test_app();
        update(&mut app, Action::Submit("@ one".to_string()));
        let effect = update(&mut app, Action::Submit("@ two".to_string()));
        assert_eq!(effect, Effect::None);
        assert_eq!(app.chat.messages.len(), 2);
    }

    #[test]
    fn test_stream_then_done() {
        let mut app = test_app();
        update(&mut app, Action::Submit("@ hi".to_string()));
        update(&mut app, Action::ResponseChunk("Hel".to_string()));
        update(&mut app, Action::ResponseChunk("lo".to_string()));
        update(&mut app, Action::ResponseDone);
        assert!(!app.is_loading());
        assert_eq!(app.chat.messages.last().unwrap().text, "Hello");
        assert_eq!(app.status_message, "Ready");
    }

    #[test]
    fn test_failure_appends_error_reply() {
        let mut app = test_app();
        update(&mut app, Action::Submit("@ hi".to_string()));
        update(&mut app, Action::ResponseFailed("boom".to_string()));
        assert!(!app.is_loading());
        assert_eq!(app.chat.messages.last().unwrap().text, ERROR_REPLY);
        assert_eq!(app.status_message, "Error: boom");
    }

    #[test]
    fn test_late_failure_is_ignored() {
        let mut app = test_app();
        update(&mut app, Action::ResponseFailed("stray".to_string()));
        assert_eq!(app.chat.messages.len(), 1);
        assert_ne!(app.status_message, "Error: stray");
    }

    #[test]
    fn test_navigate_replaces_view_only() {
        let mut app = test_app();
        update(&mut app, Action::Submit("@ hi".to_string()));
        let effect = update(&mut app, Action::Navigate(View::Reminders));
        assert_eq!(effect, Effect::None);
        assert_eq!(app.view, View::Reminders);
        assert!(app.is_loading());
    }

    #[test]
    fn test_snippet_lifecycle_persists_on_change() {
        let mut app = test_app();
        update(&mut app, Action::NewSnippet);
        let draft = SnippetDraft {
            title: "Foo".to_string(),
            language: Language::Shell,
            code: "ls".to_string(),
        };
        assert_eq!(
            update(&mut app, Action::SaveSnippet(draft)),
            Effect::PersistSnippets
        );
        assert_eq!(app.snippets.snippets[0].title, "Foo");

        let blank = SnippetDraft::default();
        assert_eq!(update(&mut app, Action::SaveSnippet(blank)), Effect::None);

        assert_eq!(update(&mut app, Action::DeleteSnippet), Effect::PersistSnippets);
        assert!(app.snippets.snippets.is_empty());
        assert_eq!(update(&mut app, Action::DeleteSnippet), Effect::None);
    }

    #[test]
    fn test_reminders_persist_on_change() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::AddReminder("  ".to_string())), Effect::None);
        assert_eq!(
            update(&mut app, Action::AddReminder("buy milk".to_string())),
            Effect::PersistReminders
        );
        let id = app.reminders.reminders[0].id.clone();
        assert_eq!(update(&mut app, Action::DeleteReminder(id)), Effect::PersistReminders);
        assert!(app.reminders.is_empty());
    }

    #[test]
    fn test_quit() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Quit), Effect::Quit);
    }
}
