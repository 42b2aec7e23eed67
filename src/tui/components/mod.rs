//! # TUI Components
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Created fresh each frame from the data they display:
//! - `TitleBar`: provider, model and status message
//! - `Sidebar`: navigation between the three screens
//! - `Message`: a single transcript entry
//!
//! ### Stateful Components (Event-Driven)
//!
//! A `*State` struct lives in `TuiState` and implements `EventHandler`; a
//! short-lived view struct borrows it together with the core data to render:
//! - `ChatViewState` / `ChatView`: scrolling transcript plus prompt box
//! - `SnippetsViewState` / `SnippetsView`: snippet list and editor
//! - `RemindersViewState` / `RemindersView`: reminder input and list
//! - `InputBox`: the text field shared by all three screens
//!
//! Screens never touch `App` directly. They emit events that the run loop
//! turns into `Action`s.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs
//! ├── title_bar.rs
//! ├── sidebar.rs
//! ├── message.rs
//! ├── chat_view.rs
//! ├── snippets_view.rs
//! ├── reminders_view.rs
//! └── input_box/
//! ```

mod title_bar;
pub use title_bar::TitleBar;

mod sidebar;
pub use sidebar::{SIDEBAR_WIDTH, Sidebar};

pub mod input_box;
pub mod message;

pub mod chat_view;
pub use chat_view::{ChatEvent, ChatView, ChatViewState};
pub mod snippets_view;
pub use snippets_view::{SnippetEvent, SnippetsView, SnippetsViewState};
pub mod reminders_view;
pub use reminders_view::{ReminderEvent, RemindersView, RemindersViewState};
