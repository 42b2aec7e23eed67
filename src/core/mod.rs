//! # Core Application Logic
//!
//! devdeck's business logic. It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │ inference  │      │   store    │
//!     │  Adapter   │      │ (Gemini,   │      │ (JSON dir, │
//!     │ (ratatui)  │      │ OpenRouter)│      │  memory)   │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`chat`]: The transcript engine (submit, stream, complete, fail)
//! - [`snippets`] / [`reminders`]: The two persisted lists
//! - [`view`]: Which screen is mounted
//! - [`fence`]: Code-fence segmentation for rendering
//! - [`config`]: Settings resolution

pub mod action;
pub mod chat;
pub mod config;
pub mod fence;
pub mod reminders;
pub mod snippets;
pub mod state;
pub mod view;
