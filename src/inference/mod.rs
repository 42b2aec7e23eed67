pub mod provider;
pub mod providers;
pub mod sse;

pub use provider::{ChatProvider, ChatSession, History, ProviderError, Role, StreamChunk, Turn};
pub use providers::{GeminiProvider, OpenRouterProvider};
