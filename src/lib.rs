//! devdeck library exports for testing

use clap::ValueEnum;

pub mod core;
pub mod inference;
pub mod store;
pub mod tui;

#[cfg(test)]
pub mod test_support;

#[derive(Clone, Debug, Default, PartialEq, ValueEnum)]
pub enum Provider {
    #[default]
    Gemini,
    OpenRouter,
}

impl Provider {
    /// Name used in the config file and `DEVDECK_PROVIDER`.
    pub fn config_name(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenRouter => "openrouter",
        }
    }
}
