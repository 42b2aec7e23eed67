//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.devdeck/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::view::View;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DeckConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub openrouter: OpenRouterConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub default_provider: Option<String>,
    pub default_model: Option<String>,
    pub system_instruction: Option<String>,
    pub data_dir: Option<String>,
    pub start_view: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OpenRouterConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_PROVIDER: &str = "gemini";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_OPENROUTER_MODEL: &str = "google/gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a helpful and expert developer assistant. \
    Provide clear, concise, and accurate code and explanations. \
    Format code blocks appropriately using markdown.";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub provider: String,
    pub model_name: String,
    pub system_instruction: String,
    pub data_dir: PathBuf,
    pub start_view: View,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
}

/// Values given on the command line. `None` means "not specified".
#[derive(Debug, Default)]
pub struct CliOverrides<'a> {
    pub provider: Option<&'a str>,
    pub model: Option<&'a str>,
    pub data_dir: Option<PathBuf>,
    pub view: Option<&'a str>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.devdeck/`.
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".devdeck"))
}

/// Returns the path to `~/.devdeck/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    home_dir().map(|d| d.join("config.toml"))
}

/// Load config from `~/.devdeck/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `DeckConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<DeckConfig, ConfigError> {
    let Some(path) = config_path() else {
        warn!("Could not determine home directory, using default config");
        return Ok(DeckConfig::default());
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(DeckConfig::default());
    }

    load_config_from(&path)
}

/// Parse a config file at an explicit path.
pub fn load_config_from(path: &Path) -> Result<DeckConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: DeckConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# devdeck configuration
# All settings are optional. Override order: defaults → this file → env vars → CLI flags.

# [general]
# default_provider = "gemini"          # "gemini" or "openrouter"
# default_model = "gemini-2.5-flash"
# system_instruction = "You are a helpful and expert developer assistant."
# data_dir = "/home/me/.devdeck/data"  # where snippets.json / reminders.json live
# start_view = "chat"                  # "chat", "code" or "reminders"

# [gemini]
# api_key = "..."                      # Or set GEMINI_API_KEY (API_KEY also works)
# base_url = "https://generativelanguage.googleapis.com/v1beta"

# [openrouter]
# api_key = "sk-or-..."                # Or set OPENROUTER_API_KEY
# base_url = "https://openrouter.ai/api/v1"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &DeckConfig, cli: CliOverrides<'_>) -> ResolvedConfig {
    resolve_with_env(config, cli, |name| std::env::var(name).ok())
}

/// Same as [`resolve`], reading environment variables through `env`.
pub fn resolve_with_env(
    config: &DeckConfig,
    cli: CliOverrides<'_>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Provider: CLI → env → config → default
    let provider = cli
        .provider
        .map(str::to_string)
        .or_else(|| env("DEVDECK_PROVIDER"))
        .or_else(|| config.general.default_provider.clone())
        .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());

    let fallback_model = if provider == "openrouter" {
        DEFAULT_OPENROUTER_MODEL
    } else {
        DEFAULT_GEMINI_MODEL
    };

    // Model: CLI → env → config → provider default
    let model_name = cli
        .model
        .map(str::to_string)
        .or_else(|| env("DEVDECK_MODEL"))
        .or_else(|| config.general.default_model.clone())
        .unwrap_or_else(|| fallback_model.to_string());

    let system_instruction = config
        .general
        .system_instruction
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SYSTEM_INSTRUCTION.to_string());

    // Data dir: CLI → config → ~/.devdeck/data → ./.devdeck-data
    let data_dir = cli
        .data_dir
        .or_else(|| config.general.data_dir.as_ref().map(PathBuf::from))
        .or_else(|| home_dir().map(|d| d.join("data")))
        .unwrap_or_else(|| PathBuf::from(".devdeck-data"));

    // Start view: CLI → config → chat. Unknown ids also land on chat.
    let start_view = cli
        .view
        .or(config.general.start_view.as_deref())
        .map(View::from_id)
        .unwrap_or_default();

    // Gemini API key: env → config. API_KEY is what the web build used.
    let gemini_api_key = env("GEMINI_API_KEY")
        .or_else(|| env("API_KEY"))
        .or_else(|| config.gemini.api_key.clone());

    let gemini_base_url = env("GEMINI_BASE_URL")
        .or_else(|| config.gemini.base_url.clone())
        .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());

    let openrouter_api_key =
        env("OPENROUTER_API_KEY").or_else(|| config.openrouter.api_key.clone());

    let openrouter_base_url = env("OPENROUTER_BASE_URL")
        .or_else(|| config.openrouter.base_url.clone())
        .unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.to_string());

    debug!("Resolved provider={} model={} data_dir={}", provider, model_name, data_dir.display());

    ResolvedConfig {
        provider,
        model_name,
        system_instruction,
        data_dir,
        start_view,
        gemini_api_key,
        gemini_base_url,
        openrouter_api_key,
        openrouter_base_url,
    }
}
