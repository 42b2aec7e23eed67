use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use devdeck::Provider;
use devdeck::core::config;
use devdeck::tui;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "devdeck", about = "AI chat, code snippets and reminders in your terminal")]
struct Args {
    /// LLM provider to use (overrides config and DEVDECK_PROVIDER)
    #[arg(short, long, value_enum)]
    provider: Option<Provider>,

    /// Model name (overrides config and DEVDECK_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Directory holding the persisted snippet and reminder lists
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Screen to open on: chat, code or reminders
    #[arg(long)]
    view: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // File logger: the terminal belongs to the TUI
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("devdeck.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("Ignoring config file: {}", e);
        config::DeckConfig::default()
    });
    let overrides = config::CliOverrides {
        provider: args.provider.as_ref().map(|p| p.config_name()),
        model: args.model.as_deref(),
        data_dir: args.data_dir,
        view: args.view.as_deref(),
    };
    let resolved = config::resolve(&file_config, overrides);

    log::info!(
        "devdeck starting up with provider: {} (model: {})",
        resolved.provider,
        resolved.model_name
    );

    tui::run(resolved)
}
