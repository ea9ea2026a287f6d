use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qai_cli::config::Config;
use qai_cli::llm::create_gateway;
use qai_cli::storage::ArchitectStorage;
use qai_cli::tui::{self, App};

#[derive(Parser)]
#[command(name = "qai")]
#[command(author, version, about = "QAI - prompt architecting chat in the terminal", long_about = None)]
struct Cli {
    /// Message to send as soon as the chat opens
    message: Option<String>,

    /// Model to use (e.g., gemini-2.5-flash, gemini-2.5-pro)
    #[arg(short, long)]
    model: Option<String>,

    /// Data directory override (default: platform data dir)
    #[arg(long)]
    data_dir: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging goes to stderr so it never corrupts the TUI on stdout
    let filter = if cli.verbose {
        "qai_cli=debug"
    } else {
        "qai_cli=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::load()?;
    if let Some(model) = cli.model {
        config.gateway.model = model;
    }

    let storage = match cli.data_dir {
        Some(dir) => ArchitectStorage::at(dir)?,
        None => ArchitectStorage::new()?,
    };

    let gateway = create_gateway(&config.gateway);
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let mut app = App::new(storage, gateway, tx, config.ui.suggestions.clone());

    if let Some(message) = cli.message {
        app.send_message(&message);
    }

    tui::run(
        app,
        rx,
        std::time::Duration::from_millis(config.ui.tick_rate_ms),
    )
    .await
}
