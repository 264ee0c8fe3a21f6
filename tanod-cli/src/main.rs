//! Tanod CLI Entry Point
//!
//! Usage:
//!   tanod start     - Start the tracking API server
//!   tanod report    - Report a location as an officer
//!   tanod active    - Show active officers
//!   tanod logout    - End an officer session

use clap::Parser;
use tanod_cli::{handler, Cli, CliError};
use tanod_core::logging::LogLevel;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match LogLevel::parse(&cli.log_level) {
        Some(level) => {
            init_logging(level);
            handler::run(cli).await
        }
        None => Err(CliError::invalid_arg(format!(
            "unknown log level: {}",
            cli.log_level
        ))),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        if e.is_retryable() {
            eprintln!("Failed to update, retry shortly.");
        }
        std::process::exit(e.exit_code());
    }
}

/// Initialize logging with tracing; `RUST_LOG` wins over `--log-level`
fn init_logging(level: LogLevel) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.filter_directive().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
