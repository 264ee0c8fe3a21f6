//! CLI Commands
//!
//! Command definitions for the `tanod` binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Barangay patrol live tracking
#[derive(Parser, Debug)]
#[command(name = "tanod")]
#[command(version)]
#[command(about = "Barangay patrol live tracking command line interface")]
pub struct Cli {
    /// API endpoint URL
    #[arg(short, long, env = "TANOD_API_URL", default_value = "http://localhost:3000", global = true)]
    pub api_url: String,

    /// Output format (json, table)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "TANOD_LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    /// Human-readable
    #[default]
    Table,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the tracking API server
    ///
    /// Unset flags fall back to the TANOD_* environment.
    Start {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Directory for the sled location store (in-memory when unset)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },

    /// Report a location as an officer
    Report {
        #[arg(short, long)]
        officer: String,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },

    /// Show the markers a map viewer would draw
    Active,

    /// Open an officer session
    Login {
        #[arg(short, long)]
        officer: String,
    },

    /// End an officer session and remove the marker
    Logout {
        #[arg(short, long)]
        officer: String,
    },

    /// Register or update an officer profile
    Officer {
        #[arg(short, long)]
        officer: String,
        #[arg(short, long)]
        name: String,
        /// Picture URL
        #[arg(long)]
        picture: Option<String>,
    },

    /// Check server health
    Health,
}
