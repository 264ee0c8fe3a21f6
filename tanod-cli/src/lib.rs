//! Tanod CLI
//!
//! Runs the tracking server and talks to a running one.
//!
//! ```text
//! tanod [OPTIONS] <COMMAND>
//!
//! Commands:
//!   start    Start the tracking API server
//!   report   Report a location as an officer
//!   active   Show the markers a map viewer would draw
//!   login    Open an officer session
//!   logout   End an officer session and remove the marker
//!   officer  Register or update an officer profile
//!   health   Check server health
//!
//! Options:
//!   -a, --api-url <URL>        API endpoint URL [default: http://localhost:3000]
//!   -f, --format <FORMAT>      Output format (json, table) [default: table]
//!   -l, --log-level <LEVEL>    error, warn, info, debug, trace [default: info]
//! ```
//!
//! # Examples
//!
//! ```text
//! tanod start --port 8080 --data-dir ./tanod-data
//! tanod officer --officer A --name "Andres Cruz"
//! tanod report --officer A --lat 14.70 --lon 121.05
//! tanod active
//! ```

pub mod client;
pub mod commands;
pub mod error;
pub mod handler;
pub mod output;

pub use client::TanodClient;
pub use commands::{Cli, Commands, OutputFormat};
pub use error::{CliError, CliResult};

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
