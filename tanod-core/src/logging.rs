//! Logging conventions for the tracking core
//!
//! All crates log through `tracing` with structured fields. The binary
//! installs a `tracing-subscriber` `EnvFilter` built from [`LogLevel`].
//!
//! # Log Levels
//!
//! | Level | Usage | Examples |
//! |-------|-------|----------|
//! | ERROR | Unrecoverable errors | Store unreachable on the write path |
//! | WARN  | Degraded operation | Resolution failed, viewer dropped, sweep failed |
//! | INFO  | State changes | Viewer subscribed, officer deactivated, sweep expired N |
//! | DEBUG | Per-report flow | Location accepted, patrol resolved |
//! | TRACE | Full payloads | Outbound tracking messages |
//!
//! # Structured Fields
//!
//! - `officer_id`: reporting officer
//! - `schedule_id`: schedule being reconciled
//! - `area_id`: patrol area being reconciled
//! - `connection_id`: viewer connection
//! - `revision`: store revision of a written record
//! - `count`: item count
//! - `error`: error message
//!
//! ```ignore
//! use tracing::{info, warn};
//!
//! info!(officer_id = %officer_id, revision = record.revision, "Location accepted");
//! warn!(schedule_id = %schedule_id, error = %e, "Patrol resolution failed");
//! ```

use serde::{Deserialize, Serialize};

/// Log level enumeration matching tracing levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }

    /// Filter directive that applies this level to the tanod crates and
    /// keeps dependencies one notch quieter.
    pub fn filter_directive(&self) -> String {
        let deps = match self {
            Self::Error | Self::Warn => *self,
            Self::Info | Self::Debug => Self::Warn,
            Self::Trace => Self::Info,
        };
        format!(
            "{deps},tanod_core={lvl},tanod_db={lvl},tanod_api={lvl},tanod_map={lvl},tanod={lvl}",
            deps = deps.as_str(),
            lvl = self.as_str()
        )
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
