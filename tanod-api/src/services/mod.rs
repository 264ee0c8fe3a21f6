//! Background services

pub mod reaper;

pub use reaper::{ReaperConfig, ReaperHandle, ReaperService, ReaperStats, SweepBackoff, SweepOutcome};
