//! Tanod Core - live patrol tracking
//!
//! This crate provides the core types and interfaces for the tracking core of
//! the barangay patrol system:
//! - Officer location records and their derived display attributes
//! - Schedules and patrol areas as read from the scheduling subsystem
//! - Registry events and the wire messages pushed to map viewers
//! - Store traits implemented by `tanod-db`
//!
//! # Consistency rule
//!
//! `isOnPatrol == true` implies `currentScheduleId` resolves to a non-expired
//! schedule whose per-officer patrol status is `Started`, and `markerColor`
//! equals that schedule's patrol-area color. Otherwise the marker is neutral.
//! The rule is computed server-side only; viewers render what they receive.

pub mod constants;
pub mod error;
pub mod events;
pub mod logging;
pub mod message;
pub mod store;
pub mod types;

pub use constants::*;
pub use error::*;
pub use events::*;
pub use message::*;
pub use store::*;
pub use types::*;
