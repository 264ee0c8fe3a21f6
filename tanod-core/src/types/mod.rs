//! Core type definitions for the tracking core
//!
//! Naming conventions:
//! - snake_case in Rust, camelCase on the wire
//! - `*_id` suffix for identifiers
//! - timestamps are `DateTime<Utc>`

mod location;
mod officer;
mod patrol_area;
mod schedule;

pub use location::*;
pub use officer::*;
pub use patrol_area::*;
pub use schedule::*;
