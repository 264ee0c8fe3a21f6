//! Tracking services
//!
//! - `PatrolResolver`: derives an officer's active patrol from schedules
//! - `RegistryService`: applies every write to location records and emits
//!   the matching registry event

mod registry;
mod resolver;

pub use registry::*;
pub use resolver::*;
