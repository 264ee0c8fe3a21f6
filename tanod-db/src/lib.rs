//! Tanod Database Layer
//!
//! Storage implementations and services for the live tracking core.
//!
//! # Layout
//!
//! - `repos` - `LocationStore` implementations (in-memory and sled), the
//!   in-memory `ScheduleBook` standing in for the scheduling subsystem, and
//!   the officer directory
//! - `services` - `PatrolResolver` and `RegistryService`, the only writer of
//!   location records
//! - `validation` - coordinate checks applied before anything is written
//!
//! # Usage
//!
//! ```ignore
//! use tanod_db::{RegistryService, TrackingStores};
//!
//! let stores = TrackingStores::in_memory();
//! let registry = RegistryService::from_stores(&stores);
//! let tracked = registry.report_location(&officer_id, 14.70, 121.05).await?;
//! ```

pub mod error;
pub mod repos;
pub mod services;
pub mod validation;

pub use error::*;
pub use repos::*;
pub use services::{PatrolResolver, RegistryService};
