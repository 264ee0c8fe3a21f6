//! Tanod API Server
//!
//! REST and WebSocket surface of the live tracking core.
//!
//! ## Endpoints
//!
//! ### Health
//! - GET /health - Liveness plus counts
//! - GET /health/live - Process is up
//! - GET /health/ready - Location store answers queries
//! - GET /metrics - Prometheus text (when enabled)
//!
//! ### Locations
//! - POST /api/v1/locations - Report the calling officer's position
//! - GET /api/v1/locations/active - Snapshot of active officers
//! - GET /api/v1/tracking - WebSocket joining the tracking channel
//!
//! ### Session
//! - POST /api/v1/session/login - Officer authenticated
//! - POST /api/v1/session/logout - Officer logged out
//!
//! ### Scheduling collaborator
//! - PUT /api/v1/schedules/:schedule_id - Upsert schedule
//! - DELETE /api/v1/schedules/:schedule_id - Remove schedule
//! - POST /api/v1/schedules/:schedule_id/start-patrol - Calling officer starts
//! - POST /api/v1/schedules/:schedule_id/end-patrol - Calling officer ends
//! - PUT /api/v1/patrol-areas/:area_id - Upsert patrol area
//! - PUT /api/v1/officers/:officer_id - Upsert officer profile
//!
//! Calling-officer identity arrives from the upstream auth layer in the
//! `X-Officer-Id` and `X-Officer-Role` headers.

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod fanout;
pub mod metrics;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;

pub use auth::*;
pub use config::*;
pub use dto::*;
pub use error::*;
pub use fanout::{FanoutHandle, FanoutHub};
pub use routes::*;
pub use server::*;
pub use state::*;
