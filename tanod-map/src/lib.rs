//! Tanod Map - viewer-side marker reconciliation
//!
//! Consumes the tracking channel (`initializeLocations` followed by
//! `locationUpdate` messages) and keeps exactly one marker per officer on an
//! injectable [`MarkerRenderer`].
//!
//! Marker color and pulse come straight from the record's `markerColor` and
//! `isOnPatrol`; nothing here derives them.
//!
//! ```ignore
//! let mut layer = MarkerLayer::new(my_renderer);
//! layer.apply_json(&frame)?;
//! if layer.set_visible(true) == VisibilityOutcome::NeedsResubscribe {
//!     socket.send(serde_json::to_string(&ViewerCommand::Resubscribe)?).await?;
//! }
//! ```

pub mod error;
pub mod layer;
pub mod renderer;
pub mod style;

pub use error::{MapError, MapResult};
pub use layer::{Applied, MarkerLayer, VisibilityOutcome};
pub use renderer::MarkerRenderer;
pub use style::{MarkerPopup, MarkerStyle};
