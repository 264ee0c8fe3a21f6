//! Rendering seam
//!
//! The layer decides *what* changes; a renderer (a web map binding, a
//! terminal table, a test recorder) decides how it looks.

use tanod_core::{GeoPoint, OfficerId};

use crate::style::{MarkerPopup, MarkerStyle};

/// Receives marker operations from a [`crate::MarkerLayer`].
///
/// Calls for one officer arrive in order: `create` once, then any number of
/// `move_to`/`restyle`, then `remove`. A removed officer may be created again.
pub trait MarkerRenderer {
    /// Add a marker for an officer that currently has none
    fn create(&mut self, officer_id: &OfficerId, position: GeoPoint, style: &MarkerStyle, popup: &MarkerPopup);

    /// Move an existing marker in place
    fn move_to(&mut self, officer_id: &OfficerId, position: GeoPoint);

    /// Change an existing marker's icon or popup content
    fn restyle(&mut self, officer_id: &OfficerId, style: &MarkerStyle, popup: &MarkerPopup);

    fn remove(&mut self, officer_id: &OfficerId);
}
