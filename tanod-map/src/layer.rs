//! Marker layer
//!
//! Keeps exactly one marker per officer id:
//!
//! - `initializeLocations` replaces the known set; markers not in the
//!   snapshot are removed
//! - `locationUpdate` with `isActive=true` moves an existing marker in place
//!   or creates it
//! - `locationUpdate` with `isActive=false` removes the marker if present
//!
//! Each record carries a store revision. A record older than the last one
//! applied for that officer is ignored, so duplicate and out-of-order
//! deliveries converge to the same markers. A snapshot resets the revision
//! table since it is authoritative.
//!
//! Hiding the layer only stops rendering. Updates keep flowing into the
//! cache, and showing the layer again re-renders from it.

use std::collections::{BTreeMap, HashMap};

use tanod_core::{GeoPoint, OfficerId, TrackedOfficer, TrackingMessage};
use tracing::debug;

use crate::error::MapResult;
use crate::renderer::MarkerRenderer;
use crate::style::{MarkerPopup, MarkerStyle};

/// What applying one message did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Snapshot applied; `markers` officers are now known
    Snapshot { markers: usize },
    Created,
    Updated,
    /// Same position and style as the current marker
    Unchanged,
    Removed,
    /// Layer hidden; only the cache changed
    Cached,
    /// Older than the last record applied for this officer
    Ignored,
}

/// Result of toggling visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityOutcome {
    /// Markers drawn from the cached registry state
    Rendered { markers: usize },
    Hidden,
    /// No cached snapshot; the caller must resubscribe to get one
    NeedsResubscribe,
}

struct RenderedMarker {
    position: GeoPoint,
    style: MarkerStyle,
    popup: MarkerPopup,
}

pub struct MarkerLayer<R: MarkerRenderer> {
    renderer: R,
    /// Last known active records, kept whether or not the layer is visible
    known: BTreeMap<OfficerId, TrackedOfficer>,
    revisions: HashMap<OfficerId, u64>,
    rendered: HashMap<OfficerId, RenderedMarker>,
    visible: bool,
    snapshot_cached: bool,
}

impl<R: MarkerRenderer> MarkerLayer<R> {
    /// A visible layer with no cached state
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            known: BTreeMap::new(),
            revisions: HashMap::new(),
            rendered: HashMap::new(),
            visible: true,
            snapshot_cached: false,
        }
    }

    /// Apply a raw frame from the tracking channel
    pub fn apply_json(&mut self, frame: &str) -> MapResult<Applied> {
        let message: TrackingMessage = serde_json::from_str(frame)?;
        Ok(self.apply(message))
    }

    pub fn apply(&mut self, message: TrackingMessage) -> Applied {
        match message {
            TrackingMessage::InitializeLocations { locations } => self.apply_snapshot(locations),
            TrackingMessage::LocationUpdate { location } => self.apply_update(location),
        }
    }

    /// Show or hide all tracking markers. Never touches server state.
    pub fn set_visible(&mut self, visible: bool) -> VisibilityOutcome {
        if !visible {
            for (officer_id, _) in self.rendered.drain() {
                self.renderer.remove(&officer_id);
            }
            self.visible = false;
            return VisibilityOutcome::Hidden;
        }

        self.visible = true;
        if !self.snapshot_cached {
            return VisibilityOutcome::NeedsResubscribe;
        }
        self.sync_markers();
        VisibilityOutcome::Rendered {
            markers: self.rendered.len(),
        }
    }

    /// Forget that the cache mirrors the registry, e.g. after the tracking
    /// connection dropped. Markers stay where they are.
    pub fn invalidate_cache(&mut self) {
        self.snapshot_cached = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn has_cached_snapshot(&self) -> bool {
        self.snapshot_cached
    }

    pub fn marker_count(&self) -> usize {
        self.rendered.len()
    }

    pub fn has_marker(&self, officer_id: &OfficerId) -> bool {
        self.rendered.contains_key(officer_id)
    }

    /// Cached records ordered by officer id
    pub fn known(&self) -> impl Iterator<Item = &TrackedOfficer> {
        self.known.values()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    fn apply_snapshot(&mut self, locations: Vec<TrackedOfficer>) -> Applied {
        self.known.clear();
        self.revisions.clear();

        for record in locations {
            if !is_displayable(&record) {
                continue;
            }
            let officer_id = record.officer_id().clone();
            self.revisions.insert(officer_id.clone(), record.location.revision);
            self.known.insert(officer_id, record);
        }
        self.snapshot_cached = true;

        if self.visible {
            self.sync_markers();
        }
        debug!(count = self.known.len(), "Snapshot applied");
        Applied::Snapshot {
            markers: self.known.len(),
        }
    }

    fn apply_update(&mut self, record: TrackedOfficer) -> Applied {
        let officer_id = record.officer_id().clone();
        let revision = record.location.revision;

        // Revision 0 means the sender did not stamp one
        if revision != 0 {
            match self.revisions.get(&officer_id) {
                Some(&latest) if revision < latest => {
                    debug!(officer_id = %officer_id, revision, latest, "Out-of-order update ignored");
                    return Applied::Ignored;
                }
                _ => {
                    self.revisions.insert(officer_id.clone(), revision);
                }
            }
        }

        if !is_displayable(&record) {
            self.known.remove(&officer_id);
            return match self.rendered.remove(&officer_id) {
                Some(_) => {
                    self.renderer.remove(&officer_id);
                    Applied::Removed
                }
                None if self.visible => Applied::Unchanged,
                None => Applied::Cached,
            };
        }

        let applied = if self.visible {
            render_marker(&mut self.renderer, &mut self.rendered, &record)
        } else {
            Applied::Cached
        };
        self.known.insert(officer_id, record);
        applied
    }

    fn sync_markers(&mut self) {
        let gone: Vec<OfficerId> = self
            .rendered
            .keys()
            .filter(|id| !self.known.contains_key(*id))
            .cloned()
            .collect();
        for officer_id in gone {
            self.rendered.remove(&officer_id);
            self.renderer.remove(&officer_id);
        }

        for record in self.known.values() {
            render_marker(&mut self.renderer, &mut self.rendered, record);
        }
    }
}

/// Active and positioned
fn is_displayable(record: &TrackedOfficer) -> bool {
    record.is_active() && record.location.position.is_some()
}

fn render_marker<R: MarkerRenderer>(
    renderer: &mut R,
    rendered: &mut HashMap<OfficerId, RenderedMarker>,
    record: &TrackedOfficer,
) -> Applied {
    let Some(position) = record.location.position else {
        return Applied::Unchanged;
    };
    let officer_id = record.officer_id();
    let style = MarkerStyle::for_location(&record.location);
    let popup = MarkerPopup::for_officer(record);

    match rendered.get_mut(officer_id) {
        Some(marker) => {
            let mut applied = Applied::Unchanged;
            if marker.position != position {
                renderer.move_to(officer_id, position);
                marker.position = position;
                applied = Applied::Updated;
            }
            if marker.style != style || marker.popup != popup {
                renderer.restyle(officer_id, &style, &popup);
                marker.style = style;
                marker.popup = popup;
                applied = Applied::Updated;
            }
            applied
        }
        None => {
            renderer.create(officer_id, position, &style, &popup);
            rendered.insert(
                officer_id.clone(),
                RenderedMarker {
                    position,
                    style,
                    popup,
                },
            );
            Applied::Created
        }
    }
}
