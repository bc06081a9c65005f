// # Shipment State
//
// The last observed status and event history of the tracked shipment.
//
// ## Lifecycle
//
// - Starts empty: status `""` means "not observed yet", so the first
//   successful fetch always counts as a change
// - Replaced wholesale whenever a status change is committed
// - Lives only in memory and is dropped at process exit

use crate::traits::{TrackingEvent, TrackingSnapshot, TERMINAL_STATUS};

/// Last committed state of the shipment
///
/// Owned by `TrackingEngine` and mutated only through `&mut` access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShipmentState {
    status: String,
    events: Vec<TrackingEvent>,
}

impl ShipmentState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Last committed status (`""` before the first commit)
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Event history captured with the last committed status
    pub fn events(&self) -> &[TrackingEvent] {
        &self.events
    }

    /// Whether a snapshot reports a different status than the committed one
    ///
    /// Exact string comparison. Event-only differences are not changes.
    pub fn is_changed_by(&self, snapshot: &TrackingSnapshot) -> bool {
        self.status != snapshot.status
    }

    /// Whether the committed status is terminal
    pub fn is_delivered(&self) -> bool {
        self.status == TERMINAL_STATUS
    }

    /// Replace status and events with the snapshot's
    pub(crate) fn commit(&mut self, snapshot: TrackingSnapshot) {
        self.status = snapshot.status;
        self.events = snapshot.events;
    }
}
