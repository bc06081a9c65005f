// # Notifier Trait
//
// Defines the interface for telling a human that the shipment status changed.
//
// ## Implementations
//
// - SMTP email: `parcel-notify-smtp` crate

use async_trait::async_trait;

use super::tracking_source::TrackingEvent;

/// A detected status change, ready to be delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// The shipment the change belongs to
    pub tracking_number: String,
    /// The new status
    pub status: String,
    /// Full event history, most recent first (may be empty)
    pub events: Vec<TrackingEvent>,
}

/// Trait for notification transports
///
/// Implementations deliver one message per call and report failure as
/// `Error::Notify`. Whether a failure is retried is decided by the engine.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification
    async fn notify(&self, notification: &Notification) -> Result<(), crate::Error>;

    /// Get the notifier name (for logging/debugging)
    fn notifier_name(&self) -> &'static str;
}
