// # Tracking Source Trait
//
// Defines the interface for fetching the state of one shipment from a
// parcel-tracking provider.
//
// ## Implementations
//
// - DHL Shipment Tracking: `parcel-tracker-dhl` crate
//
// ## Usage
//
// ```rust,ignore
// use parcel_core::TrackingSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* TrackingSource implementation */;
//
//     let snapshot = source.fetch().await?;
//     println!("{}: {} event(s)", snapshot.status, snapshot.events.len());
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Status that ends tracking. Compared by exact string equality.
pub const TERMINAL_STATUS: &str = "Delivered";

/// One milestone in the shipment's journey
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingEvent {
    /// Provider-formatted date (may be empty)
    pub date: String,
    /// Provider-formatted time of day (may be empty)
    pub time: String,
    /// Locality where the event happened (may be empty)
    pub location: String,
    /// Human-readable description
    pub description: String,
}

impl TrackingEvent {
    /// Create a new tracking event
    pub fn new(
        date: impl Into<String>,
        time: impl Into<String>,
        location: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
            location: location.into(),
            description: description.into(),
        }
    }
}

/// The state of a shipment as reported by one successful fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingSnapshot {
    /// Top-level status description
    pub status: String,
    /// Events, most recent first
    pub events: Vec<TrackingEvent>,
}

impl TrackingSnapshot {
    /// Create a new snapshot
    pub fn new(status: impl Into<String>, events: Vec<TrackingEvent>) -> Self {
        Self {
            status: status.into(),
            events,
        }
    }

    /// Whether this snapshot reports the terminal status
    pub fn is_delivered(&self) -> bool {
        self.status == TERMINAL_STATUS
    }
}

/// Trait for tracking provider clients
///
/// # Contract
///
/// - One call to [`fetch`](TrackingSource::fetch) performs exactly one
///   outbound request.
/// - No retries, no sleeping, no caching. Retry policy is owned by
///   `TrackingEngine`.
/// - Transport failures (including non-2xx answers) are reported as
///   `Error::Network`; unexpected bodies as `Error::Decode`.
#[async_trait]
pub trait TrackingSource: Send + Sync {
    /// Fetch the current status and event history of the shipment
    async fn fetch(&self) -> Result<TrackingSnapshot, crate::Error>;

    /// The tracking number this source follows
    fn tracking_number(&self) -> &str;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
