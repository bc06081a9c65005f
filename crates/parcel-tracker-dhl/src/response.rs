//! DHL Shipment Tracking response decoding
//!
//! Only the parts of the unified tracking response the tracker needs:
//!
//! ```json
//! {
//!   "shipments": [{
//!     "status": { "description": "In Transit", ... },
//!     "events": [{
//!       "timestamp": "2024-03-02T10:15:00",
//!       "location": { "address": { "addressLocality": "Lima" } },
//!       "description": "Arrived at facility"
//!     }]
//!   }]
//! }
//! ```

use parcel_core::traits::{TrackingEvent, TrackingSnapshot};
use parcel_core::{Error, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TrackingResponse {
    shipments: Vec<Shipment>,
}

#[derive(Debug, Deserialize)]
struct Shipment {
    status: ShipmentStatus,
    #[serde(default)]
    events: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
struct ShipmentStatus {
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawEvent {
    date: Option<String>,
    time: Option<String>,
    timestamp: Option<String>,
    location: Option<RawLocation>,
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLocation {
    address: Option<RawAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAddress {
    #[serde(rename = "addressLocality")]
    address_locality: Option<String>,
}

impl From<RawEvent> for TrackingEvent {
    fn from(raw: RawEvent) -> Self {
        // Split "2024-03-02T10:15:00" when explicit fields are absent
        let (stamp_date, stamp_time) = match raw.timestamp.as_deref().and_then(|t| t.split_once('T')) {
            Some((date, time)) => (date.to_string(), time.to_string()),
            None => (raw.timestamp.clone().unwrap_or_default(), String::new()),
        };

        let location = raw
            .location
            .and_then(|l| l.address)
            .and_then(|a| a.address_locality)
            .unwrap_or_default();

        TrackingEvent {
            date: raw.date.unwrap_or(stamp_date),
            time: raw.time.unwrap_or(stamp_time),
            location,
            description: raw.description.unwrap_or_default(),
        }
    }
}

/// Decode a tracking response body into a snapshot of its first shipment
///
/// # Errors
///
/// `Error::Decode` when the body is not JSON, has no `shipments`, has an
/// empty `shipments` list, or the first shipment has no status description.
pub fn decode_snapshot(body: &str) -> Result<TrackingSnapshot> {
    let response: TrackingResponse = serde_json::from_str(body)?;

    let shipment = response
        .shipments
        .into_iter()
        .next()
        .ok_or_else(|| Error::decode("Tracking response contains no shipments"))?;

    Ok(TrackingSnapshot::new(
        shipment.status.description,
        shipment.events.into_iter().map(TrackingEvent::from).collect(),
    ))
}
