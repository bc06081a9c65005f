// # DHL Tracking Source
//
// This crate provides a DHL Shipment Tracking client for the parcel tracker.
//
// ## Behaviour
//
// - Makes exactly one HTTP request per `fetch()` call
// - Full error propagation to the engine (engine owns retry and waiting)
// - HTTP timeout configured (30 seconds by default)
// - Non-2xx answers mapped to `Error::Network` with a status-specific message
// - Unexpected bodies mapped to `Error::Decode`
// - No retry, no caching, no background tasks
//
// ## Security Requirements
//
// - API key and secret NEVER appear in logs or `Debug` output
//
// ## API Reference
//
// - DHL Shipment Tracking - Unified: https://developer.dhl.com/api-reference/shipment-tracking
// - Track: GET `/track/shipments?trackingNumber=...`
//   with headers `DHL-API-Key` and `DHL-API-Secret`

pub mod response;

pub use response::decode_snapshot;

use async_trait::async_trait;
use parcel_core::config::DhlConfig;
use parcel_core::traits::{TrackingSnapshot, TrackingSource};
use parcel_core::{Error, Result};
use std::time::Duration;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "DHL-API-Key";

/// Header carrying the API secret
pub const API_SECRET_HEADER: &str = "DHL-API-Secret";

/// DHL Shipment Tracking client for one tracking number
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the credentials.
pub struct DhlTracker {
    /// ⚠️ NEVER log this value
    api_key: String,

    /// ⚠️ NEVER log this value
    api_secret: String,

    /// Shipment to follow
    tracking_number: String,

    /// Tracking endpoint
    endpoint: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API credentials
impl std::fmt::Debug for DhlTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DhlTracker")
            .field("api_key", &"<REDACTED>")
            .field("api_secret", &"<REDACTED>")
            .field("tracking_number", &self.tracking_number)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl DhlTracker {
    /// Create a tracker from configuration
    ///
    /// # Errors
    ///
    /// `Error::Config` if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &DhlConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            tracking_number: config.tracking_number.clone(),
            endpoint: config.endpoint.clone(),
            client,
        })
    }
}

#[async_trait]
impl TrackingSource for DhlTracker {
    /// Fetch the current status of the shipment
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /track/shipments?trackingNumber=<number>
    /// DHL-API-Key: <key>
    /// DHL-API-Secret: <secret>
    /// ```
    async fn fetch(&self) -> Result<TrackingSnapshot> {
        tracing::debug!("Fetching DHL status for {}", self.tracking_number);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("trackingNumber", self.tracking_number.as_str())])
            .header(API_KEY_HEADER, &self.api_key)
            .header(API_SECRET_HEADER, &self.api_secret)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::network(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(match status.as_u16() {
                401 | 403 => Error::network(format!(
                    "Authentication failed: invalid API key or secret. Status: {}",
                    status
                )),
                404 => Error::network(format!(
                    "Shipment not found: {}. Status: {}",
                    self.tracking_number, status
                )),
                429 => Error::network(format!(
                    "Rate limit exceeded. Please retry later. Status: {}",
                    status
                )),
                500..=599 => Error::network(format!(
                    "DHL server error (transient): {} - {}",
                    status, error_text
                )),
                _ => Error::network(format!("Tracking request failed: {} - {}", status, error_text)),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read response: {}", e)))?;

        let snapshot = decode_snapshot(&body)?;
        tracing::debug!(
            "DHL reports '{}' with {} event(s)",
            snapshot.status,
            snapshot.events.len()
        );
        Ok(snapshot)
    }

    fn tracking_number(&self) -> &str {
        &self.tracking_number
    }

    fn provider_name(&self) -> &'static str {
        "dhl"
    }
}
