//! Core traits for the parcel tracker
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`TrackingSource`]: Fetch the current state of a shipment
//! - [`Notifier`]: Deliver a status-change notification
//! - [`Sleeper`]: Wait between polls

pub mod tracking_source;
pub mod notifier;
pub mod sleeper;

pub use tracking_source::{TrackingSource, TrackingEvent, TrackingSnapshot, TERMINAL_STATUS};
pub use notifier::{Notifier, Notification};
pub use sleeper::{Sleeper, TokioSleeper};
