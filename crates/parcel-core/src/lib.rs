// # parcel-core
//
// Core library for the parcel status tracker.
//
// ## Architecture Overview
//
// This library provides the poll → diff → notify loop for one shipment:
// - **TrackingSource**: Trait for fetching the shipment's status and events
// - **Notifier**: Trait for delivering a status-change notification
// - **Sleeper**: Trait for the waits between polls (injectable for tests)
// - **ShipmentState**: Last committed status and event history
// - **TrackingEngine**: State machine that orchestrates the flow
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Provider clients and transports live in their own crates
// 2. **Engine-Owned Policy**: Retry and termination decisions belong to the engine only
// 3. **Injected Time**: The engine never sleeps on its own, so every transition is testable
// 4. **Library-First**: The daemon is a thin wrapper around this crate

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod state;

// Re-export core types for convenience
pub use traits::{TrackingSource, Notifier, Sleeper, TokioSleeper};
pub use traits::{TrackingEvent, TrackingSnapshot, Notification, TERMINAL_STATUS};
pub use engine::{TrackingEngine, EngineEvent, DriverState, PollOutcome};
pub use config::{TrackerConfig, DhlConfig, EmailConfig, EngineConfig, NotifyFailurePolicy};
pub use error::{Error, Result};
pub use state::ShipmentState;
