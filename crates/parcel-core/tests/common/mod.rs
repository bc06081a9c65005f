//! Test doubles and common utilities for engine contract tests
//!
//! Every double is `Clone` and shares its counters between clones, so a test
//! keeps one handle and gives the engine another.

#![allow(dead_code)]

use parcel_core::config::{EngineConfig, NotifyFailurePolicy};
use parcel_core::error::{Error, Result};
use parcel_core::traits::{
    Notification, Notifier, Sleeper, TrackingEvent, TrackingSnapshot, TrackingSource,
};
use parcel_core::{EngineEvent, TrackingEngine};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, mpsc};

pub const TRACKING_NUMBER: &str = "00340434292135100186";

/// A TrackingSource that replays a fixed script of responses
///
/// Once the script is exhausted, `fetch()` signals [`ScriptedSource::exhausted`]
/// and never resolves, so the engine parks until the test shuts it down.
#[derive(Clone)]
pub struct ScriptedSource {
    script: Arc<Mutex<VecDeque<Result<TrackingSnapshot>>>>,
    fetch_count: Arc<AtomicUsize>,
    exhausted: Arc<Notify>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<TrackingSnapshot>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            fetch_count: Arc::new(AtomicUsize::new(0)),
            exhausted: Arc::new(Notify::new()),
        }
    }

    /// Get the number of times fetch() was called (including the parked call)
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Resolves once the script has run out
    pub async fn exhausted(&self) {
        self.exhausted.notified().await;
    }
}

#[async_trait::async_trait]
impl TrackingSource for ScriptedSource {
    async fn fetch(&self) -> Result<TrackingSnapshot> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(response) => response,
            None => {
                self.exhausted.notify_one();
                std::future::pending().await
            }
        }
    }

    fn tracking_number(&self) -> &str {
        TRACKING_NUMBER
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

/// A Notifier that records every notification it is asked to deliver
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
    attempts: Arc<AtomicUsize>,
    failures_left: Arc<AtomicUsize>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose first `count` deliveries fail
    pub fn failing(count: usize) -> Self {
        let notifier = Self::default();
        notifier.failures_left.store(count, Ordering::SeqCst);
        notifier
    }

    /// Notifications delivered successfully
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    /// Statuses of the notifications delivered successfully
    pub fn sent_statuses(&self) -> Vec<String> {
        self.sent().into_iter().map(|n| n.status).collect()
    }

    /// Get the number of times notify() was called
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(Error::notify("SMTP authentication failed"));
        }

        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }

    fn notifier_name(&self) -> &'static str {
        "recording"
    }
}

/// A Sleeper that returns immediately and records what it was asked to wait
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    waits: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
        // Give the shutdown branch a chance to run
        tokio::task::yield_now().await;
    }
}

pub fn snapshot(status: &str) -> Result<TrackingSnapshot> {
    Ok(TrackingSnapshot::new(
        status,
        vec![
            TrackingEvent::new("2024-03-02", "10:15", "Lima", status),
            TrackingEvent::new("2024-03-01", "08:00", "Miami", "Shipment picked up"),
        ],
    ))
}

pub fn snapshot_with_events(status: &str, events: Vec<TrackingEvent>) -> Result<TrackingSnapshot> {
    Ok(TrackingSnapshot::new(status, events))
}

pub fn network_error() -> Result<TrackingSnapshot> {
    Err(Error::network("connection refused"))
}

pub fn decode_error() -> Result<TrackingSnapshot> {
    Err(Error::decode("missing field `shipments`"))
}

pub const POLL: Duration = Duration::from_secs(600);
pub const RETRY: Duration = Duration::from_secs(60);

/// Engine configuration with the production intervals
pub fn engine_config(on_notify_failure: NotifyFailurePolicy) -> EngineConfig {
    EngineConfig {
        poll_interval_secs: 600,
        retry_interval_secs: 60,
        on_notify_failure,
        event_channel_capacity: 100,
    }
}

/// Build an engine around the given doubles
pub fn engine(
    source: &ScriptedSource,
    notifier: &RecordingNotifier,
    sleeper: &RecordingSleeper,
    on_notify_failure: NotifyFailurePolicy,
) -> (TrackingEngine, mpsc::Receiver<EngineEvent>) {
    TrackingEngine::new(
        Box::new(source.clone()),
        Box::new(notifier.clone()),
        Box::new(sleeper.clone()),
        engine_config(on_notify_failure),
    )
    .expect("engine construction succeeds")
}

/// Collect every event currently buffered in the channel
pub fn drain_events(rx: &mut mpsc::Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
