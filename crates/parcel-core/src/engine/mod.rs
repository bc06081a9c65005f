//! Core tracking engine
//!
//! The TrackingEngine is responsible for:
//! - Polling the TrackingSource on a fixed interval
//! - Detecting status changes against the ShipmentState
//! - Delivering a Notification for every committed change
//! - Stopping once the shipment is delivered
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐
//! │ TrackingSource │─── TrackingSnapshot ───┐
//! └────────────────┘                        │
//!                                           ▼
//!                                 ┌────────────────┐
//!                                 │ TrackingEngine │
//!                                 └────────────────┘
//!                                           │
//!         ┌─────────────────────────────────┼─────────────────────────┐
//!         │                                 │                         │
//!         ▼                                 ▼                         ▼
//! ┌───────────────┐                 ┌──────────────┐          ┌─────────────┐
//! │ ShipmentState │                 │   Notifier   │          │   Events    │
//! │ (compare)     │                 │ (deliver)    │          │  (monitor)  │
//! └───────────────┘                 └──────────────┘          └─────────────┘
//! ```
//!
//! ## State Machine
//!
//! ```text
//!            fetch ok, same status
//!          ┌──────────────────────┐
//!          ▼                      │
//!     ┌─────────┐  changed   ┌───────────┐  "Delivered"  ┌────────────┐
//! ───▶│ Polling │───────────▶│ Notifying │──────────────▶│ Terminated │
//!     └─────────┘            └───────────┘               └────────────┘
//!       │    ▲                     │ other status
//!       │    └─────────────────────┘
//!       │ fetch failed       ▲
//!       ▼                    │
//!   ┌───────────┐  short wait│
//!   │ RetryWait │────────────┘ (back to Polling)
//!   └───────────┘
//! ```
//!
//! Failed fetches never touch the stored state and never count toward
//! termination. Terminated is absorbing.

use crate::config::{EngineConfig, NotifyFailurePolicy};
use crate::error::Result;
use crate::state::ShipmentState;
use crate::traits::{Notification, Notifier, Sleeper, TrackingSource};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// Events emitted by the TrackingEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started {
        tracking_number: String,
    },

    /// A fetch reported a status different from the committed one
    StatusChanged {
        previous: String,
        current: String,
    },

    /// Notification delivered and state committed
    NotificationSent {
        status: String,
        events_count: usize,
    },

    /// Notification could not be delivered
    NotificationFailed {
        status: String,
        error: String,
    },

    /// Fetch failed with a transient error
    PollFailed {
        error: String,
    },

    /// Engine stopped
    Stopped {
        reason: String,
    },
}

/// Phase of the poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Waiting for (or performing) the next fetch
    Polling,
    /// A change was detected and the notifier is being called
    Notifying,
    /// The last attempt failed; waiting the short interval
    RetryWait,
    /// The shipment was delivered; nothing more to do
    Terminated,
}

/// Result of a single [`TrackingEngine::poll_once`] cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Fetch succeeded, status is the committed one
    Unchanged {
        status: String,
    },

    /// Status changed and the notification was delivered
    Notified {
        status: String,
    },

    /// The shipment is delivered (just now, or on an earlier cycle)
    Delivered,

    /// Fetch failed with a network or decode error
    FetchFailed {
        error: String,
    },

    /// Status changed but the notification failed; nothing was committed
    NotifyFailed {
        status: String,
        error: String,
    },
}

impl PollOutcome {
    /// The phase the engine moves to after this outcome
    pub fn next_state(&self) -> DriverState {
        match self {
            PollOutcome::Unchanged { .. } | PollOutcome::Notified { .. } => DriverState::Polling,
            PollOutcome::Delivered => DriverState::Terminated,
            PollOutcome::FetchFailed { .. } | PollOutcome::NotifyFailed { .. } => {
                DriverState::RetryWait
            }
        }
    }
}

/// Core tracking engine
///
/// The engine owns the only copy of the [`ShipmentState`] and drives the
/// fetch → compare → notify loop for one shipment.
///
/// ## Lifecycle
///
/// 1. Create with [`TrackingEngine::new()`]
/// 2. Start with [`TrackingEngine::run()`]
/// 3. Engine runs until the shipment is delivered or a shutdown signal arrives
///
/// ## Threading
///
/// Everything happens sequentially on the calling task. Network calls and
/// waits are awaited one at a time.
pub struct TrackingEngine {
    /// Tracking provider client
    source: Box<dyn TrackingSource>,

    /// Notification transport
    notifier: Box<dyn Notifier>,

    /// Time source for the two wait points
    sleeper: Box<dyn Sleeper>,

    /// Last committed status and events
    state: ShipmentState,

    /// Current phase of the loop
    phase: DriverState,

    /// Shipment being followed
    tracking_number: String,

    /// Wait after a successful poll
    poll_interval: Duration,

    /// Wait after a failed poll or failed notification
    retry_interval: Duration,

    /// Handling of notifier failures
    on_notify_failure: NotifyFailurePolicy,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl TrackingEngine {
    /// Create a new tracking engine
    ///
    /// # Parameters
    ///
    /// - `source`: Tracking provider client
    /// - `notifier`: Notification transport
    /// - `sleeper`: Time source (use [`crate::traits::TokioSleeper`] in production)
    /// - `config`: Engine configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        source: Box<dyn TrackingSource>,
        notifier: Box<dyn Notifier>,
        sleeper: Box<dyn Sleeper>,
        config: EngineConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);
        let tracking_number = source.tracking_number().to_string();

        let engine = Self {
            source,
            notifier,
            sleeper,
            state: ShipmentState::new(),
            phase: DriverState::Polling,
            tracking_number,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            retry_interval: Duration::from_secs(config.retry_interval_secs),
            on_notify_failure: config.on_notify_failure,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Last committed shipment state
    pub fn state(&self) -> &ShipmentState {
        &self.state
    }

    /// Current phase of the loop
    pub fn phase(&self) -> DriverState {
        self.phase
    }

    /// Run the engine
    ///
    /// Polls until the shipment is delivered or SIGINT is received.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Delivered or clean shutdown
    /// - `Err(Error)`: Fatal error (non-transient source error, or a
    ///   notifier failure under [`NotifyFailurePolicy::Abort`])
    pub async fn run(&mut self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Run the engine with a controlled shutdown signal
    ///
    /// Same as [`run()`](Self::run) but stops when `shutdown_rx` fires
    /// instead of on SIGINT. Passing `None` falls back to SIGINT.
    pub async fn run_with_shutdown(
        &mut self,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    async fn run_internal(&mut self, mut shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        self.emit_event(EngineEvent::Started {
            tracking_number: self.tracking_number.clone(),
        });
        info!(
            "Tracking shipment {} via {} (notify via {})",
            self.tracking_number,
            self.source.provider_name(),
            self.notifier.notifier_name()
        );

        loop {
            let step = tokio::select! {
                result = self.cycle() => Some(result),
                _ = wait_for_shutdown(&mut shutdown_rx) => None,
            };

            match step {
                Some(Ok(true)) => {
                    info!("Shipment {} delivered, stopping", self.tracking_number);
                    self.emit_event(EngineEvent::Stopped {
                        reason: "Delivered".to_string(),
                    });
                    return Ok(());
                }
                Some(Ok(false)) => {}
                Some(Err(e)) => {
                    self.emit_event(EngineEvent::Stopped {
                        reason: e.to_string(),
                    });
                    return Err(e);
                }
                None => {
                    info!("Shutdown signal received");
                    self.emit_event(EngineEvent::Stopped {
                        reason: "Shutdown signal".to_string(),
                    });
                    return Ok(());
                }
            }
        }
    }

    /// One poll followed by the wait its outcome calls for
    ///
    /// Returns `true` once the engine is terminated.
    async fn cycle(&mut self) -> Result<bool> {
        let outcome = self.poll_once().await?;

        match outcome.next_state() {
            DriverState::Terminated => return Ok(true),
            DriverState::RetryWait => {
                debug!("Retrying in {:?}", self.retry_interval);
                self.sleeper.sleep(self.retry_interval).await;
            }
            DriverState::Polling | DriverState::Notifying => {
                debug!("Next poll in {:?}", self.poll_interval);
                self.sleeper.sleep(self.poll_interval).await;
            }
        }

        Ok(false)
    }

    /// Perform one fetch → compare → notify cycle, without waiting
    ///
    /// Once terminated, returns [`PollOutcome::Delivered`] without
    /// contacting the tracking source.
    ///
    /// On `Err` nothing has been committed and the engine is left in
    /// [`DriverState::Polling`], so calling again starts a fresh cycle.
    pub async fn poll_once(&mut self) -> Result<PollOutcome> {
        if self.phase == DriverState::Terminated {
            debug!("Shipment {} already delivered, not polling", self.tracking_number);
            return Ok(PollOutcome::Delivered);
        }

        self.phase = DriverState::Polling;

        let snapshot = match self.source.fetch().await {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_transient() => {
                warn!("Failed to fetch status for {}: {}", self.tracking_number, e);
                self.emit_event(EngineEvent::PollFailed {
                    error: e.to_string(),
                });
                self.phase = DriverState::RetryWait;
                return Ok(PollOutcome::FetchFailed {
                    error: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        if !self.state.is_changed_by(&snapshot) {
            debug!("Status unchanged: {}", snapshot.status);
            return Ok(PollOutcome::Unchanged {
                status: snapshot.status,
            });
        }

        info!(
            "Status changed for {}: '{}' -> '{}'",
            self.tracking_number,
            self.state.status(),
            snapshot.status
        );
        self.emit_event(EngineEvent::StatusChanged {
            previous: self.state.status().to_string(),
            current: snapshot.status.clone(),
        });

        self.phase = DriverState::Notifying;
        let notification = Notification {
            tracking_number: self.tracking_number.clone(),
            status: snapshot.status.clone(),
            events: snapshot.events.clone(),
        };

        if let Err(e) = self.notifier.notify(&notification).await {
            self.emit_event(EngineEvent::NotificationFailed {
                status: notification.status.clone(),
                error: e.to_string(),
            });

            return match self.on_notify_failure {
                NotifyFailurePolicy::Retry => {
                    error!(
                        "Failed to notify status '{}' via {}: {}",
                        notification.status,
                        self.notifier.notifier_name(),
                        e
                    );
                    self.phase = DriverState::RetryWait;
                    Ok(PollOutcome::NotifyFailed {
                        status: notification.status,
                        error: e.to_string(),
                    })
                }
                NotifyFailurePolicy::Abort => {
                    // Nothing was committed; a later poll starts over
                    self.phase = DriverState::Polling;
                    Err(e)
                }
            };
        }

        self.emit_event(EngineEvent::NotificationSent {
            status: notification.status.clone(),
            events_count: notification.events.len(),
        });

        let delivered = snapshot.is_delivered();
        self.state.commit(snapshot);

        if delivered {
            self.phase = DriverState::Terminated;
            Ok(PollOutcome::Delivered)
        } else {
            self.phase = DriverState::Polling;
            Ok(PollOutcome::Notified {
                status: notification.status,
            })
        }
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}

/// Resolve when the test signal fires, or on SIGINT when there is none
async fn wait_for_shutdown(shutdown_rx: &mut Option<oneshot::Receiver<()>>) {
    match shutdown_rx {
        Some(rx) => {
            let _ = rx.await;
        }
        None => {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for SIGINT: {}", e);
                std::future::pending::<()>().await;
            }
        }
    }
}
