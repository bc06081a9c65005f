//! Contract Test: Status Change Detection
//!
//! Verifies that notifications follow distinct status values, not polls.
//!
//! Constraints verified:
//! - The first successful poll always notifies (initial status is "")
//! - Repeating a status never notifies again
//! - Each distinct consecutive status notifies exactly once
//! - Event-only changes never notify
//! - The committed event list is replaced wholesale on every change

mod common;

use common::*;
use parcel_core::config::NotifyFailurePolicy;
use parcel_core::traits::TrackingEvent;
use parcel_core::{DriverState, PollOutcome};

#[tokio::test]
async fn first_successful_poll_always_notifies() {
    let source = ScriptedSource::new(vec![snapshot("Shipment information received")]);
    let notifier = RecordingNotifier::new();
    let sleeper = RecordingSleeper::new();
    let (mut engine, _events) = engine(&source, &notifier, &sleeper, NotifyFailurePolicy::Retry);

    assert_eq!(engine.state().status(), "");

    let outcome = engine.poll_once().await.unwrap();

    assert_eq!(
        outcome,
        PollOutcome::Notified {
            status: "Shipment information received".to_string()
        }
    );
    assert_eq!(notifier.sent_statuses(), vec!["Shipment information received"]);
    assert_eq!(engine.state().status(), "Shipment information received");
    assert_eq!(engine.phase(), DriverState::Polling);
}

#[tokio::test]
async fn unchanged_status_leaves_state_untouched() {
    let source = ScriptedSource::new(vec![
        snapshot("In Transit"),
        snapshot("In Transit"),
        snapshot("In Transit"),
        snapshot("In Transit"),
    ]);
    let notifier = RecordingNotifier::new();
    let sleeper = RecordingSleeper::new();
    let (mut engine, _events) = engine(&source, &notifier, &sleeper, NotifyFailurePolicy::Retry);

    engine.poll_once().await.unwrap();
    let committed = engine.state().clone();

    for _ in 0..3 {
        let outcome = engine.poll_once().await.unwrap();
        assert_eq!(
            outcome,
            PollOutcome::Unchanged {
                status: "In Transit".to_string()
            }
        );
        assert_eq!(engine.state(), &committed);
    }

    assert_eq!(notifier.attempts(), 1, "only the first poll may notify");
}

#[tokio::test]
async fn one_notification_per_distinct_status() {
    let source = ScriptedSource::new(vec![
        snapshot("Shipment picked up"),
        snapshot("Shipment picked up"),
        snapshot("In Transit"),
        snapshot("In Transit"),
        snapshot("In Transit"),
        snapshot("Customs clearance"),
        snapshot("In Transit"),
    ]);
    let notifier = RecordingNotifier::new();
    let sleeper = RecordingSleeper::new();
    let (mut engine, _events) = engine(&source, &notifier, &sleeper, NotifyFailurePolicy::Retry);

    for _ in 0..7 {
        engine.poll_once().await.unwrap();
    }

    assert_eq!(
        notifier.sent_statuses(),
        vec!["Shipment picked up", "In Transit", "Customs clearance", "In Transit"],
        "a status that comes back after a different one is a new change"
    );
}

#[tokio::test]
async fn comparison_is_exact_string_equality() {
    let source = ScriptedSource::new(vec![
        snapshot("In Transit"),
        snapshot("in transit"),
        snapshot("in transit "),
    ]);
    let notifier = RecordingNotifier::new();
    let sleeper = RecordingSleeper::new();
    let (mut engine, _events) = engine(&source, &notifier, &sleeper, NotifyFailurePolicy::Retry);

    for _ in 0..3 {
        engine.poll_once().await.unwrap();
    }

    assert_eq!(notifier.attempts(), 3);
}

#[tokio::test]
async fn event_only_change_does_not_notify() {
    let first = vec![TrackingEvent::new("2024-03-01", "08:00", "Miami", "Processed")];
    let second = vec![
        TrackingEvent::new("2024-03-02", "09:30", "Lima", "Arrived at facility"),
        TrackingEvent::new("2024-03-01", "08:00", "Miami", "Processed"),
    ];
    let source = ScriptedSource::new(vec![
        snapshot_with_events("In Transit", first.clone()),
        snapshot_with_events("In Transit", second),
    ]);
    let notifier = RecordingNotifier::new();
    let sleeper = RecordingSleeper::new();
    let (mut engine, _events) = engine(&source, &notifier, &sleeper, NotifyFailurePolicy::Retry);

    engine.poll_once().await.unwrap();
    let outcome = engine.poll_once().await.unwrap();

    assert!(matches!(outcome, PollOutcome::Unchanged { .. }));
    assert_eq!(notifier.attempts(), 1);
    assert_eq!(engine.state().events(), first.as_slice());
}

#[tokio::test]
async fn change_replaces_events_and_notifies_with_full_history() {
    let transit = vec![TrackingEvent::new("2024-03-01", "08:00", "Miami", "Processed")];
    let out_for_delivery = vec![
        TrackingEvent::new("2024-03-03", "07:10", "Lima", "With delivery courier"),
        TrackingEvent::new("2024-03-02", "21:40", "Lima", "Arrived at facility"),
        TrackingEvent::new("2024-03-01", "08:00", "Miami", "Processed"),
    ];
    let source = ScriptedSource::new(vec![
        snapshot_with_events("In Transit", transit),
        snapshot_with_events("Out for Delivery", out_for_delivery.clone()),
    ]);
    let notifier = RecordingNotifier::new();
    let sleeper = RecordingSleeper::new();
    let (mut engine, _events) = engine(&source, &notifier, &sleeper, NotifyFailurePolicy::Retry);

    engine.poll_once().await.unwrap();
    engine.poll_once().await.unwrap();

    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].tracking_number, TRACKING_NUMBER);
    assert_eq!(sent[1].events, out_for_delivery);
    assert_eq!(engine.state().events(), out_for_delivery.as_slice());
}

#[tokio::test]
async fn empty_event_list_still_notifies() {
    let source = ScriptedSource::new(vec![snapshot_with_events("Pre-transit", Vec::new())]);
    let notifier = RecordingNotifier::new();
    let sleeper = RecordingSleeper::new();
    let (mut engine, _events) = engine(&source, &notifier, &sleeper, NotifyFailurePolicy::Retry);

    engine.poll_once().await.unwrap();

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].events.is_empty());
}

#[tokio::test]
async fn successful_polls_wait_the_normal_interval() {
    let source = ScriptedSource::new(vec![
        snapshot("In Transit"),
        snapshot("In Transit"),
        snapshot("Out for Delivery"),
    ]);
    let notifier = RecordingNotifier::new();
    let sleeper = RecordingSleeper::new();
    let (mut engine, _events) = engine(&source, &notifier, &sleeper, NotifyFailurePolicy::Retry);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let watcher = source.clone();
    let handle = tokio::spawn(async move {
        let result = engine.run_with_shutdown(Some(shutdown_rx)).await;
        (engine, result)
    });

    watcher.exhausted().await;
    shutdown_tx.send(()).unwrap();
    let (engine, result) = handle.await.unwrap();

    assert!(result.is_ok());
    assert_eq!(sleeper.waits(), vec![POLL, POLL, POLL]);
    assert_eq!(notifier.sent_statuses(), vec!["In Transit", "Out for Delivery"]);
    assert_eq!(engine.state().status(), "Out for Delivery");
}
