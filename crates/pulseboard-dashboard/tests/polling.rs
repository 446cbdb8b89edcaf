//! Integration tests for the polling coordinator driving a real view
#![forbid(unsafe_code)]
#![allow(clippy::unwrap_used)]

mod common;

use common::*;
use pretty_assertions::assert_eq;
use pulseboard_core::types::AlertStatus;
use pulseboard_dashboard::{DashboardError, SupplyChainView};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// N identical successful cycles leave the same collection as the first one
#[tokio::test]
async fn test_repeated_cycles_do_not_drift() {
    init_test_logging();
    let source = CountingSource::new();
    let view = SupplyChainView::new(source.clone(), &test_config()).unwrap();

    view.refresh().await;
    let first = (view.trucks(), view.stores(), view.alerts());

    for _ in 0..5 {
        view.refresh().await;
    }

    assert_eq!((view.trucks(), view.stores(), view.alerts()), first);
    assert_eq!(view.trucks().len(), 2);
    assert_eq!(source.truck_calls(), 6);
    assert_eq!(view.poller().stats().cycles, 6);
}

/// A failed cycle keeps the previous value and flags the resource
#[tokio::test]
async fn test_failed_cycle_keeps_previous_value() {
    init_test_logging();
    let source = CountingSource::new();
    let view = SupplyChainView::new(source.clone(), &test_config()).unwrap();

    view.refresh().await;
    let before = view.trucks();
    let health_before = view.summary().health_score;

    source.set_failing(true);
    let report = view.refresh().await;
    assert!(!report.is_clean());
    assert_eq!(view.trucks(), before);
    assert_eq!(view.summary().health_score, health_before);

    let flagged: Vec<_> = view.errors().into_iter().map(|e| e.resource).collect();
    assert!(flagged.contains(&"trucks".to_string()));
    assert!(flagged.contains(&"alerts".to_string()));

    // Next good cycle clears the flags
    source.set_failing(false);
    assert!(view.refresh().await.is_clean());
    assert!(view.errors().is_empty());
}

/// No fetch happens after deactivation, even long past the interval
#[tokio::test(start_paused = true)]
async fn test_no_fetch_after_deactivate() {
    init_test_logging();
    let source = CountingSource::new();
    let view = SupplyChainView::new(source.clone(), &test_config()).unwrap();

    view.activate().await.unwrap();
    assert_eq!(source.truck_calls(), 1);

    let report = view.poller().wait_for_cycle().await.unwrap();
    assert!(!report.manual);
    assert_eq!(source.truck_calls(), 2);

    view.deactivate().await.unwrap();
    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(source.truck_calls(), 2);

    assert!(matches!(
        view.poller().wait_for_cycle().await,
        Err(DashboardError::NotActive)
    ));
}

/// A manual refresh runs immediately and leaves the timer on its schedule
#[tokio::test(start_paused = true)]
async fn test_manual_refresh_keeps_schedule() {
    init_test_logging();
    let source = CountingSource::new();
    let view = SupplyChainView::new(source.clone(), &test_config()).unwrap();

    let start = Instant::now();
    view.activate().await.unwrap();

    tokio::time::sleep(Duration::from_secs(20)).await;
    let manual = view.refresh().await;
    assert!(manual.manual);
    assert_eq!(source.truck_calls(), 2);

    view.poller().wait_for_cycle().await.unwrap();
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(30));
    assert!(elapsed < Duration::from_secs(31));
    assert_eq!(source.truck_calls(), 3);

    view.deactivate().await.unwrap();
}

/// Activating twice is rejected without arming a second timer
#[tokio::test(start_paused = true)]
async fn test_double_activation_rejected() {
    let source = CountingSource::new();
    let view = SupplyChainView::new(source.clone(), &test_config()).unwrap();

    view.activate().await.unwrap();
    assert!(matches!(
        view.activate().await,
        Err(DashboardError::AlreadyActive)
    ));
    assert_eq!(source.truck_calls(), 1);
    view.deactivate().await.unwrap();
}

/// A poll issued before a dismissal does not undo it when it lands late
#[tokio::test]
async fn test_stale_poll_does_not_flicker_dismissal() {
    init_test_logging();
    let source = CountingSource::new();
    let view = Arc::new(SupplyChainView::new(source.clone(), &test_config()).unwrap());
    view.refresh().await;

    source.hold_alerts();
    let in_flight = tokio::spawn({
        let view = view.clone();
        async move { view.refresh().await }
    });
    while source.alert_calls() < 2 {
        tokio::task::yield_now().await;
    }

    tokio::time::sleep(Duration::from_millis(5)).await;
    view.dismiss_alert("A-1").await.unwrap();

    source.release_alerts();
    in_flight.await.unwrap();

    let status = |view: &SupplyChainView| {
        view.alerts()
            .into_iter()
            .find(|a| a.id == "A-1")
            .map(|a| a.status)
    };
    assert_eq!(status(&view), Some(AlertStatus::Dismissed));

    // A poll issued after the confirmation carries the backend's own state
    view.refresh().await;
    assert_eq!(status(&view), Some(AlertStatus::Dismissed));
}

/// An older poll landing after a newer one leaves the newer snapshot in place
#[tokio::test]
async fn test_older_response_after_newer_is_dropped() {
    init_test_logging();
    let source = CountingSource::new();
    let view = Arc::new(SupplyChainView::new(source.clone(), &test_config()).unwrap());
    view.refresh().await;

    source.hold_alerts();
    let older = tokio::spawn({
        let view = view.clone();
        async move { view.refresh().await }
    });
    while source.alert_calls() < 2 {
        tokio::task::yield_now().await;
    }

    tokio::time::sleep(Duration::from_millis(5)).await;
    view.dismiss_alert("A-1").await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let status = |view: &SupplyChainView| {
        view.alerts()
            .into_iter()
            .find(|a| a.id == "A-1")
            .map(|a| a.status)
    };

    source.resume_alerts();
    view.refresh().await;
    assert_eq!(status(&view), Some(AlertStatus::Dismissed));

    source.release_alerts();
    older.await.unwrap();
    assert_eq!(status(&view), Some(AlertStatus::Dismissed));
    assert!(!view.is_loading());
}
