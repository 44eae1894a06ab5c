// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::test_helpers::MockProbe;
use tokio::sync::broadcast::error::TryRecvError;

fn monitor_with(verdicts: &[bool]) -> ConnectivityMonitor<MockProbe> {
    let probe = MockProbe::new();
    for &v in verdicts {
        probe.queue(v);
    }
    ConnectivityMonitor::new(probe)
}

#[tokio::test]
async fn verified_probe_goes_online_and_delivers() {
    let monitor = monitor_with(&[true]);
    let mut rx = monitor.subscribe();

    assert!(!monitor.is_currently_online());

    monitor.handle_interface_event().await;

    assert!(monitor.is_currently_online());
    assert_eq!(rx.try_recv().unwrap(), true);
}

#[tokio::test]
async fn repeated_raw_events_collapse_into_one_delivery() {
    let monitor = monitor_with(&[true, true, true]);
    let mut rx = monitor.subscribe();

    monitor.handle_interface_event().await;
    monitor.handle_interface_event().await;
    monitor.handle_interface_event().await;

    assert_eq!(rx.try_recv().unwrap(), true);
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn captive_portal_stays_offline_without_delivery() {
    // Interface is up, but the probe never sees the expected response
    let monitor = monitor_with(&[false, false]);
    let mut rx = monitor.subscribe();

    monitor.handle_interface_event().await;
    monitor.handle_interface_event().await;

    assert!(!monitor.is_currently_online());
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn flapping_link_delivers_each_transition() {
    let monitor = monitor_with(&[true, false, true]);
    let mut rx = monitor.subscribe();

    monitor.handle_interface_event().await;
    monitor.handle_interface_event().await;
    monitor.handle_interface_event().await;

    assert_eq!(rx.try_recv().unwrap(), true);
    assert_eq!(rx.try_recv().unwrap(), false);
    assert_eq!(rx.try_recv().unwrap(), true);
}

#[tokio::test]
async fn stop_discards_later_events() {
    let monitor = monitor_with(&[true]);
    let mut rx = monitor.subscribe();

    monitor.stop();
    monitor.handle_interface_event().await;

    assert!(!monitor.is_currently_online());
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn online_handle_tracks_monitor_state() {
    let monitor = monitor_with(&[true]);
    let handle = monitor.online_handle();

    assert!(!handle.is_online());
    monitor.handle_interface_event().await;
    assert!(handle.is_online());
}

#[test]
fn fixed_handle_is_detached() {
    assert!(OnlineHandle::fixed(true).is_online());
    assert!(!OnlineHandle::fixed(false).is_online());
}

#[test]
fn http_probe_builds_from_defaults() {
    let probe = HttpProbe::new(&ProbeSettings::default());
    assert!(probe.is_ok());
}
