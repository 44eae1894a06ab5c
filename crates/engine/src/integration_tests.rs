// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end tests wiring monitor, coordinator, store and enricher.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use crate::connectivity::ConnectivityMonitor;
use crate::sync::{CycleOutcome, SyncCoordinator};
use crate::test_helpers::{
    make_local_trip, make_pulled_trip, make_store, user_session, MockProbe, MockRemote,
    MockWeather,
};
use crate::weather::WeatherEnricher;
use tm_core::{pending, Database};

#[tokio::test]
async fn offline_create_then_reconnect_converges_on_server_state() {
    // On-disk store: the same cache an embedding application would open
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Mutex::new(
        Database::open(&dir.path().join("cache.db")).unwrap(),
    ));
    let owner = "alice@example.com";

    // Created while offline: immediately pending
    let local_id = {
        let mut db = store.lock().unwrap();
        let mut trip = make_local_trip(owner, "Drafted on the plane");
        pending::stage_trip(&mut db, &mut trip).unwrap();
        assert!(db.get_trip(trip.id).unwrap().pending_sync);
        trip.id
    };

    // The service acknowledges the push and later hands back its own record
    let remote = MockRemote::new();
    remote.set_pull_result(vec![make_pulled_trip(501, owner, "Drafted on the plane")]);

    let probe = MockProbe::new();
    probe.queue(true);
    let monitor = ConnectivityMonitor::new(probe);
    let mut transitions = monitor.subscribe();

    let enricher = WeatherEnricher::new(MockWeather::new(), monitor.online_handle());
    let coordinator = Arc::new(SyncCoordinator::new(
        Arc::clone(&store),
        remote.clone(),
        enricher,
        monitor.online_handle(),
    ));

    // Still offline: the cycle is skipped, nothing is lost
    let session = user_session();
    assert_eq!(
        coordinator.sync_trips(&session).await.unwrap(),
        CycleOutcome::Offline
    );

    // Connectivity returns and is verified
    monitor.handle_interface_event().await;
    let online = transitions.recv().await.unwrap();
    assert!(online);

    coordinator.handle_transition(online, &session).await.unwrap();

    // The push carried the offline-created record
    let pushes = remote.pushes.lock().unwrap();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].len(), 1);
    assert_eq!(pushes[0][0].id, local_id);
    assert_eq!(remote.fetch_calls.load(Ordering::SeqCst), 1);
    drop(pushes);

    // The local cache now holds exactly the server-returned version
    let db = store.lock().unwrap();
    let local = db.trips_for_owner(owner).unwrap();
    assert_eq!(local.len(), 1);
    assert_eq!(local[0].id, 501);
    assert!(local[0].is_synced);
    assert!(!local[0].pending_sync);
    assert!(pending::pending_trips(&db, Some(owner)).unwrap().is_empty());
}

#[tokio::test]
async fn enrichment_propagates_on_the_following_cycle() {
    let store = make_store();
    let owner = "alice@example.com";

    // Server record without weather
    let remote = MockRemote::new();
    let mut server_trip = make_pulled_trip(601, owner, "City hop");
    server_trip.weather_temp = None;
    server_trip.weather_description = None;
    remote.set_pull_result(vec![server_trip]);

    let weather = MockWeather::with_report("Paris", "20°C", "Clear");
    let online = crate::connectivity::OnlineHandle::fixed(true);
    let enricher = WeatherEnricher::new(weather, online.clone());
    let coordinator = SyncCoordinator::new(Arc::clone(&store), remote.clone(), enricher, online);

    let session = user_session();
    coordinator.sync_trips(&session).await.unwrap();

    // Enrichment wrote the derived fields and re-marked the record pending
    {
        let db = store.lock().unwrap();
        let trip = db.get_trip(601).unwrap();
        assert_eq!(trip.weather_temp.as_deref(), Some("20°C"));
        assert_eq!(trip.weather_description.as_deref(), Some("Clear"));
        assert!(trip.pending_sync);
    }

    // The next cycle pushes the enriched record back to the service
    coordinator.sync_trips(&session).await.unwrap();
    let pushes = remote.pushes.lock().unwrap();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0][0].id, 601);
    assert_eq!(pushes[0][0].weather_temp.as_deref(), Some("20°C"));
}
