// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

fn paris_trip() -> Trip {
    Trip::new_local(
        "Spring break",
        "Paris",
        "2026-04-01",
        "2026-04-07",
        "pack light",
        "alice@example.com",
    )
}

#[test]
fn new_local_starts_unconfirmed() {
    let trip = paris_trip();
    assert_eq!(trip.id, 0);
    assert!(trip.pending_sync);
    assert!(!trip.is_synced);
    assert!(!trip.has_weather());
}

#[test]
fn mark_pulled_confirms_record() {
    let trip = paris_trip().mark_pulled();
    assert!(!trip.pending_sync);
    assert!(trip.is_synced);
}

#[test]
fn has_weather_requires_both_fields() {
    let mut trip = paris_trip();
    trip.weather_temp = Some("20°C".into());
    assert!(!trip.has_weather());

    trip.weather_description = Some("Clear".into());
    assert!(trip.has_weather());
}

#[test]
fn wire_form_uses_camel_case_and_skips_flags() {
    let trip = paris_trip();
    let json = serde_json::to_value(&trip).unwrap();

    assert_eq!(json["startDate"], "2026-04-01");
    assert_eq!(json["ownerEmail"], "alice@example.com");
    assert!(json.get("pendingSync").is_none());
    assert!(json.get("isSynced").is_none());
    // Absent weather is omitted entirely, not serialized as null
    assert!(json.get("weatherTemp").is_none());
}

#[test]
fn decodes_remote_payload() {
    let json = r#"{
        "id": 101,
        "title": "Spring break",
        "destination": "Paris",
        "startDate": "2026-04-01",
        "endDate": "2026-04-07",
        "notes": "",
        "ownerEmail": "alice@example.com",
        "weatherTemp": "20°C",
        "weatherDescription": "Clear"
    }"#;

    let trip: Trip = serde_json::from_str(json).unwrap();
    assert_eq!(trip.id, 101);
    assert_eq!(trip.weather_temp.as_deref(), Some("20°C"));
    // Flags are local bookkeeping and default to false on decode
    assert!(!trip.pending_sync);
    assert!(!trip.is_synced);
}

#[test]
fn decodes_payload_with_null_weather() {
    let json = r#"{
        "id": 7,
        "title": "t",
        "destination": "Oslo",
        "startDate": "2026-01-01",
        "endDate": "2026-01-02",
        "notes": "",
        "ownerEmail": "a@b.com",
        "weatherTemp": null,
        "weatherDescription": null
    }"#;

    let trip: Trip = serde_json::from_str(json).unwrap();
    assert!(trip.weather_temp.is_none());
    assert!(trip.weather_description.is_none());
}
