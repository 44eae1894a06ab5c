// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tm_core::Trip;

#[test]
fn decode_pulled_normalizes_records() {
    let body = r#"{
        "trips": [{
            "id": 101,
            "title": "Spring break",
            "destination": "Paris",
            "startDate": "2026-04-01",
            "endDate": "2026-04-07",
            "notes": "",
            "ownerEmail": "alice@example.com",
            "weatherTemp": null,
            "weatherDescription": null
        }]
    }"#;

    let trips = decode_pulled(body).unwrap();
    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].id, 101);
    assert!(trips[0].is_synced);
    assert!(!trips[0].pending_sync);
}

#[test]
fn decode_pulled_empty_set() {
    let trips = decode_pulled(r#"{"trips": []}"#).unwrap();
    assert!(trips.is_empty());
}

#[test]
fn decode_pulled_rejects_garbage() {
    let err = decode_pulled("not json").unwrap_err();
    assert!(matches!(err, RemoteError::Malformed(_)));

    let err = decode_pulled(r#"{"unexpected": 1}"#).unwrap_err();
    assert!(matches!(err, RemoteError::Malformed(_)));
}

#[test]
fn decode_sync_response() {
    let resp: SyncResponse = decode(r#"{"synced": 3}"#).unwrap();
    assert_eq!(resp.synced, 3);
}

#[test]
fn decode_users_response_with_integer_flag() {
    let body = r#"{"users": [
        {"email": "a@b.com", "role": "user", "isBlocked": 0},
        {"email": "c@d.com", "role": "admin", "isBlocked": 1}
    ]}"#;

    let resp: UsersResponse = decode(body).unwrap();
    assert_eq!(resp.users.len(), 2);
    assert_eq!(resp.users[0].is_blocked, 0);
    assert_eq!(resp.users[1].is_blocked, 1);
}

#[test]
fn push_payload_uses_wire_casing() {
    let trips = vec![Trip::new_local(
        "T",
        "Paris",
        "2026-04-01",
        "2026-04-07",
        "",
        "alice@example.com",
    )];

    let value = serde_json::to_value(SyncRequest { trips: &trips }).unwrap();
    let first = &value["trips"][0];

    assert_eq!(first["startDate"], "2026-04-01");
    assert_eq!(first["ownerEmail"], "alice@example.com");
    assert!(first.get("pendingSync").is_none());
}

#[test]
fn client_trims_trailing_slash() {
    let settings = crate::config::RemoteSettings {
        base_url: "http://example.com/".to_string(),
        request_timeout_secs: 10,
    };

    let client = HttpRemoteClient::new(&settings).unwrap();
    assert_eq!(client.base_url, "http://example.com");
}

#[test]
fn error_display() {
    let err = RemoteError::Rejected { status: 401 };
    assert!(err.to_string().contains("401"));

    let err = RemoteError::Unreachable("timeout".into());
    assert!(err.to_string().contains("unreachable"));
}
