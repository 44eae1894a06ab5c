// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    trip_not_found = { Error::TripNotFound(42), "42" },
    user_not_found = { Error::UserNotFound("a@b.com".into()), "a@b.com" },
    duplicate_user = { Error::DuplicateUser("a@b.com".into()), "already exists" },
    invalid_role = { Error::InvalidRole("root".into()), "valid roles" },
    lock_poisoned = { Error::LockPoisoned("push"), "push" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn error_from_json() {
    let json_err = serde_json::from_str::<()>("invalid").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn error_from_rusqlite() {
    let db_err = rusqlite::Error::QueryReturnedNoRows;
    let err: Error = db_err.into();
    assert!(matches!(err, Error::Database(_)));
}
