// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    guest = { Role::Guest, "guest" },
    user = { Role::User, "user" },
    admin = { Role::Admin, "admin" },
    superadmin = { Role::Superadmin, "superadmin" },
)]
fn role_round_trips_through_str(role: Role, s: &str) {
    assert_eq!(role.as_str(), s);
    assert_eq!(s.parse::<Role>().unwrap(), role);
    assert_eq!(role.to_string(), s);
}

#[test]
fn role_parse_is_case_insensitive() {
    assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
    assert_eq!("SUPERADMIN".parse::<Role>().unwrap(), Role::Superadmin);
}

#[test]
fn role_parse_rejects_unknown() {
    let err = "root".parse::<Role>().unwrap_err();
    assert!(matches!(err, Error::InvalidRole(_)));
}

#[parameterized(
    guest = { Role::Guest, false, false, false, false },
    user = { Role::User, true, false, false, false },
    admin = { Role::Admin, true, true, false, true },
    superadmin = { Role::Superadmin, true, true, true, true },
)]
fn role_capabilities(role: Role, syncs: bool, manages: bool, assigns: bool, blocks: bool) {
    assert_eq!(role.syncs_remotely(), syncs);
    assert_eq!(role.manages_users(), manages);
    assert_eq!(role.assigns_roles(), assigns);
    assert_eq!(role.toggles_blocks(), blocks);
}

#[test]
fn password_hash_round_trip() {
    let (hash, salt) = hash_password("hunter2");

    assert!(verify_password("hunter2", &hash, &salt));
    assert!(!verify_password("hunter3", &hash, &salt));
}

#[test]
fn password_hash_uses_fresh_salt() {
    let (hash_a, salt_a) = hash_password("hunter2");
    let (hash_b, salt_b) = hash_password("hunter2");

    assert_ne!(salt_a, salt_b);
    assert_ne!(hash_a, hash_b);
}

#[test]
fn external_account_never_verifies() {
    let user = User::external("Alice", "alice@example.com");

    assert!(user.is_externally_authenticated());
    assert_eq!(user.salt, EXTERNAL_AUTH_SALT);
    assert!(!verify_password(EXTERNAL_AUTH, &user.password_hash, &user.salt));
    assert!(!verify_password("", &user.password_hash, &user.salt));
}

#[test]
fn new_user_defaults() {
    let user = User::new("Bob", "bob@example.com", "secret");

    assert_eq!(user.role, Role::User);
    assert!(!user.is_blocked);
    assert!(!user.use_biometrics);
    assert!(!user.pending_sync);
    assert!(!user.is_externally_authenticated());
    assert!(verify_password("secret", &user.password_hash, &user.salt));
}
