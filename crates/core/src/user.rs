// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! User accounts and the role/capability model.
//!
//! Roles form a single tagged enum with capability predicates; call sites
//! branch on a capability ("may this session manage users?") rather than
//! re-deriving role strings at every call site.
//!
//! Credential material is either a SHA-256(salt ‖ password) digest encoded
//! as Base64 with a UUIDv4 salt, or the [`EXTERNAL_AUTH`] sentinel pair for
//! accounts authenticated by an external identity provider. Full login and
//! registration flows live outside this crate; only the material and its
//! verification helper are defined here.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Sentinel stored in place of a password hash for externally authenticated
/// accounts. Such accounts never verify against a local password.
pub const EXTERNAL_AUTH: &str = "external-auth";

/// Salt stored alongside [`EXTERNAL_AUTH`].
pub const EXTERNAL_AUTH_SALT: &str = "NO_SALT";

/// Session role of a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Local-only identity; records never leave the device.
    Guest,
    /// Regular account.
    User,
    /// May list users and toggle block status.
    Admin,
    /// May additionally assign roles.
    Superadmin,
}

impl Role {
    /// Returns the string representation used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::User => "user",
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        }
    }

    /// True when records owned by this principal are transmitted to the
    /// remote service. Guest trips stay local.
    pub fn syncs_remotely(&self) -> bool {
        !matches!(self, Role::Guest)
    }

    /// True when this role may list users and replay user mutations.
    pub fn manages_users(&self) -> bool {
        matches!(self, Role::Admin | Role::Superadmin)
    }

    /// True when this role may assign roles to other users.
    pub fn assigns_roles(&self) -> bool {
        matches!(self, Role::Superadmin)
    }

    /// True when this role may block and unblock users.
    pub fn toggles_blocks(&self) -> bool {
        matches!(self, Role::Admin | Role::Superadmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "guest" => Ok(Role::Guest),
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "superadmin" => Ok(Role::Superadmin),
            _ => Err(Error::InvalidRole(s.to_string())),
        }
    }
}

/// A locally held user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Local row id, assigned on insert.
    pub id: i64,
    pub name: String,
    /// Unique account identifier; trips reference it by value.
    pub email: String,
    /// Base64 SHA-256 digest, or [`EXTERNAL_AUTH`].
    pub password_hash: String,
    pub salt: String,
    pub role: Role,
    pub is_blocked: bool,
    /// Preference flag consumed by the UI collaborator.
    pub use_biometrics: bool,
    /// A role/block mutation was applied locally and not yet replayed.
    pub pending_sync: bool,
}

impl User {
    /// Creates an account with a locally verifiable password.
    pub fn new(name: impl Into<String>, email: impl Into<String>, password: &str) -> Self {
        let (password_hash, salt) = hash_password(password);
        User {
            id: 0,
            name: name.into(),
            email: email.into(),
            password_hash,
            salt,
            role: Role::User,
            is_blocked: false,
            use_biometrics: false,
            pending_sync: false,
        }
    }

    /// Creates an account backed by an external identity provider. No local
    /// password is stored; [`verify_password`] always fails for it.
    pub fn external(name: impl Into<String>, email: impl Into<String>) -> Self {
        User {
            id: 0,
            name: name.into(),
            email: email.into(),
            password_hash: EXTERNAL_AUTH.to_string(),
            salt: EXTERNAL_AUTH_SALT.to_string(),
            role: Role::User,
            is_blocked: false,
            use_biometrics: false,
            pending_sync: false,
        }
    }

    /// True when the account carries the external-auth sentinel instead of a
    /// password hash.
    pub fn is_externally_authenticated(&self) -> bool {
        self.password_hash == EXTERNAL_AUTH
    }
}

/// Hashes a password with a fresh UUIDv4 salt.
///
/// Returns `(hash, salt)`, where the hash is the Base64 encoding of
/// SHA-256(salt ‖ password).
pub fn hash_password(password: &str) -> (String, String) {
    let salt = Uuid::new_v4().to_string();
    (hash_with_salt(password, &salt), salt)
}

/// Verifies a password attempt against stored credential material.
///
/// Externally authenticated accounts never match a local password.
pub fn verify_password(attempt: &str, stored_hash: &str, salt: &str) -> bool {
    if stored_hash == EXTERNAL_AUTH {
        return false;
    }
    hash_with_salt(attempt, salt) == stored_hash
}

fn hash_with_salt(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    BASE64.encode(hasher.finalize())
}

#[cfg(test)]
#[path = "user_tests.rs"]
mod tests;
