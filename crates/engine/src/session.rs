// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticated session handed to the engine by the login collaborator.
//!
//! The role (and with it every capability) is fixed when the session is
//! built; call sites ask the role's capability predicates instead of
//! re-deriving role strings.

use tm_core::Role;

/// An authenticated principal as seen by the engine.
#[derive(Debug, Clone)]
pub struct Session {
    /// Bearer token for the remote service. Empty for guests, whose records
    /// never leave the device.
    pub token: String,
    /// Owner identifier; scopes every store query.
    pub email: String,
    pub role: Role,
}

impl Session {
    /// Session for a principal authenticated against the remote service.
    pub fn new(token: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Session {
            token: token.into(),
            email: email.into(),
            role,
        }
    }

    /// Local-only guest session; carries no token.
    pub fn guest(email: impl Into<String>) -> Self {
        Session {
            token: String::new(),
            email: email.into(),
            role: Role::Guest,
        }
    }

    /// True when this principal's records stay local.
    pub fn is_guest(&self) -> bool {
        !self.role.syncs_remotely()
    }
}
