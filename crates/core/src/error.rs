// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for tm-core operations.

use thiserror::Error;

/// All possible errors that can occur in tm-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("trip not found: {0}")]
    TripNotFound(i64),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("user already exists: {0}")]
    DuplicateUser(String),

    #[error("invalid role: '{0}'\n  hint: valid roles are: guest, user, admin, superadmin")]
    InvalidRole(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("store lock poisoned in {0}")]
    LockPoisoned(&'static str),
}

/// A specialized Result type for tm-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
