// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Trip records held in the local cache.
//!
//! A trip is always owned by exactly one principal (identified by email) and
//! carries two reconciliation flags:
//!
//! - `pending_sync`: a local mutation has not yet been acknowledged by the
//!   remote service. Set by every local write path, cleared only by an
//!   acknowledged push.
//! - `is_synced`: the record has been confirmed by the remote service at
//!   least once.
//!
//! Wire serialization uses camelCase keys to match the remote service's JSON
//! (`startDate`, `ownerEmail`, ...). The two flags are local bookkeeping and
//! never cross the wire.

use serde::{Deserialize, Serialize};

/// A trip record, as stored locally and exchanged with the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    /// Local row id, assigned on insert. After the first acknowledged sync
    /// the pull replaces it with the server-held identifier.
    #[serde(default)]
    pub id: i64,
    /// Short label shown in listings.
    pub title: String,
    /// Free-text destination; also the weather lookup key.
    pub destination: String,
    /// Start date as entered by the user.
    pub start_date: String,
    /// End date as entered by the user.
    pub end_date: String,
    /// Free-form notes.
    pub notes: String,
    /// Email of the owning principal. Queries are always scoped by this
    /// field; the engine never merges records across owners.
    pub owner_email: String,
    /// Derived: temperature at the destination (e.g. "20°C").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_temp: Option<String>,
    /// Derived: short weather description (e.g. "Clear").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_description: Option<String>,
    /// Local mutation not yet acknowledged by the remote service.
    #[serde(skip)]
    pub pending_sync: bool,
    /// Confirmed by the remote service at least once.
    #[serde(skip)]
    pub is_synced: bool,
}

impl Trip {
    /// Creates a trip from a local edit path. The record starts unconfirmed:
    /// `pending_sync=true`, `is_synced=false`, id assigned by the store.
    pub fn new_local(
        title: impl Into<String>,
        destination: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
        notes: impl Into<String>,
        owner_email: impl Into<String>,
    ) -> Self {
        Trip {
            id: 0,
            title: title.into(),
            destination: destination.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            notes: notes.into(),
            owner_email: owner_email.into(),
            weather_temp: None,
            weather_description: None,
            pending_sync: true,
            is_synced: false,
        }
    }

    /// Normalizes a record decoded from a pull response: authoritative
    /// records arrive confirmed and carry no unacknowledged local state.
    pub fn mark_pulled(mut self) -> Self {
        self.pending_sync = false;
        self.is_synced = true;
        self
    }

    /// Returns true when both derived weather fields are present.
    pub fn has_weather(&self) -> bool {
        self.weather_temp.is_some() && self.weather_description.is_some()
    }
}

#[cfg(test)]
#[path = "trip_tests.rs"]
mod tests;
