// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending-change bookkeeping over the local store.
//!
//! Pending state is a single boolean per record, not an operation log: only
//! the latest field values are ever replayed, and sequential edits made while
//! offline collapse into one. Richer replay would need an append-only change
//! journal in place of the flag; the reconciliation protocol only ever
//! replays latest values.
//!
//! All operations are idempotent: marking an already-pending record (or
//! clearing an already-clear one) leaves the store unchanged.

use crate::db::Database;
use crate::error::Result;
use crate::trip::Trip;
use crate::user::User;

/// Stage a trip mutation from a local edit path.
///
/// Inserts the record (assigning its id) when it has none, updates it
/// otherwise; either way the record is left marked pending. This is the one
/// write path local editors share with the engine, so both agree that every
/// local mutation sets the flag.
pub fn stage_trip(db: &mut Database, trip: &mut Trip) -> Result<()> {
    trip.pending_sync = true;
    if trip.id == 0 {
        trip.is_synced = false;
        trip.id = db.insert_trip(trip)?;
    } else {
        db.update_trip(trip)?;
    }
    Ok(())
}

/// Mark a trip as awaiting acknowledgment.
pub fn mark_trip_pending(db: &mut Database, id: i64) -> Result<()> {
    db.set_trip_pending(id, true)
}

/// Clear a trip's pending flag. Only the engine calls this, and only on a
/// positively acknowledged push.
pub fn clear_trip_pending(db: &mut Database, id: i64) -> Result<()> {
    db.set_trip_pending(id, false)
}

/// Current pending trips, for one owner or for all. Order is irrelevant.
pub fn pending_trips(db: &Database, owner_email: Option<&str>) -> Result<Vec<Trip>> {
    db.pending_trips(owner_email)
}

/// Mark a user as carrying an unreplayed role/block mutation.
pub fn mark_user_pending(db: &mut Database, email: &str) -> Result<()> {
    db.set_user_pending(email, true)
}

/// Clear a user's pending flag after its mutations were replayed.
pub fn clear_user_pending(db: &mut Database, email: &str) -> Result<()> {
    db.set_user_pending(email, false)
}

/// Current pending users.
pub fn pending_users(db: &Database) -> Result<Vec<User>> {
    db.pending_users()
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
