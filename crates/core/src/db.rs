// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed local store for trip and user records.
//!
//! The [`Database`] struct provides all data access operations. Writes go
//! straight to the connection, so a write is visible to the next read issued
//! through the same handle. The handle is constructed explicitly and passed
//! to every component; there is no ambient global instance.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::error::{Error, Result};
use crate::trip::Trip;
use crate::user::{Role, User};

/// SQL schema for the local cache.
pub const SCHEMA: &str = r#"
-- Trips, always scoped by owner_email
CREATE TABLE IF NOT EXISTS trips (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    destination TEXT NOT NULL,
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    notes TEXT NOT NULL,
    owner_email TEXT NOT NULL,
    weather_temp TEXT,
    weather_description TEXT,
    pending_sync INTEGER NOT NULL DEFAULT 0,
    is_synced INTEGER NOT NULL DEFAULT 0
);

-- Local user accounts
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    salt TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'user',
    is_blocked INTEGER NOT NULL DEFAULT 0,
    use_biometrics INTEGER NOT NULL DEFAULT 0,
    pending_sync INTEGER NOT NULL DEFAULT 0
);

-- Per-owner reconciliation bookkeeping
CREATE TABLE IF NOT EXISTS sync_meta (
    owner_email TEXT PRIMARY KEY,
    last_synced_at TEXT NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_trips_owner ON trips(owner_email);
CREATE INDEX IF NOT EXISTS idx_trips_pending ON trips(pending_sync);
CREATE INDEX IF NOT EXISTS idx_users_pending ON users(pending_sync);
"#;

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid value '{value}' in column '{column}'"
            ))),
        )
    })
}

/// Run schema creation and all migrations on a database connection.
///
/// This is the single migration path for every consumer of the store. It
/// applies the canonical schema and runs idempotent migrations to upgrade
/// older databases that may be missing columns.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    migrate_add_use_biometrics(conn)?;
    migrate_add_sync_flags(conn)?;
    Ok(())
}

/// Migration: add the biometrics preference column to existing databases.
fn migrate_add_use_biometrics(conn: &Connection) -> Result<()> {
    if !has_column(conn, "users", "use_biometrics") {
        conn.execute(
            "ALTER TABLE users ADD COLUMN use_biometrics INTEGER NOT NULL DEFAULT 0",
            [],
        )?;
    }
    Ok(())
}

/// Migration: add the reconciliation flag columns.
///
/// Stores created before the sync engine existed carry neither flag; records
/// in such stores were never pushed, so both default to 0.
fn migrate_add_sync_flags(conn: &Connection) -> Result<()> {
    for (table, column) in [
        ("trips", "pending_sync"),
        ("trips", "is_synced"),
        ("users", "pending_sync"),
    ] {
        if !has_column(conn, table, column) {
            let sql = format!("ALTER TABLE {table} ADD COLUMN {column} INTEGER NOT NULL DEFAULT 0");
            conn.execute(&sql, [])?;
        }
    }
    Ok(())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> bool {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM pragma_table_info(?1) WHERE name = ?2",
        params![table, column],
        |row| row.get(0),
    )
    .unwrap_or(false)
}

/// SQLite database connection with trip and user operations.
pub struct Database {
    /// The underlying SQLite connection.
    pub conn: Connection,
}

impl Database {
    /// Open a database connection at the given path, creating and migrating if needed.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // WAL mode for concurrent readers; busy timeout for writer overlap
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    // ------------------------------------------------------------------
    // Trips
    // ------------------------------------------------------------------

    /// Insert a trip, letting the store assign the row id.
    ///
    /// Returns the assigned id. The reconciliation flags are stored exactly
    /// as carried by the record.
    pub fn insert_trip(&self, trip: &Trip) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO trips (title, destination, start_date, end_date, notes,
             owner_email, weather_temp, weather_description, pending_sync, is_synced)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                trip.title,
                trip.destination,
                trip.start_date,
                trip.end_date,
                trip.notes,
                trip.owner_email,
                trip.weather_temp,
                trip.weather_description,
                trip.pending_sync,
                trip.is_synced,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert or replace a trip under its explicit id.
    pub fn upsert_trip(&self, trip: &Trip) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO trips (id, title, destination, start_date, end_date,
             notes, owner_email, weather_temp, weather_description, pending_sync, is_synced)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                trip.id,
                trip.title,
                trip.destination,
                trip.start_date,
                trip.end_date,
                trip.notes,
                trip.owner_email,
                trip.weather_temp,
                trip.weather_description,
                trip.pending_sync,
                trip.is_synced,
            ],
        )?;
        Ok(())
    }

    /// Get a trip by id.
    pub fn get_trip(&self, id: i64) -> Result<Trip> {
        let trip = self
            .conn
            .query_row(
                &format!("SELECT {TRIP_COLUMNS} FROM trips WHERE id = ?1"),
                params![id],
                trip_from_row,
            )
            .optional()?;

        trip.ok_or(Error::TripNotFound(id))
    }

    /// List all trips for one owner, newest first.
    pub fn trips_for_owner(&self, owner_email: &str) -> Result<Vec<Trip>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips WHERE owner_email = ?1 ORDER BY id DESC"
        ))?;
        let rows = stmt.query_map(params![owner_email], trip_from_row)?;
        collect_rows(rows)
    }

    /// List trips awaiting acknowledgment, for one owner or for all.
    pub fn pending_trips(&self, owner_email: Option<&str>) -> Result<Vec<Trip>> {
        match owner_email {
            Some(owner) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {TRIP_COLUMNS} FROM trips
                     WHERE pending_sync = 1 AND owner_email = ?1"
                ))?;
                let rows = stmt.query_map(params![owner], trip_from_row)?;
                collect_rows(rows)
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {TRIP_COLUMNS} FROM trips WHERE pending_sync = 1"
                ))?;
                let rows = stmt.query_map([], trip_from_row)?;
                collect_rows(rows)
            }
        }
    }

    /// Update every field of a trip under its id.
    pub fn update_trip(&mut self, trip: &Trip) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE trips SET title = ?1, destination = ?2, start_date = ?3,
             end_date = ?4, notes = ?5, owner_email = ?6, weather_temp = ?7,
             weather_description = ?8, pending_sync = ?9, is_synced = ?10
             WHERE id = ?11",
            params![
                trip.title,
                trip.destination,
                trip.start_date,
                trip.end_date,
                trip.notes,
                trip.owner_email,
                trip.weather_temp,
                trip.weather_description,
                trip.pending_sync,
                trip.is_synced,
                trip.id,
            ],
        )?;

        if affected == 0 {
            return Err(Error::TripNotFound(trip.id));
        }
        Ok(())
    }

    /// Set or clear the pending flag on one trip. Writing the value the
    /// record already holds is a no-op state change.
    pub fn set_trip_pending(&mut self, id: i64, pending: bool) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE trips SET pending_sync = ?1 WHERE id = ?2",
            params![pending, id],
        )?;

        if affected == 0 {
            return Err(Error::TripNotFound(id));
        }
        Ok(())
    }

    /// Clear the pending flag and set the synced flag on an acknowledged
    /// batch, in one transaction.
    pub fn mark_trips_synced(&mut self, ids: &[i64]) -> Result<()> {
        let tx = self.conn.transaction()?;
        for id in ids {
            tx.execute(
                "UPDATE trips SET pending_sync = 0, is_synced = 1 WHERE id = ?1",
                params![id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Update only the derived weather fields of a trip.
    pub fn update_weather(&mut self, id: i64, temp: &str, description: &str) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE trips SET weather_temp = ?1, weather_description = ?2 WHERE id = ?3",
            params![temp, description, id],
        )?;

        if affected == 0 {
            return Err(Error::TripNotFound(id));
        }
        Ok(())
    }

    /// Delete a trip by id. Deleting an absent id is a no-op.
    pub fn delete_trip(&mut self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM trips WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Delete every trip for one owner. Returns the number removed.
    pub fn delete_all_for_owner(&mut self, owner_email: &str) -> Result<usize> {
        let affected = self.conn.execute(
            "DELETE FROM trips WHERE owner_email = ?1",
            params![owner_email],
        )?;
        Ok(affected)
    }

    /// Bulk-insert trips under their explicit ids, in one transaction.
    /// Existing rows with the same id are replaced.
    pub fn bulk_insert_trips(&mut self, trips: &[Trip]) -> Result<()> {
        let tx = self.conn.transaction()?;
        for trip in trips {
            tx.execute(
                "INSERT OR REPLACE INTO trips (id, title, destination, start_date,
                 end_date, notes, owner_email, weather_temp, weather_description,
                 pending_sync, is_synced)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    trip.id,
                    trip.title,
                    trip.destination,
                    trip.start_date,
                    trip.end_date,
                    trip.notes,
                    trip.owner_email,
                    trip.weather_temp,
                    trip.weather_description,
                    trip.pending_sync,
                    trip.is_synced,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Replace-for-owner: delete every local trip for the owner and insert
    /// the authoritative set, atomically.
    pub fn replace_for_owner(&mut self, owner_email: &str, trips: &[Trip]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM trips WHERE owner_email = ?1",
            params![owner_email],
        )?;
        for trip in trips {
            tx.execute(
                "INSERT OR REPLACE INTO trips (id, title, destination, start_date,
                 end_date, notes, owner_email, weather_temp, weather_description,
                 pending_sync, is_synced)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    trip.id,
                    trip.title,
                    trip.destination,
                    trip.start_date,
                    trip.end_date,
                    trip.notes,
                    trip.owner_email,
                    trip.weather_temp,
                    trip.weather_description,
                    trip.pending_sync,
                    trip.is_synced,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Record the wall-clock time of the last successful reconciliation for
    /// an owner.
    pub fn record_sync_time(&mut self, owner_email: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sync_meta (owner_email, last_synced_at) VALUES (?1, ?2)
             ON CONFLICT(owner_email) DO UPDATE SET last_synced_at = excluded.last_synced_at",
            params![owner_email, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Last successful reconciliation time for an owner, if any.
    pub fn last_sync_time(&self, owner_email: &str) -> Result<Option<DateTime<Utc>>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT last_synced_at FROM sync_meta WHERE owner_email = ?1",
                params![owner_email],
                |row| row.get(0),
            )
            .optional()?;

        match value {
            None => Ok(None),
            Some(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|_| Error::CorruptedData(format!("invalid timestamp '{s}' in sync_meta"))),
        }
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Insert a user. Fails with [`Error::DuplicateUser`] if the email is
    /// already registered. Returns the assigned id.
    pub fn insert_user(&self, user: &User) -> Result<i64> {
        if self.user_by_email(&user.email)?.is_some() {
            return Err(Error::DuplicateUser(user.email.clone()));
        }

        self.conn.execute(
            "INSERT INTO users (name, email, password_hash, salt, role,
             is_blocked, use_biometrics, pending_sync)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user.name,
                user.email,
                user.password_hash,
                user.salt,
                user.role.as_str(),
                user.is_blocked,
                user.use_biometrics,
                user.pending_sync,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Look up a user by email.
    pub fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// List every user, ordered by email.
    pub fn all_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY email"))?;
        let rows = stmt.query_map([], user_from_row)?;
        collect_rows(rows)
    }

    /// List users with unreplayed role/block mutations.
    pub fn pending_users(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE pending_sync = 1 ORDER BY email"
        ))?;
        let rows = stmt.query_map([], user_from_row)?;
        collect_rows(rows)
    }

    /// Change a user's role.
    pub fn update_user_role(&mut self, email: &str, role: Role) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE users SET role = ?1 WHERE email = ?2",
            params![role.as_str(), email],
        )?;

        if affected == 0 {
            return Err(Error::UserNotFound(email.to_string()));
        }
        Ok(())
    }

    /// Block or unblock a user.
    pub fn set_user_blocked(&mut self, email: &str, blocked: bool) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE users SET is_blocked = ?1 WHERE email = ?2",
            params![blocked, email],
        )?;

        if affected == 0 {
            return Err(Error::UserNotFound(email.to_string()));
        }
        Ok(())
    }

    /// Store the biometrics preference flag.
    pub fn set_use_biometrics(&mut self, email: &str, enabled: bool) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE users SET use_biometrics = ?1 WHERE email = ?2",
            params![enabled, email],
        )?;

        if affected == 0 {
            return Err(Error::UserNotFound(email.to_string()));
        }
        Ok(())
    }

    /// Set or clear a user's pending flag.
    pub fn set_user_pending(&mut self, email: &str, pending: bool) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE users SET pending_sync = ?1 WHERE email = ?2",
            params![pending, email],
        )?;

        if affected == 0 {
            return Err(Error::UserNotFound(email.to_string()));
        }
        Ok(())
    }
}

const TRIP_COLUMNS: &str = "id, title, destination, start_date, end_date, notes, \
     owner_email, weather_temp, weather_description, pending_sync, is_synced";

const USER_COLUMNS: &str =
    "id, name, email, password_hash, salt, role, is_blocked, use_biometrics, pending_sync";

fn trip_from_row(row: &rusqlite::Row<'_>) -> std::result::Result<Trip, rusqlite::Error> {
    Ok(Trip {
        id: row.get(0)?,
        title: row.get(1)?,
        destination: row.get(2)?,
        start_date: row.get(3)?,
        end_date: row.get(4)?,
        notes: row.get(5)?,
        owner_email: row.get(6)?,
        weather_temp: row.get(7)?,
        weather_description: row.get(8)?,
        pending_sync: row.get(9)?,
        is_synced: row.get(10)?,
    })
}

fn user_from_row(row: &rusqlite::Row<'_>) -> std::result::Result<User, rusqlite::Error> {
    let role_str: String = row.get(5)?;

    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        salt: row.get(4)?,
        role: parse_db(&role_str, "role")?,
        is_blocked: row.get(6)?,
        use_biometrics: row.get(7)?,
        pending_sync: row.get(8)?,
    })
}

fn collect_rows<T>(
    rows: impl Iterator<Item = std::result::Result<T, rusqlite::Error>>,
) -> Result<Vec<T>> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
