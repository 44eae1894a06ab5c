// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciliation coordinator.
//!
//! One trip cycle is collect → push → acknowledge → pull → replace-for-owner
//! → enrich, strictly in that order. Push completes (success or failure)
//! before the pull begins; across cycles the per-entity-class single-flight
//! guard is the only concurrency control. There is no queuing, no
//! cancellation of an in-flight cycle and no mid-cycle rollback: a cycle that
//! fails partway leaves already-completed sub-steps in effect (pending flags
//! cleared by an acknowledged push stay cleared even if the following pull
//! fails).
//!
//! # Known consistency window
//!
//! The pull destructively replaces the owner's local set. A trip created
//! locally between push and pull — or one whose push failed while others
//! were acknowledged — can be overwritten by that replace. Sequencing push
//! before pull shrinks this window; it does not close it.
//!
//! # Trips vs. users
//!
//! Trips reconcile by destructive full replace on pull; user role/block
//! mutations replay individually and are cleared one record at a time, so a
//! momentarily stale listing fetch cannot undo a just-applied block. The
//! asymmetry is preserved from the source system as observed, not endorsed;
//! unifying the two strategies is a product-level decision.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use tm_core::{pending, Database, Error, Role};

use crate::connectivity::OnlineHandle;
use crate::remote::{RemoteApi, RemoteError};
use crate::session::Session;
use crate::weather::{WeatherEnricher, WeatherProvider};

/// Error type for reconciliation cycles.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The remote service rejected a call or answered garbage. Unprocessed
    /// records stay pending.
    #[error("remote sync failed: {0}")]
    Remote(#[from] RemoteError),

    /// The local store failed; fatal to the current cycle.
    #[error("local store failure: {0}")]
    Store(#[from] Error),

    /// The session's role lacks the user-management capability.
    #[error("role '{0}' may not manage users")]
    NotPermitted(Role),
}

/// Result type for reconciliation cycles.
pub type SyncResult<T> = Result<T, SyncError>;

/// Counters from one completed cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Trip records acknowledged by the push.
    pub pushed: u64,
    /// Trip records received by the pull.
    pub pulled: usize,
    /// Trip records enriched with weather.
    pub enriched: usize,
    /// User mutations replayed.
    pub replayed: usize,
}

/// How a trigger was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The cycle ran to completion.
    Completed(CycleStats),
    /// A cycle for this entity class was already running; the trigger was
    /// dropped, not queued. The next connectivity transition (or an explicit
    /// caller retry) will run it.
    Busy,
    /// No verified reachability; the cycle was skipped. Not an error.
    Offline,
}

/// RAII single-flight guard over an entity class. Acquire fails while
/// another cycle holds the flag; release happens on drop, so early error
/// returns release too.
struct FlightGuard<'a>(&'a AtomicBool);

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| FlightGuard(flag))
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Orchestrates reconciliation cycles over the local store, the remote
/// service and the weather enricher.
pub struct SyncCoordinator<R: RemoteApi, W: WeatherProvider> {
    store: Arc<Mutex<Database>>,
    remote: R,
    enricher: WeatherEnricher<W>,
    online: OnlineHandle,
    trip_cycle: AtomicBool,
    user_cycle: AtomicBool,
}

impl<R: RemoteApi, W: WeatherProvider> SyncCoordinator<R, W> {
    /// Create a coordinator over an explicitly constructed store handle.
    pub fn new(
        store: Arc<Mutex<Database>>,
        remote: R,
        enricher: WeatherEnricher<W>,
        online: OnlineHandle,
    ) -> Self {
        SyncCoordinator {
            store,
            remote,
            enricher,
            online,
            trip_cycle: AtomicBool::new(false),
            user_cycle: AtomicBool::new(false),
        }
    }

    fn lock_store(&self, during: &'static str) -> SyncResult<MutexGuard<'_, Database>> {
        self.store
            .lock()
            .map_err(|_| SyncError::Store(Error::LockPoisoned(during)))
    }

    /// Run one trip reconciliation cycle for the session's principal.
    ///
    /// Guests skip the remote steps entirely; only the local enrichment pass
    /// runs for them.
    pub async fn sync_trips(&self, session: &Session) -> SyncResult<CycleOutcome> {
        let Some(_guard) = FlightGuard::acquire(&self.trip_cycle) else {
            debug!("trip cycle already running, trigger dropped");
            return Ok(CycleOutcome::Busy);
        };

        if !self.online.is_online() {
            debug!("no verified reachability, trip cycle skipped");
            return Ok(CycleOutcome::Offline);
        }

        let mut stats = CycleStats::default();

        if session.is_guest() {
            // Guest trips are never transmitted to the remote service.
            stats.enriched = self
                .enricher
                .backfill_owner(&self.store, &session.email)
                .await?;
            return Ok(CycleOutcome::Completed(stats));
        }

        // 1. Collect pending records for the principal.
        let pending_batch = {
            let db = self.lock_store("collect pending trips")?;
            pending::pending_trips(&db, Some(&session.email))?
        };

        // 2. Push, then clear flags only on positive acknowledgment.
        if !pending_batch.is_empty() {
            let accepted = self
                .remote
                .push_trips(&session.token, &pending_batch)
                .await?;

            let ids: Vec<i64> = pending_batch.iter().map(|t| t.id).collect();
            let mut db = self.lock_store("acknowledge push")?;
            db.mark_trips_synced(&ids)?;
            stats.pushed = accepted;
            info!(owner = %session.email, accepted, "pushed pending trips");
        }

        // 3. Pull the authoritative set.
        let pulled = self.remote.fetch_trips(&session.token).await?;
        stats.pulled = pulled.len();

        // 4. Replace-for-owner with the pulled set.
        {
            let mut db = self.lock_store("replace for owner")?;
            db.replace_for_owner(&session.email, &pulled)?;
            db.record_sync_time(&session.email)?;
        }
        info!(owner = %session.email, pulled = stats.pulled, "replaced local set from pull");

        // 5. Enrichment pass while still online.
        stats.enriched = self
            .enricher
            .backfill_owner(&self.store, &session.email)
            .await?;

        Ok(CycleOutcome::Completed(stats))
    }

    /// Replay pending user role/block mutations, one user at a time.
    ///
    /// A failure aborts the remainder; already-replayed users stay cleared,
    /// the failing one and everything after it stay pending.
    pub async fn sync_users(&self, session: &Session) -> SyncResult<CycleOutcome> {
        let Some(_guard) = FlightGuard::acquire(&self.user_cycle) else {
            debug!("user cycle already running, trigger dropped");
            return Ok(CycleOutcome::Busy);
        };

        if !self.online.is_online() {
            debug!("no verified reachability, user cycle skipped");
            return Ok(CycleOutcome::Offline);
        }

        if !session.role.manages_users() {
            return Err(SyncError::NotPermitted(session.role));
        }

        let pending_batch = {
            let db = self.lock_store("collect pending users")?;
            pending::pending_users(&db)?
        };

        let mut stats = CycleStats::default();
        for user in pending_batch {
            self.remote
                .set_user_role(&session.token, &user.email, user.role)
                .await?;
            self.remote
                .set_user_blocked(&session.token, &user.email, user.is_blocked)
                .await?;

            let mut db = self.lock_store("clear user pending")?;
            pending::clear_user_pending(&mut db, &user.email)?;
            stats.replayed += 1;
            debug!(user = %user.email, "replayed user mutations");
        }

        Ok(CycleOutcome::Completed(stats))
    }

    /// Glue for the connectivity subscription: a verified online transition
    /// triggers the trip cycle and, when the session manages users, the user
    /// cycle. Offline transitions do nothing.
    pub async fn handle_transition(&self, online: bool, session: &Session) -> SyncResult<()> {
        if !online {
            debug!("offline transition, nothing to reconcile");
            return Ok(());
        }

        match self.sync_trips(session).await? {
            CycleOutcome::Completed(stats) => {
                info!(?stats, "trip cycle completed");
            }
            outcome => warn!(?outcome, "trip cycle did not run"),
        }

        if session.role.manages_users() {
            match self.sync_users(session).await? {
                CycleOutcome::Completed(stats) => {
                    info!(replayed = stats.replayed, "user cycle completed");
                }
                outcome => warn!(?outcome, "user cycle did not run"),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
