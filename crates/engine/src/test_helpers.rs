// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for engine tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;

use tm_core::{Database, Role, Trip};

use crate::connectivity::ReachabilityProbe;
use crate::remote::{RemoteApi, RemoteError, RemoteResult, RemoteUser};
use crate::session::Session;
use crate::weather::{WeatherProvider, WeatherReport};

/// Probe answering from a queue of scripted verdicts; defaults to offline
/// when the queue runs dry.
#[derive(Clone, Default)]
pub struct MockProbe {
    results: Arc<Mutex<VecDeque<bool>>>,
}

impl MockProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&self, verdict: bool) {
        self.results.lock().unwrap().push_back(verdict);
    }
}

impl ReachabilityProbe for MockProbe {
    fn check(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        let results = Arc::clone(&self.results);
        Box::pin(async move { results.lock().unwrap().pop_front().unwrap_or(false) })
    }
}

/// Scriptable in-memory remote service.
#[derive(Clone, Default)]
pub struct MockRemote {
    /// Every pushed batch, in order.
    pub pushes: Arc<Mutex<Vec<Vec<Trip>>>>,
    /// What the next pull returns.
    pub pull_result: Arc<Mutex<Vec<Trip>>>,
    /// Number of pulls performed.
    pub fetch_calls: Arc<AtomicUsize>,
    /// Admin calls in order, as "role:<email>" / "block:<email>".
    pub admin_calls: Arc<Mutex<Vec<String>>>,
    pub fail_push: Arc<AtomicBool>,
    pub fail_fetch: Arc<AtomicBool>,
    /// Email whose block replay fails.
    pub fail_block_for: Arc<Mutex<Option<String>>>,
    /// When set, push waits for a permit before completing.
    pub push_gate: Arc<Mutex<Option<Arc<Semaphore>>>>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pull_result(&self, trips: Vec<Trip>) {
        *self.pull_result.lock().unwrap() = trips;
    }
}

impl RemoteApi for MockRemote {
    fn ping(&self) -> Pin<Box<dyn Future<Output = RemoteResult<()>> + Send + '_>> {
        Box::pin(async move { Ok(()) })
    }

    fn push_trips(
        &self,
        _token: &str,
        trips: &[Trip],
    ) -> Pin<Box<dyn Future<Output = RemoteResult<u64>> + Send + '_>> {
        let trips = trips.to_vec();
        Box::pin(async move {
            let gate = self.push_gate.lock().unwrap().clone();
            if let Some(sem) = gate {
                let _permit = sem.acquire().await;
            }

            if self.fail_push.load(Ordering::SeqCst) {
                return Err(RemoteError::Rejected { status: 500 });
            }

            let accepted = trips.len() as u64;
            self.pushes.lock().unwrap().push(trips);
            Ok(accepted)
        })
    }

    fn fetch_trips(
        &self,
        _token: &str,
    ) -> Pin<Box<dyn Future<Output = RemoteResult<Vec<Trip>>> + Send + '_>> {
        Box::pin(async move {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_fetch.load(Ordering::SeqCst) {
                return Err(RemoteError::Rejected { status: 502 });
            }
            Ok(self.pull_result.lock().unwrap().clone())
        })
    }

    fn list_users(
        &self,
        _token: &str,
    ) -> Pin<Box<dyn Future<Output = RemoteResult<Vec<RemoteUser>>> + Send + '_>> {
        Box::pin(async move { Ok(Vec::new()) })
    }

    fn set_user_role(
        &self,
        _token: &str,
        email: &str,
        _role: Role,
    ) -> Pin<Box<dyn Future<Output = RemoteResult<()>> + Send + '_>> {
        let email = email.to_string();
        Box::pin(async move {
            self.admin_calls.lock().unwrap().push(format!("role:{email}"));
            Ok(())
        })
    }

    fn set_user_blocked(
        &self,
        _token: &str,
        email: &str,
        _blocked: bool,
    ) -> Pin<Box<dyn Future<Output = RemoteResult<()>> + Send + '_>> {
        let email = email.to_string();
        Box::pin(async move {
            if self.fail_block_for.lock().unwrap().as_deref() == Some(email.as_str()) {
                return Err(RemoteError::Rejected { status: 500 });
            }
            self.admin_calls.lock().unwrap().push(format!("block:{email}"));
            Ok(())
        })
    }
}

/// Provider answering from a destination → report map.
#[derive(Clone, Default)]
pub struct MockWeather {
    pub reports: Arc<Mutex<HashMap<String, WeatherReport>>>,
    pub lookups: Arc<Mutex<Vec<String>>>,
}

impl MockWeather {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_report(destination: &str, temperature: &str, description: &str) -> Self {
        let mock = Self::default();
        mock.reports.lock().unwrap().insert(
            destination.to_string(),
            WeatherReport {
                temperature: temperature.to_string(),
                description: description.to_string(),
            },
        );
        mock
    }
}

impl WeatherProvider for MockWeather {
    fn current(
        &self,
        destination: &str,
    ) -> Pin<Box<dyn Future<Output = Option<WeatherReport>> + Send + '_>> {
        let destination = destination.to_string();
        Box::pin(async move {
            self.lookups.lock().unwrap().push(destination.clone());
            self.reports.lock().unwrap().get(&destination).cloned()
        })
    }
}

pub fn make_store() -> Arc<Mutex<Database>> {
    Arc::new(Mutex::new(Database::open_in_memory().unwrap()))
}

pub fn make_local_trip(owner: &str, title: &str) -> Trip {
    Trip::new_local(title, "Paris", "2026-04-01", "2026-04-07", "", owner)
}

/// A server-held record as a pull would return it, weather already present.
pub fn make_pulled_trip(id: i64, owner: &str, title: &str) -> Trip {
    let mut trip = make_local_trip(owner, title).mark_pulled();
    trip.id = id;
    trip.weather_temp = Some("18°C".into());
    trip.weather_description = Some("Clouds".into());
    trip
}

pub fn user_session() -> Session {
    Session::new("token-alice", "alice@example.com", Role::User)
}

pub fn admin_session() -> Session {
    Session::new("token-admin", "admin@example.com", Role::Admin)
}

pub fn guest_session() -> Session {
    Session::guest("guest@local")
}
