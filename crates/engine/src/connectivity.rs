// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Verified network reachability.
//!
//! An interface-level "up" signal is not trusted on its own: a Wi-Fi link can
//! be associated yet sit behind a captive portal with no real internet path.
//! Every raw interface event therefore triggers a short application-level
//! probe, and only the probe verdict is delivered to subscribers.
//!
//! Platform callback registration stays outside this module; whatever OS
//! facility observes interface changes simply calls
//! [`ConnectivityMonitor::handle_interface_event`].

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::debug;

use crate::config::ProbeSettings;

/// Error type for monitor construction.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// The probe HTTP client could not be built.
    #[error("probe client: {0}")]
    Client(#[from] reqwest::Error),
}

/// A reachability probe against a well-known endpoint.
///
/// Implementations resolve `true` only for the expected success response;
/// timeouts, transport errors and unexpected statuses are all `false`.
pub trait ReachabilityProbe: Send + Sync {
    /// Run one probe.
    fn check(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;
}

/// HTTP probe expecting a 204 from a no-content endpoint.
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpProbe {
    /// Create a probe from settings.
    pub fn new(settings: &ProbeSettings) -> Result<Self, MonitorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;

        Ok(HttpProbe {
            client,
            url: settings.url.clone(),
        })
    }
}

impl ReachabilityProbe for HttpProbe {
    fn check(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move {
            match self.client.get(&self.url).send().await {
                Ok(resp) => resp.status() == reqwest::StatusCode::NO_CONTENT,
                Err(_) => false,
            }
        })
    }
}

/// A cheap, cloneable read handle onto the last verified state.
///
/// Components that only need to ask "are we online right now?" hold one of
/// these instead of the whole monitor. `OnlineHandle::fixed` produces a
/// detached handle pinned to one state, for embedders without a monitor and
/// for tests.
#[derive(Debug, Clone)]
pub struct OnlineHandle(Arc<AtomicBool>);

impl OnlineHandle {
    /// Last verified reachability state.
    pub fn is_online(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// A detached handle pinned to the given state.
    pub fn fixed(online: bool) -> Self {
        OnlineHandle(Arc::new(AtomicBool::new(online)))
    }
}

/// Monitors verified reachability and emits de-duplicated transitions.
pub struct ConnectivityMonitor<P: ReachabilityProbe> {
    probe: P,
    /// Last verified (and last delivered) state. Starts offline.
    online: Arc<AtomicBool>,
    events: broadcast::Sender<bool>,
    stopped: AtomicBool,
}

impl<P: ReachabilityProbe> ConnectivityMonitor<P> {
    /// Create a monitor. The initial state is offline until the first
    /// successful probe.
    pub fn new(probe: P) -> Self {
        let (events, _) = broadcast::channel(16);
        ConnectivityMonitor {
            probe,
            online: Arc::new(AtomicBool::new(false)),
            events,
            stopped: AtomicBool::new(false),
        }
    }

    /// Subscribe to verified transitions. An event is delivered only when
    /// the verified state differs from the last delivered state, so repeated
    /// raw interface events collapse into one delivery.
    pub fn subscribe(&self) -> broadcast::Receiver<bool> {
        self.events.subscribe()
    }

    /// Last verified state, synchronously.
    pub fn is_currently_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// A read handle for components that only consume the flag.
    pub fn online_handle(&self) -> OnlineHandle {
        OnlineHandle(Arc::clone(&self.online))
    }

    /// React to a raw interface-level change: probe, then publish the
    /// verdict if it differs from the last delivered state.
    pub async fn handle_interface_event(&self) {
        if self.stopped.load(Ordering::SeqCst) {
            return;
        }

        let verified = self.probe.check().await;

        // A stop() racing the probe discards the outstanding result.
        if self.stopped.load(Ordering::SeqCst) {
            return;
        }

        let previous = self.online.swap(verified, Ordering::SeqCst);
        if previous != verified {
            debug!(online = verified, "verified reachability changed");
            // No subscribers is fine; the state itself is still updated.
            let _ = self.events.send(verified);
        }
    }

    /// Tear down: later interface events are ignored and any outstanding
    /// probe result is discarded.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
