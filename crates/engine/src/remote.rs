// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticated client for the remote trip service.
//!
//! The [`RemoteApi`] trait abstracts the service so the coordinator can be
//! exercised against mocks; [`HttpRemoteClient`] is the production
//! implementation. Every call completes with an explicit success/failure
//! outcome — a timeout is a failure, never an inferred success.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tm_core::{Role, Trip};

use crate::config::RemoteSettings;

const ROUTE_PING: &str = "/ping";
const ROUTE_TRIPS: &str = "/trips";
const ROUTE_TRIPS_SYNC: &str = "/trips/sync";
const ROUTE_ADMIN_USERS: &str = "/admin/users";

/// Error type for remote operations.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The service could not be reached (transport failure or timeout).
    #[error("remote unreachable: {0}")]
    Unreachable(String),

    /// The service answered with a non-success status.
    #[error("remote rejected request: HTTP {status}")]
    Rejected {
        /// HTTP status code of the rejection.
        status: u16,
    },

    /// The service answered 2xx but the body could not be decoded.
    #[error("malformed remote response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        RemoteError::Unreachable(e.to_string())
    }
}

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// A user record as listed by the admin endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUser {
    pub email: String,
    pub role: String,
    /// The service stores this as a 0/1 integer.
    pub is_blocked: i64,
}

/// The remote trip service contract.
///
/// Push is idempotent for identifier-bearing records: the service replaces
/// the principal's set rather than appending, so replaying an already-synced
/// batch creates no duplicate server-side records.
pub trait RemoteApi: Send + Sync {
    /// Liveness probe, no payload.
    fn ping(&self) -> Pin<Box<dyn Future<Output = RemoteResult<()>> + Send + '_>>;

    /// Submit a trip batch for the authenticated principal.
    ///
    /// Returns the number of accepted records.
    fn push_trips(
        &self,
        token: &str,
        trips: &[Trip],
    ) -> Pin<Box<dyn Future<Output = RemoteResult<u64>> + Send + '_>>;

    /// Fetch the full authoritative trip set owned by the principal.
    ///
    /// Returned records are already normalized: `is_synced=true`,
    /// `pending_sync=false`.
    fn fetch_trips(
        &self,
        token: &str,
    ) -> Pin<Box<dyn Future<Output = RemoteResult<Vec<Trip>>> + Send + '_>>;

    /// List all users (admin).
    fn list_users(
        &self,
        token: &str,
    ) -> Pin<Box<dyn Future<Output = RemoteResult<Vec<RemoteUser>>> + Send + '_>>;

    /// Set a target user's role (admin).
    fn set_user_role(
        &self,
        token: &str,
        email: &str,
        role: Role,
    ) -> Pin<Box<dyn Future<Output = RemoteResult<()>> + Send + '_>>;

    /// Set a target user's blocked flag (admin).
    fn set_user_blocked(
        &self,
        token: &str,
        email: &str,
        blocked: bool,
    ) -> Pin<Box<dyn Future<Output = RemoteResult<()>> + Send + '_>>;
}

#[derive(Debug, Serialize)]
struct SyncRequest<'a> {
    trips: &'a [Trip],
}

#[derive(Debug, Deserialize)]
struct SyncResponse {
    synced: u64,
}

#[derive(Debug, Deserialize)]
struct TripsResponse {
    trips: Vec<Trip>,
}

#[derive(Debug, Deserialize)]
struct UsersResponse {
    users: Vec<RemoteUser>,
}

/// HTTP implementation of [`RemoteApi`].
pub struct HttpRemoteClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemoteClient {
    /// Create a client from settings. The per-request timeout applies to the
    /// whole call, connect included.
    pub fn new(settings: &RemoteSettings) -> RemoteResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(HttpRemoteClient {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_body(&self, path: &str, token: Option<&str>) -> RemoteResult<String> {
        let mut req = self.client.get(format!("{}{}", self.base_url, path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        require_success(req.send().await?).await
    }

    async fn post_json(
        &self,
        path: &str,
        token: &str,
        body: &serde_json::Value,
    ) -> RemoteResult<String> {
        let req = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(token)
            .json(body);
        require_success(req.send().await?).await
    }

    async fn patch_json(
        &self,
        path: &str,
        token: &str,
        body: &serde_json::Value,
    ) -> RemoteResult<String> {
        let req = self
            .client
            .patch(format!("{}{}", self.base_url, path))
            .bearer_auth(token)
            .json(body);
        require_success(req.send().await?).await
    }
}

async fn require_success(resp: reqwest::Response) -> RemoteResult<String> {
    let status = resp.status();
    if !status.is_success() {
        debug!(status = status.as_u16(), "remote rejected request");
        return Err(RemoteError::Rejected {
            status: status.as_u16(),
        });
    }
    resp.text()
        .await
        .map_err(|e| RemoteError::Malformed(e.to_string()))
}

fn decode<T: DeserializeOwned>(body: &str) -> RemoteResult<T> {
    serde_json::from_str(body).map_err(|e| RemoteError::Malformed(e.to_string()))
}

/// Decode a pull response and normalize each record as authoritative.
fn decode_pulled(body: &str) -> RemoteResult<Vec<Trip>> {
    let resp: TripsResponse = decode(body)?;
    Ok(resp.trips.into_iter().map(Trip::mark_pulled).collect())
}

impl RemoteApi for HttpRemoteClient {
    fn ping(&self) -> Pin<Box<dyn Future<Output = RemoteResult<()>> + Send + '_>> {
        Box::pin(async move {
            self.get_body(ROUTE_PING, None).await?;
            Ok(())
        })
    }

    fn push_trips(
        &self,
        token: &str,
        trips: &[Trip],
    ) -> Pin<Box<dyn Future<Output = RemoteResult<u64>> + Send + '_>> {
        let token = token.to_string();
        let trips = trips.to_vec();
        Box::pin(async move {
            let body = serde_json::to_value(SyncRequest { trips: &trips })
                .map_err(|e| RemoteError::Malformed(e.to_string()))?;

            let body = self.post_json(ROUTE_TRIPS_SYNC, &token, &body).await?;
            let resp: SyncResponse = decode(&body)?;
            Ok(resp.synced)
        })
    }

    fn fetch_trips(
        &self,
        token: &str,
    ) -> Pin<Box<dyn Future<Output = RemoteResult<Vec<Trip>>> + Send + '_>> {
        let token = token.to_string();
        Box::pin(async move {
            let body = self.get_body(ROUTE_TRIPS, Some(&token)).await?;
            decode_pulled(&body)
        })
    }

    fn list_users(
        &self,
        token: &str,
    ) -> Pin<Box<dyn Future<Output = RemoteResult<Vec<RemoteUser>>> + Send + '_>> {
        let token = token.to_string();
        Box::pin(async move {
            let body = self.get_body(ROUTE_ADMIN_USERS, Some(&token)).await?;
            let resp: UsersResponse = decode(&body)?;
            Ok(resp.users)
        })
    }

    fn set_user_role(
        &self,
        token: &str,
        email: &str,
        role: Role,
    ) -> Pin<Box<dyn Future<Output = RemoteResult<()>> + Send + '_>> {
        let token = token.to_string();
        let path = format!("{ROUTE_ADMIN_USERS}/{email}/role");
        Box::pin(async move {
            let body = serde_json::json!({ "role": role.as_str() });
            self.patch_json(&path, &token, &body).await?;
            Ok(())
        })
    }

    fn set_user_blocked(
        &self,
        token: &str,
        email: &str,
        blocked: bool,
    ) -> Pin<Box<dyn Future<Output = RemoteResult<()>> + Send + '_>> {
        let token = token.to_string();
        let path = format!("{ROUTE_ADMIN_USERS}/{email}/block");
        Box::pin(async move {
            let body = serde_json::json!({ "block": blocked });
            self.patch_json(&path, &token, &body).await?;
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
