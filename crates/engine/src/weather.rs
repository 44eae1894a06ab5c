// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Derived weather enrichment.
//!
//! The provider contract is deliberately lossy: any non-success or malformed
//! response is "no data", never an error for the caller. A record is only
//! written when a complete report came back — no partial writes, no
//! fabricated defaults. Enriched records are re-marked pending because the
//! derived fields still have to propagate to the remote service on the next
//! reconciliation cycle.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use tracing::{debug, warn};

use tm_core::{pending, Database, Error, Trip};

use crate::config::WeatherSettings;
use crate::connectivity::OnlineHandle;

/// Error type for provider construction.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// The provider HTTP client could not be built.
    #[error("weather client: {0}")]
    Client(#[from] reqwest::Error),
}

/// A weather lookup result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherReport {
    /// Rounded temperature with unit suffix, e.g. "20°C".
    pub temperature: String,
    /// Short description, e.g. "Clear".
    pub description: String,
}

/// External weather lookup keyed by destination text.
pub trait WeatherProvider: Send + Sync {
    /// Look up current weather for a destination. `None` on any failure.
    fn current(
        &self,
        destination: &str,
    ) -> Pin<Box<dyn Future<Output = Option<WeatherReport>> + Send + '_>>;
}

/// OpenWeatherMap forecast-endpoint provider.
pub struct OpenWeatherProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    forecast_slots: u32,
}

impl OpenWeatherProvider {
    /// Create a provider from settings.
    pub fn new(settings: &WeatherSettings) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(OpenWeatherProvider {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            forecast_slots: settings.forecast_slots,
        })
    }
}

impl WeatherProvider for OpenWeatherProvider {
    fn current(
        &self,
        destination: &str,
    ) -> Pin<Box<dyn Future<Output = Option<WeatherReport>> + Send + '_>> {
        let city = destination.trim().replace(' ', "+");
        Box::pin(async move {
            let url = format!(
                "{}/data/2.5/forecast?q={}&cnt={}&units=metric&appid={}",
                self.base_url, city, self.forecast_slots, self.api_key
            );

            let resp = match self.client.get(&url).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    debug!(%city, error = %e, "weather request failed");
                    return None;
                }
            };

            if resp.status() != reqwest::StatusCode::OK {
                warn!(%city, status = resp.status().as_u16(), "weather lookup rejected");
                return None;
            }

            let body: serde_json::Value = match resp.json().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(%city, error = %e, "weather response undecodable");
                    return None;
                }
            };

            parse_forecast(&body)
        })
    }
}

/// Extract a report from a forecast response body.
///
/// The provider signals success both in the HTTP status and in a `cod`
/// field; anything but a well-formed success yields `None`.
fn parse_forecast(body: &serde_json::Value) -> Option<WeatherReport> {
    let cod = body.get("cod")?;
    let ok = cod.as_str() == Some("200") || cod.as_u64() == Some(200);
    if !ok {
        return None;
    }

    let first = body.get("list")?.as_array()?.first()?;
    let temp = first.get("main")?.get("temp")?.as_f64()?;
    let description = first
        .get("weather")?
        .as_array()?
        .first()?
        .get("main")?
        .as_str()?;

    Some(WeatherReport {
        temperature: format!("{}°C", temp.trunc() as i64),
        description: description.to_string(),
    })
}

/// Backfills missing weather fields over a principal's local set.
pub struct WeatherEnricher<W: WeatherProvider> {
    provider: W,
    online: OnlineHandle,
}

impl<W: WeatherProvider> WeatherEnricher<W> {
    /// Create an enricher reading reachability from the given handle.
    pub fn new(provider: W, online: OnlineHandle) -> Self {
        WeatherEnricher { provider, online }
    }

    /// Fill weather for every trip of the owner that lacks it.
    ///
    /// Skipped silently while offline: absent weather means "pending, not
    /// failed". Returns the number of records enriched.
    pub async fn backfill_owner(
        &self,
        store: &Mutex<Database>,
        owner_email: &str,
    ) -> tm_core::Result<usize> {
        if !self.online.is_online() {
            debug!("offline, weather backfill skipped");
            return Ok(0);
        }

        let missing: Vec<Trip> = {
            let db = store
                .lock()
                .map_err(|_| Error::LockPoisoned("weather backfill"))?;
            db.trips_for_owner(owner_email)?
                .into_iter()
                .filter(|t| !t.has_weather())
                .collect()
        };

        let mut enriched = 0;
        for trip in missing {
            let Some(report) = self.provider.current(&trip.destination).await else {
                continue;
            };

            let mut db = store
                .lock()
                .map_err(|_| Error::LockPoisoned("weather backfill"))?;
            db.update_weather(trip.id, &report.temperature, &report.description)?;
            // Derived data must still reach the remote service
            pending::mark_trip_pending(&mut db, trip.id)?;
            enriched += 1;
        }

        if enriched > 0 {
            debug!(owner = owner_email, enriched, "weather backfill complete");
        }
        Ok(enriched)
    }
}

#[cfg(test)]
#[path = "weather_tests.rs"]
mod tests;
