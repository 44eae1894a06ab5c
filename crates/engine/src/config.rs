// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration.
//!
//! Every remote call carries a fixed wall-clock timeout; exceeding it is a
//! failure, never retried automatically. The defaults mirror the production
//! service: 1.5 s for the reachability probe, 10 s for the trip service,
//! 5 s for the weather provider.

use serde::{Deserialize, Serialize};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Trip service endpoint and timeouts.
    pub remote: RemoteSettings,
    /// Reachability probe endpoint and timeout.
    #[serde(default)]
    pub probe: ProbeSettings,
    /// Weather provider credentials and endpoint.
    pub weather: WeatherSettings,
}

/// Settings for the authoritative trip service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Base URL of the service, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        RemoteSettings {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Settings for the verified-reachability probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeSettings {
    /// Well-known no-content endpoint. A 204 response means online.
    #[serde(default = "default_probe_url")]
    pub url: String,
    /// Probe timeout in milliseconds. Kept short: the probe runs on every
    /// raw interface event.
    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        ProbeSettings {
            url: default_probe_url(),
            timeout_ms: default_probe_timeout_ms(),
        }
    }
}

/// Settings for the weather provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSettings {
    /// Provider API key.
    pub api_key: String,
    /// Provider base URL.
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_weather_timeout_secs")]
    pub timeout_secs: u64,
    /// Number of forecast slots requested per lookup.
    #[serde(default = "default_forecast_slots")]
    pub forecast_slots: u32,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        WeatherSettings {
            api_key: String::new(),
            base_url: default_weather_base_url(),
            timeout_secs: default_weather_timeout_secs(),
            forecast_slots: default_forecast_slots(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_probe_url() -> String {
    "http://clients3.google.com/generate_204".to_string()
}

fn default_probe_timeout_ms() -> u64 {
    1500
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_weather_timeout_secs() -> u64 {
    5
}

fn default_forecast_slots() -> u32 {
    8
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
