// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::Path;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Environment variable holding the API key when no prefixed override is set.
pub const LEGACY_API_KEY_VAR: &str = "PHISH_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub requests_per_minute: u32,
    pub first_year: i32,
    pub truncation_threshold: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.phish.net/v3".to_string(),
            timeout_secs: 30,
            requests_per_minute: 120,
            first_year: 1983,
            truncation_threshold: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub telemetry: TelemetryConfig,
}

/// Load configuration from defaults, optional TOML file, `PHISH_API_KEY`, and
/// environment overrides (prefix: PHISHNET_).
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment
        .merge(
            Env::raw()
                .only(&[LEGACY_API_KEY_VAR])
                .map(|_| "api.api_key".into()),
        )
        .merge(Env::prefixed("PHISHNET_").split("__"));

    let config: AppConfig = figment.extract()?;
    info!(
        target: "config",
        has_api_key = config.api.api_key.is_some(),
        "configuration loaded"
    );
    Ok(config)
}
