// Configuration structs

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::constants::*;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the generation service (without the `/api` suffix)
    pub api_base_url: String,

    /// Per-request timeout for service calls
    pub request_timeout_secs: u64,

    /// Attempts for transient failures (1 disables retries)
    pub max_retries: u32,

    /// Lifetime of a "copied" indicator
    pub copy_indicator_ms: u64,

    /// Read the capability catalog from this outline file instead of the service
    pub catalog_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            copy_indicator_ms: DEFAULT_COPY_INDICATOR_MS,
            catalog_path: None,
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn copy_indicator(&self) -> Duration {
        Duration::from_millis(self.copy_indicator_ms)
    }
}

/// On-disk shape of `config.toml`. Every field is optional so a partial file
/// only overrides what it names.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlConfig {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub max_retries: Option<u32>,
    #[serde(default)]
    pub copy_indicator_ms: Option<u64>,
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

impl TomlConfig {
    pub(crate) fn apply(self, config: &mut Config) {
        if let Some(url) = self.api_base_url {
            config.api_base_url = url;
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout_secs = secs;
        }
        if let Some(retries) = self.max_retries {
            config.max_retries = retries;
        }
        if let Some(ms) = self.copy_indicator_ms {
            config.copy_indicator_ms = ms;
        }
        if self.catalog_path.is_some() {
            config.catalog_path = self.catalog_path;
        }
    }
}
