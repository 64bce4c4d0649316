// Configuration loader
// Loads settings from ~/.portfolio-review/config.toml, then environment overrides

use std::fs;
use std::path::{Path, PathBuf};

use super::constants::*;
use super::settings::{Config, TomlConfig};
use crate::errors::ConfigError;

/// Load configuration from the default config file and the environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = default_config_path();
    let config = load_config_from(path.as_deref())?;
    apply_env_overrides(config, |key| std::env::var(key).ok())
}

/// `~/.portfolio-review/config.toml`, if a home directory can be found.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME).join("config.toml"))
}

/// Load configuration from `path`. A missing file yields the defaults.
pub fn load_config_from(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = Config::default();

    let Some(path) = path else {
        return Ok(config);
    };
    if !path.exists() {
        tracing::debug!("No config file at {}, using defaults", path.display());
        return Ok(config);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let toml_config: TomlConfig =
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    toml_config.apply(&mut config);

    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Apply environment overrides. `lookup` is injectable so tests don't touch
/// the process environment.
pub fn apply_env_overrides(
    mut config: Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Config, ConfigError> {
    if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
        config.api_base_url = url.trim().to_string();
    }
    if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
        config.request_timeout_secs =
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: ENV_TIMEOUT_SECS,
                    value: raw.clone(),
                })?;
    }
    Ok(config)
}
