//! Bridge connection settings.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. Built-in defaults (no default URL, insecure origin, 5 second reconnect delay)
//! 2. `bridge.toml` in the config directory, if it exists
//! 3. Environment variables (`CLEANBOT_BRIDGE_URL`, `CLEANBOT_SECURE_ORIGIN`),
//!    optionally seeded from a `.env` file
//!
//! Nothing is ever written back to disk.

use crate::connection::check_websocket_url;
use crate::error::config::ConfigError;

use common::ErrorLocation;

use std::env;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "bridge.toml";
const CONFIG_DIR_NAME: &str = "cleanbot";
const DEFAULT_RECONNECT_DELAY_MS: u64 = 5_000;

/// Overrides [`BridgeConfig::default_url`].
pub const BRIDGE_URL_ENV: &str = "CLEANBOT_BRIDGE_URL";
/// Overrides [`BridgeConfig::secure_origin`]. Accepts `true`/`1`/`false`/`0`.
pub const SECURE_ORIGIN_ENV: &str = "CLEANBOT_SECURE_ORIGIN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Preconfigured bridge endpoint. The operator may still connect elsewhere.
    #[serde(default)]
    pub default_url: Option<String>,

    /// The hosting context is served over a secure channel, so plain `ws://`
    /// targets must be upgraded to `wss://` before opening.
    #[serde(default)]
    pub secure_origin: bool,

    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            default_url: None,
            secure_origin: false,
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

fn default_reconnect_delay_ms() -> u64 {
    DEFAULT_RECONNECT_DELAY_MS
}

impl BridgeConfig {
    /// Default config directory: `{config_dir}/cleanbot`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DirectoryNotFound`] if the platform has no config directory.
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME))
            .ok_or_else(|| ConfigError::DirectoryNotFound {
                location: ErrorLocation::from(Location::caller()),
                reason: "Platform has no config directory".to_string(),
            })
    }

    /// Load `{config_dir}/bridge.toml`.
    ///
    /// A missing file yields the defaults. A file that exists but cannot be read,
    /// parsed or validated is an error.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: BridgeConfig = toml::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config TOML: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Load from `config_dir`, then apply `.env` and environment overrides.
    pub fn load_with_env(config_dir: &Path) -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }

        let mut config = Self::load(config_dir)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `CLEANBOT_BRIDGE_URL` and `CLEANBOT_SECURE_ORIGIN` on top of the
    /// current values. Unset or empty variables leave the value untouched.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(url) = non_empty_var(BRIDGE_URL_ENV) {
            info!("Default bridge URL overridden by {BRIDGE_URL_ENV}");
            self.default_url = Some(url);
        }

        if let Some(raw) = non_empty_var(SECURE_ORIGIN_ENV) {
            self.secure_origin = match raw.to_ascii_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                other => {
                    return Err(ConfigError::ValidationError {
                        location: ErrorLocation::from(Location::caller()),
                        reason: format!("{SECURE_ORIGIN_ENV} must be true/false/1/0, got '{other}'"),
                    });
                }
            };
        }

        self.validate()
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reconnect_delay_ms == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "reconnect_delay_ms must be greater than zero".to_string(),
            });
        }

        if let Some(ref url) = self.default_url {
            if url.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    location: ErrorLocation::from(Location::caller()),
                    reason: "default_url cannot be empty string".to_string(),
                });
            }

            check_websocket_url(url.trim()).map_err(|reason| ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("Invalid default_url: {reason}"),
            })?;
        }

        Ok(())
    }

    /// The fixed delay between a transport failure and the next attempt.
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
