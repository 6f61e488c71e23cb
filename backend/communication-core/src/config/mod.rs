//! `link.json`: how a proxy reaches its peer and how a host accepts it.
//!
//! Loaded once at startup, validated, then handed to the components as an
//! immutable snapshot.

use crate::connection::Timeouts;
use crate::error::config::ConfigError;
use crate::{DEFAULT_ADDRESS, DEFAULT_PORT};

use common::ErrorLocation;

use std::panic::Location;
use std::path::Path;
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

pub const CONFIG_FILE_NAME: &str = "link.json";
const CONFIG_VERSION: u32 = 1;

const MAX_TIMEOUT_MS: u64 = 300_000;
/// Shortest heartbeat period; shorter requests are raised to this.
pub const MIN_HEARTBEAT_MS: u64 = 100;

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_heartbeat_interval_ms")]
    pub interval_ms: u64,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: default_heartbeat_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
    #[serde(default)]
    pub heartbeat: HeartbeatConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            connect_timeout_ms: default_connect_timeout_ms(),
            send_timeout_ms: default_send_timeout_ms(),
            heartbeat: HeartbeatConfig::default(),
        }
    }
}

impl ProxyConfig {
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect: Duration::from_millis(self.connect_timeout_ms),
            send: Duration::from_millis(self.send_timeout_ms),
        }
    }

    /// `None` when the heartbeat is disabled.
    pub fn heartbeat_interval(&self) -> Option<Duration> {
        self.heartbeat
            .enabled
            .then(|| Duration::from_millis(self.heartbeat.interval_ms))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    /// 0 binds an ephemeral port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// When set, a handshake is accepted only if it offers this token.
    #[serde(default)]
    pub startup_token: Option<Uuid>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            startup_token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub proxy: ProxyConfig,

    #[serde(default)]
    pub host: HostConfig,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            proxy: ProxyConfig::default(),
            host: HostConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}
fn default_connect_timeout_ms() -> u64 {
    5_000
}
fn default_send_timeout_ms() -> u64 {
    10_000
}
fn default_heartbeat_interval_ms() -> u64 {
    2_000
}
fn default_port() -> u16 {
    DEFAULT_PORT
}

// ============================================
// IMPLEMENTATION
// ============================================

impl LinkConfig {
    /// Load from `{config_dir}/link.json`.
    ///
    /// # Returns
    ///
    /// Defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read, parsed or validated.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Link config not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read link config: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: LinkConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse link config: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Link config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save to `{config_dir}/link.json` via temp file + rename.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, directory creation, serialization,
    /// write or rename fails.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{CONFIG_FILE_NAME}.tmp"));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Link config saved to {}", config_path.display());
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::validation(format!(
                "Invalid version: {} (expected 1-{})",
                self.version, CONFIG_VERSION
            )));
        }

        let url = Url::parse(&self.proxy.address).map_err(|e| {
            ConfigError::validation(format!(
                "Invalid proxy address '{}': {}",
                self.proxy.address, e
            ))
        })?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(ConfigError::validation(format!(
                "Invalid proxy address '{}': scheme must be ws or wss",
                self.proxy.address
            )));
        }

        for (name, value) in [
            ("connect_timeout_ms", self.proxy.connect_timeout_ms),
            ("send_timeout_ms", self.proxy.send_timeout_ms),
        ] {
            if value == 0 || value > MAX_TIMEOUT_MS {
                return Err(ConfigError::validation(format!(
                    "Invalid {name}: {value} (must be 1-{MAX_TIMEOUT_MS})"
                )));
            }
        }

        if self.proxy.heartbeat.enabled && self.proxy.heartbeat.interval_ms < MIN_HEARTBEAT_MS {
            return Err(ConfigError::validation(format!(
                "Invalid heartbeat interval: {}ms (must be at least {MIN_HEARTBEAT_MS}ms)",
                self.proxy.heartbeat.interval_ms
            )));
        }

        Ok(())
    }
}
