//! Bridge configuration.
//!
//! Defaults mirror the behavior consumers expect out of the box: listening
//! starts automatically when a session is established, and connect requests
//! for ids the bridge has never seen are forwarded to the gateway, which
//! decides on its own.
//!
//! Values can be loaded from JSON (camelCase keys, every field optional) and
//! then overridden from the environment:
//!
//! | Variable | Field |
//! |---|---|
//! | `SCANLINK_AUTO_LISTEN` | `auto_listen_on_connect` |
//! | `SCANLINK_REQUIRE_KNOWN_SCANNER` | `require_known_scanner` |
//! | `SCANLINK_OPERATIONAL_MODE` | `gateway.operational_mode` |

use crate::error::{BridgeError, Result};
use scanlink_gateway::{GatewaySettings, OperationalMode};
use serde::{Deserialize, Serialize};

pub const ENV_AUTO_LISTEN: &str = "SCANLINK_AUTO_LISTEN";
pub const ENV_REQUIRE_KNOWN_SCANNER: &str = "SCANLINK_REQUIRE_KNOWN_SCANNER";
pub const ENV_OPERATIONAL_MODE: &str = "SCANLINK_OPERATIONAL_MODE";

/// Configuration for a [`ScannerBridge`](crate::ScannerBridge).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeConfig {
    /// Start listening for barcodes when a session is established.
    pub auto_listen_on_connect: bool,

    /// Reject connect/disconnect for ids absent from the registry.
    pub require_known_scanner: bool,

    /// Settings applied to the gateway when it is attached.
    pub gateway: GatewaySettings,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            auto_listen_on_connect: true,
            require_known_scanner: false,
            gateway: GatewaySettings::default(),
        }
    }
}

impl BridgeConfig {
    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] if the document is malformed.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| BridgeError::config(e.to_string()))
    }

    /// Default configuration with environment overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] if a variable holds an invalid value.
    pub fn from_env() -> Result<Self> {
        Self::default().apply_env()
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] if a variable holds an invalid value.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] if a value cannot be parsed.
    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_AUTO_LISTEN) {
            self.auto_listen_on_connect = parse_flag(ENV_AUTO_LISTEN, &value)?;
        }
        if let Some(value) = lookup(ENV_REQUIRE_KNOWN_SCANNER) {
            self.require_known_scanner = parse_flag(ENV_REQUIRE_KNOWN_SCANNER, &value)?;
        }
        if let Some(value) = lookup(ENV_OPERATIONAL_MODE) {
            self.gateway.operational_mode = value
                .parse::<OperationalMode>()
                .map_err(|e| BridgeError::config(format!("{ENV_OPERATIONAL_MODE}: {e}")))?;
        }
        Ok(self)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(BridgeError::config(format!(
            "{key}: expected a boolean, got '{other}'"
        ))),
    }
}
