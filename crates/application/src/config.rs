//! Application configuration.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use userscript_gesture::GestureConfig;

pub const DEFAULT_BODY_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_ELEMENT_TIMEOUT_MS: u64 = 10_000;

/// Startup configuration. Every field is optional in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Log build information at startup.
    pub dev_mode: bool,
    pub version: String,
    /// How long modules wait for `body` before failing.
    pub body_timeout_ms: u64,
    /// Default bound for other element waits.
    pub element_timeout_ms: u64,
    pub gestures: GestureConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dev_mode: false,
            version: env!("CARGO_PKG_VERSION").to_string(),
            body_timeout_ms: DEFAULT_BODY_TIMEOUT_MS,
            element_timeout_ms: DEFAULT_ELEMENT_TIMEOUT_MS,
            gestures: GestureConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn body_timeout(&self) -> Duration {
        Duration::from_millis(self.body_timeout_ms)
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_millis(self.element_timeout_ms)
    }
}
