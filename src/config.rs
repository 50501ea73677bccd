//! Open-time configuration.
//!
//! Can be built in code or loaded from TOML:
//!
//! ```toml
//! nonblocking = true
//! device_slots = 64
//! ```
//!
//! Missing keys take their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default bound on descriptor numbers a handle may hold.
pub const DEFAULT_DEVICE_SLOTS: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// How a device node is opened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenConfig {
    /// Open with `O_NONBLOCK`: reads with no pending event return `None` instead of waiting.
    pub nonblocking: bool,
    /// Descriptors numbered at or above this are refused with `TooManyDevices`.
    ///
    /// The bound sizes per-slot tables that callers may keep alongside their handles; it has
    /// no meaning to the kernel.
    pub device_slots: usize,
}

impl Default for OpenConfig {
    fn default() -> Self {
        Self {
            nonblocking: false,
            device_slots: DEFAULT_DEVICE_SLOTS,
        }
    }
}

impl OpenConfig {
    pub fn nonblocking(mut self, nonblocking: bool) -> Self {
        self.nonblocking = nonblocking;
        self
    }

    pub fn device_slots(mut self, slots: usize) -> Self {
        self.device_slots = slots;
        self
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
