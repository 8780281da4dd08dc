// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Name Service lookup configuration.

use crate::codec::DEFAULT_MAX_FRAME_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Lookup configuration shared by every session opened for one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Read/write deadline in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum accepted frame size (bytes)
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: usize,

    /// Re-arm the deadline before each lookup instead of once at open
    #[serde(default = "default_true")]
    pub refresh_deadline: bool,

    /// Enable TCP keepalive on the session socket
    #[serde(default = "default_true")]
    pub tcp_keepalive: bool,

    /// Disable Nagle on the session socket
    #[serde(default = "default_true")]
    pub tcp_nodelay: bool,
}

/// Largest accepted `timeout_secs`.
pub const MAX_TIMEOUT_SECS: u64 = i32::MAX as u64;

fn default_timeout() -> u64 {
    30
}

fn default_max_frame_size() -> usize {
    DEFAULT_MAX_FRAME_SIZE
}

fn default_true() -> bool {
    true
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_frame_size: default_max_frame_size(),
            refresh_deadline: true,
            tcp_keepalive: true,
            tcp_nodelay: true,
        }
    }
}

impl LookupConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))
    }

    /// Builder: set the deadline in whole seconds.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Builder: set the frame size ceiling.
    pub fn with_max_frame_size(mut self, max: usize) -> Self {
        self.max_frame_size = max;
        self
    }

    /// Builder: keep a single deadline for the whole session.
    pub fn with_fixed_deadline(mut self) -> Self {
        self.refresh_deadline = false;
        self
    }

    /// Get the deadline as Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "timeout must be greater than zero".into(),
            ));
        }
        if self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::InvalidValue(format!(
                "timeout must not exceed {} seconds",
                MAX_TIMEOUT_SECS
            )));
        }
        if self.max_frame_size == 0 {
            return Err(ConfigError::InvalidValue(
                "max_frame_size cannot be 0".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, Clone)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(s) => write!(f, "I/O error: {}", s),
            Self::ParseError(s) => write!(f, "Parse error: {}", s),
            Self::SerializeError(s) => write!(f, "Serialize error: {}", s),
            Self::InvalidValue(s) => write!(f, "Invalid value: {}", s),
        }
    }
}

impl std::error::Error for ConfigError {}
