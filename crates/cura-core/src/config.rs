//! TOML-backed sync configuration.
//!
//! ```toml
//! [retry]
//! max_attempts = 3
//! backoff_secs = 2
//! ```
//!
//! Both values default to the stock policy (3 attempts, 2 s) when the
//! section or file is absent, so a missing config file is not an error —
//! only a malformed one is.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use cura_contracts::error::{CuraError, CuraResult};

use crate::retry::RetryPolicy;

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_secs() -> u64 {
    2
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self { max_attempts: default_max_attempts(), backoff_secs: default_backoff_secs() }
    }
}

/// Top-level sync tuning, deserialized from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub retry: RetrySettings,
}

impl SyncConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `CuraError::ConfigError` if the TOML is malformed or the
    /// retry settings are unusable (zero attempts).
    pub fn from_toml_str(s: &str) -> CuraResult<Self> {
        let config: SyncConfig = toml::from_str(s).map_err(|e| CuraError::ConfigError {
            reason: format!("failed to parse sync config TOML: {}", e),
        })?;
        if config.retry.max_attempts == 0 {
            return Err(CuraError::ConfigError {
                reason: "retry.max_attempts must be at least 1".to_string(),
            });
        }
        Ok(config)
    }

    /// Read the file at `path` and parse it as sync configuration.
    pub fn from_file(path: &Path) -> CuraResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CuraError::ConfigError {
            reason: format!("failed to read sync config '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The retry policy these settings describe.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            backoff: Duration::from_secs(self.retry.backoff_secs),
        }
    }
}
