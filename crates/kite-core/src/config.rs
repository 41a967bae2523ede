//! Client configuration
//!
//! Configuration is layered: serde defaults, then an optional TOML file, then
//! `KITE_`-prefixed environment variables. Call [`ClientConfig::validate`]
//! after the last layer is applied.

use crate::KiteError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "KITE_";

/// Rules for handle normalization, validation and availability checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandleRules {
    /// Quiescence delay before an availability check is issued (ms)
    pub debounce_ms: u64,
    /// Minimum normalized length
    pub min_len: usize,
    /// Maximum normalized length; longer input is truncated
    pub max_len: usize,
}

impl Default for HandleRules {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            min_len: 3,
            max_len: 30,
        }
    }
}

/// When the visible list changes relative to the remote mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApplyPolicy {
    /// Remove the entry only after the backend confirms
    #[default]
    Confirm,
    /// Remove immediately and restore the entry if the backend fails
    Optimistic,
}

impl std::str::FromStr for ApplyPolicy {
    type Err = KiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "confirm" => Ok(Self::Confirm),
            "optimistic" => Ok(Self::Optimistic),
            other => Err(KiteError::invalid(format!("Unknown apply policy: {other}"))),
        }
    }
}

/// Block list behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BlockListConfig {
    /// Apply policy for unblock mutations
    pub apply_policy: ApplyPolicy,
}

/// Top-level client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Handle validation settings
    pub handle: HandleRules,
    /// Block list settings
    pub block_list: BlockListConfig,
}

impl ClientConfig {
    /// Parse configuration from a TOML document. Missing keys take defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, KiteError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, KiteError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            KiteError::invalid(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply overrides from the process environment.
    pub fn merge_with_env(&mut self) -> Result<(), KiteError> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply `KITE_*` overrides from an explicit variable list.
    ///
    /// Unknown `KITE_*` keys are ignored.
    pub fn merge_with_vars<I>(&mut self, vars: I) -> Result<(), KiteError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match name {
                "HANDLE_DEBOUNCE_MS" => self.handle.debounce_ms = parse_number(&key, &value)?,
                "HANDLE_MIN_LEN" => self.handle.min_len = parse_number(&key, &value)?,
                "HANDLE_MAX_LEN" => self.handle.max_len = parse_number(&key, &value)?,
                "BLOCK_LIST_APPLY_POLICY" => self.block_list.apply_policy = value.parse()?,
                _ => tracing::trace!(key = %key, "ignoring unknown config override"),
            }
        }
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), KiteError> {
        let rules = &self.handle;
        if rules.debounce_ms == 0 {
            return Err(KiteError::invalid("handle.debounce_ms must be greater than 0"));
        }
        if rules.min_len == 0 {
            return Err(KiteError::invalid("handle.min_len must be at least 1"));
        }
        if rules.min_len > rules.max_len {
            return Err(KiteError::invalid(format!(
                "handle.min_len ({}) must not exceed handle.max_len ({})",
                rules.min_len, rules.max_len
            )));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, KiteError> {
    value
        .trim()
        .parse()
        .map_err(|_| KiteError::invalid(format!("{key} must be a non-negative integer, got {value:?}")))
}
