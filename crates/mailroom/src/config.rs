//! Configuration loading for the record store
//!
//! Settings can be saved back to the config directory. Loading checks,
//! in order of priority:
//! 1. JSON file (~/.config/mailroom/store.json)
//! 2. Runtime environment variables
//! 3. Built-in defaults

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Store settings filename in the Mailroom config directory
const STORE_CONFIG_FILE: &str = "store.json";

const SHARD_COUNT_VAR: &str = "MAILROOM_SHARD_COUNT";
const FIRST_ID_VAR: &str = "MAILROOM_FIRST_ID";

pub const DEFAULT_SHARD_COUNT: usize = 16;
pub const DEFAULT_FIRST_ID: u64 = 1;

/// Tuning for the in-memory record store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    /// Number of lock stripes records are spread across
    pub shard_count: usize,
    /// First identifier the store issues
    pub first_id: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT,
            first_id: DEFAULT_FIRST_ID,
        }
    }
}

impl StoreConfig {
    /// Load settings from the config file if present, else from the environment
    pub fn load() -> Result<Self> {
        if config::config_exists(STORE_CONFIG_FILE) {
            let cfg: StoreConfig = config::load_json(STORE_CONFIG_FILE)?;
            return cfg.validated();
        }

        Self::from_env()
    }

    /// Load settings from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let cfg: StoreConfig = config::load_json_file(path)?;
        cfg.validated()
    }

    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: StoreConfig =
            serde_json::from_str(json).context("Failed to parse store config JSON")?;
        cfg.validated()
    }

    /// Load settings from environment variables, defaulting what is unset
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Self::default();

        if let Some(raw) = lookup(SHARD_COUNT_VAR) {
            cfg.shard_count = raw
                .trim()
                .parse()
                .with_context(|| format!("{SHARD_COUNT_VAR} is not a number: {raw}"))?;
        }
        if let Some(raw) = lookup(FIRST_ID_VAR) {
            cfg.first_id = raw
                .trim()
                .parse()
                .with_context(|| format!("{FIRST_ID_VAR} is not a number: {raw}"))?;
        }

        cfg.validated()
    }

    fn validated(self) -> Result<Self> {
        ensure!(self.shard_count >= 1, "shardCount must be at least 1");
        ensure!(self.first_id >= 1, "firstId must be at least 1");
        Ok(self)
    }

    /// Write these settings to the Mailroom config directory
    pub fn save(&self) -> Result<()> {
        config::save_json(STORE_CONFIG_FILE, &self.clone().validated()?)
    }

    /// Write these settings to a specific JSON file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        config::save_json_file(path, &self.clone().validated()?)
    }

    /// Get the default store config path (~/.config/mailroom/store.json)
    pub fn default_config_path() -> Option<PathBuf> {
        config::config_path(STORE_CONFIG_FILE)
    }
}
