//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the persisted language preference and an optional
//! origin override for the offline cache worker.
//!
//! Configuration is stored at `~/.config/glasgow-tui/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::i18n::Language;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "glasgow-tui";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Origin the cache worker serves when no override is configured.
pub const DEFAULT_ORIGIN: &str = "https://glasgowscale.app";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Persisted UI language preference.
    #[serde(default)]
    pub language: Language,
    /// Origin override for the cache worker (mainly for development).
    pub origin: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Worker origin: `GLASGOW_ORIGIN` env var, then the configured
    /// override, then the default.
    pub fn origin(&self) -> String {
        std::env::var("GLASGOW_ORIGIN")
            .ok()
            .or_else(|| self.origin.clone())
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_string())
    }
}
