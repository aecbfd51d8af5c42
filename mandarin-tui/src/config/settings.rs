use std::path::Path;

use anyhow::{Context, Result};
use mandarin_core::client::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};

use super::paths;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSettings {
    /// `tracing` level for this app's crates; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Settings {
    /// Reads `config.toml`, writing the defaults on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_file()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
        } else {
            let settings = Self::default();
            settings.save_to(path)?;
            Ok(settings)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
