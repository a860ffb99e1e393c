use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// How long the event loop waits for input before redrawing.
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
}

fn default_db_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("live-feeds")
        .join("feeds.db")
        .to_string_lossy()
        .to_string()
}

fn default_tick_rate_ms() -> u64 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            tick_rate_ms: default_tick_rate_ms(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.tick_rate_ms == 0 {
            return Err(AppError::Config("tick_rate_ms must be greater than zero".into()));
        }
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("live-feeds")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.tick_rate_ms, 100);
        assert!(config.db_path.ends_with("feeds.db"));
    }

    #[test]
    fn explicit_values_are_kept() {
        let config = Config::from_toml("db_path = \"/tmp/x.db\"\ntick_rate_ms = 250\n").unwrap();
        assert_eq!(config.db_path, "/tmp/x.db");
        assert_eq!(config.tick_rate_ms, 250);
    }

    #[test]
    fn zero_tick_rate_is_rejected() {
        let err = Config::from_toml("tick_rate_ms = 0").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
