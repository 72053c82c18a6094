//! Configuration file support for LightWeight.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/lightweight/config.toml`.

use crate::metrics::{SPARKLINE_POINTS, TREND_POINTS};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub charts: ChartsConfig,

    #[serde(default)]
    pub history: HistoryConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// How many points the sparklines and trend charts show
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChartsConfig {
    #[serde(default = "default_sparkline_points")]
    pub sparkline_points: usize,

    #[serde(default = "default_trend_points")]
    pub trend_points: usize,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            sparkline_points: default_sparkline_points(),
            trend_points: default_trend_points(),
        }
    }
}

/// Lengths of the recent-sets and per-exercise history lists
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    #[serde(default = "default_detail_limit")]
    pub detail_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
            detail_limit: default_detail_limit(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("lightweight")
}

fn default_sparkline_points() -> usize {
    SPARKLINE_POINTS
}

fn default_trend_points() -> usize {
    TREND_POINTS
}

fn default_recent_limit() -> usize {
    8
}

fn default_detail_limit() -> usize {
    30
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("lightweight").join("config.toml")
    }

    /// Reject settings that would make every chart empty
    pub fn validate(&self) -> Result<()> {
        if self.charts.sparkline_points < 2 || self.charts.trend_points < 2 {
            return Err(Error::Config(
                "chart point counts must be at least 2".into(),
            ));
        }
        Ok(())
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.charts.sparkline_points, 18);
        assert_eq!(config.charts.trend_points, 30);
        assert_eq!(config.history.recent_limit, 8);
        assert_eq!(config.history.detail_limit, 30);
        assert!(config.data.data_dir.ends_with("lightweight"));
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.history.recent_limit = 12;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.history.recent_limit, 12);
        assert_eq!(loaded.charts.trend_points, config.charts.trend_points);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[charts]
trend_points = 60
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.charts.trend_points, 60);
        assert_eq!(config.charts.sparkline_points, 18); // default
        assert_eq!(config.history.detail_limit, 30); // default
    }

    #[test]
    fn test_invalid_chart_points_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[charts]\nsparkline_points = 1\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}
