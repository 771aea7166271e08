//! Configuration file support for CalorieKo.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/calorieko/config.toml`.

use crate::chart::ChartFrame;
use crate::sequencer::SequencerTimings;
use crate::{Error, NutritionTarget, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub targets: TargetsConfig,

    #[serde(default)]
    pub chart: ChartFrame,

    #[serde(default)]
    pub sequencer: SequencerTimings,
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

/// Fallback nutrition targets, used until onboarding has saved a profile
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TargetsConfig {
    #[serde(default = "default_daily_calories")]
    pub daily_calories: u32,

    #[serde(default = "default_daily_sodium_mg")]
    pub daily_sodium_mg: u32,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            daily_calories: default_daily_calories(),
            daily_sodium_mg: default_daily_sodium_mg(),
        }
    }
}

impl TargetsConfig {
    pub fn to_target(&self) -> Result<NutritionTarget> {
        NutritionTarget::new(self.daily_calories, self.daily_sodium_mg)
            .map_err(|e| Error::Config(e.to_string()))
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("calorieko")
}

fn default_daily_calories() -> u32 {
    NutritionTarget::DEFAULT_CALORIES
}

fn default_daily_sodium_mg() -> u32 {
    NutritionTarget::DEFAULT_SODIUM_MG
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

    /// Check cross-field constraints serde cannot express
    pub fn validate(&self) -> Result<()> {
        self.targets.to_target()?;
        self.chart
            .validate()
            .map_err(|e| Error::Config(format!("[chart] {}", e)))?;
        self.sequencer.validate()?;
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("calorieko").join("config.toml")
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
