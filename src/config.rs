use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::advice::AdviceProfile;
use crate::analysis::AnalysisConfig;
use crate::error::FlareWatchError;
use crate::logging::LogConfig;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Days shown by `analyze` when no window is given
    #[serde(default = "default_display_days")]
    pub display_days: usize,

    /// Application metadata
    pub metadata: ConfigMetadata,

    /// Analysis thresholds and horizons
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Condition-specific advice text
    #[serde(default)]
    pub advice: AdviceProfile,

    /// Logging preferences
    #[serde(default)]
    pub logging: LogConfig,
}

fn default_display_days() -> usize {
    30
}

/// Configuration metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            display_days: default_display_days(),
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            analysis: AnalysisConfig::default(),
            advice: AdviceProfile::default(),
            logging: LogConfig::default(),
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("flarewatch")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();
        if !config_path.exists() {
            return Self::default();
        }

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    path = %config_path.display(),
                    error = %e,
                    "Ignoring unreadable config file, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Reject settings the analysis cannot work with
    pub fn validate(&self) -> std::result::Result<(), FlareWatchError> {
        let analysis = &self.analysis;
        if analysis.forecast_days == 0 {
            return Err(FlareWatchError::Configuration(
                "forecast_days must be at least 1".to_string(),
            ));
        }
        if !(analysis.confidence_level > 0.0 && analysis.confidence_level < 1.0) {
            return Err(FlareWatchError::Configuration(format!(
                "confidence_level must be between 0 and 1, got {}",
                analysis.confidence_level
            )));
        }
        if !(0.0..=1.0).contains(&analysis.correlation_threshold) {
            return Err(FlareWatchError::Configuration(format!(
                "correlation_threshold must be between 0 and 1, got {}",
                analysis.correlation_threshold
            )));
        }
        if let Some(profiles) = &analysis.day_profiles {
            if profiles.k == 0 {
                return Err(FlareWatchError::Configuration(
                    "day_profiles.k must be at least 1".to_string(),
                ));
            }
        }
        if self.display_days == 0 {
            return Err(FlareWatchError::Configuration(
                "display_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
