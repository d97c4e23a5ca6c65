use crate::{SprintboardError, SprintboardResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Length of a "1d" duration token, in hours.
    #[serde(default = "default_hours_per_day")]
    pub hours_per_day: u64,
    /// Length of a "1w" duration token, in days.
    #[serde(default = "default_days_per_week")]
    pub days_per_week: u64,
    /// How many times a unit of work is re-run after a write conflict.
    #[serde(default = "default_transient_retries")]
    pub transient_retries: u32,
    #[serde(default = "default_locale")]
    pub default_locale: String,
}

fn default_hours_per_day() -> u64 {
    8
}

fn default_days_per_week() -> u64 {
    5
}

fn default_transient_retries() -> u32 {
    1
}

fn default_locale() -> String {
    "en".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hours_per_day: default_hours_per_day(),
            days_per_week: default_days_per_week(),
            transient_retries: default_transient_retries(),
            default_locale: default_locale(),
        }
    }
}

impl EngineConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/sprintboard/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("sprintboard/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("sprintboard\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    /// Load from the platform config path, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                tracing::warn!("Ignoring config at {}: {}", path.display(), e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> SprintboardResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| SprintboardError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> SprintboardResult<()> {
        if self.hours_per_day == 0 || self.hours_per_day > 24 {
            return Err(SprintboardError::Config(format!(
                "hours_per_day must be between 1 and 24, got {}",
                self.hours_per_day
            )));
        }
        if self.days_per_week == 0 || self.days_per_week > 7 {
            return Err(SprintboardError::Config(format!(
                "days_per_week must be between 1 and 7, got {}",
                self.days_per_week
            )));
        }
        Ok(())
    }

    pub fn seconds_per_day(&self) -> u64 {
        self.hours_per_day * 3600
    }

    pub fn seconds_per_week(&self) -> u64 {
        self.seconds_per_day() * self.days_per_week
    }
}
