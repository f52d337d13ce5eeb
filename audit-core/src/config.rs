use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::deadline::DEFAULT_WARNING_DAYS;
use crate::error::{StoreError, StoreResult};

/// Environment variable overriding the settings file location
pub const CONFIG_PATH_ENV: &str = "AUDIT_CONFIG_PATH";
/// Environment variable overriding the warning threshold
pub const WARNING_DAYS_ENV: &str = "AUDIT_WARNING_DAYS";

/// User settings for the tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Days before a due date at which pending requests are flagged
    #[serde(default = "default_warning_days")]
    pub warning_days: i64,

    /// Seed snapshot loaded at start-up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_path: Option<PathBuf>,

    /// Directory the CSV download is written to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

fn default_warning_days() -> i64 {
    DEFAULT_WARNING_DAYS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            warning_days: DEFAULT_WARNING_DAYS,
            seed_path: None,
            export_dir: None,
        }
    }
}

impl Settings {
    /// Loads settings from `path`. A missing file gives the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {:?}", path))?;
        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {:?}", path))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads from the resolved settings path, then applies the
    /// `AUDIT_WARNING_DAYS` override
    pub fn load_default() -> Result<Self> {
        let mut settings = Self::load(get_config_path()?)?;
        if let Ok(raw) = std::env::var(WARNING_DAYS_ENV) {
            let days = parse_warning_days(&raw)?;
            settings.set_warning_days(days)?;
        }
        Ok(settings)
    }

    /// Changes the warning threshold at runtime
    pub fn set_warning_days(&mut self, days: i64) -> StoreResult<()> {
        validate_warning_days(days)?;
        if days != self.warning_days {
            log::info!("Warning threshold changed from {} to {} days", self.warning_days, days);
        }
        self.warning_days = days;
        Ok(())
    }

    pub fn validate(&self) -> StoreResult<()> {
        validate_warning_days(self.warning_days)
    }

    /// Writes the settings as YAML, creating the config directory if needed.
    /// Invalid settings are refused so the next `load` cannot fail on them.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {:?}", dir))?;
        }
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml).with_context(|| format!("Failed to write settings file: {:?}", path))?;

        log::info!("Saved settings to {:?} (warning days {})", path, self.warning_days);
        Ok(())
    }
}

fn validate_warning_days(days: i64) -> StoreResult<()> {
    if days < 0 {
        return Err(StoreError::Validation(format!(
            "warning days must not be negative (got {})",
            days
        )));
    }
    Ok(())
}

/// Parses a warning threshold typed by a user
pub fn parse_warning_days(raw: &str) -> StoreResult<i64> {
    let days = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| StoreError::Validation(format!("invalid warning days: '{}'", raw)))?;
    validate_warning_days(days)?;
    Ok(days)
}

/// Gets the path to the settings file
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }

    let config_dir = dirs::config_dir().context("Failed to determine config directory")?;

    Ok(config_dir.join("audit-tracker").join("config.yaml"))
}
