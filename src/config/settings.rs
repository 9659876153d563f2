//! Application settings loaded from config.toml
//!
//! Every section and key is optional; missing values fall back to defaults, and a
//! missing file means "all defaults". Secrets (bot tokens) are never read from this
//! file, they come from the environment.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{path::Path, time::Duration};
use tracing::info;

/// Config file used when `HABIT_BUDDY_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Reminder dispatch job settings
    #[serde(default)]
    pub dispatch: DispatchSettings,
    /// Messaging API settings
    #[serde(default)]
    pub messaging: MessagingSettings,
}

/// `[dispatch]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    /// Seconds between dispatch ticks
    pub interval_secs: u64,
    /// Upper bound for a single delivery, in seconds
    pub delivery_timeout_secs: u64,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            delivery_timeout_secs: 10,
        }
    }
}

impl DispatchSettings {
    /// Tick interval as a [`Duration`]
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Delivery timeout as a [`Duration`]
    #[must_use]
    pub const fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout_secs)
    }
}

/// `[messaging]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MessagingSettings {
    /// Bot API prefix; the bot token and `/sendMessage` are appended to it
    pub api_base_url: String,
}

impl Default for MessagingSettings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.telegram.org/bot".to_string(),
        }
    }
}

impl Settings {
    /// Checks values that would make the dispatch job misbehave.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for a zero interval or timeout, or an interval longer
    /// than a minute (some minutes would never be scanned).
    pub fn validate(&self) -> Result<()> {
        if self.dispatch.interval_secs == 0 || self.dispatch.interval_secs > 60 {
            return Err(Error::Config {
                message: format!(
                    "dispatch.interval_secs must be between 1 and 60, got {}",
                    self.dispatch.interval_secs
                ),
            });
        }
        if self.dispatch.delivery_timeout_secs == 0 {
            return Err(Error::Config {
                message: "dispatch.delivery_timeout_secs must be greater than zero".to_string(),
            });
        }
        if self.messaging.api_base_url.trim().is_empty() {
            return Err(Error::Config {
                message: "messaging.api_base_url cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value is out of range
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    let settings: Settings = toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    settings.validate()?;
    Ok(settings)
}

/// Loads settings from `HABIT_BUDDY_CONFIG` (default `./config.toml`), using the
/// defaults when the file does not exist.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_default_settings() -> Result<Settings> {
    let path =
        std::env::var("HABIT_BUDDY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    if Path::new(&path).exists() {
        info!("Loading settings from {}", path);
        load_settings(&path)
    } else {
        info!("No config file at {}, using default settings", path);
        Ok(Settings::default())
    }
}
