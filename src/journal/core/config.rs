//! Configuration for the journal.

use std::path::PathBuf;

use chrono::FixedOffset;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::journal::core::errors::{JournalError, JournalResult};

/// Environment variable overriding [`StorageConfig::sqlite_path`].
pub const DB_PATH_ENV: &str = "JOURNAL_DB_PATH";
/// Environment variable overriding [`StorageConfig::busy_timeout_ms`].
pub const BUSY_TIMEOUT_ENV: &str = "JOURNAL_BUSY_TIMEOUT_MS";
/// Environment variable overriding [`ClockConfig::utc_offset_minutes`].
pub const UTC_OFFSET_ENV: &str = "JOURNAL_UTC_OFFSET_MINUTES";

/// Top-level configuration for the journal.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct JournalConfig {
    /// Storage settings.
    pub storage: StorageConfig,
    /// Wall-clock settings.
    pub clock: ClockConfig,
    /// Display settings for read projections.
    pub display: DisplayConfig,
}

impl JournalConfig {
    /// Build the default config and apply environment overrides.
    ///
    /// # Errors
    /// Returns an error if an override cannot be parsed or the result is invalid.
    pub fn from_env() -> JournalResult<Self> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var(DB_PATH_ENV) {
            config.storage.sqlite_path = PathBuf::from(path);
        }
        if let Ok(raw) = std::env::var(BUSY_TIMEOUT_ENV) {
            config.storage.busy_timeout_ms = raw.trim().parse().map_err(|_| {
                JournalError::InvalidConfig(format!("{BUSY_TIMEOUT_ENV} is not a number: {raw}"))
            })?;
        }
        if let Ok(raw) = std::env::var(UTC_OFFSET_ENV) {
            config.clock.utc_offset_minutes = raw.trim().parse().map_err(|_| {
                JournalError::InvalidConfig(format!("{UTC_OFFSET_ENV} is not a number: {raw}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> JournalResult<()> {
        if self.storage.sqlite_path.as_os_str().is_empty() {
            return Err(JournalError::InvalidConfig(
                "storage.sqlite_path must not be empty".to_string(),
            ));
        }

        self.clock.offset()?;

        if self.display.short_date_format.trim().is_empty() {
            return Err(JournalError::InvalidConfig(
                "display.short_date_format must not be empty".to_string(),
            ));
        }
        if StrftimeItems::new(&self.display.short_date_format).any(|item| matches!(item, Item::Error)) {
            return Err(JournalError::InvalidConfig(format!(
                "display.short_date_format is not a valid format: {}",
                self.display.short_date_format
            )));
        }

        Ok(())
    }
}

/// Storage configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `SQLite` database path.
    pub sqlite_path: PathBuf,
    /// How long a writer waits on a locked database before failing.
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("journal.sqlite"),
            busy_timeout_ms: 5_000,
        }
    }
}

/// Wall-clock configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Offset of the account's local time from UTC, in minutes.
    pub utc_offset_minutes: i32,
}

impl ClockConfig {
    /// Resolve the configured offset.
    ///
    /// # Errors
    /// Returns an error if the offset is outside +/- 24 hours.
    pub fn offset(&self) -> JournalResult<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                JournalError::InvalidConfig(format!(
                    "clock.utc_offset_minutes out of range: {}",
                    self.utc_offset_minutes
                ))
            })
    }
}

/// Display settings for list projections.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// `chrono` format string for short dates in conversation lists.
    pub short_date_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            short_date_format: "%b %-d, %Y".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = JournalConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage.busy_timeout_ms, 5_000);
        assert_eq!(config.display.short_date_format, "%b %-d, %Y");
    }

    #[test]
    fn offset_out_of_range_is_rejected() {
        let mut config = JournalConfig::default();
        config.clock.utc_offset_minutes = 25 * 60;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, JournalError::InvalidConfig(_)));
    }

    #[test]
    fn broken_date_format_is_rejected() {
        let mut config = JournalConfig::default();
        config.display.short_date_format = "%Y-%".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, JournalError::InvalidConfig(_)));
    }

    #[test]
    fn offset_converts_minutes() {
        let clock = ClockConfig {
            utc_offset_minutes: -300,
        };
        assert_eq!(clock.offset().unwrap().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn config_roundtrips_through_json() {
        let config = JournalConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: JournalConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.storage.sqlite_path, config.storage.sqlite_path);
    }
}
