//! Configuration management for milelog.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::location::Coordinates;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "milelog";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "journeys.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `MILELOG_`, sections split on `__`)
/// 2. TOML config file at `~/.config/milelog/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Location lookup configuration.
    pub location: LocationConfig,
    /// Journey recording configuration.
    pub journey: JourneyConfig,
    /// Export configuration.
    pub export: ExportConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/milelog/journeys.db`
    pub database_path: Option<PathBuf>,
    /// Name of the slot holding the journey collection.
    pub slot_name: String,
}

/// Location-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Base URL of the postcodes.io compatible lookup service.
    pub resolver_url: String,
    /// HTTP timeout for a single lookup, in seconds.
    pub timeout_secs: u64,
    /// Fixed latitude reported as the device position.
    pub latitude: Option<f64>,
    /// Fixed longitude reported as the device position.
    pub longitude: Option<f64>,
}

/// Journey recording configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JourneyConfig {
    /// strftime format for the journey date.
    pub date_format: String,
}

/// Export-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory that downloaded journey files are written to.
    /// Defaults to the current directory.
    pub directory: Option<PathBuf>,
    /// Copy to the clipboard a second time with CRLF line endings when the
    /// plain copy fails. Both attempts use the same clipboard.
    pub clipboard_crlf_retry: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Resolved at runtime
            slot_name: "journeys".to_string(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            resolver_url: "https://api.postcodes.io".to_string(),
            timeout_secs: 10,
            latitude: None,
            longitude: None,
        }
    }
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            date_format: "%-m/%-d/%Y".to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: None,
            clipboard_crlf_retry: true,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("MILELOG_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.slot_name.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "slot_name must not be empty".to_string(),
            });
        }

        if self.location.resolver_url.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "resolver_url must not be empty".to_string(),
            });
        }

        if self.location.timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "timeout_secs must be greater than 0".to_string(),
            });
        }

        match (self.location.latitude, self.location.longitude) {
            (Some(lat), Some(lon)) => {
                Coordinates::new(lat, lon).map_err(|e| Error::ConfigValidation {
                    message: e.to_string(),
                })?;
            }
            (None, None) => {}
            _ => {
                return Err(Error::ConfigValidation {
                    message: "latitude and longitude must be set together".to_string(),
                });
            }
        }

        let format = &self.journey.date_format;
        if format.is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::ConfigValidation {
                message: format!("invalid date_format: {format}"),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the export directory, resolving defaults if not set.
    #[must_use]
    pub fn export_dir(&self) -> PathBuf {
        self.export
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Get the configured fixed position, if both coordinates are set.
    #[must_use]
    pub fn fixed_position(&self) -> Option<Coordinates> {
        let lat = self.location.latitude?;
        let lon = self.location.longitude?;
        Coordinates::new(lat, lon).ok()
    }

    /// Get the lookup timeout as a Duration.
    #[must_use]
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.location.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.storage.slot_name, "journeys");
        assert!(config.storage.database_path.is_none());
        assert_eq!(config.location.resolver_url, "https://api.postcodes.io");
        assert_eq!(config.location.timeout_secs, 10);
        assert!(config.location.latitude.is_none());
        assert_eq!(config.journey.date_format, "%-m/%-d/%Y");
        assert!(config.export.clipboard_crlf_retry);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_slot_name() {
        let mut config = Config::default();
        config.storage.slot_name = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("slot_name"));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.location.timeout_secs = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("timeout_secs"));
    }

    #[test]
    fn test_validate_half_specified_position() {
        let mut config = Config::default();
        config.location.latitude = Some(51.5);

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("together"));
    }

    #[test]
    fn test_validate_out_of_range_position() {
        let mut config = Config::default();
        config.location.latitude = Some(91.0);
        config.location.longitude = Some(0.0);

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_invalid_date_format() {
        let mut config = Config::default();
        config.journey.date_format = "%Q".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("date_format"));
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.to_string_lossy().contains("journeys.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_export_dir_default() {
        assert_eq!(Config::default().export_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_fixed_position() {
        let mut config = Config::default();
        assert!(config.fixed_position().is_none());

        config.location.latitude = Some(51.501);
        config.location.longitude = Some(-0.1416);
        let coords = config.fixed_position().unwrap();
        assert!((coords.latitude() - 51.501).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lookup_timeout() {
        assert_eq!(Config::default().lookup_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("milelog"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[storage]\nslot_name = \"work\"\n\n[location]\nlatitude = 51.5\nlongitude = -0.12\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.storage.slot_name, "work");
        assert!(config.fixed_position().is_some());
    }

    #[test]
    fn test_export_config_deserialize() {
        let json = r#"{"clipboard_crlf_retry": false}"#;
        let export: ExportConfig = serde_json::from_str(json).unwrap();
        assert!(!export.clipboard_crlf_retry);
        assert!(export.directory.is_none());
    }

    #[test]
    fn test_storage_config_deserialize() {
        let json = r#"{"slot_name": "jossJourneyData"}"#;
        let storage: StorageConfig = serde_json::from_str(json).unwrap();
        assert_eq!(storage.slot_name, "jossJourneyData");
        assert!(storage.database_path.is_none());
    }
}
