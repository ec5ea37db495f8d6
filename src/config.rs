//! Configuration management for Tinted Notes
//!
//! Handles loading, saving, and validating application configuration.
//! Configuration is persisted as JSON in the user's configuration directory.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application identifier following reverse-DNS convention
pub const APP_ID: &str = "dev.tinted.Notes";

/// Quiet period before an edit is written, in milliseconds
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 1000;

/// Title given to freshly created notes
pub const PLACEHOLDER_TITLE: &str = "Untitled Note";

/// Status given to freshly created notes
pub const INITIAL_NOTE_STATUS: &str = "pending";

/// Maximum image upload size (in bytes) - 5MB
pub const MAX_UPLOAD_SIZE: usize = 5 * 1024 * 1024;

/// Local storage key holding the active theme
pub const THEME_STORAGE_KEY: &str = "currentTheme";

/// Maximum number of notifications kept
pub const MAX_NOTIFICATIONS: usize = 20;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Autosave configuration
    pub autosave: AutosaveConfig,

    /// Note creation defaults
    pub notes: NotesConfig,

    /// Image upload limits
    pub uploads: UploadConfig,

    /// Theme persistence
    pub theme: ThemeConfig,

    /// Notification queue
    pub notifications: NotificationConfig,
}

impl Config {
    /// Load configuration from the default location, or return defaults
    pub fn load() -> ConfigResult<Self> {
        let path = Self::config_file()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Config =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> ConfigResult<()> {
        let path = Self::config_file()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::SaveError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::SaveError(e.to_string()))
    }

    /// Reject values the rest of the application cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.autosave.delay_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "autosave.delay_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.uploads.max_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "uploads.max_bytes".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.notes.placeholder_title.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "notes.placeholder_title".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Get the configuration directory path
    pub fn config_dir() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Get the configuration file path
    pub fn config_file() -> ConfigResult<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Get the data directory path (for durable local storage)
    pub fn data_dir() -> ConfigResult<PathBuf> {
        dirs::data_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }
}

/// Autosave configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    /// Enable autosave. When disabled edits are only written on explicit flush.
    pub enabled: bool,

    /// Debounce delay in milliseconds
    pub delay_ms: u64,
}

impl AutosaveConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
        }
    }
}

/// Defaults for newly created notes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesConfig {
    /// Title of a freshly created note
    pub placeholder_title: String,

    /// Status of a freshly created note
    pub initial_status: String,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            placeholder_title: PLACEHOLDER_TITLE.to_string(),
            initial_status: INITIAL_NOTE_STATUS.to_string(),
        }
    }
}

/// Image upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Maximum accepted size in bytes
    pub max_bytes: usize,

    /// Accepted MIME types
    pub allowed_types: Vec<String>,

    /// Object storage prefix; the user id is appended
    pub path_prefix: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: MAX_UPLOAD_SIZE,
            allowed_types: vec![
                "image/png".to_string(),
                "image/jpeg".to_string(),
                "image/gif".to_string(),
                "image/webp".to_string(),
            ],
            path_prefix: "images".to_string(),
        }
    }
}

/// Theme persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Local storage key for the active theme
    pub storage_key: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: THEME_STORAGE_KEY.to_string(),
        }
    }
}

/// Notification queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Maximum number of notifications retained
    pub capacity: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            capacity: MAX_NOTIFICATIONS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.autosave.enabled);
        assert_eq!(config.autosave.delay(), Duration::from_secs(1));
        assert_eq!(config.notes.placeholder_title, "Untitled Note");
        assert_eq!(config.theme.storage_key, "currentTheme");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.autosave.delay_ms, deserialized.autosave.delay_ms);
        assert_eq!(config.uploads.allowed_types, deserialized.uploads.allowed_types);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"autosave": {"delay_ms": 250}}"#).unwrap();
        assert_eq!(config.autosave.delay_ms, 250);
        assert!(config.autosave.enabled);
        assert_eq!(config.uploads.max_bytes, MAX_UPLOAD_SIZE);
    }

    #[test]
    fn test_zero_delay_rejected() {
        let mut config = Config::default();
        config.autosave.delay_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config.autosave.delay_ms, DEFAULT_AUTOSAVE_DELAY_MS);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = Config::default();
        config.autosave.delay_ms = 400;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.autosave.delay_ms, 400);
    }

    #[test]
    fn test_load_garbage_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }
}
