//! Layered settings loader
//!
//! Loads settings from the following sources, low to high precedence:
//! 1. Settings file (`appsettings.json` by default, `.yaml`/`.yml` also accepted)
//! 2. Environment variables (BOOTLOADER_* prefix)
//! 3. Explicit overrides (CLI flags, supplied by the caller)
//!
//! The settings file may be absent only when the two required values are
//! supplied by the higher layers.

use crate::error::{Error, Result};
use crate::types::{AppSettings, ValidatedSettings};
use camino::{Utf8Path, Utf8PathBuf};
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use tracing::debug;

/// Default settings file name, resolved against the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "appsettings.json";

/// Caller-supplied overrides, applied last
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    /// Update service base URL
    pub update_service_url: Option<String>,

    /// Managed application path
    pub application_path: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl SettingsOverrides {
    fn apply(&self, mut settings: AppSettings) -> AppSettings {
        if let Some(url) = &self.update_service_url {
            settings.update_service_url = Some(url.clone());
        }
        if let Some(path) = &self.application_path {
            settings.application_path = Some(path.clone());
        }
        if let Some(secs) = self.timeout_secs {
            settings.network.timeout_secs = secs;
        }
        settings
    }
}

/// Settings loader
pub struct SettingsLoader {
    /// Path of the settings file
    settings_path: Utf8PathBuf,

    /// Overrides applied after the file and environment
    overrides: SettingsOverrides,
}

impl SettingsLoader {
    /// Create a loader reading the given settings file
    pub fn new(settings_path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
            overrides: SettingsOverrides::default(),
        }
    }

    /// Apply caller-supplied overrides on top of file and environment values
    pub fn with_overrides(mut self, overrides: SettingsOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Load and validate settings
    pub fn load(&self) -> Result<ValidatedSettings> {
        self.load_raw()?.validate()
    }

    /// Load settings with all layers applied, without validation
    pub fn load_raw(&self) -> Result<AppSettings> {
        let file_found = self.settings_path.exists();

        let mut settings = if file_found {
            debug!("Loading settings from {}", self.settings_path);
            self.load_file::<AppSettings>(&self.settings_path)?
        } else {
            debug!("Settings file {} not present", self.settings_path);
            AppSettings::default()
        };

        settings = self.apply_env_overrides(settings)?;
        settings = self.overrides.apply(settings);

        if !file_found
            && (settings.update_service_url.is_none() || settings.application_path.is_none())
        {
            return Err(Error::config_not_found(self.settings_path.as_str()));
        }

        Ok(settings)
    }

    /// Load a settings file, choosing the format by extension
    fn load_file<T: DeserializeOwned>(&self, path: &Utf8Path) -> Result<T> {
        let content = fs::read_to_string(path)?;

        let parsed = match path.extension() {
            Some("yaml") | Some("yml") => serde_yaml_ng::from_str(&content)
                .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))?,
            _ => serde_json::from_str(&content)
                .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))?,
        };

        Ok(parsed)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&self, mut settings: AppSettings) -> Result<AppSettings> {
        if let Ok(val) = env::var("BOOTLOADER_UPDATE_SERVICE_URL") {
            settings.update_service_url = Some(val);
        }

        if let Ok(val) = env::var("BOOTLOADER_APPLICATION_PATH") {
            settings.application_path = Some(val);
        }

        if let Ok(val) = env::var("BOOTLOADER_HTTP_TIMEOUT_SECS") {
            settings.network.timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("BOOTLOADER_HTTP_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("BOOTLOADER_CONNECT_TIMEOUT_SECS") {
            settings.network.connect_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("BOOTLOADER_CONNECT_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("BOOTLOADER_USER_AGENT") {
            settings.network.user_agent = val;
        }

        Ok(settings)
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new(DEFAULT_SETTINGS_FILE)
    }
}
