//! Settings types for the update bootstrapper
//!
//! `AppSettings` is the raw, deserialized form of the settings file. Both
//! required fields are optional at parse time so that a missing key surfaces
//! as a `MissingField` error naming the key rather than as a parse failure.
//! `ValidatedSettings` is the immutable value handed to the update pipeline.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Raw bootloader settings as read from disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AppSettings {
    /// Base URL of the update service
    #[serde(default)]
    pub update_service_url: Option<String>,

    /// Path of the managed application binary
    #[serde(default)]
    pub application_path: Option<String>,

    /// Network and HTTP configuration
    #[serde(default)]
    pub network: NetworkConfig,
}

/// Network and HTTP configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkConfig {
    /// Overall request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout() -> u64 {
    300 // 5 minutes
}
fn default_connect_timeout() -> u64 {
    30
}
fn default_user_agent() -> String {
    format!(
        "bootloader/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

impl AppSettings {
    /// Validate the raw settings into an immutable value
    ///
    /// Blank and whitespace-only values count as missing.
    pub fn validate(self) -> Result<ValidatedSettings> {
        let raw_url = required(self.update_service_url, "UpdateServiceUrl")?;
        let raw_path = required(self.application_path, "ApplicationPath")?;

        let update_service_url = Url::parse(&raw_url).map_err(|e| {
            Error::invalid_config(format!(
                "UpdateServiceUrl '{}' is not a valid URL: {}",
                raw_url, e
            ))
        })?;

        if !matches!(update_service_url.scheme(), "http" | "https") {
            return Err(Error::invalid_config(format!(
                "UpdateServiceUrl must use http or https, got '{}'",
                update_service_url.scheme()
            )));
        }

        if self.network.timeout_secs == 0 {
            return Err(Error::invalid_config("TimeoutSecs must be greater than zero"));
        }
        if self.network.connect_timeout_secs == 0 {
            return Err(Error::invalid_config(
                "ConnectTimeoutSecs must be greater than zero",
            ));
        }

        Ok(ValidatedSettings {
            update_service_url,
            application_path: PathBuf::from(raw_path),
            network: self.network,
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(Error::missing_field(field)),
    }
}

/// Settings that passed validation
///
/// Constructed once at startup and passed by reference through the pipeline.
#[derive(Debug, Clone)]
pub struct ValidatedSettings {
    update_service_url: Url,
    application_path: PathBuf,
    network: NetworkConfig,
}

impl ValidatedSettings {
    /// Base URL of the update service
    pub fn update_service_url(&self) -> &Url {
        &self.update_service_url
    }

    /// Path of the managed application binary
    pub fn application_path(&self) -> &Path {
        &self.application_path
    }

    /// Network configuration
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }
}
