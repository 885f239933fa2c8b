//! # bootloader-core
//!
//! Core library for the bootloader providing:
//! - Settings file parsing (`appsettings.json` / `appsettings.yaml`)
//! - Environment and command-line overrides
//! - Validation into an immutable settings value
//! - Shared error types

pub mod config;
pub mod error;
pub mod types;

pub use config::{SettingsLoader, SettingsOverrides, DEFAULT_SETTINGS_FILE};
pub use error::{Error, Result};
pub use types::{AppSettings, NetworkConfig, ValidatedSettings};
