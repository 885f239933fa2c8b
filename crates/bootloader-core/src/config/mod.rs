//! Settings loading and management

mod loader;

pub use loader::{SettingsLoader, SettingsOverrides, DEFAULT_SETTINGS_FILE};
