//! Type definitions for bootloader settings

mod settings;

pub use settings::{AppSettings, NetworkConfig, ValidatedSettings};
