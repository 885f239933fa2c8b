//! Settings and application binary fixtures

use bootloader_core::{AppSettings, NetworkConfig, ValidatedSettings};
use bootloader_update::version::FIXED_FILE_INFO_SIGNATURE;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Validated settings pointing at `url` and `app_path`
pub fn settings(url: &str, app_path: &Path) -> ValidatedSettings {
    AppSettings {
        update_service_url: Some(url.to_string()),
        application_path: Some(app_path.to_string_lossy().into_owned()),
        network: NetworkConfig {
            timeout_secs: 5,
            ..NetworkConfig::default()
        },
    }
    .validate()
    .expect("test settings should validate")
}

/// Temporary directory with the application path inside it
pub fn app_dir() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let app = temp.path().join("app.exe");
    (temp, app)
}

/// Write a fake binary carrying an embedded version resource
pub fn write_versioned_binary(path: &Path, major: u16, minor: u16, build: u16) {
    let mut bytes = b"MZ fake application header".to_vec();
    bytes.extend_from_slice(&FIXED_FILE_INFO_SIGNATURE.to_le_bytes());
    bytes.extend_from_slice(&0x0001_0000u32.to_le_bytes());
    bytes.extend_from_slice(&(((major as u32) << 16) | minor as u32).to_le_bytes());
    bytes.extend_from_slice(&((build as u32) << 16).to_le_bytes());
    fs::write(path, bytes).unwrap();
}
