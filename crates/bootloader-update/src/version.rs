//! Installed application version resolution
//!
//! The version is read from the fixed file-info block of the binary's
//! embedded version resource. The block starts with the little-endian
//! signature `0xFEEF04BD`, followed by the structure version and the two
//! file-version words:
//!
//! ```text
//! u32 signature        0xFEEF04BD
//! u32 struct_version   0x0001xxxx
//! u32 file_version_ms  major << 16 | minor
//! u32 file_version_ls  build << 16 | revision
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Result, UpdateError};

/// Signature opening a fixed file-info block
pub const FIXED_FILE_INFO_SIGNATURE: u32 = 0xFEEF_04BD;

/// Version of the installed application
///
/// `build` is `-1` when unknown. The default `(0, 0, -1)` stands for
/// "never installed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AppVersion {
    /// Major version
    pub major: u32,

    /// Minor version
    pub minor: u32,

    /// Build number, -1 when unset
    pub build: i32,
}

impl AppVersion {
    /// Create a version from its components
    pub fn new(major: u32, minor: u32, build: i32) -> Self {
        Self {
            major,
            minor,
            build,
        }
    }

    /// Value sent as the `bugfix` query parameter
    pub fn bugfix_param(&self) -> String {
        if self.build >= 0 {
            self.build.to_string()
        } else {
            "0".to_string()
        }
    }
}

impl Default for AppVersion {
    fn default() -> Self {
        Self::new(0, 0, -1)
    }
}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.build >= 0 {
            write!(f, "{}.{}.{}", self.major, self.minor, self.build)
        } else {
            write!(f, "{}.{}", self.major, self.minor)
        }
    }
}

/// Resolves the version of the installed application binary
pub struct VersionResolver;

impl VersionResolver {
    /// Resolve the version of the binary at `path`
    ///
    /// A missing file resolves to [`AppVersion::default`]. A file without a
    /// version resource resolves to `0.0.0`. Any other read failure is fatal.
    pub fn resolve(path: &Path) -> Result<AppVersion> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No application installed at {:?}", path);
                return Ok(AppVersion::default());
            }
            Err(e) => return Err(UpdateError::io(path, e)),
        };

        let version = extract_file_version(&bytes).unwrap_or_else(|| {
            debug!("No version resource found in {:?}", path);
            AppVersion::new(0, 0, 0)
        });

        info!("Installed application version: {}", version);
        Ok(version)
    }
}

/// Find the first valid fixed file-info block in `bytes`
pub fn extract_file_version(bytes: &[u8]) -> Option<AppVersion> {
    let signature = FIXED_FILE_INFO_SIGNATURE.to_le_bytes();

    bytes
        .windows(signature.len())
        .enumerate()
        .filter(|(_, window)| *window == signature)
        .find_map(|(offset, _)| parse_fixed_file_info(&bytes[offset..]))
}

fn parse_fixed_file_info(block: &[u8]) -> Option<AppVersion> {
    let word = |index: usize| -> Option<u32> {
        let start = index * 4;
        let raw = block.get(start..start + 4)?;
        Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    };

    // Only structure version 1.x has been defined
    if word(1)? >> 16 != 1 {
        return None;
    }

    let file_version_ms = word(2)?;
    let file_version_ls = word(3)?;

    Some(AppVersion::new(
        file_version_ms >> 16,
        file_version_ms & 0xFFFF,
        (file_version_ls >> 16) as i32,
    ))
}
