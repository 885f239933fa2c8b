//! Atomic replacement of the application binary
//!
//! The new content is staged in a temporary file next to the target and then
//! renamed over it, so the target either keeps its old content or holds the
//! complete new content. The staged file is removed if anything fails.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Result, UpdateError};

/// Result of a successful apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedUpdate {
    /// Path of the replaced binary
    pub path: PathBuf,

    /// Number of bytes written
    pub bytes_written: u64,
}

/// Writes new application binaries into place
pub struct UpdateApplier;

impl UpdateApplier {
    /// Replace (or create) the file at `path` with exactly `data`
    pub fn apply(path: &Path, data: &[u8]) -> Result<AppliedUpdate> {
        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        debug!("Staging {} bytes in {:?}", data.len(), parent);

        let io_error = |e: io::Error| UpdateError::io(path, e);

        let mut staged = NamedTempFile::new_in(parent).map_err(io_error)?;
        staged.write_all(data).map_err(io_error)?;
        staged.as_file().sync_all().map_err(io_error)?;

        Self::carry_permissions(path, staged.path()).map_err(io_error)?;

        staged
            .persist(path)
            .map_err(|e| UpdateError::io(path, e.error))?;

        info!("Wrote {} bytes to {:?}", data.len(), path);
        Ok(AppliedUpdate {
            path: path.to_path_buf(),
            bytes_written: data.len() as u64,
        })
    }

    /// Give the staged file the permissions of the file it replaces
    ///
    /// A fresh install is made executable on unix.
    fn carry_permissions(target: &Path, staged: &Path) -> io::Result<()> {
        match fs::metadata(target) {
            Ok(metadata) => fs::set_permissions(staged, metadata.permissions()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    fs::set_permissions(staged, fs::Permissions::from_mode(0o755))?;
                }
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_apply_creates_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app.exe");

        let applied = UpdateApplier::apply(&path, &[1, 2, 3]).unwrap();

        assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3]);
        assert_eq!(applied.bytes_written, 3);
        assert_eq!(applied.path, path);
    }

    #[test]
    fn test_apply_replaces_longer_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app.exe");
        fs::write(&path, b"a much longer original binary").unwrap();

        UpdateApplier::apply(&path, b"new").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn test_apply_leaves_no_staging_files() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app.exe");

        UpdateApplier::apply(&path, b"content").unwrap();

        let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_apply_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing").join("app.exe");

        let err = UpdateApplier::apply(&path, b"content").unwrap_err();
        match err {
            UpdateError::Io { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("Expected Io error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_apply_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app");
        fs::write(&path, b"old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o750)).unwrap();

        UpdateApplier::apply(&path, b"new").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
    }

    #[cfg(unix)]
    #[test]
    fn test_apply_fresh_install_is_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app");

        UpdateApplier::apply(&path, b"new").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
