//! Crash-safe file replacement.
//!
//! Bytes are written to a temporary file in the target's directory, flushed to
//! disk and renamed over the target, so readers only ever see the previous
//! complete file or the new complete file.

use crate::errors::{AppError, AppResult};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

#[cfg(unix)]
use crate::constants::{DEFAULT_DIR_PERMISSIONS, DEFAULT_FILE_PERMISSIONS};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Atomically replaces `path` with `bytes`.
///
/// Missing parent directories are created owner-only (0o700) and the file is
/// owner read/write (0o600) on Unix.
///
/// # Errors
///
/// Returns `AppError::Io` if any step fails. The previous file, if any, is left
/// untouched in that case.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> AppResult<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| {
            AppError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Path has no parent directory: {}", path.display()),
            ))
        })?;
    ensure_private_dir(parent)?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| {
        AppError::Io(io::Error::new(
            e.kind(),
            format!("Failed to create temporary file in {}: {}", parent.display(), e),
        ))
    })?;

    #[cfg(unix)]
    temp.as_file()
        .set_permissions(fs::Permissions::from_mode(DEFAULT_FILE_PERMISSIONS))?;

    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;

    temp.persist(path).map_err(|e| {
        AppError::Io(io::Error::new(
            e.error.kind(),
            format!("Failed to replace {}: {}", path.display(), e.error),
        ))
    })?;

    sync_dir(parent);
    debug!("Wrote {} bytes to {:?}", bytes.len(), path);
    Ok(())
}

/// Creates `dir` (and its parents) with owner-only permissions if missing.
fn ensure_private_dir(dir: &Path) -> AppResult<()> {
    if dir.is_dir() {
        return Ok(());
    }

    fs::create_dir_all(dir).map_err(|e| {
        AppError::Io(io::Error::new(
            e.kind(),
            format!("Failed to create directory {}: {}", dir.display(), e),
        ))
    })?;

    #[cfg(unix)]
    {
        fs::set_permissions(dir, fs::Permissions::from_mode(DEFAULT_DIR_PERMISSIONS))?;
        debug!("Set 0o700 permissions on {:?}", dir);
    }
    Ok(())
}

/// Flushes the directory entry after a rename. Best effort.
fn sync_dir(dir: &Path) {
    #[cfg(unix)]
    if let Err(e) = fs::File::open(dir).and_then(|d| d.sync_all()) {
        debug!("Directory sync skipped for {:?}: {}", dir, e);
    }
    #[cfg(not(unix))]
    let _ = dir;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_creates_parents_and_replaces() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("store.enc");

        write_atomic(&path, b"first").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"first");

        write_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");

        // Only the target remains; no temporary files linger.
        let entries = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    #[cfg(unix)]
    fn test_permissions_are_private() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("private");
        let path = nested.join("store.enc");

        write_atomic(&path, b"data").unwrap();

        let file_mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        let dir_mode = fs::metadata(&nested).unwrap().permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600);
        assert_eq!(dir_mode, 0o700);
    }

    #[test]
    fn test_failed_replace_cleans_up() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.enc");
        write_atomic(&path, b"original").unwrap();

        // A directory at the target path cannot be replaced by a file.
        let blocked = dir.path().join("blocked");
        fs::create_dir(&blocked).unwrap();
        fs::write(blocked.join("keep"), b"x").unwrap();
        assert!(write_atomic(&blocked, b"new").is_err());

        assert!(blocked.join("keep").exists());
        assert_eq!(fs::read(&path).unwrap(), b"original");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }
}
