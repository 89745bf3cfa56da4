//! Atomic file operations for unit and template files.
//!
//! Content is written to a temporary file in the target's own directory and
//! renamed over the target, so a reader never sees a half-written unit.

use std::fs;
use std::io::Write;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::Path;

use nix::unistd::{chown, Gid, Uid};
use tempfile::NamedTempFile;

use crate::error::{InstallerError, Result};

/// Mode for files systemd reads: owner rw, everyone else r.
pub const UNIT_FILE_MODE: u32 = 0o644;

/// Write `content` to `path` atomically and set `mode` on the result.
pub(crate) fn write_file_atomic(path: &Path, content: &[u8], mode: u32) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| InstallerError::io(format!("failed to create temp file in {}", dir.display()), e))?;

    tmp.write_all(content)
        .map_err(|e| InstallerError::io("failed to write temp file", e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| InstallerError::io("failed to sync temp file", e))?;
    tmp.as_file()
        .set_permissions(fs::Permissions::from_mode(mode))
        .map_err(|e| InstallerError::io("failed to set temp file permissions", e))?;

    tmp.persist(path).map_err(|e| {
        InstallerError::io(format!("failed to move temp file to {}", path.display()), e.error)
    })?;

    Ok(())
}

/// Rewrite an existing file atomically, keeping its mode and, when running
/// as root, its owner.
pub(crate) fn rewrite_file_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let meta = fs::metadata(path).ok();
    let mode = existing_mode(path, UNIT_FILE_MODE);
    write_file_atomic(path, content, mode)?;

    if let Some(meta) = meta {
        if Uid::effective().is_root() && meta.uid() != 0 {
            chown(
                path,
                Some(Uid::from_raw(meta.uid())),
                Some(Gid::from_raw(meta.gid())),
            )
            .map_err(|e| {
                InstallerError::io(
                    format!("failed to restore owner of {}", path.display()),
                    std::io::Error::from(e),
                )
            })?;
        }
    }
    Ok(())
}

/// Permission bits of an existing file, or `fallback` if it has none yet.
pub(crate) fn existing_mode(path: &Path, fallback: u32) -> u32 {
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o7777)
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_existing_file_and_sets_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.service");
        fs::write(&path, "old").unwrap();

        write_file_atomic(&path, b"new", UNIT_FILE_MODE).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(existing_mode(&path, 0), UNIT_FILE_MODE);
        // no stray temp files left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn rewrite_keeps_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.service");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

        rewrite_file_atomic(&path, b"new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(existing_mode(&path, 0), 0o600);
    }

    #[test]
    fn existing_mode_falls_back_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(existing_mode(&dir.path().join("nope"), 0o600), 0o600);
    }
}
