//! Placement and removal of the rendered unit file.

use std::fs;
use std::path::Path;

use super::file_ops::{write_file_atomic, UNIT_FILE_MODE};
use super::privileges::{self, Elevation};
use super::template::RenderedUnit;
use crate::error::{InstallerError, Result};

/// Copy `unit` to `dest`, overwriting whatever is there.
pub(crate) fn deploy_unit(unit: &RenderedUnit, dest: &Path, use_sudo: bool) -> Result<()> {
    let dir = unit_dir_of(dest);

    match privileges::elevation_for(dir, use_sudo)? {
        Elevation::Direct => {
            fs::create_dir_all(dir).map_err(|e| {
                InstallerError::io(format!("failed to create {}", dir.display()), e)
            })?;
            write_file_atomic(dest, &unit.content, UNIT_FILE_MODE).map_err(|e| match e {
                InstallerError::Io { source, .. }
                    if source.kind() == std::io::ErrorKind::PermissionDenied =>
                {
                    InstallerError::PermissionDenied {
                        message: format!("cannot write {}: {source}", dest.display()),
                        code: None,
                    }
                }
                other => other,
            })?;
        }
        Elevation::Sudo(sudo) => {
            privileges::sudo_install(&sudo, &unit.path, dest, UNIT_FILE_MODE)?;
        }
    }

    log::info!("Installed {}", dest.display());
    Ok(())
}

/// Delete the unit at `path`. Returns whether a file was removed.
pub(crate) fn remove_unit(path: &Path, use_sudo: bool) -> Result<bool> {
    if !path.exists() {
        log::debug!("{} not present", path.display());
        return Ok(false);
    }

    match privileges::elevation_for(unit_dir_of(path), use_sudo)? {
        Elevation::Direct => fs::remove_file(path)
            .map_err(|e| InstallerError::io(format!("failed to remove {}", path.display()), e))?,
        Elevation::Sudo(sudo) => privileges::sudo_remove(&sudo, path)?,
    }

    log::info!("Removed {}", path.display());
    Ok(true)
}

fn unit_dir_of(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}
