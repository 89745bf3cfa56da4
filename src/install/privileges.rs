//! Privilege checks for writing into the system unit directory.
//!
//! `/etc/systemd/user` is root-owned on every mainstream distribution, so a
//! non-root install normally goes through `sudo`.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use nix::unistd::{access, AccessFlags};

use crate::cmd;
use crate::error::{InstallerError, Result};

/// How a file gets into the unit directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Elevation {
    /// The process can write the directory itself
    Direct,
    /// Go through `sudo` at this path
    Sudo(PathBuf),
}

/// Decide how to write into `dir`.
pub(crate) fn elevation_for(dir: &Path, use_sudo: bool) -> Result<Elevation> {
    if is_writable(dir) {
        return Ok(Elevation::Direct);
    }
    if !use_sudo {
        return Err(InstallerError::PermissionDenied {
            message: format!("{} is not writable and sudo is disabled", dir.display()),
            code: None,
        });
    }
    let sudo = which::which("sudo").map_err(|_| InstallerError::PermissionDenied {
        message: format!("{} is not writable and sudo was not found", dir.display()),
        code: None,
    })?;
    log::debug!("{} needs elevation, using {}", dir.display(), sudo.display());
    Ok(Elevation::Sudo(sudo))
}

/// Whether `dir`, or the nearest ancestor that exists, is writable.
pub(crate) fn is_writable(dir: &Path) -> bool {
    let mut probe = Some(dir);
    while let Some(p) = probe {
        if p.exists() {
            return access(p, AccessFlags::W_OK).is_ok();
        }
        probe = p.parent();
    }
    false
}

/// `sudo install -D -m 0644 src dest`
pub(crate) fn sudo_install(sudo: &Path, src: &Path, dest: &Path, mode: u32) -> Result<()> {
    let mode = format!("{mode:o}");
    let args = [
        OsStr::new("install"),
        OsStr::new("-D"),
        OsStr::new("-m"),
        OsStr::new(&mode),
        src.as_os_str(),
        dest.as_os_str(),
    ];
    run_sudo(sudo, &args, "install")
}

/// `sudo rm -f path`
pub(crate) fn sudo_remove(sudo: &Path, path: &Path) -> Result<()> {
    run_sudo(sudo, &[OsStr::new("rm"), OsStr::new("-f"), path.as_os_str()], "rm")
}

fn run_sudo(sudo: &Path, args: &[&OsStr], what: &str) -> Result<()> {
    let status = cmd::run(sudo, args).map_err(|e| InstallerError::PermissionDenied {
        message: format!("failed to execute sudo: {e}"),
        code: None,
    })?;
    if !status.success() {
        return Err(InstallerError::PermissionDenied {
            message: cmd::failure_message(&format!("sudo {what}"), &status),
            code: status.code(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_dir_is_writable_directly() {
        let dir = tempfile::tempdir().unwrap();
        assert!(is_writable(dir.path()));
        assert_eq!(elevation_for(dir.path(), false).unwrap(), Elevation::Direct);
    }

    #[test]
    fn missing_dir_checks_existing_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        assert!(is_writable(&dir.path().join("a/b/c")));
    }

    #[test]
    fn unwritable_dir_without_sudo_is_denied() {
        if nix::unistd::Uid::effective().is_root() {
            // root can write anywhere; nothing to check
            return;
        }
        let err = elevation_for(Path::new("/proc/1"), false).unwrap_err();
        assert!(matches!(err, InstallerError::PermissionDenied { code: None, .. }));
    }
}
