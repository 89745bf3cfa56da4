//! Unit template rendering.

use std::fs;
use std::io::{ErrorKind, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use regex::bytes::{NoExpand, Regex};
use tempfile::NamedTempFile;

use super::file_ops::{rewrite_file_atomic, write_file_atomic, UNIT_FILE_MODE};
use crate::error::{InstallerError, Result};

/// Default unit shipped with the installer, written out by `notifyd-install template`.
pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/headsetcontrol-notifyd.service");

/// A rendered unit ready to be copied into place.
///
/// `path` points either at the rewritten template or at a scratch file that
/// lives as long as this value.
#[derive(Debug)]
pub struct RenderedUnit {
    pub path: PathBuf,
    pub content: Vec<u8>,
    /// Number of placeholder occurrences replaced
    pub replacements: usize,
    _scratch: Option<NamedTempFile>,
}

/// Replace every occurrence of `placeholder` with `login`.
///
/// Works on raw bytes: everything outside the placeholder sites is copied
/// unchanged, whatever its encoding. Returns the new content and the number
/// of sites replaced.
pub fn substitute(content: &[u8], placeholder: &str, login: &str) -> Result<(Vec<u8>, usize)> {
    let re = Regex::new(&regex::escape(placeholder))
        .map_err(|e| InstallerError::Config(format!("bad placeholder {placeholder:?}: {e}")))?;
    let replacements = re.find_iter(content).count();
    let out = re.replace_all(content, NoExpand(login.as_bytes())).into_owned();
    Ok((out, replacements))
}

/// Read `template`, substitute the login name and persist the result.
///
/// With `in_place` the template file itself is rewritten (only when the
/// content actually changes); otherwise the rendering goes to a scratch file
/// and the template is left alone.
pub fn render_template(
    template: &Path,
    placeholder: &str,
    login: &str,
    in_place: bool,
) -> Result<RenderedUnit> {
    let original = read_template(template)?;
    let (content, replacements) = substitute(&original, placeholder, login)?;

    if in_place {
        if content != original {
            rewrite_file_atomic(template, &content)?;
            log::info!("Rendered {} for user {}", template.display(), login);
        } else {
            log::debug!("{} already rendered", template.display());
        }
        return Ok(RenderedUnit {
            path: template.to_path_buf(),
            content,
            replacements,
            _scratch: None,
        });
    }

    let mut scratch =
        NamedTempFile::new().map_err(|e| InstallerError::io("failed to create scratch unit", e))?;
    scratch
        .write_all(&content)
        .map_err(|e| InstallerError::io("failed to write scratch unit", e))?;
    scratch
        .as_file()
        .set_permissions(fs::Permissions::from_mode(UNIT_FILE_MODE))
        .map_err(|e| InstallerError::io("failed to set scratch unit permissions", e))?;

    Ok(RenderedUnit {
        path: scratch.path().to_path_buf(),
        content,
        replacements,
        _scratch: Some(scratch),
    })
}

pub(crate) fn read_template(template: &Path) -> Result<Vec<u8>> {
    match fs::read(template) {
        Ok(s) => Ok(s),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(InstallerError::TemplateNotFound {
            path: template.to_path_buf(),
        }),
        Err(e) => Err(InstallerError::io(
            format!("failed to read template {}", template.display()),
            e,
        )),
    }
}

/// Write the embedded default template to `path`.
pub fn write_default_template(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(InstallerError::io(
            format!("{} already exists (use --force to overwrite)", path.display()),
            std::io::Error::from(ErrorKind::AlreadyExists),
        ));
    }
    write_file_atomic(path, DEFAULT_TEMPLATE.as_bytes(), UNIT_FILE_MODE)
}
