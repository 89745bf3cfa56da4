use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{InstallerError, Result};

pub const DEFAULT_UNIT_NAME: &str = "headsetcontrol-notifyd.service";
pub const DEFAULT_UNIT_DIR: &str = "/etc/systemd/user";
pub const DEFAULT_PLACEHOLDER: &str = "USER_NAME";

/// Installer settings. Defaults reproduce the plain `install.sh` run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Unit file name, also used as the systemd unit name
    pub unit_name: String,
    /// Template location, relative paths resolve against the working directory
    pub template: PathBuf,
    /// Directory the rendered unit is copied into
    pub unit_dir: PathBuf,
    /// Token replaced by the login name
    pub placeholder: String,
    /// Fall back to `sudo` when the unit directory is not writable
    pub use_sudo: bool,
    /// Rewrite the template itself instead of rendering to a scratch file
    pub render_in_place: bool,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            unit_name: DEFAULT_UNIT_NAME.to_string(),
            template: PathBuf::from(DEFAULT_UNIT_NAME),
            unit_dir: PathBuf::from(DEFAULT_UNIT_DIR),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            use_sudo: true,
            render_in_place: true,
        }
    }
}

impl InstallConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s).map_err(|e| InstallerError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path).map_err(|e| {
            InstallerError::io(format!("failed to read config {}", path.display()), e)
        })?;
        Self::from_toml(&s)
    }

    /// Load from an explicit path, the per-user default location, or fall
    /// back to built-in defaults when neither exists.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => {
                log::debug!("Using config from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Destination path of the installed unit
    pub fn unit_path(&self) -> PathBuf {
        self.unit_dir.join(&self.unit_name)
    }

    /// Reject values that would place the unit outside `unit_dir`, read as a
    /// `systemctl` option, or match nothing.
    pub fn validate(&self) -> Result<()> {
        let name = self.unit_name.as_str();
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.starts_with('-')
        {
            return Err(InstallerError::Config(format!(
                "unit_name must be a bare file name, got {:?}",
                self.unit_name
            )));
        }
        if self.placeholder.is_empty() {
            return Err(InstallerError::Config("placeholder must not be empty".into()));
        }
        Ok(())
    }
}

/// `~/.config/headsetcontrol-notifyd/install.toml` on Linux
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("headsetcontrol-notifyd").join("install.toml"))
}
