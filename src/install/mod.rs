//! Installation of the headsetcontrol-notifyd user unit.
//!
//! # Module Structure
//!
//! - `template` - Placeholder substitution in the unit template
//! - `file_ops` - Atomic file operations
//! - `privileges` - Writability checks and `sudo` fallback
//! - `unit` - Placement and removal of the rendered unit
//! - `service_control` - User manager operations (reload, enable, disable, status)
//! - `uninstall` - Reverse of [`Installer::install`]
//!
//! [`Installer::install`] runs five steps in order and stops at the first
//! failure. Nothing is rolled back: a unit copied before the service manager
//! fails stays in place.

mod file_ops;
mod privileges;
mod service_control;
mod template;
mod uninstall;
mod unit;

use std::path::PathBuf;

pub use service_control::{ServiceControl, Systemctl, UnitStatus};
pub use template::{
    render_template, substitute, write_default_template, RenderedUnit, DEFAULT_TEMPLATE,
};

use crate::config::InstallConfig;
use crate::error::Result;
use crate::identity::Identity;

/// Summary of a completed install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub unit_path: PathBuf,
    pub user: String,
    pub started: bool,
}

/// Drives the install against a [`ServiceControl`] implementation.
pub struct Installer<S> {
    config: InstallConfig,
    identity: Identity,
    service: S,
    start: bool,
}

impl Installer<Systemctl> {
    /// Installer bound to the real `systemctl`.
    pub fn with_systemctl(config: InstallConfig, identity: Identity) -> Self {
        let service = Systemctl::for_identity(&identity);
        Self::new(config, identity, service)
    }
}

impl<S: ServiceControl> Installer<S> {
    pub fn new(config: InstallConfig, identity: Identity, service: S) -> Self {
        Self {
            config,
            identity,
            service,
            start: true,
        }
    }

    /// Enable without starting (`enable` instead of `enable --now`).
    pub fn no_start(mut self) -> Self {
        self.start = false;
        self
    }

    pub fn config(&self) -> &InstallConfig {
        &self.config
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Render, copy, reload, enable and start.
    pub fn install(&self) -> Result<InstallReport> {
        let cfg = &self.config;
        let login = &self.identity.login;
        let dest = cfg.unit_path();

        log::info!("Installing {} for user {}", cfg.unit_name, login);

        let unit = template::render_template(
            &cfg.template,
            &cfg.placeholder,
            login,
            cfg.render_in_place,
        )?;
        if unit.replacements == 0 {
            log::info!(
                "No {1} placeholder left in {0}; installing it as is",
                cfg.template.display(),
                cfg.placeholder
            );
        }

        unit::deploy_unit(&unit, &dest, cfg.use_sudo)?;

        self.service.daemon_reload()?;
        self.service.enable(&cfg.unit_name, self.start)?;

        if self.start {
            log::info!("{} enabled and started", cfg.unit_name);
        } else {
            log::info!("{} enabled", cfg.unit_name);
        }

        Ok(InstallReport {
            unit_path: dest,
            user: login.clone(),
            started: self.start,
        })
    }

    pub fn status(&self) -> Result<UnitStatus> {
        self.service.is_active(&self.config.unit_name)
    }
}

/// Rendered unit content for `login`, without touching the filesystem.
pub fn preview(cfg: &InstallConfig, login: &str) -> Result<Vec<u8>> {
    let original = template::read_template(&cfg.template)?;
    let (content, _) = template::substitute(&original, &cfg.placeholder, login)?;
    Ok(content)
}
