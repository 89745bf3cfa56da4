//! Installer for the headsetcontrol-notifyd user service.
//!
//! Renders the unit template for the invoking user, places it in the
//! systemd user-unit directory and enables it with the user's service
//! manager. See [`install::Installer`] for the step sequence.

pub mod cli;
mod cmd;
pub mod config;
pub mod error;
pub mod identity;
pub mod install;

pub use config::InstallConfig;
pub use error::{InstallerError, Result};
pub use identity::Identity;
pub use install::{InstallReport, Installer, ServiceControl, Systemctl, UnitStatus};
