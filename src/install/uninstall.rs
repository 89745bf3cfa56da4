//! Removal of the installed unit.

use super::{unit, Installer, ServiceControl};
use crate::error::Result;

impl<S: ServiceControl> Installer<S> {
    /// Stop and disable the unit, delete the unit file and reload the manager.
    ///
    /// A failing disable is logged and ignored: the unit may never have been
    /// enabled, or the manager may already have forgotten it. Returns whether a
    /// unit file was removed.
    pub fn uninstall(&self) -> Result<bool> {
        let cfg = self.config();
        log::info!("Uninstalling {}", cfg.unit_name);

        if let Err(e) = self.service().disable(&cfg.unit_name, true) {
            log::warn!("Failed to disable {}: {e}", cfg.unit_name);
        }

        let removed = unit::remove_unit(&cfg.unit_path(), cfg.use_sudo)?;
        self.service().daemon_reload()?;

        log::info!("{} uninstalled", cfg.unit_name);
        Ok(removed)
    }
}
