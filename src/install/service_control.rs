//! User-level systemd service control.
//!
//! All operations target the invoking user's manager (`systemctl --user`).
//! They never run under `sudo`: that would address root's user manager
//! instead. When the installer itself runs as root on behalf of a user, the
//! user's manager is reached with `--machine=<user>@`.

use std::ffi::OsString;
use std::path::PathBuf;

use crate::cmd;
use crate::error::{InstallerError, Result};
use crate::identity::Identity;

/// Result of `systemctl is-active`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitStatus {
    /// State word printed by systemctl (`active`, `inactive`, `failed`, ...)
    pub state: String,
    /// systemctl's exit code: 0 when active
    pub code: i32,
}

impl UnitStatus {
    pub fn is_active(&self) -> bool {
        self.code == 0
    }
}

/// Operations the installer needs from the user service manager.
pub trait ServiceControl {
    /// Re-read unit files.
    fn daemon_reload(&self) -> Result<()>;

    /// Enable `unit`; with `now` also start it.
    fn enable(&self, unit: &str, now: bool) -> Result<()>;

    /// Disable `unit`; with `now` also stop it.
    fn disable(&self, unit: &str, now: bool) -> Result<()>;

    fn is_active(&self, unit: &str) -> Result<UnitStatus>;
}

/// [`ServiceControl`] backed by the `systemctl` binary.
#[derive(Debug, Clone)]
pub struct Systemctl {
    program: PathBuf,
    machine: Option<String>,
}

impl Systemctl {
    /// Bind `systemctl` from `PATH` to `identity`'s manager.
    ///
    /// A missing binary surfaces as `ServiceManagerUnavailable` on first use,
    /// so the unit file is still placed before that failure.
    pub fn for_identity(identity: &Identity) -> Self {
        let program = which::which("systemctl").unwrap_or_else(|e| {
            log::debug!("systemctl not found on PATH: {e}");
            PathBuf::from("systemctl")
        });
        Self::with_program(program, identity)
    }

    pub fn with_program(program: PathBuf, identity: &Identity) -> Self {
        let machine = identity
            .via_sudo
            .then(|| format!("{}@", identity.login));
        Self { program, machine }
    }

    fn args(&self, rest: &[&str]) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["--user".into()];
        if let Some(machine) = &self.machine {
            args.push(format!("--machine={machine}").into());
        }
        args.extend(rest.iter().map(OsString::from));
        args
    }

    /// Run a state-changing verb; failures are mapped by `on_failure`.
    fn run<F>(&self, rest: &[&str], on_failure: F) -> Result<()>
    where
        F: FnOnce(String, Option<i32>) -> InstallerError,
    {
        let what = format!("systemctl --user {}", rest.join(" "));
        match cmd::run(&self.program, self.args(rest).as_slice()) {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(on_failure(
                cmd::failure_message(&what, &status),
                status.code(),
            )),
            Err(e) => Err(on_failure(format!("failed to execute {what}: {e}"), None)),
        }
    }
}

impl ServiceControl for Systemctl {
    fn daemon_reload(&self) -> Result<()> {
        self.run(&["daemon-reload"], |message, code| {
            InstallerError::ServiceManagerUnavailable { message, code }
        })
    }

    fn enable(&self, unit: &str, now: bool) -> Result<()> {
        let mut rest = vec!["enable"];
        if now {
            rest.push("--now");
        }
        rest.push(unit);
        self.run(&rest, |message, code| InstallerError::UnitActivation {
            unit: unit.to_string(),
            message,
            code,
        })
    }

    fn disable(&self, unit: &str, now: bool) -> Result<()> {
        let mut rest = vec!["disable"];
        if now {
            rest.push("--now");
        }
        rest.push(unit);
        self.run(&rest, |message, code| InstallerError::UnitActivation {
            unit: unit.to_string(),
            message,
            code,
        })
    }

    fn is_active(&self, unit: &str) -> Result<UnitStatus> {
        let args = self.args(&["is-active", unit]);
        let output = cmd::run_output(&self.program, args.as_slice()).map_err(|e| {
            InstallerError::ServiceManagerUnavailable {
                message: format!("failed to execute systemctl --user is-active: {e}"),
                code: None,
            }
        })?;

        // is-active exits 0 when active, 3 when inactive, other codes otherwise
        Ok(UnitStatus {
            state: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            code: output.status.code().unwrap_or(crate::error::GENERIC_FAILURE),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(via_sudo: bool) -> Identity {
        Identity {
            login: "alice".into(),
            via_sudo,
        }
    }

    fn strs(args: Vec<OsString>) -> Vec<String> {
        args.into_iter().map(|a| a.into_string().unwrap()).collect()
    }

    #[test]
    fn user_scope_args() {
        let ctl = Systemctl::with_program("systemctl".into(), &identity(false));
        assert_eq!(
            strs(ctl.args(&["enable", "--now", "x.service"])),
            ["--user", "enable", "--now", "x.service"]
        );
    }

    #[test]
    fn sudo_invocation_targets_invoking_users_manager() {
        let ctl = Systemctl::with_program("systemctl".into(), &identity(true));
        assert_eq!(
            strs(ctl.args(&["daemon-reload"])),
            ["--user", "--machine=alice@", "daemon-reload"]
        );
    }

    #[test]
    fn reload_failure_is_service_manager_unavailable() {
        // `false` ignores its arguments and exits 1
        let ctl = Systemctl::with_program("false".into(), &identity(false));
        let err = ctl.daemon_reload().unwrap_err();
        assert!(matches!(
            err,
            InstallerError::ServiceManagerUnavailable { code: Some(1), .. }
        ));
    }

    #[test]
    fn enable_failure_is_unit_activation() {
        let ctl = Systemctl::with_program("false".into(), &identity(false));
        let err = ctl.enable("x.service", true).unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(matches!(err, InstallerError::UnitActivation { .. }));
    }

    #[test]
    fn failing_verbs_carry_systemctl_exit_code() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("systemctl");
        std::fs::write(&script, "#!/bin/sh\nexit 5\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        let ctl = Systemctl::with_program(script, &identity(false));

        let reload = ctl.daemon_reload().unwrap_err();
        assert!(matches!(
            reload,
            InstallerError::ServiceManagerUnavailable { code: Some(5), .. }
        ));
        let disable = ctl.disable("x.service", true).unwrap_err();
        assert!(matches!(
            disable,
            InstallerError::UnitActivation { code: Some(5), ref unit, .. } if unit == "x.service"
        ));
        assert_eq!(disable.exit_code(), 5);
    }

    #[test]
    fn missing_binary_is_service_manager_unavailable() {
        let ctl = Systemctl::with_program("/nonexistent/systemctl".into(), &identity(false));
        let err = ctl.daemon_reload().unwrap_err();
        assert!(matches!(
            err,
            InstallerError::ServiceManagerUnavailable { code: None, .. }
        ));
    }

    #[test]
    fn is_active_reports_exit_code() {
        let ctl = Systemctl::with_program("true".into(), &identity(false));
        let status = ctl.is_active("x.service").unwrap();
        assert!(status.is_active());
        assert_eq!(status.state, "");
    }
}
