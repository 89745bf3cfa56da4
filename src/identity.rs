//! Resolution of the login name substituted into the unit template.

use nix::unistd::{Uid, User};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{InstallerError, Result};

static LOGIN_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]*\$?$").expect("login name pattern is valid")
});

const LOGIN_NAME_MAX: usize = 256;

/// The user the unit is installed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub login: String,
    /// Running as root on behalf of another user; the user manager must be
    /// addressed through `--machine=<login>@`.
    pub via_sudo: bool,
}

impl Identity {
    /// Resolve the invoking user from the environment.
    ///
    /// `explicit` wins when given. Under `sudo`, `SUDO_USER` names the
    /// invoking user; otherwise the real uid's passwd entry is used.
    pub fn resolve(explicit: Option<&str>) -> Result<Self> {
        let is_root = Uid::effective().is_root();
        let sudo_user = std::env::var("SUDO_USER").ok();
        pick_login(explicit, sudo_user.as_deref(), is_root, passwd_login)
    }
}

fn passwd_login() -> Result<String> {
    let uid = Uid::current();
    match User::from_uid(uid) {
        Ok(Some(user)) => Ok(user.name),
        Ok(None) => std::env::var("USER")
            .or_else(|_| std::env::var("LOGNAME"))
            .map_err(|_| InstallerError::UserLookup(format!("no passwd entry for uid {uid}"))),
        Err(e) => Err(InstallerError::UserLookup(e.to_string())),
    }
}

fn pick_login<F>(
    explicit: Option<&str>,
    sudo_user: Option<&str>,
    is_root: bool,
    lookup: F,
) -> Result<Identity>
where
    F: FnOnce() -> Result<String>,
{
    let from_sudo = sudo_user.filter(|u| is_root && !u.is_empty() && *u != "root");

    let login = match (explicit, from_sudo) {
        (Some(name), _) => name.to_string(),
        (None, Some(name)) => name.to_string(),
        (None, None) => lookup()?,
    };
    validate_login(&login)?;

    let via_sudo = is_root && login != "root";
    Ok(Identity { login, via_sudo })
}

/// Reject names that could not be a POSIX login or would corrupt the unit file.
pub fn validate_login(name: &str) -> Result<()> {
    if name.len() > LOGIN_NAME_MAX || !LOGIN_NAME.is_match(name) {
        return Err(InstallerError::InvalidUserName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Result<String> {
        Ok("alice".to_string())
    }

    #[test]
    fn plain_user_uses_passwd_entry() {
        let id = pick_login(None, None, false, alice).unwrap();
        assert_eq!(id.login, "alice");
        assert!(!id.via_sudo);
    }

    #[test]
    fn sudo_user_is_preferred_when_root() {
        let id = pick_login(None, Some("bob"), true, alice).unwrap();
        assert_eq!(id.login, "bob");
        assert!(id.via_sudo);
    }

    #[test]
    fn sudo_user_ignored_when_not_root() {
        let id = pick_login(None, Some("bob"), false, alice).unwrap();
        assert_eq!(id.login, "alice");
    }

    #[test]
    fn real_root_login_is_not_via_sudo() {
        let id = pick_login(None, Some("root"), true, || Ok("root".into())).unwrap();
        assert_eq!(id.login, "root");
        assert!(!id.via_sudo);
    }

    #[test]
    fn explicit_name_overrides_everything() {
        let id = pick_login(Some("carol"), Some("bob"), false, alice).unwrap();
        assert_eq!(id.login, "carol");
    }

    #[test]
    fn lookup_errors_propagate() {
        let err = pick_login(None, None, false, || {
            Err(InstallerError::UserLookup("nope".into()))
        })
        .unwrap_err();
        assert!(matches!(err, InstallerError::UserLookup(_)));
    }

    #[test]
    fn login_validation() {
        for ok in ["alice", "a.b-c_d", "_svc", "machine$", "User1"] {
            assert!(validate_login(ok).is_ok(), "{ok}");
        }
        for bad in ["", "-x", "a b", "a/b", "a\nb", "x$y"] {
            assert!(validate_login(bad).is_err(), "{bad:?}");
        }
        assert!(validate_login(&"a".repeat(257)).is_err());
    }
}
