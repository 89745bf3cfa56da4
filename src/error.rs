//! Installer error type.
//!
//! Errors raised by a failing external command carry that command's exit
//! code so the binary can hand it back to the shell unchanged.

use std::path::PathBuf;

use thiserror::Error;

/// Exit code used when a failure has no external exit status to propagate.
pub const GENERIC_FAILURE: i32 = 1;

#[derive(Debug, Error)]
pub enum InstallerError {
    #[error("unit template not found: {}", .path.display())]
    TemplateNotFound { path: PathBuf },

    #[error("permission denied: {message}")]
    PermissionDenied { message: String, code: Option<i32> },

    #[error("user service manager unavailable: {message}")]
    ServiceManagerUnavailable { message: String, code: Option<i32> },

    #[error("failed to activate {unit}: {message}")]
    UnitActivation {
        unit: String,
        message: String,
        code: Option<i32>,
    },

    #[error("invalid user name {0:?}")]
    InvalidUserName(String),

    #[error("could not determine the current user: {0}")]
    UserLookup(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl InstallerError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Process exit code for this error.
    ///
    /// External failures return the failing command's own status; signals
    /// and internal errors map to [`GENERIC_FAILURE`].
    pub fn exit_code(&self) -> i32 {
        let code = match self {
            Self::PermissionDenied { code, .. }
            | Self::ServiceManagerUnavailable { code, .. }
            | Self::UnitActivation { code, .. } => *code,
            _ => None,
        };
        match code {
            Some(c) if c != 0 => c,
            _ => GENERIC_FAILURE,
        }
    }
}

pub type Result<T> = std::result::Result<T, InstallerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_exit_code_is_propagated() {
        let err = InstallerError::UnitActivation {
            unit: "x.service".into(),
            message: "failed".into(),
            code: Some(5),
        };
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn missing_or_zero_code_falls_back_to_generic() {
        let err = InstallerError::ServiceManagerUnavailable {
            message: "killed".into(),
            code: None,
        };
        assert_eq!(err.exit_code(), GENERIC_FAILURE);

        let err = InstallerError::PermissionDenied {
            message: "odd".into(),
            code: Some(0),
        };
        assert_eq!(err.exit_code(), GENERIC_FAILURE);
    }

    #[test]
    fn template_not_found_names_the_path() {
        let err = InstallerError::TemplateNotFound {
            path: PathBuf::from("/tmp/missing.service"),
        };
        assert!(err.to_string().contains("/tmp/missing.service"));
        assert_eq!(err.exit_code(), GENERIC_FAILURE);
    }
}
