//! External command execution.
//!
//! Commands inherit the terminal's stdout and stderr so the tools' own
//! diagnostics reach the user untranslated.

use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus, Output, Stdio};

fn describe<S: AsRef<OsStr>>(program: &Path, args: &[S]) -> String {
    let args: Vec<_> = args.iter().map(|s| s.as_ref().to_string_lossy()).collect();
    format!("{} {}", program.display(), args.join(" "))
}

/// Run `program` to completion and return its exit status.
pub(crate) fn run<S: AsRef<OsStr>>(program: &Path, args: &[S]) -> io::Result<ExitStatus> {
    log::info!("> {}", describe(program, args));
    Command::new(program).args(args).status()
}

/// Run `program` capturing stdout; stderr stays attached to the terminal.
pub(crate) fn run_output<S: AsRef<OsStr>>(program: &Path, args: &[S]) -> io::Result<Output> {
    log::debug!("> {}", describe(program, args));
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::inherit())
        .output()
}

/// Human-readable summary of a non-zero exit.
pub(crate) fn failure_message(program: &str, status: &ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("{program} exited with status {code}"),
        None => format!("{program} was terminated by a signal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_reports_exit_status() {
        let status = run(Path::new("sh"), &["-c", "exit 7"]).unwrap();
        assert_eq!(status.code(), Some(7));
        assert_eq!(failure_message("sh", &status), "sh exited with status 7");
    }

    #[test]
    fn run_output_captures_stdout() {
        let out = run_output(Path::new("sh"), &["-c", "echo active"]).unwrap();
        assert!(out.status.success());
        assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "active");
    }

    #[test]
    fn missing_program_is_an_io_error() {
        assert!(run(Path::new("/nonexistent/definitely-not-here"), &["x"]).is_err());
    }
}
