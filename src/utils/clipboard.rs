use std::error::Error as StdError;
use std::fmt;
use std::io::Write;
use std::process::{Command, Stdio};

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// None of the platform clipboard commands could be started.
    NoBackend,
    /// A clipboard command started but reported failure.
    CommandFailed(String),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::NoBackend => {
                write!(f, "No clipboard command found (install wl-copy, xclip, or xsel)")
            }
            ClipboardError::CommandFailed(cmd) => write!(f, "Clipboard command `{cmd}` failed"),
        }
    }
}

impl StdError for ClipboardError {}

/// Candidate commands for the current platform, in preference order.
#[cfg(target_os = "macos")]
const BACKENDS: &[(&str, &[&str])] = &[("pbcopy", &[])];
#[cfg(target_os = "windows")]
const BACKENDS: &[(&str, &[&str])] = &[("cmd", &["/C", "clip"])];
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const BACKENDS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

pub fn copy_to_clipboard(text: &str) -> Result<(), ClipboardError> {
    let mut last_failure = None;
    for (cmd, args) in BACKENDS {
        match run_with_stdin(cmd, args, text) {
            Ok(()) => {
                debug!(command = cmd, bytes = text.len(), "Copied to clipboard");
                return Ok(());
            }
            Err(err @ ClipboardError::CommandFailed(_)) => last_failure = Some(err),
            Err(ClipboardError::NoBackend) => {}
        }
    }
    Err(last_failure.unwrap_or(ClipboardError::NoBackend))
}

fn run_with_stdin(cmd: &str, args: &[&str], input: &str) -> Result<(), ClipboardError> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|_| ClipboardError::NoBackend)?;

    if let Some(mut stdin) = child.stdin.take() {
        let _ = stdin.write_all(input.as_bytes());
    }
    match child.wait() {
        Ok(status) if status.success() => Ok(()),
        _ => Err(ClipboardError::CommandFailed(cmd.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_command_is_no_backend() {
        assert_eq!(
            run_with_stdin("prodev-no-such-clipboard-tool", &[], "x"),
            Err(ClipboardError::NoBackend)
        );
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_is_reported() {
        assert_eq!(
            run_with_stdin("false", &[], "x"),
            Err(ClipboardError::CommandFailed("false".to_string()))
        );
    }
}
