use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Contents of `config.toml`. Every key is optional; see
/// [`crate::core::config::defaults`] for the values used when a key is absent.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Model name, e.g. "gemini-1.5-flash"
    pub model: Option<String>,
    /// API root the model path is appended to
    pub base_url: Option<String>,
    /// Milliseconds between two reveal steps
    pub tick_interval_ms: Option<u64>,
    /// Upper bound on one completion round trip; 0 waits forever
    pub request_timeout_secs: Option<u64>,
    /// Instruction sent ahead of every prompt
    pub system_instruction: Option<String>,
    /// Reply shown when a completion fails
    pub failure_message: Option<String>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
///
/// # Examples
/// - Unix: `/home/user/.config/prodev/config.toml` → `~/.config/prodev/config.toml`
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
