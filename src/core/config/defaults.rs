use std::time::Duration;

use crate::core::config::data::Config;
use crate::core::constants::{
    COMPLETION_FAILURE_TEXT, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SYSTEM_INSTRUCTION, DEFAULT_TICK_INTERVAL_MS,
};

impl Config {
    pub fn model(&self) -> &str {
        non_blank(self.model.as_deref()).unwrap_or(DEFAULT_MODEL)
    }

    pub fn base_url(&self) -> &str {
        non_blank(self.base_url.as_deref()).unwrap_or(DEFAULT_BASE_URL)
    }

    /// Never shorter than one millisecond.
    pub fn tick_interval(&self) -> Duration {
        let millis = self
            .tick_interval_ms
            .unwrap_or(DEFAULT_TICK_INTERVAL_MS)
            .max(1);
        Duration::from_millis(millis)
    }

    /// `None` when the bound is disabled with 0.
    pub fn request_timeout(&self) -> Option<Duration> {
        match self
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
        {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn system_instruction(&self) -> &str {
        non_blank(self.system_instruction.as_deref()).unwrap_or(DEFAULT_SYSTEM_INSTRUCTION)
    }

    pub fn failure_message(&self) -> &str {
        non_blank(self.failure_message.as_deref()).unwrap_or(COMPLETION_FAILURE_TEXT)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
