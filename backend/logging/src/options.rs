//! Logging Options (spec §3): per-run policy for how much detail leaves the
//! process boundary. Defaults are secure: details off, redaction on,
//! truncation on.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingOptions {
    pub include_error_details: bool,
    pub max_error_message_length: usize,
    pub redact_sensitive_info: bool,
    pub truncate_stdout: bool,
    pub max_stdout_length: usize,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            include_error_details: false,
            max_error_message_length: 500,
            redact_sensitive_info: true,
            truncate_stdout: true,
            max_stdout_length: 4096,
        }
    }
}
