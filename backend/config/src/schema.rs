//! TOML schema for the on-disk gate configuration (spec §6).
//!
//! Every field is optional: an absent key means "use the built-in default",
//! applied in [`crate::defaults::apply_all_defaults`]. Two fields from
//! [`cmdgate_security::ValidatorConfig`] are intentionally absent from this
//! schema — `permissive` and `skip_hash_validation` are test-only escape
//! hatches that must never be reachable from a config file (spec §9).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GateFileConfig {
    pub verify_standard_paths: Option<bool>,
    pub allowed_commands: Option<Vec<String>>,
    pub sensitive_env_vars: Option<Vec<String>>,
    pub output_critical_path_patterns: Option<Vec<String>>,
    pub output_high_risk_path_patterns: Option<Vec<String>>,
    pub dangerous_privileged_commands: Option<Vec<String>>,
    pub dangerous_root_patterns: Option<Vec<String>>,
    pub shell_commands: Option<Vec<String>>,
    pub shell_metacharacters: Option<Vec<String>>,
    pub logging: Option<LoggingFileConfig>,
    pub max_path_length: Option<usize>,
    /// Octal permission string, e.g. `"0644"`.
    pub required_file_permissions: Option<String>,
    /// Octal permission string, e.g. `"0755"`.
    pub required_directory_permissions: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingFileConfig {
    pub include_error_details: Option<bool>,
    pub max_error_message_length: Option<usize>,
    pub redact_sensitive_info: Option<bool>,
    pub truncate_stdout: Option<bool>,
    pub max_stdout_length: Option<usize>,
}
