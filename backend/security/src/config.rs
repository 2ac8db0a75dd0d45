//! `ValidatorConfig` (spec §3): the single bundle of tunables every other
//! component in this crate is parameterized by. Built once at startup —
//! typically from `cmdgate-config`'s TOML schema — and then treated as
//! immutable for the lifetime of the process.

use cmdgate_core::GateResult;
use cmdgate_logging::LoggingOptions;

use crate::allowlist::AllowListValidator;
use crate::fsperm::{CRITICAL_OUTPUT_PATH_SUBSTRINGS, HIGH_RISK_OUTPUT_PATH_SUBSTRINGS};
use crate::identity::PRIVILEGE_ESCALATION_COMMANDS;

/// The full configuration surface a deployment can tune (spec §3, §6).
///
/// Two fields are deliberately absent here: `permissive` and
/// `skip_hash_validation` live on [`crate::analyzer::AnalysisOptions`]
/// instead, which is constructed only by trusted call sites (tests, an
/// explicit in-process override) and is never deserialized from this
/// struct or any file on disk (spec §9 Open Question).
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    pub verify_standard_paths: bool,
    pub allowed_commands: Vec<String>,
    pub sensitive_env_vars: Vec<String>,
    pub output_critical_path_patterns: Vec<String>,
    pub output_high_risk_path_patterns: Vec<String>,
    pub dangerous_privileged_commands: Vec<String>,
    pub dangerous_root_patterns: Vec<String>,
    pub shell_commands: Vec<String>,
    pub shell_metacharacters: Vec<String>,
    pub logging_options: LoggingOptions,
    pub max_path_length: usize,
    pub required_file_permissions: u32,
    pub required_directory_permissions: u32,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            verify_standard_paths: true,
            allowed_commands: Vec::new(),
            sensitive_env_vars: vec![
                "AWS_SECRET_ACCESS_KEY".to_string(),
                "AWS_SESSION_TOKEN".to_string(),
                "GITHUB_TOKEN".to_string(),
                "OPENAI_API_KEY".to_string(),
                "ANTHROPIC_API_KEY".to_string(),
            ],
            output_critical_path_patterns: CRITICAL_OUTPUT_PATH_SUBSTRINGS.iter().map(|s| s.to_string()).collect(),
            output_high_risk_path_patterns: HIGH_RISK_OUTPUT_PATH_SUBSTRINGS.iter().map(|s| s.to_string()).collect(),
            dangerous_privileged_commands: PRIVILEGE_ESCALATION_COMMANDS.iter().map(|s| s.to_string()).collect(),
            dangerous_root_patterns: PRIVILEGE_ESCALATION_COMMANDS.iter().map(|s| s.to_string()).collect(),
            shell_commands: vec!["sh".to_string(), "bash".to_string(), "zsh".to_string(), "dash".to_string()],
            shell_metacharacters: vec![
                ";".to_string(),
                "&&".to_string(),
                "||".to_string(),
                "|".to_string(),
                "$(".to_string(),
                "`".to_string(),
                "<".to_string(),
                ">".to_string(),
            ],
            logging_options: LoggingOptions::default(),
            max_path_length: 4096,
            required_file_permissions: 0o755,
            required_directory_permissions: 0o755,
        }
    }
}

impl ValidatorConfig {
    /// Builds the allow-list validator this configuration describes.
    /// `dangerous_root_patterns` must be lowercase bare basenames — an
    /// operator-supplied value that violates this fails construction rather
    /// than silently degrading to a no-op check. `allowed_commands` is
    /// compiled as a regex list, checked directly against `cmdPath`.
    pub fn build_allow_list_validator(&self) -> GateResult<AllowListValidator> {
        let dangerous_root_patterns: Vec<&str> = self.dangerous_root_patterns.iter().map(String::as_str).collect();
        let allowed_commands: Vec<&str> = self.allowed_commands.iter().map(String::as_str).collect();
        AllowListValidator::new(&dangerous_root_patterns, &allowed_commands)
    }
}
