//! Merges a parsed [`GateFileConfig`] onto [`ValidatorConfig::default`],
//! so an absent key always means "use the built-in default" rather than
//! "use an empty list".

use cmdgate_security::ValidatorConfig;

use crate::schema::GateFileConfig;

/// Parses a `"0755"`-style octal string, falling back to `fallback` on any
/// parse failure rather than erroring the whole config load over a typo in
/// a rarely-touched field.
fn parse_octal_permissions(value: Option<&str>, fallback: u32) -> u32 {
    value
        .and_then(|s| u32::from_str_radix(s.trim_start_matches("0o"), 8).ok())
        .unwrap_or(fallback)
}

pub fn apply_all_defaults(file: GateFileConfig) -> ValidatorConfig {
    let base = ValidatorConfig::default();

    let mut logging_options = base.logging_options.clone();
    if let Some(logging) = &file.logging {
        if let Some(v) = logging.include_error_details {
            logging_options.include_error_details = v;
        }
        if let Some(v) = logging.max_error_message_length {
            logging_options.max_error_message_length = v;
        }
        if let Some(v) = logging.redact_sensitive_info {
            logging_options.redact_sensitive_info = v;
        }
        if let Some(v) = logging.truncate_stdout {
            logging_options.truncate_stdout = v;
        }
        if let Some(v) = logging.max_stdout_length {
            logging_options.max_stdout_length = v;
        }
    }

    ValidatorConfig {
        verify_standard_paths: file.verify_standard_paths.unwrap_or(base.verify_standard_paths),
        allowed_commands: file.allowed_commands.unwrap_or(base.allowed_commands),
        sensitive_env_vars: file.sensitive_env_vars.unwrap_or(base.sensitive_env_vars),
        output_critical_path_patterns: file.output_critical_path_patterns.unwrap_or(base.output_critical_path_patterns),
        output_high_risk_path_patterns: file
            .output_high_risk_path_patterns
            .unwrap_or(base.output_high_risk_path_patterns),
        dangerous_privileged_commands: file
            .dangerous_privileged_commands
            .unwrap_or(base.dangerous_privileged_commands),
        dangerous_root_patterns: file.dangerous_root_patterns.unwrap_or(base.dangerous_root_patterns),
        shell_commands: file.shell_commands.unwrap_or(base.shell_commands),
        shell_metacharacters: file.shell_metacharacters.unwrap_or(base.shell_metacharacters),
        logging_options,
        max_path_length: file.max_path_length.unwrap_or(base.max_path_length),
        required_file_permissions: parse_octal_permissions(
            file.required_file_permissions.as_deref(),
            base.required_file_permissions,
        ),
        required_directory_permissions: parse_octal_permissions(
            file.required_directory_permissions.as_deref(),
            base.required_directory_permissions,
        ),
    }
}
