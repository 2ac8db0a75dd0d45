//! Deep validation of an assembled [`ValidatorConfig`]: checks that can't be
//! expressed as a TOML schema constraint (cross-field rules, pattern
//! well-formedness) but should still surface as friendly diagnostics rather
//! than a panic deep inside the security crate.

use cmdgate_security::ValidatorConfig;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError { path: path.into(), message: message.into() });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError { path: path.into(), message: message.into() });
    }
}

pub fn validate(config: &ValidatorConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_allow_list(config, &mut report);
    validate_dangerous_root_patterns(config, &mut report);
    validate_limits(config, &mut report);
    report
}

fn validate_allow_list(config: &ValidatorConfig, report: &mut ValidationReport) {
    if config.allowed_commands.is_empty() {
        report.warn("allowedCommands", "empty allow-list rejects every command; is this intentional?");
    }
}

fn validate_dangerous_root_patterns(config: &ValidatorConfig, report: &mut ValidationReport) {
    if let Err(e) = config.build_allow_list_validator() {
        report.error("dangerousRootPatterns", e.to_string());
    }
}

fn validate_limits(config: &ValidatorConfig, report: &mut ValidationReport) {
    if config.max_path_length == 0 {
        report.error("maxPathLength", "must be greater than zero");
    }
    if config.required_directory_permissions & 0o002 != 0 {
        report.warn("requiredDirectoryPermissions", "world-writable bit is set; this weakens the directory check");
    }
}
