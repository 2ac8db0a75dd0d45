//! `cmdgate-config` — TOML configuration loading for the command security
//! gate.
//!
//! Provides:
//! - Typed, all-optional TOML schema ([`schema::GateFileConfig`])
//! - Default application onto [`cmdgate_security::ValidatorConfig`]
//! - File read/write with a rolling backup
//! - Deep validation with path-qualified diagnostics

pub mod defaults;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use io::{config_dir, config_file_path, load_config, write_config, ConfigIoError};
pub use schema::{GateFileConfig, LoggingFileConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use std::path::Path;

use cmdgate_security::ValidatorConfig;

/// Load, apply defaults, and validate a config file in one call — the main
/// entry point for a binary that just wants a ready-to-use
/// [`ValidatorConfig`].
pub async fn load_and_prepare(path: &Path) -> Result<ValidatorConfig, ConfigIoError> {
    let file = load_config(path).await?;
    let config = apply_all_defaults(file);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "gate config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "gate config error");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loading_a_missing_file_yields_the_built_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_and_prepare(&dir.path().join("config.toml")).await.unwrap();
        assert_eq!(config.max_path_length, ValidatorConfig::default().max_path_length);
    }
}
