//! Telemetry and structured logging for cmdgate: log redaction policy (the
//! C10 Logging Sanitiser) plus `tracing` initialization.

pub mod logger;
pub mod options;
pub mod redact;

pub use logger::init_logger;
pub use options::LoggingOptions;
pub use redact::{
    create_safe_log_fields, log_fields_with_error, redact_sensitive_data, sanitize_error_for_logging,
    sanitize_error_message_for_logging, sanitize_output_for_logging, LogValue, REDACTED_ERROR_SENTINEL,
};
