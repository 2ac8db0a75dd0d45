//! Error taxonomy for the security gate.
//!
//! Every sentinel below is surfaced to callers as a distinct `GateError`
//! variant rather than an opaque string, so an embedding host can match on
//! the failure class (programming error vs. policy rejection vs.
//! infrastructural failure — see spec §7) instead of parsing messages.

use std::path::PathBuf;

use thiserror::Error;

/// Diagnostic payload for a rejected command (spec §4.9, §7 class 2).
///
/// Carries everything a caller needs to explain *why* a command was
/// rejected: what was attempted, what it resolved to on disk, and what the
/// validator actually checked it against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandNotAllowedError {
    pub attempted_path: String,
    pub resolved_path: Option<String>,
    pub patterns_tried: Vec<String>,
    pub group_allowed: Vec<String>,
}

impl std::fmt::Display for CommandNotAllowedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "command not allowed: {}", self.attempted_path)?;
        if let Some(resolved) = &self.resolved_path {
            if resolved != &self.attempted_path {
                write!(f, " (resolved to {resolved})")?;
            }
        }
        if !self.patterns_tried.is_empty() {
            write!(f, "; tried patterns {:?}", self.patterns_tried)?;
        }
        if !self.group_allowed.is_empty() {
            write!(f, "; group allow-list {:?}", self.group_allowed)?;
        }
        Ok(())
    }
}

impl std::error::Error for CommandNotAllowedError {}

/// Top-level error type for the cmdgate security gate.
#[derive(Debug, Error)]
pub enum GateError {
    /// Programming error: `cmdPath` empty or not absolute (spec §7 class 1).
    #[error("invalid command path: {0}")]
    InvalidPath(String),

    #[error("invalid file permissions on {path}: {detail}")]
    InvalidFilePermissions { path: PathBuf, detail: String },

    #[error("invalid directory permissions on {path}: {detail}")]
    InvalidDirPermissions { path: PathBuf, detail: String },

    #[error("insecure path component in {0}")]
    InsecurePathComponent(PathBuf),

    #[error("unsafe environment variable {name}: {detail}")]
    UnsafeEnvironmentVar { name: String, detail: String },

    #[error(transparent)]
    CommandNotAllowed(#[from] CommandNotAllowedError),

    #[error("symlink depth exceeded while resolving {0}")]
    SymlinkDepthExceeded(PathBuf),

    #[error("invalid regex pattern {pattern:?}: {detail}")]
    InvalidRegexPattern { pattern: String, detail: String },

    #[error("environment variable name is empty")]
    VariableNameEmpty,

    #[error("environment variable name {0:?} must start with a letter or underscore")]
    VariableNameInvalidStart(String),

    #[error("environment variable name {0:?} contains an invalid character")]
    VariableNameInvalidChar(String),

    #[error("hash validation failed for {path}: {detail}")]
    HashValidationFailed { path: PathBuf, detail: String },

    #[error("no existing directory found in the ancestor hierarchy of {0}")]
    NoExistingDirectoryInPathHierarchy(PathBuf),

    /// Transient/infrastructural failure (spec §7 class 3): a stat, readlink,
    /// or ELF-analysis call itself failed. These are *not* a verdict — the
    /// caller decides whether to upgrade to `High` risk or propagate.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GateError {
    /// Mirrors Go's `errors.Is(err, ErrCommandNotAllowed)` sentinel check.
    pub fn is_command_not_allowed(&self) -> bool {
        matches!(self, GateError::CommandNotAllowed(_))
    }

    pub fn is_symlink_depth_exceeded(&self) -> bool {
        matches!(self, GateError::SymlinkDepthExceeded(_))
    }
}

pub type GateResult<T> = Result<T, GateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_not_allowed_message_lists_attempted_path_and_patterns() {
        let err = CommandNotAllowedError {
            attempted_path: "/bin/ls".into(),
            resolved_path: None,
            patterns_tried: vec!["^/bin/echo$".into()],
            group_allowed: vec![],
        };
        let msg = err.to_string();
        assert!(msg.contains("/bin/ls"));
        assert!(msg.contains("^/bin/echo$"));
    }

    #[test]
    fn is_command_not_allowed_matches_only_that_variant() {
        let err: GateError = CommandNotAllowedError {
            attempted_path: "/bin/ls".into(),
            resolved_path: None,
            patterns_tried: vec![],
            group_allowed: vec![],
        }
        .into();
        assert!(err.is_command_not_allowed());
        assert!(!GateError::VariableNameEmpty.is_command_not_allowed());
    }
}
