//! C9 — Allow-List Validator.
//!
//! Decides whether a resolved command identity is permitted to run at all,
//! independent of its risk score (spec §4.9). Risk scoring (C6) answers "how
//! dangerous"; this module answers "is it on the list".

use std::path::PathBuf;

use cmdgate_core::{CommandNotAllowedError, GateError, GateResult};
use regex::Regex;

use crate::identity::extract_all_command_names;

/// Validated at construction time: every dangerous-root pattern must be a
/// bare, lowercase basename — no path separators, no wildcards. This keeps
/// the dangerous-root check a pure set-membership test instead of another
/// regex engine to reason about.
///
/// Carries two structurally distinct admission sources for
/// `validate_command_allowed` (spec §4.9): a config-level list of compiled
/// regexes checked directly against `cmdPath`, and a per-call exact-match set
/// (`groupCmdAllowed`) checked against the resolved identity set. These are
/// never merged — a config author writes a regex, a caller passes exact
/// names, and guessing which one an entry "looks like" is not part of the
/// contract.
pub struct AllowListValidator {
    dangerous_root_patterns: Vec<String>,
    allowed_command_regexes: Vec<Regex>,
}

impl AllowListValidator {
    pub fn new(dangerous_root_patterns: &[&str], allowed_command_patterns: &[&str]) -> GateResult<Self> {
        let mut patterns = Vec::with_capacity(dangerous_root_patterns.len());
        for raw in dangerous_root_patterns {
            if raw.is_empty()
                || raw.to_lowercase() != *raw
                || raw.contains('/')
                || raw.contains('*')
                || raw.contains('?')
            {
                return Err(GateError::InvalidRegexPattern {
                    pattern: raw.to_string(),
                    detail: "dangerous root pattern must be a lowercase basename with no path separators or wildcards"
                        .to_string(),
                });
            }
            patterns.push(raw.to_string());
        }

        let mut allowed_command_regexes = Vec::with_capacity(allowed_command_patterns.len());
        for raw in allowed_command_patterns {
            let re = Regex::new(raw)
                .map_err(|e| GateError::InvalidRegexPattern { pattern: raw.to_string(), detail: e.to_string() })?;
            allowed_command_regexes.push(re);
        }

        Ok(Self { dangerous_root_patterns: patterns, allowed_command_regexes })
    }

    /// True when any identity `cmd_path` may resolve to matches the
    /// dangerous-root basename set, case-insensitively (spec §4.9).
    pub fn is_dangerous_root_command(&self, cmd_path: &str) -> bool {
        let (names, _exceeded) = extract_all_command_names(cmd_path);
        names.iter().any(|n| self.dangerous_root_patterns.iter().any(|p| p.eq_ignore_ascii_case(n)))
    }

    /// `ValidateCommandAllowed(cmdPath, groupCmdAllowed)` (spec §4.9): allowed
    /// iff either (a) `cmd_path` matches one of the compiled allowed-command
    /// regexes, or (b) the resolved identity set intersects the exact-match
    /// `group_cmd_allowed` set. On rejection the error carries every pattern
    /// and every group entry that was tried, for diagnosis.
    pub fn validate_command_allowed(&self, cmd_path: &str, group_cmd_allowed: &[String]) -> GateResult<()> {
        if cmd_path.is_empty() {
            return Err(GateError::InvalidPath("command path is empty".to_string()));
        }

        if self.allowed_command_regexes.iter().any(|re| re.is_match(cmd_path)) {
            return Ok(());
        }

        let (names, exceeded) = extract_all_command_names(cmd_path);
        if exceeded {
            return Err(GateError::SymlinkDepthExceeded(PathBuf::from(cmd_path)));
        }

        if group_cmd_allowed.iter().any(|entry| names.contains(entry)) {
            return Ok(());
        }

        let resolved_path = names.iter().find(|n| n.as_str() != cmd_path).cloned();
        Err(CommandNotAllowedError {
            attempted_path: cmd_path.to_string(),
            resolved_path,
            patterns_tried: self.allowed_command_regexes.iter().map(|re| re.as_str().to_string()).collect(),
            group_allowed: group_cmd_allowed.to_vec(),
        }
        .into())
    }
}
