//! C3 — Pattern Matcher.
//!
//! Decides whether a `(command, args)` tuple matches a dangerous-pattern
//! template, with ordering-independent argument matching and `key=`-prefix
//! semantics (spec §4.3).

use cmdgate_core::RiskLevel;
use once_cell::sync::Lazy;

use crate::identity::extract_all_command_names;

/// `(command, [arg-templates], level, reason)` (spec Glossary).
#[derive(Debug, Clone)]
pub struct DangerousCommandPattern {
    pub pattern: Vec<String>,
    pub risk: RiskLevel,
    pub reason: String,
}

impl DangerousCommandPattern {
    pub fn new(tokens: &[&str], risk: RiskLevel, reason: &str) -> Self {
        Self {
            pattern: tokens.iter().map(|t| t.to_string()).collect(),
            risk,
            reason: reason.to_string(),
        }
    }

    /// Human-readable rendering of the pattern tokens, used as the verdict's
    /// `pattern` field (spec §8 scenario 1: `"rm -rf"`).
    pub fn display(&self) -> String {
        self.pattern.join(" ")
    }
}

/// A single argument template's match rule: exact, or prefix when the
/// template ends with `=` (spec §4.3, §9 "Prefix-match via trailing `=`").
fn token_matches(template: &str, arg: &str) -> bool {
    if let Some(prefix) = template.strip_suffix('=') {
        arg.starts_with(&format!("{prefix}="))
    } else {
        arg == template
    }
}

/// `matchesPattern` (spec §4.3): order-independent, one-to-one consumption
/// of pattern arguments against the command's actual arguments.
pub fn matches_pattern(cmd_name: &str, args: &[String], pattern: &[String]) -> bool {
    if cmd_name.is_empty() || pattern.is_empty() {
        return false;
    }
    let (names, _exceeded) = extract_all_command_names(cmd_name);
    if !names.contains(&pattern[0]) {
        return false;
    }

    let mut consumed = vec![false; args.len()];
    for template in &pattern[1..] {
        let mut found = false;
        for (i, arg) in args.iter().enumerate() {
            if !consumed[i] && token_matches(template, arg) {
                consumed[i] = true;
                found = true;
                break;
            }
        }
        if !found {
            return false;
        }
    }
    true
}

/// Finds the first pattern in `patterns` that matches, in list order —
/// callers are expected to pass `high` patterns before `medium` ones so the
/// "highest-risk first" rule (spec §4.3, §5) is satisfied.
pub fn first_match<'a>(
    cmd_name: &str,
    args: &[String],
    patterns: &'a [DangerousCommandPattern],
) -> Option<&'a DangerousCommandPattern> {
    patterns.iter().find(|p| matches_pattern(cmd_name, args, &p.pattern))
}

/// Canonical high-risk patterns (spec §4.3) — non-exhaustive, indicative.
pub static HIGH_RISK_PATTERNS: Lazy<Vec<DangerousCommandPattern>> = Lazy::new(|| {
    vec![
        DangerousCommandPattern::new(&["rm", "-rf"], RiskLevel::High, "Recursive, forced file removal"),
        DangerousCommandPattern::new(&["sudo", "rm"], RiskLevel::High, "Removing files via sudo"),
        DangerousCommandPattern::new(&["format"], RiskLevel::High, "Disk/filesystem format utility"),
        DangerousCommandPattern::new(&["mkfs"], RiskLevel::High, "Filesystem creation utility (formats a device)"),
        DangerousCommandPattern::new(&["fdisk"], RiskLevel::High, "Disk partitioning utility"),
        DangerousCommandPattern::new(&["dd", "if="], RiskLevel::High, "Raw block-level disk write"),
    ]
});

/// Canonical medium-risk patterns (spec §4.3) — non-exhaustive, indicative.
pub static MEDIUM_RISK_PATTERNS: Lazy<Vec<DangerousCommandPattern>> = Lazy::new(|| {
    vec![
        DangerousCommandPattern::new(&["chmod", "777"], RiskLevel::Medium, "World-writable permission change"),
        DangerousCommandPattern::new(&["chown", "root"], RiskLevel::Medium, "Ownership change to root"),
        DangerousCommandPattern::new(&["wget"], RiskLevel::Medium, "Network download utility"),
        DangerousCommandPattern::new(&["curl"], RiskLevel::Medium, "Network transfer utility"),
        DangerousCommandPattern::new(&["nc"], RiskLevel::Medium, "Netcat can open arbitrary listeners or connections"),
        DangerousCommandPattern::new(&["netcat"], RiskLevel::Medium, "Netcat can open arbitrary listeners or connections"),
    ]
});
