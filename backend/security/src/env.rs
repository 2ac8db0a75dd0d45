//! C8 — Environment Validator.
//!
//! Validates environment variable names and values before they are allowed
//! to reach a spawned child process (spec §4.8).

use std::collections::HashMap;

use cmdgate_core::{GateError, GateResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// Shell metacharacters and command substitutions that have no legitimate
/// reason to appear in an environment variable *value* (spec §4.8).
static DANGEROUS_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[;&|`]|\$\(|<\(|>\(|\brm\s|\bdd\s+if=|\bmkfs\b|\bexec\b|\beval\b|\bsystem\b"#).unwrap()
});

/// `ValidateVariableName`: must start with a letter or underscore and
/// contain only letters, digits, and underscores thereafter (spec §4.8,
/// mirrors POSIX `NAME` grammar).
pub fn validate_variable_name(name: &str) -> GateResult<()> {
    if name.is_empty() {
        return Err(GateError::VariableNameEmpty);
    }
    let mut chars = name.chars();
    let first = chars.next().unwrap();
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(GateError::VariableNameInvalidStart(name.to_string()));
    }
    if let Some(bad) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
        let _ = bad;
        return Err(GateError::VariableNameInvalidChar(name.to_string()));
    }
    Ok(())
}

/// `ValidateEnvironmentValue`: rejects values containing shell
/// metacharacters, command substitution syntax, or well-known destructive
/// command fragments.
pub fn validate_environment_value(name: &str, value: &str) -> GateResult<()> {
    if let Some(m) = DANGEROUS_VALUE_RE.find(value) {
        return Err(GateError::UnsafeEnvironmentVar {
            name: name.to_string(),
            detail: format!("value contains disallowed sequence {:?}", m.as_str()),
        });
    }
    Ok(())
}

/// `ValidateAllEnvironmentVars`: fails fast on the first invalid name or
/// value, in iteration order of `vars`.
pub fn validate_all_environment_vars(vars: &HashMap<String, String>) -> GateResult<()> {
    let mut names: Vec<&String> = vars.keys().collect();
    names.sort();
    for name in names {
        validate_variable_name(name)?;
        validate_environment_value(name, &vars[name])?;
    }
    Ok(())
}

/// Stand-in value substituted for anything matching `sensitive_name_patterns`
/// in [`sanitize_environment_variables`] — never the variable's real value.
pub const SENSITIVE_VALUE_SENTINEL: &str = "***REDACTED***";

/// `SanitizeEnvironmentVariables`: returns a copy of `vars` in which the
/// value of every entry whose *name* matches one of `sensitive_name_patterns`
/// is replaced by [`SENSITIVE_VALUE_SENTINEL`]. Every key survives; this is a
/// redaction pass, not a filter (contrast with [`validate_all_environment_vars`],
/// which fails closed on bad names/values rather than redacting them).
pub fn sanitize_environment_variables(
    vars: &HashMap<String, String>,
    sensitive_name_patterns: &[Regex],
) -> HashMap<String, String> {
    vars.iter()
        .map(|(name, value)| {
            if sensitive_name_patterns.iter().any(|re| re.is_match(name)) {
                (name.clone(), SENSITIVE_VALUE_SENTINEL.to_string())
            } else {
                (name.clone(), value.clone())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_is_rejected() {
        assert!(matches!(validate_variable_name(""), Err(GateError::VariableNameEmpty)));
    }

    #[test]
    fn name_starting_with_digit_is_rejected() {
        assert!(matches!(validate_variable_name("1FOO"), Err(GateError::VariableNameInvalidStart(_))));
    }

    #[test]
    fn name_with_hyphen_is_rejected() {
        assert!(matches!(validate_variable_name("FOO-BAR"), Err(GateError::VariableNameInvalidChar(_))));
    }

    #[test]
    fn underscore_leading_name_is_valid() {
        assert!(validate_variable_name("_PRIVATE_VAR").is_ok());
    }

    #[test]
    fn value_with_command_substitution_is_rejected() {
        let err = validate_environment_value("PATH_EXTRA", "$(rm -rf /)").unwrap_err();
        assert!(matches!(err, GateError::UnsafeEnvironmentVar { .. }));
    }

    #[test]
    fn value_with_pipe_is_rejected() {
        assert!(validate_environment_value("X", "foo | bar").is_err());
    }

    #[test]
    fn plain_value_is_accepted() {
        assert!(validate_environment_value("LANG", "en_US.UTF-8").is_ok());
    }

    #[test]
    fn validate_all_fails_fast_on_first_bad_entry() {
        let mut vars = HashMap::new();
        vars.insert("GOOD".to_string(), "ok".to_string());
        vars.insert("BAD NAME".to_string(), "ok".to_string());
        assert!(validate_all_environment_vars(&vars).is_err());
    }

    #[test]
    fn sanitize_redacts_values_for_matching_names_and_keeps_the_rest() {
        let mut vars = HashMap::new();
        vars.insert("AWS_SECRET_ACCESS_KEY".to_string(), "super-secret".to_string());
        vars.insert("LANG".to_string(), "en_US.UTF-8".to_string());
        let patterns = vec![Regex::new(r"(?i)^AWS_SECRET").unwrap()];
        let sanitized = sanitize_environment_variables(&vars, &patterns);
        assert_eq!(sanitized.len(), 2);
        assert_eq!(sanitized["AWS_SECRET_ACCESS_KEY"], SENSITIVE_VALUE_SENTINEL);
        assert_eq!(sanitized["LANG"], "en_US.UTF-8");
    }

    #[test]
    fn sanitize_with_no_patterns_is_a_pass_through() {
        let mut vars = HashMap::new();
        vars.insert("ANYTHING".to_string(), "value".to_string());
        let sanitized = sanitize_environment_variables(&vars, &[]);
        assert_eq!(sanitized["ANYTHING"], "value");
    }
}
