//! C10 — Logging Sanitiser.
//!
//! Redacts sensitive tokens from error/output strings, applies length caps,
//! and produces log-safe field maps (spec §4.10).

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::options::LoggingOptions;

/// Fixed sentinel returned by [`sanitize_error_message_for_logging`] when
/// `include_error_details` is off — the caller learns an error occurred but
/// nothing about its content.
pub const REDACTED_ERROR_SENTINEL: &str = "[error details redacted]";

static TELEPHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap()
});
static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9]{32,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});
static KEY_VALUE_SECRET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(password|passwd|secret|token|api[_-]?key)\s*=\s*\S+").unwrap()
});

/// Redacts well-known sensitive substrings (phone numbers, bearer/API
/// tokens, `key=value` secrets) from an arbitrary string.
pub fn redact_sensitive_data(input: &str) -> String {
    let mut redacted = input.to_string();
    redacted = TELEPHONE_RE.replace_all(&redacted, "[REDACTED_PHONE]").to_string();
    redacted = API_KEY_RE.replace_all(&redacted, "[REDACTED_TOKEN]").to_string();
    redacted = KEY_VALUE_SECRET_RE
        .replace_all(&redacted, |caps: &regex::Captures| format!("{}=[REDACTED]", &caps[1]))
        .to_string();
    redacted
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let suffix = "\u{2026}[truncated]";
    let keep = max_len.saturating_sub(suffix.chars().count());
    let mut out: String = s.chars().take(keep).collect();
    out.push_str(suffix);
    out
}

/// Sanitises an error for inclusion in a log line or user-facing message.
///
/// `None` maps to an empty string. When `include_error_details` is off the
/// fixed [`REDACTED_ERROR_SENTINEL`] is returned regardless of content.
/// Otherwise the message is optionally pattern-redacted and then truncated.
pub fn sanitize_error_for_logging(err: Option<&(dyn std::error::Error)>, opts: &LoggingOptions) -> String {
    let Some(err) = err else { return String::new() };
    sanitize_error_message_for_logging(&err.to_string(), opts)
}

/// Same policy as [`sanitize_error_for_logging`] but for a plain message
/// string rather than a `std::error::Error` — useful when the caller only
/// has formatted text, not a live error value.
pub fn sanitize_error_message_for_logging(message: &str, opts: &LoggingOptions) -> String {
    if message.is_empty() {
        return String::new();
    }
    if !opts.include_error_details {
        return REDACTED_ERROR_SENTINEL.to_string();
    }
    let mut msg = message.to_string();
    if opts.redact_sensitive_info {
        msg = redact_sensitive_data(&msg);
    }
    truncate(&msg, opts.max_error_message_length)
}

/// Sanitises stdout/stderr text before it is written to a log.
pub fn sanitize_output_for_logging(s: &str, opts: &LoggingOptions) -> String {
    let mut out = s.to_string();
    if opts.redact_sensitive_info {
        out = redact_sensitive_data(&out);
    }
    if opts.truncate_stdout {
        out = truncate(&out, opts.max_stdout_length);
    }
    out
}

/// A scalar log value: strings go through output sanitisation, other
/// scalars pass through untouched (spec §4.10: "leaving scalars untouched").
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum LogValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<&str> for LogValue {
    fn from(v: &str) -> Self {
        LogValue::Str(v.to_string())
    }
}
impl From<String> for LogValue {
    fn from(v: String) -> Self {
        LogValue::Str(v)
    }
}
impl From<i64> for LogValue {
    fn from(v: i64) -> Self {
        LogValue::Int(v)
    }
}
impl From<bool> for LogValue {
    fn from(v: bool) -> Self {
        LogValue::Bool(v)
    }
}

/// Copies a field map, applying output sanitisation to string values and
/// leaving every other scalar untouched.
pub fn create_safe_log_fields(fields: &HashMap<String, LogValue>, opts: &LoggingOptions) -> HashMap<String, LogValue> {
    fields
        .iter()
        .map(|(k, v)| {
            let sanitized = match v {
                LogValue::Str(s) => LogValue::Str(sanitize_output_for_logging(s, opts)),
                other => other.clone(),
            };
            (k.clone(), sanitized)
        })
        .collect()
}

/// [`create_safe_log_fields`] plus an `"error"` key populated from `err`,
/// present iff `err.is_some()`.
pub fn log_fields_with_error(
    fields: &HashMap<String, LogValue>,
    err: Option<&(dyn std::error::Error)>,
    opts: &LoggingOptions,
) -> HashMap<String, LogValue> {
    let mut out = create_safe_log_fields(fields, opts);
    if err.is_some() {
        out.insert("error".to_string(), LogValue::Str(sanitize_error_for_logging(err, opts)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(details: bool, redact: bool) -> LoggingOptions {
        LoggingOptions {
            include_error_details: details,
            max_error_message_length: 500,
            redact_sensitive_info: redact,
            truncate_stdout: true,
            max_stdout_length: 500,
        }
    }

    #[test]
    fn redacts_phone_and_token() {
        let raw = "Sending to +1-555-123-4567 with Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("+1-555-123-4567"));
        assert!(!clean.contains("Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9"));
    }

    #[test]
    fn redacts_key_value_secret() {
        let clean = redact_sensitive_data("password=secret123 failed");
        assert_eq!(clean, "password=[REDACTED] failed");
    }

    #[test]
    fn details_off_returns_fixed_sentinel() {
        let msg = sanitize_error_message_for_logging("password=secret123 failed", &opts(false, true));
        assert_eq!(msg, REDACTED_ERROR_SENTINEL);
    }

    #[test]
    fn details_on_redacts_then_returns_message() {
        let msg = sanitize_error_message_for_logging("password=secret123 failed", &opts(true, true));
        assert_eq!(msg, "password=[REDACTED] failed");
    }

    #[test]
    fn none_error_is_empty_string() {
        assert_eq!(sanitize_error_for_logging(None, &opts(true, true)), "");
    }

    #[test]
    fn truncates_long_output_with_suffix() {
        let mut o = opts(true, false);
        o.max_stdout_length = 10;
        let out = sanitize_output_for_logging("0123456789abcdef", &o);
        assert!(out.ends_with("[truncated]"));
        assert!(out.chars().count() <= 10);
    }

    #[test]
    fn log_fields_with_error_adds_error_key_only_when_present() {
        let fields = HashMap::new();
        let o = opts(true, true);
        let without = log_fields_with_error(&fields, None, &o);
        assert!(!without.contains_key("error"));

        let boom = std::io::Error::other("password=leak");
        let with = log_fields_with_error(&fields, Some(&boom), &o);
        assert!(with.contains_key("error"));
    }

    #[test]
    fn scalars_pass_through_untouched() {
        let mut fields = HashMap::new();
        fields.insert("count".to_string(), LogValue::Int(7));
        fields.insert("msg".to_string(), LogValue::from("password=secret failed"));
        let safe = create_safe_log_fields(&fields, &opts(true, true));
        match safe.get("count").unwrap() {
            LogValue::Int(7) => {}
            other => panic!("expected untouched int, got {other:?}"),
        }
        match safe.get("msg").unwrap() {
            LogValue::Str(s) => assert_eq!(s, "password=[REDACTED] failed"),
            other => panic!("expected sanitized string, got {other:?}"),
        }
    }
}
