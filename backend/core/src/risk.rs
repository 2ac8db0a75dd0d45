//! Risk vocabulary shared by every component of the security gate.
//!
//! `RiskLevel` is a totally ordered enum (`Unknown < Low < Medium < High <
//! Critical`); `Unknown` is the bottom element and aggregation across
//! multiple factors is always `max`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single point on the gate's risk scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Unknown,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Unknown => "unknown",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    /// `max` over an iterator, defaulting to `Unknown` for an empty input.
    pub fn max_of(levels: impl IntoIterator<Item = RiskLevel>) -> RiskLevel {
        levels.into_iter().max().unwrap_or_default()
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One axis of harm: a level plus the human-readable reason behind it.
///
/// The empty factor is `{Unknown, ""}` — used as the default for any factor
/// a [`crate::CommandRiskProfile`] builder leaves unset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RiskFactor {
    pub level: RiskLevel,
    pub reason: String,
}

impl RiskFactor {
    pub fn new(level: RiskLevel, reason: impl Into<String>) -> Self {
        Self { level, reason: reason.into() }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.reason.is_empty()
    }
}

/// Whether a command ever, sometimes, or never produces network traffic by
/// virtue of its static profile (as opposed to ELF or argument evidence).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NetworkOperationType {
    #[default]
    None,
    Always,
    Conditional,
}
