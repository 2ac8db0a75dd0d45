//! C2 — Risk-Profile Registry.
//!
//! An in-memory table mapping a command identity to a structured
//! multi-factor risk profile, built once at process start from a static
//! seed list and thereafter read-only (spec §4.2, §5, §9).

use std::collections::HashMap;

use cmdgate_core::{NetworkOperationType, RiskFactor, RiskLevel};
use once_cell::sync::Lazy;

use crate::identity::extract_all_command_names;

/// A command's multi-factor risk profile (spec §3 "Command Risk Profile").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandRiskProfile {
    pub privilege: RiskFactor,
    pub network: RiskFactor,
    pub destruction: RiskFactor,
    pub data_exfil: RiskFactor,
    pub system_mod: RiskFactor,
    pub network_type: NetworkOperationType,
    pub network_subcommands: Vec<String>,
}

/// Violations of the profile invariants in spec §3.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileValidationError {
    #[error("networkType is Always but network.level is below Medium")]
    AlwaysNetworkBelowMedium,
    #[error("networkSubcommands is non-empty but networkType is not Conditional")]
    SubcommandsWithoutConditional,
}

impl CommandRiskProfile {
    /// Invariants 1 and 2 from spec §3.
    pub fn validate(&self) -> Result<(), ProfileValidationError> {
        if self.network_type == NetworkOperationType::Always && self.network.level < RiskLevel::Medium {
            return Err(ProfileValidationError::AlwaysNetworkBelowMedium);
        }
        if !self.network_subcommands.is_empty() && self.network_type != NetworkOperationType::Conditional {
            return Err(ProfileValidationError::SubcommandsWithoutConditional);
        }
        Ok(())
    }

    /// Invariant 3: the max over all five factors.
    pub fn base_risk_level(&self) -> RiskLevel {
        RiskLevel::max_of([
            self.privilege.level,
            self.network.level,
            self.destruction.level,
            self.data_exfil.level,
            self.system_mod.level,
        ])
    }

    /// Invariant 4: derived, not a stored field (spec §9 design note prefers
    /// the derived form over the legacy explicit `IsPrivilege` field).
    pub fn is_privilege(&self) -> bool {
        self.privilege.level >= RiskLevel::High
    }

    /// Invariant 5: factor reasons in fixed order, omitting empties,
    /// deterministic across calls.
    pub fn risk_reasons(&self) -> Vec<String> {
        [&self.privilege, &self.network, &self.destruction, &self.data_exfil, &self.system_mod]
            .into_iter()
            .filter(|f| !f.is_empty())
            .map(|f| f.reason.clone())
            .collect()
    }
}

/// Fluent builder that fixes `Unknown` for unset factors and calls
/// [`CommandRiskProfile::validate`] at build time, panicking on violation —
/// registry construction is a startup-time, fail-fast operation (spec §9).
#[derive(Debug, Default)]
pub struct CommandRiskProfileBuilder {
    profile: CommandRiskProfile,
}

impl CommandRiskProfileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn privilege(mut self, level: RiskLevel, reason: impl Into<String>) -> Self {
        self.profile.privilege = RiskFactor::new(level, reason);
        self
    }

    pub fn network(mut self, level: RiskLevel, reason: impl Into<String>) -> Self {
        self.profile.network = RiskFactor::new(level, reason);
        self
    }

    pub fn destruction(mut self, level: RiskLevel, reason: impl Into<String>) -> Self {
        self.profile.destruction = RiskFactor::new(level, reason);
        self
    }

    pub fn data_exfil(mut self, level: RiskLevel, reason: impl Into<String>) -> Self {
        self.profile.data_exfil = RiskFactor::new(level, reason);
        self
    }

    pub fn system_mod(mut self, level: RiskLevel, reason: impl Into<String>) -> Self {
        self.profile.system_mod = RiskFactor::new(level, reason);
        self
    }

    pub fn network_always(mut self) -> Self {
        self.profile.network_type = NetworkOperationType::Always;
        self
    }

    pub fn network_conditional(mut self, subcommands: &[&str]) -> Self {
        self.profile.network_type = NetworkOperationType::Conditional;
        self.profile.network_subcommands = subcommands.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Builds and validates the profile, panicking on an invariant
    /// violation. Only ever called from startup-time seed data, never on a
    /// per-request path.
    pub fn build(self) -> CommandRiskProfile {
        self.profile
            .validate()
            .unwrap_or_else(|e| panic!("invalid command risk profile: {e}"));
        self.profile
    }
}

/// `{commands: [string], profile: CommandRiskProfile}` (spec §3).
#[derive(Debug, Clone)]
pub struct CommandProfileDef {
    commands: Vec<String>,
    pub profile: CommandRiskProfile,
}

impl CommandProfileDef {
    pub fn new(commands: &[&str], profile: CommandRiskProfile) -> Self {
        Self {
            commands: commands.iter().map(|s| s.to_string()).collect(),
            profile,
        }
    }

    /// Defensive copy, per spec §3.
    pub fn commands(&self) -> Vec<String> {
        self.commands.clone()
    }
}

/// Process-wide, read-only-after-init mapping from command identity to
/// profile.
#[derive(Debug, Default)]
pub struct CommandRiskRegistry {
    profiles: HashMap<String, CommandRiskProfile>,
}

impl CommandRiskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition's profile under each of its command names.
    pub fn register(&mut self, def: &CommandProfileDef) {
        for name in def.commands() {
            self.profiles.insert(name, def.profile.clone());
        }
    }

    /// Looks up a profile by inspecting every identity `cmd_name` may
    /// resolve to (original, basename, symlink hops, final target and its
    /// basename) — the abstraction is set membership, never a single
    /// canonical string (spec §9 "Identity-set polymorphism").
    pub fn lookup(&self, cmd_name: &str) -> Option<CommandRiskProfile> {
        let (names, _exceeded) = extract_all_command_names(cmd_name);
        names.iter().find_map(|n| self.profiles.get(n)).cloned()
    }

    /// Direct lookup by exact key, bypassing identity resolution — used
    /// when the caller already has a concrete path or basename in hand
    /// (e.g. C6's registry-override step which looks up both separately).
    pub fn get_exact(&self, key: &str) -> Option<CommandRiskProfile> {
        self.profiles.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Minimum-viable seed taxonomy (spec §4.2) — not a closed list; embedding
/// hosts are expected to register additional definitions from their own
/// configuration.
pub fn seed_definitions() -> Vec<CommandProfileDef> {
    vec![
        CommandProfileDef::new(
            &["sudo", "su", "doas"],
            CommandRiskProfileBuilder::new()
                .privilege(RiskLevel::Critical, "Privilege escalation command")
                .build(),
        ),
        CommandProfileDef::new(
            &["systemctl", "service"],
            CommandRiskProfileBuilder::new()
                .system_mod(RiskLevel::High, "System service management")
                .build(),
        ),
        CommandProfileDef::new(
            &["rm", "dd"],
            CommandRiskProfileBuilder::new()
                .destruction(RiskLevel::High, "Destructive filesystem operation")
                .build(),
        ),
        CommandProfileDef::new(
            &[
                "curl", "wget", "nc", "netcat", "telnet", "ssh", "scp", "aws", "az", "gcloud",
            ],
            CommandRiskProfileBuilder::new()
                .network(RiskLevel::Medium, "Always performs network I/O")
                .network_always()
                .build(),
        ),
        CommandProfileDef::new(
            &["claude", "gemini", "chatgpt", "gpt", "openai", "anthropic"],
            CommandRiskProfileBuilder::new()
                .network(RiskLevel::High, "AI service client sends prompts off-host")
                .data_exfil(RiskLevel::High, "Prompt/response content leaves the host")
                .network_always()
                .build(),
        ),
        CommandProfileDef::new(
            &["git"],
            CommandRiskProfileBuilder::new()
                .network(RiskLevel::Medium, "Network access on clone/fetch/pull/push/remote")
                .network_conditional(&["clone", "fetch", "pull", "push", "remote"])
                .build(),
        ),
        CommandProfileDef::new(
            &["rsync"],
            CommandRiskProfileBuilder::new()
                .network(RiskLevel::Medium, "Network access when given a remote address")
                .network_conditional(&[])
                .build(),
        ),
    ]
}

fn build_default_registry() -> CommandRiskRegistry {
    let mut registry = CommandRiskRegistry::new();
    for def in seed_definitions() {
        registry.register(&def);
    }
    registry
}

/// The process-wide registry, initialised once on first access.
pub static DEFAULT_REGISTRY: Lazy<CommandRiskRegistry> = Lazy::new(build_default_registry);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_risk_level_is_max_of_five_factors() {
        let p = CommandRiskProfileBuilder::new()
            .privilege(RiskLevel::Low, "a")
            .network(RiskLevel::Critical, "b")
            .build();
        assert_eq!(p.base_risk_level(), RiskLevel::Critical);
    }

    #[test]
    fn is_privilege_derived_from_level() {
        let p = CommandRiskProfileBuilder::new().privilege(RiskLevel::High, "x").build();
        assert!(p.is_privilege());
        let q = CommandRiskProfileBuilder::new().privilege(RiskLevel::Medium, "x").build();
        assert!(!q.is_privilege());
    }

    #[test]
    fn risk_reasons_preserve_fixed_order_and_skip_empties() {
        let p = CommandRiskProfileBuilder::new()
            .network(RiskLevel::Medium, "net reason")
            .system_mod(RiskLevel::High, "sysmod reason")
            .build();
        assert_eq!(p.risk_reasons(), vec!["net reason".to_string(), "sysmod reason".to_string()]);
    }

    #[test]
    #[should_panic(expected = "invalid command risk profile")]
    fn always_network_below_medium_panics_at_build() {
        CommandRiskProfileBuilder::new().network(RiskLevel::Low, "x").network_always().build();
    }

    #[test]
    fn validate_rejects_subcommands_without_conditional() {
        let mut p = CommandRiskProfile::default();
        p.network_subcommands = vec!["fetch".into()];
        assert_eq!(p.validate(), Err(ProfileValidationError::SubcommandsWithoutConditional));
    }

    #[test]
    fn commands_returns_defensive_copy() {
        let def = CommandProfileDef::new(&["a", "b"], CommandRiskProfile::default());
        let mut copy = def.commands();
        copy.push("c".into());
        assert_eq!(def.commands(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn registry_lookup_matches_by_basename() {
        let mut registry = CommandRiskRegistry::new();
        registry.register(&CommandProfileDef::new(
            &["rm"],
            CommandRiskProfileBuilder::new().destruction(RiskLevel::High, "rm").build(),
        ));
        let found = registry.lookup("/bin/rm").expect("should match by basename");
        assert_eq!(found.base_risk_level(), RiskLevel::High);
    }

    #[test]
    fn default_registry_knows_sudo() {
        let profile = DEFAULT_REGISTRY.lookup("sudo").expect("seed taxonomy includes sudo");
        assert!(profile.is_privilege());
    }

    #[test]
    fn default_registry_ai_cli_is_network_and_data_exfil() {
        let profile = DEFAULT_REGISTRY.get_exact("claude").expect("seed taxonomy includes claude");
        assert_eq!(profile.network_type, NetworkOperationType::Always);
        assert!(profile.data_exfil.level >= RiskLevel::High);
    }
}
