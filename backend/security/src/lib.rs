//! The command security gate: identity resolution, risk profiling, pattern
//! matching, network classification, and the allow-list/permission checks
//! that sit between "a command was requested" and "a command may run".

pub mod allowlist;
pub mod analyzer;
pub mod config;
pub mod elf;
pub mod env;
pub mod fsperm;
pub mod hashstore;
pub mod identity;
pub mod network;
pub mod pattern;
pub mod profile;

pub use allowlist::AllowListValidator;
pub use analyzer::{AnalysisOptions, CommandSecurityAnalyzer, HashExpectation, SecurityVerdict, STANDARD_DIRECTORIES};
pub use config::ValidatorConfig;
pub use elf::{is_network_per_policy, ElfAnalysis, ElfAnalysisResult, GoblinNetworkAnalyzer, NetworkSymbolAnalyzer, SymbolHit};
pub use env::{sanitize_environment_variables, validate_all_environment_vars, validate_environment_value, validate_variable_name};
pub use fsperm::{
    evaluate_output_security_risk, suspicious_file_patterns, validate_directory_permissions,
    validate_output_write_permission, CRITICAL_OUTPUT_PATH_SUBSTRINGS, HIGH_RISK_OUTPUT_PATH_SUBSTRINGS,
};
pub use hashstore::{sha256_hex, FileHashValidator, Sha256FileHashValidator};
pub use identity::{extract_all_command_names, is_privilege_escalation_command, PRIVILEGE_ESCALATION_COMMANDS};
pub use network::NetworkClassifier;
pub use pattern::{first_match, matches_pattern, DangerousCommandPattern, HIGH_RISK_PATTERNS, MEDIUM_RISK_PATTERNS};
pub use profile::{
    seed_definitions, CommandProfileDef, CommandRiskProfile, CommandRiskProfileBuilder, CommandRiskRegistry,
    ProfileValidationError, DEFAULT_REGISTRY,
};
