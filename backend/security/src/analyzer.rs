//! C6 — Command Security Analyser.
//!
//! Combines every upstream component into a single verdict for a concrete
//! `(command path, args)` invocation (spec §4.6).

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use cmdgate_core::{GateError, GateResult, RiskLevel};

use crate::elf::NetworkSymbolAnalyzer;
use crate::hashstore::FileHashValidator;
use crate::network::NetworkClassifier;
use crate::pattern::{first_match, HIGH_RISK_PATTERNS, MEDIUM_RISK_PATTERNS};
use crate::profile::CommandRiskRegistry;

/// Directories treated as part of the trusted base OS image, including any
/// subdirectory thereof, matched at path-component boundaries (spec §4.6
/// step 2, Glossary "Standard directory"). `/bin`, `/usr/bin`,
/// `/usr/local/bin` map to `Low`; the `sbin` variants map to `Medium`.
pub const STANDARD_DIRECTORIES: &[&str] =
    &["/bin", "/sbin", "/usr/bin", "/usr/sbin", "/usr/local/bin", "/usr/local/sbin"];

const SETUID_BIT: u32 = 0o4000;
const SETGID_BIT: u32 = 0o2000;

/// Flags that only ever come from a trusted call site (tests, an explicit
/// operator override) — spec §9 requires these be unreachable from an
/// on-disk configuration file.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisOptions {
    pub permissive: bool,
    pub skip_hash_validation: bool,
    /// When `false` (the default), a standard-directory binary is trusted at
    /// face value: it gets the directory's baseline risk and hash
    /// validation is skipped. When `true`, the directory location is not
    /// trusted by itself — no baseline is granted, and hash validation runs
    /// even inside a standard directory (spec §4.6 steps 2 and 7).
    pub verify_standard_paths: bool,
}

/// Finds the standard directory (if any) that contains `path`, and the
/// baseline risk level that directory implies.
fn standard_directory_risk(path: &Path) -> Option<RiskLevel> {
    STANDARD_DIRECTORIES.iter().find(|dir| path.starts_with(dir)).map(|dir| {
        if dir.ends_with("sbin") {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    })
}

/// An optional `(expected sha256, validator)` pair. Hash validation only
/// runs when both a registry entry supplies an expected digest and a
/// validator is configured — most deployments run without either.
pub struct HashExpectation<'a> {
    pub expected_hex: &'a str,
    pub validator: &'a dyn FileHashValidator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityVerdict {
    pub risk: RiskLevel,
    pub pattern: Option<String>,
    pub reason: String,
    pub is_network: bool,
}

pub struct CommandSecurityAnalyzer<'a> {
    pub registry: &'a CommandRiskRegistry,
    pub elf_analyzer: &'a dyn NetworkSymbolAnalyzer,
}

impl<'a> CommandSecurityAnalyzer<'a> {
    pub fn new(registry: &'a CommandRiskRegistry, elf_analyzer: &'a dyn NetworkSymbolAnalyzer) -> Self {
        Self { registry, elf_analyzer }
    }

    /// `AnalyzeCommandSecurity(cmdPath, args, opts) -> (risk, pattern, reason, err)`.
    pub fn analyze(
        &self,
        cmd_path: &str,
        args: &[String],
        opts: AnalysisOptions,
        hash: Option<HashExpectation<'_>>,
    ) -> GateResult<SecurityVerdict> {
        let path = Path::new(cmd_path);
        if !path.is_absolute() || cmd_path.is_empty() {
            return Err(GateError::InvalidPath(cmd_path.to_string()));
        }

        // setuid/setgid takes precedence over every pattern and registry
        // entry. A stat failure is treated the same as a confirmed hit
        // (spec §9 "error-on-uncertainty for setuid stat") rather than
        // silently falling through.
        match fs::metadata(path) {
            Ok(meta) => {
                let mode = meta.permissions().mode();
                if meta.file_type().is_file() && (mode & SETUID_BIT != 0 || mode & SETGID_BIT != 0) {
                    return Ok(SecurityVerdict {
                        risk: RiskLevel::High,
                        pattern: Some(cmd_path.to_string()),
                        reason: "Executable has setuid or setgid bit set".to_string(),
                        is_network: false,
                    });
                }
            }
            Err(e) => {
                return Ok(SecurityVerdict {
                    risk: RiskLevel::High,
                    pattern: Some(cmd_path.to_string()),
                    reason: format!("Unable to check setuid/setgid status: {e}"),
                    is_network: false,
                });
            }
        }

        let standard_dir = standard_directory_risk(path);

        let mut risk = RiskLevel::Unknown;
        let mut reason = String::new();
        let mut pattern_display = None;

        // A standard-directory binary is only trusted at face value when the
        // caller has not asked for verification; otherwise its baseline
        // stays Unknown and must be earned by the checks below.
        if let Some(level) = standard_dir {
            if !opts.verify_standard_paths {
                risk = level;
                reason = "Default directory-based risk level".to_string();
            }
        }

        // Registry override: the profile's aggregate risk is a floor, never
        // a ceiling — a pattern match below can still raise it further.
        if let Some(profile) = self.registry.lookup(cmd_path) {
            let profile_risk = profile.base_risk_level();
            if profile_risk > risk {
                risk = profile_risk;
                reason = profile.risk_reasons().join("; ");
            }
        }

        // High-risk patterns checked before medium, first match wins.
        let cmd_args = args.to_vec();
        if let Some(m) = first_match(cmd_path, &cmd_args, &HIGH_RISK_PATTERNS) {
            if m.risk > risk {
                risk = m.risk;
                reason = m.reason.clone();
            }
            pattern_display = Some(m.display());
        } else if let Some(m) = first_match(cmd_path, &cmd_args, &MEDIUM_RISK_PATTERNS) {
            if m.risk > risk {
                risk = m.risk;
                reason = m.reason.clone();
            }
            pattern_display = Some(m.display());
        }

        let classifier = NetworkClassifier::new(self.registry, self.elf_analyzer);
        let (is_network, network_high_risk) = classifier.is_network_operation(cmd_path, args);
        if is_network {
            let network_floor = if network_high_risk { RiskLevel::High } else { RiskLevel::Medium };
            if network_floor > risk {
                risk = network_floor;
                if reason.is_empty() {
                    reason = "command performs network I/O".to_string();
                }
            }
        }

        // A standard-directory binary that is being trusted at face value
        // (baseline already granted, verification not requested) skips hash
        // validation entirely; every other path is hash-checked.
        let trusted_without_hash = standard_dir.is_some() && !opts.verify_standard_paths;
        if !opts.skip_hash_validation && !trusted_without_hash {
            if let Some(HashExpectation { expected_hex, validator }) = hash {
                if let Err(e) = validator.validate_file_hash(path, expected_hex) {
                    if !opts.permissive {
                        return Err(e);
                    }
                    risk = RiskLevel::max_of([risk, RiskLevel::Critical]);
                    reason = format!("hash validation failed: {e}");
                }
            }
        }

        // Directory-default fallback (spec §4.6 step 8): if nothing above
        // produced a verdict, return whatever the directory check left
        // behind — which may still be Unknown for a non-standard directory.
        Ok(SecurityVerdict { risk, pattern: pattern_display, reason, is_network })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elf::{ElfAnalysis, ElfAnalysisResult};
    use crate::profile::{CommandProfileDef, CommandRiskProfileBuilder};
    use std::os::unix::fs::PermissionsExt as _;

    struct NeverNetwork;
    impl NetworkSymbolAnalyzer for NeverNetwork {
        fn analyze_network_symbols(&self, _absolute_path: &Path) -> ElfAnalysis {
            ElfAnalysis { result: ElfAnalysisResult::NoNetworkSymbols, symbols: vec![], err: None }
        }
    }

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn relative_path_is_rejected() {
        let registry = CommandRiskRegistry::new();
        let analyzer = CommandSecurityAnalyzer::new(&registry, &NeverNetwork);
        let err = analyzer.analyze("rm", &args(&["-rf", "/"]), AnalysisOptions::default(), None).unwrap_err();
        assert!(matches!(err, GateError::InvalidPath(_)));
    }

    #[test]
    fn standard_directory_binary_with_no_hits_is_low() {
        let registry = CommandRiskRegistry::new();
        let analyzer = CommandSecurityAnalyzer::new(&registry, &NeverNetwork);
        let verdict = analyzer.analyze("/usr/bin/true", &args(&[]), AnalysisOptions::default(), None).unwrap();
        assert_eq!(verdict.risk, RiskLevel::Low);
    }

    #[test]
    fn unrecognized_binary_outside_standard_dirs_stays_unknown() {
        let registry = CommandRiskRegistry::new();
        let analyzer = CommandSecurityAnalyzer::new(&registry, &NeverNetwork);
        let verdict = analyzer.analyze("/opt/custom/tool", &args(&[]), AnalysisOptions::default(), None).unwrap();
        assert_eq!(verdict.risk, RiskLevel::Unknown);
    }

    #[test]
    fn verify_standard_paths_withholds_the_directory_baseline() {
        let registry = CommandRiskRegistry::new();
        let analyzer = CommandSecurityAnalyzer::new(&registry, &NeverNetwork);
        let opts = AnalysisOptions { verify_standard_paths: true, ..Default::default() };
        let verdict = analyzer.analyze("/usr/bin/true", &args(&[]), opts, None).unwrap();
        assert_eq!(verdict.risk, RiskLevel::Unknown);
    }

    #[test]
    fn sbin_directory_baseline_is_medium_not_low() {
        let registry = CommandRiskRegistry::new();
        let analyzer = CommandSecurityAnalyzer::new(&registry, &NeverNetwork);
        let verdict = analyzer.analyze("/usr/sbin/useradd", &args(&[]), AnalysisOptions::default(), None).unwrap();
        assert_eq!(verdict.risk, RiskLevel::Medium);
    }

    #[test]
    fn subdirectory_of_a_standard_directory_still_gets_the_baseline() {
        let registry = CommandRiskRegistry::new();
        let analyzer = CommandSecurityAnalyzer::new(&registry, &NeverNetwork);
        let verdict = analyzer.analyze("/usr/local/bin/tools/mine", &args(&[]), AnalysisOptions::default(), None).unwrap();
        assert_eq!(verdict.risk, RiskLevel::Low);
    }

    #[test]
    fn high_risk_pattern_overrides_standard_directory_baseline() {
        let registry = CommandRiskRegistry::new();
        let analyzer = CommandSecurityAnalyzer::new(&registry, &NeverNetwork);
        let verdict = analyzer.analyze("/bin/rm", &args(&["-rf", "/"]), AnalysisOptions::default(), None).unwrap();
        assert_eq!(verdict.risk, RiskLevel::High);
        assert_eq!(verdict.pattern.as_deref(), Some("rm -rf"));
    }

    #[test]
    fn setuid_bit_forces_high_risk_even_without_any_pattern_match() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("harmless");
        std::fs::write(&bin, b"").unwrap();
        let mut perms = std::fs::metadata(&bin).unwrap().permissions();
        perms.set_mode(0o4755);
        std::fs::set_permissions(&bin, perms).unwrap();

        let registry = CommandRiskRegistry::new();
        let analyzer = CommandSecurityAnalyzer::new(&registry, &NeverNetwork);
        let verdict = analyzer
            .analyze(bin.to_str().unwrap(), &args(&[]), AnalysisOptions::default(), None)
            .unwrap();
        assert_eq!(verdict.risk, RiskLevel::High);
        assert_eq!(verdict.pattern.as_deref(), Some(bin.to_str().unwrap()));
        assert_eq!(verdict.reason, "Executable has setuid or setgid bit set");
    }

    #[test]
    fn setuid_stat_failure_is_treated_as_high_risk_not_skipped() {
        let registry = CommandRiskRegistry::new();
        let analyzer = CommandSecurityAnalyzer::new(&registry, &NeverNetwork);
        let verdict = analyzer
            .analyze("/nonexistent/definitely/missing", &args(&[]), AnalysisOptions::default(), None)
            .unwrap();
        assert_eq!(verdict.risk, RiskLevel::High);
        assert!(verdict.reason.starts_with("Unable to check setuid/setgid status"));
    }

    #[test]
    fn registry_profile_sets_a_floor_pattern_can_raise_but_not_lower() {
        let mut registry = CommandRiskRegistry::new();
        registry.register(&CommandProfileDef::new(
            &["git"],
            CommandRiskProfileBuilder::new().network(RiskLevel::Medium, "net").network_conditional(&["clone"]).build(),
        ));
        let analyzer = CommandSecurityAnalyzer::new(&registry, &NeverNetwork);
        let verdict = analyzer.analyze("/usr/bin/git", &args(&["status"]), AnalysisOptions::default(), None).unwrap();
        assert_eq!(verdict.risk, RiskLevel::Medium);
    }

    #[test]
    fn hash_mismatch_fails_closed_by_default() {
        use crate::hashstore::FileHashValidator;
        struct AlwaysMismatch;
        impl FileHashValidator for AlwaysMismatch {
            fn validate_file_hash(&self, path: &Path, _expected_hex: &str) -> GateResult<()> {
                Err(GateError::HashValidationFailed { path: path.to_path_buf(), detail: "mismatch".into() })
            }
        }
        let registry = CommandRiskRegistry::new();
        let analyzer = CommandSecurityAnalyzer::new(&registry, &NeverNetwork);
        let hash = HashExpectation { expected_hex: "deadbeef", validator: &AlwaysMismatch };
        let opts = AnalysisOptions { verify_standard_paths: true, ..Default::default() };
        let err = analyzer.analyze("/usr/bin/true", &args(&[]), opts, Some(hash)).unwrap_err();
        assert!(matches!(err, GateError::HashValidationFailed { .. }));
    }

    #[test]
    fn standard_directory_binary_skips_hash_validation_when_not_verifying() {
        use crate::hashstore::FileHashValidator;
        struct Panics;
        impl FileHashValidator for Panics {
            fn validate_file_hash(&self, _path: &Path, _expected_hex: &str) -> GateResult<()> {
                panic!("must not be called");
            }
        }
        let registry = CommandRiskRegistry::new();
        let analyzer = CommandSecurityAnalyzer::new(&registry, &NeverNetwork);
        let hash = HashExpectation { expected_hex: "deadbeef", validator: &Panics };
        let verdict = analyzer
            .analyze("/usr/bin/true", &args(&[]), AnalysisOptions::default(), Some(hash))
            .unwrap();
        assert_eq!(verdict.risk, RiskLevel::Low);
    }

    #[test]
    fn permissive_mode_downgrades_hash_mismatch_to_critical_risk_instead_of_erroring() {
        use crate::hashstore::FileHashValidator;
        struct AlwaysMismatch;
        impl FileHashValidator for AlwaysMismatch {
            fn validate_file_hash(&self, path: &Path, _expected_hex: &str) -> GateResult<()> {
                Err(GateError::HashValidationFailed { path: path.to_path_buf(), detail: "mismatch".into() })
            }
        }
        let registry = CommandRiskRegistry::new();
        let analyzer = CommandSecurityAnalyzer::new(&registry, &NeverNetwork);
        let hash = HashExpectation { expected_hex: "deadbeef", validator: &AlwaysMismatch };
        let opts =
            AnalysisOptions { permissive: true, skip_hash_validation: false, verify_standard_paths: true };
        let verdict = analyzer.analyze("/usr/bin/true", &args(&[]), opts, Some(hash)).unwrap();
        assert_eq!(verdict.risk, RiskLevel::Critical);
    }

    #[test]
    fn skip_hash_validation_bypasses_the_validator_entirely() {
        use crate::hashstore::FileHashValidator;
        struct Panics;
        impl FileHashValidator for Panics {
            fn validate_file_hash(&self, _path: &Path, _expected_hex: &str) -> GateResult<()> {
                panic!("must not be called");
            }
        }
        let registry = CommandRiskRegistry::new();
        let analyzer = CommandSecurityAnalyzer::new(&registry, &NeverNetwork);
        let hash = HashExpectation { expected_hex: "deadbeef", validator: &Panics };
        let opts =
            AnalysisOptions { permissive: false, skip_hash_validation: true, verify_standard_paths: false };
        let verdict = analyzer.analyze("/usr/bin/true", &args(&[]), opts, Some(hash)).unwrap();
        assert_eq!(verdict.risk, RiskLevel::Low);
    }
}
