//! C5 — Network Classifier.
//!
//! Decides whether invoking a command is a network operation, and whether
//! that operation is high-risk, by combining the registry (C2), a
//! remote-address heuristic, a URL-scheme scan, and — as a last resort for
//! unregistered absolute-path binaries — the ELF symbol analysis from C4
//! (spec §4.5).

use std::path::Path;

use cmdgate_core::{NetworkOperationType, RiskLevel};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::elf::{is_network_per_policy, NetworkSymbolAnalyzer};
use crate::identity::extract_all_command_names;
use crate::profile::CommandRiskRegistry;

/// Matches `user@host:path` and bare `host:path` remote specifications, the
/// shorthand `scp`/`rsync` accept instead of a URL (spec §4.5 "SSH-style
/// address"). Deliberately excludes a bare drive-letter-less `a:b` with no
/// path segment and anything containing `://`, which the URL scan already
/// covers.
static SSH_STYLE_ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Za-z0-9._-]+@)?[A-Za-z0-9.-]+:[^:/][^:]*$").unwrap());

fn looks_like_ssh_address(arg: &str) -> bool {
    !arg.contains("://") && SSH_STYLE_ADDRESS_RE.is_match(arg)
}

fn contains_url_scheme(arg: &str) -> bool {
    arg.contains("://")
}

/// The first argument that isn't a `-`-prefixed flag — the only position a
/// sub-command can occupy (spec §4.5: a later positional argument must never
/// be mistaken for the sub-command itself).
fn first_subcommand_token(args: &[String]) -> Option<&str> {
    args.iter().map(String::as_str).find(|a| !a.starts_with('-'))
}

/// Bundles the two collaborators C5 needs so the classification function
/// stays free of global state (spec §6 external interfaces).
pub struct NetworkClassifier<'a> {
    pub registry: &'a CommandRiskRegistry,
    pub elf_analyzer: &'a dyn NetworkSymbolAnalyzer,
}

impl<'a> NetworkClassifier<'a> {
    pub fn new(registry: &'a CommandRiskRegistry, elf_analyzer: &'a dyn NetworkSymbolAnalyzer) -> Self {
        Self { registry, elf_analyzer }
    }

    /// `IsNetworkOperation(cmdName, args) -> (isNetwork, highRisk)` (spec §4.5).
    ///
    /// `highRisk` carries exactly one meaning here: the identity walk for
    /// `cmd_path` blew through its symlink-hop budget, which is a sign of a
    /// symlink-chain attack independent of whatever network evidence was
    /// found. It is never derived from a profile's registered network risk
    /// level.
    ///
    /// Order of evidence for `isNetwork`, most to least authoritative:
    /// 1. registry `networkType: Always` — always network.
    /// 2. registry `networkType: Conditional` — network iff the first
    ///    non-flag token in `args` is a registered sub-command, or (when the
    ///    registry gives no sub-command list, e.g. `rsync`) a remote address
    ///    is found anywhere in `args`.
    /// 3. an SSH-style remote address or a URL scheme anywhere in `args`.
    /// 4. ELF dynamic-symbol analysis of `cmd_path`, for unregistered
    ///    absolute-path binaries only.
    pub fn is_network_operation(&self, cmd_path: &str, args: &[String]) -> (bool, bool) {
        let (_, depth_exceeded) = extract_all_command_names(cmd_path);
        if depth_exceeded {
            return (false, true);
        }

        if let Some(profile) = self.registry.lookup(cmd_path) {
            match profile.network_type {
                NetworkOperationType::Always => {
                    return (true, false);
                }
                NetworkOperationType::Conditional => {
                    let subcommand_hit = !profile.network_subcommands.is_empty()
                        && first_subcommand_token(args)
                            .is_some_and(|tok| profile.network_subcommands.iter().any(|s| s == tok));
                    let address_hit = args.iter().any(|a| looks_like_ssh_address(a) || contains_url_scheme(a));
                    if subcommand_hit || address_hit {
                        return (true, false);
                    }
                    return (false, false);
                }
                NetworkOperationType::None => {}
            }
        }

        if args.iter().any(|a| looks_like_ssh_address(a) || contains_url_scheme(a)) {
            return (true, false);
        }

        if Path::new(cmd_path).is_absolute() {
            let analysis = self.elf_analyzer.analyze_network_symbols(Path::new(cmd_path));
            if is_network_per_policy(&analysis) {
                return (true, false);
            }
        }

        (false, false)
    }
}
