//! C4 — ELF Network Analyser.
//!
//! External collaborator per spec §4.4/§6: the gate only consumes
//! `AnalyzeNetworkSymbols(path) -> {Result, Symbols, Err}`. This module
//! defines that interface as a trait plus a production adapter built on
//! `goblin` (the ELF/Mach-O/PE parser already used for this purpose by
//! `astral-sh-uv` in the reference pack), so the policy in C5 stays a pure
//! function of whatever implementation is plugged in.

use std::fs;
use std::path::Path;

use goblin::Object;

/// Outcome of inspecting a binary's dynamic symbol table for
/// network-capable syscalls or library calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfAnalysisResult {
    NetworkDetected,
    NoNetworkSymbols,
    NotELFBinary,
    StaticBinary,
    AnalysisError,
}

/// A single matched symbol, with a coarse category for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolHit {
    pub name: String,
    pub category: String,
}

#[derive(Debug, Clone)]
pub struct ElfAnalysis {
    pub result: ElfAnalysisResult,
    pub symbols: Vec<SymbolHit>,
    pub err: Option<String>,
}

impl ElfAnalysis {
    fn simple(result: ElfAnalysisResult) -> Self {
        Self { result, symbols: Vec::new(), err: None }
    }

    fn error(message: impl Into<String>) -> Self {
        Self { result: ElfAnalysisResult::AnalysisError, symbols: Vec::new(), err: Some(message.into()) }
    }
}

/// The consumed interface (spec §6). Absolute paths required — C5 resolves
/// relative paths and follows symlinks before calling.
pub trait NetworkSymbolAnalyzer: Send + Sync {
    fn analyze_network_symbols(&self, absolute_path: &Path) -> ElfAnalysis;
}

/// Dynamic symbols that indicate network capability, grouped by what kind of
/// network behaviour they imply. Non-exhaustive by design — this is a
/// capability signal, not an exhaustive syscall audit.
const NETWORK_SYMBOLS: &[(&str, &str)] = &[
    ("socket", "syscall"),
    ("connect", "syscall"),
    ("bind", "syscall"),
    ("listen", "syscall"),
    ("accept", "syscall"),
    ("accept4", "syscall"),
    ("send", "syscall"),
    ("sendto", "syscall"),
    ("recv", "syscall"),
    ("recvfrom", "syscall"),
    ("getaddrinfo", "dns"),
    ("gethostbyname", "dns"),
    ("SSL_connect", "tls"),
    ("SSL_read", "tls"),
    ("SSL_write", "tls"),
    ("gnutls_handshake", "tls"),
    ("curl_easy_perform", "http"),
];

/// Production adapter: reads the file, parses it as ELF via `goblin`, and
/// inspects the dynamic symbol table.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoblinNetworkAnalyzer;

impl NetworkSymbolAnalyzer for GoblinNetworkAnalyzer {
    fn analyze_network_symbols(&self, absolute_path: &Path) -> ElfAnalysis {
        let bytes = match fs::read(absolute_path) {
            Ok(b) => b,
            Err(e) => return ElfAnalysis::error(format!("reading {}: {e}", absolute_path.display())),
        };

        let elf = match Object::parse(&bytes) {
            Ok(Object::Elf(elf)) => elf,
            Ok(_) => return ElfAnalysis::simple(ElfAnalysisResult::NotELFBinary),
            Err(_) => return ElfAnalysis::simple(ElfAnalysisResult::NotELFBinary),
        };

        if elf.dynsyms.is_empty() && elf.libraries.is_empty() {
            return ElfAnalysis::simple(ElfAnalysisResult::StaticBinary);
        }

        let mut hits = Vec::new();
        for sym in elf.dynsyms.iter() {
            let Some(name) = elf.dynstrtab.get_at(sym.st_name) else { continue };
            if let Some((_, category)) = NETWORK_SYMBOLS.iter().find(|(n, _)| *n == name) {
                hits.push(SymbolHit { name: name.to_string(), category: category.to_string() });
            }
        }

        if hits.is_empty() {
            ElfAnalysis { result: ElfAnalysisResult::NoNetworkSymbols, symbols: hits, err: None }
        } else {
            ElfAnalysis { result: ElfAnalysisResult::NetworkDetected, symbols: hits, err: None }
        }
    }
}

/// Applies the spec §4.4 policy to an analysis result: scripts and static
/// binaries cannot be decided from dynamic symbols (not network); an
/// inconclusive analysis is fail-safe (treated as network, per spec §7
/// class 3 "failures... are upgraded").
pub fn is_network_per_policy(analysis: &ElfAnalysis) -> bool {
    match analysis.result {
        ElfAnalysisResult::NetworkDetected => true,
        ElfAnalysisResult::NoNetworkSymbols | ElfAnalysisResult::NotELFBinary | ElfAnalysisResult::StaticBinary => false,
        ElfAnalysisResult::AnalysisError => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub(ElfAnalysisResult);
    impl NetworkSymbolAnalyzer for Stub {
        fn analyze_network_symbols(&self, _absolute_path: &Path) -> ElfAnalysis {
            ElfAnalysis::simple(self.0)
        }
    }

    #[test]
    fn network_detected_is_network() {
        assert!(is_network_per_policy(&ElfAnalysis::simple(ElfAnalysisResult::NetworkDetected)));
    }

    #[test]
    fn static_and_script_and_no_symbols_are_not_network() {
        assert!(!is_network_per_policy(&ElfAnalysis::simple(ElfAnalysisResult::StaticBinary)));
        assert!(!is_network_per_policy(&ElfAnalysis::simple(ElfAnalysisResult::NotELFBinary)));
        assert!(!is_network_per_policy(&ElfAnalysis::simple(ElfAnalysisResult::NoNetworkSymbols)));
    }

    #[test]
    fn analysis_error_is_fail_safe_network() {
        assert!(is_network_per_policy(&ElfAnalysis::error("boom")));
    }

    #[test]
    fn non_elf_file_reports_not_elf_binary() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("script.sh");
        std::fs::write(&script, b"#!/bin/sh\necho hi\n").unwrap();
        let analysis = GoblinNetworkAnalyzer.analyze_network_symbols(&script);
        assert_eq!(analysis.result, ElfAnalysisResult::NotELFBinary);
    }

    #[test]
    fn missing_file_reports_analysis_error() {
        let analysis = GoblinNetworkAnalyzer.analyze_network_symbols(Path::new("/nonexistent/binary"));
        assert_eq!(analysis.result, ElfAnalysisResult::AnalysisError);
        assert!(analysis.err.is_some());
    }

    // Stub-based sanity check that the trait object boundary works as C5 expects.
    #[test]
    fn boxed_trait_object_dispatches() {
        let analyzer: Box<dyn NetworkSymbolAnalyzer> = Box::new(Stub(ElfAnalysisResult::NetworkDetected));
        let analysis = analyzer.analyze_network_symbols(Path::new("/bin/true"));
        assert!(is_network_per_policy(&analysis));
    }
}
