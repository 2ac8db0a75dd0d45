//! C1 — Path & Identity Resolver.
//!
//! Resolves a command spec into the set of names it may match: the original
//! spec, its basename, every symlink hop, the final target, and the final
//! target's basename — capped at [`cmdgate_core::MAX_SYMLINK_DEPTH`] hops.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use cmdgate_core::{GateError, MAX_SYMLINK_DEPTH};

/// Fixed tokens that always mean "this invocation escalates privilege",
/// regardless of absolute path, because the identity set in spec §4.1
/// matches on basenames too.
pub const PRIVILEGE_ESCALATION_COMMANDS: &[&str] = &["sudo", "su", "doas"];

/// Resolves every name `cmd_name` may be known by on disk.
///
/// Never panics or propagates filesystem errors: a stat/readlink failure
/// simply stops the walk early and returns whatever was collected so far,
/// per spec §4.1 ("the function never throws").
///
/// Returns `(names, exceeded_depth)`. `exceeded_depth` is `true` only when
/// the walk consumed its entire hop budget while still facing a symlink —
/// a strong signal of a symlink-chain attack, never a quiet no-op.
pub fn extract_all_command_names(cmd_name: &str) -> (HashSet<String>, bool) {
    if cmd_name.is_empty() {
        return (HashSet::new(), false);
    }

    let mut names = HashSet::new();
    names.insert(cmd_name.to_string());
    insert_basename(&mut names, cmd_name);

    let mut current = PathBuf::from(cmd_name);
    let mut exceeded = false;

    for hop in 0..MAX_SYMLINK_DEPTH {
        let meta = match fs::symlink_metadata(&current) {
            Ok(m) => m,
            Err(_) => break,
        };
        if !meta.file_type().is_symlink() {
            break;
        }
        let target = match fs::read_link(&current) {
            Ok(t) => t,
            Err(_) => break,
        };
        let resolved = if target.is_relative() {
            current.parent().map(|p| p.join(&target)).unwrap_or(target)
        } else {
            target
        };
        let resolved_str = resolved.to_string_lossy().to_string();
        names.insert(resolved_str.clone());
        insert_basename(&mut names, &resolved_str);
        current = resolved;

        if hop == MAX_SYMLINK_DEPTH - 1 {
            exceeded = fs::symlink_metadata(&current)
                .map(|m| m.file_type().is_symlink())
                .unwrap_or(false);
        }
    }

    (names, exceeded)
}

fn insert_basename(names: &mut HashSet<String>, path: &str) {
    if let Some(name) = Path::new(path).file_name() {
        names.insert(name.to_string_lossy().to_string());
    }
}

/// Returns `(true, None)` iff the identity set contains `sudo`, `su`, or
/// `doas`; returns `(false, Some(SymlinkDepthExceeded))` when the identity
/// walk itself could not complete safely.
pub fn is_privilege_escalation_command(name: &str) -> (bool, Option<GateError>) {
    let (names, exceeded) = extract_all_command_names(name);
    if exceeded {
        return (false, Some(GateError::SymlinkDepthExceeded(PathBuf::from(name))));
    }
    let hit = PRIVILEGE_ESCALATION_COMMANDS.iter().any(|t| names.contains(*t));
    (hit, None)
}
