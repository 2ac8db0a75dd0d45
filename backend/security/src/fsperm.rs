//! C7 — Directory & Output Path Validator.
//!
//! Filesystem-permission checks for two distinct concerns: is a directory
//! safe to trust on the way to a binary (spec §4.7 ancestor walk), and is a
//! given output path safe to write to (spec §4.7 write-permission + risk
//! evaluation).

use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::Path;

use cmdgate_core::{GateError, GateResult, RiskLevel};

const WORLD_WRITABLE: u32 = 0o002;
const GROUP_WRITABLE: u32 = 0o020;
const OWNER_WRITABLE: u32 = 0o200;

/// Walks every ancestor of `dir` (from `dir` itself up to the filesystem
/// root) rejecting symlinked components, non-directories, world-writable
/// directories (unless `permissive`), group-writable directories not owned
/// `uid = gid = 0`, and owner-writable directories not owned by root — a
/// directory trusted enough to sit on the path to a binary must be writable
/// by nobody but root.
pub fn validate_directory_permissions(dir: &Path, permissive: bool) -> GateResult<()> {
    let mut current = dir.to_path_buf();
    loop {
        let meta = fs::symlink_metadata(&current)?;
        if meta.file_type().is_symlink() {
            return Err(GateError::InsecurePathComponent(current));
        }
        if !meta.file_type().is_dir() {
            return Err(GateError::InvalidDirPermissions {
                path: current,
                detail: "not a directory".to_string(),
            });
        }
        let mode = meta.permissions().mode();
        if mode & WORLD_WRITABLE != 0 && !permissive {
            return Err(GateError::InvalidDirPermissions {
                path: current,
                detail: "world-writable".to_string(),
            });
        }
        if mode & GROUP_WRITABLE != 0 && !(meta.uid() == 0 && meta.gid() == 0) {
            return Err(GateError::InvalidDirPermissions {
                path: current,
                detail: "group-writable directory not owned uid=gid=0".to_string(),
            });
        }
        if mode & OWNER_WRITABLE != 0 && meta.uid() != 0 {
            return Err(GateError::InvalidDirPermissions {
                path: current,
                detail: "owner-writable directory not owned by root".to_string(),
            });
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent.to_path_buf(),
            _ => break,
        }
    }
    Ok(())
}

/// True when `uid`'s primary or supplementary group is `gid`.
fn user_in_group(uid: u32, gid: u32) -> bool {
    use nix::unistd::{Gid, Group, Uid, User};

    let Ok(Some(user)) = User::from_uid(Uid::from_raw(uid)) else { return false };
    if user.gid.as_raw() == gid {
        return true;
    }
    let Ok(Some(group)) = Group::from_gid(Gid::from_raw(gid)) else { return false };
    group.mem.iter().any(|member| *member == user.name)
}

/// Walks up from `path` to the nearest ancestor that actually exists (the
/// file itself usually doesn't yet), then applies the POSIX three-tier
/// write check (owner / group / other) against `real_uid`.
pub fn validate_output_write_permission(path: &Path, real_uid: u32) -> GateResult<()> {
    let mut current = path.to_path_buf();
    loop {
        if current.exists() {
            break;
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent.to_path_buf(),
            _ => return Err(GateError::NoExistingDirectoryInPathHierarchy(path.to_path_buf())),
        }
    }

    let meta = fs::metadata(&current)?;
    let mode = meta.permissions().mode();
    let file_uid = meta.uid();
    let file_gid = meta.gid();

    let writable = if real_uid == 0 {
        true
    } else if real_uid == file_uid {
        mode & OWNER_WRITABLE != 0
    } else if user_in_group(real_uid, file_gid) {
        mode & GROUP_WRITABLE != 0
    } else {
        mode & WORLD_WRITABLE != 0
    };

    if writable {
        Ok(())
    } else {
        Err(GateError::InvalidDirPermissions {
            path: current,
            detail: format!("uid {real_uid} lacks write permission"),
        })
    }
}

/// Path substrings that make an output destination catastrophic if
/// overwritten (spec §4.7 "critical path table") — credential and
/// authentication material, and core system directories, not just
/// "sensitive" configuration.
pub const CRITICAL_OUTPUT_PATH_SUBSTRINGS: &[&str] = &[
    "/etc/passwd",
    "/etc/shadow",
    "/etc/sudoers",
    "/boot/",
    "/sys/",
    "/proc/",
    "/root/",
    "/etc/",
    "/usr/bin/",
    "/usr/sbin/",
    "/bin/",
    "/sbin/",
    "/lib/",
    "/lib64/",
    "authorized_keys",
    "id_rsa",
    "id_ed25519",
    ".ssh/",
    "private_key",
    "secret_key",
    ".bashrc",
    ".zshrc",
    ".login",
    ".profile",
    ".gnupg/",
    ".aws/credentials",
    ".kube/config",
    ".docker/config.json",
    "wallet.dat",
    "keystore",
];

/// Path substrings that are sensitive but recoverable (spec §4.7 "high-risk
/// path table") — log data, not credential stores or core system paths.
pub const HIGH_RISK_OUTPUT_PATH_SUBSTRINGS: &[&str] = &["/var/log/"];

/// `EvaluateOutputSecurityRisk(path, workDir)` (spec §4.7): an empty `path`,
/// or a relative `path` with no `work_dir` to resolve against, is treated
/// fail-safe as `High`. Otherwise critical/high tables take precedence
/// (matched case-insensitively); failing that, the path is Low risk inside
/// `work_dir` or the user's home, Medium everywhere else.
pub fn evaluate_output_security_risk(path: &Path, work_dir: &Path) -> RiskLevel {
    if path.as_os_str().is_empty() {
        return RiskLevel::High;
    }
    let resolved = if path.is_relative() {
        if work_dir.as_os_str().is_empty() {
            return RiskLevel::High;
        }
        work_dir.join(path)
    } else {
        path.to_path_buf()
    };

    let haystack = resolved.to_string_lossy().to_lowercase();
    if CRITICAL_OUTPUT_PATH_SUBSTRINGS.iter().any(|s| haystack.contains(&s.to_lowercase())) {
        return RiskLevel::Critical;
    }
    if HIGH_RISK_OUTPUT_PATH_SUBSTRINGS.iter().any(|s| haystack.contains(&s.to_lowercase())) {
        return RiskLevel::High;
    }
    if resolved.starts_with(work_dir) {
        return RiskLevel::Low;
    }
    if let Some(home) = std::env::var_os("HOME") {
        if resolved.starts_with(Path::new(&home)) {
            return RiskLevel::Low;
        }
    }
    RiskLevel::Medium
}

/// Sorted, deduplicated basenames derived from the critical-paths table,
/// excluding directory entries (spec §4.7). A derived view, not an
/// independently maintained list, so the two can't drift apart.
pub fn suspicious_file_patterns() -> Vec<String> {
    let mut names: Vec<String> = CRITICAL_OUTPUT_PATH_SUBSTRINGS
        .iter()
        .filter(|s| !s.ends_with('/'))
        .filter_map(|s| Path::new(s).file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect();
    names.sort();
    names.dedup();
    names
}
