//! External collaborator consumed by C6: binds a path to an expected SHA-256
//! digest for known-good binaries (spec §4.6, §6 `ValidateFileHash`).

use std::fs;
use std::path::Path;

use cmdgate_core::{GateError, GateResult};
use sha2::{Digest, Sha256};

/// The consumed interface. Implementations decide how "expected" hashes are
/// sourced (a config file, a signed manifest, a remote attestation service);
/// the gate only needs a yes/no answer plus a detail string on mismatch.
pub trait FileHashValidator: Send + Sync {
    /// Returns `Ok(())` when `path`'s digest matches `expected_hex`,
    /// `Err(GateError::HashValidationFailed)` on mismatch or unreadable file.
    fn validate_file_hash(&self, path: &Path, expected_hex: &str) -> GateResult<()>;
}

/// Computes a file's SHA-256 digest and lower-hex-encodes it.
pub fn sha256_hex(path: &Path) -> GateResult<String> {
    let bytes = fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(hex::encode(digest))
}

/// Production validator: hashes the file on every call and compares against
/// the caller-supplied expectation. Stateless and cache-free by design —
/// callers needing caching wrap this behind their own store.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256FileHashValidator;

impl FileHashValidator for Sha256FileHashValidator {
    fn validate_file_hash(&self, path: &Path, expected_hex: &str) -> GateResult<()> {
        let actual = sha256_hex(path)?;
        if actual.eq_ignore_ascii_case(expected_hex) {
            Ok(())
        } else {
            Err(GateError::HashValidationFailed {
                path: path.to_path_buf(),
                detail: format!("expected {expected_hex}, got {actual}"),
            })
        }
    }
}
