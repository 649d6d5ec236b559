//! SHA-512 artifact verification.
//!
//! Digests are computed after the download completes, not inline with the
//! transfer. The expected digest may be hex or standard base64; feeds built
//! for electron-style updaters publish base64.

use base64::Engine;
use sha2::{Digest, Sha512};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Result, UpdateError};

const BUF_SIZE: usize = 64 * 1024;

/// Raw SHA-512 digest of a file. Reads in chunks to keep memory use bounded.
pub fn sha512_digest(path: &Path) -> Result<Vec<u8>> {
    let mut f = File::open(path)?;
    let mut hasher = Sha512::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_vec())
}

/// SHA-512 of a file as lowercase hex.
pub fn sha512_path(path: &Path) -> Result<String> {
    sha512_digest(path).map(hex::encode)
}

/// Decode an advertised digest. Hex is tried first (any case), then base64.
fn decode_expected(expected: &str) -> Option<Vec<u8>> {
    let expected = expected.trim();
    if let Ok(bytes) = hex::decode(expected) {
        return Some(bytes);
    }
    base64::engine::general_purpose::STANDARD
        .decode(expected)
        .ok()
}

/// True iff `expected` decodes to exactly `actual`.
pub fn digest_matches(expected: &str, actual: &[u8]) -> bool {
    decode_expected(expected).is_some_and(|e| e == actual)
}

/// Verify `path` against `expected`; `ChecksumMismatch` if it differs.
pub fn verify_sha512(path: &Path, expected: &str) -> Result<()> {
    let actual = sha512_digest(path)?;
    if digest_matches(expected, &actual) {
        tracing::debug!(path = %path.display(), "sha512 verified");
        Ok(())
    } else {
        Err(UpdateError::ChecksumMismatch {
            expected: expected.trim().to_string(),
            actual: hex::encode(actual),
        })
    }
}
