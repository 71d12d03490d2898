// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Hashing Utilities
//!
//! One hash family, used in one place: transaction bodies are identified by
//! `SHA-256(SHA-256(bytes))`, matching what the network computes over the
//! submitted bytes. Nothing else in the orchestrator hashes anything, and
//! we would like to keep it that way.

use sha2::{Digest, Sha256};

/// SHA-256 digest of the input.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Double SHA-256: `SHA-256(SHA-256(data))`. The network identifies
/// transaction bodies by this digest, so the orchestrator computes the same
/// one to correlate local state with receipts and records.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}
