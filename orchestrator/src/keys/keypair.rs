// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Keypairs
//!
//! Ed25519 keypair generation and serialization for ledger identities.
//!
//! Every account key, every co-signer, every schedule countersignature on
//! the network traces back to one of these. The orchestrator never invents
//! its own cryptography; this module is a thin, opinionated wrapper around
//! ed25519-dalek.
//!
//! ## Security considerations
//!
//! - Key generation uses the OS RNG (`OsRng`). If your OS RNG is broken,
//!   this crate is the least of your worries.
//! - Secret key bytes are never logged and never appear in `Debug` output.
//!   If you add logging to this module, you will be asked to leave.

use std::fmt;
use std::hash::{Hash, Hasher};

use ed25519_dalek::{
    Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from key material handling.
///
/// Deliberately vague about the details. Error messages that describe key
/// material are a classic way to leak it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or malformed encoding")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,
}

/// An Ed25519 keypair that can authorize ledger operations.
///
/// Intentionally does NOT implement `Serialize`. Writing a secret key
/// anywhere should be a deliberate act, done through [`secret_hex`]
/// (or [`secret_bytes`]) by someone who read this sentence first.
///
/// [`secret_hex`]: Self::secret_hex
/// [`secret_bytes`]: Self::secret_bytes
///
/// # Examples
///
/// ```
/// use meridian_orchestrator::keys::keypair::SigningKeypair;
///
/// let kp = SigningKeypair::generate();
/// let sig = kp.sign(b"transfer 5 marks to treasury");
/// assert!(kp.public_key().verify(b"transfer 5 marks to treasury", &sig));
/// ```
pub struct SigningKeypair {
    signing_key: SigningKey,
}

/// The public half of a keypair, safe to share, publish, or put on-ledger
/// as an account key.
///
/// Ordered and hashable so signature sets can be keyed by signer. The
/// ordering is plain byte order; it carries no meaning beyond determinism.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PublicKey {
    bytes: [u8; 32],
}

/// An Ed25519 signature over a message.
///
/// Deterministic for a given (key, message) pair, which is why signing the
/// same frozen transaction twice with the same key is harmlessly idempotent.
/// Stored as `Vec<u8>` for serde compatibility; anything that is not exactly
/// 64 bytes simply fails verification, no panics involved.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    bytes: Vec<u8>,
}

impl SigningKeypair {
    /// Generates a fresh keypair from the OS cryptographic RNG.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Builds a keypair deterministically from a 32-byte seed.
    ///
    /// In Ed25519 the secret key *is* the seed. Useful for test fixtures
    /// and for keys recovered from external derivation schemes. A weak seed
    /// is a weak key; choose accordingly.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Reconstructs a keypair from raw 32-byte secret material.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let arr: [u8; SECRET_KEY_LENGTH] =
            bytes.try_into().map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self::from_seed(&arr))
    }

    /// Reconstructs a keypair from a hex-encoded secret key, the format the
    /// operator environment variable and the keytool key files use.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str).map_err(|_| KeyError::InvalidSecretKey)?;
        Self::from_bytes(&bytes)
    }

    /// The public key this keypair signs as.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// Signs a message. Ed25519 signatures need no randomness at signing
    /// time, so this cannot fail and never varies for the same input.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let sig = self.signing_key.sign(message);
        Signature {
            bytes: sig.to_bytes().to_vec(),
        }
    }

    /// Exports the raw 32-byte secret. Handle with extreme care; this is
    /// the whole identity.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Exports the secret key as lowercase hex. Same warnings as
    /// [`secret_bytes`](Self::secret_bytes), now in a grep-friendlier format.
    pub fn secret_hex(&self) -> String {
        hex::encode(self.secret_bytes())
    }
}

impl Clone for SigningKeypair {
    /// Cloning a keypair is allowed but should make you slightly
    /// uncomfortable. Every copy is another thing to protect.
    fn clone(&self) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&self.signing_key.to_bytes()),
        }
    }
}

impl fmt::Debug for SigningKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Secret material never reaches debug output, not even partially.
        // A partial leak is still a leak.
        write!(f, "SigningKeypair(pub={})", self.public_key().to_hex())
    }
}

impl PartialEq for SigningKeypair {
    /// Keypairs compare by public key. Comparing secret material byte by
    /// byte in non-constant time is a habit not worth forming.
    fn eq(&self, other: &Self) -> bool {
        self.public_key() == other.public_key()
    }
}

impl Eq for SigningKeypair {}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

impl PublicKey {
    /// Wraps raw bytes without curve validation. For bytes of unknown
    /// provenance use [`try_from_slice`](Self::try_from_slice) instead.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Validates and wraps a byte slice. Rejects wrong lengths and byte
    /// strings that are not a point on the curve.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; 32] = slice.try_into().map_err(|_| KeyError::InvalidPublicKey)?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Verifies a signature against this key. Boolean because callers want
    /// a verdict, not a taxonomy of the ways a forgery can be wrong.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let sig_bytes: [u8; 64] = match signature.bytes.as_slice().try_into() {
            Ok(b) => b,
            Err(_) => return false,
        };
        verifying_key
            .verify(message, &DalekSignature::from_bytes(&sig_bytes))
            .is_ok()
    }

    /// Hex-encoded key, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parses a hex-encoded public key.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidPublicKey)?;
        Self::try_from_slice(&bytes)
    }
}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

impl Signature {
    /// Wraps a raw 64-byte signature.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// The raw signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Hex-encoded signature, 128 characters for a valid one.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Parses a hex-encoded signature. Length-checked so that a truncated
    /// paste fails here rather than as a confusing verification miss later.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 64 {
            return Err(hex::FromHexError::OddLength);
        }
        Ok(Self { bytes })
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        if hex_str.len() >= 128 {
            write!(f, "Signature({}...{})", &hex_str[..8], &hex_str[120..])
        } else {
            write!(f, "Signature({})", hex_str)
        }
    }
}
