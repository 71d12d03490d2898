// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Key Composition
//!
//! Builds the key material an account or token needs before it exists:
//! either by wrapping public keys the parties already control, or by minting
//! fresh keypairs on their behalf.
//!
//! When the composer generates keys, the secrets come back to the caller in
//! the result and nowhere else. The orchestrator does not keep them, write
//! them, or log them; custody is the caller's job from that moment on.

use crate::keys::keylist::{KeyList, KeyListError};
use crate::keys::keypair::{PublicKey, SigningKeypair};

/// Where the member keys of a new key list come from.
#[derive(Debug)]
pub enum KeySource {
    /// Public keys the parties already hold. No secrets change hands.
    Supplied(Vec<PublicKey>),
    /// Mint this many fresh keypairs and return the secrets to the caller.
    Generate(usize),
}

/// The outcome of composing a key list.
///
/// `private_keys` is empty unless the composer generated the keys itself,
/// in which case it holds one keypair per list member, in list order.
#[derive(Debug)]
pub struct GeneratedKeySet {
    pub key_list: KeyList,
    pub private_keys: Vec<SigningKeypair>,
}

/// Stateless factory for keys and key lists.
pub struct KeyComposer;

impl KeyComposer {
    /// Mints a single fresh keypair.
    pub fn generate_key() -> SigningKeypair {
        SigningKeypair::generate()
    }

    /// Composes a key list from the given source.
    ///
    /// `Generate(0)` and `Supplied(empty)` both yield an empty list
    /// successfully. That is deliberate: whether an empty authorization
    /// structure is acceptable depends on what it will guard, so the
    /// decision belongs to the call site, not here. A threshold is always
    /// validated against the final list size, including against an empty
    /// one.
    pub fn compose(
        source: KeySource,
        threshold: Option<usize>,
    ) -> Result<GeneratedKeySet, KeyListError> {
        let (publics, privates) = match source {
            KeySource::Supplied(keys) => (keys, Vec::new()),
            KeySource::Generate(count) => {
                let privates: Vec<SigningKeypair> =
                    (0..count).map(|_| SigningKeypair::generate()).collect();
                let publics = privates.iter().map(|kp| kp.public_key()).collect();
                (publics, privates)
            }
        };

        let key_list = match threshold {
            Some(t) => KeyList::with_threshold(publics, t)?,
            None => KeyList::new(publics),
        };

        Ok(GeneratedKeySet {
            key_list,
            private_keys: privates,
        })
    }
}
