// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Key Lists
//!
//! A [`KeyList`] is the ledger's multi-party authorization structure: an
//! ordered set of public keys plus an optional signing threshold. With a
//! threshold of `t`, any `t` distinct member signatures authorize the
//! operation. Without one, every member must sign.
//!
//! The list preserves insertion order because the network renders keys in
//! the order they were registered, and deduplicates because a key listed
//! twice must not count twice toward its own threshold.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::keys::keypair::PublicKey;

/// Ways a key list can be structurally invalid. Caught at construction so
/// that a bad threshold never reaches the network.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyListError {
    /// The threshold must satisfy `1 <= threshold <= size`.
    #[error("threshold {threshold} out of range for a list of {size} keys")]
    ThresholdOutOfRange { threshold: usize, size: usize },
}

/// An ordered, deduplicated collection of public keys with an optional
/// signing threshold.
///
/// `threshold: None` means unanimity. The distinction matters on-ledger:
/// a plain list and a threshold list of `t == n` behave the same today but
/// render differently in account info and diverge the moment a key is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyList {
    keys: Vec<PublicKey>,
    threshold: Option<usize>,
}

impl KeyList {
    /// Builds a unanimity list. Duplicates collapse to their first
    /// occurrence.
    pub fn new(keys: Vec<PublicKey>) -> Self {
        Self {
            keys: dedup_preserving_order(keys),
            threshold: None,
        }
    }

    /// Builds a threshold list. The threshold is validated against the
    /// deduplicated size, so passing the same key three times does not buy
    /// room for a threshold of three.
    pub fn with_threshold(keys: Vec<PublicKey>, threshold: usize) -> Result<Self, KeyListError> {
        let keys = dedup_preserving_order(keys);
        if threshold == 0 || threshold > keys.len() {
            return Err(KeyListError::ThresholdOutOfRange {
                threshold,
                size: keys.len(),
            });
        }
        Ok(Self {
            keys,
            threshold: Some(threshold),
        })
    }

    /// A list holding exactly one key. Shorthand for the common case of
    /// wrapping a single account key.
    pub fn single(key: PublicKey) -> Self {
        Self::new(vec![key])
    }

    /// The member keys, in registration order.
    pub fn keys(&self) -> &[PublicKey] {
        &self.keys
    }

    /// The configured threshold, if any.
    pub fn threshold(&self) -> Option<usize> {
        self.threshold
    }

    /// Number of member keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when the list holds no keys at all.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether the given key is a member.
    pub fn contains(&self, key: &PublicKey) -> bool {
        self.keys.contains(key)
    }

    /// How many distinct member signatures satisfy this list.
    pub fn required_signatures(&self) -> usize {
        self.threshold.unwrap_or(self.keys.len())
    }

    /// Whether the given signers satisfy the list.
    ///
    /// Signers outside the list are ignored; they neither help nor hurt.
    /// Repeated signers count once. An empty list is vacuously satisfied,
    /// which is why construction call sites refuse to build one where
    /// authorization is actually required.
    pub fn satisfied_by<'a, I>(&self, signers: I) -> bool
    where
        I: IntoIterator<Item = &'a PublicKey>,
    {
        let present: HashSet<&PublicKey> = signers.into_iter().collect();
        let covered = self.keys.iter().filter(|k| present.contains(k)).count();
        covered >= self.required_signatures()
    }

    /// Canonical byte form for inclusion in signable transaction bytes:
    /// member count (u32 LE), the member keys in order, then the threshold
    /// (u32 LE, `0` meaning unanimity; a real threshold is never zero).
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + self.keys.len() * 32);
        out.extend_from_slice(&(self.keys.len() as u32).to_le_bytes());
        for key in &self.keys {
            out.extend_from_slice(key.as_bytes());
        }
        out.extend_from_slice(&(self.threshold.unwrap_or(0) as u32).to_le_bytes());
        out
    }
}

fn dedup_preserving_order(keys: Vec<PublicKey>) -> Vec<PublicKey> {
    let mut seen = HashSet::new();
    keys.into_iter().filter(|k| seen.insert(*k)).collect()
}

// ---------------------------------------------------------------------------
// LedgerKey
// ---------------------------------------------------------------------------

/// The authorization structure an entity carries on-ledger: a single key
/// for the common case, or a [`KeyList`] for multi-party control.
///
/// The two shapes are distinct on the network. An account whose key is a
/// one-member list renders differently and grows differently than an
/// account keyed by the bare key, so the orchestrator never collapses one
/// form into the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerKey {
    /// One key controls the entity.
    Single(PublicKey),
    /// A list, possibly with a threshold, controls the entity.
    List(KeyList),
}

impl LedgerKey {
    /// Distinct member signatures required to act as this key.
    pub fn required_signatures(&self) -> usize {
        match self {
            LedgerKey::Single(_) => 1,
            LedgerKey::List(list) => list.required_signatures(),
        }
    }

    /// Whether the given signers carry this key's authority.
    pub fn satisfied_by<'a, I>(&self, signers: I) -> bool
    where
        I: IntoIterator<Item = &'a PublicKey>,
    {
        match self {
            LedgerKey::Single(key) => signers.into_iter().any(|s| s == key),
            LedgerKey::List(list) => list.satisfied_by(signers),
        }
    }

    /// Canonical byte form: a shape tag, then the key material.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        match self {
            LedgerKey::Single(key) => {
                let mut out = Vec::with_capacity(33);
                out.push(0x01);
                out.extend_from_slice(key.as_bytes());
                out
            }
            LedgerKey::List(list) => {
                let mut out = vec![0x02];
                out.extend_from_slice(&list.canonical_bytes());
                out
            }
        }
    }
}

impl From<PublicKey> for LedgerKey {
    fn from(key: PublicKey) -> Self {
        LedgerKey::Single(key)
    }
}

impl From<KeyList> for LedgerKey {
    fn from(list: KeyList) -> Self {
        LedgerKey::List(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::keypair::SigningKeypair;

    fn keys(n: u8) -> Vec<PublicKey> {
        (1..=n)
            .map(|i| SigningKeypair::from_seed(&[i; 32]).public_key())
            .collect()
    }

    #[test]
    fn test_duplicates_collapse_to_first_occurrence() {
        let ks = keys(3);
        let list = KeyList::new(vec![ks[0], ks[1], ks[0], ks[2], ks[1]]);
        assert_eq!(list.keys(), &[ks[0], ks[1], ks[2]]);
    }

    #[test]
    fn test_threshold_bounds_are_inclusive() {
        let ks = keys(3);
        assert!(KeyList::with_threshold(ks.clone(), 1).is_ok());
        assert!(KeyList::with_threshold(ks, 3).is_ok());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let err = KeyList::with_threshold(keys(3), 0).unwrap_err();
        assert_eq!(
            err,
            KeyListError::ThresholdOutOfRange {
                threshold: 0,
                size: 3
            }
        );
    }

    #[test]
    fn test_threshold_above_size_rejected() {
        let err = KeyList::with_threshold(keys(2), 3).unwrap_err();
        assert_eq!(
            err,
            KeyListError::ThresholdOutOfRange {
                threshold: 3,
                size: 2
            }
        );
    }

    #[test]
    fn test_threshold_validated_after_dedup() {
        // Three copies of one key is still a list of one.
        let k = keys(1)[0];
        let err = KeyList::with_threshold(vec![k, k, k], 2).unwrap_err();
        assert_eq!(
            err,
            KeyListError::ThresholdOutOfRange {
                threshold: 2,
                size: 1
            }
        );
    }

    #[test]
    fn test_no_threshold_means_unanimity() {
        let ks = keys(3);
        let list = KeyList::new(ks.clone());
        assert_eq!(list.required_signatures(), 3);
        assert!(!list.satisfied_by(ks[..2].iter()));
        assert!(list.satisfied_by(ks.iter()));
    }

    #[test]
    fn test_two_of_three_threshold() {
        let ks = keys(3);
        let list = KeyList::with_threshold(ks.clone(), 2).unwrap();
        assert!(!list.satisfied_by(ks[..1].iter()));
        assert!(list.satisfied_by(ks[..2].iter()));
        assert!(list.satisfied_by(ks.iter()));
    }

    #[test]
    fn test_stranger_signatures_do_not_count() {
        let ks = keys(3);
        let strangers = keys(6)[3..].to_vec();
        let list = KeyList::with_threshold(ks.clone(), 2).unwrap();
        let mut signers = strangers.clone();
        signers.push(ks[0]);
        assert!(!list.satisfied_by(signers.iter()));
    }

    #[test]
    fn test_repeated_signer_counts_once() {
        let ks = keys(3);
        let list = KeyList::with_threshold(ks.clone(), 2).unwrap();
        let repeated = vec![ks[0], ks[0], ks[0]];
        assert!(!list.satisfied_by(repeated.iter()));
    }

    #[test]
    fn test_empty_list_is_vacuously_satisfied() {
        // The math says yes with zero signers. Call sites that need real
        // authorization refuse to construct an empty list in the first place.
        let list = KeyList::new(vec![]);
        assert!(list.is_empty());
        assert!(list.satisfied_by(std::iter::empty()));
    }

    #[test]
    fn test_single_wraps_one_key() {
        let k = keys(1)[0];
        let list = KeyList::single(k);
        assert_eq!(list.len(), 1);
        assert!(list.contains(&k));
        assert_eq!(list.required_signatures(), 1);
    }

    #[test]
    fn test_ledger_key_shapes_stay_distinct() {
        let k = keys(1)[0];
        let bare = LedgerKey::Single(k);
        let wrapped = LedgerKey::List(KeyList::single(k));
        assert_ne!(bare, wrapped);
        assert_ne!(bare.canonical_bytes(), wrapped.canonical_bytes());
        assert_eq!(bare.required_signatures(), 1);
        assert_eq!(wrapped.required_signatures(), 1);
    }

    #[test]
    fn test_ledger_key_satisfaction() {
        let ks = keys(3);
        let single = LedgerKey::Single(ks[0]);
        assert!(single.satisfied_by(ks[..1].iter()));
        assert!(!single.satisfied_by(ks[1..].iter()));

        let listed = LedgerKey::List(KeyList::with_threshold(ks.clone(), 2).unwrap());
        assert!(!listed.satisfied_by(ks[..1].iter()));
        assert!(listed.satisfied_by(ks[1..].iter()));
    }

    #[test]
    fn test_canonical_bytes_distinguish_thresholds() {
        let ks = keys(3);
        let unanimous = KeyList::new(ks.clone());
        let two_of_three = KeyList::with_threshold(ks, 2).unwrap();
        assert_ne!(unanimous.canonical_bytes(), two_of_three.canonical_bytes());
    }
}
