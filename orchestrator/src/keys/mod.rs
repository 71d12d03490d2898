// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Keys & Authorization Structures
//!
//! Everything the orchestrator knows about who may authorize what:
//!
//! - **keypair** — Ed25519 keypairs, public keys, and signatures.
//! - **keylist** — ordered key collections with optional thresholds, the
//!   ledger's native multi-party authorization structure.
//! - **composer** — assembles key lists from supplied or freshly minted
//!   keys ahead of account and token creation.
//!
//! The rule of the whole module: secrets flow toward the caller, never into
//! logs, never into serialized output by accident.

pub mod composer;
pub mod keylist;
pub mod keypair;

// Re-export the everyday types so callers don't memorize the hierarchy.
pub use composer::{GeneratedKeySet, KeyComposer, KeySource};
pub use keylist::{KeyList, KeyListError, LedgerKey};
pub use keypair::{KeyError, PublicKey, Signature, SigningKeypair};
