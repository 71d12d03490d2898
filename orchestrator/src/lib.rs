// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Meridian — Orchestration Core
//!
//! Meridian builds, authorizes, and settles transactions against a remote
//! distributed ledger. The ledger reaches consensus; this crate handles
//! everything a transaction must survive before it deserves consensus:
//! canonical bytes, signatures from parties who may not trust each other,
//! and a submission gate that refuses anything not provably ready.
//!
//! ## Architecture
//!
//! One module per concern of an orchestration pipeline:
//!
//! - **keys** — Ed25519 keypairs, threshold key lists, and the composer
//!   that mints them. Secrets flow toward the caller and nowhere else.
//! - **units** — signed grain arithmetic for the native mark.
//! - **transaction** — operation payloads, the draft/frozen lifecycle,
//!   signature policies, and the engine that submits and polls receipts.
//! - **settlement** — asset movements, conservation accounting, and the
//!   composer that turns them into signed or scheduled settlements.
//! - **services** — task-level operations over accounts, tokens, and files.
//! - **client** — the ledger client trait, its read models, the mirror
//!   reader, and an in-memory network double that adjudicates like one.
//! - **config** — environment-driven configuration and protocol constants.
//! - **error** — the caller / rejected / transport error taxonomy.
//! - **hash** — the digests transaction identity rests on.
//!
//! ## Ground Rules
//!
//! 1. The network is the judge. Local checks save round trips; they never
//!    overrule the ledger.
//! 2. Frozen bytes never change. Every signature refers to bytes pinned
//!    for good.
//! 3. No secret is logged, serialized by accident, or kept beyond the call
//!    that minted it.
//! 4. If it moves value, it has tests. Plural.

pub mod client;
pub mod config;
pub mod error;
pub mod hash;
pub mod keys;
pub mod services;
pub mod settlement;
pub mod transaction;
pub mod units;
