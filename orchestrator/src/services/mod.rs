// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Ledger Services
//!
//! Task-level entry points, one module per entity family:
//!
//! - **accounts** — opening, key rotation, freezes, balances.
//! - **tokens** — associations, pause control, minting, transfers.
//! - **files** — byte storage with key-list authorization.
//!
//! Each service owns a [`TransactionEngine`](crate::transaction::TransactionEngine)
//! and speaks to the ledger only through it, so every call inherits the same
//! authorization gate, receipt polling, and tracing without repeating any
//! of it.

pub mod accounts;
pub mod files;
pub mod tokens;

pub use accounts::{AccountAuthorization, AccountCreation, AccountsService};
pub use files::FilesService;
pub use tokens::{TokensService, TransferOutcome};
