// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Transactions
//!
//! The write path of the orchestrator. [`payload`] defines what can be
//! asked of the network, [`lifecycle`] carries a request through freezing
//! and multi-party signing, and [`engine`] submits the result and waits
//! for consensus.

pub mod engine;
pub mod lifecycle;
pub mod payload;

pub use engine::{PendingTransaction, TransactionEngine};
pub use lifecycle::{
    ExecutionContext, SignaturePolicy, Timestamp, Transaction, TransactionId,
};
pub use payload::OperationPayload;
