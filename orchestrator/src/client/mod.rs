// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Ledger Client
//!
//! Everything that talks to (or stands in for) the remote network lives
//! here: entity ids, consensus statuses, receipts and entity read models,
//! the [`LedgerClient`] trait the orchestration engine drives, the mirror
//! query surface, and an in-memory ledger for tests.
//!
//! The engine is written against [`LedgerClient`] so the same orchestration
//! code runs against a real gateway in production and [`InMemoryLedger`]
//! in tests.

pub mod ids;
pub mod info;
pub mod mirror;
pub mod mock;
pub mod receipt;
pub mod status;

// Re-export the common vocabulary so callers rarely need the submodules.
pub use ids::{AccountId, FileId, ScheduleId, TokenId};
pub use info::{AccountBalance, AccountInfo, FileInfo, ScheduleInfo, TokenBalance, UnitInfo};
pub use mock::InMemoryLedger;
pub use receipt::{Receipt, TransactionDetails, TransactionRecord};
pub use status::LedgerStatus;

use async_trait::async_trait;

use crate::config::OperatorConfig;
use crate::error::OrchestrationError;
use crate::transaction::lifecycle::{Transaction, TransactionId};

/// Connection to a ledger network: submission plus the queries the
/// orchestration layer needs.
///
/// Implementations must be cheap to share behind an `Arc`; the engine and
/// every service hold the same client.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// The operator identity this client signs and pays with.
    fn operator(&self) -> &OperatorConfig;

    /// Submits a frozen, authorized transaction to the network.
    ///
    /// Acceptance is not execution. A clean return means the network took
    /// the bytes; the consensus outcome arrives through [`Self::receipt_by_id`].
    async fn submit(&self, transaction: &Transaction) -> Result<(), OrchestrationError>;

    /// Fetches the consensus receipt for a submitted transaction.
    async fn receipt_by_id(&self, id: &TransactionId) -> Result<Receipt, OrchestrationError>;

    /// Fetches the full record, fee and movements included.
    async fn record_by_id(
        &self,
        id: &TransactionId,
    ) -> Result<TransactionRecord, OrchestrationError>;

    async fn account_info(&self, account: AccountId) -> Result<AccountInfo, OrchestrationError>;

    async fn account_balance(
        &self,
        account: AccountId,
    ) -> Result<AccountBalance, OrchestrationError>;

    async fn file_info(&self, file: FileId) -> Result<FileInfo, OrchestrationError>;

    async fn file_contents(&self, file: FileId) -> Result<Vec<u8>, OrchestrationError>;

    async fn unit_info(
        &self,
        token: TokenId,
        serial: i64,
    ) -> Result<UnitInfo, OrchestrationError>;

    async fn schedule_info(
        &self,
        schedule: ScheduleId,
    ) -> Result<ScheduleInfo, OrchestrationError>;
}
