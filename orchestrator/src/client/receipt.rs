// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Receipts and Records
//!
//! What the network says about a transaction after consensus. A [`Receipt`]
//! is the cheap answer: final status plus any entity the operation created.
//! A [`TransactionRecord`] is the full story, including the fee actually
//! charged and every balance movement the transaction caused.

use serde::{Deserialize, Serialize};

use crate::client::ids::{AccountId, FileId, ScheduleId, TokenId};
use crate::client::status::LedgerStatus;
use crate::settlement::movement::Movement;
use crate::transaction::lifecycle::{Timestamp, TransactionId};
use crate::units::Marks;

/// Consensus outcome of a transaction.
///
/// Entity fields are populated only by the operation that creates them;
/// an account-create receipt carries `account_id`, a mint carries the new
/// `serials`, and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub status: LedgerStatus,
    pub account_id: Option<AccountId>,
    pub token_id: Option<TokenId>,
    pub file_id: Option<FileId>,
    pub schedule_id: Option<ScheduleId>,
    /// Serial numbers minted by a unique-unit mint, in mint order.
    pub serials: Vec<i64>,
    /// For schedule-create receipts, the id the inner transaction will
    /// execute under.
    pub scheduled_transaction_id: Option<TransactionId>,
}

impl Receipt {
    /// A receipt carrying `status` and nothing else.
    pub fn new(status: LedgerStatus) -> Self {
        Self {
            status,
            account_id: None,
            token_id: None,
            file_id: None,
            schedule_id: None,
            serials: Vec::new(),
            scheduled_transaction_id: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Full post-consensus record of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: TransactionId,
    pub receipt: Receipt,
    pub consensus_at: Timestamp,
    /// Fee actually charged, as opposed to the ceiling the payer offered.
    pub fee_charged: Marks,
    pub memo: String,
    /// Every movement the transaction caused, fee legs included, so the
    /// record's native movements sum to zero.
    pub transfers: Vec<Movement>,
}

/// What an executed transaction hands back to the caller: the id it ran
/// under and the receipt the network produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub transaction_id: TransactionId,
    pub receipt: Receipt,
}

impl TransactionDetails {
    pub fn status(&self) -> LedgerStatus {
        self.receipt.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_receipt_carries_only_the_status() {
        let receipt = Receipt::new(LedgerStatus::Success);
        assert!(receipt.is_success());
        assert!(receipt.account_id.is_none());
        assert!(receipt.serials.is_empty());
    }

    #[test]
    fn test_failure_statuses_are_not_success() {
        assert!(!Receipt::new(LedgerStatus::InvalidSignature).is_success());
    }

    #[test]
    fn test_receipt_serializes_with_screaming_status() {
        let receipt = Receipt {
            account_id: Some(AccountId::new(0, 4410)),
            ..Receipt::new(LedgerStatus::Success)
        };
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["status"], "SUCCESS");
        assert_eq!(json["account_id"], "0.4410");
    }
}
