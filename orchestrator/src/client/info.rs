// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Entity Read Models
//!
//! Snapshots of on-ledger state as the query surface reports it. These are
//! plain data; nothing here can mutate the ledger.

use serde::{Deserialize, Serialize};

use crate::client::ids::{AccountId, FileId, ScheduleId, TokenId};
use crate::keys::{KeyList, LedgerKey, PublicKey};
use crate::transaction::lifecycle::{Timestamp, TransactionId};
use crate::units::Marks;

/// One token position within an account balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub token: TokenId,
    /// Balance in the token's smallest units.
    pub amount: i64,
    /// Decimal places between the smallest unit and the display unit.
    pub decimals: u32,
}

/// An account's native balance plus its token positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account: AccountId,
    pub balance: Marks,
    pub tokens: Vec<TokenBalance>,
}

impl AccountBalance {
    /// Position in `token`, or `None` when the account has no relationship
    /// with it.
    pub fn token_amount(&self, token: TokenId) -> Option<i64> {
        self.tokens.iter().find(|t| t.token == token).map(|t| t.amount)
    }
}

/// Full account snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub account: AccountId,
    /// The key (or key structure) that authorizes changes to this account.
    pub key: LedgerKey,
    pub balance: Marks,
    pub memo: String,
}

/// File metadata; contents are fetched separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub file: FileId,
    pub size: u64,
    /// Keys that may update or delete the file.
    pub keys: KeyList,
    pub memo: String,
    pub deleted: bool,
}

/// A single serial-numbered unit of a unique token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitInfo {
    pub token: TokenId,
    pub serial: i64,
    pub owner: AccountId,
    pub metadata: Vec<u8>,
    pub minted_at: Timestamp,
}

/// State of a parked (scheduled) transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleInfo {
    pub schedule: ScheduleId,
    pub creator: AccountId,
    /// Account that will pay when the inner transaction executes.
    pub payer: AccountId,
    /// Id the inner transaction will run (or ran) under.
    pub scheduled_transaction_id: TransactionId,
    /// Keys whose signatures the schedule has gathered so far.
    pub signers: Vec<PublicKey>,
    pub memo: String,
    /// Set once the inner transaction has executed.
    pub executed_at: Option<Timestamp>,
}

impl ScheduleInfo {
    pub fn is_executed(&self) -> bool {
        self.executed_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_amount_lookup() {
        let balance = AccountBalance {
            account: AccountId::new(0, 1001),
            balance: Marks::from_marks(1),
            tokens: vec![TokenBalance {
                token: TokenId::new(0, 500),
                amount: 250,
                decimals: 2,
            }],
        };
        assert_eq!(balance.token_amount(TokenId::new(0, 500)), Some(250));
        assert_eq!(balance.token_amount(TokenId::new(0, 501)), None);
    }

    #[test]
    fn test_schedule_is_executed_once_timestamped() {
        let mut info = ScheduleInfo {
            schedule: ScheduleId::new(0, 800),
            creator: AccountId::new(0, 1001),
            payer: AccountId::new(0, 1001),
            scheduled_transaction_id: "0.1001@1700000000.000000001".parse().unwrap(),
            signers: vec![],
            memo: String::new(),
            executed_at: None,
        };
        assert!(!info.is_executed());
        info.executed_at = Some(Timestamp::new(1_700_000_100, 0));
        assert!(info.is_executed());
    }
}
