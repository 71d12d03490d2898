// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Ledger Status Codes
//!
//! The verdicts the network hands back in receipts. A receipt with
//! [`LedgerStatus::Success`] means consensus executed the operation;
//! anything else is a refusal, and the code says why.
//!
//! The display form is the network's own SCREAMING_SNAKE rendering so that
//! log lines grep the same here and in mirror explorers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome code carried by every receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerStatus {
    /// Consensus reached and the operation executed.
    Success,

    /// The named account does not exist on the ledger.
    InvalidAccount,
    /// The named token does not exist on the ledger.
    InvalidToken,
    /// The named file does not exist on the ledger.
    InvalidFile,
    /// The named schedule does not exist on the ledger.
    InvalidSchedule,

    /// A required signature was missing or did not verify.
    InvalidSignature,
    /// The paying or sending account cannot cover the amount.
    InsufficientBalance,
    /// Account creation asked for a negative starting balance.
    InvalidInitialBalance,
    /// The transfer's debits and credits do not net to zero.
    UnbalancedTransfer,
    /// The memo exceeds the network's length ceiling.
    MemoTooLong,

    /// The account holds no relationship with the token.
    TokenNotAssociated,
    /// The account already holds a relationship with the token.
    TokenAlreadyAssociated,
    /// The relationship exists but is frozen for this account.
    AccountFrozenForToken,
    /// The token is paused; no operations until unpaused.
    TokenPaused,
    /// Dissociation requires the token balance to be zero first.
    TokenBalanceNotZero,
    /// The sender does not own the serial-numbered unit being moved.
    UnitNotOwned,

    /// The schedule already executed; further signatures are meaningless.
    ScheduleAlreadyExecuted,
    /// The countersignature added nothing the schedule did not have.
    NoNewValidSignatures,

    /// No receipt is known for the requested transaction id.
    ReceiptNotFound,
    /// No record is known for the requested transaction id.
    RecordNotFound,
}

impl LedgerStatus {
    /// True only for [`LedgerStatus::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, LedgerStatus::Success)
    }
}

impl fmt::Display for LedgerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::Success => "SUCCESS",
            Self::InvalidAccount => "INVALID_ACCOUNT",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::InvalidFile => "INVALID_FILE",
            Self::InvalidSchedule => "INVALID_SCHEDULE",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::InsufficientBalance => "INSUFFICIENT_BALANCE",
            Self::InvalidInitialBalance => "INVALID_INITIAL_BALANCE",
            Self::UnbalancedTransfer => "UNBALANCED_TRANSFER",
            Self::MemoTooLong => "MEMO_TOO_LONG",
            Self::TokenNotAssociated => "TOKEN_NOT_ASSOCIATED",
            Self::TokenAlreadyAssociated => "TOKEN_ALREADY_ASSOCIATED",
            Self::AccountFrozenForToken => "ACCOUNT_FROZEN_FOR_TOKEN",
            Self::TokenPaused => "TOKEN_PAUSED",
            Self::TokenBalanceNotZero => "TOKEN_BALANCE_NOT_ZERO",
            Self::UnitNotOwned => "UNIT_NOT_OWNED",
            Self::ScheduleAlreadyExecuted => "SCHEDULE_ALREADY_EXECUTED",
            Self::NoNewValidSignatures => "NO_NEW_VALID_SIGNATURES",
            Self::ReceiptNotFound => "RECEIPT_NOT_FOUND",
            Self::RecordNotFound => "RECORD_NOT_FOUND",
        };
        f.write_str(code)
    }
}
