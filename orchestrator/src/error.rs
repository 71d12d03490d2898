// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! Error types for the orchestration core.
//!
//! The taxonomy is deliberately three-way. A [`CallerError`] means the
//! caller handed us something unusable and nothing was sent to the network.
//! [`OrchestrationError::Rejected`] means the ledger reached a verdict and
//! the verdict was no. [`OrchestrationError::Transport`] means we never got
//! a verdict at all. Retrying is pointless for the first, wrong for the
//! second, and reasonable for the third, so callers need to be able to tell
//! them apart without string matching.

use thiserror::Error;

use crate::client::status::LedgerStatus;
use crate::keys::keylist::KeyListError;
use crate::transaction::lifecycle::TransactionId;

/// Top-level error for every fallible orchestration operation.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// The request was malformed before it could leave the process.
    #[error("caller error: {0}")]
    Caller(#[from] CallerError),

    /// The network processed the transaction and refused it.
    #[error("rejected by the ledger with status {status}")]
    Rejected {
        /// The status code the network answered with.
        status: LedgerStatus,
        /// The id of the refused transaction, when one was assigned.
        transaction_id: Option<TransactionId>,
    },

    /// The network could not be reached, or answered gibberish.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl OrchestrationError {
    /// The ledger status carried by a rejection, if this is one.
    pub fn status(&self) -> Option<LedgerStatus> {
        match self {
            OrchestrationError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Mistakes the caller made. Every variant here is detected locally, before
/// any bytes reach the network, and stays deterministic under retry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CallerError {
    /// A required identity (account, token, file, schedule) was never set.
    #[error("required identity `{field}` is unset")]
    MissingIdentity {
        /// Which parameter was missing.
        field: &'static str,
    },

    /// An authorization structure was requested with no keys at all.
    #[error("key list must contain at least one key")]
    EmptyKeyList,

    /// The key list itself was malformed.
    #[error(transparent)]
    KeyList(#[from] KeyListError),

    /// `sign` was called before `freeze` pinned the transaction bytes.
    #[error("transaction must be frozen before signing")]
    SignBeforeFreeze,

    /// A mutation was attempted on a transaction that is already frozen.
    #[error("transaction is frozen and can no longer be modified")]
    AlreadyFrozen,

    /// `submit` was called on a transaction that was never frozen.
    #[error("transaction must be frozen before submission")]
    NotFrozen,

    /// `submit` was called before the signature policy was satisfied.
    #[error("signature policy unsatisfied: have {have} of {need} required signatures")]
    SignaturesIncomplete {
        /// Distinct valid signatures collected so far.
        have: usize,
        /// Signatures the policy requires.
        need: usize,
    },

    /// A settlement was composed with no movements in it.
    #[error("settlement contains no movements")]
    EmptyMovements,

    /// A token amount overflowed the ledger's integer range once scaled to
    /// its smallest denomination.
    #[error("token amount out of range after scaling by 10^{decimals}")]
    AmountOutOfRange {
        /// The decimal scale that was applied.
        decimals: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_errors_convert_into_orchestration_errors() {
        let err: OrchestrationError = CallerError::EmptyKeyList.into();
        assert!(matches!(err, OrchestrationError::Caller(CallerError::EmptyKeyList)));
    }

    #[test]
    fn test_rejection_exposes_its_status() {
        let err = OrchestrationError::Rejected {
            status: LedgerStatus::InsufficientBalance,
            transaction_id: None,
        };
        assert_eq!(err.status(), Some(LedgerStatus::InsufficientBalance));

        let caller: OrchestrationError = CallerError::NotFrozen.into();
        assert_eq!(caller.status(), None);
    }

    #[test]
    fn test_display_names_the_missing_field() {
        let err = CallerError::MissingIdentity { field: "receiver" };
        assert_eq!(err.to_string(), "required identity `receiver` is unset");
    }

    #[test]
    fn test_incomplete_signatures_report_the_count() {
        let err = CallerError::SignaturesIncomplete { have: 1, need: 3 };
        assert!(err.to_string().contains("1 of 3"));
    }
}
