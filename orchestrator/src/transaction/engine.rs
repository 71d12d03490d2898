// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Orchestration Engine
//!
//! The engine is the one place transactions cross from local state machine
//! to network request. It refuses anything not frozen and fully authorized,
//! submits what remains, and turns consensus outcomes into typed results:
//! success becomes [`TransactionDetails`], a failure status becomes
//! [`OrchestrationError::Rejected`].
//!
//! Submission is split in two. [`TransactionEngine::submit`] hands bytes to
//! the network and returns a [`PendingTransaction`]; awaiting the receipt is
//! a separate step so callers can fan out submissions before blocking on
//! outcomes. [`TransactionEngine::execute`] is the common both-steps path.

use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use uuid::Uuid;

use crate::client::ids::AccountId;
use crate::client::receipt::{Receipt, TransactionDetails, TransactionRecord};
use crate::client::status::LedgerStatus;
use crate::client::LedgerClient;
use crate::error::{CallerError, OrchestrationError};
use crate::transaction::lifecycle::{Transaction, TransactionId};

/// How long to wait between receipt polls. Consensus on the real network
/// lands within a few seconds; the in-memory ledger answers immediately.
const RECEIPT_POLL_DELAY: Duration = Duration::from_millis(200);

/// Polls before a missing receipt is reported to the caller.
const RECEIPT_POLL_ATTEMPTS: usize = 25;

/// Drives frozen transactions through submission and receipt retrieval.
#[derive(Clone)]
pub struct TransactionEngine {
    client: Arc<dyn LedgerClient>,
}

impl TransactionEngine {
    pub fn new(client: Arc<dyn LedgerClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<dyn LedgerClient> {
        &self.client
    }

    /// Account the client's operator pays from.
    pub fn operator_account(&self) -> AccountId {
        self.client.operator().account
    }

    /// Submits a frozen, fully authorized transaction.
    ///
    /// The transaction is consumed: once the network holds the bytes there
    /// is nothing useful left to mutate locally. Unauthorized or unfrozen
    /// transactions are refused before any network traffic happens.
    pub async fn submit(
        &self,
        transaction: Transaction,
    ) -> Result<PendingTransaction, OrchestrationError> {
        transaction.ensure_authorized()?;
        let id = *transaction.id().ok_or(CallerError::NotFrozen)?;
        let correlation = Uuid::new_v4();

        tracing::debug!(
            transaction_id = %id,
            kind = transaction.payload().kind(),
            signatures = transaction.signature_count(),
            %correlation,
            "submitting transaction"
        );
        self.client.submit(&transaction).await?;

        Ok(PendingTransaction {
            client: Arc::clone(&self.client),
            id,
            correlation,
        })
    }

    /// Submits and waits for the consensus outcome.
    pub async fn execute(
        &self,
        transaction: Transaction,
    ) -> Result<TransactionDetails, OrchestrationError> {
        self.submit(transaction).await?.await_receipt().await
    }

    /// Executes a batch concurrently, failing fast on the first error.
    pub async fn execute_all(
        &self,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<TransactionDetails>, OrchestrationError> {
        try_join_all(transactions.into_iter().map(|tx| self.execute(tx))).await
    }

    /// Executes and reports the consensus verdict whether or not it is
    /// success. Caller mistakes and transport failures still error; only
    /// the network's judgement comes back as a plain status.
    pub async fn execute_for_status(
        &self,
        transaction: Transaction,
    ) -> Result<LedgerStatus, OrchestrationError> {
        match self.execute(transaction).await {
            Ok(details) => Ok(details.receipt.status),
            Err(OrchestrationError::Rejected { status, .. }) => Ok(status),
            Err(other) => Err(other),
        }
    }

    /// Receipt lookup by id, passed through to the client.
    pub async fn receipt_for(&self, id: &TransactionId) -> Result<Receipt, OrchestrationError> {
        self.client.receipt_by_id(id).await
    }

    /// Record lookup by id, passed through to the client.
    pub async fn record_for(
        &self,
        id: &TransactionId,
    ) -> Result<TransactionRecord, OrchestrationError> {
        self.client.record_by_id(id).await
    }
}

/// A transaction the network has accepted but not yet resolved.
pub struct PendingTransaction {
    client: Arc<dyn LedgerClient>,
    id: TransactionId,
    correlation: Uuid,
}

impl std::fmt::Debug for PendingTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingTransaction")
            .field("id", &self.id)
            .field("correlation", &self.correlation)
            .finish_non_exhaustive()
    }
}

impl PendingTransaction {
    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    /// Polls for the receipt and maps the outcome.
    ///
    /// A receipt that has simply not landed yet is retried; every other
    /// failure status is final and becomes [`OrchestrationError::Rejected`]
    /// carrying the transaction id for correlation.
    pub async fn await_receipt(self) -> Result<TransactionDetails, OrchestrationError> {
        let mut attempts = 0;
        loop {
            match self.client.receipt_by_id(&self.id).await {
                Ok(receipt) if receipt.is_success() => {
                    tracing::info!(
                        transaction_id = %self.id,
                        correlation = %self.correlation,
                        "transaction executed"
                    );
                    return Ok(TransactionDetails {
                        transaction_id: self.id,
                        receipt,
                    });
                }
                Ok(receipt) => {
                    tracing::warn!(
                        transaction_id = %self.id,
                        correlation = %self.correlation,
                        status = %receipt.status,
                        "transaction rejected"
                    );
                    return Err(OrchestrationError::Rejected {
                        status: receipt.status,
                        transaction_id: Some(self.id),
                    });
                }
                Err(OrchestrationError::Rejected {
                    status: LedgerStatus::ReceiptNotFound,
                    ..
                }) if attempts < RECEIPT_POLL_ATTEMPTS => {
                    attempts += 1;
                    tokio::time::sleep(RECEIPT_POLL_DELAY).await;
                }
                Err(other) => return Err(other),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::InMemoryLedger;
    use crate::client::AccountId;
    use crate::settlement::movement::Movement;
    use crate::transaction::payload::OperationPayload;
    use crate::units::Marks;

    fn transfer(from: AccountId, to: AccountId, amount: Marks) -> Transaction {
        Transaction::new(OperationPayload::Transfer {
            movements: vec![Movement::native(from, -amount), Movement::native(to, amount)],
            unit_transfers: vec![],
        })
    }

    #[tokio::test]
    async fn test_unfrozen_transaction_never_reaches_the_network() {
        let ledger = InMemoryLedger::start();
        let engine = TransactionEngine::new(ledger.clone());
        let operator = ledger.operator().account;

        let draft = transfer(operator, AccountId::new(0, 1002), Marks::from_marks(1))
            .with_payer(operator)
            .unwrap();
        let err = engine.execute(draft).await.unwrap_err();
        assert!(matches!(
            err,
            OrchestrationError::Caller(CallerError::NotFrozen)
        ));
        assert_eq!(ledger.submissions(), 0);
    }

    #[tokio::test]
    async fn test_unauthorized_transaction_never_reaches_the_network() {
        let ledger = InMemoryLedger::start();
        let engine = TransactionEngine::new(ledger.clone());
        let operator = ledger.operator().account;
        let recipient = ledger.register_account(Marks::ZERO);

        let mut tx = transfer(operator, recipient, Marks::from_marks(1))
            .with_payer(operator)
            .unwrap();
        tx.freeze().unwrap();
        let err = engine.execute(tx).await.unwrap_err();
        assert!(matches!(
            err,
            OrchestrationError::Caller(CallerError::SignaturesIncomplete { have: 0, need: 1 })
        ));
        assert_eq!(ledger.submissions(), 0);
    }

    #[tokio::test]
    async fn test_successful_execution_returns_details() {
        let ledger = InMemoryLedger::start();
        let engine = TransactionEngine::new(ledger.clone());
        let operator = ledger.operator().clone();
        let recipient = ledger.register_account(Marks::ZERO);

        let mut tx = transfer(operator.account, recipient, Marks::from_marks(1))
            .with_payer(operator.account)
            .unwrap();
        tx.freeze().unwrap();
        tx.sign(&operator.keypair).unwrap();

        let details = engine.execute(tx).await.unwrap();
        assert!(details.receipt.is_success());
        assert_eq!(details.transaction_id.payer(), operator.account);
        assert_eq!(ledger.submissions(), 1);
    }

    #[tokio::test]
    async fn test_rejection_carries_status_and_id() {
        let ledger = InMemoryLedger::start();
        let engine = TransactionEngine::new(ledger.clone());
        let operator = ledger.operator().clone();
        let recipient = ledger.register_account(Marks::ZERO);

        // Unbalanced on purpose.
        let mut tx = Transaction::new(OperationPayload::Transfer {
            movements: vec![Movement::native(recipient, Marks::from_marks(5))],
            unit_transfers: vec![],
        })
        .with_payer(operator.account)
        .unwrap();
        tx.freeze().unwrap();
        tx.sign(&operator.keypair).unwrap();

        match engine.execute(tx).await.unwrap_err() {
            OrchestrationError::Rejected {
                status,
                transaction_id,
            } => {
                assert_eq!(status, LedgerStatus::UnbalancedTransfer);
                assert!(transaction_id.is_some());
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
