// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Settlement Composer
//!
//! Turns a set of movements into one atomic settlement. Two paths out:
//!
//! * a signer is at hand: the composer freezes and signs the transfer and
//!   hands it back still unsubmitted, so the caller can gather further
//!   signatures or submit as-is;
//! * no signer: the transfer is parked with ledger-native scheduling, and
//!   the network executes it once [`SettlementComposer::sign_scheduled`]
//!   countersignatures satisfy every required key.
//!
//! Conservation is the network's rule to enforce. The composer checks it
//! locally only to warn early; a non-conserving settlement is submitted
//! anyway and comes back [`crate::client::LedgerStatus::UnbalancedTransfer`].

use std::sync::Arc;

use crate::client::ids::ScheduleId;
use crate::client::info::ScheduleInfo;
use crate::client::status::LedgerStatus;
use crate::client::LedgerClient;
use crate::error::{CallerError, OrchestrationError};
use crate::keys::SigningKeypair;
use crate::settlement::movement::{net_by_asset, Movement};
use crate::transaction::engine::TransactionEngine;
use crate::transaction::lifecycle::Transaction;
use crate::transaction::payload::OperationPayload;

/// What composing a settlement produced.
#[derive(Debug)]
pub enum Settlement {
    /// Frozen and signed, not yet submitted. Submission belongs to the
    /// caller, which may still attach more signatures first.
    Signed(Transaction),
    /// Parked on the network under this schedule, awaiting
    /// countersignatures.
    Scheduled(ScheduleId),
}

/// Composes atomic multi-party settlements over a shared client.
pub struct SettlementComposer {
    engine: TransactionEngine,
}

impl SettlementComposer {
    pub fn new(client: Arc<dyn LedgerClient>) -> Self {
        Self {
            engine: TransactionEngine::new(client),
        }
    }

    pub fn engine(&self) -> &TransactionEngine {
        &self.engine
    }

    /// Composes one settlement from `movements`.
    ///
    /// Empty movements are refused before anything else happens. With
    /// `signer` the result is [`Settlement::Signed`]; without one the
    /// composer wraps the transfer in a schedule, pays for the wrapper
    /// with the operator, and returns [`Settlement::Scheduled`].
    pub async fn compose_atomic(
        &self,
        movements: Vec<Movement>,
        memo: Option<&str>,
        signer: Option<&SigningKeypair>,
    ) -> Result<Settlement, OrchestrationError> {
        if movements.is_empty() {
            return Err(CallerError::EmptyMovements.into());
        }
        let net = net_by_asset(&movements);
        if net.values().any(|&v| v != 0) {
            tracing::warn!(
                ?net,
                "settlement movements do not conserve; the network will reject this"
            );
        }

        let operator = self.engine.operator_account();
        let payload = OperationPayload::Transfer {
            movements,
            unit_transfers: vec![],
        };

        match signer {
            Some(keypair) => {
                let mut transaction = Transaction::new(payload).with_payer(operator)?;
                if let Some(memo) = memo {
                    transaction = transaction.with_memo(memo)?;
                }
                transaction.freeze()?;
                transaction.sign(keypair)?;
                Ok(Settlement::Signed(transaction))
            }
            None => {
                let mut wrapper = Transaction::new(OperationPayload::ScheduleCreate {
                    inner: Box::new(payload),
                    schedule_memo: memo.unwrap_or_default().to_string(),
                })
                .with_payer(operator)?;
                wrapper.freeze()?;
                wrapper.sign(&self.engine.client().operator().keypair)?;

                let details = self.engine.execute(wrapper).await?;
                let schedule = details
                    .receipt
                    .schedule_id
                    .ok_or_else(|| {
                        OrchestrationError::Transport(
                            "schedule receipt carried no schedule id".to_string(),
                        )
                    })?;
                tracing::info!(%schedule, "settlement parked for countersigning");
                Ok(Settlement::Scheduled(schedule))
            }
        }
    }

    /// Adds one countersignature to a parked settlement and reports the
    /// network's verdict. Premature or duplicate countersigning comes back
    /// as the corresponding status, not as an error.
    pub async fn sign_scheduled(
        &self,
        schedule: ScheduleId,
        keypair: &SigningKeypair,
    ) -> Result<LedgerStatus, OrchestrationError> {
        let operator = self.engine.operator_account();
        let mut transaction = Transaction::new(OperationPayload::ScheduleSign { schedule })
            .with_payer(operator)?;
        transaction.freeze()?;
        // The operator pays for the countersignature; the countersigner's
        // key is what the schedule actually collects.
        transaction.sign(&self.engine.client().operator().keypair)?;
        transaction.sign(keypair)?;
        self.engine.execute_for_status(transaction).await
    }

    /// Current state of a parked settlement. Query only; the composer
    /// never polls.
    pub async fn scheduled_info(
        &self,
        schedule: ScheduleId,
    ) -> Result<ScheduleInfo, OrchestrationError> {
        self.engine.client().schedule_info(schedule).await
    }
}
