// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Token Service
//!
//! Token lifecycle operations (associate, dissociate, freeze at the token
//! level via pause, mint) and the transfer surface for marks, fungible
//! tokens, and serial-numbered units.
//!
//! Transfers come in two shapes. With a signer in hand the service freezes,
//! signs, and executes on the spot, returning the network's verdict. Without
//! one it hands back the still-draft [`Transaction`] so the caller can
//! carry it to the parties who do hold keys, or park it behind a schedule
//! through the settlement composer. The service never guesses at custody.

use std::sync::Arc;

use crate::client::{
    AccountId, LedgerClient, LedgerStatus, Receipt, TokenId, TransactionDetails, UnitInfo,
};
use crate::error::{CallerError, OrchestrationError};
use crate::keys::SigningKeypair;
use crate::settlement::{Movement, UnitTransfer};
use crate::transaction::{OperationPayload, Transaction, TransactionEngine};
use crate::units::Marks;

/// What became of a requested transfer.
#[derive(Debug)]
pub enum TransferOutcome {
    /// The transfer was signed and executed; here is the verdict.
    Executed(TransactionDetails),
    /// No signer was supplied. The draft is returned untouched for the
    /// caller to route to whoever holds the keys.
    Unsigned(Transaction),
}

impl TransferOutcome {
    /// The execution details, when the transfer already ran.
    pub fn details(self) -> Option<TransactionDetails> {
        match self {
            TransferOutcome::Executed(details) => Some(details),
            TransferOutcome::Unsigned(_) => None,
        }
    }

    /// The draft transaction, when the transfer is still waiting on keys.
    pub fn draft(self) -> Option<Transaction> {
        match self {
            TransferOutcome::Executed(_) => None,
            TransferOutcome::Unsigned(transaction) => Some(transaction),
        }
    }
}

/// Token operations against a ledger client.
#[derive(Clone)]
pub struct TokensService {
    engine: TransactionEngine,
}

impl TokensService {
    pub fn new(client: Arc<dyn LedgerClient>) -> Self {
        Self {
            engine: TransactionEngine::new(client),
        }
    }

    /// The engine this service submits through.
    pub fn engine(&self) -> &TransactionEngine {
        &self.engine
    }

    /// Associates an account with a token so balances may flow to it.
    /// `key` must be the account's own key; association is opt-in.
    pub async fn associate(
        &self,
        account: AccountId,
        token: TokenId,
        key: &SigningKeypair,
    ) -> Result<LedgerStatus, OrchestrationError> {
        let payload = OperationPayload::TokenAssociate {
            account,
            tokens: vec![token],
        };
        self.execute_with(payload, &[key]).await
    }

    /// Severs an association. The network refuses while a balance remains.
    pub async fn dissociate(
        &self,
        account: AccountId,
        token: TokenId,
        key: &SigningKeypair,
    ) -> Result<LedgerStatus, OrchestrationError> {
        let payload = OperationPayload::TokenDissociate {
            account,
            tokens: vec![token],
        };
        self.execute_with(payload, &[key]).await
    }

    /// Halts every movement of a token, network-wide.
    pub async fn pause(
        &self,
        token: TokenId,
        pause_key: &SigningKeypair,
    ) -> Result<LedgerStatus, OrchestrationError> {
        self.execute_with(OperationPayload::TokenPause { token }, &[pause_key])
            .await
    }

    /// Lifts a pause set by [`pause`](TokensService::pause).
    pub async fn unpause(
        &self,
        token: TokenId,
        pause_key: &SigningKeypair,
    ) -> Result<LedgerStatus, OrchestrationError> {
        self.execute_with(OperationPayload::TokenUnpause { token }, &[pause_key])
            .await
    }

    /// Mints one serial-numbered unit carrying the given metadata into the
    /// token's treasury. The receipt names the serial the network assigned.
    pub async fn mint_unit(
        &self,
        token: TokenId,
        supply_key: &SigningKeypair,
        metadata: Vec<u8>,
    ) -> Result<Receipt, OrchestrationError> {
        let payload = OperationPayload::TokenMint {
            token,
            amount: 0,
            metadata: vec![metadata],
        };
        let mut transaction =
            Transaction::new(payload).with_payer(self.engine.operator_account())?;
        transaction.freeze()?;
        transaction.sign(&self.engine.client().operator().keypair)?;
        transaction.sign(supply_key)?;
        let details = self.engine.execute(transaction).await?;
        tracing::info!(token = %token, serials = ?details.receipt.serials, "unit minted");
        Ok(details.receipt)
    }

    /// Ownership and metadata of one serial-numbered unit.
    pub async fn unit_info(
        &self,
        token: TokenId,
        serial: i64,
    ) -> Result<UnitInfo, OrchestrationError> {
        self.engine.client().unit_info(token, serial).await
    }

    /// Moves marks between two accounts.
    pub async fn transfer_marks(
        &self,
        amount: Marks,
        from: AccountId,
        to: AccountId,
        memo: Option<&str>,
        signer: Option<&SigningKeypair>,
    ) -> Result<TransferOutcome, OrchestrationError> {
        let payload = OperationPayload::Transfer {
            movements: vec![Movement::native(from, -amount), Movement::native(to, amount)],
            unit_transfers: vec![],
        };
        self.settle(payload, memo, signer).await
    }

    /// Moves a fungible token amount expressed in display units.
    ///
    /// `amount` is scaled by `10^decimals` into the token's smallest
    /// denomination before it touches the wire; an amount that overflows
    /// the scale is a caller error, not a network question.
    pub async fn transfer_token(
        &self,
        token: TokenId,
        from: AccountId,
        to: AccountId,
        amount: i64,
        decimals: u32,
        memo: Option<&str>,
        signer: Option<&SigningKeypair>,
    ) -> Result<TransferOutcome, OrchestrationError> {
        let raw = 10_i64
            .checked_pow(decimals)
            .and_then(|scale| amount.checked_mul(scale))
            .ok_or(CallerError::AmountOutOfRange { decimals })?;
        let payload = OperationPayload::Transfer {
            movements: vec![
                Movement::token(from, token, -raw),
                Movement::token(to, token, raw),
            ],
            unit_transfers: vec![],
        };
        self.settle(payload, memo, signer).await
    }

    /// Moves one serial-numbered unit to a new owner.
    pub async fn transfer_unit(
        &self,
        token: TokenId,
        from: AccountId,
        to: AccountId,
        serial: i64,
        signer: Option<&SigningKeypair>,
    ) -> Result<TransferOutcome, OrchestrationError> {
        let payload = OperationPayload::Transfer {
            movements: vec![],
            unit_transfers: vec![UnitTransfer {
                token,
                serial,
                from,
                to,
            }],
        };
        self.settle(payload, None, signer).await
    }

    /// Builds a transfer with the operator as payer, then either executes
    /// it or hands the draft back, depending on whether a signer came along.
    async fn settle(
        &self,
        payload: OperationPayload,
        memo: Option<&str>,
        signer: Option<&SigningKeypair>,
    ) -> Result<TransferOutcome, OrchestrationError> {
        let mut transaction =
            Transaction::new(payload).with_payer(self.engine.operator_account())?;
        if let Some(memo) = memo {
            transaction = transaction.with_memo(memo)?;
        }
        let Some(signer) = signer else {
            return Ok(TransferOutcome::Unsigned(transaction));
        };
        transaction.freeze()?;
        transaction.sign(&self.engine.client().operator().keypair)?;
        transaction.sign(signer)?;
        let details = self.engine.execute(transaction).await?;
        Ok(TransferOutcome::Executed(details))
    }

    async fn execute_with(
        &self,
        payload: OperationPayload,
        signers: &[&SigningKeypair],
    ) -> Result<LedgerStatus, OrchestrationError> {
        let mut transaction =
            Transaction::new(payload).with_payer(self.engine.operator_account())?;
        transaction.freeze()?;
        transaction.sign(&self.engine.client().operator().keypair)?;
        for signer in signers {
            transaction.sign(signer)?;
        }
        self.engine.execute_for_status(transaction).await
    }
}
