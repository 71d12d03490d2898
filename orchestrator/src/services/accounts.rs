// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Account Service
//!
//! Opens accounts, rotates their keys, toggles per-token freezes, and reads
//! balances and metadata back. This is the one place the orchestrator mints
//! key material on a caller's behalf: the secrets ride home inside
//! [`AccountCreation`] and are never persisted, logged, or copied anywhere
//! else. Custody is the caller's problem from the moment the call returns.
//!
//! Validation is deliberately thin. Whether an opening balance is payable,
//! whether a rotation is authorized, whether a freeze sticks — the ledger
//! decides all of it, and its verdict comes back as a [`LedgerStatus`] or a
//! rejection. The service only refuses what could never be valid, such as a
//! threshold larger than the key list it governs.

use std::sync::Arc;

use crate::client::{
    AccountBalance, AccountId, AccountInfo, LedgerClient, LedgerStatus, TokenId,
    TransactionDetails,
};
use crate::config::OFFLINE_SIGNING_NODE;
use crate::error::{CallerError, OrchestrationError};
use crate::keys::{GeneratedKeySet, KeyComposer, KeySource, LedgerKey, SigningKeypair};
use crate::transaction::{OperationPayload, SignaturePolicy, Transaction, TransactionEngine};
use crate::units::Marks;

// ---------------------------------------------------------------------------
// Creation results
// ---------------------------------------------------------------------------

/// The key material guarding a freshly opened account.
///
/// Secrets appear here and nowhere else. Dropping this value without saving
/// the keys orphans the account permanently.
#[derive(Debug)]
pub enum AccountAuthorization {
    /// One keypair controls the account.
    Single(SigningKeypair),
    /// A key list controls the account; member secrets ride along in list
    /// order.
    Shared(GeneratedKeySet),
}

impl AccountAuthorization {
    /// The on-ledger key structure this authorization registered.
    pub fn ledger_key(&self) -> LedgerKey {
        match self {
            AccountAuthorization::Single(keypair) => LedgerKey::Single(keypair.public_key()),
            AccountAuthorization::Shared(set) => LedgerKey::List(set.key_list.clone()),
        }
    }

    /// Every signing keypair the caller now has custody of.
    pub fn keypairs(&self) -> Vec<&SigningKeypair> {
        match self {
            AccountAuthorization::Single(keypair) => vec![keypair],
            AccountAuthorization::Shared(set) => set.private_keys.iter().collect(),
        }
    }
}

/// A new account id together with the secrets that control it.
#[derive(Debug)]
pub struct AccountCreation {
    pub account_id: AccountId,
    pub authorization: AccountAuthorization,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Account operations against a ledger client.
#[derive(Clone)]
pub struct AccountsService {
    engine: TransactionEngine,
}

impl AccountsService {
    pub fn new(client: Arc<dyn LedgerClient>) -> Self {
        Self {
            engine: TransactionEngine::new(client),
        }
    }

    /// The engine this service submits through.
    pub fn engine(&self) -> &TransactionEngine {
        &self.engine
    }

    /// Opens an account funded by the operator and returns the fresh keys.
    ///
    /// Zero signers is refused outright; that account could never spend.
    /// One signer and no threshold yields a bare keypair. More signers, or
    /// any threshold at all, composes a key list; a threshold with a single
    /// signer builds a one-member list so the threshold can be validated
    /// instead of silently dropped. The opening balance is not screened
    /// locally. A negative amount goes to the network and comes back as
    /// `InvalidInitialBalance`, the same verdict a real node would give.
    pub async fn create_account(
        &self,
        initial_balance: Marks,
        signer_count: usize,
        threshold: Option<usize>,
    ) -> Result<AccountCreation, OrchestrationError> {
        if signer_count == 0 {
            return Err(CallerError::EmptyKeyList.into());
        }
        let authorization = if signer_count > 1 || threshold.is_some() {
            let set = KeyComposer::compose(KeySource::Generate(signer_count), threshold)
                .map_err(CallerError::from)?;
            AccountAuthorization::Shared(set)
        } else {
            AccountAuthorization::Single(KeyComposer::generate_key())
        };

        let mut transaction = Transaction::new(OperationPayload::AccountCreate {
            key: authorization.ledger_key(),
            initial_balance,
            memo: String::new(),
        })
        .with_payer(self.engine.operator_account())?;
        transaction.freeze()?;
        transaction.sign(&self.engine.client().operator().keypair)?;

        let details = self.engine.execute(transaction).await?;
        let account_id = details.receipt.account_id.ok_or_else(|| {
            OrchestrationError::Transport("account receipt carried no account id".to_string())
        })?;

        tracing::info!(account = %account_id, signers = signer_count, "account opened");
        Ok(AccountCreation {
            account_id,
            authorization,
        })
    }

    /// Rotates an account's key and/or rewrites its memo.
    ///
    /// The transaction is pinned to a fixed node so any party countersigning
    /// later, possibly offline, assembles bytes against the same target.
    /// When a new key is given the policy demands both the current key and
    /// the incoming one; a rotation that the new key never endorsed would
    /// hand the account to an unproven keyholder.
    pub async fn update_account(
        &self,
        account: AccountId,
        sign_key: &SigningKeypair,
        new_key: Option<&SigningKeypair>,
        memo: Option<&str>,
    ) -> Result<LedgerStatus, OrchestrationError> {
        let policy = match new_key {
            Some(incoming) => SignaturePolicy::CurrentAndNew {
                current: sign_key.public_key(),
                new: incoming.public_key(),
            },
            None => SignaturePolicy::Single(sign_key.public_key()),
        };

        let mut transaction = Transaction::new(OperationPayload::AccountUpdate {
            account,
            new_key: new_key.map(|keypair| LedgerKey::Single(keypair.public_key())),
            memo: memo.map(str::to_string),
        })
        .with_payer(self.engine.operator_account())?
        .with_node(OFFLINE_SIGNING_NODE)?
        .with_policy(policy)?;
        transaction.freeze()?;
        transaction.sign(&self.engine.client().operator().keypair)?;
        transaction.sign(sign_key)?;
        if let Some(incoming) = new_key {
            transaction.sign(incoming)?;
        }

        self.engine.execute_for_status(transaction).await
    }

    /// Full account metadata: key, balance, memo.
    pub async fn account_info(&self, account: AccountId) -> Result<AccountInfo, OrchestrationError> {
        self.engine.client().account_info(account).await
    }

    /// Just the key structure guarding an account.
    pub async fn account_key(&self, account: AccountId) -> Result<LedgerKey, OrchestrationError> {
        Ok(self.account_info(account).await?.key)
    }

    /// The native balance plus token holdings, optionally narrowed to a
    /// single token of interest.
    pub async fn account_balance(
        &self,
        account: AccountId,
        token: Option<TokenId>,
    ) -> Result<AccountBalance, OrchestrationError> {
        let mut balance = self.engine.client().account_balance(account).await?;
        if let Some(token) = token {
            balance.tokens.retain(|holding| holding.token == token);
        }
        Ok(balance)
    }

    /// Freezes one account's relationship with one token. The account keeps
    /// its balance but the token stops moving in either direction.
    pub async fn freeze_relationship(
        &self,
        account: AccountId,
        token: TokenId,
        freeze_key: &SigningKeypair,
    ) -> Result<TransactionDetails, OrchestrationError> {
        self.set_relationship_frozen(account, token, freeze_key, true)
            .await
    }

    /// Thaws a relationship previously frozen with [`freeze_relationship`].
    ///
    /// [`freeze_relationship`]: AccountsService::freeze_relationship
    pub async fn unfreeze_relationship(
        &self,
        account: AccountId,
        token: TokenId,
        freeze_key: &SigningKeypair,
    ) -> Result<TransactionDetails, OrchestrationError> {
        self.set_relationship_frozen(account, token, freeze_key, false)
            .await
    }

    async fn set_relationship_frozen(
        &self,
        account: AccountId,
        token: TokenId,
        freeze_key: &SigningKeypair,
        frozen: bool,
    ) -> Result<TransactionDetails, OrchestrationError> {
        let payload = if frozen {
            OperationPayload::TokenFreeze { token, account }
        } else {
            OperationPayload::TokenUnfreeze { token, account }
        };
        let mut transaction = Transaction::new(payload)
            .with_payer(self.engine.operator_account())?
            .with_policy(SignaturePolicy::Single(freeze_key.public_key()))?;
        transaction.freeze()?;
        transaction.sign(&self.engine.client().operator().keypair)?;
        transaction.sign(freeze_key)?;
        self.engine.execute(transaction).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InMemoryLedger;
    use crate::keys::KeyListError;
    use crate::settlement::Movement;

    async fn run(
        engine: &TransactionEngine,
        mut transaction: Transaction,
        signers: &[&SigningKeypair],
    ) -> LedgerStatus {
        transaction.freeze().unwrap();
        for signer in signers {
            transaction.sign(signer).unwrap();
        }
        engine.execute_for_status(transaction).await.unwrap()
    }

    #[tokio::test]
    async fn test_single_key_account_creation() {
        let ledger = InMemoryLedger::start();
        let service = AccountsService::new(ledger.clone());

        let creation = service
            .create_account(Marks::from_marks(1), 1, None)
            .await
            .unwrap();

        let AccountAuthorization::Single(keypair) = &creation.authorization else {
            panic!("one signer should yield a bare keypair");
        };
        assert_eq!(
            service.account_key(creation.account_id).await.unwrap(),
            LedgerKey::Single(keypair.public_key())
        );
        let balance = service
            .account_balance(creation.account_id, None)
            .await
            .unwrap();
        assert_eq!(balance.balance, Marks::from_marks(1));
        assert!(balance.tokens.is_empty());
    }

    #[tokio::test]
    async fn test_threshold_account_creation_composes_a_list() {
        let ledger = InMemoryLedger::start();
        let service = AccountsService::new(ledger.clone());

        let creation = service
            .create_account(Marks::from_marks(2), 3, Some(2))
            .await
            .unwrap();

        let AccountAuthorization::Shared(set) = &creation.authorization else {
            panic!("three signers should yield a key list");
        };
        assert_eq!(set.key_list.len(), 3);
        assert_eq!(set.key_list.threshold(), Some(2));
        assert_eq!(set.private_keys.len(), 3);
        assert_eq!(
            service.account_key(creation.account_id).await.unwrap(),
            LedgerKey::List(set.key_list.clone())
        );
    }

    #[tokio::test]
    async fn test_impossible_threshold_never_reaches_the_network() {
        let ledger = InMemoryLedger::start();
        let service = AccountsService::new(ledger.clone());

        let err = service
            .create_account(Marks::from_marks(1), 1, Some(2))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrchestrationError::Caller(CallerError::KeyList(
                KeyListError::ThresholdOutOfRange { threshold: 2, size: 1 }
            ))
        ));
        assert_eq!(ledger.submissions(), 0);
    }

    #[tokio::test]
    async fn test_zero_signers_is_refused() {
        let ledger = InMemoryLedger::start();
        let service = AccountsService::new(ledger.clone());

        let err = service
            .create_account(Marks::from_marks(1), 0, None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrchestrationError::Caller(CallerError::EmptyKeyList)
        ));
        assert_eq!(ledger.submissions(), 0);
    }

    #[tokio::test]
    async fn test_negative_opening_balance_is_the_networks_verdict() {
        let ledger = InMemoryLedger::start();
        let service = AccountsService::new(ledger.clone());

        let err = service
            .create_account(Marks::from_marks(-1), 1, None)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(LedgerStatus::InvalidInitialBalance));
        // The amount was not screened locally; the ledger ruled on it.
        assert_eq!(ledger.submissions(), 1);
    }

    #[tokio::test]
    async fn test_key_rotation_retires_the_old_key() {
        let ledger = InMemoryLedger::start();
        let service = AccountsService::new(ledger.clone());
        let operator = ledger.operator().clone();

        let creation = service
            .create_account(Marks::from_marks(5), 1, None)
            .await
            .unwrap();
        let AccountAuthorization::Single(original) = creation.authorization else {
            panic!("expected a single keypair");
        };
        let replacement = SigningKeypair::generate();

        let status = service
            .update_account(
                creation.account_id,
                &original,
                Some(&replacement),
                Some("rotated"),
            )
            .await
            .unwrap();
        assert_eq!(status, LedgerStatus::Success);
        assert_eq!(
            service.account_key(creation.account_id).await.unwrap(),
            LedgerKey::Single(replacement.public_key())
        );
        assert_eq!(
            service.account_info(creation.account_id).await.unwrap().memo,
            "rotated"
        );

        // The replaced key no longer authorizes debits.
        let stale = run(
            service.engine(),
            Transaction::new(OperationPayload::Transfer {
                movements: vec![
                    Movement::native(creation.account_id, Marks::from_marks(-1)),
                    Movement::native(operator.account, Marks::from_marks(1)),
                ],
                unit_transfers: vec![],
            })
            .with_payer(operator.account)
            .unwrap(),
            &[&operator.keypair, &original],
        )
        .await;
        assert_eq!(stale, LedgerStatus::InvalidSignature);
    }

    #[tokio::test]
    async fn test_update_without_rotation_keeps_the_key() {
        let ledger = InMemoryLedger::start();
        let service = AccountsService::new(ledger.clone());

        let creation = service
            .create_account(Marks::from_marks(1), 1, None)
            .await
            .unwrap();
        let key_before = service.account_key(creation.account_id).await.unwrap();
        let AccountAuthorization::Single(keypair) = &creation.authorization else {
            panic!("expected a single keypair");
        };

        let status = service
            .update_account(creation.account_id, keypair, None, Some("billing"))
            .await
            .unwrap();
        assert_eq!(status, LedgerStatus::Success);

        let info = service.account_info(creation.account_id).await.unwrap();
        assert_eq!(info.key, key_before);
        assert_eq!(info.memo, "billing");
    }

    #[tokio::test]
    async fn test_balance_can_be_narrowed_to_one_token() {
        let ledger = InMemoryLedger::start();
        let service = AccountsService::new(ledger.clone());
        let operator = ledger.operator().clone();

        let first = ledger.register_token(operator.account, false);
        let second = ledger.register_token(operator.account, false);

        let full = service
            .account_balance(operator.account, None)
            .await
            .unwrap();
        assert_eq!(full.tokens.len(), 2);
        assert!(full.tokens.iter().any(|holding| holding.token == first));

        let narrowed = service
            .account_balance(operator.account, Some(second))
            .await
            .unwrap();
        assert_eq!(narrowed.tokens.len(), 1);
        assert_eq!(narrowed.tokens[0].token, second);
    }

    #[tokio::test]
    async fn test_freeze_blocks_the_token_and_thaw_releases_it() {
        let ledger = InMemoryLedger::start();
        let service = AccountsService::new(ledger.clone());
        let operator = ledger.operator().clone();

        let holder_kp = SigningKeypair::generate();
        let holder = ledger.register_account_with_key(
            LedgerKey::Single(holder_kp.public_key()),
            Marks::ZERO,
        );
        let token = ledger.register_token(operator.account, false);

        let minted = run(
            service.engine(),
            Transaction::new(OperationPayload::TokenMint {
                token,
                amount: 500,
                metadata: vec![],
            })
            .with_payer(operator.account)
            .unwrap(),
            &[&operator.keypair],
        )
        .await;
        assert_eq!(minted, LedgerStatus::Success);
        let associated = run(
            service.engine(),
            Transaction::new(OperationPayload::TokenAssociate {
                account: holder,
                tokens: vec![token],
            })
            .with_payer(operator.account)
            .unwrap(),
            &[&operator.keypair, &holder_kp],
        )
        .await;
        assert_eq!(associated, LedgerStatus::Success);

        let details = service
            .freeze_relationship(holder, token, &operator.keypair)
            .await
            .unwrap();
        assert_eq!(details.status(), LedgerStatus::Success);

        let credit = OperationPayload::Transfer {
            movements: vec![
                Movement::token(operator.account, token, -25),
                Movement::token(holder, token, 25),
            ],
            unit_transfers: vec![],
        };
        let blocked = run(
            service.engine(),
            Transaction::new(credit.clone())
                .with_payer(operator.account)
                .unwrap(),
            &[&operator.keypair],
        )
        .await;
        assert_eq!(blocked, LedgerStatus::AccountFrozenForToken);

        service
            .unfreeze_relationship(holder, token, &operator.keypair)
            .await
            .unwrap();
        let released = run(
            service.engine(),
            Transaction::new(credit).with_payer(operator.account).unwrap(),
            &[&operator.keypair],
        )
        .await;
        assert_eq!(released, LedgerStatus::Success);
        assert_eq!(
            service
                .account_balance(holder, Some(token))
                .await
                .unwrap()
                .tokens[0]
                .amount,
            25
        );
    }
}
