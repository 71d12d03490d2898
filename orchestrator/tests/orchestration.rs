//! End-to-end orchestration tests.
//!
//! These exercise the full path a settlement travels: key composition,
//! account opening, transaction building, freezing, multi-party signing,
//! submission, receipt polling, and the read models that report what
//! happened. The ledger is the in-memory double, which adjudicates with the
//! same statuses and signature checks a real network would.
//!
//! Each test stands alone on its own ledger. No shared state, no ordering
//! dependencies.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use meridian_orchestrator::client::{InMemoryLedger, LedgerClient, LedgerStatus};
use meridian_orchestrator::error::{CallerError, OrchestrationError};
use meridian_orchestrator::keys::{LedgerKey, SigningKeypair};
use meridian_orchestrator::services::{
    AccountAuthorization, AccountsService, FilesService, TokensService,
};
use meridian_orchestrator::settlement::{Movement, Settlement, SettlementComposer};
use meridian_orchestrator::transaction::{OperationPayload, Transaction, TransactionEngine};
use meridian_orchestrator::units::Marks;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// Opens an account guarded by its own fresh keypair, funded out of thin
/// air by the ledger scaffolding.
fn open_account(
    ledger: &Arc<InMemoryLedger>,
    balance: Marks,
) -> (meridian_orchestrator::client::AccountId, SigningKeypair) {
    let keypair = SigningKeypair::generate();
    let account =
        ledger.register_account_with_key(LedgerKey::Single(keypair.public_key()), balance);
    (account, keypair)
}

/// Freezes, signs with every given keypair, and executes for the verdict.
async fn execute_signed(
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

// ---------------------------------------------------------------------------
// 1. Full Settlement Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_settlement_lifecycle() {
    let ledger = InMemoryLedger::start();
    let accounts = AccountsService::new(ledger.clone());
    let tokens = TokensService::new(ledger.clone());
    let operator = ledger.operator().clone();

    // Open a recipient with its own key.
    let creation = accounts
        .create_account(Marks::from_marks(1), 1, None)
        .await
        .unwrap();
    let AccountAuthorization::Single(recipient_kp) = creation.authorization else {
        panic!("expected a single keypair");
    };
    let recipient = creation.account_id;

    // Operator pays the recipient ten marks.
    let outcome = tokens
        .transfer_marks(
            Marks::from_marks(10),
            operator.account,
            recipient,
            Some("onboarding grant"),
            Some(&operator.keypair),
        )
        .await
        .unwrap();
    let details = outcome.details().unwrap();
    assert_eq!(details.status(), LedgerStatus::Success);

    // The record reports the consensus outcome and both legs of the move.
    let record = tokens
        .engine()
        .record_for(&details.transaction_id)
        .await
        .unwrap();
    assert_eq!(record.receipt.status, LedgerStatus::Success);
    assert_eq!(record.fee_charged, Marks::ZERO);
    assert_eq!(record.memo, "onboarding grant");
    assert_eq!(record.transfers.len(), 2);
    let net: i64 = record.transfers.iter().map(|m| m.delta).sum();
    assert_eq!(net, 0);

    // The recipient can spend with the key it was handed.
    let spend = tokens
        .transfer_marks(
            Marks::from_marks(4),
            recipient,
            operator.account,
            None,
            Some(&recipient_kp),
        )
        .await
        .unwrap();
    assert_eq!(spend.details().unwrap().status(), LedgerStatus::Success);
    assert_eq!(ledger.balance_of(recipient), Some(Marks::from_marks(7)));
}

// ---------------------------------------------------------------------------
// 2. Threshold Account Spends at Quorum
// ---------------------------------------------------------------------------

#[tokio::test]
async fn threshold_account_spends_at_quorum() {
    let ledger = InMemoryLedger::start();
    let accounts = AccountsService::new(ledger.clone());
    let operator = ledger.operator().clone();

    let creation = accounts
        .create_account(Marks::from_marks(1), 3, Some(2))
        .await
        .unwrap();
    let AccountAuthorization::Shared(set) = creation.authorization else {
        panic!("expected a generated key set");
    };
    let shared = creation.account_id;
    assert_eq!(set.key_list.len(), 3);
    assert_eq!(set.key_list.threshold(), Some(2));

    // Fund the shared account.
    let funding = Transaction::new(OperationPayload::Transfer {
        movements: vec![
            Movement::native(operator.account, Marks::from_marks(-20)),
            Movement::native(shared, Marks::from_marks(20)),
        ],
        unit_transfers: vec![],
    })
    .with_payer(operator.account)
    .unwrap();
    assert_eq!(
        execute_signed(accounts.engine(), funding, &[&operator.keypair]).await,
        LedgerStatus::Success
    );

    let spend = || {
        Transaction::new(OperationPayload::Transfer {
            movements: vec![
                Movement::native(shared, Marks::from_marks(-5)),
                Movement::native(operator.account, Marks::from_marks(5)),
            ],
            unit_transfers: vec![],
        })
        .with_payer(operator.account)
        .unwrap()
    };

    // One member is below the threshold; the network refuses.
    let under = execute_signed(
        accounts.engine(),
        spend(),
        &[&operator.keypair, &set.private_keys[0]],
    )
    .await;
    assert_eq!(under, LedgerStatus::InvalidSignature);

    // Two members meet it.
    let at_quorum = execute_signed(
        accounts.engine(),
        spend(),
        &[&operator.keypair, &set.private_keys[0], &set.private_keys[2]],
    )
    .await;
    assert_eq!(at_quorum, LedgerStatus::Success);
    assert_eq!(ledger.balance_of(shared), Some(Marks::from_marks(16)));
}

// ---------------------------------------------------------------------------
// 3. Scheduled Settlement Collects Countersignatures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scheduled_settlement_collects_countersignatures() {
    let ledger = InMemoryLedger::start();
    let composer = SettlementComposer::new(ledger.clone());
    let (payer, payer_kp) = open_account(&ledger, Marks::from_marks(50));
    let (payee, _) = open_account(&ledger, Marks::ZERO);

    // Nobody handed the composer a key, so the settlement parks on-ledger.
    let settlement = composer
        .compose_atomic(
            vec![
                Movement::native(payer, Marks::from_marks(-12)),
                Movement::native(payee, Marks::from_marks(12)),
            ],
            Some("quarterly rent"),
            None,
        )
        .await
        .unwrap();
    let Settlement::Scheduled(schedule) = settlement else {
        panic!("expected a scheduled settlement");
    };

    let parked = composer.scheduled_info(schedule).await.unwrap();
    assert!(!parked.is_executed());
    assert_eq!(parked.memo, "quarterly rent");
    assert_eq!(ledger.balance_of(payee), Some(Marks::ZERO));

    // The debited party countersigns; the schedule fires at once.
    let status = composer.sign_scheduled(schedule, &payer_kp).await.unwrap();
    assert_eq!(status, LedgerStatus::Success);

    let executed = composer.scheduled_info(schedule).await.unwrap();
    assert!(executed.is_executed());
    assert!(executed.signers.contains(&payer_kp.public_key()));
    assert_eq!(ledger.balance_of(payer), Some(Marks::from_marks(38)));
    assert_eq!(ledger.balance_of(payee), Some(Marks::from_marks(12)));

    // The inner transfer left a record under the scheduled transaction id.
    let engine = TransactionEngine::new(ledger.clone());
    let record = engine
        .record_for(&executed.scheduled_transaction_id)
        .await
        .unwrap();
    assert_eq!(record.receipt.status, LedgerStatus::Success);
}

// ---------------------------------------------------------------------------
// 4. Unsigned Drafts Route Into the Composer's World
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unsigned_draft_is_completed_by_the_key_holder() {
    let ledger = InMemoryLedger::start();
    let tokens = TokensService::new(ledger.clone());
    let operator = ledger.operator().clone();
    let (saver, saver_kp) = open_account(&ledger, Marks::from_marks(30));

    // The service had no key, so it returns the draft instead of guessing.
    let outcome = tokens
        .transfer_marks(
            Marks::from_marks(9),
            saver,
            operator.account,
            Some("withdrawal"),
            None,
        )
        .await
        .unwrap();
    let mut draft = outcome.draft().unwrap();
    assert!(!draft.is_frozen());
    assert_eq!(ledger.submissions(), 0);

    // The key holder completes it later.
    draft.freeze().unwrap();
    draft.sign(&operator.keypair).unwrap();
    draft.sign(&saver_kp).unwrap();
    let details = tokens.engine().execute(draft).await.unwrap();
    assert_eq!(details.status(), LedgerStatus::Success);
    assert_eq!(ledger.balance_of(saver), Some(Marks::from_marks(21)));
}

// ---------------------------------------------------------------------------
// 5. Caller Errors Never Reach the Network
// ---------------------------------------------------------------------------

#[tokio::test]
async fn caller_errors_never_reach_the_network() {
    let ledger = InMemoryLedger::start();
    let accounts = AccountsService::new(ledger.clone());
    let composer = SettlementComposer::new(ledger.clone());
    let operator = ledger.operator().clone();

    // An impossible threshold dies in key composition.
    let err = accounts
        .create_account(Marks::from_marks(1), 2, Some(5))
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestrationError::Caller(_)));

    // An empty settlement dies in the composer.
    let err = composer
        .compose_atomic(vec![], None, Some(&operator.keypair))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrchestrationError::Caller(CallerError::EmptyMovements)
    ));

    // An unsigned transaction dies at the submission gate.
    let mut unsigned = Transaction::new(OperationPayload::Transfer {
        movements: vec![
            Movement::native(operator.account, Marks::from_marks(-1)),
            Movement::native(operator.account, Marks::from_marks(1)),
        ],
        unit_transfers: vec![],
    })
    .with_payer(operator.account)
    .unwrap();
    unsigned.freeze().unwrap();
    let err = accounts.engine().submit(unsigned).await.unwrap_err();
    assert!(matches!(
        err,
        OrchestrationError::Caller(CallerError::SignaturesIncomplete { have: 0, need: 1 })
    ));

    // Not one of those attempts produced network traffic.
    assert_eq!(ledger.submissions(), 0);
}

// ---------------------------------------------------------------------------
// 6. Randomized Transfers Conserve Total Supply
// ---------------------------------------------------------------------------

#[tokio::test]
async fn randomized_transfers_conserve_total_supply() {
    let ledger = InMemoryLedger::start();
    let tokens = TokensService::new(ledger.clone());

    let mut rng = StdRng::seed_from_u64(7);
    let parties: Vec<_> = (0..5)
        .map(|_| open_account(&ledger, Marks::from_marks(50)))
        .collect();

    // A local model mirrors what the ledger should do. Grain for grain.
    let mut model: Vec<i64> = vec![Marks::from_marks(50).grains(); parties.len()];
    let total_before: i64 = model.iter().sum();

    for _ in 0..40 {
        let from = rng.gen_range(0..parties.len());
        let mut to = rng.gen_range(0..parties.len());
        while to == from {
            to = rng.gen_range(0..parties.len());
        }
        let amount = Marks::from_marks(rng.gen_range(1..=3));
        if model[from] < amount.grains() {
            continue;
        }

        let outcome = tokens
            .transfer_marks(
                amount,
                parties[from].0,
                parties[to].0,
                None,
                Some(&parties[from].1),
            )
            .await
            .unwrap();
        assert_eq!(outcome.details().unwrap().status(), LedgerStatus::Success);
        model[from] -= amount.grains();
        model[to] += amount.grains();
    }

    for (index, (account, _)) in parties.iter().enumerate() {
        assert_eq!(
            ledger.balance_of(*account).unwrap().grains(),
            model[index],
            "party {index} drifted from the model"
        );
    }
    let total_after: i64 = parties
        .iter()
        .map(|(account, _)| ledger.balance_of(*account).unwrap().grains())
        .sum();
    assert_eq!(total_after, total_before);
}

// ---------------------------------------------------------------------------
// 7. Concurrent Submissions Stay Consistent
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_transfers_stay_consistent() {
    let ledger = InMemoryLedger::start();
    let tokens = TokensService::new(ledger.clone());
    let (sink, _) = open_account(&ledger, Marks::ZERO);

    let senders: Vec<_> = (0..6)
        .map(|_| open_account(&ledger, Marks::from_marks(10)))
        .collect();

    // All six settlements race through the same engine at once.
    let results = futures::future::join_all(senders.iter().map(|(account, keypair)| {
        tokens.transfer_marks(Marks::from_marks(2), *account, sink, None, Some(keypair))
    }))
    .await;

    for result in results {
        let details = result.unwrap().details().unwrap();
        assert_eq!(details.status(), LedgerStatus::Success);
    }
    assert_eq!(ledger.balance_of(sink), Some(Marks::from_marks(12)));
    assert_eq!(ledger.submissions(), 6);
    for (account, _) in &senders {
        assert_eq!(ledger.balance_of(*account), Some(Marks::from_marks(8)));
    }
}

// ---------------------------------------------------------------------------
// 8. Key Rotation Changes Who May Spend
// ---------------------------------------------------------------------------

#[tokio::test]
async fn key_rotation_changes_who_may_spend() {
    let ledger = InMemoryLedger::start();
    let accounts = AccountsService::new(ledger.clone());
    let tokens = TokensService::new(ledger.clone());
    let operator = ledger.operator().clone();
    let (wallet, original_kp) = open_account(&ledger, Marks::from_marks(25));
    let successor_kp = SigningKeypair::generate();

    let status = accounts
        .update_account(wallet, &original_kp, Some(&successor_kp), None)
        .await
        .unwrap();
    assert_eq!(status, LedgerStatus::Success);

    // The old key is dead weight now.
    let stale = tokens
        .transfer_marks(
            Marks::from_marks(5),
            wallet,
            operator.account,
            None,
            Some(&original_kp),
        )
        .await
        .unwrap_err();
    assert_eq!(stale.status(), Some(LedgerStatus::InvalidSignature));
    assert_eq!(ledger.balance_of(wallet), Some(Marks::from_marks(25)));

    let fresh = tokens
        .transfer_marks(
            Marks::from_marks(5),
            wallet,
            operator.account,
            None,
            Some(&successor_kp),
        )
        .await
        .unwrap();
    assert_eq!(fresh.details().unwrap().status(), LedgerStatus::Success);
    assert_eq!(ledger.balance_of(wallet), Some(Marks::from_marks(20)));
}

// ---------------------------------------------------------------------------
// 9. Full Pipeline: Keys -> Account -> Files -> Tokens -> Records
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_pipeline_keys_through_records() {
    // The complete path through every layer:
    //   1. Compose a threshold key list and open an account with it.
    //   2. Anchor a policy document in file storage.
    //   3. Issue a unique token and move a unit to the new account.
    //   4. Read everything back through receipts, records, and info models.

    let ledger = InMemoryLedger::start();
    let accounts = AccountsService::new(ledger.clone());
    let tokens = TokensService::new(ledger.clone());
    let files = FilesService::new(ledger.clone());
    let operator = ledger.operator().clone();

    // Step 1: threshold-keyed account.
    let creation = accounts
        .create_account(Marks::from_marks(3), 2, Some(1))
        .await
        .unwrap();
    let AccountAuthorization::Shared(set) = creation.authorization else {
        panic!("expected a generated key set");
    };
    let vault = creation.account_id;
    assert_eq!(
        accounts.account_key(vault).await.unwrap(),
        LedgerKey::List(set.key_list.clone())
    );

    // Step 2: policy document on file.
    let file = files
        .create(
            &operator.keypair,
            b"custody policy rev 1".to_vec(),
            Some("custody"),
            None,
        )
        .await
        .unwrap();
    assert_eq!(
        files.contents(file).await.unwrap(),
        b"custody policy rev 1"
    );

    // Step 3: unique token, minted and delivered.
    let token = ledger.register_token(operator.account, true);
    let receipt = tokens
        .mint_unit(token, &operator.keypair, b"bond certificate 001".to_vec())
        .await
        .unwrap();
    assert_eq!(receipt.serials, vec![1]);

    let one_member = &set.private_keys[0];
    assert_eq!(
        tokens.associate(vault, token, one_member).await.unwrap(),
        LedgerStatus::Success
    );
    let delivery = tokens
        .transfer_unit(token, operator.account, vault, 1, Some(&operator.keypair))
        .await
        .unwrap();
    let details = delivery.details().unwrap();
    assert_eq!(details.status(), LedgerStatus::Success);

    // Step 4: every read model agrees.
    let unit = tokens.unit_info(token, 1).await.unwrap();
    assert_eq!(unit.owner, vault);
    assert_eq!(unit.metadata, b"bond certificate 001");

    let receipt_again = tokens
        .engine()
        .receipt_for(&details.transaction_id)
        .await
        .unwrap();
    assert_eq!(receipt_again.status, LedgerStatus::Success);

    let balance = accounts.account_balance(vault, Some(token)).await.unwrap();
    assert_eq!(balance.tokens.len(), 1);
    assert_eq!(balance.tokens[0].amount, 1);
}
