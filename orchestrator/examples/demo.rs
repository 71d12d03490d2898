//! Interactive CLI walkthrough of the full Meridian settlement lifecycle.
//!
//! Walks through account opening, direct and threshold-authorized
//! settlements, schedule-backed countersigning, unique unit custody, and
//! file anchoring, all against the in-memory ledger double. The output uses
//! ANSI escape codes for colored, storytelling-style terminal rendering.
//!
//! Run with:
//!   cargo run --example demo --release

use std::time::Instant;

use meridian_orchestrator::client::mock::InMemoryLedger;
use meridian_orchestrator::client::{LedgerClient, LedgerStatus};
use meridian_orchestrator::error::OrchestrationError;
use meridian_orchestrator::keys::PublicKey;
use meridian_orchestrator::services::{AccountsService, FilesService, TokensService};
use meridian_orchestrator::settlement::{Movement, Settlement, SettlementComposer};
use meridian_orchestrator::transaction::{OperationPayload, Transaction, TransactionEngine};
use meridian_orchestrator::units::Marks;

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const ITALIC: &str = "\x1b[3m";

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

const BG_BLUE: &str = "\x1b[44m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn banner() {
    println!();
    println!(
        "{BG_BLUE}{BOLD}{WHITE}                                                                    {RESET}"
    );
    println!(
        "{BG_BLUE}{BOLD}{WHITE}    MERIDIAN  --  Settlement Orchestration Walkthrough              {RESET}"
    );
    println!(
        "{BG_BLUE}{BOLD}{WHITE}    Version 0.1.0  |  Ed25519 + SHA-256  |  marks = 10^8 grains     {RESET}"
    );
    println!(
        "{BG_BLUE}{BOLD}{WHITE}                                                                    {RESET}"
    );
    println!();
}

fn section(num: u32, title: &str) {
    println!();
    println!(
        "{BOLD}{CYAN}===[{YELLOW} Step {num} {CYAN}]=============================================================={RESET}"
    );
    println!("{BOLD}{WHITE}  {title}{RESET}");
    println!(
        "{CYAN}------------------------------------------------------------------------{RESET}"
    );
}

fn subsection(text: &str) {
    println!("{DIM}{CYAN}  >> {text}{RESET}");
}

fn success(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn info(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn timing(label: &str, elapsed: std::time::Duration) {
    let ms = elapsed.as_secs_f64() * 1000.0;
    println!("{DIM}{MAGENTA}  [{label}: {ms:.2} ms]{RESET}");
}

fn key_display(name: &str, key: &PublicKey, color: &str) {
    let hex = key.to_hex();
    let prefix = &hex[..8];
    let suffix = &hex[hex.len() - 8..];
    println!("  {color}{BOLD}{name}{RESET}  {DIM}{prefix}...{suffix}{RESET}  {DIM}(ed25519){RESET}");
}

fn balance_row(name: &str, balance: Marks, color: &str) {
    let rendered = balance.to_string();
    println!("  {color}{BOLD}{name:<10}{RESET}  {WHITE}{rendered:>16}{RESET} {DIM}marks{RESET}");
}

fn separator() {
    println!(
        "{DIM}{CYAN}  . . . . . . . . . . . . . . . . . . . . . . . . . . . . . . . . . {RESET}"
    );
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    let demo_start = Instant::now();

    banner();

    // -----------------------------------------------------------------------
    // Step 1: Ledger Bootstrap
    // -----------------------------------------------------------------------

    section(1, "Ledger Bootstrap");
    subsection("Starting the in-memory ledger and wiring up the service layer...");

    let t = Instant::now();
    let ledger = InMemoryLedger::start();
    let operator = ledger.operator().clone();
    let accounts = AccountsService::new(ledger.clone());
    let tokens = TokensService::new(ledger.clone());
    let files = FilesService::new(ledger.clone());
    let composer = SettlementComposer::new(ledger.clone());
    let engine = TransactionEngine::new(ledger.clone());
    timing("bootstrap", t.elapsed());

    info("Operator account", &operator.account.to_string());
    info(
        "Operator balance",
        &format!("{} marks", ledger.balance_of(operator.account).unwrap()),
    );
    key_display("Operator ", &operator.keypair.public_key(), WHITE);
    success("Ledger online; every service shares one operator-backed engine");

    // -----------------------------------------------------------------------
    // Step 2: Account Opening
    // -----------------------------------------------------------------------

    section(2, "Account Opening: Alice and the Vault");
    subsection("Opening a single-key account and a 2-of-3 threshold account...");

    let t = Instant::now();
    let alice = accounts
        .create_account(Marks::from_marks(25), 1, None)
        .await
        .expect("alice's account");
    let vault = accounts
        .create_account(Marks::from_marks(40), 3, Some(2))
        .await
        .expect("vault account");
    timing("2 account creations", t.elapsed());

    let alice_key = alice.authorization.keypairs()[0].clone();
    let vault_keys: Vec<_> = vault
        .authorization
        .keypairs()
        .into_iter()
        .cloned()
        .collect();

    println!();
    info("Alice", &alice.account_id.to_string());
    key_display("Alice    ", &alice_key.public_key(), BLUE);
    info("Vault", &vault.account_id.to_string());
    for keypair in &vault_keys {
        key_display("Vault    ", &keypair.public_key(), MAGENTA);
    }
    println!();
    success("Vault spends only when 2 of its 3 custodians sign");

    // -----------------------------------------------------------------------
    // Step 3: Direct Settlement
    // -----------------------------------------------------------------------

    section(3, "Direct Settlement: Operator -> Alice (5 marks)");
    subsection("Composing, freezing, signing, and submitting in one call...");

    let t = Instant::now();
    let outcome = tokens
        .transfer_marks(
            Marks::from_marks(5),
            operator.account,
            alice.account_id,
            Some("onboarding grant"),
            Some(&operator.keypair),
        )
        .await
        .expect("onboarding settlement");
    timing("settle + receipt", t.elapsed());

    let details = outcome.details().expect("signed path executes");
    info("Transaction id", &details.transaction_id.to_string());
    info("Status", &details.receipt.status.to_string());

    subsection("Pulling the full record back from the ledger...");
    let record = engine
        .record_for(&details.transaction_id)
        .await
        .expect("record");
    info("Memo", &record.memo);
    info("Fee charged", &format!("{} marks", record.fee_charged));
    info("Transfer legs", &record.transfers.len().to_string());

    separator();
    println!();
    println!("  {BOLD}{WHITE}--- Balances After Settlement ---{RESET}");
    balance_row("Alice", ledger.balance_of(alice.account_id).unwrap(), BLUE);
    balance_row("Vault", ledger.balance_of(vault.account_id).unwrap(), MAGENTA);
    println!();
    success("Settlement confirmed; the record and the balances agree");

    // -----------------------------------------------------------------------
    // Step 4: Threshold Authorization
    // -----------------------------------------------------------------------

    section(4, "Threshold Authorization: the Vault Pays Alice (8 marks)");

    let spend = Marks::from_marks(8);
    let build_spend = || {
        Transaction::new(OperationPayload::Transfer {
            movements: vec![
                Movement::native(vault.account_id, -spend),
                Movement::native(alice.account_id, spend),
            ],
            unit_transfers: vec![],
        })
        .with_payer(vault.account_id)
        .unwrap()
    };

    subsection("First attempt: one custodian signs, quorum is 2...");
    let mut under_quorum = build_spend();
    under_quorum.freeze().unwrap();
    under_quorum.sign(&vault_keys[0]).unwrap();
    let verdict = engine
        .execute_for_status(under_quorum)
        .await
        .expect("verdict, not transport failure");
    info("Network verdict", &verdict.to_string());
    assert_eq!(verdict, LedgerStatus::InvalidSignature);
    success("Rejected as data, not as an error: the ledger is the judge");

    subsection("Second attempt: two custodians sign...");
    let t = Instant::now();
    let mut at_quorum = build_spend();
    at_quorum.freeze().unwrap();
    at_quorum.sign(&vault_keys[0]).unwrap();
    at_quorum.sign(&vault_keys[1]).unwrap();
    let verdict = engine.execute_for_status(at_quorum).await.unwrap();
    timing("freeze + 2 signatures + submit", t.elapsed());
    info("Network verdict", &verdict.to_string());
    assert_eq!(verdict, LedgerStatus::Success);

    separator();
    println!();
    println!("  {BOLD}{WHITE}--- Balances After Threshold Spend ---{RESET}");
    balance_row("Alice", ledger.balance_of(alice.account_id).unwrap(), BLUE);
    balance_row("Vault", ledger.balance_of(vault.account_id).unwrap(), MAGENTA);
    println!();
    success("Quorum reached; the vault's 8 marks arrived at Alice's account");

    // -----------------------------------------------------------------------
    // Step 5: Scheduled Settlement
    // -----------------------------------------------------------------------

    section(5, "Scheduled Settlement: Countersigning at a Distance");
    subsection("Composing a vault -> Alice transfer with no signer at hand...");

    let settlement = composer
        .compose_atomic(
            vec![
                Movement::native(vault.account_id, -Marks::from_marks(4)),
                Movement::native(alice.account_id, Marks::from_marks(4)),
            ],
            Some("quarterly distribution"),
            None,
        )
        .await
        .expect("scheduled settlement");
    let schedule = match settlement {
        Settlement::Scheduled(id) => id,
        Settlement::Signed(_) => unreachable!("no signer was supplied"),
    };

    let parked = composer.scheduled_info(schedule).await.unwrap();
    info("Schedule id", &schedule.to_string());
    info("Memo", &parked.memo);
    info("Signatures gathered", &parked.signers.len().to_string());
    info("Executed", &parked.is_executed().to_string());
    success("Settlement parked on the network, awaiting custodians");

    subsection("Custodian 1 countersigns...");
    let status = composer
        .sign_scheduled(schedule, &vault_keys[0])
        .await
        .unwrap();
    let midway = composer.scheduled_info(schedule).await.unwrap();
    info("Verdict", &status.to_string());
    info(
        "Progress",
        &format!("{} signature(s), executed: {}", midway.signers.len(), midway.is_executed()),
    );

    subsection("Custodian 2 countersigns, completing the quorum...");
    let status = composer
        .sign_scheduled(schedule, &vault_keys[1])
        .await
        .unwrap();
    assert_eq!(status, LedgerStatus::Success);
    let executed = composer.scheduled_info(schedule).await.unwrap();
    assert!(executed.is_executed());
    info("Executed", &executed.is_executed().to_string());

    let record = engine
        .record_for(&executed.scheduled_transaction_id)
        .await
        .expect("inner transaction record");
    info("Inner transaction", &record.transaction_id.to_string());
    info("Transfer legs", &record.transfers.len().to_string());
    success("Second countersignature tipped the threshold; funds moved");

    // -----------------------------------------------------------------------
    // Step 6: Unique Unit Custody
    // -----------------------------------------------------------------------

    section(6, "Unique Unit Custody: Mint, Associate, Transfer");
    subsection("Registering a unique token with the operator as treasury...");

    let token = ledger.register_token(operator.account, true);
    info("Token id", &token.to_string());

    subsection("Alice opts in to the token (association is her call)...");
    let status = tokens
        .associate(alice.account_id, token, &alice_key)
        .await
        .unwrap();
    info("Association verdict", &status.to_string());

    subsection("Minting one serial-numbered unit with certificate metadata...");
    let t = Instant::now();
    let receipt = tokens
        .mint_unit(
            token,
            &operator.keypair,
            br#"{"cert":"MRD-0001","grade":"A"}"#.to_vec(),
        )
        .await
        .expect("mint");
    timing("mint + receipt", t.elapsed());
    let serial = receipt.serials[0];
    info("Minted serial", &serial.to_string());

    subsection("Transferring the unit from the treasury to Alice...");
    tokens
        .transfer_unit(
            token,
            operator.account,
            alice.account_id,
            serial,
            Some(&operator.keypair),
        )
        .await
        .expect("unit transfer")
        .details()
        .expect("signed path executes");

    let unit = tokens.unit_info(token, serial).await.unwrap();
    info("Unit owner", &unit.owner.to_string());
    info(
        "Unit metadata",
        &String::from_utf8_lossy(&unit.metadata),
    );
    assert_eq!(unit.owner, alice.account_id);
    success("Serial-numbered unit now in Alice's custody");

    // -----------------------------------------------------------------------
    // Step 7: File Anchoring
    // -----------------------------------------------------------------------

    section(7, "File Anchoring: a Settlement Journal on the Ledger");
    subsection("Creating a key-guarded file and appending to it...");

    let t = Instant::now();
    let file = files
        .create(
            &operator.keypair,
            b"journal: opening entries\n".to_vec(),
            Some("settlement journal"),
            Some(Marks::from_marks(1)),
        )
        .await
        .expect("file create");
    let status = files
        .append(
            file,
            &operator.keypair,
            b"journal: quarterly distribution executed\n".to_vec(),
            None,
        )
        .await
        .unwrap();
    timing("create + append", t.elapsed());
    assert_eq!(status, LedgerStatus::Success);

    let journal = files.contents(file).await.unwrap();
    let meta = files.info(file).await.unwrap();
    info("File id", &file.to_string());
    info("Size on ledger", &format!("{} bytes", meta.size));
    info("Memo", &meta.memo);
    println!();
    for line in String::from_utf8_lossy(&journal).lines() {
        println!("  {DIM}| {line}{RESET}");
    }
    println!();
    success("Journal anchored; contents and metadata read back intact");

    // -----------------------------------------------------------------------
    // Step 8: The Error Taxonomy in Action
    // -----------------------------------------------------------------------

    section(8, "The Error Taxonomy in Action");
    subsection("A malformed request never reaches the wire...");

    let before = ledger.submissions();
    let err = composer
        .compose_atomic(vec![], None, None)
        .await
        .expect_err("empty settlements are refused");
    info("Caller error", &err.to_string());
    assert_eq!(ledger.submissions(), before);
    success("Refused locally; the submission counter did not move");

    subsection("An overdraft reaches the wire and comes back as a verdict...");
    let err = tokens
        .transfer_marks(
            Marks::from_marks(1_000),
            alice.account_id,
            vault.account_id,
            None,
            Some(&alice_key),
        )
        .await
        .expect_err("alice cannot overdraw");
    match &err {
        OrchestrationError::Rejected { status, .. } => {
            info("Network verdict", &status.to_string());
            assert_eq!(*status, LedgerStatus::InsufficientBalance);
        }
        other => panic!("expected a rejection, got {other}"),
    }
    assert_eq!(ledger.submissions(), before + 1);
    success("Well-formed but unaffordable: judged by the network, not locally");

    // -----------------------------------------------------------------------
    // Final Summary
    // -----------------------------------------------------------------------

    let total_elapsed = demo_start.elapsed();

    println!();
    println!(
        "{BG_BLUE}{BOLD}{WHITE}                                                                    {RESET}"
    );
    println!(
        "{BG_BLUE}{BOLD}{WHITE}    WALKTHROUGH COMPLETE -- Final Summary                           {RESET}"
    );
    println!(
        "{BG_BLUE}{BOLD}{WHITE}                                                                    {RESET}"
    );
    println!();

    println!("  {BOLD}{WHITE}Orchestration Statistics:{RESET}");
    println!("  {DIM}----------------------------------------------{RESET}");
    info("Accounts opened", "2 (Alice, 2-of-3 Vault)");
    info("Settlements executed", "4 (direct, threshold, scheduled, unit)");
    info("Ledger submissions", &ledger.submissions().to_string());
    info("Read queries served", &ledger.queries().to_string());
    info("Signing algorithm", "Ed25519 (ed25519-dalek 2.1)");
    info("Canonical bytes", "length-prefixed, SHA-256 body hash");
    info("Unit of account", "1 mark = 100,000,000 grains");
    info("Authorization", "threshold key lists, idempotent signing");
    info("Countersigning", "ledger-native schedules");
    println!();

    println!("  {BOLD}{WHITE}Final Balances:{RESET}");
    println!("  {DIM}----------------------------------------------{RESET}");
    balance_row("Alice", ledger.balance_of(alice.account_id).unwrap(), BLUE);
    balance_row("Vault", ledger.balance_of(vault.account_id).unwrap(), MAGENTA);
    println!();
    println!(
        "  {ITALIC}{DIM}Every movement above conserves value; the ledger would have refused otherwise.{RESET}"
    );

    println!();
    println!(
        "  {BOLD}{GREEN}Total walkthrough time: {:.2}s{RESET}",
        total_elapsed.as_secs_f64()
    );
    println!();
}
