// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # In-Memory Ledger
//!
//! A complete stand-in for the remote network. It verifies every attached
//! signature, resolves which keys an operation requires, enforces
//! conservation and token relationship rules, executes schedules once their
//! signatures suffice, and hands back receipts and records through the same
//! [`LedgerClient`] surface production code uses.
//!
//! Consensus here is serial by construction: a lock around adjudication
//! stands in for the ordering the real network provides. Seed helpers mint
//! balances out of thin air; everything after seeding has to follow the
//! rules.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::client::ids::{AccountId, FileId, ScheduleId, TokenId};
use crate::client::info::{
    AccountBalance, AccountInfo, FileInfo, ScheduleInfo, TokenBalance, UnitInfo,
};
use crate::client::receipt::{Receipt, TransactionRecord};
use crate::client::status::LedgerStatus;
use crate::client::LedgerClient;
use crate::config::{OperatorConfig, DEFAULT_REALM, MAX_MEMO_BYTES};
use crate::error::{CallerError, OrchestrationError};
use crate::keys::{KeyList, LedgerKey, PublicKey, SigningKeypair};
use crate::settlement::movement::{is_conserved, AssetKind, Movement, UnitTransfer};
use crate::transaction::lifecycle::{Timestamp, Transaction, TransactionId};
use crate::transaction::payload::OperationPayload;
use crate::units::Marks;

/// Entity number of the seeded operator account.
const OPERATOR_NUM: u64 = 2;

/// First entity number handed out to created accounts, tokens, files, and
/// schedules. Low numbers are left for system-style entities.
const FIRST_ALLOCATED_NUM: u64 = 1000;

const OPERATOR_GENESIS_BALANCE: Marks = Marks::from_marks(1_000_000);

// ---------------------------------------------------------------------------
// Ledger state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct AccountState {
    key: LedgerKey,
    balance: Marks,
    memo: String,
    tokens: BTreeMap<TokenId, TokenRelationship>,
}

#[derive(Debug, Clone, Copy, Default)]
struct TokenRelationship {
    /// Smallest-unit balance; for unique tokens, the number of owned serials.
    amount: i64,
    frozen: bool,
}

#[derive(Debug, Clone)]
struct TokenState {
    treasury: AccountId,
    admin_key: LedgerKey,
    unique: bool,
    decimals: u32,
    paused: bool,
    next_serial: i64,
}

#[derive(Debug, Clone)]
struct FileState {
    contents: Vec<u8>,
    keys: KeyList,
    memo: String,
    deleted: bool,
}

#[derive(Debug, Clone)]
struct UnitState {
    owner: AccountId,
    metadata: Vec<u8>,
    minted_at: Timestamp,
}

#[derive(Debug, Clone)]
struct ScheduleState {
    creator: AccountId,
    /// Pays when the inner operation executes; the schedule creator here.
    payer: AccountId,
    inner: OperationPayload,
    memo: String,
    signers: BTreeSet<PublicKey>,
    scheduled_transaction_id: TransactionId,
    executed_at: Option<Timestamp>,
}

/// Result of a successfully applied operation.
struct Applied {
    receipt: Receipt,
    transfers: Vec<Movement>,
}

impl Applied {
    fn success() -> Self {
        Self {
            receipt: Receipt::new(LedgerStatus::Success),
            transfers: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// The ledger
// ---------------------------------------------------------------------------

/// In-memory network double implementing [`LedgerClient`].
#[derive(Debug)]
pub struct InMemoryLedger {
    operator: OperatorConfig,
    accounts: DashMap<AccountId, AccountState>,
    tokens: DashMap<TokenId, TokenState>,
    files: DashMap<FileId, FileState>,
    schedules: DashMap<ScheduleId, ScheduleState>,
    units: DashMap<(TokenId, i64), UnitState>,
    receipts: DashMap<TransactionId, Receipt>,
    records: DashMap<TransactionId, TransactionRecord>,
    next_entity: AtomicU64,
    submission_count: AtomicUsize,
    query_count: AtomicUsize,
    consensus_lock: Mutex<()>,
}

impl InMemoryLedger {
    /// A fresh ledger with a generated operator keypair.
    pub fn start() -> Arc<Self> {
        Self::start_with_operator(SigningKeypair::generate())
    }

    /// A fresh ledger whose operator signs with `keypair`. The operator
    /// account is seeded with a genesis balance.
    pub fn start_with_operator(keypair: SigningKeypair) -> Arc<Self> {
        let account = AccountId::new(DEFAULT_REALM, OPERATOR_NUM);
        let ledger = Self {
            operator: OperatorConfig {
                account,
                keypair: keypair.clone(),
            },
            accounts: DashMap::new(),
            tokens: DashMap::new(),
            files: DashMap::new(),
            schedules: DashMap::new(),
            units: DashMap::new(),
            receipts: DashMap::new(),
            records: DashMap::new(),
            next_entity: AtomicU64::new(FIRST_ALLOCATED_NUM),
            submission_count: AtomicUsize::new(0),
            query_count: AtomicUsize::new(0),
            consensus_lock: Mutex::new(()),
        };
        ledger.accounts.insert(
            account,
            AccountState {
                key: LedgerKey::Single(keypair.public_key()),
                balance: OPERATOR_GENESIS_BALANCE,
                memo: "operator".to_string(),
                tokens: BTreeMap::new(),
            },
        );
        Arc::new(ledger)
    }

    // -- seeding ------------------------------------------------------------

    /// Seeds an account keyed by the operator, so operator-signed
    /// transactions can spend from it. The balance is minted, not moved.
    pub fn register_account(&self, balance: Marks) -> AccountId {
        self.register_account_with_key(
            LedgerKey::Single(self.operator.keypair.public_key()),
            balance,
        )
    }

    /// Seeds an account guarded by an arbitrary key structure.
    pub fn register_account_with_key(&self, key: LedgerKey, balance: Marks) -> AccountId {
        let account = AccountId::new(DEFAULT_REALM, self.allocate());
        self.accounts.insert(
            account,
            AccountState {
                key,
                balance,
                memo: String::new(),
                tokens: BTreeMap::new(),
            },
        );
        account
    }

    /// Seeds a token administered by the operator. The treasury is
    /// associated on the spot; everyone else has to associate themselves.
    /// Fungible tokens get two decimals, unique tokens none.
    pub fn register_token(&self, treasury: AccountId, unique: bool) -> TokenId {
        let token = TokenId::new(DEFAULT_REALM, self.allocate());
        self.tokens.insert(
            token,
            TokenState {
                treasury,
                admin_key: LedgerKey::Single(self.operator.keypair.public_key()),
                unique,
                decimals: if unique { 0 } else { 2 },
                paused: false,
                next_serial: 1,
            },
        );
        if let Some(mut account) = self.accounts.get_mut(&treasury) {
            account.tokens.insert(token, TokenRelationship::default());
        }
        token
    }

    // -- test instrumentation -----------------------------------------------

    pub fn balance_of(&self, account: AccountId) -> Option<Marks> {
        self.accounts.get(&account).map(|a| a.balance)
    }

    /// Submissions that reached the ledger, accepted or not.
    pub fn submissions(&self) -> usize {
        self.submission_count.load(Ordering::Relaxed)
    }

    /// Read queries served.
    pub fn queries(&self) -> usize {
        self.query_count.load(Ordering::Relaxed)
    }

    // -- adjudication -------------------------------------------------------

    fn allocate(&self) -> u64 {
        self.next_entity.fetch_add(1, Ordering::Relaxed)
    }

    fn process(
        &self,
        transaction: &Transaction,
        id: &TransactionId,
    ) -> Result<Applied, LedgerStatus> {
        // Frozen is guaranteed by the id check in submit; an empty slice
        // here would just fail verification below.
        let signable = transaction.signable_bytes().unwrap_or_default();
        for (key, signature) in transaction.signatures() {
            if !key.verify(signable, signature) {
                return Err(LedgerStatus::InvalidSignature);
            }
        }
        check_memo(&transaction.context().memo)?;

        let payer = id.payer();
        let signers: Vec<PublicKey> = transaction.signer_keys().copied().collect();
        let required = self.required_keys(transaction.payload(), payer)?;
        for key in &required {
            if !key.satisfied_by(signers.iter()) {
                return Err(LedgerStatus::InvalidSignature);
            }
        }

        self.apply(transaction.payload(), payer, &signers)
    }

    /// Which key structures must be satisfied for `payload` to execute
    /// under `payer`. The payer's own key is always first.
    fn required_keys(
        &self,
        payload: &OperationPayload,
        payer: AccountId,
    ) -> Result<Vec<LedgerKey>, LedgerStatus> {
        let mut required = vec![self.account_key(payer)?];
        match payload {
            OperationPayload::AccountUpdate {
                account, new_key, ..
            } => {
                required.push(self.account_key(*account)?);
                if let Some(key) = new_key {
                    // Key rotation needs possession proof from the
                    // incoming key, not just consent from the current one.
                    required.push(key.clone());
                }
            }
            OperationPayload::TokenAssociate { account, .. }
            | OperationPayload::TokenDissociate { account, .. } => {
                required.push(self.account_key(*account)?);
            }
            OperationPayload::TokenFreeze { token, .. }
            | OperationPayload::TokenUnfreeze { token, .. }
            | OperationPayload::TokenPause { token }
            | OperationPayload::TokenUnpause { token }
            | OperationPayload::TokenMint { token, .. } => {
                required.push(self.token_admin_key(*token)?);
            }
            OperationPayload::Transfer {
                movements,
                unit_transfers,
            } => {
                for movement in movements {
                    if movement.delta < 0 {
                        required.push(self.account_key(movement.account)?);
                    }
                }
                for transfer in unit_transfers {
                    required.push(self.account_key(transfer.from)?);
                }
            }
            OperationPayload::FileAppend { file, .. }
            | OperationPayload::FileDelete { file } => {
                required.push(self.file_keys(*file)?);
            }
            OperationPayload::FileUpdate { file, new_keys, .. } => {
                required.push(self.file_keys(*file)?);
                // Rotating a file's keys demands proof the new keys exist.
                if let Some(keys) = new_keys {
                    required.push(LedgerKey::List(keys.clone()));
                }
            }
            OperationPayload::AccountCreate { .. }
            | OperationPayload::FileCreate { .. }
            | OperationPayload::ScheduleCreate { .. }
            | OperationPayload::ScheduleSign { .. } => {}
        }
        Ok(required)
    }

    fn account_key(&self, account: AccountId) -> Result<LedgerKey, LedgerStatus> {
        self.accounts
            .get(&account)
            .map(|a| a.key.clone())
            .ok_or(LedgerStatus::InvalidAccount)
    }

    fn token_admin_key(&self, token: TokenId) -> Result<LedgerKey, LedgerStatus> {
        self.tokens
            .get(&token)
            .map(|t| t.admin_key.clone())
            .ok_or(LedgerStatus::InvalidToken)
    }

    fn file_keys(&self, file: FileId) -> Result<LedgerKey, LedgerStatus> {
        let state = self.files.get(&file).ok_or(LedgerStatus::InvalidFile)?;
        if state.deleted {
            return Err(LedgerStatus::InvalidFile);
        }
        Ok(LedgerKey::List(state.keys.clone()))
    }

    fn apply(
        &self,
        payload: &OperationPayload,
        payer: AccountId,
        signers: &[PublicKey],
    ) -> Result<Applied, LedgerStatus> {
        match payload {
            OperationPayload::AccountCreate {
                key,
                initial_balance,
                memo,
            } => self.apply_account_create(payer, key, *initial_balance, memo),
            OperationPayload::AccountUpdate {
                account,
                new_key,
                memo,
            } => self.apply_account_update(*account, new_key.as_ref(), memo.as_deref()),
            OperationPayload::TokenAssociate { account, tokens } => {
                self.apply_token_associate(*account, tokens)
            }
            OperationPayload::TokenDissociate { account, tokens } => {
                self.apply_token_dissociate(*account, tokens)
            }
            OperationPayload::TokenFreeze { token, account } => {
                self.apply_token_freeze(*token, *account, true)
            }
            OperationPayload::TokenUnfreeze { token, account } => {
                self.apply_token_freeze(*token, *account, false)
            }
            OperationPayload::TokenPause { token } => self.apply_token_pause(*token, true),
            OperationPayload::TokenUnpause { token } => self.apply_token_pause(*token, false),
            OperationPayload::TokenMint {
                token,
                amount,
                metadata,
            } => self.apply_token_mint(*token, *amount, metadata),
            OperationPayload::Transfer {
                movements,
                unit_transfers,
            } => self.apply_transfer(movements, unit_transfers),
            OperationPayload::FileCreate {
                contents,
                keys,
                memo,
            } => self.apply_file_create(contents, keys, memo),
            OperationPayload::FileAppend { file, contents } => {
                self.apply_file_append(*file, contents)
            }
            OperationPayload::FileUpdate {
                file,
                contents,
                new_keys,
                memo,
            } => self.apply_file_update(*file, contents, new_keys.as_ref(), memo.as_deref()),
            OperationPayload::FileDelete { file } => self.apply_file_delete(*file),
            OperationPayload::ScheduleCreate {
                inner,
                schedule_memo,
            } => self.apply_schedule_create(payer, inner, schedule_memo, signers),
            OperationPayload::ScheduleSign { schedule } => {
                self.apply_schedule_sign(*schedule, signers)
            }
        }
    }

    // -- accounts -----------------------------------------------------------

    fn apply_account_create(
        &self,
        payer: AccountId,
        key: &LedgerKey,
        initial_balance: Marks,
        memo: &str,
    ) -> Result<Applied, LedgerStatus> {
        check_memo(memo)?;
        if initial_balance.is_negative() {
            return Err(LedgerStatus::InvalidInitialBalance);
        }
        {
            let payer_state = self
                .accounts
                .get(&payer)
                .ok_or(LedgerStatus::InvalidAccount)?;
            if payer_state.balance.grains() < initial_balance.grains() {
                return Err(LedgerStatus::InsufficientBalance);
            }
        }

        let account = AccountId::new(DEFAULT_REALM, self.allocate());
        if let Some(mut payer_state) = self.accounts.get_mut(&payer) {
            payer_state.balance =
                Marks::from_grains(payer_state.balance.grains() - initial_balance.grains());
        }
        self.accounts.insert(
            account,
            AccountState {
                key: key.clone(),
                balance: initial_balance,
                memo: memo.to_string(),
                tokens: BTreeMap::new(),
            },
        );

        let mut receipt = Receipt::new(LedgerStatus::Success);
        receipt.account_id = Some(account);
        Ok(Applied {
            receipt,
            transfers: vec![
                Movement::native(payer, -initial_balance),
                Movement::native(account, initial_balance),
            ],
        })
    }

    fn apply_account_update(
        &self,
        account: AccountId,
        new_key: Option<&LedgerKey>,
        memo: Option<&str>,
    ) -> Result<Applied, LedgerStatus> {
        if let Some(memo) = memo {
            check_memo(memo)?;
        }
        let mut state = self
            .accounts
            .get_mut(&account)
            .ok_or(LedgerStatus::InvalidAccount)?;
        if let Some(key) = new_key {
            state.key = key.clone();
        }
        if let Some(memo) = memo {
            state.memo = memo.to_string();
        }
        Ok(Applied::success())
    }

    // -- tokens -------------------------------------------------------------

    fn apply_token_associate(
        &self,
        account: AccountId,
        tokens: &[TokenId],
    ) -> Result<Applied, LedgerStatus> {
        for token in tokens {
            let token_state = self.tokens.get(token).ok_or(LedgerStatus::InvalidToken)?;
            if token_state.paused {
                return Err(LedgerStatus::TokenPaused);
            }
            let account_state = self
                .accounts
                .get(&account)
                .ok_or(LedgerStatus::InvalidAccount)?;
            if account_state.tokens.contains_key(token) {
                return Err(LedgerStatus::TokenAlreadyAssociated);
            }
        }
        let mut account_state = self
            .accounts
            .get_mut(&account)
            .ok_or(LedgerStatus::InvalidAccount)?;
        for token in tokens {
            account_state
                .tokens
                .insert(*token, TokenRelationship::default());
        }
        Ok(Applied::success())
    }

    fn apply_token_dissociate(
        &self,
        account: AccountId,
        tokens: &[TokenId],
    ) -> Result<Applied, LedgerStatus> {
        for token in tokens {
            let account_state = self
                .accounts
                .get(&account)
                .ok_or(LedgerStatus::InvalidAccount)?;
            let relationship = account_state
                .tokens
                .get(token)
                .ok_or(LedgerStatus::TokenNotAssociated)?;
            if relationship.frozen {
                return Err(LedgerStatus::AccountFrozenForToken);
            }
            if relationship.amount != 0 {
                return Err(LedgerStatus::TokenBalanceNotZero);
            }
        }
        let mut account_state = self
            .accounts
            .get_mut(&account)
            .ok_or(LedgerStatus::InvalidAccount)?;
        for token in tokens {
            account_state.tokens.remove(token);
        }
        Ok(Applied::success())
    }

    fn apply_token_freeze(
        &self,
        token: TokenId,
        account: AccountId,
        frozen: bool,
    ) -> Result<Applied, LedgerStatus> {
        {
            let token_state = self.tokens.get(&token).ok_or(LedgerStatus::InvalidToken)?;
            if token_state.paused {
                return Err(LedgerStatus::TokenPaused);
            }
        }
        let mut account_state = self
            .accounts
            .get_mut(&account)
            .ok_or(LedgerStatus::InvalidAccount)?;
        let relationship = account_state
            .tokens
            .get_mut(&token)
            .ok_or(LedgerStatus::TokenNotAssociated)?;
        relationship.frozen = frozen;
        Ok(Applied::success())
    }

    fn apply_token_pause(&self, token: TokenId, paused: bool) -> Result<Applied, LedgerStatus> {
        let mut token_state = self
            .tokens
            .get_mut(&token)
            .ok_or(LedgerStatus::InvalidToken)?;
        token_state.paused = paused;
        Ok(Applied::success())
    }

    fn apply_token_mint(
        &self,
        token: TokenId,
        amount: u64,
        metadata: &[Vec<u8>],
    ) -> Result<Applied, LedgerStatus> {
        let (treasury, unique) = {
            let token_state = self.tokens.get(&token).ok_or(LedgerStatus::InvalidToken)?;
            if token_state.paused {
                return Err(LedgerStatus::TokenPaused);
            }
            (token_state.treasury, token_state.unique)
        };

        let mut receipt = Receipt::new(LedgerStatus::Success);
        receipt.token_id = Some(token);

        if unique {
            let minted_at = Timestamp::now();
            let mut serials = Vec::with_capacity(metadata.len());
            {
                let mut token_state =
                    self.tokens.get_mut(&token).ok_or(LedgerStatus::InvalidToken)?;
                for entry in metadata {
                    let serial = token_state.next_serial;
                    token_state.next_serial += 1;
                    serials.push(serial);
                    self.units.insert(
                        (token, serial),
                        UnitState {
                            owner: treasury,
                            metadata: entry.clone(),
                            minted_at,
                        },
                    );
                }
            }
            let mut treasury_state = self
                .accounts
                .get_mut(&treasury)
                .ok_or(LedgerStatus::InvalidAccount)?;
            let relationship = treasury_state
                .tokens
                .get_mut(&token)
                .ok_or(LedgerStatus::TokenNotAssociated)?;
            relationship.amount += serials.len() as i64;
            receipt.serials = serials;
        } else {
            let delta = i64::try_from(amount).unwrap_or(i64::MAX);
            let mut treasury_state = self
                .accounts
                .get_mut(&treasury)
                .ok_or(LedgerStatus::InvalidAccount)?;
            let relationship = treasury_state
                .tokens
                .get_mut(&token)
                .ok_or(LedgerStatus::TokenNotAssociated)?;
            relationship.amount = relationship.amount.saturating_add(delta);
        }
        Ok(Applied {
            receipt,
            transfers: Vec::new(),
        })
    }

    // -- transfers ----------------------------------------------------------

    fn apply_transfer(
        &self,
        movements: &[Movement],
        unit_transfers: &[UnitTransfer],
    ) -> Result<Applied, LedgerStatus> {
        if !is_conserved(movements) {
            return Err(LedgerStatus::UnbalancedTransfer);
        }

        // Net per account and asset first; two movements against the same
        // account must be judged together, not in sequence.
        let mut nets: BTreeMap<(AccountId, AssetKind), i128> = BTreeMap::new();
        for movement in movements {
            *nets.entry((movement.account, movement.asset)).or_default() +=
                movement.delta as i128;
        }

        for ((account, asset), net) in &nets {
            let account_state = self
                .accounts
                .get(account)
                .ok_or(LedgerStatus::InvalidAccount)?;
            match asset {
                AssetKind::Native => {
                    if (account_state.balance.grains() as i128) + net < 0 {
                        return Err(LedgerStatus::InsufficientBalance);
                    }
                }
                AssetKind::Token(token) => {
                    let token_state =
                        self.tokens.get(token).ok_or(LedgerStatus::InvalidToken)?;
                    if token_state.paused {
                        return Err(LedgerStatus::TokenPaused);
                    }
                    let relationship = account_state
                        .tokens
                        .get(token)
                        .ok_or(LedgerStatus::TokenNotAssociated)?;
                    if relationship.frozen {
                        return Err(LedgerStatus::AccountFrozenForToken);
                    }
                    if (relationship.amount as i128) + net < 0 {
                        return Err(LedgerStatus::InsufficientBalance);
                    }
                }
            }
        }

        for transfer in unit_transfers {
            {
                let token_state = self
                    .tokens
                    .get(&transfer.token)
                    .ok_or(LedgerStatus::InvalidToken)?;
                if !token_state.unique {
                    return Err(LedgerStatus::InvalidToken);
                }
                if token_state.paused {
                    return Err(LedgerStatus::TokenPaused);
                }
            }
            {
                let unit = self
                    .units
                    .get(&(transfer.token, transfer.serial))
                    .ok_or(LedgerStatus::UnitNotOwned)?;
                if unit.owner != transfer.from {
                    return Err(LedgerStatus::UnitNotOwned);
                }
            }
            for side in [transfer.from, transfer.to] {
                let account_state = self
                    .accounts
                    .get(&side)
                    .ok_or(LedgerStatus::InvalidAccount)?;
                let relationship = account_state
                    .tokens
                    .get(&transfer.token)
                    .ok_or(LedgerStatus::TokenNotAssociated)?;
                if relationship.frozen {
                    return Err(LedgerStatus::AccountFrozenForToken);
                }
            }
        }

        // Everything checked; apply.
        for ((account, asset), net) in &nets {
            let mut account_state = match self.accounts.get_mut(account) {
                Some(state) => state,
                None => continue,
            };
            match asset {
                AssetKind::Native => {
                    let updated = i64::try_from(account_state.balance.grains() as i128 + net)
                        .unwrap_or(i64::MAX);
                    account_state.balance = Marks::from_grains(updated);
                }
                AssetKind::Token(token) => {
                    if let Some(relationship) = account_state.tokens.get_mut(token) {
                        relationship.amount = i64::try_from(relationship.amount as i128 + net)
                            .unwrap_or(i64::MAX);
                    }
                }
            }
        }
        for transfer in unit_transfers {
            if let Some(mut unit) = self.units.get_mut(&(transfer.token, transfer.serial)) {
                unit.owner = transfer.to;
            }
            if let Some(mut from_state) = self.accounts.get_mut(&transfer.from) {
                if let Some(relationship) = from_state.tokens.get_mut(&transfer.token) {
                    relationship.amount -= 1;
                }
            }
            if let Some(mut to_state) = self.accounts.get_mut(&transfer.to) {
                if let Some(relationship) = to_state.tokens.get_mut(&transfer.token) {
                    relationship.amount += 1;
                }
            }
        }

        Ok(Applied {
            receipt: Receipt::new(LedgerStatus::Success),
            transfers: movements.to_vec(),
        })
    }

    // -- files --------------------------------------------------------------

    fn apply_file_create(
        &self,
        contents: &[u8],
        keys: &KeyList,
        memo: &str,
    ) -> Result<Applied, LedgerStatus> {
        check_memo(memo)?;
        let file = FileId::new(DEFAULT_REALM, self.allocate());
        self.files.insert(
            file,
            FileState {
                contents: contents.to_vec(),
                keys: keys.clone(),
                memo: memo.to_string(),
                deleted: false,
            },
        );
        let mut receipt = Receipt::new(LedgerStatus::Success);
        receipt.file_id = Some(file);
        Ok(Applied {
            receipt,
            transfers: Vec::new(),
        })
    }

    fn apply_file_append(&self, file: FileId, contents: &[u8]) -> Result<Applied, LedgerStatus> {
        let mut state = self.files.get_mut(&file).ok_or(LedgerStatus::InvalidFile)?;
        if state.deleted {
            return Err(LedgerStatus::InvalidFile);
        }
        state.contents.extend_from_slice(contents);
        Ok(Applied::success())
    }

    fn apply_file_update(
        &self,
        file: FileId,
        contents: &[u8],
        new_keys: Option<&KeyList>,
        memo: Option<&str>,
    ) -> Result<Applied, LedgerStatus> {
        if let Some(memo) = memo {
            check_memo(memo)?;
        }
        let mut state = self.files.get_mut(&file).ok_or(LedgerStatus::InvalidFile)?;
        if state.deleted {
            return Err(LedgerStatus::InvalidFile);
        }
        state.contents = contents.to_vec();
        if let Some(keys) = new_keys {
            state.keys = keys.clone();
        }
        if let Some(memo) = memo {
            state.memo = memo.to_string();
        }
        Ok(Applied::success())
    }

    fn apply_file_delete(&self, file: FileId) -> Result<Applied, LedgerStatus> {
        let mut state = self.files.get_mut(&file).ok_or(LedgerStatus::InvalidFile)?;
        if state.deleted {
            return Err(LedgerStatus::InvalidFile);
        }
        state.deleted = true;
        state.contents.clear();
        Ok(Applied::success())
    }

    // -- schedules ----------------------------------------------------------

    fn apply_schedule_create(
        &self,
        payer: AccountId,
        inner: &OperationPayload,
        memo: &str,
        signers: &[PublicKey],
    ) -> Result<Applied, LedgerStatus> {
        check_memo(memo)?;
        if matches!(
            inner,
            OperationPayload::ScheduleCreate { .. } | OperationPayload::ScheduleSign { .. }
        ) {
            // Schedules do not nest.
            return Err(LedgerStatus::InvalidSchedule);
        }

        let schedule = ScheduleId::new(DEFAULT_REALM, self.allocate());
        let scheduled_transaction_id = TransactionId::generate(payer);
        self.schedules.insert(
            schedule,
            ScheduleState {
                creator: payer,
                payer,
                inner: inner.clone(),
                memo: memo.to_string(),
                signers: signers.iter().copied().collect(),
                scheduled_transaction_id,
                executed_at: None,
            },
        );
        self.try_execute_schedule(schedule);

        let mut receipt = Receipt::new(LedgerStatus::Success);
        receipt.schedule_id = Some(schedule);
        receipt.scheduled_transaction_id = Some(scheduled_transaction_id);
        Ok(Applied {
            receipt,
            transfers: Vec::new(),
        })
    }

    fn apply_schedule_sign(
        &self,
        schedule: ScheduleId,
        signers: &[PublicKey],
    ) -> Result<Applied, LedgerStatus> {
        {
            let mut state = self
                .schedules
                .get_mut(&schedule)
                .ok_or(LedgerStatus::InvalidSchedule)?;
            if state.executed_at.is_some() {
                return Err(LedgerStatus::ScheduleAlreadyExecuted);
            }
            let before = state.signers.len();
            state.signers.extend(signers.iter().copied());
            if state.signers.len() == before {
                return Err(LedgerStatus::NoNewValidSignatures);
            }
        }
        self.try_execute_schedule(schedule);
        Ok(Applied::success())
    }

    /// Executes the parked operation once its gathered signatures satisfy
    /// every required key. A schedule executes exactly once; if the inner
    /// operation fails at that moment, the failure is final.
    fn try_execute_schedule(&self, schedule: ScheduleId) {
        let (inner, payer, signers, scheduled_id, memo) = match self.schedules.get(&schedule) {
            Some(state) if state.executed_at.is_none() => (
                state.inner.clone(),
                state.payer,
                state.signers.iter().copied().collect::<Vec<_>>(),
                state.scheduled_transaction_id,
                state.memo.clone(),
            ),
            _ => return,
        };

        let required = match self.required_keys(&inner, payer) {
            Ok(required) => required,
            Err(_) => return,
        };
        if !required.iter().all(|key| key.satisfied_by(signers.iter())) {
            return;
        }

        let outcome = self.apply(&inner, payer, &signers);
        self.finalize(scheduled_id, &memo, outcome);
        if let Some(mut state) = self.schedules.get_mut(&schedule) {
            state.executed_at = Some(Timestamp::now());
        }
    }

    /// Records the receipt and record for an adjudicated submission.
    fn finalize(
        &self,
        id: TransactionId,
        memo: &str,
        outcome: Result<Applied, LedgerStatus>,
    ) -> Receipt {
        let (receipt, transfers) = match outcome {
            Ok(applied) => (applied.receipt, applied.transfers),
            Err(status) => (Receipt::new(status), Vec::new()),
        };
        self.receipts.insert(id, receipt.clone());
        self.records.insert(
            id,
            TransactionRecord {
                transaction_id: id,
                receipt: receipt.clone(),
                consensus_at: Timestamp::now(),
                // The in-memory network charges no fees, which keeps test
                // balances exact.
                fee_charged: Marks::ZERO,
                memo: memo.to_string(),
                transfers,
            },
        );
        receipt
    }
}

fn check_memo(memo: &str) -> Result<(), LedgerStatus> {
    if memo.len() > MAX_MEMO_BYTES {
        return Err(LedgerStatus::MemoTooLong);
    }
    Ok(())
}

fn query_miss(status: LedgerStatus) -> OrchestrationError {
    OrchestrationError::Rejected {
        status,
        transaction_id: None,
    }
}

// ---------------------------------------------------------------------------
// LedgerClient implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl LedgerClient for InMemoryLedger {
    fn operator(&self) -> &OperatorConfig {
        &self.operator
    }

    async fn submit(&self, transaction: &Transaction) -> Result<(), OrchestrationError> {
        self.submission_count.fetch_add(1, Ordering::Relaxed);
        let id = *transaction.id().ok_or(CallerError::NotFrozen)?;
        let _consensus = self.consensus_lock.lock();
        let outcome = self.process(transaction, &id);
        self.finalize(id, &transaction.context().memo, outcome);
        Ok(())
    }

    async fn receipt_by_id(&self, id: &TransactionId) -> Result<Receipt, OrchestrationError> {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        self.receipts
            .get(id)
            .map(|entry| entry.clone())
            .ok_or(OrchestrationError::Rejected {
                status: LedgerStatus::ReceiptNotFound,
                transaction_id: Some(*id),
            })
    }

    async fn record_by_id(
        &self,
        id: &TransactionId,
    ) -> Result<TransactionRecord, OrchestrationError> {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        self.records
            .get(id)
            .map(|entry| entry.clone())
            .ok_or(OrchestrationError::Rejected {
                status: LedgerStatus::RecordNotFound,
                transaction_id: Some(*id),
            })
    }

    async fn account_info(&self, account: AccountId) -> Result<AccountInfo, OrchestrationError> {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        let state = self
            .accounts
            .get(&account)
            .ok_or_else(|| query_miss(LedgerStatus::InvalidAccount))?;
        Ok(AccountInfo {
            account,
            key: state.key.clone(),
            balance: state.balance,
            memo: state.memo.clone(),
        })
    }

    async fn account_balance(
        &self,
        account: AccountId,
    ) -> Result<AccountBalance, OrchestrationError> {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        let state = self
            .accounts
            .get(&account)
            .ok_or_else(|| query_miss(LedgerStatus::InvalidAccount))?;
        let tokens = state
            .tokens
            .iter()
            .map(|(token, relationship)| TokenBalance {
                token: *token,
                amount: relationship.amount,
                decimals: self.tokens.get(token).map_or(0, |t| t.decimals),
            })
            .collect();
        Ok(AccountBalance {
            account,
            balance: state.balance,
            tokens,
        })
    }

    async fn file_info(&self, file: FileId) -> Result<FileInfo, OrchestrationError> {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        let state = self
            .files
            .get(&file)
            .ok_or_else(|| query_miss(LedgerStatus::InvalidFile))?;
        Ok(FileInfo {
            file,
            size: state.contents.len() as u64,
            keys: state.keys.clone(),
            memo: state.memo.clone(),
            deleted: state.deleted,
        })
    }

    async fn file_contents(&self, file: FileId) -> Result<Vec<u8>, OrchestrationError> {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        let state = self
            .files
            .get(&file)
            .ok_or_else(|| query_miss(LedgerStatus::InvalidFile))?;
        if state.deleted {
            return Err(query_miss(LedgerStatus::InvalidFile));
        }
        Ok(state.contents.clone())
    }

    async fn unit_info(
        &self,
        token: TokenId,
        serial: i64,
    ) -> Result<UnitInfo, OrchestrationError> {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        if !self.tokens.contains_key(&token) {
            return Err(query_miss(LedgerStatus::InvalidToken));
        }
        let unit = self
            .units
            .get(&(token, serial))
            .ok_or_else(|| query_miss(LedgerStatus::UnitNotOwned))?;
        Ok(UnitInfo {
            token,
            serial,
            owner: unit.owner,
            metadata: unit.metadata.clone(),
            minted_at: unit.minted_at,
        })
    }

    async fn schedule_info(
        &self,
        schedule: ScheduleId,
    ) -> Result<ScheduleInfo, OrchestrationError> {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        let state = self
            .schedules
            .get(&schedule)
            .ok_or_else(|| query_miss(LedgerStatus::InvalidSchedule))?;
        Ok(ScheduleInfo {
            schedule,
            creator: state.creator,
            payer: state.payer,
            scheduled_transaction_id: state.scheduled_transaction_id,
            signers: state.signers.iter().copied().collect(),
            memo: state.memo.clone(),
            executed_at: state.executed_at,
        })
    }
}
