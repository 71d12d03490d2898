// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Transaction Lifecycle
//!
//! A [`Transaction`] moves through two local states. In *draft* every
//! execution parameter can still change. [`Transaction::freeze`] validates the
//! draft, mints a [`TransactionId`], and pins the canonical signable bytes;
//! from then on the transaction only accumulates signatures until the engine
//! consumes it at submission.
//!
//! Freezing before signing is what makes offline multi-party authorization
//! sound: every signer signs the exact bytes the network will check, and any
//! later mutation is refused instead of silently invalidating signatures that
//! were already gathered.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::client::ids::{AccountId, IdParseError};
use crate::config::{DEFAULT_MAX_FEE_GRAINS, DEFAULT_NODE_ACCOUNT, TRANSACTION_VALID_DURATION};
use crate::error::CallerError;
use crate::hash::double_sha256;
use crate::keys::{KeyList, PublicKey, Signature, SigningKeypair};
use crate::transaction::payload::OperationPayload;
use crate::units::Marks;

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// A point in network time, seconds and nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    seconds: i64,
    nanos: i32,
}

impl Timestamp {
    pub const fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    /// Splits a nanosecond count into seconds and sub-second nanos.
    pub const fn from_nanos(nanos: i64) -> Self {
        Self {
            seconds: nanos.div_euclid(1_000_000_000),
            nanos: nanos.rem_euclid(1_000_000_000) as i32,
        }
    }

    pub fn now() -> Self {
        Self::from_nanos(current_nanos())
    }

    pub const fn seconds(&self) -> i64 {
        self.seconds
    }

    pub const fn nanos(&self) -> i32 {
        self.nanos
    }

    pub const fn as_nanos(&self) -> i64 {
        self.seconds * 1_000_000_000 + self.nanos as i64
    }

    pub const fn plus_seconds(&self, seconds: i64) -> Self {
        Self {
            seconds: self.seconds + seconds,
            nanos: self.nanos,
        }
    }
}

impl fmt::Display for Timestamp {
    /// Renders as `seconds.nanos` with nanos zero-padded to nine digits,
    /// the format mirror APIs use for consensus timestamps.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.seconds, self.nanos)
    }
}

fn current_nanos() -> i64 {
    // The nanosecond representation runs out in 2262. Falling back to zero
    // keeps the monotonic counter as the floor rather than panicking.
    Utc::now().timestamp_nanos_opt().unwrap_or(0)
}

static LAST_ISSUED_NANOS: AtomicI64 = AtomicI64::new(0);

/// Returns a wall-clock nanosecond reading that is strictly greater than any
/// previous reading from this process.
///
/// Transaction ids must be unique per payer, and freezing two transactions
/// within the same clock tick is entirely plausible. The counter bumps past
/// the last issued value whenever the clock has not moved.
pub(crate) fn monotonic_nanos() -> i64 {
    let mut candidate = current_nanos();
    loop {
        let last = LAST_ISSUED_NANOS.load(Ordering::Relaxed);
        if candidate <= last {
            candidate = last + 1;
        }
        match LAST_ISSUED_NANOS.compare_exchange(last, candidate, Ordering::Relaxed, Ordering::Relaxed)
        {
            Ok(_) => return candidate,
            Err(_) => continue,
        }
    }
}

// ---------------------------------------------------------------------------
// Transaction identity
// ---------------------------------------------------------------------------

/// Network-wide identity of a transaction: the paying account plus the start
/// of its validity window.
///
/// Renders as `payer@seconds.nanos`, e.g. `0.1001@1700000000.000000042`. The
/// valid start doubles as a uniqueness nonce; the network rejects a second
/// submission with the same id as a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionId {
    payer: AccountId,
    valid_start: Timestamp,
}

impl TransactionId {
    pub const fn new(payer: AccountId, valid_start: Timestamp) -> Self {
        Self { payer, valid_start }
    }

    /// Mints an id for `payer` with a process-unique valid start.
    pub fn generate(payer: AccountId) -> Self {
        Self {
            payer,
            valid_start: Timestamp::from_nanos(monotonic_nanos()),
        }
    }

    pub const fn payer(&self) -> AccountId {
        self.payer
    }

    pub const fn valid_start(&self) -> Timestamp {
        self.valid_start
    }

    /// Last instant the network will still accept this transaction.
    pub fn expiry(&self) -> Timestamp {
        self.valid_start
            .plus_seconds(TRANSACTION_VALID_DURATION.as_secs() as i64)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.payer, self.valid_start)
    }
}

impl FromStr for TransactionId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || {
            IdParseError(format!(
                "expected a transaction id of the form `payer@seconds.nanos`, got `{s}`"
            ))
        };
        let (payer, instant) = s.split_once('@').ok_or_else(malformed)?;
        let payer = AccountId::from_str(payer)?;
        let (seconds, nanos) = instant.split_once('.').ok_or_else(malformed)?;
        let seconds: i64 = seconds.parse().map_err(|_| malformed())?;
        if nanos.is_empty() || nanos.len() > 9 || !nanos.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let nanos: i32 = nanos.parse().map_err(|_| malformed())?;
        Ok(Self::new(payer, Timestamp::new(seconds, nanos)))
    }
}

impl Serialize for TransactionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TransactionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Signature policy
// ---------------------------------------------------------------------------

/// Which signatures a transaction must carry before submission is worth
/// attempting.
///
/// The policy is a local gate. It never enters the signable bytes and the
/// network re-checks authorization against the on-ledger keys regardless;
/// the gate exists to refuse submissions that would be rejected anyway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignaturePolicy {
    /// Only the payer signs. One signature of the frozen bytes satisfies
    /// the gate locally; the network checks it is actually the payer's.
    PayerOnly,

    /// A specific key must sign, on top of whatever pays.
    Single(PublicKey),

    /// Key-rotation shape: the current key authorizes the change and the
    /// incoming key proves possession.
    CurrentAndNew { current: PublicKey, new: PublicKey },

    /// A threshold key list must be satisfied.
    Threshold(KeyList),
}

impl SignaturePolicy {
    /// How many signatures the policy asks for.
    pub fn required_signatures(&self) -> usize {
        match self {
            Self::PayerOnly | Self::Single(_) => 1,
            Self::CurrentAndNew { .. } => 2,
            Self::Threshold(list) => list.required_signatures(),
        }
    }

    /// Whether the given signer set satisfies the policy.
    pub fn satisfied<'a>(&self, signers: impl IntoIterator<Item = &'a PublicKey>) -> bool {
        match self {
            Self::PayerOnly => signers.into_iter().next().is_some(),
            Self::Single(key) => signers.into_iter().any(|s| s == key),
            Self::CurrentAndNew { current, new } => {
                let mut has_current = false;
                let mut has_new = false;
                for signer in signers {
                    has_current |= signer == current;
                    has_new |= signer == new;
                }
                has_current && has_new
            }
            Self::Threshold(list) => list.satisfied_by(signers),
        }
    }
}

// ---------------------------------------------------------------------------
// Execution context
// ---------------------------------------------------------------------------

/// Execution parameters a transaction carries besides its payload.
///
/// Everything here enters the signable bytes, so all of it is locked at
/// freeze time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Account charged for fees. The one parameter with no usable default;
    /// freezing without it is a caller error.
    pub payer: Option<AccountId>,
    /// Node the transaction will be submitted through.
    pub node: AccountId,
    /// Fee ceiling the payer is willing to bear.
    pub max_fee: Marks,
    /// Free-form note recorded with the transaction.
    pub memo: String,
    /// Explicit validity-window start. `None` mints one at freeze time.
    pub valid_start: Option<Timestamp>,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            payer: None,
            node: DEFAULT_NODE_ACCOUNT,
            max_fee: Marks::from_grains(DEFAULT_MAX_FEE_GRAINS as i64),
            memo: String::new(),
            valid_start: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// Bytes pinned by `freeze`. Their existence is what "frozen" means.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FrozenCore {
    id: TransactionId,
    signable: Vec<u8>,
}

/// A single network operation moving through draft, frozen, and submission.
///
/// ```
/// use meridian_orchestrator::client::ids::AccountId;
/// use meridian_orchestrator::keys::SigningKeypair;
/// use meridian_orchestrator::transaction::{OperationPayload, Transaction};
/// use meridian_orchestrator::units::Marks;
///
/// let payer_key = SigningKeypair::from_seed(&[1; 32]);
/// let mut tx = Transaction::new(OperationPayload::Transfer {
///     movements: vec![],
///     unit_transfers: vec![],
/// })
/// .with_payer(AccountId::new(0, 1001))?
/// .with_memo("rent")?;
///
/// tx.freeze()?;
/// tx.sign(&payer_key)?;
/// assert!(tx.is_fully_authorized());
/// # Ok::<(), meridian_orchestrator::error::CallerError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Transaction {
    payload: OperationPayload,
    context: ExecutionContext,
    policy: SignaturePolicy,
    frozen: Option<FrozenCore>,
    // Keyed by signer so repeat signatures collapse and iteration order is
    // deterministic.
    signatures: BTreeMap<PublicKey, Signature>,
}

impl Transaction {
    /// Starts a draft transaction with default context and a payer-only
    /// signature policy.
    pub fn new(payload: OperationPayload) -> Self {
        Self {
            payload,
            context: ExecutionContext::default(),
            policy: SignaturePolicy::PayerOnly,
            frozen: None,
            signatures: BTreeMap::new(),
        }
    }

    fn ensure_draft(&self) -> Result<(), CallerError> {
        if self.frozen.is_some() {
            return Err(CallerError::AlreadyFrozen);
        }
        Ok(())
    }

    // -- draft-state setters ------------------------------------------------

    pub fn with_payer(mut self, payer: AccountId) -> Result<Self, CallerError> {
        self.ensure_draft()?;
        self.context.payer = Some(payer);
        Ok(self)
    }

    pub fn with_node(mut self, node: AccountId) -> Result<Self, CallerError> {
        self.ensure_draft()?;
        self.context.node = node;
        Ok(self)
    }

    pub fn with_max_fee(mut self, max_fee: Marks) -> Result<Self, CallerError> {
        self.ensure_draft()?;
        self.context.max_fee = max_fee;
        Ok(self)
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Result<Self, CallerError> {
        self.ensure_draft()?;
        self.context.memo = memo.into();
        Ok(self)
    }

    /// Pins the validity-window start instead of minting one at freeze time.
    /// Offline flows use this to agree on bytes before anyone signs.
    pub fn with_valid_start(mut self, valid_start: Timestamp) -> Result<Self, CallerError> {
        self.ensure_draft()?;
        self.context.valid_start = Some(valid_start);
        Ok(self)
    }

    /// Replaces the signature gate. An empty threshold list would gate
    /// nothing and is refused here.
    pub fn with_policy(mut self, policy: SignaturePolicy) -> Result<Self, CallerError> {
        self.ensure_draft()?;
        if matches!(&policy, SignaturePolicy::Threshold(list) if list.is_empty()) {
            return Err(CallerError::EmptyKeyList);
        }
        self.policy = policy;
        Ok(self)
    }

    // -- lifecycle ----------------------------------------------------------

    /// Validates the draft, mints the transaction id, and pins the signable
    /// bytes. Idempotent refusal: freezing twice is [`CallerError::AlreadyFrozen`].
    pub fn freeze(&mut self) -> Result<&TransactionId, CallerError> {
        self.ensure_draft()?;
        let payer = self
            .context
            .payer
            .ok_or(CallerError::MissingIdentity { field: "payer" })?;
        let valid_start = self
            .context
            .valid_start
            .unwrap_or_else(|| Timestamp::from_nanos(monotonic_nanos()));
        self.context.valid_start = Some(valid_start);

        let id = TransactionId::new(payer, valid_start);
        let signable = self.compose_signable(&id);
        self.frozen = Some(FrozenCore { id, signable });
        Ok(&self.frozen.as_ref().unwrap().id)
    }

    /// Canonical bytes every signer commits to. The signature policy is
    /// excluded on purpose: it is local advice, and folding it in would let
    /// a policy tweak invalidate signatures over an unchanged operation.
    fn compose_signable(&self, id: &TransactionId) -> Vec<u8> {
        let mut buf = Vec::with_capacity(160);
        buf.extend_from_slice(&id.payer.realm().to_le_bytes());
        buf.extend_from_slice(&id.payer.num().to_le_bytes());
        buf.extend_from_slice(&id.valid_start.seconds().to_le_bytes());
        buf.extend_from_slice(&id.valid_start.nanos().to_le_bytes());
        buf.extend_from_slice(&self.context.node.realm().to_le_bytes());
        buf.extend_from_slice(&self.context.node.num().to_le_bytes());
        buf.extend_from_slice(&self.context.max_fee.grains().to_le_bytes());
        buf.extend_from_slice(&TRANSACTION_VALID_DURATION.as_secs().to_le_bytes());
        buf.extend_from_slice(&(self.context.memo.len() as u32).to_le_bytes());
        buf.extend_from_slice(self.context.memo.as_bytes());
        buf.extend_from_slice(&self.payload.canonical_bytes());
        buf
    }

    /// Signs the frozen bytes with `keypair`. Signing twice with the same
    /// key attaches one signature; signing never invalidates anything.
    pub fn sign(&mut self, keypair: &SigningKeypair) -> Result<&mut Self, CallerError> {
        let frozen = self.frozen.as_ref().ok_or(CallerError::SignBeforeFreeze)?;
        let signature = keypair.sign(&frozen.signable);
        self.signatures.insert(keypair.public_key(), signature);
        Ok(self)
    }

    /// Attaches a signature produced elsewhere, e.g. by an air-gapped
    /// signer. The signature is stored as given; verification is the
    /// network's job, and rejecting here would only mask a bad signer
    /// until submission anyway.
    pub fn sign_with(
        &mut self,
        signer: PublicKey,
        signature: Signature,
    ) -> Result<&mut Self, CallerError> {
        if self.frozen.is_none() {
            return Err(CallerError::SignBeforeFreeze);
        }
        self.signatures.insert(signer, signature);
        Ok(self)
    }

    // -- accessors ----------------------------------------------------------

    pub fn is_frozen(&self) -> bool {
        self.frozen.is_some()
    }

    /// The minted id, present once frozen.
    pub fn id(&self) -> Option<&TransactionId> {
        self.frozen.as_ref().map(|f| &f.id)
    }

    /// The pinned signable bytes, present once frozen.
    pub fn signable_bytes(&self) -> Option<&[u8]> {
        self.frozen.as_ref().map(|f| f.signable.as_slice())
    }

    /// SHA-256d of the signable bytes, the digest mirrors index bodies by.
    pub fn body_hash(&self) -> Option<[u8; 32]> {
        self.frozen.as_ref().map(|f| double_sha256(&f.signable))
    }

    pub fn payload(&self) -> &OperationPayload {
        &self.payload
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn policy(&self) -> &SignaturePolicy {
        &self.policy
    }

    /// Keys that have signed so far, in stable order.
    pub fn signer_keys(&self) -> impl Iterator<Item = &PublicKey> {
        self.signatures.keys()
    }

    pub fn signatures(&self) -> &BTreeMap<PublicKey, Signature> {
        &self.signatures
    }

    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }

    /// Whether the collected signatures satisfy the policy. Always false
    /// before freezing, since nothing has been signed.
    pub fn is_fully_authorized(&self) -> bool {
        self.frozen.is_some() && self.policy.satisfied(self.signatures.keys())
    }

    /// Submission gate: frozen and fully authorized, or the specific
    /// [`CallerError`] explaining what is missing.
    pub fn ensure_authorized(&self) -> Result<(), CallerError> {
        if self.frozen.is_none() {
            return Err(CallerError::NotFrozen);
        }
        if !self.policy.satisfied(self.signatures.keys()) {
            return Err(CallerError::SignaturesIncomplete {
                have: self.signature_count(),
                need: self.policy.required_signatures(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ids::TokenId;
    use crate::settlement::movement::Movement;

    fn keypair(seed: u8) -> SigningKeypair {
        SigningKeypair::from_seed(&[seed; 32])
    }

    fn payer() -> AccountId {
        AccountId::new(0, 1001)
    }

    fn transfer_draft() -> Transaction {
        Transaction::new(OperationPayload::Transfer {
            movements: vec![
                Movement::native(payer(), Marks::from_marks(-2)),
                Movement::native(AccountId::new(0, 1002), Marks::from_marks(2)),
            ],
            unit_transfers: vec![],
        })
    }

    // -- timestamps and ids -------------------------------------------------

    #[test]
    fn test_timestamp_display_pads_nanos() {
        assert_eq!(Timestamp::new(5, 42).to_string(), "5.000000042");
        assert_eq!(Timestamp::new(1_700_000_000, 0).to_string(), "1700000000.000000000");
    }

    #[test]
    fn test_timestamp_from_nanos_splits_correctly() {
        let ts = Timestamp::from_nanos(3_000_000_007);
        assert_eq!(ts.seconds(), 3);
        assert_eq!(ts.nanos(), 7);
        assert_eq!(ts.as_nanos(), 3_000_000_007);
    }

    #[test]
    fn test_monotonic_nanos_is_strictly_increasing() {
        let mut previous = monotonic_nanos();
        for _ in 0..10_000 {
            let next = monotonic_nanos();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn test_transaction_id_renders_payer_at_instant() {
        let id = TransactionId::new(payer(), Timestamp::new(1_700_000_000, 42));
        assert_eq!(id.to_string(), "0.1001@1700000000.000000042");
    }

    #[test]
    fn test_transaction_id_round_trips_through_display() {
        let id = TransactionId::new(payer(), Timestamp::new(1_700_000_000, 42));
        let parsed: TransactionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_transaction_id_rejects_malformed_strings() {
        for bad in [
            "",
            "0.1001",
            "0.1001@",
            "@5.1",
            "0.1001@5",
            "0.1001@5.",
            "0.1001@5.12345678901",
            "0.1001@x.5",
            "0.1001@5.x",
            "1001@5.1",
        ] {
            assert!(bad.parse::<TransactionId>().is_err(), "accepted `{bad}`");
        }
    }

    #[test]
    fn test_expiry_is_the_validity_window_end() {
        let id = TransactionId::new(payer(), Timestamp::new(1_000, 5));
        assert_eq!(id.expiry(), Timestamp::new(1_120, 5));
    }

    // -- freezing -----------------------------------------------------------

    #[test]
    fn test_freeze_without_payer_names_the_missing_field() {
        let mut tx = transfer_draft();
        assert_eq!(
            tx.freeze().unwrap_err(),
            CallerError::MissingIdentity { field: "payer" }
        );
    }

    #[test]
    fn test_freeze_twice_is_refused() {
        let mut tx = transfer_draft().with_payer(payer()).unwrap();
        tx.freeze().unwrap();
        assert_eq!(tx.freeze().unwrap_err(), CallerError::AlreadyFrozen);
    }

    #[test]
    fn test_setters_after_freeze_are_refused() {
        let mut tx = transfer_draft().with_payer(payer()).unwrap();
        tx.freeze().unwrap();
        assert_eq!(
            tx.with_memo("too late").unwrap_err(),
            CallerError::AlreadyFrozen
        );
    }

    #[test]
    fn test_freeze_mints_unique_ids_for_the_same_payer() {
        let mut first = transfer_draft().with_payer(payer()).unwrap();
        let mut second = transfer_draft().with_payer(payer()).unwrap();
        let a = *first.freeze().unwrap();
        let b = *second.freeze().unwrap();
        assert_ne!(a, b);
        assert_eq!(a.payer(), b.payer());
    }

    #[test]
    fn test_explicit_valid_start_is_honored() {
        let start = Timestamp::new(1_700_000_000, 99);
        let mut tx = transfer_draft()
            .with_payer(payer())
            .unwrap()
            .with_valid_start(start)
            .unwrap();
        let id = tx.freeze().unwrap();
        assert_eq!(id.valid_start(), start);
    }

    // -- signable bytes -----------------------------------------------------

    fn frozen_bytes(build: impl FnOnce(Transaction) -> Transaction) -> Vec<u8> {
        let start = Timestamp::new(1_700_000_000, 1);
        let mut tx = build(
            transfer_draft()
                .with_payer(payer())
                .unwrap()
                .with_valid_start(start)
                .unwrap(),
        );
        tx.freeze().unwrap();
        tx.signable_bytes().unwrap().to_vec()
    }

    #[test]
    fn test_signable_bytes_are_deterministic() {
        assert_eq!(frozen_bytes(|tx| tx), frozen_bytes(|tx| tx));
    }

    #[test]
    fn test_memo_node_and_fee_enter_the_signable_bytes() {
        let base = frozen_bytes(|tx| tx);
        let memo = frozen_bytes(|tx| tx.with_memo("rent").unwrap());
        let node = frozen_bytes(|tx| tx.with_node(AccountId::new(0, 6)).unwrap());
        let fee = frozen_bytes(|tx| tx.with_max_fee(Marks::from_marks(5)).unwrap());
        assert_ne!(base, memo);
        assert_ne!(base, node);
        assert_ne!(base, fee);
    }

    #[test]
    fn test_policy_is_not_part_of_the_signable_bytes() {
        let payer_only = frozen_bytes(|tx| tx);
        let threshold = frozen_bytes(|tx| {
            tx.with_policy(SignaturePolicy::Single(keypair(7).public_key()))
                .unwrap()
        });
        assert_eq!(payer_only, threshold);
    }

    #[test]
    fn test_body_hash_present_only_after_freeze() {
        let mut tx = transfer_draft().with_payer(payer()).unwrap();
        assert!(tx.body_hash().is_none());
        tx.freeze().unwrap();
        assert!(tx.body_hash().is_some());
    }

    // -- signing ------------------------------------------------------------

    #[test]
    fn test_sign_before_freeze_is_refused() {
        let mut tx = transfer_draft().with_payer(payer()).unwrap();
        assert_eq!(
            tx.sign(&keypair(1)).unwrap_err(),
            CallerError::SignBeforeFreeze
        );
    }

    #[test]
    fn test_signing_is_idempotent_per_key() {
        let signer = keypair(1);
        let mut tx = transfer_draft().with_payer(payer()).unwrap();
        tx.freeze().unwrap();
        tx.sign(&signer).unwrap();
        tx.sign(&signer).unwrap();
        assert_eq!(tx.signature_count(), 1);
    }

    #[test]
    fn test_distinct_keys_accumulate() {
        let mut tx = transfer_draft().with_payer(payer()).unwrap();
        tx.freeze().unwrap();
        tx.sign(&keypair(1)).unwrap();
        tx.sign(&keypair(2)).unwrap();
        assert_eq!(tx.signature_count(), 2);
    }

    #[test]
    fn test_signatures_verify_against_signable_bytes() {
        let signer = keypair(1);
        let mut tx = transfer_draft().with_payer(payer()).unwrap();
        tx.freeze().unwrap();
        tx.sign(&signer).unwrap();
        let bytes = tx.signable_bytes().unwrap();
        let sig = &tx.signatures()[&signer.public_key()];
        assert!(signer.public_key().verify(bytes, sig));
    }

    #[test]
    fn test_external_signature_is_attached_unverified() {
        let mut tx = transfer_draft().with_payer(payer()).unwrap();
        tx.freeze().unwrap();
        let stranger = keypair(9).public_key();
        tx.sign_with(stranger, Signature::from_bytes([0u8; 64])).unwrap();
        assert_eq!(tx.signature_count(), 1);
        assert!(tx.signer_keys().any(|k| *k == stranger));
    }

    // -- authorization ------------------------------------------------------

    #[test]
    fn test_payer_only_policy_is_satisfied_by_any_signature() {
        let mut tx = transfer_draft().with_payer(payer()).unwrap();
        tx.freeze().unwrap();
        assert!(!tx.is_fully_authorized());
        tx.sign(&keypair(1)).unwrap();
        assert!(tx.is_fully_authorized());
    }

    #[test]
    fn test_single_policy_requires_that_exact_key() {
        let wanted = keypair(5);
        let mut tx = transfer_draft()
            .with_payer(payer())
            .unwrap()
            .with_policy(SignaturePolicy::Single(wanted.public_key()))
            .unwrap();
        tx.freeze().unwrap();
        tx.sign(&keypair(1)).unwrap();
        assert!(!tx.is_fully_authorized());
        tx.sign(&wanted).unwrap();
        assert!(tx.is_fully_authorized());
    }

    #[test]
    fn test_rotation_policy_needs_both_keys() {
        let current = keypair(1);
        let incoming = keypair(2);
        let mut tx = transfer_draft()
            .with_payer(payer())
            .unwrap()
            .with_policy(SignaturePolicy::CurrentAndNew {
                current: current.public_key(),
                new: incoming.public_key(),
            })
            .unwrap();
        tx.freeze().unwrap();
        tx.sign(&current).unwrap();
        assert!(!tx.is_fully_authorized());
        tx.sign(&incoming).unwrap();
        assert!(tx.is_fully_authorized());
    }

    #[test]
    fn test_threshold_policy_tracks_the_key_list() {
        let members: Vec<SigningKeypair> = (1..=3).map(keypair).collect();
        let list = KeyList::with_threshold(
            members.iter().map(|k| k.public_key()).collect(),
            2,
        )
        .unwrap();
        let mut tx = transfer_draft()
            .with_payer(payer())
            .unwrap()
            .with_policy(SignaturePolicy::Threshold(list))
            .unwrap();
        tx.freeze().unwrap();
        tx.sign(&members[0]).unwrap();
        assert!(!tx.is_fully_authorized());
        tx.sign(&members[2]).unwrap();
        assert!(tx.is_fully_authorized());
    }

    #[test]
    fn test_empty_threshold_policy_is_refused() {
        let err = transfer_draft()
            .with_payer(payer())
            .unwrap()
            .with_policy(SignaturePolicy::Threshold(KeyList::new(vec![])))
            .unwrap_err();
        assert_eq!(err, CallerError::EmptyKeyList);
    }

    #[test]
    fn test_ensure_authorized_reports_progress() {
        let members: Vec<SigningKeypair> = (1..=3).map(keypair).collect();
        let list = KeyList::with_threshold(
            members.iter().map(|k| k.public_key()).collect(),
            3,
        )
        .unwrap();
        let mut tx = transfer_draft()
            .with_payer(payer())
            .unwrap()
            .with_policy(SignaturePolicy::Threshold(list))
            .unwrap();
        tx.freeze().unwrap();
        tx.sign(&members[0]).unwrap();
        assert_eq!(
            tx.ensure_authorized().unwrap_err(),
            CallerError::SignaturesIncomplete { have: 1, need: 3 }
        );
    }

    #[test]
    fn test_ensure_authorized_on_a_draft_is_not_frozen() {
        let tx = transfer_draft().with_payer(payer()).unwrap();
        assert_eq!(tx.ensure_authorized().unwrap_err(), CallerError::NotFrozen);
    }

    #[test]
    fn test_different_payloads_produce_different_bytes() {
        let start = Timestamp::new(1_700_000_000, 1);
        let mut pause = Transaction::new(OperationPayload::TokenPause {
            token: TokenId::new(0, 500),
        })
        .with_payer(payer())
        .unwrap()
        .with_valid_start(start)
        .unwrap();
        pause.freeze().unwrap();

        let mut unpause = Transaction::new(OperationPayload::TokenUnpause {
            token: TokenId::new(0, 500),
        })
        .with_payer(payer())
        .unwrap()
        .with_valid_start(start)
        .unwrap();
        unpause.freeze().unwrap();

        assert_ne!(pause.signable_bytes(), unpause.signable_bytes());
    }
}
