// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Operation Payloads
//!
//! Every transaction carries exactly one [`OperationPayload`]: the thing the
//! network is being asked to do. The payload is pure data; lifecycle state,
//! signatures, and execution belong to the surrounding transaction.
//!
//! ## Canonical Byte Format
//!
//! [`OperationPayload::canonical_bytes`] produces the deterministic encoding
//! that gets folded into the signable transaction bytes. The format is a
//! kind tag, a NUL, then the fields: entity ids as fixed-width little-endian
//! `realm`/`num` pairs, amounts as little-endian integers, strings and blobs
//! length-prefixed with a u32, optional fields behind a presence flag byte.
//! Serde is deliberately not on this path; field order in a serializer is a
//! promise nobody actually makes.

use serde::{Deserialize, Serialize};

use crate::client::ids::{AccountId, FileId, ScheduleId, TokenId};
use crate::keys::{KeyList, LedgerKey};
use crate::settlement::movement::{Movement, UnitTransfer};
use crate::units::Marks;

/// The operation a transaction performs, one variant per network operation
/// the orchestrator can submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationPayload {
    /// Create an account keyed by `key`, funded with `initial_balance`
    /// from the payer.
    AccountCreate {
        key: LedgerKey,
        initial_balance: Marks,
        memo: String,
    },

    /// Update an existing account's key and/or memo. `None` leaves the
    /// field untouched on-ledger.
    AccountUpdate {
        account: AccountId,
        new_key: Option<LedgerKey>,
        memo: Option<String>,
    },

    /// Open relationships between an account and the listed tokens.
    TokenAssociate {
        account: AccountId,
        tokens: Vec<TokenId>,
    },

    /// Close relationships between an account and the listed tokens.
    TokenDissociate {
        account: AccountId,
        tokens: Vec<TokenId>,
    },

    /// Freeze one account's relationship with a token.
    TokenFreeze { token: TokenId, account: AccountId },

    /// Thaw one account's relationship with a token.
    TokenUnfreeze { token: TokenId, account: AccountId },

    /// Pause all operations on a token.
    TokenPause { token: TokenId },

    /// Resume operations on a paused token.
    TokenUnpause { token: TokenId },

    /// Mint supply: `amount` for fungible tokens, one serial per `metadata`
    /// entry for unique units. The treasury receives what is minted.
    TokenMint {
        token: TokenId,
        amount: u64,
        metadata: Vec<Vec<u8>>,
    },

    /// Move value: fungible deltas that must conserve per asset, plus
    /// ownership swaps of serial-numbered units.
    Transfer {
        movements: Vec<Movement>,
        unit_transfers: Vec<UnitTransfer>,
    },

    /// Store a new file guarded by `keys`.
    FileCreate {
        contents: Vec<u8>,
        keys: KeyList,
        memo: String,
    },

    /// Append bytes to an existing file.
    FileAppend { file: FileId, contents: Vec<u8> },

    /// Replace a file's contents, and optionally its guarding keys and
    /// memo. `None` leaves the field untouched.
    FileUpdate {
        file: FileId,
        contents: Vec<u8>,
        new_keys: Option<KeyList>,
        memo: Option<String>,
    },

    /// Delete a file.
    FileDelete { file: FileId },

    /// Park `inner` on the network to execute once enough signatures
    /// arrive via `ScheduleSign`.
    ScheduleCreate {
        inner: Box<OperationPayload>,
        schedule_memo: String,
    },

    /// Add the signer's signatures to a parked schedule.
    ScheduleSign { schedule: ScheduleId },
}

impl OperationPayload {
    /// Stable name of the operation, used as the canonical-bytes tag and in
    /// log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AccountCreate { .. } => "ACCOUNT_CREATE",
            Self::AccountUpdate { .. } => "ACCOUNT_UPDATE",
            Self::TokenAssociate { .. } => "TOKEN_ASSOCIATE",
            Self::TokenDissociate { .. } => "TOKEN_DISSOCIATE",
            Self::TokenFreeze { .. } => "TOKEN_FREEZE",
            Self::TokenUnfreeze { .. } => "TOKEN_UNFREEZE",
            Self::TokenPause { .. } => "TOKEN_PAUSE",
            Self::TokenUnpause { .. } => "TOKEN_UNPAUSE",
            Self::TokenMint { .. } => "TOKEN_MINT",
            Self::Transfer { .. } => "TRANSFER",
            Self::FileCreate { .. } => "FILE_CREATE",
            Self::FileAppend { .. } => "FILE_APPEND",
            Self::FileUpdate { .. } => "FILE_UPDATE",
            Self::FileDelete { .. } => "FILE_DELETE",
            Self::ScheduleCreate { .. } => "SCHEDULE_CREATE",
            Self::ScheduleSign { .. } => "SCHEDULE_SIGN",
        }
    }

    /// Deterministic encoding of the payload for signing and body hashing.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(128);
        buf.extend_from_slice(self.kind().as_bytes());
        buf.push(0x00);

        match self {
            Self::AccountCreate {
                key,
                initial_balance,
                memo,
            } => {
                push_blob(&mut buf, &key.canonical_bytes());
                buf.extend_from_slice(&initial_balance.grains().to_le_bytes());
                push_blob(&mut buf, memo.as_bytes());
            }
            Self::AccountUpdate {
                account,
                new_key,
                memo,
            } => {
                push_entity(&mut buf, account.realm(), account.num());
                push_opt(&mut buf, new_key.as_ref(), |buf, key| {
                    push_blob(buf, &key.canonical_bytes())
                });
                push_opt(&mut buf, memo.as_ref(), |buf, memo| {
                    push_blob(buf, memo.as_bytes())
                });
            }
            Self::TokenAssociate { account, tokens } | Self::TokenDissociate { account, tokens } => {
                push_entity(&mut buf, account.realm(), account.num());
                buf.extend_from_slice(&(tokens.len() as u32).to_le_bytes());
                for token in tokens {
                    push_entity(&mut buf, token.realm(), token.num());
                }
            }
            Self::TokenFreeze { token, account } | Self::TokenUnfreeze { token, account } => {
                push_entity(&mut buf, token.realm(), token.num());
                push_entity(&mut buf, account.realm(), account.num());
            }
            Self::TokenPause { token } | Self::TokenUnpause { token } => {
                push_entity(&mut buf, token.realm(), token.num());
            }
            Self::TokenMint {
                token,
                amount,
                metadata,
            } => {
                push_entity(&mut buf, token.realm(), token.num());
                buf.extend_from_slice(&amount.to_le_bytes());
                buf.extend_from_slice(&(metadata.len() as u32).to_le_bytes());
                for entry in metadata {
                    push_blob(&mut buf, entry);
                }
            }
            Self::Transfer {
                movements,
                unit_transfers,
            } => {
                buf.extend_from_slice(&(movements.len() as u32).to_le_bytes());
                for movement in movements {
                    buf.extend_from_slice(&movement.canonical_bytes());
                }
                buf.extend_from_slice(&(unit_transfers.len() as u32).to_le_bytes());
                for transfer in unit_transfers {
                    buf.extend_from_slice(&transfer.canonical_bytes());
                }
            }
            Self::FileCreate {
                contents,
                keys,
                memo,
            } => {
                push_blob(&mut buf, contents);
                push_blob(&mut buf, &keys.canonical_bytes());
                push_blob(&mut buf, memo.as_bytes());
            }
            Self::FileAppend { file, contents } => {
                push_entity(&mut buf, file.realm(), file.num());
                push_blob(&mut buf, contents);
            }
            Self::FileUpdate {
                file,
                contents,
                new_keys,
                memo,
            } => {
                push_entity(&mut buf, file.realm(), file.num());
                push_blob(&mut buf, contents);
                push_opt(&mut buf, new_keys.as_ref(), |buf, keys| {
                    push_blob(buf, &keys.canonical_bytes())
                });
                push_opt(&mut buf, memo.as_ref(), |buf, memo| {
                    push_blob(buf, memo.as_bytes())
                });
            }
            Self::FileDelete { file } => {
                push_entity(&mut buf, file.realm(), file.num());
            }
            Self::ScheduleCreate {
                inner,
                schedule_memo,
            } => {
                push_blob(&mut buf, &inner.canonical_bytes());
                push_blob(&mut buf, schedule_memo.as_bytes());
            }
            Self::ScheduleSign { schedule } => {
                push_entity(&mut buf, schedule.realm(), schedule.num());
            }
        }

        buf
    }
}

fn push_entity(buf: &mut Vec<u8>, realm: u64, num: u64) {
    buf.extend_from_slice(&realm.to_le_bytes());
    buf.extend_from_slice(&num.to_le_bytes());
}

fn push_blob(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(bytes);
}

fn push_opt<T>(buf: &mut Vec<u8>, value: Option<&T>, encode: impl FnOnce(&mut Vec<u8>, &T)) {
    match value {
        Some(v) => {
            buf.push(0x01);
            encode(buf, v);
        }
        None => buf.push(0x00),
    }
}
