// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Movements
//!
//! A settlement is a list of [`Movement`]s: signed balance deltas against
//! accounts. Debits are negative, credits positive, and within one
//! transaction the deltas for each asset must net to exactly zero. The
//! ledger enforces that rule at consensus; the orchestrator checks it
//! locally only to warn callers before they waste a round trip.
//!
//! Unique units (serial-numbered tokens) move by ownership swap rather than
//! by delta, so they get their own [`UnitTransfer`] shape instead of
//! pretending to be an amount.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::client::ids::{AccountId, TokenId};
use crate::units::Marks;

// ---------------------------------------------------------------------------
// AssetKind
// ---------------------------------------------------------------------------

/// What a movement moves: the native unit or a fungible token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    /// The native unit. Deltas are counted in grains.
    Native,
    /// A fungible token. Deltas are counted in the token's smallest unit,
    /// whatever its decimals say that is.
    Token(TokenId),
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Native => write!(f, "native"),
            AssetKind::Token(id) => write!(f, "token {id}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Movement
// ---------------------------------------------------------------------------

/// One signed balance change against one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub account: AccountId,
    pub asset: AssetKind,
    /// Grains for [`AssetKind::Native`], smallest token units otherwise.
    /// Negative means the account pays, positive means it receives.
    pub delta: i64,
}

impl Movement {
    /// A native-unit movement.
    pub fn native(account: AccountId, amount: Marks) -> Self {
        Movement {
            account,
            asset: AssetKind::Native,
            delta: amount.grains(),
        }
    }

    /// A fungible-token movement, in the token's smallest unit.
    pub fn token(account: AccountId, token: TokenId, delta: i64) -> Self {
        Movement {
            account,
            asset: AssetKind::Token(token),
            delta,
        }
    }

    /// Canonical byte form for signable transaction bytes: account, asset
    /// tag, delta, all fixed-width little-endian.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(34);
        out.extend_from_slice(&self.account.realm().to_le_bytes());
        out.extend_from_slice(&self.account.num().to_le_bytes());
        match self.asset {
            AssetKind::Native => out.push(0x00),
            AssetKind::Token(token) => {
                out.push(0x01);
                out.extend_from_slice(&token.realm().to_le_bytes());
                out.extend_from_slice(&token.num().to_le_bytes());
            }
        }
        out.extend_from_slice(&self.delta.to_le_bytes());
        out
    }
}

// ---------------------------------------------------------------------------
// UnitTransfer
// ---------------------------------------------------------------------------

/// Ownership change of one serial-numbered unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTransfer {
    pub token: TokenId,
    pub serial: i64,
    pub from: AccountId,
    pub to: AccountId,
}

impl UnitTransfer {
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(56);
        out.extend_from_slice(&self.token.realm().to_le_bytes());
        out.extend_from_slice(&self.token.num().to_le_bytes());
        out.extend_from_slice(&self.serial.to_le_bytes());
        out.extend_from_slice(&self.from.realm().to_le_bytes());
        out.extend_from_slice(&self.from.num().to_le_bytes());
        out.extend_from_slice(&self.to.realm().to_le_bytes());
        out.extend_from_slice(&self.to.num().to_le_bytes());
        out
    }
}

// ---------------------------------------------------------------------------
// Conservation
// ---------------------------------------------------------------------------

/// Net delta per asset across a movement list. Accumulated in i128 so that
/// adversarial i64 extremes cannot overflow the check itself.
pub fn net_by_asset(movements: &[Movement]) -> BTreeMap<AssetKind, i128> {
    let mut nets: BTreeMap<AssetKind, i128> = BTreeMap::new();
    for movement in movements {
        *nets.entry(movement.asset).or_default() += i128::from(movement.delta);
    }
    nets
}

/// Whether every asset in the list nets to zero. The ledger rejects
/// anything that does not; this is the advisory local version of the same
/// rule.
pub fn is_conserved(movements: &[Movement]) -> bool {
    net_by_asset(movements).values().all(|net| *net == 0)
}
