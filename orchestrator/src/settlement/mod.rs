// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Settlement
//!
//! Atomic movement of value between parties: the movement vocabulary and
//! the composer that turns movements into signed or scheduled settlements.

pub mod composer;
pub mod movement;

pub use composer::{Settlement, SettlementComposer};
pub use movement::{is_conserved, net_by_asset, AssetKind, Movement, UnitTransfer};
