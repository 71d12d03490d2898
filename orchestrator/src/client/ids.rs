// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Entity Identifiers
//!
//! Everything addressable on the ledger (accounts, tokens, files, schedules)
//! is named by a realm number and an entity number, rendered as `realm.num`.
//! The numbering is assigned by the network at creation time; the
//! orchestrator only ever parses, carries, and prints these, never invents
//! them.
//!
//! The four entity kinds get distinct newtypes so that a token id cannot
//! wander into an account parameter. The compiler is cheaper than a
//! production incident.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Failure to parse a `realm.num` identifier.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected an id of the form `realm.num`, got {0:?}")]
pub struct IdParseError(pub String);

// ---------------------------------------------------------------------------
// LedgerId
// ---------------------------------------------------------------------------

/// The raw two-part address underneath every entity id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LedgerId {
    realm: u64,
    num: u64,
}

impl LedgerId {
    pub const fn new(realm: u64, num: u64) -> Self {
        Self { realm, num }
    }

    pub const fn realm(&self) -> u64 {
        self.realm
    }

    pub const fn num(&self) -> u64 {
        self.num
    }
}

impl fmt::Display for LedgerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.realm, self.num)
    }
}

impl fmt::Debug for LedgerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LedgerId({self})")
    }
}

impl FromStr for LedgerId {
    type Err = IdParseError;

    /// Strict parse: exactly two decimal components, no signs, no spaces.
    /// Anything looser belongs at the UI boundary, not in the core.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || IdParseError(s.to_string());
        let (realm, num) = s.split_once('.').ok_or_else(malformed)?;
        if num.contains('.') {
            return Err(malformed());
        }
        let parse = |part: &str| -> Result<u64, IdParseError> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            part.parse().map_err(|_| malformed())
        };
        Ok(LedgerId::new(parse(realm)?, parse(num)?))
    }
}

// Entity ids travel through JSON as their display strings, matching the
// mirror API's rendering, not as nested structs.
impl Serialize for LedgerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LedgerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Entity Newtypes
// ---------------------------------------------------------------------------

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(LedgerId);

        impl $name {
            pub const fn new(realm: u64, num: u64) -> Self {
                Self(LedgerId::new(realm, num))
            }

            pub const fn realm(&self) -> u64 {
                self.0.realm()
            }

            pub const fn num(&self) -> u64 {
                self.0.num()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<LedgerId>().map(Self)
            }
        }

        impl From<LedgerId> for $name {
            fn from(id: LedgerId) -> Self {
                Self(id)
            }
        }
    };
}

entity_id! {
    /// An account: holds native balance, token relationships, and the key
    /// structure that authorizes spending from it.
    AccountId
}

entity_id! {
    /// A token type registered on the ledger, fungible or otherwise.
    TokenId
}

entity_id! {
    /// A file stored on the ledger, addressed as content plus metadata.
    FileId
}

entity_id! {
    /// A scheduled transaction parked on the network awaiting signatures.
    ScheduleId
}
