// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Native Amounts
//!
//! [`Marks`] is the native-unit amount type. Internally it is always a
//! signed count of grains (10^-8 of a mark), because settlement math deals
//! in deltas: a debit is a negative movement, a credit a positive one.
//! Balances are simply the non-negative corner of the same type.
//!
//! Wherever a human sees an amount it is rendered in marks with all eight
//! decimals, but no arithmetic ever happens in the display unit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use crate::config::GRAINS_PER_MARK;

/// A signed amount of the native unit, counted in grains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Marks(i64);

impl Marks {
    pub const ZERO: Marks = Marks(0);

    /// An amount given directly in grains.
    pub const fn from_grains(grains: i64) -> Self {
        Marks(grains)
    }

    /// An amount given in whole marks. The grain representation overflows
    /// past ninety billion marks, far beyond the network's total supply.
    pub const fn from_marks(marks: i64) -> Self {
        Marks(marks * GRAINS_PER_MARK as i64)
    }

    /// The raw grain count.
    pub const fn grains(&self) -> i64 {
        self.0
    }

    /// True for amounts strictly below zero.
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Overflow-checked addition, for code that sums untrusted inputs.
    pub fn checked_add(self, other: Marks) -> Option<Marks> {
        self.0.checked_add(other.0).map(Marks)
    }
}

impl Add for Marks {
    type Output = Marks;
    fn add(self, rhs: Marks) -> Marks {
        Marks(self.0 + rhs.0)
    }
}

impl Sub for Marks {
    type Output = Marks;
    fn sub(self, rhs: Marks) -> Marks {
        Marks(self.0 - rhs.0)
    }
}

impl Neg for Marks {
    type Output = Marks;
    fn neg(self) -> Marks {
        Marks(-self.0)
    }
}

impl AddAssign for Marks {
    fn add_assign(&mut self, rhs: Marks) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Marks {
    fn sub_assign(&mut self, rhs: Marks) {
        self.0 -= rhs.0;
    }
}

impl Sum for Marks {
    fn sum<I: Iterator<Item = Marks>>(iter: I) -> Marks {
        iter.fold(Marks::ZERO, Add::add)
    }
}

impl fmt::Display for Marks {
    /// Renders in marks with all eight decimals: `-1.50000000`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grains = self.0.unsigned_abs();
        let whole = grains / GRAINS_PER_MARK;
        let frac = grains % GRAINS_PER_MARK;
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{sign}{whole}.{frac:08}")
    }
}
