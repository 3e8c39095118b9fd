use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};

use crate::SplitCount;

/// Money amount represented as **integer cents**.
///
/// Every monetary value in the engine (item prices, bill amounts, cached
/// session totals, aggregated shares) uses this type so sums never drift.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "R$ 12,34");
/// ```
///
/// Splitting rounds half away from zero:
///
/// ```rust
/// use engine::{MoneyCents, SplitCount};
///
/// assert_eq!(MoneyCents::new(200).split(SplitCount::new(3)).cents(), 67);
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Divides the amount among `split` people, rounding half away from zero
    /// to the nearest cent.
    ///
    /// ```rust
    /// use engine::{MoneyCents, SplitCount};
    ///
    /// assert_eq!(MoneyCents::new(100_00).split(SplitCount::new(4)).cents(), 25_00);
    /// assert_eq!(MoneyCents::new(10).split(SplitCount::new(3)).cents(), 3);
    /// assert_eq!(MoneyCents::new(5).split(SplitCount::new(2)).cents(), 3);
    /// ```
    #[must_use]
    pub fn split(self, split: SplitCount) -> MoneyCents {
        let divisor = i64::from(split.get());
        let quotient = self.0 / divisor;
        let remainder = self.0 % divisor;
        if remainder.abs() * 2 >= divisor {
            MoneyCents(quotient + self.0.signum())
        } else {
            MoneyCents(quotient)
        }
    }

    /// Multiplies a unit price by a quantity, saturating instead of
    /// overflowing.
    #[must_use]
    pub fn times(self, quantity: i32) -> MoneyCents {
        MoneyCents(self.0.saturating_mul(i64::from(quantity)))
    }

    /// Amount as a plain decimal string (`"12.34"`), used by CSV exports.
    #[must_use]
    pub fn to_decimal_string(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}R$ {units},{cents:02}")
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for MoneyCents {
    fn sub_assign(&mut self, rhs: MoneyCents) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(MoneyCents::ZERO, Add::add)
    }
}
