//! Number of people a shared cost is divided among.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Split count used by sessions and bills.
///
/// Always `>= 1`: a missing, zero or negative value falls back to
/// [`SplitCount::DEFAULT`], so dividing by it can never fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct SplitCount(i32);

impl SplitCount {
    pub const DEFAULT: SplitCount = SplitCount(2);

    #[must_use]
    pub const fn new(value: i32) -> Self {
        if value <= 0 { Self::DEFAULT } else { Self(value) }
    }

    /// Coerces an optional stored value.
    #[must_use]
    pub fn from_optional(value: Option<i32>) -> Self {
        value.map_or(Self::DEFAULT, Self::new)
    }

    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl Default for SplitCount {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<i32> for SplitCount {
    fn from(value: i32) -> Self {
        Self::new(value)
    }
}

impl From<SplitCount> for i32 {
    fn from(value: SplitCount) -> Self {
        value.0
    }
}

impl fmt::Display for SplitCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_falls_back_to_two() {
        assert_eq!(SplitCount::new(0).get(), 2);
        assert_eq!(SplitCount::new(-3).get(), 2);
        assert_eq!(SplitCount::from_optional(None).get(), 2);
    }

    #[test]
    fn positive_values_are_kept() {
        assert_eq!(SplitCount::new(1).get(), 1);
        assert_eq!(SplitCount::new(5).get(), 5);
        assert_eq!(SplitCount::from_optional(Some(3)).get(), 3);
    }

    #[test]
    fn deserializes_through_coercion() {
        let split: SplitCount = serde_json::from_str("0").unwrap();
        assert_eq!(split, SplitCount::DEFAULT);
    }
}
