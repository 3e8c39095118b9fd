//! Calendar month a fixed bill belongs to, stored as `"M/YYYY"`.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::EngineError;

const MONTH_NAMES: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthYear {
    year: i32,
    month: u32,
}

impl MonthYear {
    pub fn new(month: u32, year: i32) -> Result<Self, EngineError> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::InvalidInput(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        Ok(Self { year, month })
    }

    /// Month of "now" in UTC.
    pub fn current() -> Self {
        let now = Utc::now();
        Self {
            year: now.year(),
            month: now.month(),
        }
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn year(self) -> i32 {
        self.year
    }

    /// Whether `instant` falls in this month (UTC).
    pub fn contains(self, instant: DateTime<Utc>) -> bool {
        instant.year() == self.year && instant.month() == self.month
    }

    /// Long label, e.g. `outubro de 2026`.
    pub fn label(self) -> String {
        let name = MONTH_NAMES[(self.month - 1) as usize];
        format!("{name} de {}", self.year)
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.month, self.year)
    }
}

impl FromStr for MonthYear {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidInput(format!("invalid month/year: {s}"));
        let (month, year) = s.trim().split_once('/').ok_or_else(invalid)?;
        let month: u32 = month.trim().parse().map_err(|_| invalid())?;
        let year: i32 = year.trim().parse().map_err(|_| invalid())?;
        Self::new(month, year)
    }
}

impl TryFrom<String> for MonthYear {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthYear> for String {
    fn from(value: MonthYear) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_without_leading_zero() {
        let month = MonthYear::new(3, 2026).unwrap();
        assert_eq!(month.to_string(), "3/2026");
        assert_eq!(month.label(), "março de 2026");
    }

    #[test]
    fn contains_instants_of_the_month() {
        use chrono::TimeZone;

        let month = MonthYear::new(10, 2026).unwrap();
        assert!(month.contains(Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap()));
        assert!(month.contains(Utc.with_ymd_and_hms(2026, 10, 31, 23, 59, 59).unwrap()));
        assert!(!month.contains(Utc.with_ymd_and_hms(2026, 11, 1, 0, 0, 0).unwrap()));
        assert!(!month.contains(Utc.with_ymd_and_hms(2025, 10, 15, 0, 0, 0).unwrap()));
    }

    #[test]
    fn parses_store_format() {
        let month: MonthYear = "10/2026".parse().unwrap();
        assert_eq!(month.month(), 10);
        assert_eq!(month.year(), 2026);
        assert_eq!("03/2026".parse::<MonthYear>().unwrap().to_string(), "3/2026");
    }

    #[test]
    fn rejects_garbage() {
        assert!("13/2026".parse::<MonthYear>().is_err());
        assert!("2026-10".parse::<MonthYear>().is_err());
        assert!("".parse::<MonthYear>().is_err());
    }
}
