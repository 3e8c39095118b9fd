use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Forgiving deserializers for numeric request fields.
///
/// Clients send numbers, numeric strings (`"12"`, `"R$ 10,50"`) or `null`.
/// Required fields coerce anything unreadable to `0`; optional fields treat
/// it as absent so the server default applies.
pub mod lenient {
    use serde::{Deserialize, Deserializer, de::IgnoredAny};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
        Other(IgnoredAny),
    }

    impl Raw {
        /// Counts: decimals are rounded.
        fn to_count(&self) -> Option<i64> {
            match self {
                Raw::Int(value) => Some(*value),
                Raw::Float(value) if value.is_finite() => Some(value.round() as i64),
                Raw::Float(_) => None,
                Raw::Text(text) => {
                    let text = text.trim().replace(',', ".");
                    text.parse::<i64>().ok().or_else(|| {
                        text.parse::<f64>()
                            .ok()
                            .filter(|v| v.is_finite())
                            .map(|v| v.round() as i64)
                    })
                }
                Raw::Other(_) => None,
            }
        }

        /// Money: numbers are cents, text with a decimal separator is reais.
        fn to_cents(&self) -> Option<i64> {
            match self {
                Raw::Int(value) => Some(*value),
                Raw::Float(value) if value.is_finite() && value.fract() == 0.0 => {
                    Some(*value as i64)
                }
                Raw::Float(_) => None,
                Raw::Text(text) => {
                    let text = text.trim();
                    text.parse::<i64>().ok().or_else(|| parse_reais(text))
                }
                Raw::Other(_) => None,
            }
        }
    }

    /// Parses a reais amount such as `10,50`, `R$ 3,9` or `-0.01` into cents.
    ///
    /// Exactly one `.` or `,` separator with at most 2 fractional digits;
    /// `12.345` and `1.234,56` are rejected.
    fn parse_reais(text: &str) -> Option<i64> {
        let text = text.trim();
        let text = text.strip_prefix("R$").unwrap_or(text).trim();
        let (negative, text) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let (units, fraction) = text.split_once([',', '.'])?;
        let digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if units.is_empty() || !digits(units) || !digits(fraction) || fraction.len() > 2 {
            return None;
        }

        let units: i64 = units.parse().ok()?;
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().ok()? * 10,
            _ => fraction.parse().ok()?,
        };
        let cents = units.checked_mul(100)?.checked_add(fraction)?;
        Some(if negative { -cents } else { cents })
    }

    fn raw<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Raw>, D::Error> {
        Option::<Raw>::deserialize(deserializer)
    }

    fn narrow(value: i64) -> i32 {
        value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }

    /// Cents, `0` when null or unreadable. Pair with `#[serde(default)]`.
    pub fn cents_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        Ok(raw(deserializer)?.and_then(|raw| raw.to_cents()).unwrap_or(0))
    }

    /// Optional cents, `None` when null or unreadable. Pair with `#[serde(default)]`.
    pub fn opt_cents<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        Ok(raw(deserializer)?.and_then(|raw| raw.to_cents()))
    }

    /// `Option<i32>`, saturating, `None` when null or unreadable.
    pub fn opt_i32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
        Ok(raw(deserializer)?
            .and_then(|raw| raw.to_count())
            .map(narrow))
    }
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Credentials {
        pub email: String,
        pub password: String,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub email: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthResponse {
        /// Bearer token for the `Authorization` header.
        pub token: String,
        pub user: UserView,
    }
}

pub mod session {
    use super::*;
    use crate::item::ItemView;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SessionNew {
        pub title: String,
        /// Missing or non-positive values mean 2.
        #[serde(default, deserialize_with = "crate::lenient::opt_i32")]
        pub split_count: Option<i32>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SessionUpdate {
        pub title: Option<String>,
        #[serde(default, deserialize_with = "crate::lenient::opt_i32")]
        pub split_count: Option<i32>,
        /// Only `true` is accepted on a finalized session.
        pub is_finalized: Option<bool>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SessionListQuery {
        /// Accent- and case-insensitive title filter.
        pub search: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct SessionView {
        pub id: Uuid,
        pub title: String,
        pub split_count: i32,
        pub created_at: DateTime<Utc>,
        pub total_shared_minor: i64,
        pub total_personal_minor: i64,
        pub grand_total_minor: i64,
        pub is_finalized: bool,
    }

    /// Live totals computed from the items of a session.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TotalsView {
        pub shared_minor: i64,
        pub personal_minor: i64,
        pub friend_share_minor: i64,
        pub user_total_minor: i64,
        pub split_count: i32,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct SessionDetailView {
        pub session: SessionView,
        pub items: Vec<ItemView>,
        pub totals: TotalsView,
    }
}

pub mod item {
    use super::*;
    use crate::session::TotalsView;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ItemNew {
        pub name: String,
        /// Unit price in cents.
        #[serde(default, deserialize_with = "crate::lenient::cents_or_zero")]
        pub price_minor: i64,
        /// Values below 1 are stored as 1.
        #[serde(default, deserialize_with = "crate::lenient::opt_i32")]
        pub quantity: Option<i32>,
        #[serde(default)]
        pub is_personal: bool,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ItemView {
        pub id: Uuid,
        pub session_id: Uuid,
        pub name: String,
        pub price_minor: i64,
        pub quantity: i32,
        pub is_personal: bool,
        pub line_total_minor: i64,
        pub created_at: DateTime<Utc>,
    }

    /// Response of item writes: the item (if created) and fresh totals.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemChange {
        pub item: Option<ItemView>,
        pub totals: TotalsView,
    }
}

pub mod bill {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BillNew {
        pub title: String,
        #[serde(default, deserialize_with = "crate::lenient::cents_or_zero")]
        pub amount_minor: i64,
        /// Defaults to 10, clamped to 1..=31.
        #[serde(default, deserialize_with = "crate::lenient::opt_i32")]
        pub due_day: Option<i32>,
        #[serde(default, deserialize_with = "crate::lenient::opt_i32")]
        pub split_count: Option<i32>,
        /// `"M/YYYY"`, the current month when absent.
        pub month_year: Option<String>,
        #[serde(default)]
        pub is_paid: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BillUpdate {
        pub title: Option<String>,
        #[serde(default, deserialize_with = "crate::lenient::opt_cents")]
        pub amount_minor: Option<i64>,
        #[serde(default, deserialize_with = "crate::lenient::opt_i32")]
        pub due_day: Option<i32>,
        #[serde(default, deserialize_with = "crate::lenient::opt_i32")]
        pub split_count: Option<i32>,
        pub month_year: Option<String>,
        pub is_paid: Option<bool>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BillListQuery {
        /// `"M/YYYY"`; all months when absent.
        pub month_year: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct BillView {
        pub id: Uuid,
        pub title: String,
        pub amount_minor: i64,
        pub due_day: i32,
        pub split_count: i32,
        pub month_year: String,
        pub is_paid: bool,
        pub user_part_minor: i64,
        pub created_at: DateTime<Utc>,
    }
}

pub mod stats {
    use super::*;
    use crate::{
        bill::BillView,
        session::{SessionDetailView, SessionView},
    };

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct StatsQuery {
        /// Session open in detail; its live totals replace the cached ones.
        pub open_session: Option<Uuid>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AnalyticsQuery {
        pub month_year: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct GlobalStatsView {
        pub total_shared_minor: i64,
        pub total_personal_minor: i64,
        pub total_gained_minor: i64,
        pub unpaid_total_minor: i64,
        pub unpaid_user_part_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AnalyticsView {
        pub month_year: String,
        pub shopping_shared_minor: i64,
        pub shopping_personal_minor: i64,
        pub total_market_minor: i64,
        pub bills_total_minor: i64,
        pub bills_user_part_minor: i64,
        pub session_count: usize,
        pub bill_count: usize,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardView {
        pub month_year: String,
        pub month_label: String,
        pub recent_sessions: Vec<SessionView>,
        pub pending_bills: Vec<BillView>,
        pub bills: Vec<BillView>,
        pub open_session: Option<SessionDetailView>,
        pub stats: GlobalStatsView,
    }
}

pub mod report {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ReportFormat {
        #[default]
        Text,
        Csv,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ReportQuery {
        pub format: Option<ReportFormat>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MonthlyReportQuery {
        /// `"M/YYYY"`; the current month when absent.
        pub month_year: Option<String>,
        pub format: Option<ReportFormat>,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        bill::{BillNew, BillUpdate},
        item::ItemNew,
        session::SessionNew,
    };

    #[test]
    fn numeric_strings_are_accepted() {
        let item: ItemNew = serde_json::from_str(
            r#"{"name":"Arroz","price_minor":"1050","quantity":"3","is_personal":true}"#,
        )
        .unwrap();
        assert_eq!(item.price_minor, 1050);
        assert_eq!(item.quantity, Some(3));
        assert!(item.is_personal);
    }

    #[test]
    fn garbage_and_null_coerce() {
        let item: ItemNew =
            serde_json::from_str(r#"{"name":"Arroz","price_minor":"abc","quantity":null}"#)
                .unwrap();
        assert_eq!(item.price_minor, 0);
        assert_eq!(item.quantity, None);

        let item: ItemNew = serde_json::from_str(r#"{"name":"Arroz","price_minor":[1]}"#).unwrap();
        assert_eq!(item.price_minor, 0);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let session: SessionNew = serde_json::from_str(r#"{"title":"Mercado"}"#).unwrap();
        assert_eq!(session.split_count, None);

        let bill: BillNew = serde_json::from_str(r#"{"title":"Luz"}"#).unwrap();
        assert_eq!(bill.amount_minor, 0);
        assert_eq!(bill.due_day, None);
        assert!(!bill.is_paid);
    }

    #[test]
    fn counts_are_rounded_but_fractional_cents_are_not() {
        let bill: BillNew =
            serde_json::from_str(r#"{"title":"Luz","amount_minor":99.6,"split_count":"2,0"}"#)
                .unwrap();
        assert_eq!(bill.amount_minor, 0);
        assert_eq!(bill.split_count, Some(2));

        let bill: BillNew =
            serde_json::from_str(r#"{"title":"Luz","amount_minor":1050.0}"#).unwrap();
        assert_eq!(bill.amount_minor, 1050);
    }

    #[test]
    fn decimal_text_is_read_as_reais() {
        let cents = |raw: &str| {
            let json = format!(r#"{{"name":"Arroz","price_minor":{raw}}}"#);
            serde_json::from_str::<ItemNew>(&json).unwrap().price_minor
        };

        assert_eq!(cents(r#""10,50""#), 1050);
        assert_eq!(cents(r#""10.5""#), 1050);
        assert_eq!(cents(r#""R$ 3,99""#), 399);
        assert_eq!(cents(r#""-0,01""#), -1);
        assert_eq!(cents(r#""1000""#), 1000);
        assert_eq!(cents(r#""12.345""#), 0);
        assert_eq!(cents(r#""1.234,56""#), 0);
        assert_eq!(cents(r#""R$""#), 0);
    }

    #[test]
    fn unreadable_optional_amount_is_absent() {
        let patch: BillUpdate =
            serde_json::from_str(r#"{"amount_minor":"12,345"}"#).unwrap();
        assert_eq!(patch.amount_minor, None);

        let patch: BillUpdate = serde_json::from_str(r#"{"amount_minor":"89,90"}"#).unwrap();
        assert_eq!(patch.amount_minor, Some(8990));
    }
}
