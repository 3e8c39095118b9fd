//! Recurring monthly bills (rent, internet, ...).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, MonthYear, SplitCount, util::parse_uuid};

pub const DEFAULT_DUE_DAY: i32 = 10;

/// A fixed bill scoped to one calendar month.
///
/// Unlike sessions, the paid flag can be toggled back and forth.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub amount: MoneyCents,
    /// Day of the month, `1..=31`.
    pub due_day: i32,
    pub split_count: SplitCount,
    pub month_year: MonthYear,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
}

impl Bill {
    /// Part of the amount owed by the user.
    pub fn user_part(&self) -> MoneyCents {
        self.amount.split(self.split_count)
    }
}

/// Clamps a due day into `1..=31`, defaulting to the 10th.
pub(crate) fn normalize_due_day(due_day: Option<i32>) -> i32 {
    due_day.map_or(DEFAULT_DUE_DAY, |day| day.clamp(1, 31))
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "fixed_bills")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub amount: Option<i64>,
    pub due_day: Option<i32>,
    pub month_year: String,
    pub is_paid: Option<bool>,
    pub split_count: Option<i32>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Bill> for ActiveModel {
    fn from(value: &Bill) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            title: ActiveValue::Set(value.title.clone()),
            amount: ActiveValue::Set(Some(value.amount.cents())),
            due_day: ActiveValue::Set(Some(value.due_day)),
            month_year: ActiveValue::Set(value.month_year.to_string()),
            is_paid: ActiveValue::Set(Some(value.is_paid)),
            split_count: ActiveValue::Set(Some(value.split_count.get())),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Bill {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "bill")?,
            user_id: model.user_id,
            title: model.title,
            amount: MoneyCents::new(model.amount.unwrap_or(0)),
            due_day: normalize_due_day(model.due_day),
            split_count: SplitCount::from_optional(model.split_count),
            month_year: model.month_year.parse()?,
            is_paid: model.is_paid.unwrap_or(false),
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn user_part_divides_by_split() {
        let bill = Bill::try_from(Model {
            id: Uuid::new_v4().to_string(),
            user_id: "alice".to_string(),
            title: "Aluguel".to_string(),
            amount: Some(9000),
            due_day: None,
            month_year: "10/2026".to_string(),
            is_paid: None,
            split_count: Some(3),
            created_at: Utc.timestamp_opt(0, 0).unwrap(),
        })
        .unwrap();

        assert_eq!(bill.user_part().cents(), 3000);
        assert_eq!(bill.due_day, DEFAULT_DUE_DAY);
        assert!(!bill.is_paid);
    }

    #[test]
    fn due_day_is_clamped() {
        assert_eq!(normalize_due_day(Some(0)), 1);
        assert_eq!(normalize_due_day(Some(45)), 31);
        assert_eq!(normalize_due_day(Some(5)), 5);
    }
}
