//! Shopping sessions.
//!
//! A `Session` is one shopping trip. Its `total_shared_cost` and
//! `total_personal_cost` are denormalized sums of its items, refreshed by the
//! aggregator and written back to the store.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, SplitCount, aggregator::CachedTotals, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub split_count: SplitCount,
    pub created_at: DateTime<Utc>,
    pub total_shared_cost: MoneyCents,
    pub total_personal_cost: MoneyCents,
    pub is_finalized: bool,
}

impl Session {
    pub fn new(user_id: &str, title: String, split_count: SplitCount) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title,
            split_count,
            created_at: Utc::now(),
            total_shared_cost: MoneyCents::ZERO,
            total_personal_cost: MoneyCents::ZERO,
            is_finalized: false,
        }
    }

    /// Totals as last persisted.
    pub fn cached_totals(&self) -> CachedTotals {
        CachedTotals {
            shared: self.total_shared_cost,
            personal: self.total_personal_cost,
        }
    }

    pub fn is_open(&self) -> bool {
        !self.is_finalized
    }

    /// Grand total (shared + personal) shown in the purchase history.
    pub fn grand_total(&self) -> MoneyCents {
        self.total_shared_cost + self.total_personal_cost
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "shopping_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub split_count: Option<i32>,
    pub created_at: DateTimeUtc,
    pub total_shared_cost: Option<i64>,
    pub total_personal_cost: Option<i64>,
    pub is_finalized: Option<bool>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::items::Entity")]
    Items,
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Session> for ActiveModel {
    fn from(value: &Session) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            title: ActiveValue::Set(value.title.clone()),
            split_count: ActiveValue::Set(Some(value.split_count.get())),
            created_at: ActiveValue::Set(value.created_at),
            total_shared_cost: ActiveValue::Set(Some(value.total_shared_cost.cents())),
            total_personal_cost: ActiveValue::Set(Some(value.total_personal_cost.cents())),
            is_finalized: ActiveValue::Set(Some(value.is_finalized)),
        }
    }
}

impl TryFrom<Model> for Session {
    type Error = EngineError;

    /// Missing numeric columns are coerced (0 for money, 2 for the split
    /// count) and a missing `is_finalized` means the session is open.
    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "session")?,
            user_id: model.user_id,
            title: model.title,
            split_count: SplitCount::from_optional(model.split_count),
            created_at: model.created_at,
            total_shared_cost: MoneyCents::new(model.total_shared_cost.unwrap_or(0)),
            total_personal_cost: MoneyCents::new(model.total_personal_cost.unwrap_or(0)),
            is_finalized: model.is_finalized.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn model() -> Model {
        Model {
            id: "6a8416ed-b8e6-4732-a591-bf55da9687e7".to_string(),
            user_id: "alice".to_string(),
            title: "Feira".to_string(),
            split_count: None,
            created_at: Utc.timestamp_opt(0, 0).unwrap(),
            total_shared_cost: None,
            total_personal_cost: Some(450),
            is_finalized: None,
        }
    }

    #[test]
    fn loose_columns_get_defaults() {
        let session = Session::try_from(model()).unwrap();

        assert_eq!(session.split_count, SplitCount::DEFAULT);
        assert_eq!(session.total_shared_cost, MoneyCents::ZERO);
        assert_eq!(session.total_personal_cost.cents(), 450);
        assert!(session.is_open());
    }

    #[test]
    fn invalid_id_is_rejected() {
        let mut model = model();
        model.id = "not-a-uuid".to_string();
        assert!(Session::try_from(model).is_err());
    }
}
