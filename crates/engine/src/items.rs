//! Line items of a shopping session.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::parse_uuid};

/// One product bought during a session.
///
/// Items are immutable once created: the only mutation is deletion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub session_id: Uuid,
    pub name: String,
    /// Unit price.
    pub price: MoneyCents,
    /// Always `>= 1`.
    pub quantity: i32,
    pub is_personal: bool,
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn new(
        session_id: Uuid,
        name: String,
        price: MoneyCents,
        quantity: i32,
        is_personal: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            name,
            price,
            quantity: normalize_quantity(Some(quantity)),
            is_personal,
            created_at: Utc::now(),
        }
    }

    /// Contribution of this item to the session totals.
    pub fn line_total(&self) -> MoneyCents {
        self.price.times(self.quantity)
    }
}

/// Quantities below 1 (or missing) count as a single unit.
pub(crate) fn normalize_quantity(quantity: Option<i32>) -> i32 {
    match quantity {
        Some(q) if q >= 1 => q,
        _ => 1,
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub session_id: String,
    pub name: String,
    pub price: Option<i64>,
    pub quantity: Option<i32>,
    pub is_personal: Option<bool>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sessions::Entity",
        from = "Column::SessionId",
        to = "super::sessions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Sessions,
}

impl Related<super::sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Item> for ActiveModel {
    fn from(value: &Item) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            session_id: ActiveValue::Set(value.session_id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            price: ActiveValue::Set(Some(value.price.cents())),
            quantity: ActiveValue::Set(Some(value.quantity)),
            is_personal: ActiveValue::Set(Some(value.is_personal)),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Item {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "item")?,
            session_id: parse_uuid(&model.session_id, "session")?,
            name: model.name,
            price: MoneyCents::new(model.price.unwrap_or(0)),
            quantity: normalize_quantity(model.quantity),
            is_personal: model.is_personal.unwrap_or(false),
            created_at: model.created_at,
        })
    }
}
