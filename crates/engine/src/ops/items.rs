use sea_orm::{ActiveModelTrait, ModelTrait};
use uuid::Uuid;

use crate::{
    EngineError, Item, NewItem, ResultEngine,
    aggregator::{self, SessionTotals},
    items,
    util::normalize_required_name,
};

use super::Engine;

impl Engine {
    /// Items of a session, oldest first.
    pub async fn list_items(&self, user_id: &str, session_id: Uuid) -> ResultEngine<Vec<Item>> {
        self.require_session(&self.database, session_id, user_id)
            .await?;
        self.load_items(&self.database, session_id).await
    }

    /// Adds an item to an open session and returns it together with the
    /// live totals of the session.
    ///
    /// The cached totals on the session row are not touched here; callers
    /// schedule that write through [`crate::TotalsSync`].
    pub async fn add_item(
        &self,
        user_id: &str,
        new_item: NewItem,
    ) -> ResultEngine<(Item, SessionTotals)> {
        let name = normalize_required_name(&new_item.name, "item name")?;
        if new_item.price.is_negative() {
            return Err(EngineError::InvalidAmount(
                "price must be >= 0".to_string(),
            ));
        }

        let session = self
            .require_open_session(&self.database, new_item.session_id, user_id)
            .await?;
        let item = Item::new(
            session.id,
            name,
            new_item.price,
            new_item.quantity,
            new_item.is_personal,
        );
        items::ActiveModel::from(&item)
            .insert(&self.database)
            .await?;
        tracing::debug!("added item {} to session {}", item.id, session.id);

        let items = self.load_items(&self.database, session.id).await?;
        Ok((item, aggregator::session_totals(&items, session.split_count)))
    }

    /// Deletes an item and returns the id and live totals of its session.
    ///
    /// A failed delete leaves the item in place.
    pub async fn delete_item(
        &self,
        user_id: &str,
        item_id: Uuid,
    ) -> ResultEngine<(Uuid, SessionTotals)> {
        let (model, session) = self
            .require_item(&self.database, item_id, user_id)
            .await?;
        if session.is_finalized {
            return Err(EngineError::SessionFinalized(format!(
                "session '{}' no longer accepts changes",
                session.title
            )));
        }

        model.delete(&self.database).await?;
        tracing::debug!("deleted item {item_id} from session {}", session.id);

        let items = self.load_items(&self.database, session.id).await?;
        Ok((
            session.id,
            aggregator::session_totals(&items, session.split_count),
        ))
    }
}
