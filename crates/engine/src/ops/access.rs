use sea_orm::{ConnectionTrait, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Session, bills, items, sessions};

use super::Engine;

/// Records owned by another user are reported as missing, never as
/// forbidden, so ids of other users cannot be probed.
impl Engine {
    pub(super) async fn require_session<C: ConnectionTrait>(
        &self,
        db: &C,
        session_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Session> {
        let model = sessions::Entity::find_by_id(session_id.to_string())
            .filter(sessions::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("session not exists".to_string()))?;
        Session::try_from(model)
    }

    /// Like [`Engine::require_session`], but rejects finalized sessions.
    pub(super) async fn require_open_session<C: ConnectionTrait>(
        &self,
        db: &C,
        session_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Session> {
        let session = self.require_session(db, session_id, user_id).await?;
        if session.is_finalized {
            return Err(EngineError::SessionFinalized(format!(
                "session '{}' no longer accepts changes",
                session.title
            )));
        }
        Ok(session)
    }

    /// Returns the item and the session it belongs to.
    pub(super) async fn require_item<C: ConnectionTrait>(
        &self,
        db: &C,
        item_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<(items::Model, Session)> {
        let (item, session) = items::Entity::find_by_id(item_id.to_string())
            .find_also_related(sessions::Entity)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("item not exists".to_string()))?;
        let session = session
            .filter(|s| s.user_id == user_id)
            .ok_or_else(|| EngineError::KeyNotFound("item not exists".to_string()))?;
        Ok((item, Session::try_from(session)?))
    }

    pub(super) async fn require_bill<C: ConnectionTrait>(
        &self,
        db: &C,
        bill_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<bills::Model> {
        bills::Entity::find_by_id(bill_id.to_string())
            .filter(bills::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("bill not exists".to_string()))
    }
}
