use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Item, ResultEngine, Session, SessionPatch, SplitCount,
    aggregator::{self, CachedTotals, SessionTotals},
    items, sessions,
    util::{normalize_required_name, search_key},
};

use super::{Engine, with_tx};

impl Engine {
    /// Lists the user's sessions, newest first.
    ///
    /// `search` keeps only sessions whose title contains it, ignoring case and
    /// accents.
    ///
    /// Sessions whose cached totals are both zero but that do have items get
    /// their totals recomputed and persisted. A session without items keeps
    /// its zero totals and is not rewritten.
    pub async fn list_sessions(
        &self,
        user_id: &str,
        search: Option<&str>,
    ) -> ResultEngine<Vec<Session>> {
        let models = sessions::Entity::find()
            .filter(sessions::Column::UserId.eq(user_id.to_string()))
            .order_by_desc(sessions::Column::CreatedAt)
            .all(&self.database)
            .await?;

        let needle = search.map(search_key).filter(|s| !s.is_empty());
        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let session = Session::try_from(model)?;
            if let Some(needle) = needle.as_deref()
                && !search_key(&session.title).contains(needle)
            {
                continue;
            }
            out.push(session);
        }

        for session in out.iter_mut().filter(|s| s.cached_totals().is_zero()) {
            self.reconcile_zero_totals(session).await;
        }

        Ok(out)
    }

    /// Recomputes a zero-totals session from its items, best effort.
    async fn reconcile_zero_totals(&self, session: &mut Session) {
        let items = match self.load_items(&self.database, session.id).await {
            Ok(items) => items,
            Err(err) => {
                tracing::error!("failed to load items of session {}: {err}", session.id);
                return;
            }
        };
        if items.is_empty() {
            return;
        }

        let totals = aggregator::session_totals(&items, session.split_count).cached();
        if let Err(err) = self.write_totals(session.id, totals).await {
            tracing::warn!("failed to persist recomputed totals of session {}: {err}", session.id);
        }
        session.total_shared_cost = totals.shared;
        session.total_personal_cost = totals.personal;
    }

    /// Creates an open session. `split_count` defaults to 2.
    pub async fn create_session(
        &self,
        user_id: &str,
        title: &str,
        split_count: Option<i32>,
    ) -> ResultEngine<Session> {
        let title = normalize_required_name(title, "session title")?;
        let session = Session::new(user_id, title, SplitCount::from_optional(split_count));

        sessions::ActiveModel::from(&session)
            .insert(&self.database)
            .await?;
        tracing::debug!("created session {} for {user_id}", session.id);
        Ok(session)
    }

    /// Return a session owned by `user_id`.
    pub async fn session(&self, user_id: &str, session_id: Uuid) -> ResultEngine<Session> {
        self.require_session(&self.database, session_id, user_id)
            .await
    }

    /// Applies a partial update.
    ///
    /// Finalization is one-way: `is_finalized: Some(false)` on a finalized
    /// session is rejected. Setting it to `true` behaves like
    /// [`Engine::finalize_session`].
    pub async fn update_session(
        &self,
        user_id: &str,
        session_id: Uuid,
        patch: SessionPatch,
    ) -> ResultEngine<Session> {
        if patch.is_empty() {
            return Err(EngineError::InvalidInput(
                "provide at least one of title, split_count or is_finalized".to_string(),
            ));
        }
        let title = patch
            .title
            .as_deref()
            .map(|t| normalize_required_name(t, "session title"))
            .transpose()?;

        let mut session = with_tx!(self, |db_tx| {
            let mut session = self
                .require_session(&db_tx, session_id, user_id)
                .await?;
            if session.is_finalized && patch.is_finalized == Some(false) {
                return Err(EngineError::InvalidInput(
                    "a finalized session cannot be reopened".to_string(),
                ));
            }

            let mut active = sessions::ActiveModel {
                id: ActiveValue::Set(session_id.to_string()),
                ..Default::default()
            };
            let mut changed = false;
            if let Some(title) = title {
                active.title = ActiveValue::Set(title.clone());
                session.title = title;
                changed = true;
            }
            if let Some(split_count) = patch.split_count {
                let split_count = SplitCount::new(split_count);
                active.split_count = ActiveValue::Set(Some(split_count.get()));
                session.split_count = split_count;
                changed = true;
            }
            if changed {
                active.update(&db_tx).await?;
            }
            Ok::<_, EngineError>(session)
        })?;

        if patch.is_finalized == Some(true) && !session.is_finalized {
            session = self.finalize_session(user_id, session_id).await?;
        }
        Ok(session)
    }

    /// Persists the cached totals of a session.
    pub async fn update_session_totals(
        &self,
        user_id: &str,
        session_id: Uuid,
        totals: CachedTotals,
    ) -> ResultEngine<()> {
        self.require_session(&self.database, session_id, user_id)
            .await?;
        self.write_totals(session_id, totals).await
    }

    pub(super) async fn write_totals(
        &self,
        session_id: Uuid,
        totals: CachedTotals,
    ) -> ResultEngine<()> {
        let active = sessions::ActiveModel {
            id: ActiveValue::Set(session_id.to_string()),
            total_shared_cost: ActiveValue::Set(Some(totals.shared.cents())),
            total_personal_cost: ActiveValue::Set(Some(totals.personal.cents())),
            ..Default::default()
        };
        active.update(&self.database).await?;
        Ok(())
    }

    /// Recomputes the totals of a session from its items and persists them.
    ///
    /// Safe to repeat: the result only depends on the current items.
    pub async fn recompute_session_totals(
        &self,
        user_id: &str,
        session_id: Uuid,
    ) -> ResultEngine<SessionTotals> {
        let session = self
            .require_session(&self.database, session_id, user_id)
            .await?;
        let items = self.load_items(&self.database, session_id).await?;
        let totals = aggregator::session_totals(&items, session.split_count);
        self.write_totals(session_id, totals.cached()).await?;
        Ok(totals)
    }

    /// Marks a session as finalized (`Open → Finalized`, one-way).
    ///
    /// When the store cannot persist the flag (e.g. an old schema without
    /// the `is_finalized` column) the failure is logged and the finalized
    /// session is returned anyway.
    pub async fn finalize_session(
        &self,
        user_id: &str,
        session_id: Uuid,
    ) -> ResultEngine<Session> {
        let mut session = self
            .require_session(&self.database, session_id, user_id)
            .await?;
        if session.is_finalized {
            return Ok(session);
        }

        let active = sessions::ActiveModel {
            id: ActiveValue::Set(session_id.to_string()),
            is_finalized: ActiveValue::Set(Some(true)),
            ..Default::default()
        };
        if let Err(err) = active.update(&self.database).await {
            tracing::warn!("could not persist is_finalized for session {session_id}: {err}");
        }

        session.is_finalized = true;
        Ok(session)
    }

    /// Deletes a session and, in the same DB transaction, all its items.
    pub async fn delete_session(&self, user_id: &str, session_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_session(&db_tx, session_id, user_id)
                .await?;

            items::Entity::delete_many()
                .filter(items::Column::SessionId.eq(session_id.to_string()))
                .exec(&db_tx)
                .await?;
            sessions::Entity::delete_by_id(session_id.to_string())
                .exec(&db_tx)
                .await?;

            Ok::<_, EngineError>(())
        })?;
        tracing::debug!("deleted session {session_id}");
        Ok(())
    }

    pub(super) async fn load_items<C: ConnectionTrait>(
        &self,
        db: &C,
        session_id: Uuid,
    ) -> ResultEngine<Vec<Item>> {
        items::Entity::find()
            .filter(items::Column::SessionId.eq(session_id.to_string()))
            .order_by_asc(items::Column::CreatedAt)
            .all(db)
            .await?
            .into_iter()
            .map(Item::try_from)
            .collect()
    }
}
