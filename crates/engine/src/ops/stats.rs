use uuid::Uuid;

use crate::{
    Dashboard, MonthYear, MonthlyReport, ResultEngine, SessionDetail, SessionReport,
    aggregator::{self, Analytics, GlobalStats},
};

use super::Engine;

impl Engine {
    /// A session with its items (oldest first) and live totals.
    pub async fn session_detail(
        &self,
        user_id: &str,
        session_id: Uuid,
    ) -> ResultEngine<SessionDetail> {
        let session = self
            .require_session(&self.database, session_id, user_id)
            .await?;
        let items = self.load_items(&self.database, session_id).await?;
        Ok(SessionDetail::new(session, items))
    }

    /// Global statistics over open sessions and the current month's bills.
    ///
    /// `open_session` names the session the client has open in detail: its
    /// totals are computed from live items rather than the cached columns.
    pub async fn global_stats(
        &self,
        user_id: &str,
        open_session: Option<Uuid>,
    ) -> ResultEngine<GlobalStats> {
        Ok(self.dashboard(user_id, open_session).await?.stats)
    }

    /// Spending overview: every session (finalized ones included) and the
    /// bills of `month_year`, the current month by default.
    pub async fn analytics(
        &self,
        user_id: &str,
        month_year: Option<MonthYear>,
    ) -> ResultEngine<Analytics> {
        let month = month_year.unwrap_or_else(MonthYear::current);
        let sessions = self.list_sessions(user_id, None).await?;
        let bills = self.list_bills(user_id, Some(month)).await?;
        Ok(aggregator::analytics(&sessions, &bills))
    }

    /// Snapshot of everything the summary view shows.
    pub async fn dashboard(
        &self,
        user_id: &str,
        open_session: Option<Uuid>,
    ) -> ResultEngine<Dashboard> {
        let month = MonthYear::current();
        let sessions = self.list_sessions(user_id, None).await?;
        let bills = self.list_bills(user_id, Some(month)).await?;
        let open_session = match open_session {
            Some(session_id) => Some(self.session_detail(user_id, session_id).await?),
            None => None,
        };
        Ok(Dashboard::assemble(month, sessions, bills, open_session))
    }

    pub async fn session_report(
        &self,
        user_id: &str,
        session_id: Uuid,
    ) -> ResultEngine<SessionReport> {
        let detail = self.session_detail(user_id, session_id).await?;
        Ok(SessionReport::new(detail))
    }

    /// Printable report of `month_year` (the current month by default): the
    /// dashboard summary, sessions created in the month and its bills.
    pub async fn monthly_report(
        &self,
        user_id: &str,
        month_year: Option<MonthYear>,
    ) -> ResultEngine<MonthlyReport> {
        let month = month_year.unwrap_or_else(MonthYear::current);
        let sessions = self.list_sessions(user_id, None).await?;
        let bills = self.list_bills(user_id, Some(month)).await?;
        Ok(MonthlyReport::assemble(month, sessions, bills))
    }
}
