//! Application-state snapshots.
//!
//! Read models are assembled from store reads and handed to the aggregator;
//! nothing here keeps state between requests.

use serde::{Deserialize, Serialize};

use crate::{
    Bill, Item, MonthYear, Session,
    aggregator::{self, GlobalStats, SessionTotals},
};

/// Sessions shown in the "recent history" block.
pub const RECENT_SESSIONS: usize = 4;
/// Unpaid bills shown in the dashboard preview.
pub const PENDING_BILLS_PREVIEW: usize = 3;

/// A session opened in detail, with live totals computed from its items.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDetail {
    pub session: Session,
    /// Oldest first.
    pub items: Vec<Item>,
    pub totals: SessionTotals,
}

impl SessionDetail {
    pub fn new(session: Session, items: Vec<Item>) -> Self {
        let totals = aggregator::session_totals(&items, session.split_count);
        Self {
            session,
            items,
            totals,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub month: MonthYear,
    pub month_label: String,
    /// Newest first, at most [`RECENT_SESSIONS`].
    pub recent_sessions: Vec<Session>,
    /// Unpaid bills of the month by due day, at most [`PENDING_BILLS_PREVIEW`].
    pub pending_bills: Vec<Bill>,
    pub bills: Vec<Bill>,
    pub open_session: Option<SessionDetail>,
    pub stats: GlobalStats,
}

impl Dashboard {
    /// Builds the snapshot from the user's sessions (newest first) and the
    /// bills of `month` (by due day).
    ///
    /// When `open_session` is given and still open, its live totals replace
    /// the cached ones in the global statistics.
    pub fn assemble(
        month: MonthYear,
        sessions: Vec<Session>,
        bills: Vec<Bill>,
        open_session: Option<SessionDetail>,
    ) -> Self {
        let live = open_session
            .as_ref()
            .filter(|detail| detail.session.is_open())
            .map(|detail| detail.totals.as_override(detail.session.id));
        let stats = aggregator::global_stats(&sessions, live.as_ref(), &bills);

        let pending_bills = bills
            .iter()
            .filter(|bill| !bill.is_paid)
            .take(PENDING_BILLS_PREVIEW)
            .cloned()
            .collect();
        let mut recent_sessions = sessions;
        recent_sessions.truncate(RECENT_SESSIONS);

        Self {
            month,
            month_label: month.label(),
            recent_sessions,
            pending_bills,
            bills,
            open_session,
            stats,
        }
    }
}
