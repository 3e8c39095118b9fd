//! Cost-splitting aggregation.
//!
//! Pure functions turning records into totals. Nothing here touches the
//! store, and nothing here can fail: malformed values were already coerced
//! when the records were built (missing money is 0, a non-positive split
//! count is 2, a quantity below 1 is 1).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Bill, Item, MoneyCents, Session, SplitCount};

/// Totals of a single session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTotals {
    /// Sum of `price × quantity` over shared items.
    pub shared: MoneyCents,
    /// Sum of `price × quantity` over personal items.
    pub personal: MoneyCents,
    /// `shared / split_count`: what each participant owes.
    pub friend_share: MoneyCents,
    /// `friend_share + personal`: what the user spent.
    pub user_total: MoneyCents,
    pub split_count: SplitCount,
}

impl SessionTotals {
    /// The shared/personal pair persisted on the session row.
    pub fn cached(&self) -> CachedTotals {
        CachedTotals {
            shared: self.shared,
            personal: self.personal,
        }
    }

    /// Live values of the session currently open in detail.
    pub fn as_override(&self, session_id: Uuid) -> OpenSessionOverride {
        OpenSessionOverride {
            session_id,
            shared: self.shared,
            personal: self.personal,
        }
    }
}

/// The denormalized totals stored on a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedTotals {
    pub shared: MoneyCents,
    pub personal: MoneyCents,
}

impl CachedTotals {
    pub fn is_zero(&self) -> bool {
        self.shared.is_zero() && self.personal.is_zero()
    }
}

/// Live totals of the session open in detail, replacing its cached values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenSessionOverride {
    pub session_id: Uuid,
    pub shared: MoneyCents,
    pub personal: MoneyCents,
}

/// Cross-session statistics shown on the dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_shared: MoneyCents,
    pub total_personal: MoneyCents,
    /// What the other participants owe across open sessions.
    pub total_gained: MoneyCents,
    pub unpaid_total: MoneyCents,
    pub unpaid_user_part: MoneyCents,
}

/// Spending overview over every session, finalized ones included.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analytics {
    pub shopping_shared: MoneyCents,
    pub shopping_personal: MoneyCents,
    /// `shopping_shared + shopping_personal`.
    pub total_market: MoneyCents,
    pub bills_total: MoneyCents,
    pub bills_user_part: MoneyCents,
    pub session_count: usize,
    pub bill_count: usize,
}

/// Computes the totals of one session from its items.
pub fn session_totals(items: &[Item], split_count: SplitCount) -> SessionTotals {
    let (shared, personal) = items.iter().fold(
        (MoneyCents::ZERO, MoneyCents::ZERO),
        |(shared, personal), item| {
            if item.is_personal {
                (shared, personal + item.line_total())
            } else {
                (shared + item.line_total(), personal)
            }
        },
    );
    let friend_share = shared.split(split_count);

    SessionTotals {
        shared,
        personal,
        friend_share,
        user_total: friend_share + personal,
        split_count,
    }
}

/// Rolls open sessions and unpaid bills up into [`GlobalStats`].
///
/// Finalized sessions are skipped. The session matching `open_session` uses
/// the live values of the override instead of its cached totals.
pub fn global_stats(
    sessions: &[Session],
    open_session: Option<&OpenSessionOverride>,
    bills: &[Bill],
) -> GlobalStats {
    let mut stats = GlobalStats::default();

    for session in sessions.iter().filter(|s| s.is_open()) {
        let (shared, personal) = match open_session {
            Some(live) if live.session_id == session.id => (live.shared, live.personal),
            _ => (session.total_shared_cost, session.total_personal_cost),
        };
        stats.total_shared += shared;
        stats.total_personal += personal;
        stats.total_gained += shared - shared.split(session.split_count);
    }

    for bill in bills.iter().filter(|b| !b.is_paid) {
        stats.unpaid_total += bill.amount;
        stats.unpaid_user_part += bill.user_part();
    }

    stats
}

/// Sums cached session totals and bills regardless of status.
pub fn analytics(sessions: &[Session], bills: &[Bill]) -> Analytics {
    let shopping_shared: MoneyCents = sessions.iter().map(|s| s.total_shared_cost).sum();
    let shopping_personal: MoneyCents = sessions.iter().map(|s| s.total_personal_cost).sum();

    Analytics {
        shopping_shared,
        shopping_personal,
        total_market: shopping_shared + shopping_personal,
        bills_total: bills.iter().map(|b| b.amount).sum(),
        bills_user_part: bills.iter().map(Bill::user_part).sum(),
        session_count: sessions.len(),
        bill_count: bills.len(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::MonthYear;

    fn item(price: i64, quantity: i32, is_personal: bool) -> Item {
        Item::new(
            Uuid::nil(),
            "item".to_string(),
            MoneyCents::new(price),
            quantity,
            is_personal,
        )
    }

    fn session(shared: i64, personal: i64, split: i32, finalized: bool) -> Session {
        let mut session = Session::new("alice", "Mercado".to_string(), SplitCount::new(split));
        session.total_shared_cost = MoneyCents::new(shared);
        session.total_personal_cost = MoneyCents::new(personal);
        session.is_finalized = finalized;
        session
    }

    fn bill(amount: i64, split: i32, is_paid: bool) -> Bill {
        Bill {
            id: Uuid::new_v4(),
            user_id: "alice".to_string(),
            title: "Conta".to_string(),
            amount: MoneyCents::new(amount),
            due_day: 10,
            split_count: SplitCount::new(split),
            month_year: MonthYear::current(),
            is_paid,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn session_totals_split_shared_and_personal() {
        let items = vec![item(10_00, 2, false), item(5_00, 1, true)];

        let totals = session_totals(&items, SplitCount::new(2));

        assert_eq!(totals.shared.cents(), 20_00);
        assert_eq!(totals.personal.cents(), 5_00);
        assert_eq!(totals.friend_share.cents(), 10_00);
        assert_eq!(totals.user_total.cents(), 15_00);
        assert_eq!(totals.split_count.get(), 2);
    }

    #[test]
    fn session_totals_of_no_items_are_zero() {
        let totals = session_totals(&[], SplitCount::DEFAULT);
        assert_eq!(totals, SessionTotals::default());
    }

    #[test]
    fn doubling_quantities_doubles_totals() {
        let items = vec![item(3_33, 1, false), item(1_99, 3, true), item(7_50, 2, false)];
        let doubled: Vec<Item> = items
            .iter()
            .map(|i| item(i.price.cents(), i.quantity * 2, i.is_personal))
            .collect();

        let base = session_totals(&items, SplitCount::new(3));
        let twice = session_totals(&doubled, SplitCount::new(3));

        assert_eq!(twice.shared, base.shared.times(2));
        assert_eq!(twice.personal, base.personal.times(2));
    }

    #[test]
    fn friend_share_times_split_is_shared_within_rounding() {
        let items = vec![item(10_01, 1, false), item(3_33, 3, false)];
        for split in 1..=7 {
            let totals = session_totals(&items, SplitCount::new(split));
            let rebuilt = totals.friend_share.cents() * i64::from(split);
            assert!((rebuilt - totals.shared.cents()).abs() <= i64::from(split) / 2 + 1);
            assert_eq!(totals.user_total, totals.friend_share + totals.personal);
        }
    }

    #[test]
    fn non_positive_split_is_treated_as_two() {
        let items = vec![item(30_00, 1, false)];
        for split in [0, -1, -10] {
            let totals = session_totals(&items, SplitCount::new(split));
            assert_eq!(totals.split_count.get(), 2);
            assert_eq!(totals.friend_share.cents(), 15_00);
        }
    }

    #[test]
    fn total_gained_is_what_others_owe() {
        let sessions = vec![session(100_00, 0, 4, false)];

        let stats = global_stats(&sessions, None, &[]);

        assert_eq!(stats.total_shared.cents(), 100_00);
        assert_eq!(stats.total_gained.cents(), 75_00);
    }

    #[test]
    fn finalized_sessions_are_excluded() {
        let sessions = vec![session(100_00, 10_00, 2, true), session(40_00, 5_00, 2, false)];

        let stats = global_stats(&sessions, None, &[]);

        assert_eq!(stats.total_shared.cents(), 40_00);
        assert_eq!(stats.total_personal.cents(), 5_00);
        assert_eq!(stats.total_gained.cents(), 20_00);
    }

    #[test]
    fn open_session_override_replaces_cached_totals() {
        let open = session(0, 0, 2, false);
        let other = session(10_00, 0, 2, false);
        let live = OpenSessionOverride {
            session_id: open.id,
            shared: MoneyCents::new(50_00),
            personal: MoneyCents::new(7_00),
        };

        let stats = global_stats(&[open, other], Some(&live), &[]);

        assert_eq!(stats.total_shared.cents(), 60_00);
        assert_eq!(stats.total_personal.cents(), 7_00);
        assert_eq!(stats.total_gained.cents(), 30_00);
    }

    #[test]
    fn override_for_finalized_session_is_ignored() {
        let closed = session(20_00, 0, 2, true);
        let live = OpenSessionOverride {
            session_id: closed.id,
            shared: MoneyCents::new(99_00),
            personal: MoneyCents::ZERO,
        };

        let stats = global_stats(&[closed], Some(&live), &[]);

        assert_eq!(stats, GlobalStats::default());
    }

    #[test]
    fn only_unpaid_bills_count() {
        let bills = vec![bill(90_00, 3, false), bill(50_00, 2, true)];

        let stats = global_stats(&[], None, &bills);

        assert_eq!(stats.unpaid_total.cents(), 90_00);
        assert_eq!(stats.unpaid_user_part.cents(), 30_00);
    }

    #[test]
    fn analytics_includes_finalized_sessions_and_paid_bills() {
        let sessions = vec![session(100_00, 10_00, 2, true), session(40_00, 5_00, 2, false)];
        let bills = vec![bill(90_00, 3, false), bill(50_00, 2, true)];

        let analytics = analytics(&sessions, &bills);

        assert_eq!(analytics.shopping_shared.cents(), 140_00);
        assert_eq!(analytics.shopping_personal.cents(), 15_00);
        assert_eq!(analytics.total_market.cents(), 155_00);
        assert_eq!(analytics.bills_total.cents(), 140_00);
        assert_eq!(analytics.bills_user_part.cents(), 55_00);
        assert_eq!(analytics.session_count, 2);
        assert_eq!(analytics.bill_count, 2);
    }
}
