//! Conversions from engine records to API views.

use api_types::{
    auth::UserView,
    bill::BillView,
    item::ItemView,
    session::{SessionDetailView, SessionView, TotalsView},
    stats::{AnalyticsView, DashboardView, GlobalStatsView},
};
use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use engine::{
    Analytics, Bill, Dashboard, GlobalStats, Item, MonthYear, Session, SessionDetail,
    SessionTotals, User,
};

use crate::ServerError;

pub(crate) fn user(user: &User) -> UserView {
    UserView {
        id: user.id,
        email: user.email.clone(),
        created_at: user.created_at,
    }
}

pub(crate) fn session(session: &Session) -> SessionView {
    SessionView {
        id: session.id,
        title: session.title.clone(),
        split_count: session.split_count.get(),
        created_at: session.created_at,
        total_shared_minor: session.total_shared_cost.cents(),
        total_personal_minor: session.total_personal_cost.cents(),
        grand_total_minor: session.grand_total().cents(),
        is_finalized: session.is_finalized,
    }
}

pub(crate) fn totals(totals: &SessionTotals) -> TotalsView {
    TotalsView {
        shared_minor: totals.shared.cents(),
        personal_minor: totals.personal.cents(),
        friend_share_minor: totals.friend_share.cents(),
        user_total_minor: totals.user_total.cents(),
        split_count: totals.split_count.get(),
    }
}

pub(crate) fn item(item: &Item) -> ItemView {
    ItemView {
        id: item.id,
        session_id: item.session_id,
        name: item.name.clone(),
        price_minor: item.price.cents(),
        quantity: item.quantity,
        is_personal: item.is_personal,
        line_total_minor: item.line_total().cents(),
        created_at: item.created_at,
    }
}

pub(crate) fn session_detail(detail: &SessionDetail) -> SessionDetailView {
    SessionDetailView {
        session: session(&detail.session),
        items: detail.items.iter().map(item).collect(),
        totals: totals(&detail.totals),
    }
}

pub(crate) fn bill(bill: &Bill) -> BillView {
    BillView {
        id: bill.id,
        title: bill.title.clone(),
        amount_minor: bill.amount.cents(),
        due_day: bill.due_day,
        split_count: bill.split_count.get(),
        month_year: bill.month_year.to_string(),
        is_paid: bill.is_paid,
        user_part_minor: bill.user_part().cents(),
        created_at: bill.created_at,
    }
}

pub(crate) fn global_stats(stats: &GlobalStats) -> GlobalStatsView {
    GlobalStatsView {
        total_shared_minor: stats.total_shared.cents(),
        total_personal_minor: stats.total_personal.cents(),
        total_gained_minor: stats.total_gained.cents(),
        unpaid_total_minor: stats.unpaid_total.cents(),
        unpaid_user_part_minor: stats.unpaid_user_part.cents(),
    }
}

pub(crate) fn analytics(month: MonthYear, analytics: &Analytics) -> AnalyticsView {
    AnalyticsView {
        month_year: month.to_string(),
        shopping_shared_minor: analytics.shopping_shared.cents(),
        shopping_personal_minor: analytics.shopping_personal.cents(),
        total_market_minor: analytics.total_market.cents(),
        bills_total_minor: analytics.bills_total.cents(),
        bills_user_part_minor: analytics.bills_user_part.cents(),
        session_count: analytics.session_count,
        bill_count: analytics.bill_count,
    }
}

pub(crate) fn dashboard(dashboard: &Dashboard) -> DashboardView {
    DashboardView {
        month_year: dashboard.month.to_string(),
        month_label: dashboard.month_label.clone(),
        recent_sessions: dashboard.recent_sessions.iter().map(session).collect(),
        pending_bills: dashboard.pending_bills.iter().map(bill).collect(),
        bills: dashboard.bills.iter().map(bill).collect(),
        open_session: dashboard.open_session.as_ref().map(session_detail),
        stats: global_stats(&dashboard.stats),
    }
}

/// Parses an optional `"M/YYYY"` parameter.
pub(crate) fn month_year(value: Option<&str>) -> Result<Option<MonthYear>, ServerError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<MonthYear>().map_err(ServerError::from))
        .transpose()
}

/// Plain text report for printing.
pub(crate) fn text_report(body: String) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string())],
        body,
    )
        .into_response()
}

/// CSV report served as a download named `file_name`.
pub(crate) fn csv_report(body: Vec<u8>, file_name: &str) -> Response {
    let disposition = format!("attachment; filename=\"{file_name}\"");
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}
