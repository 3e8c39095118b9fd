//! Statistics endpoints

use api_types::{
    report::{MonthlyReportQuery, ReportFormat},
    stats::{AnalyticsQuery, AnalyticsView, DashboardView, GlobalStatsView, StatsQuery},
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    response::Response,
};
use engine::MonthYear;

use crate::{
    ServerError,
    server::{CurrentUser, ServerState},
    views,
};

/// Handle requests for global statistics over open sessions and unpaid bills
pub async fn global(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<GlobalStatsView>, ServerError> {
    let stats = state
        .engine
        .global_stats(&user.id(), query.open_session)
        .await?;
    Ok(Json(views::global_stats(&stats)))
}

pub async fn analytics(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsView>, ServerError> {
    let month = views::month_year(query.month_year.as_deref())?.unwrap_or_else(MonthYear::current);
    let analytics = state.engine.analytics(&user.id(), Some(month)).await?;
    Ok(Json(views::analytics(month, &analytics)))
}

pub async fn dashboard(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<DashboardView>, ServerError> {
    let dashboard = state
        .engine
        .dashboard(&user.id(), query.open_session)
        .await?;
    Ok(Json(views::dashboard(&dashboard)))
}

/// Monthly expense report, printable (default) or CSV.
pub async fn monthly_report(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Query(query): Query<MonthlyReportQuery>,
) -> Result<Response, ServerError> {
    let month = views::month_year(query.month_year.as_deref())?;
    let report = state.engine.monthly_report(&user.id(), month).await?;

    Ok(match query.format.unwrap_or_default() {
        ReportFormat::Text => views::text_report(report.render_text()),
        ReportFormat::Csv => views::csv_report(report.to_csv()?, &report.file_name("csv")),
    })
}
