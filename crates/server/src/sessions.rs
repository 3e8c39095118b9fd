//! Shopping session endpoints

use api_types::{
    report::{ReportFormat, ReportQuery},
    session::{SessionDetailView, SessionListQuery, SessionNew, SessionUpdate, SessionView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use engine::SessionPatch;
use uuid::Uuid;

use crate::{
    ServerError,
    server::{CurrentUser, ServerState},
    views,
};

/// Sessions newest first, optionally filtered by title.
pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Query(query): Query<SessionListQuery>,
) -> Result<Json<Vec<SessionView>>, ServerError> {
    let sessions = state
        .engine
        .list_sessions(&user.id(), query.search.as_deref())
        .await?;
    Ok(Json(sessions.iter().map(views::session).collect()))
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<SessionNew>,
) -> Result<(StatusCode, Json<SessionView>), ServerError> {
    let session = state
        .engine
        .create_session(&user.id(), &payload.title, payload.split_count)
        .await?;
    Ok((StatusCode::CREATED, Json(views::session(&session))))
}

/// The session with its items and live totals.
pub async fn detail(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionDetailView>, ServerError> {
    let detail = state.engine.session_detail(&user.id(), id).await?;
    Ok(Json(views::session_detail(&detail)))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SessionUpdate>,
) -> Result<Json<SessionView>, ServerError> {
    let patch = SessionPatch {
        title: payload.title,
        split_count: payload.split_count,
        is_finalized: payload.is_finalized,
    };
    let session = state.engine.update_session(&user.id(), id, patch).await?;
    Ok(Json(views::session(&session)))
}

pub async fn finalize(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ServerError> {
    let session = state.engine.finalize_session(&user.id(), id).await?;
    Ok(Json(views::session(&session)))
}

/// Deletes the session and its items; a pending totals write is dropped.
pub async fn remove(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let owner = user.id();
    state.engine.session(&owner, id).await?;
    state.totals.cancel(id).await;
    state.engine.delete_session(&owner, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Printable (`format=text`, default) or CSV report of a session.
pub async fn report(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ServerError> {
    let report = state.engine.session_report(&user.id(), id).await?;

    let response = match query.format.unwrap_or_default() {
        ReportFormat::Text => views::text_report(report.render_text()),
        ReportFormat::Csv => views::csv_report(report.to_csv()?, &report.file_name("csv")),
    };
    Ok(response)
}
