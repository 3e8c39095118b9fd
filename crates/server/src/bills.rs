//! Fixed bill endpoints

use api_types::bill::{BillListQuery, BillNew, BillUpdate, BillView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{BillPatch, MoneyCents, NewBill};
use uuid::Uuid;

use crate::{
    ServerError,
    server::{CurrentUser, ServerState},
    views,
};

/// Bills by due day; `month_year` limits the list to one month.
pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Query(query): Query<BillListQuery>,
) -> Result<Json<Vec<BillView>>, ServerError> {
    let month = views::month_year(query.month_year.as_deref())?;
    let bills = state.engine.list_bills(&user.id(), month).await?;
    Ok(Json(bills.iter().map(views::bill).collect()))
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<BillNew>,
) -> Result<(StatusCode, Json<BillView>), ServerError> {
    let new_bill = NewBill {
        title: payload.title,
        amount: MoneyCents::new(payload.amount_minor),
        due_day: payload.due_day,
        split_count: payload.split_count,
        month_year: views::month_year(payload.month_year.as_deref())?,
        is_paid: payload.is_paid,
    };
    let bill = state.engine.create_bill(&user.id(), new_bill).await?;
    Ok((StatusCode::CREATED, Json(views::bill(&bill))))
}

/// Partial update, also used to toggle `is_paid`.
pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BillUpdate>,
) -> Result<Json<BillView>, ServerError> {
    let patch = BillPatch {
        title: payload.title,
        amount: payload.amount_minor.map(MoneyCents::new),
        due_day: payload.due_day,
        split_count: payload.split_count,
        month_year: views::month_year(payload.month_year.as_deref())?,
        is_paid: payload.is_paid,
    };
    let bill = state.engine.update_bill(&user.id(), id, patch).await?;
    Ok(Json(views::bill(&bill)))
}

pub async fn remove(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_bill(&user.id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
