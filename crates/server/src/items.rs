//! Item endpoints
//!
//! Every change answers with the live totals of the session and schedules
//! the debounced recompute of its cached totals.

use api_types::item::{ItemChange, ItemNew, ItemView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{MoneyCents, NewItem};
use uuid::Uuid;

use crate::{
    ServerError,
    server::{CurrentUser, ServerState},
    views,
};

/// Items of a session, oldest first.
pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<ItemView>>, ServerError> {
    let items = state.engine.list_items(&user.id(), session_id).await?;
    Ok(Json(items.iter().map(views::item).collect()))
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<ItemNew>,
) -> Result<(StatusCode, Json<ItemChange>), ServerError> {
    let owner = user.id();
    let new_item = NewItem::new(session_id, payload.name, MoneyCents::new(payload.price_minor))
        .quantity(payload.quantity.unwrap_or(1))
        .personal(payload.is_personal);

    let (item, totals) = state.engine.add_item(&owner, new_item).await?;
    state.totals.schedule(&owner, session_id).await;

    Ok((
        StatusCode::CREATED,
        Json(ItemChange {
            item: Some(views::item(&item)),
            totals: views::totals(&totals),
        }),
    ))
}

pub async fn remove(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<ItemChange>, ServerError> {
    let owner = user.id();
    let (session_id, totals) = state.engine.delete_item(&owner, item_id).await?;
    state.totals.schedule(&owner, session_id).await;

    Ok(Json(ItemChange {
        item: None,
        totals: views::totals(&totals),
    }))
}
