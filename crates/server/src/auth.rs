//! Sign-up, sign-in and sign-out endpoints

use api_types::auth::{AuthResponse, Credentials, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::AuthSession;

use crate::{
    ServerError,
    server::{CurrentUser, ServerState},
    views,
};

fn response(auth: AuthSession) -> AuthResponse {
    AuthResponse {
        user: views::user(&auth.user),
        token: auth.token,
    }
}

pub async fn sign_up(
    State(state): State<ServerState>,
    Json(payload): Json<Credentials>,
) -> Result<(StatusCode, Json<AuthResponse>), ServerError> {
    let auth = state
        .engine
        .sign_up(&payload.email, &payload.password)
        .await?;
    Ok((StatusCode::CREATED, Json(response(auth))))
}

pub async fn sign_in(
    State(state): State<ServerState>,
    Json(payload): Json<Credentials>,
) -> Result<Json<AuthResponse>, ServerError> {
    let auth = state
        .engine
        .sign_in(&payload.email, &payload.password)
        .await?;
    Ok(Json(response(auth)))
}

/// Revokes the token used for this request.
pub async fn sign_out(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.sign_out(&user.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<UserView> {
    Json(views::user(&user.user))
}
