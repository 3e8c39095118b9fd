use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use std::{net::SocketAddr, sync::Arc, time::Duration};

use crate::{ServerError, auth, bills, items, sessions, statistics};
use engine::{Engine, EngineError, TotalsSync, User};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub totals: Arc<TotalsSync<Engine>>,
}

impl ServerState {
    /// Wraps the engine; item changes persist session totals after
    /// `debounce` of inactivity.
    pub fn new(engine: Engine, debounce: Duration) -> Self {
        let engine = Arc::new(engine);
        Self {
            totals: Arc::new(TotalsSync::new(Arc::clone(&engine), debounce)),
            engine,
        }
    }
}

/// The signed-in user of a request, set by the auth layer.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

impl CurrentUser {
    /// Owner key used by every store operation.
    pub fn id(&self) -> String {
        self.user.id.to_string()
    }
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(auth_header) = auth_header else {
        return Err(EngineError::Unauthorized("missing bearer token".to_string()).into());
    };
    let token = auth_header.token();
    if token.is_empty() {
        return Err(EngineError::Unauthorized("missing bearer token".to_string()).into());
    }

    let Some(user) = state.engine.current_user(token).await? else {
        return Err(EngineError::Unauthorized("invalid or expired token".to_string()).into());
    };

    request.extensions_mut().insert(CurrentUser {
        user,
        token: token.to_string(),
    });
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/auth/signout", post(auth::sign_out))
        .route("/auth/me", get(auth::me))
        .route("/sessions", get(sessions::list).post(sessions::create))
        .route(
            "/sessions/{id}",
            get(sessions::detail)
                .patch(sessions::update)
                .delete(sessions::remove),
        )
        .route("/sessions/{id}/finalize", post(sessions::finalize))
        .route("/sessions/{id}/report", get(sessions::report))
        .route(
            "/sessions/{id}/items",
            get(items::list).post(items::create),
        )
        .route("/items/{id}", delete(items::remove))
        .route("/bills", get(bills::list).post(bills::create))
        .route("/bills/{id}", patch(bills::update).delete(bills::remove))
        .route("/stats", get(statistics::global))
        .route("/analytics", get(statistics::analytics))
        .route("/dashboard", get(statistics::dashboard))
        .route("/reports/monthly", get(statistics::monthly_report))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/auth/signup", post(auth::sign_up))
        .route("/auth/signin", post(auth::sign_in))
        .merge(protected)
        .with_state(state)
}

pub async fn run(state: ServerState, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(state, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
