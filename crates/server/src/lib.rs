use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod auth;
mod bills;
mod items;
mod server;
mod sessions;
mod statistics;
mod views;

pub mod types {
    pub mod auth {
        pub use api_types::auth::{AuthResponse, Credentials, UserView};
    }

    pub mod session {
        pub use api_types::session::{
            SessionDetailView, SessionListQuery, SessionNew, SessionUpdate, SessionView,
            TotalsView,
        };
    }

    pub mod item {
        pub use api_types::item::{ItemChange, ItemNew, ItemView};
    }

    pub mod bill {
        pub use api_types::bill::{BillListQuery, BillNew, BillUpdate, BillView};
    }

    pub mod stats {
        pub use api_types::stats::{
            AnalyticsQuery, AnalyticsView, DashboardView, GlobalStatsView, StatsQuery,
        };
    }

    pub mod report {
        pub use api_types::report::{MonthlyReportQuery, ReportFormat, ReportQuery};
    }
}

pub enum ServerError {
    Engine(EngineError),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        EngineError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::Database(_) | EngineError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidInput(_)
        | EngineError::SessionFinalized(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Export(msg) => {
            tracing::error!("export error: {msg}");
            "internal server error".to_string()
        }
        EngineError::NotConfigured(msg) => {
            tracing::error!("store not configured: {msg}");
            "store not configured".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
