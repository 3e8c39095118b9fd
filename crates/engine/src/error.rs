//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`KeyNotFound`] thrown when a record does not exist or belongs to
//!   another user.
//! - [`SessionFinalized`] thrown when items of a finalized session are
//!   mutated.
//! - [`NotConfigured`] thrown when the store schema is missing.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`SessionFinalized`]: EngineError::SessionFinalized
//!  [`NotConfigured`]: EngineError::NotConfigured
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Session finalized: {0}")]
    SessionFinalized(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Store not configured: {0}")]
    NotConfigured(String),
    #[error("Export failed: {0}")]
    Export(String),
    #[error(transparent)]
    Database(DbErr),
}

impl From<DbErr> for EngineError {
    fn from(value: DbErr) -> Self {
        let message = value.to_string();
        if is_missing_schema(&message) {
            Self::NotConfigured(message)
        } else {
            Self::Database(value)
        }
    }
}

/// SQLite reports `no such table`, Postgres `relation "…" does not exist`.
fn is_missing_schema(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("no such table")
        || (message.contains("relation") && message.contains("does not exist"))
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::SessionFinalized(a), Self::SessionFinalized(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::NotConfigured(a), Self::NotConfigured(b)) => a == b,
            (Self::Export(a), Self::Export(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_table_maps_to_not_configured() {
        let err = EngineError::from(DbErr::Custom(
            "error returned from database: no such table: shopping_sessions".to_string(),
        ));
        assert!(matches!(err, EngineError::NotConfigured(_)));
    }

    #[test]
    fn other_db_errors_stay_database() {
        let err = EngineError::from(DbErr::RecordNotUpdated);
        assert!(matches!(err, EngineError::Database(_)));
    }
}
