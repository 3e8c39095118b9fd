use sea_orm::DatabaseConnection;
use tokio::sync::broadcast;

use crate::{AuthEvent, ResultEngine};

mod access;
mod bills;
mod identity;
mod items;
mod sessions;
mod stats;

/// Capacity of the auth-state channel; slow subscribers miss older events.
const AUTH_EVENTS_CAPACITY: usize = 64;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    auth_events: broadcast::Sender<AuthEvent>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Subscribe to sign-in/sign-out notifications.
    pub fn on_auth_state_change(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth_events.subscribe()
    }

    fn publish(&self, event: AuthEvent) {
        // No subscribers is not an error.
        let _ = self.auth_events.send(event);
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let (auth_events, _) = broadcast::channel(AUTH_EVENTS_CAPACITY);
        Ok(Engine {
            database: self.database,
            auth_events,
        })
    }
}
