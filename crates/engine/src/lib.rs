pub use aggregator::{
    Analytics, CachedTotals, GlobalStats, OpenSessionOverride, SessionTotals,
};
pub use bills::Bill;
pub use commands::{BillPatch, NewBill, NewItem, SessionPatch};
pub use error::EngineError;
pub use identity::{AuthEvent, AuthSession, MIN_PASSWORD_LEN, User};
pub use items::Item;
pub use money::MoneyCents;
pub use month::MonthYear;
pub use ops::{Engine, EngineBuilder};
pub use report::{MonthlyReport, SessionReport};
pub use sessions::Session;
pub use split::SplitCount;
pub use state::{Dashboard, SessionDetail};
pub use totals_sync::{DEFAULT_DEBOUNCE, TotalsSync, TotalsWriter};

pub mod aggregator;
pub mod auth_tokens;
pub mod bills;
mod commands;
mod error;
mod identity;
pub mod items;
mod money;
mod month;
mod ops;
mod report;
pub mod sessions;
mod split;
mod state;
mod totals_sync;
pub mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
