//! Ledger SDK: configuration-driven ledger REST backend.
//!
//! Each entry of the ledger table is one parameterized [`LedgerAccount`] policy:
//! credits always settle, a debit larger than the balance is rejected and leaves
//! the movement log untouched, and the balance is the sum of all signed movements.

pub mod config;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod state;
pub mod store;

pub use config::{builtin, load, resolve, FullConfig, ResolvedLedger, ResolvedModel};
pub use error::{AppError, ConfigError};
pub use migration::apply_migrations;
pub use routes::{build_app, common_routes, ledger_routes};
pub use service::{LedgerAccount, MovementKind, MovementOutcome, PositiveQuantity, Settlement};
pub use settings::Settings;
pub use state::AppState;
pub use store::{open_pool, AccountScope, Movement, RecordStore, SqliteRecordStore};
