//! Shared application state for all routes. Built once at startup and injected.

use crate::config::{ResolvedLedger, ResolvedModel};
use crate::service::{AccountLocks, LedgerAccount};
use crate::store::{AccountScope, SqliteRecordStore};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub model: Arc<ResolvedModel>,
    pub locks: AccountLocks,
}

impl AppState {
    pub fn new(pool: SqlitePool, model: ResolvedModel) -> Self {
        AppState {
            pool,
            model: Arc::new(model),
            locks: AccountLocks::new(),
        }
    }

    /// The account for one scope of a ledger, sharing the process-wide guard for it.
    pub fn account(&self, ledger: &ResolvedLedger, scope: AccountScope) -> LedgerAccount<SqliteRecordStore> {
        LedgerAccount::with_guard(
            SqliteRecordStore::new(self.pool.clone(), ledger),
            scope,
            self.locks.for_account(&ledger.id, scope),
        )
    }
}
