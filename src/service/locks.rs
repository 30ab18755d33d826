//! Per-account guards shared by every request in the process.

use crate::store::AccountScope;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type AccountKey = (String, AccountScope);

#[derive(Clone, Default)]
pub struct AccountLocks {
    by_account: Arc<Mutex<HashMap<AccountKey, Arc<tokio::sync::Mutex<()>>>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The guard for one account of one ledger; created on first use.
    pub fn for_account(&self, ledger_id: &str, scope: AccountScope) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.by_account.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let key = (ledger_id.to_string(), scope);
        if let Some(guard) = map.get(&key) {
            return guard.clone();
        }
        // A guard only the map still references is idle.
        map.retain(|_, guard| Arc::strong_count(guard) > 1);
        map.entry(key).or_default().clone()
    }

    /// Drop the guard of an account that no longer exists.
    pub fn forget(&self, ledger_id: &str, scope: AccountScope) {
        let mut map = self.by_account.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        map.remove(&(ledger_id.to_string(), scope));
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.by_account.lock().map(|m| m.len()).unwrap_or(0)
    }
}
