//! LedgerAccount: admission policy for movements and before/after balance reporting.
//!
//! The account holds no state of its own. The balance is always recomputed from the
//! record store, and a debit larger than the balance is rejected without touching it.

use crate::error::AppError;
use crate::store::{AccountScope, Movement, RecordStore};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Credit,
    Debit,
}

/// A requested quantity, strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PositiveQuantity(i64);

impl PositiveQuantity {
    pub fn new(value: i64) -> Result<Self, AppError> {
        if value <= 0 {
            return Err(AppError::Validation("Input should be greater than 0".into()));
        }
        Ok(PositiveQuantity(value))
    }

    /// Parse a path segment. Decimals and garbage fail before the sign check.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let value = raw.trim().parse::<i64>().map_err(|_| {
            AppError::Validation("Input should be a valid integer, unable to parse string as an integer".into())
        })?;
        Self::new(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Settlement {
    Settled,
    Rejected,
}

/// Terminal result of one `record_movement` request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MovementOutcome {
    pub result: Settlement,
    pub previous_balance: i64,
    pub balance: i64,
}

impl MovementOutcome {
    pub fn is_settled(&self) -> bool {
        self.result == Settlement::Settled
    }
}

pub struct LedgerAccount<S> {
    store: S,
    scope: AccountScope,
    guard: Arc<Mutex<()>>,
}

impl<S: RecordStore> LedgerAccount<S> {
    /// An account with its own guard. Use [`LedgerAccount::with_guard`] to share one across requests.
    pub fn new(store: S, scope: AccountScope) -> Self {
        Self::with_guard(store, scope, Arc::new(Mutex::new(())))
    }

    pub fn with_guard(store: S, scope: AccountScope, guard: Arc<Mutex<()>>) -> Self {
        LedgerAccount { store, scope, guard }
    }

    pub fn scope(&self) -> AccountScope {
        self.scope
    }

    pub async fn current_balance(&self) -> Result<i64, AppError> {
        self.store.sum(self.scope).await
    }

    pub async fn movements(&self) -> Result<Vec<Movement>, AppError> {
        self.store.list(self.scope).await
    }

    pub async fn movement_count(&self) -> Result<u64, AppError> {
        self.store.count(self.scope).await
    }

    /// Read, check, append, re-read. The guard is held across all four steps so
    /// concurrent debits on the same account cannot both pass the check.
    /// A credit whose result would not fit in an `i64` is refused before the append.
    pub async fn record_movement(
        &self,
        kind: MovementKind,
        quantity: PositiveQuantity,
    ) -> Result<MovementOutcome, AppError> {
        let _held = self.guard.lock().await;

        let previous_balance = self.current_balance().await?;
        if kind == MovementKind::Debit && quantity.get() > previous_balance {
            return Ok(MovementOutcome {
                result: Settlement::Rejected,
                previous_balance,
                balance: previous_balance,
            });
        }

        let signed_amount = match kind {
            MovementKind::Credit => quantity.get(),
            MovementKind::Debit => -quantity.get(),
        };
        if previous_balance.checked_add(signed_amount).is_none() {
            return Err(AppError::Validation(
                "Input should not take the balance above the largest storable integer".into(),
            ));
        }
        self.store.append(self.scope, signed_amount).await?;
        let balance = self.current_balance().await?;
        Ok(MovementOutcome {
            result: Settlement::Settled,
            previous_balance,
            balance,
        })
    }
}
