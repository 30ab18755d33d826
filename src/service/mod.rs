//! Ledger policy, per-account guards, entity CRUD, and request validation.

mod crud;
mod ledger;
mod locks;
mod validation;
pub use crud::EntityService;
pub use ledger::{LedgerAccount, MovementKind, MovementOutcome, PositiveQuantity, Settlement};
pub use locks::AccountLocks;
pub use validation::RequestValidator;
