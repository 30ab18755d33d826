//! HTTP handlers for ledger movements and owning-entity CRUD.

pub mod entity;
pub mod ledger;
pub use entity::*;
pub use ledger::*;

use crate::config::ResolvedLedger;
use crate::error::AppError;
use crate::state::AppState;

pub(crate) fn find_ledger<'a>(state: &'a AppState, path_segment: &str) -> Result<&'a ResolvedLedger, AppError> {
    state
        .model
        .ledger_by_path(path_segment)
        .ok_or_else(|| AppError::NotFound(format!("ledger {}", path_segment)))
}

/// A ledger whose single account is global; entity-scoped ledgers are a bad request here.
pub(crate) fn global_ledger<'a>(state: &'a AppState, path_segment: &str) -> Result<&'a ResolvedLedger, AppError> {
    let ledger = find_ledger(state, path_segment)?;
    if ledger.is_scoped() {
        return Err(AppError::BadRequest(format!(
            "ledger {} is kept per entity; use /{}/entities/:id/...",
            path_segment, path_segment
        )));
    }
    Ok(ledger)
}

pub(crate) fn scoped_ledger<'a>(state: &'a AppState, path_segment: &str) -> Result<&'a ResolvedLedger, AppError> {
    let ledger = find_ledger(state, path_segment)?;
    if !ledger.is_scoped() {
        return Err(AppError::BadRequest(format!("ledger {} has no entities", path_segment)));
    }
    Ok(ledger)
}

pub(crate) fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str.parse().map_err(|_| AppError::BadRequest("invalid id".into()))
}
