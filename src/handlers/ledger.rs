//! Ledger handlers: list movements, report balance, record a movement.

use super::{global_ledger, parse_id, scoped_ledger};
use crate::config::ResolvedLedger;
use crate::error::AppError;
use crate::response::{outcome_response, success_many, success_one_ok};
use crate::service::{EntityService, MovementKind, MovementOutcome, PositiveQuantity};
use crate::state::AppState;
use crate::store::AccountScope;
use axum::extract::{Path, State};
use serde_json::{json, Map, Value};

/// GET /api/v1/ledgers: the configured ledger table.
pub async fn list_ledgers(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let data: Vec<Value> = state
        .model
        .ledgers
        .iter()
        .map(|l| {
            json!({
                "id": l.id,
                "path_segment": l.path_segment,
                "credit": l.credit,
                "debit": l.debit,
                "quantity_label": l.quantity_label,
                "outcomes": l.outcomes,
                "scoped": l.is_scoped(),
                "comment": l.comment,
            })
        })
        .collect();
    success_many(data)
}

pub async fn list_movements(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let ledger = global_ledger(&state, &path_segment)?;
    let movements = state.account(ledger, AccountScope::Global).movements().await?;
    Ok(success_many(movements))
}

pub async fn balance(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let ledger = global_ledger(&state, &path_segment)?;
    Ok(success_one_ok(balance_body(&state, ledger, AccountScope::Global).await?))
}

/// PUT /api/v1/:ledger/movement/:kind/:quantity: 201 settled, 403 rejected, 422 invalid.
pub async fn record_movement(
    State(state): State<AppState>,
    Path((path_segment, kind, quantity)): Path<(String, String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let ledger = global_ledger(&state, &path_segment)?;
    let (kind, quantity) = parse_request(ledger, &kind, &quantity)?;
    let outcome = record(&state, ledger, AccountScope::Global, kind, quantity).await?;
    Ok(outcome_response(ledger, &outcome))
}

pub async fn list_entity_movements(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let ledger = scoped_ledger(&state, &path_segment)?;
    let scope = existing_entity(&state, ledger, &id_str).await?;
    let movements = state.account(ledger, scope).movements().await?;
    Ok(success_many(movements))
}

pub async fn entity_balance(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let ledger = scoped_ledger(&state, &path_segment)?;
    let scope = existing_entity(&state, ledger, &id_str).await?;
    Ok(success_one_ok(balance_body(&state, ledger, scope).await?))
}

pub async fn record_entity_movement(
    State(state): State<AppState>,
    Path((path_segment, id_str, kind, quantity)): Path<(String, String, String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let ledger = scoped_ledger(&state, &path_segment)?;
    let (kind, quantity) = parse_request(ledger, &kind, &quantity)?;
    let scope = existing_entity(&state, ledger, &id_str).await?;
    let outcome = record(&state, ledger, scope, kind, quantity).await?;
    Ok(outcome_response(ledger, &outcome))
}

fn parse_request(
    ledger: &ResolvedLedger,
    kind: &str,
    quantity: &str,
) -> Result<(MovementKind, PositiveQuantity), AppError> {
    let kind = ledger.kind(kind).ok_or_else(|| {
        AppError::Validation(format!("Input should be '{}' or '{}'", ledger.credit, ledger.debit))
    })?;
    Ok((kind, PositiveQuantity::parse(quantity)?))
}

async fn existing_entity(state: &AppState, ledger: &ResolvedLedger, id_str: &str) -> Result<AccountScope, AppError> {
    let id = parse_id(id_str)?;
    if !EntityService::exists(&state.pool, ledger, id).await? {
        return Err(AppError::NotFound(format!("{} entity {}", ledger.path_segment, id)));
    }
    Ok(AccountScope::Entity(id))
}

async fn balance_body(state: &AppState, ledger: &ResolvedLedger, scope: AccountScope) -> Result<Value, AppError> {
    let account = state.account(ledger, scope);
    let mut body = Map::new();
    body.insert(ledger.quantity_label.clone(), Value::Number(account.current_balance().await?.into()));
    body.insert("movements".into(), Value::Number(account.movement_count().await?.into()));
    if let Some(id) = scope.entity_id() {
        body.insert("entity_id".into(), Value::Number(id.into()));
    }
    Ok(Value::Object(body))
}

async fn record(
    state: &AppState,
    ledger: &ResolvedLedger,
    scope: AccountScope,
    kind: MovementKind,
    quantity: PositiveQuantity,
) -> Result<MovementOutcome, AppError> {
    let outcome = state.account(ledger, scope).record_movement(kind, quantity).await?;
    if outcome.is_settled() {
        tracing::info!(
            ledger = %ledger.id,
            entity = ?scope.entity_id(),
            kind = ledger.kind_name(kind),
            quantity = quantity.get(),
            previous = outcome.previous_balance,
            balance = outcome.balance,
            "movement settled"
        );
    } else {
        tracing::warn!(
            ledger = %ledger.id,
            entity = ?scope.entity_id(),
            kind = ledger.kind_name(kind),
            quantity = quantity.get(),
            previous = outcome.previous_balance,
            balance = outcome.balance,
            "movement rejected: insufficient {}",
            ledger.quantity_label
        );
    }
    Ok(outcome)
}
