//! Owning-entity CRUD handlers for scoped ledgers: create, read, update, delete, list.

use super::{parse_id, scoped_ledger};
use crate::config::ResolvedLedger;
use crate::error::AppError;
use crate::response::{success_many, success_one, success_one_ok};
use crate::service::{EntityService, RequestValidator};
use crate::state::AppState;
use crate::store::AccountScope;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

fn body_to_map(value: Value) -> Result<HashMap<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m.into_iter().collect()),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

fn validate_body(ledger: &ResolvedLedger, body: Value) -> Result<HashMap<String, Value>, AppError> {
    let body = body_to_map(body)?;
    if let Some(scope) = ledger.entity_scope() {
        RequestValidator::validate(&body, &scope.validation)?;
    }
    Ok(body)
}

pub async fn list_entities(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let ledger = scoped_ledger(&state, &path_segment)?;
    let rows = EntityService::list(&state.pool, ledger).await?;
    Ok(success_many(rows))
}

pub async fn create_entity(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let ledger = scoped_ledger(&state, &path_segment)?;
    let body = validate_body(ledger, body)?;
    let row = EntityService::create(&state.pool, ledger, &body).await?;
    tracing::info!(ledger = %ledger.id, id = ?row.get("id"), "entity created");
    Ok(success_one(row))
}

pub async fn read_entity(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let ledger = scoped_ledger(&state, &path_segment)?;
    let id = parse_id(&id_str)?;
    let row = EntityService::read(&state.pool, ledger, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} entity {}", path_segment, id)))?;
    Ok(success_one_ok(row))
}

pub async fn update_entity(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let ledger = scoped_ledger(&state, &path_segment)?;
    let id = parse_id(&id_str)?;
    let body = validate_body(ledger, body)?;
    let row = EntityService::update(&state.pool, ledger, id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} entity {}", path_segment, id)))?;
    Ok(success_one_ok(row))
}

pub async fn delete_entity(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let ledger = scoped_ledger(&state, &path_segment)?;
    let id = parse_id(&id_str)?;
    let scope = AccountScope::Entity(id);
    let guard = state.locks.for_account(&ledger.id, scope);
    let deleted = {
        let _held = guard.lock().await;
        EntityService::delete(&state.pool, ledger, id).await?
    };
    deleted.ok_or_else(|| AppError::NotFound(format!("{} entity {}", path_segment, id)))?;
    drop(guard);
    state.locks.forget(&ledger.id, scope);
    tracing::info!(ledger = %ledger.id, id, "entity deleted");
    Ok(axum::http::StatusCode::NO_CONTENT)
}
