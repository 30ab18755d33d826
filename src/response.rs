//! Standard response envelope helpers.

use crate::config::ResolvedLedger;
use crate::service::{MovementOutcome, Settlement};
use axum::{http::StatusCode, Json};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Serialize)]
pub struct SuccessOne<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

#[derive(Serialize)]
pub struct SuccessMany<T> {
    pub data: Vec<T>,
    pub meta: MetaCount,
}

#[derive(Serialize)]
pub struct MetaCount {
    pub count: u64,
}

pub fn success_one<T: Serialize>(data: T) -> (StatusCode, Json<SuccessOne<T>>) {
    (
        StatusCode::CREATED,
        Json(SuccessOne {
            data,
            meta: None,
        }),
    )
}

pub fn success_one_ok<T: Serialize>(data: T) -> (StatusCode, Json<SuccessOne<T>>) {
    (
        StatusCode::OK,
        Json(SuccessOne {
            data,
            meta: None,
        }),
    )
}

pub fn success_many<T: Serialize>(data: Vec<T>) -> (StatusCode, Json<SuccessMany<T>>) {
    let count = data.len() as u64;
    (
        StatusCode::OK,
        Json(SuccessMany {
            data,
            meta: MetaCount { count },
        }),
    )
}

/// Movement outcome, unwrapped: `{result, previous_<label>, <label>}`.
/// Settled is 201, rejected is 403 with the unchanged quantity reported twice.
pub fn outcome_response(ledger: &ResolvedLedger, outcome: &MovementOutcome) -> (StatusCode, Json<Value>) {
    let (status, tag) = match outcome.result {
        Settlement::Settled => (StatusCode::CREATED, &ledger.outcomes.settled),
        Settlement::Rejected => (StatusCode::FORBIDDEN, &ledger.outcomes.rejected),
    };
    let mut body = Map::new();
    body.insert("result".into(), Value::String(tag.clone()));
    body.insert(ledger.previous_label.clone(), Value::Number(outcome.previous_balance.into()));
    body.insert(ledger.quantity_label.clone(), Value::Number(outcome.balance.into()));
    (status, Json(Value::Object(body)))
}
