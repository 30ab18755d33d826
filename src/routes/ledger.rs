//! Ledger and owning-entity routes, resolved against the ledger table by path segment.
//! Entity-scoped accounts live under /:ledger/entities/:id so they never overlap the global ones.

use crate::handlers::{
    balance, create_entity, delete_entity, entity_balance, list_entities, list_entity_movements, list_ledgers,
    list_movements, read_entity, record_entity_movement, record_movement, update_entity,
};
use crate::state::AppState;
use axum::{routing::get, routing::put, Router};

pub fn ledger_routes(state: AppState) -> Router {
    Router::new()
        .route("/ledgers", get(list_ledgers))
        .route("/:path_segment/movements", get(list_movements))
        .route("/:path_segment/balance", get(balance))
        .route("/:path_segment/movement/:kind/:quantity", put(record_movement))
        .route("/:path_segment/entities", get(list_entities).post(create_entity))
        .route(
            "/:path_segment/entities/:id",
            get(read_entity).put(update_entity).delete(delete_entity),
        )
        .route("/:path_segment/entities/:id/movements", get(list_entity_movements))
        .route("/:path_segment/entities/:id/balance", get(entity_balance))
        .route(
            "/:path_segment/entities/:id/movement/:kind/:quantity",
            put(record_entity_movement),
        )
        .with_state(state)
}
