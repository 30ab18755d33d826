//! Route tables and the assembled application router.

mod common;
mod ledger;
pub use common::common_routes;
pub use ledger::ledger_routes;

use crate::state::AppState;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

/// Common routes at the root, ledger routes under /api/v1.
pub fn build_app(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .nest("/api/v1", ledger_routes(state))
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
}
