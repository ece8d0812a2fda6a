use crate::state::AppState;
use axum::routing::post;
use axum::Router;

mod snapshot;
mod store;

use snapshot::handle_snapshot;
use store::handle_store;

pub fn create_sink_routes() -> Router<AppState> {
    Router::new()
        .route("/snapshot/{graph}/{dataset}", post(handle_snapshot))
        .route("/store/{graph}/entities", post(handle_store))
}
