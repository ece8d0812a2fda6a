use axum::Router;
use std::net::SocketAddr;
use std::str::FromStr;
use tower_http::trace::TraceLayer;
use tracing::info;

mod config;
mod error;
mod sink;
mod state;

pub use config::ServerConfig;
pub use error::SinkServerError;
pub use state::AppState;

use crate::sink::create_sink_routes;

/// Binds the listener and serves the sink until the process ends.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from_str(&config.bind)?;
    let app = router(AppState::new(config));

    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    Ok(axum::serve(listener, app).await?)
}

/// The sink's route table. Exposed so tests can drive the router with a
/// recording dispatcher instead of a live store.
pub fn router(state: AppState) -> Router {
    create_sink_routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
