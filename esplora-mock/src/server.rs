/// Axum HTTP server setup and routing

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::fixtures::FixtureStore;
use crate::handlers::*;

pub fn create_router(store: Arc<FixtureStore>) -> Router {
    // Configure CORS to allow requests from wallet frontend/tests
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Block endpoints
        .route("/blocks/tip/height", get(get_tip_height))

        // Transaction endpoints
        .route("/tx", post(broadcast_transaction))
        .route("/tx/:txid/hex", get(get_transaction_hex))
        .route("/tx/:txid/raw", get(get_transaction_raw))

        // Address endpoints
        .route("/address/:address", get(get_address))
        .route("/address/:address/utxo", get(get_address_utxos))
        .route("/address/:address/utxo-hex", get(get_address_utxos_hex))

        // Shared state
        .with_state(store)

        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(store: Arc<FixtureStore>, host: String, port: u16) -> anyhow::Result<()> {
    let app = create_router(store);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("🚀 Esplora mock server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve `store` on an ephemeral localhost port, returning the base URL.
pub async fn spawn_ephemeral(
    store: Arc<FixtureStore>,
) -> anyhow::Result<(String, JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let addr = listener.local_addr()?;
    let app = create_router(store);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            log::error!("Esplora mock server stopped: {}", e);
        }
    });

    Ok((format!("http://{}", addr), handle))
}
