/// Axum HTTP handlers for Esplora API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bitcoin::consensus::encode::deserialize;
use bitcoin::Transaction;
use std::sync::Arc;

use crate::fixtures::FixtureStore;
use crate::types::*;

/// Shared application state
pub type AppState = Arc<FixtureStore>;

/// Custom error type for handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    /// Injected failure
    #[error("{0}")]
    Unavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        (status, self.to_string()).into_response()
    }
}

fn check_address(store: &FixtureStore, address: &str) -> Result<(), ApiError> {
    store.count_request();
    if store.is_address_failing(address) {
        log::warn!("Injected failure for address {}", address);
        return Err(ApiError::Unavailable(format!("address {} unavailable", address)));
    }
    Ok(())
}

fn lookup_tx(store: &FixtureStore, txid: &str) -> Result<String, ApiError> {
    store.count_request();
    if store.is_tx_failing(txid) {
        log::warn!("Injected failure for tx {}", txid);
        return Err(ApiError::Unavailable(format!("tx {} unavailable", txid)));
    }
    store
        .transaction(txid)
        .ok_or_else(|| ApiError::NotFound(format!("Transaction not found: {}", txid)))
}

/// GET /blocks/tip/height
/// Returns the current blockchain height as plain text
pub async fn get_tip_height(State(store): State<AppState>) -> String {
    store.count_request();
    store.tip_height().to_string()
}

/// POST /tx
/// Accepts a raw transaction (hex string in body) and returns its txid
pub async fn broadcast_transaction(
    State(store): State<AppState>,
    body: String,
) -> Result<String, ApiError> {
    store.count_request();
    let hex = body.trim().to_lowercase();
    let bytes = hex::decode(&hex)
        .map_err(|e| ApiError::BadRequest(format!("Failed to broadcast: {}", e)))?;
    let tx: Transaction = deserialize(&bytes)
        .map_err(|e| ApiError::BadRequest(format!("Failed to broadcast: {}", e)))?;

    let txid = tx.compute_txid().to_string();
    store.record_broadcast(&txid, &hex);
    log::info!("Accepted transaction {}", txid);

    Ok(txid)
}

/// GET /tx/{txid}/hex
/// Returns raw transaction hex
pub async fn get_transaction_hex(
    State(store): State<AppState>,
    Path(txid): Path<String>,
) -> Result<String, ApiError> {
    lookup_tx(&store, &txid)
}

/// GET /tx/{txid}/raw
/// Returns raw transaction bytes
pub async fn get_transaction_raw(
    State(store): State<AppState>,
    Path(txid): Path<String>,
) -> Result<Vec<u8>, ApiError> {
    let hex = lookup_tx(&store, &txid)?;
    hex::decode(hex).map_err(|e| ApiError::BadRequest(format!("Stored hex is invalid: {}", e)))
}

/// GET /address/{address}
/// Returns funding statistics for an address
pub async fn get_address(
    State(store): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<AddressResponse>, ApiError> {
    check_address(&store, &address)?;
    Ok(Json(AddressResponse {
        chain_stats: store.stats(&address),
        mempool_stats: AddressStats::default(),
        address,
    }))
}

/// GET /address/{address}/utxo
/// Returns all UTXOs for an address
pub async fn get_address_utxos(
    State(store): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Vec<UtxoResponse>>, ApiError> {
    check_address(&store, &address)?;
    let height = store.tip_height();
    let utxos = store
        .utxos(&address)
        .into_iter()
        .map(|u| UtxoResponse {
            txid: u.txid,
            vout: u.vout,
            value: u.value,
            status: UtxoStatus {
                confirmed: true,
                block_height: Some(height),
            },
        })
        .collect();
    Ok(Json(utxos))
}

/// GET /address/{address}/utxo-hex
/// UTXOs with their funding transaction hex inline; unknown transactions
/// come back with an empty `hex`
pub async fn get_address_utxos_hex(
    State(store): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Vec<UtxoHexResponse>>, ApiError> {
    check_address(&store, &address)?;
    let utxos = store
        .utxos(&address)
        .into_iter()
        .map(|u| UtxoHexResponse {
            hex: store.transaction(&u.txid).unwrap_or_default(),
            txid: u.txid,
            vout: u.vout,
            value: u.value,
        })
        .collect();
    Ok(Json(utxos))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}
