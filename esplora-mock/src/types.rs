/// Esplora API response types
///
/// These types match the Esplora API format so clients can consume them transparently.

use serde::{Deserialize, Serialize};

/// Address summary from /address/{address}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressResponse {
    pub address: String,
    pub chain_stats: AddressStats,
    pub mempool_stats: AddressStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressStats {
    pub funded_txo_count: u64,
    pub funded_txo_sum: u64,
    pub spent_txo_count: u64,
    pub spent_txo_sum: u64,
    pub tx_count: u64,
}

/// UTXO response from /address/{address}/utxo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtxoResponse {
    pub txid: String,
    pub vout: u32,
    pub value: u64,
    pub status: UtxoStatus,
}

/// UTXO response from /address/{address}/utxo-hex, carrying the funding
/// transaction inline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtxoHexResponse {
    pub txid: String,
    pub vout: u32,
    pub value: u64,
    pub hex: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtxoStatus {
    pub confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_height: Option<u64>,
}
