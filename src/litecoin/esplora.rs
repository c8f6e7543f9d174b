//! Esplora-compatible indexer client
//!
//! Serves both as the scanner's [`BalanceOracle`] (`/address/{a}`) and as the
//! fetcher's [`UtxoSource`] (`/address/{a}/utxo`, `/address/{a}/utxo-hex`,
//! `/tx/{txid}/hex`).

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::utxo::{UtxoEntry, UtxoSource};
use crate::config::TxCoreConfig;
use crate::error::TxCoreError;
use crate::wallet::scanner::{AddressUsage, BalanceOracle};

#[derive(Clone)]
pub struct EsploraClient {
    client: reqwest::Client,
    base_url: String,
}

impl EsploraClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TxCoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TxCoreError::indexer("HTTP client setup", e))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &TxCoreConfig) -> Result<Self, TxCoreError> {
        Self::new(config.indexer_url.clone(), config.indexer_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_tip_height(&self) -> Result<u64, TxCoreError> {
        let context = "GET /blocks/tip/height";
        let body = self.get_text("/blocks/tip/height").await?;
        body.trim()
            .parse()
            .map_err(|e: std::num::ParseIntError| TxCoreError::InvalidResponse {
                context: context.into(),
                reason: e.to_string(),
            })
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, TxCoreError> {
        let url = format!("{}{}", self.base_url, path);
        let context = format!("GET {}", path);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TxCoreError::indexer(context.as_str(), e))?;

        if !response.status().is_success() {
            return Err(TxCoreError::indexer(
                context,
                format!("HTTP {}", response.status()),
            ));
        }

        Ok(response)
    }

    async fn get_text(&self, path: &str) -> Result<String, TxCoreError> {
        self.get(path)
            .await?
            .text()
            .await
            .map_err(|e| TxCoreError::indexer(format!("GET {}", path), e))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TxCoreError> {
        let body = self.get_text(path).await?;
        serde_json::from_str(&body).map_err(|e| TxCoreError::InvalidResponse {
            context: format!("GET {}", path),
            reason: e.to_string(),
        })
    }
}

/// Funding history from an `/address/{a}` body. Only confirmed
/// `chain_stats` count; a body without them is malformed.
fn parse_usage(address: &str, info: &serde_json::Value) -> Result<AddressUsage, TxCoreError> {
    let stats = info
        .get("chain_stats")
        .filter(|s| s.is_object())
        .ok_or_else(|| TxCoreError::InvalidResponse {
            context: format!("GET /address/{}", address),
            reason: "missing chain_stats".into(),
        })?;

    let field = |name: &str| {
        stats[name]
            .as_u64()
            .ok_or_else(|| TxCoreError::InvalidResponse {
                context: format!("GET /address/{}", address),
                reason: format!("chain_stats.{} is not an unsigned integer", name),
            })
    };

    let funded = field("funded_txo_sum")?;
    let spent = field("spent_txo_sum")?;

    if funded == 0 {
        Ok(AddressUsage::NeverUsed)
    } else {
        Ok(AddressUsage::Used { funded, spent })
    }
}

#[async_trait]
impl BalanceOracle for EsploraClient {
    async fn address_usage(&self, address: &str) -> Result<AddressUsage, TxCoreError> {
        let path = format!("/address/{}", address);

        let info: serde_json::Value = match self.get_json(&path).await {
            Ok(info) => info,
            Err(TxCoreError::IndexerUnavailable { reason, .. }) => {
                return Err(TxCoreError::BalanceOracle {
                    address: address.to_string(),
                    reason,
                })
            }
            Err(e) => return Err(e),
        };

        parse_usage(address, &info)
    }
}

#[async_trait]
impl UtxoSource for EsploraClient {
    async fn list_utxos(&self, address: &str) -> Result<Vec<UtxoEntry>, TxCoreError> {
        self.get_json(&format!("/address/{}/utxo", address)).await
    }

    async fn list_utxos_with_hex(&self, address: &str) -> Result<Vec<UtxoEntry>, TxCoreError> {
        self.get_json(&format!("/address/{}/utxo-hex", address))
            .await
    }

    async fn fetch_raw_tx(&self, txid: &str) -> Result<String, TxCoreError> {
        let path = format!("/tx/{}/hex", txid);
        let hex = self.get_text(&path).await?.trim().to_lowercase();

        if hex.is_empty() || hex.len() % 2 != 0 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TxCoreError::InvalidResponse {
                context: format!("GET {}", path),
                reason: "body is not a hex transaction".into(),
            });
        }

        Ok(hex)
    }
}
