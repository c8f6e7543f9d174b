//! UTXO collection
//!
//! Fetches unspent outputs and the raw hex of each funding transaction from
//! an indexer. No derivation and no retries: failures surface as
//! `IndexerUnavailable` for the caller to act on.

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::DEFAULT_CONCURRENCY;
use crate::error::TxCoreError;

/// One entry of `/address/{a}/utxo` (or `/utxo-hex`, which adds `hex`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoEntry {
    pub txid: String,
    pub vout: u32,
    pub value: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hex: Option<String>,
}

/// A spendable output with the raw transaction that created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub txid: String,
    pub vout: u32,
    pub value: u64,
    pub raw_prev_tx_hex: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressUtxos {
    pub address: String,
    /// Ordered by (txid, vout)
    pub utxos: Vec<Utxo>,
    pub total_balance: u64,
}

/// Indexer endpoints consumed by the fetcher.
#[async_trait]
pub trait UtxoSource: Send + Sync {
    /// `GET /address/{address}/utxo`
    async fn list_utxos(&self, address: &str) -> Result<Vec<UtxoEntry>, TxCoreError>;

    /// `GET /address/{address}/utxo-hex`
    async fn list_utxos_with_hex(&self, address: &str) -> Result<Vec<UtxoEntry>, TxCoreError>;

    /// `GET /tx/{txid}/hex`
    async fn fetch_raw_tx(&self, txid: &str) -> Result<String, TxCoreError>;
}

pub struct UtxoFetcher<'a, S: UtxoSource + ?Sized> {
    source: &'a S,
    concurrency: usize,
    use_hex_endpoint: bool,
    /// Shared by nested fan-outs so the total in-flight count stays capped
    permits: Arc<Semaphore>,
}

impl<'a, S: UtxoSource + ?Sized> UtxoFetcher<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self::with_concurrency(source, DEFAULT_CONCURRENCY)
    }

    pub fn with_concurrency(source: &'a S, concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            source,
            concurrency,
            use_hex_endpoint: false,
            permits: Arc::new(Semaphore::new(concurrency)),
        }
    }

    pub fn use_hex_endpoint(mut self, enabled: bool) -> Self {
        self.use_hex_endpoint = enabled;
        self
    }

    /// Unspent outputs of `address` with their funding transactions.
    pub async fn fetch_utxos(&self, address: &str) -> Result<AddressUtxos, TxCoreError> {
        let mut utxos = if self.use_hex_endpoint {
            self.fetch_with_hex(address).await?
        } else {
            self.fetch_then_resolve(address).await?
        };

        utxos.sort_by(|a, b| (&a.txid, a.vout).cmp(&(&b.txid, b.vout)));

        let total_balance = utxos
            .iter()
            .try_fold(0u64, |acc, u| acc.checked_add(u.value))
            .ok_or_else(|| TxCoreError::InvalidResponse {
                context: format!("utxos of {}", address),
                reason: "value sum overflows".into(),
            })?;

        log::debug!(
            "{}: {} utxo(s), {} units",
            address,
            utxos.len(),
            total_balance
        );

        Ok(AddressUtxos {
            address: address.to_string(),
            utxos,
            total_balance,
        })
    }

    /// Raw hex of a transaction.
    pub async fn fetch_raw_tx(&self, txid: &str) -> Result<String, TxCoreError> {
        let _permit = self.permit().await?;
        self.source.fetch_raw_tx(txid).await
    }

    /// Fetch several addresses concurrently. Results keep the order of
    /// `addresses`.
    pub async fn fetch_many(&self, addresses: &[String]) -> Result<Vec<AddressUtxos>, TxCoreError> {
        stream::iter(addresses.iter())
            .map(|address| self.fetch_utxos(address))
            .buffered(self.concurrency)
            .try_collect()
            .await
    }

    async fn fetch_with_hex(&self, address: &str) -> Result<Vec<Utxo>, TxCoreError> {
        let entries = {
            let _permit = self.permit().await?;
            self.source.list_utxos_with_hex(address).await?
        };

        Ok(entries
            .into_iter()
            .filter_map(|entry| match entry.hex {
                Some(hex) if !hex.trim().is_empty() => Some(Utxo {
                    txid: entry.txid,
                    vout: entry.vout,
                    value: entry.value,
                    raw_prev_tx_hex: hex.trim().to_lowercase(),
                }),
                _ => {
                    log::warn!(
                        "Skipping {}:{} on {}: indexer returned no transaction hex",
                        entry.txid,
                        entry.vout,
                        address
                    );
                    None
                }
            })
            .collect())
    }

    async fn fetch_then_resolve(&self, address: &str) -> Result<Vec<Utxo>, TxCoreError> {
        let entries = {
            let _permit = self.permit().await?;
            self.source.list_utxos(address).await?
        };

        stream::iter(entries)
            .map(|entry| async move {
                let raw = self.fetch_raw_tx(&entry.txid).await?;
                Ok::<_, TxCoreError>(Utxo {
                    txid: entry.txid,
                    vout: entry.vout,
                    value: entry.value,
                    raw_prev_tx_hex: raw,
                })
            })
            .buffered(self.concurrency)
            .try_collect()
            .await
    }

    async fn permit(&self) -> Result<tokio::sync::SemaphorePermit<'_>, TxCoreError> {
        self.permits
            .acquire()
            .await
            .map_err(|e| TxCoreError::indexer("request permit", e))
    }
}
