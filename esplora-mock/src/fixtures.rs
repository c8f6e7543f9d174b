/// In-memory indexer state
///
/// Addresses, their unspent outputs and raw transactions, plus failure
/// injection so clients can be tested against an indexer that returns 503.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::types::AddressStats;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UtxoFixture {
    pub txid: String,
    pub vout: u32,
    pub value: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressFixture {
    #[serde(default)]
    pub stats: AddressStats,
    #[serde(default)]
    pub utxos: Vec<UtxoFixture>,
}

/// On-disk fixture format loaded by the binary (`FIXTURE_PATH`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixtures {
    #[serde(default)]
    pub tip_height: u64,
    #[serde(default)]
    pub addresses: HashMap<String, AddressFixture>,
    /// txid -> raw transaction hex
    #[serde(default)]
    pub transactions: HashMap<String, String>,
}

#[derive(Default)]
struct State {
    fixtures: Fixtures,
    failing_addresses: HashSet<String>,
    failing_txs: HashSet<String>,
    broadcasts: Vec<String>,
}

#[derive(Default)]
pub struct FixtureStore {
    state: RwLock<State>,
    requests: AtomicU64,
}

impl FixtureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixtures(fixtures: Fixtures) -> Self {
        Self {
            state: RwLock::new(State {
                fixtures,
                ..Default::default()
            }),
            requests: AtomicU64::new(0),
        }
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(Self::from_fixtures(serde_json::from_str(json)?))
    }

    /// Add an unspent output paying `address`. Counts as funding.
    pub fn add_utxo(&self, address: &str, txid: &str, vout: u32, value: u64) {
        self.with_address(address, |entry| {
            entry.utxos.push(UtxoFixture {
                txid: txid.to_string(),
                vout,
                value,
            });
            entry.stats.funded_txo_count += 1;
            entry.stats.funded_txo_sum += value;
            entry.stats.tx_count += 1;
        });
    }

    /// Record an output that paid `address` and was later spent.
    pub fn add_spent(&self, address: &str, value: u64) {
        self.with_address(address, |entry| {
            entry.stats.funded_txo_count += 1;
            entry.stats.funded_txo_sum += value;
            entry.stats.spent_txo_count += 1;
            entry.stats.spent_txo_sum += value;
            entry.stats.tx_count += 2;
        });
    }

    pub fn add_transaction(&self, txid: &str, hex: &str) {
        self.write()
            .fixtures
            .transactions
            .insert(txid.to_string(), hex.to_lowercase());
    }

    pub fn set_tip_height(&self, height: u64) {
        self.write().fixtures.tip_height = height;
    }

    /// Answer 503 for every request about `address`.
    pub fn fail_address(&self, address: &str) {
        self.write().failing_addresses.insert(address.to_string());
    }

    /// Answer 503 for every request about `txid`.
    pub fn fail_tx(&self, txid: &str) {
        self.write().failing_txs.insert(txid.to_string());
    }

    pub fn is_address_failing(&self, address: &str) -> bool {
        self.read().failing_addresses.contains(address)
    }

    pub fn is_tx_failing(&self, txid: &str) -> bool {
        self.read().failing_txs.contains(txid)
    }

    pub fn stats(&self, address: &str) -> AddressStats {
        self.read()
            .fixtures
            .addresses
            .get(address)
            .map(|a| a.stats.clone())
            .unwrap_or_default()
    }

    pub fn utxos(&self, address: &str) -> Vec<UtxoFixture> {
        self.read()
            .fixtures
            .addresses
            .get(address)
            .map(|a| a.utxos.clone())
            .unwrap_or_default()
    }

    pub fn transaction(&self, txid: &str) -> Option<String> {
        self.read().fixtures.transactions.get(txid).cloned()
    }

    pub fn tip_height(&self) -> u64 {
        self.read().fixtures.tip_height
    }

    pub fn record_broadcast(&self, txid: &str, hex: &str) {
        let mut state = self.write();
        state.broadcasts.push(hex.to_string());
        state
            .fixtures
            .transactions
            .insert(txid.to_string(), hex.to_string());
    }

    pub fn broadcasts(&self) -> Vec<String> {
        self.read().broadcasts.clone()
    }

    pub fn count_request(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    /// Requests served since start, including failed ones
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }

    fn with_address<F: FnOnce(&mut AddressFixture)>(&self, address: &str, f: F) {
        let mut state = self.write();
        f(state
            .fixtures
            .addresses
            .entry(address.to_string())
            .or_default());
    }

    // A poisoned lock only means a test thread panicked mid-update; the
    // fixture data is still usable.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utxos_count_as_funding() {
        let store = FixtureStore::new();
        store.add_utxo("addr", "aa", 0, 1000);
        store.add_utxo("addr", "bb", 1, 500);
        store.add_spent("addr", 200);

        let stats = store.stats("addr");
        assert_eq!(stats.funded_txo_sum, 1700);
        assert_eq!(stats.spent_txo_sum, 200);
        assert_eq!(store.utxos("addr").len(), 2);
        assert_eq!(store.stats("unknown"), AddressStats::default());
    }

    #[test]
    fn test_fixture_json() {
        let store = FixtureStore::from_json(
            r#"{
                "tip_height": 120,
                "addresses": {"addr": {"utxos": [{"txid": "aa", "vout": 0, "value": 5}]}},
                "transactions": {"aa": "0200"}
            }"#,
        )
        .unwrap();
        assert_eq!(store.tip_height(), 120);
        assert_eq!(store.utxos("addr")[0].value, 5);
        assert_eq!(store.transaction("aa").as_deref(), Some("0200"));
    }

    #[test]
    fn test_failure_injection() {
        let store = FixtureStore::new();
        store.fail_address("addr");
        store.fail_tx("aa");
        assert!(store.is_address_failing("addr"));
        assert!(store.is_tx_failing("aa"));
        assert!(!store.is_tx_failing("bb"));
    }
}
