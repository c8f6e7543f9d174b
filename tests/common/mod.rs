//! Shared helpers for integration tests: an in-process indexer and fixture
//! funding transactions built with the `bitcoin` crate.

#![allow(dead_code)]

use bitcoin::absolute::LockTime;
use bitcoin::consensus::encode::serialize_hex;
use bitcoin::hashes::Hash;
use bitcoin::transaction::{OutPoint, Sequence, Transaction, TxIn, TxOut, Version};
use bitcoin::{Amount, ScriptBuf, Txid, Witness};
use esplora_mock::{spawn_ephemeral, FixtureStore};
use ltc_txcore::wallet::keys::parse_path;
use ltc_txcore::wallet::AddressManager;
use ltc_txcore::{EsploraClient, KeyManager, LitecoinAddress, LitecoinNetwork, TxCoreConfig};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
pub const DESTINATION: &str = "ltc1qdze7y7chruzccmegt6tu0ewrltjm7k7xtux6us";

static FUNDING_NONCE: AtomicU32 = AtomicU32::new(1);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// esplora-mock served on an ephemeral port.
pub struct TestIndexer {
    pub store: Arc<FixtureStore>,
    pub url: String,
    handle: JoinHandle<()>,
}

impl TestIndexer {
    pub async fn start() -> Self {
        init_logging();
        let store = Arc::new(FixtureStore::new());
        let (url, handle) = spawn_ephemeral(store.clone())
            .await
            .expect("Failed to start esplora-mock");
        Self { store, url, handle }
    }

    pub fn config(&self) -> TxCoreConfig {
        TxCoreConfig {
            indexer_url: self.url.clone(),
            ..TxCoreConfig::default()
        }
    }

    pub fn client(&self) -> EsploraClient {
        EsploraClient::new(self.url.clone(), Duration::from_secs(10)).expect("HTTP client")
    }

    /// Confirm a transaction paying `values` to `address`; returns its txid.
    pub fn fund(&self, address: &LitecoinAddress, values: &[u64]) -> String {
        let script = address
            .script_pubkey()
            .expect("regular address")
            .to_owned();
        let (txid, hex) = funding_tx(&script, values);

        self.store.add_transaction(&txid, &hex);
        for (vout, value) in values.iter().enumerate() {
            self.store
                .add_utxo(address.as_str(), &txid, vout as u32, *value);
        }
        txid
    }

    /// Mark `address` as used in the past with nothing left on it.
    pub fn spent_out(&self, address: &LitecoinAddress, value: u64) {
        self.store.add_spent(address.as_str(), value);
    }
}

impl Drop for TestIndexer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A unique transaction paying every value in `values` to `script`.
pub fn funding_tx(script: &ScriptBuf, values: &[u64]) -> (String, String) {
    let nonce = FUNDING_NONCE.fetch_add(1, Ordering::SeqCst);
    let mut prev = [0u8; 32];
    prev[..4].copy_from_slice(&nonce.to_le_bytes());

    let tx = Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint {
                txid: Txid::from_byte_array(prev),
                vout: 0,
            },
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::new(),
        }],
        output: values
            .iter()
            .map(|value| TxOut {
                value: Amount::from_sat(*value),
                script_pubkey: script.clone(),
            })
            .collect(),
    };

    (tx.compute_txid().to_string(), serialize_hex(&tx))
}

/// P2PKH address at `chain/index` of the test wallet, e.g. chain "m/0'/0".
pub fn wallet_address(chain: &str, index: u32) -> LitecoinAddress {
    let keys = KeyManager::new(LitecoinNetwork::Mainnet);
    let root = keys.root_from_mnemonic(MNEMONIC).expect("valid mnemonic");
    let prefix = parse_path(chain).expect("valid path");
    AddressManager::derive_addresses(&keys, &root, &prefix, index, 1, false)
        .expect("derivation")
        .remove(0)
        .1
}

pub fn decode_tx(hex: &str) -> Transaction {
    bitcoin::consensus::encode::deserialize(&hex::decode(hex).expect("hex")).expect("transaction")
}
