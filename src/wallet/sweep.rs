//! Sweep entry points
//!
//! Collect everything a seed, extended key or single WIF key controls and
//! move it to one destination in a single signed transaction.

use super::address_manager::AddressManager;
use super::keys::{ExtendedKey, KeyManager, SigningKey};
use super::scanner::{AddressScanner, BalanceOracle};
use crate::config::TxCoreConfig;
use crate::error::TxCoreError;
use crate::litecoin::address::LitecoinAddress;
use crate::litecoin::fee::InputKind;
use crate::litecoin::network::LitecoinNetwork;
use crate::litecoin::transaction::{SweepBatch, SweepFee, SweptTransaction, TransactionBuilder};
use crate::litecoin::utxo::{UtxoFetcher, UtxoSource};

/// Receive chain of the legacy wallet layout
pub const EXTERNAL_CHAIN: &str = "m/0'/0/";
pub const CHANGE_CHAIN: &str = "m/0'/1/";

/// Base58 prefix of a serialized extended private key on `network`.
fn extended_private_prefix(network: LitecoinNetwork) -> &'static str {
    match network {
        LitecoinNetwork::Mainnet => "Ltpv",
        LitecoinNetwork::Testnet | LitecoinNetwork::Regtest => "tprv",
    }
}

pub struct Sweeper<'a, O: BalanceOracle + ?Sized, S: UtxoSource + ?Sized> {
    config: &'a TxCoreConfig,
    keys: KeyManager,
    oracle: &'a O,
    source: &'a S,
    fee: SweepFee,
}

impl<'a, O: BalanceOracle + ?Sized, S: UtxoSource + ?Sized> Sweeper<'a, O, S> {
    pub fn new(config: &'a TxCoreConfig, oracle: &'a O, source: &'a S) -> Self {
        Self {
            config,
            keys: KeyManager::new(config.network),
            oracle,
            source,
            fee: config.sweep_fee,
        }
    }

    pub fn with_fee(mut self, fee: SweepFee) -> Self {
        self.fee = fee;
        self
    }

    /// Sweep both chains of the wallet behind a BIP39 phrase.
    pub async fn sweep_mnemonic(
        &self,
        words: &str,
        destination: &str,
    ) -> Result<SweptTransaction, TxCoreError> {
        let destination = self.parse_destination(destination)?;
        let root = self.keys.root_from_mnemonic(words)?;
        self.sweep_root(&root, &destination).await
    }

    /// Sweep both chains below a serialized extended private key.
    pub async fn sweep_extended_key(
        &self,
        encoded: &str,
        destination: &str,
    ) -> Result<SweptTransaction, TxCoreError> {
        let destination = self.parse_destination(destination)?;
        let root = self.keys.root_from_extended_key(encoded)?;
        self.sweep_root(&root, &destination).await
    }

    /// Sweep every template a single WIF key can receive on.
    pub async fn sweep_wif(
        &self,
        wif: &str,
        destination: &str,
    ) -> Result<SweptTransaction, TxCoreError> {
        let destination = self.parse_destination(destination)?;
        let key = SigningKey::from_wif(wif, self.config.network)?;
        let templates = AddressManager::templates_for_key(&self.keys, &key)?;

        log::info!(
            "🔑 Sweeping WIF key ({} template(s), compressed: {})",
            templates.len(),
            key.is_compressed()
        );

        let addresses: Vec<String> = templates
            .iter()
            .map(|(_, address)| address.to_string())
            .collect();
        let fetched = self.fetcher().fetch_many(&addresses).await?;

        let mut batch = SweepBatch::new();
        let key_index = batch.add_key(key);

        for ((kind, address), found) in templates.iter().zip(fetched) {
            if found.utxos.is_empty() {
                continue;
            }
            log::info!(
                "💰 {} ({}): {} utxo(s), {}",
                address,
                kind.as_str(),
                found.utxos.len(),
                found.total_balance
            );
            for utxo in found.utxos {
                batch.add_input(utxo, *kind, key_index);
            }
        }

        self.finish(&batch, &destination)
    }

    /// Sweep a key scanned from a QR code: extended private keys go through
    /// the HD sweep, anything else is treated as WIF.
    pub async fn sweep_qr_key(
        &self,
        key: &str,
        destination: &str,
    ) -> Result<SweptTransaction, TxCoreError> {
        let key = key.trim();
        if key.contains(extended_private_prefix(self.config.network)) {
            self.sweep_extended_key(key, destination).await
        } else {
            self.sweep_wif(key, destination).await
        }
    }

    async fn sweep_root(
        &self,
        root: &ExtendedKey,
        destination: &LitecoinAddress,
    ) -> Result<SweptTransaction, TxCoreError> {
        let scanner = AddressScanner::new(&self.keys, self.oracle).with_policy(self.config.gap_policy);

        let mut funded = Vec::new();
        for chain in [EXTERNAL_CHAIN, CHANGE_CHAIN] {
            let found = scanner.scan(root, chain, false).await?;
            funded.extend(found.into_iter().filter(|d| d.balance > 0));
        }

        log::info!("💰 {} funded address(es) across both chains", funded.len());

        let addresses: Vec<String> = funded.iter().map(|d| d.address.to_string()).collect();
        let fetched = self.fetcher().fetch_many(&addresses).await?;

        let mut batch = SweepBatch::new();
        for (derived, found) in funded.iter().zip(fetched) {
            if found.utxos.is_empty() {
                log::warn!(
                    "⚠️  {} reports balance {} but has no unspent outputs",
                    derived.address,
                    derived.balance
                );
                continue;
            }
            let key_index = batch.add_key(derived.key.signing_key());
            for utxo in found.utxos {
                batch.add_input(utxo, InputKind::P2pkh, key_index);
            }
        }

        self.finish(&batch, destination)
    }

    fn finish(
        &self,
        batch: &SweepBatch,
        destination: &LitecoinAddress,
    ) -> Result<SweptTransaction, TxCoreError> {
        if batch.is_empty() {
            log::warn!("⚠️  Nothing to sweep");
            return Err(TxCoreError::NoFundsFound);
        }

        let total = batch.total_value()?;
        log::info!(
            "🧹 Sweeping {} input(s), {} total, to {}",
            batch.len(),
            total,
            destination
        );

        TransactionBuilder::new(self.config.network).build_sweep(batch, destination, self.fee)
    }

    fn fetcher(&self) -> UtxoFetcher<'a, S> {
        UtxoFetcher::with_concurrency(self.source, self.config.indexer_concurrency)
            .use_hex_endpoint(self.config.use_utxo_hex_endpoint)
    }

    fn parse_destination(&self, destination: &str) -> Result<LitecoinAddress, TxCoreError> {
        let address = LitecoinAddress::parse(destination, self.config.network)?;
        if address.is_mweb() {
            return Err(TxCoreError::InvalidAddress(format!(
                "{} is an MWEB address; sweeps pay a regular-ledger output",
                destination
            )));
        }
        Ok(address)
    }
}
