/// Transaction-core configuration from environment variables
///
/// Controls the target Litecoin network, the Esplora-compatible indexer and
/// the fee policy. Defaults to mainnet against litecoinspace.org.

use std::env;
use std::time::Duration;

use crate::litecoin::fee::{DEFAULT_FEE_RATE, DEFAULT_MWEB_FEE_RATE};
use crate::litecoin::network::LitecoinNetwork;
use crate::litecoin::transaction::{SweepFee, LEGACY_SWEEP_RATE_MSAT};
use crate::wallet::scanner::GapPolicy;

pub const DEFAULT_CONCURRENCY: usize = 8;
pub const MAX_CONCURRENCY: usize = 16;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct TxCoreConfig {
    /// Target ledger for version bytes and HRPs
    pub network: LitecoinNetwork,
    /// Esplora-compatible indexer base URL (no trailing slash)
    pub indexer_url: String,
    /// Cap on concurrent outbound indexer calls per fan-out
    pub indexer_concurrency: usize,
    pub indexer_timeout: Duration,
    /// Fetch UTXOs with their funding tx hex in one call (`/utxo-hex`)
    pub use_utxo_hex_endpoint: bool,
    /// Regular-ledger fee rate in sat/vbyte
    pub fee_rate: u64,
    /// MWEB fee rate in sat/weight-unit
    pub mweb_fee_rate: u64,
    pub sweep_fee: SweepFee,
    pub gap_policy: GapPolicy,
}

impl TxCoreConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `LTC_NETWORK`: "mainnet" (default), "testnet" or "regtest"
    /// - `INDEXER_URL`: Esplora API endpoint (optional, has per-network defaults)
    /// - `INDEXER_CONCURRENCY`: concurrent indexer calls, 1..=16 (default 8)
    /// - `INDEXER_TIMEOUT_SECS`: HTTP timeout (default 30)
    /// - `INDEXER_UTXO_HEX`: "true" to use `/address/{a}/utxo-hex`
    /// - `FEE_RATE`: sat/vbyte (default 10)
    /// - `MWEB_FEE_RATE`: sat/weight-unit (default 100)
    /// - `SWEEP_FEE_MODE`: "legacy" (default, flat 18.8 sat/vB) or "estimated"
    /// - `GAP_POLICY`: "cumulative" (default) or "reset"
    ///
    /// Invalid values are logged and replaced by their defaults.
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Regtest against a local esplora-mock
    /// LTC_NETWORK=regtest INDEXER_URL=http://localhost:3000 ltc-txcore sweep ...
    /// ```
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let network = match lookup("LTC_NETWORK") {
            Some(value) => value.parse().unwrap_or_else(|e| {
                log::warn!("⚠️  {}, defaulting to mainnet", e);
                LitecoinNetwork::Mainnet
            }),
            None => LitecoinNetwork::Mainnet,
        };
        log::info!("🌐 Using {} network", network);

        let indexer_url = lookup("INDEXER_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| network.default_indexer_url().to_string());
        log::info!("📡 Indexer URL: {}", indexer_url);

        let indexer_concurrency = parse_or(&lookup, "INDEXER_CONCURRENCY", DEFAULT_CONCURRENCY)
            .clamp(1, MAX_CONCURRENCY);
        let indexer_timeout =
            Duration::from_secs(parse_or(&lookup, "INDEXER_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS));
        let use_utxo_hex_endpoint = parse_or(&lookup, "INDEXER_UTXO_HEX", false);

        let fee_rate = parse_or(&lookup, "FEE_RATE", DEFAULT_FEE_RATE);
        let mweb_fee_rate = parse_or(&lookup, "MWEB_FEE_RATE", DEFAULT_MWEB_FEE_RATE);

        let sweep_fee = match lookup("SWEEP_FEE_MODE").as_deref().map(str::to_lowercase) {
            None => SweepFee::default(),
            Some(mode) if mode == "legacy" => SweepFee::default(),
            Some(mode) if mode == "estimated" => SweepFee::Estimated {
                sat_per_vbyte: fee_rate,
            },
            Some(other) => {
                log::warn!("⚠️  Unknown SWEEP_FEE_MODE '{}', using legacy", other);
                SweepFee::default()
            }
        };

        let gap_policy = match lookup("GAP_POLICY").as_deref().map(str::to_lowercase) {
            None => GapPolicy::default(),
            Some(policy) if policy == "reset" => GapPolicy::ResetOnUse,
            Some(policy) if policy == "cumulative" => GapPolicy::Cumulative,
            Some(other) => {
                log::warn!("⚠️  Unknown GAP_POLICY '{}', using cumulative", other);
                GapPolicy::default()
            }
        };

        Self {
            network,
            indexer_url,
            indexer_concurrency,
            indexer_timeout,
            use_utxo_hex_endpoint,
            fee_rate,
            mweb_fee_rate,
            sweep_fee,
            gap_policy,
        }
    }

    /// BIP44 coin type for this network
    ///
    /// - Mainnet: 2
    /// - Testnet/Regtest: 1
    pub fn coin_type(&self) -> u32 {
        self.network.params().coin_type
    }

    /// BIP84 account path, e.g. "m/84'/2'/0'" on mainnet
    pub fn derivation_path(&self, account: u32) -> String {
        format!("m/84'/{}'/{}'", self.coin_type(), account)
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("⚠️  Invalid {}='{}', using {}", key, raw, default);
            default
        }),
        None => default,
    }
}

impl Default for TxCoreConfig {
    /// Default configuration (mainnet)
    fn default() -> Self {
        Self {
            network: LitecoinNetwork::Mainnet,
            indexer_url: LitecoinNetwork::Mainnet.default_indexer_url().to_string(),
            indexer_concurrency: DEFAULT_CONCURRENCY,
            indexer_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            use_utxo_hex_endpoint: false,
            fee_rate: DEFAULT_FEE_RATE,
            mweb_fee_rate: DEFAULT_MWEB_FEE_RATE,
            sweep_fee: SweepFee::Legacy {
                millisat_per_vbyte: LEGACY_SWEEP_RATE_MSAT,
            },
            gap_policy: GapPolicy::Cumulative,
        }
    }
}
