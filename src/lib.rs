//! ltc-txcore: Litecoin + MWEB transaction construction core
//!
//! This crate derives spendable key material from a seed phrase or serialized
//! extended key, discovers funded addresses with gap-limit scanning, sizes fees
//! for the hybrid regular/MWEB ledger, and assembles fully signed sweep
//! transactions against UTXO data fetched from an Esplora-compatible indexer.
//!
//! # Architecture
//!
//! - **KeyDerivation** (`wallet::keys`): BIP32 roots and children under Litecoin version bytes
//! - **AddressScanner** (`wallet::scanner`): gap-limit discovery against a balance oracle
//! - **UtxoFetcher** (`litecoin::utxo`): bounded-concurrency UTXO and previous-tx collection
//! - **WeightFeeEngine** (`litecoin::fee`): consensus-shaped weight and fee arithmetic
//! - **TransactionBuilder** (`litecoin::transaction`, `litecoin::spend`): sweep signing and
//!   targeted-spend shape selection
//!
//! # Example
//!
//! ```ignore
//! use ltc_txcore::{EsploraClient, Sweeper, TxCoreConfig};
//!
//! let config = TxCoreConfig::from_env();
//! let client = EsploraClient::from_config(&config)?;
//! let sweeper = Sweeper::new(&config, &client, &client);
//!
//! let swept = sweeper.sweep_mnemonic(words, "ltc1q...").await?;
//! println!("{}", swept.tx_hex);
//! ```

// Public modules
pub mod config;
pub mod error;
pub mod litecoin;
pub mod wallet;

// Re-exports for convenience
pub use config::TxCoreConfig;
pub use error::TxCoreError;
pub use litecoin::address::{AddressKind, LitecoinAddress};
pub use litecoin::esplora::EsploraClient;
pub use litecoin::fee::{
    estimate, EstimateResult, Funding, InputKind, InputSpec, MwebKernel, OutputKind, OutputSpec,
    TransactionSpec,
};
pub use litecoin::network::{LitecoinNetwork, NetworkParams};
pub use litecoin::spend::{build_transaction_spec, plan_spend, SpendPlan, SpendRequest};
pub use litecoin::transaction::{SweepFee, SweptTransaction, TransactionBuilder};
pub use litecoin::utxo::{AddressUtxos, Utxo, UtxoFetcher, UtxoSource};
pub use wallet::keys::{ExtendedKey, KeyManager, SigningKey};
pub use wallet::scanner::{AddressScanner, AddressUsage, BalanceOracle, DerivedAddress, GapPolicy};
pub use wallet::sweep::Sweeper;

// Common result type
pub type Result<T> = std::result::Result<T, TxCoreError>;
