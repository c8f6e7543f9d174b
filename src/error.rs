//! Error types for transaction construction
//!
//! Every fallible operation in the crate returns [`TxCoreError`]. Variants carry
//! enough context (address, txid, input index, oracle call) for a caller to
//! decide whether to retry the whole operation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TxCoreError {
    #[error("Invalid seed phrase: {0}")]
    InvalidSeed(String),

    #[error("Invalid extended key: {0}")]
    InvalidExtendedKey(String),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// A valid key could not be turned into an address. Unreachable for
    /// well-formed keys.
    #[error("Address derivation failed: {0}")]
    AddressDerivationFailed(String),

    #[error("Balance oracle error for {address}: {reason}")]
    BalanceOracle { address: String, reason: String },

    #[error("Invalid indexer response ({context}): {reason}")]
    InvalidResponse { context: String, reason: String },

    #[error("Indexer unavailable ({context}): {reason}")]
    IndexerUnavailable { context: String, reason: String },

    #[error("Invalid previous transaction {txid}: {reason}")]
    InvalidPrevTx { txid: String, reason: String },

    #[error("No funds found")]
    NoFundsFound,

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Input/key bookkeeping mismatch. Always a logic bug.
    #[error("Signing failed for input {input}: {reason}")]
    SigningFailed { input: usize, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TxCoreError {
    /// Transient network conditions the caller may retry as a whole.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TxCoreError::BalanceOracle { .. } | TxCoreError::IndexerUnavailable { .. }
        )
    }

    pub(crate) fn indexer(context: impl Into<String>, reason: impl ToString) -> Self {
        TxCoreError::IndexerUnavailable {
            context: context.into(),
            reason: reason.to_string(),
        }
    }
}
