//! Gap-limit address discovery
//!
//! Walks one derivation chain address by address, asking a [`BalanceOracle`]
//! whether each address was ever funded, and stops after [`GAP_LIMIT`]
//! unused addresses.

use async_trait::async_trait;

use super::address_manager::AddressManager;
use super::keys::{parse_path, ExtendedKey, KeyManager};
use crate::error::TxCoreError;
use crate::litecoin::address::LitecoinAddress;

pub const GAP_LIMIT: u32 = 20;

/// On-chain history of one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressUsage {
    /// Never received funds
    NeverUsed,
    Used { funded: u64, spent: u64 },
}

impl AddressUsage {
    /// Confirmed balance (funded minus spent).
    pub fn balance(&self) -> u64 {
        match self {
            AddressUsage::NeverUsed => 0,
            AddressUsage::Used { funded, spent } => funded.saturating_sub(*spent),
        }
    }
}

/// Source of per-address funding history.
#[async_trait]
pub trait BalanceOracle: Send + Sync {
    async fn address_usage(&self, address: &str) -> Result<AddressUsage, TxCoreError>;
}

/// How a used address affects the unused-address counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapPolicy {
    /// Reset the counter on every used address (BIP44 convention)
    ResetOnUse,
    /// Count every unused address since the start of the chain
    #[default]
    Cumulative,
}

/// A used address found during a scan, with the key that controls it.
#[derive(Debug)]
pub struct DerivedAddress {
    pub address: LitecoinAddress,
    pub index: u32,
    pub balance: u64,
    pub key: ExtendedKey,
}

pub struct AddressScanner<'a, O: BalanceOracle + ?Sized> {
    keys: &'a KeyManager,
    oracle: &'a O,
    gap_limit: u32,
    policy: GapPolicy,
}

impl<'a, O: BalanceOracle + ?Sized> AddressScanner<'a, O> {
    pub fn new(keys: &'a KeyManager, oracle: &'a O) -> Self {
        Self {
            keys,
            oracle,
            gap_limit: GAP_LIMIT,
            policy: GapPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: GapPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_gap_limit(mut self, gap_limit: u32) -> Self {
        self.gap_limit = gap_limit;
        self
    }

    /// Return every address on `path_prefix` that was ever funded, in index
    /// order. Oracle errors abort the scan.
    pub async fn scan(
        &self,
        root: &ExtendedKey,
        path_prefix: &str,
        hardened: bool,
    ) -> Result<Vec<DerivedAddress>, TxCoreError> {
        let prefix = parse_path(path_prefix)?;
        let mut used = Vec::new();
        let mut current_index: u32 = 0;
        let mut current_gap: u32 = 0;

        log::info!(
            "🔍 Scanning {} (hardened: {}, gap limit {}, {:?})",
            path_prefix,
            hardened,
            self.gap_limit,
            self.policy
        );

        while current_gap < self.gap_limit {
            let key = self
                .keys
                .derive_child(root, &prefix, current_index, hardened)?;
            let address = AddressManager::address_from_key(self.keys, &key)?;

            match self.oracle.address_usage(address.as_str()).await? {
                AddressUsage::NeverUsed => {
                    current_gap += 1;
                }
                usage => {
                    log::debug!(
                        "Address {} (index {}) used, balance {}",
                        address,
                        current_index,
                        usage.balance()
                    );
                    if self.policy == GapPolicy::ResetOnUse {
                        current_gap = 0;
                    }
                    used.push(DerivedAddress {
                        address,
                        index: current_index,
                        balance: usage.balance(),
                        key,
                    });
                }
            }

            current_index = current_index.checked_add(1).ok_or_else(|| {
                TxCoreError::AddressDerivationFailed("child index space exhausted".into())
            })?;
        }

        log::info!(
            "✓ {} used address(es) on {} after {} derivations",
            used.len(),
            path_prefix,
            current_index
        );

        Ok(used)
    }
}
