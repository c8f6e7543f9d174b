//! Litecoin network constants
//!
//! Version bytes for extended keys, base58 addresses and WIF, plus bech32
//! human-readable parts for segwit and MWEB addresses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LitecoinNetwork {
    #[default]
    Mainnet,
    Testnet,
    Regtest,
}

/// Wire-format constants for one ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkParams {
    /// BIP32 extended private key version ("Ltpv" / "tprv")
    pub bip32_private: [u8; 4],
    /// BIP32 extended public key version ("Ltub" / "tpub")
    pub bip32_public: [u8; 4],
    pub pubkey_hash: u8,
    pub script_hash: u8,
    /// Pre-0x32 script hash byte still accepted when parsing mainnet addresses
    pub legacy_script_hash: Option<u8>,
    pub wif: u8,
    pub bech32_hrp: &'static str,
    pub mweb_hrp: &'static str,
    /// BIP44 coin type
    pub coin_type: u32,
}

const MAINNET: NetworkParams = NetworkParams {
    bip32_private: [0x01, 0x9d, 0x9c, 0xfe],
    bip32_public: [0x01, 0x9d, 0xa4, 0x62],
    pubkey_hash: 0x30,
    script_hash: 0x32,
    legacy_script_hash: Some(0x05),
    wif: 0xb0,
    bech32_hrp: "ltc",
    mweb_hrp: "ltcmweb",
    coin_type: 2,
};

const TESTNET: NetworkParams = NetworkParams {
    bip32_private: [0x04, 0x35, 0x83, 0x94],
    bip32_public: [0x04, 0x35, 0x87, 0xcf],
    pubkey_hash: 0x6f,
    script_hash: 0x3a,
    legacy_script_hash: Some(0xc4),
    wif: 0xef,
    bech32_hrp: "tltc",
    mweb_hrp: "tmweb",
    coin_type: 1,
};

const REGTEST: NetworkParams = NetworkParams {
    bech32_hrp: "rltc",
    mweb_hrp: "rmweb",
    ..TESTNET
};

impl LitecoinNetwork {
    pub fn params(self) -> &'static NetworkParams {
        match self {
            LitecoinNetwork::Mainnet => &MAINNET,
            LitecoinNetwork::Testnet => &TESTNET,
            LitecoinNetwork::Regtest => &REGTEST,
        }
    }

    /// Key-encoding family used by the `bitcoin` crate's BIP32 types.
    pub fn network_kind(self) -> bitcoin::NetworkKind {
        match self {
            LitecoinNetwork::Mainnet => bitcoin::NetworkKind::Main,
            LitecoinNetwork::Testnet | LitecoinNetwork::Regtest => bitcoin::NetworkKind::Test,
        }
    }

    /// Default Esplora-compatible indexer for this network.
    pub fn default_indexer_url(self) -> &'static str {
        match self {
            LitecoinNetwork::Mainnet => "https://litecoinspace.org/api",
            LitecoinNetwork::Testnet => "https://litecoinspace.org/testnet/api",
            LitecoinNetwork::Regtest => "http://localhost:3000",
        }
    }
}

impl fmt::Display for LitecoinNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LitecoinNetwork::Mainnet => "mainnet",
            LitecoinNetwork::Testnet => "testnet",
            LitecoinNetwork::Regtest => "regtest",
        };
        f.write_str(name)
    }
}

impl FromStr for LitecoinNetwork {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" | "main" | "litecoin" | "ltc" => Ok(LitecoinNetwork::Mainnet),
            "testnet" | "test" | "testnet4" => Ok(LitecoinNetwork::Testnet),
            "regtest" => Ok(LitecoinNetwork::Regtest),
            other => Err(format!("unknown network '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_version_bytes() {
        let p = LitecoinNetwork::Mainnet.params();
        assert_eq!(u32::from_be_bytes(p.bip32_private), 0x019d9cfe);
        assert_eq!(u32::from_be_bytes(p.bip32_public), 0x019da462);
        assert_eq!(p.pubkey_hash, 0x30);
        assert_eq!(p.script_hash, 0x32);
        assert_eq!(p.wif, 0xb0);
        assert_eq!(p.coin_type, 2);
    }

    #[test]
    fn test_regtest_shares_testnet_bytes() {
        let t = LitecoinNetwork::Testnet.params();
        let r = LitecoinNetwork::Regtest.params();
        assert_eq!(t.bip32_private, r.bip32_private);
        assert_eq!(t.pubkey_hash, r.pubkey_hash);
        assert_eq!(r.bech32_hrp, "rltc");
        assert_eq!(r.mweb_hrp, "rmweb");
    }

    #[test]
    fn test_parse_network() {
        assert_eq!("MAINNET".parse::<LitecoinNetwork>(), Ok(LitecoinNetwork::Mainnet));
        assert_eq!("regtest".parse::<LitecoinNetwork>(), Ok(LitecoinNetwork::Regtest));
        assert!("signet".parse::<LitecoinNetwork>().is_err());
    }
}
