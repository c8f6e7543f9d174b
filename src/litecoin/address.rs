//! Litecoin address encoding and validation
//!
//! The `bitcoin` crate's `Address` type is hard-wired to Bitcoin's version
//! bytes and HRPs, so Litecoin addresses are encoded here from the raw
//! payment templates and the per-network constants in [`NetworkParams`].
//!
//! [`NetworkParams`]: super::network::NetworkParams

use bitcoin::bech32::primitives::decode::CheckedHrpstring;
use bitcoin::bech32::{self, Bech32, Hrp};
use bitcoin::hashes::Hash;
use bitcoin::key::CompressedPublicKey;
use bitcoin::{base58, PubkeyHash, PublicKey, Script, ScriptBuf, ScriptHash};
use bitcoin::{WitnessProgram, WitnessVersion};
use std::fmt;

use super::fee::OutputKind;
use super::network::LitecoinNetwork;
use crate::error::TxCoreError;

/// Serialized MWEB stealth address payload: scan pubkey + spend pubkey.
const MWEB_PAYLOAD_LEN: usize = 66;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    P2pkh,
    P2sh,
    P2wpkh,
    P2wsh,
    P2tr,
    Mweb,
}

/// A parsed or derived address bound to one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LitecoinAddress {
    encoded: String,
    kind: AddressKind,
    network: LitecoinNetwork,
    /// None for MWEB stealth addresses, which have no regular-ledger script
    script_pubkey: Option<ScriptBuf>,
}

impl LitecoinAddress {
    /// Legacy pay-to-pubkey-hash address. Works for compressed and
    /// uncompressed keys.
    pub fn p2pkh(pubkey: &PublicKey, network: LitecoinNetwork) -> Self {
        let hash = pubkey.pubkey_hash();
        let encoded = encode_base58(network.params().pubkey_hash, hash.as_byte_array());

        Self {
            encoded,
            kind: AddressKind::P2pkh,
            network,
            script_pubkey: Some(ScriptBuf::new_p2pkh(&hash)),
        }
    }

    /// P2WPKH nested in P2SH.
    pub fn p2sh_p2wpkh(pubkey: &CompressedPublicKey, network: LitecoinNetwork) -> Self {
        let redeem_script = ScriptBuf::new_p2wpkh(&pubkey.wpubkey_hash());
        let hash = ScriptHash::hash(redeem_script.as_bytes());
        let encoded = encode_base58(network.params().script_hash, hash.as_byte_array());

        Self {
            encoded,
            kind: AddressKind::P2sh,
            network,
            script_pubkey: Some(ScriptBuf::new_p2sh(&hash)),
        }
    }

    /// Native segwit v0 address.
    pub fn p2wpkh(
        pubkey: &CompressedPublicKey,
        network: LitecoinNetwork,
    ) -> Result<Self, TxCoreError> {
        let hash = pubkey.wpubkey_hash();
        let hrp = Hrp::parse(network.params().bech32_hrp)
            .map_err(|e| TxCoreError::AddressDerivationFailed(e.to_string()))?;
        let encoded = bech32::segwit::encode_v0(hrp, hash.as_byte_array())
            .map_err(|e| TxCoreError::AddressDerivationFailed(e.to_string()))?;

        Ok(Self {
            encoded,
            kind: AddressKind::P2wpkh,
            network,
            script_pubkey: Some(ScriptBuf::new_p2wpkh(&hash)),
        })
    }

    /// Parse and validate an address for `network`.
    ///
    /// Accepts base58 P2PKH/P2SH, bech32/bech32m segwit v0 and v1, and MWEB
    /// stealth addresses. Addresses for another network are rejected.
    pub fn parse(address: &str, network: LitecoinNetwork) -> Result<Self, TxCoreError> {
        let params = network.params();
        let trimmed = address.trim();
        let lower = trimmed.to_lowercase();

        if lower.starts_with(&format!("{}1", params.mweb_hrp)) {
            return Self::parse_mweb(trimmed, network);
        }
        if lower.starts_with(&format!("{}1", params.bech32_hrp)) {
            return Self::parse_segwit(trimmed, network);
        }

        Self::parse_base58(trimmed, network)
    }

    fn parse_base58(address: &str, network: LitecoinNetwork) -> Result<Self, TxCoreError> {
        let params = network.params();
        let data = base58::decode_check(address)
            .map_err(|e| TxCoreError::InvalidAddress(format!("{}: {}", address, e)))?;

        if data.len() != 21 {
            return Err(TxCoreError::InvalidAddress(format!(
                "{}: unexpected payload length {}",
                address,
                data.len()
            )));
        }

        let mut hash = [0u8; 20];
        hash.copy_from_slice(&data[1..]);
        let version = data[0];

        let (kind, script_pubkey) = if version == params.pubkey_hash {
            (
                AddressKind::P2pkh,
                ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array(hash)),
            )
        } else if version == params.script_hash || Some(version) == params.legacy_script_hash {
            (
                AddressKind::P2sh,
                ScriptBuf::new_p2sh(&ScriptHash::from_byte_array(hash)),
            )
        } else {
            return Err(TxCoreError::InvalidAddress(format!(
                "{}: version byte 0x{:02x} is not valid on {}",
                address, version, network
            )));
        };

        Ok(Self {
            encoded: address.to_string(),
            kind,
            network,
            script_pubkey: Some(script_pubkey),
        })
    }

    fn parse_segwit(address: &str, network: LitecoinNetwork) -> Result<Self, TxCoreError> {
        let (hrp, version, program) = bech32::segwit::decode(address)
            .map_err(|e| TxCoreError::InvalidAddress(format!("{}: {}", address, e)))?;

        if hrp.to_lowercase() != network.params().bech32_hrp {
            return Err(TxCoreError::InvalidAddress(format!(
                "{}: prefix is not valid on {}",
                address, network
            )));
        }

        let version = WitnessVersion::try_from(version.to_u8())
            .map_err(|e| TxCoreError::InvalidAddress(format!("{}: {}", address, e)))?;

        let kind = match (version, program.len()) {
            (WitnessVersion::V0, 20) => AddressKind::P2wpkh,
            (WitnessVersion::V0, 32) => AddressKind::P2wsh,
            (WitnessVersion::V1, 32) => AddressKind::P2tr,
            (v, len) => {
                return Err(TxCoreError::InvalidAddress(format!(
                    "{}: unsupported witness program (version {}, {} bytes)",
                    address,
                    v.to_num(),
                    len
                )))
            }
        };

        let witness_program = WitnessProgram::new(version, &program)
            .map_err(|e| TxCoreError::InvalidAddress(format!("{}: {}", address, e)))?;

        Ok(Self {
            encoded: address.to_lowercase(),
            kind,
            network,
            script_pubkey: Some(ScriptBuf::new_witness_program(&witness_program)),
        })
    }

    fn parse_mweb(address: &str, network: LitecoinNetwork) -> Result<Self, TxCoreError> {
        let mut checked = CheckedHrpstring::new::<Bech32>(address)
            .map_err(|e| TxCoreError::InvalidAddress(format!("{}: {}", address, e)))?;

        if checked.hrp().to_lowercase() != network.params().mweb_hrp {
            return Err(TxCoreError::InvalidAddress(format!(
                "{}: MWEB prefix is not valid on {}",
                address, network
            )));
        }

        checked.remove_witness_version();
        let payload: Vec<u8> = checked.byte_iter().collect();
        if payload.len() != MWEB_PAYLOAD_LEN {
            return Err(TxCoreError::InvalidAddress(format!(
                "{}: MWEB payload is {} bytes, expected {}",
                address,
                payload.len(),
                MWEB_PAYLOAD_LEN
            )));
        }

        Ok(Self {
            encoded: address.to_lowercase(),
            kind: AddressKind::Mweb,
            network,
            script_pubkey: None,
        })
    }

    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    pub fn network(&self) -> LitecoinNetwork {
        self.network
    }

    pub fn is_mweb(&self) -> bool {
        self.kind == AddressKind::Mweb
    }

    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// Locking script on the regular ledger. None for MWEB.
    pub fn script_pubkey(&self) -> Option<&Script> {
        self.script_pubkey.as_deref()
    }

    /// Output shape used for fee estimation when paying to this address on
    /// the regular ledger. None for MWEB addresses.
    pub fn regular_output_kind(&self) -> Option<OutputKind> {
        match self.kind {
            AddressKind::P2pkh => Some(OutputKind::P2pkh),
            AddressKind::P2sh => Some(OutputKind::P2sh),
            AddressKind::P2wpkh | AddressKind::P2wsh | AddressKind::P2tr => {
                Some(OutputKind::P2wpkh)
            }
            AddressKind::Mweb => None,
        }
    }
}

impl fmt::Display for LitecoinAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

fn encode_base58(version: u8, hash: &[u8; 20]) -> String {
    let mut payload = Vec::with_capacity(21);
    payload.push(version);
    payload.extend_from_slice(hash);
    base58::encode_check(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::secp256k1::{Secp256k1, SecretKey};

    fn test_pubkey() -> PublicKey {
        let secp = Secp256k1::new();
        let sk = SecretKey::from_slice(&[0x11; 32]).unwrap();
        PublicKey::new(sk.public_key(&secp))
    }

    #[test]
    fn test_derived_addresses_have_network_prefixes() {
        let pk = test_pubkey();
        let compressed = CompressedPublicKey::try_from(pk).unwrap();

        let legacy = LitecoinAddress::p2pkh(&pk, LitecoinNetwork::Mainnet);
        assert!(legacy.as_str().starts_with('L'));

        let nested = LitecoinAddress::p2sh_p2wpkh(&compressed, LitecoinNetwork::Mainnet);
        assert!(nested.as_str().starts_with('M'));

        let native = LitecoinAddress::p2wpkh(&compressed, LitecoinNetwork::Mainnet).unwrap();
        assert!(native.as_str().starts_with("ltc1q"));

        let test_legacy = LitecoinAddress::p2pkh(&pk, LitecoinNetwork::Testnet);
        assert!(test_legacy.as_str().starts_with('m') || test_legacy.as_str().starts_with('n'));

        let regtest_native = LitecoinAddress::p2wpkh(&compressed, LitecoinNetwork::Regtest).unwrap();
        assert!(regtest_native.as_str().starts_with("rltc1q"));
    }

    #[test]
    fn test_derived_addresses_parse_back() {
        let pk = test_pubkey();
        let compressed = CompressedPublicKey::try_from(pk).unwrap();

        for derived in [
            LitecoinAddress::p2pkh(&pk, LitecoinNetwork::Mainnet),
            LitecoinAddress::p2sh_p2wpkh(&compressed, LitecoinNetwork::Mainnet),
            LitecoinAddress::p2wpkh(&compressed, LitecoinNetwork::Mainnet).unwrap(),
        ] {
            let parsed = LitecoinAddress::parse(derived.as_str(), LitecoinNetwork::Mainnet).unwrap();
            assert_eq!(parsed, derived);
        }
    }

    #[test]
    fn test_parse_known_mainnet_addresses() {
        let legacy = LitecoinAddress::parse("LP3SFCDkcA6nE8RJhug29XZnyTcRqHUKxf", LitecoinNetwork::Mainnet).unwrap();
        assert_eq!(legacy.kind(), AddressKind::P2pkh);
        assert_eq!(legacy.regular_output_kind(), Some(OutputKind::P2pkh));

        let nested = LitecoinAddress::parse("MQd1fJwqBJvwLuyhr17PhEFx1swiqDbPQS", LitecoinNetwork::Mainnet).unwrap();
        assert_eq!(nested.kind(), AddressKind::P2sh);

        let native = LitecoinAddress::parse(
            "ltc1qdze7y7chruzccmegt6tu0ewrltjm7k7xtux6us",
            LitecoinNetwork::Mainnet,
        )
        .unwrap();
        assert_eq!(native.kind(), AddressKind::P2wpkh);
        assert_eq!(native.script_pubkey().unwrap().len(), 22);
    }

    #[test]
    fn test_parse_mweb_address() {
        let mweb = LitecoinAddress::parse(
            "ltcmweb1qq0l2z6ka7nk8yv2wflmvf62jpg2ud9mywcmhr0vvkanwhg9pptes7qmxm0ujztp4sm4zw99x2e7c0ga3l3496qhejj9e7djlj9ymedc00yjlvhrh",
            LitecoinNetwork::Mainnet,
        )
        .unwrap();
        assert!(mweb.is_mweb());
        assert!(mweb.script_pubkey().is_none());
        assert_eq!(mweb.regular_output_kind(), None);
    }

    #[test]
    fn test_rejects_wrong_network_and_garbage() {
        assert!(LitecoinAddress::parse(
            "ltc1qdze7y7chruzccmegt6tu0ewrltjm7k7xtux6us",
            LitecoinNetwork::Testnet
        )
        .is_err());
        assert!(LitecoinAddress::parse("LP3SFCDkcA6nE8RJhug29XZnyTcRqHUKxf", LitecoinNetwork::Regtest).is_err());
        // Bitcoin mainnet P2PKH
        assert!(LitecoinAddress::parse("1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2", LitecoinNetwork::Mainnet).is_err());
        assert!(LitecoinAddress::parse("not an address", LitecoinNetwork::Mainnet).is_err());
    }
}
