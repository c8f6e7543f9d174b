//! Deterministic key derivation
//!
//! BIP32 roots from a BIP39 mnemonic or a serialized extended private key,
//! children along a path prefix, and single keys imported from WIF. Extended
//! keys are (de)serialized under Litecoin version bytes ("Ltpv"/"Ltub" on
//! mainnet). Secret scalars are erased when their owner drops.

use bip39::Mnemonic;
use bitcoin::bip32::{ChainCode, ChildNumber, DerivationPath, Xpriv, Xpub};
use bitcoin::key::CompressedPublicKey;
use bitcoin::secp256k1::{All, Secp256k1, SecretKey};
use bitcoin::{base58, NetworkKind, PublicKey};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

use crate::error::TxCoreError;
use crate::litecoin::network::LitecoinNetwork;

/// Version bytes the `bitcoin` crate expects for xprv/tprv.
const BITCOIN_XPRV: [u8; 4] = [0x04, 0x88, 0xad, 0xe4];
const BITCOIN_TPRV: [u8; 4] = [0x04, 0x35, 0x83, 0x94];

const EXTENDED_KEY_LEN: usize = 78;

/// A private node in the HD tree.
///
/// Not `Clone`: every derived key has exactly one owner and is scrubbed on
/// drop.
pub struct ExtendedKey {
    xpriv: Xpriv,
    network: LitecoinNetwork,
}

impl ExtendedKey {
    pub fn network(&self) -> LitecoinNetwork {
        self.network
    }

    pub fn depth(&self) -> u8 {
        self.xpriv.depth
    }

    /// Compressed public key of this node.
    pub fn public_key(&self, secp: &Secp256k1<All>) -> PublicKey {
        PublicKey::new(self.xpriv.private_key.public_key(secp))
    }

    /// Standalone signing key for this node (always compressed).
    pub fn signing_key(&self) -> SigningKey {
        SigningKey {
            secret: self.xpriv.private_key,
            compressed: true,
            network: self.network,
        }
    }

    /// Serialize as an extended private key ("Ltpv..." on mainnet).
    pub fn to_base58(&self) -> String {
        let mut bytes = Zeroizing::new(self.xpriv.encode());
        bytes[..4].copy_from_slice(&self.network.params().bip32_private);
        base58::encode_check(&bytes[..])
    }

    /// Serialize the neutered key ("Ltub..." on mainnet).
    pub fn to_base58_public(&self, secp: &Secp256k1<All>) -> String {
        let mut bytes = Xpub::from_priv(secp, &self.xpriv).encode();
        bytes[..4].copy_from_slice(&self.network.params().bip32_public);
        base58::encode_check(&bytes)
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("network", &self.network)
            .field("depth", &self.xpriv.depth)
            .field("child_number", &self.xpriv.child_number)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

impl Drop for ExtendedKey {
    fn drop(&mut self) {
        self.xpriv.private_key.non_secure_erase();
        self.xpriv.chain_code = ChainCode::from([0u8; 32]);
    }
}

/// A single secp256k1 private key with its WIF compression flag.
pub struct SigningKey {
    secret: SecretKey,
    compressed: bool,
    network: LitecoinNetwork,
}

impl SigningKey {
    /// Decode a WIF string for `network`.
    pub fn from_wif(wif: &str, network: LitecoinNetwork) -> Result<Self, TxCoreError> {
        let data = Zeroizing::new(
            base58::decode_check(wif.trim())
                .map_err(|e| TxCoreError::InvalidKey(format!("not a WIF string: {}", e)))?,
        );

        let compressed = match data.len() {
            33 => false,
            34 if data[33] == 0x01 => true,
            len => {
                return Err(TxCoreError::InvalidKey(format!(
                    "unexpected WIF payload length {}",
                    len
                )))
            }
        };

        if data[0] != network.params().wif {
            return Err(TxCoreError::InvalidKey(format!(
                "WIF version 0x{:02x} is not valid on {}",
                data[0], network
            )));
        }

        let secret = SecretKey::from_slice(&data[1..33])
            .map_err(|e| TxCoreError::InvalidKey(e.to_string()))?;

        Ok(Self {
            secret,
            compressed,
            network,
        })
    }

    /// Encode as WIF under this key's network.
    pub fn to_wif(&self) -> String {
        let mut data = Zeroizing::new(Vec::with_capacity(34));
        data.push(self.network.params().wif);
        data.extend_from_slice(&self.secret.secret_bytes());
        if self.compressed {
            data.push(0x01);
        }
        base58::encode_check(&data)
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    pub fn network(&self) -> LitecoinNetwork {
        self.network
    }

    pub fn public_key(&self, secp: &Secp256k1<All>) -> PublicKey {
        PublicKey {
            compressed: self.compressed,
            inner: self.secret.public_key(secp),
        }
    }

    /// Compressed form of the public key, required for segwit templates.
    pub fn compressed_public_key(
        &self,
        secp: &Secp256k1<All>,
    ) -> Result<CompressedPublicKey, TxCoreError> {
        if !self.compressed {
            return Err(TxCoreError::InvalidKey(
                "uncompressed keys cannot spend segwit outputs".into(),
            ));
        }
        Ok(CompressedPublicKey(self.secret.public_key(secp)))
    }

    pub(crate) fn secret(&self) -> &SecretKey {
        &self.secret
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("network", &self.network)
            .field("compressed", &self.compressed)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl Drop for SigningKey {
    fn drop(&mut self) {
        self.secret.non_secure_erase();
    }
}

/// BIP84 account node.
pub struct AccountKeys {
    pub account_key: ExtendedKey,
    /// Neutered account key under network version bytes
    pub account_xpub: String,
    pub derivation_path: DerivationPath,
}

pub struct KeyManager {
    network: LitecoinNetwork,
    secp: Secp256k1<All>,
}

impl KeyManager {
    pub fn new(network: LitecoinNetwork) -> Self {
        Self {
            network,
            secp: Secp256k1::new(),
        }
    }

    pub fn network(&self) -> LitecoinNetwork {
        self.network
    }

    pub fn secp(&self) -> &Secp256k1<All> {
        &self.secp
    }

    /// Root key from a BIP39 mnemonic (empty passphrase).
    pub fn root_from_mnemonic(&self, words: &str) -> Result<ExtendedKey, TxCoreError> {
        let mnemonic =
            Mnemonic::parse(words).map_err(|e| TxCoreError::InvalidSeed(e.to_string()))?;
        let seed = Zeroizing::new(mnemonic.to_seed(""));

        let xpriv = Xpriv::new_master(self.network.network_kind(), &seed[..])
            .map_err(|e| TxCoreError::InvalidSeed(e.to_string()))?;

        Ok(ExtendedKey {
            xpriv,
            network: self.network,
        })
    }

    /// Root key from a mnemonic given as separate words.
    pub fn root_from_words(&self, words: &[&str]) -> Result<ExtendedKey, TxCoreError> {
        let phrase = Zeroizing::new(words.join(" "));
        self.root_from_mnemonic(&phrase)
    }

    /// Parse a serialized extended private key.
    ///
    /// Only the network's private version bytes are accepted; extended public
    /// keys and other networks' keys are rejected.
    pub fn root_from_extended_key(&self, encoded: &str) -> Result<ExtendedKey, TxCoreError> {
        let params = self.network.params();
        let mut data = Zeroizing::new(
            base58::decode_check(encoded.trim())
                .map_err(|e| TxCoreError::InvalidExtendedKey(e.to_string()))?,
        );

        if data.len() != EXTENDED_KEY_LEN {
            return Err(TxCoreError::InvalidExtendedKey(format!(
                "expected {} bytes, got {}",
                EXTENDED_KEY_LEN,
                data.len()
            )));
        }
        if data[..4] == params.bip32_public {
            return Err(TxCoreError::InvalidExtendedKey(
                "extended public key cannot sign".into(),
            ));
        }
        if data[..4] != params.bip32_private {
            return Err(TxCoreError::InvalidExtendedKey(format!(
                "version bytes {} do not match {}",
                hex::encode(&data[..4]),
                self.network
            )));
        }

        let bitcoin_version = match self.network.network_kind() {
            NetworkKind::Main => BITCOIN_XPRV,
            NetworkKind::Test => BITCOIN_TPRV,
        };
        data[..4].copy_from_slice(&bitcoin_version);

        let xpriv =
            Xpriv::decode(&data).map_err(|e| TxCoreError::InvalidExtendedKey(e.to_string()))?;

        Ok(ExtendedKey {
            xpriv,
            network: self.network,
        })
    }

    /// Derive a child of `root`.
    ///
    /// Hardened: one hardened step `index'` directly below `root`.
    /// Otherwise: the full path `path_prefix/index`.
    pub fn derive_child(
        &self,
        root: &ExtendedKey,
        path_prefix: &DerivationPath,
        index: u32,
        hardened: bool,
    ) -> Result<ExtendedKey, TxCoreError> {
        let path = if hardened {
            let child = ChildNumber::from_hardened_idx(index)
                .map_err(|e| TxCoreError::AddressDerivationFailed(e.to_string()))?;
            DerivationPath::from(vec![child])
        } else {
            let child = ChildNumber::from_normal_idx(index)
                .map_err(|e| TxCoreError::AddressDerivationFailed(e.to_string()))?;
            path_prefix.child(child)
        };

        let xpriv = root.xpriv.derive_priv(&self.secp, &path).map_err(|e| {
            log::error!("Derivation failed at {}: {}", path, e);
            TxCoreError::AddressDerivationFailed(format!("{}: {}", path, e))
        })?;

        Ok(ExtendedKey {
            xpriv,
            network: self.network,
        })
    }

    /// BIP84 account node `m/84'/coin'/account'`.
    pub fn account_keys(
        &self,
        root: &ExtendedKey,
        account: u32,
    ) -> Result<AccountKeys, TxCoreError> {
        let derivation_path = parse_path(&format!(
            "m/84'/{}'/{}'",
            self.network.params().coin_type,
            account
        ))?;

        let xpriv = root
            .xpriv
            .derive_priv(&self.secp, &derivation_path)
            .map_err(|e| TxCoreError::AddressDerivationFailed(e.to_string()))?;
        let account_key = ExtendedKey {
            xpriv,
            network: self.network,
        };
        let account_xpub = account_key.to_base58_public(&self.secp);

        Ok(AccountKeys {
            account_key,
            account_xpub,
            derivation_path,
        })
    }
}

/// Parse a path prefix such as `m/0'/0/` (trailing slash allowed).
pub fn parse_path(path: &str) -> Result<DerivationPath, TxCoreError> {
    let trimmed = path.trim().trim_end_matches('/');
    DerivationPath::from_str(trimmed)
        .map_err(|e| TxCoreError::AddressDerivationFailed(format!("{}: {}", path, e)))
}
