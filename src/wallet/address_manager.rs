use bitcoin::bip32::DerivationPath;

use super::keys::{ExtendedKey, KeyManager, SigningKey};
use crate::error::TxCoreError;
use crate::litecoin::address::LitecoinAddress;
use crate::litecoin::fee::InputKind;

pub struct AddressManager;

impl AddressManager {
    /// Legacy P2PKH address of an HD node
    pub fn address_from_key(
        keys: &KeyManager,
        key: &ExtendedKey,
    ) -> Result<LitecoinAddress, TxCoreError> {
        let pubkey = key.public_key(keys.secp());
        if !pubkey.compressed {
            log::error!("HD node produced an uncompressed public key");
            return Err(TxCoreError::AddressDerivationFailed(
                "HD public keys must be compressed".into(),
            ));
        }
        Ok(LitecoinAddress::p2pkh(&pubkey, key.network()))
    }

    /// Derive `count` P2PKH addresses starting at `start`, returning (index, address) pairs
    pub fn derive_addresses(
        keys: &KeyManager,
        root: &ExtendedKey,
        path_prefix: &DerivationPath,
        start: u32,
        count: u32,
        hardened: bool,
    ) -> Result<Vec<(u32, LitecoinAddress)>, TxCoreError> {
        let mut addresses = Vec::with_capacity(count as usize);

        for i in 0..count {
            let index = start.checked_add(i).ok_or_else(|| {
                TxCoreError::AddressDerivationFailed(format!(
                    "index range {}+{} exceeds child index space",
                    start, count
                ))
            })?;
            let child = keys.derive_child(root, path_prefix, index, hardened)?;
            addresses.push((index, Self::address_from_key(keys, &child)?));
        }

        Ok(addresses)
    }

    /// Every address template a single key can receive on, paired with the
    /// input kind that spends it.
    ///
    /// P2PKH always; P2SH-P2WPKH and P2WPKH only for compressed keys.
    pub fn templates_for_key(
        keys: &KeyManager,
        key: &SigningKey,
    ) -> Result<Vec<(InputKind, LitecoinAddress)>, TxCoreError> {
        let network = key.network();
        let pubkey = key.public_key(keys.secp());

        let mut templates = vec![(InputKind::P2pkh, LitecoinAddress::p2pkh(&pubkey, network))];

        if key.is_compressed() {
            let compressed = key.compressed_public_key(keys.secp())?;
            templates.push((
                InputKind::P2shP2wpkh,
                LitecoinAddress::p2sh_p2wpkh(&compressed, network),
            ));
            templates.push((
                InputKind::P2wpkh,
                LitecoinAddress::p2wpkh(&compressed, network)?,
            ));
        }

        Ok(templates)
    }
}
