use bitcoin::blockdata::script::{Builder, PushBytesBuf, ScriptBuf};
use bitcoin::blockdata::transaction::{Transaction, TxIn, TxOut};
use bitcoin::blockdata::witness::Witness;
use bitcoin::consensus::encode::{deserialize, serialize_hex};
use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{All, Message, Secp256k1};
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::transaction::{OutPoint, Sequence, Version};
use bitcoin::{absolute, ecdsa, Amount, Txid};
use serde::Serialize;

use super::address::LitecoinAddress;
use super::fee::{self, InputKind, InputSpec, OutputSpec, TransactionSpec};
use super::network::LitecoinNetwork;
use super::size;
use super::utxo::Utxo;
use crate::error::TxCoreError;
use crate::wallet::keys::SigningKey;

pub const DUST_THRESHOLD: u64 = 546;
/// 18.8 sat/vbyte
pub const LEGACY_SWEEP_RATE_MSAT: u64 = 18_800;

/// Fee policy for single-output sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepFee {
    /// Flat rate over the legacy size estimate, every input sized as P2PKH
    Legacy { millisat_per_vbyte: u64 },
    /// Weight engine over the actual input kinds
    Estimated { sat_per_vbyte: u64 },
}

impl Default for SweepFee {
    fn default() -> Self {
        SweepFee::Legacy {
            millisat_per_vbyte: LEGACY_SWEEP_RATE_MSAT,
        }
    }
}

/// One UTXO to spend, the template it was paid to, and the key that
/// controls it (an index into [`SweepBatch::keys`]).
#[derive(Debug, Clone)]
pub struct SweepInput {
    pub utxo: Utxo,
    pub kind: InputKind,
    pub key_index: usize,
}

/// Keys and inputs collected for one sweep.
#[derive(Debug, Default)]
pub struct SweepBatch {
    keys: Vec<SigningKey>,
    inputs: Vec<SweepInput>,
}

impl SweepBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a key, returning its index for [`add_input`](Self::add_input).
    pub fn add_key(&mut self, key: SigningKey) -> usize {
        self.keys.push(key);
        self.keys.len() - 1
    }

    pub fn add_input(&mut self, utxo: Utxo, kind: InputKind, key_index: usize) {
        self.inputs.push(SweepInput {
            utxo,
            kind,
            key_index,
        });
    }

    pub fn inputs(&self) -> &[SweepInput] {
        &self.inputs
    }

    /// Sum of input values; inputs from different addresses can overflow.
    pub fn total_value(&self) -> Result<u64, TxCoreError> {
        self.inputs
            .iter()
            .try_fold(0u64, |acc, i| acc.checked_add(i.utxo.value))
            .ok_or_else(|| TxCoreError::InsufficientFunds("input sum overflows".into()))
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// A fully signed sweep, ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweptTransaction {
    pub txid: String,
    pub tx_hex: String,
    pub input_count: usize,
    pub total_input: u64,
    pub fee: u64,
    pub output_value: u64,
}

pub struct TransactionBuilder {
    network: LitecoinNetwork,
    secp: Secp256k1<All>,
}

impl TransactionBuilder {
    pub fn new(network: LitecoinNetwork) -> Self {
        Self {
            network,
            secp: Secp256k1::new(),
        }
    }

    /// Fee for sweeping inputs of `kinds` into one output to `destination`.
    pub fn sweep_fee(
        &self,
        kinds: &[InputKind],
        destination: &LitecoinAddress,
        policy: SweepFee,
    ) -> Result<u64, TxCoreError> {
        match policy {
            SweepFee::Legacy { millisat_per_vbyte } => {
                let weight = size::estimate_sweep_weight(InputKind::P2pkh, kinds.len() as u64);
                Ok(size::flat_rate_fee(weight, millisat_per_vbyte))
            }
            SweepFee::Estimated { sat_per_vbyte } => {
                let output = destination.regular_output_kind().ok_or_else(|| {
                    TxCoreError::InvalidAddress(format!(
                        "{} has no regular-ledger output",
                        destination
                    ))
                })?;
                let spec = TransactionSpec {
                    inputs: kinds.iter().copied().map(InputSpec::new).collect(),
                    outputs: vec![OutputSpec::new(output)],
                    ..Default::default()
                };
                Ok(fee::estimate(&spec, sat_per_vbyte, 0).fees.regular)
            }
        }
    }

    /// Spend every input of `batch` into a single output to `destination`,
    /// minus the fee.
    ///
    /// Each previous transaction is decoded and checked against the UTXO it
    /// claims to fund before anything is signed.
    pub fn build_sweep(
        &self,
        batch: &SweepBatch,
        destination: &LitecoinAddress,
        policy: SweepFee,
    ) -> Result<SweptTransaction, TxCoreError> {
        if destination.network() != self.network {
            return Err(TxCoreError::InvalidAddress(format!(
                "{} is not a {} address",
                destination, self.network
            )));
        }
        let destination_script = destination
            .script_pubkey()
            .ok_or_else(|| {
                TxCoreError::InvalidAddress(format!(
                    "{} is an MWEB address; sweeps pay a regular-ledger output",
                    destination
                ))
            })?
            .to_owned();

        if batch.is_empty() {
            return Err(TxCoreError::NoFundsFound);
        }

        let mut prevouts = Vec::with_capacity(batch.len());
        for (index, input) in batch.inputs.iter().enumerate() {
            let key = batch.keys.get(input.key_index).ok_or_else(|| {
                TxCoreError::SigningFailed {
                    input: index,
                    reason: format!("no key at index {}", input.key_index),
                }
            })?;
            prevouts.push(self.verify_prev_output(input, key)?);
        }

        let total_input = batch.total_value()?;

        let kinds: Vec<InputKind> = batch.inputs.iter().map(|i| i.kind).collect();
        let fee = self.sweep_fee(&kinds, destination, policy)?;

        let output_value = total_input.saturating_sub(fee);
        if output_value <= DUST_THRESHOLD {
            return Err(TxCoreError::InsufficientFunds(format!(
                "{} in {} input(s) leaves {} after a {} fee, not above dust ({})",
                total_input,
                batch.len(),
                output_value,
                fee,
                DUST_THRESHOLD
            )));
        }

        let mut tx = Transaction {
            version: Version::TWO,
            lock_time: absolute::LockTime::ZERO,
            input: Vec::with_capacity(batch.len()),
            output: vec![TxOut {
                value: Amount::from_sat(output_value),
                script_pubkey: destination_script,
            }],
        };

        for prevout in &prevouts {
            tx.input.push(TxIn {
                previous_output: prevout.outpoint,
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::new(),
            });
        }

        let mut signed = Vec::with_capacity(batch.len());
        {
            let mut sighash_cache = SighashCache::new(&tx);
            for (index, (input, prevout)) in batch.inputs.iter().zip(&prevouts).enumerate() {
                let key = &batch.keys[input.key_index];
                signed.push(self.sign_input(&mut sighash_cache, index, input, prevout, key)?);
            }
        }

        for (txin, (script_sig, witness)) in tx.input.iter_mut().zip(signed) {
            txin.script_sig = script_sig;
            txin.witness = witness;
        }

        let swept = SweptTransaction {
            txid: tx.compute_txid().to_string(),
            tx_hex: serialize_hex(&tx),
            input_count: tx.input.len(),
            total_input,
            fee,
            output_value,
        };

        log::info!(
            "✓ Signed sweep {}: {} input(s), {} in, {} fee, {} to {}",
            swept.txid,
            swept.input_count,
            total_input,
            fee,
            output_value,
            destination
        );

        Ok(swept)
    }

    /// Decode the funding transaction of `input` and check that it pays the
    /// claimed value to a script `key` controls.
    fn verify_prev_output(
        &self,
        input: &SweepInput,
        key: &SigningKey,
    ) -> Result<PrevOutput, TxCoreError> {
        let utxo = &input.utxo;
        let invalid = |reason: String| TxCoreError::InvalidPrevTx {
            txid: utxo.txid.clone(),
            reason,
        };

        let txid: Txid = utxo
            .txid
            .parse()
            .map_err(|e| invalid(format!("malformed txid: {}", e)))?;

        let raw = hex::decode(utxo.raw_prev_tx_hex.trim())
            .map_err(|e| invalid(format!("not hex: {}", e)))?;
        let prev_tx: Transaction =
            deserialize(&raw).map_err(|e| invalid(format!("undecodable: {}", e)))?;

        if prev_tx.compute_txid() != txid {
            return Err(invalid(format!(
                "hex hashes to {}",
                prev_tx.compute_txid()
            )));
        }

        let output = prev_tx
            .output
            .get(utxo.vout as usize)
            .ok_or_else(|| invalid(format!("vout {} out of range", utxo.vout)))?;

        if output.value.to_sat() != utxo.value {
            return Err(invalid(format!(
                "vout {} carries {}, indexer reported {}",
                utxo.vout,
                output.value.to_sat(),
                utxo.value
            )));
        }

        let expected = self.spending_script(input.kind, key)?;
        if output.script_pubkey != expected.script_pubkey {
            return Err(invalid(format!(
                "vout {} is not a {} output of this key",
                utxo.vout,
                input.kind.as_str()
            )));
        }

        Ok(PrevOutput {
            outpoint: OutPoint {
                txid,
                vout: utxo.vout,
            },
            value: output.value,
            script: expected,
        })
    }

    fn spending_script(&self, kind: InputKind, key: &SigningKey) -> Result<SpendScript, TxCoreError> {
        let script = match kind {
            InputKind::P2pkh => SpendScript {
                script_pubkey: ScriptBuf::new_p2pkh(&key.public_key(&self.secp).pubkey_hash()),
                redeem_script: None,
            },
            InputKind::P2wpkh => {
                let pubkey = key.compressed_public_key(&self.secp)?;
                SpendScript {
                    script_pubkey: ScriptBuf::new_p2wpkh(&pubkey.wpubkey_hash()),
                    redeem_script: None,
                }
            }
            InputKind::P2shP2wpkh => {
                let pubkey = key.compressed_public_key(&self.secp)?;
                let redeem = ScriptBuf::new_p2wpkh(&pubkey.wpubkey_hash());
                SpendScript {
                    script_pubkey: ScriptBuf::new_p2sh(&redeem.script_hash()),
                    redeem_script: Some(redeem),
                }
            }
        };
        Ok(script)
    }

    /// Produce the script_sig and witness for one input.
    fn sign_input(
        &self,
        sighash_cache: &mut SighashCache<&Transaction>,
        index: usize,
        input: &SweepInput,
        prevout: &PrevOutput,
        key: &SigningKey,
    ) -> Result<(ScriptBuf, Witness), TxCoreError> {
        let failed = |reason: String| TxCoreError::SigningFailed {
            input: index,
            reason,
        };

        let digest = match input.kind {
            InputKind::P2pkh => sighash_cache
                .legacy_signature_hash(
                    index,
                    &prevout.script.script_pubkey,
                    EcdsaSighashType::All.to_u32(),
                )
                .map_err(|e| failed(e.to_string()))?
                .to_byte_array(),
            InputKind::P2wpkh | InputKind::P2shP2wpkh => {
                let program = prevout
                    .script
                    .redeem_script
                    .as_ref()
                    .unwrap_or(&prevout.script.script_pubkey);
                sighash_cache
                    .p2wpkh_signature_hash(index, program, prevout.value, EcdsaSighashType::All)
                    .map_err(|e| failed(e.to_string()))?
                    .to_byte_array()
            }
        };

        let message = Message::from_digest(digest);
        let signature = ecdsa::Signature {
            signature: self.secp.sign_ecdsa(&message, key.secret()),
            sighash_type: EcdsaSighashType::All,
        };

        match input.kind {
            InputKind::P2pkh => {
                let sig_push = PushBytesBuf::try_from(signature.to_vec())
                    .map_err(|e| failed(e.to_string()))?;
                let script_sig = Builder::new()
                    .push_slice(sig_push)
                    .push_key(&key.public_key(&self.secp))
                    .into_script();
                Ok((script_sig, Witness::new()))
            }
            InputKind::P2wpkh => {
                let pubkey = key.compressed_public_key(&self.secp)?;
                Ok((ScriptBuf::new(), Witness::p2wpkh(&signature, &pubkey.0)))
            }
            InputKind::P2shP2wpkh => {
                let pubkey = key.compressed_public_key(&self.secp)?;
                let redeem = prevout
                    .script
                    .redeem_script
                    .as_ref()
                    .ok_or_else(|| failed("missing redeem script".into()))?;
                let redeem_push = PushBytesBuf::try_from(redeem.to_bytes())
                    .map_err(|e| failed(e.to_string()))?;
                let script_sig = Builder::new().push_slice(redeem_push).into_script();
                Ok((script_sig, Witness::p2wpkh(&signature, &pubkey.0)))
            }
        }
    }
}

struct SpendScript {
    script_pubkey: ScriptBuf,
    /// P2SH-wrapped witness program
    redeem_script: Option<ScriptBuf>,
}

struct PrevOutput {
    outpoint: OutPoint,
    value: Amount,
    script: SpendScript,
}
