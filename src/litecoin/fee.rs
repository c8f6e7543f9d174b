//! Weight and fee estimation for hybrid regular/MWEB transactions
//!
//! Pure integer arithmetic over an abstract [`TransactionSpec`]. The regular
//! ledger pays `vsize * fee_rate` (sat/vB); MWEB pays
//! `mweb_weight * mweb_fee_rate` (sat/weight unit). The two components are
//! always additive.
//!
//! Fee-estimation specs arrive as JSON from UI code, so the serde shapes here
//! follow that wire format (camelCase fields, `type` tags, MWEB inputs and
//! outputs as lists of opaque objects).

use serde::{Deserialize, Serialize};

/// MWEB weight per output
pub const MWEB_OUTPUT_WEIGHT: u64 = 18;
/// MWEB kernel without stealth excess
pub const KERNEL_WEIGHT: u64 = 2;
pub const KERNEL_WITH_STEALTH_WEIGHT: u64 = 3;
pub const KERNEL_PEGOUT_WEIGHT: u64 = 4;

pub const WITNESS_SCALE_FACTOR: u64 = 4;
/// Added per peg-in output on top of the generic weight
pub const PEGIN_WEIGHT: u64 = 164;
/// Added per peg-out output on top of the generic weight
pub const PEGOUT_WEIGHT: u64 = 128;
/// Regular weight of an MWEB-funded peg-out with no regular inputs
pub const MWEB_ONLY_PEGOUT_WEIGHT: u64 = 124;

pub const P2WPKH_INPUT_BASE: u64 = 41;
pub const P2WPKH_INPUT_WITNESS: u64 = 107;
pub const P2PKH_INPUT: u64 = 148;
pub const P2SH_P2WPKH_INPUT_BASE: u64 = 64;
pub const P2SH_P2WPKH_INPUT_WITNESS: u64 = 107;

pub const P2WPKH_OUTPUT: u64 = 31;
pub const P2PKH_OUTPUT: u64 = 34;
pub const P2SH_OUTPUT: u64 = 32;
pub const MWEB_PEGIN_OUTPUT: u64 = 43;

/// Version, locktime and the input/output count varints
pub const TX_OVERHEAD: u64 = 10;
/// Segwit marker and flag bytes, present once any input carries a witness
pub const SEGWIT_MARKER_FLAG: u64 = 2;

pub const MAX_BLOCK_WEIGHT: u64 = 4_000_000;
pub const MAX_MWEB_WEIGHT: u64 = 21_000;

pub const DEFAULT_FEE_RATE: u64 = 10;
pub const DEFAULT_MWEB_FEE_RATE: u64 = 100;

/// Spending template of a regular input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InputKind {
    P2wpkh,
    P2pkh,
    P2shP2wpkh,
}

impl InputKind {
    /// (base bytes, witness bytes)
    pub fn sizes(self) -> (u64, u64) {
        match self {
            InputKind::P2wpkh => (P2WPKH_INPUT_BASE, P2WPKH_INPUT_WITNESS),
            InputKind::P2pkh => (P2PKH_INPUT, 0),
            InputKind::P2shP2wpkh => (P2SH_P2WPKH_INPUT_BASE, P2SH_P2WPKH_INPUT_WITNESS),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InputKind::P2wpkh => "P2WPKH",
            InputKind::P2pkh => "P2PKH",
            InputKind::P2shP2wpkh => "P2SH-P2WPKH",
        }
    }
}

impl InputKind {
    /// Parse a type tag, `None` for anything unrecognised.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "P2WPKH" => Some(InputKind::P2wpkh),
            "P2PKH" => Some(InputKind::P2pkh),
            "P2SH-P2WPKH" => Some(InputKind::P2shP2wpkh),
            _ => None,
        }
    }
}

impl From<String> for InputKind {
    fn from(tag: String) -> Self {
        InputKind::from_tag(&tag).unwrap_or_else(|| {
            log::warn!("Unknown input type '{}', sizing as P2WPKH", tag);
            InputKind::P2wpkh
        })
    }
}

impl From<InputKind> for String {
    fn from(kind: InputKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Shape of a regular output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OutputKind {
    P2wpkh,
    P2pkh,
    P2sh,
    /// Peg-in output moving value into MWEB
    MwebPegin,
}

impl OutputKind {
    pub fn size(self) -> u64 {
        match self {
            OutputKind::P2wpkh => P2WPKH_OUTPUT,
            OutputKind::P2pkh => P2PKH_OUTPUT,
            OutputKind::P2sh => P2SH_OUTPUT,
            OutputKind::MwebPegin => MWEB_PEGIN_OUTPUT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputKind::P2wpkh => "P2WPKH",
            OutputKind::P2pkh => "P2PKH",
            OutputKind::P2sh => "P2SH",
            OutputKind::MwebPegin => "witness_mweb_pegin",
        }
    }
}

impl From<String> for OutputKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "P2WPKH" => OutputKind::P2wpkh,
            "P2PKH" => OutputKind::P2pkh,
            "P2SH" => OutputKind::P2sh,
            "witness_mweb_pegin" => OutputKind::MwebPegin,
            other => {
                log::warn!("Unknown output type '{}', sizing as P2WPKH", other);
                OutputKind::P2wpkh
            }
        }
    }
}

impl From<OutputKind> for String {
    fn from(kind: OutputKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Ledger that funds a regular output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Funding {
    L1,
    #[serde(rename = "MWEB")]
    Mweb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSpec {
    #[serde(rename = "type")]
    pub kind: InputKind,
}

impl InputSpec {
    pub fn new(kind: InputKind) -> Self {
        Self { kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSpec {
    #[serde(rename = "type")]
    pub kind: OutputKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funded_by: Option<Funding>,
}

impl OutputSpec {
    pub fn new(kind: OutputKind) -> Self {
        Self { kind, funded_by: None }
    }

    pub fn funded_by(kind: OutputKind, funding: Funding) -> Self {
        Self {
            kind,
            funded_by: Some(funding),
        }
    }

    pub fn pegin() -> Self {
        Self::new(OutputKind::MwebPegin)
    }
}

/// Weight class of an MWEB kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelKind {
    PegOut,
    StealthExcess,
    Plain,
}

impl KernelKind {
    pub fn weight(self) -> u64 {
        match self {
            KernelKind::PegOut => KERNEL_PEGOUT_WEIGHT,
            KernelKind::StealthExcess => KERNEL_WITH_STEALTH_WEIGHT,
            KernelKind::Plain => KERNEL_WEIGHT,
        }
    }
}

/// MWEB kernel as described by callers.
///
/// `pegin` is informational and never affects weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MwebKernel {
    #[serde(default)]
    pub pegout: bool,
    #[serde(default = "default_true")]
    pub has_stealth_excess: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pegin: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MwebKernel {
    fn default() -> Self {
        Self {
            pegout: false,
            has_stealth_excess: true,
            pegin: false,
        }
    }
}

impl MwebKernel {
    pub fn stealth() -> Self {
        Self::default()
    }

    pub fn pegin() -> Self {
        Self {
            pegin: true,
            ..Self::default()
        }
    }

    pub fn pegout() -> Self {
        Self {
            pegout: true,
            ..Self::default()
        }
    }

    pub fn kind(&self) -> KernelKind {
        if self.pegout {
            KernelKind::PegOut
        } else if self.has_stealth_excess {
            KernelKind::StealthExcess
        } else {
            KernelKind::Plain
        }
    }
}

/// Abstract transaction shape. Weight depends only on counts and kind tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionSpec {
    pub inputs: Vec<InputSpec>,
    pub outputs: Vec<OutputSpec>,
    #[serde(with = "opaque_count")]
    pub mweb_inputs: usize,
    #[serde(with = "opaque_count")]
    pub mweb_outputs: usize,
    pub mweb_kernels: Vec<MwebKernel>,
}

impl TransactionSpec {
    /// No regular inputs.
    pub fn is_mweb_only(&self) -> bool {
        self.inputs.is_empty()
    }

    /// MWEB inputs to MWEB outputs with nothing on the regular ledger.
    pub fn is_pure_mweb(&self) -> bool {
        self.is_mweb_only()
            && self.outputs.is_empty()
            && self.mweb_inputs > 0
            && self.mweb_outputs > 0
    }

    /// Regular outputs funded from MWEB.
    ///
    /// Explicit `fundedBy` tags win. Untagged specs with MWEB inputs treat
    /// every regular output as a peg-out.
    pub fn peg_out_count(&self) -> u64 {
        let regular = self
            .outputs
            .iter()
            .filter(|o| o.kind != OutputKind::MwebPegin);

        let tagged = regular.clone().any(|o| o.funded_by.is_some());
        if tagged {
            regular
                .filter(|o| o.funded_by == Some(Funding::Mweb))
                .count() as u64
        } else if self.mweb_inputs > 0 {
            regular.count() as u64
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fees {
    pub regular: u64,
    pub mweb: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub base_size: u64,
    pub witness_size: u64,
    pub total_size: u64,
    pub peg_in_count: u64,
    pub peg_out_count: u64,
    pub mweb_output_count: u64,
    pub mweb_kernel_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub is_within_block_limit: bool,
    #[serde(rename = "isWithinMWEBLimit")]
    pub is_within_mweb_limit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResult {
    pub virtual_size: u64,
    pub weight: u64,
    pub mweb_weight: u64,
    pub fees: Fees,
    pub breakdown: Breakdown,
    pub validation: Validation,
}

/// Regular-ledger byte counts before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegularSizes {
    pub base_size: u64,
    pub witness_size: u64,
    pub peg_in_count: u64,
}

impl RegularSizes {
    pub fn total_size(&self) -> u64 {
        self.base_size + self.witness_size
    }
}

/// MWEB weight: 18 per output plus the kernel weights.
pub fn calculate_mweb_weight(mweb_outputs: usize, kernels: &[MwebKernel]) -> u64 {
    let output_weight = mweb_outputs as u64 * MWEB_OUTPUT_WEIGHT;
    let kernel_weight: u64 = kernels.iter().map(|k| k.kind().weight()).sum();
    output_weight + kernel_weight
}

/// Base and witness byte counts of the regular part of `spec`.
pub fn calculate_regular_sizes(spec: &TransactionSpec) -> RegularSizes {
    let mut sizes = RegularSizes::default();

    for input in &spec.inputs {
        let (base, witness) = input.kind.sizes();
        sizes.base_size += base;
        sizes.witness_size += witness;
    }
    if sizes.witness_size > 0 {
        sizes.witness_size += SEGWIT_MARKER_FLAG;
    }

    for output in &spec.outputs {
        sizes.base_size += output.kind.size();
        if output.kind == OutputKind::MwebPegin {
            sizes.peg_in_count += 1;
        }
    }

    if !spec.inputs.is_empty() || !spec.outputs.is_empty() {
        sizes.base_size += TX_OVERHEAD;
    }

    sizes
}

/// Regular-ledger weight.
///
/// Pure MWEB transactions weigh nothing; MWEB-only peg-outs have a fixed
/// weight; everything else is `base*3 + total` plus the per-peg additions.
pub fn calculate_transaction_weight(
    sizes: &RegularSizes,
    peg_out_count: u64,
    mweb_only: bool,
    pure_mweb: bool,
) -> u64 {
    if pure_mweb {
        return 0;
    }
    if mweb_only && peg_out_count > 0 {
        return MWEB_ONLY_PEGOUT_WEIGHT;
    }

    sizes.base_size * (WITNESS_SCALE_FACTOR - 1)
        + sizes.total_size()
        + sizes.peg_in_count * PEGIN_WEIGHT
        + peg_out_count * PEGOUT_WEIGHT
}

/// `ceil(weight / 4)`, with zero weight mapping to zero.
pub fn calculate_virtual_size(weight: u64) -> u64 {
    weight.div_ceil(WITNESS_SCALE_FACTOR)
}

pub fn calculate_mweb_fee(mweb_weight: u64, mweb_fee_rate: u64) -> u64 {
    mweb_weight.saturating_mul(mweb_fee_rate)
}

/// Estimate size, weight and fees of `spec`.
///
/// `fee_rate` is sat/vbyte for the regular ledger, `mweb_fee_rate` is
/// sat/weight-unit for MWEB (see [`DEFAULT_FEE_RATE`] and
/// [`DEFAULT_MWEB_FEE_RATE`]).
pub fn estimate(spec: &TransactionSpec, fee_rate: u64, mweb_fee_rate: u64) -> EstimateResult {
    let mweb_weight = calculate_mweb_weight(spec.mweb_outputs, &spec.mweb_kernels);

    let mweb_only = spec.is_mweb_only();
    let pure_mweb = spec.is_pure_mweb();

    let sizes = calculate_regular_sizes(spec);
    let peg_out_count = spec.peg_out_count();

    let weight = calculate_transaction_weight(&sizes, peg_out_count, mweb_only, pure_mweb);
    let virtual_size = calculate_virtual_size(weight);

    let regular_fee = if pure_mweb {
        0
    } else {
        virtual_size.saturating_mul(fee_rate)
    };
    let mweb_fee = calculate_mweb_fee(mweb_weight, mweb_fee_rate);

    EstimateResult {
        virtual_size,
        weight,
        mweb_weight,
        fees: Fees {
            regular: regular_fee,
            mweb: mweb_fee,
            total: regular_fee.saturating_add(mweb_fee),
        },
        breakdown: Breakdown {
            base_size: sizes.base_size,
            witness_size: sizes.witness_size,
            total_size: sizes.total_size(),
            peg_in_count: sizes.peg_in_count,
            peg_out_count,
            mweb_output_count: spec.mweb_outputs as u64,
            mweb_kernel_count: spec.mweb_kernels.len() as u64,
        },
        validation: Validation {
            is_within_block_limit: weight <= MAX_BLOCK_WEIGHT,
            is_within_mweb_limit: mweb_weight <= MAX_MWEB_WEIGHT,
        },
    }
}

/// MWEB inputs/outputs travel as lists of opaque objects; only the length
/// matters.
mod opaque_count {
    use serde::de::{IgnoredAny, SeqAccess, Visitor};
    use serde::ser::SerializeSeq;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(count: &usize, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(*count))?;
        for _ in 0..*count {
            seq.serialize_element(&serde_json::Map::new())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
        struct CountVisitor;

        impl<'de> Visitor<'de> for CountVisitor {
            type Value = usize;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a list of MWEB entries")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<usize, A::Error> {
                let mut count = 0;
                while seq.next_element::<IgnoredAny>()?.is_some() {
                    count += 1;
                }
                Ok(count)
            }
        }

        deserializer.deserialize_seq(CountVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_kind_tags() {
        assert_eq!(InputKind::from_tag("P2SH-P2WPKH"), Some(InputKind::P2shP2wpkh));
        assert_eq!(InputKind::from_tag("P2TR"), None);
        // lenient conversion used by JSON specs
        assert_eq!(InputKind::from("P2TR".to_string()), InputKind::P2wpkh);
    }

    fn peg_out() -> TransactionSpec {
        TransactionSpec {
            outputs: vec![OutputSpec::new(OutputKind::P2wpkh)],
            mweb_inputs: 1,
            mweb_outputs: 1,
            mweb_kernels: vec![MwebKernel::pegout()],
            ..Default::default()
        }
    }

    fn peg_in() -> TransactionSpec {
        TransactionSpec {
            inputs: vec![InputSpec::new(InputKind::P2wpkh)],
            outputs: vec![OutputSpec::pegin()],
            mweb_outputs: 2,
            mweb_kernels: vec![MwebKernel::pegin()],
            ..Default::default()
        }
    }

    #[test]
    fn test_peg_out_matches_reference() {
        let est = estimate(&peg_out(), 10, 100);
        assert_eq!(est.virtual_size, 31);
        assert_eq!(est.weight, 124);
        assert_eq!(est.mweb_weight, 22);
        assert_eq!(est.fees.total, 2510);
        assert_eq!(est.fees.mweb, est.mweb_weight * 100);
        assert_eq!(est.breakdown.peg_out_count, 1);
    }

    #[test]
    fn test_peg_in_matches_reference() {
        let est = estimate(&peg_in(), 10, 100);
        assert_eq!(est.virtual_size, 163);
        assert_eq!(est.weight, 649);
        assert_eq!(est.mweb_weight, 39);
        assert_eq!(est.fees.total, 5530);
        assert_eq!(est.breakdown.peg_in_count, 1);
        assert_eq!(est.breakdown.base_size, 94);
        assert_eq!(est.breakdown.witness_size, 109);
    }

    #[test]
    fn test_pure_mweb_pays_only_mweb_fee() {
        let spec = TransactionSpec {
            mweb_inputs: 1,
            mweb_outputs: 2,
            mweb_kernels: vec![MwebKernel::stealth()],
            ..Default::default()
        };
        let est = estimate(&spec, 10, 100);
        assert_eq!(est.virtual_size, 0);
        assert_eq!(est.weight, 0);
        assert_eq!(est.mweb_weight, 39);
        assert_eq!(est.fees.regular, 0);
        assert_eq!(est.fees.total, 3900);
    }

    #[test]
    fn test_peg_in_with_change() {
        let spec = TransactionSpec {
            inputs: vec![InputSpec::new(InputKind::P2wpkh)],
            outputs: vec![OutputSpec::pegin(), OutputSpec::new(OutputKind::P2wpkh)],
            mweb_outputs: 1,
            mweb_kernels: vec![MwebKernel::pegin()],
            ..Default::default()
        };
        let est = estimate(&spec, 10, 100);
        assert_eq!(est.virtual_size, 194);
        assert_eq!(est.mweb_weight, 21);
        assert_eq!(est.fees.total, 4040);
    }

    #[test]
    fn test_dual_input_peg_in_with_change() {
        let spec = TransactionSpec {
            inputs: vec![InputSpec::new(InputKind::P2wpkh); 2],
            outputs: vec![OutputSpec::pegin(), OutputSpec::new(OutputKind::P2wpkh)],
            mweb_outputs: 1,
            mweb_kernels: vec![MwebKernel::pegin()],
            ..Default::default()
        };
        let est = estimate(&spec, 10, 100);
        assert_eq!(est.virtual_size, 261);
        assert_eq!(est.fees.total, 4710);
    }

    #[test]
    fn test_legacy_inputs_have_no_witness() {
        let spec = TransactionSpec {
            inputs: vec![InputSpec::new(InputKind::P2pkh)],
            outputs: vec![OutputSpec::new(OutputKind::P2pkh)],
            ..Default::default()
        };
        let est = estimate(&spec, 1, 100);
        // 148 + 34 + 10, no marker/flag
        assert_eq!(est.breakdown.base_size, 192);
        assert_eq!(est.breakdown.witness_size, 0);
        assert_eq!(est.weight, 192 * 4);
        assert_eq!(est.virtual_size, 192);
    }

    #[test]
    fn test_funding_tags_override_fallback() {
        let mut spec = TransactionSpec {
            inputs: vec![InputSpec::new(InputKind::P2wpkh)],
            outputs: vec![
                OutputSpec::funded_by(OutputKind::P2wpkh, Funding::Mweb),
                OutputSpec::funded_by(OutputKind::P2wpkh, Funding::L1),
            ],
            mweb_inputs: 1,
            ..Default::default()
        };
        assert_eq!(spec.peg_out_count(), 1);

        for output in &mut spec.outputs {
            output.funded_by = None;
        }
        assert_eq!(spec.peg_out_count(), 2);

        spec.mweb_inputs = 0;
        assert_eq!(spec.peg_out_count(), 0);
    }

    #[test]
    fn test_kernel_weights() {
        let plain = MwebKernel {
            has_stealth_excess: false,
            ..Default::default()
        };
        assert_eq!(calculate_mweb_weight(0, &[plain]), 2);
        assert_eq!(calculate_mweb_weight(0, &[MwebKernel::stealth()]), 3);
        assert_eq!(calculate_mweb_weight(0, &[MwebKernel::pegin()]), 3);
        assert_eq!(calculate_mweb_weight(0, &[MwebKernel::pegout()]), 4);
        // pegout wins over a missing stealth excess
        let pegout_plain = MwebKernel {
            pegout: true,
            has_stealth_excess: false,
            pegin: false,
        };
        assert_eq!(calculate_mweb_weight(2, &[pegout_plain]), 40);
    }

    #[test]
    fn test_virtual_size_rounds_up() {
        assert_eq!(calculate_virtual_size(0), 0);
        assert_eq!(calculate_virtual_size(1), 1);
        assert_eq!(calculate_virtual_size(4), 1);
        assert_eq!(calculate_virtual_size(649), 163);
    }

    #[test]
    fn test_validation_limits() {
        let spec = TransactionSpec {
            mweb_outputs: 1167,
            ..Default::default()
        };
        let est = estimate(&spec, 10, 100);
        assert_eq!(est.mweb_weight, 21_006);
        assert!(!est.validation.is_within_mweb_limit);
        assert!(est.validation.is_within_block_limit);
    }

    #[test]
    fn test_spec_parses_from_ui_json() {
        let json = r#"{
            "inputs": [{"type": "P2WPKH"}],
            "outputs": [{"type": "witness_mweb_pegin"}],
            "mwebOutputs": [{}, {}],
            "mwebKernels": [{"hasStealthExcess": true, "pegin": true}]
        }"#;
        let spec: TransactionSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec, peg_in());
        assert_eq!(spec.mweb_inputs, 0);
    }

    #[test]
    fn test_unknown_kinds_size_as_p2wpkh() {
        let json = r#"{"inputs": [{"type": "P2TR"}], "outputs": [{"type": "P2WSH"}]}"#;
        let spec: TransactionSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.inputs[0].kind, InputKind::P2wpkh);
        assert_eq!(spec.outputs[0].kind, OutputKind::P2wpkh);
    }

    #[test]
    fn test_result_serializes_with_wire_names() {
        let value = serde_json::to_value(estimate(&peg_out(), 10, 100)).unwrap();
        assert_eq!(value["virtualSize"], 31);
        assert_eq!(value["mwebWeight"], 22);
        assert_eq!(value["fees"]["total"], 2510);
        assert_eq!(value["breakdown"]["pegOutCount"], 1);
        assert_eq!(value["validation"]["isWithinMWEBLimit"], true);
        assert_eq!(value["validation"]["isWithinBlockLimit"], true);
    }
}
