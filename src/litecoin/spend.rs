//! Targeted-spend shape selection
//!
//! Given the inputs a caller already selected and a destination, pick the
//! [`TransactionSpec`] shape (peg-in, peg-out, pure MWEB or plain regular
//! send, with change on whichever ledger has a remainder above dust) and
//! size its fee. Signing is left to the caller.

use serde::Serialize;

use super::address::LitecoinAddress;
use super::fee::{
    self, EstimateResult, Funding, InputKind, InputSpec, MwebKernel, OutputKind, OutputSpec,
    TransactionSpec,
};
use super::transaction::DUST_THRESHOLD;
use crate::error::TxCoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegularInput {
    pub kind: InputKind,
    pub value: u64,
}

/// Inputs of the decision table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendParams {
    pub regular_inputs: Vec<InputKind>,
    pub mweb_input_count: usize,
    pub regular_input_amount: u64,
    pub mweb_input_amount: u64,
    pub send_amount: u64,
    pub target_is_mweb: bool,
    /// Shape of the recipient output when the target is regular
    pub destination_kind: OutputKind,
    pub estimated_fee: u64,
}

impl SpendParams {
    pub fn total_input(&self) -> u64 {
        self.regular_input_amount
            .saturating_add(self.mweb_input_amount)
    }

    /// `(total - send - fee) > dust`
    pub fn has_change(&self) -> bool {
        let cost = self.send_amount.saturating_add(self.estimated_fee);
        self.total_input().saturating_sub(cost) > DUST_THRESHOLD
    }
}

fn regular_change() -> OutputSpec {
    OutputSpec::funded_by(OutputKind::P2wpkh, Funding::L1)
}

/// Build the transaction shape for `params`.
pub fn build_transaction_spec(params: &SpendParams) -> TransactionSpec {
    let mut spec = TransactionSpec {
        inputs: params.regular_inputs.iter().copied().map(InputSpec::new).collect(),
        mweb_inputs: params.mweb_input_count,
        ..Default::default()
    };

    if params.target_is_mweb {
        mweb_target(&mut spec, params);
    } else {
        regular_target(&mut spec, params);
    }

    spec
}

fn mweb_target(spec: &mut TransactionSpec, params: &SpendParams) {
    let has_change = params.has_change();

    if spec.inputs.is_empty() {
        // MWEB to MWEB
        spec.mweb_outputs += 1;
        spec.mweb_kernels.push(MwebKernel::stealth());
        if has_change {
            spec.mweb_outputs += 1;
        }
        return;
    }

    // peg-in
    spec.outputs.push(OutputSpec::pegin());
    spec.mweb_outputs += 1;
    spec.mweb_kernels.push(MwebKernel::pegin());

    if !has_change {
        return;
    }

    let cost = params.send_amount.saturating_add(params.estimated_fee);
    if params.regular_input_amount >= cost {
        spec.outputs.push(regular_change());
    } else if params.mweb_input_count > 0 {
        let regular_remainder = params
            .regular_input_amount
            .saturating_sub(params.estimated_fee);
        let mweb_remainder = params.mweb_input_amount.saturating_sub(params.send_amount);

        if regular_remainder > DUST_THRESHOLD {
            spec.outputs.push(regular_change());
        }
        if mweb_remainder > DUST_THRESHOLD {
            spec.mweb_outputs += 1;
        }
    }
}

fn regular_target(spec: &mut TransactionSpec, params: &SpendParams) {
    let has_change = params.has_change();
    let recipient = |funding| OutputSpec::funded_by(params.destination_kind, funding);

    if params.mweb_input_count == 0 {
        spec.outputs.push(recipient(Funding::L1));
        if has_change {
            spec.outputs.push(regular_change());
        }
        return;
    }

    if spec.inputs.is_empty() {
        // MWEB only: peg-out
        spec.outputs.push(recipient(Funding::Mweb));
        spec.mweb_kernels.push(MwebKernel::pegout());
        if has_change {
            spec.mweb_outputs += 1;
        }
        return;
    }

    let cost = params.send_amount.saturating_add(params.estimated_fee);
    if params.regular_input_amount >= cost {
        // regular inputs fund recipient and fee; MWEB comes back whole
        spec.outputs.push(recipient(Funding::L1));
        if has_change {
            if params.regular_input_amount - cost > DUST_THRESHOLD {
                spec.outputs.push(regular_change());
            }
            if params.mweb_input_amount > DUST_THRESHOLD {
                spec.mweb_outputs += 1;
            }
        }
    } else {
        // MWEB funds the recipient through a peg-out
        spec.outputs.push(recipient(Funding::Mweb));
        spec.mweb_kernels.push(MwebKernel::pegout());
        if has_change {
            if params.regular_input_amount > params.estimated_fee.saturating_add(DUST_THRESHOLD) {
                spec.outputs.push(regular_change());
            }
            if params.mweb_input_amount.saturating_sub(params.send_amount) > DUST_THRESHOLD {
                spec.mweb_outputs += 1;
            }
        }
    }
}

/// Inputs already chosen by the caller plus where the value goes.
#[derive(Debug, Clone)]
pub struct SpendRequest {
    pub regular_inputs: Vec<RegularInput>,
    /// Values of the MWEB inputs
    pub mweb_inputs: Vec<u64>,
    pub send_amount: u64,
    pub destination: LitecoinAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendPlan {
    pub spec: TransactionSpec,
    pub estimate: EstimateResult,
    /// Fee the shape was chosen with; never below `estimate.fees.total`
    pub fee: u64,
    pub change: u64,
    pub has_change: bool,
}

/// Choose the shape for `request` and settle its fee.
///
/// The shape depends on the fee (change or not, which ledger pays) and the
/// fee on the shape, so the fee is raised until the shape it selects costs
/// no more than it. The fee only grows and is bounded by the largest shape,
/// so this terminates.
pub fn plan_spend(
    request: &SpendRequest,
    fee_rate: u64,
    mweb_fee_rate: u64,
) -> Result<SpendPlan, TxCoreError> {
    let regular_input_amount = sum(request.regular_inputs.iter().map(|i| i.value))?;
    let mweb_input_amount = sum(request.mweb_inputs.iter().copied())?;

    if request.regular_inputs.is_empty() && request.mweb_inputs.is_empty() {
        return Err(TxCoreError::InsufficientFunds("no inputs selected".into()));
    }

    let destination_kind = request
        .destination
        .regular_output_kind()
        .unwrap_or(OutputKind::P2wpkh);

    let mut params = SpendParams {
        regular_inputs: request.regular_inputs.iter().map(|i| i.kind).collect(),
        mweb_input_count: request.mweb_inputs.len(),
        regular_input_amount,
        mweb_input_amount,
        send_amount: request.send_amount,
        target_is_mweb: request.destination.is_mweb(),
        destination_kind,
        estimated_fee: 0,
    };

    let total = params.total_input();
    if total < request.send_amount {
        return Err(TxCoreError::InsufficientFunds(format!(
            "inputs hold {}, sending {}",
            total, request.send_amount
        )));
    }

    let (spec, estimate) = loop {
        let spec = build_transaction_spec(&params);
        let estimate = fee::estimate(&spec, fee_rate, mweb_fee_rate);
        if estimate.fees.total <= params.estimated_fee {
            break (spec, estimate);
        }
        log::debug!(
            "Fee {} too low for selected shape ({}), retrying",
            params.estimated_fee,
            estimate.fees.total
        );
        params.estimated_fee = estimate.fees.total;
    };

    let cost = request.send_amount.saturating_add(params.estimated_fee);
    if total < cost {
        return Err(TxCoreError::InsufficientFunds(format!(
            "inputs hold {}, need {} ({} plus {} fee)",
            total, cost, request.send_amount, params.estimated_fee
        )));
    }

    let change = total - cost;
    let has_change = params.has_change();

    log::info!(
        "📐 Planned spend to {}: {} regular + {} MWEB input(s), fee {}, change {}",
        request.destination,
        params.regular_inputs.len(),
        params.mweb_input_count,
        params.estimated_fee,
        change
    );

    Ok(SpendPlan {
        spec,
        estimate,
        fee: params.estimated_fee,
        change,
        has_change,
    })
}

fn sum(mut values: impl Iterator<Item = u64>) -> Result<u64, TxCoreError> {
    values
        .try_fold(0u64, |acc, v| acc.checked_add(v))
        .ok_or_else(|| TxCoreError::InsufficientFunds("input sum overflows".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::litecoin::network::LitecoinNetwork;

    const MWEB: &str = "ltcmweb1qq0l2z6ka7nk8yv2wflmvf62jpg2ud9mywcmhr0vvkanwhg9pptes7qmxm0ujztp4sm4zw99x2e7c0ga3l3496qhejj9e7djlj9ymedc00yjlvhrh";
    const SEGWIT: &str = "ltc1qdze7y7chruzccmegt6tu0ewrltjm7k7xtux6us";
    const LEGACY: &str = "LP3SFCDkcA6nE8RJhug29XZnyTcRqHUKxf";

    fn address(s: &str) -> LitecoinAddress {
        LitecoinAddress::parse(s, LitecoinNetwork::Mainnet).unwrap()
    }

    fn p2wpkh(value: u64) -> RegularInput {
        RegularInput {
            kind: InputKind::P2wpkh,
            value,
        }
    }

    fn request(regular: Vec<RegularInput>, mweb: Vec<u64>, send: u64, to: &str) -> SpendRequest {
        SpendRequest {
            regular_inputs: regular,
            mweb_inputs: mweb,
            send_amount: send,
            destination: address(to),
        }
    }

    fn params(regular: u64, mweb: u64, send: u64, fee: u64, to_mweb: bool) -> SpendParams {
        SpendParams {
            regular_inputs: if regular > 0 { vec![InputKind::P2wpkh] } else { vec![] },
            mweb_input_count: usize::from(mweb > 0),
            regular_input_amount: regular,
            mweb_input_amount: mweb,
            send_amount: send,
            target_is_mweb: to_mweb,
            destination_kind: OutputKind::P2wpkh,
            estimated_fee: fee,
        }
    }

    #[test]
    fn test_overflowing_inputs_are_rejected() {
        let huge = u64::MAX / 2 + 1;
        let err = plan_spend(
            &request(vec![p2wpkh(huge), p2wpkh(huge)], vec![], 50_000, SEGWIT),
            10,
            100,
        )
        .unwrap_err();
        assert!(matches!(err, TxCoreError::InsufficientFunds(_)));

        let err = plan_spend(&request(vec![], vec![huge, huge], 50_000, MWEB), 10, 100)
            .unwrap_err();
        assert!(matches!(err, TxCoreError::InsufficientFunds(_)));
    }

    #[test]
    fn test_peg_in_with_regular_change() {
        let spec = build_transaction_spec(&params(100_000, 0, 50_000, 5_000, true));
        assert_eq!(
            spec.outputs,
            vec![OutputSpec::pegin(), regular_change()]
        );
        assert_eq!(spec.mweb_outputs, 1);
        assert_eq!(spec.mweb_kernels, vec![MwebKernel::pegin()]);
    }

    #[test]
    fn test_mixed_peg_in_splits_change() {
        // regular alone can't cover 80k + fee; both ledgers keep a remainder
        let spec = build_transaction_spec(&params(60_000, 100_000, 80_000, 5_000, true));
        assert_eq!(spec.outputs, vec![OutputSpec::pegin(), regular_change()]);
        assert_eq!(spec.mweb_outputs, 2);

        // MWEB remainder below dust stays in the fee
        let spec = build_transaction_spec(&params(60_000, 80_300, 80_000, 5_000, true));
        assert_eq!(spec.mweb_outputs, 1);
    }

    #[test]
    fn test_mweb_to_mweb() {
        let spec = build_transaction_spec(&params(0, 100_000, 50_000, 4_000, true));
        assert!(spec.outputs.is_empty());
        assert_eq!(spec.mweb_outputs, 2);
        assert_eq!(spec.mweb_kernels, vec![MwebKernel::stealth()]);
        assert!(spec.is_pure_mweb());

        let spec = build_transaction_spec(&params(0, 54_000, 50_000, 3_900, true));
        assert_eq!(spec.mweb_outputs, 1);
    }

    #[test]
    fn test_mixed_regular_funded() {
        let spec = build_transaction_spec(&params(100_000, 30_000, 50_000, 2_000, false));
        assert_eq!(
            spec.outputs,
            vec![
                OutputSpec::funded_by(OutputKind::P2wpkh, Funding::L1),
                regular_change()
            ]
        );
        // MWEB inputs come back whole
        assert_eq!(spec.mweb_outputs, 1);
        assert!(spec.mweb_kernels.is_empty());
        assert_eq!(spec.peg_out_count(), 0);
    }

    #[test]
    fn test_mixed_mweb_funded_peg_out() {
        let spec = build_transaction_spec(&params(2_000, 100_000, 50_000, 3_000, false));
        assert_eq!(
            spec.outputs,
            vec![OutputSpec::funded_by(OutputKind::P2wpkh, Funding::Mweb)]
        );
        assert_eq!(spec.mweb_kernels, vec![MwebKernel::pegout()]);
        assert_eq!(spec.mweb_outputs, 1);
        assert_eq!(spec.peg_out_count(), 1);

        // enough regular value left after the fee gets its own change
        let spec = build_transaction_spec(&params(10_000, 100_000, 50_000, 3_000, false));
        assert_eq!(spec.outputs.len(), 2);
        assert_eq!(spec.outputs[1], regular_change());
    }

    #[test]
    fn test_destination_kind_shapes_recipient() {
        let mut p = params(100_000, 0, 99_000, 1_000, false);
        p.destination_kind = OutputKind::P2pkh;
        let spec = build_transaction_spec(&p);
        assert_eq!(
            spec.outputs,
            vec![OutputSpec::funded_by(OutputKind::P2pkh, Funding::L1)]
        );
    }

    #[test]
    fn test_plan_regular_send() {
        let plan = plan_spend(&request(vec![p2wpkh(100_000)], vec![], 50_000, SEGWIT), 10, 100)
            .unwrap();
        assert_eq!(plan.fee, 1410);
        assert_eq!(plan.estimate.fees.total, 1410);
        assert_eq!(plan.change, 48_590);
        assert!(plan.has_change);
        assert_eq!(plan.spec.outputs.len(), 2);
    }

    #[test]
    fn test_plan_peg_in_with_change() {
        let plan = plan_spend(&request(vec![p2wpkh(100_000)], vec![], 50_000, MWEB), 10, 100)
            .unwrap();
        assert_eq!(plan.estimate.virtual_size, 194);
        assert_eq!(plan.fee, 4040);
        assert_eq!(plan.change, 45_960);
    }

    #[test]
    fn test_plan_pure_mweb_and_peg_out() {
        let plan = plan_spend(&request(vec![], vec![100_000], 50_000, MWEB), 10, 100).unwrap();
        assert_eq!(plan.fee, 3900);
        assert_eq!(plan.estimate.fees.regular, 0);

        let plan = plan_spend(&request(vec![], vec![100_000], 50_000, SEGWIT), 10, 100).unwrap();
        assert_eq!(plan.estimate.weight, 124);
        assert_eq!(plan.estimate.mweb_weight, 22);
        assert_eq!(plan.fee, 2510);
    }

    #[test]
    fn test_plan_drops_change_that_falls_to_dust() {
        // change of 1600 with no fee, 190 once the change output is paid for
        let plan = plan_spend(&request(vec![p2wpkh(100_000)], vec![], 98_400, SEGWIT), 10, 100)
            .unwrap();
        assert!(!plan.has_change);
        assert_eq!(plan.spec.outputs.len(), 1);
        assert_eq!(plan.change, 190);
        assert!(plan.fee >= plan.estimate.fees.total);
    }

    #[test]
    fn test_plan_legacy_destination() {
        let plan = plan_spend(&request(vec![p2wpkh(100_000)], vec![], 50_000, LEGACY), 10, 100)
            .unwrap();
        assert_eq!(plan.spec.outputs[0].kind, OutputKind::P2pkh);
        assert_eq!(plan.spec.outputs[1].kind, OutputKind::P2wpkh);
    }

    #[test]
    fn test_plan_insufficient_funds() {
        let err = plan_spend(&request(vec![p2wpkh(10_000)], vec![], 9_900, SEGWIT), 10, 100)
            .unwrap_err();
        assert!(matches!(err, TxCoreError::InsufficientFunds(_)));

        let err = plan_spend(&request(vec![], vec![], 1, SEGWIT), 10, 100).unwrap_err();
        assert!(matches!(err, TxCoreError::InsufficientFunds(_)));
    }

    #[test]
    fn test_plan_serializes_camel_case() {
        let plan = plan_spend(&request(vec![p2wpkh(100_000)], vec![], 50_000, MWEB), 10, 100)
            .unwrap();
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["hasChange"], true);
        assert_eq!(value["estimate"]["virtualSize"], 194);
        assert_eq!(value["spec"]["outputs"][0]["type"], "witness_mweb_pegin");
    }
}
