//! Legacy sweep size estimator
//!
//! Single-output size estimate used by the flat-rate sweep fee. Input sizes
//! are fractional in vbytes (90.75, 67.75), so everything is kept in weight
//! units to stay integer.

use super::fee::{InputKind, WITNESS_SCALE_FACTOR};

/// 148 vB
pub const P2PKH_INPUT_WU: u64 = 592;
/// 90.75 vB
pub const P2SH_P2WPKH_INPUT_WU: u64 = 363;
/// 67.75 vB
pub const P2WPKH_INPUT_WU: u64 = 271;
/// Single P2WPKH output, 31 vB
pub const SINGLE_OUTPUT_WU: u64 = 124;

fn varint_len(n: u64) -> u64 {
    match n {
        0..=252 => 1,
        253..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

fn input_weight(kind: InputKind) -> u64 {
    match kind {
        InputKind::P2pkh => P2PKH_INPUT_WU,
        InputKind::P2shP2wpkh => P2SH_P2WPKH_INPUT_WU,
        InputKind::P2wpkh => P2WPKH_INPUT_WU,
    }
}

/// Estimated weight of an `input_count`-input, one-output transaction where
/// every input spends `kind`.
pub fn estimate_sweep_weight(kind: InputKind, input_count: u64) -> u64 {
    // nVersion + input count + output count + nLockTime
    let overhead = (4 + varint_len(input_count) + varint_len(1) + 4) * WITNESS_SCALE_FACTOR;

    // marker + flag + one witness stack count per input
    let segwit_overhead = match kind {
        InputKind::P2pkh => 0,
        InputKind::P2wpkh | InputKind::P2shP2wpkh => 2 + input_count,
    };

    overhead + segwit_overhead + input_count * input_weight(kind) + SINGLE_OUTPUT_WU
}

/// Flat-rate fee: `ceil(vbytes * rate)` with the rate in millisatoshi per
/// vbyte.
pub fn flat_rate_fee(weight: u64, millisat_per_vbyte: u64) -> u64 {
    (weight * millisat_per_vbyte).div_ceil(WITNESS_SCALE_FACTOR * 1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_p2pkh_input() {
        // 10 vB overhead + 148 + 31 = 189 vB
        assert_eq!(estimate_sweep_weight(InputKind::P2pkh, 1), 189 * 4);
        // ceil(189 * 18.8) = ceil(3553.2)
        assert_eq!(flat_rate_fee(189 * 4, 18_800), 3554);
    }

    #[test]
    fn test_segwit_overhead_scales_with_inputs() {
        // 10 + 0.5 + 3/4 + 3 * 67.75 + 31 = 245.5 vB
        assert_eq!(estimate_sweep_weight(InputKind::P2wpkh, 3), 982);
        // 10 + 0.5 + 0.25 + 90.75 + 31 = 132.5 vB
        assert_eq!(estimate_sweep_weight(InputKind::P2shP2wpkh, 1), 530);
    }

    #[test]
    fn test_varint_boundary() {
        let below = estimate_sweep_weight(InputKind::P2pkh, 252);
        let above = estimate_sweep_weight(InputKind::P2pkh, 253);
        assert_eq!(above - below, P2PKH_INPUT_WU + 2 * 4);
    }

    #[test]
    fn test_fee_rounds_up() {
        assert_eq!(flat_rate_fee(4, 1_000), 1);
        assert_eq!(flat_rate_fee(4, 1_001), 2);
        assert_eq!(flat_rate_fee(0, 18_800), 0);
    }
}
