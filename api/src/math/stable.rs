//! StableSwap curve for the two-asset case. The conserved quantity `D`
//! satisfies
//!
//! ```text
//! ann * (x0 + x1) + D = ann * D + D^3 / (4 * x0 * x1)
//! ```
//!
//! where `ann = amp * n^n = amp * 4`. Both `D` and the post-swap output
//! reserve are found by Newton iteration over floored integer division,
//! converging when two successive values differ by at most one unit.

use crate::consts::{NEWTON_MAX_ROUNDS, RATE_ONE};
use crate::error::{ProtocolError, ProtocolResult};
use crate::math::U256;
use crate::pool_key::StableSettings;

/// `amp * n^n` for two coins.
fn ann(amp: u64) -> U256 {
    U256::from(amp) * U256::from(4u64)
}

fn to_u128(value: U256) -> ProtocolResult<u128> {
    if value > U256::from(u128::MAX) {
        return Err(ProtocolError::MathOverflow);
    }
    Ok(value.as_u128())
}

fn to_u64(value: U256) -> ProtocolResult<u64> {
    if value > U256::from(u64::MAX) {
        return Err(ProtocolError::MathOverflow);
    }
    Ok(value.as_u64())
}

/// Scales a raw amount by its per-asset rate normalizer.
fn normalize(amount: u64, rate: u64) -> ProtocolResult<u128> {
    to_u128(U256::from(amount) * U256::from(rate) / U256::from(RATE_ONE))
}

/// Converts a normalized amount back to raw units, floored.
fn denormalize(amount: u128, rate: u64) -> ProtocolResult<u64> {
    to_u64(U256::from(amount) * U256::from(RATE_ONE) / U256::from(rate))
}

/// Invariant `D` for normalized balances. Zero balances on both sides give
/// zero; a zero balance on one side cannot converge and errors out.
pub(crate) fn get_d(x0: u128, x1: u128, amp: u64) -> ProtocolResult<u128> {
    let s = U256::from(x0) + U256::from(x1);
    if s.is_zero() {
        return Ok(0);
    }
    if x0 == 0 || x1 == 0 {
        return Err(ProtocolError::InsufficientLiquidity);
    }
    let ann = ann(amp);
    let one = U256::one();
    let mut d = s;
    for _ in 0..NEWTON_MAX_ROUNDS {
        let mut d_p = d;
        for x in [x0, x1] {
            d_p = d_p
                .checked_mul(d)
                .ok_or(ProtocolError::MathOverflow)?
                / (U256::from(x) * U256::from(2u64));
        }
        let d_prev = d;
        // d = (ann*s + 2*d_p) * d / ((ann - 1)*d + 3*d_p)
        let numerator = (ann * s + d_p * U256::from(2u64))
            .checked_mul(d)
            .ok_or(ProtocolError::MathOverflow)?;
        let denominator = (ann - one) * d + d_p * U256::from(3u64);
        d = numerator / denominator;
        let delta = if d > d_prev { d - d_prev } else { d_prev - d };
        if delta <= one {
            return to_u128(d);
        }
    }
    Err(ProtocolError::MathOverflow)
}

/// Output-side balance that keeps `D` constant once the input side moves to
/// `x_new`. Solves `y^2 + (b - d)*y = c` iteratively; the two-coin form is
/// symmetric in the remaining side.
pub(crate) fn get_y(x_new: u128, x0: u128, x1: u128, amp: u64) -> ProtocolResult<u128> {
    if x_new == 0 {
        return Err(ProtocolError::InsufficientLiquidity);
    }
    let d = U256::from(get_d(x0, x1, amp)?);
    let ann = ann(amp);
    let one = U256::one();

    let s = U256::from(x_new);
    let mut c = d;
    c = c.checked_mul(d).ok_or(ProtocolError::MathOverflow)? / (U256::from(x_new) * U256::from(2u64));
    c = c.checked_mul(d).ok_or(ProtocolError::MathOverflow)? / (ann * U256::from(2u64));
    let b = s + d / ann;

    let mut y = d;
    for _ in 0..NEWTON_MAX_ROUNDS {
        let y_prev = y;
        // y = (y^2 + c) / (2y + b - d)
        let numerator = y.checked_mul(y).ok_or(ProtocolError::MathOverflow)? + c;
        let denominator = (y * U256::from(2u64) + b)
            .checked_sub(d)
            .ok_or(ProtocolError::MathOverflow)?;
        y = numerator / denominator;
        let delta = if y > y_prev { y - y_prev } else { y_prev - y };
        if delta <= one {
            return to_u128(y);
        }
    }
    Err(ProtocolError::MathOverflow)
}

/// Swap output for a fee-adjusted input under the stable curve, in raw
/// units of the output asset. `rate_in`/`rate_out` are the normalizers of
/// the input and output sides. One unit is shaved off the normalized
/// output to absorb rounding error in the pool's favor.
pub fn out_given_in(
    reserve_in: u64,
    reserve_out: u64,
    amount_in: u64,
    rate_in: u64,
    rate_out: u64,
    amp: u64,
) -> ProtocolResult<u64> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(ProtocolError::InsufficientLiquidity);
    }
    if amount_in == 0 {
        return Ok(0);
    }
    let x_in = normalize(reserve_in, rate_in)?;
    let x_out = normalize(reserve_out, rate_out)?;
    let in_norm = normalize(amount_in, rate_in)?;
    let x_new = x_in.checked_add(in_norm).ok_or(ProtocolError::MathOverflow)?;
    let y = get_y(x_new, x_in, x_out, amp)?;
    let out_norm = if x_out > y { x_out - y - 1 } else { 0 };
    denormalize(out_norm, rate_out)
}

/// First-deposit mint: the invariant of the normalized deposit amounts.
pub fn initial_liquidity(
    amount0: u64,
    amount1: u64,
    settings: &StableSettings,
) -> ProtocolResult<u64> {
    let x0 = normalize(amount0, settings.rate0)?;
    let x1 = normalize(amount1, settings.rate1)?;
    let d = get_d(x0, x1, settings.amp)?;
    to_u64(U256::from(d))
}

/// Subsequent-deposit mint: `supply * (D1 - D0) / D0`. Both amounts are
/// absorbed in full; the curve prices imbalance instead of refunding it.
pub fn deposit_liquidity(
    reserve0: u64,
    reserve1: u64,
    total_supply: u64,
    amount0: u64,
    amount1: u64,
    settings: &StableSettings,
) -> ProtocolResult<u64> {
    if total_supply == 0 {
        return Err(ProtocolError::InsufficientLiquidity);
    }
    let d0 = get_d(
        normalize(reserve0, settings.rate0)?,
        normalize(reserve1, settings.rate1)?,
        settings.amp,
    )?;
    if d0 == 0 {
        return Err(ProtocolError::InsufficientLiquidity);
    }
    let new0 = reserve0.checked_add(amount0).ok_or(ProtocolError::MathOverflow)?;
    let new1 = reserve1.checked_add(amount1).ok_or(ProtocolError::MathOverflow)?;
    let d1 = get_d(
        normalize(new0, settings.rate0)?,
        normalize(new1, settings.rate1)?,
        settings.amp,
    )?;
    if d1 <= d0 {
        return Ok(0);
    }
    let minted = U256::from(total_supply) * U256::from(d1 - d0) / U256::from(d0);
    to_u64(minted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::RATE_ONE;

    fn flat(amp: u64) -> StableSettings {
        StableSettings { amp, rate0: RATE_ONE, rate1: RATE_ONE }
    }

    #[test]
    fn d_of_balanced_pool_is_the_sum() {
        assert_eq!(get_d(100, 100, 100).unwrap(), 200);
        assert_eq!(get_d(1_000_000, 1_000_000, 100).unwrap(), 2_000_000);
    }

    #[test]
    fn d_of_lopsided_pool() {
        assert_eq!(get_d(2_000_000, 1_000_000, 10).unwrap(), 2_991_148);
    }

    #[test]
    fn d_of_empty_pool_is_zero() {
        assert_eq!(get_d(0, 0, 100).unwrap(), 0);
    }

    #[test]
    fn one_sided_pool_has_no_invariant() {
        assert!(get_d(1_000, 0, 100).is_err());
    }

    #[test]
    fn y_solves_the_invariant() {
        assert_eq!(get_y(110, 100, 100, 100).unwrap(), 90);
    }

    #[test]
    fn stable_swap_beats_constant_product_near_balance() {
        let out = out_given_in(1_000_000, 1_000_000, 100_000, RATE_ONE, RATE_ONE, 100).unwrap();
        let cp = crate::math::cpamm::out_given_in(1_000_000, 1_000_000, 100_000).unwrap();
        assert!(out > cp);
        assert!(out < 100_000);
    }

    #[test]
    fn rate_normalizers_scale_the_quote() {
        // input asset counts double: 25_000 in is worth ~50_000 out
        let out = out_given_in(500_000, 1_000_000, 25_000, 2 * RATE_ONE, RATE_ONE, 50).unwrap();
        assert_eq!(out, 49_975);
    }

    #[test]
    fn initial_mint_is_the_invariant() {
        assert_eq!(initial_liquidity(1_000_000, 1_000_000, &flat(100)).unwrap(), 2_000_000);
        assert_eq!(initial_liquidity(3_000_000, 1_000_000, &flat(100)).unwrap(), 3_996_691);
    }

    #[test]
    fn balanced_deposit_mints_proportionally() {
        let minted =
            deposit_liquidity(1_000_000, 1_000_000, 2_000_000, 100_000, 100_000, &flat(100))
                .unwrap();
        assert_eq!(minted, 200_000);
    }

    #[test]
    fn one_sided_deposit_is_priced_by_the_curve() {
        let minted =
            deposit_liquidity(1_500_000, 500_000, 1_979_898, 250_000, 0, &flat(10)).unwrap();
        assert_eq!(minted, 241_753);
    }
}
