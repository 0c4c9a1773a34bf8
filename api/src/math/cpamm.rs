//! Constant-product curve: `reserve_in * reserve_out` is preserved by
//! swaps (up to rounding in the pool's favor).

use crate::error::{ProtocolError, ProtocolResult};
use crate::math::mul_div_floor;

/// Swap output for a fee-adjusted input:
/// `out = reserve_out * in / (reserve_in + in)`, floored.
pub fn out_given_in(reserve_in: u64, reserve_out: u64, amount_in: u64) -> ProtocolResult<u64> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(ProtocolError::InsufficientLiquidity);
    }
    if amount_in == 0 {
        return Ok(0);
    }
    let numerator = (reserve_out as u128) * (amount_in as u128);
    let denominator = (reserve_in as u128) + (amount_in as u128);
    // quotient < reserve_out, so the cast cannot fail
    Ok((numerator / denominator) as u64)
}

/// Initial liquidity-token supply: `floor(sqrt(amount0 * amount1))`.
pub fn initial_liquidity(amount0: u64, amount1: u64) -> u64 {
    isqrt((amount0 as u128) * (amount1 as u128)) as u64
}

/// Proportional mint against existing reserves. Returns the minted amount
/// and the amounts actually absorbed per side; the excess of the
/// over-supplied side is the caller's to refund.
pub fn deposit_liquidity(
    reserve0: u64,
    reserve1: u64,
    total_supply: u64,
    amount0: u64,
    amount1: u64,
) -> ProtocolResult<(u64, u64, u64)> {
    if reserve0 == 0 || reserve1 == 0 || total_supply == 0 {
        return Err(ProtocolError::InsufficientLiquidity);
    }
    let cross0 = (amount0 as u128) * (reserve1 as u128);
    let cross1 = (amount1 as u128) * (reserve0 as u128);
    if cross0 > cross1 {
        // side 0 over-supplied
        let minted = mul_div_floor(amount1, total_supply, reserve1)?;
        let used0 = mul_div_floor(amount1, reserve0, reserve1)?;
        Ok((minted, used0, amount1))
    } else if cross1 > cross0 {
        let minted = mul_div_floor(amount0, total_supply, reserve0)?;
        let used1 = mul_div_floor(amount0, reserve1, reserve0)?;
        Ok((minted, amount0, used1))
    } else {
        let minted = mul_div_floor(amount0, total_supply, reserve0)?;
        Ok((minted, amount0, amount1))
    }
}

/// Integer square root, floored. Newton iteration starting from a power of
/// two at least as large as the root.
fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let bits = 128 - n.leading_zeros();
    let mut x = 1u128 << ((bits + 1) / 2);
    loop {
        let y = (x + n / x) / 2;
        if y >= x {
            return x;
        }
        x = y;
    }
}
