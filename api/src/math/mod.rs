// required for clippy
#![allow(clippy::assign_op_pattern)]
#![allow(clippy::ptr_offset_with_cast)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::reversed_empty_ranges)]

use uint::construct_uint;

use crate::error::{ProtocolError, ProtocolResult};

construct_uint! {
    /// Wide unsigned integer for AMM intermediates; the stable invariant
    /// raises normalized reserves to the third power.
    pub struct U256(4);
}

pub mod cpamm;
pub mod stable;

/// floor(a * b / denom) over u128 intermediates.
pub fn mul_div_floor(a: u64, b: u64, denom: u64) -> ProtocolResult<u64> {
    if denom == 0 {
        return Err(ProtocolError::MathOverflow);
    }
    let wide = (a as u128) * (b as u128) / (denom as u128);
    u64::try_from(wide).map_err(|_| ProtocolError::MathOverflow)
}

/// Pro-rata share of both reserves for a liquidity-token burn.
pub fn pro_rata_withdraw(
    reserve0: u64,
    reserve1: u64,
    total_supply: u64,
    burn: u64,
) -> ProtocolResult<(u64, u64)> {
    if total_supply == 0 || burn > total_supply {
        return Err(ProtocolError::InsufficientLiquidity);
    }
    let amount0 = mul_div_floor(burn, reserve0, total_supply)?;
    let amount1 = mul_div_floor(burn, reserve1, total_supply)?;
    Ok((amount0, amount1))
}
