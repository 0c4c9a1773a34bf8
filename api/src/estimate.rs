//! Pure read-side calculators. Callers run these against an observed pool
//! state to precompute minimum-output and minimum-liquidity guards before
//! sending a message; the pool runs the very same functions when it
//! processes the message, so a guard computed here is exact.

use crate::consts::FEE_DENOMINATOR;
use crate::error::{ProtocolError, ProtocolResult};
use crate::math::{self, cpamm, mul_div_floor, stable};
use crate::pool_key::AmmKind;
use crate::state::PoolState;

/// How an input amount splits into the traded remainder and the three fee
/// components.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeBreakdown {
    pub net_input: u64,
    pub lp_fee: u64,
    pub protocol_fee: u64,
    pub referral_fee: u64,
}

pub fn split_fees(
    amount_in: u64,
    lp_fee_bps: u16,
    protocol_fee_bps: u16,
    referral_fee_bps: u16,
    has_referral: bool,
) -> ProtocolResult<FeeBreakdown> {
    let lp_fee = mul_div_floor(amount_in, lp_fee_bps as u64, FEE_DENOMINATOR)?;
    let protocol_fee = mul_div_floor(amount_in, protocol_fee_bps as u64, FEE_DENOMINATOR)?;
    let referral_fee = if has_referral {
        mul_div_floor(amount_in, referral_fee_bps as u64, FEE_DENOMINATOR)?
    } else {
        0
    };
    let net_input = amount_in
        .checked_sub(lp_fee)
        .and_then(|v| v.checked_sub(protocol_fee))
        .and_then(|v| v.checked_sub(referral_fee))
        .ok_or(ProtocolError::MathOverflow)?;
    Ok(FeeBreakdown { net_input, lp_fee, protocol_fee, referral_fee })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapEstimate {
    pub amount_out: u64,
    pub fees: FeeBreakdown,
}

/// Swap output for `amount_in` entering on `side_in`, fees included.
pub fn estimate_swap(
    pool: &PoolState,
    side_in: usize,
    amount_in: u64,
    has_referral: bool,
) -> ProtocolResult<SwapEstimate> {
    let side_out = 1 - side_in;
    let fees = split_fees(
        amount_in,
        pool.lp_fee_bps,
        pool.protocol_fee_bps,
        pool.referral_fee_bps,
        has_referral,
    )?;
    let amount_out = match pool.key.amm {
        AmmKind::ConstantProduct => {
            cpamm::out_given_in(pool.reserve(side_in), pool.reserve(side_out), fees.net_input)?
        }
        AmmKind::Stable => {
            let settings = pool.key.settings.ok_or(ProtocolError::UnsupportedAmmOrAsset)?;
            stable::out_given_in(
                pool.reserve(side_in),
                pool.reserve(side_out),
                fees.net_input,
                pool.rate(side_in),
                pool.rate(side_out),
                settings.amp,
            )?
        }
    };
    Ok(SwapEstimate { amount_out, fees })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepositEstimate {
    pub minted: u64,
    /// Amounts the pool would absorb; the constant-product curve returns
    /// the excess of an over-supplied side, the stable curve absorbs all.
    pub used0: u64,
    pub used1: u64,
}

/// Liquidity minted for a two-sided deposit, covering both the first
/// (initializing) deposit and the steady-state case.
pub fn estimate_deposit(
    pool: &PoolState,
    amount0: u64,
    amount1: u64,
) -> ProtocolResult<DepositEstimate> {
    match pool.key.amm {
        AmmKind::ConstantProduct => {
            if pool.is_initialized() {
                let (minted, used0, used1) = cpamm::deposit_liquidity(
                    pool.reserve0,
                    pool.reserve1,
                    pool.total_supply,
                    amount0,
                    amount1,
                )?;
                Ok(DepositEstimate { minted, used0, used1 })
            } else {
                let minted = cpamm::initial_liquidity(amount0, amount1);
                Ok(DepositEstimate { minted, used0: amount0, used1: amount1 })
            }
        }
        AmmKind::Stable => {
            let settings = pool.key.settings.ok_or(ProtocolError::UnsupportedAmmOrAsset)?;
            let minted = if pool.is_initialized() {
                stable::deposit_liquidity(
                    pool.reserve0,
                    pool.reserve1,
                    pool.total_supply,
                    amount0,
                    amount1,
                    &settings,
                )?
            } else {
                stable::initial_liquidity(amount0, amount1, &settings)?
            };
            Ok(DepositEstimate { minted, used0: amount0, used1: amount1 })
        }
    }
}

/// Pro-rata payout for burning `amount` liquidity tokens.
pub fn estimate_withdraw(pool: &PoolState, amount: u64) -> ProtocolResult<(u64, u64)> {
    math::pro_rata_withdraw(pool.reserve0, pool.reserve1, pool.total_supply, amount)
}
