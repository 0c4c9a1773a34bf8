use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{ensure, ProtocolError, ProtocolResult};

/// Deployment-tunable protocol parameters. The dust floor and the locked
/// first-mint amount are configuration, not constants baked into the math.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParams {
    /// Minimum liquidity-token amount a first deposit must mint; below this
    /// the pool refuses to initialize.
    pub min_initial_liquidity: u64,
    /// Liquidity-token amount permanently locked on first deposit, minted
    /// to the null owner.
    pub locked_liquidity: u64,
    pub default_protocol_fee_bps: u16,
    pub default_lp_fee_bps: u16,
    pub referral_fee_bps: u16,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            min_initial_liquidity: DEFAULT_MIN_INITIAL_LIQUIDITY,
            locked_liquidity: DEFAULT_LOCKED_LIQUIDITY,
            default_protocol_fee_bps: DEFAULT_PROTOCOL_FEE_BPS,
            default_lp_fee_bps: DEFAULT_LP_FEE_BPS,
            referral_fee_bps: DEFAULT_REFERRAL_FEE_BPS,
        }
    }
}

impl ProtocolParams {
    pub fn validate(&self) -> ProtocolResult {
        ensure(self.locked_liquidity > 0, ProtocolError::Malformed)?;
        ensure(
            self.min_initial_liquidity >= self.locked_liquidity,
            ProtocolError::Malformed,
        )?;
        ensure(
            self.default_protocol_fee_bps <= MAX_FEE_BPS
                && self.default_lp_fee_bps <= MAX_FEE_BPS
                && self.referral_fee_bps <= MAX_FEE_BPS,
            ProtocolError::Malformed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        ProtocolParams::default().validate().unwrap();
    }

    #[test]
    fn floor_must_cover_lock() {
        let params = ProtocolParams {
            min_initial_liquidity: 10,
            locked_liquidity: 100,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
