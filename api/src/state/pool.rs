use super::{read_state_header, write_state_header, StateKind};
use crate::address::Address;
use crate::codec::{put_bool, Reader};
use crate::consts::RATE_ONE;
use crate::error::ProtocolResult;
use crate::pool_key::{PoolKey, StableSettings};

/// AMM pool state. Reserves are kept in the canonical order of the key's
/// asset pair and only move through deposit, swap and withdraw transitions.
///
/// Invariant: `reserve0 == 0 && reserve1 == 0` exactly when
/// `total_supply == 0`: a pool is either empty or fully initialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolState {
    pub key: PoolKey,
    pub factory: Address,
    pub reserve0: u64,
    pub reserve1: u64,
    pub total_supply: u64,
    pub protocol_fee_bps: u16,
    pub lp_fee_bps: u16,
    pub referral_fee_bps: u16,
    /// Protocol fees accumulated per reserve side, awaiting withdrawal.
    pub collected_protocol_fee0: u64,
    pub collected_protocol_fee1: u64,
    pub is_active: bool,
}

impl PoolState {
    pub fn is_initialized(&self) -> bool {
        self.total_supply > 0
    }

    pub fn reserve(&self, side: usize) -> u64 {
        if side == 0 {
            self.reserve0
        } else {
            self.reserve1
        }
    }

    /// Rate normalizer for a side; the constant-product curve is flat.
    pub fn rate(&self, side: usize) -> u64 {
        match self.key.settings {
            Some(StableSettings { rate0, rate1, .. }) => {
                if side == 0 {
                    rate0
                } else {
                    rate1
                }
            }
            None => RATE_ONE,
        }
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + 102 + 32 + 5 * 8 + 3 * 2 + 1);
        write_state_header(&mut out, StateKind::Pool);
        self.key.write_to(&mut out);
        out.extend_from_slice(&self.factory.0);
        out.extend_from_slice(&self.reserve0.to_le_bytes());
        out.extend_from_slice(&self.reserve1.to_le_bytes());
        out.extend_from_slice(&self.total_supply.to_le_bytes());
        out.extend_from_slice(&self.protocol_fee_bps.to_le_bytes());
        out.extend_from_slice(&self.lp_fee_bps.to_le_bytes());
        out.extend_from_slice(&self.referral_fee_bps.to_le_bytes());
        out.extend_from_slice(&self.collected_protocol_fee0.to_le_bytes());
        out.extend_from_slice(&self.collected_protocol_fee1.to_le_bytes());
        put_bool(&mut out, self.is_active);
        out
    }

    pub fn unpack(bytes: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(bytes);
        read_state_header(&mut reader, StateKind::Pool)?;
        let key = reader.pool_key()?;
        let factory = reader.address()?;
        let reserve0 = reader.u64()?;
        let reserve1 = reader.u64()?;
        let total_supply = reader.u64()?;
        let protocol_fee_bps = reader.u16()?;
        let lp_fee_bps = reader.u16()?;
        let referral_fee_bps = reader.u16()?;
        let collected_protocol_fee0 = reader.u64()?;
        let collected_protocol_fee1 = reader.u64()?;
        let is_active = reader.bool()?;
        reader.finish()?;
        Ok(Self {
            key,
            factory,
            reserve0,
            reserve1,
            total_supply,
            protocol_fee_bps,
            lp_fee_bps,
            referral_fee_bps,
            collected_protocol_fee0,
            collected_protocol_fee1,
            is_active,
        })
    }
}
