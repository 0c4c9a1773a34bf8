use bytemuck_derive::{Pod, Zeroable};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::asset::{Asset, RawAsset};
use crate::error::{ensure, ProtocolError, ProtocolResult};

/// Length of the fixed pool-key encoding.
pub const POOL_KEY_LEN: usize = 102;

/// Trading-curve strategy, fixed at pool creation and part of the pool's
/// logical key (and therefore its address).
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, IntoPrimitive, TryFromPrimitive)]
pub enum AmmKind {
    ConstantProduct = 0,
    Stable = 1,
}

/// Stable-curve settings: amplification factor plus per-asset rate
/// normalizers scaled by [`crate::consts::RATE_ONE`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StableSettings {
    pub amp: u64,
    pub rate0: u64,
    pub rate1: u64,
}

/// Logical identity of a pool: the unordered asset pair, the curve kind,
/// and (for the stable curve) the curve settings. Construction normalizes
/// the pair so (A, B) and (B, A) produce the same key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolKey {
    pub asset0: Asset,
    pub asset1: Asset,
    pub amm: AmmKind,
    pub settings: Option<StableSettings>,
}

/// Fixed-layout form of [`PoolKey`].
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct RawPoolKey {
    pub asset0: RawAsset,
    pub asset1: RawAsset,
    pub amm: u8,
    pub has_settings: u8,
    pub amp: [u8; 8],
    pub rate0: [u8; 8],
    pub rate1: [u8; 8],
}

impl PoolKey {
    /// Builds a normalized key. Settings travel with their assets: when the
    /// pair swaps into canonical order, the rate normalizers swap too.
    pub fn new(a: Asset, b: Asset, amm: AmmKind, settings: Option<StableSettings>) -> Self {
        if b < a {
            let settings = settings.map(|s| StableSettings {
                amp: s.amp,
                rate0: s.rate1,
                rate1: s.rate0,
            });
            Self { asset0: b, asset1: a, amm, settings }
        } else {
            Self { asset0: a, asset1: b, amm, settings }
        }
    }

    /// Checks structural validity: distinct assets, settings present exactly
    /// for the stable kind, amplification and rates non-zero.
    pub fn validate(&self) -> ProtocolResult {
        ensure(self.asset0 != self.asset1, ProtocolError::UnsupportedAmmOrAsset)?;
        ensure(self.asset0 < self.asset1, ProtocolError::Malformed)?;
        match (self.amm, &self.settings) {
            (AmmKind::ConstantProduct, None) => Ok(()),
            (AmmKind::Stable, Some(s)) => {
                ensure(s.amp > 0 && s.rate0 > 0 && s.rate1 > 0, ProtocolError::UnsupportedAmmOrAsset)
            }
            _ => Err(ProtocolError::UnsupportedAmmOrAsset),
        }
    }

    /// Which side of the pair `asset` sits on, if any.
    pub fn side_of(&self, asset: &Asset) -> Option<usize> {
        if *asset == self.asset0 {
            Some(0)
        } else if *asset == self.asset1 {
            Some(1)
        } else {
            None
        }
    }

    pub fn asset(&self, side: usize) -> Asset {
        if side == 0 {
            self.asset0
        } else {
            self.asset1
        }
    }

    pub fn to_raw(&self) -> RawPoolKey {
        let (has_settings, amp, rate0, rate1) = match self.settings {
            Some(s) => (1, s.amp, s.rate0, s.rate1),
            None => (0, 0, 0, 0),
        };
        RawPoolKey {
            asset0: self.asset0.to_raw(),
            asset1: self.asset1.to_raw(),
            amm: self.amm.into(),
            has_settings,
            amp: amp.to_le_bytes(),
            rate0: rate0.to_le_bytes(),
            rate1: rate1.to_le_bytes(),
        }
    }

    pub fn from_raw(raw: &RawPoolKey) -> ProtocolResult<Self> {
        let amm = AmmKind::try_from(raw.amm).map_err(|_| ProtocolError::UnsupportedAmmOrAsset)?;
        let settings = match raw.has_settings {
            0 => {
                ensure(
                    raw.amp == [0; 8] && raw.rate0 == [0; 8] && raw.rate1 == [0; 8],
                    ProtocolError::Malformed,
                )?;
                None
            }
            1 => Some(StableSettings {
                amp: u64::from_le_bytes(raw.amp),
                rate0: u64::from_le_bytes(raw.rate0),
                rate1: u64::from_le_bytes(raw.rate1),
            }),
            _ => return Err(ProtocolError::Malformed),
        };
        let key = Self {
            asset0: Asset::from_raw(&raw.asset0)?,
            asset1: Asset::from_raw(&raw.asset1)?,
            amm,
            settings,
        };
        key.validate()?;
        Ok(key)
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(bytemuck::bytes_of(&self.to_raw()));
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        bytemuck::bytes_of(&self.to_raw()).to_vec()
    }

    pub fn read_from(bytes: &[u8]) -> ProtocolResult<Self> {
        ensure(bytes.len() >= POOL_KEY_LEN, ProtocolError::Malformed)?;
        let raw: &RawPoolKey = bytemuck::try_from_bytes(&bytes[..POOL_KEY_LEN])
            .map_err(|_| ProtocolError::Malformed)?;
        Self::from_raw(raw)
    }
}
