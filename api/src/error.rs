use num_enum::{IntoPrimitive, TryFromPrimitive};
use thiserror::Error;

/// Protocol failure reasons. The numeric value travels on the wire as the
/// bounce reason code, so variants are append-only.
#[repr(u32)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error, IntoPrimitive, TryFromPrimitive)]
pub enum ProtocolError {
    #[error("unknown failure")]
    Unknown = 0,

    #[error("caller is not authorized")]
    Authorization = 1,
    #[error("deadline exceeded")]
    DeadlineExceeded = 2,
    #[error("output below caller minimum")]
    Slippage = 3,
    #[error("insufficient liquidity")]
    InsufficientLiquidity = 4,
    #[error("pool already initialized")]
    AlreadyInitialized = 5,
    #[error("hop does not resolve to a pool for this asset")]
    UnknownRouteTarget = 6,
    #[error("unsupported amm kind or asset")]
    UnsupportedAmmOrAsset = 7,

    #[error("vault is not active")]
    InactiveVault = 8,
    #[error("malformed message")]
    Malformed = 9,
    #[error("attached value is insufficient")]
    InsufficientValue = 10,
    #[error("arithmetic overflow")]
    MathOverflow = 11,
    #[error("pool is not active")]
    InactivePool = 12,
}

pub type ProtocolResult<T = ()> = Result<T, ProtocolError>;

/// Fails with `err` when `condition` does not hold.
pub fn ensure(condition: bool, err: ProtocolError) -> ProtocolResult {
    if condition {
        Ok(())
    } else {
        Err(err)
    }
}

impl ProtocolError {
    /// Decodes a wire reason code, mapping unknown codes to `Unknown`.
    pub fn from_code(code: u32) -> Self {
        Self::try_from(code).unwrap_or(Self::Unknown)
    }
}
