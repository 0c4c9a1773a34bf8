use bytemuck_derive::{Pod, Zeroable};

use crate::address::Address;
use crate::error::{ensure, ProtocolError, ProtocolResult};

/// Length of the fixed asset encoding: tag, chain, hash, id.
pub const ASSET_LEN: usize = 38;

const TAG_NATIVE: u8 = 0;
const TAG_TOKEN: u8 = 1;
const TAG_CURRENCY: u8 = 2;

/// What a vault custodies and what a pool trades.
///
/// Equality is structural and the derived order is the canonical asset
/// order used to normalize unordered pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Asset {
    /// The ledger's own coin.
    Native,
    /// A fungible token, identified by the chain it lives on and the hash
    /// of its master actor.
    Token { chain: i8, hash: [u8; 32] },
    /// An externally settled currency rail.
    Currency { id: u32 },
}

/// Fixed-layout form of [`Asset`]. Unused fields are zero; decoding rejects
/// non-canonical padding so each asset has exactly one encoding.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct RawAsset {
    pub tag: u8,
    pub chain: u8,
    pub hash: [u8; 32],
    pub id: [u8; 4],
}

impl Asset {
    pub fn is_native(&self) -> bool {
        matches!(self, Asset::Native)
    }

    pub fn is_token(&self) -> bool {
        matches!(self, Asset::Token { .. })
    }

    /// Address of the external token master that answers the custody
    /// handshake for this asset. Only meaningful for the token variant.
    pub fn token_master(&self) -> Option<Address> {
        match self {
            Asset::Token { hash, .. } => Some(Address(*hash)),
            _ => None,
        }
    }

    pub fn to_raw(&self) -> RawAsset {
        match *self {
            Asset::Native => RawAsset {
                tag: TAG_NATIVE,
                chain: 0,
                hash: [0; 32],
                id: [0; 4],
            },
            Asset::Token { chain, hash } => RawAsset {
                tag: TAG_TOKEN,
                chain: chain as u8,
                hash,
                id: [0; 4],
            },
            Asset::Currency { id } => RawAsset {
                tag: TAG_CURRENCY,
                chain: 0,
                hash: [0; 32],
                id: id.to_le_bytes(),
            },
        }
    }

    pub fn from_raw(raw: &RawAsset) -> ProtocolResult<Self> {
        match raw.tag {
            TAG_NATIVE => {
                ensure(raw.chain == 0 && raw.hash == [0; 32] && raw.id == [0; 4], ProtocolError::Malformed)?;
                Ok(Asset::Native)
            }
            TAG_TOKEN => {
                ensure(raw.id == [0; 4], ProtocolError::Malformed)?;
                Ok(Asset::Token {
                    chain: raw.chain as i8,
                    hash: raw.hash,
                })
            }
            TAG_CURRENCY => {
                ensure(raw.chain == 0 && raw.hash == [0; 32], ProtocolError::Malformed)?;
                Ok(Asset::Currency {
                    id: u32::from_le_bytes(raw.id),
                })
            }
            _ => Err(ProtocolError::UnsupportedAmmOrAsset),
        }
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(bytemuck::bytes_of(&self.to_raw()));
    }

    pub fn to_bytes(&self) -> [u8; ASSET_LEN] {
        let mut bytes = [0u8; ASSET_LEN];
        bytes.copy_from_slice(bytemuck::bytes_of(&self.to_raw()));
        bytes
    }

    pub fn read_from(bytes: &[u8]) -> ProtocolResult<Self> {
        ensure(bytes.len() >= ASSET_LEN, ProtocolError::Malformed)?;
        let raw: &RawAsset =
            bytemuck::try_from_bytes(&bytes[..ASSET_LEN]).map_err(|_| ProtocolError::Malformed)?;
        Self::from_raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_all_variants() {
        let assets = [
            Asset::Native,
            Asset::Token { chain: 0, hash: [7; 32] },
            Asset::Token { chain: -1, hash: [9; 32] },
            Asset::Currency { id: 840 },
        ];
        for asset in assets {
            let bytes = asset.to_bytes();
            assert_eq!(Asset::read_from(&bytes).unwrap(), asset);
        }
    }

    #[test]
    fn rejects_noncanonical_padding() {
        let mut bytes = Asset::Native.to_bytes();
        bytes[5] = 1; // stray bit in the hash field
        assert_eq!(Asset::read_from(&bytes), Err(ProtocolError::Malformed));
    }

    #[test]
    fn canonical_order_is_total() {
        let native = Asset::Native;
        let token = Asset::Token { chain: 0, hash: [1; 32] };
        let currency = Asset::Currency { id: 1 };
        assert!(native < token);
        assert!(token < currency);

        let a = Asset::Token { chain: 0, hash: [1; 32] };
        let b = Asset::Token { chain: 0, hash: [2; 32] };
        assert!(a < b);
    }
}
