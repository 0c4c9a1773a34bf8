use super::{read_state_header, write_state_header, StateKind};
use crate::address::Address;
use crate::asset::Asset;
use crate::codec::{put_bool, Reader};
use crate::error::ProtocolResult;

/// Per-asset custody actor state. The token-case vault stays inactive until
/// its custody sub-account is confirmed through the activation handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VaultState {
    pub asset: Asset,
    pub factory: Address,
    /// Custody sub-account on the external token rail; zero for the native
    /// vault, which custodies value directly on its own balance.
    pub custody: Address,
    pub is_active: bool,
}

impl VaultState {
    pub fn pack(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + 38 + 64 + 1);
        write_state_header(&mut out, StateKind::Vault);
        self.asset.write_to(&mut out);
        out.extend_from_slice(&self.factory.0);
        out.extend_from_slice(&self.custody.0);
        put_bool(&mut out, self.is_active);
        out
    }

    pub fn unpack(bytes: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(bytes);
        read_state_header(&mut reader, StateKind::Vault)?;
        let asset = reader.asset()?;
        let factory = reader.address()?;
        let custody = reader.address()?;
        let is_active = reader.bool()?;
        reader.finish()?;
        Ok(Self { asset, factory, custody, is_active })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_round_trip() {
        let state = VaultState {
            asset: Asset::Token { chain: 0, hash: [9; 32] },
            factory: Address([3; 32]),
            custody: Address([4; 32]),
            is_active: true,
        };
        assert_eq!(VaultState::unpack(&state.pack()).unwrap(), state);
    }
}
