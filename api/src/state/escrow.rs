use num_enum::{IntoPrimitive, TryFromPrimitive};

use super::{read_state_header, write_state_header, StateKind};
use crate::address::Address;
use crate::codec::{put_bool, put_payload, Reader};
use crate::error::{ProtocolError, ProtocolResult};
use crate::pool_key::PoolKey;

/// Which escrow protocol an actor runs: steady-state deposits or the
/// first-ever deposit that bootstraps a pool.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
pub enum EscrowKind {
    Depository = 0,
    PoolCreator = 1,
}

/// Two-sided escrow state. The actor exists only between the first side's
/// arrival and the combined forward (or refund); its address is a pure
/// function of (owner, key), so both sides find it without coordination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EscrowState {
    pub kind: EscrowKind,
    pub owner: Address,
    pub key: PoolKey,
    pub side0: u64,
    pub side1: u64,
    pub filled0: bool,
    pub filled1: bool,
    pub min_liquidity: u64,
    pub deadline: u64,
    pub recipient: Address,
    pub success_payload: Vec<u8>,
    pub failure_payload: Vec<u8>,
}

impl EscrowState {
    pub fn pending(kind: EscrowKind, owner: Address, key: PoolKey) -> Self {
        Self {
            kind,
            owner,
            key,
            side0: 0,
            side1: 0,
            filled0: false,
            filled1: false,
            min_liquidity: 0,
            deadline: 0,
            recipient: Address::ZERO,
            success_payload: Vec::new(),
            failure_payload: Vec::new(),
        }
    }

    pub fn filled(&self, side: usize) -> bool {
        if side == 0 {
            self.filled0
        } else {
            self.filled1
        }
    }

    pub fn fill(&mut self, side: usize, amount: u64) {
        if side == 0 {
            self.side0 = amount;
            self.filled0 = true;
        } else {
            self.side1 = amount;
            self.filled1 = true;
        }
    }

    pub fn both_filled(&self) -> bool {
        self.filled0 && self.filled1
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(128);
        write_state_header(&mut out, StateKind::Escrow);
        out.push(self.kind.into());
        out.extend_from_slice(&self.owner.0);
        self.key.write_to(&mut out);
        out.extend_from_slice(&self.side0.to_le_bytes());
        out.extend_from_slice(&self.side1.to_le_bytes());
        put_bool(&mut out, self.filled0);
        put_bool(&mut out, self.filled1);
        out.extend_from_slice(&self.min_liquidity.to_le_bytes());
        out.extend_from_slice(&self.deadline.to_le_bytes());
        out.extend_from_slice(&self.recipient.0);
        put_payload(&mut out, &self.success_payload);
        put_payload(&mut out, &self.failure_payload);
        out
    }

    pub fn unpack(bytes: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(bytes);
        read_state_header(&mut reader, StateKind::Escrow)?;
        let kind = EscrowKind::try_from(reader.u8()?).map_err(|_| ProtocolError::Malformed)?;
        let owner = reader.address()?;
        let key = reader.pool_key()?;
        let side0 = reader.u64()?;
        let side1 = reader.u64()?;
        let filled0 = reader.bool()?;
        let filled1 = reader.bool()?;
        let min_liquidity = reader.u64()?;
        let deadline = reader.u64()?;
        let recipient = reader.address()?;
        let success_payload = reader.payload()?;
        let failure_payload = reader.payload()?;
        reader.finish()?;
        Ok(Self {
            kind,
            owner,
            key,
            side0,
            side1,
            filled0,
            filled1,
            min_liquidity,
            deadline,
            recipient,
            success_payload,
            failure_payload,
        })
    }
}
