//! Cursor-style decoding for the variable-length tails of messages and
//! state records. Fixed headers go through `bytemuck`; everything that
//! carries a chain or an opaque payload is read field-by-field here.

use crate::address::Address;
use crate::asset::{Asset, ASSET_LEN};
use crate::error::{ensure, ProtocolError, ProtocolResult};
use crate::pool_key::{PoolKey, POOL_KEY_LEN};

pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn take(&mut self, len: usize) -> ProtocolResult<&'a [u8]> {
        let end = self.pos.checked_add(len).ok_or(ProtocolError::Malformed)?;
        ensure(end <= self.buf.len(), ProtocolError::Malformed)?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn u8(&mut self) -> ProtocolResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> ProtocolResult<u16> {
        Ok(u16::from_le_bytes(self.take(2)?.try_into().unwrap()))
    }

    pub fn u32(&mut self) -> ProtocolResult<u32> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn u64(&mut self) -> ProtocolResult<u64> {
        Ok(u64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    pub fn hash(&mut self) -> ProtocolResult<[u8; 32]> {
        Ok(self.take(32)?.try_into().unwrap())
    }

    pub fn address(&mut self) -> ProtocolResult<Address> {
        Ok(Address(self.hash()?))
    }

    pub fn asset(&mut self) -> ProtocolResult<Asset> {
        Asset::read_from(self.take(ASSET_LEN)?)
    }

    pub fn pool_key(&mut self) -> ProtocolResult<PoolKey> {
        PoolKey::read_from(self.take(POOL_KEY_LEN)?)
    }

    /// A u16-length-prefixed byte string.
    pub fn payload(&mut self) -> ProtocolResult<Vec<u8>> {
        let len = self.u16()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    pub fn bool(&mut self) -> ProtocolResult<bool> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(ProtocolError::Malformed),
        }
    }

    /// Decoding must consume the record exactly.
    pub fn finish(self) -> ProtocolResult {
        ensure(self.pos == self.buf.len(), ProtocolError::Malformed)
    }
}

pub(crate) fn put_payload(out: &mut Vec<u8>, bytes: &[u8]) {
    debug_assert!(bytes.len() <= u16::MAX as usize);
    out.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
    out.extend_from_slice(bytes);
}

pub(crate) fn put_bool(out: &mut Vec<u8>, value: bool) {
    out.push(value as u8);
}
