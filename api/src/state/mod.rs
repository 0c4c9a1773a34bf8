mod escrow;
mod factory;
mod pool;
mod vault;

pub use escrow::*;
pub use factory::*;
pub use pool::*;
pub use vault::*;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::codec::Reader;
use crate::error::{ensure, ProtocolError, ProtocolResult};

/// Discriminator for persisted actor state records.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
pub enum StateKind {
    Unknown = 0,
    Factory,
    Vault,
    Pool,
    Escrow,
}

/// Format version of every state record. Decoding rejects anything else.
pub const STATE_VERSION: u8 = 1;

pub(crate) fn write_state_header(out: &mut Vec<u8>, kind: StateKind) {
    out.push(kind.into());
    out.push(STATE_VERSION);
}

pub(crate) fn read_state_header(reader: &mut Reader<'_>, kind: StateKind) -> ProtocolResult {
    ensure(reader.u8()? == u8::from(kind), ProtocolError::Malformed)?;
    ensure(reader.u8()? == STATE_VERSION, ProtocolError::Malformed)
}
