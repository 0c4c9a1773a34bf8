use super::{read_state_header, write_state_header, StateKind};
use crate::address::{Address, TemplateSet};
use crate::codec::Reader;
use crate::error::ProtocolResult;
use crate::params::ProtocolParams;

/// Root registry state: administrative capabilities, protocol parameters,
/// and the code templates future deployments go out under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FactoryState {
    pub admin: Address,
    pub withdrawer: Address,
    pub params: ProtocolParams,
    pub templates: TemplateSet,
    pub code_version: u32,
}

impl FactoryState {
    pub fn pack(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + 64 + 16 + 6 * 32 + 4);
        write_state_header(&mut out, StateKind::Factory);
        out.extend_from_slice(&self.admin.0);
        out.extend_from_slice(&self.withdrawer.0);
        out.extend_from_slice(&self.params.min_initial_liquidity.to_le_bytes());
        out.extend_from_slice(&self.params.locked_liquidity.to_le_bytes());
        out.extend_from_slice(&self.params.default_protocol_fee_bps.to_le_bytes());
        out.extend_from_slice(&self.params.default_lp_fee_bps.to_le_bytes());
        out.extend_from_slice(&self.params.referral_fee_bps.to_le_bytes());
        out.extend_from_slice(&self.templates.vault);
        out.extend_from_slice(&self.templates.pool);
        out.extend_from_slice(&self.templates.depository);
        out.extend_from_slice(&self.templates.pool_creator);
        out.extend_from_slice(&self.templates.liquidity_wallet);
        out.extend_from_slice(&self.templates.currency_gateway);
        out.extend_from_slice(&self.code_version.to_le_bytes());
        out
    }

    pub fn unpack(bytes: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(bytes);
        read_state_header(&mut reader, StateKind::Factory)?;
        let admin = reader.address()?;
        let withdrawer = reader.address()?;
        let params = ProtocolParams {
            min_initial_liquidity: reader.u64()?,
            locked_liquidity: reader.u64()?,
            default_protocol_fee_bps: reader.u16()?,
            default_lp_fee_bps: reader.u16()?,
            referral_fee_bps: reader.u16()?,
        };
        let templates = TemplateSet {
            vault: reader.hash()?,
            pool: reader.hash()?,
            depository: reader.hash()?,
            pool_creator: reader.hash()?,
            liquidity_wallet: reader.hash()?,
            currency_gateway: reader.hash()?,
        };
        let code_version = reader.u32()?;
        reader.finish()?;
        Ok(Self { admin, withdrawer, params, templates, code_version })
    }
}
