//! Wire messages: fixed-layout tagged binary records. Every body starts
//! with a 32-bit little-endian operation tag; the swap family carries a
//! trailing chain of fixed-size hop records, and notifications carry an
//! opaque payload owned by the caller.

use bytemuck_derive::{Pod, Zeroable};
use num_enum::TryFromPrimitive;

use crate::address::{
    find_depository_address, find_pool_address, find_pool_creator_address, find_vault_address,
    Address, TemplateSet,
};
use crate::asset::Asset;
use crate::codec::{put_bool, put_payload, Reader};
use crate::consts::FACTORY_ID;
use crate::error::{ensure, ProtocolError, ProtocolResult};
use crate::pool_key::PoolKey;

/// Operation tags. Append-only; the numeric value is the wire tag.
#[repr(u32)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, TryFromPrimitive)]
pub enum MessageType {
    Unknown = 0,

    // vault-facing user operations
    Swap,
    DepositLiquidity,
    CreatePool,
    ActivateVault,

    // fungible-token standard boundary
    Transfer,
    TransferNotification,
    BurnNotification,
    ProvideCustody,
    TakeCustody,

    // internal protocol
    SwapInternal,
    DepositInternal,
    EscrowDeposit,
    WithdrawFunds,
    Payout,
    PayoutNotification,
    MintLiquidity,
    UpdatePoolInternal,

    // factory administration
    CreateVault,
    UpdateAdmin,
    UpdateWithdrawer,
    UpdateCodeTemplates,
    UpdatePool,
    Withdraw,
}

/// Reads the operation tag of a message body; short or unrecognized bodies
/// read as `Unknown`.
pub fn message_type(body: &[u8]) -> MessageType {
    if body.len() < 4 {
        return MessageType::Unknown;
    }
    let tag = u32::from_le_bytes(body[..4].try_into().unwrap());
    MessageType::try_from(tag).unwrap_or(MessageType::Unknown)
}

/// The body after the operation tag.
pub fn message_payload(body: &[u8]) -> &[u8] {
    if body.len() < 4 {
        &[]
    } else {
        &body[4..]
    }
}

fn tagged(ty: MessageType) -> Vec<u8> {
    (ty as u32).to_le_bytes().to_vec()
}

/// Tag-only body for operations without fields.
pub fn empty_body(ty: MessageType) -> Vec<u8> {
    tagged(ty)
}

// ---------------------------------------------------------------------------
// Sender proofs

/// Names the logical identity behind a sender address. The receiver
/// re-derives the address from the claim and compares it to the envelope
/// sender, so no actor needs a table of its peers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SenderProof {
    Vault { asset: Asset },
    Pool { key: PoolKey },
    Depository { owner: Address, key: PoolKey },
    PoolCreator { owner: Address, key: PoolKey },
    Factory,
}

const PROOF_VAULT: u8 = 1;
const PROOF_POOL: u8 = 2;
const PROOF_DEPOSITORY: u8 = 3;
const PROOF_POOL_CREATOR: u8 = 4;
const PROOF_FACTORY: u8 = 5;

impl SenderProof {
    /// The address this proof claims, under the shipped template set.
    pub fn resolve(&self) -> Address {
        match self {
            SenderProof::Vault { asset } => find_vault_address(asset),
            SenderProof::Pool { key } => find_pool_address(key),
            SenderProof::Depository { owner, key } => find_depository_address(owner, key),
            SenderProof::PoolCreator { owner, key } => find_pool_creator_address(owner, key),
            SenderProof::Factory => FACTORY_ID,
        }
    }

    /// Checks that `sender` is the address this proof claims.
    pub fn verify(&self, sender: &Address) -> ProtocolResult {
        ensure(self.resolve() == *sender, ProtocolError::Authorization)
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            SenderProof::Vault { asset } => {
                out.push(PROOF_VAULT);
                asset.write_to(out);
            }
            SenderProof::Pool { key } => {
                out.push(PROOF_POOL);
                key.write_to(out);
            }
            SenderProof::Depository { owner, key } => {
                out.push(PROOF_DEPOSITORY);
                out.extend_from_slice(&owner.0);
                key.write_to(out);
            }
            SenderProof::PoolCreator { owner, key } => {
                out.push(PROOF_POOL_CREATOR);
                out.extend_from_slice(&owner.0);
                key.write_to(out);
            }
            SenderProof::Factory => out.push(PROOF_FACTORY),
        }
    }

    fn read_from(reader: &mut Reader<'_>) -> ProtocolResult<Self> {
        match reader.u8()? {
            PROOF_VAULT => Ok(SenderProof::Vault { asset: reader.asset()? }),
            PROOF_POOL => Ok(SenderProof::Pool { key: reader.pool_key()? }),
            PROOF_DEPOSITORY => Ok(SenderProof::Depository {
                owner: reader.address()?,
                key: reader.pool_key()?,
            }),
            PROOF_POOL_CREATOR => Ok(SenderProof::PoolCreator {
                owner: reader.address()?,
                key: reader.pool_key()?,
            }),
            PROOF_FACTORY => Ok(SenderProof::Factory),
            _ => Err(ProtocolError::Malformed),
        }
    }
}

// ---------------------------------------------------------------------------
// Swap routing records

/// One hop of a swap route: the pool to traverse and the minimum output
/// the caller will accept from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapStep {
    pub pool: Address,
    pub limit: u64,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct RawSwapStep {
    pub pool: Address,
    pub limit: [u8; 8],
}

impl SwapStep {
    pub fn to_raw(&self) -> RawSwapStep {
        RawSwapStep { pool: self.pool, limit: self.limit.to_le_bytes() }
    }

    pub fn from_raw(raw: &RawSwapStep) -> Self {
        Self { pool: raw.pool, limit: u64::from_le_bytes(raw.limit) }
    }
}

fn write_steps(out: &mut Vec<u8>, steps: &[SwapStep]) {
    debug_assert!(steps.len() <= u16::MAX as usize);
    out.extend_from_slice(&(steps.len() as u16).to_le_bytes());
    for step in steps {
        out.extend_from_slice(bytemuck::bytes_of(&step.to_raw()));
    }
}

fn read_steps(reader: &mut Reader<'_>) -> ProtocolResult<Vec<SwapStep>> {
    let count = reader.u16()? as usize;
    let mut steps = Vec::with_capacity(count);
    for _ in 0..count {
        let bytes = reader.take(std::mem::size_of::<RawSwapStep>())?;
        let raw: &RawSwapStep =
            bytemuck::try_from_bytes(bytes).map_err(|_| ProtocolError::Malformed)?;
        steps.push(SwapStep::from_raw(raw));
    }
    Ok(steps)
}

/// Parameters shared by every hop of a swap: expiry, payout target,
/// optional referral, and the notifications to attach on settlement.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SwapParams {
    /// Unix seconds; zero means no deadline.
    pub deadline: u64,
    /// Payout target; zero resolves to the original sender at vault entry.
    pub recipient: Address,
    /// Referral fee beneficiary; zero disables the referral component.
    pub referral: Address,
    pub success_payload: Vec<u8>,
    pub failure_payload: Vec<u8>,
}

impl SwapParams {
    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.deadline.to_le_bytes());
        out.extend_from_slice(&self.recipient.0);
        out.extend_from_slice(&self.referral.0);
        put_payload(out, &self.success_payload);
        put_payload(out, &self.failure_payload);
    }

    fn read_from(reader: &mut Reader<'_>) -> ProtocolResult<Self> {
        Ok(Self {
            deadline: reader.u64()?,
            recipient: reader.address()?,
            referral: reader.address()?,
            success_payload: reader.payload()?,
            failure_payload: reader.payload()?,
        })
    }
}

// ---------------------------------------------------------------------------
// Vault-facing user operations

/// `Swap`: sent to a vault together with the input value; the vault
/// forwards the chain to the first hop's pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapMsg {
    pub steps: Vec<SwapStep>,
    pub params: SwapParams,
}

impl SwapMsg {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = tagged(MessageType::Swap);
        write_steps(&mut out, &self.steps);
        self.params.write_to(&mut out);
        out
    }

    pub fn try_from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(data);
        let steps = read_steps(&mut reader)?;
        let params = SwapParams::read_from(&mut reader)?;
        reader.finish()?;
        Ok(Self { steps, params })
    }
}

/// `DepositLiquidity`: one side of a two-sided deposit, addressed to the
/// vault of the asset being deposited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepositLiquidityMsg {
    pub key: PoolKey,
    pub min_liquidity: u64,
    pub deadline: u64,
    pub recipient: Address,
    pub success_payload: Vec<u8>,
    pub failure_payload: Vec<u8>,
}

impl DepositLiquidityMsg {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = tagged(MessageType::DepositLiquidity);
        self.key.write_to(&mut out);
        out.extend_from_slice(&self.min_liquidity.to_le_bytes());
        out.extend_from_slice(&self.deadline.to_le_bytes());
        out.extend_from_slice(&self.recipient.0);
        put_payload(&mut out, &self.success_payload);
        put_payload(&mut out, &self.failure_payload);
        out
    }

    pub fn try_from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(data);
        let msg = Self {
            key: reader.pool_key()?,
            min_liquidity: reader.u64()?,
            deadline: reader.u64()?,
            recipient: reader.address()?,
            success_payload: reader.payload()?,
            failure_payload: reader.payload()?,
        };
        reader.finish()?;
        Ok(msg)
    }
}

/// `CreatePool`: one side of the bootstrap deposit that creates a pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatePoolMsg {
    pub key: PoolKey,
    pub recipient: Address,
    pub success_payload: Vec<u8>,
    pub failure_payload: Vec<u8>,
}

impl CreatePoolMsg {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = tagged(MessageType::CreatePool);
        self.key.write_to(&mut out);
        out.extend_from_slice(&self.recipient.0);
        put_payload(&mut out, &self.success_payload);
        put_payload(&mut out, &self.failure_payload);
        out
    }

    pub fn try_from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(data);
        let msg = Self {
            key: reader.pool_key()?,
            recipient: reader.address()?,
            success_payload: reader.payload()?,
            failure_payload: reader.payload()?,
        };
        reader.finish()?;
        Ok(msg)
    }
}

/// `ActivateVault`: admin-side confirmation of a custody sub-account. The
/// factory validates and relays the same body to the asset's vault.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivateVaultMsg {
    pub asset: Asset,
    pub custody: Address,
}

impl ActivateVaultMsg {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = tagged(MessageType::ActivateVault);
        self.asset.write_to(&mut out);
        out.extend_from_slice(&self.custody.0);
        out
    }

    pub fn try_from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(data);
        let msg = Self { asset: reader.asset()?, custody: reader.address()? };
        reader.finish()?;
        Ok(msg)
    }
}

// ---------------------------------------------------------------------------
// Fungible-token standard boundary

/// `Transfer`: instructs a custody account (or wallet) to move tokens.
/// This is the outbound shape of the external token standard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferMsg {
    pub amount: u64,
    pub recipient: Address,
    pub payload: Vec<u8>,
}

impl TransferMsg {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = tagged(MessageType::Transfer);
        out.extend_from_slice(&self.amount.to_le_bytes());
        out.extend_from_slice(&self.recipient.0);
        put_payload(&mut out, &self.payload);
        out
    }

    pub fn try_from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(data);
        let msg = Self {
            amount: reader.u64()?,
            recipient: reader.address()?,
            payload: reader.payload()?,
        };
        reader.finish()?;
        Ok(msg)
    }
}

/// `TransferNotification`: a custody account telling its vault that tokens
/// arrived, with the user's instruction embedded as the forward payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferNotificationMsg {
    pub amount: u64,
    pub sender: Address,
    pub payload: Vec<u8>,
}

impl TransferNotificationMsg {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = tagged(MessageType::TransferNotification);
        out.extend_from_slice(&self.amount.to_le_bytes());
        out.extend_from_slice(&self.sender.0);
        put_payload(&mut out, &self.payload);
        out
    }

    pub fn try_from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(data);
        let msg = Self {
            amount: reader.u64()?,
            sender: reader.address()?,
            payload: reader.payload()?,
        };
        reader.finish()?;
        Ok(msg)
    }
}

/// `BurnNotification`: a liquidity wallet telling its pool that LP tokens
/// were burned; triggers the pro-rata withdrawal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BurnNotificationMsg {
    pub amount: u64,
    pub owner: Address,
    /// Zero resolves to the owner.
    pub recipient: Address,
    pub success_payload: Vec<u8>,
    pub failure_payload: Vec<u8>,
}

impl BurnNotificationMsg {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = tagged(MessageType::BurnNotification);
        out.extend_from_slice(&self.amount.to_le_bytes());
        out.extend_from_slice(&self.owner.0);
        out.extend_from_slice(&self.recipient.0);
        put_payload(&mut out, &self.success_payload);
        put_payload(&mut out, &self.failure_payload);
        out
    }

    pub fn try_from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(data);
        let msg = Self {
            amount: reader.u64()?,
            owner: reader.address()?,
            recipient: reader.address()?,
            success_payload: reader.payload()?,
            failure_payload: reader.payload()?,
        };
        reader.finish()?;
        Ok(msg)
    }
}

/// `TakeCustody`: the token master's answer to `ProvideCustody`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TakeCustodyMsg {
    pub custody: Address,
}

impl TakeCustodyMsg {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = tagged(MessageType::TakeCustody);
        out.extend_from_slice(&self.custody.0);
        out
    }

    pub fn try_from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(data);
        let msg = Self { custody: reader.address()? };
        reader.finish()?;
        Ok(msg)
    }
}

// ---------------------------------------------------------------------------
// Internal protocol

/// `SwapInternal`: one hop of a routed swap, sent by a vault (first hop)
/// or the previous pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapInternalMsg {
    pub proof: SenderProof,
    pub asset_in: Asset,
    pub amount: u64,
    /// The original sender, for refunds that walk back to the entry vault.
    pub sender: Address,
    pub steps: Vec<SwapStep>,
    pub params: SwapParams,
}

impl SwapInternalMsg {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = tagged(MessageType::SwapInternal);
        self.proof.write_to(&mut out);
        self.asset_in.write_to(&mut out);
        out.extend_from_slice(&self.amount.to_le_bytes());
        out.extend_from_slice(&self.sender.0);
        write_steps(&mut out, &self.steps);
        self.params.write_to(&mut out);
        out
    }

    pub fn try_from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(data);
        let msg = Self {
            proof: SenderProof::read_from(&mut reader)?,
            asset_in: reader.asset()?,
            amount: reader.u64()?,
            sender: reader.address()?,
            steps: read_steps(&mut reader)?,
            params: SwapParams::read_from(&mut reader)?,
        };
        reader.finish()?;
        Ok(msg)
    }
}

/// `DepositInternal`: the combined two-sided deposit an escrow forwards to
/// its pool once both sides arrived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepositInternalMsg {
    pub owner: Address,
    pub amount0: u64,
    pub amount1: u64,
    pub min_liquidity: u64,
    pub deadline: u64,
    pub recipient: Address,
    /// True when sent by a pool creator: this deposit initializes the pool.
    pub bootstrap: bool,
    pub success_payload: Vec<u8>,
    pub failure_payload: Vec<u8>,
}

impl DepositInternalMsg {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = tagged(MessageType::DepositInternal);
        out.extend_from_slice(&self.owner.0);
        out.extend_from_slice(&self.amount0.to_le_bytes());
        out.extend_from_slice(&self.amount1.to_le_bytes());
        out.extend_from_slice(&self.min_liquidity.to_le_bytes());
        out.extend_from_slice(&self.deadline.to_le_bytes());
        out.extend_from_slice(&self.recipient.0);
        put_bool(&mut out, self.bootstrap);
        put_payload(&mut out, &self.success_payload);
        put_payload(&mut out, &self.failure_payload);
        out
    }

    pub fn try_from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(data);
        let msg = Self {
            owner: reader.address()?,
            amount0: reader.u64()?,
            amount1: reader.u64()?,
            min_liquidity: reader.u64()?,
            deadline: reader.u64()?,
            recipient: reader.address()?,
            bootstrap: reader.bool()?,
            success_payload: reader.payload()?,
            failure_payload: reader.payload()?,
        };
        reader.finish()?;
        Ok(msg)
    }
}

/// `EscrowDeposit`: one side of a deposit, sent by the asset's vault to
/// the escrow address derived from (owner, key).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EscrowDepositMsg {
    pub side: u8,
    pub amount: u64,
    pub owner: Address,
    pub key: PoolKey,
    pub min_liquidity: u64,
    pub deadline: u64,
    pub recipient: Address,
    pub success_payload: Vec<u8>,
    pub failure_payload: Vec<u8>,
}

impl EscrowDepositMsg {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = tagged(MessageType::EscrowDeposit);
        out.push(self.side);
        out.extend_from_slice(&self.amount.to_le_bytes());
        out.extend_from_slice(&self.owner.0);
        self.key.write_to(&mut out);
        out.extend_from_slice(&self.min_liquidity.to_le_bytes());
        out.extend_from_slice(&self.deadline.to_le_bytes());
        out.extend_from_slice(&self.recipient.0);
        put_payload(&mut out, &self.success_payload);
        put_payload(&mut out, &self.failure_payload);
        out
    }

    pub fn try_from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(data);
        let msg = Self {
            side: reader.u8()?,
            amount: reader.u64()?,
            owner: reader.address()?,
            key: reader.pool_key()?,
            min_liquidity: reader.u64()?,
            deadline: reader.u64()?,
            recipient: reader.address()?,
            success_payload: reader.payload()?,
            failure_payload: reader.payload()?,
        };
        reader.finish()?;
        ensure(msg.side <= 1, ProtocolError::Malformed)?;
        Ok(msg)
    }
}

/// `Payout`: instructs a vault to pay out custody to a recipient. Only
/// senders whose proof resolves are obeyed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PayoutMsg {
    pub proof: SenderProof,
    pub recipient: Address,
    pub amount: u64,
    pub payload: Vec<u8>,
}

impl PayoutMsg {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = tagged(MessageType::Payout);
        self.proof.write_to(&mut out);
        out.extend_from_slice(&self.recipient.0);
        out.extend_from_slice(&self.amount.to_le_bytes());
        put_payload(&mut out, &self.payload);
        out
    }

    pub fn try_from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(data);
        let msg = Self {
            proof: SenderProof::read_from(&mut reader)?,
            recipient: reader.address()?,
            amount: reader.u64()?,
            payload: reader.payload()?,
        };
        reader.finish()?;
        Ok(msg)
    }
}

/// `PayoutNotification`: rides on a native-value payout so the recipient
/// can correlate it; the payload is whatever the caller asked to receive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PayoutNotificationMsg {
    pub payload: Vec<u8>,
}

impl PayoutNotificationMsg {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = tagged(MessageType::PayoutNotification);
        put_payload(&mut out, &self.payload);
        out
    }

    pub fn try_from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(data);
        let msg = Self { payload: reader.payload()? };
        reader.finish()?;
        Ok(msg)
    }
}

/// `MintLiquidity`: the pool crediting LP tokens to an owner's wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintLiquidityMsg {
    pub amount: u64,
    pub owner: Address,
    pub payload: Vec<u8>,
}

impl MintLiquidityMsg {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = tagged(MessageType::MintLiquidity);
        out.extend_from_slice(&self.amount.to_le_bytes());
        out.extend_from_slice(&self.owner.0);
        put_payload(&mut out, &self.payload);
        out
    }

    pub fn try_from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(data);
        let msg = Self {
            amount: reader.u64()?,
            owner: reader.address()?,
            payload: reader.payload()?,
        };
        reader.finish()?;
        Ok(msg)
    }
}

/// Fee/activity changes a pool accepts from its factory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdatePoolInternalMsg {
    pub set_fees: bool,
    pub protocol_fee_bps: u16,
    pub lp_fee_bps: u16,
    pub set_active: bool,
    pub is_active: bool,
}

impl UpdatePoolInternalMsg {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = tagged(MessageType::UpdatePoolInternal);
        put_bool(&mut out, self.set_fees);
        out.extend_from_slice(&self.protocol_fee_bps.to_le_bytes());
        out.extend_from_slice(&self.lp_fee_bps.to_le_bytes());
        put_bool(&mut out, self.set_active);
        put_bool(&mut out, self.is_active);
        out
    }

    pub fn try_from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(data);
        let msg = Self {
            set_fees: reader.bool()?,
            protocol_fee_bps: reader.u16()?,
            lp_fee_bps: reader.u16()?,
            set_active: reader.bool()?,
            is_active: reader.bool()?,
        };
        reader.finish()?;
        Ok(msg)
    }
}

// ---------------------------------------------------------------------------
// Factory administration

/// `CreateVault`: deploys the vault for an asset; open to anyone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreateVaultMsg {
    pub asset: Asset,
}

impl CreateVaultMsg {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = tagged(MessageType::CreateVault);
        self.asset.write_to(&mut out);
        out
    }

    pub fn try_from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(data);
        let msg = Self { asset: reader.asset()? };
        reader.finish()?;
        Ok(msg)
    }
}

/// `UpdateAdmin` / `UpdateWithdrawer`: capability rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateAdminMsg {
    pub admin: Address,
}

impl UpdateAdminMsg {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = tagged(MessageType::UpdateAdmin);
        out.extend_from_slice(&self.admin.0);
        out
    }

    pub fn try_from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(data);
        let msg = Self { admin: reader.address()? };
        reader.finish()?;
        Ok(msg)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateWithdrawerMsg {
    pub withdrawer: Address,
}

impl UpdateWithdrawerMsg {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = tagged(MessageType::UpdateWithdrawer);
        out.extend_from_slice(&self.withdrawer.0);
        out
    }

    pub fn try_from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(data);
        let msg = Self { withdrawer: reader.address()? };
        reader.finish()?;
        Ok(msg)
    }
}

/// `UpdateCodeTemplates`: rotates the template set used for future
/// deployments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateCodeTemplatesMsg {
    pub templates: TemplateSet,
    pub code_version: u32,
}

impl UpdateCodeTemplatesMsg {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = tagged(MessageType::UpdateCodeTemplates);
        out.extend_from_slice(&self.templates.vault);
        out.extend_from_slice(&self.templates.pool);
        out.extend_from_slice(&self.templates.depository);
        out.extend_from_slice(&self.templates.pool_creator);
        out.extend_from_slice(&self.templates.liquidity_wallet);
        out.extend_from_slice(&self.templates.currency_gateway);
        out.extend_from_slice(&self.code_version.to_le_bytes());
        out
    }

    pub fn try_from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(data);
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
        Ok(Self { templates, code_version })
    }
}

/// `UpdatePool`: admin-side fee/activity change, forwarded to the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdatePoolMsg {
    pub key: PoolKey,
    pub set_fees: bool,
    pub protocol_fee_bps: u16,
    pub lp_fee_bps: u16,
    pub set_active: bool,
    pub is_active: bool,
}

impl UpdatePoolMsg {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = tagged(MessageType::UpdatePool);
        self.key.write_to(&mut out);
        put_bool(&mut out, self.set_fees);
        out.extend_from_slice(&self.protocol_fee_bps.to_le_bytes());
        out.extend_from_slice(&self.lp_fee_bps.to_le_bytes());
        put_bool(&mut out, self.set_active);
        put_bool(&mut out, self.is_active);
        out
    }

    pub fn try_from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(data);
        let msg = Self {
            key: reader.pool_key()?,
            set_fees: reader.bool()?,
            protocol_fee_bps: reader.u16()?,
            lp_fee_bps: reader.u16()?,
            set_active: reader.bool()?,
            is_active: reader.bool()?,
        };
        reader.finish()?;
        Ok(msg)
    }
}

/// `Withdraw`: withdrawer-gated payout of protocol custody.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WithdrawMsg {
    pub asset: Asset,
    pub amount: u64,
    pub to: Address,
}

impl WithdrawMsg {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = tagged(MessageType::Withdraw);
        self.asset.write_to(&mut out);
        out.extend_from_slice(&self.amount.to_le_bytes());
        out.extend_from_slice(&self.to.0);
        out
    }

    pub fn try_from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut reader = Reader::new(data);
        let msg = Self {
            asset: reader.asset()?,
            amount: reader.u64()?,
            to: reader.address()?,
        };
        reader.finish()?;
        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool_key::AmmKind;

    fn token(byte: u8) -> Asset {
        Asset::Token { chain: 0, hash: [byte; 32] }
    }

    #[test]
    fn tag_is_read_back() {
        let msg = CreateVaultMsg { asset: Asset::Native };
        let bytes = msg.to_bytes();
        assert_eq!(message_type(&bytes), MessageType::CreateVault);
        assert_eq!(
            CreateVaultMsg::try_from_bytes(message_payload(&bytes)).unwrap(),
            msg
        );
    }

    #[test]
    fn swap_chain_round_trip() {
        let key = PoolKey::new(token(1), token(2), AmmKind::ConstantProduct, None);
        let msg = SwapInternalMsg {
            proof: SenderProof::Vault { asset: token(1) },
            asset_in: token(1),
            amount: 5_000,
            sender: Address([7; 32]),
            steps: vec![
                SwapStep { pool: find_pool_address(&key), limit: 10 },
                SwapStep { pool: Address([9; 32]), limit: 0 },
            ],
            params: SwapParams {
                deadline: 100,
                recipient: Address([7; 32]),
                referral: Address::ZERO,
                success_payload: b"ok".to_vec(),
                failure_payload: Vec::new(),
            },
        };
        let bytes = msg.to_bytes();
        assert_eq!(message_type(&bytes), MessageType::SwapInternal);
        let parsed = SwapInternalMsg::try_from_bytes(message_payload(&bytes)).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn truncated_bodies_are_malformed() {
        let msg = DepositLiquidityMsg {
            key: PoolKey::new(token(1), token(2), AmmKind::ConstantProduct, None),
            min_liquidity: 1,
            deadline: 0,
            recipient: Address::ZERO,
            success_payload: Vec::new(),
            failure_payload: Vec::new(),
        };
        let bytes = msg.to_bytes();
        let payload = message_payload(&bytes);
        assert!(DepositLiquidityMsg::try_from_bytes(&payload[..payload.len() - 1]).is_err());
    }

    #[test]
    fn proof_resolves_to_derived_address() {
        let key = PoolKey::new(token(1), token(2), AmmKind::ConstantProduct, None);
        let proof = SenderProof::Pool { key };
        assert!(proof.verify(&find_pool_address(&key)).is_ok());
        assert_eq!(
            proof.verify(&Address([1; 32])),
            Err(ProtocolError::Authorization)
        );
    }

    #[test]
    fn unknown_tag_reads_as_unknown() {
        assert_eq!(message_type(&[0xff, 0xff, 0xff, 0xff]), MessageType::Unknown);
        assert_eq!(message_type(&[1]), MessageType::Unknown);
    }
}
