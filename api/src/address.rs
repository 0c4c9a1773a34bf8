use bytemuck_derive::{Pod, Zeroable};
use sha2::{Digest, Sha256};

use crate::asset::Asset;
use crate::consts::*;
use crate::pool_key::PoolKey;

/// A 32-byte actor address.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
pub struct Address(pub [u8; 32]);

impl Address {
    pub const ZERO: Address = Address([0; 32]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 32]
    }
}

impl Default for Address {
    fn default() -> Self {
        Address::ZERO
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0[..6] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "..")
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// The set of code-template hashes the factory deploys actors under.
/// Rotating templates (a code upgrade) changes the addresses of actors
/// deployed afterwards; existing actors keep theirs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TemplateSet {
    pub vault: [u8; 32],
    pub pool: [u8; 32],
    pub depository: [u8; 32],
    pub pool_creator: [u8; 32],
    pub liquidity_wallet: [u8; 32],
    pub currency_gateway: [u8; 32],
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self {
            vault: VAULT_TEMPLATE,
            pool: POOL_TEMPLATE,
            depository: DEPOSITORY_TEMPLATE,
            pool_creator: POOL_CREATOR_TEMPLATE,
            liquidity_wallet: LIQUIDITY_WALLET_TEMPLATE,
            currency_gateway: CURRENCY_GATEWAY_TEMPLATE,
        }
    }
}

/// Content-addressed derivation: the address is a hash over the protocol
/// domain, the code template, and the init data serializing the logical
/// key. The same key always lands on the same address without any lookup
/// table, and distinct init data cannot collide.
pub fn derive_address(code_hash: &[u8; 32], init_data: &[u8]) -> Address {
    let mut hasher = Sha256::new();
    hasher.update(PROTOCOL_SEED);
    hasher.update(code_hash);
    hasher.update((init_data.len() as u32).to_le_bytes());
    hasher.update(init_data);
    Address(hasher.finalize().into())
}

pub fn vault_init_data(asset: &Asset) -> Vec<u8> {
    asset.to_bytes().to_vec()
}

pub fn pool_init_data(key: &PoolKey) -> Vec<u8> {
    key.to_bytes()
}

pub fn escrow_init_data(owner: &Address, key: &PoolKey) -> Vec<u8> {
    let mut data = Vec::with_capacity(32 + crate::pool_key::POOL_KEY_LEN);
    data.extend_from_slice(&owner.0);
    key.write_to(&mut data);
    data
}

pub fn liquidity_wallet_init_data(pool: &Address, owner: &Address) -> Vec<u8> {
    let mut data = Vec::with_capacity(64);
    data.extend_from_slice(&pool.0);
    data.extend_from_slice(&owner.0);
    data
}

pub fn find_vault_address_with(templates: &TemplateSet, asset: &Asset) -> Address {
    derive_address(&templates.vault, &vault_init_data(asset))
}

pub fn find_pool_address_with(templates: &TemplateSet, key: &PoolKey) -> Address {
    derive_address(&templates.pool, &pool_init_data(key))
}

pub fn find_depository_address_with(
    templates: &TemplateSet,
    owner: &Address,
    key: &PoolKey,
) -> Address {
    derive_address(&templates.depository, &escrow_init_data(owner, key))
}

pub fn find_pool_creator_address_with(
    templates: &TemplateSet,
    owner: &Address,
    key: &PoolKey,
) -> Address {
    derive_address(&templates.pool_creator, &escrow_init_data(owner, key))
}

pub fn find_liquidity_wallet_address_with(
    templates: &TemplateSet,
    pool: &Address,
    owner: &Address,
) -> Address {
    derive_address(&templates.liquidity_wallet, &liquidity_wallet_init_data(pool, owner))
}

pub fn find_currency_gateway_address_with(templates: &TemplateSet, id: u32) -> Address {
    derive_address(&templates.currency_gateway, &id.to_le_bytes())
}

pub fn find_vault_address(asset: &Asset) -> Address {
    find_vault_address_with(&TemplateSet::default(), asset)
}

pub fn find_pool_address(key: &PoolKey) -> Address {
    find_pool_address_with(&TemplateSet::default(), key)
}

pub fn find_depository_address(owner: &Address, key: &PoolKey) -> Address {
    find_depository_address_with(&TemplateSet::default(), owner, key)
}

pub fn find_pool_creator_address(owner: &Address, key: &PoolKey) -> Address {
    find_pool_creator_address_with(&TemplateSet::default(), owner, key)
}

pub fn find_liquidity_wallet_address(pool: &Address, owner: &Address) -> Address {
    find_liquidity_wallet_address_with(&TemplateSet::default(), pool, owner)
}

pub fn find_currency_gateway_address(id: u32) -> Address {
    find_currency_gateway_address_with(&TemplateSet::default(), id)
}
