//! Message-body builders for callers. Each returns the exact wire bytes a
//! vault, factory or pool expects for the operation.

use crate::address::{Address, TemplateSet};
use crate::asset::Asset;
use crate::message::*;
use crate::pool_key::PoolKey;

pub fn build_swap(steps: Vec<SwapStep>, params: SwapParams) -> Vec<u8> {
    SwapMsg { steps, params }.to_bytes()
}

pub fn build_deposit_liquidity(
    key: PoolKey,
    min_liquidity: u64,
    deadline: u64,
    recipient: Address,
    success_payload: Vec<u8>,
    failure_payload: Vec<u8>,
) -> Vec<u8> {
    DepositLiquidityMsg {
        key,
        min_liquidity,
        deadline,
        recipient,
        success_payload,
        failure_payload,
    }
    .to_bytes()
}

pub fn build_create_pool(
    key: PoolKey,
    recipient: Address,
    success_payload: Vec<u8>,
    failure_payload: Vec<u8>,
) -> Vec<u8> {
    CreatePoolMsg { key, recipient, success_payload, failure_payload }.to_bytes()
}

pub fn build_create_vault(asset: Asset) -> Vec<u8> {
    CreateVaultMsg { asset }.to_bytes()
}

pub fn build_update_admin(admin: Address) -> Vec<u8> {
    UpdateAdminMsg { admin }.to_bytes()
}

pub fn build_update_withdrawer(withdrawer: Address) -> Vec<u8> {
    UpdateWithdrawerMsg { withdrawer }.to_bytes()
}

pub fn build_update_code_templates(templates: TemplateSet, code_version: u32) -> Vec<u8> {
    UpdateCodeTemplatesMsg { templates, code_version }.to_bytes()
}

pub fn build_update_pool_fees(key: PoolKey, protocol_fee_bps: u16, lp_fee_bps: u16) -> Vec<u8> {
    UpdatePoolMsg {
        key,
        set_fees: true,
        protocol_fee_bps,
        lp_fee_bps,
        set_active: false,
        is_active: false,
    }
    .to_bytes()
}

pub fn build_update_pool_activity(key: PoolKey, is_active: bool) -> Vec<u8> {
    UpdatePoolMsg {
        key,
        set_fees: false,
        protocol_fee_bps: 0,
        lp_fee_bps: 0,
        set_active: true,
        is_active,
    }
    .to_bytes()
}

pub fn build_activate_vault(asset: Asset, custody: Address) -> Vec<u8> {
    ActivateVaultMsg { asset, custody }.to_bytes()
}

pub fn build_withdraw(asset: Asset, amount: u64, to: Address) -> Vec<u8> {
    WithdrawMsg { asset, amount, to }.to_bytes()
}

pub fn build_burn_notification(
    amount: u64,
    owner: Address,
    recipient: Address,
    success_payload: Vec<u8>,
    failure_payload: Vec<u8>,
) -> Vec<u8> {
    BurnNotificationMsg { amount, owner, recipient, success_payload, failure_payload }.to_bytes()
}

pub fn build_transfer_notification(amount: u64, sender: Address, payload: Vec<u8>) -> Vec<u8> {
    TransferNotificationMsg { amount, sender, payload }.to_bytes()
}
