//! The protocol actors: Factory registry, per-asset Vaults, AMM Pools and
//! the two-sided escrow (LiquidityDepository / PoolCreator), wired into a
//! [`riptide_runtime::Ledger`] through content-addressed code templates.

pub mod depository;
pub mod factory;
pub mod pool;
pub mod vault;

use riptide_api::prelude::*;
use riptide_runtime::{Actor, Ledger};

/// Registers the protocol's code templates so that content-addressed
/// deploys (vaults, pools, escrows) can materialize on first contact.
pub fn register_templates(ledger: &mut Ledger) {
    ledger.register_template(
        VAULT_TEMPLATE,
        Box::new(|data| Ok(Box::new(vault::Vault::from_init(data)?) as Box<dyn Actor>)),
    );
    ledger.register_template(
        POOL_TEMPLATE,
        Box::new(|data| Ok(Box::new(pool::Pool::from_init(data)?) as Box<dyn Actor>)),
    );
    ledger.register_template(
        DEPOSITORY_TEMPLATE,
        Box::new(|data| {
            Ok(Box::new(depository::Escrow::from_init(EscrowKind::Depository, data)?)
                as Box<dyn Actor>)
        }),
    );
    ledger.register_template(
        POOL_CREATOR_TEMPLATE,
        Box::new(|data| {
            Ok(Box::new(depository::Escrow::from_init(EscrowKind::PoolCreator, data)?)
                as Box<dyn Actor>)
        }),
    );
}

/// Installs the factory singleton at its well-known address.
pub fn install_factory(
    ledger: &mut Ledger,
    admin: Address,
    withdrawer: Address,
    params: ProtocolParams,
) -> ProtocolResult {
    let factory = factory::Factory::new(admin, withdrawer, params)?;
    ledger.install(FACTORY_ID, Box::new(factory), 0);
    Ok(())
}
