/// Domain separator mixed into every derived address.
pub const PROTOCOL_SEED: &[u8] = b"riptide";

/// The factory singleton. Every actor in the system trusts messages from
/// this address for administrative transitions.
pub const FACTORY_ID: crate::address::Address =
    crate::address::Address(*b"riptide/factory/v1..............");

// Code template hashes (v1). Address derivation commits to the template a
// logical key deploys under, so two kinds can never collide on an address.
pub const VAULT_TEMPLATE: [u8; 32] = *b"riptide/code/vault/v1...........";
pub const POOL_TEMPLATE: [u8; 32] = *b"riptide/code/pool/v1............";
pub const DEPOSITORY_TEMPLATE: [u8; 32] = *b"riptide/code/depository/v1......";
pub const POOL_CREATOR_TEMPLATE: [u8; 32] = *b"riptide/code/pool-creator/v1....";
pub const LIQUIDITY_WALLET_TEMPLATE: [u8; 32] = *b"riptide/code/lp-wallet/v1.......";
pub const CURRENCY_GATEWAY_TEMPLATE: [u8; 32] = *b"riptide/code/gateway/v1.........";

/// Fee rates are expressed in basis points of this denominator.
pub const FEE_DENOMINATOR: u64 = 10_000;

/// Hard cap for any single fee component (10%).
pub const MAX_FEE_BPS: u16 = 1_000;

/// Scale of the stable-curve per-asset rate normalizers: a rate of
/// `RATE_ONE` leaves amounts unchanged.
pub const RATE_ONE: u64 = 1_000_000_000;

/// Iteration cap for the Newton solvers. Convergence is typically reached
/// in well under ten rounds.
pub const NEWTON_MAX_ROUNDS: usize = 255;

// Defaults for `ProtocolParams`. Deployments tune these through the factory
// configuration, not by editing code.
pub const DEFAULT_MIN_INITIAL_LIQUIDITY: u64 = 1_000;
pub const DEFAULT_LOCKED_LIQUIDITY: u64 = 1_000;
pub const DEFAULT_PROTOCOL_FEE_BPS: u16 = 10;
pub const DEFAULT_LP_FEE_BPS: u16 = 25;
pub const DEFAULT_REFERRAL_FEE_BPS: u16 = 10;
