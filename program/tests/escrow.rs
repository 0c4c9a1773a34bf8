//! Two-sided escrow protocol: arrival-order independence, duplicate-side
//! refunds, owner-only reclamation, and the pool-side rejection paths that
//! refund through the escrow's vaults.

pub mod utils;
use utils::*;

use riptide_api::prelude::*;

fn cp_key(asset: Asset) -> PoolKey {
    PoolKey::new(Asset::Native, asset, AmmKind::ConstantProduct, None)
}

#[test]
fn pool_creation_is_arrival_order_independent() {
    let mut env = Env::new();
    let user = env.add_user(0x21);
    env.create_native_vault();
    let (asset, _vault, custody) = env.create_token_vault(0xB1);

    let key = cp_key(asset);
    let pool = find_pool_address(&key);
    env.install_wallets(&pool, &[Address::ZERO, user]);

    // token side arrives before the native side
    env.token_op(
        custody,
        &asset,
        user,
        1_000_000,
        build_create_pool(key, Address::ZERO, Vec::new(), Vec::new()),
    );
    let escrow = find_pool_creator_address(&user, &key);
    let pending = env.escrow_state(&escrow).expect("escrow pending");
    assert!(pending.filled1 && !pending.filled0);

    env.native_op(
        user,
        4_000_000,
        build_create_pool(key, Address::ZERO, Vec::new(), Vec::new()),
    );

    let state = env.pool_state(&pool);
    assert_eq!((state.reserve0, state.reserve1), (4_000_000, 1_000_000));
    assert_eq!(state.total_supply, 2_000_000);
    assert!(env.escrow_state(&escrow).is_none());
}

#[test]
fn first_deposit_below_dust_floor_refunds_both_sides() {
    let mut env = Env::new();
    let user = env.add_user(0x22);
    env.create_native_vault();
    let (asset, _vault, custody) = env.create_token_vault(0xB2);

    let key = cp_key(asset);
    let pool = find_pool_address(&key);
    env.install_wallets(&pool, &[Address::ZERO, user]);

    // sqrt(500 * 500) = 500 < dust floor 1000
    env.native_op(
        user,
        500,
        build_create_pool(key, Address::ZERO, Vec::new(), Vec::new()),
    );
    env.token_op(
        custody,
        &asset,
        user,
        500,
        build_create_pool(key, Address::ZERO, Vec::new(), Vec::new()),
    );

    let state = env.pool_state(&pool);
    assert_eq!(state.total_supply, 0);
    assert_eq!((state.reserve0, state.reserve1), (0, 0));
    // both sides came back exactly
    assert_eq!(env.ledger.balance_of(&user), 500);
    assert_eq!(env.custody_balance(&custody, &user), 500);
}

#[test]
fn duplicate_side_is_refunded_not_overwritten() {
    let mut env = Env::new();
    let user = env.add_user(0x23);
    env.create_native_vault();
    let (asset, _vault, custody) = env.create_token_vault(0xB3);
    let pool = bootstrap_native_token_pool(&mut env, user, asset, custody, 4_000_000, 1_000_000);
    let key = env.pool_state(&pool).key;

    // first native side held in escrow
    env.native_op(
        user,
        400_000,
        build_deposit_liquidity(key, 0, 0, Address::ZERO, Vec::new(), Vec::new()),
    );
    let escrow = find_depository_address(&user, &key);
    assert_eq!(env.escrow_state(&escrow).unwrap().side0, 400_000);

    // same side again: refunded immediately, held amount untouched
    env.native_op(
        user,
        300_000,
        build_deposit_liquidity(key, 0, 0, Address::ZERO, Vec::new(), Vec::new()),
    );
    assert_eq!(env.ledger.balance_of(&user), 300_000);
    assert_eq!(env.escrow_state(&escrow).unwrap().side0, 400_000);

    // the token side completes the original pair
    env.token_op(
        custody,
        &asset,
        user,
        100_000,
        build_deposit_liquidity(key, 0, 0, Address::ZERO, Vec::new(), Vec::new()),
    );
    let state = env.pool_state(&pool);
    assert_eq!(state.total_supply, 2_200_000);
    assert!(env.escrow_state(&escrow).is_none());
}

#[test]
fn minimum_liquidity_guard_refunds_in_full() {
    let mut env = Env::new();
    let user = env.add_user(0x24);
    env.create_native_vault();
    let (asset, _vault, custody) = env.create_token_vault(0xB4);
    let pool = bootstrap_native_token_pool(&mut env, user, asset, custody, 4_000_000, 1_000_000);
    let key = env.pool_state(&pool).key;

    // proportional mint would be 200_000; demand more
    env.native_op(
        user,
        400_000,
        build_deposit_liquidity(key, 300_000, 0, Address::ZERO, Vec::new(), b"slip".to_vec()),
    );
    env.token_op(
        custody,
        &asset,
        user,
        100_000,
        build_deposit_liquidity(key, 300_000, 0, Address::ZERO, Vec::new(), b"slip".to_vec()),
    );

    let state = env.pool_state(&pool);
    assert_eq!(state.total_supply, 2_000_000);
    assert_eq!((state.reserve0, state.reserve1), (4_000_000, 1_000_000));
    assert_eq!(env.ledger.balance_of(&user), 400_000);
    assert_eq!(env.custody_balance(&custody, &user), 100_000);
    // the requested failure notification arrived with the refund
    let notes = env.user_notes(&user);
    assert!(notes
        .iter()
        .any(|n| n.op == MessageType::PayoutNotification as u32 && n.payload == b"slip"));
}

#[test]
fn zero_minimum_never_refunds() {
    let mut env = Env::new();
    let user = env.add_user(0x25);
    env.create_native_vault();
    let (asset, _vault, custody) = env.create_token_vault(0xB5);
    let pool = bootstrap_native_token_pool(&mut env, user, asset, custody, 4_000_000, 1_000_000);
    let key = env.pool_state(&pool).key;

    env.native_op(
        user,
        400_000,
        build_deposit_liquidity(key, 0, 0, Address::ZERO, Vec::new(), Vec::new()),
    );
    env.token_op(
        custody,
        &asset,
        user,
        100_000,
        build_deposit_liquidity(key, 0, 0, Address::ZERO, Vec::new(), Vec::new()),
    );
    assert_eq!(env.pool_state(&pool).total_supply, 2_200_000);
    assert_eq!(env.ledger.balance_of(&user), 0);
}

#[test]
fn elapsed_deadline_refunds_both_sides() {
    let mut env = Env::new();
    let user = env.add_user(0x26);
    env.create_native_vault();
    let (asset, _vault, custody) = env.create_token_vault(0xB6);
    let pool = bootstrap_native_token_pool(&mut env, user, asset, custody, 4_000_000, 1_000_000);
    let key = env.pool_state(&pool).key;

    // ledger clock sits at 1_000; the deadline is long past
    env.native_op(
        user,
        400_000,
        build_deposit_liquidity(key, 0, 500, Address::ZERO, Vec::new(), Vec::new()),
    );
    env.token_op(
        custody,
        &asset,
        user,
        100_000,
        build_deposit_liquidity(key, 0, 500, Address::ZERO, Vec::new(), Vec::new()),
    );

    assert_eq!(env.pool_state(&pool).total_supply, 2_000_000);
    assert_eq!(env.ledger.balance_of(&user), 400_000);
    assert_eq!(env.custody_balance(&custody, &user), 100_000);
}

#[test]
fn withdraw_funds_is_owner_only() {
    let mut env = Env::new();
    let user = env.add_user(0x27);
    let stranger = env.add_user(0x28);
    env.create_native_vault();
    let (asset, _vault, custody) = env.create_token_vault(0xB7);
    let pool = bootstrap_native_token_pool(&mut env, user, asset, custody, 4_000_000, 1_000_000);
    let key = env.pool_state(&pool).key;

    env.native_op(
        user,
        250_000,
        build_deposit_liquidity(key, 0, 0, Address::ZERO, Vec::new(), Vec::new()),
    );
    let escrow = find_depository_address(&user, &key);
    assert!(env.escrow_state(&escrow).is_some());

    // a stranger cannot reclaim
    env.ledger
        .send_external(stranger, escrow, 0, empty_body(MessageType::WithdrawFunds));
    env.ledger.run_until_idle();
    assert!(env.escrow_state(&escrow).is_some());

    // the owner can; the held side comes back and the escrow dies
    env.ledger
        .send_external(user, escrow, 0, empty_body(MessageType::WithdrawFunds));
    env.ledger.run_until_idle();
    assert!(env.escrow_state(&escrow).is_none());
    assert_eq!(env.ledger.balance_of(&user), 250_000);
}

#[test]
fn repeated_creation_after_initialization_is_refunded() {
    let mut env = Env::new();
    let user = env.add_user(0x29);
    env.create_native_vault();
    let (asset, _vault, custody) = env.create_token_vault(0xB8);
    let pool = bootstrap_native_token_pool(&mut env, user, asset, custody, 4_000_000, 1_000_000);
    let key = env.pool_state(&pool).key;

    // a second complete creation pair loses the race
    env.native_op(
        user,
        1_000_000,
        build_create_pool(key, Address::ZERO, Vec::new(), Vec::new()),
    );
    env.token_op(
        custody,
        &asset,
        user,
        1_000_000,
        build_create_pool(key, Address::ZERO, Vec::new(), Vec::new()),
    );

    let state = env.pool_state(&pool);
    assert_eq!(state.total_supply, 2_000_000);
    assert_eq!((state.reserve0, state.reserve1), (4_000_000, 1_000_000));
    assert_eq!(env.ledger.balance_of(&user), 1_000_000);
    assert_eq!(env.custody_balance(&custody, &user), 1_000_000);
}

#[test]
fn random_bootstrap_amounts_respect_the_dust_floor() {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);

    for _ in 0..8 {
        let mut env = Env::new();
        let user = env.add_user(0x2B);
        env.create_native_vault();
        let (asset, _vault, custody) = env.create_token_vault(0xBA);
        let key = cp_key(asset);
        let pool = find_pool_address(&key);
        env.install_wallets(&pool, &[Address::ZERO, user]);

        let native_amount = rng.gen_range(1u64..4_000);
        let token_amount = rng.gen_range(1u64..4_000);
        let body = build_create_pool(key, Address::ZERO, Vec::new(), Vec::new());
        // arrival order must not matter either
        if rng.gen_bool(0.5) {
            env.native_op(user, native_amount, body.clone());
            env.token_op(custody, &asset, user, token_amount, body);
        } else {
            env.token_op(custody, &asset, user, token_amount, body.clone());
            env.native_op(user, native_amount, body);
        }

        let minted = riptide_api::math::cpamm::initial_liquidity(native_amount, token_amount);
        let state = env.pool_state(&pool);
        // locked amount 1_000 and dust floor 1_000: anything at or below
        // the lock refuses to initialize
        if minted > 1_000 {
            assert_eq!(state.total_supply, minted);
            assert_eq!((state.reserve0, state.reserve1), (native_amount, token_amount));
            assert_eq!(env.ledger.balance_of(&user), 0);
        } else {
            assert_eq!(state.total_supply, 0);
            assert_eq!(env.ledger.balance_of(&user), native_amount as u128);
            assert_eq!(env.custody_balance(&custody, &user), token_amount);
        }
    }
}

#[test]
fn steady_deposit_cannot_initialize_a_pool() {
    let mut env = Env::new();
    let user = env.add_user(0x2A);
    env.create_native_vault();
    let (asset, _vault, custody) = env.create_token_vault(0xB9);

    let key = cp_key(asset);
    let pool = find_pool_address(&key);
    env.install_wallets(&pool, &[user]);

    // deposit-liquidity routes through the depository, not the creator;
    // an uninitialized pool refuses it
    env.native_op(
        user,
        400_000,
        build_deposit_liquidity(key, 0, 0, Address::ZERO, Vec::new(), Vec::new()),
    );
    env.token_op(
        custody,
        &asset,
        user,
        100_000,
        build_deposit_liquidity(key, 0, 0, Address::ZERO, Vec::new(), Vec::new()),
    );

    let state = env.pool_state(&pool);
    assert_eq!(state.total_supply, 0);
    assert_eq!(env.ledger.balance_of(&user), 400_000);
    assert_eq!(env.custody_balance(&custody, &user), 100_000);
}
