//! End-to-end flow over the ledger: vault creation with the custody
//! handshake, pool bootstrap through the PoolCreator escrow, a follow-up
//! deposit, a swap, and a pro-rata withdrawal.

pub mod utils;
use utils::*;

use riptide_api::prelude::*;

#[test]
fn run_integration() {
    let mut env = Env::new();
    let user = env.add_user(0x11);

    env.create_native_vault();
    let (asset, vault, custody) = env.create_token_vault(0xA1);

    // the vault's custody sub-account was confirmed by the token master
    let vault_state = env.vault_state(&vault);
    assert_eq!(vault_state.asset, asset);
    assert_eq!(vault_state.custody, custody);
    assert!(vault_state.is_active);

    // -- bootstrap: 4_000_000 native + 1_000_000 token ----------------------
    let pool = bootstrap_native_token_pool(&mut env, user, asset, custody, 4_000_000, 1_000_000);

    let state = env.pool_state(&pool);
    assert_eq!(state.reserve0, 4_000_000); // native is side 0 canonically
    assert_eq!(state.reserve1, 1_000_000);
    assert_eq!(state.total_supply, 2_000_000); // floor(sqrt(a0 * a1))
    assert!(state.is_active);

    // locked amount to the null owner, the rest to the creator
    assert_eq!(env.wallet_balance(&pool, &Address::ZERO), 1_000);
    assert_eq!(env.wallet_balance(&pool, &user), 1_999_000);

    // the creator escrow consumed itself
    let key = state.key;
    assert!(env.escrow_state(&find_pool_creator_address(&user, &key)).is_none());

    // -- steady-state deposit: 400_000 + 100_000 ----------------------------
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
    assert_eq!(state.reserve0, 4_400_000);
    assert_eq!(state.reserve1, 1_100_000);
    assert_eq!(state.total_supply, 2_200_000);
    assert_eq!(env.wallet_balance(&pool, &user), 2_199_000);

    // -- swap 10_000 native for tokens --------------------------------------
    let params = SwapParams { recipient: user, ..Default::default() };
    env.native_op(
        user,
        10_000,
        build_swap(vec![SwapStep { pool, limit: 0 }], params),
    );

    let state = env.pool_state(&pool);
    assert_eq!(state.reserve0, 4_409_990); // net input + lp fee joined
    assert_eq!(state.reserve1, 1_097_515);
    assert_eq!(state.collected_protocol_fee0, 10);
    assert_eq!(env.custody_balance(&custody, &user), 2_485);

    // -- withdraw 200_000 LP ------------------------------------------------
    env.burn(pool, user, 200_000, Address::ZERO);

    let state = env.pool_state(&pool);
    assert_eq!(state.total_supply, 2_000_000);
    assert_eq!(state.reserve0, 4_009_082);
    assert_eq!(state.reserve1, 997_741);
    assert_eq!(env.ledger.balance_of(&user), 400_908);
    assert_eq!(env.custody_balance(&custody, &user), 2_485 + 99_774);
}

#[test]
fn native_value_only_deposit_is_accepted() {
    let mut env = Env::new();
    let user = env.add_user(0x12);
    let vault = env.create_native_vault();
    env.ledger.send_external(user, vault, 5_000, Vec::new());
    env.ledger.run_until_idle();
    assert_eq!(env.ledger.balance_of(&vault), 5_000);
}

#[test]
fn currency_vault_is_born_active_with_a_derived_gateway() {
    let mut env = Env::new();
    let user = env.add_user(0x14);
    env.create_native_vault();

    let asset = Asset::Currency { id: 978 };
    let gateway = find_currency_gateway_address(978);
    env.ledger.install(gateway, Box::<utils::MockCustody>::default(), 0);
    env.ledger
        .send_external(env.admin, FACTORY_ID, 0, build_create_vault(asset));
    env.ledger.run_until_idle();

    let vault = find_vault_address(&asset);
    let state = env.vault_state(&vault);
    assert!(state.is_active);
    assert_eq!(state.custody, gateway);

    // a deposit from the gateway lands in escrow like any token deposit
    let key = PoolKey::new(Asset::Native, asset, AmmKind::ConstantProduct, None);
    env.token_op(
        gateway,
        &asset,
        user,
        25_000,
        build_deposit_liquidity(key, 0, 0, Address::ZERO, Vec::new(), Vec::new()),
    );
    let escrow = env.escrow_state(&find_depository_address(&user, &key)).unwrap();
    assert_eq!(escrow.side1, 25_000);
}

#[test]
fn stable_pool_bootstrap_and_swap() {
    let mut env = Env::new();
    let user = env.add_user(0x13);
    env.create_native_vault();
    let (asset, _vault, custody) = env.create_token_vault(0xA2);

    let key = PoolKey::new(
        Asset::Native,
        asset,
        AmmKind::Stable,
        Some(StableSettings { amp: 100, rate0: RATE_ONE, rate1: RATE_ONE }),
    );
    let pool = find_pool_address(&key);
    env.install_wallets(&pool, &[Address::ZERO, user]);

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
    // balanced stable bootstrap mints exactly the sum
    assert_eq!(state.total_supply, 2_000_000);
    assert_eq!(env.wallet_balance(&pool, &user), 1_999_000);

    // golden stable quote: 100_000 in with 10/5 bps fees pays 99_799 out
    let body = build_update_pool_fees(key, 5, 10);
    env.ledger.send_external(env.admin, FACTORY_ID, 0, body);
    env.ledger.run_until_idle();

    let params = SwapParams { recipient: user, ..Default::default() };
    env.native_op(
        user,
        100_000,
        build_swap(vec![SwapStep { pool, limit: 99_799 }], params),
    );
    assert_eq!(env.custody_balance(&custody, &user), 99_799);

    let state = env.pool_state(&pool);
    assert_eq!(state.reserve0, 1_000_000 + 99_850 + 100);
    assert_eq!(state.reserve1, 1_000_000 - 99_799);
    assert_eq!(state.collected_protocol_fee0, 50);
}
