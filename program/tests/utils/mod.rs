#![allow(dead_code)]

use serde::{Deserialize, Serialize};

use riptide::{install_factory, register_templates};
use riptide_api::prelude::*;
use riptide_runtime::{Actor, Context, Envelope, Ledger};

/// Passive external account. Absorbs value and records every received
/// envelope so tests can assert on notifications.
#[derive(Default, Serialize, Deserialize)]
pub struct MockUser {
    pub received: Vec<ReceivedNote>,
}

#[derive(Serialize, Deserialize)]
pub struct ReceivedNote {
    pub op: u32,
    pub value: u128,
    pub payload: Vec<u8>,
}

impl Actor for MockUser {
    fn kind(&self) -> &'static str {
        "mock-user"
    }

    fn receive(&mut self, _ctx: &mut Context, env: &Envelope) -> ProtocolResult {
        let op = message_type(&env.body);
        let payload = match op {
            MessageType::PayoutNotification => {
                PayoutNotificationMsg::try_from_bytes(message_payload(&env.body))
                    .map(|m| m.payload)
                    .unwrap_or_default()
            }
            _ => Vec::new(),
        };
        self.received.push(ReceivedNote { op: op as u32, value: env.value, payload });
        Ok(())
    }

    fn state_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap()
    }

    fn load_state(&mut self, bytes: &[u8]) -> ProtocolResult {
        *self = serde_json::from_slice(bytes).map_err(|_| ProtocolError::Malformed)?;
        Ok(())
    }
}

/// External token master: answers the custody handshake with a fixed
/// custody sub-account address.
#[derive(Serialize, Deserialize)]
pub struct MockTokenMaster {
    pub custody: [u8; 32],
}

impl Actor for MockTokenMaster {
    fn kind(&self) -> &'static str {
        "mock-token-master"
    }

    fn receive(&mut self, ctx: &mut Context, env: &Envelope) -> ProtocolResult {
        if env.bounced {
            return Ok(());
        }
        ensure(
            message_type(&env.body) == MessageType::ProvideCustody,
            ProtocolError::Malformed,
        )?;
        let reply = TakeCustodyMsg { custody: Address(self.custody) }.to_bytes();
        ctx.send(env.sender, 0, reply);
        Ok(())
    }

    fn state_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap()
    }

    fn load_state(&mut self, bytes: &[u8]) -> ProtocolResult {
        *self = serde_json::from_slice(bytes).map_err(|_| ProtocolError::Malformed)?;
        Ok(())
    }
}

/// External custody sub-account (token wallet / currency gateway). Keeps a
/// balance per recipient for outbound transfers, and re-credits the
/// depositor when the vault bounces a transfer notification.
#[derive(Default, Serialize, Deserialize)]
pub struct MockCustody {
    pub balances: Vec<([u8; 32], u64)>,
}

impl MockCustody {
    fn credit(&mut self, owner: [u8; 32], amount: u64) {
        for entry in &mut self.balances {
            if entry.0 == owner {
                entry.1 += amount;
                return;
            }
        }
        self.balances.push((owner, amount));
    }
}

impl Actor for MockCustody {
    fn kind(&self) -> &'static str {
        "mock-custody"
    }

    fn receive(&mut self, _ctx: &mut Context, env: &Envelope) -> ProtocolResult {
        let payload = message_payload(&env.body);
        match message_type(&env.body) {
            // the vault pays out: record who got what
            MessageType::Transfer => {
                let msg = TransferMsg::try_from_bytes(payload)?;
                self.credit(msg.recipient.0, msg.amount);
                Ok(())
            }
            // our own deposit notification came back: refund the depositor
            MessageType::TransferNotification if env.bounced => {
                let msg = TransferNotificationMsg::try_from_bytes(payload)?;
                self.credit(msg.sender.0, msg.amount);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn state_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap()
    }

    fn load_state(&mut self, bytes: &[u8]) -> ProtocolResult {
        *self = serde_json::from_slice(bytes).map_err(|_| ProtocolError::Malformed)?;
        Ok(())
    }
}

/// External liquidity wallet: accumulates mints from its pool.
#[derive(Serialize, Deserialize)]
pub struct MockWallet {
    pub pool: [u8; 32],
    pub balance: u64,
}

impl Actor for MockWallet {
    fn kind(&self) -> &'static str {
        "mock-wallet"
    }

    fn receive(&mut self, _ctx: &mut Context, env: &Envelope) -> ProtocolResult {
        if env.bounced {
            return Ok(());
        }
        ensure(env.sender == Address(self.pool), ProtocolError::Authorization)?;
        ensure(
            message_type(&env.body) == MessageType::MintLiquidity,
            ProtocolError::Malformed,
        )?;
        let msg = MintLiquidityMsg::try_from_bytes(message_payload(&env.body))?;
        self.balance += msg.amount;
        Ok(())
    }

    fn state_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap()
    }

    fn load_state(&mut self, bytes: &[u8]) -> ProtocolResult {
        *self = serde_json::from_slice(bytes).map_err(|_| ProtocolError::Malformed)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------

pub struct Env {
    pub ledger: Ledger,
    pub admin: Address,
    pub withdrawer: Address,
}

pub fn addr(byte: u8) -> Address {
    Address([byte; 32])
}

pub fn token(byte: u8) -> Asset {
    Asset::Token { chain: 0, hash: [byte; 32] }
}

impl Env {
    pub fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let mut ledger = Ledger::new();
        ledger.set_now(1_000);
        register_templates(&mut ledger);
        let admin = addr(0xAD);
        let withdrawer = addr(0xAE);
        install_factory(&mut ledger, admin, withdrawer, ProtocolParams::default()).unwrap();
        let mut env = Self { ledger, admin, withdrawer };
        env.add_user(0xAD);
        env.add_user(0xAE);
        env
    }

    /// Installs a passive external account.
    pub fn add_user(&mut self, byte: u8) -> Address {
        let user = addr(byte);
        if !self.ledger.exists(&user) {
            self.ledger.install(user, Box::<MockUser>::default(), 0);
        }
        user
    }

    pub fn create_native_vault(&mut self) -> Address {
        self.ledger
            .send_external(self.admin, FACTORY_ID, 0, build_create_vault(Asset::Native));
        self.ledger.run_until_idle();
        let vault = find_vault_address(&Asset::Native);
        assert!(self.ledger.exists(&vault), "native vault deployed");
        vault
    }

    /// Creates a token vault and drives the custody handshake to
    /// completion. Returns (asset, vault, custody).
    pub fn create_token_vault(&mut self, byte: u8) -> (Asset, Address, Address) {
        let asset = token(byte);
        let master = asset.token_master().unwrap();
        let mut custody_bytes = [byte; 32];
        custody_bytes[0] = 0xCC;
        let custody = Address(custody_bytes);
        self.ledger
            .install(master, Box::new(MockTokenMaster { custody: custody.0 }), 0);
        self.ledger.install(custody, Box::<MockCustody>::default(), 0);
        self.ledger
            .send_external(self.admin, FACTORY_ID, 0, build_create_vault(asset));
        self.ledger.run_until_idle();
        let vault = find_vault_address(&asset);
        assert!(self.vault_state(&vault).is_active, "token vault activated");
        (asset, vault, custody)
    }

    /// Installs the liquidity wallets a pool will mint to.
    pub fn install_wallets(&mut self, pool: &Address, owners: &[Address]) {
        for owner in owners {
            let wallet = find_liquidity_wallet_address(pool, owner);
            if !self.ledger.exists(&wallet) {
                self.ledger
                    .install(wallet, Box::new(MockWallet { pool: pool.0, balance: 0 }), 0);
            }
        }
    }

    /// Sends a user instruction with native value to the native vault.
    pub fn native_op(&mut self, user: Address, value: u64, body: Vec<u8>) {
        let vault = find_vault_address(&Asset::Native);
        self.ledger.send_external(user, vault, value as u128, body);
        self.ledger.run_until_idle();
    }

    /// Delivers a token deposit: the custody account notifies the vault
    /// with the user's instruction as forward payload.
    pub fn token_op(&mut self, custody: Address, asset: &Asset, user: Address, amount: u64, body: Vec<u8>) {
        let vault = find_vault_address(asset);
        let note = build_transfer_notification(amount, user, body);
        self.ledger.send_external(custody, vault, 0, note);
        self.ledger.run_until_idle();
    }

    /// Injects a burn notification from the owner's liquidity wallet.
    pub fn burn(&mut self, pool: Address, owner: Address, amount: u64, recipient: Address) {
        let wallet = find_liquidity_wallet_address(&pool, &owner);
        let body = build_burn_notification(amount, owner, recipient, Vec::new(), Vec::new());
        self.ledger.send_external(wallet, pool, 0, body);
        self.ledger.run_until_idle();
    }

    // -- state probes -------------------------------------------------------

    pub fn pool_state(&self, pool: &Address) -> PoolState {
        PoolState::unpack(&self.ledger.state_of(pool).expect("pool exists")).unwrap()
    }

    pub fn vault_state(&self, vault: &Address) -> VaultState {
        VaultState::unpack(&self.ledger.state_of(vault).expect("vault exists")).unwrap()
    }

    pub fn escrow_state(&self, escrow: &Address) -> Option<EscrowState> {
        self.ledger
            .state_of(escrow)
            .map(|bytes| EscrowState::unpack(&bytes).unwrap())
    }

    pub fn factory_state(&self) -> FactoryState {
        FactoryState::unpack(&self.ledger.state_of(&FACTORY_ID).unwrap()).unwrap()
    }

    /// Token balance a custody account holds for an owner.
    pub fn custody_balance(&self, custody: &Address, owner: &Address) -> u64 {
        let state: MockCustody =
            serde_json::from_slice(&self.ledger.state_of(custody).expect("custody exists"))
                .unwrap();
        state
            .balances
            .iter()
            .find(|(o, _)| *o == owner.0)
            .map(|(_, amount)| *amount)
            .unwrap_or(0)
    }

    pub fn wallet_balance(&self, pool: &Address, owner: &Address) -> u64 {
        let wallet = find_liquidity_wallet_address(pool, owner);
        let state: MockWallet =
            serde_json::from_slice(&self.ledger.state_of(&wallet).expect("wallet exists"))
                .unwrap();
        state.balance
    }

    pub fn user_notes(&self, user: &Address) -> Vec<ReceivedNote> {
        let state: MockUser =
            serde_json::from_slice(&self.ledger.state_of(user).expect("user exists")).unwrap();
        state.received
    }
}

/// Creates a fully initialized constant-product pool between the native
/// asset and a token, with the given first deposit, and returns the pool
/// address. Vaults must exist already.
pub fn bootstrap_native_token_pool(
    env: &mut Env,
    user: Address,
    token_asset: Asset,
    custody: Address,
    native_amount: u64,
    token_amount: u64,
) -> Address {
    let key = PoolKey::new(Asset::Native, token_asset, AmmKind::ConstantProduct, None);
    let pool = find_pool_address(&key);
    env.install_wallets(&pool, &[Address::ZERO, user]);
    env.native_op(
        user,
        native_amount,
        build_create_pool(key, Address::ZERO, Vec::new(), Vec::new()),
    );
    env.token_op(
        custody,
        &token_asset,
        user,
        token_amount,
        build_create_pool(key, Address::ZERO, Vec::new(), Vec::new()),
    );
    pool
}
