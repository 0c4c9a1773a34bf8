use tracing::{debug, warn};

use riptide_api::prelude::*;
use riptide_runtime::{Actor, Context, Envelope, StateInit};

/// Per-asset custody actor: the sole entry and exit point for its asset.
///
/// The native vault custodies value on its own balance; token and currency
/// vaults custody through an external sub-account and move funds with
/// token-standard transfer messages. Every instruction the vault forwards
/// names the original sender, so a downstream bounce can be unwound into a
/// refund without the vault keeping any per-operation state.
pub struct Vault {
    state: VaultState,
}

impl Vault {
    pub fn from_init(data: &[u8]) -> ProtocolResult<Self> {
        ensure(data.len() == ASSET_LEN, ProtocolError::Malformed)?;
        let asset = Asset::read_from(data)?;
        let (custody, is_active) = match asset {
            Asset::Native => (Address::ZERO, true),
            // the gateway sub-account of a currency rail is derivable, so
            // the vault is born active
            Asset::Currency { id } => (find_currency_gateway_address(id), true),
            // token custody is confirmed asynchronously by the token master
            Asset::Token { .. } => (Address::ZERO, false),
        };
        Ok(Self {
            state: VaultState { asset, factory: FACTORY_ID, custody, is_active },
        })
    }

    /// Pays `amount` of this vault's asset to `recipient`: native value
    /// straight off the balance, custodied assets via a transfer
    /// instruction to the sub-account.
    fn pay(&self, ctx: &mut Context, recipient: Address, amount: u64, payload: Vec<u8>) {
        if self.state.asset.is_native() {
            let body = PayoutNotificationMsg { payload }.to_bytes();
            ctx.send(recipient, amount as u128, body);
        } else {
            let body = TransferMsg { amount, recipient, payload }.to_bytes();
            ctx.send(self.state.custody, 0, body);
        }
    }

    /// Entry point for the three user instructions, shared by the native
    /// path (value + body) and the token path (transfer notification).
    fn dispatch_user_op(
        &self,
        ctx: &mut Context,
        sender: Address,
        amount: u64,
        body: &[u8],
    ) -> ProtocolResult {
        ensure(self.state.is_active, ProtocolError::InactiveVault)?;
        ensure(amount > 0, ProtocolError::InsufficientValue)?;
        let payload = message_payload(body);
        match message_type(body) {
            MessageType::Swap => {
                let msg = SwapMsg::try_from_bytes(payload)?;
                ensure(!msg.steps.is_empty(), ProtocolError::Malformed)?;
                let mut params = msg.params;
                if params.recipient.is_zero() {
                    params.recipient = sender;
                }
                let first = msg.steps[0].pool;
                let forward = SwapInternalMsg {
                    proof: SenderProof::Vault { asset: self.state.asset },
                    asset_in: self.state.asset,
                    amount,
                    sender,
                    steps: msg.steps,
                    params,
                };
                ctx.send(first, 0, forward.to_bytes());
                Ok(())
            }
            MessageType::DepositLiquidity => {
                let msg = DepositLiquidityMsg::try_from_bytes(payload)?;
                msg.key.validate()?;
                let side = msg
                    .key
                    .side_of(&self.state.asset)
                    .ok_or(ProtocolError::UnsupportedAmmOrAsset)?;
                let recipient = if msg.recipient.is_zero() { sender } else { msg.recipient };
                let forward = EscrowDepositMsg {
                    side: side as u8,
                    amount,
                    owner: sender,
                    key: msg.key,
                    min_liquidity: msg.min_liquidity,
                    deadline: msg.deadline,
                    recipient,
                    success_payload: msg.success_payload,
                    failure_payload: msg.failure_payload,
                };
                let dest = find_depository_address(&sender, &msg.key);
                ctx.send_with_init(
                    dest,
                    0,
                    forward.to_bytes(),
                    StateInit {
                        code_hash: DEPOSITORY_TEMPLATE,
                        data: escrow_init_data(&sender, &msg.key),
                    },
                );
                Ok(())
            }
            MessageType::CreatePool => {
                let msg = CreatePoolMsg::try_from_bytes(payload)?;
                msg.key.validate()?;
                let side = msg
                    .key
                    .side_of(&self.state.asset)
                    .ok_or(ProtocolError::UnsupportedAmmOrAsset)?;
                let recipient = if msg.recipient.is_zero() { sender } else { msg.recipient };
                let forward = EscrowDepositMsg {
                    side: side as u8,
                    amount,
                    owner: sender,
                    key: msg.key,
                    min_liquidity: 0,
                    deadline: 0,
                    recipient,
                    success_payload: msg.success_payload,
                    failure_payload: msg.failure_payload,
                };
                let dest = find_pool_creator_address(&sender, &msg.key);
                ctx.send_with_init(
                    dest,
                    0,
                    forward.to_bytes(),
                    StateInit {
                        code_hash: POOL_CREATOR_TEMPLATE,
                        data: escrow_init_data(&sender, &msg.key),
                    },
                );
                Ok(())
            }
            _ => Err(ProtocolError::Malformed),
        }
    }

    /// A forwarded instruction came back: return the funds to whoever the
    /// operation named, attaching the failure notification if one was set.
    fn handle_bounce(&self, ctx: &mut Context, env: &Envelope) -> ProtocolResult {
        let payload = message_payload(&env.body);
        match message_type(&env.body) {
            MessageType::SwapInternal => {
                let msg = SwapInternalMsg::try_from_bytes(payload)?;
                debug!(reason = env.bounce_reason, "swap entry bounced; refunding");
                self.pay(ctx, msg.params.recipient, msg.amount, msg.params.failure_payload);
                Ok(())
            }
            MessageType::EscrowDeposit => {
                let msg = EscrowDepositMsg::try_from_bytes(payload)?;
                debug!(reason = env.bounce_reason, "escrow deposit bounced; refunding");
                self.pay(ctx, msg.owner, msg.amount, msg.failure_payload);
                Ok(())
            }
            other => {
                // transfers to the custody account do not legitimately
                // bounce; absorb and surface in the logs
                warn!(op = ?other, reason = env.bounce_reason, "vault absorbed a bounce");
                Ok(())
            }
        }
    }

    fn handle_transfer_notification(&self, ctx: &mut Context, env: &Envelope) -> ProtocolResult {
        ensure(!self.state.asset.is_native(), ProtocolError::Malformed)?;
        ensure(env.sender == self.state.custody, ProtocolError::Authorization)?;
        let msg = TransferNotificationMsg::try_from_bytes(message_payload(&env.body))?;
        match self.dispatch_user_op(ctx, msg.sender, msg.amount, &msg.payload) {
            Ok(()) => Ok(()),
            Err(err) => {
                // the tokens already sit in custody; an error cannot bounce
                // them back, so return them explicitly
                debug!(%err, "instruction rejected; returning tokens");
                let body = TransferMsg {
                    amount: msg.amount,
                    recipient: msg.sender,
                    payload: Vec::new(),
                }
                .to_bytes();
                ctx.send(self.state.custody, 0, body);
                Ok(())
            }
        }
    }

    fn handle_payout(&self, ctx: &mut Context, env: &Envelope) -> ProtocolResult {
        let msg = PayoutMsg::try_from_bytes(message_payload(&env.body))?;
        match msg.proof {
            SenderProof::Pool { .. }
            | SenderProof::Depository { .. }
            | SenderProof::PoolCreator { .. }
            | SenderProof::Factory => {}
            SenderProof::Vault { .. } => return Err(ProtocolError::Authorization),
        }
        msg.proof.verify(&env.sender)?;
        ensure(msg.amount > 0, ProtocolError::Malformed)?;
        if self.state.asset.is_native() {
            ensure(ctx.balance() >= msg.amount as u128, ProtocolError::InsufficientValue)?;
        }
        self.pay(ctx, msg.recipient, msg.amount, msg.payload);
        Ok(())
    }

    fn handle_activate(&mut self, env: &Envelope) -> ProtocolResult {
        ensure(env.sender == self.state.factory, ProtocolError::Authorization)?;
        let msg = ActivateVaultMsg::try_from_bytes(message_payload(&env.body))?;
        ensure(msg.asset == self.state.asset, ProtocolError::Malformed)?;
        ensure(!msg.custody.is_zero(), ProtocolError::Malformed)?;
        self.state.custody = msg.custody;
        self.state.is_active = true;
        Ok(())
    }

    fn handle_take_custody(&mut self, env: &Envelope) -> ProtocolResult {
        let master = self
            .state
            .asset
            .token_master()
            .ok_or(ProtocolError::Malformed)?;
        ensure(env.sender == master, ProtocolError::Authorization)?;
        let msg = TakeCustodyMsg::try_from_bytes(message_payload(&env.body))?;
        ensure(!msg.custody.is_zero(), ProtocolError::Malformed)?;
        self.state.custody = msg.custody;
        self.state.is_active = true;
        debug!(custody = %msg.custody, "vault activated");
        Ok(())
    }

    /// Empty bodies are the factory's deploy ping and, for the native
    /// vault, plain value deposits.
    fn handle_untagged(&self, ctx: &mut Context, env: &Envelope) -> ProtocolResult {
        if env.sender == self.state.factory {
            if let Some(master) = self.state.asset.token_master() {
                if !self.state.is_active && self.state.custody.is_zero() {
                    ctx.send(master, 0, empty_body(MessageType::ProvideCustody));
                }
            }
            return Ok(());
        }
        ensure(
            self.state.asset.is_native() && env.body.is_empty(),
            ProtocolError::Malformed,
        )
    }
}

impl Actor for Vault {
    fn kind(&self) -> &'static str {
        "vault"
    }

    fn receive(&mut self, ctx: &mut Context, env: &Envelope) -> ProtocolResult {
        if env.bounced {
            return self.handle_bounce(ctx, env);
        }
        match message_type(&env.body) {
            MessageType::Swap | MessageType::DepositLiquidity | MessageType::CreatePool => {
                ensure(self.state.asset.is_native(), ProtocolError::Malformed)?;
                let amount =
                    u64::try_from(env.value).map_err(|_| ProtocolError::Malformed)?;
                self.dispatch_user_op(ctx, env.sender, amount, &env.body)
            }
            MessageType::TransferNotification => self.handle_transfer_notification(ctx, env),
            MessageType::Payout => self.handle_payout(ctx, env),
            MessageType::ActivateVault => self.handle_activate(env),
            MessageType::TakeCustody => self.handle_take_custody(env),
            MessageType::Unknown => self.handle_untagged(ctx, env),
            _ => Err(ProtocolError::Malformed),
        }
    }

    fn state_bytes(&self) -> Vec<u8> {
        self.state.pack()
    }

    fn load_state(&mut self, bytes: &[u8]) -> ProtocolResult {
        self.state = VaultState::unpack(bytes)?;
        Ok(())
    }
}
