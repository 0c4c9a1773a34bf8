use tracing::{debug, warn};

use riptide_api::prelude::*;
use riptide_runtime::{Actor, Context, Envelope};

/// AMM pool actor. One irreversible lifecycle (uninitialized, then active)
/// shared by both trading curves; the curve only changes the math, which
/// lives in `riptide_api::estimate` so that callers' guard estimates and
/// the pool's own execution can never disagree.
pub struct Pool {
    state: PoolState,
    /// Template-level deposit parameters, fixed at deployment.
    params: ProtocolParams,
}

impl Pool {
    pub fn from_init(data: &[u8]) -> ProtocolResult<Self> {
        ensure(data.len() == POOL_KEY_LEN, ProtocolError::Malformed)?;
        let key = PoolKey::read_from(data)?;
        key.validate()?;
        let params = ProtocolParams::default();
        Ok(Self {
            state: PoolState {
                key,
                factory: FACTORY_ID,
                reserve0: 0,
                reserve1: 0,
                total_supply: 0,
                protocol_fee_bps: params.default_protocol_fee_bps,
                lp_fee_bps: params.default_lp_fee_bps,
                referral_fee_bps: params.referral_fee_bps,
                collected_protocol_fee0: 0,
                collected_protocol_fee1: 0,
                is_active: true,
            },
            params,
        })
    }

    fn vault_of(&self, side: usize) -> Address {
        find_vault_address(&self.state.key.asset(side))
    }

    fn payout_via(&self, ctx: &mut Context, side: usize, recipient: Address, amount: u64, payload: Vec<u8>) {
        let body = PayoutMsg {
            proof: SenderProof::Pool { key: self.state.key },
            recipient,
            amount,
            payload,
        }
        .to_bytes();
        ctx.send(self.vault_of(side), 0, body);
    }

    fn mint_liquidity(&self, ctx: &mut Context, owner: Address, amount: u64, payload: Vec<u8>) {
        let wallet = find_liquidity_wallet_address(&ctx.self_address(), &owner);
        let body = MintLiquidityMsg { amount, owner, payload }.to_bytes();
        ctx.send(wallet, 0, body);
    }

    fn check_deadline(&self, ctx: &Context, deadline: u64) -> ProtocolResult {
        ensure(deadline == 0 || ctx.now() <= deadline, ProtocolError::DeadlineExceeded)
    }

    // -- swap ---------------------------------------------------------------

    /// Executes one hop. Any error bounces the envelope back to the sender
    /// of this hop (the previous pool or the entry vault), whose bounce
    /// handler pays the in-flight value out on the asset this hop was about
    /// to receive. That is the router's backward-walking refund.
    fn handle_swap(&mut self, ctx: &mut Context, env: &Envelope) -> ProtocolResult {
        let msg = SwapInternalMsg::try_from_bytes(message_payload(&env.body))?;
        match msg.proof {
            SenderProof::Vault { .. } | SenderProof::Pool { .. } => {}
            _ => return Err(ProtocolError::Authorization),
        }
        msg.proof.verify(&env.sender)?;
        ensure(self.state.is_active, ProtocolError::InactivePool)?;
        ensure(self.state.is_initialized(), ProtocolError::InsufficientLiquidity)?;
        ensure(!msg.steps.is_empty(), ProtocolError::Malformed)?;
        ensure(
            msg.steps[0].pool == ctx.self_address(),
            ProtocolError::UnknownRouteTarget,
        )?;
        let side_in = self
            .state
            .key
            .side_of(&msg.asset_in)
            .ok_or(ProtocolError::UnknownRouteTarget)?;
        let side_out = 1 - side_in;
        self.check_deadline(ctx, msg.params.deadline)?;

        let has_referral = !msg.params.referral.is_zero();
        let est = estimate_swap(&self.state, side_in, msg.amount, has_referral)?;
        let limit = msg.steps[0].limit;
        ensure(est.amount_out > 0 && est.amount_out >= limit, ProtocolError::Slippage)?;

        // lp fee joins the reserves, protocol fee is earmarked, referral
        // fee leaves immediately on the input asset
        let reserve_in_next = self
            .state
            .reserve(side_in)
            .checked_add(est.fees.net_input)
            .and_then(|v| v.checked_add(est.fees.lp_fee))
            .ok_or(ProtocolError::MathOverflow)?;
        let reserve_out_next = self
            .state
            .reserve(side_out)
            .checked_sub(est.amount_out)
            .ok_or(ProtocolError::InsufficientLiquidity)?;
        if side_in == 0 {
            self.state.reserve0 = reserve_in_next;
            self.state.reserve1 = reserve_out_next;
            self.state.collected_protocol_fee0 = self
                .state
                .collected_protocol_fee0
                .checked_add(est.fees.protocol_fee)
                .ok_or(ProtocolError::MathOverflow)?;
        } else {
            self.state.reserve1 = reserve_in_next;
            self.state.reserve0 = reserve_out_next;
            self.state.collected_protocol_fee1 = self
                .state
                .collected_protocol_fee1
                .checked_add(est.fees.protocol_fee)
                .ok_or(ProtocolError::MathOverflow)?;
        }

        if est.fees.referral_fee > 0 {
            self.payout_via(ctx, side_in, msg.params.referral, est.fees.referral_fee, Vec::new());
        }

        let remaining = &msg.steps[1..];
        if remaining.is_empty() {
            debug!(out = est.amount_out, "swap settled");
            self.payout_via(
                ctx,
                side_out,
                msg.params.recipient,
                est.amount_out,
                msg.params.success_payload.clone(),
            );
        } else {
            let next = remaining[0].pool;
            let forward = SwapInternalMsg {
                proof: SenderProof::Pool { key: self.state.key },
                asset_in: self.state.key.asset(side_out),
                amount: est.amount_out,
                sender: msg.sender,
                steps: remaining.to_vec(),
                params: msg.params,
            };
            debug!(out = est.amount_out, hops_left = remaining.len(), "swap hop forwarded");
            ctx.send(next, 0, forward.to_bytes());
        }
        Ok(())
    }

    /// A hop we forwarded came back: the next pool refused it or does not
    /// exist. The output already left our reserves, so pay it out on our
    /// output asset, the asset that hop was about to receive.
    fn handle_bounce(&mut self, ctx: &mut Context, env: &Envelope) -> ProtocolResult {
        let payload = message_payload(&env.body);
        match message_type(&env.body) {
            MessageType::SwapInternal => {
                let msg = SwapInternalMsg::try_from_bytes(payload)?;
                let side = self
                    .state
                    .key
                    .side_of(&msg.asset_in)
                    .ok_or(ProtocolError::Malformed)?;
                debug!(reason = env.bounce_reason, "hop bounced; paying out input asset");
                self.payout_via(
                    ctx,
                    side,
                    msg.params.recipient,
                    msg.amount,
                    msg.params.failure_payload,
                );
                Ok(())
            }
            other => {
                warn!(op = ?other, reason = env.bounce_reason, "pool absorbed a bounce");
                Ok(())
            }
        }
    }

    // -- deposits -----------------------------------------------------------

    fn handle_deposit(&mut self, ctx: &mut Context, env: &Envelope) -> ProtocolResult {
        let msg = DepositInternalMsg::try_from_bytes(message_payload(&env.body))?;
        let expected = if msg.bootstrap {
            find_pool_creator_address(&msg.owner, &self.state.key)
        } else {
            find_depository_address(&msg.owner, &self.state.key)
        };
        ensure(env.sender == expected, ProtocolError::Authorization)?;

        // the escrow is gone by the time we run; a rejected deposit is
        // refunded from here, never bounced into the void
        if let Err(err) = self.apply_deposit(ctx, &msg) {
            debug!(%err, "deposit rejected; refunding both sides");
            if msg.amount0 > 0 {
                self.payout_via(ctx, 0, msg.owner, msg.amount0, msg.failure_payload.clone());
            }
            if msg.amount1 > 0 {
                self.payout_via(ctx, 1, msg.owner, msg.amount1, msg.failure_payload.clone());
            }
        }
        Ok(())
    }

    fn apply_deposit(&mut self, ctx: &mut Context, msg: &DepositInternalMsg) -> ProtocolResult {
        ensure(self.state.is_active, ProtocolError::InactivePool)?;
        self.check_deadline(ctx, msg.deadline)?;
        if msg.bootstrap {
            ensure(!self.state.is_initialized(), ProtocolError::AlreadyInitialized)?;
            ensure(msg.amount0 > 0 && msg.amount1 > 0, ProtocolError::InsufficientLiquidity)?;
        } else {
            ensure(self.state.is_initialized(), ProtocolError::InsufficientLiquidity)?;
        }

        let est = estimate_deposit(&self.state, msg.amount0, msg.amount1)?;
        if msg.bootstrap {
            ensure(
                est.minted >= self.params.min_initial_liquidity
                    && est.minted > self.params.locked_liquidity,
                ProtocolError::InsufficientLiquidity,
            )?;
            ensure(est.minted >= msg.min_liquidity, ProtocolError::Slippage)?;
            self.state.reserve0 = msg.amount0;
            self.state.reserve1 = msg.amount1;
            self.state.total_supply = est.minted;
            // the locked amount is minted to the null owner and can never
            // be burned, which keeps the pool initialized forever
            self.mint_liquidity(ctx, Address::ZERO, self.params.locked_liquidity, Vec::new());
            self.mint_liquidity(
                ctx,
                msg.recipient,
                est.minted - self.params.locked_liquidity,
                msg.success_payload.clone(),
            );
            debug!(minted = est.minted, "pool initialized");
        } else {
            ensure(est.minted > 0 && est.minted >= msg.min_liquidity, ProtocolError::Slippage)?;
            // compute every new value before touching state: the caller
            // turns our error into a refund, not a rollback
            let reserve0 = self
                .state
                .reserve0
                .checked_add(est.used0)
                .ok_or(ProtocolError::MathOverflow)?;
            let reserve1 = self
                .state
                .reserve1
                .checked_add(est.used1)
                .ok_or(ProtocolError::MathOverflow)?;
            let total_supply = self
                .state
                .total_supply
                .checked_add(est.minted)
                .ok_or(ProtocolError::MathOverflow)?;
            self.state.reserve0 = reserve0;
            self.state.reserve1 = reserve1;
            self.state.total_supply = total_supply;
            // constant-product absorbs proportionally; the over-supplied
            // remainder goes straight back out
            let excess0 = msg.amount0 - est.used0;
            let excess1 = msg.amount1 - est.used1;
            if excess0 > 0 {
                self.payout_via(ctx, 0, msg.owner, excess0, Vec::new());
            }
            if excess1 > 0 {
                self.payout_via(ctx, 1, msg.owner, excess1, Vec::new());
            }
            self.mint_liquidity(ctx, msg.recipient, est.minted, msg.success_payload.clone());
            debug!(minted = est.minted, "liquidity added");
        }
        Ok(())
    }

    // -- withdrawals --------------------------------------------------------

    fn handle_burn(&mut self, ctx: &mut Context, env: &Envelope) -> ProtocolResult {
        let msg = BurnNotificationMsg::try_from_bytes(message_payload(&env.body))?;
        let wallet = find_liquidity_wallet_address(&ctx.self_address(), &msg.owner);
        ensure(env.sender == wallet, ProtocolError::Authorization)?;
        ensure(msg.amount > 0, ProtocolError::InsufficientLiquidity)?;

        let (amount0, amount1) = estimate_withdraw(&self.state, msg.amount)?;
        ensure(amount0 > 0 || amount1 > 0, ProtocolError::InsufficientLiquidity)?;

        self.state.total_supply -= msg.amount;
        self.state.reserve0 -= amount0;
        self.state.reserve1 -= amount1;

        let recipient = if msg.recipient.is_zero() { msg.owner } else { msg.recipient };
        if amount0 > 0 {
            self.payout_via(ctx, 0, recipient, amount0, msg.success_payload.clone());
        }
        if amount1 > 0 {
            self.payout_via(ctx, 1, recipient, amount1, msg.success_payload);
        }
        debug!(burned = msg.amount, amount0, amount1, "liquidity withdrawn");
        Ok(())
    }

    // -- administration -----------------------------------------------------

    fn handle_update(&mut self, env: &Envelope) -> ProtocolResult {
        ensure(env.sender == self.state.factory, ProtocolError::Authorization)?;
        let msg = UpdatePoolInternalMsg::try_from_bytes(message_payload(&env.body))?;
        if msg.set_fees {
            ensure(
                msg.protocol_fee_bps <= MAX_FEE_BPS && msg.lp_fee_bps <= MAX_FEE_BPS,
                ProtocolError::Malformed,
            )?;
            self.state.protocol_fee_bps = msg.protocol_fee_bps;
            self.state.lp_fee_bps = msg.lp_fee_bps;
        }
        if msg.set_active {
            self.state.is_active = msg.is_active;
        }
        Ok(())
    }
}

impl Actor for Pool {
    fn kind(&self) -> &'static str {
        "pool"
    }

    fn receive(&mut self, ctx: &mut Context, env: &Envelope) -> ProtocolResult {
        if env.bounced {
            return self.handle_bounce(ctx, env);
        }
        match message_type(&env.body) {
            MessageType::SwapInternal => self.handle_swap(ctx, env),
            MessageType::DepositInternal => self.handle_deposit(ctx, env),
            MessageType::BurnNotification => self.handle_burn(ctx, env),
            MessageType::UpdatePoolInternal => self.handle_update(env),
            _ => Err(ProtocolError::Malformed),
        }
    }

    fn state_bytes(&self) -> Vec<u8> {
        self.state.pack()
    }

    fn load_state(&mut self, bytes: &[u8]) -> ProtocolResult {
        self.state = PoolState::unpack(bytes)?;
        Ok(())
    }
}
