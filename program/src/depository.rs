use tracing::{debug, warn};

use riptide_api::prelude::*;
use riptide_runtime::{Actor, Context, Envelope, StateInit};

/// Two-sided escrow actor, shared by the steady-state LiquidityDepository
/// and the pool-bootstrapping PoolCreator. Its address is a pure function
/// of (owner, pool key), so the two sides of a deposit find each other
/// without coordination: whichever message arrives first deploys the
/// escrow and becomes the lock, the second consumes it.
///
/// The escrow never outlives one match/refund cycle: it self-destructs
/// when it forwards the combined deposit and when the owner reclaims.
pub struct Escrow {
    state: EscrowState,
}

impl Escrow {
    pub fn from_init(kind: EscrowKind, data: &[u8]) -> ProtocolResult<Self> {
        ensure(data.len() == 32 + POOL_KEY_LEN, ProtocolError::Malformed)?;
        let owner = Address(data[..32].try_into().unwrap());
        let key = PoolKey::read_from(&data[32..])?;
        key.validate()?;
        Ok(Self { state: EscrowState::pending(kind, owner, key) })
    }

    fn proof(&self) -> SenderProof {
        match self.state.kind {
            EscrowKind::Depository => SenderProof::Depository {
                owner: self.state.owner,
                key: self.state.key,
            },
            EscrowKind::PoolCreator => SenderProof::PoolCreator {
                owner: self.state.owner,
                key: self.state.key,
            },
        }
    }

    fn refund_via_vault(&self, ctx: &mut Context, side: usize, amount: u64) {
        let vault = find_vault_address(&self.state.key.asset(side));
        let body = PayoutMsg {
            proof: self.proof(),
            recipient: self.state.owner,
            amount,
            payload: Vec::new(),
        }
        .to_bytes();
        ctx.send(vault, 0, body);
    }

    fn handle_deposit(&mut self, ctx: &mut Context, env: &Envelope) -> ProtocolResult {
        let msg = EscrowDepositMsg::try_from_bytes(message_payload(&env.body))?;
        ensure(
            msg.owner == self.state.owner && msg.key == self.state.key,
            ProtocolError::Authorization,
        )?;
        let side = msg.side as usize;
        let expected_vault = find_vault_address(&self.state.key.asset(side));
        ensure(env.sender == expected_vault, ProtocolError::Authorization)?;

        if self.state.filled(side) {
            // same side twice: refund the duplicate, never overwrite the
            // held unit
            debug!(side, amount = msg.amount, "duplicate side refunded");
            let body = PayoutMsg {
                proof: self.proof(),
                recipient: self.state.owner,
                amount: msg.amount,
                payload: Vec::new(),
            }
            .to_bytes();
            ctx.send(expected_vault, 0, body);
            return Ok(());
        }

        if !self.state.filled0 && !self.state.filled1 {
            // first arrival fixes the operation's parameters
            self.state.min_liquidity = msg.min_liquidity;
            self.state.deadline = msg.deadline;
            self.state.recipient = msg.recipient;
            self.state.success_payload = msg.success_payload;
            self.state.failure_payload = msg.failure_payload;
        }
        self.state.fill(side, msg.amount);

        if self.state.both_filled() {
            let pool = find_pool_address(&self.state.key);
            let forward = DepositInternalMsg {
                owner: self.state.owner,
                amount0: self.state.side0,
                amount1: self.state.side1,
                min_liquidity: self.state.min_liquidity,
                deadline: self.state.deadline,
                recipient: self.state.recipient,
                bootstrap: self.state.kind == EscrowKind::PoolCreator,
                success_payload: self.state.success_payload.clone(),
                failure_payload: self.state.failure_payload.clone(),
            };
            debug!(
                amount0 = self.state.side0,
                amount1 = self.state.side1,
                "both sides matched; forwarding to pool"
            );
            // deterministic address + state init: the first deposit into a
            // fresh pair also deploys the pool actor itself
            ctx.send_with_init(
                pool,
                0,
                forward.to_bytes(),
                StateInit {
                    code_hash: POOL_TEMPLATE,
                    data: pool_init_data(&self.state.key),
                },
            );
            ctx.terminate();
        }
        Ok(())
    }

    fn handle_withdraw_funds(&mut self, ctx: &mut Context, env: &Envelope) -> ProtocolResult {
        ensure(env.sender == self.state.owner, ProtocolError::Authorization)?;
        debug!("pending escrow reclaimed by owner");
        if self.state.filled0 {
            self.refund_via_vault(ctx, 0, self.state.side0);
        }
        if self.state.filled1 {
            self.refund_via_vault(ctx, 1, self.state.side1);
        }
        ctx.terminate();
        Ok(())
    }
}

impl Actor for Escrow {
    fn kind(&self) -> &'static str {
        match self.state.kind {
            EscrowKind::Depository => "depository",
            EscrowKind::PoolCreator => "pool-creator",
        }
    }

    fn receive(&mut self, ctx: &mut Context, env: &Envelope) -> ProtocolResult {
        if env.bounced {
            // the combined forward carries the pool's state init, so it
            // cannot fail to deliver; anything else is unexpected
            warn!(reason = env.bounce_reason, "escrow absorbed a bounce");
            return Ok(());
        }
        match message_type(&env.body) {
            MessageType::EscrowDeposit => self.handle_deposit(ctx, env),
            MessageType::WithdrawFunds => self.handle_withdraw_funds(ctx, env),
            _ => Err(ProtocolError::Malformed),
        }
    }

    fn state_bytes(&self) -> Vec<u8> {
        self.state.pack()
    }

    fn load_state(&mut self, bytes: &[u8]) -> ProtocolResult {
        self.state = EscrowState::unpack(bytes)?;
        Ok(())
    }
}
