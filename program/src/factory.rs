use tracing::{debug, warn};

use riptide_api::prelude::*;
use riptide_runtime::{Actor, Context, Envelope, StateInit};

/// The root registry. Holds the administrative capabilities and the code
/// templates, deploys vaults on demand, and relays admin-side updates to
/// pools and vaults. All of its address knowledge is derivable, never
/// stored per-actor.
pub struct Factory {
    state: FactoryState,
}

impl Factory {
    pub fn new(admin: Address, withdrawer: Address, params: ProtocolParams) -> ProtocolResult<Self> {
        params.validate()?;
        Ok(Self {
            state: FactoryState {
                admin,
                withdrawer,
                params,
                templates: TemplateSet::default(),
                code_version: 1,
            },
        })
    }

    fn require_admin(&self, sender: &Address) -> ProtocolResult {
        ensure(*sender == self.state.admin, ProtocolError::Authorization)
    }

    fn require_withdrawer(&self, sender: &Address) -> ProtocolResult {
        ensure(*sender == self.state.withdrawer, ProtocolError::Authorization)
    }

    fn handle_create_vault(&self, ctx: &mut Context, env: &Envelope) -> ProtocolResult {
        let msg = CreateVaultMsg::try_from_bytes(message_payload(&env.body))?;
        let init_data = vault_init_data(&msg.asset);
        let dest = find_vault_address_with(&self.state.templates, &msg.asset);
        debug!(vault = %dest, "create vault");
        // the deploy ping carries the attached value as the vault's float;
        // a token vault answers it by starting the custody handshake
        ctx.send_with_init(
            dest,
            env.value,
            Vec::new(),
            StateInit { code_hash: self.state.templates.vault, data: init_data },
        );
        Ok(())
    }

    fn handle_activate_vault(&self, ctx: &mut Context, env: &Envelope) -> ProtocolResult {
        self.require_admin(&env.sender)?;
        let msg = ActivateVaultMsg::try_from_bytes(message_payload(&env.body))?;
        let dest = find_vault_address_with(&self.state.templates, &msg.asset);
        ctx.send(dest, 0, msg.to_bytes());
        Ok(())
    }

    fn handle_update_admin(&mut self, env: &Envelope) -> ProtocolResult {
        self.require_admin(&env.sender)?;
        let msg = UpdateAdminMsg::try_from_bytes(message_payload(&env.body))?;
        ensure(!msg.admin.is_zero(), ProtocolError::Malformed)?;
        self.state.admin = msg.admin;
        Ok(())
    }

    fn handle_update_withdrawer(&mut self, env: &Envelope) -> ProtocolResult {
        self.require_admin(&env.sender)?;
        let msg = UpdateWithdrawerMsg::try_from_bytes(message_payload(&env.body))?;
        ensure(!msg.withdrawer.is_zero(), ProtocolError::Malformed)?;
        self.state.withdrawer = msg.withdrawer;
        Ok(())
    }

    fn handle_update_code_templates(&mut self, env: &Envelope) -> ProtocolResult {
        self.require_admin(&env.sender)?;
        let msg = UpdateCodeTemplatesMsg::try_from_bytes(message_payload(&env.body))?;
        ensure(msg.code_version > self.state.code_version, ProtocolError::Malformed)?;
        self.state.templates = msg.templates;
        self.state.code_version = msg.code_version;
        Ok(())
    }

    fn handle_update_pool(&self, ctx: &mut Context, env: &Envelope) -> ProtocolResult {
        self.require_admin(&env.sender)?;
        let msg = UpdatePoolMsg::try_from_bytes(message_payload(&env.body))?;
        msg.key.validate()?;
        ensure(msg.set_fees || msg.set_active, ProtocolError::Malformed)?;
        if msg.set_fees {
            ensure(
                msg.protocol_fee_bps <= MAX_FEE_BPS && msg.lp_fee_bps <= MAX_FEE_BPS,
                ProtocolError::Malformed,
            )?;
        }
        let forward = UpdatePoolInternalMsg {
            set_fees: msg.set_fees,
            protocol_fee_bps: msg.protocol_fee_bps,
            lp_fee_bps: msg.lp_fee_bps,
            set_active: msg.set_active,
            is_active: msg.is_active,
        };
        let dest = find_pool_address_with(&self.state.templates, &msg.key);
        ctx.send(dest, 0, forward.to_bytes());
        Ok(())
    }

    fn handle_withdraw(&self, ctx: &mut Context, env: &Envelope) -> ProtocolResult {
        self.require_withdrawer(&env.sender)?;
        let msg = WithdrawMsg::try_from_bytes(message_payload(&env.body))?;
        ensure(msg.amount > 0 && !msg.to.is_zero(), ProtocolError::Malformed)?;
        let payout = PayoutMsg {
            proof: SenderProof::Factory,
            recipient: msg.to,
            amount: msg.amount,
            payload: Vec::new(),
        };
        let dest = find_vault_address_with(&self.state.templates, &msg.asset);
        ctx.send(dest, 0, payout.to_bytes());
        Ok(())
    }
}

impl Actor for Factory {
    fn kind(&self) -> &'static str {
        "factory"
    }

    fn receive(&mut self, ctx: &mut Context, env: &Envelope) -> ProtocolResult {
        if env.bounced {
            // an admin relay target is missing; nothing to unwind here
            warn!(reason = env.bounce_reason, "factory absorbed a bounce");
            return Ok(());
        }
        match message_type(&env.body) {
            MessageType::CreateVault => self.handle_create_vault(ctx, env),
            MessageType::ActivateVault => self.handle_activate_vault(ctx, env),
            MessageType::UpdateAdmin => self.handle_update_admin(env),
            MessageType::UpdateWithdrawer => self.handle_update_withdrawer(env),
            MessageType::UpdateCodeTemplates => self.handle_update_code_templates(env),
            MessageType::UpdatePool => self.handle_update_pool(ctx, env),
            MessageType::Withdraw => self.handle_withdraw(ctx, env),
            _ => Err(ProtocolError::Malformed),
        }
    }

    fn state_bytes(&self) -> Vec<u8> {
        self.state.pack()
    }

    fn load_state(&mut self, bytes: &[u8]) -> ProtocolResult {
        self.state = FactoryState::unpack(bytes)?;
        Ok(())
    }
}
