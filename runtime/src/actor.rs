use riptide_api::address::Address;
use riptide_api::error::ProtocolResult;

use crate::envelope::{Envelope, StateInit};

/// An isolated unit of state plus a message handler. The ledger delivers
/// one envelope at a time, run to completion; a returned error rolls the
/// actor's state back and bounces the envelope, so every processed message
/// is an atomic state transition.
pub trait Actor {
    /// Short name for logs.
    fn kind(&self) -> &'static str;

    fn receive(&mut self, ctx: &mut Context, env: &Envelope) -> ProtocolResult;

    /// The actor's single versioned state record.
    fn state_bytes(&self) -> Vec<u8>;

    /// Restores a record produced by [`Actor::state_bytes`]. Used by the
    /// ledger to roll back a failed transition.
    fn load_state(&mut self, bytes: &[u8]) -> ProtocolResult;
}

/// Handler-side effects: outbound messages, termination, clock and value
/// access. Effects are collected and applied by the ledger only when the
/// handler returns success.
pub struct Context {
    self_address: Address,
    now: u64,
    balance: u128,
    pub(crate) outbox: Vec<Envelope>,
    pub(crate) terminated: bool,
}

impl Context {
    pub(crate) fn new(self_address: Address, now: u64, balance: u128) -> Self {
        Self {
            self_address,
            now,
            balance,
            outbox: Vec::new(),
            terminated: false,
        }
    }

    pub fn self_address(&self) -> Address {
        self.self_address
    }

    /// Ledger time, unix seconds. Deadlines compare against this.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Balance as of this message, incoming value included.
    pub fn balance(&self) -> u128 {
        self.balance
    }

    pub fn send(&mut self, dest: Address, value: u128, body: Vec<u8>) {
        self.outbox.push(Envelope::new(self.self_address, dest, value, body));
    }

    pub fn send_with_init(&mut self, dest: Address, value: u128, body: Vec<u8>, init: StateInit) {
        self.outbox
            .push(Envelope::new(self.self_address, dest, value, body).with_init(init));
    }

    /// Self-destruct after this message: the ledger removes the actor and
    /// attaches any remaining balance to the last outbound envelope.
    pub fn terminate(&mut self) {
        self.terminated = true;
    }
}
