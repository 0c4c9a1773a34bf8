use std::collections::{BTreeMap, HashMap, VecDeque};

use tracing::{debug, warn};

use riptide_api::address::{derive_address, Address};
use riptide_api::error::{ProtocolError, ProtocolResult};
use riptide_api::message::message_type;

use crate::actor::{Actor, Context};
use crate::envelope::Envelope;

/// Builds an actor from its init data. Registered per code-template hash.
pub type TemplateFn = Box<dyn Fn(&[u8]) -> ProtocolResult<Box<dyn Actor>>>;

struct ActorEntry {
    actor: Box<dyn Actor>,
    balance: u128,
}

enum Outcome {
    Applied { outbox: Vec<Envelope>, terminated: bool },
    Rejected(ProtocolError),
}

/// The shared asynchronous ledger. Actors own their state exclusively;
/// envelopes queue FIFO per (sender, destination) pair and pairs are
/// drained round-robin, so delivery order across pairs is deterministic
/// but interleaved. The protocol must not depend on it, and tests
/// exercise both arrival orders explicitly.
pub struct Ledger {
    actors: BTreeMap<Address, ActorEntry>,
    queues: BTreeMap<(Address, Address), VecDeque<Envelope>>,
    schedule: VecDeque<(Address, Address)>,
    templates: HashMap<[u8; 32], TemplateFn>,
    now: u64,
    delivered: u64,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            actors: BTreeMap::new(),
            queues: BTreeMap::new(),
            schedule: VecDeque::new(),
            templates: HashMap::new(),
            now: 0,
            delivered: 0,
        }
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn set_now(&mut self, now: u64) {
        self.now = now;
    }

    pub fn advance(&mut self, seconds: u64) {
        self.now += seconds;
    }

    pub fn register_template(&mut self, code_hash: [u8; 32], builder: TemplateFn) {
        self.templates.insert(code_hash, builder);
    }

    /// Installs an actor directly, bypassing content-addressed deploy.
    /// Used for the factory singleton and for external collaborators.
    pub fn install(&mut self, address: Address, actor: Box<dyn Actor>, balance: u128) {
        self.actors.insert(address, ActorEntry { actor, balance });
    }

    pub fn exists(&self, address: &Address) -> bool {
        self.actors.contains_key(address)
    }

    pub fn balance_of(&self, address: &Address) -> u128 {
        self.actors.get(address).map(|e| e.balance).unwrap_or(0)
    }

    /// The actor's current versioned state record, if it exists.
    pub fn state_of(&self, address: &Address) -> Option<Vec<u8>> {
        self.actors.get(address).map(|e| e.actor.state_bytes())
    }

    /// Injects an external message (a user transaction).
    pub fn send_external(&mut self, sender: Address, dest: Address, value: u128, body: Vec<u8>) {
        self.enqueue(Envelope::new(sender, dest, value, body));
    }

    pub fn enqueue(&mut self, env: Envelope) {
        let pair = (env.sender, env.dest);
        let queue = self.queues.entry(pair).or_default();
        if queue.is_empty() {
            self.schedule.push_back(pair);
        }
        queue.push_back(env);
    }

    /// Delivers one envelope. Returns false when the network is quiescent.
    pub fn step(&mut self) -> bool {
        let pair = loop {
            let Some(pair) = self.schedule.pop_front() else {
                return false;
            };
            if self.queues.get(&pair).is_some_and(|q| !q.is_empty()) {
                break pair;
            }
        };
        let queue = self.queues.get_mut(&pair).expect("scheduled pair has a queue");
        let env = queue.pop_front().expect("scheduled queue is nonempty");
        if !queue.is_empty() {
            self.schedule.push_back(pair);
        }
        self.deliver(env);
        true
    }

    /// Drains the network. The cap guards against runaway message loops;
    /// a legitimate flow is tens of messages deep at most.
    pub fn run_until_idle(&mut self) -> u64 {
        let start = self.delivered;
        while self.step() {
            assert!(
                self.delivered - start < 100_000,
                "message loop did not quiesce"
            );
        }
        self.delivered - start
    }

    fn deliver(&mut self, env: Envelope) {
        self.delivered += 1;
        debug!(
            op = ?message_type(&env.body),
            from = %env.sender,
            to = %env.dest,
            value = env.value,
            bounced = env.bounced,
            "deliver"
        );

        if !self.actors.contains_key(&env.dest) {
            if let Err(reason) = self.try_deploy(&env) {
                self.bounce(env, reason);
                return;
            }
        }

        let now = self.now;
        let outcome = {
            let entry = self.actors.get_mut(&env.dest).expect("destination exists");
            entry.balance += env.value;
            let snapshot = entry.actor.state_bytes();
            let mut ctx = Context::new(env.dest, now, entry.balance);
            match entry.actor.receive(&mut ctx, &env) {
                Ok(()) => {
                    let outgoing: u128 = ctx.outbox.iter().map(|e| e.value).sum();
                    if outgoing > entry.balance {
                        warn!(actor = entry.actor.kind(), "handler overspent its balance");
                        if entry.actor.load_state(&snapshot).is_err() {
                            warn!("state rollback failed");
                        }
                        entry.balance -= env.value;
                        Outcome::Rejected(ProtocolError::InsufficientValue)
                    } else {
                        entry.balance -= outgoing;
                        let mut outbox = std::mem::take(&mut ctx.outbox);
                        if ctx.terminated {
                            let remaining = entry.balance;
                            if let Some(last) = outbox.last_mut() {
                                last.value += remaining;
                                entry.balance = 0;
                            } else if remaining > 0 {
                                warn!(
                                    actor = entry.actor.kind(),
                                    remaining, "terminated with no outbox; value burned"
                                );
                            }
                        }
                        Outcome::Applied { outbox, terminated: ctx.terminated }
                    }
                }
                Err(err) => {
                    debug!(actor = entry.actor.kind(), %err, "handler rejected message");
                    if entry.actor.load_state(&snapshot).is_err() {
                        warn!("state rollback failed");
                    }
                    entry.balance -= env.value;
                    Outcome::Rejected(err)
                }
            }
        };

        match outcome {
            Outcome::Applied { outbox, terminated } => {
                if terminated {
                    debug!(address = %env.dest, "terminated");
                    self.actors.remove(&env.dest);
                }
                for out in outbox {
                    self.enqueue(out);
                }
            }
            Outcome::Rejected(reason) => self.bounce(env, reason),
        }
    }

    fn try_deploy(&mut self, env: &Envelope) -> Result<(), ProtocolError> {
        let Some(init) = &env.state_init else {
            return Err(ProtocolError::UnknownRouteTarget);
        };
        if derive_address(&init.code_hash, &init.data) != env.dest {
            return Err(ProtocolError::UnknownRouteTarget);
        }
        let Some(builder) = self.templates.get(&init.code_hash) else {
            return Err(ProtocolError::UnknownRouteTarget);
        };
        let actor = builder(&init.data)?;
        debug!(kind = actor.kind(), address = %env.dest, "deployed");
        self.actors.insert(env.dest, ActorEntry { actor, balance: 0 });
        Ok(())
    }

    /// A failed delivery returns the value to the sender as a bounced
    /// envelope. Bounced envelopes never bounce again: if the receiver of
    /// the bounce is gone or rejects it, the value stays where it landed.
    fn bounce(&mut self, env: Envelope, reason: ProtocolError) {
        if env.bounced {
            warn!(from = %env.sender, to = %env.dest, value = env.value, "dropping doubly-bounced envelope");
            if env.value > 0 {
                if let Some(entry) = self.actors.get_mut(&env.dest) {
                    entry.balance += env.value;
                }
            }
            return;
        }
        let mut bounced = Envelope::new(env.dest, env.sender, env.value, env.body);
        bounced.bounced = true;
        bounced.bounce_reason = reason.into();
        self.enqueue(bounced);
    }
}
