use riptide_api::address::Address;

/// Deploy descriptor attached to a message. When the destination does not
/// exist yet, the ledger instantiates it from the named code template,
/// but only if the destination address really is the content address of
/// (template, init data), so nobody can squat a foreign address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateInit {
    pub code_hash: [u8; 32],
    pub data: Vec<u8>,
}

/// One in-flight message. `value` is native value carried along; `body`
/// is the tagged binary record the receiver parses. A bounced envelope is
/// the runtime's failure signal: same body, reversed direction, value
/// returned, with the reason code of the failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub sender: Address,
    pub dest: Address,
    pub value: u128,
    pub body: Vec<u8>,
    pub bounced: bool,
    pub bounce_reason: u32,
    pub state_init: Option<StateInit>,
}

impl Envelope {
    pub fn new(sender: Address, dest: Address, value: u128, body: Vec<u8>) -> Self {
        Self {
            sender,
            dest,
            value,
            body,
            bounced: false,
            bounce_reason: 0,
            state_init: None,
        }
    }

    pub fn with_init(mut self, init: StateInit) -> Self {
        self.state_init = Some(init);
        self
    }
}
