//! The shared asynchronous ledger runtime: isolated actors with serialized
//! mailboxes, per-sender-pair FIFO delivery, value accounting, lazy
//! content-verified deployment, and bounce-based failure signaling.
//!
//! There is no synchronous call/return anywhere; failure is a separate
//! inbound message, and every multi-message protocol built on top must be
//! safe under any interleaving of sender pairs.

mod actor;
mod envelope;
mod ledger;

pub use actor::{Actor, Context};
pub use envelope::{Envelope, StateInit};
pub use ledger::{Ledger, TemplateFn};
