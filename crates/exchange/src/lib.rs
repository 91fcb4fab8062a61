//! In-process mailbox exchange.
//!
//! This crate provides the transport that processes are addressed through:
//! * `MailboxId`: Unique, opaque mailbox address
//! * `Exchange`: Shared routing table with fire-and-forget and request/response delivery
//! * `Mailbox`: Receiving end bound to one address
//! * `ReplyPort`: One-shot answer channel attached to a request

#![warn(missing_docs)]

pub mod address;
pub mod error;
pub mod exchange;
pub mod mailbox;

pub use address::MailboxId;
pub use error::{ExchangeError, Result};
pub use exchange::Exchange;
pub use mailbox::{Delivery, Mailbox, MailboxCloser, ReplyPort};
