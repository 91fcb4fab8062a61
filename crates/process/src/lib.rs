//! Process lifecycle on top of a mailbox exchange.
//!
//! A [`ProcessManager`] spawns local processes, confirms each one with a
//! bounded handshake, registers it, and hands back an opaque [`Pid`] used to
//! route further messages:
//! * `ProcessSpec`: how to create a process (local, or reserved remote)
//! * `ProcessDelegate`: optional handlers a process reacts with
//! * `Envelope`: the tagged message catalog
//! * `LocalProcess`: one delegate bound to one mailbox

pub mod config;
mod courier;
pub mod delegate;
pub mod error;
pub mod manager;
pub mod message;
pub mod pid;
pub mod process;
pub mod spec;
mod spawn;

pub use config::{DEFAULT_HANDSHAKE_TIMEOUT, ManagerConfig};
pub use delegate::{ProcessContext, ProcessDelegate};
pub use error::{ProcessError, Result};
pub use kestrel_exchange::{Exchange, ExchangeError, MailboxId};
pub use manager::ProcessManager;
pub use message::{Envelope, HandshakeReply};
pub use pid::Pid;
pub use process::LocalProcess;
pub use spec::{LocalSpec, ProcessKind, ProcessSpec, RemoteSpec};
