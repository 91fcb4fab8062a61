//! Handlers a local process implements.

use async_trait::async_trait;
use kestrel_exchange::MailboxId;
use serde_json::Value;

use crate::message::HandshakeReply;

/// Caller-supplied message handlers that define a process's behavior.
///
/// Every handler is optional. Unimplemented handlers ignore their message.
#[async_trait]
pub trait ProcessDelegate: Send + 'static {
	/// Answers the readiness probe sent by the owning manager.
	///
	/// Returning `Err` fails the launch with a handshake rejection.
	async fn on_handshake_request(&mut self) -> Result<HandshakeReply, String> {
		Ok(HandshakeReply)
	}

	async fn on_will_show(&mut self) {}

	async fn on_did_show(&mut self) {}

	async fn on_will_hide(&mut self) {}

	async fn on_did_hide(&mut self) {}

	/// Receives the payload of a `message` envelope.
	async fn on_message(&mut self, _data: Value) {}
}

/// Capabilities handed to a delegate factory.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ProcessContext {
	mailbox_id: MailboxId,
	manager_mailbox_id: MailboxId,
}

impl ProcessContext {
	pub(crate) fn new(mailbox_id: MailboxId, manager_mailbox_id: MailboxId) -> Self {
		Self {
			mailbox_id,
			manager_mailbox_id,
		}
	}

	/// Address of the process being created.
	pub fn mailbox_id(&self) -> &MailboxId {
		&self.mailbox_id
	}

	/// Address of the manager that owns the process.
	pub fn manager_mailbox_id(&self) -> &MailboxId {
		&self.manager_mailbox_id
	}
}
