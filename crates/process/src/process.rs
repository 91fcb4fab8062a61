use kestrel_exchange::{Mailbox, MailboxId};

use crate::courier::Courier;
use crate::delegate::ProcessDelegate;
use crate::message::Envelope;

/// Runtime instance binding one delegate to one mailbox.
///
/// Dropping the process stops its courier and releases its address.
#[derive(Debug)]
pub struct LocalProcess {
	id: String,
	manager_mailbox_id: MailboxId,
	courier: Courier,
}

impl LocalProcess {
	/// Starts dispatching `mailbox` deliveries to `delegate`.
	pub fn new(id: impl Into<String>, manager_mailbox_id: MailboxId, mailbox: Mailbox<Envelope>, delegate: Box<dyn ProcessDelegate>) -> Self {
		Self {
			id: id.into(),
			manager_mailbox_id,
			courier: Courier::spawn(mailbox, delegate),
		}
	}

	/// Identity this process is registered under.
	pub fn id(&self) -> &str {
		&self.id
	}

	/// Address of the bound mailbox.
	pub fn mailbox_id(&self) -> &MailboxId {
		self.courier.address()
	}

	/// Address of the owning manager.
	pub fn manager_mailbox_id(&self) -> &MailboxId {
		&self.manager_mailbox_id
	}

	/// Returns false once the courier task has exited.
	pub fn is_running(&self) -> bool {
		!self.courier.is_finished()
	}

	/// Stops the courier and releases the mailbox address.
	pub fn stop(&self) {
		self.courier.stop();
	}
}
