use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Weak;

use kestrel_exchange::MailboxId;
use serde_json::Value;

use crate::manager::ManagerInner;
use crate::{ProcessError, Result};

/// Opaque handle to a process owned by a [`ProcessManager`](crate::ProcessManager).
///
/// A PID does not keep its manager alive. Sending through a PID whose manager
/// was dropped or disposed fails with [`ProcessError::ManagerDisposed`].
#[derive(Clone)]
pub struct Pid {
	address: MailboxId,
	manager: Weak<ManagerInner>,
}

impl Pid {
	pub(crate) fn new(address: MailboxId, manager: Weak<ManagerInner>) -> Self {
		Self { address, manager }
	}

	/// Opaque identity token. Do not parse it.
	pub fn id(&self) -> &str {
		self.address.as_str()
	}

	pub(crate) fn address(&self) -> &MailboxId {
		&self.address
	}

	/// Sends `data` to this process as a `message` envelope.
	pub fn send(&self, data: impl Into<Value>) -> Result<()> {
		let Some(manager) = self.manager.upgrade() else {
			return Err(ProcessError::ManagerDisposed);
		};
		manager.send_message(self.id(), data.into())
	}
}

impl PartialEq for Pid {
	fn eq(&self, other: &Self) -> bool {
		self.address == other.address
	}
}

impl Eq for Pid {}

impl Hash for Pid {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.address.hash(state);
	}
}

impl fmt::Display for Pid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.id())
	}
}

impl fmt::Debug for Pid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Pid").field(&self.id()).finish()
	}
}
