//! Mailbox addresses.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique address of one mailbox.
///
/// Callers may compare, hash and print an address but must not rely on its
/// internal structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MailboxId(String);

impl MailboxId {
	/// Wraps a caller-chosen address.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// Generates a fresh random address.
	pub fn generate() -> Self {
		Self(uuid::Uuid::new_v4().to_string())
	}

	/// Returns the address as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for MailboxId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for MailboxId {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

impl From<String> for MailboxId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

impl AsRef<str> for MailboxId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
