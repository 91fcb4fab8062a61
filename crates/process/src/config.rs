//! Manager configuration.

use std::time::Duration;

use kestrel_exchange::MailboxId;
use serde::Deserialize;

/// Handshake timeout applied when a spec does not override it.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Construction settings for a [`ProcessManager`](crate::ProcessManager).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManagerConfig {
	/// Address of the manager's own mailbox. Generated when unset.
	pub mailbox_id: Option<MailboxId>,
	/// Default handshake timeout in milliseconds.
	pub handshake_timeout_ms: u64,
}

impl ManagerConfig {
	/// Sets the manager mailbox address.
	#[must_use]
	pub fn mailbox_id(mut self, id: impl Into<MailboxId>) -> Self {
		self.mailbox_id = Some(id.into());
		self
	}

	/// Sets the default handshake timeout.
	#[must_use]
	pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
		self.handshake_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
		self
	}

	/// Returns the default handshake timeout.
	pub fn default_handshake_timeout(&self) -> Duration {
		Duration::from_millis(self.handshake_timeout_ms)
	}
}

impl Default for ManagerConfig {
	fn default() -> Self {
		Self {
			mailbox_id: None,
			handshake_timeout_ms: DEFAULT_HANDSHAKE_TIMEOUT.as_millis() as u64,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_to_one_second_handshake() {
		let config = ManagerConfig::default();
		assert_eq!(config.mailbox_id, None);
		assert_eq!(config.default_handshake_timeout(), Duration::from_millis(1000));
	}

	#[test]
	fn deserializes_partial_config() {
		let config: ManagerConfig = serde_json::from_str(r#"{"mailbox_id": "root"}"#).unwrap();
		assert_eq!(config.mailbox_id, Some(MailboxId::new("root")));
		assert_eq!(config.handshake_timeout_ms, 1000);

		let config: ManagerConfig = serde_json::from_str(r#"{"handshake_timeout_ms": 50}"#).unwrap();
		assert_eq!(config.default_handshake_timeout(), Duration::from_millis(50));
	}

	#[test]
	fn rejects_unknown_keys() {
		assert!(serde_json::from_str::<ManagerConfig>(r#"{"handshakeTimeout": 50}"#).is_err());
	}
}
