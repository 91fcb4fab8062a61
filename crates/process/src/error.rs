//! Error types for process launch and routing.

use std::time::Duration;

use kestrel_exchange::ExchangeError;
use thiserror::Error;

use crate::Pid;

/// Errors surfaced by the process manager.
#[derive(Debug, Error)]
pub enum ProcessError {
	/// The process spec names a kind this manager cannot launch.
	#[error("invalid process spec type: {0}")]
	InvalidProcessSpecType(String),

	/// The new process did not acknowledge the handshake in time.
	#[error("handshake with {pid} timed out after {}ms", timeout.as_millis())]
	HandshakeTimeout {
		/// Identity the process would have been registered under.
		pid: Pid,
		/// The deadline that elapsed.
		timeout: Duration,
	},

	/// The new process's delegate refused the handshake.
	#[error("handshake with {pid} rejected: {reason}")]
	HandshakeRejected {
		/// Identity the process would have been registered under.
		pid: Pid,
		/// Reason returned by the delegate.
		reason: String,
	},

	/// Delivery failed in the mailbox exchange.
	#[error(transparent)]
	Transport(#[from] ExchangeError),

	/// The owning manager was disposed or dropped.
	#[error("process manager disposed")]
	ManagerDisposed,
}

impl ProcessError {
	/// Returns true for handshake timeouts.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::HandshakeTimeout { .. })
	}
}

/// Result type for process operations.
pub type Result<T> = std::result::Result<T, ProcessError>;
