//! Error types for mailbox delivery.

use std::time::Duration;

use thiserror::Error;

use crate::MailboxId;

/// Errors raised by the exchange while routing a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
	/// No mailbox is routed under the address.
	#[error("no mailbox routed at {0}")]
	UnknownAddress(MailboxId),

	/// The mailbox exists in the table but its receiver is gone.
	#[error("mailbox {0} is closed")]
	Closed(MailboxId),

	/// A mailbox with this address is already routed.
	#[error("mailbox address {0} is already in use")]
	DuplicateAddress(MailboxId),

	/// No reply arrived before the deadline.
	#[error("no reply from {address} within {}ms", timeout.as_millis())]
	Timeout {
		/// Address the request was sent to.
		address: MailboxId,
		/// The deadline that elapsed.
		timeout: Duration,
	},

	/// The receiver answered the request with a rejection.
	#[error("request to {address} rejected: {reason}")]
	Rejected {
		/// Address the request was sent to.
		address: MailboxId,
		/// Rejection reason supplied by the receiver.
		reason: String,
	},

	/// The receiver dropped the reply port without answering.
	#[error("mailbox {0} dropped the request without replying")]
	NoReply(MailboxId),
}

/// Result type for exchange operations.
pub type Result<T> = std::result::Result<T, ExchangeError>;
