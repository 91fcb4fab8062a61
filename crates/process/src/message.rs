//! Envelope catalog exchanged between managers and processes.
//!
//! Tags are fixed strings shared with every receiver; a receiver that sees a
//! tag it does not know drops the message without error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tagged message envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Envelope {
	/// Readiness probe sent to a freshly spawned process.
	Handshake,
	/// Acknowledgement of a [`Envelope::Handshake`].
	HandshakeReply,
	/// The process is about to become visible.
	WillShow,
	/// The process became visible.
	DidShow,
	/// The process is about to be hidden.
	WillHide,
	/// The process was hidden.
	DidHide,
	/// Application data.
	Message {
		/// Payload, `null` when absent.
		#[serde(default)]
		data: Value,
	},
}

impl Envelope {
	/// Builds a handshake request.
	pub const fn handshake() -> Self {
		Self::Handshake
	}

	/// Builds a handshake acknowledgement.
	pub const fn handshake_reply() -> Self {
		Self::HandshakeReply
	}

	pub const fn will_show() -> Self {
		Self::WillShow
	}

	pub const fn did_show() -> Self {
		Self::DidShow
	}

	pub const fn will_hide() -> Self {
		Self::WillHide
	}

	pub const fn did_hide() -> Self {
		Self::DidHide
	}

	/// Builds a data message.
	pub fn message(data: impl Into<Value>) -> Self {
		Self::Message { data: data.into() }
	}

	/// Returns the wire tag.
	pub const fn tag(&self) -> &'static str {
		match self {
			Self::Handshake => "handshake",
			Self::HandshakeReply => "handshake-reply",
			Self::WillShow => "will-show",
			Self::DidShow => "did-show",
			Self::WillHide => "will-hide",
			Self::DidHide => "did-hide",
			Self::Message { .. } => "message",
		}
	}

	/// Decodes an envelope from its JSON form.
	///
	/// Returns `None` for unknown tags and malformed envelopes.
	pub fn decode(value: Value) -> Option<Self> {
		match serde_json::from_value(value) {
			Ok(envelope) => Some(envelope),
			Err(err) => {
				tracing::trace!(error = %err, "process.envelope.undecodable");
				None
			}
		}
	}
}

/// Delegate acknowledgement of a handshake request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandshakeReply;

impl From<HandshakeReply> for Envelope {
	fn from(_: HandshakeReply) -> Self {
		Envelope::HandshakeReply
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	#[test]
	fn tags_match_wire_names() {
		let cases = [
			(Envelope::handshake(), json!({"type": "handshake"})),
			(Envelope::handshake_reply(), json!({"type": "handshake-reply"})),
			(Envelope::will_show(), json!({"type": "will-show"})),
			(Envelope::did_show(), json!({"type": "did-show"})),
			(Envelope::will_hide(), json!({"type": "will-hide"})),
			(Envelope::did_hide(), json!({"type": "did-hide"})),
		];
		for (envelope, expected) in cases {
			assert_eq!(expected["type"].as_str(), Some(envelope.tag()));
			assert_eq!(serde_json::to_value(&envelope).unwrap(), expected);
		}
	}

	#[test]
	fn message_carries_data() {
		let envelope = Envelope::message(json!({"foo": 1}));
		assert_eq!(envelope.tag(), "message");
		assert_eq!(serde_json::to_value(&envelope).unwrap(), json!({"type": "message", "data": {"foo": 1}}));
	}

	#[test]
	fn message_data_defaults_to_null() {
		let decoded = Envelope::decode(json!({"type": "message"}));
		assert_eq!(decoded, Some(Envelope::Message { data: Value::Null }));
	}

	#[test]
	fn unknown_tag_decodes_to_none() {
		assert_eq!(Envelope::decode(json!({"type": "will-explode"})), None);
		assert_eq!(Envelope::decode(json!({"kind": "handshake"})), None);
	}

	#[test]
	fn handshake_reply_converts_into_envelope() {
		assert_eq!(Envelope::from(HandshakeReply), Envelope::HandshakeReply);
	}
}
