//! Mailbox receiving ends, deliveries and reply ports.

use std::sync::Weak;

use tokio::sync::{mpsc, oneshot};

use crate::MailboxId;
use crate::exchange::Routes;

/// Answer sent back through a [`ReplyPort`].
pub(crate) type ReplyResult<M> = std::result::Result<M, String>;

/// One-shot answer channel attached to a request.
///
/// Dropping the port without answering surfaces as
/// [`ExchangeError::NoReply`](crate::ExchangeError::NoReply) on the requester.
#[derive(Debug)]
pub struct ReplyPort<M> {
	tx: oneshot::Sender<ReplyResult<M>>,
}

impl<M> ReplyPort<M> {
	pub(crate) fn new(tx: oneshot::Sender<ReplyResult<M>>) -> Self {
		Self { tx }
	}

	/// Answers the request. Returns `false` when the requester stopped waiting.
	pub fn reply(self, msg: M) -> bool {
		self.tx.send(Ok(msg)).is_ok()
	}

	/// Rejects the request. Returns `false` when the requester stopped waiting.
	pub fn reject(self, reason: impl Into<String>) -> bool {
		self.tx.send(Err(reason.into())).is_ok()
	}

	/// Returns true if the requester is no longer waiting.
	pub fn is_abandoned(&self) -> bool {
		self.tx.is_closed()
	}
}

/// One inbound message.
#[derive(Debug)]
pub struct Delivery<M> {
	message: M,
	reply: Option<ReplyPort<M>>,
}

impl<M> Delivery<M> {
	pub(crate) fn new(message: M, reply: Option<ReplyPort<M>>) -> Self {
		Self { message, reply }
	}

	/// Returns the message.
	pub fn message(&self) -> &M {
		&self.message
	}

	/// Returns true if the sender awaits an answer.
	pub fn expects_reply(&self) -> bool {
		self.reply.is_some()
	}

	/// Splits the delivery into its message and optional reply port.
	pub fn into_parts(self) -> (M, Option<ReplyPort<M>>) {
		(self.message, self.reply)
	}
}

/// Deregisters a mailbox route without owning its receiver.
///
/// A closer only ever removes the route of its own channel. Once the address
/// has been released and claimed by a newer mailbox, closing is a no-op.
#[derive(Debug)]
pub struct MailboxCloser<M> {
	id: MailboxId,
	routes: Weak<Routes<M>>,
	channel: mpsc::WeakUnboundedSender<Delivery<M>>,
}

impl<M> Clone for MailboxCloser<M> {
	fn clone(&self) -> Self {
		Self {
			id: self.id.clone(),
			routes: Weak::clone(&self.routes),
			channel: self.channel.clone(),
		}
	}
}

impl<M> MailboxCloser<M> {
	/// Address of the mailbox this closer controls.
	pub fn id(&self) -> &MailboxId {
		&self.id
	}

	/// Removes the route. Further sends to the address fail with `UnknownAddress`.
	///
	/// Closing an already closed mailbox is a no-op.
	pub fn close(&self) {
		let Some(routes) = self.routes.upgrade() else {
			return;
		};
		// The routing table holds the only long-lived sender, so a failed upgrade
		// means our route is already gone.
		let Some(own) = self.channel.upgrade() else {
			return;
		};
		let mut routes = routes.write();
		if routes.get(&self.id).is_some_and(|tx| tx.same_channel(&own)) {
			routes.remove(&self.id);
			drop(routes);
			tracing::trace!(mailbox = %self.id, "exchange.mailbox.close");
		}
	}
}

/// Receiving end of one routed address.
///
/// Dropping the mailbox removes its route from the exchange.
#[derive(Debug)]
pub struct Mailbox<M> {
	rx: mpsc::UnboundedReceiver<Delivery<M>>,
	closer: MailboxCloser<M>,
}

impl<M> Mailbox<M> {
	pub(crate) fn new(
		id: MailboxId,
		rx: mpsc::UnboundedReceiver<Delivery<M>>,
		channel: mpsc::WeakUnboundedSender<Delivery<M>>,
		routes: Weak<Routes<M>>,
	) -> Self {
		Self {
			rx,
			closer: MailboxCloser { id, routes, channel },
		}
	}

	/// Returns this mailbox's address.
	pub fn id(&self) -> &MailboxId {
		self.closer.id()
	}

	/// Returns a detachable closer for this mailbox.
	pub fn closer(&self) -> MailboxCloser<M> {
		self.closer.clone()
	}

	/// Receives one delivery. Returns `None` once closed and drained.
	pub async fn recv(&mut self) -> Option<Delivery<M>> {
		self.rx.recv().await
	}

	/// Deregisters the route and stops accepting messages.
	///
	/// Deliveries already queued can still be drained with [`Self::recv`].
	pub fn close(&mut self) {
		self.closer.close();
		self.rx.close();
	}
}

impl<M> Drop for Mailbox<M> {
	fn drop(&mut self) {
		self.closer.close();
	}
}
