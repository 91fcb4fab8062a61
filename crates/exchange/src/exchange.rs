//! Routing table and delivery primitives.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::{mpsc, oneshot};

use crate::mailbox::{Delivery, Mailbox, ReplyPort};
use crate::{ExchangeError, MailboxId, Result};

/// Routing table shared by an exchange and the mailboxes it created.
pub(crate) type Routes<M> = RwLock<HashMap<MailboxId, mpsc::UnboundedSender<Delivery<M>>>>;

/// Cloneable handle to one in-process mailbox namespace.
///
/// Delivery to a single mailbox is FIFO per sender. Nothing is guaranteed
/// across senders or across mailboxes.
pub struct Exchange<M> {
	routes: Arc<Routes<M>>,
}

impl<M> Clone for Exchange<M> {
	fn clone(&self) -> Self {
		Self {
			routes: Arc::clone(&self.routes),
		}
	}
}

impl<M> Default for Exchange<M> {
	fn default() -> Self {
		Self::new()
	}
}

impl<M> std::fmt::Debug for Exchange<M> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Exchange").field("mailboxes", &self.mailbox_count()).finish()
	}
}

impl<M> Exchange<M> {
	/// Creates an empty exchange.
	pub fn new() -> Self {
		Self {
			routes: Arc::new(RwLock::new(HashMap::new())),
		}
	}

	/// Creates a mailbox under a freshly generated address.
	pub fn create_mailbox(&self) -> Mailbox<M> {
		loop {
			if let Ok(mailbox) = self.create_mailbox_with_id(MailboxId::generate()) {
				return mailbox;
			}
		}
	}

	/// Creates a mailbox under a caller-chosen address.
	pub fn create_mailbox_with_id(&self, id: MailboxId) -> Result<Mailbox<M>> {
		let mut routes = self.routes.write();
		if routes.contains_key(&id) {
			return Err(ExchangeError::DuplicateAddress(id));
		}
		let (tx, rx) = mpsc::unbounded_channel();
		let channel = tx.downgrade();
		routes.insert(id.clone(), tx);
		drop(routes);
		tracing::trace!(mailbox = %id, "exchange.mailbox.create");
		Ok(Mailbox::new(id, rx, channel, Arc::downgrade(&self.routes)))
	}

	/// Returns true if a mailbox is routed under `id`.
	pub fn contains(&self, id: &MailboxId) -> bool {
		self.routes.read().contains_key(id)
	}

	/// Returns the number of routed mailboxes.
	pub fn mailbox_count(&self) -> usize {
		self.routes.read().len()
	}

	/// Delivers one message without waiting for an answer.
	pub fn send(&self, to: &MailboxId, msg: M) -> Result<()> {
		self.deliver(to, Delivery::new(msg, None))
	}

	/// Delivers one request and waits up to `timeout` for the answer.
	///
	/// When the deadline passes first the pending answer is abandoned: a reply
	/// sent afterwards is discarded and never observed by the caller.
	pub async fn send_and_receive(&self, to: &MailboxId, msg: M, timeout: Duration) -> Result<M> {
		let (tx, rx) = oneshot::channel();
		self.deliver(to, Delivery::new(msg, Some(ReplyPort::new(tx))))?;

		match tokio::time::timeout(timeout, rx).await {
			Ok(Ok(Ok(reply))) => Ok(reply),
			Ok(Ok(Err(reason))) => Err(ExchangeError::Rejected {
				address: to.clone(),
				reason,
			}),
			Ok(Err(_)) => Err(ExchangeError::NoReply(to.clone())),
			Err(_) => {
				tracing::debug!(mailbox = %to, timeout_ms = timeout.as_millis() as u64, "exchange.request.timeout");
				Err(ExchangeError::Timeout {
					address: to.clone(),
					timeout,
				})
			}
		}
	}

	fn deliver(&self, to: &MailboxId, delivery: Delivery<M>) -> Result<()> {
		let tx = {
			let routes = self.routes.read();
			match routes.get(to) {
				Some(tx) => tx.clone(),
				None => return Err(ExchangeError::UnknownAddress(to.clone())),
			}
		};
		tx.send(delivery).map_err(|_| ExchangeError::Closed(to.clone()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn send_reaches_the_addressed_mailbox_in_order() {
		let exchange = Exchange::<u32>::new();
		let mut a = exchange.create_mailbox();
		let mut b = exchange.create_mailbox();

		exchange.send(a.id(), 1).unwrap();
		exchange.send(b.id(), 2).unwrap();
		exchange.send(a.id(), 3).unwrap();

		assert_eq!(a.recv().await.map(|d| *d.message()), Some(1));
		assert_eq!(a.recv().await.map(|d| *d.message()), Some(3));
		assert_eq!(b.recv().await.map(|d| *d.message()), Some(2));
	}

	#[tokio::test]
	async fn send_to_unknown_address_fails() {
		let exchange = Exchange::<u32>::new();
		let missing = MailboxId::new("nowhere");
		assert_eq!(exchange.send(&missing, 1), Err(ExchangeError::UnknownAddress(missing)));
	}

	#[test]
	fn duplicate_address_is_refused_while_owner_lives() {
		let exchange = Exchange::<u32>::new();
		let id = MailboxId::new("fixed");
		let first = exchange.create_mailbox_with_id(id.clone()).unwrap();
		assert_eq!(
			exchange.create_mailbox_with_id(id.clone()).map(|_| ()),
			Err(ExchangeError::DuplicateAddress(id.clone()))
		);

		drop(first);
		assert!(!exchange.contains(&id));
		assert!(exchange.create_mailbox_with_id(id).is_ok());
	}

	#[test]
	fn closer_deregisters_route() {
		let exchange = Exchange::<u32>::new();
		let mailbox = exchange.create_mailbox();
		let id = mailbox.id().clone();
		let closer = mailbox.closer();

		assert_eq!(exchange.mailbox_count(), 1);
		closer.close();
		closer.close();
		assert_eq!(exchange.mailbox_count(), 0);
		assert_eq!(exchange.send(&id, 7), Err(ExchangeError::UnknownAddress(id)));
	}

	#[tokio::test]
	async fn stale_closer_leaves_reclaimed_address_alone() {
		let exchange = Exchange::<u32>::new();
		let id = MailboxId::new("reused");
		let old = exchange.create_mailbox_with_id(id.clone()).unwrap();
		let old_closer = old.closer();
		old_closer.close();

		let mut current = exchange.create_mailbox_with_id(id.clone()).unwrap();
		drop(old);
		old_closer.close();

		assert!(exchange.contains(&id));
		exchange.send(&id, 9).unwrap();
		assert_eq!(current.recv().await.map(|d| *d.message()), Some(9));

		drop(current);
		assert!(!exchange.contains(&id));
	}

	#[tokio::test]
	async fn request_receives_reply() {
		let exchange = Exchange::<u32>::new();
		let mut mailbox = exchange.create_mailbox();
		let id = mailbox.id().clone();

		let responder = tokio::spawn(async move {
			let (msg, reply) = mailbox.recv().await.unwrap().into_parts();
			assert!(reply.unwrap().reply(msg * 2));
		});

		let answer = exchange.send_and_receive(&id, 21, Duration::from_secs(1)).await;
		assert_eq!(answer, Ok(42));
		responder.await.unwrap();
	}

	#[tokio::test]
	async fn rejected_and_dropped_requests_are_distinct() {
		let exchange = Exchange::<u32>::new();
		let mut mailbox = exchange.create_mailbox();
		let id = mailbox.id().clone();

		let responder = tokio::spawn(async move {
			let (_, reply) = mailbox.recv().await.unwrap().into_parts();
			reply.unwrap().reject("not ready");
			let (_, reply) = mailbox.recv().await.unwrap().into_parts();
			drop(reply);
			mailbox
		});

		let rejected = exchange.send_and_receive(&id, 1, Duration::from_secs(1)).await;
		assert_eq!(
			rejected,
			Err(ExchangeError::Rejected {
				address: id.clone(),
				reason: "not ready".into(),
			})
		);
		let dropped = exchange.send_and_receive(&id, 2, Duration::from_secs(1)).await;
		assert_eq!(dropped, Err(ExchangeError::NoReply(id)));
		drop(responder.await.unwrap());
	}

	#[tokio::test]
	async fn late_reply_after_timeout_is_discarded() {
		let exchange = Exchange::<u32>::new();
		let mut mailbox = exchange.create_mailbox();
		let id = mailbox.id().clone();

		let result = exchange.send_and_receive(&id, 5, Duration::from_millis(20)).await;
		assert!(matches!(result, Err(ExchangeError::Timeout { .. })));

		let (_, reply) = mailbox.recv().await.unwrap().into_parts();
		let reply = reply.unwrap();
		assert!(reply.is_abandoned());
		assert!(!reply.reply(5));
	}
}
