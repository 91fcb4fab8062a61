//! Mailbox-to-delegate binding.
//!
//! A courier owns one mailbox and one delegate and runs as a single task.
//! Deliveries are dispatched one at a time, so a delegate never sees two
//! handlers running concurrently.

use kestrel_exchange::{Delivery, Mailbox, MailboxCloser, MailboxId};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::delegate::ProcessDelegate;
use crate::message::Envelope;

/// Running binding between a mailbox and a delegate.
#[derive(Debug)]
pub(crate) struct Courier {
	cancel: CancellationToken,
	closer: MailboxCloser<Envelope>,
	task: JoinHandle<()>,
}

impl Courier {
	/// Starts dispatching `mailbox` deliveries to `delegate`.
	pub(crate) fn spawn(mailbox: Mailbox<Envelope>, delegate: Box<dyn ProcessDelegate>) -> Self {
		let cancel = CancellationToken::new();
		let closer = mailbox.closer();
		let address = mailbox.id().clone();
		let task = crate::spawn::spawn(address.as_str(), run(mailbox, delegate, cancel.clone()));
		Self { cancel, closer, task }
	}

	pub(crate) fn address(&self) -> &MailboxId {
		self.closer.id()
	}

	/// Deregisters the mailbox and cancels the task, preempting a running handler.
	pub(crate) fn stop(&self) {
		self.closer.close();
		self.cancel.cancel();
	}

	pub(crate) fn is_finished(&self) -> bool {
		self.task.is_finished()
	}
}

impl Drop for Courier {
	fn drop(&mut self) {
		self.stop();
	}
}

async fn run(mut mailbox: Mailbox<Envelope>, mut delegate: Box<dyn ProcessDelegate>, cancel: CancellationToken) {
	loop {
		let delivery = tokio::select! {
			biased;
			_ = cancel.cancelled() => break,
			delivery = mailbox.recv() => {
				let Some(delivery) = delivery else {
					break;
				};
				delivery
			}
		};

		tokio::select! {
			biased;
			_ = cancel.cancelled() => break,
			_ = dispatch(delegate.as_mut(), delivery) => {}
		}
	}
	tracing::trace!(mailbox = %mailbox.id(), "process.courier.exit");
}

async fn dispatch(delegate: &mut dyn ProcessDelegate, delivery: Delivery<Envelope>) {
	let (envelope, reply) = delivery.into_parts();
	match envelope {
		Envelope::Handshake => {
			let answer = delegate.on_handshake_request().await;
			let Some(reply) = reply else {
				return;
			};
			let delivered = match answer {
				Ok(ack) => reply.reply(ack.into()),
				Err(reason) => reply.reject(reason),
			};
			if !delivered {
				tracing::debug!("process.handshake.abandoned");
			}
		}
		Envelope::HandshakeReply => {}
		Envelope::WillShow => delegate.on_will_show().await,
		Envelope::DidShow => delegate.on_did_show().await,
		Envelope::WillHide => delegate.on_will_hide().await,
		Envelope::DidHide => delegate.on_did_hide().await,
		Envelope::Message { data } => delegate.on_message(data).await,
	}
}
