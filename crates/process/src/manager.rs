//! Process manager: spawn, handshake, register and route.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kestrel_exchange::{Exchange, ExchangeError, MailboxId};
use parking_lot::Mutex;
use serde_json::Value;

use crate::config::ManagerConfig;
use crate::courier::Courier;
use crate::delegate::{ProcessContext, ProcessDelegate};
use crate::message::Envelope;
use crate::process::LocalProcess;
use crate::spec::ProcessSpec;
use crate::{Pid, ProcessError, Result};

/// Owner of a table of local processes.
///
/// Cloning yields another handle to the same manager. Processes are stopped
/// when the manager is disposed or its last handle is dropped.
#[derive(Debug, Clone)]
pub struct ProcessManager {
	inner: Arc<ManagerInner>,
}

#[derive(Debug)]
pub(crate) struct ManagerInner {
	exchange: Exchange<Envelope>,
	mailbox_id: MailboxId,
	handshake_timeout: Duration,
	/// `None` once disposed.
	state: Mutex<Option<ManagerState>>,
}

#[derive(Debug)]
struct ManagerState {
	processes: HashMap<String, LocalProcess>,
	_courier: Courier,
}

/// Delegate behind the manager's own mailbox.
struct ControlDelegate {
	mailbox_id: MailboxId,
}

#[async_trait]
impl ProcessDelegate for ControlDelegate {
	async fn on_message(&mut self, data: Value) {
		tracing::trace!(manager = %self.mailbox_id, %data, "process.manager.message");
	}
}

impl ProcessManager {
	/// Creates a manager with a generated mailbox address and default settings.
	pub fn new(exchange: Exchange<Envelope>) -> Self {
		let mailbox = exchange.create_mailbox();
		Self::build(exchange, mailbox, ManagerConfig::default().default_handshake_timeout())
	}

	/// Creates a manager from explicit settings.
	///
	/// Fails when `config.mailbox_id` is already routed on `exchange`.
	pub fn with_config(exchange: Exchange<Envelope>, config: ManagerConfig) -> Result<Self> {
		let mailbox = match config.mailbox_id.clone() {
			Some(id) => exchange.create_mailbox_with_id(id)?,
			None => exchange.create_mailbox(),
		};
		Ok(Self::build(exchange, mailbox, config.default_handshake_timeout()))
	}

	fn build(exchange: Exchange<Envelope>, mailbox: kestrel_exchange::Mailbox<Envelope>, handshake_timeout: Duration) -> Self {
		let mailbox_id = mailbox.id().clone();
		let courier = Courier::spawn(
			mailbox,
			Box::new(ControlDelegate {
				mailbox_id: mailbox_id.clone(),
			}),
		);
		tracing::debug!(manager = %mailbox_id, timeout_ms = handshake_timeout.as_millis() as u64, "process.manager.start");
		Self {
			inner: Arc::new(ManagerInner {
				exchange,
				mailbox_id,
				handshake_timeout,
				state: Mutex::new(Some(ManagerState {
					processes: HashMap::new(),
					_courier: courier,
				})),
			}),
		}
	}

	/// Address of this manager's own mailbox.
	pub fn mailbox_id(&self) -> &MailboxId {
		&self.inner.mailbox_id
	}

	/// Handshake timeout used when a spec does not set one.
	pub fn default_handshake_timeout(&self) -> Duration {
		self.inner.handshake_timeout
	}

	/// The exchange this manager allocates mailboxes on.
	pub fn exchange(&self) -> &Exchange<Envelope> {
		&self.inner.exchange
	}

	/// Spawns a process and returns its PID once it acknowledged the handshake.
	///
	/// The process is registered if and only if this returns `Ok`.
	///
	/// # Errors
	///
	/// - `InvalidProcessSpecType` for any spec that is not local. Nothing is allocated.
	/// - `HandshakeTimeout` when no acknowledgement arrives in time.
	/// - `HandshakeRejected` when the delegate refuses the handshake.
	/// - `Transport` for any other delivery failure.
	/// - `ManagerDisposed` when the manager is disposed before registration.
	pub async fn launch(&self, spec: impl Into<ProcessSpec>) -> Result<Pid> {
		let local = match spec.into() {
			ProcessSpec::Local(local) => local,
			other => {
				tracing::warn!(kind = %other.kind(), "process.launch.unsupported");
				return Err(ProcessError::InvalidProcessSpecType(other.kind().to_string()));
			}
		};
		if self.inner.is_disposed() {
			return Err(ProcessError::ManagerDisposed);
		}

		let mailbox = self.inner.exchange.create_mailbox();
		let ctx = ProcessContext::new(mailbox.id().clone(), self.inner.mailbox_id.clone());
		let delegate = (local.factory)(&ctx);
		let pid = Pid::new(mailbox.id().clone(), Arc::downgrade(&self.inner));
		let process = LocalProcess::new(pid.id(), self.inner.mailbox_id.clone(), mailbox, delegate);
		debug_assert_eq!(pid.address(), process.mailbox_id());

		let timeout = local.handshake_timeout.unwrap_or(self.inner.handshake_timeout);
		tracing::debug!(pid = %pid, timeout_ms = timeout.as_millis() as u64, "process.launch");

		// `process` is dropped on every early return, which stops its courier.
		match self.inner.exchange.send_and_receive(pid.address(), Envelope::handshake(), timeout).await {
			Ok(_) => {}
			Err(ExchangeError::Timeout { .. }) => {
				tracing::warn!(pid = %pid, timeout_ms = timeout.as_millis() as u64, "process.handshake.timeout");
				return Err(ProcessError::HandshakeTimeout { pid, timeout });
			}
			Err(ExchangeError::Rejected { reason, .. }) => {
				tracing::warn!(pid = %pid, %reason, "process.handshake.rejected");
				return Err(ProcessError::HandshakeRejected { pid, reason });
			}
			Err(err) => return Err(err.into()),
		}

		self.inner.register(process)?;
		tracing::debug!(pid = %pid, "process.launch.ready");
		Ok(pid)
	}

	/// Sends `data` to `target_id` as a `message` envelope.
	///
	/// Best effort: the target is not checked against the process table and
	/// delivery failures are logged rather than returned.
	pub fn send_message(&self, target_id: &str, data: impl Into<Value>) -> Result<()> {
		self.inner.send_message(target_id, data.into())
	}

	/// Routes any envelope to `target_id` with the same semantics as [`Self::send_message`].
	pub fn post(&self, target_id: &str, envelope: Envelope) -> Result<()> {
		self.inner.post(target_id, envelope)
	}

	/// Returns true if `pid` is registered with this manager.
	pub fn does_own(&self, pid: &Pid) -> bool {
		self.inner
			.state
			.lock()
			.as_ref()
			.is_some_and(|state| state.processes.contains_key(pid.id()))
	}

	/// Returns owned PIDs sorted by identity.
	pub fn processes(&self) -> Vec<Pid> {
		let mut ids: Vec<String> = match self.inner.state.lock().as_ref() {
			Some(state) => state.processes.keys().cloned().collect(),
			None => return Vec::new(),
		};
		ids.sort();
		ids.into_iter()
			.map(|id| Pid::new(MailboxId::from(id), Arc::downgrade(&self.inner)))
			.collect()
	}

	/// Number of registered processes.
	pub fn process_count(&self) -> usize {
		self.inner.state.lock().as_ref().map_or(0, |state| state.processes.len())
	}

	/// Unregisters one process and stops it. Returns false if it was not owned.
	pub fn stop(&self, pid: &Pid) -> bool {
		let removed = self.inner.state.lock().as_mut().and_then(|state| state.processes.remove(pid.id()));
		match removed {
			Some(process) => {
				process.stop();
				tracing::debug!(pid = %pid, "process.stop");
				true
			}
			None => false,
		}
	}

	/// Stops every process and releases the manager mailbox.
	///
	/// Idempotent.
	pub fn dispose(&self) {
		self.inner.dispose();
	}

	/// Returns true once [`Self::dispose`] has run.
	pub fn is_disposed(&self) -> bool {
		self.inner.is_disposed()
	}
}

impl ManagerInner {
	fn is_disposed(&self) -> bool {
		self.state.lock().is_none()
	}

	fn register(&self, process: LocalProcess) -> Result<()> {
		let mut state = self.state.lock();
		let Some(state) = state.as_mut() else {
			return Err(ProcessError::ManagerDisposed);
		};
		state.processes.insert(process.id().to_string(), process);
		Ok(())
	}

	pub(crate) fn send_message(&self, target_id: &str, data: Value) -> Result<()> {
		self.post(target_id, Envelope::message(data))
	}

	fn post(&self, target_id: &str, envelope: Envelope) -> Result<()> {
		if self.is_disposed() {
			return Err(ProcessError::ManagerDisposed);
		}
		let target = MailboxId::from(target_id);
		let tag = envelope.tag();
		if let Err(err) = self.exchange.send(&target, envelope) {
			tracing::debug!(target = %target, tag, error = %err, "process.send.undelivered");
		}
		Ok(())
	}

	fn dispose(&self) {
		let state = self.state.lock().take();
		if let Some(state) = state {
			tracing::debug!(manager = %self.mailbox_id, processes = state.processes.len(), "process.manager.dispose");
			drop(state);
		}
	}
}
