//! Process specifications.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::delegate::{ProcessContext, ProcessDelegate};

/// Builds the delegate for one local process.
pub type DelegateFactory = dyn Fn(&ProcessContext) -> Box<dyn ProcessDelegate> + Send + Sync;

/// Process kind tag (`pType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessKind {
	Local,
	Remote,
}

impl ProcessKind {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Local => "local",
			Self::Remote => "remote",
		}
	}
}

impl fmt::Display for ProcessKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// How to create a process.
#[derive(Clone)]
pub enum ProcessSpec {
	/// In-process delegate behind a dedicated mailbox.
	Local(LocalSpec),
	/// Process hosted elsewhere. Reserved; no manager launches it yet.
	Remote(RemoteSpec),
}

impl ProcessSpec {
	/// Shorthand for a local spec with the manager's default handshake timeout.
	pub fn local<D>(factory: impl Fn(&ProcessContext) -> D + Send + Sync + 'static) -> Self
	where
		D: ProcessDelegate,
	{
		Self::Local(LocalSpec::new(factory))
	}

	/// Returns the kind tag.
	pub const fn kind(&self) -> ProcessKind {
		match self {
			Self::Local(_) => ProcessKind::Local,
			Self::Remote(_) => ProcessKind::Remote,
		}
	}
}

impl fmt::Debug for ProcessSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Local(spec) => f.debug_tuple("Local").field(spec).finish(),
			Self::Remote(spec) => f.debug_tuple("Remote").field(spec).finish(),
		}
	}
}

impl From<LocalSpec> for ProcessSpec {
	fn from(spec: LocalSpec) -> Self {
		Self::Local(spec)
	}
}

/// Builder spec for one local process.
#[derive(Clone)]
pub struct LocalSpec {
	pub(crate) handshake_timeout: Option<Duration>,
	pub(crate) factory: Arc<DelegateFactory>,
}

impl LocalSpec {
	/// Creates a spec from a delegate factory.
	pub fn new<D>(factory: impl Fn(&ProcessContext) -> D + Send + Sync + 'static) -> Self
	where
		D: ProcessDelegate,
	{
		Self {
			handshake_timeout: None,
			factory: Arc::new(move |ctx: &ProcessContext| Box::new(factory(ctx)) as Box<dyn ProcessDelegate>),
		}
	}

	/// Overrides the manager's default handshake timeout for this launch.
	#[must_use]
	pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
		self.handshake_timeout = Some(timeout);
		self
	}
}

impl fmt::Debug for LocalSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LocalSpec")
			.field("handshake_timeout", &self.handshake_timeout)
			.finish_non_exhaustive()
	}
}

/// Placeholder for processes hosted outside this manager.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct RemoteSpec {}

impl RemoteSpec {
	pub fn new() -> Self {
		Self::default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Silent;

	impl ProcessDelegate for Silent {}

	#[test]
	fn spec_reports_its_kind() {
		assert_eq!(ProcessSpec::local(|_| Silent).kind(), ProcessKind::Local);
		assert_eq!(ProcessSpec::Remote(RemoteSpec::new()).kind(), ProcessKind::Remote);
		assert_eq!(ProcessKind::Remote.to_string(), "remote");
	}

	#[test]
	fn timeout_override_is_optional() {
		let spec = LocalSpec::new(|_| Silent);
		assert_eq!(spec.handshake_timeout, None);
		let spec = spec.handshake_timeout(Duration::from_millis(50));
		assert_eq!(spec.handshake_timeout, Some(Duration::from_millis(50)));
	}
}
