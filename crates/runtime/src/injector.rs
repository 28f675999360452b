//! One-way script injection into the embedded page.

use std::sync::Arc;

use jscomm_protocol::Document;
use tracing::debug;

use crate::error::Result;
use crate::host::HostEnvironment;
use crate::js::{bind_listener_script, push_snapshot_script};

/// Pushes snapshots and binds listeners through [`HostEnvironment::run_remote`].
///
/// Delivery is best effort: a script whose target element is missing logs in
/// the page and does nothing, and nothing reports back to the host.
#[derive(Clone)]
pub struct RemoteInjector {
	host: Arc<dyn HostEnvironment>,
	input_selector: String,
}

impl RemoteInjector {
	pub fn new(host: Arc<dyn HostEnvironment>, input_selector: impl Into<String>) -> Self {
		Self {
			host,
			input_selector: input_selector.into(),
		}
	}

	pub fn input_selector(&self) -> &str {
		&self.input_selector
	}

	/// Serializes `doc` and pushes it to the element tagged `namespace`.
	pub async fn push_snapshot(&self, namespace: &str, doc: &Document) -> Result<()> {
		let raw = doc.serialize()?;
		self.push_raw(namespace, &raw).await
	}

	/// Pushes an already serialized document.
	pub async fn push_raw(&self, namespace: &str, raw: &str) -> Result<()> {
		let script = push_snapshot_script(namespace, &self.input_selector, raw);
		debug!(target = "jscomm.injector", namespace, bytes = raw.len(), "pushing snapshot");
		self.host.run_remote(&script).await
	}

	/// Installs the page-side change listener for `namespace`.
	pub async fn bind_listener(&self, namespace: &str) -> Result<()> {
		let script = bind_listener_script(namespace, &self.input_selector);
		debug!(target = "jscomm.injector", namespace, "binding page listener");
		self.host.run_remote(&script).await
	}
}

impl std::fmt::Debug for RemoteInjector {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RemoteInjector")
			.field("input_selector", &self.input_selector)
			.finish_non_exhaustive()
	}
}
