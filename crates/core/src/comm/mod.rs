//! [`JsComm`], the shared key-value store bound to one hidden widget.

mod builder;
mod events;
mod ops;

use std::sync::Arc;

use jscomm_protocol::Document;
use jscomm_runtime::{
	ChannelAdapter, ElementState, HostEnvironment, NamespaceClaim, NamespaceRegistry, RemoteInjector, Result,
	SharedElement, Subscription,
};
use tokio::sync::broadcast;
use tracing::debug;

use crate::config::CommConfig;

/// Capacity of the change broadcast channel.
const CHANGE_CAPACITY: usize = 64;

/// A string-keyed JSON store shared between the host and the embedded page.
///
/// Every mutation reads the current channel value, applies the change, and
/// writes the whole document back. The page side may write the same element
/// at any time; there is no locking between the two contexts, so when both
/// mutate before either observes the other, the last write wins.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use jscomm::{JsComm, MemoryHost};
///
/// let host = Arc::new(MemoryHost::new());
/// let comm = JsComm::new(host).await?;
/// comm.add("theme", "dark").await?;
/// assert_eq!(comm.get("theme")?, "dark");
/// ```
pub struct JsComm {
	config: CommConfig,
	host: Arc<dyn HostEnvironment>,
	element: Arc<SharedElement>,
	channel: Arc<dyn ChannelAdapter>,
	injector: RemoteInjector,
	changes_tx: broadcast::Sender<Document>,
	_binding: Subscription,
	_claim: NamespaceClaim,
}

impl JsComm {
	/// Binds a store under the default namespace tag.
	pub async fn new(host: Arc<dyn HostEnvironment>) -> Result<Self> {
		Self::builder(host).build().await
	}

	/// Binds a store with `config`.
	pub async fn with_config(host: Arc<dyn HostEnvironment>, config: CommConfig) -> Result<Self> {
		Self::builder(host).config(config).build().await
	}

	/// Starts a builder with the default config and the process-wide
	/// namespace registry.
	pub fn builder(host: Arc<dyn HostEnvironment>) -> JsCommBuilder {
		JsCommBuilder {
			host,
			config: CommConfig::default(),
			registry: None,
		}
	}

	/// Namespace tag of the shared element.
	pub fn namespace(&self) -> &str {
		&self.config.namespace
	}

	/// Config the store was bound with.
	pub fn config(&self) -> &CommConfig {
		&self.config
	}

	/// Whether the shared element can currently carry traffic.
	pub fn is_available(&self) -> bool {
		self.element.available_widget().is_ok()
	}

	/// Render lifecycle state of the shared element.
	pub fn element_state(&self) -> ElementState {
		self.element.state()
	}

	/// Renders the shared element again after the host tore it down.
	///
	/// The widget keeps its value, so the page picks up the current document
	/// from the new element. The page listener is bound again if configured.
	pub async fn render(&self) -> Result<()> {
		self.element.render(self.host.as_ref()).await?;
		debug!(target = "jscomm.comm", namespace = %self.namespace(), "shared element rendered");
		if self.config.bind_listener {
			self.injector.bind_listener(self.namespace()).await?;
		}
		Ok(())
	}

	/// Marks the shared element as torn down. Operations fail with
	/// `ChannelUnavailable` until [`render`](Self::render) is called.
	pub fn detach(&self) {
		self.element.detach();
		debug!(target = "jscomm.comm", namespace = %self.namespace(), "shared element detached");
	}
}

impl std::fmt::Debug for JsComm {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("JsComm")
			.field("namespace", &self.config.namespace)
			.field("state", &self.element.state())
			.field("reaches_embedded", &self.channel.reaches_embedded())
			.finish_non_exhaustive()
	}
}

/// Builder for [`JsComm`].
pub struct JsCommBuilder {
	host: Arc<dyn HostEnvironment>,
	config: CommConfig,
	registry: Option<Arc<NamespaceRegistry>>,
}

impl JsCommBuilder {
	pub fn config(mut self, config: CommConfig) -> Self {
		self.config = config;
		self
	}

	pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
		self.config.namespace = namespace.into();
		self
	}

	/// Claims the namespace in `registry` instead of the process-wide one.
	pub fn registry(mut self, registry: Arc<NamespaceRegistry>) -> Self {
		self.registry = Some(registry);
		self
	}

	/// Creates, hides, and renders the shared element, then binds the page
	/// listener and the change subscription.
	///
	/// # Errors
	///
	/// - `NamespaceInUse` if a live instance already holds the namespace
	/// - `Host` if rendering or listener injection fails. When listener
	///   injection fails the element has already been displayed; it stays
	///   on the page while the namespace claim is released.
	pub async fn build(self) -> Result<JsComm> {
		let registry = self.registry.unwrap_or_else(NamespaceRegistry::global);
		builder::build(self.host, self.config, registry).await
	}
}
