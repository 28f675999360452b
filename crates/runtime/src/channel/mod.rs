//! Transport over the shared element's value field.
//!
//! A [`ChannelAdapter`] is the only writer of the channel on the host side.
//! Two implementations exist and are chosen by [`select_channel`] from the
//! host's [`HostCapabilities`]:
//!
//! - [`WidgetChannel`] assigns the widget value and leaves delivery to the
//!   page to the toolkit's state sync.
//! - [`ScriptChannel`] assigns the widget value and pushes the same value
//!   into the page with an injected script, for toolkits that do not sync
//!   host-side assignments.
//!
//! Both observe the widget for changes, which covers host-side writes and
//! page-side `input` events carried back by the toolkit.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::handlers::{self, HandlerMap, RawChangeFn, Subscription};
use crate::host::{HostCapabilities, HostEnvironment, TextWidget};
use crate::injector::RemoteInjector;


/// Render lifecycle of the shared element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
	/// Created but not displayed yet.
	Pending,
	Rendered,
	/// Torn down; may be rendered again.
	Detached,
}

/// The widget backing a channel plus its render state.
pub struct SharedElement {
	namespace: String,
	widget: Arc<dyn TextWidget>,
	state: Mutex<ElementState>,
}

impl SharedElement {
	pub fn new(namespace: impl Into<String>, widget: Arc<dyn TextWidget>) -> Arc<Self> {
		Arc::new(Self {
			namespace: namespace.into(),
			widget,
			state: Mutex::new(ElementState::Pending),
		})
	}

	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	pub fn widget(&self) -> &Arc<dyn TextWidget> {
		&self.widget
	}

	pub fn state(&self) -> ElementState {
		*self.state.lock()
	}

	/// Displays the widget through the host.
	pub async fn render(&self, host: &dyn HostEnvironment) -> Result<()> {
		host.render_element(Arc::clone(&self.widget)).await?;
		*self.state.lock() = ElementState::Rendered;
		Ok(())
	}

	/// Marks the element as torn down. Reads and writes fail until the
	/// element is rendered again.
	pub fn detach(&self) {
		*self.state.lock() = ElementState::Detached;
	}

	/// Returns the widget if it can carry traffic.
	pub fn available_widget(&self) -> Result<&Arc<dyn TextWidget>> {
		let state = self.state();
		if state == ElementState::Rendered && self.widget.is_attached() {
			return Ok(&self.widget);
		}
		warn!(target = "jscomm.channel", namespace = %self.namespace, ?state, "shared element unavailable");
		Err(Error::ChannelUnavailable {
			namespace: self.namespace.clone(),
		})
	}
}

impl std::fmt::Debug for SharedElement {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SharedElement")
			.field("namespace", &self.namespace)
			.field("state", &self.state())
			.finish_non_exhaustive()
	}
}

/// Transport abstraction over the shared element.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
	fn namespace(&self) -> &str;

	/// Current raw value, verbatim.
	fn read_raw(&self) -> Result<String>;

	/// Replaces the raw value and triggers the host's propagation.
	async fn write_raw(&self, value: &str) -> Result<()>;

	/// Registers `handler` for every change of the raw value.
	fn on_raw_change(&self, handler: RawChangeFn) -> Subscription;

	/// True if [`write_raw`](Self::write_raw) itself delivers the value into
	/// the page, making a separate snapshot push redundant.
	fn reaches_embedded(&self) -> bool {
		false
	}
}

/// Fans one widget observer out to the channel's own handlers.
struct ChangeFanout {
	handlers: HandlerMap<str>,
	_observer: Subscription,
}

impl ChangeFanout {
	fn attach(element: &SharedElement) -> Self {
		let handlers: HandlerMap<str> = handlers::new_handler_map();
		let target = Arc::clone(&handlers);
		let namespace = element.namespace().to_owned();
		let observer = element.widget().observe(Arc::new(move |raw: &str| {
			trace!(target = "jscomm.channel", namespace = %namespace, bytes = raw.len(), "raw value changed");
			handlers::dispatch(&target, raw);
		}));
		Self {
			handlers,
			_observer: observer,
		}
	}

	fn register(&self, handler: RawChangeFn) -> Subscription {
		handlers::register(&self.handlers, handler)
	}
}

/// Channel relying on the toolkit's native widget state sync.
pub struct WidgetChannel {
	element: Arc<SharedElement>,
	fanout: ChangeFanout,
}

impl WidgetChannel {
	pub fn new(element: Arc<SharedElement>) -> Self {
		let fanout = ChangeFanout::attach(&element);
		Self { element, fanout }
	}
}

#[async_trait]
impl ChannelAdapter for WidgetChannel {
	fn namespace(&self) -> &str {
		self.element.namespace()
	}

	fn read_raw(&self) -> Result<String> {
		Ok(self.element.available_widget()?.value())
	}

	async fn write_raw(&self, value: &str) -> Result<()> {
		self.element.available_widget()?.set_value(value);
		Ok(())
	}

	fn on_raw_change(&self, handler: RawChangeFn) -> Subscription {
		self.fanout.register(handler)
	}
}

/// Channel that delivers writes into the page with an injected script.
pub struct ScriptChannel {
	element: Arc<SharedElement>,
	injector: RemoteInjector,
	fanout: ChangeFanout,
}

impl ScriptChannel {
	pub fn new(element: Arc<SharedElement>, injector: RemoteInjector) -> Self {
		let fanout = ChangeFanout::attach(&element);
		Self {
			element,
			injector,
			fanout,
		}
	}
}

#[async_trait]
impl ChannelAdapter for ScriptChannel {
	fn namespace(&self) -> &str {
		self.element.namespace()
	}

	fn read_raw(&self) -> Result<String> {
		Ok(self.element.available_widget()?.value())
	}

	/// Assigns the host-side value first, then pushes it into the page.
	///
	/// If the push fails the previous value is assigned back, so the host
	/// side never keeps a value the page did not receive.
	async fn write_raw(&self, value: &str) -> Result<()> {
		let widget = self.element.available_widget()?;
		let previous = widget.value();
		widget.set_value(value);
		if let Err(err) = self.injector.push_raw(self.element.namespace(), value).await {
			warn!(target = "jscomm.channel", namespace = %self.element.namespace(), %err, "push failed, restoring previous value");
			widget.set_value(&previous);
			return Err(err);
		}
		Ok(())
	}

	fn on_raw_change(&self, handler: RawChangeFn) -> Subscription {
		self.fanout.register(handler)
	}

	fn reaches_embedded(&self) -> bool {
		true
	}
}

/// Picks the channel implementation matching the host's capabilities.
pub fn select_channel(
	element: Arc<SharedElement>,
	injector: RemoteInjector,
	capabilities: HostCapabilities,
) -> Arc<dyn ChannelAdapter> {
	if capabilities.widget_sync {
		Arc::new(WidgetChannel::new(element))
	} else {
		Arc::new(ScriptChannel::new(element, injector))
	}
}
