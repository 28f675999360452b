//! In-process host environment.
//!
//! [`MemoryHost`] stands in for a real display runtime. It keeps a model of
//! the embedded page per namespace tag (the input's value, whether the page
//! listener is bound, the listener's mirrored document) and acts on the
//! [`ScriptKind`] of each remote script instead of evaluating JavaScript.
//! It also records every script and host-side widget assignment, which is
//! what the test suites assert against.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use indexmap::IndexMap;
use jscomm_protocol::{Document, Script, ScriptKind};
use parking_lot::Mutex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::handlers::{self, HandlerMap, RawChangeFn, Subscription};
use crate::host::{HostCapabilities, HostEnvironment, TextWidget, Visibility};
use crate::js::DEFAULT_INPUT_SELECTOR;

/// Text widget held in memory.
pub struct MemoryWidget {
	value: Mutex<String>,
	classes: Mutex<Vec<String>>,
	visibility: Mutex<Visibility>,
	attached: AtomicBool,
	assignments: Mutex<Vec<String>>,
	observers: HandlerMap<str>,
}

impl MemoryWidget {
	pub fn new(initial: &str) -> Arc<Self> {
		Arc::new(Self {
			value: Mutex::new(initial.to_owned()),
			classes: Mutex::new(Vec::new()),
			visibility: Mutex::new(Visibility::Visible),
			attached: AtomicBool::new(true),
			assignments: Mutex::new(Vec::new()),
			observers: handlers::new_handler_map(),
		})
	}

	/// Host-side assignments made through [`TextWidget::set_value`], in order.
	pub fn assignments(&self) -> Vec<String> {
		self.assignments.lock().clone()
	}

	pub fn visibility(&self) -> Visibility {
		*self.visibility.lock()
	}

	pub fn set_attached(&self, attached: bool) {
		self.attached.store(attached, Ordering::SeqCst);
	}

	/// Applies a value carried back from the page by the toolkit.
	pub fn sync_from_embedded(&self, raw: &str) {
		if self.replace(raw) {
			handlers::dispatch(&self.observers, raw);
		}
	}

	fn replace(&self, raw: &str) -> bool {
		let mut current = self.value.lock();
		if *current == raw {
			return false;
		}
		*current = raw.to_owned();
		true
	}
}

impl TextWidget for MemoryWidget {
	fn value(&self) -> String {
		self.value.lock().clone()
	}

	fn set_value(&self, value: &str) {
		self.assignments.lock().push(value.to_owned());
		if self.replace(value) {
			handlers::dispatch(&self.observers, value);
		}
	}

	fn set_visibility(&self, visibility: Visibility) {
		*self.visibility.lock() = visibility;
	}

	fn add_class(&self, class: &str) {
		let mut classes = self.classes.lock();
		if !classes.iter().any(|c| c == class) {
			classes.push(class.to_owned());
		}
	}

	fn classes(&self) -> Vec<String> {
		self.classes.lock().clone()
	}

	fn observe(&self, handler: RawChangeFn) -> Subscription {
		handlers::register(&self.observers, handler)
	}

	fn is_attached(&self) -> bool {
		self.attached.load(Ordering::SeqCst)
	}
}

/// Page-side model of one rendered shared element.
struct EmbeddedElement {
	widget: Arc<MemoryWidget>,
	input: String,
	input_events: usize,
	/// Document mirrored by the bound page listener.
	listener: Option<Document>,
	_mirror: Option<Subscription>,
}

#[derive(Default)]
struct PageState {
	elements: IndexMap<String, EmbeddedElement>,
	scripts: Vec<Script>,
	console: Vec<String>,
	renders: usize,
	remote_failure: Option<String>,
}

/// Host environment that simulates the embedded page in memory.
pub struct MemoryHost {
	capabilities: HostCapabilities,
	input_selector: String,
	widgets: Mutex<Vec<Arc<MemoryWidget>>>,
	page: Arc<Mutex<PageState>>,
}

impl Default for MemoryHost {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryHost {
	pub fn new() -> Self {
		Self::with_capabilities(HostCapabilities::default())
	}

	pub fn with_capabilities(capabilities: HostCapabilities) -> Self {
		Self {
			capabilities,
			input_selector: DEFAULT_INPUT_SELECTOR.to_owned(),
			widgets: Mutex::new(Vec::new()),
			page: Arc::new(Mutex::new(PageState::default())),
		}
	}

	/// Sets the selector the simulated input element answers to.
	pub fn with_input_selector(mut self, selector: impl Into<String>) -> Self {
		self.input_selector = selector.into();
		self
	}

	/// Makes every subsequent `run_remote` fail with `message`.
	pub fn fail_remote(&self, message: Option<&str>) {
		self.page.lock().remote_failure = message.map(str::to_owned);
	}

	/// Scripts received so far, in order.
	pub fn scripts(&self) -> Vec<Script> {
		self.page.lock().scripts.clone()
	}

	/// Number of snapshot pushes addressed to `namespace`.
	pub fn push_count(&self, namespace: &str) -> usize {
		self.page
			.lock()
			.scripts
			.iter()
			.filter(|s| matches!(s.kind(), ScriptKind::PushSnapshot { .. }) && s.kind().namespace() == namespace)
			.count()
	}

	/// Messages the page would have logged with `console.error`.
	pub fn console(&self) -> Vec<String> {
		self.page.lock().console.clone()
	}

	pub fn render_count(&self) -> usize {
		self.page.lock().renders
	}

	/// Value of the page-side input for `namespace`.
	pub fn embedded_value(&self, namespace: &str) -> Option<String> {
		self.page.lock().elements.get(namespace).map(|e| e.input.clone())
	}

	/// Number of `input` events dispatched on the element.
	pub fn input_events(&self, namespace: &str) -> usize {
		self.page
			.lock()
			.elements
			.get(namespace)
			.map_or(0, |e| e.input_events)
	}

	/// Document mirrored into `window.__jscomm[namespace]`, if the listener
	/// is bound.
	pub fn page_document(&self, namespace: &str) -> Option<Document> {
		self.page
			.lock()
			.elements
			.get(namespace)
			.and_then(|e| e.listener.clone())
	}

	pub fn widget(&self, namespace: &str) -> Option<Arc<MemoryWidget>> {
		if let Some(element) = self.page.lock().elements.get(namespace) {
			return Some(Arc::clone(&element.widget));
		}
		self.widgets
			.lock()
			.iter()
			.find(|w| w.classes.lock().iter().any(|c| c == namespace))
			.cloned()
	}

	/// Simulates a page script writing `raw` into the shared input and
	/// dispatching `input`. Returns false if no element is rendered.
	pub fn simulate_embedded_write(&self, namespace: &str, raw: &str) -> bool {
		let selector = self.input_selector.clone();
		self.deliver_input(namespace, &selector, raw)
	}

	/// Removes the page element and detaches its widget, as when the
	/// hosting output area is cleared.
	pub fn teardown(&self, namespace: &str) {
		let removed = self.page.lock().elements.shift_remove(namespace);
		if let Some(element) = removed {
			element.widget.set_attached(false);
			debug!(target = "jscomm.memory", namespace, "element torn down");
		}
	}

	fn find_widget(&self, widget: &Arc<dyn TextWidget>) -> Option<Arc<MemoryWidget>> {
		let target = Arc::as_ptr(widget) as *const ();
		self.widgets
			.lock()
			.iter()
			.find(|w| Arc::as_ptr(w) as *const () == target)
			.cloned()
	}

	fn log_console(page: &mut PageState, message: String) {
		debug!(target = "jscomm.memory", %message, "page console error");
		page.console.push(message);
	}

	/// Checks that the page has the element and its input, logging like the
	/// injected scripts do when either is missing.
	fn locate(&self, page: &mut PageState, namespace: &str, selector: &str) -> bool {
		if !page.elements.contains_key(namespace) {
			Self::log_console(page, format!("jscomm: shared element not found: {namespace}"));
			return false;
		}
		if selector != self.input_selector {
			Self::log_console(page, format!("jscomm: input element not found in {namespace}"));
			return false;
		}
		true
	}

	fn deliver_input(&self, namespace: &str, selector: &str, raw: &str) -> bool {
		let widget = {
			let mut page = self.page.lock();
			if !self.locate(&mut page, namespace, selector) {
				return false;
			}
			let Some(element) = page.elements.get_mut(namespace) else {
				return false;
			};
			element.input = raw.to_owned();
			element.input_events += 1;
			if let Some(mirror) = element.listener.as_mut() {
				*mirror = Document::parse(raw);
			}
			Arc::clone(&element.widget)
		};
		// Page-side input events always reach the widget value.
		widget.sync_from_embedded(raw);
		true
	}

	fn bind_listener(&self, namespace: &str, selector: &str) {
		let mut page = self.page.lock();
		if !self.locate(&mut page, namespace, selector) {
			return;
		}
		if let Some(element) = page.elements.get_mut(namespace) {
			if element.listener.is_none() {
				element.listener = Some(Document::parse(&element.input));
			}
		}
	}

	fn mirror_subscription(&self, widget: &MemoryWidget, namespace: &str) -> Subscription {
		let page: Weak<Mutex<PageState>> = Arc::downgrade(&self.page);
		let namespace = namespace.to_owned();
		widget.observe(Arc::new(move |raw: &str| {
			if let Some(page) = page.upgrade() {
				if let Some(element) = page.lock().elements.get_mut(&namespace) {
					element.input = raw.to_owned();
				}
			}
		}))
	}
}

#[async_trait]
impl HostEnvironment for MemoryHost {
	fn create_widget(&self, initial: &str) -> Arc<dyn TextWidget> {
		let widget = MemoryWidget::new(initial);
		self.widgets.lock().push(Arc::clone(&widget));
		widget
	}

	async fn render_element(&self, widget: Arc<dyn TextWidget>) -> Result<()> {
		let widget = self
			.find_widget(&widget)
			.ok_or_else(|| Error::Host("widget was not created by this host".into()))?;
		widget.set_attached(true);

		for class in widget.classes() {
			let mirror = self
				.capabilities
				.widget_sync
				.then(|| self.mirror_subscription(&widget, &class));
			let element = EmbeddedElement {
				widget: Arc::clone(&widget),
				input: widget.value(),
				input_events: 0,
				listener: None,
				_mirror: mirror,
			};
			self.page.lock().elements.insert(class, element);
		}
		self.page.lock().renders += 1;
		Ok(())
	}

	async fn run_remote(&self, script: &Script) -> Result<()> {
		{
			let mut page = self.page.lock();
			if let Some(message) = page.remote_failure.clone() {
				return Err(Error::Host(message));
			}
			page.scripts.push(script.clone());
		}
		match script.kind() {
			ScriptKind::PushSnapshot {
				namespace,
				input_selector,
				raw,
			} => {
				self.deliver_input(namespace, input_selector, raw);
			}
			ScriptKind::BindListener {
				namespace,
				input_selector,
			} => self.bind_listener(namespace, input_selector),
		}
		Ok(())
	}

	fn capabilities(&self) -> HostCapabilities {
		self.capabilities
	}
}
