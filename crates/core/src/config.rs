use jscomm_runtime::{DEFAULT_INPUT_SELECTOR, Visibility};
use serde::{Deserialize, Serialize};

/// Namespace tag used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "comm-class";

/// Configuration of one [`JsComm`](crate::JsComm) instance.
///
/// Deserializes from JSON with every field optional:
///
/// ```json
/// { "namespace": "plot-state", "visibility": "invisible" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommConfig {
	/// Class tag of the shared element. Must be unique among live instances
	/// sharing one page.
	pub namespace: String,
	/// Selector of the input inside the shared element.
	pub input_selector: String,
	/// How the shared element is hidden.
	pub visibility: Visibility,
	/// Whether to install the page-side listener at construction.
	pub bind_listener: bool,
}

impl Default for CommConfig {
	fn default() -> Self {
		Self {
			namespace: DEFAULT_NAMESPACE.to_owned(),
			input_selector: DEFAULT_INPUT_SELECTOR.to_owned(),
			visibility: Visibility::Hidden,
			bind_listener: true,
		}
	}
}

impl CommConfig {
	/// Creates the default config with a custom namespace tag.
	pub fn new(namespace: impl Into<String>) -> Self {
		Self {
			namespace: namespace.into(),
			..Self::default()
		}
	}

	pub fn from_json(raw: &str) -> serde_json::Result<Self> {
		serde_json::from_str(raw)
	}

	pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
		self.namespace = namespace.into();
		self
	}

	pub fn with_input_selector(mut self, selector: impl Into<String>) -> Self {
		self.input_selector = selector.into();
		self
	}

	pub fn with_visibility(mut self, visibility: Visibility) -> Self {
		self.visibility = visibility;
		self
	}

	pub fn with_bind_listener(mut self, bind: bool) -> Self {
		self.bind_listener = bind;
		self
	}
}
