//! Remote scripts sent to the embedded page.
//!
//! A [`Script`] carries both the JavaScript source a browser host executes
//! and the [`ScriptKind`] it was built from, so hosts that do not run a
//! JavaScript engine (in-process simulations, recorders) can act on the
//! intent without parsing source text.

use serde::{Deserialize, Serialize};

/// What a remote script does in the embedded context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptKind {
	/// Assign a serialized document to the shared element's input and
	/// dispatch a bubbling `input` event.
	PushSnapshot {
		/// Class tag locating the shared element.
		namespace: String,
		/// Selector of the input inside the shared element.
		input_selector: String,
		/// Serialized document.
		raw: String,
	},
	/// Install the page-side listener that mirrors the document into
	/// `window.__jscomm[namespace]`.
	BindListener {
		namespace: String,
		input_selector: String,
	},
}

impl ScriptKind {
	pub fn namespace(&self) -> &str {
		match self {
			ScriptKind::PushSnapshot { namespace, .. } | ScriptKind::BindListener { namespace, .. } => {
				namespace
			}
		}
	}
}

/// A one-shot script for the embedded execution context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
	kind: ScriptKind,
	source: String,
}

impl Script {
	pub fn new(kind: ScriptKind, source: String) -> Self {
		Self { kind, source }
	}

	pub fn kind(&self) -> &ScriptKind {
		&self.kind
	}

	/// JavaScript source to evaluate in the page.
	pub fn source(&self) -> &str {
		&self.source
	}
}
