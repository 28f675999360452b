//! Host environment collaborators.
//!
//! jscomm does not render anything or run JavaScript itself. A hosting
//! runtime (a notebook kernel, a webview shell, a browser automation
//! session) supplies both through [`HostEnvironment`] and hands out
//! [`TextWidget`]s whose value field is the shared channel.

use std::sync::Arc;

use async_trait::async_trait;
use jscomm_protocol::Script;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::handlers::{RawChangeFn, Subscription};

/// How the shared element is kept out of sight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
	Visible,
	/// `display: none`; the element takes no layout space.
	#[default]
	Hidden,
	/// `visibility: hidden`; the element keeps its layout box.
	Invisible,
}

/// What the host toolkit does on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
	/// Host-side widget assignments are mirrored into the page by the
	/// toolkit's state sync. Page-side `input` events always flow back to
	/// the widget value.
	pub widget_sync: bool,
}

impl Default for HostCapabilities {
	fn default() -> Self {
		Self { widget_sync: true }
	}
}

/// Opaque text widget whose `value` is the channel.
pub trait TextWidget: Send + Sync {
	/// Current value field.
	fn value(&self) -> String;

	/// Assigns the value field from the host side.
	///
	/// Observers fire when the value actually changes.
	fn set_value(&self, value: &str);

	fn set_visibility(&self, visibility: Visibility);

	fn set_visible(&self, visible: bool) {
		self.set_visibility(if visible {
			Visibility::Visible
		} else {
			Visibility::Hidden
		});
	}

	/// Adds a DOM class to the rendered element.
	fn add_class(&self, class: &str);

	fn classes(&self) -> Vec<String>;

	/// Registers `handler` for value changes from either side.
	fn observe(&self, handler: RawChangeFn) -> Subscription;

	/// False once the host has torn the widget down.
	fn is_attached(&self) -> bool {
		true
	}
}

/// Display and remote-execution facilities of the hosting runtime.
#[async_trait]
pub trait HostEnvironment: Send + Sync {
	/// Creates an unrendered text widget holding `initial`.
	fn create_widget(&self, initial: &str) -> Arc<dyn TextWidget>;

	/// Displays the widget so the embedded page gets a DOM element for it.
	async fn render_element(&self, widget: Arc<dyn TextWidget>) -> Result<()>;

	/// Runs a one-shot script in the embedded context.
	///
	/// Returns once the script has been handed to the page; there is no
	/// acknowledgement that it ran.
	async fn run_remote(&self, script: &Script) -> Result<()>;

	fn capabilities(&self) -> HostCapabilities {
		HostCapabilities::default()
	}
}
