//! jscomm: a key-value store shared between a host program and an embedded
//! page through a hidden text widget.
//!
//! The host side and the page side both read and write one JSON object kept
//! in the widget's value field. Host-side writes go through [`JsComm`];
//! page-side writes are `input` events on the widget's DOM input, which the
//! host toolkit carries back into the widget value.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use jscomm::{CommConfig, JsComm, MemoryHost};
//!
//! #[tokio::main]
//! async fn main() -> jscomm::Result<()> {
//!     let host = Arc::new(MemoryHost::new());
//!     let comm = JsComm::with_config(host, CommConfig::new("plot-state")).await?;
//!
//!     comm.add("zoom", 2).await?;
//!     comm.update("zoom", 3).await?;
//!     comm.set("title", "Sales").await?;
//!
//!     assert_eq!(comm.get_as::<i64>("zoom")?, 3);
//!     assert!(comm.has("title")?);
//!
//!     comm.remove("title").await?;
//!     comm.clear_all().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Consistency
//!
//! Writes are fire-and-forget and the two sides converge eventually. A
//! read-modify-write is not atomic across contexts: concurrent mutations
//! from both sides resolve as last-writer-wins.

mod comm;
pub mod config;

pub use comm::{JsComm, JsCommBuilder};
pub use config::{CommConfig, DEFAULT_NAMESPACE};
pub use jscomm_protocol::{Document, Script, ScriptKind};
pub use jscomm_runtime::{
	ElementState, Error, HostCapabilities, HostEnvironment, MemoryHost, MemoryWidget, NamespaceRegistry, Result,
	Subscription, TextWidget, Visibility,
};
pub use serde_json::Value;

pub use jscomm_protocol as protocol;
pub use jscomm_runtime as runtime;
