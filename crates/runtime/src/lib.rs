//! jscomm runtime - host bindings, transport, and script injection
//!
//! This crate connects a [`Document`](jscomm_protocol::Document) to a shared
//! hidden widget:
//!
//! - **Host**: [`HostEnvironment`] and [`TextWidget`], supplied by the hosting
//!   runtime
//! - **Channel**: [`ChannelAdapter`] implementations over the widget's value
//! - **Injector**: [`RemoteInjector`] scripts run in the embedded page
//! - **Registry**: process-wide [`NamespaceRegistry`] of bound tags
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │    jscomm    │  JsComm facade
//! └──────┬───────┘
//!        │ read / write_raw / push_snapshot
//! ┌──────▼───────┐
//! │jscomm-runtime│  This crate
//! │  ┌────────┐  │
//! │  │Channel │  │  widget value + change fan-out
//! │  └────────┘  │
//! │  ┌────────┐  │
//! │  │Injector│  │  run_remote scripts
//! │  └────────┘  │
//! └──────┬───────┘
//!        │ HostEnvironment
//! ┌──────▼───────┐
//! │  host page   │  shared element, input events
//! └──────────────┘
//! ```
//!
//! [`MemoryHost`] is an in-process host that models the page without a
//! JavaScript engine.

pub mod channel;
pub mod error;
pub mod handlers;
pub mod host;
pub mod injector;
pub mod js;
pub mod memory;
pub mod registry;

pub use channel::{ChannelAdapter, ElementState, ScriptChannel, SharedElement, WidgetChannel, select_channel};
pub use error::{Error, Result};
pub use handlers::{HandlerId, RawChangeFn, Subscription};
pub use host::{HostCapabilities, HostEnvironment, TextWidget, Visibility};
pub use injector::RemoteInjector;
pub use js::DEFAULT_INPUT_SELECTOR;
pub use memory::{MemoryHost, MemoryWidget};
pub use registry::{NamespaceClaim, NamespaceRegistry};
