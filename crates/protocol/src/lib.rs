//! Wire types for the jscomm shared-element channel.
//!
//! The channel is a single string slot (the value field of a hidden text
//! widget) holding a JSON object. This crate owns the shape of that payload
//! and of the scripts injected into the embedded page:
//!
//! - [`Document`] - the key-value mapping and its (de)serialization contract
//! - [`Script`] - a remote script together with the typed intent it encodes
//!
//! Types here are pure data. Transport and orchestration live in
//! `jscomm-runtime` and `jscomm`.

pub mod document;
pub mod script;

pub use document::{Document, EMPTY_DOCUMENT};
pub use script::{Script, ScriptKind};
