//! Error types for jscomm.

use thiserror::Error;

/// Result type alias for jscomm operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the channel, the injector, and the facade.
///
/// Key errors are recoverable logic errors: the caller picked the wrong
/// operation for the current document. [`Error::ChannelUnavailable`] is a
/// transport condition and never a statement about the document's contents.
#[derive(Debug, Error)]
pub enum Error {
	/// Operation required an existing key.
	#[error("Key '{key}' does not exist. Use add() or set() to create it.")]
	KeyNotFound { key: String },

	/// `add` was called with a key that is already present.
	#[error("Key '{key}' already exists. Use update() or set() to modify it.")]
	KeyAlreadyExists { key: String },

	/// Value cannot be represented in the wire format.
	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	/// The shared element is not rendered, or was torn down.
	#[error("Channel unavailable: shared element '{namespace}' is not rendered")]
	ChannelUnavailable { namespace: String },

	/// Another live instance already owns this namespace tag.
	#[error("Namespace '{namespace}' is already bound by another instance")]
	NamespaceInUse { namespace: String },

	/// The host environment failed to render or to run a remote script.
	#[error("Host error: {0}")]
	Host(String),
}

impl Error {
	/// Returns the offending key for [`KeyNotFound`](Error::KeyNotFound)
	/// and [`KeyAlreadyExists`](Error::KeyAlreadyExists).
	pub fn key(&self) -> Option<&str> {
		match self {
			Error::KeyNotFound { key } | Error::KeyAlreadyExists { key } => Some(key),
			_ => None,
		}
	}

	/// Returns true for key-existence errors.
	pub fn is_key_error(&self) -> bool {
		self.key().is_some()
	}

	/// Returns true if the transport element is missing.
	pub fn is_channel_unavailable(&self) -> bool {
		matches!(self, Error::ChannelUnavailable { .. })
	}
}
