//! Line-oriented result envelopes for `jscomm run`.
//!
//! Every executed operation produces one JSON line on stdout:
//!
//! ```json
//! {"ok":true,"op":"get","key":"theme","value":"dark"}
//! ```
//!
//! On failure:
//!
//! ```json
//! {"ok":false,"op":"add","key":"theme","error":{"code":"KEY_ALREADY_EXISTS","message":"..."}}
//! ```


use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of one operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpResult {
	pub ok: bool,
	pub op: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub key: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub value: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<OpError>,
}

impl OpResult {
	pub fn success(op: &str, key: Option<&str>, value: Option<Value>) -> Self {
		Self {
			ok: true,
			op: op.to_owned(),
			key: key.map(str::to_owned),
			value,
			error: None,
		}
	}

	pub fn failure(op: &str, key: Option<&str>, error: OpError) -> Self {
		Self {
			ok: false,
			op: op.to_owned(),
			key: key.map(str::to_owned),
			value: None,
			error: Some(error),
		}
	}
}

/// Error information for failed operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpError {
	pub code: ErrorCode,
	pub message: String,
}

impl From<&jscomm::Error> for OpError {
	fn from(err: &jscomm::Error) -> Self {
		Self {
			code: ErrorCode::from_comm_error(err),
			message: err.to_string(),
		}
	}
}

/// Standardized error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	KeyNotFound,
	KeyAlreadyExists,
	/// Value not representable as JSON
	SerializationFailed,
	/// Shared element missing
	ChannelUnavailable,
	NamespaceInUse,
	HostError,
	InvalidInput,
	ConfigError,
	IoError,
	/// One or more operations in a script failed
	OperationFailed,
}

impl ErrorCode {
	pub fn from_comm_error(err: &jscomm::Error) -> Self {
		match err {
			jscomm::Error::KeyNotFound { .. } => ErrorCode::KeyNotFound,
			jscomm::Error::KeyAlreadyExists { .. } => ErrorCode::KeyAlreadyExists,
			jscomm::Error::Serialization(_) => ErrorCode::SerializationFailed,
			jscomm::Error::ChannelUnavailable { .. } => ErrorCode::ChannelUnavailable,
			jscomm::Error::NamespaceInUse { .. } => ErrorCode::NamespaceInUse,
			jscomm::Error::Host(_) => ErrorCode::HostError,
		}
	}
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let code = match self {
			ErrorCode::KeyNotFound => "KEY_NOT_FOUND",
			ErrorCode::KeyAlreadyExists => "KEY_ALREADY_EXISTS",
			ErrorCode::SerializationFailed => "SERIALIZATION_FAILED",
			ErrorCode::ChannelUnavailable => "CHANNEL_UNAVAILABLE",
			ErrorCode::NamespaceInUse => "NAMESPACE_IN_USE",
			ErrorCode::HostError => "HOST_ERROR",
			ErrorCode::InvalidInput => "INVALID_INPUT",
			ErrorCode::ConfigError => "CONFIG_ERROR",
			ErrorCode::IoError => "IO_ERROR",
			ErrorCode::OperationFailed => "OPERATION_FAILED",
		};
		f.write_str(code)
	}
}

/// Writes `result` as one compact JSON line.
pub fn write_result<W: Write>(out: &mut W, result: &OpResult) -> io::Result<()> {
	serde_json::to_writer(&mut *out, result)?;
	out.write_all(b"\n")
}

/// Print error to stderr in human-readable format
pub fn print_error_stderr(code: ErrorCode, message: &str) {
	eprintln!("Error [{code}]: {message}");
}
