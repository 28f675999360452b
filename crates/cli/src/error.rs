use std::path::PathBuf;

use thiserror::Error;

use crate::output::ErrorCode;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	/// A line of an operation script could not be parsed.
	#[error("line {line}: {message}")]
	InvalidOp { line: usize, message: String },

	#[error("failed to load config: {path}")]
	Config {
		path: PathBuf,
		#[source]
		source: anyhow::Error,
	},

	/// At least one operation failed; results were already printed.
	#[error("{failed} operation(s) failed")]
	OpsFailed { failed: usize },

	#[error(transparent)]
	Comm(#[from] jscomm::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl CliError {
	pub fn code(&self) -> ErrorCode {
		match self {
			CliError::InvalidOp { .. } => ErrorCode::InvalidInput,
			CliError::Config { .. } => ErrorCode::ConfigError,
			CliError::OpsFailed { .. } => ErrorCode::OperationFailed,
			CliError::Comm(err) => ErrorCode::from_comm_error(err),
			CliError::Io(_) => ErrorCode::IoError,
			CliError::Json(_) => ErrorCode::InvalidInput,
		}
	}
}
