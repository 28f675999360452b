//! Operation scripts for `jscomm run`.
//!
//! One operation per line; blank lines and lines starting with `#` are
//! skipped:
//!
//! ```text
//! add theme "dark"
//! set size {"w": 640, "h": 480}
//! update theme light
//! get theme
//! has size
//! remove size
//! clear
//! dump
//! ```
//!
//! Values are JSON. A value that does not parse as JSON is taken as a plain
//! string, so `light` and `"light"` are equivalent.

use jscomm::JsComm;
use serde_json::Value;

use crate::error::{CliError, Result};
use crate::output::{OpError, OpResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
	Add { key: String, value: Value },
	Update { key: String, value: Value },
	Set { key: String, value: Value },
	Get { key: String },
	Has { key: String },
	Remove { key: String },
	Clear,
	Dump,
}

impl Op {
	/// Parses one script line. Returns `None` for blank and comment lines.
	pub fn parse(line: &str, line_no: usize) -> Result<Option<Op>> {
		let line = line.trim();
		if line.is_empty() || line.starts_with('#') {
			return Ok(None);
		}

		let (name, rest) = split_word(line);
		let invalid = |message: String| CliError::InvalidOp {
			line: line_no,
			message,
		};

		let op = match name {
			"add" | "update" | "set" => {
				let (key, value) = split_word(rest);
				if key.is_empty() || value.is_empty() {
					return Err(invalid(format!("usage: {name} <key> <value>")));
				}
				let key = key.to_owned();
				let value = parse_value(value);
				match name {
					"add" => Op::Add { key, value },
					"update" => Op::Update { key, value },
					_ => Op::Set { key, value },
				}
			}
			"get" | "has" | "remove" => {
				let (key, extra) = split_word(rest);
				if key.is_empty() || !extra.is_empty() {
					return Err(invalid(format!("usage: {name} <key>")));
				}
				let key = key.to_owned();
				match name {
					"get" => Op::Get { key },
					"has" => Op::Has { key },
					_ => Op::Remove { key },
				}
			}
			"clear" if rest.is_empty() => Op::Clear,
			"dump" if rest.is_empty() => Op::Dump,
			"clear" | "dump" => return Err(invalid(format!("{name} takes no arguments"))),
			other => return Err(invalid(format!("unknown operation '{other}'"))),
		};
		Ok(Some(op))
	}

	pub fn name(&self) -> &'static str {
		match self {
			Op::Add { .. } => "add",
			Op::Update { .. } => "update",
			Op::Set { .. } => "set",
			Op::Get { .. } => "get",
			Op::Has { .. } => "has",
			Op::Remove { .. } => "remove",
			Op::Clear => "clear",
			Op::Dump => "dump",
		}
	}

	pub fn key(&self) -> Option<&str> {
		match self {
			Op::Add { key, .. }
			| Op::Update { key, .. }
			| Op::Set { key, .. }
			| Op::Get { key }
			| Op::Has { key }
			| Op::Remove { key } => Some(key),
			Op::Clear | Op::Dump => None,
		}
	}

	/// Runs the operation and wraps the outcome in an [`OpResult`].
	pub async fn execute(&self, comm: &JsComm) -> OpResult {
		let outcome = match self {
			Op::Add { key, value } => comm.add(key, value).await.map(|()| None),
			Op::Update { key, value } => comm.update(key, value).await.map(|()| None),
			Op::Set { key, value } => comm.set(key, value).await.map(|()| None),
			Op::Get { key } => comm.get(key).map(Some),
			Op::Has { key } => comm.has(key).map(|found| Some(Value::Bool(found))),
			Op::Remove { key } => comm.remove(key).await.map(Some),
			Op::Clear => comm.clear_all().await.map(|()| None),
			Op::Dump => comm
				.snapshot()
				.map(|doc| Some(Value::Object(doc.into_inner()))),
		};
		match outcome {
			Ok(value) => OpResult::success(self.name(), self.key(), value),
			Err(err) => OpResult::failure(self.name(), self.key(), OpError::from(&err)),
		}
	}
}

fn split_word(s: &str) -> (&str, &str) {
	let s = s.trim_start();
	match s.find(char::is_whitespace) {
		Some(idx) => (&s[..idx], s[idx..].trim()),
		None => (s, ""),
	}
}

fn parse_value(raw: &str) -> Value {
	serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}
