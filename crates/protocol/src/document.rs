//! The shared key-value document carried on the channel.
//!
//! On the wire a [`Document`] is a UTF-8 JSON object. Reading is lenient:
//! anything that is not a JSON object parses to the empty document, so an
//! uninitialized or half-written channel never blocks a read. Writing is
//! strict: values that cannot be represented are rejected at the boundary.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw channel value of an empty document.
pub const EMPTY_DOCUMENT: &str = "{}";

/// Ordered mapping of string keys to JSON values.
///
/// Insertion order is preserved so serialized snapshots are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a raw channel value.
	///
	/// Empty input, malformed JSON, and non-object top levels (arrays,
	/// scalars) all yield the empty document.
	pub fn parse(raw: &str) -> Self {
		match serde_json::from_str::<Value>(raw) {
			Ok(Value::Object(map)) => Self(map),
			_ => Self::default(),
		}
	}

	/// Encodes the document as a compact JSON object.
	///
	/// # Errors
	///
	/// Returns the underlying [`serde_json::Error`] if a value cannot be
	/// encoded.
	pub fn serialize(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(&self.0)
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	/// Deserializes the value under `key` into `T`.
	///
	/// Returns `None` when the key is absent.
	pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<Result<T, serde_json::Error>> {
		self.0.get(key).map(|v| T::deserialize(v))
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	/// Inserts or replaces a value, returning the previous one.
	pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
		self.0.insert(key.into(), value)
	}

	/// Converts `value` to JSON and inserts it.
	///
	/// # Errors
	///
	/// Fails if `value`'s [`Serialize`] impl cannot produce JSON (for
	/// example a map with non-string keys). The document is untouched on
	/// failure.
	pub fn insert_serialized<T: Serialize + ?Sized>(
		&mut self,
		key: impl Into<String>,
		value: &T,
	) -> Result<Option<Value>, serde_json::Error> {
		let value = serde_json::to_value(value)?;
		Ok(self.insert(key, value))
	}

	/// Removes a key, keeping the order of the remaining entries.
	pub fn remove(&mut self, key: &str) -> Option<Value> {
		self.0.shift_remove(key)
	}

	pub fn clear(&mut self) {
		self.0.clear();
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn keys(&self) -> impl Iterator<Item = &String> {
		self.0.keys()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
		self.0.iter()
	}

	pub fn into_inner(self) -> Map<String, Value> {
		self.0
	}
}

impl From<Map<String, Value>> for Document {
	fn from(map: Map<String, Value>) -> Self {
		Self(map)
	}
}

impl FromIterator<(String, Value)> for Document {
	fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}
