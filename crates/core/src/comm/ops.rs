//! Key-value operations for [`JsComm`].

use jscomm_protocol::Document;
use jscomm_runtime::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::JsComm;

impl JsComm {
	/// Current document as read from the channel.
	///
	/// A channel value that is not a JSON object reads as empty.
	pub fn snapshot(&self) -> Result<Document> {
		Ok(Document::parse(&self.channel.read_raw()?))
	}

	pub fn keys(&self) -> Result<Vec<String>> {
		Ok(self.snapshot()?.keys().cloned().collect())
	}

	/// Returns true if `key` is present.
	pub fn has(&self, key: &str) -> Result<bool> {
		Ok(self.snapshot()?.contains_key(key))
	}

	/// Returns the value under `key`.
	///
	/// # Errors
	///
	/// `KeyNotFound` if the key is absent.
	pub fn get(&self, key: &str) -> Result<Value> {
		let mut doc = self.snapshot()?;
		doc.remove(key).ok_or_else(|| key_not_found(key))
	}

	/// Returns the value under `key` deserialized into `T`.
	///
	/// # Errors
	///
	/// `KeyNotFound` if the key is absent, `Serialization` if the stored value
	/// does not fit `T`.
	pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
		match self.snapshot()?.get_as::<T>(key) {
			Some(value) => Ok(value?),
			None => Err(key_not_found(key)),
		}
	}

	/// Inserts a new key.
	///
	/// # Errors
	///
	/// `KeyAlreadyExists` if the key is present; the stored value is left
	/// untouched.
	pub async fn add(&self, key: &str, value: impl Serialize) -> Result<()> {
		let mut doc = self.snapshot()?;
		if doc.contains_key(key) {
			return Err(Error::KeyAlreadyExists { key: key.to_owned() });
		}
		doc.insert_serialized(key, &value)?;
		self.write_back(&doc).await
	}

	/// Replaces the value of an existing key.
	///
	/// # Errors
	///
	/// `KeyNotFound` if the key is absent.
	pub async fn update(&self, key: &str, value: impl Serialize) -> Result<()> {
		let mut doc = self.snapshot()?;
		if !doc.contains_key(key) {
			return Err(key_not_found(key));
		}
		doc.insert_serialized(key, &value)?;
		self.write_back(&doc).await
	}

	/// Inserts or replaces the value of `key`.
	pub async fn set(&self, key: &str, value: impl Serialize) -> Result<()> {
		let mut doc = self.snapshot()?;
		doc.insert_serialized(key, &value)?;
		self.write_back(&doc).await
	}

	/// Deletes `key`, returning its last value.
	///
	/// # Errors
	///
	/// `KeyNotFound` if the key is absent.
	pub async fn remove(&self, key: &str) -> Result<Value> {
		let mut doc = self.snapshot()?;
		let removed = doc.remove(key).ok_or_else(|| key_not_found(key))?;
		self.write_back(&doc).await?;
		Ok(removed)
	}

	/// Replaces the document with an empty mapping.
	pub async fn clear_all(&self) -> Result<()> {
		// Surface a missing element before writing anything.
		self.channel.read_raw()?;
		self.write_back(&Document::new()).await
	}

	/// Pushes `doc` through every transport path, host side first.
	///
	/// The channel is written exactly once. Unless the channel already
	/// delivers into the page, the injector then pushes the same snapshot.
	/// A failed push restores the previous channel value, so a failed
	/// mutation leaves the document as it was; change handlers see the new
	/// value and then the restored one.
	async fn write_back(&self, doc: &Document) -> Result<()> {
		let raw = doc.serialize()?;
		let previous = self.channel.read_raw()?;
		self.channel.write_raw(&raw).await?;
		if !self.channel.reaches_embedded() {
			if let Err(err) = self.injector.push_raw(self.namespace(), &raw).await {
				warn!(target = "jscomm.comm", namespace = %self.namespace(), %err, "push failed, restoring previous value");
				self.channel.write_raw(&previous).await?;
				return Err(err);
			}
		}
		debug!(target = "jscomm.comm", namespace = %self.namespace(), keys = doc.len(), "write-back");
		Ok(())
	}
}

fn key_not_found(key: &str) -> Error {
	Error::KeyNotFound { key: key.to_owned() }
}
