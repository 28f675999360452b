//! Process-wide registry of bound namespace tags.
//!
//! Two live instances sharing one tag would address the same DOM element and
//! clobber each other silently. Claiming a tag through [`NamespaceRegistry`]
//! turns that into an error at construction; the [`NamespaceClaim`] releases
//! the tag when dropped.

use std::sync::{Arc, LazyLock};

use dashmap::DashSet;
use tracing::{debug, warn};

use crate::error::{Error, Result};

static GLOBAL: LazyLock<Arc<NamespaceRegistry>> = LazyLock::new(|| Arc::new(NamespaceRegistry::new()));

/// Set of namespace tags currently bound.
#[derive(Debug, Default)]
pub struct NamespaceRegistry {
	active: DashSet<String>,
}

impl NamespaceRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry shared by every instance in this process.
	pub fn global() -> Arc<NamespaceRegistry> {
		Arc::clone(&GLOBAL)
	}

	/// Claims `namespace`, failing if it is already bound.
	pub fn claim(self: &Arc<Self>, namespace: &str) -> Result<NamespaceClaim> {
		if !self.active.insert(namespace.to_owned()) {
			warn!(target = "jscomm.registry", namespace, "namespace already bound");
			return Err(Error::NamespaceInUse {
				namespace: namespace.to_owned(),
			});
		}
		debug!(target = "jscomm.registry", namespace, "namespace claimed");
		Ok(NamespaceClaim {
			namespace: namespace.to_owned(),
			registry: Arc::clone(self),
		})
	}

	pub fn is_active(&self, namespace: &str) -> bool {
		self.active.contains(namespace)
	}

	pub fn len(&self) -> usize {
		self.active.len()
	}

	pub fn is_empty(&self) -> bool {
		self.active.is_empty()
	}
}

/// Ownership of one namespace tag. Releases it on drop.
#[derive(Debug)]
pub struct NamespaceClaim {
	namespace: String,
	registry: Arc<NamespaceRegistry>,
}

impl NamespaceClaim {
	pub fn namespace(&self) -> &str {
		&self.namespace
	}
}

impl Drop for NamespaceClaim {
	fn drop(&mut self) {
		self.registry.active.remove(&self.namespace);
		debug!(target = "jscomm.registry", namespace = %self.namespace, "namespace released");
	}
}
