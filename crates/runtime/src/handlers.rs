//! Change handler registry.
//!
//! Handlers live in an [`IndexMap`] keyed by [`HandlerId`] so removal is O(1)
//! and dispatch follows registration order. Registration hands back a
//! [`Subscription`] that unregisters the handler when dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::Mutex;

/// Unique identifier for change handlers.
pub type HandlerId = u64;

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);

/// Returns a new globally-unique handler ID.
pub fn next_handler_id() -> HandlerId {
	NEXT_HANDLER_ID.fetch_add(1, Ordering::SeqCst)
}

/// Synchronous handler receiving a borrowed event.
pub type HandlerFn<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Handler invoked with a raw channel value.
pub type RawChangeFn = HandlerFn<str>;

/// Handler storage shared between the registry owner and its subscriptions.
pub type HandlerMap<E> = Arc<Mutex<IndexMap<HandlerId, HandlerFn<E>>>>;

pub fn new_handler_map<E: ?Sized>() -> HandlerMap<E> {
	Arc::new(Mutex::new(IndexMap::new()))
}

/// Registers `handler` and returns a subscription bound to it.
pub fn register<E>(handlers: &HandlerMap<E>, handler: HandlerFn<E>) -> Subscription
where
	E: ?Sized + 'static,
{
	let id = next_handler_id();
	handlers.lock().insert(id, handler);
	Subscription::from_handler_map(id, handlers)
}

/// Invokes every registered handler with `event`.
///
/// Handlers are cloned out before the calls, so a handler may register or
/// drop subscriptions on the same map without deadlocking.
pub fn dispatch<E: ?Sized>(handlers: &HandlerMap<E>, event: &E) {
	let snapshot: Vec<HandlerFn<E>> = handlers.lock().values().cloned().collect();
	for handler in snapshot {
		handler(event);
	}
}

/// RAII handle that unregisters a handler on drop.
///
/// Holds a weak reference to the handler map, so dropping it after the
/// owning channel is gone is a no-op.
pub struct Subscription {
	id: HandlerId,
	dropper: Option<Arc<dyn Fn(HandlerId) + Send + Sync>>,
}

impl Subscription {
	/// Creates a subscription with a custom dropper function.
	pub fn new(id: HandlerId, dropper: Arc<dyn Fn(HandlerId) + Send + Sync>) -> Self {
		Self {
			id,
			dropper: Some(dropper),
		}
	}

	/// Creates a subscription from a handler map using a weak reference.
	pub fn from_handler_map<E>(id: HandlerId, handlers: &HandlerMap<E>) -> Self
	where
		E: ?Sized + 'static,
	{
		let weak: Weak<Mutex<IndexMap<HandlerId, HandlerFn<E>>>> = Arc::downgrade(handlers);
		let dropper = Arc::new(move |id: HandlerId| {
			if let Some(map) = weak.upgrade() {
				map.lock().shift_remove(&id);
			}
		});
		Self::new(id, dropper)
	}

	/// Returns this subscription's handler ID.
	pub fn id(&self) -> HandlerId {
		self.id
	}

	/// Explicitly unsubscribes. Equivalent to dropping.
	pub fn unsubscribe(mut self) {
		if let Some(dropper) = self.dropper.take() {
			(dropper)(self.id);
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		if let Some(dropper) = self.dropper.take() {
			(dropper)(self.id);
		}
	}
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription")
			.field("id", &self.id)
			.field("active", &self.dropper.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::AtomicUsize;

	use super::*;

	#[test]
	fn test_handler_id_increments() {
		let id1 = next_handler_id();
		let id2 = next_handler_id();
		assert!(id2 > id1);
	}

	#[test]
	fn test_dispatch_in_registration_order() {
		let map: HandlerMap<str> = new_handler_map();
		let seen = Arc::new(Mutex::new(Vec::new()));

		let first = Arc::clone(&seen);
		let _a = register(&map, Arc::new(move |v: &str| first.lock().push(format!("a:{v}"))));
		let second = Arc::clone(&seen);
		let _b = register(&map, Arc::new(move |v: &str| second.lock().push(format!("b:{v}"))));

		dispatch(&map, "{}");
		assert_eq!(*seen.lock(), ["a:{}", "b:{}"]);
	}

	#[test]
	fn test_subscription_drop_unregisters() {
		let map: HandlerMap<str> = new_handler_map();
		let calls = Arc::new(AtomicUsize::new(0));

		let counter = Arc::clone(&calls);
		let sub = register(&map, Arc::new(move |_: &str| {
			counter.fetch_add(1, Ordering::SeqCst);
		}));
		dispatch(&map, "x");
		drop(sub);
		dispatch(&map, "y");

		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert!(map.lock().is_empty());
	}

	#[test]
	fn test_subscription_unsubscribe() {
		let map: HandlerMap<str> = new_handler_map();
		let sub = register(&map, Arc::new(|_: &str| {}));
		assert_eq!(map.lock().len(), 1);

		sub.unsubscribe();
		assert_eq!(map.lock().len(), 0);
	}

	#[test]
	fn test_subscription_outlives_map() {
		let map: HandlerMap<str> = new_handler_map();
		let sub = register(&map, Arc::new(|_: &str| {}));
		drop(map);
		// Should not panic
		drop(sub);
	}

	#[test]
	fn test_handler_may_unsubscribe_during_dispatch() {
		let map: HandlerMap<str> = new_handler_map();
		let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

		let inner = Arc::clone(&slot);
		let sub = register(&map, Arc::new(move |_: &str| {
			inner.lock().take();
		}));
		*slot.lock() = Some(sub);

		dispatch(&map, "{}");
		assert!(map.lock().is_empty());
	}
}
