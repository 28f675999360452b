//! Change notification methods for [`JsComm`].

use std::sync::Arc;

use jscomm_protocol::Document;
use jscomm_runtime::Subscription;
use tokio::sync::broadcast;

use super::JsComm;

impl JsComm {
	/// Registers a handler called with the parsed document after every
	/// change of the channel value, whichever side made it.
	///
	/// Returns a [`Subscription`] that unregisters the handler when dropped.
	pub fn on_change<F>(&self, handler: F) -> Subscription
	where
		F: Fn(&Document) + Send + Sync + 'static,
	{
		self.channel
			.on_raw_change(Arc::new(move |raw: &str| handler(&Document::parse(raw))))
	}

	/// Subscribes to a stream of documents, one per channel change.
	///
	/// Changes made before subscribing are not received. A receiver that
	/// falls more than 64 changes behind gets `RecvError::Lagged`.
	pub fn changes(&self) -> broadcast::Receiver<Document> {
		self.changes_tx.subscribe()
	}
}
