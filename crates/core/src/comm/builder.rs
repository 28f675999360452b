use std::sync::Arc;

use jscomm_protocol::{Document, EMPTY_DOCUMENT};
use jscomm_runtime::{HostEnvironment, NamespaceRegistry, RemoteInjector, Result, SharedElement, select_channel};
use tokio::sync::broadcast;
use tracing::debug;

use super::{CHANGE_CAPACITY, JsComm};
use crate::config::CommConfig;

/// Builds a fully bound [`JsComm`] from owned config.
pub(super) async fn build(
	host: Arc<dyn HostEnvironment>,
	config: CommConfig,
	registry: Arc<NamespaceRegistry>,
) -> Result<JsComm> {
	let claim = registry.claim(&config.namespace)?;
	let capabilities = host.capabilities();

	debug!(
		target = "jscomm.comm",
		namespace = %config.namespace,
		widget_sync = capabilities.widget_sync,
		bind_listener = config.bind_listener,
		"binding shared element"
	);

	let widget = host.create_widget(EMPTY_DOCUMENT);
	widget.set_visibility(config.visibility);
	widget.add_class(&config.namespace);

	let element = SharedElement::new(config.namespace.clone(), widget);
	element.render(host.as_ref()).await?;

	let injector = RemoteInjector::new(Arc::clone(&host), config.input_selector.clone());
	let channel = select_channel(Arc::clone(&element), injector.clone(), capabilities);

	if config.bind_listener {
		injector.bind_listener(&config.namespace).await?;
	}

	let (changes_tx, _) = broadcast::channel(CHANGE_CAPACITY);
	let tx = changes_tx.clone();
	let binding = channel.on_raw_change(Arc::new(move |raw: &str| {
		// No receivers is fine
		let _ = tx.send(Document::parse(raw));
	}));

	Ok(JsComm {
		config,
		host,
		element,
		channel,
		injector,
		changes_tx,
		_binding: binding,
		_claim: claim,
	})
}
