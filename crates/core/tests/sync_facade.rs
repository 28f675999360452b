//! End-to-end behavior of `JsComm` against the in-memory host.

use std::collections::BTreeMap;
use std::sync::Arc;

use jscomm::{
	CommConfig, Document, Error, HostCapabilities, HostEnvironment, JsComm, MemoryHost, NamespaceRegistry, ScriptKind,
	TextWidget, Visibility,
};
use parking_lot::Mutex;
use serde_json::json;

async fn setup(namespace: &str) -> (Arc<MemoryHost>, JsComm) {
	setup_with(MemoryHost::new(), namespace).await
}

async fn setup_with(host: MemoryHost, namespace: &str) -> (Arc<MemoryHost>, JsComm) {
	let host = Arc::new(host);
	let dyn_host: Arc<dyn HostEnvironment> = host.clone();
	let comm = JsComm::builder(dyn_host)
		.namespace(namespace)
		.registry(Arc::new(NamespaceRegistry::new()))
		.build()
		.await
		.unwrap();
	(host, comm)
}

fn assignments(host: &MemoryHost, namespace: &str) -> Vec<String> {
	host.widget(namespace).unwrap().assignments()
}

#[tokio::test]
async fn construction_renders_hidden_tagged_widget() {
	let (host, comm) = setup("ctor").await;

	let widget = host.widget("ctor").unwrap();
	assert_eq!(widget.value(), "{}");
	assert_eq!(widget.visibility(), Visibility::Hidden);
	assert_eq!(widget.classes(), ["ctor"]);
	assert!(widget.assignments().is_empty());
	assert_eq!(host.render_count(), 1);
	assert!(comm.is_available());

	let scripts = host.scripts();
	assert_eq!(scripts.len(), 1);
	assert!(matches!(scripts[0].kind(), ScriptKind::BindListener { namespace, .. } if namespace == "ctor"));
	assert_eq!(host.page_document("ctor"), Some(Document::new()));
}

#[tokio::test]
async fn listener_binding_can_be_disabled() {
	let host = Arc::new(MemoryHost::new());
	let dyn_host: Arc<dyn HostEnvironment> = host.clone();
	let config = CommConfig::new("quiet")
		.with_bind_listener(false)
		.with_visibility(Visibility::Invisible);
	let _comm = JsComm::builder(dyn_host)
		.config(config)
		.registry(Arc::new(NamespaceRegistry::new()))
		.build()
		.await
		.unwrap();

	assert!(host.scripts().is_empty());
	assert!(host.page_document("quiet").is_none());
	assert_eq!(host.widget("quiet").unwrap().visibility(), Visibility::Invisible);
}

#[tokio::test]
async fn add_then_get_and_duplicate_add_fails() {
	let (_host, comm) = setup("add").await;

	comm.add("a", 1).await.unwrap();
	assert_eq!(comm.get("a").unwrap(), json!(1));

	let err = comm.add("a", 2).await.unwrap_err();
	assert!(matches!(err, Error::KeyAlreadyExists { ref key } if key == "a"));
	assert_eq!(comm.get("a").unwrap(), json!(1));
}

#[tokio::test]
async fn update_missing_key_leaves_document_unchanged() {
	let (host, comm) = setup("update").await;
	comm.add("present", "yes").await.unwrap();
	let before = comm.snapshot().unwrap();

	let err = comm.update("missing", 5).await.unwrap_err();
	assert!(matches!(err, Error::KeyNotFound { ref key } if key == "missing"));
	assert_eq!(comm.snapshot().unwrap(), before);
	assert_eq!(assignments(&host, "update").len(), 1);

	comm.update("present", "still").await.unwrap();
	assert_eq!(comm.get("present").unwrap(), json!("still"));
}

#[tokio::test]
async fn set_inserts_then_replaces() {
	let (_host, comm) = setup("set").await;

	comm.set("x", 1).await.unwrap();
	comm.set("x", 2).await.unwrap();
	assert_eq!(comm.get("x").unwrap(), json!(2));
}

#[tokio::test]
async fn remove_twice_fails_second_time() {
	let (_host, comm) = setup("remove").await;

	comm.set("x", 1).await.unwrap();
	assert_eq!(comm.remove("x").await.unwrap(), json!(1));
	assert!(!comm.has("x").unwrap());

	let err = comm.remove("x").await.unwrap_err();
	assert!(matches!(err, Error::KeyNotFound { .. }));
}

#[tokio::test]
async fn get_missing_key_fails() {
	let (_host, comm) = setup("get").await;
	let err = comm.get("nope").unwrap_err();
	assert_eq!(err.key(), Some("nope"));
	assert!(comm.get_as::<i64>("nope").unwrap_err().is_key_error());
}

#[tokio::test]
async fn clear_all_removes_every_key() {
	let (_host, comm) = setup("clear").await;
	for key in ["a", "b", "c"] {
		comm.add(key, key).await.unwrap();
	}

	comm.clear_all().await.unwrap();
	for key in ["a", "b", "c"] {
		assert!(!comm.has(key).unwrap());
	}
	assert!(comm.snapshot().unwrap().is_empty());
	// Clearing an empty store is fine too
	comm.clear_all().await.unwrap();
}

#[tokio::test]
async fn each_mutation_writes_back_exactly_once() {
	let (host, comm) = setup("once").await;

	comm.add("a", 1).await.unwrap();
	comm.update("a", json!({"nested": [1, 2]})).await.unwrap();
	comm.set("b", "two").await.unwrap();
	comm.remove("a").await.unwrap();
	comm.clear_all().await.unwrap();

	let writes = assignments(&host, "once");
	assert_eq!(writes.len(), 5);
	assert_eq!(host.push_count("once"), 5);

	let expected = [
		json!({"a": 1}),
		json!({"a": {"nested": [1, 2]}}),
		json!({"a": {"nested": [1, 2]}, "b": "two"}),
		json!({"b": "two"}),
		json!({}),
	];
	for (raw, expected) in writes.iter().zip(expected) {
		let parsed = serde_json::to_value(Document::parse(raw)).unwrap();
		assert_eq!(parsed, expected);
	}
	assert_eq!(host.embedded_value("once").as_deref(), Some("{}"));
}

#[tokio::test]
async fn failed_mutations_write_nothing() {
	let (host, comm) = setup("nowrite").await;
	comm.add("a", 1).await.unwrap();
	let scripts_before = host.scripts().len();

	assert!(comm.add("a", 2).await.is_err());
	assert!(comm.update("b", 2).await.is_err());
	assert!(comm.remove("b").await.is_err());

	assert_eq!(assignments(&host, "nowrite").len(), 1);
	assert_eq!(host.scripts().len(), scripts_before);
}

#[tokio::test]
async fn unserializable_value_is_rejected() {
	let (host, comm) = setup("serde").await;

	let mut bad = BTreeMap::new();
	bad.insert((1, 2), "tuple keys");

	let err = comm.set("bad", &bad).await.unwrap_err();
	assert!(matches!(err, Error::Serialization(_)));
	assert!(!comm.has("bad").unwrap());
	assert!(assignments(&host, "serde").is_empty());
}

#[tokio::test]
async fn typed_values_round_trip() {
	#[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
	struct Viewport {
		zoom: f64,
		center: (i32, i32),
		label: Option<String>,
	}

	let (_host, comm) = setup("typed").await;
	let view = Viewport {
		zoom: 1.5,
		center: (10, -4),
		label: None,
	};
	comm.add("view", &view).await.unwrap();

	assert_eq!(comm.get_as::<Viewport>("view").unwrap(), view);
	assert!(matches!(comm.get_as::<String>("view").unwrap_err(), Error::Serialization(_)));
}

#[tokio::test]
async fn keys_keep_insertion_order() {
	let (_host, comm) = setup("order").await;
	comm.add("zeta", 1).await.unwrap();
	comm.add("alpha", 2).await.unwrap();
	comm.add("mid", 3).await.unwrap();
	comm.remove("alpha").await.unwrap();

	assert_eq!(comm.keys().unwrap(), ["zeta", "mid"]);
}

#[tokio::test]
async fn page_document_follows_host_writes() {
	let (host, comm) = setup("mirror").await;
	comm.set("color", "red").await.unwrap();

	let page = host.page_document("mirror").unwrap();
	assert_eq!(page.get("color"), Some(&json!("red")));
	assert_eq!(host.input_events("mirror"), 1);
}

#[tokio::test]
async fn script_channel_host_pushes_once_per_mutation() {
	let (host, comm) = setup_with(MemoryHost::with_capabilities(HostCapabilities { widget_sync: false }), "scripted").await;

	comm.add("a", 1).await.unwrap();
	comm.set("b", 2).await.unwrap();

	assert_eq!(assignments(&host, "scripted").len(), 2);
	assert_eq!(host.push_count("scripted"), 2);
	assert_eq!(host.embedded_value("scripted").as_deref(), Some(r#"{"a":1,"b":2}"#));
	assert_eq!(host.page_document("scripted").unwrap().len(), 2);
}

#[tokio::test]
async fn page_writes_reach_host_reads_and_handlers() {
	let (host, comm) = setup("inbound").await;
	let seen = Arc::new(Mutex::new(Vec::new()));
	let sink = Arc::clone(&seen);
	let _sub = comm.on_change(move |doc| sink.lock().push(doc.clone()));
	let mut changes = comm.changes();

	assert!(host.simulate_embedded_write("inbound", r#"{"clicked":true}"#));

	assert!(comm.has("clicked").unwrap());
	assert_eq!(comm.get("clicked").unwrap(), json!(true));
	assert_eq!(seen.lock().len(), 1);
	let streamed = changes.recv().await.unwrap();
	assert_eq!(streamed.get("clicked"), Some(&json!(true)));

	// Host mutations build on the page's write
	comm.add("ack", 1).await.unwrap();
	assert_eq!(comm.keys().unwrap(), ["clicked", "ack"]);
	assert_eq!(seen.lock().len(), 2);
}

#[tokio::test]
async fn corrupt_channel_reads_as_empty() {
	let (host, comm) = setup("corrupt").await;
	comm.add("a", 1).await.unwrap();

	host.simulate_embedded_write("corrupt", "[1,2]");
	assert!(!comm.has("a").unwrap());
	assert!(comm.snapshot().unwrap().is_empty());

	// The next write replaces the corrupt value with a valid object
	comm.set("b", 2).await.unwrap();
	assert_eq!(host.embedded_value("corrupt").as_deref(), Some(r#"{"b":2}"#));
}

#[tokio::test]
async fn last_writer_wins_across_contexts() {
	let (host, comm) = setup("race").await;
	comm.add("count", 1).await.unwrap();

	// Page overwrites the document without seeing any later host state
	host.simulate_embedded_write("race", r#"{"count":10}"#);
	comm.update("count", 2).await.unwrap();

	assert_eq!(comm.get("count").unwrap(), json!(2));
	assert_eq!(host.embedded_value("race").as_deref(), Some(r#"{"count":2}"#));
}

#[tokio::test]
async fn torn_down_element_is_unavailable_until_rendered() {
	let (host, comm) = setup("teardown").await;
	comm.add("kept", true).await.unwrap();

	host.teardown("teardown");
	assert!(!comm.is_available());
	assert!(comm.has("kept").unwrap_err().is_channel_unavailable());
	assert!(comm.get("kept").unwrap_err().is_channel_unavailable());
	assert!(comm.set("x", 1).await.unwrap_err().is_channel_unavailable());
	assert!(comm.clear_all().await.unwrap_err().is_channel_unavailable());

	comm.render().await.unwrap();
	assert!(comm.is_available());
	assert_eq!(comm.get("kept").unwrap(), json!(true));
	assert_eq!(host.page_document("teardown").unwrap().get("kept"), Some(&json!(true)));
}

#[tokio::test]
async fn detach_marks_channel_unavailable() {
	let (_host, comm) = setup("detach").await;
	comm.detach();
	assert_eq!(comm.element_state(), jscomm::ElementState::Detached);
	assert!(matches!(
		comm.add("a", 1).await.unwrap_err(),
		Error::ChannelUnavailable { ref namespace } if namespace == "detach"
	));
}

#[tokio::test]
async fn host_failure_surfaces_from_push() {
	let (host, comm) = setup("hostfail").await;
	comm.set("a", 1).await.unwrap();
	host.fail_remote(Some("kernel gone"));

	let err = comm.set("a", 2).await.unwrap_err();
	assert!(matches!(err, Error::Host(ref msg) if msg == "kernel gone"));
	let err = comm.add("b", true).await.unwrap_err();
	assert!(matches!(err, Error::Host(_)));

	// Failed mutations leave the document as it was
	host.fail_remote(None);
	assert_eq!(comm.get("a").unwrap(), json!(1));
	assert!(!comm.has("b").unwrap());
	assert_eq!(host.widget("hostfail").unwrap().value(), r#"{"a":1}"#);
	assert_eq!(host.embedded_value("hostfail").as_deref(), Some(r#"{"a":1}"#));

	// and the strict operations can be retried
	comm.add("b", true).await.unwrap();
	assert_eq!(comm.get("b").unwrap(), json!(true));
}

#[tokio::test]
async fn scripted_host_failure_restores_document() {
	let (host, comm) = setup_with(MemoryHost::with_capabilities(HostCapabilities { widget_sync: false }), "scriptfail").await;
	comm.set("a", 1).await.unwrap();
	host.fail_remote(Some("kernel gone"));

	assert!(matches!(comm.remove("a").await.unwrap_err(), Error::Host(_)));
	assert!(matches!(comm.clear_all().await.unwrap_err(), Error::Host(_)));

	host.fail_remote(None);
	assert_eq!(comm.snapshot().unwrap().len(), 1);
	assert_eq!(comm.get("a").unwrap(), json!(1));
	assert_eq!(host.embedded_value("scriptfail").as_deref(), Some(r#"{"a":1}"#));
}

#[tokio::test]
async fn namespaces_are_exclusive_while_bound() {
	let registry = Arc::new(NamespaceRegistry::new());
	let host: Arc<dyn HostEnvironment> = Arc::new(MemoryHost::new());

	let first = JsComm::builder(Arc::clone(&host))
		.registry(Arc::clone(&registry))
		.build()
		.await
		.unwrap();
	assert_eq!(first.namespace(), "comm-class");

	let err = JsComm::builder(Arc::clone(&host))
		.registry(Arc::clone(&registry))
		.build()
		.await
		.unwrap_err();
	assert!(matches!(err, Error::NamespaceInUse { ref namespace } if namespace == "comm-class"));

	let other = JsComm::builder(Arc::clone(&host))
		.namespace("other")
		.registry(Arc::clone(&registry))
		.build()
		.await;
	assert!(other.is_ok());

	drop(first);
	assert!(!registry.is_active("comm-class"));
	assert!(
		JsComm::builder(host)
			.registry(registry)
			.build()
			.await
			.is_ok()
	);
}

#[tokio::test]
async fn independent_namespaces_do_not_interfere() {
	let host = Arc::new(MemoryHost::new());
	let registry = Arc::new(NamespaceRegistry::new());
	let dyn_host: Arc<dyn HostEnvironment> = host.clone();

	let left = JsComm::builder(Arc::clone(&dyn_host))
		.namespace("left")
		.registry(Arc::clone(&registry))
		.build()
		.await
		.unwrap();
	let right = JsComm::builder(dyn_host)
		.namespace("right")
		.registry(registry)
		.build()
		.await
		.unwrap();

	left.set("k", "L").await.unwrap();
	right.set("k", "R").await.unwrap();

	assert_eq!(left.get("k").unwrap(), json!("L"));
	assert_eq!(right.get("k").unwrap(), json!("R"));
	assert_eq!(host.embedded_value("left").as_deref(), Some(r#"{"k":"L"}"#));
	assert_eq!(host.embedded_value("right").as_deref(), Some(r#"{"k":"R"}"#));
}

#[tokio::test]
async fn listener_failure_releases_namespace_after_render() {
	let registry = Arc::new(NamespaceRegistry::new());
	let host = Arc::new(MemoryHost::new());
	host.fail_remote(Some("kernel gone"));

	let dyn_host: Arc<dyn HostEnvironment> = host.clone();
	let err = JsComm::builder(dyn_host)
		.namespace("bindfail")
		.registry(Arc::clone(&registry))
		.build()
		.await
		.unwrap_err();

	assert!(matches!(err, Error::Host(_)));
	assert_eq!(host.render_count(), 1);
	assert_eq!(host.embedded_value("bindfail").as_deref(), Some("{}"));
	assert!(!registry.is_active("bindfail"));
}
