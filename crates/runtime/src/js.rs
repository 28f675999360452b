//! JavaScript sources injected into the embedded page.
//!
//! Every value spliced into a script goes through [`js_string`], which emits a
//! JSON string literal. Quotes, backslashes, and newlines in namespace tags or
//! document content therefore cannot break out of the generated source.

use jscomm_protocol::{Script, ScriptKind};

/// Default selector of the input element inside the shared widget.
pub const DEFAULT_INPUT_SELECTOR: &str = ".widget-input";

/// Encodes `s` as a JavaScript string literal.
///
/// `</` is escaped as well so the literal stays inert if a host inlines the
/// script into a `<script>` tag.
pub fn js_string(s: &str) -> String {
	serde_json::Value::String(s.to_owned())
		.to_string()
		.replace("</", "<\\/")
}

/// Builds the script that assigns `raw` to the shared input and dispatches a
/// bubbling `input` event.
pub fn push_snapshot_script(namespace: &str, input_selector: &str, raw: &str) -> Script {
	let ns = js_string(namespace);
	let selector = js_string(input_selector);
	let value = js_string(raw);
	let source = format!(
		r#"(() => {{
	const parent = document.getElementsByClassName({ns})[0];
	if (!parent) {{
		console.error("jscomm: shared element not found: " + {ns});
		return;
	}}
	const input = parent.querySelector({selector});
	if (!input) {{
		console.error("jscomm: input element not found in " + {ns});
		return;
	}}
	input.value = {value};
	input.dispatchEvent(new Event("input", {{ bubbles: true }}));
}})();"#
	);
	Script::new(
		ScriptKind::PushSnapshot {
			namespace: namespace.to_owned(),
			input_selector: input_selector.to_owned(),
			raw: raw.to_owned(),
		},
		source,
	)
}

/// Builds the script that installs the page-side listener for `namespace`.
///
/// The listener mirrors the parsed document into `window.__jscomm[namespace]`
/// and re-emits each change as a `jscomm:change` event on `document`. Running
/// it twice for the same namespace is a no-op.
pub fn bind_listener_script(namespace: &str, input_selector: &str) -> Script {
	let ns = js_string(namespace);
	let selector = js_string(input_selector);
	let source = format!(
		r#"(() => {{
	const ns = {ns};
	const registry = (window.__jscomm = window.__jscomm || {{}});
	if (registry[ns] && registry[ns].bound) return;
	const parent = document.getElementsByClassName(ns)[0];
	if (!parent) {{
		console.error("jscomm: shared element not found: " + ns);
		return;
	}}
	const input = parent.querySelector({selector});
	if (!input) {{
		console.error("jscomm: input element not found in " + ns);
		return;
	}}
	const parse = (raw) => {{
		try {{
			const value = JSON.parse(raw);
			return value && typeof value === "object" && !Array.isArray(value) ? value : {{}};
		}} catch (_) {{
			return {{}};
		}}
	}};
	const state = (registry[ns] = {{ bound: true, data: parse(input.value) }});
	input.addEventListener("input", () => {{
		state.data = parse(input.value);
		document.dispatchEvent(
			new CustomEvent("jscomm:change", {{ detail: {{ namespace: ns, data: state.data }} }})
		);
	}});
}})();"#
	);
	Script::new(
		ScriptKind::BindListener {
			namespace: namespace.to_owned(),
			input_selector: input_selector.to_owned(),
		},
		source,
	)
}
