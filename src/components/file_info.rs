//! Details panel for the selected node.

use leptos::prelude::*;
use wasm_bindgen::JsValue;

use crate::components::force_graph::GraphNode;

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size with base-1024 units and at most two decimals,
/// e.g. `1536` → `"1.5 KB"`.
pub fn format_file_size(bytes: u64) -> String {
	if bytes == 0 {
		return "0 Bytes".to_string();
	}
	let exp = ((bytes as f64).ln() / 1024_f64.ln()).floor() as usize;
	let exp = exp.min(UNITS.len() - 1);
	let value = bytes as f64 / 1024_f64.powi(exp as i32);
	let fixed = format!("{value:.2}");
	let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
	format!("{trimmed} {}", UNITS[exp])
}

fn format_timestamp(ms: u64) -> String {
	let date = js_sys::Date::new(&JsValue::from_f64(ms as f64));
	String::from(date.to_locale_string("en-US", &JsValue::UNDEFINED))
}

/// Shows name, kind, path, size and modification time of `node`, or nothing when
/// no node is selected.
#[component]
pub fn FileInfoPanel(
	#[prop(into)] node: Signal<Option<GraphNode>>,
	#[prop(into)] on_close: Callback<()>,
) -> impl IntoView {
	move || {
		node.get().map(|n| {
			let size = (!n.is_directory()).then(|| {
				view! {
					<dt>"Size"</dt>
					<dd>{format_file_size(n.size)}</dd>
				}
			});
			view! {
				<aside class="file-info">
					<header>
						<h2>{n.name.clone()}</h2>
						<button class="close" on:click=move |_| on_close.run(())>"×"</button>
					</header>
					<dl>
						<dt>"Type"</dt>
						<dd>{n.kind.as_str()}</dd>
						<dt>"Path"</dt>
						<dd class="path">{n.path.clone()}</dd>
						{size}
						<dt>"Last modified"</dt>
						<dd>{format_timestamp(n.last_modified)}</dd>
					</dl>
				</aside>
			}
		})
	}
}
