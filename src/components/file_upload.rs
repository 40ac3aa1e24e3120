//! Upload form: a directory picker and a `.zip` picker.
//!
//! Files are read asynchronously and the graph is built only once every read has
//! finished, so the host never sees a partial graph.

use leptos::html::Input;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{info, warn};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, HtmlInputElement};

use crate::components::force_graph::GraphData;
use crate::error::{GraphError, Result};
use crate::ingest::archive::read_archive;
use crate::ingest::{FileRecord, IngestConfig, build_graph};

/// What the user picked.
enum Upload {
	Directory(Vec<File>),
	Archive(File),
}

fn is_archive_name(name: &str) -> bool {
	name.rsplit_once('.')
		.is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("zip"))
}

/// Path of `file` relative to the picked directory, or its bare name.
fn relative_path(file: &File) -> String {
	js_sys::Reflect::get(file, &JsValue::from_str("webkitRelativePath"))
		.ok()
		.and_then(|v| v.as_string())
		.filter(|p| !p.is_empty())
		.unwrap_or_else(|| file.name())
}

async fn read_bytes(file: &File, path: &str) -> Result<Vec<u8>> {
	let buffer = JsFuture::from(file.array_buffer())
		.await
		.map_err(|e| GraphError::FileRead {
			path: path.to_string(),
			message: format!("{e:?}"),
		})?;
	Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// Reads every file; a failed read still yields a record, just without content.
async fn read_directory(files: Vec<File>) -> Vec<FileRecord> {
	let mut records = Vec::with_capacity(files.len());
	for file in files {
		let path = relative_path(&file);
		let last_modified = file.last_modified().max(0.0) as u64;
		match read_bytes(&file, &path).await {
			Ok(bytes) => records.push(FileRecord::new(path, bytes, last_modified)),
			Err(e) => {
				warn!("codebase-graph: {e}; keeping it without content");
				records.push(FileRecord::unread(path, file.size() as u64, last_modified));
			}
		}
	}
	records
}

/// Reads and builds. `Ok(None)` means the upload held no files.
async fn ingest(upload: Upload, config: &IngestConfig) -> Result<Option<GraphData>> {
	let records = match upload {
		Upload::Directory(files) => read_directory(files).await,
		Upload::Archive(file) => {
			let name = file.name();
			let bytes = read_bytes(&file, &name).await?;
			read_archive(&bytes)?
		}
	};
	if records.is_empty() {
		info!("codebase-graph: upload contained no files");
		return Ok(None);
	}
	let now_ms = js_sys::Date::now() as u64;
	Ok(Some(build_graph(&records, config, now_ms)))
}

fn selected_files(input: &HtmlInputElement) -> Vec<File> {
	let Some(list) = input.files() else {
		return Vec::new();
	};
	(0..list.length()).filter_map(|i| list.get(i)).collect()
}

/// Lets the user pick a source directory or a ZIP archive and turns it into a graph.
///
/// `on_graph_ready` fires once per successful build. `on_error` receives a message
/// when the upload as a whole failed (an unreadable archive); per-file problems are
/// only logged.
#[component]
pub fn FileUpload(
	#[prop(into)] on_graph_ready: Callback<GraphData>,
	#[prop(into)] on_error: Callback<String>,
	#[prop(optional)] config: IngestConfig,
) -> impl IntoView {
	let busy = RwSignal::new(false);
	let directory_ref = NodeRef::<Input>::new();
	let config = StoredValue::new(config);

	// `webkitdirectory` is non-standard, so set it on the element directly.
	Effect::new(move |_| {
		if let Some(input) = directory_ref.get() {
			let _ = input.set_attribute("webkitdirectory", "");
		}
	});

	let start = move |upload: Upload| {
		busy.set(true);
		let config = config.get_value();
		spawn_local(async move {
			match ingest(upload, &config).await {
				Ok(Some(graph)) => on_graph_ready.run(graph),
				Ok(None) => {}
				Err(e) => {
					warn!("codebase-graph: upload failed: {e}");
					on_error.run(e.to_string());
				}
			}
			busy.set(false);
		});
	};

	let on_directory = move |ev: leptos::ev::Event| {
		let input: HtmlInputElement = event_target(&ev);
		let files = selected_files(&input);
		info!("codebase-graph: reading {} files", files.len());
		start(Upload::Directory(files));
	};

	let on_archive = move |ev: leptos::ev::Event| {
		let input: HtmlInputElement = event_target(&ev);
		let Some(file) = selected_files(&input).into_iter().next() else {
			return;
		};
		if !is_archive_name(&file.name()) {
			on_error.run(format!("{} is not a .zip archive", file.name()));
			return;
		}
		info!("codebase-graph: reading archive {}", file.name());
		start(Upload::Archive(file));
	};

	view! {
		<div class="file-upload">
			<label class="upload-option">
				"Upload a directory"
				<input
					node_ref=directory_ref
					type="file"
					multiple=true
					on:change=on_directory
					prop:disabled=move || busy.get()
				/>
			</label>
			<label class="upload-option">
				"Upload a .zip archive"
				<input
					type="file"
					accept=".zip"
					on:change=on_archive
					prop:disabled=move || busy.get()
				/>
			</label>
			<Show when=move || busy.get()>
				<p class="status">"Processing files..."</p>
			</Show>
		</div>
	}
}
