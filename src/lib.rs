//! codebase-graph: Interactive map of a source tree's files, folders and imports.
//!
//! Upload a directory or a ZIP archive; the crate derives a graph of directories,
//! files, containment links and relative-import links, and renders it as a
//! physics-laid-out canvas with pan, zoom, drag and click-to-inspect.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info};

/// Canvas, upload and details components.
pub mod components;
/// Page-embedded configuration.
pub mod config;
/// Crate error type.
pub mod error;
/// File records to graph data.
pub mod ingest;

pub use components::file_info::{FileInfoPanel, format_file_size};
pub use components::file_upload::FileUpload;
pub use components::force_graph::{
	ForceGraphCanvas, ForceGraphState, GraphData, GraphLink, GraphNode, InteractionRouter,
	LinkKind, NodeKind, NodePosition, PointerOutcome, ScaleConfig, Simulation,
	SimulationParameters, Theme, ViewTransform, Viewport, ViewportConfig,
};
pub use config::{AppConfig, load_app_config};
pub use error::{GraphError, Result};
pub use ingest::{FileRecord, GraphBuilder, IngestConfig, build_graph};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("codebase-graph: logging initialized");
}

/// Main application component.
///
/// Shows the upload form until a graph is ready, then the graph with a details
/// panel for the selected node. A failed archive upload shows an error and keeps
/// whatever graph was displayed before.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let AppConfig {
		ingest,
		forces,
		viewport,
	} = load_app_config();

	let graph = RwSignal::new(None::<GraphData>);
	let selected = RwSignal::new(None::<GraphNode>);
	let error = RwSignal::new(None::<String>);

	let on_graph_ready = move |data: GraphData| {
		info!(
			"codebase-graph: graph ready with {} nodes, {} links",
			data.nodes.len(),
			data.links.len()
		);
		selected.set(None);
		error.set(None);
		graph.set(Some(data));
	};
	let on_error = move |message: String| error.set(Some(message));
	let on_select = move |node: Option<GraphNode>| selected.set(node);

	// An empty graph stops the running layout; the canvas itself stays mounted.
	let reset = move |_| {
		selected.set(None);
		graph.set(None);
	};

	let graph_data = Signal::derive(move || graph.get().unwrap_or_default());
	let has_graph = move || graph.with(Option::is_some);

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Codebase Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph" style:display=move || if has_graph() { "block" } else { "none" }>
			<ForceGraphCanvas
				data=graph_data
				on_select=on_select
				forces=forces
				viewport=viewport
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"Codebase Graph"</h1>
				<p class="subtitle">"Drag nodes to reposition. Scroll to zoom. Drag background to pan."</p>
				<button class="reset" on:click=reset>"Upload different code"</button>
			</div>
			<FileInfoPanel node=selected on_close=move |_: ()| selected.set(None) />
		</div>

		<Show when=move || !has_graph()>
			<main class="upload-view">
				<h1>"Codebase Graph"</h1>
				<p>"Pick a source directory or a .zip archive to map its files and imports."</p>
				<FileUpload on_graph_ready=on_graph_ready on_error=on_error config=ingest.clone() />
			</main>
		</Show>

		{move || error.get().map(|message| view! { <p class="error" role="alert">{message}</p> })}
	}
}
