//! Runtime configuration embedded in the host page.
//!
//! The page may carry a `<script id="graph-config" type="application/json">` element.
//! Every key is optional; anything missing keeps its default.
//!
//! ```json
//! { "forces": { "linkDistance": 120 }, "viewport": { "maxZoom": 8 } }
//! ```

use log::{info, warn};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::HtmlScriptElement;

use crate::components::force_graph::{SimulationParameters, ViewportConfig};
use crate::error::Result;
use crate::ingest::IngestConfig;

/// Element id of the embedded configuration.
pub const CONFIG_ELEMENT_ID: &str = "graph-config";

/// Everything the page can configure.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
	/// Which files are scanned and how imports resolve.
	pub ingest: IngestConfig,
	/// Layout forces.
	pub forces: SimulationParameters,
	/// Zoom limits and gesture thresholds.
	pub viewport: ViewportConfig,
}

impl AppConfig {
	/// Parses a configuration document; missing keys keep defaults.
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}
}

fn config_text() -> Option<String> {
	let document = web_sys::window()?.document()?;
	let element = document.get_element_by_id(CONFIG_ELEMENT_ID)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Reads the embedded configuration, falling back to defaults when it is absent or
/// does not parse.
pub fn load_app_config() -> AppConfig {
	let Some(text) = config_text().filter(|t| !t.trim().is_empty()) else {
		return AppConfig::default();
	};
	match AppConfig::from_json(&text) {
		Ok(config) => {
			info!("codebase-graph: loaded configuration from #{CONFIG_ELEMENT_ID}");
			config
		}
		Err(e) => {
			warn!("codebase-graph: {e}; using defaults");
			AppConfig::default()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::GraphError;

	#[test]
	fn empty_object_gives_defaults() {
		let config = AppConfig::from_json("{}").unwrap();
		assert_eq!(config.forces.link_distance, 100.0);
		assert_eq!(config.forces.charge_strength, -200.0);
		assert_eq!(config.viewport.min_zoom, 0.1);
		assert_eq!(config.viewport.max_zoom, 4.0);
		assert_eq!(config.ingest.resolve_extensions[0], ".js");
	}

	#[test]
	fn partial_sections_keep_other_defaults() {
		let config = AppConfig::from_json(
			r#"{ "forces": { "linkDistance": 60, "collideRadiusDirectory": 40 },
			     "ingest": { "resolveExtensions": [".ts"] } }"#,
		)
		.unwrap();
		assert_eq!(config.forces.link_distance, 60.0);
		assert_eq!(config.forces.collide_radius_directory, 40.0);
		assert_eq!(config.forces.velocity_decay, 0.4);
		assert_eq!(config.ingest.resolve_extensions, vec![".ts".to_string()]);
		assert!(config.ingest.is_source_file("a.tsx"));
	}

	#[test]
	fn malformed_json_is_an_invalid_config_error() {
		assert!(matches!(
			AppConfig::from_json("{ forces: "),
			Err(GraphError::InvalidConfig(_))
		));
	}
}
