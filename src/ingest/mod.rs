//! Turns a flat list of uploaded files into a containment + import graph.
//!
//! The pipeline is: [`scanner`] pulls raw import specifiers out of source text,
//! [`resolver`] maps relative specifiers onto candidate paths, and [`builder`]
//! synthesises directory nodes and emits the links. [`archive`] supplies file
//! records from a ZIP upload.

/// ZIP extraction.
pub mod archive;
/// Graph construction.
pub mod builder;
/// Relative import resolution.
pub mod resolver;
/// Import specifier extraction.
pub mod scanner;

use serde::Deserialize;

use crate::error::{GraphError, Result};

pub use builder::GraphBuilder;
pub use resolver::{PathResolver, Resolution};
pub use scanner::{ImportScanner, PatternScanner};

/// One uploaded file as handed over by the directory picker or archive extraction.
#[derive(Clone, Debug, PartialEq)]
pub struct FileRecord {
	/// Path relative to the upload root, `/`-separated.
	pub path: String,
	/// Raw bytes, or `None` when the browser could not read the file.
	pub content: Option<Vec<u8>>,
	/// Size in bytes as reported by the source, even when `content` is missing.
	pub size: u64,
	/// Milliseconds since the Unix epoch.
	pub last_modified: u64,
}

impl FileRecord {
	/// A readable record; `size` is taken from the content.
	pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>, last_modified: u64) -> Self {
		let content = content.into();
		Self {
			path: path.into(),
			size: content.len() as u64,
			content: Some(content),
			last_modified,
		}
	}

	/// A record whose bytes are unavailable. It still becomes a node.
	pub fn unread(path: impl Into<String>, size: u64, last_modified: u64) -> Self {
		Self {
			path: path.into(),
			content: None,
			size,
			last_modified,
		}
	}

	/// The content decoded as UTF-8, `Ok(None)` when there is no content at all.
	pub fn text(&self) -> Result<Option<&str>> {
		match &self.content {
			None => Ok(None),
			Some(bytes) => std::str::from_utf8(bytes)
				.map(Some)
				.map_err(|_| GraphError::UnreadableFile {
					path: self.path.clone(),
				}),
		}
	}
}

/// Which files get scanned and which extensions relative imports may omit.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IngestConfig {
	/// Extensions (without the dot) whose files are scanned for imports.
	pub source_extensions: Vec<String>,
	/// Extensions (with the dot) tried, in order, for extensionless relative imports.
	pub resolve_extensions: Vec<String>,
}

impl Default for IngestConfig {
	fn default() -> Self {
		Self {
			source_extensions: ["js", "jsx", "ts", "tsx", "mjs", "cjs"]
				.into_iter()
				.map(String::from)
				.collect(),
			resolve_extensions: [".js", ".jsx", ".ts", ".tsx"]
				.into_iter()
				.map(String::from)
				.collect(),
		}
	}
}

impl IngestConfig {
	/// Whether the file name carries one of the source extensions (case-insensitive).
	pub fn is_source_file(&self, path: &str) -> bool {
		let name = path.rsplit('/').next().unwrap_or(path);
		match name.rsplit_once('.') {
			Some((stem, ext)) if !stem.is_empty() => {
				self.source_extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
			}
			_ => false,
		}
	}
}

/// Splits a path into its normalized segments.
///
/// Backslashes count as separators; empty and `.` segments are dropped and `..` removes
/// the segment before it (or nothing, at the root).
pub fn path_segments(path: &str) -> Vec<&str> {
	let mut segments = Vec::new();
	for segment in path.split(['/', '\\']) {
		match segment {
			"" | "." => {}
			".." => {
				segments.pop();
			}
			other => segments.push(other),
		}
	}
	segments
}

/// Builds a graph from `records` with the default scanner and the given configuration.
pub fn build_graph(
	records: &[FileRecord],
	config: &IngestConfig,
	now_ms: u64,
) -> crate::GraphData {
	GraphBuilder::new(config.clone(), now_ms).build(records)
}
