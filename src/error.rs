//! Error type shared by ingestion, configuration and the upload path.

use thiserror::Error;

/// Failures that can occur while turning an upload into a graph.
///
/// Only [`GraphError::MalformedArchive`] aborts an upload. The per-file variants are
/// logged by the builder and recovered locally.
#[derive(Debug, Error)]
pub enum GraphError {
	/// The uploaded archive could not be opened or one of its entries could not be read.
	#[error("malformed archive: {0}")]
	MalformedArchive(String),

	/// A file's content is not valid UTF-8 text; it is kept as a binary node.
	#[error("{path} is not readable as text")]
	UnreadableFile {
		/// Upload-relative path.
		path: String,
	},

	/// The browser rejected reading a file's bytes.
	#[error("failed to read {path}: {message}")]
	FileRead {
		/// Upload-relative path.
		path: String,
		/// Browser error text.
		message: String,
	},

	/// The embedded configuration JSON did not parse.
	#[error("invalid configuration: {0}")]
	InvalidConfig(#[from] serde_json::Error),
}

/// Result alias defaulting to [`GraphError`].
pub type Result<T, E = GraphError> = std::result::Result<T, E>;
