//! Graph data structures produced by the builder and consumed by the force graph.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Whether a node stands for a file or a directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
	/// A regular file from the upload.
	File,
	/// A directory synthesised from file paths.
	Directory,
}

impl NodeKind {
	/// Lowercase name, as serialized.
	pub fn as_str(self) -> &'static str {
		match self {
			NodeKind::File => "file",
			NodeKind::Directory => "directory",
		}
	}
}

/// A file or directory in the uploaded tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
	/// Identifier minted by the builder. Never reused within one graph.
	pub id: String,
	/// Display label: the last path segment.
	pub name: String,
	/// Full normalized path, unique within a graph.
	pub path: String,
	/// File or directory.
	#[serde(rename = "type")]
	pub kind: NodeKind,
	/// Size in bytes; always 0 for directories.
	pub size: u64,
	/// Modification time in milliseconds since the Unix epoch.
	pub last_modified: u64,
}

impl GraphNode {
	/// Whether this node is a directory.
	pub fn is_directory(&self) -> bool {
		self.kind == NodeKind::Directory
	}
}

/// The relationship a link expresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
	/// Parent directory to child.
	Contains,
	/// Importing file to imported file.
	Imports,
}

impl LinkKind {
	/// Rendering and force-strength hint carried by every link of this kind.
	pub fn weight(self) -> f64 {
		match self {
			LinkKind::Contains => 1.0,
			LinkKind::Imports => 1.5,
		}
	}
}

/// A directed edge between two nodes. Repeated imports produce repeated links.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
	/// Containment or import.
	#[serde(rename = "type")]
	pub kind: LinkKind,
	/// Drawn width hint; see [`LinkKind::weight`].
	pub weight: f64,
}

impl GraphLink {
	/// A link carrying the default weight of its kind.
	pub fn new(source: impl Into<String>, target: impl Into<String>, kind: LinkKind) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			kind,
			weight: kind.weight(),
		}
	}
}

/// Complete graph data: nodes in insertion order and links.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	/// Nodes in the order they were created.
	pub nodes: Vec<GraphNode>,
	/// Contains and import links.
	pub links: Vec<GraphLink>,
}

impl GraphData {
	/// Whether the graph has no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// The node with the given id.
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// The node at the given normalized path.
	pub fn node_by_path(&self, path: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.path == path)
	}

	/// Number of nodes of one kind.
	pub fn count_kind(&self, kind: NodeKind) -> usize {
		self.nodes.iter().filter(|n| n.kind == kind).count()
	}

	/// Links of one kind, in order.
	pub fn links_of_kind(&self, kind: LinkKind) -> impl Iterator<Item = &GraphLink> {
		self.links.iter().filter(move |l| l.kind == kind)
	}

	/// Links whose source or target does not name a node of this graph.
	pub fn dangling_links(&self) -> Vec<&GraphLink> {
		let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
		self.links
			.iter()
			.filter(|l| !ids.contains(l.source.as_str()) || !ids.contains(l.target.as_str()))
			.collect()
	}
}

/// One entry of the per-tick position stream.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodePosition {
	/// Node id.
	pub id: String,
	/// World-space x.
	pub x: f64,
	/// World-space y.
	pub y: f64,
}
