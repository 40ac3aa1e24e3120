//! Graph construction from uploaded file records.
//!
//! Files are processed in input order. Directory nodes are synthesised the first time
//! a path prefix is seen, and an import only becomes a link when its target was
//! already registered by the time the importing file is scanned.

use std::collections::HashMap;

use log::{debug, info, warn};

use super::resolver::{PathResolver, Resolution};
use super::scanner::{ImportScanner, PatternScanner};
use super::{FileRecord, IngestConfig, path_segments};
use crate::components::force_graph::{GraphData, GraphLink, GraphNode, LinkKind, NodeKind};

/// Per-build state: the id counter and the path index used for deduplication.
///
/// One context lives for exactly one build pass, so ids are never shared between
/// graphs and never reused within one.
#[derive(Debug, Default)]
pub struct BuildContext {
	next_id: u64,
	by_path: HashMap<String, (String, NodeKind)>,
}

impl BuildContext {
	/// Mints the next identifier, starting at "1".
	pub fn next_id(&mut self) -> String {
		self.next_id += 1;
		self.next_id.to_string()
	}

	/// The id and kind registered for `path`, if any.
	pub fn lookup(&self, path: &str) -> Option<(&str, NodeKind)> {
		self.by_path.get(path).map(|(id, kind)| (id.as_str(), *kind))
	}

	/// Whether `path` names an already registered node.
	pub fn contains(&self, path: &str) -> bool {
		self.by_path.contains_key(path)
	}

	fn register(&mut self, path: String, id: String, kind: NodeKind) {
		self.by_path.insert(path, (id, kind));
	}
}

/// Builds a [`GraphData`] from file records in a single pass.
pub struct GraphBuilder<S = PatternScanner> {
	config: IngestConfig,
	resolver: PathResolver,
	scanner: S,
	now_ms: u64,
}

impl GraphBuilder<PatternScanner> {
	/// `now_ms` stamps the synthesised directory nodes.
	pub fn new(config: IngestConfig, now_ms: u64) -> Self {
		Self::with_scanner(config, now_ms, PatternScanner)
	}
}

impl<S: ImportScanner> GraphBuilder<S> {
	/// A builder using `scanner` in place of the default pattern scanner.
	pub fn with_scanner(config: IngestConfig, now_ms: u64, scanner: S) -> Self {
		Self {
			resolver: PathResolver::new(config.resolve_extensions.clone()),
			config,
			scanner,
			now_ms,
		}
	}

	/// Runs one build pass over `records`, in order.
	pub fn build(&self, records: &[FileRecord]) -> GraphData {
		let mut ctx = BuildContext::default();
		let mut graph = GraphData::default();

		for record in records {
			self.add_record(&mut ctx, &mut graph, record);
		}

		info!(
			"codebase-graph: built {} nodes ({} directories), {} links from {} files",
			graph.nodes.len(),
			graph.count_kind(NodeKind::Directory),
			graph.links.len(),
			records.len()
		);
		graph
	}

	fn add_record(&self, ctx: &mut BuildContext, graph: &mut GraphData, record: &FileRecord) {
		let parts = path_segments(&record.path);
		let Some((name, dirs)) = parts.split_last() else {
			warn!("codebase-graph: skipping record with empty path {:?}", record.path);
			return;
		};
		let path = parts.join("/");
		if let Some((_, kind)) = ctx.lookup(&path) {
			warn!(
				"codebase-graph: skipping {path}: already present as a {}",
				kind.as_str()
			);
			return;
		}
		if let Some(conflict) = (1..=dirs.len())
			.map(|i| dirs[..i].join("/"))
			.find(|prefix| matches!(ctx.lookup(prefix), Some((_, NodeKind::File))))
		{
			warn!("codebase-graph: skipping {path}: parent {conflict} is a file");
			return;
		}

		let parent_id = self.ensure_directories(ctx, graph, dirs);

		let id = ctx.next_id();
		ctx.register(path.clone(), id.clone(), NodeKind::File);
		graph.nodes.push(GraphNode {
			id: id.clone(),
			name: (*name).to_string(),
			path: path.clone(),
			kind: NodeKind::File,
			size: record.size,
			last_modified: record.last_modified,
		});
		if let Some(parent) = parent_id {
			graph
				.links
				.push(GraphLink::new(parent, id.clone(), LinkKind::Contains));
		}

		if self.config.is_source_file(&path) {
			self.add_imports(ctx, graph, record, &path, &id);
		}
	}

	/// Creates any missing directory nodes along `dirs` and returns the innermost id.
	fn ensure_directories(
		&self,
		ctx: &mut BuildContext,
		graph: &mut GraphData,
		dirs: &[&str],
	) -> Option<String> {
		let mut parent: Option<String> = None;
		for (i, name) in dirs.iter().enumerate() {
			let dir_path = dirs[..=i].join("/");
			if let Some((id, _)) = ctx.lookup(&dir_path) {
				parent = Some(id.to_string());
				continue;
			}

			let id = ctx.next_id();
			ctx.register(dir_path.clone(), id.clone(), NodeKind::Directory);
			graph.nodes.push(GraphNode {
				id: id.clone(),
				name: (*name).to_string(),
				path: dir_path,
				kind: NodeKind::Directory,
				size: 0,
				last_modified: self.now_ms,
			});
			if let Some(parent_id) = parent {
				graph
					.links
					.push(GraphLink::new(parent_id, id.clone(), LinkKind::Contains));
			}
			parent = Some(id);
		}
		parent
	}

	fn add_imports(
		&self,
		ctx: &BuildContext,
		graph: &mut GraphData,
		record: &FileRecord,
		path: &str,
		id: &str,
	) {
		let content = match record.text() {
			Ok(Some(content)) => content,
			Ok(None) => return,
			Err(e) => {
				warn!("codebase-graph: treating as binary, no imports scanned: {e}");
				return;
			}
		};

		for specifier in self.scanner.scan(content) {
			let resolution = self.resolver.resolve(path, specifier, |p| ctx.contains(p));
			let target = match &resolution {
				Resolution::Local(candidate) => ctx.lookup(candidate).map(|(id, _)| id),
				Resolution::External(_) | Resolution::Unresolvable => None,
			};
			match target {
				Some(target) => graph
					.links
					.push(GraphLink::new(id, target, LinkKind::Imports)),
				None => debug!("codebase-graph: {path}: unresolved import {specifier:?}"),
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn build(records: &[FileRecord]) -> GraphData {
		GraphBuilder::new(IngestConfig::default(), 42).build(records)
	}

	fn link_paths(graph: &GraphData, kind: LinkKind) -> Vec<(String, String)> {
		graph
			.links_of_kind(kind)
			.map(|l| {
				(
					graph.node(&l.source).unwrap().path.clone(),
					graph.node(&l.target).unwrap().path.clone(),
				)
			})
			.collect()
	}

	#[test]
	fn ids_count_up_from_one() {
		let graph = build(&[
			FileRecord::new("src/a.ts", "", 0),
			FileRecord::new("src/b.ts", "", 0),
		]);
		let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, vec!["1", "2", "3"]);
	}

	#[test]
	fn directories_are_synthesised_once() {
		let graph = build(&[
			FileRecord::new("src/a.ts", "", 7),
			FileRecord::new("src/sub/b.ts", "", 8),
		]);
		let paths: Vec<&str> = graph.nodes.iter().map(|n| n.path.as_str()).collect();
		assert_eq!(paths, vec!["src", "src/a.ts", "src/sub", "src/sub/b.ts"]);

		let src = graph.node_by_path("src").unwrap();
		assert_eq!(src.kind, NodeKind::Directory);
		assert_eq!(src.size, 0);
		assert_eq!(src.last_modified, 42);
		assert_eq!(graph.node_by_path("src/a.ts").unwrap().last_modified, 7);

		assert_eq!(
			link_paths(&graph, LinkKind::Contains),
			vec![
				("src".to_string(), "src/a.ts".to_string()),
				("src".to_string(), "src/sub".to_string()),
				("src/sub".to_string(), "src/sub/b.ts".to_string()),
			]
		);
	}

	#[test]
	fn imports_only_resolve_to_earlier_files() {
		let graph = build(&[
			FileRecord::new("b.ts", "", 0),
			FileRecord::new("a.ts", "import { b } from './b';\nimport c from './c';", 0),
			FileRecord::new("c.ts", "", 0),
		]);
		assert_eq!(
			link_paths(&graph, LinkKind::Imports),
			vec![("a.ts".to_string(), "b.ts".to_string())]
		);
	}

	#[test]
	fn repeated_imports_are_kept() {
		let graph = build(&[
			FileRecord::new("b.ts", "", 0),
			FileRecord::new("a.ts", "import './b';\nimport x from './b';", 0),
		]);
		assert_eq!(graph.links_of_kind(LinkKind::Imports).count(), 2);
		assert!(
			graph
				.links_of_kind(LinkKind::Imports)
				.all(|l| l.weight == 1.5)
		);
	}

	#[test]
	fn later_extension_matches_known_file() {
		let graph = build(&[
			FileRecord::new("lib/util.tsx", "", 0),
			FileRecord::new("lib/main.ts", "import u from './util'", 0),
		]);
		assert_eq!(
			link_paths(&graph, LinkKind::Imports),
			vec![("lib/main.ts".to_string(), "lib/util.tsx".to_string())]
		);
	}

	#[test]
	fn non_source_and_binary_files_are_not_scanned() {
		let graph = build(&[
			FileRecord::new("b.ts", "", 0),
			FileRecord::new("notes.md", "import b from './b'", 0),
			FileRecord::new("bin.ts", vec![0xff, 0xfe], 0),
			FileRecord::unread("gone.ts", 10, 0),
		]);
		assert_eq!(graph.nodes.len(), 4);
		assert_eq!(graph.links_of_kind(LinkKind::Imports).count(), 0);
		assert_eq!(graph.node_by_path("gone.ts").unwrap().size, 10);
	}

	#[test]
	fn duplicate_and_conflicting_paths_are_skipped() {
		let graph = build(&[
			FileRecord::new("src/a.ts", "", 0),
			FileRecord::new("./src/a.ts", "", 0),
			FileRecord::new("src", "", 0),
			FileRecord::new("src/a.ts/inner.ts", "", 0),
			FileRecord::new("", "", 0),
		]);
		assert_eq!(graph.nodes.len(), 2);
		assert!(graph.dangling_links().is_empty());
	}

	#[test]
	fn parent_markers_in_entry_names_are_normalized() {
		let graph = build(&[
			FileRecord::new("lib/a.ts", "", 0),
			FileRecord::new("src/../lib/b.ts", "", 0),
			FileRecord::new("x/../lib/a.ts", "", 0),
		]);
		let paths: Vec<&str> = graph.nodes.iter().map(|n| n.path.as_str()).collect();
		assert_eq!(paths, vec!["lib", "lib/a.ts", "lib/b.ts"]);
		assert!(graph.nodes.iter().all(|n| n.name != ".."));
	}

	#[test]
	fn custom_scanner_is_used() {
		struct Fixed;
		impl ImportScanner for Fixed {
			fn scan<'a>(&self, _: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
				Box::new(["./b.ts"].into_iter())
			}
		}
		let graph = GraphBuilder::with_scanner(IngestConfig::default(), 0, Fixed).build(&[
			FileRecord::new("b.ts", "", 0),
			FileRecord::new("a.ts", "anything", 0),
		]);
		assert_eq!(graph.links_of_kind(LinkKind::Imports).count(), 1);
	}

	#[test]
	fn context_mints_sequential_ids() {
		let mut ctx = BuildContext::default();
		assert_eq!(ctx.next_id(), "1");
		assert_eq!(ctx.next_id(), "2");
	}
}
