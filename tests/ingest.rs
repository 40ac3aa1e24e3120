//! End-to-end graph construction through the public API.

use std::collections::{BTreeSet, HashSet};

use codebase_graph::ingest::archive::read_archive;
use codebase_graph::{FileRecord, GraphData, IngestConfig, LinkKind, NodeKind, build_graph};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const NOW: u64 = 1_700_000_000_000;

fn build(records: &[FileRecord]) -> GraphData {
	build_graph(records, &IngestConfig::default(), NOW)
}

fn paths(graph: &GraphData, kind: NodeKind) -> Vec<&str> {
	graph
		.nodes
		.iter()
		.filter(|n| n.kind == kind)
		.map(|n| n.path.as_str())
		.collect()
}

fn link_paths(graph: &GraphData, kind: LinkKind) -> Vec<(&str, &str)> {
	graph
		.links_of_kind(kind)
		.map(|l| {
			let source = graph.node(&l.source).map_or("?", |n| n.path.as_str());
			let target = graph.node(&l.target).map_or("?", |n| n.path.as_str());
			(source, target)
		})
		.collect()
}

#[test]
fn root_files_with_a_side_effect_import() {
	let graph = build(&[
		FileRecord::new("b.ts", "", 1),
		FileRecord::new("a.ts", "import './b'", 2),
	]);

	assert_eq!(paths(&graph, NodeKind::File), vec!["b.ts", "a.ts"]);
	assert_eq!(graph.count_kind(NodeKind::Directory), 0);
	assert_eq!(link_paths(&graph, LinkKind::Contains), vec![]);
	assert_eq!(link_paths(&graph, LinkKind::Imports), vec![("a.ts", "b.ts")]);
	let import = graph.links_of_kind(LinkKind::Imports).next().unwrap();
	assert_eq!(import.weight, 1.5);
}

#[test]
fn imports_of_later_files_are_dropped() {
	let graph = build(&[
		FileRecord::new("a.ts", "import './b'", 2),
		FileRecord::new("b.ts", "", 1),
	]);
	assert_eq!(graph.nodes.len(), 2);
	assert!(graph.links.is_empty());
}

#[test]
fn nested_directories_without_imports() {
	let graph = build(&[
		FileRecord::new("src/a.ts", "export const a = 1;\n", 5),
		FileRecord::new("src/sub/b.ts", "", 6),
	]);

	assert_eq!(paths(&graph, NodeKind::Directory), vec!["src", "src/sub"]);
	assert_eq!(paths(&graph, NodeKind::File), vec!["src/a.ts", "src/sub/b.ts"]);
	let contains: BTreeSet<_> = link_paths(&graph, LinkKind::Contains).into_iter().collect();
	assert_eq!(
		contains,
		BTreeSet::from([
			("src", "src/a.ts"),
			("src", "src/sub"),
			("src/sub", "src/sub/b.ts"),
		])
	);
	assert_eq!(link_paths(&graph, LinkKind::Imports), vec![]);

	let src = graph.node_by_path("src").unwrap();
	assert_eq!((src.size, src.last_modified), (0, NOW));
	let a = graph.node_by_path("src/a.ts").unwrap();
	assert_eq!((a.name.as_str(), a.size, a.last_modified), ("a.ts", 20, 5));
}

#[test]
fn sibling_and_parent_imports_resolve() {
	let graph = build(&[
		FileRecord::new("src/b.ts", "", 0),
		FileRecord::new("src/x.ts", "", 0),
		FileRecord::new("src/a.ts", "import { b } from './b';", 0),
		FileRecord::new("src/sub/a.ts", "import x from \"../x\";", 0),
	]);
	assert_eq!(
		link_paths(&graph, LinkKind::Imports),
		vec![("src/a.ts", "src/b.ts"), ("src/sub/a.ts", "src/x.ts")]
	);
}

#[test]
fn parent_markers_above_the_root_stay_at_the_root() {
	let graph = build(&[
		FileRecord::new("x.ts", "", 0),
		FileRecord::new("src/a.ts", "import x from '../../x';", 0),
	]);
	assert_eq!(link_paths(&graph, LinkKind::Imports), vec![("src/a.ts", "x.ts")]);
}

#[test]
fn package_imports_never_link() {
	let graph = build(&[
		FileRecord::new("react", "", 0),
		FileRecord::new("react.js", "", 0),
		FileRecord::new("app.js", "import React from 'react';\nimport 'react';", 0),
	]);
	assert_eq!(link_paths(&graph, LinkKind::Imports), vec![]);
}

#[test]
fn any_resolve_extension_can_match() {
	let graph = build(&[
		FileRecord::new("lib/util.tsx", "", 0),
		FileRecord::new("lib/main.ts", "import { u } from './util'", 0),
	]);
	assert_eq!(
		link_paths(&graph, LinkKind::Imports),
		vec![("lib/main.ts", "lib/util.tsx")]
	);
}

#[test]
fn unreadable_files_still_become_nodes() {
	let graph = build(&[
		FileRecord::unread("src/big.ts", 4096, 3),
		FileRecord::new("src/logo.png", vec![0x89, b'P', b'N', b'G', 0xff], 3),
		FileRecord::new("src/bad.ts", vec![b'i', 0xff, 0xfe], 3),
	]);
	assert_eq!(
		paths(&graph, NodeKind::File),
		vec!["src/big.ts", "src/logo.png", "src/bad.ts"]
	);
	assert_eq!(graph.node_by_path("src/big.ts").unwrap().size, 4096);
	assert_eq!(link_paths(&graph, LinkKind::Imports), vec![]);
}

#[test]
fn empty_input_builds_an_empty_graph() {
	let graph = build(&[]);
	assert!(graph.is_empty());
	assert!(graph.links.is_empty());
}

#[test]
fn archive_upload_matches_directory_upload() {
	use std::io::{Cursor, Write};

	use zip::write::SimpleFileOptions;

	let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
	let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
	writer.add_directory("proj/", options).unwrap();
	writer.add_directory("proj/src/", options).unwrap();
	writer.start_file("proj/src/b.ts", options).unwrap();
	writer.start_file("proj/src/a.ts", options).unwrap();
	writer.write_all(b"import { b } from './b';").unwrap();
	let bytes = writer.finish().unwrap().into_inner();

	let graph = build(&read_archive(&bytes).unwrap());
	assert_eq!(paths(&graph, NodeKind::Directory), vec!["proj", "proj/src"]);
	assert_eq!(
		link_paths(&graph, LinkKind::Imports),
		vec![("proj/src/a.ts", "proj/src/b.ts")]
	);
}

fn record_strategy() -> impl Strategy<Value = FileRecord> {
	let dirs = prop::collection::vec("d[a-c]", 0..4);
	let name = "f[a-c]\\.(ts|js|md)";
	let imports = prop::collection::vec(
		prop::sample::select(vec![
			"./fa.ts",
			"./fb",
			"../fc.js",
			"../../da/fa",
			"./db/fb.ts",
			"react",
			"../../../../fa",
		]),
		0..4,
	);
	(dirs, name, imports).prop_map(|(dirs, name, imports)| {
		let mut segments = dirs;
		segments.push(name);
		let content: String = imports
			.iter()
			.map(|s| format!("import x from '{s}';\n"))
			.collect();
		FileRecord::new(segments.join("/"), content, 0)
	})
}

proptest! {
	#[test]
	fn links_never_dangle(records in prop::collection::vec(record_strategy(), 0..24)) {
		let graph = build(&records);
		prop_assert!(graph.dangling_links().is_empty());

		let ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		prop_assert_eq!(ids.len(), graph.nodes.len());

		for link in graph.links_of_kind(LinkKind::Imports) {
			prop_assert_eq!(graph.node(&link.target).map(|n| n.kind), Some(NodeKind::File));
		}
	}

	#[test]
	fn one_directory_per_distinct_prefix(records in prop::collection::vec(record_strategy(), 0..24)) {
		let graph = build(&records);
		let prefixes: HashSet<String> = records
			.iter()
			.flat_map(|r| {
				let segments: Vec<&str> = r.path.split('/').collect();
				(1..segments.len())
					.map(|i| segments[..i].join("/"))
					.collect::<Vec<_>>()
			})
			.collect();
		let directories: HashSet<String> = graph
			.nodes
			.iter()
			.filter(|n| n.kind == NodeKind::Directory)
			.map(|n| n.path.clone())
			.collect();
		prop_assert_eq!(graph.count_kind(NodeKind::Directory), directories.len());
		prop_assert_eq!(directories, prefixes);

		// Every node except top-level ones has exactly one containing parent.
		let contained = graph.links_of_kind(LinkKind::Contains).count();
		let top_level = graph.nodes.iter().filter(|n| !n.path.contains('/')).count();
		prop_assert_eq!(contained, graph.nodes.len() - top_level);
	}
}
