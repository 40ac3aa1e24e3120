//! Graph simulation state and interaction tracking.
//!
//! Owns one graph's topology together with the simulation that lays it out, the
//! viewport that maps it to the screen, the current selection and the hover
//! highlight. The canvas component holds exactly one of these per uploaded graph and
//! drops it (after [`ForceGraphState::stop`]) when the graph is replaced.

use std::collections::{HashMap, HashSet};

use log::debug;

use super::interaction::InteractionRouter;
use super::scale::{ScaleConfig, ScaledValues};
use super::simulation::{Simulation, SimulationParameters};
use super::types::{GraphData, GraphLink, GraphNode, NodePosition};
use super::viewport::{Viewport, ViewportConfig};

/// Per-node hover intensities that ease towards their targets.
///
/// The hovered node and its direct neighbours fade in; everything else fades out.
/// Each node carries its own value so moving quickly between nodes cross-fades
/// instead of flashing.
#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	hovered: Option<usize>,
	target_set: HashSet<usize>,
	/// Nodes not in the map have intensity 0.
	intensity: HashMap<usize, f64>,
	/// Growth of the hovered node itself, tracked separately from the neighbour glow.
	growth: HashMap<usize, f64>,
	cached_max: f64,
}

impl HighlightState {
	/// Changes the hovered node, recomputing its neighbourhood from `edges`.
	pub fn set_hover(&mut self, node: Option<usize>, edges: &[(usize, usize)]) {
		if self.hovered == node {
			return;
		}
		self.hovered = node;
		self.target_set.clear();
		if let Some(idx) = node {
			self.target_set.insert(idx);
			for &(src, tgt) in edges {
				if src == idx {
					self.target_set.insert(tgt);
				} else if tgt == idx {
					self.target_set.insert(src);
				}
			}
		}
	}

	/// Exponential smoothing: `value += (target - value) * (1 - e^(-speed * dt))`.
	pub fn tick(&mut self, dt: f64) {
		const FADE_IN_SPEED: f64 = 10.0;
		const FADE_OUT_SPEED: f64 = 6.0;
		const VISIBLE: f64 = 0.005;

		let fade_in = 1.0 - (-FADE_IN_SPEED * dt).exp();
		let fade_out = (-FADE_OUT_SPEED * dt).exp();

		for &idx in &self.target_set {
			let value = self.intensity.entry(idx).or_insert(0.0);
			*value += (1.0 - *value) * fade_in;
		}
		if let Some(idx) = self.hovered {
			let value = self.growth.entry(idx).or_insert(0.0);
			*value += (1.0 - *value) * fade_in;
		}

		let mut max: f64 = 0.0;
		let targets = &self.target_set;
		self.intensity.retain(|idx, value| {
			if !targets.contains(idx) {
				*value *= fade_out;
			}
			max = max.max(*value);
			*value > VISIBLE
		});
		let hovered = self.hovered;
		self.growth.retain(|idx, value| {
			if hovered != Some(*idx) {
				*value *= fade_out;
			}
			*value > VISIBLE
		});
		self.cached_max = max;
	}

	/// Highlight of one node in `[0, 1]`.
	pub fn node_intensity(&self, idx: usize) -> f64 {
		self.intensity.get(&idx).copied().unwrap_or(0.0)
	}

	/// Hover growth of one node in `[0, 1]`.
	pub fn growth(&self, idx: usize) -> f64 {
		self.growth.get(&idx).copied().unwrap_or(0.0)
	}

	/// Geometric mean of both endpoints, so an edge lights up only between two lit nodes.
	pub fn edge_intensity(&self, a: usize, b: usize) -> f64 {
		(self.node_intensity(a) * self.node_intensity(b)).sqrt()
	}

	/// Strongest intensity of any node; used to dim everything that is not lit.
	pub fn max_intensity(&self) -> f64 {
		self.cached_max
	}

	/// Whether any value is still easing.
	pub fn is_animating(&self) -> bool {
		!self.intensity.is_empty() || !self.growth.is_empty()
	}
}

/// Core graph state combining physics simulation with interaction and highlight tracking.
///
/// Mutated once per animation frame by [`tick`](Self::tick) and by the pointer
/// handlers in between; everything here runs on the one UI thread.
pub struct ForceGraphState {
	/// The graph being shown.
	pub data: GraphData,
	/// Layout of `data`, bodies in node order.
	pub sim: Simulation,
	/// Pan, zoom and the active gesture.
	pub viewport: Viewport,
	/// Hover animation.
	pub highlight: HighlightState,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
	router: InteractionRouter,
	/// Link endpoints by node index, in link order. Links naming unknown ids are absent.
	edges: Vec<(usize, usize)>,
	/// Index into `data.links` for each entry of `edges`.
	edge_links: Vec<usize>,
}

impl ForceGraphState {
	/// Lays out `data` around the centre of a `width` by `height` canvas.
	pub fn new(
		data: GraphData,
		width: f64,
		height: f64,
		params: SimulationParameters,
		viewport: ViewportConfig,
	) -> Self {
		let sim = Simulation::new(&data, params, (width / 2.0, height / 2.0));
		let index: HashMap<&str, usize> = data
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.as_str(), i))
			.collect();
		let (edge_links, edges) = data
			.links
			.iter()
			.enumerate()
			.filter_map(|(i, l)| {
				let ends = (*index.get(l.source.as_str())?, *index.get(l.target.as_str())?);
				Some((i, ends))
			})
			.unzip();

		Self {
			sim,
			edges,
			edge_links,
			data,
			viewport: Viewport::new(viewport),
			highlight: HighlightState::default(),
			width,
			height,
			router: InteractionRouter::default(),
		}
	}

	/// Link endpoints by node index, parallel to the resolvable subset of `data.links`.
	pub fn edges(&self) -> &[(usize, usize)] {
		&self.edges
	}

	/// Every drawable link with its endpoint node indices.
	pub fn indexed_links(&self) -> impl Iterator<Item = (&GraphLink, usize, usize)> + '_ {
		self.edge_links
			.iter()
			.zip(&self.edges)
			.filter_map(|(&i, &(s, t))| Some((self.data.links.get(i)?, s, t)))
	}

	/// Index of the selected node.
	pub fn selected(&self) -> Option<usize> {
		self.router.selected()
	}

	/// The selected node.
	pub fn selected_node(&self) -> Option<&GraphNode> {
		self.router.selected().and_then(|i| self.data.nodes.get(i))
	}

	/// The topmost node whose drawn circle (plus hit padding) contains the screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64, config: &ScaleConfig) -> Option<usize> {
		let (wx, wy) = self.viewport.transform.screen_to_world(sx, sy);
		let scale = ScaledValues::new(config, self.viewport.transform.k);
		// Later nodes are drawn on top, so they win.
		self.data
			.nodes
			.iter()
			.zip(self.sim.bodies())
			.enumerate()
			.rev()
			.find(|(i, (node, body))| {
				let grow = 1.0 + (scale.hover_growth - 1.0) * self.highlight.growth(*i);
				let r = scale.radius(node.kind) * grow + scale.hit_padding;
				let (dx, dy) = (body.x - wx, body.y - wy);
				dx * dx + dy * dy <= r * r
			})
			.map(|(i, _)| i)
	}

	/// Sets the hovered node by index.
	pub fn set_hover(&mut self, node: Option<usize>) {
		self.highlight.set_hover(node, &self.edges);
	}

	/// Starts a node drag or a pan at a canvas point.
	pub fn pointer_down(&mut self, sx: f64, sy: f64, config: &ScaleConfig) {
		let hit = self.node_at_position(sx, sy, config);
		self.viewport.pointer_down(sx, sy, hit, &mut self.sim);
	}

	/// Updates hover, then the gesture in progress.
	pub fn pointer_move(&mut self, sx: f64, sy: f64, config: &ScaleConfig) {
		if !self.viewport.is_dragging_node() {
			let hovered = self.node_at_position(sx, sy, config);
			self.set_hover(hovered);
		}
		self.viewport.pointer_move(sx, sy, &mut self.sim);
	}

	/// Ends the gesture. Returns `Some(selection)` when the host should be told about
	/// a selection change: a node for node clicks, `None` for background clicks.
	pub fn pointer_up(&mut self) -> Option<Option<GraphNode>> {
		let outcome = self.viewport.pointer_up(&mut self.sim);
		self.router
			.route(outcome)
			.map(|selection| selection.and_then(|i| self.data.nodes.get(i).cloned()))
	}

	/// The pointer left the canvas: abandon any gesture and clear the hover.
	pub fn pointer_leave(&mut self) {
		self.viewport.cancel(&mut self.sim);
		self.set_hover(None);
	}

	/// Zooms around a canvas point.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		self.viewport.wheel(sx, sy, delta_y);
	}

	/// Advances the layout and the hover animation by one frame. Returns whether
	/// anything changed that needs a redraw.
	pub fn tick(&mut self, dt: f64) -> bool {
		let moved = self.sim.step();
		let animating = self.highlight.is_animating();
		self.highlight.tick(dt);
		moved || animating
	}

	/// Current world-space position of every node, in node order.
	pub fn positions(&self) -> impl Iterator<Item = NodePosition> + '_ {
		self.data
			.nodes
			.iter()
			.zip(self.sim.bodies())
			.map(|(node, body)| NodePosition {
				id: node.id.clone(),
				x: body.x,
				y: body.y,
			})
	}

	/// Follows a canvas resize; the centering force moves to the new middle.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.sim.set_center(width / 2.0, height / 2.0);
	}

	/// Halts the simulation and releases every pin before the state is dropped.
	pub fn stop(&mut self) {
		self.viewport.cancel(&mut self.sim);
		self.sim.stop();
		self.router.reset();
		debug!(
			"codebase-graph: simulation stopped ({} nodes)",
			self.data.nodes.len()
		);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{LinkKind, NodeKind};

	fn node(id: &str, kind: NodeKind) -> GraphNode {
		GraphNode {
			id: id.into(),
			name: id.into(),
			path: id.into(),
			kind,
			size: 0,
			last_modified: 0,
		}
	}

	fn state() -> ForceGraphState {
		let data = GraphData {
			nodes: vec![
				node("1", NodeKind::Directory),
				node("2", NodeKind::File),
				node("3", NodeKind::File),
			],
			links: vec![
				GraphLink::new("1", "2", LinkKind::Contains),
				GraphLink::new("1", "3", LinkKind::Contains),
				GraphLink::new("2", "missing", LinkKind::Imports),
			],
		};
		ForceGraphState::new(
			data,
			800.0,
			600.0,
			SimulationParameters::default(),
			ViewportConfig::default(),
		)
	}

	/// Runs the layout until it settles so node circles no longer overlap.
	fn settled() -> ForceGraphState {
		let mut s = state();
		while s.sim.step() {}
		s
	}

	/// Screen position of node `i` under the current transform.
	fn screen_of(s: &ForceGraphState, i: usize) -> (f64, f64) {
		let (x, y) = s.sim.position(i).unwrap();
		s.viewport.transform.world_to_screen(x, y)
	}

	#[test]
	fn unknown_link_endpoints_are_ignored() {
		let s = state();
		assert_eq!(s.edges(), &[(0, 1), (0, 2)]);
		let kinds: Vec<_> = s.indexed_links().map(|(l, _, _)| l.kind).collect();
		assert_eq!(kinds, vec![LinkKind::Contains, LinkKind::Contains]);
		assert_eq!(s.positions().count(), 3);
	}

	#[test]
	fn empty_graph_is_accepted() {
		let mut s = ForceGraphState::new(
			GraphData::default(),
			100.0,
			100.0,
			SimulationParameters::default(),
			ViewportConfig::default(),
		);
		assert!(s.tick(0.016) || !s.sim.is_running());
		assert_eq!(s.node_at_position(50.0, 50.0, &ScaleConfig::default()), None);
		s.pointer_down(50.0, 50.0, &ScaleConfig::default());
		assert_eq!(s.pointer_up(), Some(None));
		s.stop();
	}

	#[test]
	fn hit_testing_finds_nodes_and_misses_background() {
		let s = settled();
		let config = ScaleConfig::default();
		for i in 0..3 {
			let (sx, sy) = screen_of(&s, i);
			assert_eq!(s.node_at_position(sx, sy, &config), Some(i));
		}
		assert_eq!(s.node_at_position(-500.0, -500.0, &config), None);
	}

	#[test]
	fn node_click_selects_and_background_click_clears() {
		let mut s = settled();
		let config = ScaleConfig::default();
		let (sx, sy) = screen_of(&s, 1);
		s.pointer_down(sx, sy, &config);
		let selected = s.pointer_up();
		assert_eq!(selected.map(|n| n.map(|n| n.id)), Some(Some("2".to_string())));
		assert_eq!(s.selected_node().map(|n| n.id.as_str()), Some("2"));

		s.pointer_down(-500.0, -500.0, &config);
		assert_eq!(s.pointer_up(), Some(None));
		assert_eq!(s.selected(), None);
	}

	#[test]
	fn dragging_a_node_does_not_select_it() {
		let mut s = settled();
		let config = ScaleConfig::default();
		let (sx, sy) = screen_of(&s, 0);
		s.pointer_down(sx, sy, &config);
		s.pointer_move(sx + 40.0, sy + 40.0, &config);
		assert!(s.sim.is_pinned(0));
		assert_eq!(s.pointer_up(), None);
		assert!(!s.sim.is_pinned(0));
		assert_eq!(s.selected(), None);
	}

	#[test]
	fn hover_lights_up_neighbours_only() {
		let mut s = state();
		s.set_hover(Some(1));
		for _ in 0..30 {
			s.tick(0.016);
		}
		assert!(s.highlight.node_intensity(1) > 0.9);
		assert!(s.highlight.node_intensity(0) > 0.9);
		assert_eq!(s.highlight.node_intensity(2), 0.0);
		assert!(s.highlight.growth(1) > 0.9);
		assert_eq!(s.highlight.growth(0), 0.0);

		s.pointer_leave();
		for _ in 0..120 {
			s.tick(0.016);
		}
		assert!(!s.highlight.is_animating());
	}

	#[test]
	fn resize_moves_the_centering_target() {
		let mut s = state();
		s.resize(200.0, 100.0);
		for _ in 0..400 {
			s.tick(0.016);
		}
		let n = s.sim.len() as f64;
		let (cx, cy) = s
			.sim
			.bodies()
			.iter()
			.fold((0.0, 0.0), |(x, y), b| (x + b.x / n, y + b.y / n));
		assert!((cx - 100.0).abs() < 1.0, "centroid x {cx}");
		assert!((cy - 50.0).abs() < 1.0, "centroid y {cy}");
	}

	#[test]
	fn stop_halts_ticks_and_releases_pins() {
		let mut s = settled();
		let config = ScaleConfig::default();
		let (sx, sy) = screen_of(&s, 2);
		s.pointer_down(sx, sy, &config);
		assert!(s.sim.is_pinned(2));
		s.stop();
		assert!(!s.sim.is_pinned(2));
		assert!(!s.sim.step());
		let before: Vec<_> = s.positions().collect();
		s.tick(0.016);
		assert_eq!(s.positions().collect::<Vec<_>>(), before);
	}
}
