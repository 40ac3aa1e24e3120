//! Layout and pointer behaviour driven headlessly through `ForceGraphState`.

use codebase_graph::{
	FileRecord, ForceGraphState, GraphData, IngestConfig, ScaleConfig, SimulationParameters,
	ViewportConfig, build_graph,
};

fn graph() -> GraphData {
	build_graph(
		&[
			FileRecord::new("src/util.ts", "", 0),
			FileRecord::new("src/main.ts", "import { u } from './util';", 0),
			FileRecord::new("src/view/page.ts", "import { u } from '../util';", 0),
		],
		&IngestConfig::default(),
		0,
	)
}

fn settled_state() -> ForceGraphState {
	let mut state = ForceGraphState::new(
		graph(),
		800.0,
		600.0,
		SimulationParameters::default(),
		ViewportConfig::default(),
	);
	let mut frames = 0;
	while state.sim.is_running() {
		state.tick(0.016);
		frames += 1;
		assert!(frames < 1_000, "layout never settled");
	}
	state
}

fn screen_position(state: &ForceGraphState, index: usize) -> (f64, f64) {
	let (x, y) = state.sim.position(index).unwrap();
	state.viewport.transform.world_to_screen(x, y)
}

#[test]
fn layout_settles_and_stays_put() {
	let mut state = settled_state();
	let before: Vec<_> = state.positions().collect();
	for _ in 0..10 {
		state.tick(0.016);
	}
	assert_eq!(state.positions().collect::<Vec<_>>(), before);
	assert!(before.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
}

#[test]
fn dragged_node_follows_the_pointer_exactly() {
	let mut state = settled_state();
	let config = ScaleConfig::default();
	state.wheel(400.0, 300.0, -1.0);
	let (sx, sy) = screen_position(&state, 1);

	state.pointer_down(sx, sy, &config);
	state.pointer_move(sx + 60.0, sy - 25.0, &config);
	let pinned = state.sim.position(1).unwrap();
	let (wx, wy) = state.viewport.transform.screen_to_world(sx + 60.0, sy - 25.0);
	assert!((pinned.0 - wx).abs() < 1e-9 && (pinned.1 - wy).abs() < 1e-9);

	assert!(state.sim.is_running(), "drag reheats the layout");
	for _ in 0..50 {
		state.tick(0.016);
		assert_eq!(state.sim.position(1), Some(pinned));
	}

	assert_eq!(state.pointer_up(), None, "a drag is not a click");
	assert!(!state.sim.is_pinned(1));
	for _ in 0..50 {
		state.tick(0.016);
	}
	assert_ne!(state.sim.position(1), Some(pinned));
}

#[test]
fn click_selects_and_background_clears() {
	let mut state = settled_state();
	let config = ScaleConfig::default();
	let target = state
		.data
		.nodes
		.iter()
		.position(|n| n.path == "src/main.ts")
		.unwrap();
	let (sx, sy) = screen_position(&state, target);

	state.pointer_down(sx, sy, &config);
	let selection = state.pointer_up().expect("click notifies");
	assert_eq!(selection.map(|n| n.path), Some("src/main.ts".to_string()));

	state.pointer_down(-1_000.0, -1_000.0, &config);
	assert_eq!(state.pointer_up(), Some(None));
}

#[test]
fn zoom_stays_within_limits() {
	let mut state = settled_state();
	for _ in 0..500 {
		state.wheel(100.0, 100.0, -500.0);
	}
	assert_eq!(state.viewport.transform.k, 4.0);
	for _ in 0..500 {
		state.wheel(100.0, 100.0, 500.0);
	}
	assert_eq!(state.viewport.transform.k, 0.1);
}

#[test]
fn panning_moves_the_view_not_the_nodes() {
	let mut state = settled_state();
	let config = ScaleConfig::default();
	let before: Vec<_> = state.positions().collect();

	state.pointer_down(-1_000.0, -1_000.0, &config);
	state.pointer_move(-900.0, -950.0, &config);
	assert_eq!(state.pointer_up(), None);

	assert_eq!(
		(state.viewport.transform.x, state.viewport.transform.y),
		(100.0, 50.0)
	);
	assert_eq!(state.positions().collect::<Vec<_>>(), before);
}
