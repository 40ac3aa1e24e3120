//! Pan/zoom transform and pointer gestures.
//!
//! Node coordinates live in world space. The [`ViewTransform`] maps world space to
//! screen space and is applied to the whole scene at once. A pointer-down on a node
//! starts a node drag that pins it in the simulation; anywhere else it starts a pan.

use serde::Deserialize;

use super::simulation::Simulation;

/// Zoom limits and gesture thresholds.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportConfig {
	/// Smallest allowed scale factor.
	pub min_zoom: f64,
	/// Largest allowed scale factor.
	pub max_zoom: f64,
	/// Zoom factor applied per wheel notch.
	pub wheel_zoom_step: f64,
	/// Screen pixels a pointer may travel and still count as a click.
	pub click_tolerance: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			min_zoom: 0.1,
			max_zoom: 4.0,
			wheel_zoom_step: 1.1,
			click_tolerance: 3.0,
		}
	}
}

/// Translation plus uniform scale: `screen = world * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal translation in screen pixels.
	pub x: f64,
	/// Vertical translation in screen pixels.
	pub y: f64,
	/// Zoom factor (1.0 = 100%).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	/// Maps a canvas point into simulation coordinates.
	pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Maps simulation coordinates onto the canvas.
	pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
		(wx * self.k + self.x, wy * self.k + self.y)
	}

	/// Scales by `factor` around the screen point `(sx, sy)`, keeping the world point
	/// under it fixed. The resulting scale is clamped to `[min, max]`.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64, min: f64, max: f64) {
		let new_k = (self.k * factor).clamp(min, max);
		if !new_k.is_finite() || new_k <= 0.0 {
			return;
		}
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}
}

/// The gesture in progress between pointer-down and pointer-up.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Gesture {
	/// No pointer is down.
	#[default]
	Idle,
	/// Dragging the background moves the view.
	Pan {
		/// Pointer-down x on screen.
		start_x: f64,
		/// Pointer-down y on screen.
		start_y: f64,
		/// Transform x at pointer-down.
		origin_x: f64,
		/// Transform y at pointer-down.
		origin_y: f64,
		/// Whether the pointer left the click tolerance.
		moved: bool,
	},
	/// Dragging a node pins it under the pointer.
	DragNode {
		/// Index of the held node.
		index: usize,
		/// Pointer-down x on screen.
		start_x: f64,
		/// Pointer-down y on screen.
		start_y: f64,
		/// Node x in world space at pointer-down.
		node_x: f64,
		/// Node y in world space at pointer-down.
		node_y: f64,
		/// Whether the pointer left the click tolerance.
		moved: bool,
	},
}

/// How a completed gesture should be interpreted by the interaction layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerOutcome {
	/// Pointer went down and up on a node without moving.
	NodeClick(usize),
	/// Pointer went down and up on empty space without moving.
	BackgroundClick,
	/// A node was dragged to a new position.
	Dragged(usize),
	/// The view was panned.
	Panned,
	/// Pointer-up with no gesture in progress.
	Nothing,
}

/// Owns the view transform and translates pointer input into transform changes and
/// simulation pins.
#[derive(Clone, Debug, Default)]
pub struct Viewport {
	/// Current pan and zoom.
	pub transform: ViewTransform,
	/// Zoom limits and thresholds.
	pub config: ViewportConfig,
	gesture: Gesture,
}

impl Viewport {
	/// An identity view with the given limits.
	pub fn new(config: ViewportConfig) -> Self {
		Self {
			transform: ViewTransform::default(),
			config,
			gesture: Gesture::Idle,
		}
	}

	/// The gesture in progress.
	pub fn gesture(&self) -> Gesture {
		self.gesture
	}

	/// Whether a node is currently held.
	pub fn is_dragging_node(&self) -> bool {
		matches!(self.gesture, Gesture::DragNode { .. })
	}

	/// Starts a node drag when `hit` names a node, otherwise a pan.
	pub fn pointer_down(&mut self, sx: f64, sy: f64, hit: Option<usize>, sim: &mut Simulation) {
		self.release(sim);
		self.gesture = match hit.and_then(|i| Some((i, sim.position(i)?))) {
			Some((index, (node_x, node_y))) => {
				sim.begin_drag(index, node_x, node_y);
				Gesture::DragNode {
					index,
					start_x: sx,
					start_y: sy,
					node_x,
					node_y,
					moved: false,
				}
			}
			None => Gesture::Pan {
				start_x: sx,
				start_y: sy,
				origin_x: self.transform.x,
				origin_y: self.transform.y,
				moved: false,
			},
		};
	}

	/// Pans the view or moves the held node.
	pub fn pointer_move(&mut self, sx: f64, sy: f64, sim: &mut Simulation) {
		let tolerance = self.config.click_tolerance;
		let k = self.transform.k;
		match &mut self.gesture {
			Gesture::Idle => {}
			Gesture::Pan {
				start_x,
				start_y,
				origin_x,
				origin_y,
				moved,
			} => {
				*moved |= exceeds(sx - *start_x, sy - *start_y, tolerance);
				self.transform.x = *origin_x + (sx - *start_x);
				self.transform.y = *origin_y + (sy - *start_y);
			}
			Gesture::DragNode {
				index,
				start_x,
				start_y,
				node_x,
				node_y,
				moved,
			} => {
				*moved |= exceeds(sx - *start_x, sy - *start_y, tolerance);
				let wx = *node_x + (sx - *start_x) / k;
				let wy = *node_y + (sy - *start_y) / k;
				sim.drag_to(*index, wx, wy);
			}
		}
	}

	/// Ends the current gesture, unpinning any dragged node.
	pub fn pointer_up(&mut self, sim: &mut Simulation) -> PointerOutcome {
		let outcome = match self.gesture {
			Gesture::Idle => PointerOutcome::Nothing,
			Gesture::Pan { moved: true, .. } => PointerOutcome::Panned,
			Gesture::Pan { moved: false, .. } => PointerOutcome::BackgroundClick,
			Gesture::DragNode {
				index,
				moved: true,
				..
			} => PointerOutcome::Dragged(index),
			Gesture::DragNode {
				index,
				moved: false,
				..
			} => PointerOutcome::NodeClick(index),
		};
		self.release(sim);
		outcome
	}

	/// Abandons the current gesture without producing a click (pointer left the canvas).
	pub fn cancel(&mut self, sim: &mut Simulation) {
		self.release(sim);
	}

	/// Applies one wheel event; positive `delta_y` zooms out.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		if delta_y == 0.0 {
			return;
		}
		let step = self.config.wheel_zoom_step;
		let factor = if delta_y > 0.0 { 1.0 / step } else { step };
		self.zoom_by(sx, sy, factor);
	}

	/// Zooms by an arbitrary factor (pinch gestures, buttons).
	pub fn zoom_by(&mut self, sx: f64, sy: f64, factor: f64) {
		let (min, max) = (self.config.min_zoom, self.config.max_zoom);
		self.transform.zoom_at(sx, sy, factor, min, max);
	}

	fn release(&mut self, sim: &mut Simulation) {
		if let Gesture::DragNode { index, .. } = self.gesture {
			sim.end_drag(index);
		}
		self.gesture = Gesture::Idle;
	}
}

fn exceeds(dx: f64, dy: f64, tolerance: f64) -> bool {
	dx * dx + dy * dy > tolerance * tolerance
}
