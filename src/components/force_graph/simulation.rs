//! Force-directed layout integrator.
//!
//! A velocity-Verlet style simulation in the spirit of d3-force: every tick decays
//! `alpha` towards `alpha_target`, accumulates link, many-body, centering and
//! collision forces into node velocities, then integrates positions. Pinned nodes are
//! held at their pin and carry no velocity.
//!
//! The simulation knows nothing about the canvas; it works in world coordinates and
//! is driven by whoever calls [`Simulation::step`] once per frame.

use std::f64::consts::{PI, TAU};

use log::debug;
use serde::Deserialize;

use super::quadtree::QuadTree;
use super::types::{GraphData, NodeKind};

/// Force strengths and decay rates.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationParameters {
	/// Rest length of every link spring.
	pub link_distance: f64,
	/// Many-body charge per node; negative values repel.
	pub charge_strength: f64,
	/// Barnes–Hut opening criterion; larger is coarser.
	pub theta: f64,
	/// Distances below this are clamped when computing repulsion.
	pub charge_distance_min: f64,
	/// Fraction of the centroid offset removed each tick.
	pub center_strength: f64,
	/// Collision radius of file nodes.
	pub collide_radius_file: f64,
	/// Collision radius of directory nodes.
	pub collide_radius_directory: f64,
	/// Fraction of an overlap resolved per tick.
	pub collide_strength: f64,
	/// The simulation stops once `alpha` falls below this.
	pub alpha_min: f64,
	/// Per-tick step of alpha towards its target.
	pub alpha_decay: f64,
	/// Fraction of velocity lost every tick.
	pub velocity_decay: f64,
	/// `alpha_target` while a node is being dragged.
	pub drag_alpha_target: f64,
	/// Spacing of the initial phyllotaxis placement.
	pub initial_radius: f64,
	/// Seed for initial rotation and coincident-point jiggle.
	pub seed: u32,
}

impl Default for SimulationParameters {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			link_distance: 100.0,
			charge_strength: -200.0,
			theta: 0.9,
			charge_distance_min: 1.0,
			center_strength: 1.0,
			collide_radius_file: 20.0,
			collide_radius_directory: 30.0,
			collide_strength: 1.0,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			velocity_decay: 0.4,
			drag_alpha_target: 0.3,
			initial_radius: 10.0,
			seed: 1,
		}
	}
}

/// Kinematic state of one node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Body {
	/// World-space x.
	pub x: f64,
	/// World-space y.
	pub y: f64,
	/// Velocity along x.
	pub vx: f64,
	/// Velocity along y.
	pub vy: f64,
	/// Externally supplied position that overrides integration.
	pub pin: Option<(f64, f64)>,
	/// Collision radius.
	pub radius: f64,
}

#[derive(Clone, Copy, Debug)]
struct Spring {
	source: usize,
	target: usize,
	strength: f64,
	bias: f64,
}

/// Linear congruential generator, deterministic per seed.
#[derive(Clone, Debug)]
struct Lcg(u32);

impl Lcg {
	fn next_f64(&mut self) -> f64 {
		self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
		f64::from(self.0) / 4_294_967_296.0
	}

	/// A tiny non-zero offset used to separate coincident points.
	fn jiggle(&mut self) -> f64 {
		let j = (self.next_f64() - 0.5) * 1e-6;
		if j == 0.0 { 1e-7 } else { j }
	}
}

/// A running layout over one graph's topology.
pub struct Simulation {
	params: SimulationParameters,
	bodies: Vec<Body>,
	springs: Vec<Spring>,
	center: (f64, f64),
	alpha: f64,
	alpha_target: f64,
	rng: Lcg,
	stopped: bool,
}

impl Simulation {
	/// Creates a simulation for `data`, placing nodes on a phyllotaxis spiral around
	/// `center`. Links whose endpoints are unknown, and self-links, carry no force.
	pub fn new(data: &GraphData, params: SimulationParameters, center: (f64, f64)) -> Self {
		let mut rng = Lcg(params.seed);
		let rotation = rng.next_f64() * TAU;
		let golden_angle = PI * (3.0 - 5.0_f64.sqrt());

		let bodies = data
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				let r = params.initial_radius * (0.5 + i as f64).sqrt();
				let angle = rotation + i as f64 * golden_angle;
				Body {
					x: center.0 + r * angle.cos(),
					y: center.1 + r * angle.sin(),
					radius: match node.kind {
						NodeKind::Directory => params.collide_radius_directory,
						NodeKind::File => params.collide_radius_file,
					},
					..Body::default()
				}
			})
			.collect::<Vec<_>>();

		let index: std::collections::HashMap<&str, usize> = data
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.as_str(), i))
			.collect();
		let pairs: Vec<(usize, usize)> = data
			.links
			.iter()
			.filter_map(|l| Some((*index.get(l.source.as_str())?, *index.get(l.target.as_str())?)))
			.filter(|(s, t)| s != t)
			.collect();

		let mut degree = vec![0usize; bodies.len()];
		for &(s, t) in &pairs {
			degree[s] += 1;
			degree[t] += 1;
		}
		let springs = pairs
			.into_iter()
			.map(|(source, target)| {
				let (ds, dt) = (degree[source] as f64, degree[target] as f64);
				Spring {
					source,
					target,
					strength: 1.0 / ds.min(dt),
					bias: ds / (ds + dt),
				}
			})
			.collect();

		Self {
			params,
			bodies,
			springs,
			center,
			alpha: 1.0,
			alpha_target: 0.0,
			rng,
			stopped: false,
		}
	}

	/// Number of bodies.
	pub fn len(&self) -> usize {
		self.bodies.len()
	}

	/// Whether there are no bodies.
	pub fn is_empty(&self) -> bool {
		self.bodies.is_empty()
	}

	/// Parameters in use.
	pub fn params(&self) -> &SimulationParameters {
		&self.params
	}

	/// Current energy in `[0, 1]`.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Level alpha decays towards.
	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	/// Sets the level alpha decays towards, clamped to `[0, 1]`.
	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target.clamp(0.0, 1.0);
	}

	/// Moves the point the centering force pulls towards.
	pub fn set_center(&mut self, x: f64, y: f64) {
		self.center = (x, y);
	}

	/// Whether [`step`](Self::step) will advance the layout.
	pub fn is_running(&self) -> bool {
		!self.stopped
	}

	/// Resumes ticking. Alpha is left alone; raise the target to re-energise.
	pub fn restart(&mut self) {
		if self.stopped {
			debug!("codebase-graph: simulation restarted at alpha {:.4}", self.alpha);
		}
		self.stopped = false;
	}

	/// Halts ticking and releases every pin.
	pub fn stop(&mut self) {
		self.stopped = true;
		self.alpha_target = 0.0;
		for body in &mut self.bodies {
			body.pin = None;
		}
	}

	/// One body by node index.
	pub fn body(&self, index: usize) -> Option<&Body> {
		self.bodies.get(index)
	}

	/// All bodies, in node order.
	pub fn bodies(&self) -> &[Body] {
		&self.bodies
	}

	/// Current position of one node.
	pub fn position(&self, index: usize) -> Option<(f64, f64)> {
		self.bodies.get(index).map(|b| (b.x, b.y))
	}

	/// Moves a node and clears its velocity without pinning it.
	pub fn place(&mut self, index: usize, x: f64, y: f64) {
		if let Some(body) = self.bodies.get_mut(index) {
			(body.x, body.y) = (x, y);
			(body.vx, body.vy) = (0.0, 0.0);
		}
	}

	/// Fixes a node at `(x, y)` until [`unpin`](Self::unpin).
	pub fn pin(&mut self, index: usize, x: f64, y: f64) {
		if let Some(body) = self.bodies.get_mut(index) {
			body.pin = Some((x, y));
			(body.x, body.y) = (x, y);
			(body.vx, body.vy) = (0.0, 0.0);
		}
	}

	/// Returns a node to the forces.
	pub fn unpin(&mut self, index: usize) {
		if let Some(body) = self.bodies.get_mut(index) {
			body.pin = None;
		}
	}

	/// Whether a node is held in place.
	pub fn is_pinned(&self, index: usize) -> bool {
		self.bodies.get(index).is_some_and(|b| b.pin.is_some())
	}

	/// Pins a node under the pointer and re-energises the layout around it.
	pub fn begin_drag(&mut self, index: usize, x: f64, y: f64) {
		self.set_alpha_target(self.params.drag_alpha_target);
		self.restart();
		self.pin(index, x, y);
	}

	/// Moves the pin of a dragged node.
	pub fn drag_to(&mut self, index: usize, x: f64, y: f64) {
		self.pin(index, x, y);
	}

	/// Releases the dragged node and lets alpha decay again.
	pub fn end_drag(&mut self, index: usize) {
		self.set_alpha_target(0.0);
		self.unpin(index);
	}

	/// Advances one frame if running. Returns whether a tick happened.
	///
	/// The simulation stops itself once alpha settles below `alpha_min`; any later
	/// drag restarts it.
	pub fn step(&mut self) -> bool {
		if self.stopped {
			return false;
		}
		self.tick();
		if self.alpha < self.params.alpha_min {
			self.stopped = true;
			debug!("codebase-graph: simulation settled");
		}
		true
	}

	/// Runs one integration step unconditionally.
	pub fn tick(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;
		if self.bodies.is_empty() {
			return;
		}

		self.apply_links();
		self.apply_charge();
		self.apply_center();
		self.apply_collision();

		let keep = 1.0 - self.params.velocity_decay;
		for body in &mut self.bodies {
			if let Some((px, py)) = body.pin {
				(body.x, body.y) = (px, py);
				(body.vx, body.vy) = (0.0, 0.0);
			} else {
				body.vx *= keep;
				body.vy *= keep;
				body.x += body.vx;
				body.y += body.vy;
			}
		}
	}

	/// Springs pull endpoints towards `link_distance`, split by degree so hubs move less.
	fn apply_links(&mut self) {
		let distance = self.params.link_distance;
		for spring in &self.springs {
			let (s, t) = (self.bodies[spring.source], self.bodies[spring.target]);
			let mut dx = t.x + t.vx - s.x - s.vx;
			let mut dy = t.y + t.vy - s.y - s.vy;
			if dx == 0.0 {
				dx = self.rng.jiggle();
			}
			if dy == 0.0 {
				dy = self.rng.jiggle();
			}
			let l = (dx * dx + dy * dy).sqrt();
			let k = (l - distance) / l * self.alpha * spring.strength;
			let (fx, fy) = (dx * k, dy * k);

			let target = &mut self.bodies[spring.target];
			target.vx -= fx * spring.bias;
			target.vy -= fy * spring.bias;
			let source = &mut self.bodies[spring.source];
			source.vx += fx * (1.0 - spring.bias);
			source.vy += fy * (1.0 - spring.bias);
		}
	}

	/// Barnes–Hut approximated repulsion between all nodes.
	fn apply_charge(&mut self) {
		let strength = self.params.charge_strength;
		if strength == 0.0 {
			return;
		}
		let points: Vec<(f64, f64)> = self.bodies.iter().map(|b| (b.x, b.y)).collect();
		let charges = vec![strength; points.len()];
		let mut tree = QuadTree::new(&points);
		tree.accumulate(&points, &charges, &[]);

		let theta2 = self.params.theta * self.params.theta;
		let min2 = self.params.charge_distance_min.powi(2);
		let alpha = self.alpha;

		for (i, &(x, y)) in points.iter().enumerate() {
			let (mut vx, mut vy) = (0.0, 0.0);
			let rng = &mut self.rng;
			tree.visit(|quad| {
				if quad.charge == 0.0 {
					return true;
				}
				let (mut dx, mut dy) = (quad.cx - x, quad.cy - y);
				let mut l = dx * dx + dy * dy;
				let w = quad.width();

				if w * w / theta2 < l {
					if l < min2 {
						l = (min2 * l).sqrt();
					}
					vx += dx * quad.charge * alpha / l;
					vy += dy * quad.charge * alpha / l;
					return true;
				}
				if !quad.is_leaf() {
					return false;
				}

				if quad.points.len() > 1 || quad.points[0] != i {
					if dx == 0.0 {
						dx = rng.jiggle();
						l += dx * dx;
					}
					if dy == 0.0 {
						dy = rng.jiggle();
						l += dy * dy;
					}
					if l < min2 {
						l = (min2 * l).sqrt();
					}
				}
				for &j in &quad.points {
					if j != i {
						vx += dx * charges[j] * alpha / l;
						vy += dy * charges[j] * alpha / l;
					}
				}
				true
			});
			self.bodies[i].vx += vx;
			self.bodies[i].vy += vy;
		}
	}

	/// Translates every node so the centroid sits on the centre.
	fn apply_center(&mut self) {
		let n = self.bodies.len() as f64;
		let (sx, sy) = self
			.bodies
			.iter()
			.fold((0.0, 0.0), |(sx, sy), b| (sx + b.x, sy + b.y));
		let shift_x = (sx / n - self.center.0) * self.params.center_strength;
		let shift_y = (sy / n - self.center.1) * self.params.center_strength;
		for body in &mut self.bodies {
			body.x -= shift_x;
			body.y -= shift_y;
		}
	}

	/// Pushes apart nodes whose predicted positions overlap their collision radii.
	fn apply_collision(&mut self) {
		let strength = self.params.collide_strength;
		if strength == 0.0 {
			return;
		}
		let points: Vec<(f64, f64)> = self
			.bodies
			.iter()
			.map(|b| (b.x + b.vx, b.y + b.vy))
			.collect();
		let radii: Vec<f64> = self.bodies.iter().map(|b| b.radius).collect();
		let mut tree = QuadTree::new(&points);
		tree.accumulate(&points, &[], &radii);

		for (i, &(xi, yi)) in points.iter().enumerate() {
			let ri = radii[i];
			let ri2 = ri * ri;
			let bodies = &mut self.bodies;
			let rng = &mut self.rng;
			tree.visit(|quad| {
				let reach = ri + quad.radius;
				if quad.is_leaf() {
					for &j in &quad.points {
						if j <= i {
							continue;
						}
						let rj = radii[j];
						let r = ri + rj;
						let other = bodies[j];
						let mut dx = xi - (other.x + other.vx);
						let mut dy = yi - (other.y + other.vy);
						let mut l = dx * dx + dy * dy;
						if l >= r * r {
							continue;
						}
						if dx == 0.0 {
							dx = rng.jiggle();
							l += dx * dx;
						}
						if dy == 0.0 {
							dy = rng.jiggle();
							l += dy * dy;
						}
						let dist = l.sqrt();
						let k = (r - dist) / dist * strength;
						let (fx, fy) = (dx * k, dy * k);
						let rj2 = rj * rj;
						let share = if ri2 + rj2 > 0.0 { rj2 / (ri2 + rj2) } else { 0.5 };

						bodies[i].vx += fx * share;
						bodies[i].vy += fy * share;
						bodies[j].vx -= fx * (1.0 - share);
						bodies[j].vy -= fy * (1.0 - share);
					}
					return true;
				}
				quad.x0 > xi + reach || quad.x1 < xi - reach || quad.y0 > yi + reach || quad.y1 < yi - reach
			});
		}
	}
}
