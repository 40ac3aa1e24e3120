//! Quadtree over node positions, used for Barnes–Hut repulsion and collision pruning.
//!
//! The tree is rebuilt from scratch every time a force needs it. Leaves hold one point,
//! or several points sharing a position (or too deep to split further).

const MAX_DEPTH: usize = 32;

/// One square cell of the tree.
#[derive(Clone, Debug)]
pub struct Quad {
	pub x0: f64,
	pub y0: f64,
	pub x1: f64,
	pub y1: f64,
	/// Child cells in NW, NE, SW, SE order.
	pub children: [Option<usize>; 4],
	/// Point indices held by a leaf.
	pub points: Vec<usize>,
	/// Sum of the charges below this cell.
	pub charge: f64,
	/// Charge-weighted centre of the points below this cell.
	pub cx: f64,
	pub cy: f64,
	/// Largest point radius below this cell.
	pub radius: f64,
}

impl Quad {
	fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
		Self {
			x0,
			y0,
			x1,
			y1,
			children: [None; 4],
			points: Vec::new(),
			charge: 0.0,
			cx: (x0 + x1) / 2.0,
			cy: (y0 + y1) / 2.0,
			radius: 0.0,
		}
	}

	pub fn is_leaf(&self) -> bool {
		self.children.iter().all(Option::is_none)
	}

	pub fn width(&self) -> f64 {
		self.x1 - self.x0
	}
}

/// A quadtree stored as an arena; index 0 is the root.
#[derive(Clone, Debug, Default)]
pub struct QuadTree {
	quads: Vec<Quad>,
}

impl QuadTree {
	pub fn new(points: &[(f64, f64)]) -> Self {
		let mut tree = Self::default();
		if points.is_empty() {
			return tree;
		}

		let (mut x0, mut y0) = (f64::INFINITY, f64::INFINITY);
		let (mut x1, mut y1) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
		for &(x, y) in points {
			x0 = x0.min(x);
			y0 = y0.min(y);
			x1 = x1.max(x);
			y1 = y1.max(y);
		}
		let size = (x1 - x0).max(y1 - y0).max(1.0);

		tree.subdivide(
			points,
			(0..points.len()).collect(),
			(x0, y0, x0 + size, y0 + size),
			0,
		);
		tree
	}

	pub fn is_empty(&self) -> bool {
		self.quads.is_empty()
	}

	fn subdivide(
		&mut self,
		points: &[(f64, f64)],
		indices: Vec<usize>,
		(x0, y0, x1, y1): (f64, f64, f64, f64),
		depth: usize,
	) -> usize {
		let id = self.quads.len();
		self.quads.push(Quad::new(x0, y0, x1, y1));

		let first = points[indices[0]];
		if indices.len() == 1 || depth >= MAX_DEPTH || indices.iter().all(|&i| points[i] == first) {
			self.quads[id].points = indices;
			return id;
		}

		let (mx, my) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
		let mut buckets: [Vec<usize>; 4] = Default::default();
		for i in indices {
			let (x, y) = points[i];
			let q = usize::from(x >= mx) | (usize::from(y >= my) << 1);
			buckets[q].push(i);
		}

		for (q, bucket) in buckets.into_iter().enumerate() {
			if bucket.is_empty() {
				continue;
			}
			let (cx0, cx1) = if q & 1 == 0 { (x0, mx) } else { (mx, x1) };
			let (cy0, cy1) = if q & 2 == 0 { (y0, my) } else { (my, y1) };
			let child = self.subdivide(points, bucket, (cx0, cy0, cx1, cy1), depth + 1);
			self.quads[id].children[q] = Some(child);
		}
		id
	}

	/// Aggregates charges, charge centres and radii bottom-up.
	///
	/// Children are always stored after their parent, so a reverse sweep visits every
	/// child before the cell that contains it.
	pub fn accumulate(&mut self, points: &[(f64, f64)], charges: &[f64], radii: &[f64]) {
		for id in (0..self.quads.len()).rev() {
			let (mut charge, mut weight, mut sx, mut sy, mut radius) = (0.0, 0.0, 0.0, 0.0, 0.0_f64);
			let quad = &self.quads[id];
			if quad.is_leaf() {
				for &i in &quad.points {
					let c = charges.get(i).copied().unwrap_or(0.0);
					charge += c;
					weight += c.abs();
					sx += c.abs() * points[i].0;
					sy += c.abs() * points[i].1;
					radius = radius.max(radii.get(i).copied().unwrap_or(0.0));
				}
			} else {
				for &child in quad.children.iter().flatten() {
					let child = &self.quads[child];
					let w = child.charge.abs();
					charge += child.charge;
					weight += w;
					sx += w * child.cx;
					sy += w * child.cy;
					radius = radius.max(child.radius);
				}
			}

			let quad = &mut self.quads[id];
			quad.charge = charge;
			quad.radius = radius;
			if weight > 0.0 {
				quad.cx = sx / weight;
				quad.cy = sy / weight;
			} else if let Some(&i) = quad.points.first() {
				(quad.cx, quad.cy) = points[i];
			}
		}
	}

	/// Pre-order traversal. Returning `true` from `f` skips the cell's children.
	pub fn visit(&self, mut f: impl FnMut(&Quad) -> bool) {
		if self.quads.is_empty() {
			return;
		}
		let mut stack = vec![0];
		while let Some(id) = stack.pop() {
			let quad = &self.quads[id];
			if f(quad) {
				continue;
			}
			stack.extend(quad.children.iter().rev().flatten());
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_point_lands_in_exactly_one_leaf() {
		let points = [(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (10.0, 10.0), (3.0, 7.0)];
		let tree = QuadTree::new(&points);
		let mut seen: Vec<usize> = Vec::new();
		tree.visit(|quad| {
			seen.extend(&quad.points);
			false
		});
		seen.sort_unstable();
		assert_eq!(seen, vec![0, 1, 2, 3, 4]);
	}

	#[test]
	fn coincident_points_share_a_leaf() {
		let points = [(5.0, 5.0), (5.0, 5.0), (5.0, 5.0)];
		let tree = QuadTree::new(&points);
		let mut leaves = 0;
		tree.visit(|quad| {
			if quad.is_leaf() {
				leaves += 1;
				assert_eq!(quad.points.len(), 3);
			}
			false
		});
		assert_eq!(leaves, 1);
	}

	#[test]
	fn root_aggregates_charge_and_radius() {
		let points = [(0.0, 0.0), (4.0, 0.0)];
		let mut tree = QuadTree::new(&points);
		tree.accumulate(&points, &[-1.0, -3.0], &[2.0, 5.0]);
		let mut root = None;
		tree.visit(|quad| {
			root.get_or_insert_with(|| quad.clone());
			true
		});
		let root = root.unwrap();
		assert_eq!(root.charge, -4.0);
		assert_eq!(root.cx, 3.0);
		assert_eq!(root.cy, 0.0);
		assert_eq!(root.radius, 5.0);
	}

	#[test]
	fn empty_tree_visits_nothing() {
		let tree = QuadTree::new(&[]);
		assert!(tree.is_empty());
		tree.visit(|_| panic!("no cells expected"));
	}
}
