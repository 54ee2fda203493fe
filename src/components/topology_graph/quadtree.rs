//! Barnes-Hut quadtree used by the charge force.
//!
//! Every point carries unit mass, so an internal cell's `mass` is the number of
//! points below it and `center_of_mass` their centroid.

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

#[derive(Clone, Copy, Debug)]
pub(super) struct QuadBounds {
	pub(super) cx: f64,
	pub(super) cy: f64,
	pub(super) half_extent: f64,
}

impl QuadBounds {
	fn from_points(points: &[(f64, f64)]) -> Option<Self> {
		let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
		let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);

		for &(x, y) in points {
			min_x = min_x.min(x);
			min_y = min_y.min(y);
			max_x = max_x.max(x);
			max_y = max_y.max(y);
		}

		if !min_x.is_finite() || !min_y.is_finite() || !max_x.is_finite() || !max_y.is_finite() {
			return None;
		}

		let span = (max_x - min_x).max(max_y - min_y).max(1.0);
		Some(Self {
			cx: (min_x + max_x) * 0.5,
			cy: (min_y + max_y) * 0.5,
			half_extent: span * 0.5 + 1.0,
		})
	}

	pub(super) fn contains(self, x: f64, y: f64) -> bool {
		(x - self.cx).abs() <= self.half_extent && (y - self.cy).abs() <= self.half_extent
	}

	pub(super) fn side_length(self) -> f64 {
		self.half_extent * 2.0
	}

	fn child(self, quadrant: usize) -> Self {
		let quarter = self.half_extent * 0.5;
		let (dx, dy) = match quadrant {
			0 => (-quarter, -quarter),
			1 => (quarter, -quarter),
			2 => (-quarter, quarter),
			_ => (quarter, quarter),
		};
		Self {
			cx: self.cx + dx,
			cy: self.cy + dy,
			half_extent: quarter,
		}
	}

	fn quadrant_for(self, x: f64, y: f64) -> usize {
		match (x >= self.cx, y >= self.cy) {
			(false, false) => 0,
			(true, false) => 1,
			(false, true) => 2,
			(true, true) => 3,
		}
	}
}

pub(super) struct QuadNode {
	pub(super) bounds: QuadBounds,
	pub(super) center_of_mass: (f64, f64),
	pub(super) mass: f64,
	/// Point indices; only populated on leaves.
	pub(super) indices: Vec<usize>,
	pub(super) children: [Option<Box<QuadNode>>; 4],
}

impl QuadNode {
	pub(super) fn build(points: &[(f64, f64)]) -> Option<Self> {
		let bounds = QuadBounds::from_points(points)?;
		let indices = (0..points.len()).collect::<Vec<_>>();
		Some(Self::build_node(bounds, indices, points, 0))
	}

	fn build_node(bounds: QuadBounds, indices: Vec<usize>, points: &[(f64, f64)], depth: usize) -> Self {
		let (mut sx, mut sy) = (0.0, 0.0);
		for &index in &indices {
			sx += points[index].0;
			sy += points[index].1;
		}
		let mass = indices.len() as f64;
		let center_of_mass = if mass > 0.0 {
			(sx / mass, sy / mass)
		} else {
			(bounds.cx, bounds.cy)
		};

		let mut node = Self {
			bounds,
			center_of_mass,
			mass,
			indices,
			children: std::array::from_fn(|_| None),
		};

		if depth >= MAX_DEPTH || node.indices.len() <= LEAF_CAPACITY {
			return node;
		}

		let mut buckets = std::array::from_fn::<_, 4, _>(|_| Vec::new());
		for &index in &node.indices {
			let (x, y) = points[index];
			buckets[bounds.quadrant_for(x, y)].push(index);
		}

		// All points in one quadrant means they are (nearly) coincident.
		if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
			return node;
		}

		for (quadrant, bucket) in buckets.into_iter().enumerate() {
			if bucket.is_empty() {
				continue;
			}
			node.children[quadrant] = Some(Box::new(Self::build_node(
				bounds.child(quadrant),
				bucket,
				points,
				depth + 1,
			)));
		}
		node.indices.clear();
		node
	}

	pub(super) fn is_leaf(&self) -> bool {
		self.children.iter().all(Option::is_none)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn count_points(node: &QuadNode) -> usize {
		if node.is_leaf() {
			return node.indices.len();
		}
		node.children
			.iter()
			.flatten()
			.map(|child| count_points(child))
			.sum()
	}

	#[test]
	fn empty_input_builds_nothing() {
		assert!(QuadNode::build(&[]).is_none());
	}

	#[test]
	fn every_point_lands_in_exactly_one_leaf() {
		let points = (0..100)
			.map(|i| {
				let angle = i as f64 * 0.7;
				(angle.cos() * i as f64, angle.sin() * i as f64)
			})
			.collect::<Vec<_>>();
		let tree = QuadNode::build(&points).unwrap();

		assert!(!tree.is_leaf());
		assert_eq!(tree.mass, 100.0);
		assert_eq!(count_points(&tree), 100);
		for &(x, y) in &points {
			assert!(tree.bounds.contains(x, y));
		}
	}

	#[test]
	fn coincident_points_stay_in_one_leaf() {
		let points = vec![(5.0, 5.0); 20];
		let tree = QuadNode::build(&points).unwrap();

		assert!(tree.is_leaf());
		assert_eq!(tree.indices.len(), 20);
		assert_eq!(tree.center_of_mass, (5.0, 5.0));
	}
}
