//! Force-directed layout simulation.
//!
//! A velocity-Verlet style integrator in the spirit of d3-force: every tick
//! cools `alpha` toward `alpha_target`, lets each force add to node
//! velocities (scaled by `alpha` where the force is alpha-aware), then moves
//! free nodes by their decayed velocity. Fixed nodes are snapped to their
//! fixed position and keep zero velocity, but they still take part in every
//! force as seen by their neighbours.
//!
//! The simulation owns one [`SimNode`] per filtered node, addressed by the
//! node's index in [`FilteredGraph::nodes`](super::filter::FilteredGraph).

use std::f64::consts::PI;

use super::filter::FilteredGraph;
use super::quadtree::QuadNode;

/// Alpha below which the layout is considered settled.
pub const ALPHA_MIN: f64 = 0.001;
/// Alpha target while a node is being dragged.
pub const DRAG_ALPHA_TARGET: f64 = 0.3;
/// Fraction of velocity lost per tick.
pub const VELOCITY_DECAY: f64 = 0.4;

const INITIAL_RADIUS: f64 = 10.0;
const DISTANCE_MIN_SQ: f64 = 1.0;
const BARNES_HUT_THETA: f64 = 0.9;
const COLLIDE_STRENGTH: f64 = 1.0;

/// Default decay: alpha falls from 1 to `ALPHA_MIN` in roughly 300 ticks.
pub fn default_alpha_decay() -> f64 {
	1.0 - ALPHA_MIN.powf(1.0 / 300.0)
}

/// Tunable force constants for one view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceSettings {
	/// Spring rest length of every link.
	pub link_distance: f64,
	/// Many-body strength; negative values repel.
	pub charge_strength: f64,
	/// Collision radius per node, or `None` to disable the collision force.
	pub collide_radius: Option<f64>,
}

/// Who currently owns a node's position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PinState {
	/// Position integrated by the simulation.
	Free,
	/// Position follows the pointer.
	Dragging {
		/// Pointer x in world space.
		x: f64,
		/// Pointer y in world space.
		y: f64,
	},
	/// Position frozen where the last drag ended.
	Pinned {
		/// Frozen x.
		x: f64,
		/// Frozen y.
		y: f64,
	},
}

impl PinState {
	/// Position held by the pointer or a pin, if any.
	pub fn fixed_position(self) -> Option<(f64, f64)> {
		match self {
			PinState::Free => None,
			PinState::Dragging { x, y } | PinState::Pinned { x, y } => Some((x, y)),
		}
	}
}

/// Mutable per-node physics state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimNode {
	/// World x.
	pub x: f64,
	/// World y.
	pub y: f64,
	/// Velocity carried into the next tick.
	pub vx: f64,
	/// Vertical velocity.
	pub vy: f64,
	/// Who owns the position.
	pub pin: PinState,
}

#[derive(Clone, Copy, Debug)]
struct SimLink {
	source: usize,
	target: usize,
	strength: f64,
	/// Share of the correction applied to the target.
	bias: f64,
}

/// The physics state of one graph layout.
pub struct Simulation {
	nodes: Vec<SimNode>,
	links: Vec<SimLink>,
	settings: ForceSettings,
	center: (f64, f64),
	alpha: f64,
	alpha_target: f64,
	alpha_decay: f64,
	velocity_decay: f64,
	jiggle_seed: u64,
	scratch: Vec<(f64, f64)>,
}

impl Simulation {
	/// Seeds node positions on a phyllotaxis spiral around `center`.
	pub fn new(graph: &FilteredGraph, settings: ForceSettings, center: (f64, f64)) -> Self {
		let golden_angle = PI * (3.0 - 5.0_f64.sqrt());
		let nodes = (0..graph.nodes.len())
			.map(|i| {
				let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
				let angle = i as f64 * golden_angle;
				SimNode {
					x: center.0 + radius * angle.cos(),
					y: center.1 + radius * angle.sin(),
					vx: 0.0,
					vy: 0.0,
					pin: PinState::Free,
				}
			})
			.collect::<Vec<_>>();

		let mut degree = vec![0usize; nodes.len()];
		for link in &graph.links {
			degree[link.source] += 1;
			degree[link.target] += 1;
		}
		let links = graph
			.links
			.iter()
			.filter(|link| link.source != link.target)
			.map(|link| {
				let (ds, dt) = (degree[link.source] as f64, degree[link.target] as f64);
				SimLink {
					source: link.source,
					target: link.target,
					strength: 1.0 / ds.min(dt),
					bias: ds / (ds + dt),
				}
			})
			.collect();

		Self {
			nodes,
			links,
			settings,
			center,
			alpha: 1.0,
			alpha_target: 0.0,
			alpha_decay: default_alpha_decay(),
			velocity_decay: VELOCITY_DECAY,
			jiggle_seed: 0,
			scratch: Vec::new(),
		}
	}

	/// Per-node state, indexed like the filtered graph.
	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	/// State of one node.
	pub fn node(&self, index: usize) -> Option<&SimNode> {
		self.nodes.get(index)
	}

	/// Current position of one node.
	pub fn position(&self, index: usize) -> Option<(f64, f64)> {
		self.nodes.get(index).map(|node| (node.x, node.y))
	}

	/// Number of simulated nodes.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// True when there is nothing to lay out.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Current temperature.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Value alpha cools toward.
	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	/// Sets the value alpha cools toward.
	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target.clamp(0.0, 1.0);
	}

	/// True once alpha has decayed below [`ALPHA_MIN`].
	pub fn is_settled(&self) -> bool {
		self.alpha < ALPHA_MIN
	}

	/// Replaces a node's pin state. Fixed states also move the node there.
	pub fn set_pin(&mut self, index: usize, pin: PinState) {
		let Some(node) = self.nodes.get_mut(index) else {
			return;
		};
		node.pin = pin;
		if let Some((x, y)) = pin.fixed_position() {
			node.x = x;
			node.y = y;
			node.vx = 0.0;
			node.vy = 0.0;
		}
	}

	/// Advances the layout by one step.
	pub fn tick(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
		if self.nodes.is_empty() {
			return;
		}

		self.apply_link_force();
		self.apply_charge_force();
		self.apply_center_force();
		if let Some(radius) = self.settings.collide_radius {
			self.apply_collide_force(radius);
		}

		let decay = 1.0 - self.velocity_decay;
		for node in &mut self.nodes {
			match node.pin.fixed_position() {
				Some((x, y)) => {
					node.x = x;
					node.y = y;
					node.vx = 0.0;
					node.vy = 0.0;
				}
				None => {
					node.vx *= decay;
					node.vy *= decay;
					node.x += node.vx;
					node.y += node.vy;
				}
			}
		}
	}

	/// Deterministic tiny offset used to separate coincident points.
	fn jiggle(&mut self) -> f64 {
		self.jiggle_seed = self.jiggle_seed.wrapping_add(1);
		let fraction = (self.jiggle_seed as f64 * 0.618_033_988_75).fract();
		(fraction - 0.5) * 1e-6
	}

	fn apply_link_force(&mut self) {
		let distance = self.settings.link_distance;
		let alpha = self.alpha;

		for i in 0..self.links.len() {
			let link = self.links[i];
			let (source, target) = (self.nodes[link.source], self.nodes[link.target]);

			let mut dx = target.x + target.vx - source.x - source.vx;
			let mut dy = target.y + target.vy - source.y - source.vy;
			if dx == 0.0 {
				dx = self.jiggle();
			}
			if dy == 0.0 {
				dy = self.jiggle();
			}

			let length = (dx * dx + dy * dy).sqrt();
			let scale = (length - distance) / length * alpha * link.strength;
			let (fx, fy) = (dx * scale, dy * scale);

			let target = &mut self.nodes[link.target];
			target.vx -= fx * link.bias;
			target.vy -= fy * link.bias;
			let source = &mut self.nodes[link.source];
			source.vx += fx * (1.0 - link.bias);
			source.vy += fy * (1.0 - link.bias);
		}
	}

	fn apply_charge_force(&mut self) {
		self.scratch.clear();
		self.scratch.extend(self.nodes.iter().map(|node| (node.x, node.y)));
		let Some(tree) = QuadNode::build(&self.scratch) else {
			return;
		};

		let strength = self.settings.charge_strength * self.alpha;
		let points = std::mem::take(&mut self.scratch);
		for index in 0..points.len() {
			let (mut fx, mut fy) = (0.0, 0.0);
			self.accumulate_charge(&tree, index, &points, strength, &mut fx, &mut fy);
			self.nodes[index].vx += fx;
			self.nodes[index].vy += fy;
		}
		self.scratch = points;
	}

	fn accumulate_charge(
		&mut self,
		cell: &QuadNode,
		index: usize,
		points: &[(f64, f64)],
		strength: f64,
		fx: &mut f64,
		fy: &mut f64,
	) {
		if cell.mass <= 0.0 {
			return;
		}
		let (px, py) = points[index];

		if cell.is_leaf() {
			for &other in &cell.indices {
				if other == index {
					continue;
				}
				let (mut dx, mut dy) = (points[other].0 - px, points[other].1 - py);
				if dx == 0.0 {
					dx = self.jiggle();
				}
				if dy == 0.0 {
					dy = self.jiggle();
				}
				let mut distance_sq = dx * dx + dy * dy;
				if distance_sq < DISTANCE_MIN_SQ {
					distance_sq = (DISTANCE_MIN_SQ * distance_sq).sqrt();
				}
				let weight = strength / distance_sq;
				*fx += dx * weight;
				*fy += dy * weight;
			}
			return;
		}

		let (dx, dy) = (cell.center_of_mass.0 - px, cell.center_of_mass.1 - py);
		let distance_sq = dx * dx + dy * dy;
		let side = cell.bounds.side_length();
		let far_enough = side * side / (BARNES_HUT_THETA * BARNES_HUT_THETA) < distance_sq;

		if far_enough && !cell.bounds.contains(px, py) {
			let distance_sq = distance_sq.max(DISTANCE_MIN_SQ);
			let weight = strength * cell.mass / distance_sq;
			*fx += dx * weight;
			*fy += dy * weight;
			return;
		}

		for child in cell.children.iter().flatten() {
			self.accumulate_charge(child, index, points, strength, fx, fy);
		}
	}

	fn apply_center_force(&mut self) {
		let count = self.nodes.len() as f64;
		let (sx, sy) = self
			.nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let shift_x = sx / count - self.center.0;
		let shift_y = sy / count - self.center.1;
		for node in &mut self.nodes {
			node.x -= shift_x;
			node.y -= shift_y;
		}
	}

	fn apply_collide_force(&mut self, radius: f64) {
		let min_distance = radius * 2.0;
		let min_distance_sq = min_distance * min_distance;

		for i in 0..self.nodes.len() {
			for j in (i + 1)..self.nodes.len() {
				let (a, b) = (self.nodes[i], self.nodes[j]);
				let mut dx = (a.x + a.vx) - (b.x + b.vx);
				let mut dy = (a.y + a.vy) - (b.y + b.vy);
				let distance_sq = dx * dx + dy * dy;
				if distance_sq >= min_distance_sq {
					continue;
				}
				if dx == 0.0 {
					dx = self.jiggle();
				}
				if dy == 0.0 {
					dy = self.jiggle();
				}
				let distance = (dx * dx + dy * dy).sqrt();
				let push = (min_distance - distance) / distance * COLLIDE_STRENGTH;
				// Equal radii split the correction evenly.
				let (px, py) = (dx * push * 0.5, dy * push * 0.5);
				self.nodes[i].vx += px;
				self.nodes[i].vy += py;
				self.nodes[j].vx -= px;
				self.nodes[j].vy -= py;
			}
		}
	}
}
