//! Render scene: everything a frame draws, resolved to world coordinates
//! and concrete styles.
//!
//! The scene is rebuilt from simulation positions on every frame instead of
//! being patched, so link endpoints and markers can never lag behind the
//! nodes they are attached to.

use super::filter::{FilteredGraph, GraphNode, TopologyFilters};
use super::simulation::Simulation;
use super::theme::{LabelStyle, LinkStyle, MarkerStyle, NodeStyle, ViewStyle};

/// A node glyph at its current position.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
	/// Index into the filtered node set.
	pub index: usize,
	/// World x.
	pub x: f64,
	/// World y.
	pub y: f64,
	/// Resolved glyph style.
	pub style: NodeStyle,
	/// Label text, when labels are shown.
	pub label: Option<String>,
}

/// Traffic marker at a link midpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneMarker {
	/// World x.
	pub x: f64,
	/// World y.
	pub y: f64,
	/// Resolved marker style.
	pub style: MarkerStyle,
}

/// A straight link between two node centers.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneLink {
	/// Source position.
	pub from: (f64, f64),
	/// Target position.
	pub to: (f64, f64),
	/// Resolved stroke.
	pub style: LinkStyle,
	/// Traffic marker, for links that carry traffic.
	pub marker: Option<SceneMarker>,
}

/// Everything one frame draws.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
	/// Glyphs in draw order.
	pub nodes: Vec<SceneNode>,
	/// Links, drawn beneath the glyphs.
	pub links: Vec<SceneLink>,
	/// Style shared by every label.
	pub label_style: LabelStyle,
}

impl Scene {
	/// A scene with nothing to draw.
	pub fn empty(style: ViewStyle) -> Self {
		Self {
			nodes: Vec::new(),
			links: Vec::new(),
			label_style: style.label_style(),
		}
	}

	/// Resolves every filtered node and link against current positions.
	pub fn build(
		graph: &FilteredGraph,
		simulation: &Simulation,
		style: ViewStyle,
		filters: &TopologyFilters,
	) -> Self {
		let highlight = filters.highlight_threats;

		let links = graph
			.links
			.iter()
			.filter_map(|link| {
				let from = simulation.position(link.source)?;
				let to = simulation.position(link.target)?;
				let marker = link
					.has_traffic
					.then(|| style.traffic_marker(link.suspicious, highlight))
					.flatten()
					.map(|marker| SceneMarker {
						x: (from.0 + to.0) / 2.0,
						y: (from.1 + to.1) / 2.0,
						style: marker,
					});
				Some(SceneLink {
					from,
					to,
					style: style.link_style(link.suspicious, highlight),
					marker,
				})
			})
			.collect();

		let nodes = graph
			.nodes
			.iter()
			.enumerate()
			.filter_map(|(index, node)| {
				let (x, y) = simulation.position(index)?;
				Some(SceneNode {
					index,
					x,
					y,
					style: style.node_style(node.kind, node.severity, highlight),
					label: filters.show_labels.then(|| node.name.clone()),
				})
			})
			.collect();

		Self {
			nodes,
			links,
			label_style: style.label_style(),
		}
	}

	/// Topmost node whose glyph covers the world point.
	pub fn node_at(&self, wx: f64, wy: f64) -> Option<usize> {
		self.nodes
			.iter()
			.rev()
			.find(|node| {
				let radius = node.style.shape.hit_radius();
				(node.x - wx).powi(2) + (node.y - wy).powi(2) <= radius * radius
			})
			.map(|node| node.index)
	}
}

/// Hover text for a node: `name (kind)`, plus the namespace when the view
/// shows one.
pub fn tooltip_text(node: &GraphNode, style: ViewStyle) -> String {
	let mut text = format!("{} ({})", node.name, node.kind.wire_tag());
	if style.tooltip_shows_namespace() && !node.namespace.is_empty() {
		text.push_str(&format!("\nNamespace: {}", node.namespace));
	}
	text
}
