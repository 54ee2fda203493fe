//! Engine state for one mounted graph view.
//!
//! Owns the dataset, filters, the filtered graph, the simulation driver and
//! the view transform. Every host event (data refresh, filter change, resize,
//! pointer, wheel, frame) funnels through here, which keeps the canvas
//! component a thin adapter and the whole engine testable without a browser.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use super::driver::SimulationDriver;
use super::filter::{FilteredGraph, TopologyFilters};
use super::interaction::{Gesture, ViewTransform};
use super::profile::ViewProfile;
use super::scene::{Scene, tooltip_text};
use super::simulation::Simulation;
use super::types::TopologyData;

/// Hover tooltip resolved to screen coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
	/// Text to show, possibly multi-line.
	pub text: String,
	/// Anchor in canvas pixels.
	pub x: f64,
	/// World y.
	pub y: f64,
}

/// Host-independent engine behind [`TopologyCanvas`](super::TopologyCanvas).
pub struct TopologyGraphState {
	profile: ViewProfile,
	data: Option<TopologyData>,
	filters: TopologyFilters,
	graph: FilteredGraph,
	driver: Option<SimulationDriver>,
	/// Current pan and zoom.
	pub transform: ViewTransform,
	gesture: Gesture,
	wheel_zoom: bool,
	hovered: Option<usize>,
	width: f64,
	height: f64,
	/// Set by the tick listener and by view changes; cleared by `frame`.
	stale: Rc<Cell<bool>>,
	torn_down: bool,
}

impl TopologyGraphState {
	/// An engine with no data and no viewport yet.
	pub fn new(profile: ViewProfile, filters: TopologyFilters) -> Self {
		Self {
			profile,
			data: None,
			filters,
			graph: FilteredGraph::default(),
			driver: None,
			transform: ViewTransform::default(),
			gesture: Gesture::Idle,
			wheel_zoom: true,
			hovered: None,
			width: 0.0,
			height: 0.0,
			stale: Rc::new(Cell::new(true)),
			torn_down: false,
		}
	}

	/// Enables or disables wheel zoom. Enabled by default.
	pub fn with_wheel_zoom(mut self, enabled: bool) -> Self {
		self.wheel_zoom = enabled;
		self
	}

	/// Node and link set after filtering.
	pub fn graph(&self) -> &FilteredGraph {
		&self.graph
	}

	/// Viewport size in pixels.
	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	/// Active driver; `None` until data and a viewport exist.
	pub fn driver(&self) -> Option<&SimulationDriver> {
		self.driver.as_ref()
	}

	/// True while frames still tick.
	pub fn is_running(&self) -> bool {
		self.driver.as_ref().is_some_and(SimulationDriver::is_running)
	}

	/// Index of the node under the pointer.
	pub fn hovered(&self) -> Option<usize> {
		self.hovered
	}

	/// Replaces the dataset wholesale. `None` clears the graph.
	pub fn set_data(&mut self, data: Option<TopologyData>) {
		if self.torn_down {
			return;
		}
		self.data = data;
		self.rebuild();
	}

	/// Applies new filters. Only kind or namespace changes rebuild the
	/// simulation; label and highlight toggles just restyle the next frame.
	pub fn set_filters(&mut self, filters: TopologyFilters) {
		if self.torn_down || filters == self.filters {
			return;
		}
		let rebuild = filters.changes_node_set(&self.filters);
		self.filters = filters;
		if rebuild {
			self.rebuild();
		} else {
			self.stale.set(true);
		}
	}

	/// Records a new viewport size. A zero-sized viewport defers layout.
	pub fn resize(&mut self, width: f64, height: f64) {
		if self.torn_down || (width == self.width && height == self.height) {
			return;
		}
		self.width = width.max(0.0);
		self.height = height.max(0.0);
		self.rebuild();
	}

	fn has_viewport(&self) -> bool {
		self.width > 0.0 && self.height > 0.0
	}

	/// Fixed positions keyed by node id, for carrying pins across rebuilds.
	fn pinned_by_id(&self) -> HashMap<String, (f64, f64)> {
		let Some(driver) = &self.driver else {
			return HashMap::new();
		};
		driver
			.fixed_positions()
			.filter_map(|(index, pos)| self.graph.nodes.get(index).map(|node| (node.id.clone(), pos)))
			.collect()
	}

	/// Discards the current simulation and builds a fresh one. A node being
	/// dragged stays under the pointer if it survives the rebuild.
	fn rebuild(&mut self) {
		let pinned = self.pinned_by_id();
		let dragged = match self.gesture {
			Gesture::DraggingNode { index, offset } => {
				self.graph.nodes.get(index).map(|node| (node.id.clone(), offset))
			}
			_ => None,
		};
		if let Some(mut old) = self.driver.take() {
			old.stop();
		}
		if dragged.is_some() {
			self.gesture = Gesture::Idle;
		}
		self.hovered = None;
		self.stale.set(true);

		let Some(data) = self.data.as_ref() else {
			self.graph = FilteredGraph::default();
			return;
		};
		self.graph = FilteredGraph::build(data, &self.filters);

		if !self.has_viewport() {
			debug!("topology: viewport is empty, deferring layout");
			return;
		}

		let center = (self.width / 2.0, self.height / 2.0);
		let simulation = Simulation::new(&self.graph, self.profile.forces, center);
		let mut driver = SimulationDriver::new(simulation);
		for (index, node) in self.graph.nodes.iter().enumerate() {
			if let Some(&(x, y)) = pinned.get(&node.id) {
				driver.pin(index, x, y);
			}
		}
		if let Some((id, offset)) = dragged {
			if let Some(index) = self.graph.index_of(&id) {
				if driver.drag_start(index) {
					self.gesture = Gesture::DraggingNode { index, offset };
				}
			}
		}
		let stale = self.stale.clone();
		driver.set_listener(Box::new(move |_| stale.set(true)));

		debug!(
			"topology: layout initialised with {} nodes, {} links ({} pinned)",
			self.graph.nodes.len(),
			self.graph.links.len(),
			pinned.len()
		);
		self.driver = Some(driver);
	}

	/// Advances one animation frame. Returns whether the canvas needs a redraw.
	pub fn frame(&mut self) -> bool {
		if let Some(driver) = self.driver.as_mut() {
			driver.frame();
		}
		self.stale.replace(false)
	}

	/// What to draw for the current positions.
	pub fn scene(&self) -> Scene {
		match &self.driver {
			Some(driver) => Scene::build(
				&self.graph,
				driver.simulation(),
				self.profile.style,
				&self.filters,
			),
			None => Scene::empty(self.profile.style),
		}
	}

	fn node_at_screen(&self, sx: f64, sy: f64) -> Option<usize> {
		let (wx, wy) = self.transform.screen_to_world(sx, sy);
		self.scene().node_at(wx, wy)
	}

	/// Starts a node drag on a glyph, or a pan on the background.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		if self.torn_down {
			return;
		}
		let hit = self.node_at_screen(sx, sy);
		let (wx, wy) = self.transform.screen_to_world(sx, sy);

		if let (Some(index), Some(driver)) = (hit, self.driver.as_mut()) {
			let Some((nx, ny)) = driver.simulation().position(index) else {
				return;
			};
			if driver.drag_start(index) {
				self.gesture = Gesture::DraggingNode {
					index,
					offset: (nx - wx, ny - wy),
				};
			}
		} else {
			self.gesture = Gesture::Panning {
				origin: (sx, sy),
				start: (self.transform.x, self.transform.y),
			};
		}
	}

	/// Moves the dragged node, pans, or updates hover.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		match self.gesture {
			Gesture::DraggingNode { offset, .. } => {
				let (wx, wy) = self.transform.screen_to_world(sx, sy);
				if let Some(driver) = self.driver.as_mut() {
					driver.drag_move(wx + offset.0, wy + offset.1);
				}
			}
			Gesture::Panning { origin, start } => {
				self.transform.x = start.0 + (sx - origin.0);
				self.transform.y = start.1 + (sy - origin.1);
				self.stale.set(true);
			}
			Gesture::Idle => {
				let hovered = self.node_at_screen(sx, sy);
				if hovered != self.hovered {
					self.hovered = hovered;
					self.stale.set(true);
				}
			}
		}
	}

	/// Ends the current gesture; a dragged node stays pinned.
	pub fn pointer_up(&mut self) {
		if matches!(self.gesture, Gesture::DraggingNode { .. }) {
			if let Some(driver) = self.driver.as_mut() {
				driver.drag_end();
			}
		}
		self.gesture = Gesture::Idle;
	}

	/// Ends any gesture and clears hover.
	pub fn pointer_leave(&mut self) {
		self.pointer_up();
		if self.hovered.take().is_some() {
			self.stale.set(true);
		}
	}

	/// Wheel zoom around the pointer. Returns whether the wheel event was
	/// consumed; when it was not, the host should let the page scroll.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) -> bool {
		if !self.wheel_zoom || self.torn_down {
			return false;
		}
		self.transform.wheel(sx, sy, delta_y);
		self.stale.set(true);
		true
	}

	/// Zoom-in button.
	pub fn zoom_in(&mut self) {
		self.transform.step_zoom(true, self.width, self.height);
		self.stale.set(true);
	}

	/// Zoom-out button.
	pub fn zoom_out(&mut self) {
		self.transform.step_zoom(false, self.width, self.height);
		self.stale.set(true);
	}

	/// Tooltip for the hovered node, if any.
	pub fn tooltip(&self) -> Option<Tooltip> {
		let index = self.hovered?;
		let node = self.graph.nodes.get(index)?;
		let (wx, wy) = self.driver.as_ref()?.simulation().position(index)?;
		let (x, y) = self.transform.world_to_screen(wx, wy);
		Some(Tooltip {
			text: tooltip_text(node, self.profile.style),
			x,
			y,
		})
	}

	/// Stops the simulation for good. Safe to call more than once.
	pub fn teardown(&mut self) {
		if self.torn_down {
			return;
		}
		self.torn_down = true;
		if let Some(mut driver) = self.driver.take() {
			driver.stop();
		}
		self.gesture = Gesture::Idle;
		self.hovered = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::topology_graph::interaction::{MAX_ZOOM, MIN_ZOOM};
	use crate::components::topology_graph::simulation::PinState;
	use crate::components::topology_graph::types::{Severity, TopologyLink, TopologyNode};

	fn node(id: &str, kind: &str, namespace: &str) -> TopologyNode {
		TopologyNode {
			id: id.into(),
			name: id.into(),
			kind: kind.into(),
			namespace: namespace.into(),
			severity: Severity::High,
		}
	}

	fn link(source: &str, target: &str) -> TopologyLink {
		TopologyLink {
			source: source.into(),
			target: target.into(),
			suspicious: false,
			traffic: None,
		}
	}

	fn data() -> TopologyData {
		TopologyData {
			nodes: vec![
				node("n1", "node", ""),
				node("p1", "pod", "monitoring"),
				node("p2", "pod", "default"),
				node("s1", "service", "monitoring"),
			],
			links: vec![link("n1", "p1"), link("n1", "p2"), link("p1", "s1")],
			stats: None,
		}
	}

	fn mounted() -> TopologyGraphState {
		let mut state = TopologyGraphState::new(ViewProfile::topology(), TopologyFilters::default());
		state.resize(800.0, 600.0);
		state.set_data(Some(data()));
		state
	}

	fn settled_mount(frames: usize) -> TopologyGraphState {
		let mut state = mounted();
		for _ in 0..frames {
			state.frame();
		}
		state
	}

	fn screen_position(state: &TopologyGraphState, index: usize) -> (f64, f64) {
		let (wx, wy) = state.driver().unwrap().simulation().position(index).unwrap();
		state.transform.world_to_screen(wx, wy)
	}

	#[test]
	fn zero_size_viewport_defers_simulation() {
		let mut state = TopologyGraphState::new(ViewProfile::topology(), TopologyFilters::default());
		state.set_data(Some(data()));

		assert!(state.driver().is_none());
		assert!(state.scene().nodes.is_empty());
		assert_eq!(state.graph().nodes.len(), 4);

		state.resize(640.0, 480.0);
		assert!(state.is_running());
		assert_eq!(state.scene().nodes.len(), 4);
	}

	#[test]
	fn missing_data_renders_empty_scene() {
		let mut state = mounted();
		state.set_data(None);

		let scene = state.scene();
		assert!(scene.nodes.is_empty() && scene.links.is_empty());
	}

	#[test]
	fn namespace_filter_rebuilds_with_cluster_nodes() {
		let mut state = mounted();
		state.set_filters(TopologyFilters {
			namespace: "monitoring".into(),
			..TopologyFilters::default()
		});

		let ids = state.graph().nodes.iter().map(|n| n.id.as_str()).collect::<Vec<_>>();
		assert_eq!(ids, vec!["n1", "p1", "s1"]);
		assert_eq!(state.scene().links.len(), 2);
	}

	#[test]
	fn styling_toggles_keep_the_running_simulation() {
		let mut state = mounted();
		for _ in 0..5 {
			state.frame();
		}
		state.set_filters(TopologyFilters {
			show_labels: false,
			highlight_threats: false,
			..TopologyFilters::default()
		});

		assert_eq!(state.driver().unwrap().ticks(), 5);
		assert!(state.frame());
		assert!(state.scene().nodes.iter().all(|n| n.label.is_none()));
	}

	#[test]
	fn drag_gesture_pins_node_where_dropped() {
		let mut state = mounted();
		let (sx, sy) = screen_position(&state, 1);

		state.pointer_down(sx, sy);
		state.pointer_move(sx + 40.0, sy + 30.0);
		state.frame();
		state.pointer_up();

		let dropped = state.driver().unwrap().simulation().node(1).unwrap().pin;
		let PinState::Pinned { x, y } = dropped else {
			panic!("expected pinned node, got {dropped:?}");
		};
		for _ in 0..400 {
			state.frame();
		}
		assert_eq!(state.driver().unwrap().simulation().position(1), Some((x, y)));
		assert!(!state.is_running());
	}

	#[test]
	fn pinned_positions_survive_data_refresh() {
		let mut state = mounted();
		let (sx, sy) = screen_position(&state, 2);
		state.pointer_down(sx, sy);
		state.pointer_move(sx + 100.0, sy);
		state.frame();
		state.pointer_up();
		let pinned = state.driver().unwrap().simulation().position(2).unwrap();

		state.set_data(Some(data()));
		let sim = state.driver().unwrap().simulation();
		assert_eq!(sim.node(2).unwrap().pin, PinState::Pinned {
			x: pinned.0,
			y: pinned.1
		});
		assert_eq!(sim.node(1).unwrap().pin, PinState::Free);
	}

	#[test]
	fn pinned_node_stays_put_until_the_next_drag() {
		let mut state = settled_mount(30);
		let (sx, sy) = screen_position(&state, 0);
		state.pointer_down(sx, sy);
		state.pointer_up();
		let pinned = state.driver().unwrap().simulation().position(0).unwrap();

		state.pointer_move(sx, sy);
		state.pointer_leave();
		state.wheel(sx, sy, -100.0);
		state.zoom_out();
		state.pointer_down(1.0, 1.0);
		state.pointer_move(60.0, 40.0);
		state.pointer_up();
		for _ in 0..300 {
			state.frame();
		}

		let sim = state.driver().unwrap().simulation();
		assert_eq!(sim.position(0), Some(pinned));
		assert_eq!(sim.node(0).unwrap().pin, PinState::Pinned {
			x: pinned.0,
			y: pinned.1
		});
	}

	#[test]
	fn data_refresh_keeps_an_active_drag() {
		let mut state = settled_mount(30);
		let (sx, sy) = screen_position(&state, 1);
		state.pointer_down(sx, sy);
		state.pointer_move(sx + 10.0, sy + 10.0);
		state.frame();

		state.set_data(Some(data()));
		let driver = state.driver().unwrap();
		assert_eq!(driver.dragging(), Some(1));
		assert!(matches!(
			driver.simulation().node(1).unwrap().pin,
			PinState::Dragging { .. }
		));

		state.pointer_move(sx + 200.0, sy + 200.0);
		state.frame();
		let (x, y) = screen_position(&state, 1);
		assert!((x - (sx + 200.0)).abs() < 1e-6);
		assert!((y - (sy + 200.0)).abs() < 1e-6);

		state.pointer_up();
		assert!(matches!(
			state.driver().unwrap().simulation().node(1).unwrap().pin,
			PinState::Pinned { .. }
		));
	}

	#[test]
	fn drag_ends_when_rebuild_filters_the_node_out() {
		let mut state = settled_mount(30);
		let (sx, sy) = screen_position(&state, 2);
		state.pointer_down(sx, sy);
		state.pointer_move(sx + 10.0, sy);

		state.set_filters(TopologyFilters {
			namespace: "monitoring".into(),
			..TopologyFilters::default()
		});
		assert_eq!(state.driver().unwrap().dragging(), None);

		state.pointer_move(sx + 50.0, sy);
		state.pointer_up();
		assert_eq!(state.driver().unwrap().fixed_positions().count(), 0);
	}

	#[test]
	fn background_drag_pans_without_touching_layout() {
		let mut state = mounted();
		state.pointer_down(5.0, 5.0);
		state.pointer_move(25.0, -5.0);
		state.pointer_up();

		assert_eq!((state.transform.x, state.transform.y), (20.0, -10.0));
		assert_eq!(state.driver().unwrap().dragging(), None);
	}

	#[test]
	fn zoom_controls_clamp() {
		let mut state = mounted();
		for _ in 0..20 {
			state.zoom_in();
		}
		assert_eq!(state.transform.k, MAX_ZOOM);
		for _ in 0..40 {
			state.wheel(10.0, 10.0, 100.0);
		}
		assert_eq!(state.transform.k, MIN_ZOOM);
		assert!(state.frame());
	}

	#[test]
	fn wheel_is_ignored_when_zoom_is_off() {
		let mut state = TopologyGraphState::new(ViewProfile::summary(), TopologyFilters::default())
			.with_wheel_zoom(false);
		state.resize(300.0, 200.0);
		state.set_data(Some(data()));
		state.frame();

		assert!(!state.wheel(150.0, 100.0, -100.0));
		assert_eq!(state.transform, ViewTransform::default());
	}

	#[test]
	fn hover_produces_tooltip() {
		let mut state = mounted();
		let (sx, sy) = screen_position(&state, 1);
		state.pointer_move(sx, sy);

		let tooltip = state.tooltip().unwrap();
		assert_eq!(tooltip.text, "p1 (pod)\nNamespace: monitoring");
		state.pointer_leave();
		assert!(state.tooltip().is_none());
	}

	#[test]
	fn teardown_is_final_and_idempotent() {
		let mut state = mounted();
		state.frame();
		state.teardown();
		state.teardown();

		assert!(state.driver().is_none());
		assert!(!state.frame());
		state.set_data(Some(data()));
		state.resize(100.0, 100.0);
		assert!(state.driver().is_none());
		assert!(!state.frame());
	}
}
