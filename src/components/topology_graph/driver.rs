//! Frame-driven owner of a [`Simulation`].
//!
//! The host calls [`SimulationDriver::frame`] once per animation frame. The
//! driver ticks while running, parks itself once the layout has cooled and no
//! drag is in progress, and is restarted by drag gestures. [`stop`] is
//! terminal: no listener call and no position change happens afterwards.
//!
//! [`stop`]: SimulationDriver::stop

use log::debug;

use super::simulation::{DRAG_ALPHA_TARGET, PinState, Simulation};

/// Callback invoked after every tick.
pub type TickListener = Box<dyn FnMut(&Simulation)>;

/// Lifecycle of a [`SimulationDriver`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
	/// Cooled below the alpha threshold; `frame` is a no-op until restarted.
	Idle,
	/// Ticking once per frame.
	Running,
	/// Torn down. Nothing restarts a stopped driver.
	Stopped,
}

/// Owns a simulation and decides when it ticks.
pub struct SimulationDriver {
	simulation: Simulation,
	state: DriverState,
	listener: Option<TickListener>,
	dragging: Option<usize>,
	ticks: u64,
}

impl SimulationDriver {
	/// Wraps a fresh simulation and starts running immediately.
	pub fn new(simulation: Simulation) -> Self {
		Self {
			simulation,
			state: DriverState::Running,
			listener: None,
			dragging: None,
			ticks: 0,
		}
	}

	/// Installs the per-tick callback. Ignored once stopped.
	pub fn set_listener(&mut self, listener: TickListener) {
		if self.state != DriverState::Stopped {
			self.listener = Some(listener);
		}
	}

	/// Current lifecycle state.
	pub fn state(&self) -> DriverState {
		self.state
	}

	/// True while frames still tick.
	pub fn is_running(&self) -> bool {
		self.state == DriverState::Running
	}

	/// Read access to the physics state.
	pub fn simulation(&self) -> &Simulation {
		&self.simulation
	}

	/// Total ticks executed since construction.
	pub fn ticks(&self) -> u64 {
		self.ticks
	}

	/// Index of the node currently owned by a drag gesture.
	pub fn dragging(&self) -> Option<usize> {
		self.dragging
	}

	/// Runs at most one tick. Returns whether a tick happened.
	pub fn frame(&mut self) -> bool {
		if self.state != DriverState::Running {
			return false;
		}

		self.simulation.tick();
		self.ticks += 1;
		if let Some(listener) = self.listener.as_mut() {
			listener(&self.simulation);
		}

		if self.simulation.is_settled() && self.dragging.is_none() {
			debug!(
				"topology: layout settled after {} ticks (alpha {:.4})",
				self.ticks,
				self.simulation.alpha()
			);
			self.state = DriverState::Idle;
		}
		true
	}

	/// Resumes an idle driver. A stopped driver stays stopped.
	pub fn restart(&mut self) {
		if self.state == DriverState::Idle {
			self.state = DriverState::Running;
		}
	}

	/// Stops ticking for good and drops the listener. Idempotent.
	pub fn stop(&mut self) {
		if self.state == DriverState::Stopped {
			return;
		}
		debug!("topology: simulation stopped after {} ticks", self.ticks);
		self.state = DriverState::Stopped;
		self.listener = None;
		self.dragging = None;
	}

	/// Hands ownership of node `index` to a drag gesture at its current position.
	pub fn drag_start(&mut self, index: usize) -> bool {
		if self.state == DriverState::Stopped {
			return false;
		}
		let Some((x, y)) = self.simulation.position(index) else {
			return false;
		};

		self.simulation.set_pin(index, PinState::Dragging { x, y });
		self.simulation.set_alpha_target(DRAG_ALPHA_TARGET);
		self.dragging = Some(index);
		self.restart();
		true
	}

	/// Moves the dragged node to a world-space position.
	pub fn drag_move(&mut self, x: f64, y: f64) {
		if self.state == DriverState::Stopped {
			return;
		}
		if let Some(index) = self.dragging {
			self.simulation.set_pin(index, PinState::Dragging { x, y });
		}
	}

	/// Ends the gesture; the node stays pinned where it was dropped.
	pub fn drag_end(&mut self) {
		let Some(index) = self.dragging.take() else {
			return;
		};
		if let Some(node) = self.simulation.node(index) {
			let pin = PinState::Pinned { x: node.x, y: node.y };
			self.simulation.set_pin(index, pin);
		}
		self.simulation.set_alpha_target(0.0);
	}

	/// Fixed positions of every dragging or pinned node, by index.
	pub fn fixed_positions(&self) -> impl Iterator<Item = (usize, (f64, f64))> + '_ {
		self.simulation
			.nodes()
			.iter()
			.enumerate()
			.filter_map(|(index, node)| node.pin.fixed_position().map(|pos| (index, pos)))
	}

	/// Pins a node without a gesture, used to carry positions across rebuilds.
	pub fn pin(&mut self, index: usize, x: f64, y: f64) {
		self.simulation.set_pin(index, PinState::Pinned { x, y });
	}
}

impl Drop for SimulationDriver {
	fn drop(&mut self) {
		self.stop();
	}
}
