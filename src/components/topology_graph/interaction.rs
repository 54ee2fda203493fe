//! Pan/zoom transform and pointer gesture tracking.
//!
//! The transform maps world coordinates (simulation space) to screen
//! coordinates: `screen = world * k + (x, y)`. It is independent of the
//! simulation, so zooming or panning never reheats the layout.

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.5;
/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 2.0;
/// Zoom change per zoom-in/zoom-out button press.
pub const ZOOM_STEP: f64 = 0.2;

const WHEEL_ZOOM_IN: f64 = 1.1;
const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Pan and zoom transform applied to the whole scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal translation in screen pixels.
	pub x: f64,
	/// Vertical translation in screen pixels.
	pub y: f64,
	/// Zoom factor, clamped to `MIN_ZOOM..=MAX_ZOOM`.
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
	/// Inverse of [`Self::world_to_screen`].
	pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Maps a simulation position to canvas pixels.
	pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
		(wx * self.k + self.x, wy * self.k + self.y)
	}

	/// Sets the zoom factor while keeping the world point under the screen
	/// point `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, k: f64) {
		let k = k.clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = k;
	}

	/// Button zoom: one step in or out around the viewport center.
	pub fn step_zoom(&mut self, zoom_in: bool, width: f64, height: f64) {
		let k = if zoom_in {
			self.k + ZOOM_STEP
		} else {
			self.k - ZOOM_STEP
		};
		self.zoom_at(width / 2.0, height / 2.0, k);
	}

	/// Wheel zoom around the pointer. Positive `delta_y` zooms out.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 {
			WHEEL_ZOOM_OUT
		} else {
			WHEEL_ZOOM_IN
		};
		self.zoom_at(sx, sy, self.k * factor);
	}
}

/// What the pointer is currently doing on the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Gesture {
	/// No button held.
	#[default]
	Idle,
	/// A node drag.
	DraggingNode {
		/// Index of the dragged node.
		index: usize,
		/// Keeps the grab point under the pointer.
		offset: (f64, f64),
	},
	/// A background pan.
	Panning {
		/// Pointer position where the pan started, in screen space.
		origin: (f64, f64),
		/// Transform translation at that time.
		start: (f64, f64),
	},
}

#[cfg(test)]
mod tests {
	use super::*;

	fn in_range(t: &ViewTransform) -> bool {
		(MIN_ZOOM..=MAX_ZOOM).contains(&t.k)
	}

	#[test]
	fn zoom_stays_clamped_for_any_sequence() {
		let mut t = ViewTransform::default();
		// A fixed pseudo-random walk over every zoom operation.
		let mut seed = 7u32;
		for _ in 0..2_000 {
			seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
			match (seed >> 16) % 4 {
				0 => t.step_zoom(true, 800.0, 600.0),
				1 => t.step_zoom(false, 800.0, 600.0),
				2 => t.wheel(f64::from(seed % 800), f64::from(seed % 600), -1.0),
				_ => t.wheel(f64::from(seed % 800), f64::from(seed % 600), 1.0),
			}
			assert!(in_range(&t), "k = {}", t.k);
		}
	}

	#[test]
	fn button_steps_clamp_at_bounds() {
		let mut t = ViewTransform::default();
		for _ in 0..10 {
			t.step_zoom(true, 800.0, 600.0);
		}
		assert_eq!(t.k, MAX_ZOOM);
		for _ in 0..20 {
			t.step_zoom(false, 800.0, 600.0);
		}
		assert_eq!(t.k, MIN_ZOOM);
	}

	#[test]
	fn zoom_keeps_anchor_point_fixed() {
		let mut t = ViewTransform {
			x: 40.0,
			y: -10.0,
			k: 1.0,
		};
		let before = t.screen_to_world(300.0, 200.0);
		t.wheel(300.0, 200.0, -120.0);
		let after = t.screen_to_world(300.0, 200.0);

		assert!((t.k - 1.1).abs() < 1e-12);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);
	}

	#[test]
	fn screen_world_round_trip() {
		let t = ViewTransform {
			x: 12.0,
			y: 34.0,
			k: 1.6,
		};
		let (wx, wy) = t.screen_to_world(100.0, 50.0);
		let (sx, sy) = t.world_to_screen(wx, wy);
		assert!((sx - 100.0).abs() < 1e-9 && (sy - 50.0).abs() < 1e-9);
	}
}
