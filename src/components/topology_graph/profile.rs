//! Per-view engine tuning: force constants plus the styling table to use.

use super::simulation::ForceSettings;
use super::theme::ViewStyle;

const CHARGE_STRENGTH: f64 = -200.0;

/// Styling table and force constants for one view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewProfile {
	/// Which styling table to draw with.
	pub style: ViewStyle,
	/// Force constants for the layout.
	pub forces: ForceSettings,
}

impl ViewProfile {
	/// Full topology page.
	pub fn topology() -> Self {
		Self {
			style: ViewStyle::Topology,
			forces: ForceSettings {
				link_distance: 80.0,
				charge_strength: CHARGE_STRENGTH,
				collide_radius: Some(30.0),
			},
		}
	}

	/// Dashboard cluster map card. Tighter links and no collision force.
	pub fn summary() -> Self {
		Self {
			style: ViewStyle::Summary,
			forces: ForceSettings {
				link_distance: 70.0,
				charge_strength: CHARGE_STRENGTH,
				collide_radius: None,
			},
		}
	}
}

impl Default for ViewProfile {
	fn default() -> Self {
		Self::topology()
	}
}
