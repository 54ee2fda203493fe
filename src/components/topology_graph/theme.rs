//! Severity-based styling lookups for the topology canvas.
//!
//! Every visual decision is a pure function of the view, the node kind, the
//! severity and the highlight toggle, so styling is deterministic and can be
//! tested without a canvas.

use super::types::{NodeKind, Severity};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity from 0 to 1.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Same color at another opacity.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// CSS color string for canvas styles.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Cluster nodes and default traffic markers.
pub const ACCENT: Color = Color::rgb(0x6D, 0x28, 0xD9);
/// Services.
pub const TEAL: Color = Color::rgb(0x14, 0xB8, 0xA6);
/// Pods without a highlighted severity.
pub const INFO_BLUE: Color = Color::rgb(0x3B, 0x82, 0xF6);
/// Critical severity and topology alerts.
pub const CRITICAL_RED: Color = Color::rgb(0xEF, 0x44, 0x44);
/// High severity and summary alerts.
pub const HIGH_ORANGE: Color = Color::rgb(0xF9, 0x73, 0x16);
/// Medium severity.
pub const MEDIUM_YELLOW: Color = Color::rgb(0xFA, 0xCC, 0x15);
/// Low severity.
pub const LOW_GREEN: Color = Color::rgb(0x22, 0xC5, 0x5E);
/// Outline around every glyph.
pub const NODE_STROKE: Color = Color::rgb(0x1E, 0x1E, 0x1E);
/// Links that are not highlighted.
pub const LINK_NEUTRAL: Color = Color::rgb(0x4B, 0x55, 0x63);
/// Node label text.
pub const LABEL_TEXT: Color = Color::rgb(0xE5, 0xE7, 0xEB);

/// Outline width in world units.
pub const NODE_STROKE_WIDTH: f64 = 1.5;
/// Opacity of every link.
pub const LINK_OPACITY: f64 = 0.6;
/// Radius of the midpoint traffic marker.
pub const TRAFFIC_MARKER_RADIUS: f64 = 3.0;
/// Opacity of the midpoint traffic marker.
pub const TRAFFIC_MARKER_OPACITY: f64 = 0.8;

/// Fill for each severity; `None` resolves per view.
fn severity_fill(severity: Severity, none: Color) -> Color {
	match severity {
		Severity::Critical => CRITICAL_RED,
		Severity::High => HIGH_ORANGE,
		Severity::Medium => MEDIUM_YELLOW,
		Severity::Low => LOW_GREEN,
		Severity::None => none,
	}
}

/// Geometry of a node glyph, centered on the node position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeShape {
	/// Square with rounded corners, `size` wide.
	RoundedSquare {
		/// Edge length.
		size: f64,
		/// Corner arc radius.
		corner_radius: f64,
	},
	/// Circle of `radius`.
	Circle {
		/// Radius in world units.
		radius: f64,
	},
	/// Triangle with vertices relative to the node center.
	Triangle {
		/// Vertex offsets.
		points: [(f64, f64); 3],
	},
}

impl NodeShape {
	/// Radius used for pointer hit-testing.
	pub fn hit_radius(self) -> f64 {
		match self {
			NodeShape::RoundedSquare { size, .. } => size / 2.0,
			NodeShape::Circle { radius } => radius,
			NodeShape::Triangle { points } => points
				.iter()
				.map(|(x, y)| (x * x + y * y).sqrt())
				.fold(0.0, f64::max),
		}
	}
}

/// Resolved glyph style.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
	/// Glyph geometry.
	pub shape: NodeShape,
	/// Fill color.
	pub fill: Color,
	/// Outline color.
	pub stroke: Color,
	/// Outline width.
	pub stroke_width: f64,
}

/// Resolved link stroke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkStyle {
	/// Color.
	pub color: Color,
	/// Stroke width in world units.
	pub width: f64,
	/// Opacity from 0 to 1.
	pub opacity: f64,
}

/// Resolved traffic marker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerStyle {
	/// Radius in world units.
	pub radius: f64,
	/// Color.
	pub color: Color,
	/// Opacity from 0 to 1.
	pub opacity: f64,
}

/// Resolved label text style.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelStyle {
	/// Offset from the node center.
	pub offset: (f64, f64),
	/// Color.
	pub color: Color,
	/// Font size in pixels.
	pub font_px: f64,
}

impl LabelStyle {
	/// Canvas `font` value.
	pub fn css_font(&self) -> String {
		format!("{}px sans-serif", self.font_px)
	}
}

/// Which of the two graph presentations is being styled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewStyle {
	/// Full topology page: kind-specific glyphs, traffic markers.
	Topology,
	/// Dashboard card: severity-colored circles only.
	Summary,
}

impl ViewStyle {
	/// Color for suspicious links when threats are highlighted.
	pub fn alert_color(self) -> Color {
		match self {
			ViewStyle::Topology => CRITICAL_RED,
			ViewStyle::Summary => HIGH_ORANGE,
		}
	}

	/// Fill for a node; pods follow severity only while threats are highlighted.
	pub fn node_fill(self, kind: NodeKind, severity: Severity, highlight_threats: bool) -> Color {
		match self {
			ViewStyle::Topology => match kind {
				NodeKind::ClusterNode => ACCENT,
				NodeKind::NetworkService => TEAL,
				NodeKind::WorkloadUnit if highlight_threats => severity_fill(severity, INFO_BLUE),
				NodeKind::WorkloadUnit => INFO_BLUE,
			},
			ViewStyle::Summary => severity_fill(severity, ACCENT),
		}
	}

	/// Glyph geometry for a node kind.
	pub fn node_shape(self, kind: NodeKind) -> NodeShape {
		match (self, kind) {
			(ViewStyle::Topology, NodeKind::ClusterNode) => NodeShape::RoundedSquare {
				size: 20.0,
				corner_radius: 3.0,
			},
			(ViewStyle::Topology, NodeKind::WorkloadUnit) => NodeShape::Circle { radius: 6.0 },
			(ViewStyle::Topology, NodeKind::NetworkService) => NodeShape::Triangle {
				points: [(0.0, -8.0), (7.0, 4.0), (-7.0, 4.0)],
			},
			(ViewStyle::Summary, NodeKind::ClusterNode) => NodeShape::Circle { radius: 10.0 },
			(ViewStyle::Summary, NodeKind::NetworkService) => NodeShape::Circle { radius: 7.0 },
			(ViewStyle::Summary, NodeKind::WorkloadUnit) => NodeShape::Circle { radius: 6.0 },
		}
	}

	/// Full glyph style for a node.
	pub fn node_style(self, kind: NodeKind, severity: Severity, highlight_threats: bool) -> NodeStyle {
		NodeStyle {
			shape: self.node_shape(kind),
			fill: self.node_fill(kind, severity, highlight_threats),
			stroke: NODE_STROKE,
			stroke_width: NODE_STROKE_WIDTH,
		}
	}

	/// Stroke for a link.
	pub fn link_style(self, suspicious: bool, highlight_threats: bool) -> LinkStyle {
		let (color, width) = if suspicious && highlight_threats {
			(self.alert_color(), 2.0)
		} else {
			(LINK_NEUTRAL, 1.0)
		};
		LinkStyle {
			color,
			width,
			opacity: LINK_OPACITY,
		}
	}

	/// Midpoint marker for links that carry traffic. The summary card draws none.
	pub fn traffic_marker(self, suspicious: bool, highlight_threats: bool) -> Option<MarkerStyle> {
		match self {
			ViewStyle::Summary => None,
			ViewStyle::Topology => Some(MarkerStyle {
				radius: TRAFFIC_MARKER_RADIUS,
				color: if suspicious && highlight_threats {
					self.alert_color()
				} else {
					ACCENT
				},
				opacity: TRAFFIC_MARKER_OPACITY,
			}),
		}
	}

	/// Label text style for the view.
	pub fn label_style(self) -> LabelStyle {
		LabelStyle {
			offset: (12.0, 4.0),
			color: LABEL_TEXT,
			font_px: match self {
				ViewStyle::Topology => 10.0,
				ViewStyle::Summary => 8.0,
			},
		}
	}

	/// Whether tooltips mention the node's namespace.
	pub fn tooltip_shows_namespace(self) -> bool {
		self == ViewStyle::Topology
	}
}
