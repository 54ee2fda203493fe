//! Force-directed cluster topology graph.
//!
//! Renders cluster nodes, pods and services on an HTML canvas with:
//! - A d3-style force simulation (links, many-body charge, centering,
//!   collision) cooled by alpha until the layout settles
//! - Drag-to-pin, pan and clamped zoom
//! - Live kind/namespace filters and severity-based styling
//!
//! Everything below [`component`] is headless and unit tested natively.
//!
//! # Example
//!
//! ```ignore
//! use kube_topology::components::topology_graph::{TopologyCanvas, TopologyFilters, ViewProfile};
//!
//! let (data, set_data) = signal(None::<TopologyData>);
//! let filters = RwSignal::new(TopologyFilters::default());
//!
//! view! { <TopologyCanvas data=data filters=filters profile=ViewProfile::topology() /> }
//! ```

pub mod component;
pub mod driver;
pub mod filter;
pub mod interaction;
pub mod profile;
mod quadtree;
mod render;
pub mod scene;
pub mod simulation;
pub mod state;
pub mod theme;
pub mod types;

pub use component::TopologyCanvas;
pub use filter::{FilteredGraph, TopologyFilters};
pub use profile::ViewProfile;
pub use state::TopologyGraphState;
pub use types::{NodeKind, Severity, TopologyData, TopologyLink, TopologyNode, TopologyStats};
