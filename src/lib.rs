//! kube-topology: force-directed cluster topology graph for a Kubernetes
//! security dashboard.
//!
//! The crate provides a WASM canvas component that lays out cluster nodes,
//! pods and services with a physics simulation, supports drag-to-pin, pan and
//! zoom, and colours workloads by threat severity. The wire types and the
//! namespace filter are shared with the mock topology server.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info};

use crate::pages::{ClusterMapCard, TopologyPage};

pub mod api;
pub mod components;
pub mod config;
pub mod pages;

pub use components::topology_graph::{
	TopologyCanvas, TopologyData, TopologyFilters, TopologyLink, TopologyNode, TopologyStats,
	ViewProfile,
};
pub use config::AppConfig;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("kube-topology: logging initialized");
}

/// Main application component: the dashboard cluster map card above the
/// full topology view.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = AppConfig::load();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Cluster Topology" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<main class="dashboard">
			<ClusterMapCard config=config.clone() />
			<TopologyPage config=config />
			<p class="subtitle">
				"Drag nodes to pin them in place. Scroll the topology view to zoom. Drag the background to pan."
			</p>
		</main>
	}
}
