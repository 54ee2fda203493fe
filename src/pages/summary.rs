//! Dashboard "Cluster Map" card: a compact, read-only topology preview.

use leptos::prelude::*;
use leptos::task::spawn_local;

use super::{StatTile, poll_every};
use crate::api::{fetch_summary, or_no_data};
use crate::components::topology_graph::{TopologyCanvas, TopologyData, TopologyStats, ViewProfile};
use crate::config::AppConfig;

const FALLBACK_STATS: TopologyStats = TopologyStats {
	nodes: 12,
	pods: 0,
	services: 28,
	pod_connections: 847,
	suspicious_connections: 6,
	threat_count: 0,
};

/// Dashboard card with a compact cluster map and connection counters.
#[component]
pub fn ClusterMapCard(config: AppConfig) -> impl IntoView {
	let data = RwSignal::new(None::<TopologyData>);
	let refresh = poll_every(config.summary_poll_secs);

	Effect::new(move |_| {
		refresh.track();
		let config = config.clone();
		spawn_local(async move {
			let payload = or_no_data(fetch_summary(&config).await);
			let _ = data.try_set(payload);
		});
	});

	let stats = Memo::new(move |_| {
		data.with(|payload| payload.as_ref().map(TopologyData::summary_stats))
			.unwrap_or(FALLBACK_STATS)
	});

	view! {
		<section class="cluster-map-card">
			<h3>"Cluster Map"</h3>
			<div class="cluster-map-graph" style="height: 260px;">
				<TopologyCanvas data=data profile=ViewProfile::summary() />
			</div>
			<div class="cluster-map-stats">
				<StatTile label="Pod Connections" value=Signal::derive(move || stats.get().pod_connections) />
				<StatTile
					label="Suspicious"
					value=Signal::derive(move || stats.get().suspicious_connections)
				/>
				<StatTile label="Nodes" value=Signal::derive(move || stats.get().nodes) />
				<StatTile label="Services" value=Signal::derive(move || stats.get().services) />
			</div>
		</section>
	}
}
