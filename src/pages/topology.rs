//! Full topology view: toolbar, stats and the interactive canvas.

use leptos::prelude::*;
use leptos::task::spawn_local;

use super::{StatTile, poll_every};
use crate::api::{fetch_topology, or_no_data};
use crate::components::topology_graph::types::ALL_NAMESPACES;
use crate::components::topology_graph::{
	TopologyCanvas, TopologyData, TopologyFilters, TopologyStats, ViewProfile,
};
use crate::config::AppConfig;

const NAMESPACES: [(&str, &str); 5] = [
	(ALL_NAMESPACES, "All Namespaces"),
	("default", "default"),
	("kube-system", "kube-system"),
	("monitoring", "monitoring"),
	("storage", "storage"),
];

/// Counters shown while the backend has not answered.
const FALLBACK_STATS: TopologyStats = TopologyStats {
	nodes: 12,
	pods: 86,
	services: 28,
	pod_connections: 0,
	suspicious_connections: 0,
	threat_count: 12,
};

#[component]
fn FilterToggle(label: &'static str, checked: Signal<bool>, on_toggle: Callback<bool>) -> impl IntoView {
	view! {
		<label class="filter-toggle">
			<input
				type="checkbox"
				prop:checked=move || checked.get()
				on:change=move |ev| on_toggle.run(event_target_checked(&ev))
			/>
			{label}
		</label>
	}
}

/// Full topology view with namespace and kind filters.
#[component]
pub fn TopologyPage(config: AppConfig) -> impl IntoView {
	let filters = RwSignal::new(TopologyFilters::default());
	let data = RwSignal::new(None::<TopologyData>);
	let refresh = poll_every(config.topology_poll_secs);

	let namespace = Memo::new(move |_| filters.with(|f| f.namespace.clone()));
	Effect::new(move |_| {
		refresh.track();
		let requested = namespace.get();
		let config = config.clone();
		spawn_local(async move {
			let payload = or_no_data(fetch_topology(&config, &requested).await);
			// Drop answers for a namespace the user already switched away from.
			if namespace.try_get_untracked().as_deref() == Some(requested.as_str()) {
				let _ = data.try_set(payload);
			}
		});
	});

	let stats = Memo::new(move |_| {
		data.with(|payload| payload.as_ref().map(TopologyData::summary_stats))
			.unwrap_or(FALLBACK_STATS)
	});

	let toggle = move |update: fn(&mut TopologyFilters, bool)| {
		Callback::new(move |on: bool| filters.update(|f| update(f, on)))
	};

	view! {
		<section class="topology-page">
			<header class="topology-toolbar">
				<h2>"Cluster Topology"</h2>
				<select
					class="namespace-select"
					on:change=move |ev| {
						let selected = event_target_value(&ev);
						filters.update(|f| f.namespace = selected);
					}
				>
					{NAMESPACES
						.iter()
						.map(|&(value, label)| {
							view! {
								<option value=value selected=move || namespace.get() == value>
									{label}
								</option>
							}
						})
						.collect_view()}
				</select>
				<FilterToggle
					label="Pods"
					checked=Signal::derive(move || filters.with(|f| f.show_workload_units))
					on_toggle=toggle(|f, on| f.show_workload_units = on)
				/>
				<FilterToggle
					label="Services"
					checked=Signal::derive(move || filters.with(|f| f.show_services))
					on_toggle=toggle(|f, on| f.show_services = on)
				/>
				<FilterToggle
					label="Labels"
					checked=Signal::derive(move || filters.with(|f| f.show_labels))
					on_toggle=toggle(|f, on| f.show_labels = on)
				/>
				<FilterToggle
					label="Highlight Threats"
					checked=Signal::derive(move || filters.with(|f| f.highlight_threats))
					on_toggle=toggle(|f, on| f.highlight_threats = on)
				/>
			</header>

			<div class="topology-stats">
				<StatTile label="Nodes" value=Signal::derive(move || stats.get().nodes) />
				<StatTile label="Pods" value=Signal::derive(move || stats.get().pods) />
				<StatTile label="Services" value=Signal::derive(move || stats.get().services) />
				<StatTile label="Threats" value=Signal::derive(move || stats.get().threat_count) />
			</div>

			<div class="topology-graph" style="height: 600px;">
				<TopologyCanvas
					data=data
					filters=filters
					profile=ViewProfile::topology()
					show_zoom_controls=true
				/>
			</div>
		</section>
	}
}
