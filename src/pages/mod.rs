//! Dashboard views hosting the topology canvas.

mod summary;
mod topology;

use gloo::timers::callback::Interval;
use leptos::prelude::*;

pub use summary::ClusterMapCard;
pub use topology::TopologyPage;

/// Bumps the returned counter every `secs` seconds until the owner is
/// cleaned up. Effects that read it re-run on each bump.
fn poll_every(secs: u32) -> ReadSignal<u64> {
	let (tick, set_tick) = signal(0u64);
	let interval = Interval::new(secs.saturating_mul(1_000), move || {
		set_tick.try_update(|n| *n += 1);
	});
	let interval = StoredValue::new_local(Some(interval));
	on_cleanup(move || {
		interval.try_update_value(|slot| slot.take().map(Interval::cancel));
	});
	tick
}

/// One labelled counter tile.
#[component]
fn StatTile(label: &'static str, #[prop(into)] value: Signal<u32>) -> impl IntoView {
	view! {
		<div class="stat-tile">
			<span class="stat-value">{move || value.get()}</span>
			<span class="stat-label">{label}</span>
		</div>
	}
}
