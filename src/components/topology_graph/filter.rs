//! Ingestion of the wire payload into the filtered node/link set the engine
//! simulates and draws.
//!
//! Links are resolved to node indices here. Anything that does not resolve
//! against the *filtered* node set is excluded, so the renderer never sees a
//! dangling or hidden endpoint.

use std::collections::HashMap;

use log::debug;

use super::types::{ALL_NAMESPACES, NodeKind, Severity, TopologyData};

/// Live show/hide filters controlled by the toolbar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopologyFilters {
	/// Show pods.
	pub show_workload_units: bool,
	/// Show services.
	pub show_services: bool,
	/// Draw node names next to glyphs.
	pub show_labels: bool,
	/// Color pods and suspicious links by severity.
	pub highlight_threats: bool,
	/// `"all"` or a namespace name.
	pub namespace: String,
}

impl Default for TopologyFilters {
	fn default() -> Self {
		Self {
			show_workload_units: true,
			show_services: true,
			show_labels: true,
			highlight_threats: true,
			namespace: ALL_NAMESPACES.to_string(),
		}
	}
}

impl TopologyFilters {
	/// The selected namespace, or `None` when every namespace is shown.
	pub fn namespace(&self) -> Option<&str> {
		let namespace = self.namespace.trim();
		if namespace.is_empty() || namespace == ALL_NAMESPACES {
			None
		} else {
			Some(namespace)
		}
	}

	/// Whether a node of this kind and namespace survives filtering.
	pub fn admits(&self, kind: NodeKind, namespace: &str) -> bool {
		let kind_visible = match kind {
			NodeKind::ClusterNode => true,
			NodeKind::WorkloadUnit => self.show_workload_units,
			NodeKind::NetworkService => self.show_services,
		};
		if !kind_visible {
			return false;
		}

		match (kind, self.namespace()) {
			(_, None) | (NodeKind::ClusterNode, _) => true,
			(_, Some(selected)) => namespace == selected,
		}
	}

	/// True when a change from `other` requires rebuilding the simulation.
	/// Label and highlight toggles only affect styling.
	pub fn changes_node_set(&self, other: &TopologyFilters) -> bool {
		self.show_workload_units != other.show_workload_units
			|| self.show_services != other.show_services
			|| self.namespace() != other.namespace()
	}
}

/// A node that survived ingestion and filtering.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	/// Id from the payload.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Narrowed entity kind.
	pub kind: NodeKind,
	/// Owning namespace.
	pub namespace: String,
	/// Threat level.
	pub severity: Severity,
}

/// A link with both endpoints resolved to indices into [`FilteredGraph::nodes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphLink {
	/// Index of the source node.
	pub source: usize,
	/// Index of the target node.
	pub target: usize,
	/// Flagged by threat detection.
	pub suspicious: bool,
	/// Draw a midpoint traffic marker.
	pub has_traffic: bool,
}

/// The node/link set after filtering, ready for simulation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilteredGraph {
	/// Surviving nodes; indices are stable for one build.
	pub nodes: Vec<GraphNode>,
	/// Links whose endpoints both survived.
	pub links: Vec<GraphLink>,
}

impl FilteredGraph {
	/// Narrows kinds, applies the filters and resolves links to indices.
	pub fn build(data: &TopologyData, filters: &TopologyFilters) -> Self {
		let mut nodes = Vec::with_capacity(data.nodes.len());
		let mut index_by_id: HashMap<&str, usize> = HashMap::with_capacity(data.nodes.len());

		for raw in &data.nodes {
			let Some(kind) = NodeKind::from_wire(&raw.kind) else {
				debug!("topology: skipping node {} with unknown type {:?}", raw.id, raw.kind);
				continue;
			};
			if !filters.admits(kind, &raw.namespace) {
				continue;
			}
			if index_by_id.contains_key(raw.id.as_str()) {
				debug!("topology: skipping duplicate node id {}", raw.id);
				continue;
			}

			index_by_id.insert(raw.id.as_str(), nodes.len());
			nodes.push(GraphNode {
				id: raw.id.clone(),
				name: raw.name.clone(),
				kind,
				namespace: raw.namespace.clone(),
				severity: raw.severity,
			});
		}

		let mut dropped = 0usize;
		let links = data
			.links
			.iter()
			.filter_map(|link| {
				match (
					index_by_id.get(link.source.as_str()),
					index_by_id.get(link.target.as_str()),
				) {
					(Some(&source), Some(&target)) => Some(GraphLink {
						source,
						target,
						suspicious: link.suspicious,
						has_traffic: link.has_traffic(),
					}),
					_ => {
						dropped += 1;
						None
					}
				}
			})
			.collect::<Vec<_>>();

		if dropped > 0 {
			debug!("topology: excluded {dropped} links with endpoints outside the filtered set");
		}

		Self { nodes, links }
	}

	/// Position of the node with `id` in [`Self::nodes`].
	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.nodes.iter().position(|node| node.id == id)
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;
	use crate::components::topology_graph::types::{TopologyLink, TopologyNode};

	fn node(id: &str, kind: &str, namespace: &str) -> TopologyNode {
		TopologyNode {
			id: id.into(),
			name: id.into(),
			kind: kind.into(),
			namespace: namespace.into(),
			severity: Severity::None,
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

	fn cluster() -> TopologyData {
		TopologyData {
			nodes: vec![
				node("n1", "node", ""),
				node("n2", "node", ""),
				node("p1", "pod", "monitoring"),
				node("p2", "pod", "default"),
				node("p3", "pod", "monitoring"),
				node("s1", "service", "monitoring"),
				node("s2", "service", "default"),
			],
			links: vec![
				link("n1", "p1"),
				link("n1", "p2"),
				link("n2", "p3"),
				link("p1", "s1"),
				link("p2", "s2"),
				link("p3", "p2"),
				link("p1", "ghost"),
			],
			stats: None,
		}
	}

	fn rendered_pairs(graph: &FilteredGraph) -> HashSet<(String, String)> {
		graph
			.links
			.iter()
			.map(|l| (graph.nodes[l.source].id.clone(), graph.nodes[l.target].id.clone()))
			.collect()
	}

	fn expected_pairs(data: &TopologyData, graph: &FilteredGraph) -> HashSet<(String, String)> {
		let ids = graph.nodes.iter().map(|n| n.id.as_str()).collect::<HashSet<_>>();
		data.links
			.iter()
			.filter(|l| ids.contains(l.source.as_str()) && ids.contains(l.target.as_str()))
			.map(|l| (l.source.clone(), l.target.clone()))
			.collect()
	}

	#[test]
	fn rendered_links_are_exactly_those_with_both_endpoints_visible() {
		let data = cluster();
		let mut variants = Vec::new();
		for show_workload_units in [true, false] {
			for show_services in [true, false] {
				for namespace in ["all", "monitoring", "default", "storage"] {
					variants.push(TopologyFilters {
						show_workload_units,
						show_services,
						namespace: namespace.to_string(),
						..TopologyFilters::default()
					});
				}
			}
		}

		for filters in variants {
			let graph = FilteredGraph::build(&data, &filters);
			assert_eq!(
				rendered_pairs(&graph),
				expected_pairs(&data, &graph),
				"filters: {filters:?}"
			);
		}
	}

	#[test]
	fn namespace_filter_keeps_every_cluster_node() {
		let filters = TopologyFilters {
			namespace: "monitoring".into(),
			..TopologyFilters::default()
		};
		let graph = FilteredGraph::build(&cluster(), &filters);
		let ids = graph.nodes.iter().map(|n| n.id.as_str()).collect::<Vec<_>>();

		assert_eq!(ids, vec!["n1", "n2", "p1", "p3", "s1"]);
		assert_eq!(graph.links.len(), 3);
	}

	#[test]
	fn hiding_pods_drops_their_links() {
		let filters = TopologyFilters {
			show_workload_units: false,
			..TopologyFilters::default()
		};
		let graph = FilteredGraph::build(&cluster(), &filters);

		assert!(graph.nodes.iter().all(|n| n.kind != NodeKind::WorkloadUnit));
		assert!(graph.links.is_empty());
	}

	#[test]
	fn dangling_only_link_renders_nothing() {
		let data = TopologyData {
			nodes: vec![node("a", "node", "")],
			links: vec![link("a", "x")],
			stats: None,
		};
		let graph = FilteredGraph::build(&data, &TopologyFilters::default());

		assert_eq!(graph.nodes.len(), 1);
		assert!(graph.links.is_empty());
	}

	#[test]
	fn unknown_kinds_and_duplicates_are_skipped() {
		let data = TopologyData {
			nodes: vec![
				node("a", "node", ""),
				node("a", "pod", "default"),
				node("d", "deployment", "default"),
			],
			links: vec![link("a", "d")],
			stats: None,
		};
		let graph = FilteredGraph::build(&data, &TopologyFilters::default());

		assert_eq!(graph.nodes.len(), 1);
		assert_eq!(graph.nodes[0].kind, NodeKind::ClusterNode);
		assert!(graph.links.is_empty());
	}

	#[test]
	fn styling_toggles_do_not_change_node_set() {
		let base = TopologyFilters::default();
		let styled = TopologyFilters {
			show_labels: false,
			highlight_threats: false,
			..TopologyFilters::default()
		};
		let scoped = TopologyFilters {
			namespace: "default".into(),
			..TopologyFilters::default()
		};

		assert!(!base.changes_node_set(&styled));
		assert!(base.changes_node_set(&scoped));
	}
}
