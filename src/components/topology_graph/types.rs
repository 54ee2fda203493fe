//! Wire-level topology payload shared by the front-end and the mock server.
//!
//! The shape mirrors what the topology endpoints return:
//! `{ nodes: [...], links: [...], stats?: {...} }`. Node kinds travel as free
//! strings on the wire and are only narrowed to [`NodeKind`] during ingestion,
//! so an unexpected kind drops a single node instead of the whole payload.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Wire tag for cluster (worker) nodes.
pub const KIND_CLUSTER_NODE: &str = "node";
/// Wire tag for pods.
pub const KIND_WORKLOAD_UNIT: &str = "pod";
/// Wire tag for services.
pub const KIND_NETWORK_SERVICE: &str = "service";

/// Namespace filter value meaning "no filtering".
pub const ALL_NAMESPACES: &str = "all";

/// The closed set of entity kinds the graph knows how to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
	/// A worker machine in the cluster.
	ClusterNode,
	/// A pod.
	WorkloadUnit,
	/// A service fronting pods.
	NetworkService,
}

impl NodeKind {
	/// Parses a wire tag. Unknown tags yield `None`.
	pub fn from_wire(tag: &str) -> Option<Self> {
		match tag {
			KIND_CLUSTER_NODE => Some(Self::ClusterNode),
			KIND_WORKLOAD_UNIT => Some(Self::WorkloadUnit),
			KIND_NETWORK_SERVICE => Some(Self::NetworkService),
			_ => None,
		}
	}

	/// Tag used for this kind on the wire.
	pub fn wire_tag(self) -> &'static str {
		match self {
			Self::ClusterNode => KIND_CLUSTER_NODE,
			Self::WorkloadUnit => KIND_WORKLOAD_UNIT,
			Self::NetworkService => KIND_NETWORK_SERVICE,
		}
	}
}

/// Threat level attached to a node. Unknown strings deserialize as `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	/// Active compromise or equivalent.
	Critical,
	/// Needs attention soon.
	High,
	/// Worth a look.
	Medium,
	/// Informational finding.
	Low,
	/// No finding.
	#[default]
	#[serde(other)]
	None,
}

impl Severity {
	/// Every severity, most severe first.
	pub const ALL: [Severity; 5] = [
		Severity::Critical,
		Severity::High,
		Severity::Medium,
		Severity::Low,
		Severity::None,
	];
}

/// A node as it appears in the payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopologyNode {
	/// Unique id, referenced by links.
	pub id: String,
	/// Display name.
	#[serde(default)]
	pub name: String,
	/// One of `node`, `pod`, `service`.
	#[serde(rename = "type")]
	pub kind: String,
	/// Owning namespace; empty for cluster nodes.
	#[serde(default)]
	pub namespace: String,
	/// Threat level.
	#[serde(default)]
	pub severity: Severity,
}

impl TopologyNode {
	/// True for worker machines, which ignore namespace filters.
	pub fn is_cluster_node(&self) -> bool {
		self.kind == KIND_CLUSTER_NODE
	}
}

/// An edge as it appears in the payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopologyLink {
	/// Id of the source node.
	pub source: String,
	/// Id of the target node.
	pub target: String,
	/// Flagged by threat detection.
	#[serde(default)]
	pub suspicious: bool,
	/// Whether a traffic marker is drawn at the link midpoint.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub traffic: Option<bool>,
}

impl TopologyLink {
	/// Whether a traffic marker is drawn; absent means no.
	pub fn has_traffic(&self) -> bool {
		self.traffic.unwrap_or(false)
	}
}

/// Summary counters shown next to the graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyStats {
	/// Cluster node count.
	pub nodes: u32,
	/// Pod count.
	pub pods: u32,
	/// Service count.
	pub services: u32,
	/// Link count.
	pub pod_connections: u32,
	/// Links flagged as suspicious.
	pub suspicious_connections: u32,
	/// Nodes with a severity other than `none`.
	pub threat_count: u32,
}

impl TopologyStats {
	/// Recomputes every counter from a node/link set.
	pub fn compute(nodes: &[TopologyNode], links: &[TopologyLink]) -> Self {
		let count_kind = |tag: &str| nodes.iter().filter(|node| node.kind == tag).count() as u32;
		Self {
			nodes: count_kind(KIND_CLUSTER_NODE),
			pods: count_kind(KIND_WORKLOAD_UNIT),
			services: count_kind(KIND_NETWORK_SERVICE),
			pod_connections: links.len() as u32,
			suspicious_connections: links.iter().filter(|link| link.suspicious).count() as u32,
			threat_count: nodes
				.iter()
				.filter(|node| node.severity != Severity::None)
				.count() as u32,
		}
	}
}

/// Complete payload: nodes, links and optional stats.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyData {
	/// Every entity in the payload.
	#[serde(default)]
	pub nodes: Vec<TopologyNode>,
	/// Edges between entities, by id.
	#[serde(default)]
	pub links: Vec<TopologyLink>,
	/// Server-side counters, when sent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub stats: Option<TopologyStats>,
}

impl TopologyData {
	/// True when the payload has no nodes to draw.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Counters sent by the server, or computed from the payload when it
	/// carried none.
	pub fn summary_stats(&self) -> TopologyStats {
		self.stats
			.unwrap_or_else(|| TopologyStats::compute(&self.nodes, &self.links))
	}

	/// Restricts the payload to one namespace.
	///
	/// `None`, an empty string and `"all"` return a clone of the full payload.
	/// Otherwise cluster nodes are always kept, other nodes only when their
	/// namespace matches, links only when both endpoints survive, and stats are
	/// recomputed for the subset.
	pub fn for_namespace(&self, namespace: Option<&str>) -> TopologyData {
		let namespace = match namespace.map(str::trim) {
			None | Some("") | Some(ALL_NAMESPACES) => return self.clone(),
			Some(namespace) => namespace,
		};

		let nodes = self
			.nodes
			.iter()
			.filter(|node| node.is_cluster_node() || node.namespace == namespace)
			.cloned()
			.collect::<Vec<_>>();
		let ids = nodes.iter().map(|node| node.id.as_str()).collect::<HashSet<_>>();
		let links = self
			.links
			.iter()
			.filter(|link| ids.contains(link.source.as_str()) && ids.contains(link.target.as_str()))
			.cloned()
			.collect::<Vec<_>>();
		let stats = TopologyStats::compute(&nodes, &links);

		TopologyData {
			nodes,
			links,
			stats: Some(stats),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: &str, kind: &str, namespace: &str, severity: Severity) -> TopologyNode {
		TopologyNode {
			id: id.into(),
			name: id.into(),
			kind: kind.into(),
			namespace: namespace.into(),
			severity,
		}
	}

	fn link(source: &str, target: &str, suspicious: bool) -> TopologyLink {
		TopologyLink {
			source: source.into(),
			target: target.into(),
			suspicious,
			traffic: None,
		}
	}

	fn sample() -> TopologyData {
		TopologyData {
			nodes: vec![
				node("node-1", "node", "", Severity::None),
				node("pod-1", "pod", "monitoring", Severity::High),
				node("pod-2", "pod", "default", Severity::Critical),
				node("svc-1", "service", "monitoring", Severity::None),
			],
			links: vec![
				link("node-1", "pod-1", false),
				link("node-1", "pod-2", true),
				link("pod-1", "svc-1", true),
				link("pod-2", "svc-1", false),
			],
			stats: None,
		}
	}

	#[test]
	fn parses_payload_with_optional_fields() {
		let json = r#"{
			"nodes": [
				{"id": "a", "name": "worker", "type": "node", "namespace": "default", "severity": "none"},
				{"id": "b", "name": "api", "type": "pod", "severity": "critical"},
				{"id": "c", "name": "odd", "type": "pod", "namespace": "x", "severity": "catastrophic"}
			],
			"links": [
				{"source": "a", "target": "b", "suspicious": true, "traffic": true},
				{"source": "b", "target": "c"}
			]
		}"#;
		let data: TopologyData = serde_json::from_str(json).unwrap();

		assert_eq!(data.nodes.len(), 3);
		assert_eq!(data.nodes[1].namespace, "");
		assert_eq!(data.nodes[1].severity, Severity::Critical);
		assert_eq!(data.nodes[2].severity, Severity::None);
		assert!(data.links[0].has_traffic());
		assert!(!data.links[1].suspicious);
		assert!(!data.links[1].has_traffic());
		assert!(data.stats.is_none());
	}

	#[test]
	fn stats_serialize_in_camel_case() {
		let stats = TopologyStats::compute(&sample().nodes, &sample().links);
		let value = serde_json::to_value(stats).unwrap();

		assert_eq!(value["podConnections"], 4);
		assert_eq!(value["suspiciousConnections"], 2);
		assert_eq!(value["threatCount"], 2);
		assert_eq!(value["nodes"], 1);
		assert_eq!(value["pods"], 2);
		assert_eq!(value["services"], 1);
	}

	#[test]
	fn summary_stats_prefer_server_counters() {
		let mut data = sample();
		let computed = data.summary_stats();
		assert_eq!(computed.pods, 2);
		assert_eq!(computed.pod_connections, 4);
		assert_eq!(computed.threat_count, 2);

		let sent = TopologyStats {
			pod_connections: 847,
			..TopologyStats::default()
		};
		data.stats = Some(sent);
		assert_eq!(data.summary_stats(), sent);
	}

	#[test]
	fn all_namespaces_returns_full_payload() {
		let data = sample();
		assert_eq!(data.for_namespace(None), data);
		assert_eq!(data.for_namespace(Some("all")), data);
		assert_eq!(data.for_namespace(Some("")), data);
	}

	#[test]
	fn namespace_filter_keeps_cluster_nodes_and_prunes_links() {
		let filtered = sample().for_namespace(Some("monitoring"));
		let ids = filtered.nodes.iter().map(|n| n.id.as_str()).collect::<Vec<_>>();

		assert_eq!(ids, vec!["node-1", "pod-1", "svc-1"]);
		assert_eq!(filtered.links.len(), 2);
		assert!(
			filtered
				.links
				.iter()
				.all(|l| l.source != "pod-2" && l.target != "pod-2")
		);

		let stats = filtered.stats.unwrap();
		assert_eq!(stats.nodes, 1);
		assert_eq!(stats.pods, 1);
		assert_eq!(stats.services, 1);
		assert_eq!(stats.pod_connections, 2);
		assert_eq!(stats.suspicious_connections, 1);
		assert_eq!(stats.threat_count, 1);
	}

	#[test]
	fn unknown_namespace_keeps_only_cluster_nodes() {
		let filtered = sample().for_namespace(Some("storage"));
		assert_eq!(filtered.nodes.len(), 1);
		assert!(filtered.links.is_empty());
	}

	#[test]
	fn node_kind_round_trips_wire_tags() {
		for kind in [
			NodeKind::ClusterNode,
			NodeKind::WorkloadUnit,
			NodeKind::NetworkService,
		] {
			assert_eq!(NodeKind::from_wire(kind.wire_tag()), Some(kind));
		}
		assert_eq!(NodeKind::from_wire("deployment"), None);
	}
}
