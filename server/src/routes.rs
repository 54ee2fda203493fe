//! HTTP handlers for the topology endpoints.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use kube_topology::TopologyData;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{error, info};

use crate::source::{SourceError, TopologySource};

#[derive(Clone)]
pub struct AppState {
	pub source: Arc<dyn TopologySource>,
}

#[derive(Debug, Error)]
pub enum ApiError {
	#[error(transparent)]
	Source(#[from] SourceError),
	#[error("topology worker failed: {0}")]
	Worker(#[from] JoinError),
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		error!(error = %self, "topology request failed");
		(
			StatusCode::INTERNAL_SERVER_ERROR,
			Json(json!({ "message": "Failed to fetch topology data" })),
		)
			.into_response()
	}
}

#[derive(Debug, Default, Deserialize)]
pub struct TopologyQuery {
	pub namespace: Option<String>,
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/api/topology", get(topology))
		.route("/api/dashboard/topology", get(dashboard_topology))
		.route("/api/health", get(health))
		.with_state(state)
}

async fn load(state: &AppState) -> Result<Arc<TopologyData>, ApiError> {
	let source = state.source.clone();
	Ok(tokio::task::spawn_blocking(move || source.topology()).await??)
}

pub async fn topology(
	State(state): State<AppState>,
	Query(query): Query<TopologyQuery>,
) -> Result<Json<TopologyData>, ApiError> {
	let data = load(&state).await?;
	let filtered = data.for_namespace(query.namespace.as_deref());
	info!(
		namespace = query.namespace.as_deref().unwrap_or("all"),
		nodes = filtered.nodes.len(),
		links = filtered.links.len(),
		"served topology"
	);
	Ok(Json(filtered))
}

pub async fn dashboard_topology(State(state): State<AppState>) -> Result<Json<TopologyData>, ApiError> {
	let data = load(&state).await?;
	info!(nodes = data.nodes.len(), links = data.links.len(), "served dashboard topology");
	Ok(Json(TopologyData::clone(&data)))
}

async fn health() -> Json<serde_json::Value> {
	Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
	use axum::body::to_bytes;

	use super::*;
	use crate::source::BuiltinSource;

	struct FailingSource;

	impl TopologySource for FailingSource {
		fn topology(&self) -> Result<Arc<TopologyData>, SourceError> {
			Err(SourceError::Parse(
				serde_json::from_str::<TopologyData>("not json").unwrap_err(),
			))
		}
	}

	fn builtin() -> AppState {
		AppState {
			source: Arc::new(BuiltinSource::new().unwrap()),
		}
	}

	async fn fetch(namespace: Option<&str>) -> TopologyData {
		let query = TopologyQuery {
			namespace: namespace.map(str::to_string),
		};
		let Json(data) = topology(State(builtin()), Query(query)).await.unwrap();
		data
	}

	#[tokio::test]
	async fn all_namespaces_returns_dataset_unchanged() {
		let full = BuiltinSource::new().unwrap().topology().unwrap();
		assert_eq!(fetch(None).await, *full);
		assert_eq!(fetch(Some("all")).await, *full);
	}

	#[tokio::test]
	async fn namespace_keeps_cluster_nodes_and_recomputes_stats() {
		let data = fetch(Some("monitoring")).await;
		let ids = data.nodes.iter().map(|n| n.id.as_str()).collect::<Vec<_>>();
		assert_eq!(
			ids,
			vec!["node-1", "node-2", "node-3", "pod-6", "pod-7", "pod-8", "svc-5"]
		);

		let survivors = data
			.links
			.iter()
			.all(|l| ids.contains(&l.source.as_str()) && ids.contains(&l.target.as_str()));
		assert!(survivors);
		assert_eq!(data.links.len(), 7);

		let stats = data.stats.unwrap();
		assert_eq!(stats.nodes, 3);
		assert_eq!(stats.pods, 3);
		assert_eq!(stats.services, 1);
		assert_eq!(stats.pod_connections, 7);
		assert_eq!(stats.suspicious_connections, 1);
		assert_eq!(stats.threat_count, 3);
	}

	#[tokio::test]
	async fn dashboard_returns_full_dataset() {
		let Json(data) = dashboard_topology(State(builtin())).await.unwrap();
		assert_eq!(data.nodes.len(), 17);
		assert_eq!(data.links.len(), 25);
	}

	#[tokio::test]
	async fn source_failure_maps_to_500_contract() {
		let state = AppState {
			source: Arc::new(FailingSource),
		};
		let response = dashboard_topology(State(state)).await.unwrap_err().into_response();
		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

		let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
		assert_eq!(body, json!({ "message": "Failed to fetch topology data" }));
	}
}
