//! HTTP client for the topology endpoints.

use gloo::net::http::Request;
use log::{debug, warn};
use thiserror::Error;

use crate::components::topology_graph::types::{ALL_NAMESPACES, TopologyData};
use crate::config::AppConfig;

/// Endpoint backing the topology page.
pub const TOPOLOGY_PATH: &str = "/api/topology";
/// Endpoint backing the dashboard summary card.
pub const SUMMARY_PATH: &str = "/api/dashboard/topology";

/// Why a topology request produced no data.
#[derive(Debug, Error)]
pub enum FetchError {
	/// Network or CORS failure.
	#[error("request failed: {0}")]
	Transport(#[from] gloo::net::Error),
	/// Non-2xx answer; `message` comes from the error body when present.
	#[error("server answered {status}: {message}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Server message or status text.
		message: String,
	},
	/// Body was not a topology payload.
	#[error("malformed topology payload: {0}")]
	Decode(String),
}

/// Body of a non-2xx response, `{ "message": ... }`.
#[derive(serde::Deserialize)]
struct ErrorBody {
	message: String,
}

async fn get_topology(url: &str, query: &[(&str, &str)]) -> Result<TopologyData, FetchError> {
	let response = Request::get(url).query(query.iter().copied()).send().await?;

	if !response.ok() {
		let status = response.status();
		let message = match response.json::<ErrorBody>().await {
			Ok(body) => body.message,
			Err(_) => response.status_text(),
		};
		return Err(FetchError::Status { status, message });
	}

	let data = response
		.json::<TopologyData>()
		.await
		.map_err(|e| FetchError::Decode(e.to_string()))?;
	debug!(
		"kube-topology: fetched {} nodes, {} links from {url}",
		data.nodes.len(),
		data.links.len()
	);
	Ok(data)
}

/// Fetches the topology page payload for a namespace (`"all"` for everything).
pub async fn fetch_topology(config: &AppConfig, namespace: &str) -> Result<TopologyData, FetchError> {
	let namespace = if namespace.is_empty() {
		ALL_NAMESPACES
	} else {
		namespace
	};
	get_topology(&config.endpoint(TOPOLOGY_PATH), &[("namespace", namespace)]).await
}

/// Fetches the dashboard summary payload.
pub async fn fetch_summary(config: &AppConfig) -> Result<TopologyData, FetchError> {
	get_topology(&config.endpoint(SUMMARY_PATH), &[]).await
}

/// Collapses a fetch result to "data or nothing", logging the failure.
pub fn or_no_data(result: Result<TopologyData, FetchError>) -> Option<TopologyData> {
	match result {
		Ok(data) => Some(data),
		Err(e) => {
			warn!("kube-topology: {}", e);
			None
		}
	}
}
