//! Front-end configuration.
//!
//! Read from an optional `<script id="topology-config" type="application/json">`
//! element so the same build can point at different backends. Missing fields
//! fall back to the defaults below.

use log::{info, warn};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::HtmlScriptElement;

const CONFIG_ELEMENT_ID: &str = "topology-config";

/// Runtime settings for the dashboard views.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
	/// Prefix for API requests; empty means same origin.
	pub api_base_url: String,
	/// Refresh interval of the topology view.
	pub topology_poll_secs: u32,
	/// Refresh interval of the dashboard summary card.
	pub summary_poll_secs: u32,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			api_base_url: String::new(),
			topology_poll_secs: 60,
			summary_poll_secs: 300,
		}
	}
}

impl AppConfig {
	/// Parses a config document; missing fields take defaults.
	pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	/// Absolute or same-origin URL for an API path such as `/api/topology`.
	pub fn endpoint(&self, path: &str) -> String {
		format!("{}{}", self.api_base_url.trim_end_matches('/'), path)
	}

	/// Loads the config element, or defaults when absent or malformed.
	pub fn load() -> Self {
		let Some(text) = config_element_text() else {
			return Self::default();
		};
		match Self::parse(&text) {
			Ok(config) => {
				info!("kube-topology: loaded config from #{CONFIG_ELEMENT_ID}");
				config
			}
			Err(e) => {
				warn!("kube-topology: ignoring malformed config: {}", e);
				Self::default()
			}
		}
	}
}

fn config_element_text() -> Option<String> {
	let document = web_sys::window()?.document()?;
	let element = document.get_element_by_id(CONFIG_ELEMENT_ID)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_config_keeps_defaults() {
		let config = AppConfig::parse(r#"{"apiBaseUrl": "http://localhost:5000/"}"#).unwrap();
		assert_eq!(config.topology_poll_secs, 60);
		assert_eq!(config.summary_poll_secs, 300);
		assert_eq!(config.endpoint("/api/topology"), "http://localhost:5000/api/topology");
	}

	#[test]
	fn default_endpoint_is_same_origin() {
		assert_eq!(AppConfig::default().endpoint("/api/health"), "/api/health");
	}

	#[test]
	fn malformed_config_is_an_error() {
		assert!(AppConfig::parse("{not json").is_err());
	}
}
