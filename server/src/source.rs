//! Where topology data comes from.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kube_topology::TopologyData;
use thiserror::Error;

const BUILTIN_DATASET: &str = include_str!("../data/topology.json");

#[derive(Debug, Error)]
pub enum SourceError {
	#[error("failed to read {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("invalid topology dataset: {0}")]
	Parse(#[from] serde_json::Error),
}

/// A provider of the full, unfiltered topology.
///
/// Calls may block; handlers run them on the blocking pool.
pub trait TopologySource: Send + Sync {
	fn topology(&self) -> Result<Arc<TopologyData>, SourceError>;
}

/// The mock cluster compiled into the binary.
pub struct BuiltinSource {
	data: Arc<TopologyData>,
}

impl BuiltinSource {
	pub fn new() -> Result<Self, SourceError> {
		Ok(Self {
			data: Arc::new(serde_json::from_str(BUILTIN_DATASET)?),
		})
	}
}

impl TopologySource for BuiltinSource {
	fn topology(&self) -> Result<Arc<TopologyData>, SourceError> {
		Ok(self.data.clone())
	}
}

/// A JSON file re-read on every request, so it can be edited while the
/// server runs.
pub struct FileSource {
	path: PathBuf,
}

impl FileSource {
	/// Validates the file once so a bad path fails at startup.
	pub fn open(path: &Path) -> Result<Self, SourceError> {
		let source = Self {
			path: path.to_path_buf(),
		};
		source.topology()?;
		Ok(source)
	}
}

impl TopologySource for FileSource {
	fn topology(&self) -> Result<Arc<TopologyData>, SourceError> {
		let text = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
			path: self.path.clone(),
			source,
		})?;
		Ok(Arc::new(serde_json::from_str(&text)?))
	}
}
