//! Mock topology backend: serves the cluster topology endpoints and,
//! optionally, the built front-end.

mod routes;
mod source;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::routes::AppState;
use crate::source::{BuiltinSource, FileSource, TopologySource};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
	/// Address to listen on.
	#[arg(long, default_value = "127.0.0.1:5000")]
	bind: SocketAddr,
	/// JSON dataset replacing the built-in mock cluster.
	#[arg(long)]
	dataset: Option<PathBuf>,
	/// Directory with the built front-end, served for non-API paths.
	#[arg(long)]
	static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let args = Args::parse();

	let source: Arc<dyn TopologySource> = match &args.dataset {
		Some(path) => Arc::new(
			FileSource::open(path).with_context(|| format!("loading dataset {}", path.display()))?,
		),
		None => Arc::new(BuiltinSource::new().context("parsing built-in dataset")?),
	};

	let mut app = routes::router(AppState { source });
	if let Some(dir) = &args.static_dir {
		app = app.fallback_service(ServeDir::new(dir));
	}

	let listener = TcpListener::bind(args.bind)
		.await
		.with_context(|| format!("binding {}", args.bind))?;
	info!(
		addr = %args.bind,
		dataset = ?args.dataset,
		static_dir = ?args.static_dir,
		"topology server listening"
	);

	axum::serve(listener, app)
		.with_graceful_shutdown(async {
			let _ = tokio::signal::ctrl_c().await;
			info!("shutting down");
		})
		.await
		.context("server error")?;
	Ok(())
}
