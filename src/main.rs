//! streamdash: a self-monitoring streaming sample pipeline.
//!
//! Run with:  `RUST_LOG=info streamdash [path/to/streamdash.toml]`

mod app;

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("streamdash v{} starting", env!("CARGO_PKG_VERSION"));

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(dash_config::default_path);
    let config = dash_config::load(&path)
        .with_context(|| format!("loading config from '{}'", path.display()))?;

    // All pipeline work shares one thread, driven by the timer wheel.
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building runtime")?
        .block_on(app::run(path, config))
}
