//! # Flare
//!
//! Headless host for particle emitters exported by the editor.
//!
//! Loads an emitter out of a project export, runs it for a number of frames
//! at a fixed step, and logs pool occupancy and frame cost as it goes.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;
mod timing;

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("flare=info".parse()?))
        .init();

    info!("Flare starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(config::EngineConfig::default_path, PathBuf::from);
    app::run(&config_path)?;

    info!("Flare shutdown complete");
    Ok(())
}
