//! # Lumen
//!
//! Demo runner for the lumen light engine. Loads `lumen_config.json5` (writing the default
//! one on first run), builds a small scene and logs what each lighting pass did.

use std::{env, path::PathBuf};

use lumen_utils::logger;

use crate::{config::LumenConfig, demo::Demo};

mod config;
mod demo;

fn main() -> anyhow::Result<()> {
    logger::init(logger::DEFAULT_FILTER);

    let path = env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(config::CONFIG_PATH), PathBuf::from);
    let config = LumenConfig::load_or_create(&path)?;
    log::info!("Starting lumen demo with {}", path.display());

    let mut demo = Demo::new(&config)?;
    let mut total = demo.build_ground()?;
    total += demo.decorate()?;
    total += demo.remove_torches()?;
    demo.log_summary();

    log::info!(
        "Done: {} updates, {} brightenings, {} darkenings",
        total.processed,
        total.brightenings,
        total.darkenings
    );
    Ok(())
}
