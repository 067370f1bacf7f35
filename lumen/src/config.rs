use std::path::Path;

use anyhow::{Context, ensure};
use lumen_core::config::{LightConfig, load_or_create};
use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("../../package-content/lumen_config.json5");

/// Path of the config file, relative to the working directory.
pub const CONFIG_PATH: &str = "lumen_config.json5";

/// Top level layout of `lumen_config.json5`.
#[derive(Debug, Clone, Deserialize)]
pub struct LumenConfig {
    /// World and engine settings.
    pub lighting: LightConfig,
    /// Demo scene settings.
    pub demo: DemoConfig,
}

/// Settings for the generated demo scene.
#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
    /// Chunks loaded in every direction around the origin chunk.
    pub radius: i32,
    /// Height of the stone floor.
    pub ground_height: i32,
    /// Torches placed on the floor.
    pub torches: usize,
    /// Stone pillars placed on the floor.
    pub pillars: usize,
    /// Torches removed again after the first pass.
    pub removals: usize,
    /// Seed for the scene layout.
    pub seed: u64,
}

impl LumenConfig {
    /// Loads the config at `path`, writing the default one first if it is missing.
    pub fn load_or_create(path: &Path) -> anyhow::Result<Self> {
        let config: Self = load_or_create(path, DEFAULT_CONFIG)
            .with_context(|| format!("failed to load {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        self.lighting.validate()?;
        ensure!(
            (0..=8).contains(&self.demo.radius),
            "Demo radius must be in range 0..=8"
        );
        ensure!(
            (1..200).contains(&self.demo.ground_height),
            "Ground height must be in range 1..200"
        );
        ensure!(
            self.demo.removals <= self.demo.torches,
            "Cannot remove more torches than are placed"
        );
        Ok(())
    }
}
