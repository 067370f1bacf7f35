//! Builds a small scene and relights it in a few rounds.

use std::time::Instant;

use anyhow::Context;
use lumen_core::light_engine::{LightUpdateStats, LightingEngine};
use lumen_core::world::LightWorld;
use lumen_utils::{BlockId, BlockPos, ChunkPos};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::config::{DemoConfig, LumenConfig};

/// The demo world and its engine.
pub struct Demo {
    world: LightWorld,
    engine: LightingEngine,
    settings: DemoConfig,
    rng: StdRng,
    torches: Vec<BlockPos>,
}

impl Demo {
    /// Creates the world described by `config` with all demo chunks loaded.
    pub fn new(config: &LumenConfig) -> anyhow::Result<Self> {
        let mut world =
            LightWorld::from_config(&config.lighting).context("invalid block catalog")?;
        let radius = config.demo.radius;
        for x in -radius..=radius {
            for z in -radius..=radius {
                world.load_chunk(ChunkPos::new(x, z));
            }
        }
        log::info!("Loaded {} chunks", world.loaded_chunks());

        Ok(Self {
            world,
            engine: LightingEngine::from_config(&config.lighting),
            settings: config.demo.clone(),
            rng: StdRng::seed_from_u64(config.demo.seed),
            torches: Vec::new(),
        })
    }

    fn block(&self, name: &str) -> anyhow::Result<BlockId> {
        self.world
            .registry()
            .id_of(name)
            .with_context(|| format!("block catalog has no `{name}`"))
    }

    /// World x/z range covered by the loaded chunks.
    fn extent(&self) -> (i32, i32) {
        let min = -self.settings.radius * 16;
        (min, -min + 16)
    }

    fn random_surface_pos(&mut self, above: i32) -> BlockPos {
        let (min, max) = self.extent();
        BlockPos::new(
            self.rng.random_range(min..max),
            self.settings.ground_height + above,
            self.rng.random_range(min..max),
        )
    }

    fn relight(&mut self, round: &str) -> anyhow::Result<LightUpdateStats> {
        let _span = tracing::info_span!("relight", round).entered();
        let start = Instant::now();
        let stats = self.engine.process_updates(&mut self.world)?;
        let dirty = self.world.take_dirty_sections();

        log::info!(
            "{round}: {} updates, {} brightenings, {} darkenings, {} dirty sections in {:?}",
            stats.processed,
            stats.brightenings,
            stats.darkenings,
            dirty.len(),
            start.elapsed()
        );
        Ok(stats)
    }

    /// Lays the stone floor.
    pub fn build_ground(&mut self) -> anyhow::Result<LightUpdateStats> {
        let stone = self.block("stone")?;
        let (min, max) = self.extent();

        for x in min..max {
            for z in min..max {
                for y in 0..self.settings.ground_height {
                    self.world.set_block_and_schedule(
                        &mut self.engine,
                        BlockPos::new(x, y, z),
                        stone,
                    );
                }
            }
        }
        self.relight("ground")
    }

    /// Scatters pillars and torches over the floor.
    pub fn decorate(&mut self) -> anyhow::Result<LightUpdateStats> {
        let stone = self.block("stone")?;
        let torch = self.block("torch")?;

        for _ in 0..self.settings.pillars {
            let base = self.random_surface_pos(0);
            let height = self.rng.random_range(2..12);
            for dy in 0..height {
                self.world
                    .set_block_and_schedule(&mut self.engine, base.offset(0, dy, 0), stone);
            }
        }

        for _ in 0..self.settings.torches {
            let pos = self.random_surface_pos(0);
            if self.world.block_at(pos) != Some(BlockId::AIR) {
                continue;
            }
            self.world
                .set_block_and_schedule(&mut self.engine, pos, torch);
            self.torches.push(pos);
        }
        log::info!("Placed {} torches", self.torches.len());

        self.relight("decorate")
    }

    /// Removes some of the torches again.
    pub fn remove_torches(&mut self) -> anyhow::Result<LightUpdateStats> {
        let count = self.settings.removals.min(self.torches.len());
        for _ in 0..count {
            let index = self.rng.random_range(0..self.torches.len());
            let pos = self.torches.swap_remove(index);
            self.world
                .set_block_and_schedule(&mut self.engine, pos, BlockId::AIR);
        }
        self.relight("remove torches")
    }

    /// Logs a cross section of the light just above the floor.
    pub fn log_summary(&self) {
        let y = self.settings.ground_height;
        let (min, max) = self.extent();
        let mut lit = 0usize;
        let mut total = 0usize;

        for x in min..max {
            for z in min..max {
                total += 1;
                if self
                    .world
                    .block_light(BlockPos::new(x, y, z))
                    .is_some_and(|level| level > 0)
                {
                    lit += 1;
                }
            }
        }
        log::info!("{lit} of {total} floor positions receive block light");

        for pos in &self.torches {
            log::debug!(
                "torch {pos}: block {:?}, sky {:?}",
                self.world.block_light(*pos),
                self.world.sky_light(*pos)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use lumen_core::config::LightConfig;

    use super::*;

    fn config() -> LumenConfig {
        LumenConfig {
            lighting: LightConfig::default(),
            demo: DemoConfig {
                radius: 0,
                ground_height: 4,
                torches: 6,
                pillars: 3,
                removals: 6,
                seed: 7,
            },
        }
    }

    #[test]
    fn test_removing_every_torch_leaves_no_block_light() {
        let mut demo = Demo::new(&config()).unwrap();
        demo.build_ground().unwrap();
        demo.decorate().unwrap();
        assert!(!demo.torches.is_empty());

        demo.remove_torches().unwrap();
        assert!(demo.torches.is_empty());
        for x in 0..16 {
            for z in 0..16 {
                for y in 0..32 {
                    assert_eq!(demo.world.block_light(BlockPos::new(x, y, z)), Some(0));
                }
            }
        }
    }

    #[test]
    fn test_ground_shades_sky() {
        let mut demo = Demo::new(&config()).unwrap();
        demo.build_ground().unwrap();

        // The floor is covered, so only the top layer can see the sky.
        assert_eq!(demo.world.sky_light(BlockPos::new(8, 4, 8)), Some(15));
        assert_eq!(demo.world.sky_light(BlockPos::new(8, 3, 8)), Some(0));
        assert_eq!(demo.world.sky_light(BlockPos::new(8, 0, 8)), Some(0));
    }
}
