//! A chunk column holding blocks and light for the whole world height.

use std::array;

use lumen_utils::{BlockId, ChunkPos};

use crate::block::BlockRegistry;
use crate::chunk::{
    light_storage::LightStorage,
    section::{ChunkSection, SECTION_SIZE},
    sky_light_sources::ChunkSkyLightSources,
};
use crate::light_engine::{LightLayer, MAX_LIGHT_LEVEL, spatial_key::WORLD_HEIGHT};

/// The number of sections in a column.
pub const SECTION_COUNT: usize = WORLD_HEIGHT as usize / SECTION_SIZE;

/// A 16 x [`WORLD_HEIGHT`] x 16 column of sections.
///
/// Sections are allocated lazily, on the first non-air block or light write. An unallocated
/// section is all air, has no block light, and has full sky light. Every section below a
/// column's sky height is allocated before the height moves past it, so sky light never
/// changes without a write. All coordinates taken by this type are local to the column.
#[derive(Debug, Clone)]
pub struct LightChunk {
    pos: ChunkPos,
    has_sky: bool,
    sections: [Option<ChunkSection>; SECTION_COUNT],
    sky_light_sources: ChunkSkyLightSources,
}

impl LightChunk {
    /// Creates an all-air column.
    #[must_use]
    pub fn new(pos: ChunkPos, has_sky: bool) -> Self {
        Self {
            pos,
            has_sky,
            sections: array::from_fn(|_| None),
            sky_light_sources: ChunkSkyLightSources::new(),
        }
    }

    /// The position of this column.
    #[must_use]
    pub const fn pos(&self) -> ChunkPos {
        self.pos
    }

    /// The number of sections that have been allocated.
    #[must_use]
    pub fn allocated_sections(&self) -> usize {
        self.sections.iter().flatten().count()
    }

    /// Gets the block at `(x, y, z)`.
    #[must_use]
    pub fn block(&self, x: usize, y: usize, z: usize) -> BlockId {
        self.sections[y / SECTION_SIZE]
            .as_ref()
            .map_or(BlockId::AIR, |section| section.blocks.get(x, y % SECTION_SIZE, z))
    }

    /// Sets the block at `(x, y, z)` and keeps the sky heightmap current.
    ///
    /// Returns the previous block and, if the column's sky height moved, the old and new
    /// heights.
    pub fn set_block(
        &mut self,
        x: usize,
        y: usize,
        z: usize,
        id: BlockId,
        registry: &BlockRegistry,
    ) -> (BlockId, Option<(i32, i32)>) {
        let index = y / SECTION_SIZE;
        let section = match self.sections[index] {
            Some(ref mut section) => section,
            None if id == BlockId::AIR => return (BlockId::AIR, None),
            None => self.allocate_section(index),
        };
        let old = section.blocks.set(x, y % SECTION_SIZE, z, id);
        if old == id {
            return (old, None);
        }

        let sections = &self.sections;
        let blocks_sky = |y: i32| {
            let y = y as usize;
            sections[y / SECTION_SIZE]
                .as_ref()
                .map(|section| section.blocks.get(x, y % SECTION_SIZE, z))
                .and_then(|block| registry.get(block))
                .is_some_and(|block| block.blocks_sky())
        };
        let height_change = self.sky_light_sources.update(x, y as i32, z, blocks_sky);
        if let Some((old_height, new_height)) = height_change {
            self.allocate_sky_span(old_height, new_height);
        }

        (old, height_change)
    }

    /// Allocates the sections a column's sky height moved across.
    ///
    /// These sections still hold the light that was visible before the move, so the engine
    /// sees the change as a difference between stored and expected light.
    fn allocate_sky_span(&mut self, old_height: i32, new_height: i32) {
        if !self.has_sky {
            return;
        }

        let low = old_height.min(new_height) as usize / SECTION_SIZE;
        let high = (old_height.max(new_height) as usize).div_ceil(SECTION_SIZE);
        for index in low..high {
            if self.sections[index].is_none() {
                self.allocate_section(index);
            }
        }
    }

    /// Whether `(x, y, z)` is exposed to the sky. Always `false` without a sky.
    #[must_use]
    pub fn sees_sky(&self, x: usize, y: usize, z: usize) -> bool {
        self.has_sky && self.sky_light_sources.sees_sky(x, y as i32, z)
    }

    /// Gets the stored light of `layer` at `(x, y, z)`.
    #[must_use]
    pub fn light(&self, layer: LightLayer, x: usize, y: usize, z: usize) -> u8 {
        match (layer, &self.sections[y / SECTION_SIZE]) {
            (LightLayer::Sky, _) if !self.has_sky => 0,
            (LightLayer::Sky, None) => MAX_LIGHT_LEVEL,
            (LightLayer::Block, None) => 0,
            (LightLayer::Sky, Some(section)) => section.sky_light.get(x, y % SECTION_SIZE, z),
            (LightLayer::Block, Some(section)) => section.block_light.get(x, y % SECTION_SIZE, z),
        }
    }

    /// Stores the light of `layer` at `(x, y, z)`, allocating the section if needed.
    pub fn set_light(&mut self, layer: LightLayer, x: usize, y: usize, z: usize, level: u8) {
        let index = y / SECTION_SIZE;
        let section = match self.sections[index] {
            Some(ref mut section) => section,
            None => self.allocate_section(index),
        };

        let storage = match layer {
            LightLayer::Sky => &mut section.sky_light,
            LightLayer::Block => &mut section.block_light,
        };
        storage.set(x, y % SECTION_SIZE, z, level);
    }

    /// Creates the section at `index` with the light an unallocated section reports.
    fn allocate_section(&mut self, index: usize) -> &mut ChunkSection {
        let sky_light = if self.has_sky { MAX_LIGHT_LEVEL } else { 0 };
        self.sections[index].insert(ChunkSection::new(LightStorage::filled(sky_light)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> (BlockRegistry, BlockId) {
        let mut registry = BlockRegistry::new();
        let stone = registry.register("stone", 0, 15).unwrap();
        (registry, stone)
    }

    #[test]
    fn test_unallocated_sections_read_defaults() {
        let chunk = LightChunk::new(ChunkPos::new(0, 0), true);

        assert_eq!(chunk.block(4, 100, 4), BlockId::AIR);
        assert_eq!(chunk.light(LightLayer::Sky, 4, 100, 4), 15);
        assert_eq!(chunk.light(LightLayer::Block, 4, 100, 4), 0);
        assert_eq!(chunk.allocated_sections(), 0);
    }

    #[test]
    fn test_no_sky_reads_zero() {
        let mut chunk = LightChunk::new(ChunkPos::new(0, 0), false);
        assert!(!chunk.sees_sky(0, 255, 0));
        assert_eq!(chunk.light(LightLayer::Sky, 0, 255, 0), 0);

        chunk.set_light(LightLayer::Block, 0, 255, 0, 9);
        assert_eq!(chunk.light(LightLayer::Block, 0, 255, 0), 9);
        assert_eq!(chunk.light(LightLayer::Sky, 1, 255, 0), 0);
    }

    #[test]
    fn test_set_block_moves_sky_height() {
        let (registry, stone) = registry();
        let mut chunk = LightChunk::new(ChunkPos::new(0, 0), true);

        let (old, change) = chunk.set_block(2, 70, 3, stone, &registry);
        assert_eq!(old, BlockId::AIR);
        assert_eq!(change, Some((0, 71)));
        assert!(!chunk.sees_sky(2, 69, 3));
        assert!(chunk.sees_sky(2, 71, 3));
        assert!(chunk.sees_sky(3, 69, 3));

        let (old, change) = chunk.set_block(2, 70, 3, BlockId::AIR, &registry);
        assert_eq!(old, stone);
        assert_eq!(change, Some((71, 0)));
    }

    #[test]
    fn test_air_write_does_not_allocate() {
        let (registry, _) = registry();
        let mut chunk = LightChunk::new(ChunkPos::new(0, 0), true);

        assert_eq!(
            chunk.set_block(0, 0, 0, BlockId::AIR, &registry),
            (BlockId::AIR, None)
        );
        assert_eq!(chunk.allocated_sections(), 0);
    }

    #[test]
    fn test_rising_sky_height_keeps_stored_light() {
        let (registry, stone) = registry();
        let mut chunk = LightChunk::new(ChunkPos::new(0, 0), true);

        // Shade column (5, 5) from y = 40 down.
        chunk.set_block(5, 40, 5, stone, &registry);

        // Sections 0..=2 now exist and still hold the sky light seen before the change.
        assert_eq!(chunk.allocated_sections(), 3);
        assert!(!chunk.sees_sky(5, 20, 5));
        assert_eq!(chunk.light(LightLayer::Sky, 5, 20, 5), 15);
        assert_eq!(chunk.light(LightLayer::Sky, 5, 0, 5), 15);
        assert_eq!(chunk.light(LightLayer::Sky, 5, 100, 5), 15);
    }

    #[test]
    fn test_falling_sky_height_keeps_stored_light() {
        let (registry, stone) = registry();
        let mut chunk = LightChunk::new(ChunkPos::new(0, 0), true);
        chunk.set_block(5, 40, 5, stone, &registry);
        chunk.set_light(LightLayer::Sky, 5, 20, 5, 0);

        let (_, change) = chunk.set_block(5, 40, 5, BlockId::AIR, &registry);
        assert_eq!(change, Some((41, 0)));
        assert!(chunk.sees_sky(5, 20, 5));
        assert_eq!(chunk.light(LightLayer::Sky, 5, 20, 5), 0);
    }

    #[test]
    fn test_no_sky_height_change_does_not_allocate() {
        let (registry, stone) = registry();
        let mut chunk = LightChunk::new(ChunkPos::new(0, 0), false);

        chunk.set_block(5, 200, 5, stone, &registry);
        assert_eq!(chunk.allocated_sections(), 1);
    }
}
