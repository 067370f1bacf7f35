//! An in-memory world of chunk columns that the light engine can run on.

use std::{mem, sync::Arc};

use lumen_utils::{BlockId, BlockPos, ChunkPos, SectionPos};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::block::BlockRegistry;
use crate::chunk::LightChunk;
use crate::config::LightConfig;
use crate::error::RegistryError;
use crate::light_engine::{
    BlockLightInfo, LightLayer, LightWorldAccess, LightingEngine, spatial_key::WORLD_HEIGHT,
};

/// Handle to a loaded chunk of a [`LightWorld`].
///
/// Only valid until the chunk is unloaded; slots are reused afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkId(usize);

/// A set of loaded chunk columns sharing one block registry.
///
/// Every light write marks its section dirty, and [`LightWorld::take_dirty_sections`] hands
/// the accumulated set to whoever needs to redraw.
#[derive(Debug)]
pub struct LightWorld {
    registry: Arc<BlockRegistry>,
    has_sky: bool,
    chunks: Vec<Option<LightChunk>>,
    free_slots: Vec<usize>,
    chunk_ids: FxHashMap<ChunkPos, ChunkId>,
    dirty_sections: FxHashSet<SectionPos>,
}

impl LightWorld {
    /// Creates an empty world.
    #[must_use]
    pub fn new(registry: Arc<BlockRegistry>, config: &LightConfig) -> Self {
        Self {
            registry,
            has_sky: config.has_sky,
            chunks: Vec::new(),
            free_slots: Vec::new(),
            chunk_ids: FxHashMap::default(),
            dirty_sections: FxHashSet::default(),
        }
    }

    /// Creates an empty world with a registry built from the config's block catalog.
    ///
    /// # Errors
    /// Returns an error if the catalog names a block twice.
    pub fn from_config(config: &LightConfig) -> Result<Self, RegistryError> {
        let registry = BlockRegistry::from_definitions(&config.blocks)?;
        Ok(Self::new(Arc::new(registry), config))
    }

    /// The block registry of this world.
    #[must_use]
    pub fn registry(&self) -> &Arc<BlockRegistry> {
        &self.registry
    }

    /// Loads an all-air chunk at `pos`, or returns the handle of the one already there.
    pub fn load_chunk(&mut self, pos: ChunkPos) -> ChunkId {
        if let Some(&id) = self.chunk_ids.get(&pos) {
            return id;
        }

        let chunk = LightChunk::new(pos, self.has_sky);
        let id = if let Some(slot) = self.free_slots.pop() {
            self.chunks[slot] = Some(chunk);
            ChunkId(slot)
        } else {
            self.chunks.push(Some(chunk));
            ChunkId(self.chunks.len() - 1)
        };

        self.chunk_ids.insert(pos, id);
        log::trace!("Loaded chunk {pos}");
        id
    }

    /// Unloads the chunk at `pos`. Returns whether it was loaded.
    pub fn unload_chunk(&mut self, pos: ChunkPos) -> bool {
        let Some(ChunkId(slot)) = self.chunk_ids.remove(&pos) else {
            return false;
        };

        self.chunks[slot] = None;
        self.free_slots.push(slot);
        self.dirty_sections.retain(|section| section.chunk_pos() != pos);
        log::trace!("Unloaded chunk {pos}");
        true
    }

    /// Whether the chunk at `pos` is loaded.
    #[must_use]
    pub fn is_loaded(&self, pos: ChunkPos) -> bool {
        self.chunk_ids.contains_key(&pos)
    }

    /// The number of loaded chunks.
    #[must_use]
    pub fn loaded_chunks(&self) -> usize {
        self.chunk_ids.len()
    }

    /// Gets the loaded chunk at `pos`.
    #[must_use]
    pub fn chunk(&self, pos: ChunkPos) -> Option<&LightChunk> {
        let id = self.chunk_ids.get(&pos)?;
        self.chunk_by_id(*id)
    }

    fn chunk_by_id(&self, id: ChunkId) -> Option<&LightChunk> {
        self.chunks.get(id.0).and_then(Option::as_ref)
    }

    fn chunk_by_id_mut(&mut self, id: ChunkId) -> Option<&mut LightChunk> {
        self.chunks.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Resolves a position to its loaded chunk and column-local coordinates.
    fn locate(&self, pos: BlockPos) -> Option<(ChunkId, (usize, usize, usize))> {
        if !(0..WORLD_HEIGHT).contains(&pos.y()) {
            return None;
        }
        let id = *self.chunk_ids.get(&pos.chunk_pos())?;
        Some((id, pos.chunk_local()))
    }

    /// Gets the block at `pos`, or `None` if its chunk is not loaded.
    #[must_use]
    pub fn block_at(&self, pos: BlockPos) -> Option<BlockId> {
        let (id, (x, y, z)) = self.locate(pos)?;
        Some(self.chunk_by_id(id)?.block(x, y, z))
    }

    /// Places `block` at `pos` without touching light.
    ///
    /// Returns the previous block, or `None` if the chunk is not loaded. Callers are
    /// responsible for scheduling light updates; see [`LightWorld::set_block_and_schedule`].
    pub fn set_block(&mut self, pos: BlockPos, block: BlockId) -> Option<BlockId> {
        self.set_block_inner(pos, block).map(|(old, _)| old)
    }

    fn set_block_inner(
        &mut self,
        pos: BlockPos,
        block: BlockId,
    ) -> Option<(BlockId, Option<(i32, i32)>)> {
        let (id, (x, y, z)) = self.locate(pos)?;
        let registry = Arc::clone(&self.registry);
        let chunk = self.chunk_by_id_mut(id)?;
        Some(chunk.set_block(x, y, z, block, &registry))
    }

    /// Places `block` at `pos` and schedules every light update the change requires.
    ///
    /// Both layers are scheduled at `pos`. If the block changed the column's sky height,
    /// every position whose sky exposure flipped is scheduled for the sky layer too.
    pub fn set_block_and_schedule(
        &mut self,
        engine: &mut LightingEngine,
        pos: BlockPos,
        block: BlockId,
    ) -> Option<BlockId> {
        let (old, height_change) = self.set_block_inner(pos, block)?;
        if old == block {
            return Some(old);
        }

        engine.schedule_update(LightLayer::Block, pos);
        engine.schedule_update(LightLayer::Sky, pos);

        if let Some((old_height, new_height)) = height_change {
            let low = old_height.min(new_height);
            let high = old_height.max(new_height);
            for y in low..high {
                engine.schedule_update(LightLayer::Sky, BlockPos::new(pos.x(), y, pos.z()));
            }
        }
        Some(old)
    }

    /// Gets the stored light of `layer` at `pos`, or `None` if its chunk is not loaded.
    #[must_use]
    pub fn light_at(&self, layer: LightLayer, pos: BlockPos) -> Option<u8> {
        let (id, (x, y, z)) = self.locate(pos)?;
        Some(self.chunk_by_id(id)?.light(layer, x, y, z))
    }

    /// Gets the block light at `pos`.
    #[must_use]
    pub fn block_light(&self, pos: BlockPos) -> Option<u8> {
        self.light_at(LightLayer::Block, pos)
    }

    /// Gets the sky light at `pos`.
    #[must_use]
    pub fn sky_light(&self, pos: BlockPos) -> Option<u8> {
        self.light_at(LightLayer::Sky, pos)
    }

    /// Takes the sections whose light changed since the previous call.
    pub fn take_dirty_sections(&mut self) -> FxHashSet<SectionPos> {
        mem::take(&mut self.dirty_sections)
    }
}

impl LightWorldAccess for LightWorld {
    type Chunk = ChunkId;

    fn chunk_at(&self, pos: ChunkPos) -> Option<ChunkId> {
        self.chunk_ids.get(&pos).copied()
    }

    fn block_info(&self, chunk: ChunkId, pos: BlockPos) -> BlockLightInfo {
        let Some(chunk) = self.chunk_by_id(chunk) else {
            return BlockLightInfo::default();
        };

        let (x, y, z) = pos.chunk_local();
        let block = chunk.block(x, y, z);
        let (luminance, opacity) = self
            .registry
            .get(block)
            .map_or((0, 0), |properties| (properties.luminance, properties.opacity));

        BlockLightInfo {
            luminance,
            opacity,
            sees_sky: chunk.sees_sky(x, y, z),
        }
    }

    fn light(&self, chunk: ChunkId, layer: LightLayer, pos: BlockPos) -> u8 {
        let (x, y, z) = pos.chunk_local();
        self.chunk_by_id(chunk)
            .map_or(0, |chunk| chunk.light(layer, x, y, z))
    }

    fn set_light(&mut self, chunk: ChunkId, layer: LightLayer, pos: BlockPos, level: u8) {
        let (x, y, z) = pos.chunk_local();
        if let Some(chunk) = self.chunk_by_id_mut(chunk) {
            debug_assert_eq!(
                chunk.pos(),
                pos.chunk_pos(),
                "Light write routed to the wrong chunk"
            );
            chunk.set_light(layer, x, y, z, level);
            self.dirty_sections.insert(pos.section_pos());
        }
    }
}
