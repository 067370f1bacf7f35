//! The world capabilities the light engine consumes.

use std::fmt;

use lumen_utils::{BlockPos, ChunkPos};

/// One of the two independent light channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightLayer {
    /// Light from sky exposure.
    Sky = 0,
    /// Light emitted by blocks.
    Block = 1,
}

impl LightLayer {
    /// Both layers, in the order [`LightingEngine::process_updates`] runs them.
    ///
    /// [`LightingEngine::process_updates`]: super::LightingEngine::process_updates
    pub const ALL: [LightLayer; 2] = [LightLayer::Sky, LightLayer::Block];

    /// Index of this layer in per-layer arrays.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for LightLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sky => f.write_str("sky"),
            Self::Block => f.write_str("block"),
        }
    }
}

/// Light related properties of the block at a position.
///
/// Values are reported raw; the engine clamps luminance to `0..=15` and opacity to `1..=15`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockLightInfo {
    /// Light emitted by the block.
    pub luminance: u8,
    /// Light lost when passing through the block.
    pub opacity: u8,
    /// Whether the position is exposed to the sky.
    pub sees_sky: bool,
}

/// Read/write access to world light data for the light engine.
///
/// All per-position calls receive the handle of the chunk owning that position, as
/// resolved through [`LightWorldAccess::chunk_at`]. The engine caches handles for the
/// duration of a pass, so handles must stay valid while the world is borrowed.
pub trait LightWorldAccess {
    /// Cheap handle to a loaded chunk column.
    type Chunk: Copy;

    /// Resolves the chunk column at `pos`, or `None` if it is not loaded.
    fn chunk_at(&self, pos: ChunkPos) -> Option<Self::Chunk>;

    /// Gets the light properties of the block at `pos`.
    fn block_info(&self, chunk: Self::Chunk, pos: BlockPos) -> BlockLightInfo;

    /// Gets the stored light level at `pos`.
    fn light(&self, chunk: Self::Chunk, layer: LightLayer, pos: BlockPos) -> u8;

    /// Stores a light level at `pos`.
    ///
    /// Implementations notify their render invalidation listener once per call.
    fn set_light(&mut self, chunk: Self::Chunk, layer: LightLayer, pos: BlockPos, level: u8);
}
