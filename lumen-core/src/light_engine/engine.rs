//! Incremental, level-ordered light propagation.
//!
//! A pass drains the raw update queue of one layer, classifies every position as brighter or
//! darker than its stored value, then walks the leveled queues from 15 down to 0. At each
//! level darkenings run before brightenings, so a position is only ever re-lit by neighbors
//! that can no longer be darkened later in the pass.

use std::array;
use std::fmt;
use std::ops::AddAssign;

use lumen_utils::BlockPos;

use super::access::{BlockLightInfo, LightLayer, LightWorldAccess};
use super::chunk_cache::ChunkCache;
use super::direction::Direction;
use super::light_queue::LightQueue;
use super::spatial_key::SpatialKey;
use crate::config::LightConfig;
use crate::error::LightError;

/// The maximum light level.
pub const MAX_LIGHT_LEVEL: u8 = 15;

/// Where the engine is within a lighting pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    /// No pass is running.
    #[default]
    Idle,
    /// Draining the raw update queue into the staging queues.
    Classifying,
    /// Validating staged updates and seeding the leveled queues.
    Scheduling,
    /// Draining the leveled queues of the given level.
    Propagating {
        /// The level currently being drained.
        level: u8,
    },
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Classifying => f.write_str("classifying"),
            Self::Scheduling => f.write_str("scheduling"),
            Self::Propagating { level } => write!(f, "propagating level {level}"),
        }
    }
}

/// Counters describing the work done by a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightUpdateStats {
    /// Raw updates that were classified (updates in unloaded chunks are not counted).
    pub processed: usize,
    /// Positions written with a non-zero level and queued for brightening.
    pub brightenings: usize,
    /// Positions zeroed and queued for darkening.
    pub darkenings: usize,
}

impl LightUpdateStats {
    /// Whether the pass changed nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.processed == 0 && self.brightenings == 0 && self.darkenings == 0
    }
}

impl AddAssign for LightUpdateStats {
    fn add_assign(&mut self, rhs: Self) {
        self.processed += rhs.processed;
        self.brightenings += rhs.brightenings;
        self.darkenings += rhs.darkenings;
    }
}

/// Cached data about one neighbor of the cursor.
#[derive(Clone, Copy)]
struct NeighborInfo<C> {
    key: SpatialKey,
    pos: BlockPos,
    /// `None` when the neighbor is outside the world or its chunk is not loaded.
    chunk: Option<C>,
    light: u8,
}

impl<C> NeighborInfo<C> {
    const EMPTY: Self = Self {
        key: SpatialKey::encode(0, 0, 0),
        pos: BlockPos::new(0, 0, 0),
        chunk: None,
        light: 0,
    };
}

/// The position currently being processed.
struct Cursor<C> {
    key: SpatialKey,
    pos: BlockPos,
    chunk: Option<C>,
}

/// State that only lives for a single pass over one layer.
struct Pass<'w, W: LightWorldAccess> {
    world: &'w mut W,
    layer: LightLayer,
    chunks: ChunkCache<W::Chunk>,
    cursor: Cursor<W::Chunk>,
    neighbors: [NeighborInfo<W::Chunk>; 6],
    neighbors_valid: bool,
    stats: LightUpdateStats,
}

impl<'w, W: LightWorldAccess> Pass<'w, W> {
    fn new(world: &'w mut W, layer: LightLayer) -> Self {
        Self {
            world,
            layer,
            chunks: ChunkCache::new(),
            cursor: Cursor {
                key: SpatialKey::encode(0, 0, 0),
                pos: BlockPos::new(0, 0, 0),
                chunk: None,
            },
            neighbors: [NeighborInfo::EMPTY; 6],
            neighbors_valid: false,
            stats: LightUpdateStats::default(),
        }
    }

    fn resolve_chunk(&mut self, key: SpatialKey, pos: BlockPos) -> Option<W::Chunk> {
        let world = &*self.world;
        self.chunks
            .get_or_load(key.chunk_identity(), || world.chunk_at(pos.chunk_pos()))
    }

    /// Moves the cursor to `key`, dropping the cached neighbor data.
    fn advance(&mut self, key: SpatialKey) {
        let key = key.position();
        let pos = key.to_block_pos();
        let chunk = if self.cursor.chunk.is_some()
            && self.cursor.key.chunk_identity() == key.chunk_identity()
        {
            self.cursor.chunk
        } else {
            self.resolve_chunk(key, pos)
        };

        self.cursor = Cursor { key, pos, chunk };
        self.neighbors_valid = false;
    }

    #[inline]
    fn light(&self, chunk: W::Chunk, pos: BlockPos) -> u8 {
        self.world.light(chunk, self.layer, pos)
    }

    #[inline]
    fn opacity(&self, chunk: W::Chunk, pos: BlockPos) -> u8 {
        clamp_opacity(self.world.block_info(chunk, pos))
    }

    fn luminosity(&self, info: BlockLightInfo) -> u8 {
        match self.layer {
            LightLayer::Sky if info.sees_sky => MAX_LIGHT_LEVEL,
            LightLayer::Sky => 0,
            LightLayer::Block => info.luminance.min(MAX_LIGHT_LEVEL),
        }
    }

    /// Luminosity and effective opacity of the cursor block.
    fn cursor_emission(&self, chunk: W::Chunk) -> (u8, u8) {
        let info = self.world.block_info(chunk, self.cursor.pos);
        let luminosity = self.luminosity(info);
        // A near-maximal emitter ignores its own opacity.
        let opacity = if luminosity >= MAX_LIGHT_LEVEL - 1 {
            1
        } else {
            clamp_opacity(info)
        };
        (luminosity, opacity)
    }

    fn fetch_neighbors(&mut self) {
        if self.neighbors_valid {
            return;
        }
        self.neighbors_valid = true;

        for dir in Direction::ALL {
            let slot = dir as usize;
            let Some(key) = self.cursor.key.neighbor(dir) else {
                self.neighbors[slot].chunk = None;
                continue;
            };

            let pos = dir.relative(self.cursor.pos);
            let chunk = if key.chunk_identity() == self.cursor.key.chunk_identity() {
                self.cursor.chunk
            } else {
                self.resolve_chunk(key, pos)
            };
            let light = chunk.map_or(0, |chunk| self.light(chunk, pos));

            self.neighbors[slot] = NeighborInfo {
                key,
                pos,
                chunk,
                light,
            };
        }
    }

    /// The value the cursor should hold given its emission and its neighbors' light.
    fn calculate_light(&mut self, luminosity: u8, opacity: u8) -> u8 {
        if luminosity >= MAX_LIGHT_LEVEL - opacity {
            return luminosity;
        }

        self.fetch_neighbors();
        self.neighbors
            .iter()
            .filter(|neighbor| neighbor.chunk.is_some())
            .map(|neighbor| neighbor.light.saturating_sub(opacity))
            .fold(luminosity, u8::max)
    }
}

#[inline]
fn clamp_opacity(info: BlockLightInfo) -> u8 {
    info.opacity.clamp(1, MAX_LIGHT_LEVEL)
}

const LEVELS: usize = MAX_LIGHT_LEVEL as usize + 1;

/// Incremental light engine for both light layers of one world.
///
/// Positions are queued with [`LightingEngine::schedule_update`] whenever something that
/// affects light changes, and brought back to a consistent state by
/// [`LightingEngine::process_updates`]. The engine owns all queues and reuses them between
/// passes; the world is only borrowed while a pass runs.
pub struct LightingEngine {
    /// Raw scheduled updates, one queue per layer.
    update_queues: [LightQueue; 2],
    /// Positions zeroed from the level they are indexed by.
    darkening_queues: [LightQueue; LEVELS],
    /// Positions holding the level they are indexed by and waiting to spread it.
    brightening_queues: [LightQueue; LEVELS],
    /// Classified brightenings carrying their target level in the key's level nibble.
    initial_brightenings: LightQueue,
    initial_darkenings: LightQueue,
    state: EngineState,
}

impl LightingEngine {
    /// Creates an engine whose queues start at [`LightQueue::DEFAULT_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(LightQueue::DEFAULT_CAPACITY)
    }

    /// Creates an engine whose queues start with room for `capacity` keys each.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            update_queues: array::from_fn(|_| LightQueue::with_capacity(capacity)),
            darkening_queues: array::from_fn(|_| LightQueue::with_capacity(capacity)),
            brightening_queues: array::from_fn(|_| LightQueue::with_capacity(capacity)),
            initial_brightenings: LightQueue::with_capacity(capacity),
            initial_darkenings: LightQueue::with_capacity(capacity),
            state: EngineState::Idle,
        }
    }

    /// Creates an engine sized by `config`.
    #[must_use]
    pub fn from_config(config: &LightConfig) -> Self {
        Self::with_capacity(config.queue_capacity)
    }

    /// Queues `pos` to have its `layer` light recomputed by the next pass.
    ///
    /// Returns `false` if the position is already waiting for this layer.
    pub fn schedule_update(&mut self, layer: LightLayer, pos: BlockPos) -> bool {
        self.update_queues[layer.index()].enqueue(SpatialKey::from_block_pos(pos))
    }

    /// Whether any layer has updates waiting.
    #[must_use]
    pub fn has_pending_updates(&self) -> bool {
        self.update_queues.iter().any(|queue| !queue.is_empty())
    }

    /// Number of updates waiting for `layer`.
    #[must_use]
    pub fn pending_updates(&self, layer: LightLayer) -> usize {
        self.update_queues[layer.index()].len()
    }

    /// The current state of the engine.
    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Processes the pending updates of the sky layer, then of the block layer.
    ///
    /// # Errors
    /// Returns [`LightError::AlreadyUpdating`] if a previous pass never finished.
    pub fn process_updates<W: LightWorldAccess>(
        &mut self,
        world: &mut W,
    ) -> Result<LightUpdateStats, LightError> {
        let mut stats = LightUpdateStats::default();
        for layer in LightLayer::ALL {
            stats += self.process_updates_for_layer(world, layer)?;
        }
        Ok(stats)
    }

    /// Processes the pending updates of one layer.
    ///
    /// Returns immediately when nothing is queued for `layer`.
    ///
    /// # Errors
    /// Returns [`LightError::AlreadyUpdating`] if a previous pass never finished.
    pub fn process_updates_for_layer<W: LightWorldAccess>(
        &mut self,
        world: &mut W,
        layer: LightLayer,
    ) -> Result<LightUpdateStats, LightError> {
        if self.update_queues[layer.index()].is_empty() {
            return Ok(LightUpdateStats::default());
        }
        if self.state != EngineState::Idle {
            return Err(LightError::AlreadyUpdating(self.state));
        }

        let _span = tracing::debug_span!("light_pass", %layer).entered();
        let mut pass = Pass::new(world, layer);

        self.classify(&mut pass);
        self.schedule(&mut pass);
        self.propagate(&mut pass);
        self.state = EngineState::Idle;

        let stats = pass.stats;
        log::debug!(
            "{layer} light pass: {} updates, {} brightenings, {} darkenings",
            stats.processed,
            stats.brightenings,
            stats.darkenings
        );
        Ok(stats)
    }

    /// Sorts raw updates into the staging queues without writing any light.
    fn classify<W: LightWorldAccess>(&mut self, pass: &mut Pass<'_, W>) {
        self.state = EngineState::Classifying;

        let queue = &mut self.update_queues[pass.layer.index()];
        queue.new_generation();

        while let Some(key) = queue.dequeue() {
            pass.advance(key);
            let Some(chunk) = pass.cursor.chunk else {
                log::trace!("Skipping light update at {} in unloaded chunk", pass.cursor.pos);
                continue;
            };
            pass.stats.processed += 1;

            let old_light = pass.light(chunk, pass.cursor.pos);
            let (luminosity, opacity) = pass.cursor_emission(chunk);
            let new_light = pass.calculate_light(luminosity, opacity);

            if old_light < new_light {
                self.initial_brightenings
                    .enqueue(pass.cursor.key.with_level(new_light));
            } else if old_light > new_light {
                self.initial_darkenings.enqueue(pass.cursor.key);
            }
        }
    }

    /// Writes staged brightenings, zeroes staged darkenings and seeds the leveled queues.
    fn schedule<W: LightWorldAccess>(&mut self, pass: &mut Pass<'_, W>) {
        self.state = EngineState::Scheduling;

        self.initial_brightenings.new_generation();
        while let Some(key) = self.initial_brightenings.dequeue() {
            pass.advance(key);
            let Some(chunk) = pass.cursor.chunk else {
                continue;
            };

            let (cursor_key, cursor_pos) = (pass.cursor.key, pass.cursor.pos);
            let new_light = key.level();
            if new_light > pass.light(chunk, cursor_pos) {
                self.enqueue_brightening(pass, cursor_key, cursor_pos, chunk, new_light);
            }
        }

        self.initial_darkenings.new_generation();
        while let Some(key) = self.initial_darkenings.dequeue() {
            pass.advance(key);
            let Some(chunk) = pass.cursor.chunk else {
                continue;
            };

            let (cursor_key, cursor_pos) = (pass.cursor.key, pass.cursor.pos);
            let old_light = pass.light(chunk, cursor_pos);
            if old_light != 0 {
                self.enqueue_darkening(pass, cursor_key, cursor_pos, chunk, old_light);
            }
        }
    }

    /// Drains the leveled queues from the brightest level to the darkest.
    fn propagate<W: LightWorldAccess>(&mut self, pass: &mut Pass<'_, W>) {
        for level in (0..=MAX_LIGHT_LEVEL).rev() {
            self.state = EngineState::Propagating { level };
            self.drain_darkenings(pass, level);
            self.drain_brightenings(pass, level);
        }
    }

    fn drain_darkenings<W: LightWorldAccess>(&mut self, pass: &mut Pass<'_, W>, level: u8) {
        let index = usize::from(level);
        self.darkening_queues[index].new_generation();

        while let Some(key) = self.darkening_queues[index].dequeue() {
            pass.advance(key);
            let Some(chunk) = pass.cursor.chunk else {
                continue;
            };

            let (cursor_key, cursor_pos) = (pass.cursor.key, pass.cursor.pos);

            // Something else already lit this position again.
            if pass.light(chunk, cursor_pos) >= level {
                continue;
            }

            let (luminosity, opacity) = pass.cursor_emission(chunk);
            if pass.calculate_light(luminosity, opacity) >= level {
                // Still lit from elsewhere: restore without spreading further.
                self.enqueue_brightening(pass, cursor_key, cursor_pos, chunk, level);
                continue;
            }

            // Only neighbors this position could not have lit are trusted as sources.
            let mut new_light = luminosity;
            pass.fetch_neighbors();
            for neighbor in pass.neighbors {
                let Some(neighbor_chunk) = neighbor.chunk else {
                    continue;
                };
                if neighbor.light == 0 {
                    continue;
                }

                let neighbor_opacity = pass.opacity(neighbor_chunk, neighbor.pos);
                if level.saturating_sub(neighbor_opacity) >= neighbor.light {
                    self.enqueue_darkening(
                        pass,
                        neighbor.key,
                        neighbor.pos,
                        neighbor_chunk,
                        neighbor.light,
                    );
                } else {
                    new_light = new_light.max(neighbor.light.saturating_sub(opacity));
                }
            }

            self.enqueue_brightening(pass, cursor_key, cursor_pos, chunk, new_light);
        }
    }

    fn drain_brightenings<W: LightWorldAccess>(&mut self, pass: &mut Pass<'_, W>, level: u8) {
        let index = usize::from(level);
        self.brightening_queues[index].new_generation();

        while let Some(key) = self.brightening_queues[index].dequeue() {
            pass.advance(key);
            let Some(chunk) = pass.cursor.chunk else {
                continue;
            };

            // Only spread if nothing changed here since this position was queued.
            if pass.light(chunk, pass.cursor.pos) != level {
                continue;
            }
            // Level 1 has nothing left to give.
            if level <= 1 {
                continue;
            }

            pass.fetch_neighbors();
            for neighbor in pass.neighbors {
                let Some(neighbor_chunk) = neighbor.chunk else {
                    continue;
                };
                if neighbor.light > level {
                    continue;
                }

                let candidate = level.saturating_sub(pass.opacity(neighbor_chunk, neighbor.pos));
                if candidate > neighbor.light {
                    self.enqueue_brightening(
                        pass,
                        neighbor.key,
                        neighbor.pos,
                        neighbor_chunk,
                        candidate,
                    );
                }
            }
        }
    }

    /// Writes `level` at `pos` and queues it to spread at that level.
    fn enqueue_brightening<W: LightWorldAccess>(
        &mut self,
        pass: &mut Pass<'_, W>,
        key: SpatialKey,
        pos: BlockPos,
        chunk: W::Chunk,
        level: u8,
    ) {
        self.brightening_queues[usize::from(level)].enqueue(key.position());
        pass.world.set_light(chunk, pass.layer, pos, level);
        pass.stats.brightenings += 1;
    }

    /// Zeroes `pos` and queues it for darkening from `old_light`.
    fn enqueue_darkening<W: LightWorldAccess>(
        &mut self,
        pass: &mut Pass<'_, W>,
        key: SpatialKey,
        pos: BlockPos,
        chunk: W::Chunk,
        old_light: u8,
    ) {
        self.darkening_queues[usize::from(old_light)].enqueue(key.position());
        pass.world.set_light(chunk, pass.layer, pos, 0);
        pass.stats.darkenings += 1;
    }
}

impl Default for LightingEngine {
    fn default() -> Self {
        Self::new()
    }
}
