//! Sky light source tracking for chunk columns.

use crate::light_engine::spatial_key::WORLD_HEIGHT;

/// Tracks, per XZ column of a chunk, the lowest Y that can see the sky.
///
/// A position sees the sky iff `y >= height(x, z)`. A column of only transparent blocks has
/// height 0; a column whose top layer blocks the sky has height [`WORLD_HEIGHT`].
#[derive(Debug, Clone)]
pub struct ChunkSkyLightSources {
    /// Stored in Z-major order: index = z * 16 + x
    heights: Box<[u16; 256]>,
}

impl ChunkSkyLightSources {
    /// Creates a tracker for a chunk with nothing blocking the sky.
    #[must_use]
    pub fn new() -> Self {
        Self {
            heights: Box::new([0; 256]),
        }
    }

    /// Gets the lowest sky-exposed Y of a column.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, z: usize) -> i32 {
        debug_assert!(x < 16 && z < 16, "Column coordinates must be 0-15");
        i32::from(self.heights[z * 16 + x])
    }

    #[inline]
    fn set(&mut self, x: usize, z: usize, y: i32) {
        debug_assert!((0..=WORLD_HEIGHT).contains(&y), "Height must be within the world");
        self.heights[z * 16 + x] = y as u16;
    }

    /// Whether the block at column-local `(x, y, z)` is exposed to the sky.
    #[inline]
    #[must_use]
    pub fn sees_sky(&self, x: usize, y: i32, z: usize) -> bool {
        y >= self.get(x, z)
    }

    /// Updates a column after the block at `y` changed.
    ///
    /// `blocks_sky` reports whether the block at a given Y of this column hides the sky and
    /// already reflects the change. Returns the old and new height if the column changed.
    pub fn update(
        &mut self,
        x: usize,
        y: i32,
        z: usize,
        blocks_sky: impl Fn(i32) -> bool,
    ) -> Option<(i32, i32)> {
        let old = self.get(x, z);
        let new = if blocks_sky(y) {
            old.max(y + 1)
        } else if y + 1 == old {
            // The top occluder was removed, look for the next one down.
            (0..y).rev().find(|&below| blocks_sky(below)).map_or(0, |top| top + 1)
        } else {
            old
        };

        if new == old {
            return None;
        }
        self.set(x, z, new);
        Some((old, new))
    }
}

impl Default for ChunkSkyLightSources {
    fn default() -> Self {
        Self::new()
    }
}
