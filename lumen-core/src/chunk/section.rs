//! This module contains the `BlockStorage` and `ChunkSection` structs.

use std::mem;

use lumen_utils::BlockId;

use crate::chunk::light_storage::LightStorage;

/// The number of blocks along each edge of a section.
pub const SECTION_SIZE: usize = 16;

const SECTION_VOLUME: usize = SECTION_SIZE * SECTION_SIZE * SECTION_SIZE;

#[inline]
const fn block_index(x: usize, y: usize, z: usize) -> usize {
    (y << 8) | (z << 4) | x
}

/// Block ids of one 16x16x16 section.
#[derive(Debug, Clone)]
pub enum BlockStorage {
    /// Every block in the section is the same.
    Homogeneous(BlockId),
    /// One id per block, indexed `y * 256 + z * 16 + x`.
    Heterogeneous(Box<[BlockId; SECTION_VOLUME]>),
}

impl BlockStorage {
    /// Gets the block at section-local coordinates.
    #[must_use]
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockId {
        debug_assert!(x < 16 && y < 16 && z < 16, "Coordinates must be 0-15");
        match self {
            Self::Homogeneous(id) => *id,
            Self::Heterogeneous(ids) => ids[block_index(x, y, z)],
        }
    }

    /// Sets the block at section-local coordinates, returning the previous one.
    pub fn set(&mut self, x: usize, y: usize, z: usize, value: BlockId) -> BlockId {
        debug_assert!(x < 16 && y < 16 && z < 16, "Coordinates must be 0-15");
        match self {
            Self::Homogeneous(id) if *id == value => value,
            Self::Homogeneous(id) => {
                let old = *id;
                let mut ids = Box::new([old; SECTION_VOLUME]);
                ids[block_index(x, y, z)] = value;
                *self = Self::Heterogeneous(ids);
                old
            }
            Self::Heterogeneous(ids) => mem::replace(&mut ids[block_index(x, y, z)], value),
        }
    }
}

/// A chunk section with its blocks and both light layers.
#[derive(Debug, Clone)]
pub struct ChunkSection {
    /// The blocks in the section.
    pub blocks: BlockStorage,
    /// Sky light levels.
    pub sky_light: LightStorage,
    /// Block light levels.
    pub block_light: LightStorage,
}

impl ChunkSection {
    /// Creates an all-air section with the given sky light and no block light.
    #[must_use]
    pub fn new(sky_light: LightStorage) -> Self {
        Self {
            blocks: BlockStorage::Homogeneous(BlockId::AIR),
            sky_light,
            block_light: LightStorage::default(),
        }
    }
}
