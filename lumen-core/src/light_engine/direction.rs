//! Cardinal direction enum for light propagation.

use lumen_utils::BlockPos;

use super::spatial_key::SpatialKey;

/// Six cardinal directions for light propagation.
///
/// The ordinal values (0-5) index the engine's neighbor scratch array, so iteration order
/// over [`Direction::ALL`] is also the order neighbors are visited in.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Downward (-Y direction)
    Down = 0,
    /// Upward (+Y direction)
    Up = 1,
    /// North (-Z direction)
    North = 2,
    /// South (+Z direction)
    South = 3,
    /// West (-X direction)
    West = 4,
    /// East (+X direction)
    East = 5,
}

impl Direction {
    /// All six directions in array form for iteration.
    pub const ALL: [Direction; 6] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Key deltas for each direction, indexed by ordinal.
    const KEY_DELTAS: [u64; 6] = [
        SpatialKey::delta(0, -1, 0),
        SpatialKey::delta(0, 1, 0),
        SpatialKey::delta(0, 0, -1),
        SpatialKey::delta(0, 0, 1),
        SpatialKey::delta(-1, 0, 0),
        SpatialKey::delta(1, 0, 0),
    ];

    /// Gets the offset in the given direction.
    ///
    /// Returns (dx, dy, dz) for this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32, i32) {
        match self {
            Self::Down => (0, -1, 0),
            Self::Up => (0, 1, 0),
            Self::North => (0, 0, -1),
            Self::South => (0, 0, 1),
            Self::West => (-1, 0, 0),
            Self::East => (1, 0, 0),
        }
    }

    /// The value added to a [`SpatialKey`] to step one block in this direction.
    #[must_use]
    #[inline]
    pub const fn key_delta(self) -> u64 {
        Self::KEY_DELTAS[self as usize]
    }

    /// Returns a new `BlockPos` relative to the given position in this direction.
    #[must_use]
    pub const fn relative(self, pos: BlockPos) -> BlockPos {
        let (dx, dy, dz) = self.offset();
        pos.offset(dx, dy, dz)
    }
}
