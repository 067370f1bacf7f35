//! `SpatialKey` bit-packing for block positions.
//!
//! Every queue in the light engine stores positions as a single u64 so that enqueueing,
//! deduplication and neighbor stepping are plain integer operations.

use std::fmt;

use lumen_utils::BlockPos;

use super::direction::Direction;

/// A block position packed into a u64, optionally carrying a light level.
///
/// Bit layout:
/// ```text
/// Bit Position:  63....60  59..........52  51..........26  25...........0
///                | Level |  |     Y      |  |     X      |  |     Z      |
///                  4 bits      8 bits         26 bits         26 bits
/// ```
///
/// X and Z are biased by 2^25 so negative coordinates pack as unsigned fields. Y is stored
/// unbiased, which limits the world to `0..WORLD_HEIGHT`. Coordinates outside the
/// supported range are not checked and alias other positions.
///
/// The level nibble is only used by the brightening staging queue. Equality between keys
/// compares all 64 bits; use [`SpatialKey::position`] to compare positions only.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpatialKey(u64);

/// Number of bits used for the z coordinate.
const Z_BITS: u32 = 26;
/// Number of bits used for the x coordinate.
const X_BITS: u32 = 26;
/// Number of bits used for the y coordinate.
const Y_BITS: u32 = 8;

const Z_SHIFT: u32 = 0;
const X_SHIFT: u32 = Z_SHIFT + Z_BITS;
const Y_SHIFT: u32 = X_SHIFT + X_BITS;
const LEVEL_SHIFT: u32 = Y_SHIFT + Y_BITS;

const Z_MASK: u64 = (1 << Z_BITS) - 1;
const X_MASK: u64 = (1 << X_BITS) - 1;
const Y_MASK: u64 = (1 << Y_BITS) - 1;
const LEVEL_MASK: u64 = 0x0F;

const POSITION_MASK: u64 = (Y_MASK << Y_SHIFT) | (X_MASK << X_SHIFT) | (Z_MASK << Z_SHIFT);

/// Set after neighbor stepping when y left `0..WORLD_HEIGHT` in either direction.
const Y_OVERFLOW: u64 = 1 << (Y_SHIFT + Y_BITS);

/// Keeps only the chunk column part of x and z.
const CHUNK_MASK: u64 = ((X_MASK >> 4) << (4 + X_SHIFT)) | ((Z_MASK >> 4) << (4 + Z_SHIFT));

const X_BIAS: i64 = 1 << (X_BITS - 1);
const Z_BIAS: i64 = 1 << (Z_BITS - 1);

/// Number of block layers addressable by a key.
pub const WORLD_HEIGHT: i32 = 1 << Y_BITS;

/// Largest absolute horizontal coordinate a key can hold.
pub const HORIZONTAL_LIMIT: i32 = 1 << (X_BITS - 1);

impl SpatialKey {
    /// Packs world coordinates into a key.
    #[must_use]
    #[inline]
    pub const fn encode(x: i32, y: i32, z: i32) -> Self {
        debug_assert!(y >= 0 && y < WORLD_HEIGHT, "y must be inside the world");
        debug_assert!(
            x >= -HORIZONTAL_LIMIT && x < HORIZONTAL_LIMIT,
            "x must be inside the world"
        );
        debug_assert!(
            z >= -HORIZONTAL_LIMIT && z < HORIZONTAL_LIMIT,
            "z must be inside the world"
        );

        let y = (y as u64 & Y_MASK) << Y_SHIFT;
        let x = ((x as i64 + X_BIAS) as u64 & X_MASK) << X_SHIFT;
        let z = ((z as i64 + Z_BIAS) as u64 & Z_MASK) << Z_SHIFT;
        Self(y | x | z)
    }

    /// Unpacks the key into `(x, y, z)`, ignoring the level nibble.
    #[must_use]
    #[inline]
    pub const fn decode(self) -> (i32, i32, i32) {
        let x = ((self.0 >> X_SHIFT) & X_MASK) as i64 - X_BIAS;
        let y = (self.0 >> Y_SHIFT) & Y_MASK;
        let z = ((self.0 >> Z_SHIFT) & Z_MASK) as i64 - Z_BIAS;
        (x as i32, y as i32, z as i32)
    }

    /// Packs a block position.
    #[must_use]
    #[inline]
    pub const fn from_block_pos(pos: BlockPos) -> Self {
        Self::encode(pos.x(), pos.y(), pos.z())
    }

    /// Unpacks the key into a block position.
    #[must_use]
    #[inline]
    pub const fn to_block_pos(self) -> BlockPos {
        let (x, y, z) = self.decode();
        BlockPos::new(x, y, z)
    }

    /// Steps one block in `dir`.
    ///
    /// Returns `None` when the neighbor would be above or below the world.
    #[must_use]
    #[inline]
    pub const fn neighbor(self, dir: Direction) -> Option<Self> {
        let stepped = (self.0 & POSITION_MASK).wrapping_add(dir.key_delta());
        if stepped & Y_OVERFLOW != 0 {
            None
        } else {
            Some(Self(stepped))
        }
    }

    /// The key with the level nibble cleared.
    #[must_use]
    #[inline]
    pub const fn position(self) -> Self {
        Self(self.0 & POSITION_MASK)
    }

    /// Identifies the chunk column containing this position.
    ///
    /// Two keys share a chunk identity iff they lie in the same 16x16 column.
    #[must_use]
    #[inline]
    pub const fn chunk_identity(self) -> u64 {
        self.0 & CHUNK_MASK
    }

    /// The light level stored in the level nibble.
    #[must_use]
    #[inline]
    pub const fn level(self) -> u8 {
        ((self.0 >> LEVEL_SHIFT) & LEVEL_MASK) as u8
    }

    /// Returns this position with `level` stored in the level nibble.
    #[must_use]
    #[inline]
    pub const fn with_level(self, level: u8) -> Self {
        debug_assert!(level <= 15, "Light level must be 0-15");
        Self((self.0 & POSITION_MASK) | ((level as u64 & LEVEL_MASK) << LEVEL_SHIFT))
    }

    /// Builds the value added to a key to move by `(dx, dy, dz)`.
    ///
    /// Only meaningful for unit steps along a single axis.
    pub(super) const fn delta(dx: i64, dy: i64, dz: i64) -> u64 {
        ((dy << Y_SHIFT) + (dx << X_SHIFT) + (dz << Z_SHIFT)) as u64
    }
}

impl fmt::Debug for SpatialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y, z) = self.decode();
        f.debug_struct("SpatialKey")
            .field("x", &x)
            .field("y", &y)
            .field("z", &z)
            .field("level", &self.level())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let samples = [
            (0, 0, 0),
            (15, 255, 15),
            (-1, 64, -1),
            (-17, 1, 33),
            (HORIZONTAL_LIMIT - 1, 128, -HORIZONTAL_LIMIT),
            (-HORIZONTAL_LIMIT, 200, HORIZONTAL_LIMIT - 1),
            (123_456, 77, -987_654),
        ];

        for (x, y, z) in samples {
            assert_eq!(SpatialKey::encode(x, y, z).decode(), (x, y, z));
        }
    }

    #[test]
    fn test_level_does_not_change_position() {
        let key = SpatialKey::encode(-20, 90, 7);
        let tagged = key.with_level(13);

        assert_eq!(tagged.level(), 13);
        assert_eq!(tagged.decode(), (-20, 90, 7));
        assert_eq!(tagged.position(), key);
        assert_ne!(tagged, key);
        assert_eq!(tagged.with_level(2).level(), 2);
    }

    #[test]
    fn test_neighbor_leaves_world_vertically() {
        let bottom = SpatialKey::encode(4, 0, 4);
        assert!(bottom.neighbor(Direction::Down).is_none());
        assert_eq!(
            bottom.neighbor(Direction::Up).map(SpatialKey::decode),
            Some((4, 1, 4))
        );

        let top = SpatialKey::encode(4, WORLD_HEIGHT - 1, 4);
        assert!(top.neighbor(Direction::Up).is_none());
        assert_eq!(
            top.neighbor(Direction::Down).map(SpatialKey::decode),
            Some((4, WORLD_HEIGHT - 2, 4))
        );
    }

    #[test]
    fn test_neighbor_ignores_level_nibble() {
        // Bit 60 doubles as the overflow bit, so a tagged key must still step correctly.
        let tagged = SpatialKey::encode(0, 10, 0).with_level(15);
        assert_eq!(
            tagged.neighbor(Direction::West).map(SpatialKey::decode),
            Some((-1, 10, 0))
        );
    }

    #[test]
    fn test_neighbor_crosses_negative_axes() {
        let key = SpatialKey::encode(0, 10, 0);
        assert_eq!(
            key.neighbor(Direction::West).map(SpatialKey::decode),
            Some((-1, 10, 0))
        );
        assert_eq!(
            key.neighbor(Direction::North).map(SpatialKey::decode),
            Some((0, 10, -1))
        );
    }

    #[test]
    fn test_chunk_identity() {
        let a = SpatialKey::encode(0, 10, 0);
        let b = SpatialKey::encode(15, 200, 15);
        let c = SpatialKey::encode(16, 10, 0);
        let d = SpatialKey::encode(-1, 10, 0);

        assert_eq!(a.chunk_identity(), b.chunk_identity());
        assert_ne!(a.chunk_identity(), c.chunk_identity());
        assert_ne!(a.chunk_identity(), d.chunk_identity());
        assert_eq!(
            d.chunk_identity(),
            SpatialKey::encode(-16, 0, 15).chunk_identity()
        );
    }
}
