// Wrapper types making it harder to accidentaly use the wrong underlying type.

use std::fmt::{self, Display};

use crate::math::{vector2::Vector2, vector3::Vector3};

// A raw block id. Using the registry this id can be resolved into the block's light properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockId(pub u16);

impl BlockId {
    /// The id every registry reserves for air.
    pub const AIR: Self = Self(0);
}

// A chunk column position. `y` holds the chunk's z coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkPos(pub Vector2<i32>);

impl ChunkPos {
    /// Creates a chunk position from chunk coordinates.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self(Vector2::new(x, z))
    }
}

impl Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.0.x, self.0.y)
    }
}

// A block position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockPos(pub Vector3<i32>);

impl BlockPos {
    /// Creates a block position from world coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self(Vector3::new(x, y, z))
    }

    /// The x coordinate.
    #[must_use]
    pub const fn x(self) -> i32 {
        self.0.x
    }

    /// The y coordinate.
    #[must_use]
    pub const fn y(self) -> i32 {
        self.0.y
    }

    /// The z coordinate.
    #[must_use]
    pub const fn z(self) -> i32 {
        self.0.z
    }

    /// Returns this position moved by the given offset.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.0.x + dx, self.0.y + dy, self.0.z + dz)
    }

    /// The chunk column containing this position.
    #[must_use]
    pub const fn chunk_pos(self) -> ChunkPos {
        ChunkPos::new(self.0.x >> 4, self.0.z >> 4)
    }

    /// The position relative to its chunk column, as `(x, y, z)` with x and z in `0..16`.
    #[must_use]
    pub const fn chunk_local(self) -> (usize, usize, usize) {
        (
            (self.0.x & 15) as usize,
            self.0.y as usize,
            (self.0.z & 15) as usize,
        )
    }

    /// The section containing this position.
    #[must_use]
    pub const fn section_pos(self) -> SectionPos {
        SectionPos::new(self.0.x >> 4, self.0.y >> 4, self.0.z >> 4)
    }

    /// Manhattan distance between two positions.
    #[must_use]
    pub const fn manhattan_distance(self, other: Self) -> i32 {
        (self.0.x - other.0.x).abs() + (self.0.y - other.0.y).abs() + (self.0.z - other.0.z).abs()
    }
}

impl Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0.x, self.0.y, self.0.z)
    }
}

// A 16x16x16 section position, in section coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionPos(pub Vector3<i32>);

impl SectionPos {
    /// Creates a section position from section coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self(Vector3::new(x, y, z))
    }

    /// The chunk column containing this section.
    #[must_use]
    pub const fn chunk_pos(self) -> ChunkPos {
        ChunkPos::new(self.0.x, self.0.z)
    }

    /// The section's index within its column.
    #[must_use]
    pub const fn y(self) -> i32 {
        self.0.y
    }
}

impl Display for SectionPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.0.x, self.0.y, self.0.z)
    }
}
