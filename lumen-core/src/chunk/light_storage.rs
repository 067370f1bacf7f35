//! Light storage for chunk sections.
//!
//! Light values are stored as 4-bit values (0-15), packed as two values per byte.
//! For a 16x16x16 section, this requires 2048 bytes (4096 blocks / 2).

/// The number of bytes needed to store light data for a 16x16x16 section.
pub const LIGHT_ARRAY_SIZE: usize = 2048;

/// Byte offset and shift of the nibble holding `(x, y, z)`.
#[inline]
const fn nibble_slot(x: usize, y: usize, z: usize) -> (usize, u32) {
    let block_index = (y << 8) | (z << 4) | x;
    (block_index >> 1, ((block_index & 1) as u32) << 2)
}

/// Both nibbles of a byte set to `level`.
#[inline]
const fn packed(level: u8) -> u8 {
    (level & 0x0F) * 0x11
}

/// Light levels of one 16x16x16 section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LightStorage {
    /// Every block in the section has this level.
    Homogeneous(u8),
    /// Per-block levels packed as nibbles, lower nibble first.
    Packed(Box<[u8; LIGHT_ARRAY_SIZE]>),
}

impl LightStorage {
    /// Storage with every block at `light_level`.
    #[must_use]
    pub const fn filled(light_level: u8) -> Self {
        debug_assert!(light_level <= 15, "Light level must be 0-15");
        Self::Homogeneous(light_level)
    }

    /// Gets the light level at section-local coordinates.
    #[must_use]
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> u8 {
        debug_assert!(x < 16 && y < 16 && z < 16, "Coordinates must be 0-15");

        match self {
            Self::Homogeneous(level) => *level,
            Self::Packed(data) => {
                let (byte, shift) = nibble_slot(x, y, z);
                (data[byte] >> shift) & 0x0F
            }
        }
    }

    /// Sets the light level at section-local coordinates.
    ///
    /// Homogeneous storage unpacks on the first write of a different level.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, light_level: u8) {
        debug_assert!(x < 16 && y < 16 && z < 16, "Coordinates must be 0-15");
        debug_assert!(light_level <= 15, "Light level must be 0-15");

        let data = match self {
            Self::Homogeneous(level) if *level == light_level => return,
            Self::Homogeneous(level) => {
                *self = Self::Packed(Box::new([packed(*level); LIGHT_ARRAY_SIZE]));
                let Self::Packed(data) = self else {
                    unreachable!("storage was just unpacked")
                };
                data
            }
            Self::Packed(data) => data,
        };

        let (byte, shift) = nibble_slot(x, y, z);
        data[byte] = (data[byte] & !(0x0F << shift)) | ((light_level & 0x0F) << shift);
    }
}

impl Default for LightStorage {
    fn default() -> Self {
        Self::Homogeneous(0)
    }
}
