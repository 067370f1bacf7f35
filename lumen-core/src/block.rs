//! Block types and their light properties.

use lumen_utils::BlockId;
use rustc_hash::FxHashMap;

use crate::config::BlockDefinition;
use crate::error::RegistryError;
use crate::light_engine::MAX_LIGHT_LEVEL;

/// Light properties of a registered block type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockProperties {
    /// Unique block name.
    pub name: String,
    /// Light emitted by the block.
    pub luminance: u8,
    /// Raw light attenuation. The engine treats anything below one as one.
    pub opacity: u8,
}

impl BlockProperties {
    /// Whether the block hides the sky from everything below it.
    #[must_use]
    pub const fn blocks_sky(&self) -> bool {
        self.opacity > 0
    }
}

/// Maps block ids to their light properties.
///
/// Id 0 is always air: no luminance and no opacity.
#[derive(Debug, Clone)]
pub struct BlockRegistry {
    blocks: Vec<BlockProperties>,
    by_name: FxHashMap<String, BlockId>,
}

impl BlockRegistry {
    /// Name of the block registered as [`BlockId::AIR`].
    pub const AIR_NAME: &'static str = "air";

    /// Creates a registry holding only air.
    #[must_use]
    pub fn new() -> Self {
        let mut by_name = FxHashMap::default();
        by_name.insert(Self::AIR_NAME.to_owned(), BlockId::AIR);
        Self {
            blocks: vec![BlockProperties {
                name: Self::AIR_NAME.to_owned(),
                luminance: 0,
                opacity: 0,
            }],
            by_name,
        }
    }

    /// Creates a registry with air followed by `definitions`, in order.
    ///
    /// # Errors
    /// Returns an error if two definitions share a name or one is named `air`.
    pub fn from_definitions(definitions: &[BlockDefinition]) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for definition in definitions {
            registry.register(&definition.name, definition.luminance, definition.opacity)?;
        }
        Ok(registry)
    }

    /// Registers a block type, clamping its values to `0..=15`.
    ///
    /// # Errors
    /// Returns an error if the name is taken or no ids are left.
    pub fn register(
        &mut self,
        name: &str,
        luminance: u8,
        opacity: u8,
    ) -> Result<BlockId, RegistryError> {
        if self.by_name.contains_key(name) {
            return Err(RegistryError::DuplicateBlock(name.to_owned()));
        }
        let id = u16::try_from(self.blocks.len())
            .map(BlockId)
            .map_err(|_| RegistryError::Full(self.blocks.len()))?;

        self.blocks.push(BlockProperties {
            name: name.to_owned(),
            luminance: luminance.min(MAX_LIGHT_LEVEL),
            opacity: opacity.min(MAX_LIGHT_LEVEL),
        });
        self.by_name.insert(name.to_owned(), id);
        log::trace!("Registered block {name} as {}", id.0);
        Ok(id)
    }

    /// Gets the properties of a block id.
    #[must_use]
    pub fn get(&self, id: BlockId) -> Option<&BlockProperties> {
        self.blocks.get(usize::from(id.0))
    }

    /// Looks up a block id by name.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    /// Number of registered block types, air included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always `false`: air is registered on creation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}
