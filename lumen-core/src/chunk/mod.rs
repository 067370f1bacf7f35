//! Chunk columns, sections and their light data.

pub mod light_chunk;
pub mod light_storage;
pub mod section;
pub mod sky_light_sources;

pub use light_chunk::{LightChunk, SECTION_COUNT};
pub use light_storage::LightStorage;
pub use section::{BlockStorage, ChunkSection, SECTION_SIZE};
pub use sky_light_sources::ChunkSkyLightSources;
