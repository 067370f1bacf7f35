//! Incremental light propagation with per-level work queues.

mod access;
mod chunk_cache;
pub mod direction;
mod engine;
pub mod light_queue;
pub mod spatial_key;

// Re-export main types for convenience
pub use access::{BlockLightInfo, LightLayer, LightWorldAccess};
pub use direction::Direction;
pub use engine::{EngineState, LightUpdateStats, LightingEngine, MAX_LIGHT_LEVEL};
pub use light_queue::LightQueue;
pub use spatial_key::SpatialKey;
