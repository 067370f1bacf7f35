//! # Lumen Core
//!
//! Incremental light propagation for chunked voxel worlds.
//!
//! The [`LightingEngine`](light_engine::LightingEngine) keeps sky and block light consistent
//! after blocks change. It works against any world implementing
//! [`LightWorldAccess`](light_engine::LightWorldAccess); [`LightWorld`](world::LightWorld)
//! is an in-memory implementation built from a [`LightConfig`](config::LightConfig).

pub mod block;
pub mod chunk;
pub mod config;
pub mod error;
pub mod light_engine;
pub mod world;
