//! # Lumen Utils
//!
//! Shared position types, integer math and logging setup for the lumen crates.

pub mod logger;
pub mod math;
mod types;

pub use types::{BlockId, BlockPos, ChunkPos, SectionPos};
