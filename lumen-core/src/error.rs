//! Error types for the light engine, its configuration and the block registry.

use std::io;

use crate::light_engine::EngineState;

/// Errors returned by [`LightingEngine`](crate::light_engine::LightingEngine).
#[derive(Debug, thiserror::Error)]
pub enum LightError {
    /// A pass was started while another one had not finished.
    #[error("light engine is already processing updates (state: {0})")]
    AlreadyUpdating(EngineState),
}

/// Errors raised while loading a [`LightConfig`](crate::config::LightConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading or writing the config file failed.
    #[error("config file i/o failed: {0}")]
    Io(#[from] io::Error),

    /// The config file is not valid JSON5 for the expected layout.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json5::Error),

    /// The config parsed but holds values the engine cannot use.
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Errors raised while building a [`BlockRegistry`](crate::block::BlockRegistry).
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A block with this name is already registered.
    #[error("block `{0}` is already registered")]
    DuplicateBlock(String),

    /// Every block id is taken.
    #[error("block registry is full ({0} blocks)")]
    Full(usize),
}
