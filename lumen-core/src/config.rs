//! Lighting configuration loaded from JSON5.

use std::{fs, path::Path};

use serde::{Deserialize, de::DeserializeOwned};

use crate::error::ConfigError;
use crate::light_engine::{LightQueue, MAX_LIGHT_LEVEL};

/// Loads a JSON5 config from `path`, writing `default` there first if the file is missing.
///
/// # Errors
/// Returns an error if the file cannot be read or written, or does not parse as `T`.
pub fn load_or_create<T: DeserializeOwned>(path: &Path, default: &str) -> Result<T, ConfigError> {
    if !path.exists() {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, default)?;
        log::info!("Wrote default config to {}", path.display());
    }

    let config_str = fs::read_to_string(path)?;
    Ok(serde_json5::from_str(&config_str)?)
}

/// A block type as listed in the config's block catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockDefinition {
    /// Unique block name.
    pub name: String,
    /// Light emitted by the block, `0..=15`.
    #[serde(default)]
    pub luminance: u8,
    /// Light lost when passing through the block, `0..=15`. Zero counts as one during
    /// propagation but lets the sky through.
    #[serde(default)]
    pub opacity: u8,
}

impl BlockDefinition {
    /// Creates a catalog entry.
    #[must_use]
    pub fn new(name: impl Into<String>, luminance: u8, opacity: u8) -> Self {
        Self {
            name: name.into(),
            luminance,
            opacity,
        }
    }
}

/// Settings for a light world and its engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// Whether the world has a sky. Without one, sky light is zero everywhere.
    pub has_sky: bool,
    /// Initial capacity of every engine queue.
    pub queue_capacity: usize,
    /// Block types known to the world, in id order after air.
    pub blocks: Vec<BlockDefinition>,
}

impl LightConfig {
    /// Parses and validates a config from JSON5 text.
    ///
    /// # Errors
    /// Returns an error if the text does not parse or the values are out of range.
    pub fn from_json5(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json5::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable by the engine.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] describing the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid("Queue capacity must be greater than 0"));
        }
        if self.queue_capacity > 1 << 24 {
            return Err(ConfigError::Invalid("Queue capacity must be at most 16777216"));
        }
        for block in &self.blocks {
            if block.name.is_empty() {
                return Err(ConfigError::Invalid("Block names must not be empty"));
            }
            if block.luminance > MAX_LIGHT_LEVEL {
                return Err(ConfigError::Invalid("Block luminance must be in range 0..=15"));
            }
            if block.opacity > MAX_LIGHT_LEVEL {
                return Err(ConfigError::Invalid("Block opacity must be in range 0..=15"));
            }
        }
        Ok(())
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            has_sky: true,
            queue_capacity: LightQueue::DEFAULT_CAPACITY,
            blocks: vec![
                BlockDefinition::new("stone", 0, 15),
                BlockDefinition::new("dirt", 0, 15),
                BlockDefinition::new("glass", 0, 0),
                BlockDefinition::new("leaves", 0, 1),
                BlockDefinition::new("water", 0, 3),
                BlockDefinition::new("ice", 0, 3),
                BlockDefinition::new("torch", 14, 0),
                BlockDefinition::new("redstone_torch", 7, 0),
                BlockDefinition::new("glowstone", 15, 15),
                BlockDefinition::new("lava", 15, 0),
                BlockDefinition::new("lit_furnace", 13, 15),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let config = LightConfig::from_json5(
            r#"{
                // Nether-like world.
                has_sky: false,
                blocks: [
                    { name: "netherrack", opacity: 15 },
                    { name: "glowstone", luminance: 15, opacity: 15 },
                ],
            }"#,
        )
        .unwrap();

        assert!(!config.has_sky);
        assert_eq!(config.queue_capacity, LightQueue::DEFAULT_CAPACITY);
        assert_eq!(config.blocks.len(), 2);
        assert_eq!(config.blocks[0], BlockDefinition::new("netherrack", 0, 15));
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let bright = LightConfig::from_json5(r#"{ blocks: [{ name: "sun", luminance: 16 }] }"#);
        assert!(matches!(bright, Err(ConfigError::Invalid(_))));

        let empty = LightConfig::from_json5("{ queue_capacity: 0 }");
        assert!(matches!(empty, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_malformed_text() {
        let result = LightConfig::from_json5("{ has_sky: ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_default_is_valid() {
        assert!(LightConfig::default().validate().is_ok());
    }
}
