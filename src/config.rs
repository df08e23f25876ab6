//! Table configuration loaded from TOML.
//!
//! ```toml
//! channels = 10
//! capacity = 4096
//! ```

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, FifoError};

/// Default number of channels in a table.
pub const DEFAULT_CHANNELS: usize = 10;
/// Default capacity of each channel, in bytes.
pub const DEFAULT_CAPACITY: usize = 0x1000;

/// Shape of a [`ChannelTable`](crate::ChannelTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FifoConfig {
    /// Number of channels.
    pub channels: usize,
    /// Bytes of storage per channel.
    pub capacity: usize,
}

impl Default for FifoConfig {
    fn default() -> Self {
        Self {
            channels: DEFAULT_CHANNELS,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl FifoConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), FifoError> {
        if self.channels == 0 {
            return Err(FifoError::NoChannels);
        }
        if self.capacity == 0 {
            return Err(FifoError::InvalidCapacity);
        }
        Ok(())
    }
}
