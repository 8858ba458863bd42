//! Stored engine configuration
//!
//! The tuning a shell persists between launches, encoded with postcard
//! behind a magic number, format version and CRC32.

use serde::{Deserialize, Serialize};

use super::types::{ConfigError, EngineConfig};

/// Magic number to identify stored config data
pub const STORED_CONFIG_MAGIC: u32 = 0x5041_4345; // "PACE"

/// Current stored config format version
pub const STORED_CONFIG_VERSION: u8 = 1;

/// Upper bound on the encoded size of a [`StoredConfig`]
pub const MAX_STORED_CONFIG_SIZE: usize = 64;

/// Engine configuration with a validation header
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StoredConfig {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// The persisted tuning
    pub config: EngineConfig,
    /// CRC32 over magic, version and the encoded config
    pub crc: u32,
}

impl StoredConfig {
    /// Wrap a config and compute its checksum
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let mut stored = Self {
            magic: STORED_CONFIG_MAGIC,
            version: STORED_CONFIG_VERSION,
            config,
            crc: 0,
        };
        stored.crc = stored.calculate_crc()?;
        Ok(stored)
    }

    /// Calculate CRC32 for the data (excluding the crc field itself)
    pub fn calculate_crc(&self) -> Result<u32, ConfigError> {
        let mut buf = [0u8; MAX_STORED_CONFIG_SIZE];
        let config_bytes =
            postcard::to_slice(&self.config, &mut buf).map_err(|_| ConfigError::Encode)?;

        let mut crc: u32 = 0xFFFF_FFFF;
        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        crc = crc32_update(crc, config_bytes);
        Ok(!crc)
    }

    /// Encode into `buf`, returning the used prefix
    pub fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Encode)
    }

    /// Decode and verify stored bytes, returning the validated config
    pub fn decode(bytes: &[u8]) -> Result<EngineConfig, ConfigError> {
        let stored: StoredConfig =
            postcard::from_bytes(bytes).map_err(|_| ConfigError::Decode)?;

        if stored.magic != STORED_CONFIG_MAGIC {
            return Err(ConfigError::BadMagic);
        }
        if stored.version != STORED_CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch);
        }
        if stored.crc != stored.calculate_crc()? {
            return Err(ConfigError::Checksum);
        }

        stored.config.validate()?;
        Ok(stored.config)
    }
}

/// CRC32 update (IEEE 802.3 polynomial, reflected)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}
