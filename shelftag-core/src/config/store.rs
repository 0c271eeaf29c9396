//! Configuration persistence
//!
//! Receiver config travels as postcard binary data. Boards provide the
//! storage; an empty or unreadable store falls back to defaults.

use super::types::{ConfigError, ReceiverConfig, CONFIG_VERSION};

/// Maximum serialized config size (binary)
pub const MAX_CONFIG_SIZE: usize = 128;

/// Backing store for the serialized config (flash page, EEPROM, file)
pub trait ConfigStorage {
    /// Storage error type
    type Error;

    /// Read the stored blob into `buf`, returning its length
    ///
    /// Returns `Ok(0)` when nothing has been stored yet.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Replace the stored blob
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

/// Serialize a config into `buf`
pub fn encode_config<'a>(
    config: &ReceiverConfig,
    buf: &'a mut [u8],
) -> Result<&'a mut [u8], ConfigError> {
    postcard::to_slice(config, buf).map_err(|_| ConfigError::Serialize)
}

/// Deserialize and validate a config
pub fn decode_config(bytes: &[u8]) -> Result<ReceiverConfig, ConfigError> {
    let config: ReceiverConfig =
        postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;

    if config.version != CONFIG_VERSION {
        warn!(
            "Config version mismatch: found {}, expected {}",
            config.version,
            CONFIG_VERSION
        );
        return Err(ConfigError::VersionMismatch {
            found: config.version,
        });
    }

    config.validate()?;
    Ok(config)
}

/// Write a config to storage
pub fn save<S: ConfigStorage>(storage: &mut S, config: &ReceiverConfig) -> Result<(), ConfigError> {
    config.validate()?;
    let mut buffer = [0u8; MAX_CONFIG_SIZE];
    let bytes = encode_config(config, &mut buffer)?;
    storage.write(bytes).map_err(|_| ConfigError::Storage)?;
    debug!("Stored {} bytes of config", bytes.len());
    Ok(())
}

/// Load the stored config, falling back to defaults
pub fn load_or_default<S: ConfigStorage>(storage: &mut S) -> ReceiverConfig {
    let mut buffer = [0u8; MAX_CONFIG_SIZE];
    let len = match storage.read(&mut buffer) {
        Ok(0) => {
            info!("No stored config, using defaults");
            return ReceiverConfig::default();
        }
        Ok(len) => len.min(MAX_CONFIG_SIZE),
        Err(_) => {
            warn!("Config storage read failed, using defaults");
            return ReceiverConfig::default();
        }
    };

    debug!("Read {} bytes of binary config", len);
    match decode_config(&buffer[..len]) {
        Ok(config) => {
            info!("Configuration loaded: {}", config.device_name.as_str());
            config
        }
        Err(e) => {
            warn!("Stored config unusable ({:?}), using defaults", e);
            ReceiverConfig::default()
        }
    }
}
