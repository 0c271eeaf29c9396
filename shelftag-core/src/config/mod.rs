//! Configuration types
//!
//! Receiver configuration stored as postcard binary data, optionally
//! authored as a TOML document.

pub mod store;
#[cfg(feature = "toml")]
pub mod toml;
pub mod types;

pub use store::{decode_config, encode_config, load_or_default, save, ConfigStorage, MAX_CONFIG_SIZE};
#[cfg(feature = "toml")]
pub use self::toml::parse_config;
pub use types::*;
