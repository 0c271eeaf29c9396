//! Configuration type definitions
//!
//! These types describe one receiving tag: how it advertises, which panel
//! it drives and how transfers are framed on the wire.

use heapless::String;
use serde::{Deserialize, Serialize};
use shelftag_display::PanelGeometry;
use shelftag_protocol::{ReassemblyConfig, Termination, TruncationPolicy};

/// Current config format version
pub const CONFIG_VERSION: u8 = 1;

/// Maximum advertised name length
pub const MAX_NAME_LEN: usize = 16;

/// Advertised name used when none is configured
pub const DEFAULT_DEVICE_NAME: &str = "ShelfTag";

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Serialization failed (buffer too small)
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// TOML parsing failed
    TomlParse,
    /// Config version mismatch
    VersionMismatch {
        /// Version found in the stored config
        found: u8,
    },
    /// A field holds an unusable value
    InvalidField(&'static str),
    /// Backing storage failed
    Storage,
}

/// What the receiver does once a frame is on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum AfterRender {
    /// Keep the link as is
    StayConnected,
    /// Start advertising again for the next sender
    #[default]
    Readvertise,
}

/// Transfer framing and timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferConfig {
    /// Transfers start with the 4-byte length header
    pub include_header: bool,
    /// How the end of a transfer is recognized
    pub termination: Termination,
    /// Payload ceiling; `None` uses the receiver's storage size
    pub capacity_limit: Option<u32>,
    /// Payload size for header-less transfers
    pub fixed_payload_len: Option<u32>,
    /// Handling of early end signals
    pub truncation: TruncationPolicy,
    /// Delay between the end of a transfer and rendering (ms)
    pub completion_delay_ms: u32,
    /// Abandon a session idle for this long (ms); 0 disables
    pub stall_timeout_ms: u32,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            include_header: true,
            termination: Termination::Marker,
            capacity_limit: None,
            fixed_payload_len: None,
            truncation: TruncationPolicy::Abandon,
            completion_delay_ms: 100,
            stall_timeout_ms: 10_000,
        }
    }
}

impl TransferConfig {
    /// Reassembler settings derived from this config
    pub fn reassembly(&self) -> ReassemblyConfig {
        ReassemblyConfig {
            include_header: self.include_header,
            termination: self.termination,
            fixed_payload_len: self.fixed_payload_len.map(|n| n as usize),
            capacity_limit: self.capacity_limit.map(|n| n as usize),
            truncation: self.truncation,
        }
    }
}

/// Complete receiver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceiverConfig {
    /// Config format version
    pub version: u8,
    /// Advertised device name
    pub device_name: String<MAX_NAME_LEN>,
    /// Attached panel
    pub panel: PanelGeometry,
    /// Transfer settings
    pub transfer: TransferConfig,
    /// Post-render policy
    pub after_render: AfterRender,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiverConfig {
    /// Default configuration for the 2.13" tri-color tag
    pub fn new() -> Self {
        let mut device_name = String::new();
        // Fits: the default name is shorter than MAX_NAME_LEN
        let _ = device_name.push_str(DEFAULT_DEVICE_NAME);
        Self {
            version: CONFIG_VERSION,
            device_name,
            panel: PanelGeometry::SHELF_TAG_213,
            transfer: TransferConfig::default(),
            after_render: AfterRender::default(),
        }
    }

    /// Check the config for values the receiver cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch {
                found: self.version,
            });
        }
        if self.device_name.is_empty() {
            return Err(ConfigError::InvalidField("device_name"));
        }
        if self.panel.width == 0 || self.panel.height == 0 {
            return Err(ConfigError::InvalidField("panel"));
        }

        let transfer = &self.transfer;
        if let Some(limit) = transfer.capacity_limit {
            if (limit as usize) < self.panel.frame_len() {
                return Err(ConfigError::InvalidField("capacity_limit"));
            }
        }
        match transfer.fixed_payload_len {
            Some(len) if len == 0 || len % 2 != 0 => {
                return Err(ConfigError::InvalidField("fixed_payload_len"));
            }
            None if !transfer.include_header => {
                return Err(ConfigError::InvalidField("fixed_payload_len"));
            }
            _ => {}
        }

        Ok(())
    }
}
