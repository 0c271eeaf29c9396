//! TOML configuration documents
//!
//! ```toml
//! [device]
//! name = "ShelfTag"
//! after_render = "readvertise"
//!
//! [panel]
//! width = 122
//! height = 250
//!
//! [transfer]
//! include_header = true
//! termination = "marker"
//! truncation = "abandon"
//! completion_delay_ms = 100
//! stall_timeout_ms = 10000
//! ```
//!
//! Every key is optional; missing keys keep their defaults.

extern crate alloc;

use alloc::string::String;
use serde::Deserialize;
use shelftag_protocol::{Termination, TruncationPolicy};

use super::types::{AfterRender, ConfigError, ReceiverConfig};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Document {
    device: DeviceSection,
    panel: PanelSection,
    transfer: TransferSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DeviceSection {
    name: Option<String>,
    after_render: Option<AfterRender>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PanelSection {
    width: Option<u16>,
    height: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TransferSection {
    include_header: Option<bool>,
    termination: Option<Termination>,
    capacity_limit: Option<u32>,
    fixed_payload_len: Option<u32>,
    truncation: Option<TruncationPolicy>,
    completion_delay_ms: Option<u32>,
    stall_timeout_ms: Option<u32>,
}

/// Parse a TOML document into a validated config
pub fn parse_config(input: &str) -> Result<ReceiverConfig, ConfigError> {
    let doc: Document = ::toml::from_str(input).map_err(|_| {
        warn!("TOML config parse error");
        ConfigError::TomlParse
    })?;

    let mut config = ReceiverConfig::new();

    if let Some(name) = doc.device.name {
        config.device_name.clear();
        config
            .device_name
            .push_str(&name)
            .map_err(|_| ConfigError::InvalidField("device_name"))?;
    }
    if let Some(policy) = doc.device.after_render {
        config.after_render = policy;
    }

    if let Some(width) = doc.panel.width {
        config.panel.width = width;
    }
    if let Some(height) = doc.panel.height {
        config.panel.height = height;
    }

    let t = doc.transfer;
    let transfer = &mut config.transfer;
    if let Some(v) = t.include_header {
        transfer.include_header = v;
    }
    if let Some(v) = t.termination {
        transfer.termination = v;
    }
    if t.capacity_limit.is_some() {
        transfer.capacity_limit = t.capacity_limit;
    }
    if t.fixed_payload_len.is_some() {
        transfer.fixed_payload_len = t.fixed_payload_len;
    }
    if let Some(v) = t.truncation {
        transfer.truncation = v;
    }
    if let Some(v) = t.completion_delay_ms {
        transfer.completion_delay_ms = v;
    }
    if let Some(v) = t.stall_timeout_ms {
        transfer.stall_timeout_ms = v;
    }

    config.validate()?;
    Ok(config)
}
