//! Length header and end-of-transfer marker
//!
//! A transfer optionally starts with a 4-byte little-endian length. The
//! value counts the header itself, so a 3812-byte image travels with a
//! header of 3816:
//!
//! ```text
//! ┌──────────────┬──────────────────────────┬─────────┐
//! │ TOTAL (u32)  │ PAYLOAD                  │ "END"   │
//! │ 4B, LE       │ TOTAL - 4 bytes          │ 3B      │
//! └──────────────┴──────────────────────────┴─────────┘
//! ```

use crate::error::TransferError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Width of the length header in bytes
pub const HEADER_LEN: usize = 4;

/// End-of-transfer marker, sent as a write of its own
pub const END_MARKER: &[u8; 3] = b"END";

/// Encode a header value (already including [`HEADER_LEN`])
pub fn encode_header(total: u32) -> [u8; HEADER_LEN] {
    total.to_le_bytes()
}

/// Decode a header value from the first four bytes of `bytes`
///
/// Returns `None` while fewer than [`HEADER_LEN`] bytes are available.
pub fn decode_header(bytes: &[u8]) -> Option<u32> {
    let raw: [u8; HEADER_LEN] = bytes.get(..HEADER_LEN)?.try_into().ok()?;
    Some(u32::from_le_bytes(raw))
}

/// Header value announcing a payload of `payload_len` bytes
pub fn header_for_payload(payload_len: usize) -> Result<[u8; HEADER_LEN], TransferError> {
    let total = payload_len
        .checked_add(HEADER_LEN)
        .and_then(|t| u32::try_from(t).ok())
        .ok_or(TransferError::InvalidConfiguration)?;
    Ok(encode_header(total))
}

/// Payload length announced by a decoded header value
///
/// A header must announce at least one payload byte.
pub fn payload_len_from_header(total: u32) -> Result<usize, TransferError> {
    match (total as usize).checked_sub(HEADER_LEN) {
        Some(len) if len > 0 => Ok(len),
        _ => Err(TransferError::InvalidHeader { declared: total }),
    }
}

/// How the receiver learns that a transfer is over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Termination {
    /// An explicit [`END_MARKER`] write follows the last chunk
    #[default]
    Marker,
    /// The transfer ends once the announced byte count has arrived
    Length,
}

/// Whether a single write is the end-of-transfer marker
pub fn is_end_marker(raw: &[u8]) -> bool {
    raw == END_MARKER
}
