//! ShelfTag Image Transfer Protocol
//!
//! This crate moves a two-plane e-paper image from a sender to a ShelfTag
//! over a single BLE GATT characteristic. One characteristic write carries
//! at most `mtu - 3` bytes, so the image is framed, split into chunks and
//! reassembled on the tag.
//!
//! # Wire Format
//!
//! ```text
//! write 0        write 1 .. n-1            write n
//! ┌────────┬─────────┐┌─────────────────┐ ┌───────┐
//! │ LEN 4B │ data... ││ data...         │ │ "END" │
//! └────────┴─────────┘└─────────────────┘ └───────┘
//! ```
//!
//! `LEN` is a little-endian `u32` counting itself plus the payload. Both the
//! header and the end marker are optional per configuration; without a
//! header the receiver expects a fixed payload size, without the marker it
//! completes once the announced byte count has arrived.
//!
//! There is no acknowledgement, retransmission or encryption at this layer:
//! writes-with-response already give in-order, lossless delivery.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod chunk;
pub mod error;
pub mod framer;
pub mod header;
pub mod reassembler;

pub use chunk::{chunk, chunk_size_for_mtu, ATT_WRITE_OVERHEAD, DEFAULT_MTU, MAX_CHUNK_LEN, MAX_MTU, MIN_MTU};
pub use error::{SendError, TransferError};
pub use framer::{ChunkTransport, Frame, Framer, FramerConfig, Frames, SendReport};
pub use header::{decode_header, encode_header, Termination, END_MARKER, HEADER_LEN};
pub use reassembler::{
    Completion, Phase, ReassemblyConfig, Reassembler, TruncationPolicy, WriteOutcome,
};
