//! MTU-bounded chunking
//!
//! Every characteristic write carries at most `mtu - ATT_WRITE_OVERHEAD`
//! bytes: the ATT Write Request opcode (1 byte) and attribute handle
//! (2 bytes) share the MTU with the data.

use core::slice::Chunks;

use crate::error::TransferError;

/// Per-write ATT overhead (opcode + handle)
pub const ATT_WRITE_OVERHEAD: u16 = 3;

/// Smallest MTU that still leaves one data byte per write
pub const MIN_MTU: u16 = ATT_WRITE_OVERHEAD + 1;

/// Largest ATT MTU allowed by the Bluetooth core specification
pub const MAX_MTU: u16 = 517;

/// Default ATT MTU before any exchange takes place
pub const DEFAULT_MTU: u16 = 23;

/// Largest data chunk a single write can carry
pub const MAX_CHUNK_LEN: usize = (MAX_MTU - ATT_WRITE_OVERHEAD) as usize;

/// Data bytes per write for a negotiated MTU
pub fn chunk_size_for_mtu(mtu: u16) -> Result<usize, TransferError> {
    if !(MIN_MTU..=MAX_MTU).contains(&mtu) {
        return Err(TransferError::InvalidConfiguration);
    }
    Ok((mtu - ATT_WRITE_OVERHEAD) as usize)
}

/// Split `data` into pieces of at most `chunk_size` bytes
///
/// The sequence is lazy and has `ceil(len / chunk_size)` items; only the
/// last one may be shorter. Calling again with the same inputs yields the
/// same sequence.
pub fn chunk(data: &[u8], chunk_size: usize) -> Result<Chunks<'_, u8>, TransferError> {
    if chunk_size == 0 {
        return Err(TransferError::InvalidConfiguration);
    }
    Ok(data.chunks(chunk_size))
}

/// Number of chunks [`chunk`] produces
pub fn chunk_count(len: usize, chunk_size: usize) -> Result<usize, TransferError> {
    if chunk_size == 0 {
        return Err(TransferError::InvalidConfiguration);
    }
    Ok(len.div_ceil(chunk_size))
}
