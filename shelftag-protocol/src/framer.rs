//! Sender side: framing a payload into characteristic writes
//!
//! The framer walks the virtual stream `header ++ payload` and copies one
//! chunk at a time into a caller-provided buffer, so nothing beyond the
//! current chunk is ever buffered.

use crate::chunk::{chunk_size_for_mtu, DEFAULT_MTU, MAX_CHUNK_LEN};
use crate::error::{SendError, TransferError};
use crate::header::{header_for_payload, Termination, END_MARKER, HEADER_LEN};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sender configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FramerConfig {
    /// Negotiated ATT MTU
    pub mtu: u16,
    /// Prepend the 4-byte length header
    pub include_header: bool,
    /// How the end of the transfer is signaled
    pub termination: Termination,
}

impl Default for FramerConfig {
    fn default() -> Self {
        Self {
            mtu: DEFAULT_MTU,
            include_header: true,
            termination: Termination::Marker,
        }
    }
}

/// Write side of the link
///
/// One call is one characteristic write. Implementations must deliver
/// writes in order and either deliver a write completely or fail it
/// (a GATT write-with-response does both).
pub trait ChunkTransport {
    /// Error reported by a failed write
    type Error;

    /// Write one chunk and wait for the peer to acknowledge it
    fn write(&mut self, chunk: &[u8]) -> Result<(), Self::Error>;
}

impl<T: ChunkTransport + ?Sized> ChunkTransport for &mut T {
    type Error = T::Error;

    fn write(&mut self, chunk: &[u8]) -> Result<(), Self::Error> {
        (**self).write(chunk)
    }
}

/// One characteristic write on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame<'a> {
    /// Bytes carried by the write
    pub bytes: &'a [u8],
    /// This write is the end-of-transfer marker
    pub is_terminator: bool,
}

/// Summary of a completed send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SendReport {
    /// Characteristic writes issued, terminator included
    pub writes: usize,
    /// Header and payload bytes sent
    pub bytes: usize,
    /// Whether the end marker was written
    pub terminated: bool,
}

/// Splits payloads into MTU-bounded writes
#[derive(Debug, Clone, Copy)]
pub struct Framer {
    config: FramerConfig,
    chunk_size: usize,
}

impl Framer {
    /// Create a framer, validating the MTU
    pub fn new(config: FramerConfig) -> Result<Self, TransferError> {
        let chunk_size = chunk_size_for_mtu(config.mtu)?;
        Ok(Self { config, chunk_size })
    }

    /// Active configuration
    pub fn config(&self) -> &FramerConfig {
        &self.config
    }

    /// Data bytes per write
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Walk the writes for `payload` without sending them
    pub fn frames<'p>(&self, payload: &'p [u8]) -> Result<Frames<'p>, TransferError> {
        if payload.is_empty() {
            return Err(TransferError::EmptyPayload);
        }

        let header = if self.config.include_header {
            Some(header_for_payload(payload.len())?)
        } else {
            None
        };

        Ok(Frames {
            header,
            payload,
            pos: 0,
            chunk_size: self.chunk_size,
            marker: self.config.termination == Termination::Marker,
            terminator_sent: false,
        })
    }

    /// Number of writes [`send`](Self::send) issues for `payload`
    pub fn frame_count(&self, payload: &[u8]) -> Result<usize, TransferError> {
        let mut frames = self.frames(payload)?;
        let mut count = 0;
        while frames.next_span().is_some() {
            count += 1;
        }
        if frames.marker {
            count += 1;
        }
        Ok(count)
    }

    /// Send `payload` over `transport`
    ///
    /// Writes are issued strictly in order. The first failed write aborts
    /// the transfer: no later chunk and no end marker is sent, and the
    /// receiver is left to abandon its session.
    pub fn send<T: ChunkTransport>(
        &self,
        transport: &mut T,
        payload: &[u8],
    ) -> Result<SendReport, SendError<T::Error>> {
        let mut frames = self.frames(payload)?;
        let mut buf = [0u8; MAX_CHUNK_LEN];
        let mut report = SendReport {
            writes: 0,
            bytes: 0,
            terminated: false,
        };

        debug!(
            "Sending {} payload bytes in chunks of {}",
            payload.len(),
            self.chunk_size
        );

        while let Some(frame) = frames.next_frame(&mut buf) {
            if let Err(error) = transport.write(frame.bytes) {
                error!("Write {} failed, aborting transfer", report.writes);
                return Err(SendError::TransportWriteFailure {
                    index: report.writes,
                    error,
                });
            }

            trace!("Write {}: {} bytes", report.writes, frame.bytes.len());
            report.writes += 1;
            if frame.is_terminator {
                report.terminated = true;
            } else {
                report.bytes += frame.bytes.len();
            }
        }

        info!("Transfer sent: {} writes", report.writes);
        Ok(report)
    }
}

/// Cursor over the writes of one transfer
///
/// Spans index the stream `header ++ payload` without joining the two, and
/// a span may be one byte shorter than the chunk size (see
/// [`next_span`](Self::next_span)). Write counts therefore come from
/// walking the cursor, not from [`chunk_count`](crate::chunk::chunk_count).
#[derive(Debug, Clone)]
pub struct Frames<'p> {
    header: Option<[u8; HEADER_LEN]>,
    payload: &'p [u8],
    pos: usize,
    chunk_size: usize,
    marker: bool,
    terminator_sent: bool,
}

impl<'p> Frames<'p> {
    fn header_len(&self) -> usize {
        if self.header.is_some() {
            HEADER_LEN
        } else {
            0
        }
    }

    fn total_len(&self) -> usize {
        self.header_len() + self.payload.len()
    }

    fn byte_at(&self, index: usize) -> u8 {
        match self.header {
            Some(header) if index < HEADER_LEN => header[index],
            _ => self.payload[index - self.header_len()],
        }
    }

    /// Advance past the next data chunk, returning its position in the stream
    ///
    /// A chunk that would read exactly like the end marker is cut one
    /// byte short; the byte opens the following chunk instead.
    fn next_span(&mut self) -> Option<(usize, usize)> {
        let remaining = self.total_len() - self.pos;
        if remaining == 0 {
            return None;
        }

        let start = self.pos;
        let mut len = remaining.min(self.chunk_size);
        if self.marker
            && len == END_MARKER.len()
            && (0..len).all(|i| self.byte_at(start + i) == END_MARKER[i])
        {
            len -= 1;
        }

        self.pos += len;
        Some((start, len))
    }

    /// Copy the next write into `buf`
    ///
    /// Returns `None` once every write, end marker included, was produced.
    pub fn next_frame<'b>(&mut self, buf: &'b mut [u8; MAX_CHUNK_LEN]) -> Option<Frame<'b>> {
        if let Some((start, len)) = self.next_span() {
            for (i, slot) in buf[..len].iter_mut().enumerate() {
                *slot = self.byte_at(start + i);
            }
            return Some(Frame {
                bytes: &buf[..len],
                is_terminator: false,
            });
        }

        if self.marker && !self.terminator_sent {
            self.terminator_sent = true;
            return Some(Frame {
                bytes: END_MARKER,
                is_terminator: true,
            });
        }

        None
    }

    /// Header and payload bytes not yet produced
    pub fn remaining(&self) -> usize {
        self.total_len() - self.pos
    }
}
