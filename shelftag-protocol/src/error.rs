//! Transfer error taxonomy
//!
//! Sender-side failures abort the whole transfer. Receiver-side fatal
//! errors reset the session. An overrun is not an error: it is reported
//! through [`Completion::trimmed`](crate::reassembler::Completion).

/// Errors raised by the codec, the framer and the reassembler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferError {
    /// Chunk size, MTU or capacity outside the supported range
    InvalidConfiguration,
    /// Nothing to send
    EmptyPayload,
    /// Session would grow past its capacity limit; session was cleared
    BufferOverflow {
        /// Capacity limit in bytes
        limit: usize,
        /// Size the buffer would have reached
        attempted: usize,
    },
    /// End of transfer signaled before the declared size arrived
    TruncatedTransfer {
        /// Payload bytes declared by the header (or configured)
        expected: usize,
        /// Payload bytes actually received
        received: usize,
    },
    /// Header value too small to cover its own width
    InvalidHeader {
        /// Raw value found on the wire
        declared: u32,
    },
    /// A write arrived while the previous transfer is still draining
    SessionBusy,
    /// Completion was requested but no transfer has ended
    NoTransfer,
}

/// Errors returned by [`Framer::send`](crate::framer::Framer::send)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendError<E> {
    /// The transfer could not be framed
    Framing(TransferError),
    /// A chunk write failed; nothing after it was sent
    TransportWriteFailure {
        /// Zero-based index of the failed write
        index: usize,
        /// Error reported by the transport
        error: E,
    },
}

impl<E> From<TransferError> for SendError<E> {
    fn from(e: TransferError) -> Self {
        SendError::Framing(e)
    }
}
