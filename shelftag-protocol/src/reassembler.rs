//! Receiver side: reassembly state machine
//!
//! Driven once per characteristic write. The reassembler never hands data
//! out from inside [`Reassembler::on_write`]: when a transfer ends it
//! reports [`WriteOutcome::CompletionPending`] and the caller runs
//! [`Reassembler::complete_with`] later, from another execution context.
//!
//! ```text
//!        write          header complete        END / byte count
//! Idle ─────────▶ AwaitingHeader ─────────▶ Accumulating ─────────▶ Draining
//!  ▲                                                                   │
//!  └───────────────────── complete_with / reset ───────────────────────┘
//! ```

use heapless::Vec;

use crate::error::TransferError;
use crate::header::{decode_header, is_end_marker, payload_len_from_header, Termination, HEADER_LEN};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What happens to a session whose end arrived too early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TruncationPolicy {
    /// Treat the end signal as spurious and keep accumulating
    KeepOpen,
    /// Drop the session and wait for a new transfer
    #[default]
    Abandon,
}

/// Receiver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReassemblyConfig {
    /// Transfers start with the 4-byte length header
    pub include_header: bool,
    /// How the end of a transfer is recognized
    pub termination: Termination,
    /// Payload size when transfers carry no header
    pub fixed_payload_len: Option<usize>,
    /// Payload ceiling, at most the storage size; `None` uses the storage size
    pub capacity_limit: Option<usize>,
    /// Handling of early end signals
    pub truncation: TruncationPolicy,
}

impl Default for ReassemblyConfig {
    fn default() -> Self {
        Self {
            include_header: true,
            termination: Termination::Marker,
            fixed_payload_len: None,
            capacity_limit: None,
            truncation: TruncationPolicy::Abandon,
        }
    }
}

/// Position of the session in the reassembly cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// No transfer in flight
    Idle,
    /// Part of the header has arrived
    AwaitingHeader,
    /// Payload size known, collecting payload bytes
    Accumulating,
    /// Transfer ended, completion not yet run
    Draining,
}

/// Result of feeding one write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteOutcome {
    /// Header still incomplete; more writes needed
    AwaitingHeader {
        /// Header bytes received so far
        buffered: usize,
    },
    /// Payload bytes collected so far
    Accumulating {
        /// Payload bytes received
        received: usize,
        /// Payload bytes announced
        expected: usize,
    },
    /// The transfer ended; run [`Reassembler::complete_with`]
    CompletionPending,
}

/// Successful end of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Completion {
    /// Payload bytes handed over
    pub len: usize,
    /// Trailing bytes discarded past the announced size
    pub trimmed: usize,
}

/// Reassembly state for the one in-flight transfer
#[derive(Debug, Clone)]
struct TransferSession<const N: usize> {
    /// Header bytes seen so far
    header: Vec<u8, HEADER_LEN>,
    /// Payload size, once known
    expected_size: Option<usize>,
    /// Payload bytes, header stripped
    buffer: Vec<u8, N>,
    /// End of transfer seen
    end_received: bool,
}

impl<const N: usize> TransferSession<N> {
    const fn new() -> Self {
        Self {
            header: Vec::new(),
            expected_size: None,
            buffer: Vec::new(),
            end_received: false,
        }
    }

    fn clear(&mut self) {
        self.header.clear();
        self.expected_size = None;
        self.buffer.clear();
        self.end_received = false;
    }
}

/// Reassembles one transfer at a time into `N` bytes of storage
#[derive(Debug, Clone)]
pub struct Reassembler<const N: usize> {
    config: ReassemblyConfig,
    capacity: usize,
    session: TransferSession<N>,
}

impl<const N: usize> Reassembler<N> {
    /// Create a reassembler
    ///
    /// Fails if the capacity limit exceeds `N`, or if header-less
    /// transfers are configured without a payload size that fits.
    pub fn new(config: ReassemblyConfig) -> Result<Self, TransferError> {
        let capacity = config.capacity_limit.unwrap_or(N);
        if capacity == 0 || capacity > N {
            return Err(TransferError::InvalidConfiguration);
        }

        if !config.include_header {
            match config.fixed_payload_len {
                Some(len) if len > 0 && len <= capacity => {}
                _ => return Err(TransferError::InvalidConfiguration),
            }
        }

        Ok(Self {
            config,
            capacity,
            session: TransferSession::new(),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &ReassemblyConfig {
        &self.config
    }

    /// Payload ceiling in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        let session = &self.session;
        if session.end_received {
            Phase::Draining
        } else if session.expected_size.is_some() {
            Phase::Accumulating
        } else if session.header.is_empty() {
            Phase::Idle
        } else {
            Phase::AwaitingHeader
        }
    }

    /// Announced payload size, once known
    pub fn expected_size(&self) -> Option<usize> {
        self.session.expected_size
    }

    /// Payload bytes received so far
    pub fn received(&self) -> usize {
        self.session.buffer.len()
    }

    /// Discard the session
    pub fn reset(&mut self) {
        self.session.clear();
    }

    /// Feed one characteristic write
    pub fn on_write(&mut self, raw: &[u8]) -> Result<WriteOutcome, TransferError> {
        if self.session.end_received {
            warn!("Write of {} bytes while draining, rejected", raw.len());
            return Err(TransferError::SessionBusy);
        }

        if self.config.termination == Termination::Marker && is_end_marker(raw) {
            if self.phase() == Phase::Idle {
                warn!("End marker with no transfer in flight");
                return Err(TransferError::NoTransfer);
            }
            debug!("End marker after {} payload bytes", self.session.buffer.len());
            self.session.end_received = true;
            return Ok(WriteOutcome::CompletionPending);
        }

        let mut data = raw;
        if self.session.expected_size.is_none() {
            if self.config.include_header {
                let missing = HEADER_LEN - self.session.header.len();
                let (head, rest) = raw.split_at(missing.min(raw.len()));
                // Cannot fail: `head` is no longer than the missing part
                let _ = self.session.header.extend_from_slice(head);

                let Some(total) = decode_header(&self.session.header) else {
                    trace!("Header incomplete: {} bytes", self.session.header.len());
                    return Ok(WriteOutcome::AwaitingHeader {
                        buffered: self.session.header.len(),
                    });
                };

                let expected = match payload_len_from_header(total) {
                    Ok(expected) => expected,
                    Err(e) => {
                        error!("Invalid header value {}", total);
                        self.session.clear();
                        return Err(e);
                    }
                };
                if expected > self.capacity {
                    error!(
                        "Header announces {} bytes, capacity is {}",
                        expected,
                        self.capacity
                    );
                    self.session.clear();
                    return Err(TransferError::BufferOverflow {
                        limit: self.capacity,
                        attempted: expected,
                    });
                }

                debug!("Header parsed: expecting {} payload bytes", expected);
                self.session.expected_size = Some(expected);
                data = rest;
            } else {
                match self.config.fixed_payload_len {
                    Some(len) if len > 0 => self.session.expected_size = Some(len),
                    _ => return Err(TransferError::InvalidConfiguration),
                }
            }
        }

        let attempted = self.session.buffer.len() + data.len();
        if attempted > self.capacity {
            error!(
                "Buffer overflow: {} bytes exceeds capacity {}, clearing session",
                attempted,
                self.capacity
            );
            self.session.clear();
            return Err(TransferError::BufferOverflow {
                limit: self.capacity,
                attempted,
            });
        }
        self.session
            .buffer
            .extend_from_slice(data)
            .map_err(|_| TransferError::BufferOverflow {
                limit: self.capacity,
                attempted,
            })?;

        let received = self.session.buffer.len();
        let expected = self.session.expected_size.unwrap_or(0);
        trace!("Received {}/{} payload bytes", received, expected);

        if self.config.termination == Termination::Length && received >= expected {
            debug!("Announced size reached");
            self.session.end_received = true;
            return Ok(WriteOutcome::CompletionPending);
        }

        Ok(WriteOutcome::Accumulating { received, expected })
    }

    /// Run the completion check of an ended transfer
    ///
    /// On success `deliver` receives exactly the announced payload and the
    /// session is reset afterwards. Excess trailing bytes are dropped with a
    /// warning. A short transfer is reported as
    /// [`TransferError::TruncatedTransfer`] and handled per
    /// [`TruncationPolicy`]; a transfer that ended inside its header reports
    /// the header width as expected size.
    pub fn complete_with<R>(
        &mut self,
        deliver: impl FnOnce(&[u8]) -> R,
    ) -> Result<(Completion, R), TransferError> {
        if !self.session.end_received {
            return Err(TransferError::NoTransfer);
        }

        let Some(expected) = self.session.expected_size else {
            let received = self.session.header.len();
            return Err(self.truncated(HEADER_LEN, received));
        };

        let received = self.session.buffer.len();
        if received < expected {
            return Err(self.truncated(expected, received));
        }

        let trimmed = received - expected;
        if trimmed > 0 {
            warn!(
                "Overrun: {} bytes past announced {}, trimming",
                trimmed,
                expected
            );
            self.session.buffer.truncate(expected);
        }

        let out = deliver(&self.session.buffer);
        self.session.clear();

        info!("Transfer complete: {} bytes", expected);
        Ok((Completion { len: expected, trimmed }, out))
    }

    fn truncated(&mut self, expected: usize, received: usize) -> TransferError {
        warn!(
            "Truncated transfer: expected {} bytes, received {}",
            expected,
            received
        );
        match self.config.truncation {
            TruncationPolicy::KeepOpen => self.session.end_received = false,
            TruncationPolicy::Abandon => self.session.clear(),
        }
        TransferError::TruncatedTransfer { expected, received }
    }
}
