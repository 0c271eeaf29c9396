//! Events that trigger state transitions

use super::machine::ErrorKind;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Link events
    /// Advertising started
    AdvertisingStarted,
    /// A central connected
    Connected,
    /// The central went away
    Disconnected,

    // Transfer events
    /// A write was accepted into the session
    WriteAccepted,
    /// The transfer ended; completion is scheduled
    TransferEnded,
    /// An early end signal was ignored, session keeps accumulating
    TransferResumed,
    /// Session dropped (overflow, truncation, stall)
    SessionAborted,
    /// Frame handed to the panel
    RenderComplete,

    // Faults
    /// Unrecoverable condition detected
    ErrorDetected(ErrorKind),
}
