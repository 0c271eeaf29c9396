//! Receiver errors

use shelftag_display::DisplayError;
use shelftag_protocol::TransferError;

use crate::config::ConfigError;

/// Errors reported by [`Receiver`](crate::receiver::Receiver)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReceiverError {
    /// Reassembly rejected a write or a completion
    Transfer(TransferError),
    /// The panel refused the frame
    Display(DisplayError),
    /// Advertising could not be started
    Advertise,
    /// The completion could not be scheduled; the session was dropped
    Schedule,
    /// Unusable configuration
    Config(ConfigError),
    /// No central is connected
    NotConnected,
}

impl From<TransferError> for ReceiverError {
    fn from(e: TransferError) -> Self {
        ReceiverError::Transfer(e)
    }
}

impl From<DisplayError> for ReceiverError {
    fn from(e: DisplayError) -> Self {
        ReceiverError::Display(e)
    }
}

impl From<ConfigError> for ReceiverError {
    fn from(e: ConfigError) -> Self {
        ReceiverError::Config(e)
    }
}
