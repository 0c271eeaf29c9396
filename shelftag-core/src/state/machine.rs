//! State machine definition
//!
//! Advertising and write handling are a function of the current state
//! and an event.

use super::events::Event;

/// Receiver states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Power-on, not yet advertising
    Boot,
    /// Waiting for a central
    Advertising,
    /// Central connected, no transfer in flight
    Connected,
    /// Transfer in flight
    Receiving,
    /// Transfer ended, waiting for the deferred render
    Draining,
    /// Fault detected; restart advertising to recover
    Error(ErrorKind),
}

/// Types of errors that can occur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// The radio refused to advertise
    AdvertiseFailed,
    /// Panel controller stopped responding
    PanelFault,
}

impl State {
    /// Check if a central is connected
    pub fn is_connected(&self) -> bool {
        matches!(self, State::Connected | State::Receiving | State::Draining)
    }

    /// Check if characteristic writes are processed
    ///
    /// Writes during `Draining` still reach the reassembler, which rejects
    /// them as busy.
    pub fn accepts_writes(&self) -> bool {
        self.is_connected()
    }

    /// Check if this is an error state
    pub fn is_error(&self) -> bool {
        matches!(self, State::Error(_))
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use State::*;

        match (self, event) {
            // Advertising (re)starts from anywhere off-link
            (Boot, Event::AdvertisingStarted) => Advertising,
            (Error(_), Event::AdvertisingStarted) => Advertising,
            (Advertising, Event::Connected) => Connected,

            // Connected transitions
            (Connected, Event::WriteAccepted) => Receiving,
            (Connected, Event::TransferEnded) => Draining,

            // Receiving transitions
            (Receiving, Event::WriteAccepted) => Receiving,
            (Receiving, Event::TransferEnded) => Draining,
            (Receiving, Event::SessionAborted) => Connected,

            // Draining transitions
            (Draining, Event::RenderComplete) => Connected,
            (Draining, Event::TransferResumed) => Receiving,
            (Draining, Event::SessionAborted) => Connected,

            // Link loss always returns to advertising
            (Connected | Receiving | Draining, Event::Disconnected) => Advertising,

            (_, Event::ErrorDetected(kind)) => Error(kind),

            // Default: stay in current state
            _ => self,
        }
    }
}
