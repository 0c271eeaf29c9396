//! Deferred completion scheduling

use crate::deferred::CompletionTicket;

/// Runs a completion later, outside the write callback
///
/// Implementations hand the ticket to another execution context (a task,
/// a timer callback) which passes it to `Receiver::drain` after
/// `delay_ms`. The ticket must be delivered at most once.
pub trait CompletionScheduler {
    /// Scheduling error type
    type Error;

    /// Schedule one completion
    fn schedule_once(&mut self, delay_ms: u32, ticket: CompletionTicket) -> Result<(), Self::Error>;
}

impl<T: CompletionScheduler + ?Sized> CompletionScheduler for &mut T {
    type Error = T::Error;

    fn schedule_once(&mut self, delay_ms: u32, ticket: CompletionTicket) -> Result<(), Self::Error> {
        (**self).schedule_once(delay_ms, ticket)
    }
}
