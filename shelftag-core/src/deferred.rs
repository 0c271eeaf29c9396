//! Deferred completion
//!
//! The write callback must return quickly, so a finished transfer is only
//! announced there. A [`CompletionTicket`] travels to another execution
//! context, which waits out the configured delay and calls
//! [`Receiver::drain`].
//!
//! ```text
//! radio callback                     completion task
//! ──────────────                     ───────────────
//! on_write("END")
//!   └─ SignalScheduler ── Signal ──▶ drain_next()
//!                                      ├─ delay_ms
//!                                      └─ lock receiver, drain(ticket)
//! ```

use core::convert::Infallible;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;
use shelftag_display::EpaperPanel;
use shelftag_protocol::Completion;

use crate::error::ReceiverError;
use crate::receiver::Receiver;
use crate::traits::{Advertiser, CompletionScheduler};

/// Permission to run one completion
///
/// Not `Clone`: a ticket is consumed by [`Receiver::drain`], so a
/// completion runs at most once. Tickets issued before a disconnect or an
/// aborted session are stale and drain to nothing.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CompletionTicket {
    generation: u32,
}

impl CompletionTicket {
    pub(crate) fn new(generation: u32) -> Self {
        Self { generation }
    }

    /// Session generation the ticket was issued for
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// A ticket and its delay, as posted to the completion task
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScheduledCompletion {
    /// Wait this long before draining (ms)
    pub delay_ms: u32,
    /// Ticket to drain
    pub ticket: CompletionTicket,
}

/// Signal carrying completions to the completion task
///
/// Only the latest completion is kept.
pub type CompletionSignal<M> = Signal<M, ScheduledCompletion>;

/// [`CompletionScheduler`] posting to a [`CompletionSignal`]
pub struct SignalScheduler<'a, M: RawMutex> {
    signal: &'a CompletionSignal<M>,
}

impl<'a, M: RawMutex> SignalScheduler<'a, M> {
    /// Create a scheduler for `signal`
    pub fn new(signal: &'a CompletionSignal<M>) -> Self {
        Self { signal }
    }
}

impl<M: RawMutex> CompletionScheduler for SignalScheduler<'_, M> {
    type Error = Infallible;

    fn schedule_once(&mut self, delay_ms: u32, ticket: CompletionTicket) -> Result<(), Infallible> {
        if self.signal.signaled() {
            warn!("Replacing an undrained completion");
        }
        self.signal.signal(ScheduledCompletion { delay_ms, ticket });
        Ok(())
    }
}

/// Wait for the next completion and run it
pub async fn drain_next<M, P, S, A, D, const N: usize>(
    signal: &CompletionSignal<M>,
    receiver: &Mutex<M, Receiver<P, S, A, N>>,
    delay: &mut D,
) -> Result<Option<Completion>, ReceiverError>
where
    M: RawMutex,
    P: EpaperPanel,
    S: CompletionScheduler,
    A: Advertiser,
    D: DelayNs,
{
    let ScheduledCompletion { delay_ms, ticket } = signal.wait().await;
    if delay_ms > 0 {
        delay.delay_ms(delay_ms).await;
    }
    receiver.lock().await.drain(ticket)
}

/// Completion task body
///
/// Runs completions forever and never returns; failures are logged and
/// the task carries on.
pub async fn run_completions<M, P, S, A, D, const N: usize>(
    signal: &CompletionSignal<M>,
    receiver: &Mutex<M, Receiver<P, S, A, N>>,
    mut delay: D,
) where
    M: RawMutex,
    P: EpaperPanel,
    S: CompletionScheduler,
    A: Advertiser,
    D: DelayNs,
{
    loop {
        match drain_next(signal, receiver, &mut delay).await {
            Ok(Some(completion)) => debug!("Completion ran: {} bytes", completion.len),
            Ok(None) => {}
            Err(e) => warn!("Completion failed: {:?}", e),
        }
    }
}
