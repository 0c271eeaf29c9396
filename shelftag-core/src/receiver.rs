//! Receiver context
//!
//! One `Receiver` serves one characteristic. It owns the reassembly
//! session and the injected collaborators, and is driven by radio events
//! (`on_connect`, `on_write`, `on_disconnect`), by deferred completions
//! (`drain`) and by a periodic `poll`.
//!
//! `on_write` runs in the radio stack's callback and never touches the
//! panel. When a transfer ends it hands a [`CompletionTicket`] to the
//! scheduler; the frame is rendered when that ticket comes back through
//! `drain`.

use shelftag_display::{DisplayError, EpaperPanel, PlanePair};
use shelftag_protocol::{
    chunk_size_for_mtu, Completion, Phase, Reassembler, TransferError, TruncationPolicy,
    WriteOutcome, DEFAULT_MTU,
};

use crate::config::{AfterRender, ConfigError, ReceiverConfig};
use crate::deferred::CompletionTicket;
use crate::error::ReceiverError;
use crate::state::{ErrorKind, Event, State};
use crate::stats::TransferStats;
use crate::traits::{Advertiser, CompletionScheduler};
use crate::watchdog::{SessionWatchdog, WatchdogStatus};

/// Receiving side of the image transfer, with `N` bytes of frame storage
pub struct Receiver<P, S, A, const N: usize> {
    config: ReceiverConfig,
    reassembler: Reassembler<N>,
    panel: P,
    scheduler: S,
    advertiser: A,
    state: State,
    /// Negotiated ATT MTU of the current link
    mtu: u16,
    /// Session counter; tickets from older sessions are stale
    generation: u32,
    /// A ticket for the current generation is out
    pending: bool,
    watchdog: SessionWatchdog,
    stats: TransferStats,
}

impl<P, S, A, const N: usize> Receiver<P, S, A, N>
where
    P: EpaperPanel,
    S: CompletionScheduler,
    A: Advertiser,
{
    /// Create a receiver
    ///
    /// Fails if the config is invalid or its capacity does not fit in `N`.
    pub fn new(
        config: ReceiverConfig,
        panel: P,
        scheduler: S,
        advertiser: A,
    ) -> Result<Self, ReceiverError> {
        config.validate()?;
        let reassembler = Reassembler::new(config.transfer.reassembly())?;
        if reassembler.capacity() < config.panel.frame_len() {
            error!(
                "Capacity {} cannot hold a {}-byte frame",
                reassembler.capacity(),
                config.panel.frame_len()
            );
            return Err(ConfigError::InvalidField("capacity_limit").into());
        }

        if panel.geometry() != config.panel {
            warn!(
                "Panel is {}x{}, config says {}x{}",
                panel.geometry().width,
                panel.geometry().height,
                config.panel.width,
                config.panel.height
            );
        }

        let watchdog = SessionWatchdog::new(config.transfer.stall_timeout_ms);
        Ok(Self {
            config,
            reassembler,
            panel,
            scheduler,
            advertiser,
            state: State::Boot,
            mtu: DEFAULT_MTU,
            generation: 0,
            pending: false,
            watchdog,
            stats: TransferStats::default(),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }

    /// Current link state
    pub fn state(&self) -> State {
        self.state
    }

    /// Reassembly phase of the current session
    pub fn phase(&self) -> Phase {
        self.reassembler.phase()
    }

    /// Counters since boot
    pub fn stats(&self) -> TransferStats {
        self.stats
    }

    /// MTU of the current (or last) link
    pub fn mtu(&self) -> u16 {
        self.mtu
    }

    /// Current session generation
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// The panel
    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// The panel, mutably
    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    /// The completion scheduler, mutably
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// The advertiser
    pub fn advertiser(&self) -> &A {
        &self.advertiser
    }

    /// The advertiser, mutably
    pub fn advertiser_mut(&mut self) -> &mut A {
        &mut self.advertiser
    }

    /// Start advertising
    ///
    /// Also the way out of [`State::Error`].
    pub fn start(&mut self) -> Result<(), ReceiverError> {
        self.advertise()
    }

    /// A central connected with the given ATT MTU
    pub fn on_connect(&mut self, mtu: u16) -> Result<(), ReceiverError> {
        let chunk_size = chunk_size_for_mtu(mtu)?;
        if self.state.is_connected() {
            warn!("Connect while connected, dropping session");
        }

        self.drop_session();
        self.mtu = mtu;
        self.apply(Event::Connected);
        info!("Central connected, mtu {} ({} bytes per write)", mtu, chunk_size);
        Ok(())
    }

    /// The central disconnected
    ///
    /// Drops any session (pending completions become stale) and advertises
    /// again.
    pub fn on_disconnect(&mut self) -> Result<(), ReceiverError> {
        info!(
            "Central disconnected ({} session bytes dropped)",
            self.reassembler.received()
        );
        self.drop_session();
        self.apply(Event::Disconnected);
        self.advertise()
    }

    /// Handle one characteristic write
    ///
    /// Safe to call from the radio callback: rendering is only scheduled
    /// here, never performed.
    pub fn on_write(&mut self, raw: &[u8]) -> Result<WriteOutcome, ReceiverError> {
        if !self.state.accepts_writes() {
            warn!("Write of {} bytes in state {:?}", raw.len(), self.state);
            self.stats.rejected += 1;
            return Err(ReceiverError::NotConnected);
        }

        match self.reassembler.on_write(raw) {
            Ok(WriteOutcome::CompletionPending) => self.schedule_completion(),
            Ok(outcome) => {
                self.watchdog.activity();
                self.apply(Event::WriteAccepted);
                Ok(outcome)
            }
            Err(e) => Err(self.write_rejected(e)),
        }
    }

    /// Run a scheduled completion
    ///
    /// Renders the frame and applies the post-render policy. Returns
    /// `Ok(None)` for a stale ticket. A panel that is not ready fails the
    /// frame with [`DisplayError::Busy`] instead of blocking.
    pub fn drain(&mut self, ticket: CompletionTicket) -> Result<Option<Completion>, ReceiverError> {
        if !self.pending || ticket.generation() != self.generation {
            warn!(
                "Ignoring stale completion (generation {}, current {})",
                ticket.generation(),
                self.generation
            );
            return Ok(None);
        }
        self.pending = false;

        let panel = &mut self.panel;
        let result = self.reassembler.complete_with(|frame| {
            if !panel.is_ready() {
                return Err(DisplayError::Busy);
            }
            let planes = PlanePair::split(frame)?;
            debug!(
                "Rendering black {} bytes, red {} bytes",
                planes.black.len(),
                planes.red.len()
            );
            panel.render(planes.black, planes.red)
        });

        match result {
            Ok((completion, Ok(()))) => {
                self.stats.completed += 1;
                if completion.trimmed > 0 {
                    self.stats.overruns += 1;
                }
                self.apply(Event::RenderComplete);
                info!("Frame of {} bytes on panel", completion.len);
                self.after_render()?;
                Ok(Some(completion))
            }
            Ok((_, Err(e))) => {
                error!("Render failed: {:?}", e);
                self.stats.render_failures += 1;
                if e == DisplayError::Communication {
                    self.apply(Event::ErrorDetected(ErrorKind::PanelFault));
                } else {
                    self.apply(Event::RenderComplete);
                }
                Err(e.into())
            }
            Err(e @ TransferError::TruncatedTransfer { .. }) => {
                self.stats.truncated += 1;
                match self.config.transfer.truncation {
                    TruncationPolicy::KeepOpen => {
                        self.watchdog.activity();
                        self.apply(Event::TransferResumed);
                    }
                    TruncationPolicy::Abandon => self.abort_session(),
                }
                Err(e.into())
            }
            Err(e) => {
                self.abort_session();
                Err(e.into())
            }
        }
    }

    /// Advance the session watchdog
    ///
    /// # Arguments
    /// - `delta_ms`: Time elapsed since last poll
    pub fn poll(&mut self, delta_ms: u32) -> WatchdogStatus {
        self.watchdog.update_time(delta_ms);
        let status = self.watchdog.check();
        if status == WatchdogStatus::Stalled {
            warn!(
                "Session stalled for {} ms with {} bytes, abandoning",
                self.watchdog.idle_ms(),
                self.reassembler.received()
            );
            self.stats.stalled += 1;
            self.abort_session();
        }
        status
    }

    fn schedule_completion(&mut self) -> Result<WriteOutcome, ReceiverError> {
        self.watchdog.disarm();
        self.pending = true;
        self.apply(Event::TransferEnded);

        let delay_ms = self.config.transfer.completion_delay_ms;
        let ticket = CompletionTicket::new(self.generation);
        if self.scheduler.schedule_once(delay_ms, ticket).is_err() {
            error!("Could not schedule completion, dropping session");
            self.abort_session();
            return Err(ReceiverError::Schedule);
        }

        debug!("Completion scheduled in {} ms", delay_ms);
        Ok(WriteOutcome::CompletionPending)
    }

    fn write_rejected(&mut self, e: TransferError) -> ReceiverError {
        match e {
            // Session untouched
            TransferError::SessionBusy | TransferError::NoTransfer => self.stats.rejected += 1,
            TransferError::BufferOverflow { .. } => {
                self.stats.overflows += 1;
                self.abort_session();
            }
            _ => {
                self.stats.rejected += 1;
                self.abort_session();
            }
        }
        e.into()
    }

    fn after_render(&mut self) -> Result<(), ReceiverError> {
        match self.config.after_render {
            AfterRender::StayConnected => Ok(()),
            AfterRender::Readvertise => self.advertise(),
        }
    }

    fn advertise(&mut self) -> Result<(), ReceiverError> {
        let name = self.config.device_name.as_str();
        if self.advertiser.start_advertising(name).is_err() {
            error!("Failed to start advertising");
            // A live link keeps working without advertising
            if !self.state.is_connected() {
                self.apply(Event::ErrorDetected(ErrorKind::AdvertiseFailed));
            }
            return Err(ReceiverError::Advertise);
        }

        info!("Advertising as {}", name);
        self.apply(Event::AdvertisingStarted);
        Ok(())
    }

    /// Drop the session and invalidate outstanding tickets
    fn drop_session(&mut self) {
        self.reassembler.reset();
        self.generation = self.generation.wrapping_add(1);
        self.pending = false;
        self.watchdog.disarm();
    }

    fn abort_session(&mut self) {
        self.drop_session();
        self.apply(Event::SessionAborted);
    }

    fn apply(&mut self, event: Event) {
        let next = self.state.transition(event);
        if next != self.state {
            debug!("State {:?} -> {:?}", self.state, next);
        }
        self.state = next;
    }
}
