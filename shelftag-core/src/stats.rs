//! Transfer counters

/// Running totals since boot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferStats {
    /// Frames rendered
    pub completed: u32,
    /// Sessions dropped for exceeding capacity
    pub overflows: u32,
    /// Transfers that ended short
    pub truncated: u32,
    /// Completions that had trailing bytes trimmed
    pub overruns: u32,
    /// Sessions abandoned by the watchdog
    pub stalled: u32,
    /// Writes refused (busy, stray marker, no link, bad header)
    pub rejected: u32,
    /// Frames the panel failed to show
    pub render_failures: u32,
}

impl TransferStats {
    /// Sessions that did not end in a rendered frame
    pub fn failed(&self) -> u32 {
        self.overflows
            .saturating_add(self.truncated)
            .saturating_add(self.stalled)
            .saturating_add(self.render_failures)
    }
}
