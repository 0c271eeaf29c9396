//! Session watchdog
//!
//! A sender that aborts mid-transfer sends nothing more, so an open session
//! would otherwise hold the buffer until the link drops. The watchdog
//! counts idle time between writes and flags the session as stalled.

/// Watchdog status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchdogStatus {
    /// Nothing to report
    Ok,
    /// The open session saw no write for the whole timeout
    Stalled,
}

/// Idle timer for the open session
#[derive(Debug, Clone)]
pub struct SessionWatchdog {
    /// Timeout in ms, 0 disables
    timeout_ms: u32,
    /// Time since the last write (ms)
    idle_ms: u32,
    /// A session is open
    armed: bool,
}

impl SessionWatchdog {
    /// Create a watchdog; `timeout_ms == 0` disables it
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            timeout_ms,
            idle_ms: 0,
            armed: false,
        }
    }

    /// Record a write into an open session
    pub fn activity(&mut self) {
        self.idle_ms = 0;
        self.armed = true;
    }

    /// Stop watching (no open session)
    pub fn disarm(&mut self) {
        self.idle_ms = 0;
        self.armed = false;
    }

    /// Update time tracking
    ///
    /// # Arguments
    /// - `delta_ms`: Time elapsed since last update
    pub fn update_time(&mut self, delta_ms: u32) {
        if self.armed {
            self.idle_ms = self.idle_ms.saturating_add(delta_ms);
        }
    }

    /// Check for a stalled session
    pub fn check(&self) -> WatchdogStatus {
        if self.armed && self.timeout_ms > 0 && self.idle_ms >= self.timeout_ms {
            WatchdogStatus::Stalled
        } else {
            WatchdogStatus::Ok
        }
    }

    /// Check if a session is being watched
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Time since the last write (ms)
    pub fn idle_ms(&self) -> u32 {
        self.idle_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_watchdog_never_fires() {
        let mut watchdog = SessionWatchdog::new(1000);
        watchdog.update_time(5000);
        assert_eq!(watchdog.check(), WatchdogStatus::Ok);
        assert_eq!(watchdog.idle_ms(), 0);
    }

    #[test]
    fn test_stall_after_timeout() {
        let mut watchdog = SessionWatchdog::new(1000);
        watchdog.activity();
        watchdog.update_time(600);
        assert_eq!(watchdog.check(), WatchdogStatus::Ok);
        watchdog.update_time(400);
        assert_eq!(watchdog.check(), WatchdogStatus::Stalled);
    }

    #[test]
    fn test_activity_resets_timer() {
        let mut watchdog = SessionWatchdog::new(1000);
        watchdog.activity();
        watchdog.update_time(900);
        watchdog.activity();
        watchdog.update_time(900);
        assert_eq!(watchdog.check(), WatchdogStatus::Ok);
    }

    #[test]
    fn test_zero_timeout_disables() {
        let mut watchdog = SessionWatchdog::new(0);
        watchdog.activity();
        watchdog.update_time(u32::MAX);
        assert_eq!(watchdog.check(), WatchdogStatus::Ok);
    }

    #[test]
    fn test_disarm() {
        let mut watchdog = SessionWatchdog::new(10);
        watchdog.activity();
        watchdog.update_time(20);
        watchdog.disarm();
        assert!(!watchdog.is_armed());
        assert_eq!(watchdog.check(), WatchdogStatus::Ok);
    }
}
