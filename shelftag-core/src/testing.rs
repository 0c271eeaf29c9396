//! Test doubles for the collaborator traits

use std::string::String;
use std::vec::Vec;

use shelftag_display::{DisplayError, EpaperPanel, PanelGeometry};

use crate::deferred::CompletionTicket;
use crate::traits::{Advertiser, CompletionScheduler};

/// Panel recording every frame it was asked to show
pub struct MockPanel {
    pub geometry: PanelGeometry,
    pub frames: Vec<(Vec<u8>, Vec<u8>)>,
    pub fail_with: Option<DisplayError>,
    pub ready: bool,
}

impl MockPanel {
    pub fn new() -> Self {
        Self {
            geometry: PanelGeometry::SHELF_TAG_213,
            frames: Vec::new(),
            fail_with: None,
            ready: true,
        }
    }
}

impl EpaperPanel for MockPanel {
    fn render(&mut self, black: &[u8], red: &[u8]) -> Result<(), DisplayError> {
        if let Some(e) = self.fail_with {
            return Err(e);
        }
        self.frames.push((black.to_vec(), red.to_vec()));
        Ok(())
    }

    fn geometry(&self) -> PanelGeometry {
        self.geometry
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}

/// Scheduler keeping tickets until a test drains them
#[derive(Default)]
pub struct MockScheduler {
    pub scheduled: Vec<(u32, CompletionTicket)>,
    pub fail: bool,
}

impl MockScheduler {
    /// Oldest scheduled ticket
    pub fn take(&mut self) -> CompletionTicket {
        assert!(!self.scheduled.is_empty(), "no completion scheduled");
        self.scheduled.remove(0).1
    }
}

impl CompletionScheduler for MockScheduler {
    type Error = ();

    fn schedule_once(&mut self, delay_ms: u32, ticket: CompletionTicket) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.scheduled.push((delay_ms, ticket));
        Ok(())
    }
}

/// Advertiser recording each start
#[derive(Default)]
pub struct MockAdvertiser {
    pub names: Vec<String>,
    pub fail: bool,
}

impl Advertiser for MockAdvertiser {
    type Error = ();

    fn start_advertising(&mut self, name: &str) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.names.push(name.into());
        Ok(())
    }
}
