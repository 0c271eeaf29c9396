//! Panel backend trait
//!
//! Defines the interface to the e-paper panel driver.

/// Display errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with the panel controller
    Communication,
    /// Panel still refreshing
    Busy,
    /// Frame length is odd, planes cannot be split evenly
    UnevenPlanes,
    /// Plane length does not match the panel geometry
    SizeMismatch {
        /// Plane length the panel needs
        expected: usize,
        /// Plane length received
        actual: usize,
    },
}

/// E-paper panel driver
///
/// A full refresh takes seconds on tri-color panels, so `render` blocks for
/// a long time and must never run inside the BLE write callback.
pub trait EpaperPanel {
    /// Push both planes to the panel and refresh it
    ///
    /// - `black`: packed 1-bit black plane
    /// - `red`: packed 1-bit red plane, same length as `black`
    fn render(&mut self, black: &[u8], red: &[u8]) -> Result<(), DisplayError>;

    /// Panel dimensions
    fn geometry(&self) -> crate::PanelGeometry;

    /// Check if the panel can take a new frame
    fn is_ready(&self) -> bool {
        true
    }
}

impl<T: EpaperPanel + ?Sized> EpaperPanel for &mut T {
    fn render(&mut self, black: &[u8], red: &[u8]) -> Result<(), DisplayError> {
        (**self).render(black, red)
    }

    fn geometry(&self) -> crate::PanelGeometry {
        (**self).geometry()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}
