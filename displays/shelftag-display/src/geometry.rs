//! Panel geometry
//!
//! Planes are packed row by row, 8 pixels per byte, MSB first. Each row is
//! padded to a whole byte, so a 122-pixel row takes 16 bytes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Panel dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanelGeometry {
    /// Pixels per row
    pub width: u16,
    /// Rows
    pub height: u16,
}

impl Default for PanelGeometry {
    fn default() -> Self {
        Self::SHELF_TAG_213
    }
}

impl PanelGeometry {
    /// 2.13" black/white/red panel, 122x250
    pub const SHELF_TAG_213: Self = Self::new(122, 250);

    /// Create a geometry
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Bytes per packed row
    pub const fn stride(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    /// Bytes per plane
    pub const fn plane_len(&self) -> usize {
        self.stride() * self.height as usize
    }

    /// Bytes per frame (black plane followed by red plane)
    pub const fn frame_len(&self) -> usize {
        2 * self.plane_len()
    }
}
