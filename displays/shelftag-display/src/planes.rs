//! Black/red plane handling
//!
//! The transfer payload is `black ++ red`; nothing on the wire marks the
//! boundary, so it is always the midpoint.

use heapless::Vec;

use crate::backend::DisplayError;

/// Borrowed black and red planes of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlanePair<'a> {
    /// Black plane
    pub black: &'a [u8],
    /// Red plane
    pub red: &'a [u8],
}

impl<'a> PlanePair<'a> {
    /// Pair two planes of equal length
    pub fn new(black: &'a [u8], red: &'a [u8]) -> Result<Self, DisplayError> {
        if black.len() != red.len() {
            return Err(DisplayError::UnevenPlanes);
        }
        Ok(Self { black, red })
    }

    /// Split a received frame at its midpoint
    pub fn split(frame: &'a [u8]) -> Result<Self, DisplayError> {
        if frame.len() % 2 != 0 {
            return Err(DisplayError::UnevenPlanes);
        }
        let (black, red) = frame.split_at(frame.len() / 2);
        Ok(Self { black, red })
    }

    /// Bytes per plane
    pub fn plane_len(&self) -> usize {
        self.black.len()
    }

    /// Bytes of the combined frame
    pub fn len(&self) -> usize {
        self.black.len() + self.red.len()
    }

    /// Whether both planes are empty
    pub fn is_empty(&self) -> bool {
        self.black.is_empty()
    }

    /// Write the combined frame (`black ++ red`) into `out`
    pub fn join_into<const N: usize>(&self, out: &mut Vec<u8, N>) -> Result<(), DisplayError> {
        out.clear();
        out.extend_from_slice(self.black)
            .and_then(|_| out.extend_from_slice(self.red))
            .map_err(|_| DisplayError::SizeMismatch {
                expected: N,
                actual: self.len(),
            })
    }
}
