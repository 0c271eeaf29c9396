//! E-paper display boundary for ShelfTag
//!
//! This crate provides:
//! - `PanelGeometry` for the packed 1-bit-per-pixel plane layout
//! - `PlanePair` to split a received frame into black and red planes
//! - `EpaperPanel` trait implemented by board crates for the panel driver
//!
//! # Frame Layout
//!
//! A frame is the black plane followed by the red plane. Both planes have
//! the same length; the split point is never sent, both sides recompute it
//! as half the frame length.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod backend;
pub mod geometry;
pub mod planes;

// Re-export key types
pub use backend::{DisplayError, EpaperPanel};
pub use geometry::PanelGeometry;
pub use planes::PlanePair;
