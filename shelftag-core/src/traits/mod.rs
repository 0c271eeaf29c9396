//! Collaborator traits
//!
//! These traits define the interface between the receiver logic and the
//! radio stack and executor of a board. The panel boundary lives in
//! `shelftag_display::EpaperPanel`.

pub mod advertiser;
pub mod scheduler;

pub use advertiser::Advertiser;
pub use scheduler::CompletionScheduler;
