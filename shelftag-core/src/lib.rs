//! Board-agnostic receiver logic for ShelfTag labels
//!
//! This crate contains everything a receiving tag does that does not
//! depend on a specific radio stack or panel driver:
//!
//! - Receiver configuration and its persistence
//! - Link state machine
//! - Collaborator traits (advertiser, completion scheduler)
//! - Deferred completion over `embassy-sync` primitives
//! - Session watchdog and transfer counters
//!
//! A board wires a [`Receiver`] to its BLE stack: connection events call
//! `on_connect`/`on_disconnect`, characteristic writes call `on_write`, a
//! timer calls `poll`, and a completion task runs [`run_completions`].
//!
//! # Features
//!
//! - `toml`: parse [`ReceiverConfig`] from TOML documents (`config::toml`).
//!   Needs an allocator. Its tests only build with the feature on:
//!   `cargo test -p shelftag-core --features toml`.
//! - `defmt` / `log`: route log output to `defmt` or the `log` facade.
//!   Enable at most one; with neither, logging compiles to nothing.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod deferred;
pub mod error;
pub mod receiver;
pub mod state;
pub mod stats;
pub mod traits;
pub mod watchdog;

#[cfg(test)]
mod testing;

pub use config::{AfterRender, ConfigError, ReceiverConfig, TransferConfig};
pub use deferred::{
    drain_next, run_completions, CompletionSignal, CompletionTicket, ScheduledCompletion,
    SignalScheduler,
};
pub use error::ReceiverError;
pub use receiver::Receiver;
pub use state::{ErrorKind, Event, State};
pub use stats::TransferStats;
pub use traits::{Advertiser, CompletionScheduler};
pub use watchdog::{SessionWatchdog, WatchdogStatus};
