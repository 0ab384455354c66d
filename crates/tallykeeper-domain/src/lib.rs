//! Tallykeeper Domain Layer
//!
//! Core value types and collaborator interfaces for the housekeeping scheduler
//! of a battery-powered counting device. This crate has no external
//! dependencies: it defines the state the scheduler maintains and the traits
//! through which it talks to the rest of the firmware.
//!
//! ## Key Concepts
//!
//! - **Detection counters**: the set of hashed device identifiers seen since the
//!   last reset, with per-source tallies
//! - **Privacy salt**: the value mixed into identifier hashes, rotated on every reset
//! - **Runtime mode**: externally written flag requesting a forced restart
//! - **Decoded time**: wall-clock fields reported by a positioning receiver
//! - **Collaborators**: clock, memory, transport, sensors and restart hooks,
//!   all expressed as traits in [`traits`]
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Pure value types and trait definitions only
//! - Scheduling logic lives in `tallykeeper-housekeeper`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod counters;
pub mod mode;
pub mod salt;
pub mod task;
pub mod time;
pub mod traits;

// Re-exports for convenience
pub use channel::LogicalChannel;
pub use counters::{CounterSnapshot, DetectionCounters, DetectionSource};
pub use mode::RuntimeMode;
pub use salt::PrivacySalt;
pub use task::TaskId;
pub use time::{DecodedTime, TimeSource};
