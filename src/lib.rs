//! # Miqat Library
//!
//! Prayer-time scheduling and Qibla bearing engine behind the `miqat` binary.
//!
//! This library exists to enable testing of the engine and to keep CLI
//! dispatch (main.rs) separate from application logic.
//!
//! ## Architecture
//!
//! - **Entry Point**: [`Miqat`] loads configuration, installs signal handling and drives a session
//! - **Session**: `session` acquires location and timings once, then runs the countdown
//!   timer and the heading subscription until closed
//! - **Engine**: `timings` (provider and next-prayer selection), `countdown` (state machine),
//!   `qibla` (bearing and device-relative pointer)
//! - **Geographic**: `geo` positions, configured location source, reverse geocoding, timezones
//! - **Infrastructure**: `config`, `args`, `signals`, `timer`, `time_source`, logging

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod args;
pub mod commands;
pub mod common;
pub mod config;
pub mod countdown;
pub mod error;
pub mod geo;
pub mod qibla;
pub mod session;
pub mod signals;
pub mod time_source;
pub mod timer;
pub mod timings;

mod miqat;

pub use error::{EngineError, GeolocationError};
pub use miqat::{Miqat, drive};
