//! Process lifecycle for the binary.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate (Provider::init) → Start driver
//!
//! Shutdown (signals.rs):
//!     SIGTERM/SIGINT → Provider::stop → Exit
//!     driver Failed  → Provider::stop → Exit non-zero
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Stop cancels the driver and waits for it before the process exits

pub mod signals;

pub use signals::{shutdown_or_terminal, shutdown_signal, ShutdownReason};
