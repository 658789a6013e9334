//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every cycle produces:
//!     → logging.rs (structured log events per fetch, merge, emit)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields (endpoint, error, counts) rather than formatted strings
//! - Metrics are cheap and no-ops without an installed recorder

pub mod logging;
pub mod metrics;
