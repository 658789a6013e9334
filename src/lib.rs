//! Multi-node HTTP configuration provider.
//!
//! Polls a fixed set of nodes for routing configuration fragments, applies
//! local policy to each, merges them first-writer-wins and emits the result
//! to a sink on every tick.

pub mod config;
pub mod dynamic;
pub mod emit;
pub mod error;
pub mod fetch;
pub mod lifecycle;
pub mod merge;
pub mod observability;
pub mod provider;
pub mod registry;
pub mod transform;

pub use config::ProviderConfig;
pub use dynamic::{Configuration, ConfigurationPayload};
pub use error::ProviderError;
pub use provider::{Provider, ProviderStatus};
