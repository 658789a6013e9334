//! Fragment transformation subsystem.
//!
//! # Data Flow
//! ```text
//! Decoded fragment (per endpoint)
//!     → Transformer::apply (selected by `policy`):
//!         - filter.rs (drop routers outside local entry points, prune orphans)
//!         - namespace.rs (re-namespace `@http` middleware references)
//!     → Transformed fragment, ready to merge
//! ```
//!
//! # Design Decisions
//! - Exactly one strategy per provider; strategies do not compose
//! - Each fragment is transformed in isolation
//! - Applying a strategy to its own output is a no-op

pub mod filter;
pub mod namespace;

use std::sync::Arc;

use crate::config::{Settings, TransformPolicy};
use crate::dynamic::Configuration;

pub use filter::EntryPointFilter;
pub use namespace::MiddlewareNamespacer;

/// A local policy applied to each fragment before merging.
pub trait Transformer: Send + Sync + std::fmt::Debug {
    /// Rewrite the fragment in place.
    fn apply(&self, fragment: &mut Configuration);
}

/// Build the transformer selected by the validated settings.
pub fn from_settings(settings: &Settings) -> Arc<dyn Transformer> {
    match settings.policy {
        TransformPolicy::FilterEntrypoints => {
            Arc::new(EntryPointFilter::new(settings.entrypoints.iter().cloned()))
        }
        TransformPolicy::RewriteMiddlewares => {
            Arc::new(MiddlewareNamespacer::for_provider(&settings.provider_name))
        }
    }
}
