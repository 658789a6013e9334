//! One fetch → transform → merge pass.

use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;
use tokio::time;

use crate::config::Settings;
use crate::dynamic::Configuration;
use crate::emit::Emitter;
use crate::fetch::{FetchError, FragmentSource};
use crate::merge::merge;
use crate::observability::metrics;
use crate::registry::Endpoint;
use crate::transform::Transformer;

/// Result of collecting one cycle's fragments.
#[derive(Debug, Clone)]
pub struct Cycle {
    /// Merged configuration for this cycle.
    pub configuration: Configuration,
    /// Endpoints whose fragment made it into the merge, in merge order.
    pub succeeded: Vec<String>,
    /// Endpoints skipped this cycle.
    pub failed: Vec<String>,
}

impl Cycle {
    /// True when every endpoint failed.
    pub fn all_failed(&self) -> bool {
        self.succeeded.is_empty()
    }
}

/// Everything a cycle needs, fixed at `init`.
pub(crate) struct Pipeline {
    pub(crate) settings: Settings,
    pub(crate) source: Arc<dyn FragmentSource>,
    pub(crate) transformer: Arc<dyn Transformer>,
}

impl Pipeline {
    /// Fetch every endpoint concurrently, transform and merge.
    ///
    /// All fetches settle before the merge runs; results are merged in
    /// registry order regardless of completion order.
    pub(crate) async fn collect(&self) -> Cycle {
        let fetches = self
            .settings
            .endpoints
            .iter()
            .map(|endpoint| async move { (endpoint, self.fetch_with_deadline(endpoint).await) });
        let results = join_all(fetches).await;

        let mut fragments = Vec::with_capacity(results.len());
        let mut failed = Vec::new();
        for (endpoint, result) in results {
            match result {
                Ok(mut fragment) => {
                    self.transformer.apply(&mut fragment);
                    fragments.push((endpoint.name.clone(), fragment));
                }
                Err(e) => {
                    tracing::warn!(
                        endpoint = %endpoint.name,
                        address = %endpoint.address,
                        error = %e,
                        "Skipping endpoint for this cycle"
                    );
                    failed.push(endpoint.name.clone());
                }
            }
        }

        let succeeded = fragments.iter().map(|(name, _)| name.clone()).collect();
        Cycle {
            configuration: merge(fragments),
            succeeded,
            failed,
        }
    }

    /// Run a full cycle and hand the result to the emitter.
    pub(crate) async fn run(&self, emitter: &Emitter) {
        let start = Instant::now();
        tracing::debug!(provider = %self.settings.provider_name, "Cycle starting");

        let cycle = self.collect().await;

        if cycle.all_failed() && self.settings.skip_empty_cycles {
            tracing::warn!(
                failed = cycle.failed.len(),
                "All endpoints failed, keeping previous configuration"
            );
            metrics::record_cycle(start);
            return;
        }

        let entities = cycle.configuration.entity_count();
        match emitter.emit(cycle.configuration).await {
            Ok(()) => tracing::info!(
                succeeded = cycle.succeeded.len(),
                failed = cycle.failed.len(),
                entities,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Emitted merged configuration"
            ),
            Err(e) => tracing::error!(error = %e, "Failed to emit merged configuration"),
        }

        metrics::record_cycle(start);
    }

    async fn fetch_with_deadline(&self, endpoint: &Endpoint) -> Result<Configuration, FetchError> {
        let start = Instant::now();
        let timeout = self.settings.poll_timeout;

        let result = match time::timeout(timeout, self.source.fetch(endpoint)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                endpoint: endpoint.name.clone(),
                timeout,
            }),
        };

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        metrics::record_fetch(&endpoint.name, outcome, start);

        result
    }
}
