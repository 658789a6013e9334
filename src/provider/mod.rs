//! Provider lifecycle.
//!
//! # Data Flow
//! ```text
//! ProviderConfig
//!     → init()  (validate, build registry, fetcher, transformer)
//!     → start(sink)  (spawn driver.rs, return immediately)
//!         every tick: cycle.rs fetch (fan-out) → transform → merge → emit
//!     → stop()  (cancel token, join driver)
//! ```
//!
//! # Design Decisions
//! - One driver per provider; cycles never overlap
//! - The cancellation token lives only as long as the running driver;
//!   dropping a started provider cancels it
//! - Driver outcome is observable through `status()` / `subscribe()`

pub mod cycle;
mod driver;
pub mod state;

use std::sync::Arc;

use tokio::sync::watch;

use crate::config::{validate_config, ConfigError, ProviderConfig, Settings};
use crate::emit::{ConfigurationSink, Emitter};
use crate::error::{ProviderError, ProviderResult};
use crate::fetch::{FragmentSource, HttpFetcher};
use crate::transform;

pub use cycle::Cycle;
pub use state::ProviderStatus;

use cycle::Pipeline;
use driver::Driver;
use state::StatusCell;

/// Polls remote nodes and emits their merged routing configuration.
pub struct Provider {
    config: ProviderConfig,
    source: Option<Arc<dyn FragmentSource>>,
    pipeline: Option<Arc<Pipeline>>,
    driver: Option<Driver>,
    status: StatusCell,
}

impl Provider {
    /// Create a provider from raw configuration. Nothing is validated yet.
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            source: None,
            pipeline: None,
            driver: None,
            status: StatusCell::new(),
        }
    }

    /// Replace the HTTP fetcher with another fragment source.
    pub fn with_source(mut self, source: Arc<dyn FragmentSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn name(&self) -> &str {
        &self.config.provider_name
    }

    /// Validated settings, available after a successful `init`.
    pub fn settings(&self) -> Option<&Settings> {
        self.pipeline.as_ref().map(|p| &p.settings)
    }

    pub fn status(&self) -> ProviderStatus {
        self.status.get()
    }

    /// Watch status transitions.
    pub fn subscribe(&self) -> watch::Receiver<ProviderStatus> {
        self.status.subscribe()
    }

    /// Validate configuration and prepare the pipeline.
    ///
    /// On failure the provider stays `Created` and cannot be started.
    pub fn init(&mut self) -> ProviderResult<()> {
        match self.status.get() {
            ProviderStatus::Created | ProviderStatus::Initialized => {}
            ProviderStatus::Running => return Err(ProviderError::AlreadyRunning),
            ProviderStatus::Stopped | ProviderStatus::Failed(_) => {
                return Err(ProviderError::Stopped)
            }
        }

        let settings = validate_config(&self.config).map_err(|errors| {
            for error in &errors {
                tracing::error!(
                    provider = %self.config.provider_name,
                    error = %error,
                    "Invalid configuration"
                );
            }
            ConfigError::Validation(errors)
        })?;

        let source: Arc<dyn FragmentSource> = match &self.source {
            Some(source) => source.clone(),
            None => Arc::new(HttpFetcher::new(&settings.fetch)?),
        };
        let transformer = transform::from_settings(&settings);

        tracing::info!(
            provider = %settings.provider_name,
            endpoints = settings.endpoints.len(),
            policy = ?settings.policy,
            poll_interval = ?settings.poll_interval,
            poll_timeout = ?settings.poll_timeout,
            "Provider initialized"
        );

        self.pipeline = Some(Arc::new(Pipeline {
            settings,
            source,
            transformer,
        }));
        self.status.set(ProviderStatus::Initialized);
        Ok(())
    }

    /// Spawn the cycle driver delivering to `sink`. Returns immediately.
    pub fn start(&mut self, sink: Arc<dyn ConfigurationSink>) -> ProviderResult<()> {
        match self.status.get() {
            ProviderStatus::Initialized => {}
            ProviderStatus::Created => return Err(ProviderError::NotInitialized("start")),
            ProviderStatus::Running => return Err(ProviderError::AlreadyRunning),
            ProviderStatus::Stopped | ProviderStatus::Failed(_) => {
                return Err(ProviderError::Stopped)
            }
        }

        let pipeline = self
            .pipeline
            .clone()
            .ok_or(ProviderError::NotInitialized("start"))?;

        if tokio::runtime::Handle::try_current().is_err() {
            return Err(ProviderError::NoRuntime);
        }

        let emitter = Emitter::new(sink, pipeline.settings.emit_timeout);
        self.status.set(ProviderStatus::Running);
        self.driver = Some(Driver::spawn(pipeline, emitter, self.status.clone()));
        Ok(())
    }

    /// Stop the driver. Calling this before `start`, or more than once,
    /// does nothing.
    pub async fn stop(&mut self) -> ProviderResult<()> {
        let Some(driver) = self.driver.take() else {
            return Ok(());
        };

        tracing::info!(provider = %self.config.provider_name, "Stopping provider");
        driver.shutdown().await;
        self.status.mark_stopped();
        Ok(())
    }

    /// Run a single cycle without the timer and without emitting.
    pub async fn run_once(&self) -> ProviderResult<Cycle> {
        let pipeline = self
            .pipeline
            .as_ref()
            .ok_or(ProviderError::NotInitialized("run_once"))?;
        Ok(pipeline.collect().await)
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.config.provider_name)
            .field("status", &self.status.get())
            .finish()
    }
}
