//! Emission subsystem.
//!
//! # Data Flow
//! ```text
//! Merged configuration
//!     → ConfigurationPayload (serializable wrapper)
//!     → Emitter (serializability check, delivery deadline)
//!     → ConfigurationSink:
//!         - mpsc::Sender<ConfigurationPayload> (in-process consumer)
//!         - file.rs JsonFileSink (write-then-rename JSON snapshot)
//! ```
//!
//! # Design Decisions
//! - A payload without a configuration is rejected before it reaches the sink
//! - Delivery is bounded by a deadline so a stuck consumer cannot stall polling
//! - Failed emissions are not retried; the next cycle supersedes them

pub mod file;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time;

use crate::dynamic::{Configuration, ConfigurationPayload};
use crate::observability::metrics;

pub use file::JsonFileSink;

/// Errors that can occur while emitting a configuration.
#[derive(Debug, Error)]
pub enum EmitError {
    /// The payload has no configuration, or it failed to encode.
    #[error("unable to serialize configuration: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The sink did not accept the payload in time.
    #[error("sink did not accept configuration within {0:?}")]
    Timeout(Duration),

    /// The consumer side has gone away.
    #[error("sink is closed")]
    Closed,

    /// Writing the payload failed.
    #[error("sink I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Consumer of emitted configurations.
#[async_trait]
pub trait ConfigurationSink: Send + Sync {
    async fn deliver(&self, payload: ConfigurationPayload) -> Result<(), EmitError>;
}

#[async_trait]
impl ConfigurationSink for mpsc::Sender<ConfigurationPayload> {
    async fn deliver(&self, payload: ConfigurationPayload) -> Result<(), EmitError> {
        self.send(payload).await.map_err(|_| EmitError::Closed)
    }
}

/// Wraps configurations and hands them to a sink under a deadline.
#[derive(Clone)]
pub struct Emitter {
    sink: Arc<dyn ConfigurationSink>,
    timeout: Duration,
}

impl Emitter {
    pub fn new(sink: Arc<dyn ConfigurationSink>, timeout: Duration) -> Self {
        Self { sink, timeout }
    }

    /// Emit a merged configuration.
    pub async fn emit(&self, configuration: Configuration) -> Result<(), EmitError> {
        self.emit_payload(ConfigurationPayload::new(configuration)).await
    }

    /// Emit a prepared payload.
    pub async fn emit_payload(&self, payload: ConfigurationPayload) -> Result<(), EmitError> {
        let result = self.deliver_checked(payload).await;
        metrics::record_emit(match &result {
            Ok(()) => "success",
            Err(EmitError::Serialization(_)) => "serialization_error",
            Err(EmitError::Timeout(_)) => "timeout",
            Err(_) => "error",
        });
        result
    }

    async fn deliver_checked(&self, payload: ConfigurationPayload) -> Result<(), EmitError> {
        serde_json::to_writer(std::io::sink(), &payload)?;

        match time::timeout(self.timeout, self.sink.deliver(payload)).await {
            Ok(result) => result,
            Err(_) => Err(EmitError::Timeout(self.timeout)),
        }
    }
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("timeout", &self.timeout)
            .finish()
    }
}
