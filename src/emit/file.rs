//! JSON snapshot sink.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::dynamic::ConfigurationPayload;
use crate::emit::{ConfigurationSink, EmitError};

/// Writes every payload to a file, replacing the previous snapshot.
///
/// The JSON is written to a sibling temp file and renamed over the target,
/// so readers never observe a half-written document.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConfigurationSink for JsonFileSink {
    async fn deliver(&self, payload: ConfigurationPayload) -> Result<(), EmitError> {
        let json = payload.to_json_pretty()?;
        let tmp = self.path.with_extension("json.tmp");

        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;

        tracing::debug!(path = %self.path.display(), "Wrote configuration snapshot");
        Ok(())
    }
}
