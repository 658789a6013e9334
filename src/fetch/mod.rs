//! Fragment retrieval subsystem.
//!
//! # Data Flow
//! ```text
//! Endpoint (name, address, headers)
//!     → FragmentSource::fetch
//!         http.rs: GET http://{address}:{port}{path} with deadline
//!     → decode_fragment (JSON → Configuration)
//!     → Ok(fragment) | Err(FetchError tagged with endpoint)
//! ```
//!
//! # Design Decisions
//! - One failure never aborts the cycle; callers log and skip
//! - No retry inside a cycle, the next tick is the retry
//! - Transport is a trait so hosts and tests can substitute their own

pub mod http;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::dynamic::Configuration;
use crate::registry::Endpoint;

pub use http::HttpFetcher;

/// Errors that can occur while fetching one endpoint's fragment.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection refused, DNS failure, or similar.
    #[error("{endpoint}: request failed: {source}")]
    Request {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The node answered with a non-2xx status.
    #[error("{endpoint}: unexpected status {status}")]
    Status { endpoint: String, status: u16 },

    /// The response body could not be read.
    #[error("{endpoint}: failed to read body: {source}")]
    Body {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The body was not a valid routing configuration document.
    #[error("{endpoint}: failed to decode fragment: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },

    /// No complete response within the poll timeout.
    #[error("{endpoint}: no response within {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },

    /// Failure reported by a non-HTTP source.
    #[error("{endpoint}: {message}")]
    Other { endpoint: String, message: String },
}

impl FetchError {
    /// Name of the endpoint that failed.
    pub fn endpoint(&self) -> &str {
        match self {
            FetchError::Request { endpoint, .. }
            | FetchError::Status { endpoint, .. }
            | FetchError::Body { endpoint, .. }
            | FetchError::Decode { endpoint, .. }
            | FetchError::Timeout { endpoint, .. }
            | FetchError::Other { endpoint, .. } => endpoint,
        }
    }

    /// Short label used as the metrics outcome.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Request { .. } => "request_error",
            FetchError::Status { .. } => "bad_status",
            FetchError::Body { .. } => "body_error",
            FetchError::Decode { .. } => "decode_error",
            FetchError::Timeout { .. } => "timeout",
            FetchError::Other { .. } => "error",
        }
    }
}

/// Anything that can produce a fragment for an endpoint.
#[async_trait]
pub trait FragmentSource: Send + Sync {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Configuration, FetchError>;
}

/// Decode a fragment body.
pub fn decode_fragment(endpoint: &str, body: &[u8]) -> Result<Configuration, FetchError> {
    serde_json::from_slice(body).map_err(|source| FetchError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}
