//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the provider.
//! All types derive Serde traits for deserialization from config files.
//! Keys are camelCase to match the host's plugin configuration format.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Root configuration for the provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Name used in logs and to derive the middleware namespace tag.
    pub provider_name: String,

    /// Time between cycles (e.g., "15s").
    pub poll_interval: String,

    /// Deadline for a single endpoint fetch (e.g., "10s").
    pub poll_timeout: String,

    /// Deadline for handing a payload to the sink.
    pub emit_timeout: String,

    /// Fragment transformation policy.
    pub policy: TransformPolicy,

    /// Entry points recognized as local (entry-point filtering only).
    pub entrypoints: Vec<String>,

    /// Remote nodes to poll, keyed by node name.
    pub endpoints: BTreeMap<String, EndpointConfig>,

    /// Skip emission when every endpoint failed in a cycle.
    pub skip_empty_cycles: bool,

    /// Fetch protocol settings.
    pub fetch: FetchConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_name: "multi-http-provider".to_string(),
            poll_interval: "15s".to_string(),
            poll_timeout: "10s".to_string(),
            emit_timeout: "5s".to_string(),
            policy: TransformPolicy::default(),
            entrypoints: Vec::new(),
            endpoints: BTreeMap::new(),
            skip_empty_cycles: false,
            fetch: FetchConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// A single remote node.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EndpointConfig {
    /// Host name or IP of the node (no scheme, no port).
    pub endpoint: String,

    /// Extra request headers sent with every fetch.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl EndpointConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            headers: HashMap::new(),
        }
    }
}

/// How each fragment is rewritten before merging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransformPolicy {
    /// Drop routers not bound to a local entry point.
    #[default]
    FilterEntrypoints,
    /// Re-namespace `@http` middleware references to this provider.
    RewriteMiddlewares,
}

/// Where fragments are served on each node.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Port the node serves its fragment on.
    pub port: u16,

    /// Path of the fragment document.
    pub path: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            path: "/traefik/config".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProviderConfig::default();
        assert_eq!(config.poll_interval, "15s");
        assert_eq!(config.poll_timeout, "10s");
        assert_eq!(config.policy, TransformPolicy::FilterEntrypoints);
        assert_eq!(config.fetch.port, 5000);
        assert_eq!(config.fetch.path, "/traefik/config");
        assert!(config.endpoints.is_empty());
    }

    #[test]
    fn test_parse_toml() {
        let raw = r#"
            pollInterval = "30s"
            policy = "rewrite-middlewares"
            entrypoints = ["web"]

            [endpoints.node-a]
            endpoint = "10.0.0.1"

            [endpoints.node-b]
            endpoint = "10.0.0.2"
            headers = { Authorization = "Bearer abc" }
        "#;
        let config: ProviderConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.poll_interval, "30s");
        assert_eq!(config.poll_timeout, "10s");
        assert_eq!(config.policy, TransformPolicy::RewriteMiddlewares);
        assert_eq!(config.endpoints.len(), 2);
        assert_eq!(
            config.endpoints["node-b"].headers["Authorization"],
            "Bearer abc"
        );
    }
}
