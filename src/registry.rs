//! Endpoint registry.
//!
//! # Responsibilities
//! - Hold the set of remote nodes to poll
//! - Expose `(name, address, headers)` views for the fetch fan-out
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - Iteration is ordered by endpoint name, so merge precedence is stable
//! - Does not validate; `config::validation` runs first

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::config::EndpointConfig;

/// A single remote node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,
    pub address: String,
    pub headers: HashMap<String, String>,
}

/// Immutable, name-ordered set of endpoints.
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    endpoints: Arc<[Endpoint]>,
}

impl EndpointRegistry {
    /// Build the registry from the `endpoints` config table.
    pub fn from_config(configs: &BTreeMap<String, EndpointConfig>) -> Self {
        let endpoints: Vec<Endpoint> = configs
            .iter()
            .map(|(name, config)| Endpoint {
                name: name.clone(),
                address: config.endpoint.trim().to_string(),
                headers: config.headers.clone(),
            })
            .collect();

        Self {
            endpoints: endpoints.into(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

impl<'a> IntoIterator for &'a EndpointRegistry {
    type Item = &'a Endpoint;
    type IntoIter = std::slice::Iter<'a, Endpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.endpoints.iter()
    }
}
