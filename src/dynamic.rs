//! Routing configuration document.
//!
//! Mirrors the `http` section of the dynamic configuration schema served by
//! each node. Only the fields the pipeline inspects are typed; everything else
//! on a router (rule, priority, tls, ...) and the full body of services and
//! middlewares are carried through untouched.

use std::collections::BTreeMap;

use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Root document: one node's fragment, or the merged result of a cycle.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Configuration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpConfiguration>,
}

impl Configuration {
    /// An empty document whose three collections are present but empty.
    pub fn empty() -> Self {
        Self {
            http: Some(HttpConfiguration::default()),
        }
    }

    /// Borrow the HTTP section, creating it if the node omitted it.
    pub fn http_mut(&mut self) -> &mut HttpConfiguration {
        self.http.get_or_insert_with(HttpConfiguration::default)
    }

    /// Total number of routers, services and middlewares.
    pub fn entity_count(&self) -> usize {
        self.http.as_ref().map_or(0, |h| {
            h.routers.len() + h.services.len() + h.middlewares.len()
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct HttpConfiguration {
    #[serde(default)]
    pub routers: BTreeMap<String, Router>,
    #[serde(default)]
    pub services: BTreeMap<String, Service>,
    #[serde(default)]
    pub middlewares: BTreeMap<String, Middleware>,
}

/// A router binds entry points to a service through a middleware chain.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Router {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry_points: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub middlewares: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Opaque service definition.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Service(pub Value);

/// Opaque middleware definition.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Middleware(pub Value);

/// Name of the entity a reference points at inside this document.
///
/// Unqualified names and `name@http` resolve locally; references scoped to
/// any other provider (`auth@file`) return `None`.
pub fn local_name(reference: &str) -> Option<&str> {
    match reference.rsplit_once('@') {
        Some((name, "http")) => Some(name),
        Some(_) => None,
        None => Some(reference),
    }
}

/// Wrapper handed to the sink once per cycle.
///
/// Serializes as the bare configuration document. A payload without a
/// configuration refuses to serialize instead of producing empty output.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationPayload {
    pub configuration: Option<Configuration>,
}

impl ConfigurationPayload {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration: Some(configuration),
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for ConfigurationPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.configuration {
            Some(configuration) => configuration.serialize(serializer),
            None => Err(S::Error::custom("unable to serialize configuration")),
        }
    }
}
