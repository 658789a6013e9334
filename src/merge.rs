//! Fragment merging.
//!
//! # Responsibilities
//! - Fold every transformed fragment of a cycle into one configuration
//! - Resolve name collisions first-writer-wins
//!
//! # Design Decisions
//! - Input order decides precedence; the registry hands fragments over
//!   in endpoint-name order, so the winner is stable from cycle to cycle
//! - Collisions are not errors: the loser is dropped, counted and logged
//! - The result always carries all three collections, even when empty

use std::collections::{BTreeMap, HashMap};

use crate::dynamic::Configuration;
use crate::observability::metrics;

/// Merge `(endpoint, fragment)` pairs in order.
pub fn merge<I, S>(fragments: I) -> Configuration
where
    I: IntoIterator<Item = (S, Configuration)>,
    S: AsRef<str>,
{
    let mut merged = Configuration::empty();
    let target = merged.http_mut();

    let mut router_owners = HashMap::new();
    let mut service_owners = HashMap::new();
    let mut middleware_owners = HashMap::new();

    for (endpoint, fragment) in fragments {
        let endpoint = endpoint.as_ref();
        let Some(http) = fragment.http else {
            continue;
        };

        fold(
            "middleware",
            endpoint,
            http.middlewares,
            &mut target.middlewares,
            &mut middleware_owners,
        );
        fold(
            "service",
            endpoint,
            http.services,
            &mut target.services,
            &mut service_owners,
        );
        fold(
            "router",
            endpoint,
            http.routers,
            &mut target.routers,
            &mut router_owners,
        );
    }

    metrics::record_merged(
        target.routers.len(),
        target.services.len(),
        target.middlewares.len(),
    );

    merged
}

fn fold<T>(
    kind: &'static str,
    endpoint: &str,
    source: BTreeMap<String, T>,
    target: &mut BTreeMap<String, T>,
    owners: &mut HashMap<String, String>,
) {
    for (name, entity) in source {
        if let Some(winner) = owners.get(&name) {
            tracing::debug!(
                kind,
                name = %name,
                kept_from = %winner,
                discarded_from = %endpoint,
                "Duplicate entity, keeping first definition"
            );
            metrics::record_merge_conflict(kind);
            continue;
        }
        owners.insert(name.clone(), endpoint.to_string());
        target.insert(name, entity);
    }
}
