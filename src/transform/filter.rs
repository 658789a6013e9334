//! Entry-point filtering.
//!
//! Routers keep only the entry points this host recognizes. A router left
//! with none is dropped together with its service, and middlewares that only
//! dropped routers referenced are pruned. Anything still referenced by a
//! surviving router is kept.

use std::collections::BTreeSet;

use crate::dynamic::{local_name, Configuration};
use crate::transform::Transformer;

#[derive(Debug, Clone)]
pub struct EntryPointFilter {
    entrypoints: BTreeSet<String>,
}

impl EntryPointFilter {
    pub fn new<I, S>(entrypoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entrypoints: entrypoints.into_iter().map(Into::into).collect(),
        }
    }

    pub fn entrypoints(&self) -> &BTreeSet<String> {
        &self.entrypoints
    }
}

impl Transformer for EntryPointFilter {
    fn apply(&self, fragment: &mut Configuration) {
        let Some(http) = fragment.http.as_mut() else {
            return;
        };

        let mut dropped_routers = Vec::new();
        let mut dropped_services = BTreeSet::new();
        let mut kept_services = BTreeSet::new();
        let mut orphaned = BTreeSet::new();
        let mut kept = BTreeSet::new();

        for (name, router) in http.routers.iter_mut() {
            let local: Vec<String> = router
                .entry_points
                .iter()
                .filter(|ep| self.entrypoints.contains(ep.as_str()))
                .cloned()
                .collect();

            if local.is_empty() {
                dropped_routers.push(name.clone());
                dropped_services.extend(local_name(&router.service).map(str::to_string));
                orphaned.extend(local_refs(&router.middlewares));
            } else {
                router.entry_points = local;
                kept_services.extend(local_name(&router.service).map(str::to_string));
                kept.extend(local_refs(&router.middlewares));
            }
        }

        if dropped_routers.is_empty() {
            return;
        }

        tracing::trace!(routers = ?dropped_routers, "Dropping routers outside local entry points");

        for name in &dropped_routers {
            http.routers.remove(name);
        }
        for service in dropped_services.difference(&kept_services) {
            http.services.remove(service);
        }
        for middleware in orphaned.difference(&kept) {
            http.middlewares.remove(middleware);
        }
    }
}

fn local_refs(references: &[String]) -> impl Iterator<Item = String> + '_ {
    references
        .iter()
        .filter_map(|r| local_name(r))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fragment() -> Configuration {
        serde_json::from_value(json!({
            "http": {
                "routers": {
                    "public": {
                        "entryPoints": ["web", "websecure"],
                        "middlewares": ["shared", "compress@http"],
                        "service": "public-svc"
                    },
                    "private": {
                        "entryPoints": ["internal"],
                        "middlewares": ["shared@http", "ipallow"],
                        "service": "private-svc"
                    }
                },
                "services": {
                    "public-svc": {"loadBalancer": {}},
                    "private-svc": {"loadBalancer": {}}
                },
                "middlewares": {
                    "shared": {"headers": {}},
                    "compress": {"compress": {}},
                    "ipallow": {"ipAllowList": {}},
                    "unrelated": {"retry": {}}
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_narrows_entry_points() {
        let mut config = fragment();
        EntryPointFilter::new(["web"]).apply(&mut config);

        let http = config.http.unwrap();
        assert_eq!(http.routers["public"].entry_points, vec!["web"]);
    }

    #[test]
    fn test_drops_router_and_service_outside_local_entry_points() {
        let mut config = fragment();
        EntryPointFilter::new(["web"]).apply(&mut config);

        let http = config.http.unwrap();
        assert!(!http.routers.contains_key("private"));
        assert!(!http.services.contains_key("private-svc"));
        assert!(http.services.contains_key("public-svc"));
    }

    #[test]
    fn test_middleware_retention() {
        let mut config = fragment();
        EntryPointFilter::new(["web"]).apply(&mut config);

        let http = config.http.unwrap();
        // Shared between a surviving and a dropped router.
        assert!(http.middlewares.contains_key("shared"));
        assert!(http.middlewares.contains_key("compress"));
        // Only referenced by the dropped router.
        assert!(!http.middlewares.contains_key("ipallow"));
        // Never referenced by a dropped router.
        assert!(http.middlewares.contains_key("unrelated"));
    }

    #[test]
    fn test_foreign_references_leave_local_entities_alone() {
        let mut config: Configuration = serde_json::from_value(json!({
            "http": {
                "routers": {
                    "private": {
                        "entryPoints": ["internal"],
                        "middlewares": ["auth@file"],
                        "service": "backend@docker"
                    }
                },
                "services": {"backend": {"loadBalancer": {}}},
                "middlewares": {"auth": {"basicAuth": {}}}
            }
        }))
        .unwrap();
        EntryPointFilter::new(["web"]).apply(&mut config);

        let http = config.http.unwrap();
        assert!(http.routers.is_empty());
        assert!(http.services.contains_key("backend"));
        assert!(http.middlewares.contains_key("auth"));
    }

    #[test]
    fn test_shared_service_survives() {
        let mut config = fragment();
        if let Some(http) = config.http.as_mut() {
            http.routers.get_mut("private").unwrap().service = "public-svc".into();
        }
        EntryPointFilter::new(["web"]).apply(&mut config);

        let http = config.http.unwrap();
        assert!(http.services.contains_key("public-svc"));
        assert!(http.services.contains_key("private-svc"));
    }

    #[test]
    fn test_preserves_declared_order() {
        let mut config = fragment();
        EntryPointFilter::new(["websecure", "web"]).apply(&mut config);

        let http = config.http.unwrap();
        assert_eq!(http.routers["public"].entry_points, vec!["web", "websecure"]);
    }

    #[test]
    fn test_idempotent() {
        let filter = EntryPointFilter::new(["web"]);
        let mut once = fragment();
        filter.apply(&mut once);
        let mut twice = once.clone();
        filter.apply(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_fragment_without_http_section() {
        let mut config = Configuration::default();
        EntryPointFilter::new(["web"]).apply(&mut config);
        assert!(config.http.is_none());
    }
}
