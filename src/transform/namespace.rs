//! Middleware namespace rewriting.
//!
//! Nodes publish their middlewares under the generic `http` provider, but
//! once merged they are served by this provider. References such as
//! `auth@http` are rewritten to `auth@plugin-<provider>`. Only the suffix
//! after the final `@` is inspected, and only an exact `http` matches, so
//! already-namespaced references and names that merely contain `@http`
//! are left alone.

use crate::dynamic::Configuration;
use crate::transform::Transformer;

const HTTP_PROVIDER: &str = "http";

#[derive(Debug, Clone)]
pub struct MiddlewareNamespacer {
    namespace: String,
}

impl MiddlewareNamespacer {
    /// Namespacer targeting `plugin-<provider_name>`.
    pub fn for_provider(provider_name: &str) -> Self {
        Self {
            namespace: format!("plugin-{}", provider_name),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Rewritten reference, or `None` when it is not an `@http` reference.
    pub fn rewrite(&self, reference: &str) -> Option<String> {
        let (name, provider) = reference.rsplit_once('@')?;
        (provider == HTTP_PROVIDER).then(|| format!("{}@{}", name, self.namespace))
    }
}

impl Transformer for MiddlewareNamespacer {
    fn apply(&self, fragment: &mut Configuration) {
        let Some(http) = fragment.http.as_mut() else {
            return;
        };

        for router in http.routers.values_mut() {
            for reference in router.middlewares.iter_mut() {
                if let Some(rewritten) = self.rewrite(reference) {
                    *reference = rewritten;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn namespacer() -> MiddlewareNamespacer {
        MiddlewareNamespacer::for_provider("multi-http-provider")
    }

    #[test]
    fn test_rewrite_reference() {
        let ns = namespacer();
        assert_eq!(
            ns.rewrite("auth@http").as_deref(),
            Some("auth@plugin-multi-http-provider")
        );
        assert_eq!(ns.rewrite("auth"), None);
        assert_eq!(ns.rewrite("auth@file"), None);
        assert_eq!(ns.rewrite("auth@plugin-multi-http-provider"), None);
        // `@http` in the middle of a name is not a provider suffix.
        assert_eq!(ns.rewrite("x@httpbin@docker"), None);
    }

    #[test]
    fn test_apply_rewrites_routers_only() {
        let mut config: Configuration = serde_json::from_value(json!({
            "http": {
                "routers": {
                    "api": {
                        "entryPoints": ["internal"],
                        "middlewares": ["auth@http", "ratelimit@file", "local"],
                        "service": "api-svc"
                    }
                },
                "services": {"api-svc": {}},
                "middlewares": {"auth": {}}
            }
        }))
        .unwrap();

        namespacer().apply(&mut config);

        let http = config.http.unwrap();
        let router = &http.routers["api"];
        assert_eq!(
            router.middlewares,
            vec!["auth@plugin-multi-http-provider", "ratelimit@file", "local"]
        );
        // No deletion and entry points untouched.
        assert_eq!(router.entry_points, vec!["internal"]);
        assert!(http.services.contains_key("api-svc"));
        assert!(http.middlewares.contains_key("auth"));
    }

    #[test]
    fn test_idempotent() {
        let mut config: Configuration = serde_json::from_value(json!({
            "http": {"routers": {"r": {"middlewares": ["auth@http"], "service": "s"}}}
        }))
        .unwrap();

        let ns = namespacer();
        ns.apply(&mut config);
        let once = config.clone();
        ns.apply(&mut config);
        assert_eq!(once, config);
        assert_eq!(
            config.http.unwrap().routers["r"].middlewares,
            vec!["auth@plugin-multi-http-provider"]
        );
    }
}
