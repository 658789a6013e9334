//! HTTP fetcher against mock nodes.

use std::collections::HashMap;

use multi_http_provider::config::{EndpointConfig, FetchConfig, TransformPolicy};
use multi_http_provider::fetch::{FetchError, FragmentSource, HttpFetcher};
use multi_http_provider::registry::Endpoint;
use multi_http_provider::Provider;
use serde_json::json;

mod common;

fn fetcher_for_port(port: u16) -> HttpFetcher {
    let fetch = FetchConfig {
        port,
        ..FetchConfig::default()
    };
    HttpFetcher::new(&fetch).unwrap()
}

fn endpoint(name: &str, address: &str) -> Endpoint {
    Endpoint {
        name: name.into(),
        address: address.into(),
        headers: HashMap::new(),
    }
}

#[tokio::test]
async fn test_fetch_decodes_fragment_and_sends_headers() {
    let body = json!({"http": {"routers": {"r1": {"entryPoints": ["web"], "service": "s1"}}}});
    let (addr, captured) = common::start_mock_node("127.0.0.1", 200, body.to_string()).await;

    let mut node = endpoint("node-a", "127.0.0.1");
    node.headers.insert("X-Node-Token".into(), "secret".into());

    let fragment = fetcher_for_port(addr.port()).fetch(&node).await.unwrap();
    assert_eq!(fragment.http.unwrap().routers["r1"].service, "s1");

    let requests = captured.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("GET /traefik/config HTTP/1.1"));
    assert!(requests[0].to_lowercase().contains("x-node-token: secret"));
}

#[tokio::test]
async fn test_fetch_non_success_status() {
    let (addr, _) = common::start_mock_node("127.0.0.1", 503, "down".into()).await;

    let err = fetcher_for_port(addr.port())
        .fetch(&endpoint("node-a", "127.0.0.1"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 503, .. }));
    assert_eq!(err.endpoint(), "node-a");
}

#[tokio::test]
async fn test_fetch_undecodable_body() {
    let (addr, _) = common::start_mock_node("127.0.0.1", 200, "not json".into()).await;

    let err = fetcher_for_port(addr.port())
        .fetch(&endpoint("node-a", "127.0.0.1"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Decode { .. }));
}

#[tokio::test]
async fn test_fetch_connection_refused() {
    // Grab a free port, then release it so nothing is listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = fetcher_for_port(port)
        .fetch(&endpoint("node-b", "127.0.0.1"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Request { .. }));
    assert_eq!(err.endpoint(), "node-b");
}

#[tokio::test]
async fn test_cycle_survives_unreachable_node() {
    let body = json!({"http": {
        "routers": {
            "app": {"entryPoints": ["web"], "service": "app-svc", "middlewares": ["auth@http"]}
        },
        "services": {"app-svc": {"loadBalancer": {"servers": [{"url": "http://10.1.0.1"}]}}},
        "middlewares": {"auth": {"basicAuth": {}}}
    }});
    let (addr, _) = common::start_mock_node("127.0.0.1", 200, body.to_string()).await;

    let mut config = common::config_with_endpoints(&[]);
    config.poll_timeout = "2s".into();
    config.fetch.port = addr.port();
    config.policy = TransformPolicy::RewriteMiddlewares;
    config.endpoints.insert("alive".into(), EndpointConfig::new("127.0.0.1"));
    // Same port on another loopback address: nothing listens there.
    config.endpoints.insert("dead".into(), EndpointConfig::new("127.0.0.2"));

    let mut provider = Provider::new(config);
    provider.init().unwrap();
    let cycle = provider.run_once().await.unwrap();

    assert_eq!(cycle.succeeded, vec!["alive"]);
    assert_eq!(cycle.failed, vec!["dead"]);

    let http = cycle.configuration.http.unwrap();
    assert_eq!(http.routers.len(), 1);
    assert_eq!(
        http.routers["app"].middlewares,
        vec!["auth@plugin-multi-http-provider"]
    );
    assert!(http.services.contains_key("app-svc"));
    assert!(http.middlewares.contains_key("auth"));
}
