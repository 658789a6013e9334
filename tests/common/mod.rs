//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use multi_http_provider::config::{EndpointConfig, ProviderConfig};
use multi_http_provider::fetch::{FetchError, FragmentSource};
use multi_http_provider::registry::Endpoint;
use multi_http_provider::Configuration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Requests received by a mock node, as raw header blocks.
pub type Captured = Arc<Mutex<Vec<String>>>;

/// Start a mock node on an ephemeral port of `ip` that always answers with
/// `status` and `body`.
pub async fn start_mock_node(ip: &str, status: u16, body: String) -> (SocketAddr, Captured) {
    let listener = TcpListener::bind(format!("{}:0", ip)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let seen = captured.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let body = body.clone();
                    let seen = seen.clone();
                    tokio::spawn(async move {
                        let head = read_request_head(&mut socket).await;
                        seen.lock().unwrap().push(head);

                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, captured)
}

async fn read_request_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Minimal valid configuration for the given node names.
pub fn config_with_endpoints(names: &[&str]) -> ProviderConfig {
    let mut config = ProviderConfig::default();
    config.entrypoints = vec!["web".into()];
    for name in names {
        config
            .endpoints
            .insert(name.to_string(), EndpointConfig::new("127.0.0.1"));
    }
    config
}

pub fn fragment(value: serde_json::Value) -> Configuration {
    serde_json::from_value(value).unwrap()
}

/// In-process fragment source with scripted per-endpoint answers.
#[derive(Default)]
pub struct ScriptedSource {
    answers: HashMap<String, Option<Configuration>>,
    delay: Duration,
    panic_on_fetch: bool,
    pub calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Endpoint answers with this fragment.
    pub fn serve(mut self, endpoint: &str, fragment: Configuration) -> Self {
        self.answers.insert(endpoint.to_string(), Some(fragment));
        self
    }

    /// Endpoint fails as if unreachable.
    pub fn fail(mut self, endpoint: &str) -> Self {
        self.answers.insert(endpoint.to_string(), None);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panic_on_fetch = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FragmentSource for ScriptedSource {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Configuration, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_fetch {
            panic!("scripted source exploded");
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.answers.get(&endpoint.name) {
            Some(Some(fragment)) => Ok(fragment.clone()),
            _ => Err(FetchError::Other {
                endpoint: endpoint.name.clone(),
                message: "connection refused".into(),
            }),
        }
    }
}
