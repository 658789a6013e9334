//! HTTP fragment fetcher.

use async_trait::async_trait;

use crate::config::FetchConfig;
use crate::dynamic::Configuration;
use crate::fetch::{decode_fragment, FetchError, FragmentSource};
use crate::registry::Endpoint;

/// Fetches fragments over plain HTTP.
///
/// Carries no deadline of its own; the cycle bounds every fetch with the
/// poll timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    port: u16,
    path: String,
}

impl HttpFetcher {
    pub fn new(fetch: &FetchConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("multi-http-provider/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            port: fetch.port,
            path: fetch.path.clone(),
        })
    }

    /// Fragment URL for an endpoint.
    pub fn url_for(&self, endpoint: &Endpoint) -> String {
        format!("http://{}:{}{}", endpoint.address, self.port, self.path)
    }
}

#[async_trait]
impl FragmentSource for HttpFetcher {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Configuration, FetchError> {
        let mut request = self.client.get(self.url_for(endpoint));
        for (name, value) in &endpoint.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|source| FetchError::Request {
            endpoint: endpoint.name.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint: endpoint.name.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| FetchError::Body {
            endpoint: endpoint.name.clone(),
            source,
        })?;

        decode_fragment(&endpoint.name, &body)
    }
}
