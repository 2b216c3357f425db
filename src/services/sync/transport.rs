// Transport seam: the adapter issues requests through this trait and never
// owns retry, caching or timeout policy itself.

use async_trait::async_trait;
use reqwest::{Client, Method};
use std::time::Duration;
use tracing::debug;

use super::request::RequestDescriptor;
use crate::error::SyncError;

/// What the adapter needs back from a transport: status, body and a
/// case-insensitive header accessor.
#[derive(Debug, Clone, Default)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl TransportResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_multistatus(&self) -> bool {
        self.status == 207
    }
}

/// Injected HTTP client capable of issuing PROPFIND/PROPPATCH and the other
/// wire verbs.
///
/// Implementations must be safe for concurrent independent calls; the
/// adapter does not serialize unrelated requests. Non-success statuses are
/// returned as responses, not errors; only connection-level failures are
/// errors. Cancellation is the caller's responsibility (drop the future).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: RequestDescriptor) -> Result<TransportResponse, SyncError>;
}

/// Built-in transport on reqwest.
///
/// Carries optional basic-auth credentials and an optional timeout; both are
/// transport policy, the adapter imposes neither.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
    credentials: Option<(String, String)>,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(username: &str, password: &str) -> Self {
        Self {
            client: Client::new(),
            credentials: Some((username.to_string(), password.to_string())),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, SyncError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            credentials: None,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: RequestDescriptor) -> Result<TransportResponse, SyncError> {
        let method = Method::from_bytes(request.verb.method().as_bytes())
            .map_err(|_| SyncError::Config(format!("invalid wire verb: {}", request.verb)))?;

        let mut builder = self.client.request(method, &request.url);
        if let Some((ref username, ref password)) = self.credentials {
            builder = builder.basic_auth(username, Some(password));
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(depth) = request.depth {
            builder = builder.header("Depth", depth.as_str());
        }
        if let Some(ref body) = request.body {
            builder = builder.body(body.clone());
        }

        debug!(verb = %request.verb, url = %request.url, "issuing request");
        let response = builder.send().await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;
        debug!(status, body_len = body.len(), "response received");

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
