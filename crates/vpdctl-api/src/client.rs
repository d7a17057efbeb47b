// Backend HTTP client
//
// Wraps `reqwest::Client` with base-origin URL construction, status
// checking, and JSON decoding. Endpoint groups (devices, sensors, targets,
// predictions, settings) are implemented as inherent methods in separate
// files to keep this module focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::OptimizeEndpoint;
use crate::transport::TransportConfig;

/// Raw HTTP client for the environmental-control backend.
///
/// Issues exactly one request per call: no retries, no deduplication.
/// Concurrent calls are independent and may complete in any order.
pub struct VpdClient {
    http: reqwest::Client,
    base_url: Url,
    optimize_endpoint: OptimizeEndpoint,
}

impl VpdClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// so the backend can identify the session on every request.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            optimize_endpoint: OptimizeEndpoint::default(),
        }
    }

    /// Choose which path `get_optimized_control` posts to.
    pub fn with_optimize_endpoint(mut self, endpoint: OptimizeEndpoint) -> Self {
        self.optimize_endpoint = endpoint;
        self
    }

    /// The backend origin every path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn optimize_endpoint(&self) -> OptimizeEndpoint {
        self.optimize_endpoint
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Resolve `path` relative to the base URL, keeping any path prefix
    /// the base carries (`https://host/api` + `sensor_data` →
    /// `https://host/api/sensor_data`).
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let prefixed = format!("{}/", base.path());
            base.set_path(&prefixed);
        }
        Ok(base.join(path.trim_start_matches('/'))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {}", url);
        let body = self.execute(self.http.get(url)).await?;
        decode(body)
    }

    /// Send a POST request with a JSON body and decode the JSON response.
    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {}", url);
        let body = self.execute(self.http.post(url).json(body)).await?;
        decode(body)
    }

    /// Send a POST request with a JSON body, ignoring any response body.
    pub(crate) async fn post_discard(&self, path: &str, body: &impl Serialize) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {}", url);
        self.execute(self.http.post(url).json(body)).await?;
        Ok(())
    }

    /// Send a bodiless POST request and decode the JSON response.
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {}", url);
        let body = self.execute(self.http.post(url)).await?;
        decode(body)
    }

    /// Send the request and return the body text of a 2xx response.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<String, Error> {
        let resp = request.send().await.map_err(Error::Transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "backend rejected request");
            let body = if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_owned)
            } else {
                body
            };
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

/// Decode a response body. An empty body decodes as JSON `null`, so
/// `serde_json::Value` callers see `Value::Null` rather than an error.
fn decode<T: DeserializeOwned>(body: String) -> Result<T, Error> {
    let text = if body.trim().is_empty() { "null" } else { body.as_str() };
    serde_json::from_str(text).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}
