//! HTTP client abstraction for the acquisition stage.
//!
//! [`HttpClient`] keeps the download code testable without a network;
//! [`UrlParam`] injects the NREL API key as a query parameter, which is how
//! the DOE station API authenticates.

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response>;
}

/// A plain [`reqwest::Client`] with no authentication.
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> Self {
        Self(reqwest::Client::new())
    }
}

impl Default for BasicClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}

/// An [`HttpClient`] wrapper that appends an API key as a URL query
/// parameter (e.g. `?api_key=...` for the NREL developer API).
pub struct UrlParam<C> {
    pub inner: C,
    pub param_name: String,
    pub key: String,
}

#[async_trait]
impl<C: HttpClient> HttpClient for UrlParam<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.url_mut()
            .query_pairs_mut()
            .append_pair(&self.param_name, &self.key);
        self.inner.execute(req).await
    }
}

/// Fetches `url` and returns the response body, failing on HTTP error
/// statuses.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);
    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}
