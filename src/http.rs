//! HTTP plumbing shared by the API clients.
//!
//! Clients talk to the network through the [`Transport`] trait so they can be
//! constructed against any HTTP stack, or against a scripted double in tests.
//! [`RestClient`] adds URL building and JSON decoding on top of a transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{Error, Result};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default connection timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default maximum idle connections per host.
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// Default idle timeout in seconds.
pub const DEFAULT_POOL_IDLE_TIMEOUT_SECS: u64 = 90;

/// Query parameters in the order they are appended to a URL.
pub type Query<'a> = [(&'a str, String)];

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Final URL of the request.
    pub url: Url,
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Turns a non-success response into [`Error::Status`].
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::status(self.url.as_str(), self.status, &self.body))
        }
    }
}

/// Issues GET requests against absolute URLs.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<HttpResponse>;
}

/// Configuration for building a [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_max_idle_per_host: usize,
    /// Idle connection timeout.
    pub pool_idle_timeout: Duration,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT_SECS),
            user_agent: concat!("marketdata/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpClientConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Builds a reqwest-backed transport using this configuration.
    pub fn build(self) -> Result<ReqwestTransport> {
        let client = HttpClient::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .pool_idle_timeout(self.pool_idle_timeout)
            .user_agent(self.user_agent)
            .build()?;
        Ok(ReqwestTransport { client })
    }
}

/// [`Transport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: HttpClient,
}

impl ReqwestTransport {
    /// Builds a transport with the default configuration.
    pub fn new() -> Result<Self> {
        HttpClientConfig::default().build()
    }

    /// Wraps an existing reqwest client.
    pub fn with_client(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let url = response.url().clone();
        let body = response.text().await?;
        Ok(HttpResponse { url, status, body })
    }
}

/// Base URL plus transport; the common core of both API clients.
#[derive(Debug, Clone)]
pub struct RestClient<T> {
    transport: T,
    base_url: Url,
}

impl<T: Transport> RestClient<T> {
    pub fn new(base_url: &str, transport: T) -> Result<Self> {
        Ok(Self {
            transport,
            base_url: Url::parse(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Builds the URL for `path` and `query`, preserving any base path prefix.
    pub fn build_url(&self, path: &str, query: &Query<'_>) -> Url {
        let mut url = self.base_url.clone();

        let base_path = url.path().trim_end_matches('/');
        let suffix = path.trim_start_matches('/');
        let merged = if base_path.is_empty() {
            format!("/{suffix}")
        } else {
            format!("{base_path}/{suffix}")
        };
        url.set_path(&merged);

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    /// Issues a GET against an already built URL, whatever its status.
    pub async fn request_url(&self, url: &Url) -> Result<HttpResponse> {
        log::debug!("http.get url={url}");
        let response = self.transport.get(url).await?;
        log::debug!("http.response url={} status={}", response.url, response.status);
        Ok(response)
    }

    /// Issues a GET for `path` and decodes the JSON body, failing on a
    /// non-success status.
    pub async fn request_json<R: DeserializeOwned>(&self, path: &str, query: &Query<'_>) -> Result<R> {
        let url = self.build_url(path, query);
        self.request_url(&url).await?.error_for_status()?.json()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays canned responses in order and records every requested URL.
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        responses: Mutex<VecDeque<(u16, String)>>,
        requests: Mutex<Vec<Url>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn respond(self, status: u16, body: serde_json::Value) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push_back((status, body.to_string()));
            self
        }

        pub(crate) fn respond_text(self, status: u16, body: &str) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push_back((status, body.to_string()));
            self
        }

        pub(crate) fn requests(&self) -> Vec<Url> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get(&self, url: &Url) -> Result<HttpResponse> {
            self.requests.lock().unwrap().push(url.clone());
            let (status, body) = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected request {url}"));
            Ok(HttpResponse {
                url: url.clone(),
                status,
                body,
            })
        }
    }

    /// Query value of `key` in `url`.
    pub(crate) fn query_value(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}
