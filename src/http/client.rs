//! HTTP client with retry, adapters and observers
//!
//! Provides the `reqwest` implementation of [`HttpExecutor`]:
//! - Retries within the request's own budget, with configurable backoff
//! - Request adapters applied once before the first attempt
//! - Observers notified before every attempt
//! - Streamed bodies when download progress handlers are attached

use super::adapter::{CompositeAdapter, RequestAdapter};
use super::observer::RequestObserver;
use super::types::{HttpExecutor, HttpRequest, Progress, RawResponse};
use crate::error::{Error, RequestInfo, Result, TransportError};
use crate::types::{query_pairs, BackoffType, JsonValue, ParameterEncoding};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::{Client, Response, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for relative request paths
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff (also caps `Retry-After`)
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            default_headers: HashMap::new(),
            user_agent: format!("opera/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// HTTP client with retry, adapters and observers
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    adapter: CompositeAdapter,
    observers: Vec<Arc<dyn RequestObserver>>,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            adapter: CompositeAdapter::new(),
            observers: Vec::new(),
        })
    }

    /// Add a request adapter (replaces an adapter with the same key)
    #[must_use]
    pub fn with_adapter(mut self, adapter: impl RequestAdapter + 'static) -> Self {
        self.adapter.append(Arc::new(adapter));
        self
    }

    /// Add a request observer
    #[must_use]
    pub fn with_observer(mut self, observer: impl RequestObserver + 'static) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    /// Mutable access to the adapter pipeline
    pub fn adapters_mut(&mut self) -> &mut CompositeAdapter {
        &mut self.adapter
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Resolve the final URL, query string included for URL encoding
    pub fn resolve_url(&self, request: &HttpRequest) -> std::result::Result<Url, TransportError> {
        let full = self.build_url(request);
        let mut url = Url::parse(&full)?;

        if request.encoding == ParameterEncoding::Url && !request.parameters.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query_pairs(&request.parameters));
        }
        Ok(url)
    }

    /// Build full URL from path
    fn build_url(&self, request: &HttpRequest) -> String {
        let path = &request.path;
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.clone();
        }

        match request.base_url.as_ref().or(self.config.base_url.as_ref()) {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                format!("{base}/{path}")
            }
            None => path.clone(),
        }
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.config.backoff_type {
            BackoffType::Constant => self.config.initial_backoff,
            BackoffType::Linear => self.config.initial_backoff * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.config.initial_backoff.saturating_mul(factor)
            }
        };

        std::cmp::min(delay, self.config.max_backoff)
    }

    fn build_request(&self, request: &HttpRequest, url: &Url) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .request(request.method.into(), url.clone())
            .timeout(self.config.timeout);

        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }
        for (key, value) in &request.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        if request.encoding == ParameterEncoding::Json && !request.parameters.is_empty() {
            req = req.json(&JsonValue::Object(request.parameters.clone()));
        }
        req
    }

    async fn send(&self, request: HttpRequest) -> std::result::Result<RawResponse, TransportError> {
        let request = self.adapter.adapt(request)?;
        let url = self.resolve_url(&request)?;
        let info = RequestInfo::new(request.method.as_str(), url.as_str());
        let max_retries = request.retry_count;
        let mut attempt = 0;

        loop {
            for observer in &self.observers {
                observer.will_send(&request, &info, attempt + 1);
            }

            match self.build_request(&request, &url).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        debug!("Request succeeded: {} {}", info.method, info.url);
                        return read_body(response, &request).await;
                    }

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = extract_retry_after(&response);
                        if attempt < max_retries {
                            let delay = std::cmp::min(
                                Duration::from_secs(retry_after),
                                self.config.max_backoff,
                            );
                            warn!(
                                "Rate limited (429), attempt {}/{}, waiting {:?}",
                                attempt + 1,
                                max_retries + 1,
                                delay
                            );
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                            continue;
                        }
                        return Err(TransportError::RateLimited {
                            retry_after_seconds: retry_after,
                        });
                    }

                    if crate::error::is_retryable_status(status.as_u16()) && attempt < max_retries {
                        let delay = self.calculate_backoff(attempt);
                        warn!(
                            "Request failed with {}, attempt {}/{}, retrying in {:?}",
                            status.as_u16(),
                            attempt + 1,
                            max_retries + 1,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    let body = response.text().await.unwrap_or_default();
                    return Err(TransportError::Status {
                        status: status.as_u16(),
                        body,
                    });
                }
                Err(e) => {
                    let retryable = e.is_timeout() || e.is_connect();
                    if retryable && attempt < max_retries {
                        let delay = self.calculate_backoff(attempt);
                        warn!(
                            "Transport error ({}), attempt {}/{}, retrying in {:?}",
                            e,
                            attempt + 1,
                            max_retries + 1,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    if e.is_timeout() {
                        #[allow(clippy::cast_possible_truncation)]
                        return Err(TransportError::Timeout {
                            timeout_ms: self.config.timeout.as_millis() as u64,
                        });
                    }
                    return Err(TransportError::Http(e));
                }
            }
        }
    }
}

#[async_trait]
impl HttpExecutor for HttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<RawResponse> {
        let fallback = RequestInfo::new(request.method.as_str(), self.build_url(&request));
        let info = self
            .resolve_url(&request)
            .map(|url| RequestInfo::new(request.method.as_str(), url.as_str()))
            .unwrap_or(fallback);

        self.send(request)
            .await
            .map_err(|source| Error::networking(source, Some(info)))
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("adapters", &self.adapter)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

/// Read the body, reporting progress when handlers are attached
async fn read_body(
    mut response: Response,
    request: &HttpRequest,
) -> std::result::Result<RawResponse, TransportError> {
    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let url = response.url().to_string();

    let body: Bytes = if request.download_progress.is_empty() {
        response.bytes().await?
    } else {
        let total = response.content_length();
        let mut buffer = BytesMut::new();
        while let Some(chunk) = response.chunk().await? {
            buffer.extend_from_slice(&chunk);
            request.notify_download(Progress {
                completed: buffer.len() as u64,
                total,
            });
        }
        buffer.freeze()
    };

    Ok(RawResponse {
        status,
        headers,
        body,
        url,
    })
}

/// Extract retry-after header value
fn extract_retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(60)
}
