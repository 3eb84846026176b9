//! HTTP request and response types

use crate::decode::{parse_json, DecodeError};
use crate::error::{Error, RequestInfo, Result, TransportError};
use crate::types::{Method, ParameterEncoding, Parameters};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Download or upload progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Bytes transferred so far
    pub completed: u64,
    /// Expected total, when the server announced one
    pub total: Option<u64>,
}

impl Progress {
    /// Completed fraction in `0.0..=1.0`, if the total is known
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> Option<f64> {
        match self.total {
            Some(0) => Some(1.0),
            Some(total) => Some((self.completed as f64 / total as f64).min(1.0)),
            None => None,
        }
    }
}

/// Callback receiving progress updates
pub type ProgressHandler = Arc<dyn Fn(Progress) + Send + Sync>;

/// Everything the executor needs to put one request on the wire
#[derive(Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Path relative to the base URL, or an absolute URL
    pub path: String,
    /// Base URL override
    pub base_url: Option<String>,
    /// Parameters, encoded according to `encoding`
    pub parameters: Parameters,
    /// Where parameters go
    pub encoding: ParameterEncoding,
    /// Extra request headers
    pub headers: Vec<(String, String)>,
    /// Retries allowed after the first attempt
    pub retry_count: u32,
    /// Download progress handlers
    pub download_progress: Vec<ProgressHandler>,
}

impl HttpRequest {
    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set a header, replacing any existing value with the same name
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    pub(crate) fn notify_download(&self, progress: Progress) {
        for handler in &self.download_progress {
            handler(progress);
        }
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("base_url", &self.base_url)
            .field("parameters", &self.parameters)
            .field("encoding", &self.encoding)
            .field("headers", &self.headers)
            .field("retry_count", &self.retry_count)
            .field("download_progress_handlers", &self.download_progress.len())
            .finish()
    }
}

/// A completed HTTP exchange
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
    /// Final request URL
    pub url: String,
}

impl RawResponse {
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            url: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fail with a `Networking` status error unless the status is 2xx
    pub fn error_for_status(&self, info: &RequestInfo) -> Result<()> {
        if self.is_success() {
            return Ok(());
        }
        Err(Error::networking(
            TransportError::Status {
                status: self.status,
                body: self.text(),
            },
            Some(info.clone()),
        ))
    }

    /// Parse the body as JSON
    pub fn json(&self) -> std::result::Result<Value, DecodeError> {
        parse_json(&self.body)
    }

    /// Body as lossy UTF-8 text
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Performs HTTP requests
///
/// Implementations own transport concerns (connection handling, timeouts,
/// retries within the request's budget) and report one final outcome per call.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    /// Execute a request
    async fn execute(&self, request: HttpRequest) -> Result<RawResponse>;
}

#[async_trait]
impl<T: HttpExecutor + ?Sized> HttpExecutor for Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<RawResponse> {
        (**self).execute(request).await
    }
}
