//! Error types for Opera
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Networking and parsing failures are distinct kinds: a networking error
//! wraps a [`TransportError`] from the HTTP collaborator, a parsing error wraps
//! a [`DecodeError`] together with the JSON that failed to decode.

use crate::decode::DecodeError;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Summary of the request an error belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    /// HTTP method
    pub method: String,
    /// Fully resolved URL (including query string when known)
    pub url: String,
}

impl RequestInfo {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
        }
    }
}

impl fmt::Display for RequestInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Failures raised by the HTTP collaborator
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Request adapter '{adapter}' failed: {message}")]
    Adapter { adapter: String, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl TransportError {
    /// Check if retrying the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Http(e) => e.is_timeout() || e.is_connect(),
            TransportError::RateLimited { .. } | TransportError::Timeout { .. } => true,
            TransportError::Status { status, .. } => is_retryable_status(*status),
            TransportError::Adapter { .. } | TransportError::InvalidUrl(_) => false,
        }
    }
}

/// The main error type for Opera
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Request Errors
    // ============================================================================
    #[error("Networking error: {source}{}", describe_request(.request))]
    Networking {
        #[source]
        source: TransportError,
        request: Option<RequestInfo>,
    },

    #[error("Parsing error: {source}{}", describe_request(.request))]
    Parsing {
        #[source]
        source: DecodeError,
        request: Option<RequestInfo>,
        json: Option<Value>,
    },

    #[error("Unknown error: {message}")]
    Unknown { message: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

fn describe_request(request: &Option<RequestInfo>) -> String {
    request
        .as_ref()
        .map(|r| format!(" ({r})"))
        .unwrap_or_default()
}

impl Error {
    /// Create a networking error
    pub fn networking(source: impl Into<TransportError>, request: Option<RequestInfo>) -> Self {
        Self::Networking {
            source: source.into(),
            request,
        }
    }

    /// Create a parsing error
    pub fn parsing(source: DecodeError, request: Option<RequestInfo>, json: Option<Value>) -> Self {
        Self::Parsing {
            source,
            request,
            json,
        }
    }

    /// Create an unknown error
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this is a networking error
    pub fn is_networking(&self) -> bool {
        matches!(self, Error::Networking { .. })
    }

    /// Check if this is a parsing error
    pub fn is_parsing(&self) -> bool {
        matches!(self, Error::Parsing { .. })
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Networking { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// HTTP status code of the failed response, if one was received
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Networking {
                source: TransportError::Status { status, .. },
                ..
            } => Some(*status),
            Error::Networking {
                source: TransportError::Http(e),
                ..
            } => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The request this error belongs to, if known
    pub fn request(&self) -> Option<&RequestInfo> {
        match self {
            Error::Networking { request, .. } | Error::Parsing { request, .. } => {
                request.as_ref()
            }
            _ => None,
        }
    }

    /// The JSON fragment that failed to decode
    pub fn json(&self) -> Option<&Value> {
        match self {
            Error::Parsing { json, .. } => json.as_ref(),
            _ => None,
        }
    }

    /// Attach request information to a request error that has none
    #[must_use]
    pub fn with_request(self, info: RequestInfo) -> Self {
        match self {
            Error::Networking {
                source,
                request: None,
            } => Error::Networking {
                source,
                request: Some(info),
            },
            Error::Parsing {
                source,
                request: None,
                json,
            } => Error::Parsing {
                source,
                request: Some(info),
                json,
            },
            other => other,
        }
    }
}

impl From<TransportError> for Error {
    fn from(source: TransportError) -> Self {
        Error::Networking {
            source,
            request: None,
        }
    }
}

/// Check if an HTTP status code is retryable
pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504 | 520..=524)
}

/// Result type alias for Opera
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
