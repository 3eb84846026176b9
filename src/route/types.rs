//! Route types and traits

use crate::http::HttpRequest;
use crate::types::{JsonValue, Method, ParameterEncoding, Parameters};

/// A type that describes one API endpoint
///
/// Only `method` and `path` are required; everything else has the defaults of
/// a plain endpoint: no static parameters, encoding chosen from the method,
/// the client's base URL, and no retries.
pub trait RouteType {
    /// HTTP method
    fn method(&self) -> Method;

    /// URL path, relative to the base URL
    fn path(&self) -> String;

    /// Static parameters sent with every request to this route
    fn parameters(&self) -> Option<Parameters> {
        None
    }

    /// How parameters are applied to the request
    fn encoding(&self) -> ParameterEncoding {
        self.method().default_encoding()
    }

    /// Base URL override
    fn base_url(&self) -> Option<String> {
        None
    }

    /// How many times a failed request is retried
    fn retry_count(&self) -> u32 {
        0
    }

    /// Snapshot this route as a descriptor
    fn descriptor(&self) -> RouteDescriptor {
        RouteDescriptor {
            method: self.method(),
            path: self.path(),
            parameters: self.parameters().unwrap_or_default(),
            encoding: self.encoding(),
            base_url: self.base_url(),
            retry_count: self.retry_count(),
        }
    }

    /// Executor request carrying the route's static parameters
    fn request(&self) -> HttpRequest {
        self.descriptor().to_request()
    }
}

/// Immutable description of one endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDescriptor {
    method: Method,
    path: String,
    parameters: Parameters,
    encoding: ParameterEncoding,
    base_url: Option<String>,
    retry_count: u32,
}

impl RouteDescriptor {
    /// Create a route with the method's default encoding
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            parameters: Parameters::new(),
            encoding: method.default_encoding(),
            base_url: None,
            retry_count: 0,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a static parameter
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Replace all static parameters
    #[must_use]
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Override the parameter encoding
    #[must_use]
    pub fn with_encoding(mut self, encoding: ParameterEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Override the client's base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the retry budget
    #[must_use]
    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    pub fn static_parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Request for this route with its static parameters
    pub fn to_request(&self) -> HttpRequest {
        self.to_request_with(self.parameters.clone())
    }

    /// Request for this route with an explicit parameter set
    pub fn to_request_with(&self, parameters: Parameters) -> HttpRequest {
        HttpRequest {
            method: self.method,
            path: self.path.clone(),
            base_url: self.base_url.clone(),
            parameters,
            encoding: self.encoding,
            headers: Vec::new(),
            retry_count: self.retry_count,
            download_progress: Vec::new(),
        }
    }
}

impl RouteType for RouteDescriptor {
    fn method(&self) -> Method {
        self.method
    }

    fn path(&self) -> String {
        self.path.clone()
    }

    fn parameters(&self) -> Option<Parameters> {
        if self.parameters.is_empty() {
            None
        } else {
            Some(self.parameters.clone())
        }
    }

    fn encoding(&self) -> ParameterEncoding {
        self.encoding
    }

    fn base_url(&self) -> Option<String> {
        self.base_url.clone()
    }

    fn retry_count(&self) -> u32 {
        self.retry_count
    }

    fn descriptor(&self) -> RouteDescriptor {
        self.clone()
    }

    fn request(&self) -> HttpRequest {
        self.to_request()
    }
}
