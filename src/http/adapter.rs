//! Request adapters
//!
//! Adapters rewrite a request right before it is sent. The usual job is
//! authentication; [`CompositeAdapter`] runs several of them in order.

use super::types::HttpRequest;
use crate::error::TransportError;
use base64::Engine as _;
use std::fmt;
use std::sync::Arc;

/// Rewrites outgoing requests
pub trait RequestAdapter: Send + Sync {
    /// Identity used by [`CompositeAdapter`]; one adapter per key
    fn key(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }

    /// Adapt the request
    fn adapt(&self, request: HttpRequest) -> Result<HttpRequest, TransportError>;
}

// ============================================================================
// Composite Adapter
// ============================================================================

/// Ordered pipeline of adapters
///
/// Appending an adapter whose key is already present replaces the existing
/// one in place.
#[derive(Clone, Default)]
pub struct CompositeAdapter {
    adapters: Vec<Arc<dyn RequestAdapter>>,
}

impl CompositeAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline from adapters, in order
    pub fn with_adapters(adapters: Vec<Arc<dyn RequestAdapter>>) -> Self {
        let mut composite = Self::new();
        for adapter in adapters {
            composite.append(adapter);
        }
        composite
    }

    /// Append an adapter at the end of the pipeline
    pub fn append(&mut self, adapter: Arc<dyn RequestAdapter>) {
        let key = adapter.key();
        if let Some(slot) = self.adapters.iter_mut().find(|a| a.key() == key) {
            *slot = adapter;
        } else {
            self.adapters.push(adapter);
        }
    }

    /// Remove an adapter by key, returning whether one was removed
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.adapters.len();
        self.adapters.retain(|a| a.key() != key);
        before != self.adapters.len()
    }

    pub fn keys(&self) -> Vec<String> {
        self.adapters.iter().map(|a| a.key()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }
}

impl RequestAdapter for CompositeAdapter {
    fn adapt(&self, request: HttpRequest) -> Result<HttpRequest, TransportError> {
        self.adapters
            .iter()
            .try_fold(request, |request, adapter| adapter.adapt(request))
    }
}

impl fmt::Debug for CompositeAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeAdapter")
            .field("adapters", &self.keys())
            .finish()
    }
}

// ============================================================================
// Token Adapter
// ============================================================================

/// Sets the `Authorization` header from an access token
#[derive(Clone)]
pub struct TokenAdapter {
    scheme: String,
    token: String,
}

impl TokenAdapter {
    /// `Authorization: <scheme> <token>`
    pub fn new(scheme: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            token: token.into(),
        }
    }

    /// GitHub personal access token (`token <t>`)
    pub fn github(token: impl Into<String>) -> Self {
        Self::new("token", token)
    }

    /// OAuth bearer token
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::new("Bearer", token)
    }
}

impl RequestAdapter for TokenAdapter {
    fn key(&self) -> String {
        "authorization".to_string()
    }

    fn adapt(&self, mut request: HttpRequest) -> Result<HttpRequest, TransportError> {
        if self.token.is_empty() {
            return Err(TransportError::Adapter {
                adapter: self.key(),
                message: "empty access token".to_string(),
            });
        }
        request.set_header("Authorization", format!("{} {}", self.scheme, self.token));
        Ok(request)
    }
}

impl fmt::Debug for TokenAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAdapter")
            .field("scheme", &self.scheme)
            .field("token", &"***")
            .finish()
    }
}

// ============================================================================
// Basic Auth Adapter
// ============================================================================

/// HTTP basic authentication
#[derive(Clone)]
pub struct BasicAuthAdapter {
    username: String,
    password: String,
}

impl BasicAuthAdapter {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl RequestAdapter for BasicAuthAdapter {
    fn key(&self) -> String {
        "authorization".to_string()
    }

    fn adapt(&self, mut request: HttpRequest) -> Result<HttpRequest, TransportError> {
        let credentials = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.username, self.password));
        request.set_header("Authorization", format!("Basic {credentials}"));
        Ok(request)
    }
}

impl fmt::Debug for BasicAuthAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuthAdapter")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
