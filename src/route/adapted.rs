//! Route decorator with typed extensions

use super::types::{RouteDescriptor, RouteType};
use crate::http::{HttpRequest, Progress, ProgressHandler};
use crate::types::{Method, ParameterEncoding, Parameters};
use std::fmt;
use std::sync::Arc;

/// A route plus request-time extensions
///
/// The wrapped route is shared, never modified. Adapting an adapted route
/// just accumulates more extensions on the same decorator.
#[derive(Clone)]
pub struct AdaptedRoute {
    route: Arc<RouteDescriptor>,
    headers: Vec<(String, String)>,
    download_progress: Vec<ProgressHandler>,
}

impl AdaptedRoute {
    pub fn new(route: impl Into<Arc<RouteDescriptor>>) -> Self {
        Self {
            route: route.into(),
            headers: Vec::new(),
            download_progress: Vec::new(),
        }
    }

    /// Wrap any route type
    pub fn from_route<R: RouteType + ?Sized>(route: &R) -> Self {
        Self::new(route.descriptor())
    }

    /// The wrapped route
    pub fn inner(&self) -> &RouteDescriptor {
        &self.route
    }

    /// Send an extra header with every request built from this route
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Report response body download progress
    #[must_use]
    pub fn with_download_progress<F>(mut self, handler: F) -> Self
    where
        F: Fn(Progress) + Send + Sync + 'static,
    {
        self.download_progress.push(Arc::new(handler));
        self
    }

    pub fn has_progress_handlers(&self) -> bool {
        !self.download_progress.is_empty()
    }

    /// Request with the route's static parameters
    pub fn to_request(&self) -> HttpRequest {
        self.to_request_with(self.route.static_parameters().clone())
    }

    /// Request with an explicit parameter set
    pub fn to_request_with(&self, parameters: Parameters) -> HttpRequest {
        let mut request = self.route.to_request_with(parameters);
        request.headers.extend(self.headers.iter().cloned());
        request
            .download_progress
            .extend(self.download_progress.iter().cloned());
        request
    }
}

impl RouteType for AdaptedRoute {
    fn method(&self) -> Method {
        self.route.method()
    }

    fn path(&self) -> String {
        self.route.path()
    }

    fn parameters(&self) -> Option<Parameters> {
        self.route.parameters()
    }

    fn encoding(&self) -> ParameterEncoding {
        self.route.encoding()
    }

    fn base_url(&self) -> Option<String> {
        self.route.base_url()
    }

    fn retry_count(&self) -> u32 {
        self.route.retry_count()
    }

    fn descriptor(&self) -> RouteDescriptor {
        (*self.route).clone()
    }

    fn request(&self) -> HttpRequest {
        self.to_request()
    }
}

impl From<RouteDescriptor> for AdaptedRoute {
    fn from(route: RouteDescriptor) -> Self {
        Self::new(route)
    }
}

impl fmt::Debug for AdaptedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptedRoute")
            .field("route", &self.route)
            .field("headers", &self.headers)
            .field("download_progress_handlers", &self.download_progress.len())
            .finish()
    }
}
