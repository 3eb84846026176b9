//! Paginated request

use super::types::{FilterType, PaginationSettings};
use crate::http::HttpRequest;
use crate::route::{AdaptedRoute, RouteDescriptor, RouteType};
use crate::types::{JsonValue, OptionStringExt, Parameters};
use std::sync::Arc;

/// A route plus the page, query and filter of one paginated request
///
/// Values are immutable; `with_*` methods return modified copies. Changing the
/// query or the filter always starts over at the first page.
#[derive(Debug, Clone)]
pub struct PaginationRequest {
    route: AdaptedRoute,
    page: String,
    query: Option<String>,
    filter: Option<Arc<dyn FilterType>>,
    collection_key_path: Option<String>,
    settings: PaginationSettings,
}

impl PaginationRequest {
    /// Request for the first page of `route` with default settings
    pub fn new<R: RouteType + ?Sized>(route: &R) -> Self {
        Self::from_adapted(AdaptedRoute::from_route(route))
    }

    /// Request over an adapted route, keeping its extensions
    pub fn from_adapted(route: AdaptedRoute) -> Self {
        let settings = PaginationSettings::default();
        Self {
            route,
            page: settings.first_page_value.clone(),
            query: None,
            filter: None,
            collection_key_path: None,
            settings,
        }
    }

    /// Replace the naming settings; the page moves to the new first page
    #[must_use]
    pub fn with_settings(mut self, settings: PaginationSettings) -> Self {
        self.page = settings.first_page_value.clone();
        self.settings = settings;
        self
    }

    /// Where the element array lives in the response body
    #[must_use]
    pub fn with_collection_key_path(mut self, key_path: impl Into<String>) -> Self {
        self.collection_key_path = key_path.into().none_if_empty();
        self
    }

    /// Same request for another page
    #[must_use]
    pub fn with_page(&self, page: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            ..self.clone()
        }
    }

    /// Same request with a new query, at the first page
    #[must_use]
    pub fn with_query(&self, query: impl Into<String>) -> Self {
        Self {
            query: query.into().none_if_empty(),
            page: self.settings.first_page_value.clone(),
            ..self.clone()
        }
    }

    /// Same request with a new filter, at the first page
    #[must_use]
    pub fn with_filter(&self, filter: impl FilterType + 'static) -> Self {
        self.with_shared_filter(Some(Arc::new(filter)))
    }

    /// Same request with a shared filter (or none), at the first page
    #[must_use]
    pub fn with_shared_filter(&self, filter: Option<Arc<dyn FilterType>>) -> Self {
        Self {
            filter,
            page: self.settings.first_page_value.clone(),
            ..self.clone()
        }
    }

    pub fn route(&self) -> &RouteDescriptor {
        self.route.inner()
    }

    pub fn page(&self) -> &str {
        &self.page
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn filter(&self) -> Option<&Arc<dyn FilterType>> {
        self.filter.as_ref()
    }

    pub fn collection_key_path(&self) -> Option<&str> {
        self.collection_key_path.as_deref()
    }

    pub fn settings(&self) -> &PaginationSettings {
        &self.settings
    }

    pub fn first_page(&self) -> &str {
        &self.settings.first_page_value
    }

    pub fn is_first_page(&self) -> bool {
        self.page == self.settings.first_page_value
    }

    /// Effective request parameters
    ///
    /// Merged with later entries winning: static route parameters, the page,
    /// the query (when non-empty), then the filter's parameters.
    pub fn parameters(&self) -> Parameters {
        let mut params = self.route.inner().static_parameters().clone();
        params.insert(
            self.settings.page_parameter_name.clone(),
            JsonValue::String(self.page.clone()),
        );

        if let Some(query) = &self.query {
            params.insert(
                self.settings.query_parameter_name.clone(),
                JsonValue::String(query.clone()),
            );
        }

        if let Some(filter) = &self.filter {
            params.extend(filter.parameters());
        }
        params
    }

    /// Executor-facing request for the current page
    pub fn to_http_request(&self) -> HttpRequest {
        self.route.to_request_with(self.parameters())
    }
}
