//! Page fetching
//!
//! [`PageFetcher`] is the seam between the pagination state machine and the
//! network: one paginated request in, one decoded page out.

use super::request::PaginationRequest;
use super::response::PaginationResponse;
use crate::decode::{decode_collection, decode_object, Decoder};
use crate::error::{Error, RequestInfo, Result};
use crate::http::{HttpExecutor, HttpRequest, RawResponse};
use crate::route::RouteType;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Fetches one page of a paginated collection
#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    async fn fetch(&self, request: PaginationRequest) -> Result<PaginationResponse<T>>;
}

/// [`PageFetcher`] over an HTTP executor and an element decoder
pub struct CollectionFetcher<T> {
    executor: Arc<dyn HttpExecutor>,
    decoder: Decoder<T>,
}

impl<T> CollectionFetcher<T> {
    pub fn new(executor: Arc<dyn HttpExecutor>, decoder: Decoder<T>) -> Self {
        Self { executor, decoder }
    }
}

impl<T: DeserializeOwned + 'static> CollectionFetcher<T> {
    /// Fetcher decoding elements with their `Deserialize` implementation
    pub fn serde(executor: Arc<dyn HttpExecutor>) -> Self {
        Self::new(executor, Decoder::serde())
    }
}

impl<T> Clone for CollectionFetcher<T> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            decoder: self.decoder.clone(),
        }
    }
}

#[async_trait]
impl<T: Send + 'static> PageFetcher<T> for CollectionFetcher<T> {
    async fn fetch(&self, request: PaginationRequest) -> Result<PaginationResponse<T>> {
        let http_request = request.to_http_request();
        debug!(
            path = %http_request.path,
            page = %request.page(),
            query = request.query().unwrap_or_default(),
            "Fetching page"
        );

        let (raw, info) = execute(self.executor.as_ref(), http_request).await?;
        let response = PaginationResponse::from_raw(&request, &raw, &self.decoder, info)?;

        debug!(
            elements = response.elements.len(),
            next_page = ?response.next_page,
            "Page fetched"
        );
        Ok(response)
    }
}

// ============================================================================
// Convenience Requests
// ============================================================================

/// Execute a route and return the raw JSON body
pub async fn request_json<E, R>(executor: &E, route: &R) -> Result<Value>
where
    E: HttpExecutor + ?Sized,
    R: RouteType + ?Sized,
{
    let (raw, info) = execute(executor, route.request()).await?;
    raw.json().map_err(|e| Error::parsing(e, Some(info), None))
}

/// Execute a route and decode the object at `key_path`
pub async fn request_object<T, E, R>(executor: &E, route: &R, key_path: Option<&str>) -> Result<T>
where
    T: DeserializeOwned + 'static,
    E: HttpExecutor + ?Sized,
    R: RouteType + ?Sized,
{
    request_object_with(executor, route, key_path, &Decoder::serde()).await
}

/// Execute a route and decode the object at `key_path` with a custom decoder
pub async fn request_object_with<T, E, R>(
    executor: &E,
    route: &R,
    key_path: Option<&str>,
    decoder: &Decoder<T>,
) -> Result<T>
where
    E: HttpExecutor + ?Sized,
    R: RouteType + ?Sized,
{
    let (raw, info) = execute(executor, route.request()).await?;
    let json = raw
        .json()
        .map_err(|e| Error::parsing(e, Some(info.clone()), None))?;
    match decode_object(&json, key_path, decoder) {
        Ok(object) => Ok(object),
        Err(e) => Err(Error::parsing(e, Some(info), Some(json))),
    }
}

/// Execute a route and decode every element of the array at `key_path`
pub async fn request_collection<T, E, R>(
    executor: &E,
    route: &R,
    key_path: Option<&str>,
) -> Result<Vec<T>>
where
    T: DeserializeOwned + 'static,
    E: HttpExecutor + ?Sized,
    R: RouteType + ?Sized,
{
    let (raw, info) = execute(executor, route.request()).await?;
    let json = raw
        .json()
        .map_err(|e| Error::parsing(e, Some(info.clone()), None))?;
    match decode_collection(&json, key_path, &Decoder::serde()) {
        Ok(elements) => Ok(elements),
        Err(e) => Err(Error::parsing(e, Some(info), Some(json))),
    }
}

/// Run a request, returning the response with the request summary used for
/// parsing errors
async fn execute<E: HttpExecutor + ?Sized>(
    executor: &E,
    request: HttpRequest,
) -> Result<(RawResponse, RequestInfo)> {
    let method = request.method;
    let path = request.path.clone();
    let raw = executor.execute(request).await?;

    let url = if raw.url.is_empty() { path } else { raw.url.clone() };
    let info = RequestInfo::new(method.as_str(), url);

    raw.error_for_status(&info)?;
    Ok((raw, info))
}
