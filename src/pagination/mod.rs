//! Pagination module
//!
//! Paginated requests over `Link`-header APIs and the view-model that pages
//! through them.
//!
//! # Overview
//!
//! - [`PaginationRequest`]: a route plus page, query and filter; derives
//!   modified copies and computes the effective parameters
//! - [`PaginationResponse`]: decoded elements plus the previous/next page
//!   tokens read from the response's `Link` relations
//! - [`PageFetcher`]: runs one request and builds its response envelope
//! - [`PaginationCoordinator`]: the state machine deciding what to request
//! - [`PaginationViewModel`]: async driver exposing inputs and observable state

mod coordinator;
mod fetcher;
mod link;
mod request;
mod response;
mod types;
mod view_model;

pub use coordinator::{CompletionOutcome, FetchCommand, PaginationCoordinator};
pub use fetcher::{
    request_collection, request_json, request_object, request_object_with, CollectionFetcher,
    PageFetcher,
};
pub use link::{find_link, link_page_parameter, parse_link_header, LinkRelation};
pub use request::PaginationRequest;
pub use response::PaginationResponse;
pub use types::{FilterType, PaginationPhase, PaginationSettings, PaginationSnapshot};
pub use view_model::PaginationViewModel;

#[cfg(test)]
mod tests;
