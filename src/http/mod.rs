//! HTTP client module
//!
//! The HTTP collaborator used by routes and paginated requests.
//!
//! # Features
//!
//! - **Executor trait**: [`HttpExecutor`] is the seam everything above the
//!   transport depends on, so coordinators can run against fakes in tests
//! - **Automatic Retries**: per-route retry budget with backoff
//! - **Request Adapters**: composable request rewriting (authentication)
//! - **Observers**: hooks invoked right before each request is sent
//! - **Download Progress**: streamed bodies reported to progress handlers

mod adapter;
mod client;
mod observer;
mod types;

pub use adapter::{BasicAuthAdapter, CompositeAdapter, RequestAdapter, TokenAdapter};
pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use observer::{LoggingObserver, RequestObserver};
pub use types::{HttpExecutor, HttpRequest, Progress, ProgressHandler, RawResponse};
