// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Opera
//!
//! Typed routes and reactive pagination over `Link`-header REST APIs.
//!
//! ## Features
//!
//! - **Declarative Routes**: endpoints as enums implementing [`route::RouteType`]
//! - **Pluggable HTTP**: an [`http::HttpExecutor`] seam with a reqwest client
//!   offering retries, request adapters, observers and download progress
//! - **Typed Decoding**: object and collection decoding at a key path
//! - **Paginated Requests**: page, query and filter merged into request
//!   parameters, next/previous page read from `Link` headers
//! - **Pagination View-Model**: refresh, infinite scroll, search and filtering
//!   with superseded responses discarded
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use opera::github::{GithubRoute, Repository};
//! use opera::http::HttpClient;
//! use opera::pagination::{PaginationRequest, PaginationViewModel};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> opera::Result<()> {
//!     let client = HttpClient::with_config(
//!         opera::http::HttpClientConfig::builder()
//!             .base_url("https://api.github.com")
//!             .build(),
//!     )?;
//!     let request = PaginationRequest::new(&GithubRoute::SearchRepositories)
//!         .with_collection_key_path("items");
//!
//!     let view_model = PaginationViewModel::<Repository>::with_executor(
//!         request,
//!         Arc::new(client),
//!         opera::decode::Decoder::serde(),
//!     );
//!     let mut state = view_model.subscribe();
//!     view_model.set_query("rust");
//!
//!     let snapshot = state.wait_for(|s| !s.loading && !s.elements.is_empty()).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     PaginationViewModel                         │
//! │  refresh()  load_next_page()  set_query()  set_filter()         │
//! │  subscribe() → watch<Snapshot>     errors() → broadcast<Error>  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────┬────────────────┴──┬───────────────┬──────────────┐
//! │   Route     │   Pagination      │    Decode     │    HTTP      │
//! ├─────────────┼───────────────────┼───────────────┼──────────────┤
//! │ RouteType   │ Request (page, q) │ Decoder<T>    │ HttpExecutor │
//! │ Descriptor  │ Response (Link)   │ Key paths     │ Retry/Backoff│
//! │ Adapted     │ Coordinator (FSM) │ Collections   │ Adapters     │
//! └─────────────┴───────────────────┴───────────────┴──────────────┘
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP client with retries, adapters and observers
pub mod http;

/// Route descriptions
pub mod route;

/// Response decoders
pub mod decode;

/// Paginated requests and the pagination view-model
pub mod pagination;

/// Configuration file loading
pub mod config;

/// GitHub routes, models and filters
pub mod github;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{load_config, load_config_from_str, OperaConfig};
pub use pagination::{
    PaginationRequest, PaginationResponse, PaginationSnapshot, PaginationViewModel,
};
pub use route::{AdaptedRoute, RouteDescriptor, RouteType};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
