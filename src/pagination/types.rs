//! Pagination types and traits
//!
//! Naming settings, filters and the observable state published by the
//! view-model.

use crate::types::Parameters;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Settings
// ============================================================================

/// Parameter and link-relation names used by a paginated endpoint
///
/// The defaults match the GitHub REST API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    /// Query parameter carrying the page token
    pub page_parameter_name: String,
    /// Query parameter carrying the search query
    pub query_parameter_name: String,
    /// Token of the first page
    pub first_page_value: String,
    /// `Link` relation pointing to the previous page
    pub prev_relation_name: String,
    /// `Link` relation pointing to the next page
    pub next_relation_name: String,
    /// Query parameter of a relation URI holding the page token
    pub relation_page_parameter_name: String,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            page_parameter_name: "page".to_string(),
            query_parameter_name: "q".to_string(),
            first_page_value: "1".to_string(),
            prev_relation_name: "prev".to_string(),
            next_relation_name: "next".to_string(),
            relation_page_parameter_name: "page".to_string(),
        }
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Provides extra request parameters for a paginated request
///
/// Filter parameters are merged last, so they override everything else.
pub trait FilterType: Send + Sync + fmt::Debug {
    /// Parameters contributed by this filter
    fn parameters(&self) -> Parameters;
}

impl FilterType for Parameters {
    fn parameters(&self) -> Parameters {
        self.clone()
    }
}

// ============================================================================
// Observable State
// ============================================================================

/// Phase of the pagination state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaginationPhase {
    /// Nothing in flight
    #[default]
    Idle,
    /// A first-page request is in flight
    LoadingFirstPage,
    /// A request for a later page is in flight
    LoadingNextPage,
    /// The last request failed; inputs are accepted as in `Idle`
    Error,
}

impl PaginationPhase {
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            PaginationPhase::LoadingFirstPage | PaginationPhase::LoadingNextPage
        )
    }
}

impl fmt::Display for PaginationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaginationPhase::Idle => "idle",
            PaginationPhase::LoadingFirstPage => "loading_first_page",
            PaginationPhase::LoadingNextPage => "loading_next_page",
            PaginationPhase::Error => "error",
        };
        f.write_str(name)
    }
}

/// Snapshot of the pagination state, as seen by consumers
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationSnapshot<T> {
    /// Accumulated elements, in page order
    pub elements: Vec<T>,
    /// A request is in flight
    pub loading: bool,
    /// The in-flight request targets the first page
    pub first_page_loading: bool,
    /// The latest response announced a next page
    pub has_next_page: bool,
    /// Not loading and nothing loaded
    pub empty_state: bool,
    /// State machine phase
    pub phase: PaginationPhase,
    /// Page of the in-flight or most recent request
    pub page: String,
}

impl<T> PaginationSnapshot<T> {
    /// State before any request was issued
    pub fn initial(page: impl Into<String>) -> Self {
        Self {
            elements: Vec::new(),
            loading: false,
            first_page_loading: false,
            has_next_page: false,
            empty_state: true,
            phase: PaginationPhase::Idle,
            page: page.into(),
        }
    }
}
