//! Pagination state machine
//!
//! [`PaginationCoordinator`] owns the accumulated elements and decides which
//! request to issue for each input. It performs no I/O: every input returns
//! the [`FetchCommand`] to run, if any, and results are fed back through
//! [`PaginationCoordinator::complete`] tagged with the command's generation.
//! Results from superseded generations are discarded.

use super::request::PaginationRequest;
use super::response::PaginationResponse;
use super::types::{FilterType, PaginationPhase, PaginationSnapshot};
use crate::error::{Error, Result};
use std::sync::Arc;

/// A request the driver must execute
#[derive(Debug, Clone)]
pub struct FetchCommand {
    /// Tag to pass back to [`PaginationCoordinator::complete`]
    pub generation: u64,
    /// Request to execute
    pub request: PaginationRequest,
}

/// What a completion did to the state
#[derive(Debug)]
pub enum CompletionOutcome {
    /// Elements were replaced (first page) or extended
    Applied { first_page: bool, received: usize },
    /// The request failed; the error must be published
    Failed(Error),
    /// The result belonged to a superseded request
    Discarded,
}

#[derive(Debug, Clone)]
struct InFlight {
    generation: u64,
    first_page: bool,
}

/// Pagination state machine
#[derive(Debug)]
pub struct PaginationCoordinator<T> {
    request: PaginationRequest,
    elements: Vec<T>,
    phase: PaginationPhase,
    next_page: Option<String>,
    rearmed_page: Option<String>,
    generation: u64,
    in_flight: Option<InFlight>,
}

impl<T> PaginationCoordinator<T> {
    pub fn new(request: PaginationRequest) -> Self {
        Self {
            request,
            elements: Vec::new(),
            phase: PaginationPhase::Idle,
            next_page: None,
            rearmed_page: None,
            generation: 0,
            in_flight: None,
        }
    }

    // ========================================================================
    // Inputs
    // ========================================================================

    /// Reload from the first page
    ///
    /// Ignored while a first-page request is in flight. Otherwise any pending
    /// next-page request is superseded and the elements are cleared.
    pub fn refresh(&mut self) -> Option<FetchCommand> {
        if self.phase == PaginationPhase::LoadingFirstPage {
            return None;
        }
        Some(self.restart())
    }

    /// Load the re-armed page, else the next page of the latest response
    ///
    /// Ignored while loading or when there is nothing to load.
    pub fn load_next_page(&mut self) -> Option<FetchCommand> {
        if self.phase.is_loading() {
            return None;
        }

        let page = self.rearmed_page.take().or_else(|| self.next_page.clone())?;
        let first_page = page == self.request.first_page();
        self.request = self.request.with_page(page);
        Some(self.issue(first_page))
    }

    /// Change the query and reload from the first page
    ///
    /// Always supersedes an in-flight request.
    pub fn set_query(&mut self, query: impl Into<String>) -> FetchCommand {
        self.request = self.request.with_query(query);
        self.restart()
    }

    /// Change the filter and reload from the first page
    ///
    /// Always supersedes an in-flight request.
    pub fn set_filter(&mut self, filter: Arc<dyn FilterType>) -> FetchCommand {
        self.request = self.request.with_shared_filter(Some(filter));
        self.restart()
    }

    /// Apply the result of a previously issued command
    pub fn complete(
        &mut self,
        generation: u64,
        result: Result<PaginationResponse<T>>,
    ) -> CompletionOutcome {
        let first_page = match &self.in_flight {
            Some(in_flight) if in_flight.generation == generation => in_flight.first_page,
            _ => return CompletionOutcome::Discarded,
        };
        self.in_flight = None;

        match result {
            Ok(response) => {
                let received = response.elements.len();
                if first_page {
                    self.elements = response.elements;
                } else {
                    self.elements.extend(response.elements);
                }
                self.next_page = response.next_page.filter(|page| !page.is_empty());
                self.rearmed_page = None;
                self.phase = PaginationPhase::Idle;
                CompletionOutcome::Applied {
                    first_page,
                    received,
                }
            }
            Err(error) => {
                self.rearmed_page = Some(self.request.page().to_string());
                self.phase = PaginationPhase::Error;
                CompletionOutcome::Failed(error)
            }
        }
    }

    // ========================================================================
    // State
    // ========================================================================

    pub fn request(&self) -> &PaginationRequest {
        &self.request
    }

    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    pub fn phase(&self) -> PaginationPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase.is_loading()
    }

    pub fn is_first_page_loading(&self) -> bool {
        self.phase == PaginationPhase::LoadingFirstPage
    }

    pub fn has_next_page(&self) -> bool {
        self.next_page.is_some()
    }

    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    /// Page a failed request left for the next trigger
    pub fn rearmed_page(&self) -> Option<&str> {
        self.rearmed_page.as_deref()
    }

    pub fn is_empty_state(&self) -> bool {
        !self.is_loading() && self.elements.is_empty()
    }

    /// Generation of the in-flight request
    pub fn in_flight_generation(&self) -> Option<u64> {
        self.in_flight.as_ref().map(|f| f.generation)
    }

    fn restart(&mut self) -> FetchCommand {
        self.elements.clear();
        self.next_page = None;
        self.rearmed_page = None;
        self.request = self.request.with_page(self.request.first_page().to_string());
        self.issue(true)
    }

    fn issue(&mut self, first_page: bool) -> FetchCommand {
        self.generation += 1;
        self.in_flight = Some(InFlight {
            generation: self.generation,
            first_page,
        });
        self.phase = if first_page {
            PaginationPhase::LoadingFirstPage
        } else {
            PaginationPhase::LoadingNextPage
        };

        FetchCommand {
            generation: self.generation,
            request: self.request.clone(),
        }
    }
}

impl<T: Clone> PaginationCoordinator<T> {
    pub fn snapshot(&self) -> PaginationSnapshot<T> {
        PaginationSnapshot {
            elements: self.elements.clone(),
            loading: self.is_loading(),
            first_page_loading: self.is_first_page_loading(),
            has_next_page: self.has_next_page(),
            empty_state: self.is_empty_state(),
            phase: self.phase,
            page: self.request.page().to_string(),
        }
    }
}
