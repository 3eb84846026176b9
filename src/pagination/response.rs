//! Paginated response envelope

use super::link::link_page_parameter;
use super::request::PaginationRequest;
use crate::decode::{decode_collection, Decoder};
use crate::error::{Error, RequestInfo, Result};
use crate::http::RawResponse;

/// One decoded page plus the tokens of its neighbours
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationResponse<T> {
    /// Decoded elements of this page
    pub elements: Vec<T>,
    /// Token of the previous page, from the `prev` relation
    pub previous_page: Option<String>,
    /// Token of the next page, from the `next` relation
    pub next_page: Option<String>,
    /// Page of the request that produced this response
    pub page: Option<String>,
}

impl<T> PaginationResponse<T> {
    pub fn new(elements: Vec<T>) -> Self {
        Self {
            elements,
            previous_page: None,
            next_page: None,
            page: None,
        }
    }

    #[must_use]
    pub fn with_next_page(mut self, page: impl Into<String>) -> Self {
        self.next_page = Some(page.into());
        self
    }

    #[must_use]
    pub fn with_previous_page(mut self, page: impl Into<String>) -> Self {
        self.previous_page = Some(page.into());
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    pub fn has_next_page(&self) -> bool {
        self.next_page.as_deref().is_some_and(|page| !page.is_empty())
    }

    pub fn has_previous_page(&self) -> bool {
        self.previous_page.as_deref().is_some_and(|page| !page.is_empty())
    }

    /// Build the envelope for a completed exchange
    ///
    /// The body must be JSON with an array at the request's collection key
    /// path; any element that fails to decode fails the whole page. Usable on
    /// its own with any executor's output, so a non-2xx status is rejected
    /// here as well.
    pub fn from_raw(
        request: &PaginationRequest,
        raw: &RawResponse,
        decoder: &Decoder<T>,
        info: RequestInfo,
    ) -> Result<Self> {
        raw.error_for_status(&info)?;

        let json = raw
            .json()
            .map_err(|e| Error::parsing(e, Some(info.clone()), None))?;
        let elements = match decode_collection(&json, request.collection_key_path(), decoder) {
            Ok(elements) => elements,
            Err(e) => return Err(Error::parsing(e, Some(info), Some(json))),
        };

        let settings = request.settings();
        let relation_param = settings.relation_page_parameter_name.as_str();
        Ok(Self {
            elements,
            previous_page: link_page_parameter(
                &raw.headers,
                &settings.prev_relation_name,
                relation_param,
            ),
            next_page: link_page_parameter(
                &raw.headers,
                &settings.next_relation_name,
                relation_param,
            ),
            page: Some(request.page().to_string()),
        })
    }
}
