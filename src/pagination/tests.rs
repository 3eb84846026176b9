//! Tests for pagination module

use super::*;
use crate::decode::Decoder;
use crate::error::{Error, TransportError};
use crate::http::{HttpExecutor, HttpRequest, RawResponse};
use crate::route::RouteDescriptor;
use crate::types::Parameters;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use reqwest::header::{HeaderMap, HeaderValue, LINK};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use test_case::test_case;
use tokio::sync::{mpsc, oneshot};

fn search_request() -> PaginationRequest {
    let route = RouteDescriptor::get("search/repositories")
        .with_parameter("per_page", 30)
        .with_parameter("sort", "updated");
    PaginationRequest::new(&route).with_collection_key_path("items")
}

fn page(elements: &[&str], next: Option<&str>) -> PaginationResponse<String> {
    let response = PaginationResponse::new(elements.iter().map(|s| s.to_string()).collect());
    match next {
        Some(next) => response.with_next_page(next),
        None => response,
    }
}

fn sort_filter(sort: &str) -> Parameters {
    let mut filter = Parameters::new();
    filter.insert("sort".into(), json!(sort));
    filter
}

fn network_error() -> Error {
    Error::from(TransportError::Status {
        status: 502,
        body: "Bad gateway".to_string(),
    })
}

// ============================================================================
// Settings Tests
// ============================================================================

#[test]
fn test_settings_defaults() {
    let settings = PaginationSettings::default();
    assert_eq!(settings.page_parameter_name, "page");
    assert_eq!(settings.query_parameter_name, "q");
    assert_eq!(settings.first_page_value, "1");
    assert_eq!(settings.prev_relation_name, "prev");
    assert_eq!(settings.next_relation_name, "next");
    assert_eq!(settings.relation_page_parameter_name, "page");
}

#[test]
fn test_settings_partial_yaml() {
    let settings: PaginationSettings =
        serde_yaml::from_str("first_page_value: \"0\"\npage_parameter_name: offset\n").unwrap();
    assert_eq!(settings.first_page_value, "0");
    assert_eq!(settings.page_parameter_name, "offset");
    assert_eq!(settings.query_parameter_name, "q");
}

// ============================================================================
// Request Tests
// ============================================================================

#[test]
fn test_request_starts_at_first_page() {
    let request = search_request();
    assert_eq!(request.page(), "1");
    assert!(request.is_first_page());
    assert_eq!(request.query(), None);
    assert_eq!(request.collection_key_path(), Some("items"));
}

#[test]
fn test_with_query_and_filter_reset_page() {
    let request = search_request().with_page("4");
    assert_eq!(request.page(), "4");

    let queried = request.with_query("cats");
    assert_eq!(queried.page(), "1");
    assert_eq!(queried.query(), Some("cats"));

    let filtered = request.with_filter(sort_filter("stars"));
    assert_eq!(filtered.page(), "1");
    assert!(filtered.filter().is_some());

    // changing the page keeps query and filter
    let moved = filtered.with_query("dogs").with_page("2");
    assert_eq!(moved.page(), "2");
    assert_eq!(moved.query(), Some("dogs"));
    assert!(moved.filter().is_some());

    // the original is untouched
    assert_eq!(request.page(), "4");
    assert_eq!(request.query(), None);
}

#[test]
fn test_parameters_merge_order() {
    let request = search_request()
        .with_query("cats")
        .with_filter(sort_filter("stars"));
    let params = request.parameters();

    assert_eq!(params.get("page"), Some(&json!("1")));
    assert_eq!(params.get("q"), Some(&json!("cats")));
    assert_eq!(params.get("sort"), Some(&json!("stars")));
    assert_eq!(params.get("per_page"), Some(&json!(30)));
    assert_eq!(params.len(), 4);
}

#[test_case("" ; "empty query")]
#[test_case("cats" ; "non-empty query")]
fn test_query_parameter_presence(query: &str) {
    let params = search_request().with_query(query).parameters();
    assert_eq!(params.contains_key("q"), !query.is_empty());
}

#[test]
fn test_filter_overrides_page() {
    let mut filter = Parameters::new();
    filter.insert("page".into(), json!("9"));
    let params = search_request().with_filter(filter).parameters();
    assert_eq!(params.get("page"), Some(&json!("9")));
}

#[test]
fn test_custom_settings() {
    let settings = PaginationSettings {
        page_parameter_name: "p".to_string(),
        query_parameter_name: "term".to_string(),
        first_page_value: "0".to_string(),
        ..PaginationSettings::default()
    };
    let request = search_request()
        .with_page("7")
        .with_settings(settings)
        .with_query("x");
    let params = request.parameters();

    assert_eq!(request.page(), "0");
    assert_eq!(params.get("p"), Some(&json!("0")));
    assert_eq!(params.get("term"), Some(&json!("x")));
    assert!(!params.contains_key("page"));
}

#[test]
fn test_to_http_request() {
    let route = RouteDescriptor::get("repos/a/b/issues").with_retry_count(2);
    let request = PaginationRequest::from_adapted(
        crate::route::AdaptedRoute::new(route).with_header("Accept", "application/json"),
    )
    .with_page("3");

    let http = request.to_http_request();
    assert_eq!(http.path, "repos/a/b/issues");
    assert_eq!(http.retry_count, 2);
    assert_eq!(http.parameters.get("page"), Some(&json!("3")));
    assert_eq!(http.header("accept"), Some("application/json"));
}

// ============================================================================
// Link Header Tests
// ============================================================================

const GITHUB_LINK: &str = "\
     <https://api.github.com/search/repositories?q=rust&page=1>; rel=\"prev\", \
     <https://api.github.com/search/repositories?q=rust&page=3>; rel=\"next\", \
     <https://api.github.com/search/repositories?q=rust&page=34>; rel=\"last\", \
     <https://api.github.com/search/repositories?q=rust&page=1>; rel=\"first\"";

fn link_headers(values: &[&str]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for value in values {
        headers.append(LINK, HeaderValue::from_str(value).unwrap());
    }
    headers
}

#[test]
fn test_parse_link_header() {
    let links = parse_link_header(GITHUB_LINK);
    assert_eq!(links.len(), 4);
    assert!(links[1].has_relation("next"));
    assert_eq!(links[1].query_parameter("page"), Some("3".to_string()));
    assert_eq!(links[1].query_parameter("q"), Some("rust".to_string()));
}

#[test]
fn test_link_page_parameter() {
    let headers = link_headers(&[GITHUB_LINK]);
    assert_eq!(
        link_page_parameter(&headers, "next", "page"),
        Some("3".to_string())
    );
    assert_eq!(
        link_page_parameter(&headers, "prev", "page"),
        Some("1".to_string())
    );
    assert_eq!(link_page_parameter(&headers, "next", "cursor"), None);
    assert_eq!(link_page_parameter(&HeaderMap::new(), "next", "page"), None);
}

#[test]
fn test_link_edge_cases() {
    // several header values, multi-valued rel, commas inside the URI
    let headers = link_headers(&[
        "<https://api.example.com/items?page=1>; rel=\"prev first\"",
        "<https://api.example.com/items?ids=1,2&page=5>; rel=\"next\"",
    ]);
    assert_eq!(
        link_page_parameter(&headers, "first", "page"),
        Some("1".to_string())
    );
    assert_eq!(
        link_page_parameter(&headers, "next", "page"),
        Some("5".to_string())
    );

    let relative = parse_link_header("</items?page=2>; rel=next, <broken; rel=\"last\"");
    assert_eq!(relative.len(), 1);
    assert_eq!(relative[0].query_parameter("page"), Some("2".to_string()));
}

#[test]
fn test_link_empty_page_token() {
    let headers = link_headers(&[
        "<https://api.example.com/search/repositories?q=rust&page=>; rel=\"next\"",
    ]);
    assert_eq!(link_page_parameter(&headers, "next", "page"), None);
    assert_eq!(
        link_page_parameter(&headers, "next", "q"),
        Some("rust".to_string())
    );
}

#[test]
fn test_link_semicolon_in_uri() {
    let headers = link_headers(&["<https://api.example.com/items;v=2?page=3>; rel=\"next\""]);
    assert_eq!(
        link_page_parameter(&headers, "next", "page"),
        Some("3".to_string())
    );

    let links = parse_link_header("<https://api.example.com/items;v=2?page=3>; rel=\"next\"");
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].uri, "https://api.example.com/items;v=2?page=3");
}

// ============================================================================
// Response Tests
// ============================================================================

fn raw(status: u16, body: serde_json::Value, link: Option<&str>) -> RawResponse {
    let headers = link.map(|l| link_headers(&[l])).unwrap_or_default();
    RawResponse::new(status, headers, body.to_string())
}

fn info() -> crate::error::RequestInfo {
    crate::error::RequestInfo::new("GET", "https://api.github.com/search/repositories")
}

fn name_decoder() -> Decoder<String> {
    Decoder::new(|value| {
        value
            .get("name")
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| crate::decode::DecodeError::new("missing name"))
    })
}

#[test]
fn test_response_from_raw() {
    let request = search_request().with_page("2");
    let body = json!({"total_count": 2, "items": [{"name": "a"}, {"name": "b"}]});
    let raw = raw(200, body, Some(GITHUB_LINK));
    let response = PaginationResponse::from_raw(&request, &raw, &name_decoder(), info()).unwrap();

    assert_eq!(response.elements, vec!["a", "b"]);
    assert_eq!(response.next_page.as_deref(), Some("3"));
    assert_eq!(response.previous_page.as_deref(), Some("1"));
    assert_eq!(response.page.as_deref(), Some("2"));
    assert!(response.has_next_page());
    assert!(response.has_previous_page());
}

#[test]
fn test_response_without_links_is_last_page() {
    let body = json!({"items": []});
    let raw = raw(200, body, None);
    let response =
        PaginationResponse::from_raw(&search_request(), &raw, &name_decoder(), info()).unwrap();
    assert!(response.elements.is_empty());
    assert!(!response.has_next_page());
    assert!(!response.has_previous_page());
}

#[test]
fn test_response_empty_next_token_is_last_page() {
    let body = json!({"items": [{"name": "a"}]});
    let link = "<https://api.example.com/search/repositories?q=rust&page=>; rel=\"next\"";
    let raw = raw(200, body, Some(link));
    let response =
        PaginationResponse::from_raw(&search_request(), &raw, &name_decoder(), info()).unwrap();
    assert_eq!(response.elements, vec!["a"]);
    assert_eq!(response.next_page, None);
    assert!(!response.has_next_page());
}

#[test_case(json!({"total_count": 0}) ; "missing key path")]
#[test_case(json!({"items": {"name": "a"}}) ; "not an array")]
#[test_case(json!({"items": [{"name": "a"}, {"id": 2}]}) ; "element fails")]
fn test_response_parsing_failures(body: serde_json::Value) {
    let err = PaginationResponse::from_raw(
        &search_request(),
        &raw(200, body.clone(), Some(GITHUB_LINK)),
        &name_decoder(),
        info(),
    )
    .unwrap_err();

    assert!(err.is_parsing());
    assert_eq!(err.json(), Some(&body));
    assert_eq!(err.request(), Some(&info()));
}

#[test]
fn test_response_invalid_json_and_status() {
    let request = search_request();
    let not_json = RawResponse::new(200, HeaderMap::new(), "<html>");
    let err =
        PaginationResponse::from_raw(&request, &not_json, &name_decoder(), info()).unwrap_err();
    assert!(err.is_parsing());
    assert_eq!(err.json(), None);

    let not_found = raw(404, json!({"message": "Not Found"}), None);
    let err =
        PaginationResponse::from_raw(&request, &not_found, &name_decoder(), info()).unwrap_err();
    assert!(err.is_networking());
    assert_eq!(err.status_code(), Some(404));
}

// ============================================================================
// Fetcher Tests
// ============================================================================

struct StaticExecutor {
    response: RawResponse,
    seen: Mutex<Vec<HttpRequest>>,
}

#[async_trait]
impl HttpExecutor for StaticExecutor {
    async fn execute(&self, request: HttpRequest) -> crate::error::Result<RawResponse> {
        self.seen.lock().unwrap().push(request);
        Ok(self.response.clone())
    }
}

#[tokio::test]
async fn test_collection_fetcher() {
    let executor = Arc::new(StaticExecutor {
        response: raw(200, json!({"items": [{"name": "opera"}]}), Some(GITHUB_LINK)),
        seen: Mutex::default(),
    });
    let fetcher = CollectionFetcher::new(executor.clone(), name_decoder());

    let response = fetcher
        .fetch(search_request().with_query("rust").with_page("2"))
        .await
        .unwrap();
    assert_eq!(response.elements, vec!["opera"]);
    assert_eq!(response.next_page.as_deref(), Some("3"));

    let seen = executor.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].parameters.get("q"), Some(&json!("rust")));
    assert_eq!(seen[0].parameters.get("page"), Some(&json!("2")));
}

#[tokio::test]
async fn test_request_object_and_collection() {
    #[derive(Debug, serde::Deserialize, PartialEq)]
    struct Named {
        name: String,
    }

    let executor = StaticExecutor {
        response: raw(200, json!({"repo": {"name": "opera"}, "list": [{"name": "x"}]}), None),
        seen: Mutex::default(),
    };
    let route = RouteDescriptor::get("repos/a/b");

    let named: Named = request_object(&executor, &route, Some("repo")).await.unwrap();
    assert_eq!(named.name, "opera");

    let list: Vec<Named> = request_collection(&executor, &route, Some("list")).await.unwrap();
    assert_eq!(list.len(), 1);

    let json = request_json(&executor, &route).await.unwrap();
    assert_eq!(json["repo"]["name"], "opera");

    let err = request_collection::<Named, _, _>(&executor, &route, Some("repo"))
        .await
        .unwrap_err();
    assert!(err.is_parsing());
}

// ============================================================================
// Coordinator Tests
// ============================================================================

#[test]
fn test_coordinator_first_page_replaces() {
    let mut coordinator = PaginationCoordinator::<String>::new(search_request());
    assert!(coordinator.is_empty_state());

    let fetch = coordinator.refresh().unwrap();
    assert_eq!(fetch.request.page(), "1");
    assert_eq!(coordinator.phase(), PaginationPhase::LoadingFirstPage);
    assert!(coordinator.is_first_page_loading());
    assert!(!coordinator.is_empty_state());

    let outcome = coordinator.complete(fetch.generation, Ok(page(&["A", "B"], Some("2"))));
    assert!(matches!(
        outcome,
        CompletionOutcome::Applied {
            first_page: true,
            received: 2
        }
    ));
    assert_eq!(coordinator.elements(), ["A", "B"]);
    assert!(coordinator.has_next_page());
    assert_eq!(coordinator.phase(), PaginationPhase::Idle);
}

#[test]
fn test_coordinator_next_page_appends_and_stops() {
    let mut coordinator = PaginationCoordinator::<String>::new(search_request());
    let fetch = coordinator.refresh().unwrap();
    coordinator.complete(fetch.generation, Ok(page(&["A", "B"], Some("2"))));

    let fetch = coordinator.load_next_page().unwrap();
    assert_eq!(fetch.request.page(), "2");
    assert_eq!(coordinator.phase(), PaginationPhase::LoadingNextPage);
    assert!(!coordinator.is_first_page_loading());

    coordinator.complete(fetch.generation, Ok(page(&["C"], None)));
    assert_eq!(coordinator.elements(), ["A", "B", "C"]);
    assert!(!coordinator.has_next_page());

    // nothing left to load
    assert!(coordinator.load_next_page().is_none());
}

#[test]
fn test_coordinator_empty_next_token_is_last_page() {
    let mut coordinator = PaginationCoordinator::<String>::new(search_request());
    let fetch = coordinator.refresh().unwrap();
    coordinator.complete(fetch.generation, Ok(page(&["A"], Some(""))));

    assert_eq!(coordinator.elements(), ["A"]);
    assert!(!coordinator.has_next_page());
    assert!(coordinator.load_next_page().is_none());
    assert_eq!(coordinator.phase(), PaginationPhase::Idle);
}

#[test]
fn test_coordinator_in_flight_generation() {
    let mut coordinator = PaginationCoordinator::<String>::new(search_request());
    assert_eq!(coordinator.in_flight_generation(), None);

    let first = coordinator.refresh().unwrap();
    assert_eq!(coordinator.in_flight_generation(), Some(first.generation));
    coordinator.complete(first.generation, Ok(page(&["A"], Some("2"))));
    assert_eq!(coordinator.in_flight_generation(), None);

    // a superseding request takes over the in-flight slot
    let next = coordinator.load_next_page().unwrap();
    let query = coordinator.set_query("swift");
    assert_ne!(next.generation, query.generation);
    assert_eq!(coordinator.in_flight_generation(), Some(query.generation));

    coordinator.complete(next.generation, Ok(page(&["B"], None)));
    assert_eq!(coordinator.in_flight_generation(), Some(query.generation));
    coordinator.complete(query.generation, Ok(page(&["S"], None)));
    assert_eq!(coordinator.in_flight_generation(), None);
}

#[test]
fn test_coordinator_refresh_deduplicated() {
    let mut coordinator = PaginationCoordinator::<String>::new(search_request());
    assert!(coordinator.refresh().is_some());
    assert!(coordinator.refresh().is_none());
    assert!(coordinator.load_next_page().is_none());
}

#[test]
fn test_coordinator_refresh_supersedes_next_page() {
    let mut coordinator = PaginationCoordinator::<String>::new(search_request());
    let first = coordinator.refresh().unwrap();
    coordinator.complete(first.generation, Ok(page(&["A"], Some("2"))));

    let next = coordinator.load_next_page().unwrap();
    let refresh = coordinator.refresh().unwrap();
    assert!(coordinator.elements().is_empty());
    assert!(!coordinator.has_next_page());

    let stale = coordinator.complete(next.generation, Ok(page(&["B"], None)));
    assert!(matches!(stale, CompletionOutcome::Discarded));
    assert!(coordinator.elements().is_empty());

    coordinator.complete(refresh.generation, Ok(page(&["A2"], None)));
    assert_eq!(coordinator.elements(), ["A2"]);
}

#[test]
fn test_coordinator_set_query_resets_and_discards_stale() {
    let mut coordinator = PaginationCoordinator::<String>::new(search_request());
    let first = coordinator.refresh().unwrap();
    coordinator.complete(first.generation, Ok(page(&["A", "B"], Some("2"))));
    let next = coordinator.load_next_page().unwrap();

    let query = coordinator.set_query("cats");
    assert_eq!(query.request.page(), "1");
    assert_eq!(query.request.query(), Some("cats"));
    assert!(coordinator.elements().is_empty());
    assert_eq!(coordinator.phase(), PaginationPhase::LoadingFirstPage);

    assert!(matches!(
        coordinator.complete(next.generation, Ok(page(&["C"], None))),
        CompletionOutcome::Discarded
    ));
    assert!(coordinator.elements().is_empty());

    coordinator.complete(query.generation, Ok(page(&["cat"], None)));
    assert_eq!(coordinator.elements(), ["cat"]);
}

#[test]
fn test_coordinator_set_query_supersedes_first_page() {
    let mut coordinator = PaginationCoordinator::<String>::new(search_request());
    let first = coordinator.refresh().unwrap();
    let query = coordinator.set_query("cats");
    assert_ne!(first.generation, query.generation);

    assert!(matches!(
        coordinator.complete(first.generation, Ok(page(&["old"], None))),
        CompletionOutcome::Discarded
    ));
    assert!(coordinator.is_first_page_loading());
}

#[test]
fn test_coordinator_set_filter() {
    let mut coordinator = PaginationCoordinator::<String>::new(search_request().with_query("rust"));
    let first = coordinator.refresh().unwrap();
    coordinator.complete(first.generation, Ok(page(&["A"], Some("2"))));

    let fetch = coordinator.set_filter(Arc::new(sort_filter("stars")));
    let params = fetch.request.parameters();
    assert_eq!(params.get("page"), Some(&json!("1")));
    assert_eq!(params.get("q"), Some(&json!("rust")));
    assert_eq!(params.get("sort"), Some(&json!("stars")));
    assert!(coordinator.elements().is_empty());
    assert!(!coordinator.has_next_page());
}

#[test]
fn test_coordinator_failure_rearms_page() {
    let mut coordinator = PaginationCoordinator::<String>::new(search_request());
    let first = coordinator.refresh().unwrap();
    coordinator.complete(first.generation, Ok(page(&["A", "B"], Some("2"))));

    let next = coordinator.load_next_page().unwrap();
    let outcome = coordinator.complete(next.generation, Err(network_error()));
    assert!(matches!(outcome, CompletionOutcome::Failed(ref e) if e.is_networking()));
    assert_eq!(coordinator.phase(), PaginationPhase::Error);
    assert_eq!(coordinator.elements(), ["A", "B"]);
    assert!(coordinator.has_next_page());
    assert_eq!(coordinator.rearmed_page(), Some("2"));

    let retry = coordinator.load_next_page().unwrap();
    assert_eq!(retry.request.page(), "2");
    coordinator.complete(retry.generation, Ok(page(&["C"], None)));
    assert_eq!(coordinator.elements(), ["A", "B", "C"]);
    assert_eq!(coordinator.rearmed_page(), None);
}

#[test]
fn test_coordinator_failed_first_page_retried_by_next_page() {
    let mut coordinator = PaginationCoordinator::<String>::new(search_request());
    let first = coordinator.refresh().unwrap();
    coordinator.complete(first.generation, Err(network_error()));
    assert!(coordinator.is_empty_state());
    assert!(!coordinator.has_next_page());

    let retry = coordinator.load_next_page().unwrap();
    assert_eq!(retry.request.page(), "1");
    assert!(coordinator.is_first_page_loading());
    coordinator.complete(retry.generation, Ok(page(&["A"], None)));
    assert_eq!(coordinator.elements(), ["A"]);
}

#[test]
fn test_coordinator_refresh_clears_rearmed_page() {
    let mut coordinator = PaginationCoordinator::<String>::new(search_request());
    let first = coordinator.refresh().unwrap();
    coordinator.complete(first.generation, Ok(page(&["A"], Some("2"))));
    let next = coordinator.load_next_page().unwrap();
    coordinator.complete(next.generation, Err(network_error()));

    let refresh = coordinator.refresh().unwrap();
    assert_eq!(refresh.request.page(), "1");
    assert_eq!(coordinator.rearmed_page(), None);
}

#[test]
fn test_coordinator_snapshot() {
    let mut coordinator = PaginationCoordinator::<String>::new(search_request());
    assert_eq!(coordinator.snapshot(), PaginationSnapshot::initial("1"));

    let first = coordinator.refresh().unwrap();
    let loading = coordinator.snapshot();
    assert!(loading.loading);
    assert!(loading.first_page_loading);
    assert!(!loading.empty_state);

    coordinator.complete(first.generation, Ok(page(&["A"], Some("2"))));
    let loaded = coordinator.snapshot();
    assert_eq!(loaded.elements, vec!["A"]);
    assert!(loaded.has_next_page);
    assert!(!loaded.loading);
    assert_eq!(loaded.phase, PaginationPhase::Idle);
}

// ============================================================================
// View-Model Tests
// ============================================================================

type Reply = oneshot::Sender<crate::error::Result<PaginationResponse<String>>>;

/// Fetcher whose calls are answered by the test
struct ScriptedFetcher {
    calls: mpsc::UnboundedSender<(PaginationRequest, Reply)>,
}

#[async_trait]
impl PageFetcher<String> for ScriptedFetcher {
    async fn fetch(
        &self,
        request: PaginationRequest,
    ) -> crate::error::Result<PaginationResponse<String>> {
        let (reply, response) = oneshot::channel();
        let _ = self.calls.send((request, reply));
        response
            .await
            .unwrap_or_else(|_| Err(Error::unknown("reply dropped")))
    }
}

fn scripted() -> (
    PaginationViewModel<String>,
    mpsc::UnboundedReceiver<(PaginationRequest, Reply)>,
) {
    let (calls, rx) = mpsc::unbounded_channel();
    let view_model =
        PaginationViewModel::new(search_request(), Arc::new(ScriptedFetcher { calls }));
    (view_model, rx)
}

async fn settle<F>(
    view_model: &PaginationViewModel<String>,
    condition: F,
) -> PaginationSnapshot<String>
where
    F: FnMut(&PaginationSnapshot<String>) -> bool,
{
    let mut state = view_model.subscribe();
    let snapshot = tokio::time::timeout(Duration::from_secs(5), state.wait_for(condition))
        .await
        .expect("state did not settle")
        .unwrap()
        .clone();
    snapshot
}

#[tokio::test]
async fn test_view_model_loads_pages() {
    let (view_model, mut calls) = scripted();
    assert_eq!(view_model.snapshot(), PaginationSnapshot::initial("1"));

    view_model.refresh();
    let loading = settle(&view_model, |s| s.first_page_loading).await;
    assert!(loading.loading);

    let (request, reply) = calls.recv().await.unwrap();
    assert_eq!(request.page(), "1");
    reply.send(Ok(page(&["A", "B"], Some("2")))).unwrap();
    let loaded = settle(&view_model, |s| !s.loading).await;
    assert_eq!(loaded.elements, vec!["A", "B"]);
    assert!(loaded.has_next_page);

    view_model.load_next_page();
    let (request, reply) = calls.recv().await.unwrap();
    assert_eq!(request.page(), "2");
    reply.send(Ok(page(&["C"], None))).unwrap();

    let done = settle(&view_model, |s| s.elements.len() == 3).await;
    assert_eq!(done.elements, vec!["A", "B", "C"]);
    assert!(!done.has_next_page);
    assert!(!done.empty_state);
}

#[tokio::test]
async fn test_view_model_double_refresh_issues_one_request() {
    let (view_model, mut calls) = scripted();
    view_model.refresh();
    view_model.refresh();

    let (_, reply) = calls.recv().await.unwrap();
    reply.send(Ok(page(&["A"], None))).unwrap();
    settle(&view_model, |s| !s.loading && s.elements.len() == 1).await;

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(calls.try_recv().is_err());
}

#[tokio::test]
async fn test_view_model_set_query_discards_stale_page() {
    let (view_model, mut calls) = scripted();
    view_model.refresh();
    let (_, reply) = calls.recv().await.unwrap();
    reply.send(Ok(page(&["A", "B"], Some("2")))).unwrap();
    settle(&view_model, |s| s.has_next_page).await;

    view_model.load_next_page();
    let (_, stale_reply) = calls.recv().await.unwrap();

    view_model.set_query("cats");
    let reset = settle(&view_model, |s| s.first_page_loading).await;
    assert!(reset.elements.is_empty());
    assert_eq!(reset.page, "1");

    let (request, reply) = calls.recv().await.unwrap();
    assert_eq!(request.query(), Some("cats"));

    // the superseded fetch was cancelled, so its reply may have no receiver
    let _ = stale_reply.send(Ok(page(&["C"], None)));
    reply.send(Ok(page(&["cat"], None))).unwrap();

    let loaded = settle(&view_model, |s| !s.loading).await;
    assert_eq!(loaded.elements, vec!["cat"]);
}

#[tokio::test]
async fn test_view_model_set_filter_resets() {
    let (view_model, mut calls) = scripted();
    view_model.set_filter(sort_filter("stars"));

    let (request, reply) = calls.recv().await.unwrap();
    assert_eq!(request.page(), "1");
    assert_eq!(request.parameters().get("sort"), Some(&json!("stars")));
    reply.send(Ok(page(&[], None))).unwrap();

    let empty = settle(&view_model, |s| !s.loading).await;
    assert!(empty.empty_state);
}

#[tokio::test]
async fn test_view_model_error_rearms_page() {
    let (view_model, mut calls) = scripted();
    let mut errors = view_model.errors();

    view_model.refresh();
    let (_, reply) = calls.recv().await.unwrap();
    reply.send(Ok(page(&["A", "B"], Some("2")))).unwrap();
    settle(&view_model, |s| s.has_next_page && !s.loading).await;

    view_model.load_next_page();
    let (_, reply) = calls.recv().await.unwrap();
    reply.send(Err(network_error())).unwrap();

    let error = tokio::time::timeout(Duration::from_secs(5), errors.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(error.is_networking());
    assert_eq!(error.status_code(), Some(502));

    let failed = settle(&view_model, |s| s.phase == PaginationPhase::Error).await;
    assert_eq!(failed.elements, vec!["A", "B"]);
    assert!(failed.has_next_page);

    // no automatic resubmission
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(calls.try_recv().is_err());

    view_model.load_next_page();
    let (request, reply) = calls.recv().await.unwrap();
    assert_eq!(request.page(), "2");
    reply.send(Ok(page(&["C"], None))).unwrap();
    let loaded = settle(&view_model, |s| s.elements.len() == 3).await;
    assert_eq!(loaded.elements, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn test_view_model_dropped_reply_is_unknown_error() {
    let (view_model, mut calls) = scripted();
    let mut errors = view_model.errors();

    view_model.refresh();
    let (_, reply) = calls.recv().await.unwrap();
    drop(reply);

    let error = tokio::time::timeout(Duration::from_secs(5), errors.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(*error, Error::Unknown { .. }));
}

#[tokio::test]
async fn test_view_model_shutdown() {
    let (view_model, mut calls) = scripted();
    view_model.shutdown();
    assert!(view_model.is_shut_down());

    view_model.refresh();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(calls.try_recv().is_err());
    assert!(!view_model.snapshot().loading);
}

#[tokio::test]
async fn test_view_model_snapshot_stream() {
    use futures::StreamExt;

    let (view_model, mut calls) = scripted();
    let stream = view_model.snapshots();
    futures::pin_mut!(stream);

    view_model.refresh();
    let loading = stream.next().await.unwrap();
    assert!(loading.first_page_loading);

    let (_, reply) = calls.recv().await.unwrap();
    reply.send(Ok(page(&["A"], None))).unwrap();
    let loaded = stream.next().await.unwrap();
    assert_eq!(loaded.elements, vec!["A"]);
    assert!(!loaded.loading);

    view_model.shutdown();
    let ended = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .unwrap();
    assert!(ended.is_none());
}
