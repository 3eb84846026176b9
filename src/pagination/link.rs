//! Link header parsing (RFC 8288)
//!
//! Format: `Link: <https://api.github.com/...?page=2>; rel="next", <...>; rel="last"`

use reqwest::header::{HeaderMap, LINK};
use url::Url;

/// One `<uri>; rel="..."` entry of a Link header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRelation {
    /// Target URI, as written in the header
    pub uri: String,
    /// Relation types (`rel="next last"` yields two)
    pub relations: Vec<String>,
}

impl LinkRelation {
    pub fn has_relation(&self, rel: &str) -> bool {
        self.relations.iter().any(|r| r.eq_ignore_ascii_case(rel))
    }

    /// Value of a query parameter of the target URI
    ///
    /// An empty value (`?page=`) counts as absent.
    pub fn query_parameter(&self, name: &str) -> Option<String> {
        let url = Url::parse(&self.uri).or_else(|_| {
            // relative references resolve against a placeholder origin
            Url::parse("http://localhost/").and_then(|base| base.join(&self.uri))
        });
        url.ok()?
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty())
    }
}

/// Parse a single Link header value
///
/// Entries without a `<uri>` or a `rel` parameter are skipped.
pub fn parse_link_header(header: &str) -> Vec<LinkRelation> {
    split_entries(header)
        .into_iter()
        .filter_map(|entry| {
            // the URI may itself contain ';', so parameters start after '>'
            let (uri, params) = entry.strip_prefix('<')?.split_once('>')?;
            let mut relations = Vec::new();

            for segment in params.split(';') {
                if let Some((name, value)) = segment.trim().split_once('=') {
                    if name.trim().eq_ignore_ascii_case("rel") {
                        let value = value.trim().trim_matches('"').trim_matches('\'');
                        relations.extend(value.split_whitespace().map(String::from));
                    }
                }
            }

            if relations.is_empty() {
                return None;
            }
            Some(LinkRelation {
                uri: uri.trim().to_string(),
                relations,
            })
        })
        .collect()
}

/// Find the first link with the given relation across all Link headers
pub fn find_link(headers: &HeaderMap, rel: &str) -> Option<LinkRelation> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(parse_link_header)
        .find(|link| link.has_relation(rel))
}

/// Page parameter of the link with the given relation
///
/// `None` when there is no such relation or its URI lacks the parameter.
pub fn link_page_parameter(headers: &HeaderMap, rel: &str, parameter: &str) -> Option<String> {
    find_link(headers, rel)?.query_parameter(parameter)
}

/// Split on commas outside `<...>`
fn split_entries(header: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in header.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                entries.push(header[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(header[start..].trim());
    entries.retain(|e| !e.is_empty());
    entries
}
