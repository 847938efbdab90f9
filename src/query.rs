//! Lookups over a set of documented repositories

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::store::types::DocumentSet;

/// Builds the case-insensitive name matcher for `query`.
///
/// An empty query matches everything; a query that is not a valid regex is
/// matched as a literal substring.
fn name_matcher(query: Option<&str>) -> Option<Regex> {
    let pattern = query.map(str::trim).filter(|q| !q.is_empty()).unwrap_or(".");
    let build = |p: &str| RegexBuilder::new(p).case_insensitive(true).build();

    build(pattern)
        .or_else(|e| {
            debug!("Treating {:?} as literal text: {}", pattern, e);
            build(&regex::escape(pattern))
        })
        .ok()
}

/// Names of documented repositories matching `query`, in set order
pub fn search_names<'a>(documents: &'a DocumentSet, query: Option<&str>) -> Vec<&'a str> {
    let Some(matcher) = name_matcher(query) else {
        return Vec::new();
    };

    documents
        .keys()
        .map(String::as_str)
        .filter(|name| matcher.is_match(name))
        .collect()
}

/// Documentation payload of the repository named exactly `name`
pub fn find_document<'a>(
    documents: &'a DocumentSet,
    name: &str,
) -> Option<&'a serde_json::Value> {
    documents.get(name).and_then(|entry| entry.swagger.as_ref())
}
