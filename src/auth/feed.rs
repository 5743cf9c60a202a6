//! Auth parameters embedded in tracker RSS feed URLs.
//!
//! Feed URLs carry their credentials in a `;`-separated query string
//! (`https://site/t.rss?7;download;u=123;tp=abc;private`), which the standard
//! `&`-based query parsers do not understand.

use std::collections::HashMap;

/// Parses the `;`-delimited query of a feed URL into a name → value map.
///
/// Tokens are trimmed and empty tokens skipped. `key=value` splits on the
/// first `=`; bare tokens such as `private` map to an empty value. A repeated
/// key keeps its last value. The fragment, if any, is ignored.
#[must_use]
pub fn parse_feed_auth_params(feed_url: &str) -> HashMap<String, String> {
    let without_fragment = feed_url.split_once('#').map_or(feed_url, |(head, _)| head);
    let Some((_, query)) = without_fragment.split_once('?') else {
        return HashMap::new();
    };

    query
        .split(';')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| match token.split_once('=') {
            Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
            None => (token.to_string(), String::new()),
        })
        .collect()
}
