//! Authenticated fetch of the torrent detail page.

use std::fmt;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, COOKIE, USER_AGENT};
use tracing::{debug, instrument, warn};
use url::Url;

use super::ResolveError;
use crate::auth::SessionContext;
use crate::download::HttpClient;
use crate::user_agent;

/// Path of the detail page, relative to the site base URL.
const DETAIL_PAGE_PATH: &str = "torrent.php";

/// Torrent identifier taken from the last path segment of a page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReference(String);

impl PageReference {
    /// Extracts the identifier from a page URL such as
    /// `https://tracker.example/t/12345`. A bare identifier is accepted too.
    ///
    /// Trailing slashes, query string and fragment are ignored; the segment
    /// is percent-decoded.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidPageUrl`] when no non-empty path
    /// segment remains.
    pub fn from_page_url(page_url: &str) -> Result<Self, ResolveError> {
        let trimmed = page_url.trim();
        let segment = match Url::parse(trimmed) {
            Ok(url) => url
                .path_segments()
                .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
                .map(str::to_string),
            Err(_) => trimmed
                .split(['?', '#'])
                .next()
                .and_then(|path| path.split('/').rfind(|s| !s.is_empty()))
                .map(str::to_string),
        };

        let segment = segment.ok_or_else(|| ResolveError::invalid_page_url(page_url))?;
        let decoded = urlencoding::decode(&segment)
            .map(std::borrow::Cow::into_owned)
            .unwrap_or(segment);
        if decoded.trim().is_empty() {
            return Err(ResolveError::invalid_page_url(page_url));
        }
        Ok(Self(decoded))
    }

    /// Returns the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds `<base>/torrent.php?id=<identifier>`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidPageUrl`] if the joined URL does not
    /// parse.
    pub fn detail_url(&self, session: &SessionContext) -> Result<Url, ResolveError> {
        let raw = format!("{}/{DETAIL_PAGE_PATH}", session.base_url_str());
        let mut url = Url::parse(&raw).map_err(|_| ResolveError::invalid_page_url(raw))?;
        url.query_pairs_mut().append_pair("id", &self.0);
        Ok(url)
    }
}

impl fmt::Display for PageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fetches the detail page HTML for `page_ref`.
///
/// Sends browser-like headers plus the session cookie. The status code is
/// not treated as an error: a login or error page is returned like any other
/// body and simply fails link extraction later. Non-success statuses are
/// logged so that case stays diagnosable.
///
/// # Errors
///
/// Returns [`ResolveError::Network`] or [`ResolveError::Timeout`] on
/// transport failure or when the body cannot be read.
#[instrument(skip(client, session), fields(id = %page_ref))]
pub async fn fetch_page(
    client: &HttpClient,
    session: &SessionContext,
    page_ref: &PageReference,
) -> Result<String, ResolveError> {
    let url = page_ref.detail_url(session)?;
    debug!(url = %url, "fetching torrent page");

    let response = client
        .inner()
        .get(url.clone())
        .header(ACCEPT, user_agent::PAGE_ACCEPT)
        .header(ACCEPT_LANGUAGE, user_agent::ACCEPT_LANGUAGE)
        .header(CACHE_CONTROL, user_agent::PAGE_CACHE_CONTROL)
        .header(USER_AGENT, user_agent::BROWSER_USER_AGENT)
        .header(COOKIE, session.cookie_header().clone())
        .send()
        .await
        .map_err(|e| ResolveError::network(url.as_str(), e))?;

    let status = response.status();
    if !status.is_success() {
        warn!(
            url = %url,
            status = status.as_u16(),
            final_url = %response.url(),
            "torrent page returned non-success status"
        );
    }

    let body = response
        .text()
        .await
        .map_err(|e| ResolveError::network(url.as_str(), e))?;
    debug!(bytes = body.len(), "torrent page fetched");
    Ok(body)
}
