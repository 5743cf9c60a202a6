//! Download anchor lookup in the torrent detail page.

use std::fmt;

use scraper::Html;
use tracing::{debug, instrument};
use url::Url;

use super::ResolveError;

/// Attribute name/value pair identifying the download anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMarker {
    /// Attribute name, e.g. `class`.
    pub attribute: String,
    /// Exact attribute value, e.g. `dl_Btn`.
    pub value: String,
}

impl Default for LinkMarker {
    fn default() -> Self {
        Self {
            attribute: "class".to_string(),
            value: "dl_Btn".to_string(),
        }
    }
}

/// Absolute URL of a torrent file, resolved from the detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink(Url);

impl DownloadLink {
    /// Returns the link as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the parsed URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for DownloadLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Finds the first anchor carrying `marker` and resolves its `href`.
///
/// The document is walked depth-first in document order with an explicit
/// stack, so nesting depth never grows the call stack. Anchors with the
/// marker but no (or an empty) `href` are skipped.
///
/// # Errors
///
/// Returns [`ResolveError::LinkNotFound`] when no anchor matches, or
/// [`ResolveError::InvalidLink`] when the matching `href` cannot be resolved.
#[instrument(level = "debug", skip(html), fields(html_len = html.len()))]
pub fn extract_download_link(
    html: &str,
    marker: &LinkMarker,
    base_url: &Url,
) -> Result<DownloadLink, ResolveError> {
    let document = Html::parse_document(html);

    let mut stack = vec![document.tree.root()];
    while let Some(node) = stack.pop() {
        if let Some(element) = node.value().as_element()
            && element.name() == "a"
            && element.attr(&marker.attribute) == Some(marker.value.as_str())
        {
            if let Some(href) = element.attr("href").map(str::trim).filter(|h| !h.is_empty()) {
                debug!(href = %href, "found download anchor");
                return resolve_href(href, base_url).map(DownloadLink);
            }
            debug!("download anchor without href, continuing");
        }

        let children: Vec<_> = node.children().collect();
        stack.extend(children.into_iter().rev());
    }

    Err(ResolveError::link_not_found(&marker.attribute, &marker.value))
}

/// Resolves an anchor `href` against the site base URL.
///
/// Absolute `http`/`https` references are kept as-is, `//host/path` takes the
/// base scheme, and anything else is appended to the base with its leading
/// `/` removed.
pub(crate) fn resolve_href(href: &str, base_url: &Url) -> Result<Url, ResolveError> {
    let candidate = if href.starts_with("//") {
        format!("{}:{href}", base_url.scheme())
    } else {
        match Url::parse(href) {
            Ok(absolute) if matches!(absolute.scheme(), "http" | "https") => return Ok(absolute),
            Ok(_) => return Err(ResolveError::invalid_link(href)),
            Err(url::ParseError::RelativeUrlWithoutBase) => format!(
                "{}/{}",
                base_url.as_str().trim_end_matches('/'),
                href.trim_start_matches('/')
            ),
            Err(_) => return Err(ResolveError::invalid_link(href)),
        }
    };

    Url::parse(&candidate).map_err(|_| ResolveError::invalid_link(href))
}
