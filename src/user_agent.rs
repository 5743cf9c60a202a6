//! Browser-mimicking request headers shared by the page and download requests.
//!
//! The tracker serves its login page instead of content to clients that do not
//! look like a browser, so both stages send the same User-Agent and language.

/// Browser User-Agent sent on every request.
pub(crate) const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36";

/// `Accept` header for the HTML detail page.
pub(crate) const PAGE_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,\
    image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";

/// `Accept` header for the torrent file itself.
pub(crate) const DOWNLOAD_ACCEPT: &str = "*/*";

pub(crate) const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

pub(crate) const PAGE_CACHE_CONTROL: &str = "max-age=0";
