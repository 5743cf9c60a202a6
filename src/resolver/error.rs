//! Error types for resolver operations.
//!
//! This module defines structured errors for turning a page URL into a
//! download link, following the What/Why/Fix pattern used for download errors.

use thiserror::Error;

/// Errors that can occur while fetching the detail page or finding the link.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The page URL has no usable final path segment.
    #[error("no torrent id in page URL '{url}'\n  Suggestion: pass a URL ending in the torrent id")]
    InvalidPageUrl {
        /// The rejected page URL.
        url: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL being fetched.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// No anchor on the page carries the download marker.
    #[error(
        "download link not found in HTML (no <a {attribute}=\"{value}\">)\n  Suggestion: the session cookie may have expired, the torrent may be gone, or the site markup changed"
    )]
    LinkNotFound {
        /// Marker attribute name.
        attribute: String,
        /// Marker attribute value.
        value: String,
    },

    /// The marked anchor's `href` does not resolve to a valid URL.
    #[error("download link '{href}' is not a valid URL")]
    InvalidLink {
        /// The raw `href` value.
        href: String,
    },
}

impl ResolveError {
    /// Creates a network error from a reqwest error, promoting timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::Timeout { url: url.into() };
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an invalid page URL error.
    pub fn invalid_page_url(url: impl Into<String>) -> Self {
        Self::InvalidPageUrl { url: url.into() }
    }

    /// Creates a not-found error for the given marker.
    pub fn link_not_found(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::LinkNotFound {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Creates an invalid link error.
    pub fn invalid_link(href: impl Into<String>) -> Self {
        Self::InvalidLink { href: href.into() }
    }

    /// Returns true when the page was fetched but held no download anchor.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::LinkNotFound { .. })
    }
}
