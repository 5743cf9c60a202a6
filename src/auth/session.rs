//! Session context: tracker base URL plus the raw cookie header.

use std::fmt;

use reqwest::header::HeaderValue;
use thiserror::Error;
use url::Url;

/// Errors raised while building a [`SessionContext`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// The base URL is not an absolute `http`/`https` URL.
    #[error("invalid base URL: {url}")]
    InvalidBaseUrl {
        /// The rejected base URL.
        url: String,
    },

    /// The cookie string cannot be sent as an HTTP header.
    #[error("cookie contains characters not allowed in an HTTP header")]
    InvalidCookie,
}

/// Authentication state shared by the page fetch and the file download.
///
/// Immutable once built. The cookie value is redacted in `Debug` output and
/// marked sensitive on the header value so it never reaches logs.
#[derive(Clone)]
pub struct SessionContext {
    base_url: Url,
    cookie: HeaderValue,
}

impl SessionContext {
    /// Builds a session from a base site URL and a raw `Cookie` header string
    /// (for example `uid=123; pass=abc`).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidBaseUrl`] when `base_url` is not an
    /// absolute `http`/`https` URL, or [`SessionError::InvalidCookie`] when the
    /// cookie contains bytes that cannot appear in a header.
    pub fn new(base_url: &str, cookie: &str) -> Result<Self, SessionError> {
        let parsed = Url::parse(base_url.trim()).map_err(|_| SessionError::InvalidBaseUrl {
            url: base_url.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(SessionError::InvalidBaseUrl {
                url: base_url.to_string(),
            });
        }

        let mut cookie =
            HeaderValue::from_str(cookie.trim()).map_err(|_| SessionError::InvalidCookie)?;
        cookie.set_sensitive(true);

        Ok(Self {
            base_url: parsed,
            cookie,
        })
    }

    /// Returns the parsed base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the base URL as a string without a trailing `/`, ready for
    /// path concatenation.
    #[must_use]
    pub fn base_url_str(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Returns the `Cookie` header value.
    ///
    /// The value is marked sensitive; do not log it.
    #[must_use]
    pub fn cookie_header(&self) -> &HeaderValue {
        &self.cookie
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("base_url", &self.base_url.as_str())
            .field("cookie", &"[REDACTED]")
            .finish()
    }
}
