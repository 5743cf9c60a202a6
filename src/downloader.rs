//! The torrent download pipeline: page URL → detail page → link → file.
//!
//! [`TorrentDownloader`] owns the HTTP client, the session and the filename
//! rules for one run. Each call to [`TorrentDownloader::download_torrent`]
//! runs the three stages in order and stops at the first failure; nothing is
//! retried and no other work is started.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::auth::{SessionContext, SessionError};
use crate::download::{
    DownloadError, DownloadedFile, FilenameNormalizer, HttpClient, HttpTimeouts, NormalizerRules,
};
use crate::resolver::{LinkMarker, PageReference, ResolveError, extract_download_link, fetch_page};

/// Tracker used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://www.torrentday.com";

/// Everything needed to build a [`TorrentDownloader`].
#[derive(Debug, Clone)]
pub struct DownloaderSettings {
    /// Directory the torrent files are written to; created if absent.
    pub download_dir: PathBuf,
    /// Site root, e.g. `https://www.torrentday.com`.
    pub base_url: String,
    /// Raw `Cookie` header value for the logged-in session.
    pub cookie: String,
    /// HTTP timeouts.
    pub timeouts: HttpTimeouts,
    /// Attribute identifying the download anchor.
    pub marker: LinkMarker,
    /// Filename cleanup rules.
    pub rules: NormalizerRules,
}

impl DownloaderSettings {
    /// Settings with default base URL, timeouts, marker and rules.
    pub fn new(download_dir: impl Into<PathBuf>, cookie: impl Into<String>) -> Self {
        Self {
            download_dir: download_dir.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            cookie: cookie.into(),
            timeouts: HttpTimeouts::default(),
            marker: LinkMarker::default(),
            rules: NormalizerRules::default(),
        }
    }

    /// Replaces the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Errors raised while constructing a [`TorrentDownloader`].
#[derive(Debug, Error)]
pub enum SetupError {
    /// The download directory could not be created.
    #[error("cannot create download directory {path}: {source}")]
    CreateDir {
        /// Directory that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client (TLS backend, cookie store) could not be built.
    #[error("cannot build HTTP client: {source}")]
    HttpClient {
        /// Underlying reqwest builder error.
        #[source]
        source: reqwest::Error,
    },

    /// The base URL is not an absolute `http`/`https` URL.
    #[error("invalid base URL: {url}\n  Suggestion: use the site root, e.g. {DEFAULT_BASE_URL}")]
    InvalidBaseUrl {
        /// The rejected base URL.
        url: String,
    },

    /// The cookie cannot be sent as an HTTP header.
    #[error("invalid cookie: contains characters not allowed in an HTTP header")]
    InvalidCookie,

    /// A quality token could not be compiled into a pattern.
    #[error("invalid filename rules: {source}")]
    InvalidRules {
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
}

impl SetupError {
    fn from_session(error: SessionError) -> Self {
        match error {
            SessionError::InvalidBaseUrl { url } => Self::InvalidBaseUrl { url },
            SessionError::InvalidCookie => Self::InvalidCookie,
        }
    }
}

/// A failed download, tagged with the stage that failed.
#[derive(Debug, Error)]
pub enum DownloaderError {
    /// The detail page could not be fetched.
    #[error("failed to fetch torrent page: {0}")]
    FetchPage(#[source] ResolveError),

    /// The page was fetched but no usable download link was found.
    #[error("failed to find download link: {0}")]
    FindLink(#[source] ResolveError),

    /// The torrent file could not be retrieved or written.
    #[error("failed to download torrent: {0}")]
    Download(#[source] DownloadError),
}

/// A torrent saved by [`TorrentDownloader::download_torrent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedTorrent {
    /// Full path of the written file.
    pub path: PathBuf,
    /// Normalized file name, as announced by `Saving as:`.
    pub filename: String,
    /// Bytes written.
    pub bytes: u64,
    /// Link the file was retrieved from.
    pub source_url: String,
}

impl SavedTorrent {
    fn from_download(file: DownloadedFile, source_url: String) -> Self {
        Self {
            path: file.path,
            filename: file.filename,
            bytes: file.bytes,
            source_url,
        }
    }
}

/// Downloads torrent files from tracker detail pages with one session.
#[derive(Debug)]
pub struct TorrentDownloader {
    client: HttpClient,
    session: SessionContext,
    download_dir: PathBuf,
    marker: LinkMarker,
    normalizer: FilenameNormalizer,
}

impl TorrentDownloader {
    /// Builds the downloader and makes sure the download directory exists.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] when the directory cannot be created, the
    /// session or rules are invalid, or the HTTP client cannot be built.
    pub fn new(settings: DownloaderSettings) -> Result<Self, SetupError> {
        let DownloaderSettings {
            download_dir,
            base_url,
            cookie,
            timeouts,
            marker,
            rules,
        } = settings;

        let session =
            SessionContext::new(&base_url, &cookie).map_err(SetupError::from_session)?;
        let normalizer =
            FilenameNormalizer::new(rules).map_err(|source| SetupError::InvalidRules { source })?;

        std::fs::create_dir_all(&download_dir).map_err(|source| SetupError::CreateDir {
            path: download_dir.clone(),
            source,
        })?;

        let client = HttpClient::new(timeouts).map_err(|source| SetupError::HttpClient { source })?;

        debug!(
            dir = %download_dir.display(),
            base_url = %session.base_url(),
            "torrent downloader ready"
        );

        Ok(Self {
            client,
            session,
            download_dir,
            marker,
            normalizer,
        })
    }

    /// Directory torrent files are written to.
    #[must_use]
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Session shared by the page fetch and the file download.
    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Fetches the detail page for `page_url`, extracts the download link
    /// and saves the torrent under its normalized name.
    ///
    /// # Errors
    ///
    /// Returns [`DownloaderError::FetchPage`] when the page URL carries no
    /// identifier or the request fails, [`DownloaderError::FindLink`] when
    /// the page has no usable download anchor, and
    /// [`DownloaderError::Download`] when retrieval or the file write fails.
    #[instrument(skip(self), fields(page_url = %page_url))]
    pub async fn download_torrent(&self, page_url: &str) -> Result<SavedTorrent, DownloaderError> {
        let page_ref = PageReference::from_page_url(page_url).map_err(DownloaderError::FetchPage)?;

        let html = fetch_page(&self.client, &self.session, &page_ref)
            .await
            .map_err(DownloaderError::FetchPage)?;

        let link = extract_download_link(&html, &self.marker, self.session.base_url())
            .map_err(DownloaderError::FindLink)?;
        debug!(link = %link, "download link resolved");

        let file = self
            .client
            .download_torrent_file(
                link.as_str(),
                &self.session,
                &self.download_dir,
                &self.normalizer,
            )
            .await
            .map_err(DownloaderError::Download)?;

        info!(
            id = %page_ref,
            file = %file.filename,
            bytes = file.bytes,
            "torrent downloaded"
        );
        Ok(SavedTorrent::from_download(file, link.to_string()))
    }
}
