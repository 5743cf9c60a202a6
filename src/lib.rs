//! Torrent Downloader Core Library
//!
//! This library fetches a tracker's torrent detail page with an authenticated
//! session, finds the download anchor in its HTML, and saves the torrent file
//! under a cleaned-up name.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`auth`] - Session context (base URL + cookie) and feed URL parameters
//! - [`resolver`] - Detail page fetch and download link extraction
//! - [`download`] - Streaming file retrieval and filename normalization
//! - [`downloader`] - The fetch → extract → download pipeline

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod download;
pub mod downloader;
pub mod resolver;
mod user_agent;

// Re-export commonly used types
pub use auth::{SessionContext, SessionError, parse_feed_auth_params};
pub use download::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, DownloadError, DownloadedFile,
    FilenameNormalizer, HttpClient, HttpTimeouts, NormalizerRules, normalize_filename,
};
pub use downloader::{
    DEFAULT_BASE_URL, DownloaderError, DownloaderSettings, SavedTorrent, SetupError,
    TorrentDownloader,
};
pub use resolver::{
    DownloadLink, LinkMarker, PageReference, ResolveError, extract_download_link, fetch_page,
};
