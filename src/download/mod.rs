//! Torrent file retrieval with streaming support.
//!
//! This module provides the shared tracker HTTP client, the streaming
//! download of the resolved torrent link, and the filename normalization
//! that decides what the file is called on disk.
//!
//! # Features
//!
//! - Streaming downloads (constant memory regardless of file size)
//! - Configurable connect and request timeouts
//! - Structured error types with full context
//! - Partial files removed when a download fails part way
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use torrent_downloader_core::SessionContext;
//! use torrent_downloader_core::download::{FilenameNormalizer, HttpClient, HttpTimeouts};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(HttpTimeouts::default())?;
//! let session = SessionContext::new("https://tracker.example", "uid=1; pass=secret")?;
//! let saved = client
//!     .download_torrent_file(
//!         "https://tracker.example/download.php/42/Show.Name.S01E01.1080p.torrent",
//!         &session,
//!         Path::new("./torrents"),
//!         &FilenameNormalizer::default(),
//!     )
//!     .await?;
//! println!("Saving as: {}", saved.filename);
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod error;
mod filename;

pub use client::{DownloadedFile, HttpClient, HttpTimeouts};
pub use constants::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_NOISE_SUBSTRINGS, DEFAULT_QUALITY_TOKENS,
    DEFAULT_REQUEST_TIMEOUT_SECS, TORRENT_SUFFIX,
};
pub use error::DownloadError;
pub use filename::{FilenameNormalizer, NormalizerRules, normalize_filename};
