//! Link resolution: torrent page URL → download link.
//!
//! Resolution runs in two stages:
//!
//! - [`fetch_page`] - authenticated GET of `<base>/torrent.php?id=<id>`
//! - [`extract_download_link`] - first anchor carrying the [`LinkMarker`],
//!   resolved against the base URL
//!
//! The HTTP status of the page is not inspected, so an expired session shows
//! up as [`ResolveError::LinkNotFound`].
//!
//! # Example
//!
//! ```no_run
//! use torrent_downloader_core::SessionContext;
//! use torrent_downloader_core::download::{HttpClient, HttpTimeouts};
//! use torrent_downloader_core::resolver::{
//!     LinkMarker, PageReference, extract_download_link, fetch_page,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(HttpTimeouts::default())?;
//! let session = SessionContext::new("https://tracker.example", "uid=1; pass=secret")?;
//! let page_ref = PageReference::from_page_url("https://tracker.example/t/12345")?;
//!
//! let html = fetch_page(&client, &session, &page_ref).await?;
//! let link = extract_download_link(&html, &LinkMarker::default(), session.base_url())?;
//! println!("Download link: {link}");
//! # Ok(())
//! # }
//! ```

mod error;
mod extract;
mod page;

pub use error::ResolveError;
pub use extract::{DownloadLink, LinkMarker, extract_download_link};
pub use page::{PageReference, fetch_page};
