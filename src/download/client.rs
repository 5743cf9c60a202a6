//! HTTP client wrapper for the tracker.
//!
//! This module provides the `HttpClient` struct shared by the page fetch and
//! the torrent download, and the streaming download itself.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, COOKIE, USER_AGENT};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::constants::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS};
use super::error::DownloadError;
use super::filename::{FilenameNormalizer, destination_path, raw_filename_from_url};
use crate::auth::SessionContext;
use crate::user_agent;

/// Connect and whole-request timeouts for tracker requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// Seconds allowed for establishing the TCP/TLS connection.
    pub connect_secs: u64,
    /// Seconds allowed for a whole request, body included.
    pub request_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// HTTP client for tracker requests.
///
/// Follows redirects with the reqwest default policy and keeps a cookie
/// store for cookies the tracker sets along the way. The session cookie
/// itself is attached per request from a [`SessionContext`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

/// A torrent file saved to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// Final output path.
    pub path: PathBuf,
    /// On-disk file name (normalized and made filesystem-safe).
    pub filename: String,
    /// Bytes written.
    pub bytes: u64,
}

impl HttpClient {
    /// Creates a new HTTP client with the given timeouts.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error when the TLS backend or cookie store
    /// cannot be initialized.
    pub fn new(timeouts: HttpTimeouts) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .gzip(true)
            .cookie_store(true)
            .user_agent(user_agent::BROWSER_USER_AGENT)
            .build()?;
        debug!(?timeouts, "built tracker HTTP client");
        Ok(Self { client })
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Downloads a torrent file into `output_dir`.
    ///
    /// The file name is the link's last path segment run through
    /// `normalizer`. An existing file with the same name is overwritten.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid
    /// - The request fails (network error, timeout)
    /// - The server returns an error status or an HTML login page
    /// - The file cannot be created or fully written; the body is streamed
    ///   into `<name>.part`, which is removed on failure and renamed over the
    ///   final name only once complete
    #[instrument(skip(self, session, normalizer), fields(url = %url))]
    pub async fn download_torrent_file(
        &self,
        url: &str,
        session: &SessionContext,
        output_dir: &Path,
        normalizer: &FilenameNormalizer,
    ) -> Result<DownloadedFile, DownloadError> {
        let parsed_url = Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let raw_name = raw_filename_from_url(&parsed_url);
        let file_path = destination_path(output_dir, &normalizer.normalize(raw_name));
        let filename = file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!(raw = %raw_name, path = %file_path.display(), "resolved output path");

        let response = self
            .client
            .get(parsed_url)
            .header(ACCEPT, user_agent::DOWNLOAD_ACCEPT)
            .header(ACCEPT_LANGUAGE, user_agent::ACCEPT_LANGUAGE)
            .header(USER_AGENT, user_agent::BROWSER_USER_AGENT)
            .header(COOKIE, session.cookie_header().clone())
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        check_torrent_response(url, &response)?;

        // Stream into a sibling so a failed download never clobbers an
        // earlier copy of the same torrent.
        let part_path = partial_path(&file_path);
        let mut file = File::create(&part_path)
            .await
            .map_err(|e| DownloadError::create_file(part_path.clone(), e))?;

        let stream_result = stream_to_file(&mut file, response, url, &part_path).await;
        drop(file);

        let finished = match stream_result {
            Ok(bytes) => tokio::fs::rename(&part_path, &file_path)
                .await
                .map(|()| bytes)
                .map_err(|e| DownloadError::write(file_path.clone(), e)),
            Err(error) => Err(error),
        };

        let bytes = match finished {
            Ok(bytes) => bytes,
            Err(error) => {
                debug!(path = %part_path.display(), "cleaning up partial file after error");
                if let Err(cleanup) = tokio::fs::remove_file(&part_path).await {
                    warn!(
                        path = %part_path.display(),
                        error = %cleanup,
                        "failed to remove partial file"
                    );
                }
                return Err(error);
            }
        };

        info!(path = %file_path.display(), bytes, "torrent saved");

        Ok(DownloadedFile {
            path: file_path,
            filename,
            bytes,
        })
    }
}

/// `<name>.part` next to the final path.
fn partial_path(file_path: &Path) -> PathBuf {
    let mut name = file_path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    file_path.with_file_name(name)
}

/// Rejects error statuses and HTML bodies before anything touches the disk.
///
/// The tracker answers an expired session with its login page and a 200, so
/// an HTML content type on the download is treated like a 401.
fn check_torrent_response(url: &str, response: &reqwest::Response) -> Result<(), DownloadError> {
    let status = response.status().as_u16();
    if matches!(status, 401 | 403) {
        return Err(DownloadError::auth_required(url, status));
    }
    if !response.status().is_success() {
        return Err(DownloadError::http_status(url, status));
    }

    let is_html = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().contains("text/html"));
    if is_html {
        debug!(
            url = %url,
            response_url = %response.url(),
            "HTML response where a torrent file was expected"
        );
        return Err(DownloadError::auth_required(url, status));
    }

    Ok(())
}

/// Streams response body to file, returning bytes written.
///
/// This is extracted to enable cleanup on error in the caller.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::write(file_path.to_path_buf(), e))?;

        bytes_written += chunk.len() as u64;
    }

    // Ensure all data is flushed to disk
    writer
        .flush()
        .await
        .map_err(|e| DownloadError::write(file_path.to_path_buf(), e))?;

    Ok(bytes_written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use tempfile::TempDir;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_for(server: &MockServer) -> SessionContext {
        SessionContext::new(&server.uri(), "uid=7; pass=abc").unwrap()
    }

    #[test]
    fn test_http_timeouts_default() {
        let timeouts = HttpTimeouts::default();
        assert_eq!(timeouts.connect_secs, 30);
        assert_eq!(timeouts.request_secs, 120);
    }

    #[tokio::test]
    async fn test_download_sends_session_cookie_and_browser_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/download.php/1/Show.Name.S01E01.torrent"))
            .and(header("cookie", "uid=7; pass=abc"))
            .and(header("accept", "*/*"))
            .and(header_exists("accept-language"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(b"d4:infod4:name4:testee".to_vec(), "application/x-bittorrent"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let client = HttpClient::new(HttpTimeouts::default()).unwrap();
        let url = format!("{}/download.php/1/Show.Name.S01E01.torrent", server.uri());
        let saved = client
            .download_torrent_file(
                &url,
                &session_for(&server),
                temp_dir.path(),
                &FilenameNormalizer::default(),
            )
            .await
            .unwrap();

        assert_eq!(saved.filename, "Show.Name.S01E01.torrent");
        assert_eq!(saved.bytes, 22);
        assert_eq!(std::fs::read(&saved.path).unwrap(), b"d4:infod4:name4:testee");
    }

    #[tokio::test]
    async fn test_download_html_response_is_auth_error_and_writes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><form id=login></form></html>", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let client = HttpClient::new(HttpTimeouts::default()).unwrap();
        let url = format!("{}/download.php/1/a.torrent", server.uri());
        let result = client
            .download_torrent_file(
                &url,
                &session_for(&server),
                temp_dir.path(),
                &FilenameNormalizer::default(),
            )
            .await;

        assert!(
            matches!(result, Err(DownloadError::AuthRequired { status: 200, .. })),
            "expected AuthRequired, got {result:?}"
        );
        assert!(!temp_dir.path().join("a.torrent").exists());
    }

    /// Serves one response announcing 100 000 bytes, sends 20 000 and hangs up.
    async fn spawn_truncating_server() -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; 8192];
            let _ = socket.read(&mut request).await;
            let head = "HTTP/1.1 200 OK\r\n\
                        content-type: application/x-bittorrent\r\n\
                        content-length: 100000\r\n\r\n";
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&[b'x'; 20_000]).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_truncated_body_removes_partial_file() {
        let base = spawn_truncating_server().await;
        let temp_dir = TempDir::new().unwrap();
        let client = HttpClient::new(HttpTimeouts::default()).unwrap();
        let session = SessionContext::new(&base, "uid=7; pass=abc").unwrap();

        let result = client
            .download_torrent_file(
                &format!("{base}/download.php/3/Partial.torrent"),
                &session,
                temp_dir.path(),
                &FilenameNormalizer::default(),
            )
            .await;

        assert!(
            matches!(result, Err(DownloadError::Network { .. })),
            "expected Network, got {result:?}"
        );
        assert!(!temp_dir.path().join("Partial.torrent").exists());
        assert!(!temp_dir.path().join("Partial.torrent.part").exists());
    }

    #[tokio::test]
    async fn test_truncated_redownload_keeps_previous_copy() {
        let base = spawn_truncating_server().await;
        let temp_dir = TempDir::new().unwrap();
        let existing = temp_dir.path().join("Partial.torrent");
        std::fs::write(&existing, b"d4:infod4:name4:goodee").unwrap();

        let client = HttpClient::new(HttpTimeouts::default()).unwrap();
        let session = SessionContext::new(&base, "uid=7; pass=abc").unwrap();
        let result = client
            .download_torrent_file(
                &format!("{base}/download.php/3/Partial.torrent"),
                &session,
                temp_dir.path(),
                &FilenameNormalizer::default(),
            )
            .await;

        assert!(result.is_err());
        assert_eq!(std::fs::read(&existing).unwrap(), b"d4:infod4:name4:goodee");
        assert!(!temp_dir.path().join("Partial.torrent.part").exists());
    }

    #[test]
    fn test_partial_path_appends_part_suffix() {
        assert_eq!(
            partial_path(Path::new("/tmp/out/Show.torrent")),
            PathBuf::from("/tmp/out/Show.torrent.part")
        );
    }

    #[tokio::test]
    async fn test_download_invalid_url_is_rejected_before_request() {
        let temp_dir = TempDir::new().unwrap();
        let client = HttpClient::new(HttpTimeouts::default()).unwrap();
        let session = SessionContext::new("https://example.test", "uid=1").unwrap();
        let result = client
            .download_torrent_file(
                "not a url",
                &session,
                temp_dir.path(),
                &FilenameNormalizer::default(),
            )
            .await;
        assert!(matches!(result, Err(DownloadError::InvalidUrl { .. })));
    }
}
