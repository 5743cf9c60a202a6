//! Integration tests for session handling and feed URL auth parameters.

mod support;

use support::{SESSION_COOKIE, start_mock_server_or_skip};
use tempfile::TempDir;
use torrent_downloader_core::download::{FilenameNormalizer, HttpClient, HttpTimeouts};
use torrent_downloader_core::{SessionContext, SessionError, parse_feed_auth_params};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[test]
fn test_feed_params_from_tracker_rss_url() {
    let params = parse_feed_auth_params(
        "https://www.torrentday.com/t.rss?7;26;download;u=2550949;tp=8f645a7bde6c8e1f;private",
    );
    assert_eq!(params.get("u").map(String::as_str), Some("2550949"));
    assert_eq!(params.get("tp").map(String::as_str), Some("8f645a7bde6c8e1f"));
    assert_eq!(params.get("26").map(String::as_str), Some(""));
    assert_eq!(params.len(), 6);
}

#[test]
fn test_feed_params_ampersand_is_not_a_delimiter() {
    let params = parse_feed_auth_params("https://tracker.example/rss?u=1&tp=2;x=3");
    assert_eq!(params.get("u").map(String::as_str), Some("1&tp=2"));
    assert_eq!(params.get("x").map(String::as_str), Some("3"));
}

#[test]
fn test_feed_params_without_query_is_empty() {
    assert!(parse_feed_auth_params("https://tracker.example/rss").is_empty());
}

#[test]
fn test_session_debug_never_shows_cookie() {
    let session = SessionContext::new("https://tracker.example", SESSION_COOKIE).unwrap();
    let debug = format!("{session:?}");
    assert!(!debug.contains("0123456789abcdef"), "cookie leaked: {debug}");
    assert!(debug.contains("tracker.example"));
}

#[test]
fn test_session_rejects_relative_base_url() {
    let err = SessionContext::new("tracker.example", "uid=1").unwrap_err();
    assert!(matches!(err, SessionError::InvalidBaseUrl { .. }));
}

#[tokio::test]
async fn test_session_cookie_kept_across_same_host_redirect() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/download.php/5/Redirected.Show.S01E05.torrent"))
        .and(header("cookie", SESSION_COOKIE))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", "/files/5/payload.torrent"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/5/payload.torrent"))
        .and(header("cookie", SESSION_COOKIE))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"d4:infod4:name1:xee".to_vec(), "application/x-bittorrent"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let client = HttpClient::new(HttpTimeouts::default()).unwrap();
    let session = SessionContext::new(&server.uri(), SESSION_COOKIE).unwrap();

    let saved = client
        .download_torrent_file(
            &format!("{}/download.php/5/Redirected.Show.S01E05.torrent", server.uri()),
            &session,
            temp_dir.path(),
            &FilenameNormalizer::default(),
        )
        .await
        .unwrap();

    // The name comes from the resolved link, not the redirect target.
    assert_eq!(saved.filename, "Redirected.Show.S01E05.torrent");
    assert_eq!(std::fs::read(&saved.path).unwrap(), b"d4:infod4:name1:xee");
}
