//! Integration tests for streaming logo downloads.

use org_logo_sync::fetch::Downloader;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-image-data";

#[tokio::test]
async fn test_download_writes_body_to_file() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .and(header("user-agent", "gsoc-logo-downloader/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PNG_BYTES, "image/png"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("unikraft.png");
    let downloader = Downloader::new().unwrap();

    let bytes = downloader
        .download(&format!("{}/logo.png", mock_server.uri()), &dest)
        .await
        .expect("download failed");

    assert_eq!(bytes, PNG_BYTES.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), PNG_BYTES);
}

#[tokio::test]
async fn test_download_larger_than_buffer() {
    let body: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/big.webp"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.clone(), "image/webp"))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("big.webp");

    let bytes = Downloader::new()
        .unwrap()
        .download(&format!("{}/big.webp", mock_server.uri()), &dest)
        .await
        .unwrap();

    assert_eq!(bytes, 50_000);
    assert_eq!(std::fs::read(&dest).unwrap(), body);
}

#[tokio::test]
async fn test_download_overwrites_existing_file() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/logo.svg"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<svg/>"))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("jitsi.svg");
    std::fs::write(&dest, "a much longer stale file body").unwrap();

    Downloader::new()
        .unwrap()
        .download(&format!("{}/logo.svg", mock_server.uri()), &dest)
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "<svg/>");
}

#[tokio::test]
async fn test_download_fails_on_error_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("missing.png");

    let err = Downloader::new()
        .unwrap()
        .download(&format!("{}/missing.png", mock_server.uri()), &dest)
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("404"));
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_download_fails_on_unwritable_destination() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PNG_BYTES, "image/png"))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("no-such-dir").join("logo.png");

    let result = Downloader::new()
        .unwrap()
        .download(&format!("{}/logo.png", mock_server.uri()), &dest)
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_download_fails_on_unreachable_host() {
    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("logo.png");

    // Port 9 (discard) on localhost is not expected to be listening.
    let result = Downloader::new()
        .unwrap()
        .download("http://127.0.0.1:9/logo.png", &dest)
        .await;

    assert!(result.is_err());
}
