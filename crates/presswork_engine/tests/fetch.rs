use presswork_engine::{FailureKind, FetchSettings, ImageFetcher, ReqwestImageFetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fetcher_returns_image_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uploads/pic.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png-bytes".to_vec()))
        .mount(&server)
        .await;

    let fetcher = ReqwestImageFetcher::new(FetchSettings::default()).expect("client builds");
    let url = format!("{}/uploads/pic.png", server.uri());
    let bytes = fetcher.fetch(&url).await.expect("fetch ok");
    assert_eq!(bytes, b"png-bytes");
}

#[tokio::test]
async fn fetcher_tolerates_unescaped_characters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
        .mount(&server)
        .await;

    let fetcher = ReqwestImageFetcher::new(FetchSettings::default()).expect("client builds");
    // Space left unescaped in the export; the client percent-encodes it
    // instead of refusing the URL.
    let url = format!("{}/uploads/my pic.png", server.uri());
    let bytes = fetcher.fetch(&url).await.expect("fetch ok");
    assert_eq!(bytes, b"ok");
}

#[tokio::test]
async fn fetcher_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = ReqwestImageFetcher::new(FetchSettings::default()).expect("client builds");
    let url = format!("{}/missing.png", server.uri());
    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn fetcher_rejects_oversized_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/huge.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 64]))
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 16,
        ..FetchSettings::default()
    };
    let fetcher = ReqwestImageFetcher::new(settings).expect("client builds");
    let url = format!("{}/huge.png", server.uri());
    let err = fetcher.fetch(&url).await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::TooLarge { .. }));
}

#[tokio::test]
async fn fetcher_rejects_invalid_urls() {
    let fetcher = ReqwestImageFetcher::new(FetchSettings::default()).expect("client builds");
    let err = fetcher.fetch("not a url at all").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
