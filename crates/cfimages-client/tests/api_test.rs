use cfimages_client::{ApiClient, Credential, UploadTransport};
use cfimages_core::{SelectedFile, UploadError, UploadTarget, UploadTargetRequest};
use mockito::Matcher;
use serde_json::json;

fn target_request() -> UploadTargetRequest {
    let mut metadata = serde_json::Map::new();
    metadata.insert("owner".to_string(), json!("tests"));
    UploadTargetRequest {
        metadata,
        require_signed_urls: true,
        variants: Vec::new(),
    }
}

fn png_file() -> SelectedFile {
    SelectedFile::new("pixel.png", "image/png", b"fake-png-bytes".to_vec())
}

#[tokio::test]
async fn test_get_upload_url_sends_body_and_csrf_header() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/cloudflare-images/get-upload-url/")
        .match_header("x-csrftoken", "tok123")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "metadata": { "owner": "tests" },
            "require_signed_urls": true
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"uploadURL": "https://upload.example.com/one-time", "id": "abc123"}"#)
        .create_async()
        .await;

    let client = ApiClient::new(server.url(), Credential::CsrfToken("tok123".to_string())).unwrap();
    let target = client.get_upload_url(&target_request()).await.unwrap();

    assert_eq!(target.upload_url, "https://upload.example.com/one-time");
    assert_eq!(target.id.as_deref(), Some("abc123"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_upload_url_anonymous_omits_csrf_header() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/cloudflare-images/get-upload-url/")
        .match_header("x-csrftoken", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"uploadURL": "https://upload.example.com/one-time"}"#)
        .create_async()
        .await;

    let client = ApiClient::new(server.url(), Credential::Anonymous).unwrap();
    let target = client.get_upload_url(&target_request()).await.unwrap();

    assert_eq!(target.id, None);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_upload_url_non_success_is_backend_unavailable() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/cloudflare-images/get-upload-url/")
        .with_status(403)
        .with_body("CSRF verification failed")
        .create_async()
        .await;

    let client = ApiClient::new(server.url(), Credential::Anonymous).unwrap();
    let err = client.get_upload_url(&target_request()).await.unwrap_err();

    match err {
        UploadError::BackendUnavailable(detail) => {
            assert!(detail.contains("403"));
            assert!(detail.contains("CSRF verification failed"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_get_upload_url_missing_field_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/cloudflare-images/get-upload-url/")
        .with_status(200)
        .with_body(r#"{"id": "abc123"}"#)
        .create_async()
        .await;

    let client = ApiClient::new(server.url(), Credential::Anonymous).unwrap();
    let err = client.get_upload_url(&target_request()).await.unwrap_err();

    assert!(matches!(err, UploadError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_get_upload_url_unreachable_backend() {
    // Port 9 (discard) is closed on test hosts.
    let client = ApiClient::new("http://127.0.0.1:9".to_string(), Credential::Anonymous).unwrap();
    let err = client.get_upload_url(&target_request()).await.unwrap_err();

    assert!(matches!(err, UploadError::BackendUnavailable(_)));
}

#[tokio::test]
async fn test_direct_upload_posts_multipart_file() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/upload/one-time")
        .match_header("x-csrftoken", Matcher::Missing)
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=.+$".to_string()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="file""#.to_string()),
            Matcher::Regex(r#"filename="pixel.png""#.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": true, "errors": [], "result": {"id": "abc123", "filename": "pixel.png"}}"#)
        .create_async()
        .await;

    let client = ApiClient::new(server.url(), Credential::CsrfToken("tok".to_string())).unwrap();
    let target = UploadTarget {
        upload_url: format!("{}/upload/one-time", server.url()),
        id: None,
    };
    let id = client.direct_upload(&target, &png_file()).await.unwrap();

    assert_eq!(id.as_str(), "abc123");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_direct_upload_non_success_is_rejected() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/upload/one-time")
        .with_status(400)
        .with_body(r#"{"success": false, "errors": [{"code": 5400, "message": "Bad request"}]}"#)
        .create_async()
        .await;

    let client = ApiClient::new(server.url(), Credential::Anonymous).unwrap();
    let target = UploadTarget {
        upload_url: format!("{}/upload/one-time", server.url()),
        id: None,
    };
    let err = client.direct_upload(&target, &png_file()).await.unwrap_err();

    match err {
        UploadError::UploadRejected(detail) => assert!(detail.contains("400")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_direct_upload_without_result_id_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/upload/one-time")
        .with_status(200)
        .with_body(r#"{"success": true, "result": {"filename": "pixel.png"}}"#)
        .create_async()
        .await;

    let client = ApiClient::new(server.url(), Credential::Anonymous).unwrap();
    let target = UploadTarget {
        upload_url: format!("{}/upload/one-time", server.url()),
        id: None,
    };
    let err = client.direct_upload(&target, &png_file()).await.unwrap_err();

    assert!(matches!(err, UploadError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_transport_trait_runs_both_steps() {
    let mut server = mockito::Server::new_async().await;
    let upload_url = format!("{}/upload/session-1", server.url());
    let backend = server
        .mock("POST", "/cloudflare-images/get-upload-url/")
        .with_status(200)
        .with_body(json!({ "uploadURL": upload_url }).to_string())
        .create_async()
        .await;
    let host = server
        .mock("POST", "/upload/session-1")
        .with_status(200)
        .with_body(r#"{"result": {"id": "xyz789"}}"#)
        .create_async()
        .await;

    let client = ApiClient::new(server.url(), Credential::Anonymous).unwrap();
    let transport: &dyn UploadTransport = &client;
    let target = transport
        .request_upload_target(&target_request())
        .await
        .unwrap();
    let id = transport.submit_file(&target, &png_file()).await.unwrap();

    assert_eq!(id.as_str(), "xyz789");
    backend.assert_async().await;
    host.assert_async().await;
}
