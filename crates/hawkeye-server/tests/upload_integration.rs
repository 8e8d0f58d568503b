#[allow(dead_code)]
mod common;

use hawkeye_core::session::SessionPhase;
use hawkeye_core::upload::VideoHandle;
use hawkeye_server::config::{LimitsConfig, ServerConfig};

use common::{TestServer, fast_config, sample_bytes};

#[tokio::test]
async fn upload_returns_handle_and_serves_bytes() {
    let server = TestServer::new().await;
    let resp = server
        .upload("video/quicktime", "nets/session.mov", sample_bytes())
        .await;
    assert_eq!(resp.status(), 201);
    let handle: VideoHandle = resp.json().await.unwrap();
    assert_eq!(handle.file_name, "session.mov");
    assert_eq!(handle.content_type, "video/quicktime");
    assert_eq!(handle.size, sample_bytes().len() as u64);
    assert_eq!(handle.locator, format!("/api/v1/videos/{}", handle.id));

    let resp = server
        .client
        .get(format!("{}{}", server.base_url(), handle.locator))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "video/quicktime");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), sample_bytes().as_slice());
}

#[tokio::test]
async fn non_video_is_rejected() {
    let server = TestServer::new().await;
    for content_type in ["image/png", "application/octet-stream", "text/plain"] {
        let resp = server.upload(content_type, "x", sample_bytes()).await;
        assert_eq!(resp.status(), 415, "{content_type}");
        let body: serde_json::Value = resp.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("not a video"));
    }
    assert_eq!(server.session().await.phase, SessionPhase::NoVideo);
}

#[tokio::test]
async fn empty_upload_is_bad_request() {
    let server = TestServer::new().await;
    let resp = server.upload("video/mp4", "empty.mp4", Vec::new()).await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let config = ServerConfig {
        limits: LimitsConfig {
            max_upload_bytes: 16,
            ..LimitsConfig::default()
        },
        ..fast_config()
    };
    let server = TestServer::from_config(config).await;

    let resp = server.upload("video/mp4", "big.mp4", vec![0u8; 17]).await;
    assert_eq!(resp.status(), 413);
    let resp = server.upload("video/mp4", "ok.mp4", vec![0u8; 16]).await;
    assert_eq!(resp.status(), 201);
}

#[tokio::test]
async fn missing_file_name_defaults() {
    let server = TestServer::new().await;
    let resp = server
        .client
        .post(server.api("/videos"))
        .header("content-type", "video/webm")
        .body(sample_bytes())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let handle: VideoHandle = resp.json().await.unwrap();
    assert_eq!(handle.file_name, "upload");
}

#[tokio::test]
async fn unknown_video_is_404() {
    let server = TestServer::new().await;
    let resp = server
        .get(&format!("/videos/{}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn old_uploads_are_evicted() {
    let config = ServerConfig {
        limits: LimitsConfig {
            max_stored_videos: 1,
            ..LimitsConfig::default()
        },
        ..fast_config()
    };
    let server = TestServer::from_config(config).await;
    let first = server.upload_sample().await;
    let second = server.upload_sample().await;

    assert_eq!(server.get(&format!("/videos/{}", first.id)).await.status(), 404);
    assert_eq!(
        server.get(&format!("/videos/{}", second.id)).await.status(),
        200
    );
}
