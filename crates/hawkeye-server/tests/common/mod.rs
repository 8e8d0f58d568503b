use std::net::SocketAddr;
use std::time::Duration;

use hawkeye_core::session::{SessionPhase, SessionSnapshot};
use hawkeye_core::upload::VideoHandle;

use hawkeye_server::build_app;
use hawkeye_server::config::{AnalysisConfig, PlaybackConfig, ServerConfig};
use hawkeye_server::state::AppState;

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    pub client: reqwest::Client,
    _shutdown: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a test server with a short analysis delay and a fast tick rate.
    pub async fn new() -> Self {
        Self::from_config(fast_config()).await
    }

    pub async fn from_config(config: ServerConfig) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (app, state) = build_app(config);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            state,
            client: reqwest::Client::new(),
            _shutdown: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn api(&self, path: &str) -> String {
        format!("http://{}/api/v1{path}", self.addr)
    }

    /// Upload `body` as a video and return the response.
    pub async fn upload(&self, content_type: &str, file_name: &str, body: Vec<u8>) -> reqwest::Response {
        self.client
            .post(self.api("/videos"))
            .header("content-type", content_type)
            .header("x-file-name", file_name)
            .body(body)
            .send()
            .await
            .unwrap()
    }

    /// Upload a small mp4 and return its handle.
    pub async fn upload_sample(&self) -> VideoHandle {
        let resp = self.upload("video/mp4", "delivery.mp4", sample_bytes()).await;
        assert_eq!(resp.status(), 201);
        resp.json().await.unwrap()
    }

    pub async fn session(&self) -> SessionSnapshot {
        self.client
            .get(self.api("/session"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    pub async fn post(&self, path: &str) -> reqwest::Response {
        self.client.post(self.api(path)).send().await.unwrap()
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.api(path)).send().await.unwrap()
    }

    /// Poll the session until it reaches `phase` or the timeout elapses.
    pub async fn wait_for_phase(&self, phase: SessionPhase) -> SessionSnapshot {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let snapshot = self.session().await;
            if snapshot.phase == phase {
                return snapshot;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for {phase:?}, last: {snapshot:?}"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

/// Defaults with a 50ms analysis and 500Hz playback so flows finish quickly.
pub fn fast_config() -> ServerConfig {
    ServerConfig {
        analysis: AnalysisConfig {
            delay_ms: 50,
            seed: Some(7),
        },
        playback: PlaybackConfig {
            tick_rate_hz: 500.0,
            ..PlaybackConfig::default()
        },
        ..ServerConfig::default()
    }
}

/// A few bytes standing in for video content; never decoded.
pub fn sample_bytes() -> Vec<u8> {
    b"\x00\x00\x00\x18ftypmp42 not really a video".to_vec()
}
