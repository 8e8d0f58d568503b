use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use hawkeye_core::generator::TrajectoryGenerator;
use hawkeye_core::session::Session;

use crate::analysis::AnalysisJob;
use crate::config::ServerConfig;
use crate::playback::PlaybackHub;
use crate::video_store::VideoStore;

pub type SharedSession = Arc<RwLock<Session>>;
pub type SharedVideoStore = Arc<RwLock<VideoStore>>;

/// Shared application state.
///
/// Lock order is `session`, then `videos`, then `analysis`, then the
/// playback hub's internal lock.
#[derive(Clone)]
pub struct AppState {
    pub session: SharedSession,
    pub videos: SharedVideoStore,
    pub generator: Arc<TrajectoryGenerator>,
    pub playback: Arc<PlaybackHub>,
    /// The most recently started analysis task.
    pub analysis: Arc<Mutex<Option<AnalysisJob>>>,
    pub sse_subscriber_count: Arc<AtomicUsize>,
    /// Cancelled once on server shutdown; background tasks hang off it.
    pub shutdown: CancellationToken,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let generator = TrajectoryGenerator::new(config.generator.clone()).unwrap_or_else(|e| {
            tracing::warn!("Invalid generator config: {e}, using defaults");
            TrajectoryGenerator::default()
        });
        let shutdown = CancellationToken::new();
        let playback = PlaybackHub::new(
            config.playback.tick_rate_hz,
            config.playback.broadcast_capacity,
            shutdown.clone(),
        );
        Self {
            session: Arc::new(RwLock::new(Session::new())),
            videos: Arc::new(RwLock::new(VideoStore::new(
                config.limits.max_stored_videos,
            ))),
            generator: Arc::new(generator),
            playback: Arc::new(playback),
            analysis: Arc::new(Mutex::new(None)),
            sse_subscriber_count: Arc::new(AtomicUsize::new(0)),
            shutdown,
            config: Arc::new(config),
        }
    }
}

/// Counts a live connection for as long as it is held.
pub struct ConnectionGuard {
    counter: Arc<AtomicUsize>,
}

impl ConnectionGuard {
    pub fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self { counter }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::Relaxed);
    }
}
