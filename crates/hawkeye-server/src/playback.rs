use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use hawkeye_core::playback::{BallMarker, PlaybackDriver, PlaybackFrame, PlaybackStep};
use hawkeye_core::trajectory::Trajectory;

/// Used when the configured tick rate does not yield a usable period.
const FALLBACK_TICK_INTERVAL: Duration = Duration::from_micros(16_667);

struct PlaybackRun {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns the server-side replay loop and fans its frames out to viewers.
///
/// At most one loop runs at a time; starting a new one stops the previous.
pub struct PlaybackHub {
    frames: broadcast::Sender<PlaybackFrame>,
    tick_interval: Duration,
    shutdown: CancellationToken,
    current: Mutex<Option<PlaybackRun>>,
}

impl PlaybackHub {
    pub fn new(tick_rate_hz: f32, broadcast_capacity: usize, shutdown: CancellationToken) -> Self {
        let (frames, _) = broadcast::channel(broadcast_capacity.max(1));
        let tick_interval = Duration::try_from_secs_f32(1.0 / tick_rate_hz)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or_else(|| {
                tracing::warn!(tick_rate_hz, "Unusable playback tick rate, falling back to 60 Hz");
                FALLBACK_TICK_INTERVAL
            });
        Self {
            frames,
            tick_interval,
            shutdown,
            current: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackFrame> {
        self.frames.subscribe()
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Replay `trajectory` from its first point, replacing any running loop.
    pub async fn start(&self, trajectory: Arc<Trajectory>) {
        let mut current = self.current.lock().await;
        if let Some(run) = current.take() {
            run.cancel.cancel();
        }

        let cancel = self.shutdown.child_token();
        let handle = tokio::spawn(run_playback(
            trajectory,
            self.frames.clone(),
            self.tick_interval,
            cancel.clone(),
        ));
        *current = Some(PlaybackRun { cancel, handle });
    }

    /// Stop the running loop, if any.
    pub async fn stop(&self) {
        if let Some(run) = self.current.lock().await.take() {
            run.cancel.cancel();
            tracing::debug!("Playback stopped");
        }
    }

    /// Whether a replay loop is still stepping the ball.
    pub async fn is_running(&self) -> bool {
        self.current
            .lock()
            .await
            .as_ref()
            .is_some_and(|run| !run.handle.is_finished())
    }

    /// Wait for the current loop to finish on its own.
    #[cfg(test)]
    pub async fn join(&self) {
        let run = self.current.lock().await.take();
        if let Some(run) = run {
            let _ = run.handle.await;
        }
    }
}

/// Drive one replay: an initial frame at the release point, then one frame
/// per tick until the ball reaches the end of the path.
async fn run_playback(
    trajectory: Arc<Trajectory>,
    frames: broadcast::Sender<PlaybackFrame>,
    tick_interval: Duration,
    cancel: CancellationToken,
) {
    let mut driver = PlaybackDriver::new();
    let mut ball = BallMarker::default();
    if !driver.play_trajectory(Some(&trajectory), &mut ball) {
        return;
    }

    let start = PlaybackStep {
        tick: 0,
        index: 0,
        state: driver.state(),
    };
    let _ = frames.send(PlaybackFrame::new(start, &ball));

    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // The first tick completes immediately.
    interval.tick().await;

    while driver.is_playing() {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(ticks = driver.ticks(), "Playback loop cancelled");
                return;
            }
            _ = interval.tick() => {
                if let Some(frame) = driver.tick_frame(&mut ball) {
                    // No receivers is fine; frames are only for live viewers.
                    let _ = frames.send(frame);
                }
            }
        }
    }
    tracing::debug!(ticks = driver.ticks(), "Playback loop finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use hawkeye_core::geometry::Vec3;
    use hawkeye_core::playback::PlaybackState;
    use hawkeye_core::test_helpers::make_trajectory;

    fn three_points() -> Arc<Trajectory> {
        Arc::new(make_trajectory(vec![
            Vec3::new(0.0, 2.5, 0.0),
            Vec3::new(0.0, 1.0, -6.0),
            Vec3::new(0.0, 0.5, -12.0),
        ]))
    }

    fn drain(rx: &mut broadcast::Receiver<PlaybackFrame>) -> Vec<PlaybackFrame> {
        let mut out = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            out.push(frame);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn emits_initial_frame_then_one_per_tick() {
        let hub = PlaybackHub::new(60.0, 64, CancellationToken::new());
        let mut rx = hub.subscribe();

        hub.start(three_points()).await;
        hub.join().await;

        let frames = drain(&mut rx);
        let indices: Vec<_> = frames.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(frames[0].tick, 0);
        assert_eq!(frames[0].position, Vec3::new(0.0, 2.5, 0.0));
        assert_eq!(frames[0].state, PlaybackState::Playing);
        assert_eq!(frames[2].tick, 2);
        assert_eq!(frames[2].state, PlaybackState::Idle);
        assert_eq!(frames[2].position, Vec3::new(0.0, 0.5, -12.0));
    }

    #[tokio::test(start_paused = true)]
    async fn frames_are_paced_by_tick_rate() {
        let hub = PlaybackHub::new(10.0, 64, CancellationToken::new());
        let mut rx = hub.subscribe();
        hub.start(three_points()).await;

        // Initial frame is sent straight away.
        let first = rx.recv().await.unwrap();
        assert_eq!(first.tick, 0);
        let started = tokio::time::Instant::now();

        let second = rx.recv().await.unwrap();
        assert_eq!(second.tick, 1);
        assert!(started.elapsed() >= Duration::from_millis(99));
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_running_loop() {
        let hub = PlaybackHub::new(60.0, 256, CancellationToken::new());
        let long = Arc::new(make_trajectory(
            (0..50).map(|i| Vec3::new(0.0, 1.0, -(i as f32))).collect(),
        ));
        hub.start(Arc::clone(&long)).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        let mut rx = hub.subscribe();
        hub.start(long).await;
        hub.join().await;

        let frames = drain(&mut rx);
        assert_eq!(frames[0].tick, 0, "restart begins at the release point");
        assert_eq!(frames[0].index, 0);
        assert_eq!(frames.last().unwrap().index, 49);
        assert_eq!(frames.len(), 50);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_frames() {
        let hub = PlaybackHub::new(60.0, 256, CancellationToken::new());
        let long = Arc::new(make_trajectory(
            (0..100).map(|i| Vec3::new(0.0, 1.0, -(i as f32) * 0.1)).collect(),
        ));
        let mut rx = hub.subscribe();
        hub.start(long).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        hub.stop().await;
        assert!(!hub.is_running().await);

        let before = drain(&mut rx).len();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(drain(&mut rx).is_empty());
        assert!(before < 100);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_playback() {
        let shutdown = CancellationToken::new();
        let hub = PlaybackHub::new(60.0, 256, shutdown.clone());
        let long = Arc::new(make_trajectory(
            (0..100).map(|i| Vec3::new(0.0, 1.0, -(i as f32) * 0.1)).collect(),
        ));
        hub.start(long).await;
        shutdown.cancel();
        hub.join().await;
        assert!(!hub.is_running().await);
    }

    #[test]
    fn unusable_tick_rate_falls_back() {
        for rate in [0.0, -5.0, f32::NAN, f32::INFINITY] {
            let hub = PlaybackHub::new(rate, 8, CancellationToken::new());
            assert_eq!(hub.tick_interval(), FALLBACK_TICK_INTERVAL, "rate {rate}");
        }
        let hub = PlaybackHub::new(50.0, 8, CancellationToken::new());
        assert!((hub.tick_interval().as_secs_f64() - 0.02).abs() < 1e-6);
    }

    #[tokio::test(start_paused = true)]
    async fn single_point_sends_one_idle_frame() {
        let hub = PlaybackHub::new(60.0, 8, CancellationToken::new());
        let mut rx = hub.subscribe();
        hub.start(Arc::new(make_trajectory(vec![Vec3::new(1.0, 2.0, 3.0)])))
            .await;
        hub.join().await;

        let frames = drain(&mut rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].state, PlaybackState::Idle);
        assert_eq!(frames[0].position, Vec3::new(1.0, 2.0, 3.0));
    }
}
