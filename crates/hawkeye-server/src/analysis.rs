use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use hawkeye_core::session::AnalysisTicket;
use hawkeye_core::trajectory::Trajectory;

use crate::state::AppState;

/// A running simulated analysis.
pub struct AnalysisJob {
    pub ticket: AnalysisTicket,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl AnalysisJob {
    /// Stop waiting; the session is left for the caller to update.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task to exit.
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            tracing::error!(ticket = %self.ticket, "Analysis task failed: {e}");
        }
    }
}

/// Spawn the delayed analysis for `ticket`.
///
/// After the configured delay the task generates a trajectory, completes the
/// session and starts playback. A ticket that is no longer pending by then
/// (cancelled, or superseded) has its result discarded.
pub fn spawn_analysis(state: AppState, ticket: AnalysisTicket) -> AnalysisJob {
    let cancel = state.shutdown.child_token();
    let handle = tokio::spawn(run_analysis(state, ticket, cancel.clone()));
    AnalysisJob {
        ticket,
        cancel,
        handle,
    }
}

async fn run_analysis(state: AppState, ticket: AnalysisTicket, cancel: CancellationToken) {
    let delay = Duration::from_millis(state.config.analysis.delay_ms);
    tokio::select! {
        _ = cancel.cancelled() => {
            tracing::debug!(%ticket, "Analysis task cancelled");
            return;
        }
        _ = tokio::time::sleep(delay) => {}
    }

    let trajectory = simulate(&state, ticket);

    let mut session = state.session.write().await;
    match session.complete_analysis(ticket, trajectory) {
        Ok(trajectory) => state.playback.start(trajectory).await,
        Err(e) => tracing::warn!(%ticket, "Discarding analysis result: {e}"),
    }
}

fn simulate(state: &AppState, ticket: AnalysisTicket) -> Trajectory {
    match state.config.analysis.seed {
        Some(seed) => state
            .generator
            .generate(&mut StdRng::seed_from_u64(seed.wrapping_add(ticket.0))),
        None => state.generator.generate(&mut rand::rng()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hawkeye_core::session::SessionPhase;
    use hawkeye_core::test_helpers::make_video;

    use crate::config::{AnalysisConfig, ServerConfig};

    fn state_with_delay(delay_ms: u64, seed: Option<u64>) -> AppState {
        AppState::new(ServerConfig {
            analysis: AnalysisConfig { delay_ms, seed },
            ..ServerConfig::default()
        })
    }

    async fn begin(state: &AppState) -> AnalysisTicket {
        let mut session = state.session.write().await;
        session.load_video(make_video("bowl.mp4")).unwrap();
        session.begin_analysis().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn completes_after_delay() {
        let state = state_with_delay(3000, None);
        let ticket = begin(&state).await;
        let job = spawn_analysis(state.clone(), ticket);

        tokio::time::sleep(Duration::from_millis(2999)).await;
        assert_eq!(state.session.read().await.phase(), SessionPhase::Analyzing);
        assert!(!job.is_finished());

        job.join().await;
        let session = state.session.read().await;
        assert_eq!(session.phase(), SessionPhase::AnalysisComplete);
        assert_eq!(session.trajectory().unwrap().points().len(), 100);
        assert!(session.pending().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn completion_starts_playback() {
        let state = state_with_delay(10, None);
        let mut rx = state.playback.subscribe();
        let ticket = begin(&state).await;
        spawn_analysis(state.clone(), ticket).join().await;

        let first = rx.recv().await.unwrap();
        assert_eq!(first.tick, 0);
        assert_eq!(first.index, 0);
        let trajectory = state.session.read().await.trajectory().cloned().unwrap();
        assert_eq!(first.position, trajectory.release_point());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_job_leaves_session_alone() {
        let state = state_with_delay(3000, None);
        let ticket = begin(&state).await;
        let job = spawn_analysis(state.clone(), ticket);

        state.session.write().await.cancel_analysis(ticket).unwrap();
        job.cancel();
        job.join().await;

        let session = state.session.read().await;
        assert_eq!(session.phase(), SessionPhase::VideoLoaded);
        assert!(session.trajectory().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_result_is_discarded() {
        let state = state_with_delay(100, None);
        let ticket = begin(&state).await;
        let job = spawn_analysis(state.clone(), ticket);

        // Session moves on without telling the task.
        state.session.write().await.cancel_analysis(ticket).unwrap();
        job.join().await;

        let session = state.session.read().await;
        assert_eq!(session.phase(), SessionPhase::VideoLoaded);
        assert!(session.trajectory().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_pending_analysis() {
        let state = state_with_delay(60_000, None);
        let ticket = begin(&state).await;
        let job = spawn_analysis(state.clone(), ticket);

        state.shutdown.cancel();
        job.join().await;
        assert_eq!(state.session.read().await.phase(), SessionPhase::Analyzing);
    }

    #[tokio::test(start_paused = true)]
    async fn seeded_analysis_is_reproducible() {
        let a = state_with_delay(0, Some(9));
        let b = state_with_delay(0, Some(9));
        let ta = begin(&a).await;
        let tb = begin(&b).await;
        spawn_analysis(a.clone(), ta).join().await;
        spawn_analysis(b.clone(), tb).join().await;

        let sa = *a.session.read().await.trajectory().unwrap().stats();
        let sb = *b.session.read().await.trajectory().unwrap().stats();
        assert_eq!(sa, sb);
    }
}
