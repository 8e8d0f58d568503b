use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::trajectory::Trajectory;
use crate::upload::VideoHandle;

/// Where the analysis session currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    #[default]
    NoVideo,
    VideoLoaded,
    Analyzing,
    AnalysisComplete,
}

/// Identifies one outstanding analysis. Monotonically increasing per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnalysisTicket(pub u64);

impl std::fmt::Display for AnalysisTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    NoVideo,
    AnalysisInProgress,
    NoAnalysisPending,
    StaleTicket {
        expected: Option<AnalysisTicket>,
        got: AnalysisTicket,
    },
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoVideo => write!(f, "no video has been uploaded"),
            Self::AnalysisInProgress => write!(f, "an analysis is already in progress"),
            Self::NoAnalysisPending => write!(f, "no analysis is in progress"),
            Self::StaleTicket { expected, got } => match expected {
                Some(e) => write!(f, "analysis {got} is stale (current is {e})"),
                None => write!(f, "analysis {got} is stale (none outstanding)"),
            },
        }
    }
}

impl std::error::Error for SessionError {}

/// One user's analysis session.
///
/// Transitions: `NoVideo -> VideoLoaded -> Analyzing -> AnalysisComplete`.
/// Loading a new video from `VideoLoaded` or `AnalysisComplete` starts over;
/// nothing may change while an analysis is outstanding except its completion
/// or cancellation.
#[derive(Debug, Clone, Default)]
pub struct Session {
    phase: SessionPhase,
    video: Option<VideoHandle>,
    trajectory: Option<Arc<Trajectory>>,
    pending: Option<AnalysisTicket>,
    next_ticket: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn video(&self) -> Option<&VideoHandle> {
        self.video.as_ref()
    }

    pub fn trajectory(&self) -> Option<&Arc<Trajectory>> {
        self.trajectory.as_ref()
    }

    pub fn pending(&self) -> Option<AnalysisTicket> {
        self.pending
    }

    /// Whether the analyze trigger is enabled.
    pub fn can_analyze(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::VideoLoaded | SessionPhase::AnalysisComplete
        )
    }

    /// Whether the scene should be replaying the trajectory.
    pub fn is_playing(&self) -> bool {
        self.phase == SessionPhase::AnalysisComplete
    }

    /// Accept a new video, discarding any previous result.
    ///
    /// Returns the replaced video, if any.
    pub fn load_video(&mut self, video: VideoHandle) -> Result<Option<VideoHandle>, SessionError> {
        if self.phase == SessionPhase::Analyzing {
            return Err(SessionError::AnalysisInProgress);
        }
        tracing::info!(video_id = %video.id, file = %video.file_name, "Video loaded");
        self.trajectory = None;
        self.phase = SessionPhase::VideoLoaded;
        Ok(self.video.replace(video))
    }

    pub fn begin_analysis(&mut self) -> Result<AnalysisTicket, SessionError> {
        match self.phase {
            SessionPhase::NoVideo => return Err(SessionError::NoVideo),
            SessionPhase::Analyzing => return Err(SessionError::AnalysisInProgress),
            SessionPhase::VideoLoaded | SessionPhase::AnalysisComplete => {},
        }
        self.next_ticket += 1;
        let ticket = AnalysisTicket(self.next_ticket);
        self.pending = Some(ticket);
        self.phase = SessionPhase::Analyzing;
        tracing::info!(%ticket, "Analysis started");
        Ok(ticket)
    }

    pub fn complete_analysis(
        &mut self,
        ticket: AnalysisTicket,
        trajectory: Trajectory,
    ) -> Result<Arc<Trajectory>, SessionError> {
        self.take_pending(ticket)?;
        let trajectory = Arc::new(trajectory);
        self.trajectory = Some(Arc::clone(&trajectory));
        self.phase = SessionPhase::AnalysisComplete;
        tracing::info!(%ticket, "Analysis complete");
        Ok(trajectory)
    }

    /// Abandon the outstanding analysis and return to `VideoLoaded`.
    pub fn cancel_analysis(&mut self, ticket: AnalysisTicket) -> Result<(), SessionError> {
        self.take_pending(ticket)?;
        self.phase = SessionPhase::VideoLoaded;
        tracing::info!(%ticket, "Analysis cancelled");
        Ok(())
    }

    fn take_pending(&mut self, ticket: AnalysisTicket) -> Result<(), SessionError> {
        match self.pending {
            Some(p) if p == ticket => {
                self.pending = None;
                Ok(())
            },
            expected => Err(SessionError::StaleTicket {
                expected,
                got: ticket,
            }),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            video: self.video.clone(),
            pending: self.pending,
            can_analyze: self.can_analyze(),
            is_playing: self.is_playing(),
        }
    }
}

/// Serializable view of a session for status endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub video: Option<VideoHandle>,
    pub pending: Option<AnalysisTicket>,
    pub can_analyze: bool,
    pub is_playing: bool,
}
