use serde::{Deserialize, Serialize};

use crate::geometry::{Rotation, Vec3};
use crate::trajectory::Trajectory;

/// Rotation applied to the marker on every playback tick.
///
/// Purely visual; it does not track the delivery's spin rate.
pub const SPIN_PER_TICK: Rotation = Rotation::new(0.3, 0.2, 0.0);

/// Anything the playback driver can move along a path.
pub trait Marker {
    fn set_position(&mut self, position: Vec3);
    fn rotate(&mut self, delta: Rotation);
}

/// The replayed ball.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BallMarker {
    pub position: Vec3,
    pub rotation: Rotation,
}

impl BallMarker {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: Rotation::default(),
        }
    }
}

impl Marker for BallMarker {
    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn rotate(&mut self, delta: Rotation) {
        self.rotation.add(delta);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
}

/// Outcome of one driver tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackStep {
    /// Ticks applied since the last `play`, including this one.
    pub tick: u32,
    /// Path index the marker now sits on.
    pub index: usize,
    /// Driver state after the tick.
    pub state: PlaybackState,
}

/// Marker state after one tick, as published to viewers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackFrame {
    pub tick: u32,
    pub index: usize,
    pub position: Vec3,
    pub rotation: Rotation,
    pub state: PlaybackState,
}

impl PlaybackFrame {
    pub fn new(step: PlaybackStep, ball: &BallMarker) -> Self {
        Self {
            tick: step.tick,
            index: step.index,
            position: ball.position,
            rotation: ball.rotation,
            state: step.state,
        }
    }
}

/// Steps a marker along a precomputed path, one sample per tick.
///
/// `play` places the marker on the first sample; each following tick moves it
/// to the next sample until the last one is reached, after which the driver
/// is idle again with its cursor back at 0.
#[derive(Debug, Clone, Default)]
pub struct PlaybackDriver {
    path: Vec<Vec3>,
    cursor: usize,
    state: PlaybackState,
    ticks: u32,
}

impl PlaybackDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Ticks applied since the last `play`.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Start (or restart) playback of `path`.
    ///
    /// Returns whether playback started. An empty path leaves the driver idle
    /// and the marker untouched.
    pub fn play<M: Marker>(&mut self, path: &[Vec3], marker: &mut M) -> bool {
        self.path.clear();
        self.cursor = 0;
        self.ticks = 0;

        let Some(&first) = path.first() else {
            self.state = PlaybackState::Idle;
            tracing::warn!("Playback requested for an empty path, staying idle");
            return false;
        };

        self.path.extend_from_slice(path);
        marker.set_position(first);
        self.state = if path.len() > 1 {
            PlaybackState::Playing
        } else {
            PlaybackState::Idle
        };
        tracing::debug!(points = path.len(), "Playback started");
        true
    }

    /// Start playback of an optional trajectory. `None` is a no-op.
    pub fn play_trajectory<M: Marker>(
        &mut self,
        trajectory: Option<&Trajectory>,
        marker: &mut M,
    ) -> bool {
        match trajectory {
            Some(t) => self.play(t.points(), marker),
            None => {
                tracing::warn!("Playback requested without a trajectory, staying idle");
                self.state = PlaybackState::Idle;
                self.cursor = 0;
                false
            },
        }
    }

    /// Advance one tick. Returns `None` while idle.
    pub fn tick<M: Marker>(&mut self, marker: &mut M) -> Option<PlaybackStep> {
        if self.state != PlaybackState::Playing {
            return None;
        }

        if self.cursor + 1 < self.path.len() {
            self.cursor += 1;
            marker.set_position(self.path[self.cursor]);
        }
        marker.rotate(SPIN_PER_TICK);
        self.ticks += 1;

        let index = self.cursor;
        if self.cursor + 1 >= self.path.len() {
            self.state = PlaybackState::Idle;
            self.cursor = 0;
            tracing::debug!(ticks = self.ticks, "Playback finished");
        }

        Some(PlaybackStep {
            tick: self.ticks,
            index,
            state: self.state,
        })
    }

    /// Tick with the ball marker and capture the resulting frame.
    pub fn tick_frame(&mut self, ball: &mut BallMarker) -> Option<PlaybackFrame> {
        self.tick(ball).map(|step| PlaybackFrame::new(step, ball))
    }
}
