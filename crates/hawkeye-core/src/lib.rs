pub mod generator;
pub mod geometry;
pub mod playback;
pub mod random;
pub mod scene;
pub mod session;
pub mod stats;
pub mod trajectory;
pub mod upload;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::geometry::Vec3;
    use crate::random::RandomSource;
    use crate::trajectory::{
        DeliveryLength, DeliveryLine, DeliveryStats, SeamOrientation, Trajectory,
    };
    use crate::upload::{DEFAULT_MAX_UPLOAD_BYTES, VideoHandle, accept_video};

    /// Random source that replays a fixed script of unit draws, cycling when
    /// exhausted.
    pub struct ScriptedSource {
        values: Vec<f32>,
        next: usize,
    }

    impl ScriptedSource {
        pub fn new(values: Vec<f32>) -> Self {
            assert!(!values.is_empty(), "script must have at least one value");
            Self { values, next: 0 }
        }

        pub fn constant(value: f32) -> Self {
            Self::new(vec![value])
        }
    }

    impl RandomSource for ScriptedSource {
        fn next_unit(&mut self) -> f32 {
            let v = self.values[self.next % self.values.len()];
            self.next += 1;
            v
        }
    }

    /// Mid-range statistics for tests that only care about the path.
    pub fn sample_stats() -> DeliveryStats {
        DeliveryStats {
            speed_kmh: 142.5,
            spin_rpm: 450.0,
            swing_m: 0.1,
            bounce_angle_deg: 16.0,
            release_angle_deg: 10.0,
            length: DeliveryLength::GoodLength,
            line: DeliveryLine::OffStump,
            seam: SeamOrientation::Upright,
        }
    }

    /// Trajectory over an arbitrary non-empty path with [`sample_stats`].
    pub fn make_trajectory(points: Vec<Vec3>) -> Trajectory {
        let release = points[0];
        let pitching = points[points.len() / 2];
        Trajectory::new(points, release, pitching, sample_stats())
            .expect("test trajectory must be valid")
    }

    /// Accepted mp4 handle with the given file name.
    pub fn make_video(file_name: &str) -> VideoHandle {
        accept_video(file_name, "video/mp4", 1024, DEFAULT_MAX_UPLOAD_BYTES)
            .expect("test video must be accepted")
    }
}
