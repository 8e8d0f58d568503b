use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::geometry::{Vec3, lerp};
use crate::random::RandomSource;
use crate::trajectory::{DeliveryLength, DeliveryLine, DeliveryStats, SeamOrientation, Trajectory};

/// Closed range a statistic is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatRange {
    pub min: f32,
    pub max: f32,
}

impl StatRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn sample(&self, rng: &mut impl RandomSource) -> f32 {
        rng.uniform(self.min, self.max)
    }
}

/// Shape and statistic ranges for generated deliveries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub release_point: Vec3,
    /// First ground contact.
    pub pitch_point: Vec3,
    /// Where the sampled path ends after the bounce.
    pub final_point: Vec3,
    /// Peak of the post-bounce arc above the straight pitch-to-final line.
    pub bounce_height: f32,
    pub gravity: f32,
    /// Minimum height of pre-bounce samples.
    pub ground_clearance: f32,
    /// Normalized time at which the ball pitches.
    pub bounce_split: f32,
    pub num_points: usize,
    pub speed_kmh: StatRange,
    pub swing_m: StatRange,
    pub spin_rpm: StatRange,
    pub bounce_angle_deg: StatRange,
    pub release_angle_deg: StatRange,
    pub length: DeliveryLength,
    pub line: DeliveryLine,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            release_point: Vec3::new(0.0, 2.5, 0.0),
            pitch_point: Vec3::new(0.0, 0.1, -12.0),
            final_point: Vec3::new(-0.3, 0.8, -18.0),
            bounce_height: 1.8,
            gravity: 9.8,
            ground_clearance: 0.05,
            bounce_split: 0.6,
            num_points: 100,
            speed_kmh: StatRange::new(135.0, 150.0),
            swing_m: StatRange::new(-0.4, 0.4),
            spin_rpm: StatRange::new(200.0, 700.0),
            bounce_angle_deg: StatRange::new(12.0, 20.0),
            release_angle_deg: StatRange::new(8.0, 12.0),
            length: DeliveryLength::GoodLength,
            line: DeliveryLine::OffStump,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    TooFewPoints(usize),
    SplitOutOfRange(f32),
    NonFinite(&'static str),
    InvertedRange(&'static str),
    NegativeRange(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewPoints(n) => write!(f, "num_points must be at least 2, got {n}"),
            Self::SplitOutOfRange(s) => write!(f, "bounce_split must be in (0, 1), got {s}"),
            Self::NonFinite(field) => write!(f, "{field} is not finite"),
            Self::InvertedRange(field) => write!(f, "{field}: min exceeds max"),
            Self::NegativeRange(field) => write!(f, "{field}: range must be non-negative"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_points < 2 {
            return Err(ConfigError::TooFewPoints(self.num_points));
        }
        if !(self.bounce_split > 0.0 && self.bounce_split < 1.0) {
            return Err(ConfigError::SplitOutOfRange(self.bounce_split));
        }

        let points = [
            ("release_point", self.release_point),
            ("pitch_point", self.pitch_point),
            ("final_point", self.final_point),
        ];
        for (field, p) in points {
            if !p.is_finite() {
                return Err(ConfigError::NonFinite(field));
            }
        }
        let scalars = [
            ("bounce_height", self.bounce_height),
            ("gravity", self.gravity),
            ("ground_clearance", self.ground_clearance),
        ];
        for (field, v) in scalars {
            if !v.is_finite() {
                return Err(ConfigError::NonFinite(field));
            }
        }

        let ranges = [
            ("speed_kmh", self.speed_kmh, true),
            ("swing_m", self.swing_m, false),
            ("spin_rpm", self.spin_rpm, true),
            ("bounce_angle_deg", self.bounce_angle_deg, true),
            ("release_angle_deg", self.release_angle_deg, true),
        ];
        for (field, range, non_negative) in ranges {
            if !range.min.is_finite() || !range.max.is_finite() {
                return Err(ConfigError::NonFinite(field));
            }
            if range.min > range.max {
                return Err(ConfigError::InvertedRange(field));
            }
            if non_negative && range.min < 0.0 {
                return Err(ConfigError::NegativeRange(field));
            }
        }
        Ok(())
    }
}

/// Produces simulated deliveries from a validated [`GeneratorConfig`].
///
/// The path is a fixed two-phase curve: a gravity-bent line from release to
/// the pitch, then a half-sine bounce arc towards the final point. Only the
/// statistics consume randomness.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryGenerator {
    config: GeneratorConfig,
}

impl TrajectoryGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Sample the flight path at `num_points` uniform normalized times.
    pub fn path(&self) -> Vec<Vec3> {
        let c = &self.config;
        let last = (c.num_points - 1) as f32;
        (0..c.num_points)
            .map(|i| self.sample(i as f32 / last))
            .collect()
    }

    /// Position at normalized time `t` in `[0, 1]`.
    pub fn sample(&self, t: f32) -> Vec3 {
        let c = &self.config;
        let (release, pitch, end) = (c.release_point, c.pitch_point, c.final_point);

        if t < c.bounce_split {
            let s = t / c.bounce_split;
            let y = lerp(release.y, pitch.y, s) - 0.5 * c.gravity * s * s;
            Vec3::new(
                lerp(release.x, pitch.x, s),
                y.max(c.ground_clearance),
                lerp(release.z, pitch.z, s),
            )
        } else {
            let s = (t - c.bounce_split) / (1.0 - c.bounce_split);
            let bounce_y = c.bounce_height * (s * std::f32::consts::PI).sin();
            Vec3::new(
                lerp(pitch.x, end.x, s),
                pitch.y + bounce_y + (end.y - pitch.y) * s,
                lerp(pitch.z, end.z, s),
            )
        }
    }

    /// Draw one set of statistics.
    ///
    /// Draw order is speed, swing, spin, bounce angle, release angle, seam.
    pub fn stats(&self, rng: &mut impl RandomSource) -> DeliveryStats {
        let c = &self.config;
        let speed_kmh = c.speed_kmh.sample(rng);
        let swing_m = c.swing_m.sample(rng);
        let spin_rpm = c.spin_rpm.sample(rng);
        let bounce_angle_deg = c.bounce_angle_deg.sample(rng);
        let release_angle_deg = c.release_angle_deg.sample(rng);
        let seam = if rng.next_unit() > 0.5 {
            SeamOrientation::Upright
        } else {
            SeamOrientation::Scrambled
        };
        DeliveryStats {
            speed_kmh,
            spin_rpm,
            swing_m,
            bounce_angle_deg,
            release_angle_deg,
            length: c.length,
            line: c.line,
            seam,
        }
    }

    pub fn generate(&self, rng: &mut impl RandomSource) -> Trajectory {
        let points = self.path();
        let stats = self.stats(rng);
        tracing::debug!(
            points = points.len(),
            speed_kmh = stats.speed_kmh,
            spin_rpm = stats.spin_rpm,
            seam = stats.seam.label(),
            "Generated trajectory"
        );
        Trajectory::from_validated_parts(
            points,
            self.config.release_point,
            self.config.pitch_point,
            stats,
        )
    }

    /// Index of the last sample before the bounce.
    pub fn pitch_index(&self) -> usize {
        let last = (self.config.num_points - 1) as f32;
        (self.config.bounce_split * last).floor() as usize
    }
}

/// Generate a delivery with the default shape and a fresh thread RNG.
pub fn generate() -> Trajectory {
    TrajectoryGenerator::default().generate(&mut rand::rng())
}

/// Generate a reproducible delivery from a seed.
pub fn generate_seeded(seed: u64) -> Trajectory {
    let mut rng = StdRng::seed_from_u64(seed);
    TrajectoryGenerator::default().generate(&mut rng)
}
