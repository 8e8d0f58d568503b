use serde::{Deserialize, Serialize};

use crate::geometry::Vec3;

/// Where the ball pitched relative to the batter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryLength {
    Yorker,
    Full,
    #[default]
    GoodLength,
    BackOfLength,
    Short,
}

impl DeliveryLength {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Yorker => "Yorker",
            Self::Full => "Full",
            Self::GoodLength => "Good Length",
            Self::BackOfLength => "Back of Length",
            Self::Short => "Short",
        }
    }
}

/// Line of the delivery as it reaches the stumps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryLine {
    WideOutsideOff,
    OutsideOff,
    #[default]
    OffStump,
    MiddleStump,
    LegStump,
    DownLeg,
}

impl DeliveryLine {
    pub fn label(&self) -> &'static str {
        match self {
            Self::WideOutsideOff => "Wide Outside Off",
            Self::OutsideOff => "Outside Off",
            Self::OffStump => "Off Stump",
            Self::MiddleStump => "Middle Stump",
            Self::LegStump => "Leg Stump",
            Self::DownLeg => "Down Leg",
        }
    }
}

/// Seam orientation at release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeamOrientation {
    Upright,
    Scrambled,
}

impl SeamOrientation {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Upright => "Upright",
            Self::Scrambled => "Scrambled",
        }
    }
}

/// Scalar statistics attached to a trajectory. Drawn once per generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeliveryStats {
    pub speed_kmh: f32,
    pub spin_rpm: f32,
    /// Lateral movement in meters; sign gives direction.
    pub swing_m: f32,
    pub bounce_angle_deg: f32,
    pub release_angle_deg: f32,
    pub length: DeliveryLength,
    pub line: DeliveryLine,
    pub seam: SeamOrientation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrajectoryError {
    EmptyPath,
    NonFinitePoint(usize),
    NonFiniteReference,
    NonFiniteStat(&'static str),
    NegativeStat { field: &'static str, value: f32 },
}

impl std::fmt::Display for TrajectoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPath => write!(f, "trajectory has no points"),
            Self::NonFinitePoint(i) => write!(f, "point {i} has a non-finite coordinate"),
            Self::NonFiniteReference => write!(f, "release or pitching point is not finite"),
            Self::NonFiniteStat(field) => write!(f, "{field} is not finite"),
            Self::NegativeStat { field, value } => {
                write!(f, "{field} must be non-negative, got {value}")
            },
        }
    }
}

impl std::error::Error for TrajectoryError {}

/// A simulated ball flight: sampled path plus fixed delivery statistics.
///
/// Immutable once built. Construction goes through [`Trajectory::new`], which
/// rejects empty paths, non-finite values, and negative magnitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTrajectory")]
pub struct Trajectory {
    points: Vec<Vec3>,
    release_point: Vec3,
    pitching_point: Vec3,
    stats: DeliveryStats,
}

#[derive(Deserialize)]
struct RawTrajectory {
    points: Vec<Vec3>,
    release_point: Vec3,
    pitching_point: Vec3,
    stats: DeliveryStats,
}

impl TryFrom<RawTrajectory> for Trajectory {
    type Error = TrajectoryError;

    fn try_from(raw: RawTrajectory) -> Result<Self, Self::Error> {
        Trajectory::new(raw.points, raw.release_point, raw.pitching_point, raw.stats)
    }
}

impl Trajectory {
    pub fn new(
        points: Vec<Vec3>,
        release_point: Vec3,
        pitching_point: Vec3,
        stats: DeliveryStats,
    ) -> Result<Self, TrajectoryError> {
        if points.is_empty() {
            return Err(TrajectoryError::EmptyPath);
        }
        if let Some(i) = points.iter().position(|p| !p.is_finite()) {
            return Err(TrajectoryError::NonFinitePoint(i));
        }
        if !release_point.is_finite() || !pitching_point.is_finite() {
            return Err(TrajectoryError::NonFiniteReference);
        }
        validate_stats(&stats)?;
        Ok(Self {
            points,
            release_point,
            pitching_point,
            stats,
        })
    }

    /// Build from parts already known to satisfy the invariants.
    pub(crate) fn from_validated_parts(
        points: Vec<Vec3>,
        release_point: Vec3,
        pitching_point: Vec3,
        stats: DeliveryStats,
    ) -> Self {
        debug_assert!(!points.is_empty());
        debug_assert!(validate_stats(&stats).is_ok());
        Self {
            points,
            release_point,
            pitching_point,
            stats,
        }
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn release_point(&self) -> Vec3 {
        self.release_point
    }

    pub fn pitching_point(&self) -> Vec3 {
        self.pitching_point
    }

    pub fn stats(&self) -> &DeliveryStats {
        &self.stats
    }
}

fn validate_stats(stats: &DeliveryStats) -> Result<(), TrajectoryError> {
    let magnitudes = [
        ("speed_kmh", stats.speed_kmh),
        ("spin_rpm", stats.spin_rpm),
        ("bounce_angle_deg", stats.bounce_angle_deg),
        ("release_angle_deg", stats.release_angle_deg),
    ];
    for (field, value) in magnitudes {
        if !value.is_finite() {
            return Err(TrajectoryError::NonFiniteStat(field));
        }
        if value < 0.0 {
            return Err(TrajectoryError::NegativeStat { field, value });
        }
    }
    if !stats.swing_m.is_finite() {
        return Err(TrajectoryError::NonFiniteStat("swing_m"));
    }
    Ok(())
}
