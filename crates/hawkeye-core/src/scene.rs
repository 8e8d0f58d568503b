use serde::Serialize;

use crate::geometry::Vec3;
use crate::trajectory::Trajectory;

/// Ball radius in world units (meters).
pub const BALL_RADIUS: f32 = 0.036;
/// Radius of the release and pitching markers.
pub const POINT_MARKER_RADIUS: f32 = 0.08;
/// Creases at either end of the pitch (z).
pub const CREASE_Z: [f32; 2] = [0.0, -18.0];

const STUMP_OFFSETS_X: [f32; 3] = [-0.11, 0.0, 0.11];
const STUMP_HEIGHT: f32 = 0.71;
const STUMP_RADIUS: f32 = 0.015;
const BAIL_HEIGHT: f32 = 0.72;
const BAIL_WIDTH: f32 = 0.25;
const CREASE_HALF_WIDTH: f32 = 0.6;
const GRID_HALF_WIDTH: f32 = 1.0;
const GRID_SPACING: f32 = 3.0;
const GRID_LINES: usize = 7;
/// Lines sit just above the pitch surface so they are not z-fought.
const LINE_LIFT: f32 = 0.02;

/// A flat rectangle lying on the ground, centred at `center`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundPlane {
    pub center: Vec3,
    pub width: f32,
    pub depth: f32,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub a: Vec3,
    pub b: Vec3,
}

/// Vertical cylinder; `base` is the ground contact point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stump {
    pub base: Vec3,
    pub height: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PointMarkerKind {
    Release,
    Pitching,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointMarker {
    pub kind: PointMarkerKind,
    pub position: Vec3,
    pub radius: f32,
    pub color: &'static str,
}

/// Everything a renderer needs to draw the replay, as plain data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub ground: GroundPlane,
    pub pitch: GroundPlane,
    pub stumps: Vec<Stump>,
    /// One bail bar across the top of each set of stumps.
    pub bails: Vec<Segment>,
    pub crease_lines: Vec<Segment>,
    pub grid_lines: Vec<Segment>,
    /// Full flight path as a polyline; empty before analysis.
    pub trajectory_line: Vec<Vec3>,
    pub markers: Vec<PointMarker>,
    pub ball_radius: f32,
}

impl Scene {
    /// Scene for the current analysis result, or the bare pitch without one.
    pub fn for_trajectory(trajectory: Option<&Trajectory>) -> Self {
        let mut scene = Self::pitch_only();
        if let Some(t) = trajectory {
            scene.trajectory_line = t.points().to_vec();
            scene.markers = vec![
                PointMarker {
                    kind: PointMarkerKind::Pitching,
                    position: t.pitching_point(),
                    radius: POINT_MARKER_RADIUS,
                    color: "#ffff00",
                },
                PointMarker {
                    kind: PointMarkerKind::Release,
                    position: t.release_point(),
                    radius: POINT_MARKER_RADIUS,
                    color: "#00ffff",
                },
            ];
        }
        scene
    }

    fn pitch_only() -> Self {
        let mut stumps = Vec::with_capacity(CREASE_Z.len() * STUMP_OFFSETS_X.len());
        let mut bails = Vec::with_capacity(CREASE_Z.len());
        let mut crease_lines = Vec::with_capacity(CREASE_Z.len());
        for z in CREASE_Z {
            for x in STUMP_OFFSETS_X {
                stumps.push(Stump {
                    base: Vec3::new(x, 0.0, z),
                    height: STUMP_HEIGHT,
                    radius: STUMP_RADIUS,
                });
            }
            bails.push(Segment {
                a: Vec3::new(-BAIL_WIDTH / 2.0, BAIL_HEIGHT, z),
                b: Vec3::new(BAIL_WIDTH / 2.0, BAIL_HEIGHT, z),
            });
            crease_lines.push(Segment {
                a: Vec3::new(-CREASE_HALF_WIDTH, LINE_LIFT, z),
                b: Vec3::new(CREASE_HALF_WIDTH, LINE_LIFT, z),
            });
        }

        let grid_lines = (0..GRID_LINES)
            .map(|i| {
                let z = -GRID_SPACING * i as f32;
                Segment {
                    a: Vec3::new(-GRID_HALF_WIDTH, LINE_LIFT, z),
                    b: Vec3::new(GRID_HALF_WIDTH, LINE_LIFT, z),
                }
            })
            .collect();

        Self {
            ground: GroundPlane {
                center: Vec3::new(0.0, 0.0, -9.0),
                width: 20.0,
                depth: 30.0,
                color: "#2d5016",
            },
            pitch: GroundPlane {
                center: Vec3::new(0.0, 0.01, -9.0),
                width: 1.2,
                depth: 22.0,
                color: "#8b7355",
            },
            stumps,
            bails,
            crease_lines,
            grid_lines,
            trajectory_line: Vec::new(),
            markers: Vec::new(),
            ball_radius: BALL_RADIUS,
        }
    }
}
