use serde::Serialize;

use crate::trajectory::Trajectory;

/// One labelled value in the results panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatLine {
    pub label: &'static str,
    pub value: String,
}

/// Display-ready statistics for a trajectory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsPanel {
    pub length: &'static str,
    pub line: &'static str,
    pub stats: Vec<StatLine>,
    pub seam: &'static str,
}

impl StatsPanel {
    pub fn from_trajectory(trajectory: &Trajectory) -> Self {
        let s = trajectory.stats();
        let stats = vec![
            StatLine {
                label: "Speed",
                value: format!("{:.1} km/h", s.speed_kmh),
            },
            StatLine {
                label: "Spin Rate",
                value: format!("{:.0} rpm", s.spin_rpm),
            },
            // Direction is dropped for display.
            StatLine {
                label: "Swing",
                value: format!("{:.2}m", s.swing_m.abs()),
            },
            StatLine {
                label: "Bounce Angle",
                value: format!("{:.1}°", s.bounce_angle_deg),
            },
            StatLine {
                label: "Release Angle",
                value: format!("{:.1}°", s.release_angle_deg),
            },
        ];
        Self {
            length: s.length.label(),
            line: s.line.label(),
            stats,
            seam: s.seam.label(),
        }
    }
}

impl std::fmt::Display for StatsPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:<14}{}", "Length", self.length)?;
        writeln!(f, "{:<14}{}", "Line", self.line)?;
        for stat in &self.stats {
            writeln!(f, "{:<14}{}", stat.label, stat.value)?;
        }
        write!(f, "{:<14}{}", "Seam Position", self.seam)
    }
}
