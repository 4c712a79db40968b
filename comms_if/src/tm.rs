//! # Telemetry Interface
//!
//! A [`TmSnapshot`] is a complete, serialisable picture of the world and of the controller
//! outputs at one control cycle. External tools (recorders, visualisers) consume it, the control
//! core only produces it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Telemetry snapshot for one control cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TmSnapshot {
    /// Wall clock time in seconds since the start of the session.
    pub t_s: f64,

    /// Capture time of the vision frame the world state was built from.
    pub t_vision_s: f64,

    pub ball: TmBall,

    /// One entry per team slot, including slots with no robot present.
    pub blue: Vec<TmRobot>,

    /// One entry per team slot, including slots with no robot present.
    pub yellow: Vec<TmRobot>,

    /// Controller outputs for each controlled robot.
    pub ctrl: Vec<TmCtrl>,
}

/// A 2D pose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TmPose {
    pub x_m: f64,
    pub y_m: f64,
    pub heading_rad: f64,
}

/// A 2D velocity twist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TmTwist {
    pub vx_ms: f64,
    pub vy_ms: f64,
    pub omega_rads: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TmBall {
    pub x_m: f64,
    pub y_m: f64,
    pub vx_ms: f64,
    pub vy_ms: f64,

    /// `false` if the ball was not seen in the last frame.
    pub valid: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TmRobot {
    pub id: u8,
    pub pose: TmPose,
    pub twist: TmTwist,
    pub present: bool,
}

/// The latest command computed for one controlled robot, along with the reference it tracked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TmCtrl {
    pub team: TmTeam,
    pub robot_id: u8,
    pub target_pose: TmPose,
    pub target_twist: TmTwist,
    pub output: TmTwist,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TmTeam {
    Blue,
    Yellow,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_team_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&TmTeam::Yellow).unwrap(), "\"yellow\"");
    }
}
