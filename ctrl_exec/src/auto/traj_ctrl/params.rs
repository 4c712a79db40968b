//! Trajectory control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::auto::limits::Limits;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for trajectory control
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Params {
    /// Position (X and Y) controller proportional gain
    pub pos_k_p: f64,

    /// Heading controller proportional gain
    pub head_k_p: f64,

    /// Maximum rate of change of the X and Y feedback terms. Zero disables slew limiting.
    pub lin_slew_rate_mss: f64,

    /// Maximum rate of change of the heading feedback term. Zero disables slew limiting.
    pub ang_slew_rate_radss: f64,

    /// Time allowed after the end of the trajectory for the robot to settle onto the goal
    pub settle_time_s: f64,

    /// Kinematic limits of the robot, used both to build trajectories and to saturate commands
    pub limits: Limits,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            pos_k_p: 2.0,
            head_k_p: 4.0,
            lin_slew_rate_mss: 0.0,
            ang_slew_rate_radss: 0.0,
            settle_time_s: 1.0,
            limits: Limits::default(),
        }
    }
}
