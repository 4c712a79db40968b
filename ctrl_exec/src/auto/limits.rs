//! # Motion limits and goals
//!
//! [`Limits`] bounds the speeds and accelerations a trajectory may command, and [`Goal2`] describes
//! where a motion should end and how close is close enough.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use util::maths::get_ang_dist;

use super::loc::Pose2;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default position tolerance of a stop goal
pub const STOP_POS_TOL_M: f64 = 0.002;

/// Default heading tolerance of a stop goal (0.5 degrees)
pub const STOP_HEADING_TOL_RAD: f64 = 0.5 * std::f64::consts::PI / 180.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematic limits of a robot.
///
/// Jerk limits are carried for completeness but no profile currently uses them.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_vel_ms: f64,
    pub max_acc_mss: f64,
    pub max_jerk_msss: f64,

    pub max_ang_vel_rads: f64,
    pub max_ang_acc_radss: f64,
    pub max_ang_jerk_radsss: f64,

    /// Linear speed error below which no correction is commanded
    pub vel_deadband_ms: f64,

    /// Angular error below which no correction is commanded
    pub ang_deadband_rad: f64,
}

/// The target of a motion.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Goal2 {
    pub pose: Pose2,

    /// Desired linear speed on arrival. Profiles currently always finish at rest.
    pub end_speed_ms: f64,

    /// Desired angular rate on arrival.
    pub end_ang_rate_rads: f64,

    pos_tol_m: f64,

    heading_tol_rad: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GoalError {
    #[error("Goal position tolerance must be positive, got {0}")]
    NonPositivePosTol(f64),

    #[error("Goal heading tolerance must be positive, got {0}")]
    NonPositiveHeadingTol(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_vel_ms: 4.0,
            max_acc_mss: 3.0,
            max_jerk_msss: 0.0,
            max_ang_vel_rads: 8.0,
            max_ang_acc_radss: 20.0,
            max_ang_jerk_radsss: 0.0,
            vel_deadband_ms: 0.0,
            ang_deadband_rad: 0.0,
        }
    }
}

impl Goal2 {
    /// Create a new goal.
    ///
    /// Both tolerances must be strictly positive (NaN is rejected too).
    pub fn new(
        pose: Pose2,
        end_speed_ms: f64,
        end_ang_rate_rads: f64,
        pos_tol_m: f64,
        heading_tol_rad: f64,
    ) -> Result<Self, GoalError> {
        if !(pos_tol_m > 0.0) {
            return Err(GoalError::NonPositivePosTol(pos_tol_m));
        }
        if !(heading_tol_rad > 0.0) {
            return Err(GoalError::NonPositiveHeadingTol(heading_tol_rad));
        }

        Ok(Self {
            pose,
            end_speed_ms,
            end_ang_rate_rads,
            pos_tol_m,
            heading_tol_rad,
        })
    }

    /// A goal to come to rest at `pose` with the default stop tolerances.
    pub fn stop(pose: Pose2) -> Self {
        Self {
            pose,
            end_speed_ms: 0.0,
            end_ang_rate_rads: 0.0,
            pos_tol_m: STOP_POS_TOL_M,
            heading_tol_rad: STOP_HEADING_TOL_RAD,
        }
    }

    pub fn pos_tol_m(&self) -> f64 {
        self.pos_tol_m
    }

    pub fn heading_tol_rad(&self) -> f64 {
        self.heading_tol_rad
    }

    /// Returns true if `pose` is within both tolerances of the goal pose.
    pub fn is_reached(&self, pose: &Pose2) -> bool {
        let pos_err_m = (self.pose.position_m - pose.position_m).norm();
        let head_err_rad = get_ang_dist(pose.heading_rad(), self.pose.heading_rad()).abs();

        pos_err_m <= self.pos_tol_m && head_err_rad <= self.heading_tol_rad
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::Vector2;

    #[test]
    fn test_goal_tolerances_validated() {
        let pose = Pose2::new(Vector2::new(1.0, 1.0), 0.0);

        assert_eq!(
            Goal2::new(pose, 0.0, 0.0, 0.0, 0.1),
            Err(GoalError::NonPositivePosTol(0.0))
        );
        assert_eq!(
            Goal2::new(pose, 0.0, 0.0, 0.01, -0.1),
            Err(GoalError::NonPositiveHeadingTol(-0.1))
        );
        assert!(Goal2::new(pose, 0.0, 0.0, f64::NAN, 0.1).is_err());
        assert!(Goal2::new(pose, 0.0, 0.0, 0.01, 0.1).is_ok());
    }

    #[test]
    fn test_stop_goal() {
        let goal = Goal2::stop(Pose2::new(Vector2::new(2.0, -1.0), 1.0));
        assert_eq!(goal.end_speed_ms, 0.0);
        assert_eq!(goal.end_ang_rate_rads, 0.0);
        assert_eq!(goal.pos_tol_m(), 0.002);
        assert!((goal.heading_tol_rad() - 0.5f64.to_radians()).abs() < 1e-15);
    }

    #[test]
    fn test_is_reached() {
        let goal = Goal2::stop(Pose2::new(Vector2::new(2.0, -1.0), std::f64::consts::PI));

        assert!(goal.is_reached(&Pose2::new(Vector2::new(2.001, -1.0), -std::f64::consts::PI + 0.001)));
        assert!(!goal.is_reached(&Pose2::new(Vector2::new(2.01, -1.0), std::f64::consts::PI)));
        assert!(!goal.is_reached(&Pose2::new(Vector2::new(2.0, -1.0), 3.0)));
    }

    #[test]
    fn test_limits_partial_params() {
        let limits: Limits = util::params::from_str("max_vel_ms = 2.0").unwrap();
        assert_eq!(limits.max_vel_ms, 2.0);
        assert_eq!(limits.max_acc_mss, Limits::default().max_acc_mss);
        assert_eq!(limits.max_ang_vel_rads, 8.0);
        assert_eq!(limits.max_ang_acc_radss, 20.0);
    }
}
