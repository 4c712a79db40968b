//! # Trajectories
//!
//! A trajectory is a time parameterised reference motion which trajectory control samples each
//! cycle. Motions between two poses are built as a [`TrapezoidalTrajectory`], in which the
//! translation and rotation each follow their own [`TrapezoidProfile`]. A sequence of waypoints,
//! such as a planned route, becomes a [`TrajectoryChain`] of such motions.
//!
//! The translation and rotation profiles are timed independently, so one axis may come to rest
//! before the other. The trajectory ends when the slower of the two completes.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod chain;
mod profile;
mod trapezoidal;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::loc::{Pose2, Twist2};

pub use chain::TrajectoryChain;
pub use profile::TrapezoidProfile;
pub use trapezoidal::TrapezoidalTrajectory;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A reference motion which can be sampled at any time.
pub trait Trajectory {
    /// Time at which the motion starts, in seconds
    fn t0_s(&self) -> f64;

    /// Time at which the motion ends, in seconds
    fn tf_s(&self) -> f64;

    /// Get the reference pose and twist at time `t_s`.
    ///
    /// Before the start this is the start pose at rest, after the end the final pose at rest.
    fn sample(&self, t_s: f64) -> TrajectorySample;

    fn duration_s(&self) -> f64 {
        self.tf_s() - self.t0_s()
    }
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The reference state of a trajectory at one instant.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct TrajectorySample {
    pub pose: Pose2,
    pub twist: Twist2,
    pub t_s: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TrajError {
    #[error("Limit {0} must be positive and finite, got {1}")]
    InvalidLimits(&'static str, f64),

    #[error("At least two waypoints are needed to build a trajectory, got {0}")]
    TooFewWaypoints(usize),
}
