//! SE(2) point to point trajectory

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use nalgebra::Vector2;
use serde::Serialize;
use util::maths::{get_ang_dist, normalize_or_zero, wrap_to_pi};

use super::{TrajError, Trajectory, TrajectorySample, TrapezoidProfile};
use crate::auto::{
    limits::{Goal2, Limits},
    loc::{Pose2, State2, Twist2},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Straight line motion from a start pose to a goal, rotating on the spot as it goes.
#[derive(Debug, Clone, Serialize)]
pub struct TrapezoidalTrajectory {
    start: Pose2,
    goal: Goal2,

    /// Unit vector from start to goal position, zero if they coincide
    direction: Vector2<f64>,

    /// +1 for anticlockwise rotation, -1 for clockwise
    rot_sign: f64,

    lin: TrapezoidProfile,
    ang: TrapezoidProfile,

    t0_s: f64,
    tf_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrapezoidalTrajectory {
    /// Build the trajectory from the start state's pose and time to the goal pose.
    ///
    /// The linear and angular velocity and acceleration limits must all be positive and finite.
    /// The start twist is ignored, motion always begins and ends at rest.
    pub fn new(start: &State2, goal: &Goal2, limits: &Limits) -> Result<Self, TrajError> {
        check_limit("max_vel_ms", limits.max_vel_ms)?;
        check_limit("max_acc_mss", limits.max_acc_mss)?;
        check_limit("max_ang_vel_rads", limits.max_ang_vel_rads)?;
        check_limit("max_ang_acc_radss", limits.max_ang_acc_radss)?;

        let delta = goal.pose.position_m - start.pose.position_m;
        let ang_dist = get_ang_dist(start.pose.heading_rad(), goal.pose.heading_rad());

        let lin = TrapezoidProfile::new(delta.norm(), limits.max_vel_ms, limits.max_acc_mss);
        let ang = TrapezoidProfile::new(
            ang_dist.abs(),
            limits.max_ang_vel_rads,
            limits.max_ang_acc_radss,
        );

        let t0_s = start.t_s;
        let tf_s = t0_s + lin.duration().max(ang.duration());

        trace!(
            "Trajectory over {:.3} m, {:.3} rad: t_lin = {:.3} s, t_ang = {:.3} s",
            lin.distance(),
            ang_dist,
            lin.duration(),
            ang.duration()
        );

        Ok(Self {
            start: start.pose,
            goal: *goal,
            direction: normalize_or_zero(&delta),
            rot_sign: if ang_dist >= 0.0 { 1.0 } else { -1.0 },
            lin,
            ang,
            t0_s,
            tf_s,
        })
    }

    pub fn start(&self) -> &Pose2 {
        &self.start
    }

    pub fn goal(&self) -> &Goal2 {
        &self.goal
    }

    /// The translation profile
    pub fn lin_profile(&self) -> &TrapezoidProfile {
        &self.lin
    }

    /// The rotation profile
    pub fn ang_profile(&self) -> &TrapezoidProfile {
        &self.ang
    }
}

impl Trajectory for TrapezoidalTrajectory {
    fn t0_s(&self) -> f64 {
        self.t0_s
    }

    fn tf_s(&self) -> f64 {
        self.tf_s
    }

    fn sample(&self, t_s: f64) -> TrajectorySample {
        let tau = t_s - self.t0_s;

        if tau <= 0.0 {
            return TrajectorySample {
                pose: self.start,
                twist: Twist2::zero(),
                t_s,
            };
        }
        if t_s >= self.tf_s {
            return TrajectorySample {
                pose: self.goal.pose,
                twist: Twist2::zero(),
                t_s,
            };
        }

        // Each profile holds its final value once its own duration has passed
        let (s_lin, v_lin) = self.lin.sample(tau);
        let (s_ang, v_ang) = self.ang.sample(tau);

        TrajectorySample {
            pose: Pose2::new(
                self.start.position_m + self.direction * s_lin,
                wrap_to_pi(self.start.heading_rad() + self.rot_sign * s_ang),
            ),
            twist: Twist2::new(self.direction * v_lin, self.rot_sign * v_ang),
            t_s,
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn check_limit(name: &'static str, value: f64) -> Result<(), TrajError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TrajError::InvalidLimits(name, value))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
