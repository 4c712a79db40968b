//! # Trajectory controllers module
//!
//! This module provides the proportional controllers used by TrajCtrl: a scalar [`PController`]
//! with deadband, output saturation and slew rate limiting, and the [`Se2Controller`] which
//! combines three of them to track a full pose.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Serialize;
use util::maths::{clamp, clamp_norm, get_ang_dist};

// Internal
use super::Command2;
use crate::auto::{
    limits::Limits,
    loc::{Pose2, Twist2},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A proportional controller
///
/// The controller remembers its previous output for slew rate limiting, so one instance must be
/// used per controlled axis.
#[derive(Debug, Serialize, Clone)]
pub struct PController {
    /// Proportional gain
    k_p: f64,

    /// Minimum output
    u_min: f64,

    /// Maximum output
    u_max: f64,

    /// Errors with a magnitude at or below this produce zero output
    deadband: f64,

    /// Maximum change in output per second, zero for no limit
    max_delta_per_s: f64,

    /// Previous output
    last_u: f64,
}

/// Pose tracking controller
#[derive(Debug, Serialize, Clone)]
pub struct Se2Controller {
    /// World X position controller
    x_ctrl: PController,

    /// World Y position controller
    y_ctrl: PController,

    /// Heading controller
    head_ctrl: PController,

    max_vel_ms: f64,

    max_ang_vel_rads: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CtrlError {
    #[error("Controller output range is invalid, min ({min}) is above max ({max})")]
    InvalidOutputRange { min: f64, max: f64 },

    #[error("Controller deadband must not be negative, got {0}")]
    NegativeDeadband(f64),

    #[error("Controller slew rate must not be negative, got {0}")]
    NegativeSlewRate(f64),

    #[error("Controller time step must be positive, got {0}")]
    NonPositiveDt(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PController {
    /// Create a new controller.
    pub fn new(
        k_p: f64,
        u_min: f64,
        u_max: f64,
        deadband: f64,
        max_delta_per_s: f64,
    ) -> Result<Self, CtrlError> {
        if !(u_min <= u_max) {
            return Err(CtrlError::InvalidOutputRange {
                min: u_min,
                max: u_max,
            });
        }
        if !(deadband >= 0.0) {
            return Err(CtrlError::NegativeDeadband(deadband));
        }
        if !(max_delta_per_s >= 0.0) {
            return Err(CtrlError::NegativeSlewRate(max_delta_per_s));
        }

        Ok(Self {
            k_p,
            u_min,
            u_max,
            deadband,
            max_delta_per_s,
            last_u: 0.0,
        })
    }

    /// Get the controller output for the given setpoint and measurement.
    pub fn update(&mut self, setpoint: f64, measurement: f64, dt_s: f64) -> Result<f64, CtrlError> {
        self.update_error(setpoint - measurement, dt_s)
    }

    /// Get the controller output for an already computed error.
    ///
    /// Used where the error is not a plain difference, for instance wrapped angles.
    pub fn update_error(&mut self, error: f64, dt_s: f64) -> Result<f64, CtrlError> {
        if !(dt_s > 0.0) {
            return Err(CtrlError::NonPositiveDt(dt_s));
        }

        let target = if error.abs() <= self.deadband {
            0.0
        } else {
            self.k_p * error
        };

        let mut u = clamp(target, self.u_min, self.u_max);

        if self.max_delta_per_s > 0.0 {
            let max_delta = self.max_delta_per_s * dt_s;
            u = clamp(u, self.last_u - max_delta, self.last_u + max_delta);
        }

        self.last_u = u;
        Ok(u)
    }

    /// The output of the last update.
    pub fn last_output(&self) -> f64 {
        self.last_u
    }

    /// Forget the previous output, so the next update slews from zero.
    pub fn reset(&mut self) {
        self.last_u = 0.0;
    }
}

impl Se2Controller {
    /// Create a new controller without slew rate limiting.
    pub fn new(pos_k_p: f64, head_k_p: f64, limits: &Limits) -> Result<Self, CtrlError> {
        Self::with_slew_rates(pos_k_p, head_k_p, 0.0, 0.0, limits)
    }

    /// Create a new controller with slew rate limits on the feedback terms.
    ///
    /// The linear rate applies to the X and Y terms separately.
    pub fn with_slew_rates(
        pos_k_p: f64,
        head_k_p: f64,
        lin_slew_rate_mss: f64,
        ang_slew_rate_radss: f64,
        limits: &Limits,
    ) -> Result<Self, CtrlError> {
        let v = limits.max_vel_ms;
        let w = limits.max_ang_vel_rads;

        Ok(Self {
            x_ctrl: PController::new(pos_k_p, -v, v, limits.vel_deadband_ms, lin_slew_rate_mss)?,
            y_ctrl: PController::new(pos_k_p, -v, v, limits.vel_deadband_ms, lin_slew_rate_mss)?,
            head_ctrl: PController::new(
                head_k_p,
                -w,
                w,
                limits.ang_deadband_rad,
                ang_slew_rate_radss,
            )?,
            max_vel_ms: v,
            max_ang_vel_rads: w,
        })
    }

    /// Calculate the command to drive the measured pose onto the reference.
    pub fn update(
        &mut self,
        measured: &Pose2,
        ref_pose: &Pose2,
        ref_twist: &Twist2,
        dt_s: f64,
    ) -> Result<Command2, CtrlError> {
        // Position, in the world frame
        let vx = self
            .x_ctrl
            .update(ref_pose.position_m[0], measured.position_m[0], dt_s)?;
        let vy = self
            .y_ctrl
            .update(ref_pose.position_m[1], measured.position_m[1], dt_s)?;

        let linear_ms = clamp_norm(
            &(Vector2::new(vx, vy) + ref_twist.linear_ms),
            self.max_vel_ms,
        );

        // Heading
        let head_err_rad = get_ang_dist(measured.heading_rad(), ref_pose.heading_rad());
        let omega = self.head_ctrl.update_error(head_err_rad, dt_s)?;
        let angular_rads = clamp(
            omega + ref_twist.angular_rads,
            -self.max_ang_vel_rads,
            self.max_ang_vel_rads,
        );

        Ok(Command2::new(linear_ms, angular_rads))
    }

    /// Reset the slew rate memory of all axes.
    pub fn reset(&mut self) {
        self.x_ctrl.reset();
        self.y_ctrl.reset();
        self.head_ctrl.reset();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
