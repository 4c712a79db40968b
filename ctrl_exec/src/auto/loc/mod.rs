//! # Localisation types
//!
//! Kinematic state of a body on the field: its [`Pose2`] (position and heading), its [`Twist2`]
//! (linear velocity and angular rate), and the timestamped [`State2`] combining the two.
//!
//! Positions are in meters and headings in radians in the field (world) frame. Headings are
//! always stored wrapped into (-pi, pi].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use util::maths::wrap_to_pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Position and heading of a body in the world frame.
///
/// Deserialised poses go through [`Pose2::new`], so their heading is wrapped too.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(from = "RawPose2")]
pub struct Pose2 {
    /// The position in the world frame
    pub position_m: Vector2<f64>,

    /// Heading (angle to the positive world X axis), in (-pi, pi]
    heading_rad: f64,
}

/// Pose as it appears in serialised data, heading not yet wrapped.
#[derive(Deserialize)]
struct RawPose2 {
    position_m: Vector2<f64>,
    heading_rad: f64,
}

/// Linear velocity and angular rate.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Twist2 {
    pub linear_ms: Vector2<f64>,
    pub angular_rads: f64,
}

/// One kinematic sample of a robot or ball at a point in time.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct State2 {
    pub pose: Pose2,

    pub twist: Twist2,

    /// Time of the sample in seconds
    pub t_s: f64,

    /// The frame the twist is expressed in
    pub twist_frame: Frame2,

    pub pose_valid: bool,

    pub twist_valid: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Reference frame a twist is expressed in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frame2 {
    /// The fixed field frame
    World,

    /// The body frame of the robot itself
    Body,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose2 {
    /// Create a new pose, wrapping the heading into (-pi, pi].
    pub fn new(position_m: Vector2<f64>, heading_rad: f64) -> Self {
        Self {
            position_m,
            heading_rad: wrap_to_pi(heading_rad),
        }
    }

    pub fn heading_rad(&self) -> f64 {
        self.heading_rad
    }

    /// Return the unit vector pointing along the heading.
    pub fn forward(&self) -> Vector2<f64> {
        Vector2::new(self.heading_rad.cos(), self.heading_rad.sin())
    }
}

impl From<RawPose2> for Pose2 {
    fn from(raw: RawPose2) -> Self {
        Self::new(raw.position_m, raw.heading_rad)
    }
}

impl Twist2 {
    pub fn new(linear_ms: Vector2<f64>, angular_rads: f64) -> Self {
        Self {
            linear_ms,
            angular_rads,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }
}

impl Default for Frame2 {
    fn default() -> Self {
        Self::World
    }
}

impl State2 {
    pub fn new(pose: Pose2, twist: Twist2, t_s: f64, twist_frame: Frame2) -> Self {
        Self {
            pose,
            twist,
            t_s,
            twist_frame,
            pose_valid: true,
            twist_valid: true,
        }
    }

    /// Build a state where only the pose is known, as is the case for raw vision detections.
    ///
    /// The twist is zero and flagged invalid.
    pub fn pose_only(pose: Pose2, t_s: f64) -> Self {
        Self {
            pose,
            twist: Twist2::zero(),
            t_s,
            twist_frame: Frame2::World,
            pose_valid: true,
            twist_valid: false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_pose_heading_wrapped() {
        let pose = Pose2::new(Vector2::new(1.0, 2.0), 3.0 * PI / 2.0);
        assert!((pose.heading_rad() + PI / 2.0).abs() < 1e-12);

        // Wrapping an already wrapped pose changes nothing
        let again = Pose2::new(pose.position_m, pose.heading_rad());
        assert_eq!(again, pose);

        assert_eq!(Pose2::new(Vector2::zeros(), -PI).heading_rad(), PI);
    }

    #[test]
    fn test_deserialised_heading_wrapped() {
        let pose: Pose2 =
            serde_json::from_str(r#"{"position_m":[1.0,-2.0],"heading_rad":10.0}"#).unwrap();

        assert_eq!(pose.position_m, Vector2::new(1.0, -2.0));
        assert!((pose.heading_rad() - (10.0 - 4.0 * PI)).abs() < 1e-12);

        // A serialised pose reads back unchanged
        let text = serde_json::to_string(&pose).unwrap();
        assert_eq!(serde_json::from_str::<Pose2>(&text).unwrap(), pose);
    }

    #[test]
    fn test_pose_only_state() {
        let state = State2::pose_only(Pose2::new(Vector2::new(0.5, 0.5), 0.1), 2.0);
        assert!(state.pose_valid);
        assert!(!state.twist_valid);
        assert_eq!(state.twist, Twist2::zero());
        assert_eq!(state.twist_frame, Frame2::World);
    }
}
