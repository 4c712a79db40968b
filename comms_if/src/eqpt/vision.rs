//! # Vision Equipment Interface
//!
//! A [`DetectionFrame`] is one decoded detection packet from the vision system. Decoding the
//! third-party wire protocol happens upstream, this is the shape the control core consumes.
//!
//! All positions are in millimeters in the field frame, orientations in radians.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One decoded detection frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
    /// Capture time of the frame in seconds.
    pub t_capture_s: f64,

    /// Balls detected in this frame, the first one is taken as the ball.
    pub balls: Vec<DetectionBall>,

    /// Robots of the blue team detected in this frame.
    pub robots_blue: Vec<DetectionRobot>,

    /// Robots of the yellow team detected in this frame.
    pub robots_yellow: Vec<DetectionRobot>,
}

/// A detected ball.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionBall {
    pub x_mm: f64,
    pub y_mm: f64,
}

/// A detected robot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionRobot {
    /// The id reported by vision, which is not guaranteed to be a valid team slot.
    pub robot_id: u32,

    pub x_mm: f64,
    pub y_mm: f64,

    /// Orientation of the robot in radians.
    pub orientation_rad: f64,
}
