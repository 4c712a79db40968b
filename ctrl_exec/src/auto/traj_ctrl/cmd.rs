//! Velocity commands

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Velocity command for a holonomic robot, expressed in the world frame.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize)]
pub struct Command2 {
    pub linear_ms: Vector2<f64>,
    pub angular_rads: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Command2 {
    pub fn new(linear_ms: Vector2<f64>, angular_rads: f64) -> Self {
        Self {
            linear_ms,
            angular_rads,
        }
    }

    /// Command to come to rest.
    pub fn stop() -> Self {
        Self::default()
    }
}
