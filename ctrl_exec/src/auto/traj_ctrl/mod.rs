//! # Trajectory control module
//!
//! Trajectory control keeps a robot on its reference trajectory. Each cycle the trajectory is
//! sampled at the current time, and the pose error between the sample and the measured pose is
//! turned into a velocity command by a set of proportional controllers, one per controlled axis
//! (world X, world Y and heading).
//!
//! The reference twist is fed forward on top of the feedback terms so that the robot tracks a
//! moving reference rather than lagging behind it. The combined linear velocity is limited as a
//! vector, preserving the commanded direction when saturated.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod cmd;
pub mod controllers;
pub mod params;
pub mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use cmd::Command2;
pub use controllers::*;
pub use params::Params;
pub use state::*;
