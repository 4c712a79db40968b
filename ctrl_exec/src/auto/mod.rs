//! # Autonomy Module
//!
//! This module provides the planning and control core of a robot: where it is (`loc`), how fast
//! it may move (`limits`), what the field looks like (`map`), how to get across it (`nav`), how the
//! motion is timed (`traj`), and how it is followed (`traj_ctrl`).

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Motion limits and goal specification
pub mod limits;

/// Localisation types - poses, twists and timestamped states
pub mod loc;

/// Map module - provides the costed occupancy grid
pub mod map;

/// Navigation module - provides path planning over the cost grid
pub mod nav;

/// Trajectory module - turns routes into timed reference motions
pub mod traj;

/// Trajectory control module - keeps the robot on the reference trajectory
pub mod traj_ctrl;
