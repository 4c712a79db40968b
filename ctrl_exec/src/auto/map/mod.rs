//! # Map
//!
//! This module implements the [`CostGrid`], a fixed size occupancy and traversal cost map over
//! which the path planner searches. Cells are addressed by integer [`Cell`] coordinates, with
//! cell (0, 0) at the world origin, X increasing along the world X axis and Y along world Y.

// ------------------------------------------------------------------------------------------------
// MODS
// ------------------------------------------------------------------------------------------------

/// Implements the [`CostGrid`] type
mod cost_grid;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use cost_grid::{Cell, Connectivity, CostGrid, GridError};
