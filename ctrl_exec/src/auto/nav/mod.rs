//! # Navigation
//!
//! This module plans routes across the field.
//!
//! - [`PathPlanner`] - A* search over a [`CostGrid`], producing a sequence of cells.
//! - [`plan_route`] - Plans between two world positions and returns the route as cell centre
//!   waypoints in meters, ready to be turned into a trajectory.
//! - [`plan_route_from`] - As [`plan_route`], with the route starting at the exact start position
//!   so a robot can follow it from where it stands.
//! - [`NavParams`] - Describes the grid (size, resolution, obstacles and cost patches) and the
//!   planner options, normally loaded from `nav.toml`.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
mod path_planner;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, warn};
use nalgebra::Vector2;

use super::map::{CostGrid, GridError};

pub use params::{CostPatch, NavParams};
pub use path_planner::{Heuristic, PathPlanner, PathPlannerParams};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("The {0} point {1} is outside the map")]
    PointOutsideMap(&'static str, Vector2<f64>),

    #[error("No path exists between {0} and {1}")]
    NoPath(Vector2<f64>, Vector2<f64>),

    #[error("Grid error: {0}")]
    Grid(#[from] GridError),
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Plan a route between two world positions.
///
/// Both positions are snapped to the cells containing them. The returned waypoints are the centres
/// of the cells along the minimum cost path, starting with the start cell and ending with the goal
/// cell.
pub fn plan_route(
    planner: &PathPlanner,
    grid: &CostGrid,
    cell_size_m: f64,
    start_m: Vector2<f64>,
    goal_m: Vector2<f64>,
) -> Result<Vec<Vector2<f64>>, NavError> {
    let start = grid
        .cell_at(&start_m, cell_size_m)
        .map_err(|_| NavError::PointOutsideMap("start", start_m))?;
    let goal = grid
        .cell_at(&goal_m, cell_size_m)
        .map_err(|_| NavError::PointOutsideMap("goal", goal_m))?;

    let cells = planner.find_path(grid, start, goal);

    if cells.is_empty() {
        warn!("No path from {:?} to {:?}", start, goal);
        return Err(NavError::NoPath(start_m, goal_m));
    }

    debug!("Route planned through {} cells", cells.len());

    Ok(cells.iter().map(|c| c.centre_m(cell_size_m)).collect())
}

/// Plan a route between two world positions, starting exactly at `start_m`.
///
/// The start position is put ahead of the cell centre waypoints of [`plan_route`], so the route
/// always has at least two waypoints. The first segment is zero length when the start is already
/// on its cell centre.
pub fn plan_route_from(
    planner: &PathPlanner,
    grid: &CostGrid,
    cell_size_m: f64,
    start_m: Vector2<f64>,
    goal_m: Vector2<f64>,
) -> Result<Vec<Vector2<f64>>, NavError> {
    let mut route = plan_route(planner, grid, cell_size_m, start_m, goal_m)?;
    route.insert(0, start_m);
    Ok(route)
}
