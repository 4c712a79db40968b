//! Navigation parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use serde::Deserialize;

use super::PathPlannerParams;
use crate::auto::map::{Cell, CostGrid, GridError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters describing the navigation grid and planner.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct NavParams {
    /// Number of cells along the world X axis
    pub grid_width: usize,

    /// Number of cells along the world Y axis
    pub grid_height: usize,

    /// Side length of a cell in meters
    pub cell_size_m: f64,

    /// Cells which may not be entered, as `[x, y]`
    pub blocked_cells: Vec<[i32; 2]>,

    /// Rectangular areas with a non-default traversal cost
    pub cost_patches: Vec<CostPatch>,

    pub planner: PathPlannerParams,
}

/// A rectangle of cells, inclusive of both corners, sharing one traversal cost.
#[derive(Deserialize, Debug, Clone)]
pub struct CostPatch {
    pub min: [i32; 2],
    pub max: [i32; 2],
    pub cost: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for NavParams {
    fn default() -> Self {
        Self {
            grid_width: 16,
            grid_height: 12,
            cell_size_m: 0.5,
            blocked_cells: vec![],
            cost_patches: vec![],
            planner: PathPlannerParams::default(),
        }
    }
}

impl NavParams {
    /// Build the cost grid described by these parameters.
    ///
    /// Cost patches are applied in order before blocked cells.
    pub fn build_grid(&self) -> Result<CostGrid, GridError> {
        let mut grid = CostGrid::new(self.grid_width, self.grid_height)?;

        for patch in &self.cost_patches {
            for y in patch.min[1]..=patch.max[1] {
                for x in patch.min[0]..=patch.max[0] {
                    grid.set_cost(Cell::new(x, y), patch.cost)?;
                }
            }
        }

        for [x, y] in &self.blocked_cells {
            grid.set_walkable(Cell::new(*x, *y), false)?;
        }

        debug!(
            "Built {}x{} nav grid with {} blocked cells",
            grid.width(),
            grid.height(),
            self.blocked_cells.len()
        );

        Ok(grid)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::map::Connectivity;

    #[test]
    fn test_build_grid_from_params() {
        let params: NavParams = util::params::from_str(
            r#"
            grid_width = 6
            grid_height = 4
            blocked_cells = [[1, 1], [2, 1]]

            [[cost_patches]]
            min = [3, 0]
            max = [4, 1]
            cost = 5.0

            [planner]
            connectivity = "Four"
            "#,
        )
        .unwrap();

        assert_eq!(params.cell_size_m, 0.5);
        assert_eq!(params.planner.connectivity, Connectivity::Four);
        assert!(params.planner.prevent_corner_cutting);

        let grid = params.build_grid().unwrap();
        assert_eq!(grid.width(), 6);
        assert_eq!(grid.is_walkable(Cell::new(2, 1)), Ok(false));
        assert_eq!(grid.is_walkable(Cell::new(3, 1)), Ok(true));
        assert_eq!(grid.cost(Cell::new(4, 1)), Ok(5.0));
        assert_eq!(grid.cost(Cell::new(5, 1)), Ok(1.0));
    }

    #[test]
    fn test_blocked_cell_outside_grid() {
        let params = NavParams {
            blocked_cells: vec![[16, 0]],
            ..Default::default()
        };
        assert!(params.build_grid().is_err());
    }
}
