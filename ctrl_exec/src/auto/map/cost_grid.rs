//! # Cost grid
//!
//! Per-cell walkability and traversal cost, plus the neighbour generation policy used by the
//! planner.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Integer coordinates of a grid cell.
///
/// Coordinates are signed so that neighbours of edge cells can be expressed and then rejected by
/// the bounds check.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

/// A fixed size grid of walkability flags and traversal costs.
#[derive(Debug, Clone)]
pub struct CostGrid {
    width: usize,
    height: usize,

    /// Row-major walkability, true if a cell may be entered
    walkable: Vec<bool>,

    /// Row-major cost of entering each cell
    cost: Vec<f64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Neighbour connectivity of the grid.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connectivity {
    /// Only orthogonal steps
    Four,

    /// Orthogonal and diagonal steps
    Eight,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum GridError {
    #[error("Grid dimensions must be non-zero")]
    ZeroSize,

    #[error("Cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },

    #[error("Cell cost must be finite and non-negative, got {0}")]
    InvalidCost(f64),
}

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Orthogonal steps in enumeration order: east, west, south, north.
const ORTHOGONAL_STEPS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Diagonal steps in enumeration order.
const DIAGONAL_STEPS: [(i32, i32); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns true if the step from `self` to `other` is diagonal.
    pub fn is_diagonal_to(&self, other: &Cell) -> bool {
        self.x != other.x && self.y != other.y
    }

    /// The world position of the centre of this cell for the given cell size.
    pub fn centre_m(&self, cell_size_m: f64) -> Vector2<f64> {
        Vector2::new(
            (self.x as f64 + 0.5) * cell_size_m,
            (self.y as f64 + 0.5) * cell_size_m,
        )
    }

    /// The cell containing the given world position.
    ///
    /// Positions are not bounds checked, see [`CostGrid::cell_at`] for that.
    pub fn containing(position_m: &Vector2<f64>, cell_size_m: f64) -> Self {
        Self {
            x: (position_m[0] / cell_size_m).floor() as i32,
            y: (position_m[1] / cell_size_m).floor() as i32,
        }
    }
}

impl From<(i32, i32)> for Cell {
    fn from(xy: (i32, i32)) -> Self {
        Self::new(xy.0, xy.1)
    }
}

impl CostGrid {
    /// Create a new grid where all cells are walkable with cost 1.
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroSize);
        }

        Ok(Self {
            width,
            height,
            walkable: vec![true; width * height],
            cost: vec![1.0; width * height],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells in the grid.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0
            && cell.y >= 0
            && (cell.x as usize) < self.width
            && (cell.y as usize) < self.height
    }

    /// Row-major index of the cell, or an out of bounds error.
    pub fn index(&self, cell: Cell) -> Result<usize, GridError> {
        if self.in_bounds(cell) {
            Ok(cell.y as usize * self.width + cell.x as usize)
        } else {
            Err(GridError::OutOfBounds {
                x: cell.x,
                y: cell.y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Inverse of [`CostGrid::index`]. The index must be below [`CostGrid::len`].
    pub(crate) fn cell_from_index(&self, index: usize) -> Cell {
        Cell::new((index % self.width) as i32, (index / self.width) as i32)
    }

    pub(crate) fn walkable_at_index(&self, index: usize) -> bool {
        self.walkable[index]
    }

    pub(crate) fn cost_at_index(&self, index: usize) -> f64 {
        self.cost[index]
    }

    pub fn is_walkable(&self, cell: Cell) -> Result<bool, GridError> {
        Ok(self.walkable[self.index(cell)?])
    }

    pub fn set_walkable(&mut self, cell: Cell, walkable: bool) -> Result<(), GridError> {
        let idx = self.index(cell)?;
        self.walkable[idx] = walkable;
        Ok(())
    }

    pub fn cost(&self, cell: Cell) -> Result<f64, GridError> {
        Ok(self.cost[self.index(cell)?])
    }

    /// Set the cost of entering the cell. Negative, NaN, and infinite costs are rejected.
    pub fn set_cost(&mut self, cell: Cell, cost: f64) -> Result<(), GridError> {
        let idx = self.index(cell)?;
        if !cost.is_finite() || cost < 0.0 {
            return Err(GridError::InvalidCost(cost));
        }
        self.cost[idx] = cost;
        Ok(())
    }

    /// The cell containing a world position, or an error if it lies outside the grid.
    pub fn cell_at(&self, position_m: &Vector2<f64>, cell_size_m: f64) -> Result<Cell, GridError> {
        let cell = Cell::containing(position_m, cell_size_m);
        self.index(cell)?;
        Ok(cell)
    }

    /// Walkable in-bounds neighbours of `cell`.
    ///
    /// Order is east, west, south, north, then the diagonals when eight-connected. A blocked
    /// source cell has no neighbours. With `prevent_corner_cutting` a diagonal is only offered if
    /// both orthogonal cells it passes between are walkable, which has no effect for
    /// [`Connectivity::Four`].
    pub fn neighbours(
        &self,
        cell: Cell,
        connectivity: Connectivity,
        prevent_corner_cutting: bool,
    ) -> Result<Vec<Cell>, GridError> {
        let mut out = Vec::with_capacity(8);

        if !self.is_walkable(cell)? {
            return Ok(out);
        }

        for (dx, dy) in ORTHOGONAL_STEPS.iter() {
            let n = Cell::new(cell.x + dx, cell.y + dy);
            if self.walkable_in_bounds(n) {
                out.push(n);
            }
        }

        if connectivity == Connectivity::Eight {
            for (dx, dy) in DIAGONAL_STEPS.iter() {
                let n = Cell::new(cell.x + dx, cell.y + dy);
                if !self.walkable_in_bounds(n) {
                    continue;
                }

                if prevent_corner_cutting
                    && !(self.walkable_in_bounds(Cell::new(cell.x + dx, cell.y))
                        && self.walkable_in_bounds(Cell::new(cell.x, cell.y + dy)))
                {
                    continue;
                }

                out.push(n);
            }
        }

        Ok(out)
    }

    fn walkable_in_bounds(&self, cell: Cell) -> bool {
        match self.index(cell) {
            Ok(i) => self.walkable[i],
            Err(_) => false,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
