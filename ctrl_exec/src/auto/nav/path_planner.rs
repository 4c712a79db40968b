//! Plans minimum cost paths through a [`CostGrid`], using an A* algorithm.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::BinaryHeap;

use log::{debug, trace};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::auto::map::{Cell, Connectivity, CostGrid};

// -----------------------------------------------------------------------------------------------
// STRUCTS
// -----------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PathPlanner {
    params: PathPlannerParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathPlannerParams {
    /// Which neighbours each cell has.
    pub connectivity: Connectivity,

    /// Forbid diagonal steps between two blocked orthogonal cells. Only meaningful when
    /// eight-connected.
    pub prevent_corner_cutting: bool,

    /// The remaining cost estimate used to order the frontier.
    pub heuristic: Heuristic,
}

/// An entry in the A* frontier.
///
/// A cell may appear several times with different costs, stale entries are dropped when popped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrontierEntry {
    /// Estimated total cost through the cell, `g + h`
    f: OrderedFloat<f64>,

    /// Heuristic part of the cost, used to break ties in `f`
    h: OrderedFloat<f64>,

    /// Row-major index of the cell, the final tie break
    index: usize,
}

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

/// Distance estimate between two cells, in cell units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Heuristic {
    /// `|dx| + |dy|`
    Manhattan,

    /// `sqrt(dx^2 + dy^2)`
    Euclidean,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl Default for PathPlannerParams {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::Eight,
            prevent_corner_cutting: true,
            heuristic: Heuristic::Euclidean,
        }
    }
}

impl Heuristic {
    pub fn estimate(&self, from: Cell, to: Cell) -> f64 {
        let dx = (to.x - from.x).abs() as f64;
        let dy = (to.y - from.y).abs() as f64;

        match self {
            Heuristic::Manhattan => dx + dy,
            Heuristic::Euclidean => (dx * dx + dy * dy).sqrt(),
        }
    }
}

impl PathPlanner {
    pub fn new(params: PathPlannerParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PathPlannerParams {
        &self.params
    }

    /// Find the minimum cost path from `start` to `goal`, both included.
    ///
    /// Entering a cell costs the cell's cost, multiplied by sqrt(2) for a diagonal step. An empty
    /// path is returned if either end is outside the grid or blocked, or if the goal cannot be
    /// reached. Equal cost frontier entries are popped lowest heuristic first, then lowest
    /// row-major index, so results are reproducible.
    pub fn find_path(&self, grid: &CostGrid, start: Cell, goal: Cell) -> Vec<Cell> {
        let (start_idx, goal_idx) = match (grid.index(start), grid.index(goal)) {
            (Ok(s), Ok(g)) => (s, g),
            _ => {
                trace!("Path endpoint outside grid: {:?} -> {:?}", start, goal);
                return vec![];
            }
        };

        if !grid.walkable_at_index(start_idx) || !grid.walkable_at_index(goal_idx) {
            trace!("Path endpoint blocked: {:?} -> {:?}", start, goal);
            return vec![];
        }

        if start == goal {
            return vec![start];
        }

        let prevent_corner_cutting =
            self.params.prevent_corner_cutting && self.params.connectivity == Connectivity::Eight;

        // Best known cost to reach each cell, and the cell it was reached from
        let mut g = vec![f64::INFINITY; grid.len()];
        let mut parent: Vec<Option<usize>> = vec![None; grid.len()];
        let mut closed = vec![false; grid.len()];

        let mut frontier = BinaryHeap::new();

        g[start_idx] = 0.0;
        frontier.push(FrontierEntry::new(0.0, self.params.heuristic.estimate(start, goal), start_idx));

        let mut num_expanded = 0usize;

        while let Some(entry) = frontier.pop() {
            if closed[entry.index] {
                continue;
            }

            if entry.index == goal_idx {
                let path = reconstruct(grid, &parent, goal_idx);
                debug!(
                    "A* found a path of {} cells with cost {:.3} after {} expansions",
                    path.len(),
                    g[goal_idx],
                    num_expanded
                );
                return path;
            }

            closed[entry.index] = true;
            num_expanded += 1;

            let cell = grid.cell_from_index(entry.index);
            let g_current = g[entry.index];

            // The cell came off the frontier so it is in bounds and neighbours cannot fail
            let neighbours = grid
                .neighbours(cell, self.params.connectivity, prevent_corner_cutting)
                .unwrap_or_default();

            for n in neighbours {
                let n_idx = match grid.index(n) {
                    Ok(i) => i,
                    Err(_) => continue,
                };

                if closed[n_idx] {
                    continue;
                }

                let mut move_cost = grid.cost_at_index(n_idx);
                if cell.is_diagonal_to(&n) {
                    move_cost *= std::f64::consts::SQRT_2;
                }

                let tentative_g = g_current + move_cost;
                if tentative_g >= g[n_idx] {
                    continue;
                }

                g[n_idx] = tentative_g;
                parent[n_idx] = Some(entry.index);

                let h = self.params.heuristic.estimate(n, goal);
                frontier.push(FrontierEntry::new(tentative_g + h, h, n_idx));
            }
        }

        debug!(
            "A* exhausted the frontier after {} expansions, no path from {:?} to {:?}",
            num_expanded, start, goal
        );
        vec![]
    }
}

impl FrontierEntry {
    fn new(f: f64, h: f64, index: usize) -> Self {
        Self {
            f: OrderedFloat(f),
            h: OrderedFloat(h),
            index,
        }
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Note that we flip the order here so that the heap will be a min-heap, not a max-heap
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Walk the parent links back from the goal and return the path in start to goal order.
fn reconstruct(grid: &CostGrid, parent: &[Option<usize>], goal_idx: usize) -> Vec<Cell> {
    let mut path = vec![grid.cell_from_index(goal_idx)];
    let mut current = goal_idx;

    while let Some(p) = parent[current] {
        path.push(grid.cell_from_index(p));
        current = p;
    }

    path.reverse();
    path
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    fn c(x: i32, y: i32) -> Cell {
        Cell::new(x, y)
    }

    /// Sum of the Euclidean lengths of each step of the path, in cells.
    fn path_length(path: &[Cell]) -> f64 {
        path.windows(2)
            .map(|w| {
                let dx = (w[1].x - w[0].x) as f64;
                let dy = (w[1].y - w[0].y) as f64;
                (dx * dx + dy * dy).sqrt()
            })
            .sum()
    }

    fn assert_connected(path: &[Cell], grid: &CostGrid) {
        for cell in path {
            assert_eq!(grid.is_walkable(*cell), Ok(true), "path enters blocked cell {:?}", cell);
        }
        for w in path.windows(2) {
            assert!((w[1].x - w[0].x).abs() <= 1 && (w[1].y - w[0].y).abs() <= 1);
            assert_ne!(w[0], w[1]);
        }
    }

    #[test]
    fn test_trivial_paths() {
        let mut grid = CostGrid::new(5, 5).unwrap();
        let planner = PathPlanner::new(PathPlannerParams::default());

        assert_eq!(planner.find_path(&grid, c(2, 2), c(2, 2)), vec![c(2, 2)]);
        assert!(planner.find_path(&grid, c(-1, 0), c(2, 2)).is_empty());
        assert!(planner.find_path(&grid, c(0, 0), c(5, 2)).is_empty());

        grid.set_walkable(c(4, 4), false).unwrap();
        assert!(planner.find_path(&grid, c(0, 0), c(4, 4)).is_empty());
        assert!(planner.find_path(&grid, c(4, 4), c(0, 0)).is_empty());
    }

    #[test]
    fn test_no_path_through_wall() {
        let mut grid = CostGrid::new(5, 5).unwrap();
        for y in 0..5 {
            grid.set_walkable(c(2, y), false).unwrap();
        }

        let planner = PathPlanner::new(PathPlannerParams::default());
        assert!(planner.find_path(&grid, c(0, 0), c(4, 4)).is_empty());
    }

    #[test]
    fn test_straight_line_four_connected() {
        let grid = CostGrid::new(6, 3).unwrap();
        let planner = PathPlanner::new(PathPlannerParams {
            connectivity: Connectivity::Four,
            ..Default::default()
        });

        let path = planner.find_path(&grid, c(0, 1), c(5, 1));
        assert_eq!(path, (0..6).map(|x| c(x, 1)).collect::<Vec<_>>());
    }

    #[test]
    fn test_diagonal_on_open_grid() {
        let grid = CostGrid::new(6, 6).unwrap();
        let planner = PathPlanner::new(PathPlannerParams::default());

        let path = planner.find_path(&grid, c(0, 0), c(5, 5));
        assert_eq!(path, (0..6).map(|i| c(i, i)).collect::<Vec<_>>());
    }

    #[test]
    fn test_corner_cutting_prevented() {
        // Two blocked cells form a diagonal gap between (1, 1) and (2, 2)
        let mut grid = CostGrid::new(4, 4).unwrap();
        grid.set_walkable(c(2, 1), false).unwrap();
        grid.set_walkable(c(1, 2), false).unwrap();

        let planner = PathPlanner::new(PathPlannerParams::default());
        let path = planner.find_path(&grid, c(1, 1), c(2, 2));
        assert!(!path.is_empty());
        assert_connected(&path, &grid);
        assert!(
            !path.windows(2).any(|w| w[0] == c(1, 1) && w[1] == c(2, 2)),
            "path cut the corner: {:?}",
            path
        );

        // Without prevention the direct diagonal is taken
        let planner = PathPlanner::new(PathPlannerParams {
            prevent_corner_cutting: false,
            ..Default::default()
        });
        assert_eq!(planner.find_path(&grid, c(1, 1), c(2, 2)), vec![c(1, 1), c(2, 2)]);
    }

    #[test]
    fn test_avoids_expensive_cells() {
        let mut grid = CostGrid::new(5, 3).unwrap();
        for x in 1..4 {
            grid.set_cost(c(x, 1), 10.0).unwrap();
        }

        let planner = PathPlanner::new(PathPlannerParams {
            connectivity: Connectivity::Four,
            ..Default::default()
        });
        let path = planner.find_path(&grid, c(0, 1), c(4, 1));

        assert_connected(&path, &grid);
        assert!(path[1..path.len() - 1].iter().all(|p| p.y != 1));
        assert_eq!(path.len(), 7);
    }

    #[test]
    fn test_manhattan_heuristic() {
        let mut grid = CostGrid::new(8, 8).unwrap();
        for y in 0..6 {
            grid.set_walkable(c(4, y), false).unwrap();
        }

        let planner = PathPlanner::new(PathPlannerParams {
            connectivity: Connectivity::Four,
            heuristic: Heuristic::Manhattan,
            ..Default::default()
        });
        let path = planner.find_path(&grid, c(0, 0), c(7, 0));

        assert_connected(&path, &grid);
        assert_eq!(path.first(), Some(&c(0, 0)));
        assert_eq!(path.last(), Some(&c(7, 0)));
        // Down to row 6, across, and back up
        assert_eq!(path.len(), 7 + 2 * 6 + 1);
    }

    #[test]
    fn test_deterministic() {
        let grid = CostGrid::new(10, 10).unwrap();
        let planner = PathPlanner::new(PathPlannerParams::default());

        let a = planner.find_path(&grid, c(0, 0), c(9, 3));
        let b = planner.find_path(&grid, c(0, 0), c(9, 3));
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn open_grid_path_is_optimal(
            sx in 0i32..20, sy in 0i32..20,
            gx in 0i32..20, gy in 0i32..20,
        ) {
            let grid = CostGrid::new(20, 20).unwrap();
            let planner = PathPlanner::new(PathPlannerParams::default());

            let path = planner.find_path(&grid, c(sx, sy), c(gx, gy));
            prop_assert!(!path.is_empty());
            prop_assert_eq!(path[0], c(sx, sy));
            prop_assert_eq!(*path.last().unwrap(), c(gx, gy));

            // The octile distance is the shortest 8-connected length, and it never exceeds the
            // straight line distance by more than the discretisation error
            let dx = (gx - sx).abs() as f64;
            let dy = (gy - sy).abs() as f64;
            let octile = dx.max(dy) + (std::f64::consts::SQRT_2 - 1.0) * dx.min(dy);
            let straight = (dx * dx + dy * dy).sqrt();

            let length = path_length(&path);
            prop_assert!((length - octile).abs() < 1e-9);
            prop_assert!(length >= straight - 1e-9);
            prop_assert!(length <= straight * 1.0824 + 1e-9);
        }
    }
}
