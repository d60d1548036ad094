//! Depth-first path search from entry to exit.
//!
//! The solver extends a single track one cell at a time, following the open
//! connection of the piece it just committed to. Empty cells try every
//! feasible piece in reverse canonical order (corners before straights);
//! occupied cells must accept the incoming connection as they stand.
//! Placements and visited marks are undone in LIFO order, so a failed branch
//! leaves the grid exactly as it found it.

use crate::geometry::Point;
use crate::grid::Grid;
use crate::pieces::{Piece, VALID_PIECES};

/// Observer notified while the search runs.
///
/// [`Progress::report`] fires whenever the step counter reaches a multiple
/// of the interval. Reporters only ever see the scalar counter; the grid
/// stays exclusively with the solver.
pub trait Progress {
    /// Number of steps between reports.
    fn interval(&self) -> u64;
    fn report(&mut self, steps: u64);
}

/// Backtracking path solver.
pub struct PathSolver<'a> {
    steps: u64,
    reporter: Option<&'a mut dyn Progress>,
}

impl Default for PathSolver<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> PathSolver<'a> {
    pub fn new() -> Self {
        PathSolver {
            steps: 0,
            reporter: None,
        }
    }

    pub fn with_reporter(reporter: &'a mut dyn Progress) -> Self {
        PathSolver {
            steps: 0,
            reporter: Some(reporter),
        }
    }

    /// Number of cells the search has visited, failed probes included.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Runs the search. On success the grid holds the completed track; on
    /// failure every placement made here has been undone and `false` comes
    /// back without further ceremony.
    pub fn solve(&mut self, grid: &mut Grid) -> bool {
        let entry = grid.entry();
        let incoming = -off_grid_direction(grid, entry);
        let mut visited = vec![false; (grid.width() * grid.height()) as usize];
        let mut visited_count = 0;
        self.try_build(grid, entry, incoming, &mut visited, &mut visited_count)
    }

    fn step(&mut self) {
        self.steps += 1;
        if let Some(reporter) = self.reporter.as_deref_mut() {
            let interval = reporter.interval();
            if interval != 0 && self.steps % interval == 0 {
                reporter.report(self.steps);
            }
        }
    }

    fn try_build(
        &mut self,
        grid: &mut Grid,
        pos: Point,
        incoming: Point,
        visited: &mut [bool],
        visited_count: &mut u32,
    ) -> bool {
        self.step();

        if !grid.is_in_bounds(pos) || visited[pos.index(grid.width())] {
            return false;
        }
        // the path can never span more cells than the demand total
        if *visited_count >= grid.target() {
            return false;
        }

        let existing = grid.at(pos);
        if !existing.is_empty() {
            if !existing.connects_to(-incoming) {
                return false;
            }
            if pos == grid.exit() {
                return grid.is_complete();
            }
        }

        let index = pos.index(grid.width());
        visited[index] = true;
        *visited_count += 1;

        if !existing.is_empty() {
            if self.extend(grid, pos, existing, incoming, visited, visited_count) {
                return true;
            }
        } else {
            for piece in VALID_PIECES.into_iter().rev() {
                if !grid.can_place(pos, piece) {
                    continue;
                }
                grid.place(pos, piece);
                if self.extend(grid, pos, piece, incoming, visited, visited_count) {
                    return true;
                }
                grid.remove(pos);
            }
        }

        visited[index] = false;
        *visited_count -= 1;
        false
    }

    /// Recurses along each open connection of the piece at `pos`.
    fn extend(
        &mut self,
        grid: &mut Grid,
        pos: Point,
        piece: Piece,
        incoming: Point,
        visited: &mut [bool],
        visited_count: &mut u32,
    ) -> bool {
        for &direction in piece.connections() {
            if direction == -incoming {
                continue;
            }
            if self.try_build(grid, pos + direction, direction, visited, visited_count) {
                return true;
            }
        }
        false
    }
}

/// The one connection of an endpoint piece that points off the grid.
/// Grid construction guarantees it exists and is unique.
fn off_grid_direction(grid: &Grid, endpoint: Point) -> Point {
    grid.at(endpoint)
        .connections()
        .iter()
        .copied()
        .find(|&d| !grid.is_in_bounds(endpoint + d))
        .expect("endpoint piece must leave the grid")
}
