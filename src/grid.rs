//! Grid state and placement feasibility.
//!
//! The grid owns the cell array plus per-row and per-column placed counters,
//! so every demand check during search is O(1). After construction the only
//! mutations are [`Grid::place`] and [`Grid::remove`]; the solver undoes its
//! placements in LIFO order, which keeps the counters exact through every
//! backtrack.

use std::collections::VecDeque;

use thiserror::Error;

use crate::geometry::Point;
use crate::pieces::Piece;
use crate::puzzle::Puzzle;

/// Structural errors detected while building a grid from a puzzle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("row demands total {row_total} but column demands total {col_total}")]
    DemandMismatch { row_total: u32, col_total: u32 },
    #[error("expected exactly two border endpoints, found {0}")]
    EndpointCount(usize),
    #[error("piece at {0} leaves the grid in more than one direction")]
    LeavesGridTwice(Point),
    #[error("fixed piece at {0} exceeds a row or column demand")]
    DemandExceeded(Point),
    #[error("fixed pieces at {0} and {1} do not join")]
    Misaligned(Point, Point),
}

/// The puzzle board during and after solving.
///
/// Construction validates the puzzle, locates the entry and exit, and runs
/// the pre-solver; afterwards the cell array holds the fixed pieces plus any
/// deduced ones, and the search mutates it in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    row_demands: Vec<u32>,
    col_demands: Vec<u32>,
    cells: Vec<Piece>,
    placed_in_row: Vec<u32>,
    placed_in_col: Vec<u32>,
    placed: u32,
    target: u32,
    entry: Point,
    exit: Point,
    fixed: Vec<Point>,
}

impl Grid {
    /// Builds a grid from a puzzle, validates it, and deduces the obvious
    /// placements.
    pub fn new(puzzle: &Puzzle) -> Result<Grid, GridError> {
        let width = puzzle.width() as i32;
        let height = puzzle.height() as i32;
        let row_total: u32 = puzzle.row_demands.iter().sum();
        let col_total: u32 = puzzle.col_demands.iter().sum();
        if row_total != col_total {
            return Err(GridError::DemandMismatch {
                row_total,
                col_total,
            });
        }

        let mut grid = Grid {
            width,
            height,
            row_demands: puzzle.row_demands.clone(),
            col_demands: puzzle.col_demands.clone(),
            cells: vec![Piece::Empty; (width * height) as usize],
            placed_in_row: vec![0; height as usize],
            placed_in_col: vec![0; width as usize],
            placed: 0,
            target: row_total,
            entry: Point::ORIGIN,
            exit: Point::ORIGIN,
            fixed: Vec::new(),
        };

        for pt in grid.points() {
            let piece = puzzle.start[pt.index(width)];
            if piece.is_empty() {
                continue;
            }
            grid.place(pt, piece);
            if grid.placed_in_row[pt.y as usize] > grid.row_demands[pt.y as usize]
                || grid.placed_in_col[pt.x as usize] > grid.col_demands[pt.x as usize]
            {
                return Err(GridError::DemandExceeded(pt));
            }
            grid.fixed.push(pt);
        }

        // fixed neighbours must agree before search starts; each mismatched
        // pair is caught from whichever side carries the connection
        for &pt in &grid.fixed {
            for &d in grid.at(pt).connections() {
                let n = pt + d;
                if !grid.is_in_bounds(n) {
                    continue;
                }
                let other = grid.at(n);
                if !other.is_empty() && !other.connects_to(-d) {
                    return Err(GridError::Misaligned(pt, n));
                }
            }
        }

        let (entry, exit) = grid.extract_endpoints()?;
        grid.entry = entry;
        grid.exit = exit;

        grid.place_obvious_pieces();
        Ok(grid)
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of non-empty cells, deduced and searched placements included.
    #[inline]
    pub fn placed(&self) -> u32 {
        self.placed
    }

    /// Total number of track cells a solution must contain.
    #[inline]
    pub fn target(&self) -> u32 {
        self.target
    }

    /// The border cell where the track enters the grid.
    #[inline]
    pub fn entry(&self) -> Point {
        self.entry
    }

    /// The border cell where the track leaves the grid.
    #[inline]
    pub fn exit(&self) -> Point {
        self.exit
    }

    /// The cells that were fixed by the puzzle, in scan order.
    pub fn fixed_points(&self) -> &[Point] {
        &self.fixed
    }

    /// Number of originally fixed pieces, pre-solver deductions excluded.
    pub fn fixed_count(&self) -> usize {
        self.fixed.len()
    }

    #[inline]
    pub fn at(&self, pt: Point) -> Piece {
        self.cells[pt.index(self.width)]
    }

    #[inline]
    pub fn track_in_row(&self, row: i32) -> u32 {
        self.placed_in_row[row as usize]
    }

    #[inline]
    pub fn track_in_col(&self, col: i32) -> u32 {
        self.placed_in_col[col as usize]
    }

    #[inline]
    pub fn row_demand(&self, row: i32) -> u32 {
        self.row_demands[row as usize]
    }

    #[inline]
    pub fn col_demand(&self, col: i32) -> u32 {
        self.col_demands[col as usize]
    }

    #[inline]
    pub fn is_in_bounds(&self, pt: Point) -> bool {
        pt.x >= 0 && pt.y >= 0 && pt.x < self.width && pt.y < self.height
    }

    #[inline]
    pub fn is_on_edge(&self, pt: Point) -> bool {
        pt.x == 0 || pt.y == 0 || pt.x == self.width - 1 || pt.y == self.height - 1
    }

    #[inline]
    pub fn is_empty(&self, pt: Point) -> bool {
        self.at(pt).is_empty()
    }

    #[inline]
    pub fn is_filled(&self, pt: Point) -> bool {
        !self.is_empty(pt)
    }

    /// All cell positions in row-major order.
    pub(crate) fn points(&self) -> impl Iterator<Item = Point> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| Point::new(x, y)))
    }

    /// Sets a piece on an empty cell and bumps the counters.
    ///
    /// Placing `Empty` or overwriting an occupied cell is a programming
    /// error; use [`Grid::remove`] to clear a cell.
    pub fn place(&mut self, pt: Point, piece: Piece) {
        assert!(!piece.is_empty(), "cannot place an empty piece at {pt}");
        let idx = pt.index(self.width);
        assert!(self.cells[idx].is_empty(), "cell {pt} is already occupied");
        self.cells[idx] = piece;
        self.placed_in_row[pt.y as usize] += 1;
        self.placed_in_col[pt.x as usize] += 1;
        self.placed += 1;
    }

    /// Clears a cell, adjusting the counters if it was occupied.
    pub fn remove(&mut self, pt: Point) {
        let idx = pt.index(self.width);
        if !self.cells[idx].is_empty() {
            self.cells[idx] = Piece::Empty;
            self.placed_in_row[pt.y as usize] -= 1;
            self.placed_in_col[pt.x as usize] -= 1;
            self.placed -= 1;
        }
    }

    /// Whether the piece may legally occupy the cell right now.
    ///
    /// True iff the cell is an empty in-bounds cell whose row and column
    /// still have capacity, the piece keeps every connection on the grid,
    /// it agrees with every occupied neighbour (joining at least one when
    /// any neighbour is occupied), and following each connection into an
    /// empty neighbour leaves that neighbour's row and column satisfiable
    /// once this placement is counted.
    pub fn can_place(&self, pt: Point, piece: Piece) -> bool {
        if !self.is_in_bounds(pt) || self.is_filled(pt) {
            return false;
        }
        if self.placed_in_row[pt.y as usize] >= self.row_demands[pt.y as usize]
            || self.placed_in_col[pt.x as usize] >= self.col_demands[pt.x as usize]
        {
            return false;
        }

        let mut has_neighbor = false;
        let mut joins_neighbor = false;
        for d in Point::CARDINALS {
            let n = pt + d;
            if !self.is_in_bounds(n) {
                // only the fixed entry and exit may point off the grid
                if piece.connects_to(d) {
                    return false;
                }
                continue;
            }
            let other = self.at(n);
            if other.is_empty() {
                // look-ahead: an empty neighbour this piece would connect to
                // must still have room once this placement is counted
                if piece.connects_to(d) {
                    let row = self.placed_in_row[n.y as usize] + u32::from(n.y == pt.y);
                    let col = self.placed_in_col[n.x as usize] + u32::from(n.x == pt.x);
                    if row >= self.row_demands[n.y as usize]
                        || col >= self.col_demands[n.x as usize]
                    {
                        return false;
                    }
                }
                continue;
            }
            has_neighbor = true;
            let ours = piece.connects_to(d);
            let theirs = other.connects_to(-d);
            if ours != theirs {
                return false;
            }
            if ours {
                joins_neighbor = true;
            }
        }

        !has_neighbor || joins_neighbor
    }

    /// Whether every row and column demand is met exactly.
    pub fn constraints_satisfied(&self) -> bool {
        self.placed_in_row == self.row_demands && self.placed_in_col == self.col_demands
    }

    /// Whether no row or column demand is exceeded yet.
    pub fn can_still_satisfy(&self) -> bool {
        self.placed_in_row
            .iter()
            .zip(&self.row_demands)
            .all(|(placed, demand)| placed <= demand)
            && self
                .placed_in_col
                .iter()
                .zip(&self.col_demands)
                .all(|(placed, demand)| placed <= demand)
    }

    /// Whether the non-empty cells form one mutually connected component.
    pub fn is_single_connected_path(&self) -> bool {
        let Some(first) = self.points().find(|&pt| self.is_filled(pt)) else {
            return false;
        };

        let mut visited = vec![false; (self.width * self.height) as usize];
        let mut queue = VecDeque::new();
        visited[first.index(self.width)] = true;
        queue.push_back(first);

        while let Some(pt) = queue.pop_front() {
            for d in Point::CARDINALS {
                let next = pt + d;
                if !self.is_in_bounds(next)
                    || self.is_empty(next)
                    || visited[next.index(self.width)]
                {
                    continue;
                }
                // traverse only edges both pieces agree on
                if self.at(pt).connects_to(d) && self.at(next).connects_to(-d) {
                    visited[next.index(self.width)] = true;
                    queue.push_back(next);
                }
            }
        }

        self.points()
            .all(|pt| self.is_empty(pt) || visited[pt.index(self.width)])
    }

    /// A grid is complete when it is one connected path and every demand is
    /// met exactly.
    pub fn is_complete(&self) -> bool {
        self.is_single_connected_path() && self.constraints_satisfied()
    }

    /// Scans the border for pieces pointing off the grid: four corners, then
    /// the top row, bottom row, left column and right column. The first hit
    /// becomes the entry, the second the exit.
    fn extract_endpoints(&self) -> Result<(Point, Point), GridError> {
        let right = self.width - 1;
        let bottom = self.height - 1;

        let mut border = Vec::new();
        for corner in [
            Point::new(0, 0),
            Point::new(0, bottom),
            Point::new(right, 0),
            Point::new(right, bottom),
        ] {
            if !border.contains(&corner) {
                border.push(corner);
            }
        }
        border.extend((1..right).map(|x| Point::new(x, 0)));
        if bottom > 0 {
            border.extend((1..right).map(|x| Point::new(x, bottom)));
        }
        border.extend((1..bottom).map(|y| Point::new(0, y)));
        if right > 0 {
            border.extend((1..bottom).map(|y| Point::new(right, y)));
        }

        let mut endpoints = Vec::new();
        for pt in border {
            let off = self
                .at(pt)
                .connections()
                .iter()
                .filter(|&&d| !self.is_in_bounds(pt + d))
                .count();
            if off > 1 {
                return Err(GridError::LeavesGridTwice(pt));
            }
            if off == 1 {
                endpoints.push(pt);
            }
        }

        match endpoints[..] {
            [entry, exit] => Ok((entry, exit)),
            _ => Err(GridError::EndpointCount(endpoints.len())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::VALID_PIECES;

    /// 3x3 with vertical endpoints at (1,0) and (1,2); demands spread out so
    /// the column is not forced.
    fn simple_puzzle() -> Puzzle {
        let mut p = Puzzle::new(vec![1, 1, 1], vec![1, 2, 0]);
        p.set(Point::new(1, 0), Piece::Vertical);
        p.set(Point::new(1, 2), Piece::Vertical);
        p
    }

    /// 3x3 whose only solution is the straight middle column.
    fn solvable_puzzle() -> Puzzle {
        let mut p = Puzzle::new(vec![1, 1, 1], vec![0, 3, 0]);
        p.set(Point::new(1, 0), Piece::Vertical);
        p.set(Point::new(1, 2), Piece::Vertical);
        p
    }

    #[test]
    fn test_construction_properties() {
        let grid = Grid::new(&simple_puzzle()).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.placed(), 2);
        assert_eq!(grid.target(), 3);
        assert_eq!(grid.fixed_count(), 2);
        assert_eq!(
            grid.fixed_points(),
            &[Point::new(1, 0), Point::new(1, 2)]
        );
        assert_eq!(grid.entry(), Point::new(1, 0));
        assert_eq!(grid.exit(), Point::new(1, 2));
    }

    #[test]
    fn test_construction_requires_two_endpoints() {
        // no fixed pieces at all
        let err = Grid::new(&Puzzle::new(vec![0, 0], vec![0, 0])).unwrap_err();
        assert_eq!(err, GridError::EndpointCount(0));

        // three pieces pointing off the grid
        let mut p = Puzzle::new(vec![1, 1, 1], vec![1, 2, 0]);
        p.set(Point::new(1, 0), Piece::Vertical);
        p.set(Point::new(0, 1), Piece::Horizontal);
        p.set(Point::new(1, 2), Piece::Vertical);
        assert_eq!(Grid::new(&p).unwrap_err(), GridError::EndpointCount(3));
    }

    #[test]
    fn test_construction_rejects_demand_mismatch() {
        let p = Puzzle::new(vec![1, 1, 1], vec![0, 2, 0]);
        assert_eq!(
            Grid::new(&p).unwrap_err(),
            GridError::DemandMismatch {
                row_total: 3,
                col_total: 2
            }
        );
    }

    #[test]
    fn test_construction_rejects_overfull_line() {
        let mut p = Puzzle::new(vec![1, 1, 0], vec![1, 1, 0]);
        p.set(Point::new(0, 0), Piece::Horizontal);
        p.set(Point::new(1, 0), Piece::Horizontal);
        assert_eq!(
            Grid::new(&p).unwrap_err(),
            GridError::DemandExceeded(Point::new(1, 0))
        );
    }

    #[test]
    fn test_construction_rejects_misaligned_fixed_pieces() {
        let mut p = Puzzle::new(vec![1, 1, 1], vec![0, 3, 0]);
        p.set(Point::new(1, 0), Piece::Vertical);
        // Horizontal below the vertical cannot accept its connection
        p.set(Point::new(1, 1), Piece::Horizontal);
        p.set(Point::new(1, 2), Piece::Vertical);
        assert_eq!(
            Grid::new(&p).unwrap_err(),
            GridError::Misaligned(Point::new(1, 0), Point::new(1, 1))
        );
    }

    #[test]
    fn test_basic_queries() {
        let grid = Grid::new(&simple_puzzle()).unwrap();
        assert!(grid.is_in_bounds(Point::new(0, 0)));
        assert!(!grid.is_in_bounds(Point::new(-1, 1)));
        assert!(!grid.is_in_bounds(Point::new(1, 3)));
        assert!(grid.is_on_edge(Point::new(2, 1)));
        assert!(!grid.is_on_edge(Point::new(1, 1)));
        assert!(grid.is_empty(Point::new(0, 1)));
        assert!(!grid.is_filled(Point::new(0, 1)));
        assert!(grid.is_filled(Point::new(1, 0)));
    }

    #[test]
    fn test_place_and_remove_update_counts() {
        let mut grid = Grid::new(&simple_puzzle()).unwrap();
        let pt = Point::new(0, 1);
        grid.place(pt, Piece::CornerNE);
        assert_eq!(grid.placed(), 3);
        assert_eq!(grid.track_in_row(1), 1);
        assert_eq!(grid.track_in_col(0), 1);
        assert_eq!(grid.at(pt), Piece::CornerNE);
        grid.remove(pt);
        assert_eq!(grid.placed(), 2);
        assert_eq!(grid.track_in_row(1), 0);
        assert!(grid.is_empty(pt));
    }

    #[test]
    fn test_place_then_remove_restores_grid_exactly() {
        let grid = Grid::new(&simple_puzzle()).unwrap();
        for pt in grid.points().collect::<Vec<_>>() {
            if grid.is_filled(pt) {
                continue;
            }
            let mut scratch = grid.clone();
            scratch.place(pt, Piece::Vertical);
            scratch.remove(pt);
            assert_eq!(scratch, grid, "round trip at {pt} changed state");
        }
    }

    #[test]
    #[should_panic(expected = "cannot place an empty piece")]
    fn test_place_empty_panics() {
        let mut grid = Grid::new(&simple_puzzle()).unwrap();
        grid.place(Point::new(0, 0), Piece::Empty);
    }

    #[test]
    #[should_panic(expected = "already occupied")]
    fn test_place_on_filled_cell_panics() {
        let mut grid = Grid::new(&simple_puzzle()).unwrap();
        grid.place(Point::new(1, 0), Piece::Vertical);
    }

    #[test]
    fn test_can_place_basic_conditions() {
        let grid = Grid::new(&simple_puzzle()).unwrap();
        // out of bounds
        assert!(!grid.can_place(Point::new(-1, 0), Piece::Horizontal));
        // already filled
        assert!(!grid.can_place(Point::new(1, 0), Piece::Vertical));
        // a horizontal at the left edge would leave the grid
        assert!(!grid.can_place(Point::new(0, 1), Piece::Horizontal));
        // an empty piece has nothing to violate on an isolated cell
        assert!(grid.can_place(Point::new(0, 1), Piece::Empty));
    }

    #[test]
    fn test_can_place_respects_line_capacity() {
        let mut grid = Grid::new(&simple_puzzle()).unwrap();
        grid.place(Point::new(0, 1), Piece::CornerNE);
        // row 1 met its demand of one
        assert!(!grid.can_place(Point::new(2, 1), Piece::CornerNW));
    }

    #[test]
    fn test_can_place_requires_neighbour_agreement() {
        let grid = Grid::new(&solvable_puzzle()).unwrap();
        // vertical joins both fixed neighbours
        assert!(grid.can_place(Point::new(1, 1), Piece::Vertical));
        // horizontal refuses the connections both verticals offer
        assert!(!grid.can_place(Point::new(1, 1), Piece::Horizontal));
        // a corner joins one neighbour but contradicts the other
        assert!(!grid.can_place(Point::new(1, 1), Piece::CornerNE));
    }

    #[test]
    fn test_can_place_looks_ahead_into_empty_neighbours() {
        let mut p = Puzzle::new(vec![2, 1, 1], vec![1, 2, 1, 0]);
        p.set(Point::new(0, 0), Piece::Horizontal);
        p.set(Point::new(1, 2), Piece::Vertical);
        let grid = Grid::new(&p).unwrap();
        assert_eq!(grid.placed(), 2);

        // a horizontal at (1,0) joins the entry, but its east connection
        // would need a further cell in row 0 beyond the row's demand of two
        assert!(!grid.can_place(Point::new(1, 0), Piece::Horizontal));
        // turning south instead runs into column 1, which the placement
        // itself would fill to its demand
        assert!(!grid.can_place(Point::new(1, 0), Piece::CornerSW));
    }

    /// Recomputes the counters from the cells and walks every connection,
    /// so a drifted counter or a one-sided join fails loudly.
    fn assert_invariants(grid: &Grid) {
        for y in 0..grid.height() {
            let count = (0..grid.width())
                .filter(|&x| grid.is_filled(Point::new(x, y)))
                .count() as u32;
            assert_eq!(grid.track_in_row(y), count, "row {y} counter drifted");
        }
        for x in 0..grid.width() {
            let count = (0..grid.height())
                .filter(|&y| grid.is_filled(Point::new(x, y)))
                .count() as u32;
            assert_eq!(grid.track_in_col(x), count, "column {x} counter drifted");
        }

        for pt in grid.points().filter(|&pt| grid.is_filled(pt)) {
            for &d in grid.at(pt).connections() {
                let n = pt + d;
                if !grid.is_in_bounds(n) {
                    assert!(
                        pt == grid.entry() || pt == grid.exit(),
                        "{pt} points off the grid but is not an endpoint"
                    );
                    continue;
                }
                if grid.is_filled(n) {
                    assert!(
                        grid.at(n).connects_to(-d),
                        "{pt} connects toward {n} but not back"
                    );
                }
            }
        }
    }

    #[test]
    fn test_feasible_placements_preserve_invariants() {
        for puzzle in [simple_puzzle(), solvable_puzzle()] {
            let grid = Grid::new(&puzzle).unwrap();
            assert_invariants(&grid);
            for pt in grid.points().collect::<Vec<_>>() {
                for piece in VALID_PIECES {
                    if !grid.can_place(pt, piece) {
                        continue;
                    }
                    let mut scratch = grid.clone();
                    scratch.place(pt, piece);
                    assert_invariants(&scratch);
                }
            }
        }
    }

    #[test]
    fn test_completion_predicates() {
        let mut grid = Grid::new(&solvable_puzzle()).unwrap();
        assert!(!grid.constraints_satisfied());
        assert!(grid.can_still_satisfy());
        assert!(!grid.is_complete());

        grid.place(Point::new(1, 1), Piece::Vertical);
        assert!(grid.constraints_satisfied());
        assert!(grid.can_still_satisfy());
        assert!(grid.is_single_connected_path());
        assert!(grid.is_complete());
    }

    #[test]
    fn test_disconnected_track_is_not_a_single_path() {
        let mut p = Puzzle::new(vec![1, 0, 1], vec![0, 2, 0]);
        p.set(Point::new(1, 0), Piece::Vertical);
        p.set(Point::new(1, 2), Piece::Vertical);
        let grid = Grid::new(&p).unwrap();
        assert!(grid.constraints_satisfied());
        assert!(!grid.is_single_connected_path());
        assert!(!grid.is_complete());
    }
}
