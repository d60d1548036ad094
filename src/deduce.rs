//! Forced-placement deduction run once at grid construction.
//!
//! Two passes narrow the search before it starts: a border line demanding
//! two cells with one already placed gets its forced companion, and a
//! demand-one interior line next to a line holding a single piece is fed by
//! a run of straights and a turning corner. Every placement is re-checked
//! with `can_place`; when a step fails, the line keeps whatever was already
//! placed and deduction moves on.
//!
//! Scan order is fixed — borders top, bottom, left, right; then rows top to
//! bottom; then columns left to right — and deliberately so: deductions
//! change the counts later deductions read.

use crate::geometry::Point;
use crate::grid::Grid;
use crate::pieces::{Piece, VALID_PIECES};

impl Grid {
    pub(crate) fn place_obvious_pieces(&mut self) {
        self.deduce_borders();
        for row in 1..self.height() - 1 {
            if self.row_demand(row) != 1 || self.track_in_row(row) != 0 {
                continue;
            }
            for adjacent in [row - 1, row + 1] {
                if self.track_in_row(adjacent) == 1 {
                    self.feed_row(row, adjacent);
                }
            }
        }
        for col in 1..self.width() - 1 {
            if self.col_demand(col) != 1 || self.track_in_col(col) != 0 {
                continue;
            }
            for adjacent in [col - 1, col + 1] {
                if self.track_in_col(adjacent) == 1 {
                    self.feed_col(col, adjacent);
                }
            }
        }
    }

    /// A border line that demands exactly two cells and already holds one
    /// piece must continue through that piece's single in-grid connection.
    fn deduce_borders(&mut self) {
        let right = self.width() - 1;
        let bottom = self.height() - 1;
        let borders = [
            (Point::new(0, 0), Point::RIGHT, self.width()),
            (Point::new(0, bottom), Point::RIGHT, self.width()),
            (Point::new(0, 0), Point::DOWN, self.height()),
            (Point::new(right, 0), Point::DOWN, self.height()),
        ];

        for (origin, step, len) in borders {
            let (demand, placed) = if step.x != 0 {
                (self.row_demand(origin.y), self.track_in_row(origin.y))
            } else {
                (self.col_demand(origin.x), self.track_in_col(origin.x))
            };
            if demand != 2 || placed != 1 {
                continue;
            }
            let Some(anchor) = (0..len)
                .map(|i| origin + step * i)
                .find(|&pt| self.is_filled(pt))
            else {
                continue;
            };

            let inward: Vec<Point> = self
                .at(anchor)
                .connections()
                .iter()
                .copied()
                .filter(|&d| self.is_in_bounds(anchor + d))
                .collect();
            // two in-grid connections leave the continuation ambiguous
            let &[direction] = &inward[..] else { continue };

            let target = anchor + direction;
            if let Some(piece) = VALID_PIECES
                .into_iter()
                .find(|&p| self.can_place(target, p))
            {
                self.place(target, piece);
            }
        }
    }

    /// Feeds a demand-one row from the lone piece in an adjacent row: walk
    /// the adjacent row with horizontals, turn with a corner, and drop the
    /// vertical into the target row.
    fn feed_row(&mut self, row: i32, adjacent: i32) {
        let remainder = (self.row_demand(adjacent) - self.track_in_row(adjacent)) as i32;
        if remainder == 0 {
            return;
        }
        let Some(anchor) = (0..self.width())
            .map(|x| Point::new(x, adjacent))
            .find(|&pt| self.is_filled(pt))
        else {
            return;
        };
        let piece = self.at(anchor);
        // a bare horizontal gives no walk direction unless it is the entry
        // or the exit
        if piece == Piece::Horizontal && anchor != self.entry() && anchor != self.exit() {
            return;
        }
        let Some(step) = piece
            .connections()
            .iter()
            .copied()
            .find(|&d| d.y == 0 && self.is_in_bounds(anchor + d))
        else {
            return;
        };

        for i in 1..remainder {
            let pt = anchor + step * i;
            if !self.can_place(pt, Piece::Horizontal) {
                return;
            }
            self.place(pt, Piece::Horizontal);
        }

        let turn = Point::new(0, row - adjacent);
        let corner_at = anchor + step * remainder;
        let corner = Piece::from_directions(-step, turn);
        if !self.can_place(corner_at, corner) {
            return;
        }
        self.place(corner_at, corner);

        let vertical_at = corner_at + turn;
        if self.can_place(vertical_at, Piece::Vertical) {
            self.place(vertical_at, Piece::Vertical);
        }
    }

    /// Column counterpart of [`Grid::feed_row`]. The walk and the corner are
    /// placed; the closing horizontal in the target column is left to the
    /// search.
    fn feed_col(&mut self, col: i32, adjacent: i32) {
        let remainder = (self.col_demand(adjacent) - self.track_in_col(adjacent)) as i32;
        if remainder == 0 {
            return;
        }
        let Some(anchor) = (0..self.height())
            .map(|y| Point::new(adjacent, y))
            .find(|&pt| self.is_filled(pt))
        else {
            return;
        };
        let piece = self.at(anchor);
        if piece == Piece::Vertical && anchor != self.entry() && anchor != self.exit() {
            return;
        }
        let Some(step) = piece
            .connections()
            .iter()
            .copied()
            .find(|&d| d.x == 0 && self.is_in_bounds(anchor + d))
        else {
            return;
        };

        for i in 1..remainder {
            let pt = anchor + step * i;
            if !self.can_place(pt, Piece::Vertical) {
                return;
            }
            self.place(pt, Piece::Vertical);
        }

        let turn = Point::new(col - adjacent, 0);
        let corner_at = anchor + step * remainder;
        let corner = Piece::from_directions(-step, turn);
        if self.can_place(corner_at, corner) {
            self.place(corner_at, corner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::Puzzle;
    use crate::solver::PathSolver;

    /// The 5x5 puzzle from the original puzzle set: entry horizontal at the
    /// top-left, exit corner at the bottom-right.
    fn five_by_five() -> Puzzle {
        let mut p = Puzzle::new(vec![2, 1, 3, 2, 1], vec![1, 3, 1, 2, 2]);
        p.set(Point::new(0, 0), Piece::Horizontal);
        p.set(Point::new(4, 4), Piece::CornerNE);
        p
    }

    #[test]
    fn test_five_by_five_deductions() {
        let grid = Grid::new(&five_by_five()).unwrap();

        assert_eq!(grid.fixed_count(), 2);
        assert_eq!(grid.placed(), 6);
        assert_eq!(grid.track_in_row(0), 2);
        assert_eq!(grid.track_in_row(3), 1);
        assert_eq!(grid.track_in_col(1), 3);
        assert_eq!(grid.track_in_col(4), 2);

        assert_eq!(grid.at(Point::new(1, 0)), Piece::CornerSW);
        assert_eq!(grid.at(Point::new(1, 1)), Piece::Vertical);
        assert_eq!(grid.at(Point::new(1, 2)), Piece::CornerNE);
        assert_eq!(grid.at(Point::new(4, 3)), Piece::CornerSW);
    }

    #[test]
    fn test_five_by_five_solves_after_deduction() {
        let mut grid = Grid::new(&five_by_five()).unwrap();
        assert!(PathSolver::new().solve(&mut grid));
        assert!(grid.is_complete());
    }

    #[test]
    fn test_border_rule_turns_the_track_inward() {
        // both endpoints sit on demand-two border rows
        let mut p = Puzzle::new(
            vec![2, 2, 2, 2, 2, 2, 2, 2, 2],
            vec![1, 2, 2, 2, 2, 2, 2, 2, 2, 1],
        );
        p.set(Point::new(0, 0), Piece::Horizontal);
        p.set(Point::new(9, 8), Piece::Horizontal);
        let grid = Grid::new(&p).unwrap();

        assert_eq!(grid.fixed_count(), 2);
        assert_eq!(grid.placed(), 4);
        assert_eq!(grid.at(Point::new(1, 0)), Piece::CornerSW);
        assert_eq!(grid.at(Point::new(8, 8)), Piece::CornerNE);
    }

    #[test]
    fn test_lone_piece_feeds_a_demand_one_row() {
        let mut p = Puzzle::new(vec![3, 1, 3], vec![0, 3, 2, 2, 0, 0]);
        p.set(Point::new(3, 0), Piece::CornerNW);
        p.set(Point::new(1, 2), Piece::Vertical);
        let grid = Grid::new(&p).unwrap();

        // walk west from the corner, turn south, and seed the vertical
        assert_eq!(grid.placed(), 5);
        assert_eq!(grid.at(Point::new(2, 0)), Piece::Horizontal);
        assert_eq!(grid.at(Point::new(1, 0)), Piece::CornerSE);
        assert_eq!(grid.at(Point::new(1, 1)), Piece::Vertical);
    }

    #[test]
    fn test_bare_horizontal_neighbour_is_ambiguous() {
        let mut p = Puzzle::new(vec![1, 2, 1, 1], vec![2, 0, 3, 0, 0]);
        p.set(Point::new(0, 0), Piece::Vertical);
        p.set(Point::new(2, 1), Piece::Horizontal);
        p.set(Point::new(0, 3), Piece::Vertical);
        let grid = Grid::new(&p).unwrap();

        // the horizontal at (2,1) is neither entry nor exit, so nothing can
        // be deduced from it
        assert_eq!(grid.placed(), 3);
    }
}
